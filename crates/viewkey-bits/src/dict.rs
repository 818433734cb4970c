//! Field extraction from dict-like sources.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde_json::Value;
use viewkey_core::{Environ, Kwargs};

/// Selects every key of the source mapping.
pub const ALL_FIELDS: &str = "*";

/// A mapping key bits draw field values from.
pub trait SourceDict {
    /// Text value stored under `key`. `None` when missing or null.
    fn lookup(&self, key: &str) -> Option<Cow<'_, str>>;

    /// Keys present in the mapping.
    fn keys(&self) -> Vec<String>;
}

impl SourceDict for Environ {
    fn lookup(&self, key: &str) -> Option<Cow<'_, str>> {
        self.get(key).map(Cow::Borrowed)
    }

    fn keys(&self) -> Vec<String> {
        Environ::keys(self).map(str::to_string).collect()
    }
}

impl SourceDict for BTreeMap<String, String> {
    fn lookup(&self, key: &str) -> Option<Cow<'_, str>> {
        self.get(key).map(|v| Cow::Borrowed(v.as_str()))
    }

    fn keys(&self) -> Vec<String> {
        BTreeMap::keys(self).cloned().collect()
    }
}

/// Request environment viewed through header lookups.
///
/// Header names arrive lower-cased from [`prepare_header_name`] while the
/// environment stores them as `HTTP_<NAME>`, so keys match ignoring ASCII case.
#[derive(Debug, Clone, Copy)]
pub struct HeaderEnviron<'a>(pub &'a Environ);

impl SourceDict for HeaderEnviron<'_> {
    fn lookup(&self, key: &str) -> Option<Cow<'_, str>> {
        self.0.get_ignore_ascii_case(key).map(Cow::Borrowed)
    }

    fn keys(&self) -> Vec<String> {
        SourceDict::keys(self.0)
    }
}

impl SourceDict for Kwargs {
    fn lookup(&self, key: &str) -> Option<Cow<'_, str>> {
        self.get(key).and_then(coerce_text)
    }

    fn keys(&self) -> Vec<String> {
        BTreeMap::keys(self).cloned().collect()
    }
}

/// Text form of a call argument. `None` for null.
///
/// Strings are used verbatim; everything else uses its compact JSON text.
pub fn coerce_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(Cow::Borrowed(s)),
        other => Some(Cow::Owned(other.to_string())),
    }
}

/// Look up `params` in `source`.
///
/// Each name is mapped through `retrieval_key` before the lookup and through
/// `assignment_key` before it is stored. Missing and null values are skipped.
pub fn extract_fields<S, R, A>(
    source: &S,
    params: &[String],
    retrieval_key: R,
    assignment_key: A,
) -> BTreeMap<String, String>
where
    S: SourceDict + ?Sized,
    R: Fn(&str) -> String,
    A: Fn(&str) -> String,
{
    let mut data = BTreeMap::new();
    for key in params {
        if let Some(value) = source.lookup(&retrieval_key(key)) {
            data.insert(assignment_key(key), value.into_owned());
        }
    }
    data
}

/// Expand the `["*"]` wildcard into every key of `source`.
pub fn expand_wildcard<'p, S>(params: &'p [String], source: &S) -> Cow<'p, [String]>
where
    S: SourceDict + ?Sized,
{
    match params {
        [only] if only == ALL_FIELDS => Cow::Owned(source.keys()),
        _ => Cow::Borrowed(params),
    }
}

/// Key mapping that leaves names unchanged.
pub fn same_key(key: &str) -> String {
    key.to_string()
}

/// `Accept-Language` => `http_accept_language`.
pub fn prepare_header_name(name: &str) -> String {
    format!("http_{}", name.trim().to_lowercase().replace('-', "_"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_prepare_header_name() {
        assert_eq!(prepare_header_name("Accept-Language"), "http_accept_language");
        assert_eq!(prepare_header_name(" X-Geobase-Id "), "http_x_geobase_id");
    }

    #[test]
    fn test_missing_fields_are_skipped() {
        let mut source = BTreeMap::new();
        source.insert("part".to_string(), "Londo".to_string());

        let data = extract_fields(&source, &params(&["part", "callback"]), same_key, same_key);
        assert_eq!(data.len(), 1);
        assert_eq!(data.get("part").map(String::as_str), Some("Londo"));
        assert!(!data.contains_key("callback"));
    }

    #[test]
    fn test_key_transforms() {
        let environ = Environ::new().with("HTTP_ACCEPT_LANGUAGE", "ru");

        let data = extract_fields(
            &HeaderEnviron(&environ),
            &params(&["Accept-Language"]),
            prepare_header_name,
            str::to_lowercase,
        );
        assert_eq!(data.get("accept-language").map(String::as_str), Some("ru"));
    }

    #[test]
    fn test_kwargs_values_are_coerced() {
        let mut kwargs = Kwargs::new();
        kwargs.insert("id".to_string(), Value::from(5));
        kwargs.insert("slug".to_string(), Value::from("intro"));
        kwargs.insert("draft".to_string(), Value::from(true));
        kwargs.insert("parent".to_string(), Value::Null);

        let data = extract_fields(
            &kwargs,
            &params(&["id", "slug", "draft", "parent"]),
            same_key,
            same_key,
        );
        assert_eq!(data.get("id").map(String::as_str), Some("5"));
        assert_eq!(data.get("slug").map(String::as_str), Some("intro"));
        assert_eq!(data.get("draft").map(String::as_str), Some("true"));
        assert!(!data.contains_key("parent"));
    }

    #[test]
    fn test_environ_lookup_is_exact() {
        let environ = Environ::new().with("REMOTE_ADDR", "127.0.0.2");

        let data = extract_fields(&environ, &params(&["remote_addr"]), same_key, same_key);
        assert!(data.is_empty());

        let data = extract_fields(&environ, &params(&["REMOTE_ADDR"]), same_key, same_key);
        assert_eq!(data.get("REMOTE_ADDR").map(String::as_str), Some("127.0.0.2"));
    }

    #[test]
    fn test_expand_wildcard() {
        let mut source = BTreeMap::new();
        source.insert("q".to_string(), "rust".to_string());
        source.insert("sort".to_string(), "price".to_string());

        let all = params(&[ALL_FIELDS]);
        assert_eq!(expand_wildcard(&all, &source).as_ref(), &params(&["q", "sort"])[..]);

        let some = params(&["q"]);
        assert!(matches!(expand_wildcard(&some, &source), Cow::Borrowed(_)));
    }
}
