//! Key bit contract, invocation context and extracted values.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;
use viewkey_core::{Kwargs, Request, View};

use crate::error::KeyBitError;

static NO_KWARGS: Kwargs = BTreeMap::new();

/// Everything a key bit may read for one view call.
#[derive(Clone, Copy)]
pub struct KeyBitContext<'a> {
    /// Field names configured for the bit.
    pub params: &'a [String],
    /// View handling the request.
    pub view: &'a dyn View,
    /// Name of the view method being called (e.g. "list").
    pub view_method: &'a str,
    /// Current request.
    pub request: &'a Request,
    /// Positional call arguments.
    pub args: &'a [Value],
    /// Keyword call arguments.
    pub kwargs: &'a Kwargs,
}

impl<'a> KeyBitContext<'a> {
    /// Create a context with no params and no call arguments.
    pub fn new(view: &'a dyn View, view_method: &'a str, request: &'a Request) -> Self {
        Self {
            params: &[],
            view,
            view_method,
            request,
            args: &[],
            kwargs: &NO_KWARGS,
        }
    }

    /// Set the configured field names.
    pub fn with_params(mut self, params: &'a [String]) -> Self {
        self.params = params;
        self
    }

    /// Set the positional call arguments.
    pub fn with_args(mut self, args: &'a [Value]) -> Self {
        self.args = args;
        self
    }

    /// Set the keyword call arguments.
    pub fn with_kwargs(mut self, kwargs: &'a Kwargs) -> Self {
        self.kwargs = kwargs;
        self
    }

    /// Invoke a key bit, passing its own configured params when it has them.
    pub fn resolve(&self, bit: &dyn KeyBit) -> Result<KeyBitValue, KeyBitError> {
        let ctx = KeyBitContext {
            params: bit.params().unwrap_or(self.params),
            ..*self
        };

        tracing::trace!(
            bit = bit.name(),
            view_method = ctx.view_method,
            params = ?ctx.params,
            "Resolving key bit"
        );

        bit.get_data(&ctx)
    }
}

impl fmt::Debug for KeyBitContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyBitContext")
            .field("params", &self.params)
            .field("view", &self.view.identity())
            .field("view_method", &self.view_method)
            .field("request", &self.request)
            .field("args", &self.args)
            .field("kwargs", &self.kwargs)
            .finish()
    }
}

/// Fragment extracted by a key bit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum KeyBitValue {
    /// No contribution to the cache key.
    Absent,
    /// A single text fragment.
    Text(String),
    /// A sequence of call arguments.
    List(Vec<Value>),
    /// Selected fields of a source mapping.
    Map(BTreeMap<String, String>),
}

impl KeyBitValue {
    /// Check for the absent-value signal.
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Get the text fragment.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get the argument list.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(values) => Some(values),
            _ => None,
        }
    }

    /// Get the field mapping.
    pub fn as_map(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }
}

impl From<String> for KeyBitValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for KeyBitValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<BTreeMap<String, String>> for KeyBitValue {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self::Map(map)
    }
}

impl From<Vec<Value>> for KeyBitValue {
    fn from(values: Vec<Value>) -> Self {
        Self::List(values)
    }
}

/// A strategy extracting one cache key fragment from a view call.
///
/// Implementations hold only immutable configuration, so one instance can
/// serve concurrent requests.
pub trait KeyBit: Send + Sync + fmt::Debug {
    /// Short kind name used in logs.
    fn name(&self) -> &'static str;

    /// Field names this bit was configured with.
    fn params(&self) -> Option<&[String]> {
        None
    }

    /// Extract the fragment.
    fn get_data(&self, ctx: &KeyBitContext<'_>) -> Result<KeyBitValue, KeyBitError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_serializes_as_null() {
        assert_eq!(serde_json::to_string(&KeyBitValue::Absent).unwrap(), "null");
        assert!(KeyBitValue::Absent.is_absent());
        assert!(!KeyBitValue::from("").is_absent());
    }

    #[test]
    fn test_value_serialization() {
        let text = KeyBitValue::from("10");
        assert_eq!(serde_json::to_string(&text).unwrap(), r#""10""#);

        let mut map = BTreeMap::new();
        map.insert("page".to_string(), "1".to_string());
        let map = KeyBitValue::from(map);
        assert_eq!(serde_json::to_string(&map).unwrap(), r#"{"page":"1"}"#);

        let list = KeyBitValue::from(vec![Value::from(1), Value::from("a")]);
        assert_eq!(serde_json::to_string(&list).unwrap(), r#"[1,"a"]"#);
    }

    #[test]
    fn test_accessors() {
        let text = KeyBitValue::from("json");
        assert_eq!(text.as_text(), Some("json"));
        assert!(text.as_map().is_none());
        assert!(text.as_list().is_none());

        let list = KeyBitValue::from(vec![Value::from(3)]);
        assert_eq!(list.as_list(), Some(&[Value::from(3)][..]));
    }
}
