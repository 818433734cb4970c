//! Request snapshot consumed by key bits.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Parsed query string parameters. Repeated names keep the last value.
pub type QueryParams = BTreeMap<String, String>;

/// CGI-style request environment (`REMOTE_ADDR`, `HTTP_ACCEPT_LANGUAGE`, ...).
///
/// Keys are case-sensitive and stored as given. Header lookups that must
/// accept any casing go through [`Environ::get_ignore_ascii_case`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environ {
    vars: BTreeMap<String, String>,
}

impl Environ {
    /// Create an empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the environment for an `http` request head.
    ///
    /// Every header becomes `HTTP_<NAME>` (dashes turned into underscores),
    /// except `Content-Type` and `Content-Length` which keep their CGI names.
    /// Repeated headers are joined with `,`.
    pub fn from_http_parts(parts: &http::request::Parts) -> Self {
        Self::from_head(&parts.method, &parts.uri, &parts.headers)
    }

    fn from_head(method: &http::Method, uri: &http::Uri, headers: &http::HeaderMap) -> Self {
        let mut environ = Self::new();
        environ.insert("REQUEST_METHOD", method.as_str());
        environ.insert("PATH_INFO", uri.path());
        environ.insert("QUERY_STRING", uri.query().unwrap_or_default());

        for name in headers.keys() {
            let value = headers
                .get_all(name)
                .iter()
                .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
                .collect::<Vec<_>>()
                .join(",");

            if name == http::header::CONTENT_TYPE {
                environ.insert("CONTENT_TYPE", value);
            } else if name == http::header::CONTENT_LENGTH {
                environ.insert("CONTENT_LENGTH", value);
            } else {
                environ.insert(cgi_header_key(name.as_str()), value);
            }
        }

        environ
    }

    /// Insert a variable, returning the previous value.
    pub fn insert(&mut self, key: impl AsRef<str>, value: impl Into<String>) -> Option<String> {
        self.vars.insert(key.as_ref().to_string(), value.into())
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Get a variable by its exact key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(|s| s.as_str())
    }

    /// Get a variable, comparing keys without regard to ASCII case.
    ///
    /// An exact match wins over a case-folded one.
    pub fn get_ignore_ascii_case(&self, key: &str) -> Option<&str> {
        self.get(key).or_else(|| {
            self.vars
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v.as_str())
        })
    }

    /// Iterate over the stored keys.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.vars.keys().map(|k| k.as_str())
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Whether the environment is empty.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Environ {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut environ = Self::new();
        for (key, value) in iter {
            environ.insert(key, value);
        }
        environ
    }
}

/// `Accept-Language` => `HTTP_ACCEPT_LANGUAGE`.
fn cgi_header_key(name: &str) -> String {
    format!("HTTP_{}", name.trim().replace('-', "_").to_ascii_uppercase())
}

/// User attached to a request by the authentication layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RequestUser {
    /// No authenticated user.
    #[default]
    Anonymous,
    /// An authenticated user with its identifier.
    Authenticated { id: String },
}

impl RequestUser {
    /// Create an authenticated user.
    pub fn authenticated(id: impl ToString) -> Self {
        Self::Authenticated { id: id.to_string() }
    }

    /// Check if the user is authenticated.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    /// Get the user identifier, if authenticated.
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Authenticated { id } => Some(id),
            Self::Anonymous => None,
        }
    }
}

/// Snapshot of an incoming request, as seen by key bits.
#[derive(Debug, Clone, Default)]
pub struct Request {
    /// HTTP method.
    pub method: http::Method,
    /// Request path.
    pub path: String,
    /// Raw request environment.
    pub meta: Environ,
    /// Parsed query string parameters.
    pub query: QueryParams,
    /// Authenticated user.
    pub user: RequestUser,
    /// Format picked by content negotiation (e.g. "json"), if it ran.
    pub accepted_format: Option<String>,
    /// Language activated for this request by the locale layer.
    pub language: Option<String>,
}

impl Request {
    /// Create a new request snapshot.
    pub fn new(method: http::Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            ..Self::default()
        }
    }

    /// Build a snapshot from an `http` request.
    ///
    /// Negotiated format, user and language are filled in later by the
    /// layers that own them.
    pub fn from_http<B>(request: &http::Request<B>) -> Self {
        let uri = request.uri();
        let meta = Environ::from_head(request.method(), uri, request.headers());

        Self {
            method: request.method().clone(),
            path: uri.path().to_string(),
            meta,
            query: parse_query(uri.query().unwrap_or_default()),
            ..Self::default()
        }
    }

    /// Set a header (stored in the environment as `HTTP_<NAME>`).
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.meta.insert(cgi_header_key(name), value);
        self
    }

    /// Set a raw environment variable.
    pub fn with_meta(mut self, key: &str, value: impl Into<String>) -> Self {
        self.meta.insert(key, value);
        self
    }

    /// Set a query parameter.
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    /// Set the authenticated user.
    pub fn with_user(mut self, user: RequestUser) -> Self {
        self.user = user;
        self
    }

    /// Set the negotiated response format.
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.accepted_format = Some(format.into());
        self
    }

    /// Set the active language.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Get a header value by name, in any casing.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.meta.get_ignore_ascii_case(&cgi_header_key(name))
    }
}

/// Parse a raw query string into parameters.
pub fn parse_query(query: &str) -> QueryParams {
    url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect()
}
