//! Bits selecting fields from a source mapping (headers, query, kwargs).

use crate::bit::{KeyBit, KeyBitContext, KeyBitValue};
use crate::dict::{expand_wildcard, extract_fields, prepare_header_name, same_key, HeaderEnviron};
use crate::error::KeyBitError;

fn to_params<I, S>(params: I) -> Option<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Some(params.into_iter().map(Into::into).collect())
}

/// The bit's own params, or the context's when it has none.
fn effective_params<'a>(
    own: &'a Option<Vec<String>>,
    ctx: &KeyBitContext<'a>,
) -> &'a [String] {
    own.as_deref().unwrap_or(ctx.params)
}

/// Selected request headers, keyed by lower-cased header name.
///
/// Return example: `{"accept-language": "ru", "x-geobase-id": "123"}`.
#[derive(Debug, Clone, Default)]
pub struct HeadersKeyBit {
    params: Option<Vec<String>>,
}

impl HeadersKeyBit {
    /// Select headers by canonical name (e.g. "Accept-Language").
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            params: to_params(headers),
        }
    }
}

impl KeyBit for HeadersKeyBit {
    fn name(&self) -> &'static str {
        "headers"
    }

    fn params(&self) -> Option<&[String]> {
        self.params.as_deref()
    }

    fn get_data(&self, ctx: &KeyBitContext<'_>) -> Result<KeyBitValue, KeyBitError> {
        Ok(KeyBitValue::Map(extract_fields(
            &HeaderEnviron(&ctx.request.meta),
            effective_params(&self.params, ctx),
            prepare_header_name,
            str::to_lowercase,
        )))
    }
}

/// Selected raw environment variables.
///
/// Return example: `{"REMOTE_ADDR": "127.0.0.2", "REMOTE_HOST": "example.org"}`.
#[derive(Debug, Clone, Default)]
pub struct RequestMetaKeyBit {
    params: Option<Vec<String>>,
}

impl RequestMetaKeyBit {
    /// Select variables by name; `["*"]` selects all of them.
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            params: to_params(keys),
        }
    }
}

impl KeyBit for RequestMetaKeyBit {
    fn name(&self) -> &'static str {
        "request_meta"
    }

    fn params(&self) -> Option<&[String]> {
        self.params.as_deref()
    }

    fn get_data(&self, ctx: &KeyBitContext<'_>) -> Result<KeyBitValue, KeyBitError> {
        let source = &ctx.request.meta;
        let params = expand_wildcard(effective_params(&self.params, ctx), source);
        Ok(KeyBitValue::Map(extract_fields(source, &params, same_key, same_key)))
    }
}

/// Selected query string parameters.
///
/// Return example: `{"part": "Londo", "callback": "jquery_callback"}`.
#[derive(Debug, Clone, Default)]
pub struct QueryParamsKeyBit {
    params: Option<Vec<String>>,
}

impl QueryParamsKeyBit {
    /// Select parameters by name; `["*"]` selects all of them.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            params: to_params(names),
        }
    }
}

impl KeyBit for QueryParamsKeyBit {
    fn name(&self) -> &'static str {
        "query_params"
    }

    fn params(&self) -> Option<&[String]> {
        self.params.as_deref()
    }

    fn get_data(&self, ctx: &KeyBitContext<'_>) -> Result<KeyBitValue, KeyBitError> {
        let source = &ctx.request.query;
        let params = expand_wildcard(effective_params(&self.params, ctx), source);
        Ok(KeyBitValue::Map(extract_fields(source, &params, same_key, same_key)))
    }
}

/// Query parameters driving pagination.
///
/// Looks up the view's page and page-size parameters in addition to any
/// configured ones. Return example: `{"page": "1", "page_size": "100"}`.
#[derive(Debug, Clone, Default)]
pub struct PaginationKeyBit {
    params: Option<Vec<String>>,
}

impl PaginationKeyBit {
    /// Only the view's pagination parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Also select extra query parameters.
    pub fn with_extra<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            params: to_params(names),
        }
    }
}

impl KeyBit for PaginationKeyBit {
    fn name(&self) -> &'static str {
        "pagination"
    }

    fn params(&self) -> Option<&[String]> {
        self.params.as_deref()
    }

    fn get_data(&self, ctx: &KeyBitContext<'_>) -> Result<KeyBitValue, KeyBitError> {
        let pagination = ctx.view.pagination();
        let mut params = effective_params(&self.params, ctx).to_vec();
        for name in pagination.names() {
            if !params.iter().any(|p| p == name) {
                params.push(name.to_string());
            }
        }

        Ok(KeyBitValue::Map(extract_fields(
            &ctx.request.query,
            &params,
            same_key,
            same_key,
        )))
    }
}

/// Selected keyword call arguments; all of them when none are configured.
///
/// Return example: `{"id": "5", "format": "json"}`.
#[derive(Debug, Clone, Default)]
pub struct KwargsKeyBit {
    params: Option<Vec<String>>,
}

impl KwargsKeyBit {
    /// Every keyword argument.
    pub fn all() -> Self {
        Self::default()
    }

    /// Select keyword arguments by name.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            params: to_params(names),
        }
    }
}

impl KeyBit for KwargsKeyBit {
    fn name(&self) -> &'static str {
        "kwargs"
    }

    fn params(&self) -> Option<&[String]> {
        self.params.as_deref()
    }

    fn get_data(&self, ctx: &KeyBitContext<'_>) -> Result<KeyBitValue, KeyBitError> {
        let source = ctx.kwargs;
        let selected = effective_params(&self.params, ctx);
        let params: Vec<String> = if selected.is_empty() {
            source.keys().cloned().collect()
        } else {
            expand_wildcard(selected, source).into_owned()
        };
        Ok(KeyBitValue::Map(extract_fields(source, &params, same_key, same_key)))
    }
}
