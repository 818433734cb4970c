//! Bits reading request-level context: language, format and user.

use std::sync::Arc;

use viewkey_core::{ActiveLanguage, LocaleResolver, RequestUser};

use crate::bit::{KeyBit, KeyBitContext, KeyBitValue};
use crate::error::KeyBitError;

/// Token used for requests without an authenticated user.
pub const ANONYMOUS_USER: &str = "anonymous";

/// Active language code.
///
/// Return example: `"en"`.
#[derive(Debug, Clone)]
pub struct LanguageKeyBit {
    resolver: Arc<dyn LocaleResolver>,
}

impl LanguageKeyBit {
    /// Use the language activated on the request, falling back to `en-us`.
    pub fn new() -> Self {
        Self::with_resolver(ActiveLanguage::default())
    }

    /// Use a custom locale resolver.
    pub fn with_resolver(resolver: impl LocaleResolver + 'static) -> Self {
        Self {
            resolver: Arc::new(resolver),
        }
    }
}

impl Default for LanguageKeyBit {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyBit for LanguageKeyBit {
    fn name(&self) -> &'static str {
        "language"
    }

    fn get_data(&self, ctx: &KeyBitContext<'_>) -> Result<KeyBitValue, KeyBitError> {
        Ok(KeyBitValue::Text(self.resolver.active_language(ctx.request)))
    }
}

/// Format picked by content negotiation.
///
/// Return example: `"json"` or `"html"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatKeyBit;

impl KeyBit for FormatKeyBit {
    fn name(&self) -> &'static str {
        "format"
    }

    fn get_data(&self, ctx: &KeyBitContext<'_>) -> Result<KeyBitValue, KeyBitError> {
        ctx.request
            .accepted_format
            .clone()
            .map(KeyBitValue::Text)
            .ok_or(KeyBitError::MissingContext("accepted_format"))
    }
}

/// Authenticated user id, or `"anonymous"`.
///
/// Return example: `"10"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserKeyBit;

impl KeyBit for UserKeyBit {
    fn name(&self) -> &'static str {
        "user"
    }

    fn get_data(&self, ctx: &KeyBitContext<'_>) -> Result<KeyBitValue, KeyBitError> {
        let value = match &ctx.request.user {
            RequestUser::Authenticated { id } => id.clone(),
            RequestUser::Anonymous => ANONYMOUS_USER.to_string(),
        };
        Ok(KeyBitValue::Text(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewkey_core::{Kwargs, QuerySet, Request, SqlQuerySet, View};

    struct Home(Kwargs);

    impl View for Home {
        fn kwargs(&self) -> &Kwargs {
            &self.0
        }

        fn get_queryset(&self) -> Box<dyn QuerySet> {
            Box::new(SqlQuerySet::new("page"))
        }
    }

    #[derive(Debug)]
    struct Fixed(&'static str);

    impl LocaleResolver for Fixed {
        fn active_language(&self, _request: &Request) -> String {
            self.0.to_string()
        }
    }

    #[test]
    fn test_language_from_request() {
        let view = Home(Kwargs::new());
        let request = Request::default().with_language("ru");
        let ctx = KeyBitContext::new(&view, "get", &request);

        assert_eq!(LanguageKeyBit::new().get_data(&ctx).unwrap(), KeyBitValue::from("ru"));
    }

    #[test]
    fn test_language_fallback_and_custom_resolver() {
        let view = Home(Kwargs::new());
        let request = Request::default();
        let ctx = KeyBitContext::new(&view, "get", &request);

        assert_eq!(LanguageKeyBit::new().get_data(&ctx).unwrap(), KeyBitValue::from("en-us"));
        assert_eq!(
            LanguageKeyBit::with_resolver(Fixed("pt-br")).get_data(&ctx).unwrap(),
            KeyBitValue::from("pt-br")
        );
    }

    #[test]
    fn test_format() {
        let view = Home(Kwargs::new());
        let request = Request::default().with_format("json");
        let ctx = KeyBitContext::new(&view, "get", &request);

        assert_eq!(FormatKeyBit.get_data(&ctx).unwrap(), KeyBitValue::from("json"));
    }

    #[test]
    fn test_format_without_negotiation_fails() {
        let view = Home(Kwargs::new());
        let request = Request::default();
        let ctx = KeyBitContext::new(&view, "get", &request);

        let err = FormatKeyBit.get_data(&ctx).unwrap_err();
        assert!(matches!(err, KeyBitError::MissingContext("accepted_format")));
    }

    #[test]
    fn test_anonymous_user() {
        let view = Home(Kwargs::new());
        let request = Request::default();
        let ctx = KeyBitContext::new(&view, "get", &request);

        assert_eq!(UserKeyBit.get_data(&ctx).unwrap(), KeyBitValue::from("anonymous"));
    }

    #[test]
    fn test_authenticated_user() {
        let view = Home(Kwargs::new());
        let request = Request::default().with_user(RequestUser::authenticated(10));
        let ctx = KeyBitContext::new(&view, "get", &request);

        assert_eq!(UserKeyBit.get_data(&ctx).unwrap(), KeyBitValue::from("10"));
    }
}
