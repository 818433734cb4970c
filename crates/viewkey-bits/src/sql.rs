//! Bits contributing the SQL a view would run.

use viewkey_core::{CompiledQuery, LookupError, QuerySet};

use crate::bit::{KeyBit, KeyBitContext, KeyBitValue};
use crate::dict::coerce_text;
use crate::error::KeyBitError;

fn compiled_value(compiled: CompiledQuery, ctx: &KeyBitContext<'_>) -> KeyBitValue {
    match compiled {
        CompiledQuery::Empty => {
            tracing::debug!(
                view = %ctx.view.identity(),
                view_method = ctx.view_method,
                "Empty queryset, no key contribution"
            );
            KeyBitValue::Absent
        }
        CompiledQuery::NonEmpty(sql) => KeyBitValue::Text(sql),
    }
}

/// SQL of the view's filtered list queryset.
///
/// Absent when the queryset is the empty sentinel.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListSqlQueryKeyBit;

impl KeyBit for ListSqlQueryKeyBit {
    fn name(&self) -> &'static str {
        "list_sql_query"
    }

    fn get_data(&self, ctx: &KeyBitContext<'_>) -> Result<KeyBitValue, KeyBitError> {
        let queryset = ctx
            .view
            .filter_queryset(ctx.request, ctx.view.get_queryset())?;
        Ok(compiled_value(queryset.compile(), ctx))
    }
}

/// SQL of the view's single-object queryset.
///
/// Absent when the queryset is empty or the lookup value does not convert
/// to the lookup field's type. Other lookup errors propagate.
#[derive(Debug, Clone, Copy, Default)]
pub struct RetrieveSqlQueryKeyBit;

impl RetrieveSqlQueryKeyBit {
    fn narrow(
        ctx: &KeyBitContext<'_>,
        field: &str,
        value: &str,
    ) -> Result<Box<dyn QuerySet>, LookupError> {
        ctx.view
            .filter_queryset(ctx.request, ctx.view.get_queryset())?
            .filter(field, value)
    }
}

impl KeyBit for RetrieveSqlQueryKeyBit {
    fn name(&self) -> &'static str {
        "retrieve_sql_query"
    }

    fn get_data(&self, ctx: &KeyBitContext<'_>) -> Result<KeyBitValue, KeyBitError> {
        let field = ctx.view.lookup_field();
        let value = ctx
            .view
            .kwargs()
            .get(field)
            .and_then(coerce_text)
            .ok_or_else(|| KeyBitError::MissingLookupValue {
                field: field.to_string(),
            })?;

        match Self::narrow(ctx, field, &value) {
            Ok(queryset) => Ok(compiled_value(queryset.compile(), ctx)),
            Err(err @ LookupError::InvalidValue { .. }) => {
                tracing::debug!(
                    view = %ctx.view.identity(),
                    field,
                    value = %value,
                    error = %err,
                    "Lookup value rejected, no key contribution"
                );
                Ok(KeyBitValue::Absent)
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use viewkey_core::{FieldType, Kwargs, Request, SqlQuerySet, View};

    struct ProductView {
        kwargs: Kwargs,
        empty: bool,
        lookup_field: &'static str,
    }

    impl ProductView {
        fn new(empty: bool) -> Self {
            Self {
                kwargs: Kwargs::new(),
                empty,
                lookup_field: "pk",
            }
        }

        fn looked_up_by(mut self, field: &'static str) -> Self {
            self.lookup_field = field;
            self
        }

        fn with_kwarg(mut self, key: &str, value: Value) -> Self {
            self.kwargs.insert(key.to_string(), value);
            self
        }
    }

    impl View for ProductView {
        fn lookup_field(&self) -> &str {
            self.lookup_field
        }

        fn kwargs(&self) -> &Kwargs {
            &self.kwargs
        }

        fn get_queryset(&self) -> Box<dyn QuerySet> {
            let products = SqlQuerySet::new("product")
                .field("id", FieldType::Integer)
                .field("name", FieldType::Text);
            if self.empty {
                products.none()
            } else {
                Box::new(products)
            }
        }

        fn filter_queryset(
            &self,
            request: &Request,
            queryset: Box<dyn QuerySet>,
        ) -> Result<Box<dyn QuerySet>, LookupError> {
            match request.query.get("name") {
                Some(name) => queryset.filter("name__icontains", name),
                None => Ok(queryset),
            }
        }
    }

    #[test]
    fn test_list_sql() {
        let view = ProductView::new(false);
        let request = Request::default().with_query("name", "book");
        let ctx = KeyBitContext::new(&view, "list", &request);

        assert_eq!(
            ListSqlQueryKeyBit.get_data(&ctx).unwrap(),
            KeyBitValue::from(
                r#"SELECT "product"."id", "product"."name" FROM "product" WHERE LOWER("product"."name") LIKE LOWER('%book%')"#
            )
        );
    }

    #[test]
    fn test_list_sql_empty_is_absent() {
        let view = ProductView::new(true);
        let request = Request::default();
        let ctx = KeyBitContext::new(&view, "list", &request);

        let value = ListSqlQueryKeyBit.get_data(&ctx).unwrap();
        assert!(value.is_absent());
        assert_ne!(value, KeyBitValue::from(""));
    }

    #[test]
    fn test_retrieve_sql() {
        let view = ProductView::new(false).with_kwarg("pk", Value::from(5));
        let request = Request::default();
        let ctx = KeyBitContext::new(&view, "retrieve", &request);

        let value = RetrieveSqlQueryKeyBit.get_data(&ctx).unwrap();
        assert!(value.as_text().unwrap().ends_with(r#"WHERE "product"."id" = 5"#));
    }

    #[test]
    fn test_retrieve_sql_invalid_lookup_is_absent() {
        let view = ProductView::new(false).with_kwarg("pk", Value::from("not-a-number"));
        let request = Request::default();
        let ctx = KeyBitContext::new(&view, "retrieve", &request);

        assert_eq!(RetrieveSqlQueryKeyBit.get_data(&ctx).unwrap(), KeyBitValue::Absent);
    }

    #[test]
    fn test_retrieve_sql_empty_is_absent() {
        let view = ProductView::new(true).with_kwarg("pk", Value::from("5"));
        let request = Request::default();
        let ctx = KeyBitContext::new(&view, "retrieve", &request);

        assert!(RetrieveSqlQueryKeyBit.get_data(&ctx).unwrap().is_absent());
    }

    #[test]
    fn test_retrieve_sql_missing_lookup_value() {
        let view = ProductView::new(false);
        let request = Request::default();
        let ctx = KeyBitContext::new(&view, "retrieve", &request);

        let err = RetrieveSqlQueryKeyBit.get_data(&ctx).unwrap_err();
        assert!(matches!(err, KeyBitError::MissingLookupValue { field } if field == "pk"));
    }

    #[test]
    fn test_retrieve_sql_unknown_lookup_field_propagates() {
        let view = ProductView::new(false)
            .looked_up_by("slug")
            .with_kwarg("slug", Value::from("shoes"));
        let request = Request::default();
        let ctx = KeyBitContext::new(&view, "retrieve", &request);

        let err = RetrieveSqlQueryKeyBit.get_data(&ctx).unwrap_err();
        assert!(matches!(
            err,
            KeyBitError::Lookup(LookupError::UnknownField(field)) if field == "slug"
        ));
    }

    #[test]
    fn test_retrieve_sql_unsupported_lookup_propagates() {
        let view = ProductView::new(false)
            .looked_up_by("name__regex")
            .with_kwarg("name__regex", Value::from("^b"));
        let request = Request::default();
        let ctx = KeyBitContext::new(&view, "retrieve", &request);

        let err = RetrieveSqlQueryKeyBit.get_data(&ctx).unwrap_err();
        assert!(matches!(err, KeyBitError::Lookup(LookupError::UnsupportedLookup(_))));
    }
}
