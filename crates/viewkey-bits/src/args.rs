//! Positional call arguments bit.

use crate::bit::{KeyBit, KeyBitContext, KeyBitValue};
use crate::error::KeyBitError;

/// Positional call arguments, optionally restricted to selected positions.
#[derive(Debug, Clone, Default)]
pub struct ArgsKeyBit {
    indices: Option<Vec<usize>>,
}

impl ArgsKeyBit {
    /// Every positional argument.
    pub fn all() -> Self {
        Self::default()
    }

    /// Arguments at the given positions, in the given order.
    pub fn at(indices: impl IntoIterator<Item = usize>) -> Self {
        Self {
            indices: Some(indices.into_iter().collect()),
        }
    }

    /// Configured positions, if any.
    pub fn indices(&self) -> Option<&[usize]> {
        self.indices.as_deref()
    }
}

impl KeyBit for ArgsKeyBit {
    fn name(&self) -> &'static str {
        "args"
    }

    fn get_data(&self, ctx: &KeyBitContext<'_>) -> Result<KeyBitValue, KeyBitError> {
        let Some(indices) = &self.indices else {
            return Ok(KeyBitValue::List(ctx.args.to_vec()));
        };

        indices
            .iter()
            .map(|&index| {
                ctx.args
                    .get(index)
                    .cloned()
                    .ok_or(KeyBitError::ArgIndexOutOfRange {
                        index,
                        len: ctx.args.len(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(KeyBitValue::List)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use viewkey_core::{Kwargs, QuerySet, Request, SqlQuerySet, View};

    struct Report(Kwargs);

    impl View for Report {
        fn kwargs(&self) -> &Kwargs {
            &self.0
        }

        fn get_queryset(&self) -> Box<dyn QuerySet> {
            Box::new(SqlQuerySet::new("report"))
        }
    }

    fn call_args() -> Vec<Value> {
        vec![json!("2024"), json!(7), json!({"draft": true})]
    }

    #[test]
    fn test_all_args() {
        let view = Report(Kwargs::new());
        let request = Request::default();
        let args = call_args();
        let ctx = KeyBitContext::new(&view, "get", &request).with_args(&args);

        assert_eq!(ArgsKeyBit::all().get_data(&ctx).unwrap(), KeyBitValue::List(args.clone()));
    }

    #[test]
    fn test_selected_args_keep_configured_order() {
        let view = Report(Kwargs::new());
        let request = Request::default();
        let args = call_args();
        let ctx = KeyBitContext::new(&view, "get", &request).with_args(&args);

        assert_eq!(
            ArgsKeyBit::at([1, 0]).get_data(&ctx).unwrap(),
            KeyBitValue::List(vec![json!(7), json!("2024")])
        );
        assert_eq!(ArgsKeyBit::at([]).get_data(&ctx).unwrap(), KeyBitValue::List(vec![]));
    }

    #[test]
    fn test_out_of_range_index() {
        let view = Report(Kwargs::new());
        let request = Request::default();
        let args = call_args();
        let ctx = KeyBitContext::new(&view, "get", &request).with_args(&args);

        let err = ArgsKeyBit::at([0, 5]).get_data(&ctx).unwrap_err();
        assert!(matches!(err, KeyBitError::ArgIndexOutOfRange { index: 5, len: 3 }));
    }
}
