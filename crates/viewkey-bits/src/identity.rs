//! View and method identity bits.

use crate::bit::{KeyBit, KeyBitContext, KeyBitValue};
use crate::error::KeyBitError;

/// `"<module>.<view name>"` of the view instance.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniqueViewIdKeyBit;

impl KeyBit for UniqueViewIdKeyBit {
    fn name(&self) -> &'static str {
        "unique_view_id"
    }

    fn get_data(&self, ctx: &KeyBitContext<'_>) -> Result<KeyBitValue, KeyBitError> {
        Ok(KeyBitValue::Text(ctx.view.identity().to_string()))
    }
}

/// `"<module>.<view name>.<method name>"` of the called view method.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniqueMethodIdKeyBit;

impl KeyBit for UniqueMethodIdKeyBit {
    fn name(&self) -> &'static str {
        "unique_method_id"
    }

    fn get_data(&self, ctx: &KeyBitContext<'_>) -> Result<KeyBitValue, KeyBitError> {
        Ok(KeyBitValue::Text(format!(
            "{}.{}",
            ctx.view.identity(),
            ctx.view_method
        )))
    }
}
