//! Key bit error types.

use thiserror::Error;
use viewkey_core::LookupError;

/// Errors a key bit propagates to the caller.
#[derive(Error, Debug)]
pub enum KeyBitError {
    /// The request or view lacks something the bit reads.
    #[error("Missing request context: {0}")]
    MissingContext(&'static str),

    /// The view kwargs carry no value for the lookup field.
    #[error("No lookup value for '{field}' in view kwargs")]
    MissingLookupValue { field: String },

    /// A configured argument index is past the end of the call arguments.
    #[error("Argument index {index} out of range for {len} positional arguments")]
    ArgIndexOutOfRange { index: usize, len: usize },

    /// Queryset narrowing failed.
    #[error("Lookup failed: {0}")]
    Lookup(#[from] LookupError),

    /// A key bit declaration is invalid.
    #[error("Invalid key bit configuration: {0}")]
    InvalidConfig(String),

    /// A configuration file failed to parse.
    #[error("Configuration parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
