//! Composable cache key bits for view-level response caching.
//!
//! Each key bit extracts one fragment from the request/view context:
//! - `UniqueViewIdKeyBit` / `UniqueMethodIdKeyBit` - View and method identity
//! - `LanguageKeyBit`, `FormatKeyBit`, `UserKeyBit` - Request context
//! - `HeadersKeyBit`, `RequestMetaKeyBit`, `QueryParamsKeyBit`,
//!   `PaginationKeyBit`, `KwargsKeyBit` - Selected fields of a source mapping
//! - `ListSqlQueryKeyBit` / `RetrieveSqlQueryKeyBit` - Generated SQL
//! - `ArgsKeyBit` - Positional call arguments
//!
//! Combining fragments into a cache key is left to the caller.
//!
//! # Example
//!
//! ```ignore
//! use viewkey_bits::{HeadersKeyBit, KeyBitContext, UserKeyBit};
//!
//! let ctx = KeyBitContext::new(&view, "list", &request);
//!
//! let user = ctx.resolve(&UserKeyBit)?;
//! let headers = ctx.resolve(&HeadersKeyBit::new(["Accept-Language"]))?;
//! ```

mod args;
mod bit;
mod config;
mod dict;
mod error;
mod identity;
mod request;
mod source;
mod sql;

pub use args::*;
pub use bit::*;
pub use config::*;
pub use dict::*;
pub use error::*;
pub use identity::*;
pub use request::*;
pub use source::*;
pub use sql::*;

// Re-export the consumed interfaces for convenience
pub use viewkey_core::{
    ActiveLanguage, CompiledQuery, Environ, Kwargs, LocaleResolver, LookupError,
    PaginationParams, QuerySet, Request, RequestUser, View, ViewIdentity,
};
