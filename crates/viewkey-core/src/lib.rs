//! Interfaces consumed by viewkey key bits.
//!
//! This crate provides the collaborator types that key bits read from:
//! - `Request` - Snapshot of an incoming request (environment, query, user)
//! - `Environ` - CGI-style request environment
//! - `View` trait - Identity, pagination and queryset access for a view
//! - `QuerySet` trait - Filterable query with an explicit empty sentinel
//! - `SqlQuerySet` - Reference queryset compiling to SQL text
//! - `LocaleResolver` - Active language lookup

mod error;
mod locale;
mod query;
mod request;
mod view;

pub use error::*;
pub use locale::*;
pub use query::*;
pub use request::*;
pub use view::*;
