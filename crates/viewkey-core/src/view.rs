//! View interface consumed by key bits.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::LookupError;
use crate::query::QuerySet;
use crate::request::Request;

/// Keyword arguments of a view call (path parameters and the like).
pub type Kwargs = BTreeMap<String, serde_json::Value>;

/// Module path and type name identifying a view.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewIdentity {
    /// Module the view lives in (e.g. "catalog::views").
    pub module: String,
    /// View type name (e.g. "ProductList").
    pub name: String,
}

impl ViewIdentity {
    /// Create a view identity.
    pub fn new(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            name: name.into(),
        }
    }

    /// Split a Rust type path (`catalog::views::ProductList`) into module and name.
    ///
    /// Generic arguments stay attached to the name.
    pub fn from_type_name(type_name: &str) -> Self {
        let base_end = type_name.find('<').unwrap_or(type_name.len());
        match type_name[..base_end].rfind("::") {
            Some(split) => Self::new(&type_name[..split], &type_name[split + 2..]),
            None => Self::new("", type_name),
        }
    }
}

impl fmt::Display for ViewIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.module, self.name)
    }
}

/// Query parameter names a paginated view reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationParams {
    /// Parameter carrying the page number (e.g. "page").
    #[serde(default)]
    pub page_param_name: Option<String>,
    /// Parameter carrying the page size (e.g. "page_size").
    #[serde(default)]
    pub page_size_param_name: Option<String>,
}

impl PaginationParams {
    /// No pagination parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page number parameter name.
    pub fn with_page_param(mut self, name: impl Into<String>) -> Self {
        self.page_param_name = Some(name.into());
        self
    }

    /// Set the page size parameter name.
    pub fn with_page_size_param(mut self, name: impl Into<String>) -> Self {
        self.page_size_param_name = Some(name.into());
        self
    }

    /// Declared parameter names, page number first.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.page_param_name
            .iter()
            .chain(self.page_size_param_name.iter())
            .map(|s| s.as_str())
    }
}

/// A view instance handling the current request.
pub trait View: Send + Sync {
    /// Module and type name of the view.
    ///
    /// Defaults to the implementing type's path.
    fn identity(&self) -> ViewIdentity {
        ViewIdentity::from_type_name(std::any::type_name::<Self>())
    }

    /// Pagination parameters the view reads, if it paginates.
    fn pagination(&self) -> PaginationParams {
        PaginationParams::default()
    }

    /// Field used to look up a single object.
    fn lookup_field(&self) -> &str {
        "pk"
    }

    /// Keyword arguments the view was called with.
    fn kwargs(&self) -> &Kwargs;

    /// Base queryset for this view.
    fn get_queryset(&self) -> Box<dyn QuerySet>;

    /// Apply request-driven filtering to a queryset.
    fn filter_queryset(
        &self,
        _request: &Request,
        queryset: Box<dyn QuerySet>,
    ) -> Result<Box<dyn QuerySet>, LookupError> {
        Ok(queryset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_from_type_name() {
        let identity = ViewIdentity::from_type_name("catalog::views::ProductList");
        assert_eq!(identity.module, "catalog::views");
        assert_eq!(identity.name, "ProductList");
        assert_eq!(identity.to_string(), "catalog::views.ProductList");
    }

    #[test]
    fn test_identity_keeps_generics_on_name() {
        let identity = ViewIdentity::from_type_name("app::Detail<app::models::Order>");
        assert_eq!(identity.module, "app");
        assert_eq!(identity.name, "Detail<app::models::Order>");
    }

    #[test]
    fn test_identity_without_module() {
        let identity = ViewIdentity::from_type_name("Root");
        assert_eq!(identity.module, "");
        assert_eq!(identity.name, "Root");
    }

    #[test]
    fn test_pagination_names() {
        assert_eq!(PaginationParams::new().names().count(), 0);

        let params = PaginationParams::new()
            .with_page_size_param("page_size")
            .with_page_param("page");
        assert_eq!(params.names().collect::<Vec<_>>(), vec!["page", "page_size"]);
    }
}
