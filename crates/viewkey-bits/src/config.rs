//! Declarative key bit configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use viewkey_core::ActiveLanguage;

use crate::args::ArgsKeyBit;
use crate::bit::KeyBit;
use crate::error::KeyBitError;
use crate::identity::{UniqueMethodIdKeyBit, UniqueViewIdKeyBit};
use crate::request::{FormatKeyBit, LanguageKeyBit, UserKeyBit};
use crate::source::{
    HeadersKeyBit, KwargsKeyBit, PaginationKeyBit, QueryParamsKeyBit, RequestMetaKeyBit,
};
use crate::sql::{ListSqlQueryKeyBit, RetrieveSqlQueryKeyBit};

/// Kind of key bit to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyBitKind {
    UniqueViewId,
    UniqueMethodId,
    Language,
    Format,
    User,
    Headers,
    RequestMeta,
    QueryParams,
    Pagination,
    ListSqlQuery,
    RetrieveSqlQuery,
    Args,
    Kwargs,
}

/// Declaration of a single key bit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeyBitConfig {
    /// Bit kind.
    pub kind: KeyBitKind,
    /// Field names (argument positions for `args`, fallback language for `language`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Vec<String>>,
}

impl KeyBitConfig {
    /// Declare a bit without params.
    pub fn new(kind: KeyBitKind) -> Self {
        Self { kind, params: None }
    }

    /// Set the params.
    pub fn with_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params = Some(params.into_iter().map(Into::into).collect());
        self
    }

    /// Build the declared key bit.
    pub fn build(&self) -> Result<Box<dyn KeyBit>, KeyBitError> {
        let params = self.params.clone();

        let bit: Box<dyn KeyBit> = match self.kind {
            KeyBitKind::UniqueViewId => Box::new(UniqueViewIdKeyBit),
            KeyBitKind::UniqueMethodId => Box::new(UniqueMethodIdKeyBit),
            KeyBitKind::Format => Box::new(FormatKeyBit),
            KeyBitKind::User => Box::new(UserKeyBit),
            KeyBitKind::ListSqlQuery => Box::new(ListSqlQueryKeyBit),
            KeyBitKind::RetrieveSqlQuery => Box::new(RetrieveSqlQueryKeyBit),
            KeyBitKind::Language => match params.as_deref() {
                None | Some([]) => Box::new(LanguageKeyBit::new()),
                Some([fallback]) => {
                    Box::new(LanguageKeyBit::with_resolver(ActiveLanguage::new(fallback.as_str())))
                }
                Some(_) => {
                    return Err(KeyBitError::InvalidConfig(
                        "language takes at most one fallback language".to_string(),
                    ))
                }
            },
            KeyBitKind::Headers => Box::new(HeadersKeyBit::new(params.unwrap_or_default())),
            KeyBitKind::RequestMeta => Box::new(RequestMetaKeyBit::new(params.unwrap_or_default())),
            KeyBitKind::QueryParams => Box::new(QueryParamsKeyBit::new(params.unwrap_or_default())),
            KeyBitKind::Pagination => match params {
                Some(extra) => Box::new(PaginationKeyBit::with_extra(extra)),
                None => Box::new(PaginationKeyBit::new()),
            },
            KeyBitKind::Kwargs => match params {
                Some(names) => Box::new(KwargsKeyBit::new(names)),
                None => Box::new(KwargsKeyBit::all()),
            },
            KeyBitKind::Args => match params {
                Some(positions) => Box::new(ArgsKeyBit::at(parse_indices(&positions)?)),
                None => Box::new(ArgsKeyBit::all()),
            },
        };

        Ok(bit)
    }
}

fn parse_indices(positions: &[String]) -> Result<Vec<usize>, KeyBitError> {
    positions
        .iter()
        .map(|p| {
            p.trim().parse::<usize>().map_err(|_| {
                KeyBitError::InvalidConfig(format!("args position '{}' is not an index", p))
            })
        })
        .collect()
}

/// Key bits declared for one view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewCacheConfig {
    /// View the declaration belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    /// Bits by name.
    #[serde(default)]
    pub bits: BTreeMap<String, KeyBitConfig>,
}

impl ViewCacheConfig {
    /// Parse a TOML declaration.
    pub fn from_toml_str(source: &str) -> Result<Self, KeyBitError> {
        let config: Self = toml::from_str(source)?;
        tracing::debug!(
            view = config.view.as_deref().unwrap_or("<unnamed>"),
            bits = config.bits.len(),
            "Loaded key bit configuration"
        );
        Ok(config)
    }

    /// Add a bit declaration.
    pub fn with_bit(mut self, name: impl Into<String>, bit: KeyBitConfig) -> Self {
        self.bits.insert(name.into(), bit);
        self
    }

    /// Build every declared bit, ordered by name.
    pub fn build_bits(&self) -> Result<BTreeMap<String, Box<dyn KeyBit>>, KeyBitError> {
        self.bits
            .iter()
            .map(|(name, config)| Ok((name.clone(), config.build()?)))
            .collect()
    }
}
