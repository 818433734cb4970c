//! Queryset interface and a reference SQL queryset.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::LookupError;

/// Compiled form of a queryset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompiledQuery {
    /// Canonical empty queryset: matches nothing and runs no query.
    Empty,
    /// SQL text of the query.
    NonEmpty(String),
}

impl CompiledQuery {
    /// Get the SQL text, if the query is not empty.
    pub fn sql(&self) -> Option<&str> {
        match self {
            Self::Empty => None,
            Self::NonEmpty(sql) => Some(sql),
        }
    }

    /// Check for the empty sentinel.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// A lazily evaluated, filterable query.
pub trait QuerySet: Send + Sync + fmt::Debug {
    /// Narrow the queryset with `lookup = value`.
    ///
    /// `lookup` is a field name optionally suffixed with a lookup type
    /// (`price__gte`). The raw value is converted to the field's type.
    fn filter(&self, lookup: &str, value: &str) -> Result<Box<dyn QuerySet>, LookupError>;

    /// The empty sentinel for this queryset.
    fn none(&self) -> Box<dyn QuerySet>;

    /// Compile the queryset.
    fn compile(&self) -> CompiledQuery;
}

/// Column type used to convert raw lookup values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Integer,
    Float,
    Text,
    Boolean,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer => write!(f, "integer"),
            Self::Float => write!(f, "float"),
            Self::Text => write!(f, "text"),
            Self::Boolean => write!(f, "boolean"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum SqlValue {
    Integer(i64),
    Float(f64),
    Text(String),
    Boolean(bool),
}

impl SqlValue {
    fn convert(field: &str, raw: &str, ty: FieldType) -> Result<Self, LookupError> {
        let invalid = || LookupError::InvalidValue {
            field: field.to_string(),
            value: raw.to_string(),
            expected: ty,
        };

        match ty {
            FieldType::Integer => raw.trim().parse().map(Self::Integer).map_err(|_| invalid()),
            FieldType::Float => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(Self::Float)
                .ok_or_else(invalid),
            FieldType::Text => Ok(Self::Text(raw.to_string())),
            FieldType::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(Self::Boolean(true)),
                "false" | "0" => Ok(Self::Boolean(false)),
                _ => Err(invalid()),
            },
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(i) => write!(f, "{}", i),
            Self::Float(v) => write!(f, "{:?}", v),
            Self::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Self::Boolean(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lookup {
    Exact,
    Gt,
    Gte,
    Lt,
    Lte,
    Contains,
    IContains,
    In,
}

impl Lookup {
    fn parse(suffix: &str) -> Option<Self> {
        match suffix {
            "exact" => Some(Self::Exact),
            "gt" => Some(Self::Gt),
            "gte" => Some(Self::Gte),
            "lt" => Some(Self::Lt),
            "lte" => Some(Self::Lte),
            "contains" => Some(Self::Contains),
            "icontains" => Some(Self::IContains),
            "in" => Some(Self::In),
            _ => None,
        }
    }

    fn operator(&self) -> &'static str {
        match self {
            Self::Exact => "=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Contains | Self::IContains => "LIKE",
            Self::In => "IN",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Condition {
    column: String,
    lookup: Lookup,
    values: Vec<SqlValue>,
}

/// A single-table queryset compiling to SQL text.
///
/// # Example
///
/// ```
/// use viewkey_core::{FieldType, QuerySet, SqlQuerySet};
///
/// let products = SqlQuerySet::new("product")
///     .field("id", FieldType::Integer)
///     .field("name", FieldType::Text);
///
/// let narrowed = products.filter("pk", "5").unwrap();
/// assert_eq!(
///     narrowed.compile().sql(),
///     Some(r#"SELECT "product"."id", "product"."name" FROM "product" WHERE "product"."id" = 5"#)
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SqlQuerySet {
    table: String,
    fields: Vec<(String, FieldType)>,
    primary_key: String,
    conditions: Vec<Condition>,
    ordering: Vec<String>,
    limit: Option<usize>,
    empty: bool,
}

impl SqlQuerySet {
    /// Create a queryset over `table` with primary key `id`.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            fields: Vec::new(),
            primary_key: "id".to_string(),
            conditions: Vec::new(),
            ordering: Vec::new(),
            limit: None,
            empty: false,
        }
    }

    /// Declare a column.
    pub fn field(mut self, name: impl Into<String>, ty: FieldType) -> Self {
        self.fields.push((name.into(), ty));
        self
    }

    /// Set the primary key column (the target of `pk` lookups).
    pub fn primary_key(mut self, name: impl Into<String>) -> Self {
        self.primary_key = name.into();
        self
    }

    /// Order by a column; prefix with `-` for descending.
    pub fn order_by(mut self, field: impl Into<String>) -> Self {
        self.ordering.push(field.into());
        self
    }

    /// Limit the number of rows.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Typed counterpart of [`QuerySet::filter`].
    pub fn filter_by(&self, lookup: &str, value: &str) -> Result<Self, LookupError> {
        let (field, lookup_kind) = match lookup.split_once("__") {
            Some((field, suffix)) => (
                field,
                Lookup::parse(suffix)
                    .ok_or_else(|| LookupError::UnsupportedLookup(lookup.to_string()))?,
            ),
            None => (lookup, Lookup::Exact),
        };
        let (column, ty) = self.resolve_field(field)?;

        if matches!(lookup_kind, Lookup::Contains | Lookup::IContains) && ty != FieldType::Text {
            return Err(LookupError::UnsupportedLookup(lookup.to_string()));
        }

        let values = match lookup_kind {
            Lookup::In => value
                .split(',')
                .filter(|part| !part.trim().is_empty())
                .map(|part| SqlValue::convert(field, part.trim(), ty))
                .collect::<Result<Vec<_>, _>>()?,
            _ => vec![SqlValue::convert(field, value, ty)?],
        };

        let mut narrowed = self.clone();
        if lookup_kind == Lookup::In && values.is_empty() {
            narrowed.empty = true;
        }
        narrowed.conditions.push(Condition {
            column,
            lookup: lookup_kind,
            values,
        });
        Ok(narrowed)
    }

    /// Check for the empty sentinel.
    pub fn is_none(&self) -> bool {
        self.empty
    }

    /// Render the SQL text regardless of emptiness.
    pub fn to_sql(&self) -> String {
        let table = quote(&self.table);
        let columns = if self.fields.is_empty() {
            format!("{}.*", table)
        } else {
            self.fields
                .iter()
                .map(|(name, _)| self.column(name))
                .collect::<Vec<_>>()
                .join(", ")
        };

        let mut sql = format!("SELECT {} FROM {}", columns, table);

        match self.conditions.as_slice() {
            [] => {}
            [single] => sql.push_str(&format!(" WHERE {}", self.render_condition(single))),
            many => {
                let rendered: Vec<String> =
                    many.iter().map(|c| self.render_condition(c)).collect();
                sql.push_str(&format!(" WHERE ({})", rendered.join(" AND ")));
            }
        }

        if !self.ordering.is_empty() {
            let order: Vec<String> = self
                .ordering
                .iter()
                .map(|field| match field.strip_prefix('-') {
                    Some(name) => format!("{} DESC", self.column(name)),
                    None => format!("{} ASC", self.column(field)),
                })
                .collect();
            sql.push_str(&format!(" ORDER BY {}", order.join(", ")));
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        sql
    }

    fn resolve_field(&self, field: &str) -> Result<(String, FieldType), LookupError> {
        let name = if field == "pk" {
            self.primary_key.as_str()
        } else {
            field
        };

        self.fields
            .iter()
            .find(|(declared, _)| declared == name)
            .map(|(declared, ty)| (declared.clone(), *ty))
            .ok_or_else(|| LookupError::UnknownField(field.to_string()))
    }

    fn column(&self, name: &str) -> String {
        format!("{}.{}", quote(&self.table), quote(name))
    }

    fn render_condition(&self, condition: &Condition) -> String {
        let column = self.column(&condition.column);
        let op = condition.lookup.operator();

        match condition.lookup {
            Lookup::In => {
                let values: Vec<String> = condition.values.iter().map(|v| v.to_string()).collect();
                format!("{} {} ({})", column, op, values.join(", "))
            }
            Lookup::Contains | Lookup::IContains => {
                let needle = match condition.values.first() {
                    Some(SqlValue::Text(s)) => s.as_str(),
                    _ => "",
                };
                let pattern = SqlValue::Text(format!("%{}%", needle));
                if condition.lookup == Lookup::IContains {
                    format!("LOWER({}) {} LOWER({})", column, op, pattern)
                } else {
                    format!("{} {} {}", column, op, pattern)
                }
            }
            _ => {
                let value = condition
                    .values
                    .first()
                    .map(|v| v.to_string())
                    .unwrap_or_default();
                format!("{} {} {}", column, op, value)
            }
        }
    }
}

impl QuerySet for SqlQuerySet {
    fn filter(&self, lookup: &str, value: &str) -> Result<Box<dyn QuerySet>, LookupError> {
        Ok(Box::new(self.filter_by(lookup, value)?))
    }

    fn none(&self) -> Box<dyn QuerySet> {
        let mut empty = self.clone();
        empty.empty = true;
        Box::new(empty)
    }

    fn compile(&self) -> CompiledQuery {
        if self.empty {
            CompiledQuery::Empty
        } else {
            CompiledQuery::NonEmpty(self.to_sql())
        }
    }
}

fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}
