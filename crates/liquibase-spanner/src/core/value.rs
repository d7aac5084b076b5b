//! Value types flowing into and out of the dialect rules.
//!
//! - [`ColumnValue`]: a typed value from a changelog (DML values, defaults)
//! - [`MetadataRow`]: one result row from an INFORMATION_SCHEMA query

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A value supplied by a changelog for an insert, update or column default.
///
/// The variant decides how the value is rendered as SQL: literals are quoted
/// and escaped per dialect, functions and computed expressions are emitted
/// verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnValue {
    /// SQL NULL.
    Null,

    /// Boolean literal.
    Boolean(bool),

    /// Exact numeric literal.
    Number(Decimal),

    /// String literal.
    Text(String),

    /// Date literal (no time component).
    Date(NaiveDate),

    /// Timestamp literal.
    Timestamp(NaiveDateTime),

    /// Built-in database function call, e.g. `GENERATE_UUID()`.
    Function(String),

    /// Arbitrary SQL expression computed by the database.
    Computed(String),

    /// Next value of the named sequence.
    SequenceNext(String),
}

impl ColumnValue {
    /// Whether this value is a literal (as opposed to an expression).
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            ColumnValue::Null
                | ColumnValue::Boolean(_)
                | ColumnValue::Number(_)
                | ColumnValue::Text(_)
                | ColumnValue::Date(_)
                | ColumnValue::Timestamp(_)
        )
    }

    /// Short label used in log and validation messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ColumnValue::Null => "null",
            ColumnValue::Boolean(_) => "boolean",
            ColumnValue::Number(_) => "number",
            ColumnValue::Text(_) => "text",
            ColumnValue::Date(_) => "date",
            ColumnValue::Timestamp(_) => "timestamp",
            ColumnValue::Function(_) => "function",
            ColumnValue::Computed(_) => "computed",
            ColumnValue::SequenceNext(_) => "sequenceNext",
        }
    }
}

impl From<bool> for ColumnValue {
    fn from(v: bool) -> Self {
        ColumnValue::Boolean(v)
    }
}

impl From<i64> for ColumnValue {
    fn from(v: i64) -> Self {
        ColumnValue::Number(Decimal::from(v))
    }
}

impl From<i32> for ColumnValue {
    fn from(v: i32) -> Self {
        ColumnValue::Number(Decimal::from(v))
    }
}

impl From<&str> for ColumnValue {
    fn from(v: &str) -> Self {
        ColumnValue::Text(v.to_string())
    }
}

impl From<String> for ColumnValue {
    fn from(v: String) -> Self {
        ColumnValue::Text(v)
    }
}

/// A single cell of a metadata result row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaValue {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
}

impl From<&str> for MetaValue {
    fn from(v: &str) -> Self {
        MetaValue::Text(v.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(v: String) -> Self {
        MetaValue::Text(v)
    }
}

impl From<i64> for MetaValue {
    fn from(v: i64) -> Self {
        MetaValue::Int(v)
    }
}

impl From<bool> for MetaValue {
    fn from(v: bool) -> Self {
        MetaValue::Bool(v)
    }
}

impl<T: Into<MetaValue>> From<Option<T>> for MetaValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(MetaValue::Null, Into::into)
    }
}

/// One row returned by a [`MetadataSource`](crate::core::MetadataSource).
///
/// Column lookups are case-insensitive because the two dialects report
/// INFORMATION_SCHEMA column names in different cases.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataRow {
    values: HashMap<String, MetaValue>,
}

impl MetadataRow {
    /// Create an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    #[must_use]
    pub fn with(mut self, column: &str, value: impl Into<MetaValue>) -> Self {
        self.set(column, value);
        self
    }

    /// Set a column value.
    pub fn set(&mut self, column: &str, value: impl Into<MetaValue>) {
        self.values.insert(column.to_ascii_uppercase(), value.into());
    }

    /// Raw cell access.
    pub fn get(&self, column: &str) -> Option<&MetaValue> {
        self.values.get(&column.to_ascii_uppercase())
    }

    /// String value of a column, `None` for NULL or missing.
    pub fn get_str(&self, column: &str) -> Option<&str> {
        match self.get(column) {
            Some(MetaValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Integer value of a column. Numeric text is parsed.
    pub fn get_i64(&self, column: &str) -> Option<i64> {
        match self.get(column) {
            Some(MetaValue::Int(v)) => Some(*v),
            Some(MetaValue::Text(s)) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Boolean value of a column. `YES`/`NO` and `true`/`false` text is accepted.
    pub fn get_bool(&self, column: &str) -> Option<bool> {
        match self.get(column) {
            Some(MetaValue::Bool(v)) => Some(*v),
            Some(MetaValue::Int(v)) => Some(*v != 0),
            Some(MetaValue::Text(s)) => match s.trim().to_ascii_uppercase().as_str() {
                "YES" | "TRUE" | "Y" => Some(true),
                "NO" | "FALSE" | "N" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }
}
