//! Cloud Spanner SQL dialect (Strategy pattern).
//!
//! Provides identifier escaping, literal rendering and function recognition
//! for both Spanner surface syntaxes. Every generator goes through this type
//! rather than formatting names or values itself.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::core::identifier::{escape_googlesql, escape_postgres};
use crate::core::statement::TableRef;
use crate::core::value::ColumnValue;
use crate::error::{MigrateError, Result};

/// Short name of the database, used in validation messages and logs.
pub const SHORT_NAME: &str = "cloudspanner";

/// Default emulator/port number for Spanner connection URLs.
pub const DEFAULT_PORT: u16 = 9010;

/// The SQL surface syntax of a Spanner database.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseDialect {
    /// Native GoogleSQL syntax (`STRING(MAX)`, `INT64`, backtick quoting).
    #[default]
    GoogleStandardSql,
    /// PostgreSQL-compatible interface (`varchar`, `bigint`, double quotes).
    Postgresql,
}

impl DatabaseDialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseDialect::GoogleStandardSql => "google_standard_sql",
            DatabaseDialect::Postgresql => "postgresql",
        }
    }

    pub fn is_postgresql(&self) -> bool {
        matches!(self, DatabaseDialect::Postgresql)
    }
}

impl fmt::Display for DatabaseDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatabaseDialect {
    type Err = MigrateError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "google_standard_sql" | "googlesql" | "native" => Ok(DatabaseDialect::GoogleStandardSql),
            "postgresql" | "postgres" | "pg" => Ok(DatabaseDialect::Postgresql),
            other => Err(MigrateError::Config(format!(
                "Unknown database dialect: '{}'. Supported dialects: google_standard_sql, postgresql",
                other
            ))),
        }
    }
}

/// Whether a column name is rendered with a leading `COLUMN` keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKeyword {
    Include,
    Omit,
}

/// Spanner dialect implementation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpannerDialect {
    dialect: DatabaseDialect,
}

impl SpannerDialect {
    /// Create a new dialect instance.
    pub fn new(dialect: DatabaseDialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> DatabaseDialect {
        self.dialect
    }

    pub fn is_postgresql(&self) -> bool {
        self.dialect.is_postgresql()
    }

    pub fn short_name(&self) -> &'static str {
        SHORT_NAME
    }

    pub fn default_port(&self) -> u16 {
        DEFAULT_PORT
    }

    /// Escape any object name (table, column, index, view, sequence).
    pub fn escape_object_name(&self, name: &str) -> Result<String> {
        match self.dialect {
            DatabaseDialect::GoogleStandardSql => escape_googlesql(name),
            DatabaseDialect::Postgresql => escape_postgres(name),
        }
    }

    /// Escape a table reference. Spanner has no user-visible catalogs and
    /// tables are addressed by name only.
    pub fn escape_table_name(&self, table: &TableRef) -> Result<String> {
        self.escape_object_name(&table.table_name)
    }

    /// Escape a column name, optionally prefixed with `COLUMN`.
    pub fn escape_column_name(&self, name: &str, keyword: ColumnKeyword) -> Result<String> {
        let escaped = self.escape_object_name(name)?;
        Ok(match keyword {
            ColumnKeyword::Include => format!("COLUMN {}", escaped),
            ColumnKeyword::Omit => escaped,
        })
    }

    /// Escape a comma separated list of column names.
    pub fn escape_column_list(&self, names: &[String]) -> Result<String> {
        let escaped = names
            .iter()
            .map(|n| self.escape_object_name(n.trim()))
            .collect::<Result<Vec<_>>>()?;
        Ok(escaped.join(", "))
    }

    /// Escape the contents of a string literal.
    ///
    /// GoogleSQL uses backslash escapes; the PostgreSQL interface doubles quotes.
    pub fn escape_string(&self, value: &str) -> String {
        match self.dialect {
            DatabaseDialect::GoogleStandardSql => value.replace('\\', "\\\\").replace('\'', "\\'"),
            DatabaseDialect::Postgresql => value.replace('\'', "''"),
        }
    }

    /// A quoted string literal.
    pub fn string_literal(&self, value: &str) -> String {
        format!("'{}'", self.escape_string(value))
    }

    pub fn boolean_literal(&self, value: bool) -> &'static str {
        if value {
            "TRUE"
        } else {
            "FALSE"
        }
    }

    pub fn date_literal(&self, value: NaiveDate) -> String {
        let iso = value.format("%Y-%m-%d");
        match self.dialect {
            DatabaseDialect::GoogleStandardSql => format!("DATE '{}'", iso),
            DatabaseDialect::Postgresql => format!("'{}'::date", iso),
        }
    }

    /// A timestamp literal. Naive timestamps are interpreted as UTC.
    pub fn timestamp_literal(&self, value: NaiveDateTime) -> String {
        let iso = value.format("%Y-%m-%dT%H:%M:%S%.fZ");
        match self.dialect {
            DatabaseDialect::GoogleStandardSql => format!("TIMESTAMP '{}'", iso),
            DatabaseDialect::Postgresql => format!("'{}'::timestamptz", iso),
        }
    }

    pub fn current_datetime_function(&self) -> &'static str {
        "CURRENT_TIMESTAMP()"
    }

    /// Expression returning the next value of a sequence.
    pub fn sequence_next_value(&self, sequence: &str) -> Result<String> {
        let name = self.escape_object_name(sequence)?;
        Ok(match self.dialect {
            DatabaseDialect::GoogleStandardSql => {
                format!("GET_NEXT_SEQUENCE_VALUE(SEQUENCE {})", name)
            }
            DatabaseDialect::Postgresql => format!("nextval('{}')", self.escape_string(&name)),
        })
    }

    /// Render a changelog value as SQL.
    ///
    /// Text that looks like a function call is emitted verbatim.
    pub fn value_to_sql(&self, value: &ColumnValue) -> Result<String> {
        Ok(match value {
            ColumnValue::Null => "NULL".to_string(),
            ColumnValue::Boolean(b) => self.boolean_literal(*b).to_string(),
            ColumnValue::Number(n) => n.normalize().to_string(),
            ColumnValue::Text(s) if s.eq_ignore_ascii_case("NULL") => "NULL".to_string(),
            ColumnValue::Text(s) if self.is_function(s) => s.clone(),
            ColumnValue::Text(s) => self.string_literal(s),
            ColumnValue::Date(d) => self.date_literal(*d),
            ColumnValue::Timestamp(ts) => self.timestamp_literal(*ts),
            ColumnValue::Function(f) | ColumnValue::Computed(f) => f.clone(),
            ColumnValue::SequenceNext(seq) => self.sequence_next_value(seq)?,
        })
    }

    /// Whether `value` is a database function call rather than a literal.
    pub fn is_function(&self, value: &str) -> bool {
        let trimmed = value.trim();
        if let Some(name) = trimmed.strip_suffix("()") {
            return !name.is_empty()
                && name
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
        }
        ["CURRENT_TIMESTAMP", "CURRENT_DATE", "CURRENT_TIME"]
            .iter()
            .any(|f| f.eq_ignore_ascii_case(trimmed))
    }
}
