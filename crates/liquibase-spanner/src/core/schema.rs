//! Snapshot types mirroring live Spanner schema objects.
//!
//! These types are built by the [`SnapshotAdapter`](crate::snapshot::SnapshotAdapter)
//! from INFORMATION_SCHEMA rows and consumed by diff and changelog tooling.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Table metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Schema name ("" for the default schema).
    pub schema: String,

    /// Table name.
    pub name: String,

    /// Column definitions in ordinal order.
    pub columns: Vec<Column>,

    /// Primary key column names in key order.
    pub primary_key: Vec<String>,

    /// Parent table when this table is interleaved.
    pub interleaved_in: Option<String>,

    /// Secondary and primary-key indexes.
    pub indexes: Vec<Index>,

    /// Named foreign key constraints.
    pub foreign_keys: Vec<ForeignKey>,
}

impl Table {
    /// Get the fully qualified table name.
    pub fn full_name(&self) -> String {
        if self.schema.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.schema, self.name)
        }
    }

    /// Check if the table has a primary key.
    pub fn has_pk(&self) -> bool {
        !self.primary_key.is_empty()
    }

    /// Look up a column by name (case-insensitive).
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }
}

/// Column metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,

    /// Data type as reported for the dialect (e.g., "STRING(MAX)", "varchar").
    pub data_type: String,

    /// Whether the column allows NULL.
    pub is_nullable: bool,

    /// Ordinal position (1-based).
    pub ordinal_pos: i32,

    /// Column default, classified as literal or function.
    pub default_value: Option<ColumnDefault>,
}

/// A column default read back from the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum ColumnDefault {
    /// Literal default text, e.g. `'unknown'` or `0`.
    Literal(String),
    /// Built-in function call, e.g. `CURRENT_TIMESTAMP()`.
    Function(String),
}

impl ColumnDefault {
    /// The raw default text.
    pub fn text(&self) -> &str {
        match self {
            ColumnDefault::Literal(s) | ColumnDefault::Function(s) => s,
        }
    }
}

/// Index metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    /// Index name.
    pub name: String,

    /// Table the index belongs to.
    pub table: String,

    /// Key columns in key order.
    pub columns: Vec<String>,

    /// Descending flag per key column.
    pub descending: Vec<bool>,

    /// Non-key columns stored with the index (`STORING`).
    pub included_columns: Vec<String>,

    /// Whether the index is unique.
    pub is_unique: bool,

    /// Whether this is the table's primary key index.
    pub is_clustered: bool,
}

impl Index {
    /// Whether the key columns match `columns` (case-insensitive).
    pub fn has_columns(&self, columns: &[String]) -> bool {
        self.columns.len() == columns.len()
            && self
                .columns
                .iter()
                .zip(columns)
                .all(|(a, b)| a.eq_ignore_ascii_case(b))
    }
}

/// Foreign key constraint metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Constraint name.
    pub name: String,

    /// Table the constraint is declared on.
    pub table: String,

    /// Referencing columns.
    pub columns: Vec<String>,

    /// Referenced table.
    pub ref_table: String,

    /// Referenced columns.
    pub ref_columns: Vec<String>,
}

/// Bit-reversed sequence metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence {
    pub name: String,
    pub kind: Option<String>,
    pub skip_range_min: Option<i64>,
    pub skip_range_max: Option<i64>,
    pub start_value: Option<i64>,
}

/// Schema metadata with free-form attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Schema name ("" for the default schema).
    pub name: String,

    /// Attributes attached by the caller, e.g. `catalog`.
    pub attributes: BTreeMap<String, String>,
}

impl Schema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// Everything captured by one snapshot pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSnapshot {
    pub schema: Schema,
    pub tables: Vec<Table>,
    pub sequences: Vec<Sequence>,
}

impl DatabaseSnapshot {
    /// Look up a table by name (case-insensitive).
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }
}
