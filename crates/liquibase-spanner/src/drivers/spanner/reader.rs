//! INFORMATION_SCHEMA backed schema reader.
//!
//! Runs the fixed metadata queries generators need while producing SQL.
//! Query text and positional parameter order are part of the contract with
//! the database and must not change.

use tracing::debug;

use crate::core::statement::{ColumnRef, TableRef};
use crate::core::traits::{MetadataSource, SchemaReader};
use crate::error::{MigrateError, Result};

pub(crate) const NULLABILITY_QUERY: &str = "SELECT IS_NULLABLE FROM INFORMATION_SCHEMA.COLUMNS WHERE TABLE_CATALOG=? AND TABLE_SCHEMA=? AND TABLE_NAME=? AND COLUMN_NAME=?";

pub(crate) const FOREIGN_KEYS_QUERY: &str = "SELECT CONSTRAINT_NAME FROM INFORMATION_SCHEMA.TABLE_CONSTRAINTS WHERE TABLE_CATALOG=? AND TABLE_SCHEMA=? AND TABLE_NAME=? AND CONSTRAINT_TYPE='FOREIGN KEY'";

pub(crate) const COLUMN_DEFAULT_QUERY: &str = "SELECT DISTINCT COLUMN_DEFAULT AS COLUMN_DEF FROM INFORMATION_SCHEMA.COLUMNS WHERE TABLE_CATALOG = ? AND TABLE_SCHEMA = ? AND TABLE_NAME = ? AND COLUMN_NAME = ?";

pub(crate) const SPANNER_TYPE_QUERY: &str = "SELECT SPANNER_TYPE FROM INFORMATION_SCHEMA.COLUMNS\nWHERE TABLE_SCHEMA = ?\nAND TABLE_NAME = ?\nAND COLUMN_NAME = ?";

/// Schema reader that queries INFORMATION_SCHEMA through a [`MetadataSource`].
pub struct InformationSchemaReader<'a> {
    source: &'a dyn MetadataSource,
}

impl<'a> InformationSchemaReader<'a> {
    pub fn new(source: &'a dyn MetadataSource) -> Self {
        Self { source }
    }
}

impl SchemaReader for InformationSchemaReader<'_> {
    fn is_nullable(&self, column: &ColumnRef) -> Result<bool> {
        debug!("Looking up nullability of {}", column);
        let rows = self
            .source
            .query(
                NULLABILITY_QUERY,
                &[
                    column.table.catalog_or_default(),
                    column.table.schema_or_default(),
                    &column.table.table_name,
                    &column.column_name,
                ],
            )
            .map_err(|e| {
                MigrateError::metadata_with(
                    format!(
                        "Could not retrieve column information for column {}",
                        column
                    ),
                    e,
                )
            })?;

        let row = rows
            .first()
            .ok_or_else(|| MigrateError::metadata(format!("Column not found: {}", column)))?;
        Ok(row
            .get_str("IS_NULLABLE")
            .is_some_and(|v| v.eq_ignore_ascii_case("YES")))
    }

    fn foreign_key_names(&self, table: &TableRef) -> Result<Vec<String>> {
        debug!("Looking up foreign keys of {}", table);
        let rows = self
            .source
            .query(
                FOREIGN_KEYS_QUERY,
                &[
                    table.catalog_or_default(),
                    table.schema_or_default(),
                    &table.table_name,
                ],
            )
            .map_err(|e| {
                MigrateError::metadata_with(
                    format!(
                        "Could not retrieve foreign keys for table {}",
                        table.table_name
                    ),
                    e,
                )
            })?;

        Ok(rows
            .iter()
            .filter_map(|row| row.get_str("CONSTRAINT_NAME").map(str::to_string))
            .collect())
    }

    fn column_default(&self, column: &ColumnRef) -> Result<Option<String>> {
        let rows = self
            .source
            .query(
                COLUMN_DEFAULT_QUERY,
                &[
                    column.table.catalog_or_default(),
                    column.table.schema_or_default(),
                    &column.table.table_name,
                    &column.column_name,
                ],
            )
            .map_err(|e| {
                MigrateError::metadata_with(
                    format!("Error fetching default value of column {}", column),
                    e,
                )
            })?;

        Ok(rows
            .first()
            .and_then(|row| row.get_str("COLUMN_DEF"))
            .map(str::to_string))
    }

    fn spanner_type(&self, column: &ColumnRef) -> Result<Option<String>> {
        let rows = self
            .source
            .query(
                SPANNER_TYPE_QUERY,
                &[
                    column.table.schema_or_default(),
                    &column.table.table_name,
                    &column.column_name,
                ],
            )
            .map_err(|e| {
                MigrateError::metadata_with(
                    format!("Error fetching data type of column {}", column),
                    e,
                )
            })?;

        Ok(rows
            .first()
            .and_then(|row| row.get_str("SPANNER_TYPE"))
            .map(str::to_string))
    }
}

/// Schema reader for offline SQL rendering. Every lookup fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineSchemaReader;

impl OfflineSchemaReader {
    fn refuse(what: &str) -> MigrateError {
        MigrateError::metadata(format!(
            "{} requires a live database connection and cannot be rendered offline",
            what
        ))
    }
}

impl SchemaReader for OfflineSchemaReader {
    fn is_nullable(&self, column: &ColumnRef) -> Result<bool> {
        Err(Self::refuse(&format!("Nullability lookup of {}", column)))
    }

    fn foreign_key_names(&self, table: &TableRef) -> Result<Vec<String>> {
        Err(Self::refuse(&format!("Foreign key lookup of {}", table)))
    }

    fn column_default(&self, column: &ColumnRef) -> Result<Option<String>> {
        Err(Self::refuse(&format!("Default value lookup of {}", column)))
    }

    fn spanner_type(&self, column: &ColumnRef) -> Result<Option<String>> {
        Err(Self::refuse(&format!("Data type lookup of {}", column)))
    }
}
