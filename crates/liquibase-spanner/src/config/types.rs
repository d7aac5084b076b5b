//! Configuration type definitions.

use serde::{Deserialize, Serialize};

use crate::drivers::spanner::DatabaseDialect;

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Target database.
    pub database: DatabaseConfig,

    /// Changelog tracking tables.
    #[serde(default)]
    pub changelog: ChangelogConfig,

    /// How rendered SQL is written out.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Target Cloud Spanner database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL, e.g.
    /// `jdbc:cloudspanner:/projects/p/instances/i/databases/d`.
    pub url: String,

    /// SQL surface of the database (default: google_standard_sql).
    #[serde(default)]
    pub dialect: DatabaseDialect,

    /// Major version of the driver opening the connection (default: 2).
    #[serde(default = "default_driver_major_version")]
    pub driver_major_version: u32,

    /// Catalog used for INFORMATION_SCHEMA lookups (default: "").
    #[serde(default)]
    pub catalog: String,

    /// Schema used for INFORMATION_SCHEMA lookups (default: "").
    #[serde(default)]
    pub schema: String,
}

/// Names of the changelog tracking tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangelogConfig {
    /// Changelog table (default: DATABASECHANGELOG).
    #[serde(default = "default_changelog_table")]
    pub table_name: String,

    /// Changelog lock table (default: DATABASECHANGELOGLOCK).
    #[serde(default = "default_lock_table")]
    pub lock_table_name: String,
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        Self {
            table_name: default_changelog_table(),
            lock_table_name: default_lock_table(),
        }
    }
}

/// Rendered SQL output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Delimiter written after each statement (default: ";").
    #[serde(default = "default_end_delimiter")]
    pub end_delimiter: String,

    /// Wrap runs of DDL in `START BATCH DDL` / `RUN BATCH` (default: false).
    #[serde(default)]
    pub batch_ddl: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            end_delimiter: default_end_delimiter(),
            batch_ddl: false,
        }
    }
}

// Default value functions for serde
fn default_driver_major_version() -> u32 {
    2
}

fn default_changelog_table() -> String {
    "DATABASECHANGELOG".to_string()
}

fn default_lock_table() -> String {
    "DATABASECHANGELOGLOCK".to_string()
}

fn default_end_delimiter() -> String {
    ";".to_string()
}
