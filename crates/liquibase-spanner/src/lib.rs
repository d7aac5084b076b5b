//! # liquibase-spanner
//!
//! Cloud Spanner dialect rules for changelog-driven schema migrations.
//!
//! This library turns abstract schema-change statements into SQL that Cloud
//! Spanner accepts, for both its GoogleSQL and PostgreSQL interfaces:
//!
//! - **Statement generators** with Spanner overrides chosen by priority
//! - **Type mapping** from abstract changelog types to Spanner types
//! - **Unsupported-feature gate** rejecting statements Spanner cannot run
//! - **Snapshot adapter** reading schemas from INFORMATION_SCHEMA
//! - **Connection shim** adding the client user agent and DDL batching
//!
//! ## Example
//!
//! ```rust,no_run
//! use liquibase_spanner::{
//!     ChangeLog, DatabaseDialect, GeneratorContext, GeneratorRegistry, OfflineSchemaReader,
//! };
//!
//! fn main() -> liquibase_spanner::Result<()> {
//!     let registry = GeneratorRegistry::with_builtins();
//!     let reader = OfflineSchemaReader;
//!     let ctx = GeneratorContext::new(DatabaseDialect::GoogleStandardSql, &registry, &reader);
//!     for change_set in ChangeLog::load("changelog.yaml")?.render(&ctx)? {
//!         print!("{}", change_set.script());
//!     }
//!     Ok(())
//! }
//! ```

pub mod changelog;
pub mod config;
pub mod connection;
pub mod core;
pub mod dialect;
pub mod drivers;
pub mod error;
pub mod generators;
pub mod snapshot;

// Re-exports for convenient access
pub use changelog::{ChangeLog, ChangeSet, ChangesetSql};
pub use config::{ChangelogConfig, Config, DatabaseConfig, OutputConfig};
pub use connection::{batch_statements, with_user_agent, DatabaseConnection, SpannerConnection};
pub use crate::core::{GeneratorContext, GeneratorRegistry, Sql, Statement, StatementKind};
pub use dialect::SpannerTypeMapper;
pub use drivers::spanner::{
    DatabaseDialect, InformationSchemaReader, OfflineSchemaReader, SpannerDialect,
};
pub use error::{MigrateError, Result};
pub use snapshot::SnapshotAdapter;
