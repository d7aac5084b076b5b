//! Core abstractions for dialect-aware statement generation.
//!
//! This module provides the foundational types and traits used throughout
//! the library:
//!
//! - [`statement`]: abstract schema-change statements and SQL fragments
//! - [`schema`]: snapshot types for tables, columns, indexes and sequences
//! - [`value`]: changelog values and metadata result rows
//! - [`identifier`]: identifier validation and quoting
//! - [`traits`]: generator, reader and type-mapper seams
//! - [`catalog`]: generator registry for dependency injection
//!
//! # Architecture
//!
//! The core module defines engine-independent abstractions. Spanner rules
//! live in `generators`, `dialect` and `drivers/spanner`, and plug into the
//! [`GeneratorRegistry`] by statement kind and priority.

pub mod catalog;
pub mod identifier;
pub mod schema;
pub mod statement;
pub mod traits;
pub mod value;

// Re-export commonly used types for convenience
pub use catalog::{GeneratorContext, GeneratorRegistry};
pub use schema::{
    Column, ColumnDefault, DatabaseSnapshot, ForeignKey, Index, Schema, Sequence, Table,
};
pub use statement::{
    ColumnAssignment, ColumnDefinition, ColumnRef, DatabaseObject, Sql, Statement, StatementKind,
    TableRef,
};
pub use traits::{
    MetadataSource, SchemaReader, SqlGenerator, TypeMapper, TypeMapping, ValidationErrors,
    PRIORITY_DATABASE, PRIORITY_DEFAULT,
};
pub use value::{ColumnValue, MetaValue, MetadataRow};
