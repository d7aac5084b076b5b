//! Cloud Spanner driver.
//!
//! This module provides Spanner-specific implementations:
//!
//! - [`SpannerDialect`]: identifier escaping and literal rendering per dialect
//! - [`InformationSchemaReader`]: schema lookups over INFORMATION_SCHEMA
//! - [`OfflineSchemaReader`]: reader for rendering SQL without a connection

mod dialect;
mod reader;

pub use dialect::{ColumnKeyword, DatabaseDialect, SpannerDialect, DEFAULT_PORT, SHORT_NAME};
pub use reader::{InformationSchemaReader, OfflineSchemaReader};

pub(crate) use reader::{
    COLUMN_DEFAULT_QUERY, FOREIGN_KEYS_QUERY, NULLABILITY_QUERY, SPANNER_TYPE_QUERY,
};

#[cfg(test)]
pub(crate) use reader::tests::FakeMetadataSource;
