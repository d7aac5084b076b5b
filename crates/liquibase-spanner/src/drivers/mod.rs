//! Database driver implementations.
//!
//! - [`spanner`]: Cloud Spanner dialect, schema readers and metadata queries
//!
//! # Architecture
//!
//! A driver module provides the SQL syntax strategy for its engine and the
//! readers that answer schema lookups through a
//! [`MetadataSource`](crate::core::MetadataSource). Generators only talk to
//! these through the seams in [`crate::core::traits`].

pub mod spanner;

pub use spanner::{DatabaseDialect, SpannerDialect};
