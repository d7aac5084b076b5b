//! Type mapping for Cloud Spanner.
//!
//! Abstract changelog types are parsed into a [`TypeDescriptor`], converted
//! to a canonical type, and rendered for the target dialect.
//!
//! # Usage
//!
//! ```rust,ignore
//! let mapping = SpannerTypeMapper.resolve("varchar(100)", DatabaseDialect::GoogleStandardSql);
//! assert_eq!(mapping.target_type, "STRING(100)");
//! ```

pub mod canonical;
mod typemap;

pub use canonical::{CanonicalType, Length, TypeDescriptor};
pub use typemap::SpannerTypeMapper;
