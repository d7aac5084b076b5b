//! Spanner type mapper.
//!
//! Composes [`AbstractToCanonical`] with the renderer for the target dialect.
//! The mapper is stateless; the dialect is passed per call so a single
//! instance serves both Spanner surface syntaxes.

use tracing::warn;

use crate::core::traits::{TypeMapper, TypeMapping};
use crate::drivers::spanner::DatabaseDialect;

use super::canonical::{
    compose, AbstractToCanonical, FromCanonical, GoogleSqlFromCanonical, PostgresFromCanonical,
    TypeDescriptor,
};

/// Maps abstract changelog types to Spanner types.
///
/// Unrecognized types return `None` from [`TypeMapper::map_type`] and are
/// passed through unchanged by [`TypeMapper::resolve`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SpannerTypeMapper;

impl SpannerTypeMapper {
    pub fn new() -> Self {
        Self
    }

    fn renderer(dialect: DatabaseDialect) -> &'static dyn FromCanonical {
        match dialect {
            DatabaseDialect::GoogleStandardSql => &GoogleSqlFromCanonical,
            DatabaseDialect::Postgresql => &PostgresFromCanonical,
        }
    }
}

impl TypeMapper for SpannerTypeMapper {
    fn map_type(
        &self,
        descriptor: &TypeDescriptor,
        dialect: DatabaseDialect,
    ) -> Option<TypeMapping> {
        let mapping = compose(&AbstractToCanonical, Self::renderer(dialect), descriptor)?;
        if let Some(warning) = &mapping.warning {
            warn!(
                "Type {} mapped to {} ({}): {}",
                descriptor, mapping.target_type, dialect, warning
            );
        }
        Some(mapping)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn native(text: &str) -> String {
        SpannerTypeMapper
            .resolve(text, DatabaseDialect::GoogleStandardSql)
            .target_type
    }

    fn pg(text: &str) -> String {
        SpannerTypeMapper
            .resolve(text, DatabaseDialect::Postgresql)
            .target_type
    }

    // =========================================================================
    // GoogleSQL
    // =========================================================================

    #[test]
    fn test_native_scalars() {
        assert_eq!(native("boolean"), "BOOL");
        assert_eq!(native("int"), "INT64");
        assert_eq!(native("BIGINT"), "INT64");
        assert_eq!(native("real"), "FLOAT32");
        assert_eq!(native("double precision"), "FLOAT64");
        assert_eq!(native("decimal"), "NUMERIC");
        assert_eq!(native("date"), "DATE");
        assert_eq!(native("datetime"), "TIMESTAMP");
        assert_eq!(native("json"), "JSON");
        assert_eq!(native("uuid"), "STRING(36)");
    }

    #[test]
    fn test_native_strings_and_bytes() {
        assert_eq!(native("varchar"), "STRING(MAX)");
        assert_eq!(native("varchar(255)"), "STRING(255)");
        assert_eq!(native("STRING(MAX)"), "STRING(MAX)");
        assert_eq!(native("char"), "STRING(1)");
        assert_eq!(native("clob"), "STRING(MAX)");
        assert_eq!(native("blob"), "BYTES(MAX)");
        assert_eq!(native("varbinary(16)"), "BYTES(16)");
    }

    #[test]
    fn test_native_arrays() {
        assert_eq!(native("ARRAY<STRING>(100)"), "ARRAY<STRING(100)>");
        assert_eq!(native("array<int64>"), "ARRAY<INT64>");
        assert_eq!(native("varchar(100)[]"), "ARRAY<STRING(100)>");
    }

    // =========================================================================
    // PostgreSQL
    // =========================================================================

    #[test]
    fn test_pg_types() {
        assert_eq!(pg("boolean"), "boolean");
        assert_eq!(pg("INT64"), "bigint");
        assert_eq!(pg("double"), "float8");
        assert_eq!(pg("varchar(100)"), "varchar(100)");
        assert_eq!(pg("varchar(MAX)"), "varchar");
        assert_eq!(pg("blob"), "bytea");
        assert_eq!(pg("json"), "jsonb");
        assert_eq!(pg("timestamp"), "timestamptz");
        assert_eq!(pg("ARRAY<STRING>(100)"), "varchar(100)[]");
    }

    // =========================================================================
    // Fallback and lossy mappings
    // =========================================================================

    #[test]
    fn test_unknown_types_pass_through() {
        assert_eq!(native("  GEOGRAPHY "), "GEOGRAPHY");
        assert_eq!(pg("tokenlist"), "tokenlist");
        assert!(SpannerTypeMapper
            .map_type(
                &TypeDescriptor::parse("varchar(10, 2)"),
                DatabaseDialect::GoogleStandardSql
            )
            .is_none());
    }

    #[test]
    fn test_lossy_mappings_carry_warning() {
        let mapping = SpannerTypeMapper.resolve("numeric(10,2)", DatabaseDialect::Postgresql);
        assert_eq!(mapping.target_type, "numeric");
        assert!(mapping.is_lossy);

        let mapping = SpannerTypeMapper.resolve("time", DatabaseDialect::GoogleStandardSql);
        assert_eq!(mapping.target_type, "TIMESTAMP");
        assert!(mapping.warning.is_some());
    }
}
