//! Hub-and-spoke canonical type system for Spanner type mapping.
//!
//! Abstract changelog types (`varchar(100)`, `ARRAY<STRING>(100)`,
//! `decimal(10,2)`, ...) are first parsed into a [`TypeDescriptor`], then
//! converted to a small [`CanonicalType`] vocabulary, and finally rendered
//! per dialect:
//!
//! ```text
//! changelog text  →  TypeDescriptor  →  CanonicalType  →  GoogleSQL / PostgreSQL
//! "varchar(100)"  →  VARCHAR [100]   →  String(100)    →  STRING(100) / varchar(100)
//! ```
//!
//! Each direction is a trait ([`ToCanonical`], [`FromCanonical`]) so the two
//! dialect renderers can be tested independently.

use std::fmt;

use crate::core::traits::TypeMapping;

/// An abstract type name with its parameters, as written in a changelog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    /// Upper-cased base name with whitespace collapsed (e.g. `DOUBLE PRECISION`).
    /// Arrays use the name `ARRAY`.
    pub name: String,

    /// Raw parameters, e.g. `["10", "2"]` or `["MAX"]`.
    pub params: Vec<String>,

    /// Element type for arrays.
    pub element: Option<Box<TypeDescriptor>>,
}

impl TypeDescriptor {
    /// Parse abstract type text.
    ///
    /// Array forms are normalized so that a length parameter written outside
    /// the array (`ARRAY<STRING>(100)`, `varchar[](100)`) lands on the
    /// element type.
    pub fn parse(text: &str) -> Self {
        let mut s = text.trim();
        let mut pg_array = false;
        if let Some(stripped) = s.strip_suffix("[]") {
            pg_array = true;
            s = stripped.trim_end();
        }

        let (base, params) = split_params(s);
        let mut base = base.trim();
        if let Some(stripped) = base.strip_suffix("[]") {
            pg_array = true;
            base = stripped.trim_end();
        }

        if pg_array {
            return Self::array(Self::scalar(base, params));
        }

        let upper = base.to_ascii_uppercase();
        if upper.starts_with("ARRAY<") && upper.ends_with('>') {
            let mut element = Self::parse(&base[6..base.len() - 1]);
            if element.params.is_empty() && element.element.is_none() {
                element.params = params;
            }
            return Self::array(element);
        }

        Self::scalar(base, params)
    }

    fn scalar(name: &str, params: Vec<String>) -> Self {
        Self {
            name: name
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
                .to_ascii_uppercase(),
            params,
            element: None,
        }
    }

    fn array(element: TypeDescriptor) -> Self {
        Self {
            name: "ARRAY".to_string(),
            params: Vec::new(),
            element: Some(Box::new(element)),
        }
    }

    pub fn is_array(&self) -> bool {
        self.element.is_some()
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(element) = &self.element {
            return write!(f, "ARRAY<{}>", element);
        }
        f.write_str(&self.name)?;
        if !self.params.is_empty() {
            write!(f, "({})", self.params.join(", "))?;
        }
        Ok(())
    }
}

/// Split `NAME(p1, p2)` into `NAME` and its parameters. Text without a
/// trailing parameter list is returned unchanged.
fn split_params(s: &str) -> (&str, Vec<String>) {
    if !s.ends_with(')') {
        return (s, Vec::new());
    }
    let mut depth = 0usize;
    for (idx, ch) in s.char_indices().rev() {
        match ch {
            ')' => depth += 1,
            '(' => {
                depth -= 1;
                if depth == 0 {
                    let inner = &s[idx + 1..s.len() - 1];
                    let params = inner
                        .split(',')
                        .map(|p| p.trim().to_string())
                        .filter(|p| !p.is_empty())
                        .collect();
                    return (&s[..idx], params);
                }
            }
            _ => {}
        }
    }
    (s, Vec::new())
}

/// Length of a string or bytes column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Length {
    /// The engine's maximum (`MAX`).
    Max,
    Fixed(u32),
}

impl Length {
    /// Parse a length parameter: `MAX` (any case) or a positive integer.
    pub fn parse(param: &str) -> Option<Self> {
        if param.eq_ignore_ascii_case("MAX") {
            return Some(Length::Max);
        }
        param.parse::<u32>().ok().filter(|n| *n > 0).map(Length::Fixed)
    }
}

/// Canonical type representation shared by both Spanner dialects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanonicalType {
    Bool,
    Int64,
    Float32,
    Float64,
    Numeric,
    String(Length),
    Bytes(Length),
    Json,
    Date,
    Timestamp,
    Array(Box<CanonicalType>),
}

impl fmt::Display for CanonicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CanonicalType::Bool => write!(f, "Bool"),
            CanonicalType::Int64 => write!(f, "Int64"),
            CanonicalType::Float32 => write!(f, "Float32"),
            CanonicalType::Float64 => write!(f, "Float64"),
            CanonicalType::Numeric => write!(f, "Numeric"),
            CanonicalType::String(Length::Max) => write!(f, "String(MAX)"),
            CanonicalType::String(Length::Fixed(n)) => write!(f, "String({})", n),
            CanonicalType::Bytes(Length::Max) => write!(f, "Bytes(MAX)"),
            CanonicalType::Bytes(Length::Fixed(n)) => write!(f, "Bytes({})", n),
            CanonicalType::Json => write!(f, "Json"),
            CanonicalType::Date => write!(f, "Date"),
            CanonicalType::Timestamp => write!(f, "Timestamp"),
            CanonicalType::Array(inner) => write!(f, "Array({})", inner),
        }
    }
}

/// Result of converting an abstract type to canonical form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalTypeInfo {
    /// The canonical type representation.
    pub canonical_type: CanonicalType,
    /// Warning message if information is lost in the conversion.
    pub warning: Option<String>,
}

impl CanonicalTypeInfo {
    /// Create a lossless canonical type conversion.
    pub fn lossless(canonical_type: CanonicalType) -> Self {
        Self {
            canonical_type,
            warning: None,
        }
    }

    /// Create a lossy canonical type conversion with a warning.
    pub fn lossy(canonical_type: CanonicalType, warning: impl Into<String>) -> Self {
        Self {
            canonical_type,
            warning: Some(warning.into()),
        }
    }

    pub fn is_lossy(&self) -> bool {
        self.warning.is_some()
    }
}

/// Convert abstract changelog types to canonical types.
pub trait ToCanonical: Send + Sync {
    /// Convert a parsed type. `None` means the type is not recognized.
    fn to_canonical(&self, descriptor: &TypeDescriptor) -> Option<CanonicalTypeInfo>;
}

/// Render canonical types in one dialect.
#[allow(clippy::wrong_self_convention)]
pub trait FromCanonical: Send + Sync {
    /// Render a canonical type.
    fn from_canonical(&self, canonical: &CanonicalType) -> String;
}

/// Recognizes the abstract type names a changelog may use.
#[derive(Debug, Clone, Copy, Default)]
pub struct AbstractToCanonical;

impl ToCanonical for AbstractToCanonical {
    fn to_canonical(&self, descriptor: &TypeDescriptor) -> Option<CanonicalTypeInfo> {
        if let Some(element) = &descriptor.element {
            let inner = self.to_canonical(element)?;
            if matches!(inner.canonical_type, CanonicalType::Array(_)) {
                return None;
            }
            return Some(CanonicalTypeInfo {
                canonical_type: CanonicalType::Array(Box::new(inner.canonical_type)),
                warning: inner.warning,
            });
        }

        let name = descriptor.name.as_str();
        let info = match name {
            "BOOL" | "BOOLEAN" | "BIT" => CanonicalTypeInfo::lossless(CanonicalType::Bool),

            "INT64" | "BIGINT" | "INT" | "INTEGER" | "SMALLINT" | "TINYINT" | "MEDIUMINT"
            | "INT8" | "INT4" | "INT2" => CanonicalTypeInfo::lossless(CanonicalType::Int64),

            "FLOAT32" | "REAL" | "FLOAT4" => CanonicalTypeInfo::lossless(CanonicalType::Float32),

            "FLOAT64" | "FLOAT8" | "FLOAT" | "DOUBLE" | "DOUBLE PRECISION" => {
                CanonicalTypeInfo::lossless(CanonicalType::Float64)
            }

            "NUMERIC" | "DECIMAL" | "NUMBER" => {
                if descriptor.params.is_empty() {
                    CanonicalTypeInfo::lossless(CanonicalType::Numeric)
                } else {
                    CanonicalTypeInfo::lossy(
                        CanonicalType::Numeric,
                        format!(
                            "{}: precision and scale are fixed on Cloud Spanner and were dropped",
                            descriptor
                        ),
                    )
                }
            }

            "STRING" | "VARCHAR" | "NVARCHAR" | "VARCHAR2" | "NVARCHAR2"
            | "CHARACTER VARYING" => {
                let length = match descriptor.params.as_slice() {
                    [] => Length::Max,
                    [p] => Length::parse(p)?,
                    _ => return None,
                };
                CanonicalTypeInfo::lossless(CanonicalType::String(length))
            }

            "CHAR" | "NCHAR" | "CHARACTER" => {
                let length = match descriptor.params.as_slice() {
                    [] => Length::Fixed(1),
                    [p] => Length::parse(p)?,
                    _ => return None,
                };
                CanonicalTypeInfo::lossless(CanonicalType::String(length))
            }

            "CLOB" | "NCLOB" | "TEXT" | "LONGTEXT" | "MEDIUMTEXT" => {
                CanonicalTypeInfo::lossless(CanonicalType::String(Length::Max))
            }

            "XML" => CanonicalTypeInfo::lossy(
                CanonicalType::String(Length::Max),
                "XML is stored as plain text on Cloud Spanner",
            ),

            "UUID" | "UNIQUEIDENTIFIER" => {
                CanonicalTypeInfo::lossless(CanonicalType::String(Length::Fixed(36)))
            }

            "BYTES" | "VARBINARY" | "BINARY" => {
                let length = match descriptor.params.as_slice() {
                    [] => Length::Max,
                    [p] => Length::parse(p)?,
                    _ => return None,
                };
                CanonicalTypeInfo::lossless(CanonicalType::Bytes(length))
            }

            "BLOB" | "LONGBLOB" | "BYTEA" | "IMAGE" => {
                CanonicalTypeInfo::lossless(CanonicalType::Bytes(Length::Max))
            }

            "JSON" | "JSONB" => CanonicalTypeInfo::lossless(CanonicalType::Json),

            "DATE" => CanonicalTypeInfo::lossless(CanonicalType::Date),

            "TIMESTAMP" | "TIMESTAMPTZ" | "DATETIME" | "SMALLDATETIME" | "DATETIME2"
            | "TIMESTAMP WITH TIME ZONE" => CanonicalTypeInfo::lossless(CanonicalType::Timestamp),

            "TIME" => CanonicalTypeInfo::lossy(
                CanonicalType::Timestamp,
                "TIME has no Cloud Spanner equivalent and is stored as TIMESTAMP",
            ),

            _ => return None,
        };
        Some(info)
    }
}

/// Renders canonical types in GoogleSQL.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoogleSqlFromCanonical;

impl FromCanonical for GoogleSqlFromCanonical {
    fn from_canonical(&self, canonical: &CanonicalType) -> String {
        match canonical {
            CanonicalType::Bool => "BOOL".to_string(),
            CanonicalType::Int64 => "INT64".to_string(),
            CanonicalType::Float32 => "FLOAT32".to_string(),
            CanonicalType::Float64 => "FLOAT64".to_string(),
            CanonicalType::Numeric => "NUMERIC".to_string(),
            CanonicalType::String(Length::Max) => "STRING(MAX)".to_string(),
            CanonicalType::String(Length::Fixed(n)) => format!("STRING({})", n),
            CanonicalType::Bytes(Length::Max) => "BYTES(MAX)".to_string(),
            CanonicalType::Bytes(Length::Fixed(n)) => format!("BYTES({})", n),
            CanonicalType::Json => "JSON".to_string(),
            CanonicalType::Date => "DATE".to_string(),
            CanonicalType::Timestamp => "TIMESTAMP".to_string(),
            CanonicalType::Array(inner) => format!("ARRAY<{}>", self.from_canonical(inner)),
        }
    }
}

/// Renders canonical types for the PostgreSQL interface.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresFromCanonical;

impl FromCanonical for PostgresFromCanonical {
    fn from_canonical(&self, canonical: &CanonicalType) -> String {
        match canonical {
            CanonicalType::Bool => "boolean".to_string(),
            CanonicalType::Int64 => "bigint".to_string(),
            CanonicalType::Float32 => "real".to_string(),
            CanonicalType::Float64 => "float8".to_string(),
            CanonicalType::Numeric => "numeric".to_string(),
            CanonicalType::String(Length::Max) => "varchar".to_string(),
            CanonicalType::String(Length::Fixed(n)) => format!("varchar({})", n),
            CanonicalType::Bytes(_) => "bytea".to_string(),
            CanonicalType::Json => "jsonb".to_string(),
            CanonicalType::Date => "date".to_string(),
            CanonicalType::Timestamp => "timestamptz".to_string(),
            CanonicalType::Array(inner) => format!("{}[]", self.from_canonical(inner)),
        }
    }
}

/// Chain a [`ToCanonical`] and a [`FromCanonical`] conversion.
pub fn compose(
    to: &dyn ToCanonical,
    from: &dyn FromCanonical,
    descriptor: &TypeDescriptor,
) -> Option<TypeMapping> {
    let info = to.to_canonical(descriptor)?;
    let target = from.from_canonical(&info.canonical_type);
    Some(match info.warning {
        Some(warning) => TypeMapping::lossy(target, warning),
        None => TypeMapping::lossless(target),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Parsing
    // =========================================================================

    #[test]
    fn test_parse_scalar_with_params() {
        let d = TypeDescriptor::parse("NUMERIC(10, 2)");
        assert_eq!(d.name, "NUMERIC");
        assert_eq!(d.params, vec!["10", "2"]);
        assert!(!d.is_array());

        let d = TypeDescriptor::parse("  double   precision ");
        assert_eq!(d.name, "DOUBLE PRECISION");
        assert!(d.params.is_empty());
    }

    #[test]
    fn test_parse_array_with_outer_length() {
        let d = TypeDescriptor::parse("ARRAY<STRING>(100)");
        assert!(d.is_array());
        let element = d.element.as_deref().unwrap();
        assert_eq!(element.name, "STRING");
        assert_eq!(element.params, vec!["100"]);
    }

    #[test]
    fn test_parse_array_with_inner_length() {
        let d = TypeDescriptor::parse("array<string(MAX)>");
        assert_eq!(d.element.as_deref().unwrap().params, vec!["MAX"]);
        assert_eq!(d.to_string(), "ARRAY<STRING(MAX)>");
    }

    #[test]
    fn test_parse_pg_array_forms() {
        for text in ["varchar[](100)", "varchar(100)[]"] {
            let d = TypeDescriptor::parse(text);
            let element = d.element.as_deref().unwrap();
            assert_eq!(element.name, "VARCHAR", "{text}");
            assert_eq!(element.params, vec!["100"], "{text}");
        }
        let d = TypeDescriptor::parse("date[]");
        assert_eq!(d.element.as_deref().unwrap().name, "DATE");
    }

    #[test]
    fn test_length_parse() {
        assert_eq!(Length::parse("max"), Some(Length::Max));
        assert_eq!(Length::parse("255"), Some(Length::Fixed(255)));
        assert_eq!(Length::parse("0"), None);
        assert_eq!(Length::parse("abc"), None);
    }

    // =========================================================================
    // Canonical conversion
    // =========================================================================

    #[test]
    fn test_to_canonical_rejects_unknown_and_multi_param_strings() {
        let to = AbstractToCanonical;
        assert!(to.to_canonical(&TypeDescriptor::parse("GEOGRAPHY")).is_none());
        assert!(to
            .to_canonical(&TypeDescriptor::parse("varchar(10, 2)"))
            .is_none());
        assert!(to
            .to_canonical(&TypeDescriptor::parse("ARRAY<ARRAY<INT64>>"))
            .is_none());
    }

    #[test]
    fn test_numeric_with_precision_is_lossy() {
        let info = AbstractToCanonical
            .to_canonical(&TypeDescriptor::parse("decimal(10,2)"))
            .unwrap();
        assert_eq!(info.canonical_type, CanonicalType::Numeric);
        assert!(info.is_lossy());
    }

    #[test]
    fn test_renderers() {
        let ty = CanonicalType::Array(Box::new(CanonicalType::String(Length::Fixed(100))));
        assert_eq!(
            GoogleSqlFromCanonical.from_canonical(&ty),
            "ARRAY<STRING(100)>"
        );
        assert_eq!(PostgresFromCanonical.from_canonical(&ty), "varchar(100)[]");
        assert_eq!(
            PostgresFromCanonical.from_canonical(&CanonicalType::String(Length::Max)),
            "varchar"
        );
    }

    #[test]
    fn test_compose() {
        let mapping = compose(
            &AbstractToCanonical,
            &GoogleSqlFromCanonical,
            &TypeDescriptor::parse("xml"),
        )
        .unwrap();
        assert_eq!(mapping.target_type, "STRING(MAX)");
        assert!(mapping.is_lossy);
    }
}
