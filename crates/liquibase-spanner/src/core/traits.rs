//! Core traits for dialect-aware statement generation.
//!
//! This module defines the seams between the rule logic and its collaborators:
//!
//! - [`SqlGenerator`]: turns one abstract [`Statement`] into SQL (or validation errors)
//! - [`SchemaReader`]: narrow live-schema lookups needed while generating
//! - [`MetadataSource`]: a handle that runs INFORMATION_SCHEMA queries
//! - [`TypeMapper`]: maps abstract column types to Spanner type text
//!
//! # Design Patterns
//!
//! - **Strategy**: generators and type mappers provide interchangeable rules
//! - **Chain of responsibility**: the registry picks the highest-priority
//!   generator that supports a statement
//! - **Dependency injection**: readers are passed in, never looked up

use crate::drivers::spanner::DatabaseDialect;
use crate::error::Result;

use super::catalog::GeneratorContext;
use super::statement::{ColumnRef, Sql, Statement, StatementKind, TableRef};
use super::value::MetadataRow;
use crate::dialect::TypeDescriptor;

/// Priority of portable generators that work on any database.
pub const PRIORITY_DEFAULT: i32 = 1;

/// Priority of Spanner-specific overrides.
pub const PRIORITY_DATABASE: i32 = 5;

/// Errors collected while validating a statement.
///
/// An empty list means the statement may be generated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error.
    pub fn add(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Record "<field> is required" when `value` is empty.
    pub fn check_required(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.add(format!("{} is required", field));
        }
    }

    /// Record "<field> is not allowed on cloudspanner" when `present`.
    pub fn check_disallowed(&mut self, field: &str, present: bool) {
        if present {
            self.add(format!("{} is not allowed on cloudspanner", field));
        }
    }

    /// Append all errors of another result.
    pub fn extend(&mut self, other: ValidationErrors) {
        self.errors.extend(other.errors);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn into_vec(self) -> Vec<String> {
        self.errors
    }
}

/// Turns one kind of abstract statement into dialect-specific SQL.
///
/// Each generator claims exactly one [`StatementKind`]. When several
/// generators claim the same kind and all support the statement, the one
/// with the highest [`priority`](SqlGenerator::priority) wins.
pub trait SqlGenerator: Send + Sync {
    /// Short name for logs, e.g. `"CreateTableGeneratorSpanner"`.
    fn name(&self) -> &str;

    /// The statement kind this generator handles.
    fn kind(&self) -> StatementKind;

    /// Tie-breaker among generators that support the same statement.
    fn priority(&self) -> i32 {
        PRIORITY_DEFAULT
    }

    /// Whether this generator applies to the statement on `dialect`.
    fn supports(&self, _statement: &Statement, _dialect: DatabaseDialect) -> bool {
        true
    }

    /// Validate the statement before any SQL is produced.
    fn validate(&self, _statement: &Statement, _ctx: &GeneratorContext<'_>) -> ValidationErrors {
        ValidationErrors::new()
    }

    /// Produce SQL for a statement that passed validation.
    fn generate(&self, statement: &Statement, ctx: &GeneratorContext<'_>) -> Result<Vec<Sql>>;
}

/// Live-schema lookups a generator may need.
///
/// Kept narrow so generators can be exercised with an in-memory fake.
pub trait SchemaReader {
    /// Current nullability of a column.
    fn is_nullable(&self, column: &ColumnRef) -> Result<bool>;

    /// Names of all foreign-key constraints on a table, in discovery order.
    fn foreign_key_names(&self, table: &TableRef) -> Result<Vec<String>>;

    /// Raw `COLUMN_DEFAULT` text of a column, if any.
    fn column_default(&self, column: &ColumnRef) -> Result<Option<String>>;

    /// `SPANNER_TYPE` of a column (PostgreSQL interface only).
    fn spanner_type(&self, column: &ColumnRef) -> Result<Option<String>>;
}

/// A handle that runs parameterized metadata queries.
///
/// Parameters bind positionally to `?` placeholders.
pub trait MetadataSource {
    fn query(&self, sql: &str, params: &[&str]) -> Result<Vec<MetadataRow>>;
}

/// Maps abstract column types to concrete Spanner type text.
pub trait TypeMapper: Send + Sync {
    /// Map a parsed type. `None` means the type is not recognized and the
    /// caller should fall back to its own resolution.
    fn map_type(&self, descriptor: &TypeDescriptor, dialect: DatabaseDialect)
        -> Option<TypeMapping>;

    /// Map raw type text, passing unrecognized types through unchanged.
    fn resolve(&self, type_text: &str, dialect: DatabaseDialect) -> TypeMapping {
        let descriptor = TypeDescriptor::parse(type_text);
        self.map_type(&descriptor, dialect)
            .unwrap_or_else(|| TypeMapping::lossless(type_text.trim()))
    }
}

/// Result of mapping an abstract type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMapping {
    /// Target type string (e.g., "STRING(100)", "varchar").
    pub target_type: String,
    /// Whether this mapping loses data or precision.
    pub is_lossy: bool,
    /// Warning message for lossy mappings.
    pub warning: Option<String>,
}

impl TypeMapping {
    /// Create a lossless type mapping.
    pub fn lossless(target_type: impl Into<String>) -> Self {
        Self {
            target_type: target_type.into(),
            is_lossy: false,
            warning: None,
        }
    }

    /// Create a lossy type mapping with a warning.
    pub fn lossy(target_type: impl Into<String>, warning: impl Into<String>) -> Self {
        Self {
            target_type: target_type.into(),
            is_lossy: true,
            warning: Some(warning.into()),
        }
    }
}
