//! Identifier validation and quoting for both Spanner SQL dialects.
//!
//! Identifiers cannot be bound as query parameters, so every table, column,
//! index and sequence name that ends up in generated DDL passes through this
//! module. Names are left bare when they are plain identifiers that are not
//! reserved words, which keeps the generated SQL identical to what users
//! write by hand (`CREATE TABLE Singers ...`). Anything else is quoted:
//!
//! - GoogleSQL: backticks, with embedded backticks escaped as `` \` ``
//! - PostgreSQL interface: double quotes, with embedded quotes doubled

use crate::error::{MigrateError, Result};

/// Maximum identifier length accepted by Cloud Spanner.
const MAX_IDENTIFIER_LENGTH: usize = 128;

/// GoogleSQL reserved keywords. An identifier matching one of these
/// (case-insensitively) must be quoted.
const GOOGLESQL_RESERVED: &[&str] = &[
    "ALL", "AND", "ANY", "ARRAY", "AS", "ASC", "ASSERT_ROWS_MODIFIED", "AT", "BETWEEN", "BY",
    "CASE", "CAST", "COLLATE", "CONTAINS", "CREATE", "CROSS", "CUBE", "CURRENT", "DEFAULT",
    "DEFINE", "DESC", "DISTINCT", "ELSE", "END", "ENUM", "ESCAPE", "EXCEPT", "EXCLUDE", "EXISTS",
    "EXTRACT", "FALSE", "FETCH", "FOLLOWING", "FOR", "FROM", "FULL", "GROUP", "GROUPING",
    "GROUPS", "HASH", "HAVING", "IF", "IGNORE", "IN", "INNER", "INTERSECT", "INTERVAL", "INTO",
    "IS", "JOIN", "LATERAL", "LEFT", "LIKE", "LIMIT", "LOOKUP", "MERGE", "NATURAL", "NEW", "NO",
    "NOT", "NULL", "NULLS", "OF", "ON", "OR", "ORDER", "OUTER", "OVER", "PARTITION",
    "PRECEDING", "PROTO", "RANGE", "RECURSIVE", "RESPECT", "RIGHT", "ROLLUP", "ROWS", "SELECT",
    "SET", "SOME", "STRUCT", "TABLESAMPLE", "THEN", "TO", "TREAT", "TRUE", "UNBOUNDED", "UNION",
    "UNNEST", "USING", "WHEN", "WHERE", "WINDOW", "WITH", "WITHIN",
];

/// PostgreSQL reserved keywords that cannot appear as bare identifiers.
const POSTGRES_RESERVED: &[&str] = &[
    "ALL", "ANALYSE", "ANALYZE", "AND", "ANY", "ARRAY", "AS", "ASC", "ASYMMETRIC", "BOTH", "CASE",
    "CAST", "CHECK", "COLLATE", "COLUMN", "CONSTRAINT", "CREATE", "CURRENT_CATALOG",
    "CURRENT_DATE", "CURRENT_ROLE", "CURRENT_TIME", "CURRENT_TIMESTAMP", "CURRENT_USER",
    "DEFAULT", "DEFERRABLE", "DESC", "DISTINCT", "DO", "ELSE", "END", "EXCEPT", "FALSE", "FETCH",
    "FOR", "FOREIGN", "FROM", "GRANT", "GROUP", "HAVING", "IN", "INITIALLY", "INTERSECT", "INTO",
    "LATERAL", "LEADING", "LIMIT", "LOCALTIME", "LOCALTIMESTAMP", "NOT", "NULL", "OFFSET", "ON",
    "ONLY", "OR", "ORDER", "PLACING", "PRIMARY", "REFERENCES", "RETURNING", "SELECT",
    "SESSION_USER", "SOME", "SYMMETRIC", "TABLE", "THEN", "TO", "TRAILING", "TRUE", "UNION",
    "UNIQUE", "USER", "USING", "VARIADIC", "WHEN", "WHERE", "WINDOW", "WITH",
];

/// Validate an identifier.
///
/// Rejects:
/// - Empty identifiers
/// - Identifiers containing null bytes
/// - Identifiers exceeding the Spanner length limit
///
/// # Errors
///
/// Returns `MigrateError::Identifier` with a descriptive message.
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(MigrateError::Identifier(
            "Identifier cannot be empty".to_string(),
        ));
    }

    if name.contains('\0') {
        return Err(MigrateError::Identifier(format!(
            "Identifier contains null byte: {:?}",
            name
        )));
    }

    if name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(MigrateError::Identifier(format!(
            "Identifier exceeds maximum length of {} bytes (got {} bytes): {:?}",
            MAX_IDENTIFIER_LENGTH,
            name.len(),
            name
        )));
    }

    Ok(())
}

/// Whether `name` is a plain identifier: ASCII letter or underscore first,
/// then letters, digits and underscores.
pub fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Whether `name` is a GoogleSQL reserved keyword.
pub fn is_googlesql_reserved(name: &str) -> bool {
    GOOGLESQL_RESERVED
        .iter()
        .any(|kw| kw.eq_ignore_ascii_case(name))
}

/// Whether `name` is a PostgreSQL reserved keyword.
pub fn is_postgres_reserved(name: &str) -> bool {
    POSTGRES_RESERVED
        .iter()
        .any(|kw| kw.eq_ignore_ascii_case(name))
}

/// Quote a GoogleSQL identifier with backticks.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(quote_googlesql("Order")?, "`Order`");
/// assert_eq!(quote_googlesql("a`b")?, "`a\\`b`");
/// ```
pub fn quote_googlesql(name: &str) -> Result<String> {
    validate_identifier(name)?;
    Ok(format!("`{}`", name.replace('`', "\\`")))
}

/// Quote a PostgreSQL-interface identifier with double quotes.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(quote_postgres("order")?, "\"order\"");
/// assert_eq!(quote_postgres("a\"b")?, "\"a\"\"b\"");
/// ```
pub fn quote_postgres(name: &str) -> Result<String> {
    validate_identifier(name)?;
    Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}

/// Escape a GoogleSQL identifier only when it needs quoting.
pub fn escape_googlesql(name: &str) -> Result<String> {
    validate_identifier(name)?;
    if is_plain_identifier(name) && !is_googlesql_reserved(name) {
        Ok(name.to_string())
    } else {
        quote_googlesql(name)
    }
}

/// Escape a PostgreSQL-interface identifier only when it needs quoting.
pub fn escape_postgres(name: &str) -> Result<String> {
    validate_identifier(name)?;
    if is_plain_identifier(name) && !is_postgres_reserved(name) {
        Ok(name.to_string())
    } else {
        quote_postgres(name)
    }
}
