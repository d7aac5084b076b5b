//! Sequences on Cloud Spanner.
//!
//! Spanner only has bit-reversed positive sequences. The generic sequence
//! knobs (cache, order, cycle, data type, increment) have no equivalent and
//! are rejected during validation.

use crate::core::catalog::GeneratorContext;
use crate::core::statement::{DatabaseObject, Sql, Statement, StatementKind};
use crate::core::traits::{SqlGenerator, ValidationErrors, PRIORITY_DATABASE};
use crate::error::Result;

use super::unsupported::unsupported_generate;
use super::wrong_statement;

pub const ALTER_SEQUENCE_VALIDATION_ERROR: &str = "The Liquibase Cloud Spanner extension does not support altering sequences from XML. Please use SQL to create the change instead.";

pub const RENAME_SEQUENCE_VALIDATION_ERROR: &str = "Cloud Spanner does not support renaming a sequence";

const SEQUENCE_KIND: &str = "bit_reversed_positive";

pub struct CreateSequenceGeneratorSpanner;

impl SqlGenerator for CreateSequenceGeneratorSpanner {
    fn name(&self) -> &str {
        "CreateSequenceGeneratorSpanner"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::CreateSequence
    }

    fn priority(&self) -> i32 {
        PRIORITY_DATABASE
    }

    fn validate(&self, statement: &Statement, _ctx: &GeneratorContext<'_>) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        let Statement::CreateSequence(stmt) = statement else {
            return errors;
        };
        errors.check_required("sequenceName", &stmt.sequence_name);
        errors.check_disallowed("cacheSize", stmt.cache_size.is_some());
        errors.check_disallowed("ordered", stmt.ordered.is_some());
        errors.check_disallowed("cycle", stmt.cycle.is_some());
        errors.check_disallowed("dataType", stmt.data_type.is_some());
        // An increment of 1 is what Spanner does anyway.
        if stmt.increment_by != Some(1) {
            errors.check_disallowed("incrementBy", stmt.increment_by.is_some());
        }
        errors
    }

    fn generate(&self, statement: &Statement, ctx: &GeneratorContext<'_>) -> Result<Vec<Sql>> {
        let Statement::CreateSequence(stmt) = statement else {
            return Err(wrong_statement(self, statement));
        };
        let mut sql = format!(
            "CREATE SEQUENCE {}",
            ctx.dialect.escape_object_name(&stmt.sequence_name)?
        );

        if ctx.dialect.is_postgresql() {
            sql.push(' ');
            sql.push_str(SEQUENCE_KIND);
            if let Some(min) = stmt.min_value {
                sql.push_str(&format!(" SKIP RANGE {}", min));
            }
            if let Some(max) = stmt.max_value {
                sql.push_str(&format!(" {}", max));
            }
            if let Some(start) = stmt.start_value {
                sql.push_str(&format!(" START COUNTER WITH {}", start));
            }
        } else {
            sql.push_str(&format!(" OPTIONS (sequence_kind='{}'", SEQUENCE_KIND));
            if let Some(min) = stmt.min_value {
                sql.push_str(&format!(", skip_range_min = {}", min));
            }
            if let Some(max) = stmt.max_value {
                sql.push_str(&format!(", skip_range_max = {}", max));
            }
            if let Some(start) = stmt.start_value {
                sql.push_str(&format!(", start_with_counter = {}", start));
            }
            sql.push(')');
        }

        Ok(vec![Sql::new(sql).affecting(DatabaseObject::Sequence {
            name: stmt.sequence_name.clone(),
        })])
    }
}

pub struct AlterSequenceGeneratorSpanner;

impl SqlGenerator for AlterSequenceGeneratorSpanner {
    fn name(&self) -> &str {
        "AlterSequenceGeneratorSpanner"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::AlterSequence
    }

    fn priority(&self) -> i32 {
        PRIORITY_DATABASE
    }

    fn validate(&self, _statement: &Statement, _ctx: &GeneratorContext<'_>) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors.add(ALTER_SEQUENCE_VALIDATION_ERROR);
        errors
    }

    fn generate(&self, _statement: &Statement, _ctx: &GeneratorContext<'_>) -> Result<Vec<Sql>> {
        Err(unsupported_generate(ALTER_SEQUENCE_VALIDATION_ERROR))
    }
}

pub struct RenameSequenceGeneratorSpanner;

impl SqlGenerator for RenameSequenceGeneratorSpanner {
    fn name(&self) -> &str {
        "RenameSequenceGeneratorSpanner"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::RenameSequence
    }

    fn priority(&self) -> i32 {
        PRIORITY_DATABASE
    }

    fn validate(&self, _statement: &Statement, _ctx: &GeneratorContext<'_>) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors.add(RENAME_SEQUENCE_VALIDATION_ERROR);
        errors
    }

    fn generate(&self, _statement: &Statement, _ctx: &GeneratorContext<'_>) -> Result<Vec<Sql>> {
        Err(unsupported_generate(RENAME_SEQUENCE_VALIDATION_ERROR))
    }
}
