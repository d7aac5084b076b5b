//! Foreign keys on Cloud Spanner.

use tracing::debug;

use crate::core::catalog::GeneratorContext;
use crate::core::statement::{DatabaseObject, Sql, Statement, StatementKind};
use crate::core::traits::{SqlGenerator, ValidationErrors, PRIORITY_DATABASE};
use crate::error::Result;

use super::standard::render_add_foreign_key;
use super::wrong_statement;

/// Adds a foreign key without a name or referential actions.
///
/// Spanner names the constraint itself and only supports the default
/// actions, so the name slot is left empty and any ON UPDATE / ON DELETE
/// clauses are dropped.
pub struct AddForeignKeyConstraintGeneratorSpanner;

impl SqlGenerator for AddForeignKeyConstraintGeneratorSpanner {
    fn name(&self) -> &str {
        "AddForeignKeyConstraintGeneratorSpanner"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::AddForeignKey
    }

    fn priority(&self) -> i32 {
        PRIORITY_DATABASE
    }

    fn validate(&self, statement: &Statement, _ctx: &GeneratorContext<'_>) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if let Statement::AddForeignKey(stmt) = statement {
            errors.check_required("baseTableName", &stmt.base_table.table_name);
            errors.check_required("referencedTableName", &stmt.referenced_table.table_name);
            if stmt.base_column_names.is_empty() {
                errors.add("baseColumnNames is required");
            }
            if stmt.referenced_column_names.is_empty() {
                errors.add("referencedColumnNames is required");
            }
        }
        errors
    }

    fn generate(&self, statement: &Statement, ctx: &GeneratorContext<'_>) -> Result<Vec<Sql>> {
        let Statement::AddForeignKey(stmt) = statement else {
            return Err(wrong_statement(self, statement));
        };
        let mut stripped = stmt.clone();
        stripped.constraint_name = None;
        stripped.on_update = None;
        stripped.on_delete = None;

        let sql = render_add_foreign_key(ctx, &stripped)?;
        Ok(vec![Sql::new(sql).affecting(DatabaseObject::table(&stmt.base_table))])
    }
}

/// Drops every foreign key on a table, one statement per constraint, in the
/// order the live schema reports them.
pub struct DropAllForeignKeysGeneratorSpanner;

impl SqlGenerator for DropAllForeignKeysGeneratorSpanner {
    fn name(&self) -> &str {
        "DropAllForeignKeysGeneratorSpanner"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::DropAllForeignKeys
    }

    fn priority(&self) -> i32 {
        PRIORITY_DATABASE
    }

    fn validate(&self, statement: &Statement, _ctx: &GeneratorContext<'_>) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if let Statement::DropAllForeignKeys(stmt) = statement {
            errors.check_required("baseTableName", &stmt.table.table_name);
        }
        errors
    }

    fn generate(&self, statement: &Statement, ctx: &GeneratorContext<'_>) -> Result<Vec<Sql>> {
        let Statement::DropAllForeignKeys(stmt) = statement else {
            return Err(wrong_statement(self, statement));
        };
        let names = ctx.reader.foreign_key_names(&stmt.table)?;
        debug!("{}: {} foreign keys to drop", stmt.table, names.len());

        let table = ctx.dialect.escape_table_name(&stmt.table)?;
        names
            .into_iter()
            .map(|name| {
                let sql = format!(
                    "ALTER TABLE {} DROP CONSTRAINT {}",
                    table,
                    ctx.dialect.escape_object_name(&name)?
                );
                Ok(Sql::new(sql).affecting(DatabaseObject::ForeignKey {
                    table: stmt.table.table_name.clone(),
                    name,
                }))
            })
            .collect()
    }
}
