//! DML for Cloud Spanner.
//!
//! Spanner refuses UPDATE and DELETE without a WHERE clause, and has no
//! upsert statement usable from a changelog, so insert-or-update is split
//! into a guarded insert followed by an update.

use tracing::warn;

use crate::core::catalog::GeneratorContext;
use crate::core::statement::{
    ColumnAssignment, DatabaseObject, InsertOrUpdateStatement, Sql, Statement, StatementKind,
};
use crate::core::traits::{SqlGenerator, ValidationErrors, PRIORITY_DATABASE};
use crate::error::Result;

use super::standard::{render_delete, render_insert_lists, render_update, where_clause};
use super::wrong_statement;

/// Predicate used when a mutating statement has no WHERE clause.
const MATCH_ALL: &str = "true";

pub struct DeleteGeneratorSpanner;

impl SqlGenerator for DeleteGeneratorSpanner {
    fn name(&self) -> &str {
        "DeleteGeneratorSpanner"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::Delete
    }

    fn priority(&self) -> i32 {
        PRIORITY_DATABASE
    }

    fn validate(&self, statement: &Statement, _ctx: &GeneratorContext<'_>) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if let Statement::Delete(stmt) = statement {
            errors.check_required("tableName", &stmt.table.table_name);
        }
        errors
    }

    fn generate(&self, statement: &Statement, ctx: &GeneratorContext<'_>) -> Result<Vec<Sql>> {
        let Statement::Delete(stmt) = statement else {
            return Err(wrong_statement(self, statement));
        };
        let clause = where_clause(&stmt.where_clause).unwrap_or(MATCH_ALL);
        let sql = render_delete(ctx, &stmt.table, Some(clause))?;
        Ok(vec![Sql::new(sql).affecting(DatabaseObject::table(&stmt.table))])
    }
}

pub struct UpdateGeneratorSpanner;

impl SqlGenerator for UpdateGeneratorSpanner {
    fn name(&self) -> &str {
        "UpdateGeneratorSpanner"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::Update
    }

    fn priority(&self) -> i32 {
        PRIORITY_DATABASE
    }

    fn validate(&self, statement: &Statement, _ctx: &GeneratorContext<'_>) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if let Statement::Update(stmt) = statement {
            errors.check_required("tableName", &stmt.table.table_name);
            if stmt.new_values.is_empty() {
                errors.add("columns is required");
            }
        }
        errors
    }

    fn generate(&self, statement: &Statement, ctx: &GeneratorContext<'_>) -> Result<Vec<Sql>> {
        let Statement::Update(stmt) = statement else {
            return Err(wrong_statement(self, statement));
        };
        let columns: Vec<&ColumnAssignment> = stmt.new_values.iter().collect();
        let clause = where_clause(&stmt.where_clause).unwrap_or(MATCH_ALL);
        let sql = render_update(ctx, &stmt.table, &columns, Some(clause))?;
        Ok(vec![Sql::new(sql).affecting(DatabaseObject::table(&stmt.table))])
    }
}

/// Insert-or-update as two statements.
///
/// GoogleSQL:
///
/// ```text
/// INSERT INTO T (k, a) SELECT 1, 'x' FROM UNNEST([1]) WHERE NOT EXISTS (SELECT k FROM T WHERE k = 1)
/// UPDATE T SET a = 'x' WHERE k = 1
/// ```
///
/// The PostgreSQL interface uses `INSERT .. ON CONFLICT (k) DO NOTHING` for
/// the first statement. With `onlyUpdate` the insert is skipped.
pub struct InsertOrUpdateGeneratorSpanner;

impl InsertOrUpdateGeneratorSpanner {
    fn value_of<'s>(stmt: &'s InsertOrUpdateStatement, column: &str) -> Option<&'s ColumnAssignment> {
        stmt.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(column))
    }

    /// `k1 = v1 AND k2 = v2` over the primary key columns.
    fn key_predicate(ctx: &GeneratorContext<'_>, stmt: &InsertOrUpdateStatement) -> Result<String> {
        let mut parts = Vec::new();
        for key in stmt.primary_key_columns() {
            if let Some(assignment) = Self::value_of(stmt, key) {
                parts.push(format!(
                    "{} = {}",
                    ctx.dialect.escape_object_name(key)?,
                    ctx.dialect.value_to_sql(&assignment.value)?
                ));
            }
        }
        Ok(parts.join(" AND "))
    }

    fn insert(ctx: &GeneratorContext<'_>, stmt: &InsertOrUpdateStatement) -> Result<String> {
        let table = ctx.dialect.escape_table_name(&stmt.table)?;
        let (names, values) = render_insert_lists(ctx, &stmt.columns)?;
        let keys: Vec<String> = stmt
            .primary_key_columns()
            .into_iter()
            .map(str::to_string)
            .collect();
        let keys = ctx.dialect.escape_column_list(&keys)?;

        Ok(if ctx.dialect.is_postgresql() {
            format!(
                "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT ({}) DO NOTHING",
                table, names, values, keys
            )
        } else {
            format!(
                "INSERT INTO {} ({}) SELECT {} FROM UNNEST([1]) WHERE NOT EXISTS (SELECT {} FROM {} WHERE {})",
                table,
                names,
                values,
                keys,
                table,
                Self::key_predicate(ctx, stmt)?
            )
        })
    }
}

impl SqlGenerator for InsertOrUpdateGeneratorSpanner {
    fn name(&self) -> &str {
        "InsertOrUpdateGeneratorSpanner"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::InsertOrUpdate
    }

    fn priority(&self) -> i32 {
        PRIORITY_DATABASE
    }

    fn validate(&self, statement: &Statement, _ctx: &GeneratorContext<'_>) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        let Statement::InsertOrUpdate(stmt) = statement else {
            return errors;
        };
        errors.check_required("tableName", &stmt.table.table_name);
        errors.check_required("primaryKey", &stmt.primary_key);
        if stmt.columns.is_empty() {
            errors.add("columns is required");
        }
        for key in stmt.primary_key_columns() {
            if Self::value_of(stmt, key).is_none() {
                errors.add(format!("a value for primary key column {} is required", key));
            }
        }
        errors
    }

    fn generate(&self, statement: &Statement, ctx: &GeneratorContext<'_>) -> Result<Vec<Sql>> {
        let Statement::InsertOrUpdate(stmt) = statement else {
            return Err(wrong_statement(self, statement));
        };
        let affected = DatabaseObject::table(&stmt.table);
        let mut sql = Vec::with_capacity(2);

        if !stmt.only_update {
            sql.push(Sql::new(Self::insert(ctx, stmt)?).affecting(affected.clone()));
        }

        let keys = stmt.primary_key_columns();
        let mut updates: Vec<&ColumnAssignment> = stmt
            .columns
            .iter()
            .filter(|c| !keys.iter().any(|k| k.eq_ignore_ascii_case(&c.name)))
            .collect();
        updates.sort_by(|a, b| a.name.cmp(&b.name));

        if updates.is_empty() {
            if stmt.only_update {
                warn!(
                    "{}: no columns outside the primary key, nothing to update",
                    statement.describe()
                );
            } else {
                warn!(
                    "{}: no columns outside the primary key, generating the insert only",
                    statement.describe()
                );
            }
            return Ok(sql);
        }

        let predicate = Self::key_predicate(ctx, stmt)?;
        let update = render_update(ctx, &stmt.table, &updates, Some(&predicate))?;
        sql.push(Sql::new(update).affecting(affected));
        Ok(sql)
    }
}
