//! Create table for Cloud Spanner.

use crate::core::catalog::GeneratorContext;
use crate::core::statement::{ColumnDefinition, DatabaseObject, Sql, Statement, StatementKind};
use crate::core::traits::{SqlGenerator, ValidationErrors, PRIORITY_DATABASE};
use crate::error::Result;

use super::wrong_statement;

/// Render one column definition: `name TYPE[ NOT NULL][ DEFAULT (value)]`.
pub(crate) fn render_column_definition(
    ctx: &GeneratorContext<'_>,
    column: &ColumnDefinition,
) -> Result<String> {
    Ok(format!(
        "{} {}",
        ctx.dialect.escape_object_name(&column.name)?,
        render_column_body(ctx, column)?
    ))
}

/// Everything after the column name.
///
/// Only an explicitly declared NOT NULL is rendered. The NOT NULL the host
/// implies for primary key columns is dropped because Spanner allows
/// nullable key columns.
pub(crate) fn render_column_body(
    ctx: &GeneratorContext<'_>,
    column: &ColumnDefinition,
) -> Result<String> {
    let mut sql = ctx.map_type(&column.data_type);
    if column.not_null {
        sql.push_str(" NOT NULL");
    }
    if let Some(default) = &column.default_value {
        sql.push_str(" DEFAULT (");
        sql.push_str(&ctx.dialect.value_to_sql(default)?);
        sql.push(')');
    }
    Ok(sql)
}

/// Moves the primary key out of the column list.
///
/// GoogleSQL: `CREATE TABLE T (a INT64, b STRING(100)) PRIMARY KEY (a)`.
/// The PostgreSQL interface keeps the constraint inside the parentheses.
pub struct CreateTableGeneratorSpanner;

impl SqlGenerator for CreateTableGeneratorSpanner {
    fn name(&self) -> &str {
        "CreateTableGeneratorSpanner"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::CreateTable
    }

    fn priority(&self) -> i32 {
        PRIORITY_DATABASE
    }

    fn validate(&self, statement: &Statement, _ctx: &GeneratorContext<'_>) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        let Statement::CreateTable(stmt) = statement else {
            return errors;
        };
        errors.check_required("tableName", &stmt.table.table_name);
        if stmt.columns.is_empty() {
            errors.add("columns is required");
        }
        if stmt.primary_key_columns().is_empty() {
            errors.add("primary key is required");
        }
        errors
    }

    fn generate(&self, statement: &Statement, ctx: &GeneratorContext<'_>) -> Result<Vec<Sql>> {
        let Statement::CreateTable(stmt) = statement else {
            return Err(wrong_statement(self, statement));
        };

        let columns = stmt
            .columns
            .iter()
            .map(|c| render_column_definition(ctx, c))
            .collect::<Result<Vec<_>>>()?
            .join(", ");
        let table = ctx.dialect.escape_table_name(&stmt.table)?;
        let pk = ctx.dialect.escape_column_list(&stmt.primary_key_columns())?;

        let sql = if ctx.dialect.is_postgresql() {
            format!("CREATE TABLE {} ({}, PRIMARY KEY ({}))", table, columns, pk)
        } else {
            format!("CREATE TABLE {} ({}) PRIMARY KEY ({})", table, columns, pk)
        };

        let mut fragment = Sql::new(sql).affecting(DatabaseObject::table(&stmt.table));
        for column in &stmt.columns {
            fragment = fragment.affecting(DatabaseObject::column(&stmt.table, &column.name));
        }
        Ok(vec![fragment])
    }
}
