//! Column-level DDL for Cloud Spanner: add column, defaults, type and
//! nullability changes.

use tracing::debug;

use crate::core::catalog::GeneratorContext;
use crate::core::statement::{ColumnRef, DatabaseObject, Sql, Statement, StatementKind, TableRef};
use crate::core::traits::{SqlGenerator, ValidationErrors, PRIORITY_DATABASE};
use crate::core::value::ColumnValue;
use crate::drivers::spanner::ColumnKeyword;
use crate::error::Result;

use super::table::render_column_body;
use super::wrong_statement;

pub const ADD_DEFAULT_VALUE_VALIDATION_ERROR: &str = "Cloud Spanner supports default values for columns, but only with built-in functions such as CURRENT_TIMESTAMP() and GENERATE_UUID()";

/// `ALTER TABLE t ALTER COLUMN c ...` carrying both type and nullability.
///
/// Spanner resets nullability when a column is altered without it, so both
/// are always stated. GoogleSQL puts them in one clause; the PostgreSQL
/// interface needs a `TYPE` clause and a separate nullability clause.
fn render_alter_column(
    ctx: &GeneratorContext<'_>,
    table: &TableRef,
    column: &str,
    type_text: &str,
    nullable: bool,
) -> Result<String> {
    let table = ctx.dialect.escape_table_name(table)?;
    let column = ctx.dialect.escape_object_name(column)?;
    let data_type = ctx.map_type(type_text);

    Ok(if ctx.dialect.is_postgresql() {
        format!(
            "ALTER TABLE {} ALTER COLUMN {} TYPE {}, ALTER COLUMN {} {}",
            table,
            column,
            data_type,
            column,
            if nullable { "DROP NOT NULL" } else { "SET NOT NULL" }
        )
    } else {
        format!(
            "ALTER TABLE {} ALTER COLUMN {} {}{}",
            table,
            column,
            data_type,
            if nullable { "" } else { " NOT NULL" }
        )
    })
}

/// Adds columns with an explicit `COLUMN` keyword and parenthesized defaults.
/// One statement is generated per column.
pub struct AddColumnGeneratorSpanner;

impl SqlGenerator for AddColumnGeneratorSpanner {
    fn name(&self) -> &str {
        "AddColumnGeneratorSpanner"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::AddColumn
    }

    fn priority(&self) -> i32 {
        PRIORITY_DATABASE
    }

    fn validate(&self, statement: &Statement, _ctx: &GeneratorContext<'_>) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if let Statement::AddColumn(stmt) = statement {
            errors.check_required("tableName", &stmt.table.table_name);
            if stmt.columns.is_empty() {
                errors.add("columns is required");
            }
            for column in &stmt.columns {
                errors.check_required("columnName", &column.name);
                errors.check_required("columnType", &column.data_type);
            }
        }
        errors
    }

    fn generate(&self, statement: &Statement, ctx: &GeneratorContext<'_>) -> Result<Vec<Sql>> {
        let Statement::AddColumn(stmt) = statement else {
            return Err(wrong_statement(self, statement));
        };
        let table = ctx.dialect.escape_table_name(&stmt.table)?;

        stmt.columns
            .iter()
            .map(|column| {
                let name = ctx
                    .dialect
                    .escape_column_name(&column.name, ColumnKeyword::Include)?;
                let body = render_column_body(ctx, column)?;
                Ok(Sql::new(format!("ALTER TABLE {} ADD {} {}", table, name, body))
                    .affecting(DatabaseObject::column(&stmt.table, &column.name)))
            })
            .collect()
    }
}

/// `ALTER TABLE t ALTER COLUMN c SET DEFAULT (value)`.
///
/// Literals and built-in functions are accepted. Computed expressions and
/// sequence values cannot be column defaults on Spanner.
pub struct AddDefaultValueGeneratorSpanner;

impl SqlGenerator for AddDefaultValueGeneratorSpanner {
    fn name(&self) -> &str {
        "AddDefaultValueGeneratorSpanner"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::AddDefaultValue
    }

    fn priority(&self) -> i32 {
        PRIORITY_DATABASE
    }

    fn validate(&self, statement: &Statement, ctx: &GeneratorContext<'_>) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if let Statement::AddDefaultValue(stmt) = statement {
            errors.check_required("tableName", &stmt.table.table_name);
            errors.check_required("columnName", &stmt.column_name);
            let value = &stmt.default_value;
            let accepted = match value {
                ColumnValue::Function(f) => ctx.dialect.is_function(f),
                other => other.is_literal(),
            };
            if !accepted {
                debug!(
                    "Rejecting {} default for {}.{}",
                    value.kind_name(),
                    stmt.table.table_name,
                    stmt.column_name
                );
                errors.add(ADD_DEFAULT_VALUE_VALIDATION_ERROR);
            }
        }
        errors
    }

    fn generate(&self, statement: &Statement, ctx: &GeneratorContext<'_>) -> Result<Vec<Sql>> {
        let Statement::AddDefaultValue(stmt) = statement else {
            return Err(wrong_statement(self, statement));
        };
        let sql = format!(
            "ALTER TABLE {} ALTER COLUMN {} SET DEFAULT ({})",
            ctx.dialect.escape_table_name(&stmt.table)?,
            ctx.dialect.escape_object_name(&stmt.column_name)?,
            ctx.dialect.value_to_sql(&stmt.default_value)?
        );
        Ok(vec![
            Sql::new(sql).affecting(DatabaseObject::column(&stmt.table, &stmt.column_name))
        ])
    }
}

pub struct DropDefaultValueGeneratorSpanner;

impl SqlGenerator for DropDefaultValueGeneratorSpanner {
    fn name(&self) -> &str {
        "DropDefaultValueGeneratorSpanner"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::DropDefaultValue
    }

    fn priority(&self) -> i32 {
        PRIORITY_DATABASE
    }

    fn validate(&self, statement: &Statement, _ctx: &GeneratorContext<'_>) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if let Statement::DropDefaultValue(stmt) = statement {
            errors.check_required("tableName", &stmt.table.table_name);
            errors.check_required("columnName", &stmt.column_name);
        }
        errors
    }

    fn generate(&self, statement: &Statement, ctx: &GeneratorContext<'_>) -> Result<Vec<Sql>> {
        let Statement::DropDefaultValue(stmt) = statement else {
            return Err(wrong_statement(self, statement));
        };
        let sql = format!(
            "ALTER TABLE {} ALTER COLUMN {} DROP DEFAULT",
            ctx.dialect.escape_table_name(&stmt.table)?,
            ctx.dialect.escape_object_name(&stmt.column_name)?
        );
        Ok(vec![
            Sql::new(sql).affecting(DatabaseObject::column(&stmt.table, &stmt.column_name))
        ])
    }
}

/// Changes a column type while keeping its current nullability, which is
/// read from the live schema first.
pub struct ModifyDataTypeGeneratorSpanner;

impl SqlGenerator for ModifyDataTypeGeneratorSpanner {
    fn name(&self) -> &str {
        "ModifyDataTypeGeneratorSpanner"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::ModifyDataType
    }

    fn priority(&self) -> i32 {
        PRIORITY_DATABASE
    }

    fn validate(&self, statement: &Statement, _ctx: &GeneratorContext<'_>) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if let Statement::ModifyDataType(stmt) = statement {
            errors.check_required("tableName", &stmt.table.table_name);
            errors.check_required("columnName", &stmt.column_name);
            errors.check_required("newDataType", &stmt.new_data_type);
        }
        errors
    }

    fn generate(&self, statement: &Statement, ctx: &GeneratorContext<'_>) -> Result<Vec<Sql>> {
        let Statement::ModifyDataType(stmt) = statement else {
            return Err(wrong_statement(self, statement));
        };
        let column = ColumnRef::new(stmt.table.clone(), stmt.column_name.clone());
        let nullable = ctx.reader.is_nullable(&column)?;
        debug!("{} is currently {}", column, if nullable { "nullable" } else { "NOT NULL" });

        let sql = render_alter_column(
            ctx,
            &stmt.table,
            &stmt.column_name,
            &stmt.new_data_type,
            nullable,
        )?;
        Ok(vec![Sql::new(sql).affecting(DatabaseObject::table(&stmt.table))])
    }
}

/// Spanner has no standalone nullability DDL; the full column type is
/// restated together with the new nullability.
pub struct SetNullableGeneratorSpanner;

impl SqlGenerator for SetNullableGeneratorSpanner {
    fn name(&self) -> &str {
        "SetNullableGeneratorSpanner"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::SetNullable
    }

    fn priority(&self) -> i32 {
        PRIORITY_DATABASE
    }

    fn validate(&self, statement: &Statement, _ctx: &GeneratorContext<'_>) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if let Statement::SetNullable(stmt) = statement {
            errors.check_required("tableName", &stmt.table.table_name);
            errors.check_required("columnName", &stmt.column_name);
            errors.check_required("columnDataType", &stmt.column_data_type);
        }
        errors
    }

    fn generate(&self, statement: &Statement, ctx: &GeneratorContext<'_>) -> Result<Vec<Sql>> {
        let Statement::SetNullable(stmt) = statement else {
            return Err(wrong_statement(self, statement));
        };
        let sql = render_alter_column(
            ctx,
            &stmt.table,
            &stmt.column_name,
            &stmt.column_data_type,
            stmt.nullable,
        )?;
        Ok(vec![
            Sql::new(sql).affecting(DatabaseObject::column(&stmt.table, &stmt.column_name))
        ])
    }
}
