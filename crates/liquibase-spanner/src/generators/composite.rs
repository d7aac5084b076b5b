//! Multi-statement changes.
//!
//! Both generators here expand one statement into several, delegating the
//! pieces that have their own generators back through the registry so the
//! Spanner overrides apply to them too.

use tracing::info;

use crate::core::catalog::GeneratorContext;
use crate::core::statement::{
    AddColumnStatement, AddForeignKeyStatement, AddLookupTableStatement, ColumnDefinition,
    CreateTableStatement, DatabaseObject, DropColumnStatement, MergeColumnsStatement, Sql,
    Statement, StatementKind,
};
use crate::core::traits::{SqlGenerator, ValidationErrors, PRIORITY_DATABASE};
use crate::error::Result;

use super::standard::render_add_foreign_key;
use super::wrong_statement;

/// Creates a lookup table, fills it from the distinct non-null values of an
/// existing column and points a foreign key at it.
pub struct AddLookupTableGeneratorSpanner;

impl AddLookupTableGeneratorSpanner {
    /// Explicit constraint name, or `FK_<existing>_<new>`.
    fn constraint_name(stmt: &AddLookupTableStatement) -> String {
        match stmt.constraint_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => format!(
                "FK_{}_{}",
                stmt.existing_table.table_name, stmt.new_table.table_name
            ),
        }
    }
}

impl SqlGenerator for AddLookupTableGeneratorSpanner {
    fn name(&self) -> &str {
        "AddLookupTableGeneratorSpanner"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::AddLookupTable
    }

    fn priority(&self) -> i32 {
        PRIORITY_DATABASE
    }

    fn validate(&self, statement: &Statement, _ctx: &GeneratorContext<'_>) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if let Statement::AddLookupTable(stmt) = statement {
            errors.check_required("existingTableName", &stmt.existing_table.table_name);
            errors.check_required("existingColumnName", &stmt.existing_column_name);
            errors.check_required("newTableName", &stmt.new_table.table_name);
            errors.check_required("newColumnName", &stmt.new_column_name);
            errors.check_required("newColumnDataType", &stmt.new_column_data_type);
        }
        errors
    }

    fn generate(&self, statement: &Statement, ctx: &GeneratorContext<'_>) -> Result<Vec<Sql>> {
        let Statement::AddLookupTable(stmt) = statement else {
            return Err(wrong_statement(self, statement));
        };

        let create = CreateTableStatement {
            table: stmt.new_table.clone(),
            ..CreateTableStatement::new(&stmt.new_table.table_name).column(
                ColumnDefinition::new(&stmt.new_column_name, &stmt.new_column_data_type)
                    .primary_key()
                    .not_null(),
            )
        };
        let mut sql = ctx.registry.generate(&Statement::CreateTable(create), ctx)?;

        let new_column = ctx.dialect.escape_object_name(&stmt.new_column_name)?;
        let existing_column = ctx.dialect.escape_object_name(&stmt.existing_column_name)?;
        let fill = format!(
            "INSERT INTO {} ({}) SELECT DISTINCT {} FROM {} WHERE {} IS NOT NULL",
            ctx.dialect.escape_table_name(&stmt.new_table)?,
            new_column,
            existing_column,
            ctx.dialect.escape_table_name(&stmt.existing_table)?,
            existing_column
        );
        sql.push(Sql::new(fill).affecting(DatabaseObject::table(&stmt.new_table)));

        let foreign_key = AddForeignKeyStatement {
            constraint_name: Some(Self::constraint_name(stmt)),
            base_table: stmt.existing_table.clone(),
            base_column_names: vec![stmt.existing_column_name.clone()],
            referenced_table: stmt.new_table.clone(),
            referenced_column_names: vec![stmt.new_column_name.clone()],
            on_update: None,
            on_delete: None,
        };
        sql.push(
            Sql::new(render_add_foreign_key(ctx, &foreign_key)?).affecting(
                DatabaseObject::ForeignKey {
                    table: stmt.existing_table.table_name.clone(),
                    name: Self::constraint_name(stmt),
                },
            ),
        );
        info!(
            "Lookup table {} expanded into {} statements",
            stmt.new_table,
            sql.len()
        );
        Ok(sql)
    }
}

/// Concatenates two columns into a new one and drops the originals.
///
/// The backfill runs as partitioned DML so it is not bound by the mutation
/// limit of a single transaction; the session is switched back to
/// transactional DML right after.
pub struct MergeColumnsGeneratorSpanner;

impl MergeColumnsGeneratorSpanner {
    fn dml_mode(ctx: &GeneratorContext<'_>, mode: &str) -> Sql {
        let variable = if ctx.dialect.is_postgresql() {
            "SPANNER.AUTOCOMMIT_DML_MODE"
        } else {
            "AUTOCOMMIT_DML_MODE"
        };
        Sql::new(format!("SET {}='{}'", variable, mode))
    }
}

impl SqlGenerator for MergeColumnsGeneratorSpanner {
    fn name(&self) -> &str {
        "MergeColumnsGeneratorSpanner"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::MergeColumns
    }

    fn priority(&self) -> i32 {
        PRIORITY_DATABASE
    }

    fn validate(&self, statement: &Statement, _ctx: &GeneratorContext<'_>) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if let Statement::MergeColumns(stmt) = statement {
            errors.check_required("tableName", &stmt.table.table_name);
            errors.check_required("column1Name", &stmt.column1_name);
            errors.check_required("column2Name", &stmt.column2_name);
            errors.check_required("finalColumnName", &stmt.final_column_name);
            errors.check_required("finalColumnType", &stmt.final_column_type);
        }
        errors
    }

    fn generate(&self, statement: &Statement, ctx: &GeneratorContext<'_>) -> Result<Vec<Sql>> {
        let Statement::MergeColumns(stmt) = statement else {
            return Err(wrong_statement(self, statement));
        };
        let registry = ctx.registry;

        let add = AddColumnStatement {
            table: stmt.table.clone(),
            columns: vec![ColumnDefinition::new(
                &stmt.final_column_name,
                &stmt.final_column_type,
            )],
        };
        let mut sql = registry.generate(&Statement::AddColumn(add), ctx)?;

        sql.push(Self::dml_mode(ctx, "PARTITIONED_NON_ATOMIC"));
        let backfill = format!(
            "UPDATE {} SET {} = {} || {} || {} WHERE TRUE",
            ctx.dialect.escape_table_name(&stmt.table)?,
            ctx.dialect.escape_object_name(&stmt.final_column_name)?,
            ctx.dialect.escape_object_name(&stmt.column1_name)?,
            ctx.dialect.string_literal(&stmt.join_string),
            ctx.dialect.escape_object_name(&stmt.column2_name)?
        );
        sql.push(Sql::new(backfill).affecting(DatabaseObject::table(&stmt.table)));
        sql.push(Self::dml_mode(ctx, "TRANSACTIONAL"));

        for column in [&stmt.column1_name, &stmt.column2_name] {
            let drop = DropColumnStatement {
                table: stmt.table.clone(),
                column_name: column.clone(),
            };
            sql.extend(registry.generate(&Statement::DropColumn(drop), ctx)?);
        }
        info!(
            "Merge of {}.{} and {} expanded into {} statements",
            stmt.table,
            stmt.column1_name,
            stmt.column2_name,
            sql.len()
        );
        Ok(sql)
    }
}
