//! Portable generators.
//!
//! These render plain SQL that most engines accept and are registered at
//! [`PRIORITY_DEFAULT`](crate::core::PRIORITY_DEFAULT). Spanner overrides
//! registered at a higher priority replace them where the engine needs
//! something different; the render helpers here are shared with those
//! overrides.

use crate::core::catalog::{GeneratorContext, GeneratorRegistry};
use crate::core::statement::{
    AddForeignKeyStatement, ColumnAssignment, DatabaseObject, Sql, Statement, StatementKind,
    TableRef,
};
use crate::core::traits::{SqlGenerator, ValidationErrors};
use crate::error::Result;

use super::wrong_statement;

/// `(a, b)` and `(1, 'x')` for an insert.
pub(crate) fn render_insert_lists(
    ctx: &GeneratorContext<'_>,
    columns: &[ColumnAssignment],
) -> Result<(String, String)> {
    let mut names = Vec::with_capacity(columns.len());
    let mut values = Vec::with_capacity(columns.len());
    for column in columns {
        names.push(ctx.dialect.escape_object_name(&column.name)?);
        values.push(ctx.dialect.value_to_sql(&column.value)?);
    }
    Ok((names.join(", "), values.join(", ")))
}

/// `a = 1, b = 'x'` for an update.
pub(crate) fn render_assignments(
    ctx: &GeneratorContext<'_>,
    columns: &[&ColumnAssignment],
) -> Result<String> {
    let parts = columns
        .iter()
        .map(|c| {
            Ok(format!(
                "{} = {}",
                ctx.dialect.escape_object_name(&c.name)?,
                ctx.dialect.value_to_sql(&c.value)?
            ))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(parts.join(", "))
}

pub(crate) fn render_insert(
    ctx: &GeneratorContext<'_>,
    table: &TableRef,
    columns: &[ColumnAssignment],
) -> Result<String> {
    let (names, values) = render_insert_lists(ctx, columns)?;
    Ok(format!(
        "INSERT INTO {} ({}) VALUES ({})",
        ctx.dialect.escape_table_name(table)?,
        names,
        values
    ))
}

pub(crate) fn render_update(
    ctx: &GeneratorContext<'_>,
    table: &TableRef,
    columns: &[&ColumnAssignment],
    where_clause: Option<&str>,
) -> Result<String> {
    let mut sql = format!(
        "UPDATE {} SET {}",
        ctx.dialect.escape_table_name(table)?,
        render_assignments(ctx, columns)?
    );
    if let Some(clause) = where_clause {
        sql.push_str(" WHERE ");
        sql.push_str(clause);
    }
    Ok(sql)
}

pub(crate) fn render_delete(
    ctx: &GeneratorContext<'_>,
    table: &TableRef,
    where_clause: Option<&str>,
) -> Result<String> {
    let mut sql = format!("DELETE FROM {}", ctx.dialect.escape_table_name(table)?);
    if let Some(clause) = where_clause {
        sql.push_str(" WHERE ");
        sql.push_str(clause);
    }
    Ok(sql)
}

/// `ALTER TABLE .. ADD CONSTRAINT <name> FOREIGN KEY ..`. A missing name
/// leaves an empty slot in the statement.
pub(crate) fn render_add_foreign_key(
    ctx: &GeneratorContext<'_>,
    stmt: &AddForeignKeyStatement,
) -> Result<String> {
    let name = match stmt.constraint_name.as_deref() {
        Some(name) if !name.is_empty() => ctx.dialect.escape_object_name(name)?,
        _ => String::new(),
    };
    let mut sql = format!(
        "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
        ctx.dialect.escape_table_name(&stmt.base_table)?,
        name,
        ctx.dialect.escape_column_list(&stmt.base_column_names)?,
        ctx.dialect.escape_table_name(&stmt.referenced_table)?,
        ctx.dialect.escape_column_list(&stmt.referenced_column_names)?
    );
    if let Some(on_update) = &stmt.on_update {
        sql.push_str(" ON UPDATE ");
        sql.push_str(on_update);
    }
    if let Some(on_delete) = &stmt.on_delete {
        sql.push_str(" ON DELETE ");
        sql.push_str(on_delete);
    }
    Ok(sql)
}

/// Trimmed, non-empty where clause.
pub(crate) fn where_clause(clause: &Option<String>) -> Option<&str> {
    clause.as_deref().map(str::trim).filter(|c| !c.is_empty())
}

pub struct InsertGenerator;

impl SqlGenerator for InsertGenerator {
    fn name(&self) -> &str {
        "InsertGenerator"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::Insert
    }

    fn validate(&self, statement: &Statement, _ctx: &GeneratorContext<'_>) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if let Statement::Insert(stmt) = statement {
            errors.check_required("tableName", &stmt.table.table_name);
            if stmt.columns.is_empty() {
                errors.add("columns is required");
            }
        }
        errors
    }

    fn generate(&self, statement: &Statement, ctx: &GeneratorContext<'_>) -> Result<Vec<Sql>> {
        let Statement::Insert(stmt) = statement else {
            return Err(wrong_statement(self, statement));
        };
        let sql = render_insert(ctx, &stmt.table, &stmt.columns)?;
        Ok(vec![Sql::new(sql).affecting(DatabaseObject::table(&stmt.table))])
    }
}

pub struct UpdateGenerator;

impl SqlGenerator for UpdateGenerator {
    fn name(&self) -> &str {
        "UpdateGenerator"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::Update
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
        let sql = render_update(ctx, &stmt.table, &columns, where_clause(&stmt.where_clause))?;
        Ok(vec![Sql::new(sql).affecting(DatabaseObject::table(&stmt.table))])
    }
}

pub struct DeleteGenerator;

impl SqlGenerator for DeleteGenerator {
    fn name(&self) -> &str {
        "DeleteGenerator"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::Delete
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
        let sql = render_delete(ctx, &stmt.table, where_clause(&stmt.where_clause))?;
        Ok(vec![Sql::new(sql).affecting(DatabaseObject::table(&stmt.table))])
    }
}

pub struct AddForeignKeyGenerator;

impl SqlGenerator for AddForeignKeyGenerator {
    fn name(&self) -> &str {
        "AddForeignKeyConstraintGenerator"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::AddForeignKey
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
        let sql = render_add_foreign_key(ctx, stmt)?;
        Ok(vec![Sql::new(sql).affecting(DatabaseObject::ForeignKey {
            table: stmt.base_table.table_name.clone(),
            name: stmt.constraint_name.clone().unwrap_or_default(),
        })])
    }
}

pub struct DropForeignKeyGenerator;

impl SqlGenerator for DropForeignKeyGenerator {
    fn name(&self) -> &str {
        "DropForeignKeyConstraintGenerator"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::DropForeignKey
    }

    fn validate(&self, statement: &Statement, _ctx: &GeneratorContext<'_>) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if let Statement::DropForeignKey(stmt) = statement {
            errors.check_required("baseTableName", &stmt.table.table_name);
            errors.check_required("constraintName", &stmt.constraint_name);
        }
        errors
    }

    fn generate(&self, statement: &Statement, ctx: &GeneratorContext<'_>) -> Result<Vec<Sql>> {
        let Statement::DropForeignKey(stmt) = statement else {
            return Err(wrong_statement(self, statement));
        };
        let sql = format!(
            "ALTER TABLE {} DROP CONSTRAINT {}",
            ctx.dialect.escape_table_name(&stmt.table)?,
            ctx.dialect.escape_object_name(&stmt.constraint_name)?
        );
        Ok(vec![Sql::new(sql).affecting(DatabaseObject::ForeignKey {
            table: stmt.table.table_name.clone(),
            name: stmt.constraint_name.clone(),
        })])
    }
}

pub struct RenameColumnGenerator;

impl SqlGenerator for RenameColumnGenerator {
    fn name(&self) -> &str {
        "RenameColumnGenerator"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::RenameColumn
    }

    fn generate(&self, statement: &Statement, ctx: &GeneratorContext<'_>) -> Result<Vec<Sql>> {
        let Statement::RenameColumn(stmt) = statement else {
            return Err(wrong_statement(self, statement));
        };
        let sql = format!(
            "ALTER TABLE {} RENAME COLUMN {} TO {}",
            ctx.dialect.escape_table_name(&stmt.table)?,
            ctx.dialect.escape_object_name(&stmt.old_column_name)?,
            ctx.dialect.escape_object_name(&stmt.new_column_name)?
        );
        Ok(vec![Sql::new(sql)
            .affecting(DatabaseObject::column(&stmt.table, &stmt.old_column_name))
            .affecting(DatabaseObject::column(&stmt.table, &stmt.new_column_name))])
    }
}

pub struct RenameTableGenerator;

impl SqlGenerator for RenameTableGenerator {
    fn name(&self) -> &str {
        "RenameTableGenerator"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::RenameTable
    }

    fn validate(&self, statement: &Statement, _ctx: &GeneratorContext<'_>) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if let Statement::RenameTable(stmt) = statement {
            errors.check_required("oldTableName", &stmt.old_table_name);
            errors.check_required("newTableName", &stmt.new_table_name);
        }
        errors
    }

    fn generate(&self, statement: &Statement, ctx: &GeneratorContext<'_>) -> Result<Vec<Sql>> {
        let Statement::RenameTable(stmt) = statement else {
            return Err(wrong_statement(self, statement));
        };
        let sql = format!(
            "ALTER TABLE {} RENAME TO {}",
            ctx.dialect.escape_object_name(&stmt.old_table_name)?,
            ctx.dialect.escape_object_name(&stmt.new_table_name)?
        );
        Ok(vec![Sql::new(sql)
            .affecting(DatabaseObject::Table {
                name: stmt.old_table_name.clone(),
            })
            .affecting(DatabaseObject::Table {
                name: stmt.new_table_name.clone(),
            })])
    }
}

pub struct AddPrimaryKeyGenerator;

impl SqlGenerator for AddPrimaryKeyGenerator {
    fn name(&self) -> &str {
        "AddPrimaryKeyGenerator"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::AddPrimaryKey
    }

    fn generate(&self, statement: &Statement, ctx: &GeneratorContext<'_>) -> Result<Vec<Sql>> {
        let Statement::AddPrimaryKey(stmt) = statement else {
            return Err(wrong_statement(self, statement));
        };
        let sql = format!(
            "ALTER TABLE {} ADD {}PRIMARY KEY ({})",
            ctx.dialect.escape_table_name(&stmt.table)?,
            constraint_prefix(ctx, stmt.constraint_name.as_deref())?,
            ctx.dialect.escape_column_list(&stmt.column_names)?
        );
        Ok(vec![Sql::new(sql).affecting(DatabaseObject::PrimaryKey {
            table: stmt.table.table_name.clone(),
        })])
    }
}

pub struct AddUniqueConstraintGenerator;

impl SqlGenerator for AddUniqueConstraintGenerator {
    fn name(&self) -> &str {
        "AddUniqueConstraintGenerator"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::AddUniqueConstraint
    }

    fn generate(&self, statement: &Statement, ctx: &GeneratorContext<'_>) -> Result<Vec<Sql>> {
        let Statement::AddUniqueConstraint(stmt) = statement else {
            return Err(wrong_statement(self, statement));
        };
        let sql = format!(
            "ALTER TABLE {} ADD {}UNIQUE ({})",
            ctx.dialect.escape_table_name(&stmt.table)?,
            constraint_prefix(ctx, stmt.constraint_name.as_deref())?,
            ctx.dialect.escape_column_list(&stmt.column_names)?
        );
        Ok(vec![Sql::new(sql).affecting(DatabaseObject::table(&stmt.table))])
    }
}

fn constraint_prefix(ctx: &GeneratorContext<'_>, name: Option<&str>) -> Result<String> {
    Ok(match name {
        Some(name) if !name.is_empty() => {
            format!("CONSTRAINT {} ", ctx.dialect.escape_object_name(name)?)
        }
        _ => String::new(),
    })
}

pub struct CreateIndexGenerator;

impl SqlGenerator for CreateIndexGenerator {
    fn name(&self) -> &str {
        "CreateIndexGenerator"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::CreateIndex
    }

    fn validate(&self, statement: &Statement, _ctx: &GeneratorContext<'_>) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if let Statement::CreateIndex(stmt) = statement {
            errors.check_required("tableName", &stmt.table.table_name);
            errors.check_required("indexName", &stmt.index_name);
            if stmt.columns.is_empty() {
                errors.add("columns is required");
            }
        }
        errors
    }

    fn generate(&self, statement: &Statement, ctx: &GeneratorContext<'_>) -> Result<Vec<Sql>> {
        let Statement::CreateIndex(stmt) = statement else {
            return Err(wrong_statement(self, statement));
        };
        let sql = format!(
            "CREATE {}INDEX {} ON {} ({})",
            if stmt.unique { "UNIQUE " } else { "" },
            ctx.dialect.escape_object_name(&stmt.index_name)?,
            ctx.dialect.escape_table_name(&stmt.table)?,
            ctx.dialect.escape_column_list(&stmt.columns)?
        );
        Ok(vec![Sql::new(sql).affecting(DatabaseObject::Index {
            name: stmt.index_name.clone(),
        })])
    }
}

pub struct DropIndexGenerator;

impl SqlGenerator for DropIndexGenerator {
    fn name(&self) -> &str {
        "DropIndexGenerator"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::DropIndex
    }

    fn generate(&self, statement: &Statement, ctx: &GeneratorContext<'_>) -> Result<Vec<Sql>> {
        let Statement::DropIndex(stmt) = statement else {
            return Err(wrong_statement(self, statement));
        };
        let sql = format!("DROP INDEX {}", ctx.dialect.escape_object_name(&stmt.index_name)?);
        Ok(vec![Sql::new(sql).affecting(DatabaseObject::Index {
            name: stmt.index_name.clone(),
        })])
    }
}

pub struct DropTableGenerator;

impl SqlGenerator for DropTableGenerator {
    fn name(&self) -> &str {
        "DropTableGenerator"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::DropTable
    }

    fn generate(&self, statement: &Statement, ctx: &GeneratorContext<'_>) -> Result<Vec<Sql>> {
        let Statement::DropTable(stmt) = statement else {
            return Err(wrong_statement(self, statement));
        };
        let sql = format!("DROP TABLE {}", ctx.dialect.escape_table_name(&stmt.table)?);
        Ok(vec![Sql::new(sql).affecting(DatabaseObject::table(&stmt.table))])
    }
}

pub struct DropColumnGenerator;

impl SqlGenerator for DropColumnGenerator {
    fn name(&self) -> &str {
        "DropColumnGenerator"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::DropColumn
    }

    fn validate(&self, statement: &Statement, _ctx: &GeneratorContext<'_>) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if let Statement::DropColumn(stmt) = statement {
            errors.check_required("tableName", &stmt.table.table_name);
            errors.check_required("columnName", &stmt.column_name);
        }
        errors
    }

    fn generate(&self, statement: &Statement, ctx: &GeneratorContext<'_>) -> Result<Vec<Sql>> {
        let Statement::DropColumn(stmt) = statement else {
            return Err(wrong_statement(self, statement));
        };
        let sql = format!(
            "ALTER TABLE {} DROP COLUMN {}",
            ctx.dialect.escape_table_name(&stmt.table)?,
            ctx.dialect.escape_object_name(&stmt.column_name)?
        );
        Ok(vec![Sql::new(sql).affecting(DatabaseObject::column(&stmt.table, &stmt.column_name))])
    }
}

pub struct DropViewGenerator;

impl SqlGenerator for DropViewGenerator {
    fn name(&self) -> &str {
        "DropViewGenerator"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::DropView
    }

    fn generate(&self, statement: &Statement, ctx: &GeneratorContext<'_>) -> Result<Vec<Sql>> {
        let Statement::DropView(stmt) = statement else {
            return Err(wrong_statement(self, statement));
        };
        let sql = format!("DROP VIEW {}", ctx.dialect.escape_object_name(&stmt.view_name)?);
        Ok(vec![Sql::new(sql).affecting(DatabaseObject::View {
            name: stmt.view_name.clone(),
        })])
    }
}

pub struct DropSequenceGenerator;

impl SqlGenerator for DropSequenceGenerator {
    fn name(&self) -> &str {
        "DropSequenceGenerator"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::DropSequence
    }

    fn generate(&self, statement: &Statement, ctx: &GeneratorContext<'_>) -> Result<Vec<Sql>> {
        let Statement::DropSequence(stmt) = statement else {
            return Err(wrong_statement(self, statement));
        };
        let sql = format!(
            "DROP SEQUENCE {}",
            ctx.dialect.escape_object_name(&stmt.sequence_name)?
        );
        Ok(vec![Sql::new(sql).affecting(DatabaseObject::Sequence {
            name: stmt.sequence_name.clone(),
        })])
    }
}

/// Raw SQL pass-through. A trailing `;` is stripped; the delimiter is added
/// back on output.
pub struct RawSqlGenerator;

impl SqlGenerator for RawSqlGenerator {
    fn name(&self) -> &str {
        "RawSqlGenerator"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::Sql
    }

    fn validate(&self, statement: &Statement, _ctx: &GeneratorContext<'_>) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if let Statement::Sql(stmt) = statement {
            errors.check_required("sql", &stmt.sql);
        }
        errors
    }

    fn generate(&self, statement: &Statement, _ctx: &GeneratorContext<'_>) -> Result<Vec<Sql>> {
        let Statement::Sql(stmt) = statement else {
            return Err(wrong_statement(self, statement));
        };
        let text = stmt.sql.trim().trim_end_matches(';').trim_end();
        Ok(vec![Sql::new(text)])
    }
}

/// Register every portable generator.
pub(crate) fn register(registry: &mut GeneratorRegistry) {
    registry.register(InsertGenerator);
    registry.register(UpdateGenerator);
    registry.register(DeleteGenerator);
    registry.register(AddForeignKeyGenerator);
    registry.register(DropForeignKeyGenerator);
    registry.register(RenameColumnGenerator);
    registry.register(RenameTableGenerator);
    registry.register(AddPrimaryKeyGenerator);
    registry.register(AddUniqueConstraintGenerator);
    registry.register(CreateIndexGenerator);
    registry.register(DropIndexGenerator);
    registry.register(DropTableGenerator);
    registry.register(DropColumnGenerator);
    registry.register(DropViewGenerator);
    registry.register(DropSequenceGenerator);
    registry.register(RawSqlGenerator);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::statement::{
        CreateIndexStatement, DeleteStatement, DropColumnStatement, InsertStatement,
        RawSqlStatement, RenameTableStatement,
    };
    use crate::drivers::spanner::{DatabaseDialect, OfflineSchemaReader};

    fn render(generator: &dyn SqlGenerator, statement: Statement) -> Vec<String> {
        let registry = GeneratorRegistry::new();
        let reader = OfflineSchemaReader;
        let ctx = GeneratorContext::new(DatabaseDialect::GoogleStandardSql, &registry, &reader);
        generator
            .generate(&statement, &ctx)
            .unwrap()
            .into_iter()
            .map(|s| s.text)
            .collect()
    }

    #[test]
    fn test_insert() {
        let sql = render(
            &InsertGenerator,
            Statement::Insert(InsertStatement {
                table: TableRef::new("Singers"),
                columns: vec![
                    ColumnAssignment::new("SingerId", 1),
                    ColumnAssignment::new("LastName", "O'Brien"),
                ],
            }),
        );
        assert_eq!(
            sql,
            vec!["INSERT INTO Singers (SingerId, LastName) VALUES (1, 'O\\'Brien')"]
        );
    }

    #[test]
    fn test_portable_delete_omits_empty_where() {
        let sql = render(
            &DeleteGenerator,
            Statement::Delete(DeleteStatement {
                table: TableRef::new("Singers"),
                where_clause: Some("  ".into()),
            }),
        );
        assert_eq!(sql, vec!["DELETE FROM Singers"]);
    }

    #[test]
    fn test_create_index_and_drop_column() {
        let sql = render(
            &CreateIndexGenerator,
            Statement::CreateIndex(CreateIndexStatement {
                table: TableRef::new("Singers"),
                index_name: "Idx_Singers_Name".into(),
                columns: vec!["LastName".into(), "FirstName".into()],
                unique: true,
            }),
        );
        assert_eq!(
            sql,
            vec!["CREATE UNIQUE INDEX Idx_Singers_Name ON Singers (LastName, FirstName)"]
        );

        let sql = render(
            &DropColumnGenerator,
            Statement::DropColumn(DropColumnStatement {
                table: TableRef::new("Singers"),
                column_name: "FirstName".into(),
            }),
        );
        assert_eq!(sql, vec!["ALTER TABLE Singers DROP COLUMN FirstName"]);
    }

    #[test]
    fn test_rename_table() {
        let sql = render(
            &RenameTableGenerator,
            Statement::RenameTable(RenameTableStatement {
                old_table_name: "Singers".into(),
                new_table_name: "Artists".into(),
            }),
        );
        assert_eq!(sql, vec!["ALTER TABLE Singers RENAME TO Artists"]);
    }

    #[test]
    fn test_raw_sql_strips_trailing_delimiter() {
        let sql = render(
            &RawSqlGenerator,
            Statement::Sql(RawSqlStatement {
                sql: "SELECT 1;\n".into(),
            }),
        );
        assert_eq!(sql, vec!["SELECT 1"]);
    }

    #[test]
    fn test_wrong_statement_is_generation_error() {
        let registry = GeneratorRegistry::new();
        let reader = OfflineSchemaReader;
        let ctx = GeneratorContext::new(DatabaseDialect::GoogleStandardSql, &registry, &reader);
        let err = InsertGenerator
            .generate(&Statement::CreateChangeLogTable, &ctx)
            .unwrap_err();
        assert!(matches!(err, crate::error::MigrateError::Generation(_)));
    }
}
