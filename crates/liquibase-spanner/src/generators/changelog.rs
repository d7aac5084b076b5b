//! Bootstrap DDL for the changelog tracking tables.
//!
//! The table layouts are a contract with other tooling reading these
//! tables, so the text is emitted verbatim with only the table name
//! substituted.

use crate::core::catalog::GeneratorContext;
use crate::core::statement::{
    ColumnAssignment, DatabaseObject, DeleteStatement, InsertStatement, Sql, Statement,
    StatementKind, TableRef,
};
use crate::core::traits::{SqlGenerator, PRIORITY_DATABASE};
use crate::error::Result;

const TABLE_NAME_PLACEHOLDER: &str = "__TABLE_NAME__";

const CHANGELOG_TABLE_GOOGLESQL: &str = "CREATE TABLE __TABLE_NAME__
(
    id            string(MAX) not null,
    author        string(MAX) not null,
    filename      string(MAX) not null,
    dateExecuted  timestamp   not null,
    orderExecuted int64       not null,
    execType      string(MAX),
    md5sum        string(MAX),
    description   string(MAX),
    comments      string(MAX),
    tag           string(MAX),
    liquibase     string(MAX),
    contexts      string(MAX),
    labels        string(MAX),
    deployment_id string(MAX),
) primary key (id, author, filename);";

const CHANGELOG_TABLE_POSTGRESQL: &str = "CREATE TABLE public.__TABLE_NAME__
(
    id            varchar(255) not null,
    author        varchar(255) not null,
    filename      varchar(255) not null,
    dateExecuted  timestamptz  not null,
    orderExecuted bigint       not null,
    execType      varchar(255),
    md5sum        varchar(255),
    description   varchar(255),
    comments      varchar(255),
    tag           varchar(255),
    liquibase     varchar(255),
    contexts      varchar(255),
    labels        varchar(255),
    deployment_id varchar(255),
    PRIMARY KEY (id, author, filename)
);";

const LOCK_TABLE_GOOGLESQL: &str = "CREATE TABLE __TABLE_NAME__
(
    id          int64,
    locked      bool,
    lockgranted timestamp,
    lockedby    string(max),
) primary key (id)";

const LOCK_TABLE_POSTGRESQL: &str = "CREATE TABLE public.__TABLE_NAME__
(
    id          bigint primary key,
    locked      bool,
    lockgranted timestamptz,
    lockedby    varchar
)";

fn bootstrap_sql(template: &str, table_name: &str) -> Sql {
    let text = template.replace(TABLE_NAME_PLACEHOLDER, table_name);
    // The changelog templates carry their own terminator.
    let sql = if text.ends_with(';') {
        Sql::new(text).with_delimiter("")
    } else {
        Sql::new(text)
    };
    sql.affecting(DatabaseObject::Table {
        name: table_name.to_string(),
    })
}

pub struct CreateDatabaseChangeLogTableGeneratorSpanner;

impl SqlGenerator for CreateDatabaseChangeLogTableGeneratorSpanner {
    fn name(&self) -> &str {
        "CreateDatabaseChangeLogTableGeneratorSpanner"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::CreateChangeLogTable
    }

    fn priority(&self) -> i32 {
        PRIORITY_DATABASE
    }

    fn generate(&self, _statement: &Statement, ctx: &GeneratorContext<'_>) -> Result<Vec<Sql>> {
        let template = if ctx.dialect.is_postgresql() {
            CHANGELOG_TABLE_POSTGRESQL
        } else {
            CHANGELOG_TABLE_GOOGLESQL
        };
        Ok(vec![bootstrap_sql(template, &ctx.changelog.table_name)])
    }
}

pub struct CreateDatabaseChangeLogLockTableGeneratorSpanner;

impl SqlGenerator for CreateDatabaseChangeLogLockTableGeneratorSpanner {
    fn name(&self) -> &str {
        "CreateDatabaseChangeLogLockTableGeneratorSpanner"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::CreateChangeLogLockTable
    }

    fn priority(&self) -> i32 {
        PRIORITY_DATABASE
    }

    fn generate(&self, _statement: &Statement, ctx: &GeneratorContext<'_>) -> Result<Vec<Sql>> {
        let template = if ctx.dialect.is_postgresql() {
            LOCK_TABLE_POSTGRESQL
        } else {
            LOCK_TABLE_GOOGLESQL
        };
        Ok(vec![bootstrap_sql(template, &ctx.changelog.lock_table_name)])
    }
}

/// Clears the lock table and inserts the single unlocked row, going through
/// the delete and insert generators.
pub struct InitializeChangeLogLockTableGeneratorSpanner;

impl SqlGenerator for InitializeChangeLogLockTableGeneratorSpanner {
    fn name(&self) -> &str {
        "InitializeChangeLogLockTableGeneratorSpanner"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::InitializeChangeLogLockTable
    }

    fn priority(&self) -> i32 {
        PRIORITY_DATABASE
    }

    fn generate(&self, _statement: &Statement, ctx: &GeneratorContext<'_>) -> Result<Vec<Sql>> {
        let table = TableRef::new(&ctx.changelog.lock_table_name);
        let statements = [
            Statement::Delete(DeleteStatement {
                table: table.clone(),
                where_clause: Some("true".to_string()),
            }),
            Statement::Insert(InsertStatement {
                table,
                columns: vec![
                    ColumnAssignment::new("ID", 1),
                    ColumnAssignment::new("LOCKED", false),
                ],
            }),
        ];
        ctx.registry.generate_all(&statements, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChangelogConfig;
    use crate::core::catalog::GeneratorRegistry;
    use crate::drivers::spanner::{DatabaseDialect, OfflineSchemaReader};

    fn generate(
        dialect: DatabaseDialect,
        changelog: ChangelogConfig,
        statement: Statement,
    ) -> Vec<Sql> {
        let registry = GeneratorRegistry::with_builtins();
        let reader = OfflineSchemaReader;
        let ctx = GeneratorContext::new(dialect, &registry, &reader).with_changelog(changelog);
        registry.generate(&statement, &ctx).unwrap()
    }

    // =========================================================================
    // Changelog table
    // =========================================================================

    #[test]
    fn test_changelog_table_native_verbatim() {
        let sql = generate(
            DatabaseDialect::GoogleStandardSql,
            ChangelogConfig::default(),
            Statement::CreateChangeLogTable,
        );
        assert_eq!(sql.len(), 1);
        assert_eq!(
            sql[0].text,
            "CREATE TABLE DATABASECHANGELOG\n(\n    id            string(MAX) not null,\n    author        string(MAX) not null,\n    filename      string(MAX) not null,\n    dateExecuted  timestamp   not null,\n    orderExecuted int64       not null,\n    execType      string(MAX),\n    md5sum        string(MAX),\n    description   string(MAX),\n    comments      string(MAX),\n    tag           string(MAX),\n    liquibase     string(MAX),\n    contexts      string(MAX),\n    labels        string(MAX),\n    deployment_id string(MAX),\n) primary key (id, author, filename);"
        );
        assert_eq!(sql[0].end_delimiter, "");
    }

    #[test]
    fn test_changelog_table_pg_custom_name() {
        let changelog = ChangelogConfig {
            table_name: "MIGRATIONS".into(),
            ..Default::default()
        };
        let sql = generate(
            DatabaseDialect::Postgresql,
            changelog,
            Statement::CreateChangeLogTable,
        );
        assert!(sql[0].text.starts_with("CREATE TABLE public.MIGRATIONS\n(\n"));
        assert!(sql[0]
            .text
            .ends_with("    deployment_id varchar(255),\n    PRIMARY KEY (id, author, filename)\n);"));
    }

    // =========================================================================
    // Lock table
    // =========================================================================

    #[test]
    fn test_lock_table_native_verbatim() {
        let sql = generate(
            DatabaseDialect::GoogleStandardSql,
            ChangelogConfig::default(),
            Statement::CreateChangeLogLockTable,
        );
        assert_eq!(
            sql[0].text,
            "CREATE TABLE DATABASECHANGELOGLOCK\n(\n    id          int64,\n    locked      bool,\n    lockgranted timestamp,\n    lockedby    string(max),\n) primary key (id)"
        );
        assert_eq!(sql[0].end_delimiter, ";");
    }

    #[test]
    fn test_lock_table_pg_verbatim() {
        let sql = generate(
            DatabaseDialect::Postgresql,
            ChangelogConfig::default(),
            Statement::CreateChangeLogLockTable,
        );
        assert_eq!(
            sql[0].text,
            "CREATE TABLE public.DATABASECHANGELOGLOCK\n(\n    id          bigint primary key,\n    locked      bool,\n    lockgranted timestamptz,\n    lockedby    varchar\n)"
        );
    }

    #[test]
    fn test_initialize_lock_table() {
        let sql: Vec<String> = generate(
            DatabaseDialect::GoogleStandardSql,
            ChangelogConfig::default(),
            Statement::InitializeChangeLogLockTable,
        )
        .into_iter()
        .map(|s| s.text)
        .collect();
        assert_eq!(
            sql,
            vec![
                "DELETE FROM DATABASECHANGELOGLOCK WHERE true",
                "INSERT INTO DATABASECHANGELOGLOCK (ID, LOCKED) VALUES (1, FALSE)",
            ]
        );
    }
}
