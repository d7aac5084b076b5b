//! Abstract schema-change statements.
//!
//! A [`Statement`] describes one intent ("add column C to table T") without
//! any SQL. Generators registered in the
//! [`GeneratorRegistry`](crate::core::GeneratorRegistry) turn statements into
//! dialect-specific [`Sql`] fragments. Statements are deserializable from the
//! YAML changelog format (`createTable: {tableName: ..., columns: [...]}`).

use std::fmt;

use serde::{Deserialize, Serialize};

use super::value::ColumnValue;

/// Catalog, schema and table name of the table a statement targets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<String>,
    pub table_name: String,
}

impl TableRef {
    /// Reference a table in the default catalog and schema.
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            catalog_name: None,
            schema_name: None,
            table_name: table_name.into(),
        }
    }

    /// Catalog name for metadata queries ("" when unset).
    pub fn catalog_or_default(&self) -> &str {
        self.catalog_name.as_deref().unwrap_or("")
    }

    /// Schema name for metadata queries ("" when unset).
    pub fn schema_or_default(&self) -> &str {
        self.schema_name.as_deref().unwrap_or("")
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.schema_name.as_deref() {
            Some(schema) if !schema.is_empty() => write!(f, "{}.{}", schema, self.table_name),
            _ => f.write_str(&self.table_name),
        }
    }
}

/// A column reference used by metadata lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    pub table: TableRef,
    pub column_name: String,
}

impl ColumnRef {
    pub fn new(table: TableRef, column_name: impl Into<String>) -> Self {
        Self {
            table,
            column_name: column_name.into(),
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table.table_name, self.column_name)
    }
}

/// A column as declared by a createTable or addColumn change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDefinition {
    pub name: String,

    /// Abstract type text, e.g. `varchar(255)` or `ARRAY<STRING>(100)`.
    #[serde(rename = "type")]
    pub data_type: String,

    /// NOT NULL declared by the changelog author.
    #[serde(default)]
    pub not_null: bool,

    /// Column is part of the primary key (when no explicit constraint is given).
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub primary_key: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<ColumnValue>,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            not_null: false,
            primary_key: false,
            default_value: None,
        }
    }

    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: impl Into<ColumnValue>) -> Self {
        self.default_value = Some(value.into());
        self
    }
}

/// Primary key constraint of a createTable statement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrimaryKeyConstraint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTableStatement {
    #[serde(flatten)]
    pub table: TableRef,
    pub columns: Vec<ColumnDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<PrimaryKeyConstraint>,
}

impl CreateTableStatement {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table: TableRef::new(table_name),
            columns: Vec::new(),
            primary_key: None,
        }
    }

    /// Add a column. Primary key columns stay nullable unless declared
    /// NOT NULL; Spanner does not imply it.
    #[must_use]
    pub fn column(mut self, column: ColumnDefinition) -> Self {
        self.columns.push(column);
        self
    }

    /// Primary key columns: the explicit constraint wins over column flags.
    pub fn primary_key_columns(&self) -> Vec<String> {
        match &self.primary_key {
            Some(pk) => pk.columns.clone(),
            None => self
                .columns
                .iter()
                .filter(|c| c.primary_key)
                .map(|c| c.name.clone())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddColumnStatement {
    #[serde(flatten)]
    pub table: TableRef,
    pub columns: Vec<ColumnDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddDefaultValueStatement {
    #[serde(flatten)]
    pub table: TableRef,
    pub column_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_data_type: Option<String>,
    pub default_value: ColumnValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropDefaultValueStatement {
    #[serde(flatten)]
    pub table: TableRef,
    pub column_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_data_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifyDataTypeStatement {
    #[serde(flatten)]
    pub table: TableRef,
    pub column_name: String,
    pub new_data_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetNullableStatement {
    #[serde(flatten)]
    pub table: TableRef,
    pub column_name: String,
    pub column_data_type: String,
    pub nullable: bool,
}

/// Column name and value pair, kept in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnAssignment {
    pub name: String,
    pub value: ColumnValue,
}

impl ColumnAssignment {
    pub fn new(name: impl Into<String>, value: impl Into<ColumnValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertStatement {
    #[serde(flatten)]
    pub table: TableRef,
    pub columns: Vec<ColumnAssignment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertOrUpdateStatement {
    #[serde(flatten)]
    pub table: TableRef,
    pub columns: Vec<ColumnAssignment>,
    /// Comma separated primary key column names.
    pub primary_key: String,
    #[serde(default)]
    pub only_update: bool,
}

impl InsertOrUpdateStatement {
    /// Primary key column names, trimmed.
    pub fn primary_key_columns(&self) -> Vec<&str> {
        self.primary_key
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatement {
    #[serde(flatten)]
    pub table: TableRef,
    pub new_values: Vec<ColumnAssignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub where_clause: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteStatement {
    #[serde(flatten)]
    pub table: TableRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub where_clause: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddForeignKeyStatement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint_name: Option<String>,
    pub base_table: TableRef,
    pub base_column_names: Vec<String>,
    pub referenced_table: TableRef,
    pub referenced_column_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_update: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_delete: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropForeignKeyStatement {
    #[serde(flatten)]
    pub table: TableRef,
    pub constraint_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropAllForeignKeysStatement {
    #[serde(flatten)]
    pub table: TableRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddLookupTableStatement {
    pub existing_table: TableRef,
    pub existing_column_name: String,
    pub new_table: TableRef,
    pub new_column_name: String,
    pub new_column_data_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeColumnsStatement {
    #[serde(flatten)]
    pub table: TableRef,
    pub column1_name: String,
    #[serde(default)]
    pub join_string: String,
    pub column2_name: String,
    pub final_column_name: String,
    pub final_column_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSequenceStatement {
    pub sequence_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_value: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub increment_by: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordered: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlterSequenceStatement {
    pub sequence_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub increment_by: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameSequenceStatement {
    pub old_sequence_name: String,
    pub new_sequence_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropSequenceStatement {
    pub sequence_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateViewStatement {
    pub view_name: String,
    pub select_query: String,
    #[serde(default)]
    pub replace_if_exists: bool,
    /// `select_query` already contains the full `CREATE VIEW` text.
    #[serde(default)]
    pub full_definition: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameViewStatement {
    pub old_view_name: String,
    pub new_view_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropViewStatement {
    pub view_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameColumnStatement {
    #[serde(flatten)]
    pub table: TableRef,
    pub old_column_name: String,
    pub new_column_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameTableStatement {
    pub old_table_name: String,
    pub new_table_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropColumnStatement {
    #[serde(flatten)]
    pub table: TableRef,
    pub column_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropTableStatement {
    #[serde(flatten)]
    pub table: TableRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIndexStatement {
    #[serde(flatten)]
    pub table: TableRef,
    pub index_name: String,
    pub columns: Vec<String>,
    #[serde(default)]
    pub unique: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropIndexStatement {
    pub index_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPrimaryKeyStatement {
    #[serde(flatten)]
    pub table: TableRef,
    pub column_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropPrimaryKeyStatement {
    #[serde(flatten)]
    pub table: TableRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddUniqueConstraintStatement {
    #[serde(flatten)]
    pub table: TableRef,
    pub column_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropUniqueConstraintStatement {
    #[serde(flatten)]
    pub table: TableRef,
    pub constraint_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProcedureStatement {
    pub procedure_name: String,
    pub procedure_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropProcedureStatement {
    pub procedure_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSqlStatement {
    pub sql: String,
}

/// One abstract schema-changing intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Statement {
    CreateTable(CreateTableStatement),
    AddColumn(AddColumnStatement),
    AddDefaultValue(AddDefaultValueStatement),
    DropDefaultValue(DropDefaultValueStatement),
    ModifyDataType(ModifyDataTypeStatement),
    SetNullable(SetNullableStatement),
    Insert(InsertStatement),
    InsertOrUpdate(InsertOrUpdateStatement),
    Update(UpdateStatement),
    Delete(DeleteStatement),
    AddForeignKey(AddForeignKeyStatement),
    DropForeignKey(DropForeignKeyStatement),
    DropAllForeignKeys(DropAllForeignKeysStatement),
    AddLookupTable(AddLookupTableStatement),
    MergeColumns(MergeColumnsStatement),
    CreateSequence(CreateSequenceStatement),
    AlterSequence(AlterSequenceStatement),
    RenameSequence(RenameSequenceStatement),
    DropSequence(DropSequenceStatement),
    CreateView(CreateViewStatement),
    RenameView(RenameViewStatement),
    DropView(DropViewStatement),
    RenameColumn(RenameColumnStatement),
    RenameTable(RenameTableStatement),
    DropColumn(DropColumnStatement),
    DropTable(DropTableStatement),
    CreateIndex(CreateIndexStatement),
    DropIndex(DropIndexStatement),
    AddPrimaryKey(AddPrimaryKeyStatement),
    DropPrimaryKey(DropPrimaryKeyStatement),
    AddUniqueConstraint(AddUniqueConstraintStatement),
    DropUniqueConstraint(DropUniqueConstraintStatement),
    CreateProcedure(CreateProcedureStatement),
    DropProcedure(DropProcedureStatement),
    CreateChangeLogTable,
    CreateChangeLogLockTable,
    InitializeChangeLogLockTable,
    Sql(RawSqlStatement),
}

/// Fieldless key of a [`Statement`] variant, used for generator lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StatementKind {
    CreateTable,
    AddColumn,
    AddDefaultValue,
    DropDefaultValue,
    ModifyDataType,
    SetNullable,
    Insert,
    InsertOrUpdate,
    Update,
    Delete,
    AddForeignKey,
    DropForeignKey,
    DropAllForeignKeys,
    AddLookupTable,
    MergeColumns,
    CreateSequence,
    AlterSequence,
    RenameSequence,
    DropSequence,
    CreateView,
    RenameView,
    DropView,
    RenameColumn,
    RenameTable,
    DropColumn,
    DropTable,
    CreateIndex,
    DropIndex,
    AddPrimaryKey,
    DropPrimaryKey,
    AddUniqueConstraint,
    DropUniqueConstraint,
    CreateProcedure,
    DropProcedure,
    CreateChangeLogTable,
    CreateChangeLogLockTable,
    InitializeChangeLogLockTable,
    Sql,
}

impl StatementKind {
    /// Changelog name of the statement kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            StatementKind::CreateTable => "createTable",
            StatementKind::AddColumn => "addColumn",
            StatementKind::AddDefaultValue => "addDefaultValue",
            StatementKind::DropDefaultValue => "dropDefaultValue",
            StatementKind::ModifyDataType => "modifyDataType",
            StatementKind::SetNullable => "setNullable",
            StatementKind::Insert => "insert",
            StatementKind::InsertOrUpdate => "insertOrUpdate",
            StatementKind::Update => "update",
            StatementKind::Delete => "delete",
            StatementKind::AddForeignKey => "addForeignKey",
            StatementKind::DropForeignKey => "dropForeignKey",
            StatementKind::DropAllForeignKeys => "dropAllForeignKeys",
            StatementKind::AddLookupTable => "addLookupTable",
            StatementKind::MergeColumns => "mergeColumns",
            StatementKind::CreateSequence => "createSequence",
            StatementKind::AlterSequence => "alterSequence",
            StatementKind::RenameSequence => "renameSequence",
            StatementKind::DropSequence => "dropSequence",
            StatementKind::CreateView => "createView",
            StatementKind::RenameView => "renameView",
            StatementKind::DropView => "dropView",
            StatementKind::RenameColumn => "renameColumn",
            StatementKind::RenameTable => "renameTable",
            StatementKind::DropColumn => "dropColumn",
            StatementKind::DropTable => "dropTable",
            StatementKind::CreateIndex => "createIndex",
            StatementKind::DropIndex => "dropIndex",
            StatementKind::AddPrimaryKey => "addPrimaryKey",
            StatementKind::DropPrimaryKey => "dropPrimaryKey",
            StatementKind::AddUniqueConstraint => "addUniqueConstraint",
            StatementKind::DropUniqueConstraint => "dropUniqueConstraint",
            StatementKind::CreateProcedure => "createProcedure",
            StatementKind::DropProcedure => "dropProcedure",
            StatementKind::CreateChangeLogTable => "createChangeLogTable",
            StatementKind::CreateChangeLogLockTable => "createChangeLogLockTable",
            StatementKind::InitializeChangeLogLockTable => "initializeChangeLogLockTable",
            StatementKind::Sql => "sql",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Statement {
    /// The registry key of this statement.
    pub fn kind(&self) -> StatementKind {
        match self {
            Statement::CreateTable(_) => StatementKind::CreateTable,
            Statement::AddColumn(_) => StatementKind::AddColumn,
            Statement::AddDefaultValue(_) => StatementKind::AddDefaultValue,
            Statement::DropDefaultValue(_) => StatementKind::DropDefaultValue,
            Statement::ModifyDataType(_) => StatementKind::ModifyDataType,
            Statement::SetNullable(_) => StatementKind::SetNullable,
            Statement::Insert(_) => StatementKind::Insert,
            Statement::InsertOrUpdate(_) => StatementKind::InsertOrUpdate,
            Statement::Update(_) => StatementKind::Update,
            Statement::Delete(_) => StatementKind::Delete,
            Statement::AddForeignKey(_) => StatementKind::AddForeignKey,
            Statement::DropForeignKey(_) => StatementKind::DropForeignKey,
            Statement::DropAllForeignKeys(_) => StatementKind::DropAllForeignKeys,
            Statement::AddLookupTable(_) => StatementKind::AddLookupTable,
            Statement::MergeColumns(_) => StatementKind::MergeColumns,
            Statement::CreateSequence(_) => StatementKind::CreateSequence,
            Statement::AlterSequence(_) => StatementKind::AlterSequence,
            Statement::RenameSequence(_) => StatementKind::RenameSequence,
            Statement::DropSequence(_) => StatementKind::DropSequence,
            Statement::CreateView(_) => StatementKind::CreateView,
            Statement::RenameView(_) => StatementKind::RenameView,
            Statement::DropView(_) => StatementKind::DropView,
            Statement::RenameColumn(_) => StatementKind::RenameColumn,
            Statement::RenameTable(_) => StatementKind::RenameTable,
            Statement::DropColumn(_) => StatementKind::DropColumn,
            Statement::DropTable(_) => StatementKind::DropTable,
            Statement::CreateIndex(_) => StatementKind::CreateIndex,
            Statement::DropIndex(_) => StatementKind::DropIndex,
            Statement::AddPrimaryKey(_) => StatementKind::AddPrimaryKey,
            Statement::DropPrimaryKey(_) => StatementKind::DropPrimaryKey,
            Statement::AddUniqueConstraint(_) => StatementKind::AddUniqueConstraint,
            Statement::DropUniqueConstraint(_) => StatementKind::DropUniqueConstraint,
            Statement::CreateProcedure(_) => StatementKind::CreateProcedure,
            Statement::DropProcedure(_) => StatementKind::DropProcedure,
            Statement::CreateChangeLogTable => StatementKind::CreateChangeLogTable,
            Statement::CreateChangeLogLockTable => StatementKind::CreateChangeLogLockTable,
            Statement::InitializeChangeLogLockTable => StatementKind::InitializeChangeLogLockTable,
            Statement::Sql(_) => StatementKind::Sql,
        }
    }

    /// Short human-readable description for logs and validation errors.
    pub fn describe(&self) -> String {
        let target = match self {
            Statement::CreateTable(s) => Some(s.table.to_string()),
            Statement::AddColumn(s) => Some(s.table.to_string()),
            Statement::AddDefaultValue(s) => Some(format!("{}.{}", s.table, s.column_name)),
            Statement::DropDefaultValue(s) => Some(format!("{}.{}", s.table, s.column_name)),
            Statement::ModifyDataType(s) => Some(format!("{}.{}", s.table, s.column_name)),
            Statement::SetNullable(s) => Some(format!("{}.{}", s.table, s.column_name)),
            Statement::Insert(s) => Some(s.table.to_string()),
            Statement::InsertOrUpdate(s) => Some(s.table.to_string()),
            Statement::Update(s) => Some(s.table.to_string()),
            Statement::Delete(s) => Some(s.table.to_string()),
            Statement::AddForeignKey(s) => Some(s.base_table.to_string()),
            Statement::DropForeignKey(s) => Some(s.table.to_string()),
            Statement::DropAllForeignKeys(s) => Some(s.table.to_string()),
            Statement::AddLookupTable(s) => Some(s.new_table.to_string()),
            Statement::MergeColumns(s) => Some(s.table.to_string()),
            Statement::CreateSequence(s) => Some(s.sequence_name.clone()),
            Statement::AlterSequence(s) => Some(s.sequence_name.clone()),
            Statement::RenameSequence(s) => Some(s.old_sequence_name.clone()),
            Statement::DropSequence(s) => Some(s.sequence_name.clone()),
            Statement::CreateView(s) => Some(s.view_name.clone()),
            Statement::RenameView(s) => Some(s.old_view_name.clone()),
            Statement::DropView(s) => Some(s.view_name.clone()),
            Statement::RenameColumn(s) => Some(format!("{}.{}", s.table, s.old_column_name)),
            Statement::RenameTable(s) => Some(s.old_table_name.clone()),
            Statement::DropColumn(s) => Some(format!("{}.{}", s.table, s.column_name)),
            Statement::DropTable(s) => Some(s.table.to_string()),
            Statement::CreateIndex(s) => Some(s.index_name.clone()),
            Statement::DropIndex(s) => Some(s.index_name.clone()),
            Statement::AddPrimaryKey(s) => Some(s.table.to_string()),
            Statement::DropPrimaryKey(s) => Some(s.table.to_string()),
            Statement::AddUniqueConstraint(s) => Some(s.table.to_string()),
            Statement::DropUniqueConstraint(s) => Some(s.table.to_string()),
            Statement::CreateProcedure(s) => Some(s.procedure_name.clone()),
            Statement::DropProcedure(s) => Some(s.procedure_name.clone()),
            Statement::CreateChangeLogTable
            | Statement::CreateChangeLogLockTable
            | Statement::InitializeChangeLogLockTable
            | Statement::Sql(_) => None,
        };
        match target {
            Some(t) => format!("{} {}", self.kind(), t),
            None => self.kind().to_string(),
        }
    }
}

/// A database object affected by a generated SQL fragment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DatabaseObject {
    Table { name: String },
    Column { table: String, name: String },
    View { name: String },
    Sequence { name: String },
    Index { name: String },
    ForeignKey { table: String, name: String },
    PrimaryKey { table: String },
}

impl DatabaseObject {
    pub fn table(table: &TableRef) -> Self {
        DatabaseObject::Table {
            name: table.table_name.clone(),
        }
    }

    pub fn column(table: &TableRef, name: &str) -> Self {
        DatabaseObject::Column {
            table: table.table_name.clone(),
            name: name.to_string(),
        }
    }
}

/// One generated SQL statement plus the objects it touches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sql {
    pub text: String,
    pub end_delimiter: String,
    pub affected: Vec<DatabaseObject>,
}

impl Sql {
    /// A fragment with the default `;` delimiter and no affected objects.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            end_delimiter: ";".to_string(),
            affected: Vec::new(),
        }
    }

    /// Attach an affected object.
    #[must_use]
    pub fn affecting(mut self, object: DatabaseObject) -> Self {
        self.affected.push(object);
        self
    }

    /// Override the end delimiter.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.end_delimiter = delimiter.into();
        self
    }
}

impl fmt::Display for Sql {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_from_yaml() {
        let yaml = r#"
- createTable:
    tableName: Singers
    columns:
      - name: SingerId
        type: INT64
        primaryKey: true
      - name: LastName
        type: varchar(255)
        notNull: true
- delete:
    tableName: Singers
- insertOrUpdate:
    tableName: Singers
    primaryKey: SingerId
    columns:
      - name: SingerId
        value:
          number: 1
- createChangeLogTable
"#;
        let statements: Vec<Statement> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(statements.len(), 4);
        assert_eq!(statements[0].kind(), StatementKind::CreateTable);
        assert_eq!(statements[1].kind(), StatementKind::Delete);
        assert_eq!(statements[2].kind(), StatementKind::InsertOrUpdate);
        assert_eq!(statements[3], Statement::CreateChangeLogTable);

        let Statement::CreateTable(create) = &statements[0] else {
            panic!("expected createTable");
        };
        assert_eq!(create.table.table_name, "Singers");
        assert_eq!(create.primary_key_columns(), vec!["SingerId".to_string()]);
        assert!(create.columns[1].not_null);
    }

    #[test]
    fn test_primary_key_constraint_wins_over_column_flags() {
        let mut create = CreateTableStatement::new("Albums")
            .column(ColumnDefinition::new("SingerId", "INT64").primary_key())
            .column(ColumnDefinition::new("AlbumId", "INT64"));
        assert_eq!(create.primary_key_columns(), vec!["SingerId".to_string()]);
        assert!(!create.columns[0].not_null);

        create.primary_key = Some(PrimaryKeyConstraint {
            name: None,
            columns: vec!["SingerId".into(), "AlbumId".into()],
        });
        assert_eq!(create.primary_key_columns().len(), 2);
    }

    #[test]
    fn test_insert_or_update_primary_key_columns() {
        let stmt = InsertOrUpdateStatement {
            table: TableRef::new("Singers"),
            columns: vec![],
            primary_key: "SingerId, AlbumId".into(),
            only_update: false,
        };
        assert_eq!(stmt.primary_key_columns(), vec!["SingerId", "AlbumId"]);
    }

    #[test]
    fn test_describe() {
        let stmt = Statement::Delete(DeleteStatement {
            table: TableRef::new("Singers"),
            where_clause: None,
        });
        assert_eq!(stmt.describe(), "delete Singers");
        assert_eq!(
            Statement::CreateChangeLogLockTable.describe(),
            "createChangeLogLockTable"
        );
    }

    #[test]
    fn test_table_ref_defaults() {
        let table = TableRef::new("Singers");
        assert_eq!(table.catalog_or_default(), "");
        assert_eq!(table.schema_or_default(), "");
        assert_eq!(table.to_string(), "Singers");
    }
}
