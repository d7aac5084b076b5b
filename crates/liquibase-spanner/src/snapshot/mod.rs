//! Schema snapshots read from INFORMATION_SCHEMA.
//!
//! [`SnapshotAdapter`] reconstructs tables, columns, indexes, foreign keys
//! and sequences of one schema. Spanner differs from the generic
//! information-schema model in a few places the adapter smooths over:
//!
//! - there are no unique constraints, only unique indexes
//! - interleaved tables surface as foreign keys without a name
//! - column defaults and PostgreSQL-interface types need side queries
//! - sequence options are stored as one row per option
//!
//! An adapter instance is one snapshot pass. Its caches are never shared
//! with another pass.

use std::cell::RefCell;
use std::collections::HashMap;

use tracing::{debug, info};

use crate::core::schema::{
    Column, ColumnDefault, DatabaseSnapshot, ForeignKey, Index, Schema, Sequence, Table,
};
use crate::core::statement::{ColumnRef, TableRef};
use crate::core::traits::{MetadataSource, SchemaReader};
use crate::core::value::MetadataRow;
use crate::drivers::spanner::{DatabaseDialect, InformationSchemaReader, SpannerDialect};
use crate::error::{MigrateError, Result};

pub(crate) const TABLES_QUERY: &str = "SELECT TABLE_NAME, PARENT_TABLE_NAME FROM INFORMATION_SCHEMA.TABLES WHERE TABLE_CATALOG = ? AND TABLE_SCHEMA = ? AND TABLE_TYPE = 'BASE TABLE' ORDER BY TABLE_NAME";

pub(crate) const COLUMNS_QUERY: &str = "SELECT COLUMN_NAME, SPANNER_TYPE, IS_NULLABLE, ORDINAL_POSITION FROM INFORMATION_SCHEMA.COLUMNS WHERE TABLE_CATALOG = ? AND TABLE_SCHEMA = ? AND TABLE_NAME = ? ORDER BY ORDINAL_POSITION";

pub(crate) const INDEXES_QUERY: &str = "SELECT idx.TABLE_NAME, idx.INDEX_NAME, idx.INDEX_TYPE, idx.IS_UNIQUE, col.COLUMN_NAME, col.ORDINAL_POSITION, col.COLUMN_ORDERING FROM INFORMATION_SCHEMA.INDEXES AS idx JOIN INFORMATION_SCHEMA.INDEX_COLUMNS AS col ON idx.TABLE_CATALOG = col.TABLE_CATALOG AND idx.TABLE_SCHEMA = col.TABLE_SCHEMA AND idx.TABLE_NAME = col.TABLE_NAME AND idx.INDEX_NAME = col.INDEX_NAME WHERE idx.TABLE_CATALOG = ? AND idx.TABLE_SCHEMA = ? AND idx.TABLE_NAME = ? ORDER BY idx.TABLE_NAME, idx.INDEX_NAME, col.ORDINAL_POSITION";

pub(crate) const ALL_INDEXES_QUERY: &str = "SELECT idx.TABLE_NAME, idx.INDEX_NAME, idx.INDEX_TYPE, idx.IS_UNIQUE, col.COLUMN_NAME, col.ORDINAL_POSITION, col.COLUMN_ORDERING FROM INFORMATION_SCHEMA.INDEXES AS idx JOIN INFORMATION_SCHEMA.INDEX_COLUMNS AS col ON idx.TABLE_CATALOG = col.TABLE_CATALOG AND idx.TABLE_SCHEMA = col.TABLE_SCHEMA AND idx.TABLE_NAME = col.TABLE_NAME AND idx.INDEX_NAME = col.INDEX_NAME WHERE idx.TABLE_CATALOG = ? AND idx.TABLE_SCHEMA = ? ORDER BY idx.TABLE_NAME, idx.INDEX_NAME, col.ORDINAL_POSITION";

pub(crate) const FOREIGN_KEY_COLUMNS_QUERY: &str = "SELECT rc.CONSTRAINT_NAME, kcu.TABLE_NAME, kcu.COLUMN_NAME, pk.TABLE_NAME AS REFERENCED_TABLE_NAME, pk.COLUMN_NAME AS REFERENCED_COLUMN_NAME FROM INFORMATION_SCHEMA.REFERENTIAL_CONSTRAINTS AS rc JOIN INFORMATION_SCHEMA.KEY_COLUMN_USAGE AS kcu ON rc.CONSTRAINT_CATALOG = kcu.CONSTRAINT_CATALOG AND rc.CONSTRAINT_SCHEMA = kcu.CONSTRAINT_SCHEMA AND rc.CONSTRAINT_NAME = kcu.CONSTRAINT_NAME JOIN INFORMATION_SCHEMA.KEY_COLUMN_USAGE AS pk ON rc.UNIQUE_CONSTRAINT_CATALOG = pk.CONSTRAINT_CATALOG AND rc.UNIQUE_CONSTRAINT_SCHEMA = pk.CONSTRAINT_SCHEMA AND rc.UNIQUE_CONSTRAINT_NAME = pk.CONSTRAINT_NAME AND kcu.POSITION_IN_UNIQUE_CONSTRAINT = pk.ORDINAL_POSITION WHERE kcu.TABLE_CATALOG = ? AND kcu.TABLE_SCHEMA = ? AND kcu.TABLE_NAME = ? ORDER BY rc.CONSTRAINT_NAME, kcu.ORDINAL_POSITION";

pub(crate) const SEQUENCES_QUERY: &str = "SELECT seq.NAME AS SEQUENCE_NAME, seq_kind.OPTION_VALUE AS SEQUENCE_KIND, skip_max.OPTION_VALUE AS SKIP_RANGE_MAX, skip_min.OPTION_VALUE AS SKIP_RANGE_MIN, start_counter.OPTION_VALUE AS START_VALUE FROM INFORMATION_SCHEMA.SEQUENCES AS seq LEFT JOIN INFORMATION_SCHEMA.SEQUENCE_OPTIONS AS seq_kind ON seq.CATALOG = seq_kind.CATALOG AND seq.SCHEMA = seq_kind.SCHEMA AND seq.NAME = seq_kind.NAME AND seq_kind.OPTION_NAME = 'sequence_kind' LEFT JOIN INFORMATION_SCHEMA.SEQUENCE_OPTIONS AS skip_max ON seq.CATALOG = skip_max.CATALOG AND seq.SCHEMA = skip_max.SCHEMA AND seq.NAME = skip_max.NAME AND skip_max.OPTION_NAME = 'skip_range_max' LEFT JOIN INFORMATION_SCHEMA.SEQUENCE_OPTIONS AS skip_min ON seq.CATALOG = skip_min.CATALOG AND seq.SCHEMA = skip_min.SCHEMA AND seq.NAME = skip_min.NAME AND skip_min.OPTION_NAME = 'skip_range_min' LEFT JOIN INFORMATION_SCHEMA.SEQUENCE_OPTIONS AS start_counter ON seq.CATALOG = start_counter.CATALOG AND seq.SCHEMA = start_counter.SCHEMA AND seq.NAME = start_counter.NAME AND start_counter.OPTION_NAME = 'start_with_counter' WHERE seq.CATALOG = ? AND seq.SCHEMA = ?;";

/// Schema attribute the host attaches that has no meaning on Spanner.
const CATALOG_ATTRIBUTE: &str = "catalog";

/// `INDEX_TYPE` of the index backing a table's primary key.
const PRIMARY_KEY_INDEX_TYPE: &str = "PRIMARY_KEY";

/// A unique constraint. Spanner has none; see
/// [`SnapshotAdapter::unique_constraints`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueConstraint {
    pub name: String,
    pub table: String,
    pub columns: Vec<String>,
}

/// Rewrite PostgreSQL-interface type names into their short forms.
pub fn normalize_pg_type(data_type: &str) -> String {
    data_type
        .replace("character varying", "varchar")
        .replace("timestamp with time zone", "timestamptz")
        .replace("double precision", "float8")
}

/// Reads one schema through a [`MetadataSource`].
pub struct SnapshotAdapter<'a> {
    source: &'a dyn MetadataSource,
    reader: InformationSchemaReader<'a>,
    dialect: SpannerDialect,
    catalog: String,
    schema: String,
    columns: RefCell<HashMap<String, Vec<Column>>>,
}

impl<'a> SnapshotAdapter<'a> {
    /// Create an adapter for the default schema of the database.
    pub fn new(source: &'a dyn MetadataSource, dialect: DatabaseDialect) -> Self {
        Self {
            source,
            reader: InformationSchemaReader::new(source),
            dialect: SpannerDialect::new(dialect),
            catalog: String::new(),
            schema: String::new(),
            columns: RefCell::new(HashMap::new()),
        }
    }

    /// Restrict the pass to a catalog and schema.
    #[must_use]
    pub fn with_schema(mut self, catalog: impl Into<String>, schema: impl Into<String>) -> Self {
        self.catalog = catalog.into();
        self.schema = schema.into();
        self
    }

    fn table_ref(&self, table: &str) -> TableRef {
        TableRef {
            catalog_name: Some(self.catalog.clone()),
            schema_name: Some(self.schema.clone()),
            table_name: table.to_string(),
        }
    }

    fn query(
        &self,
        sql: &str,
        params: &[&str],
        what: impl FnOnce() -> String,
    ) -> Result<Vec<MetadataRow>> {
        self.source
            .query(sql, params)
            .map_err(|e| MigrateError::metadata_with(what(), e))
    }

    /// Snapshot of the schema object itself, without the catalog attribute.
    pub fn snapshot_schema(&self, mut schema: Schema) -> Schema {
        schema.attributes.remove(CATALOG_ATTRIBUTE);
        schema
    }

    /// Always empty. Uniqueness on Spanner is expressed with unique indexes.
    pub fn unique_constraints(&self, _table: Option<&str>) -> Vec<UniqueConstraint> {
        Vec::new()
    }

    /// Base tables of the schema with their interleave parents.
    pub fn tables(&self) -> Result<Vec<Table>> {
        let rows = self.query(TABLES_QUERY, &[&self.catalog, &self.schema], || {
            format!("Error reading tables of schema '{}'", self.schema)
        })?;
        Ok(rows
            .iter()
            .filter_map(|row| {
                let name = row.get_str("TABLE_NAME")?;
                Some(Table {
                    schema: self.schema.clone(),
                    name: name.to_string(),
                    interleaved_in: row
                        .get_str("PARENT_TABLE_NAME")
                        .filter(|p| !p.is_empty())
                        .map(str::to_string),
                    ..Default::default()
                })
            })
            .collect())
    }

    /// Columns of a table with their defaults. Cached for the pass.
    pub fn columns(&self, table: &str) -> Result<Vec<Column>> {
        if let Some(cached) = self.columns.borrow().get(table) {
            return Ok(cached.clone());
        }

        let rows = self.query(
            COLUMNS_QUERY,
            &[&self.catalog, &self.schema, table],
            || format!("Error reading columns of table {}", table),
        )?;

        let mut columns = Vec::with_capacity(rows.len());
        for row in &rows {
            let Some(name) = row.get_str("COLUMN_NAME") else {
                continue;
            };
            let column_ref = ColumnRef::new(self.table_ref(table), name);
            columns.push(Column {
                name: name.to_string(),
                data_type: self.column_type(row, &column_ref)?,
                is_nullable: row.get_bool("IS_NULLABLE").unwrap_or(true),
                ordinal_pos: row
                    .get_i64("ORDINAL_POSITION")
                    .and_then(|p| i32::try_from(p).ok())
                    .unwrap_or(0),
                default_value: self.column_default(&column_ref)?,
            });
        }

        debug!("{}: {} columns", table, columns.len());
        self.columns
            .borrow_mut()
            .insert(table.to_string(), columns.clone());
        Ok(columns)
    }

    fn column_type(&self, row: &MetadataRow, column: &ColumnRef) -> Result<String> {
        if !self.dialect.is_postgresql() {
            return Ok(row.get_str("SPANNER_TYPE").unwrap_or_default().to_string());
        }
        let data_type = self
            .reader
            .spanner_type(column)?
            .or_else(|| row.get_str("SPANNER_TYPE").map(str::to_string))
            .unwrap_or_default();
        Ok(normalize_pg_type(&data_type))
    }

    fn column_default(&self, column: &ColumnRef) -> Result<Option<ColumnDefault>> {
        Ok(self.reader.column_default(column)?.map(|value| {
            if self.dialect.is_function(&value) {
                ColumnDefault::Function(value)
            } else {
                ColumnDefault::Literal(value)
            }
        }))
    }

    /// Indexes of a table in name order, one per index name.
    pub fn indexes(&self, table: &str) -> Result<Vec<Index>> {
        let rows = self.query(
            INDEXES_QUERY,
            &[&self.catalog, &self.schema, table],
            || format!("Error reading indexes of table {}", table),
        )?;
        Ok(merge_index_rows(&rows, Some(table)))
    }

    /// Indexes of every table in the schema.
    pub fn all_indexes(&self) -> Result<Vec<Index>> {
        let rows = self.query(ALL_INDEXES_QUERY, &[&self.catalog, &self.schema], || {
            format!("Error reading indexes of schema '{}'", self.schema)
        })?;
        Ok(merge_index_rows(&rows, None))
    }

    /// Find the index matching `example`.
    ///
    /// A named example matches by name. Otherwise the key columns must
    /// match, and the table's primary key index is preferred over a
    /// secondary index on the same columns.
    pub fn find_index(&self, example: &Index) -> Result<Option<Index>> {
        let indexes: Vec<Index> = self
            .indexes(&example.table)?
            .into_iter()
            .filter(|i| i.table == example.table)
            .collect();
        if !example.name.is_empty() {
            return Ok(indexes.into_iter().find(|i| i.name == example.name));
        }

        let mut fallback = None;
        for index in indexes
            .into_iter()
            .filter(|i| i.has_columns(&example.columns))
        {
            if index.is_clustered {
                return Ok(Some(index));
            }
            if fallback.is_none() {
                fallback = Some(index);
            }
        }
        Ok(fallback)
    }

    /// Named foreign keys declared on a table. Interleave relationships are
    /// not foreign keys and are left out.
    pub fn foreign_keys(&self, table: &str) -> Result<Vec<ForeignKey>> {
        let rows = self.query(
            FOREIGN_KEY_COLUMNS_QUERY,
            &[&self.catalog, &self.schema, table],
            || format!("Could not retrieve foreign keys for table {}", table),
        )?;

        let mut found: Vec<ForeignKey> = Vec::new();
        for row in &rows {
            let Some(name) = row.get_str("CONSTRAINT_NAME").filter(|n| !n.is_empty()) else {
                continue;
            };
            let column = row.get_str("COLUMN_NAME").unwrap_or_default().to_string();
            let ref_column = row
                .get_str("REFERENCED_COLUMN_NAME")
                .unwrap_or_default()
                .to_string();

            match found.iter_mut().find(|fk| fk.name == name) {
                Some(fk) => {
                    fk.columns.push(column);
                    fk.ref_columns.push(ref_column);
                }
                None => found.push(ForeignKey {
                    name: name.to_string(),
                    table: row.get_str("TABLE_NAME").unwrap_or(table).to_string(),
                    columns: vec![column],
                    ref_table: row
                        .get_str("REFERENCED_TABLE_NAME")
                        .unwrap_or_default()
                        .to_string(),
                    ref_columns: vec![ref_column],
                }),
            }
        }
        Ok(found)
    }

    /// Look up one foreign key. An unnamed example is an interleave
    /// relationship and is never found.
    pub fn find_foreign_key(&self, table: &str, name: Option<&str>) -> Result<Option<ForeignKey>> {
        let Some(name) = name.filter(|n| !n.is_empty()) else {
            return Ok(None);
        };
        Ok(self
            .foreign_keys(table)?
            .into_iter()
            .find(|fk| fk.name.eq_ignore_ascii_case(name)))
    }

    /// Sequences of the schema, one per name.
    pub fn sequences(&self) -> Result<Vec<Sequence>> {
        let rows = self.query(SEQUENCES_QUERY, &[&self.catalog, &self.schema], || {
            format!("Error reading sequences of schema '{}'", self.schema)
        })?;
        Ok(rows
            .iter()
            .filter_map(|row| {
                Some(Sequence {
                    name: row.get_str("SEQUENCE_NAME")?.to_string(),
                    kind: row.get_str("SEQUENCE_KIND").map(str::to_string),
                    skip_range_min: row.get_i64("SKIP_RANGE_MIN"),
                    skip_range_max: row.get_i64("SKIP_RANGE_MAX"),
                    start_value: row.get_i64("START_VALUE"),
                })
            })
            .collect())
    }

    /// Read the whole schema.
    pub fn snapshot(&self) -> Result<DatabaseSnapshot> {
        let mut tables = self.tables()?;
        for table in &mut tables {
            table.columns = self.columns(&table.name)?;
            table.indexes = self.indexes(&table.name)?;
            table.primary_key = table
                .indexes
                .iter()
                .find(|i| i.is_clustered)
                .map(|i| i.columns.clone())
                .unwrap_or_default();
            table.foreign_keys = self.foreign_keys(&table.name)?;
        }
        let sequences = self.sequences()?;

        info!(
            "Snapshot of schema '{}': {} tables, {} sequences",
            self.schema,
            tables.len(),
            sequences.len()
        );
        Ok(DatabaseSnapshot {
            schema: Schema::new(&self.schema),
            tables,
            sequences,
        })
    }
}

/// Group INDEX_COLUMNS rows into one [`Index`] per (table, name).
///
/// Rows of tables other than `table` are dropped when one is given.
fn merge_index_rows(rows: &[MetadataRow], table: Option<&str>) -> Vec<Index> {
    // Every table has an index named PRIMARY_KEY, so merge per table too.
    let mut found: Vec<Index> = Vec::new();
    for row in rows {
        let Some(name) = row.get_str("INDEX_NAME") else {
            continue;
        };
        let row_table = match (row.get_str("TABLE_NAME"), table) {
            (Some(t), Some(wanted)) if t != wanted => continue,
            (Some(t), _) => t,
            (None, Some(wanted)) => wanted,
            (None, None) => continue,
        };
        let position = found
            .iter()
            .position(|i| i.name == name && i.table == row_table);
        let index = match position {
            Some(i) => &mut found[i],
            None => {
                found.push(Index {
                    name: name.to_string(),
                    table: row_table.to_string(),
                    is_unique: row.get_bool("IS_UNIQUE").unwrap_or(false),
                    is_clustered: row.get_str("INDEX_TYPE") == Some(PRIMARY_KEY_INDEX_TYPE),
                    ..Default::default()
                });
                let last = found.len() - 1;
                &mut found[last]
            }
        };

        let column = row.get_str("COLUMN_NAME").unwrap_or_default().to_string();
        let Some(pos) = row.get_i64("ORDINAL_POSITION") else {
            // Stored (non-key) columns have no key position.
            index.included_columns.push(column);
            continue;
        };
        // Key positions are 1-based and bounded by the rows read.
        let Some(slot) = usize::try_from(pos)
            .ok()
            .filter(|p| (1..=rows.len()).contains(p))
            .map(|p| p - 1)
        else {
            debug!("{}.{}: ignoring key position {}", row_table, name, pos);
            continue;
        };
        if index.columns.len() <= slot {
            index.columns.resize(slot + 1, String::new());
            index.descending.resize(slot + 1, false);
        }
        index.columns[slot] = column;
        index.descending[slot] = row
            .get_str("COLUMN_ORDERING")
            .is_some_and(|o| o.eq_ignore_ascii_case("DESC"));
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::MetaValue;
    use crate::drivers::spanner::{FakeMetadataSource, COLUMN_DEFAULT_QUERY, SPANNER_TYPE_QUERY};

    fn index_row(
        index: &str,
        index_type: &str,
        column: &str,
        position: Option<i64>,
        ordering: Option<&str>,
    ) -> MetadataRow {
        MetadataRow::new()
            .with("TABLE_NAME", "Singers")
            .with("INDEX_NAME", index)
            .with("INDEX_TYPE", index_type)
            .with("IS_UNIQUE", index_type == "PRIMARY_KEY")
            .with("COLUMN_NAME", column)
            .with("ORDINAL_POSITION", position)
            .with("COLUMN_ORDERING", ordering)
    }

    fn singers_indexes() -> FakeMetadataSource {
        FakeMetadataSource::default().with(
            INDEXES_QUERY,
            vec![
                index_row("PRIMARY_KEY", "PRIMARY_KEY", "SingerId", Some(1), Some("ASC")),
                index_row("SingersBySingerId", "INDEX", "SingerId", Some(1), Some("ASC")),
                index_row("SingersByName", "INDEX", "LastName", Some(1), Some("DESC")),
                index_row("SingersByName", "INDEX", "FirstName", Some(2), Some("ASC")),
                index_row("SingersByName", "INDEX", "SingerInfo", None, None),
            ],
        )
    }

    // =========================================================================
    // Schema and unique constraints
    // =========================================================================

    #[test]
    fn test_schema_snapshot_drops_catalog_attribute() {
        let source = FakeMetadataSource::default();
        let adapter = SnapshotAdapter::new(&source, DatabaseDialect::GoogleStandardSql);
        let schema = Schema::new("")
            .with_attribute("catalog", "my-database")
            .with_attribute("owner", "me");
        let schema = adapter.snapshot_schema(schema);
        assert!(!schema.attributes.contains_key("catalog"));
        assert_eq!(schema.attributes.get("owner").map(String::as_str), Some("me"));
    }

    #[test]
    fn test_unique_constraints_always_empty() {
        let source = FakeMetadataSource {
            fail: true,
            ..Default::default()
        };
        let adapter = SnapshotAdapter::new(&source, DatabaseDialect::GoogleStandardSql);
        assert!(adapter.unique_constraints(Some("Singers")).is_empty());
        assert!(adapter.unique_constraints(None).is_empty());
        assert!(source.calls.borrow().is_empty());
    }

    // =========================================================================
    // Indexes
    // =========================================================================

    #[test]
    fn test_indexes_merge_rows_per_name() {
        let source = singers_indexes();
        let adapter = SnapshotAdapter::new(&source, DatabaseDialect::GoogleStandardSql);
        let indexes = adapter.indexes("Singers").unwrap();
        assert_eq!(indexes.len(), 3);

        let by_name = &indexes[2];
        assert_eq!(by_name.name, "SingersByName");
        assert_eq!(by_name.columns, vec!["LastName", "FirstName"]);
        assert_eq!(by_name.descending, vec![true, false]);
        assert_eq!(by_name.included_columns, vec!["SingerInfo"]);
        assert!(!by_name.is_clustered);

        assert!(indexes[0].is_clustered);
        assert!(indexes[0].is_unique);
    }

    #[test]
    fn test_all_indexes_keep_primary_keys_apart() {
        let source = FakeMetadataSource::default().with(
            ALL_INDEXES_QUERY,
            vec![
                index_row("PRIMARY_KEY", "PRIMARY_KEY", "SingerId", Some(1), Some("ASC")),
                index_row("PRIMARY_KEY", "PRIMARY_KEY", "AlbumId", Some(1), Some("ASC"))
                    .with("TABLE_NAME", "Albums"),
            ],
        );
        let adapter = SnapshotAdapter::new(&source, DatabaseDialect::GoogleStandardSql);
        let indexes = adapter.all_indexes().unwrap();
        assert_eq!(indexes.len(), 2);
        assert_eq!(indexes[1].table, "Albums");
        assert_eq!(indexes[1].columns, vec!["AlbumId"]);
        assert_eq!(source.calls.borrow()[0].1, vec!["", ""]);
    }

    #[test]
    fn test_find_index_prefers_clustered() {
        let source = singers_indexes();
        let adapter = SnapshotAdapter::new(&source, DatabaseDialect::GoogleStandardSql);
        let example = Index {
            table: "Singers".into(),
            columns: vec!["singerid".into()],
            ..Default::default()
        };
        let found = adapter.find_index(&example).unwrap().unwrap();
        assert_eq!(found.name, "PRIMARY_KEY");
    }

    #[test]
    fn test_find_index_by_name() {
        let source = singers_indexes();
        let adapter = SnapshotAdapter::new(&source, DatabaseDialect::GoogleStandardSql);
        let example = Index {
            name: "SingersBySingerId".into(),
            table: "Singers".into(),
            ..Default::default()
        };
        let found = adapter.find_index(&example).unwrap().unwrap();
        assert!(!found.is_clustered);

        let missing = Index {
            name: "Nope".into(),
            table: "Singers".into(),
            ..Default::default()
        };
        assert!(adapter.find_index(&missing).unwrap().is_none());
    }

    /// `A_B` and `AxB` rows both come back when a source matches table names
    /// loosely; only the requested table's indexes may survive.
    fn look_alike_tables() -> FakeMetadataSource {
        FakeMetadataSource::default().with(
            INDEXES_QUERY,
            vec![
                index_row("PRIMARY_KEY", "PRIMARY_KEY", "OtherId", Some(1), Some("ASC"))
                    .with("TABLE_NAME", "AxB"),
                index_row("PRIMARY_KEY", "PRIMARY_KEY", "Id", Some(1), Some("ASC"))
                    .with("TABLE_NAME", "A_B"),
                index_row("AxBByName", "INDEX", "Name", Some(1), Some("ASC"))
                    .with("TABLE_NAME", "AxB"),
            ],
        )
    }

    #[test]
    fn test_indexes_ignore_other_tables() {
        let source = look_alike_tables();
        let adapter = SnapshotAdapter::new(&source, DatabaseDialect::GoogleStandardSql);
        let indexes = adapter.indexes("A_B").unwrap();
        assert_eq!(indexes.len(), 1);
        assert_eq!(indexes[0].table, "A_B");
        assert_eq!(indexes[0].columns, vec!["Id"]);
        assert_eq!(source.calls.borrow()[0].1, vec!["", "", "A_B"]);
    }

    #[test]
    fn test_find_index_stays_on_its_table() {
        let source = look_alike_tables();
        let adapter = SnapshotAdapter::new(&source, DatabaseDialect::GoogleStandardSql);

        let primary_key = Index {
            name: "PRIMARY_KEY".into(),
            table: "A_B".into(),
            ..Default::default()
        };
        let found = adapter.find_index(&primary_key).unwrap().unwrap();
        assert_eq!(found.table, "A_B");
        assert_eq!(found.columns, vec!["Id"]);

        let by_name = Index {
            name: "AxBByName".into(),
            table: "A_B".into(),
            ..Default::default()
        };
        assert!(adapter.find_index(&by_name).unwrap().is_none());
    }

    #[test]
    fn test_snapshot_primary_keys_stay_on_their_table() {
        let source = look_alike_tables().with(
            TABLES_QUERY,
            vec![
                MetadataRow::new().with("TABLE_NAME", "A_B"),
                MetadataRow::new().with("TABLE_NAME", "AxB"),
            ],
        );
        let adapter = SnapshotAdapter::new(&source, DatabaseDialect::GoogleStandardSql);
        let snapshot = adapter.snapshot().unwrap();
        assert_eq!(snapshot.table("A_B").unwrap().primary_key, vec!["Id"]);
        assert_eq!(snapshot.table("AxB").unwrap().primary_key, vec!["OtherId"]);
        assert_eq!(snapshot.table("AxB").unwrap().indexes.len(), 2);
    }

    #[test]
    fn test_out_of_range_key_position_is_ignored() {
        let source = FakeMetadataSource::default().with(
            INDEXES_QUERY,
            vec![
                index_row("SingersByName", "INDEX", "LastName", Some(1), Some("ASC")),
                index_row("SingersByName", "INDEX", "FirstName", Some(i64::MAX), None),
                index_row("SingersByName", "INDEX", "Broken", Some(0), None),
            ],
        );
        let adapter = SnapshotAdapter::new(&source, DatabaseDialect::GoogleStandardSql);
        let indexes = adapter.indexes("Singers").unwrap();
        assert_eq!(indexes[0].columns, vec!["LastName"]);
        assert_eq!(indexes[0].descending, vec![false]);
    }

    // =========================================================================
    // Columns
    // =========================================================================

    #[test]
    fn test_columns_classify_defaults() {
        let source = FakeMetadataSource::default()
            .with(
                COLUMNS_QUERY,
                vec![MetadataRow::new()
                    .with("COLUMN_NAME", "CreatedAt")
                    .with("SPANNER_TYPE", "TIMESTAMP")
                    .with("IS_NULLABLE", "NO")
                    .with("ORDINAL_POSITION", 1i64)],
            )
            .with(
                COLUMN_DEFAULT_QUERY,
                vec![MetadataRow::new().with("COLUMN_DEF", "CURRENT_TIMESTAMP()")],
            );
        let adapter = SnapshotAdapter::new(&source, DatabaseDialect::GoogleStandardSql)
            .with_schema("db", "");
        let columns = adapter.columns("Events").unwrap();
        assert_eq!(columns.len(), 1);
        assert_eq!(columns[0].data_type, "TIMESTAMP");
        assert!(!columns[0].is_nullable);
        assert_eq!(
            columns[0].default_value,
            Some(ColumnDefault::Function("CURRENT_TIMESTAMP()".into()))
        );

        let calls = source.calls.borrow();
        assert_eq!(calls[1].0, COLUMN_DEFAULT_QUERY);
        assert_eq!(calls[1].1, vec!["db", "", "Events", "CreatedAt"]);
    }

    #[test]
    fn test_columns_literal_default_and_cache() {
        let source = FakeMetadataSource::default()
            .with(
                COLUMNS_QUERY,
                vec![MetadataRow::new()
                    .with("COLUMN_NAME", "Status")
                    .with("SPANNER_TYPE", "STRING(10)")
                    .with("IS_NULLABLE", "YES")
                    .with("ORDINAL_POSITION", 1i64)],
            )
            .with(
                COLUMN_DEFAULT_QUERY,
                vec![MetadataRow::new().with("COLUMN_DEF", "'new'")],
            );
        let adapter = SnapshotAdapter::new(&source, DatabaseDialect::GoogleStandardSql);
        let first = adapter.columns("Orders").unwrap();
        let second = adapter.columns("Orders").unwrap();
        assert_eq!(first, second);
        assert_eq!(
            first[0].default_value,
            Some(ColumnDefault::Literal("'new'".into()))
        );
        // One columns query plus one default lookup; the second call is cached.
        assert_eq!(source.calls.borrow().len(), 2);
    }

    #[test]
    fn test_pg_column_types_are_normalized() {
        let source = FakeMetadataSource::default()
            .with(
                COLUMNS_QUERY,
                vec![MetadataRow::new()
                    .with("COLUMN_NAME", "name")
                    .with("SPANNER_TYPE", "character varying")
                    .with("IS_NULLABLE", "YES")
                    .with("ORDINAL_POSITION", 1i64)],
            )
            .with(
                SPANNER_TYPE_QUERY,
                vec![MetadataRow::new().with("SPANNER_TYPE", "character varying(100)")],
            );
        let adapter = SnapshotAdapter::new(&source, DatabaseDialect::Postgresql)
            .with_schema("", "public");
        let columns = adapter.columns("singers").unwrap();
        assert_eq!(columns[0].data_type, "varchar(100)");
        assert_eq!(columns[0].default_value, None);
    }

    #[test]
    fn test_normalize_pg_type() {
        assert_eq!(normalize_pg_type("timestamp with time zone"), "timestamptz");
        assert_eq!(normalize_pg_type("double precision[]"), "float8[]");
        assert_eq!(normalize_pg_type("bigint"), "bigint");
    }

    #[test]
    fn test_default_lookup_failure_is_metadata_error() {
        let source = FakeMetadataSource {
            fail: true,
            ..Default::default()
        };
        let adapter = SnapshotAdapter::new(&source, DatabaseDialect::GoogleStandardSql);
        let err = adapter.columns("Singers").unwrap_err();
        assert!(matches!(err, MigrateError::Metadata { .. }));
        assert_eq!(err.to_string(), "Error reading columns of table Singers");
    }

    // =========================================================================
    // Foreign keys
    // =========================================================================

    fn fk_source() -> FakeMetadataSource {
        FakeMetadataSource::default().with(
            FOREIGN_KEY_COLUMNS_QUERY,
            vec![
                MetadataRow::new()
                    .with("CONSTRAINT_NAME", MetaValue::Null)
                    .with("TABLE_NAME", "Albums")
                    .with("COLUMN_NAME", "SingerId"),
                MetadataRow::new()
                    .with("CONSTRAINT_NAME", "FK_Albums_Labels")
                    .with("TABLE_NAME", "Albums")
                    .with("COLUMN_NAME", "LabelId")
                    .with("REFERENCED_TABLE_NAME", "Labels")
                    .with("REFERENCED_COLUMN_NAME", "Id"),
                MetadataRow::new()
                    .with("CONSTRAINT_NAME", "FK_Albums_Labels")
                    .with("TABLE_NAME", "Albums")
                    .with("COLUMN_NAME", "LabelRegion")
                    .with("REFERENCED_TABLE_NAME", "Labels")
                    .with("REFERENCED_COLUMN_NAME", "Region"),
            ],
        )
    }

    #[test]
    fn test_foreign_keys_skip_interleave() {
        let source = fk_source();
        let adapter = SnapshotAdapter::new(&source, DatabaseDialect::GoogleStandardSql);
        let fks = adapter.foreign_keys("Albums").unwrap();
        assert_eq!(fks.len(), 1);
        assert_eq!(fks[0].columns, vec!["LabelId", "LabelRegion"]);
        assert_eq!(fks[0].ref_columns, vec!["Id", "Region"]);
        assert_eq!(fks[0].ref_table, "Labels");
    }

    #[test]
    fn test_unnamed_foreign_key_is_not_found() {
        let source = fk_source();
        let adapter = SnapshotAdapter::new(&source, DatabaseDialect::GoogleStandardSql);
        assert!(adapter.find_foreign_key("Albums", None).unwrap().is_none());
        assert!(source.calls.borrow().is_empty());
        assert!(adapter
            .find_foreign_key("Albums", Some("fk_albums_labels"))
            .unwrap()
            .is_some());
    }

    // =========================================================================
    // Sequences and full snapshot
    // =========================================================================

    #[test]
    fn test_sequences_bind_catalog_then_schema() {
        let source = FakeMetadataSource::default().with(
            SEQUENCES_QUERY,
            vec![MetadataRow::new()
                .with("SEQUENCE_NAME", "SingerIdSequence")
                .with("SEQUENCE_KIND", "bit_reversed_positive")
                .with("SKIP_RANGE_MIN", "1")
                .with("SKIP_RANGE_MAX", "1000")
                .with("START_VALUE", MetaValue::Null)],
        );
        let adapter = SnapshotAdapter::new(&source, DatabaseDialect::GoogleStandardSql)
            .with_schema("db", "");
        let sequences = adapter.sequences().unwrap();
        assert_eq!(
            sequences,
            vec![Sequence {
                name: "SingerIdSequence".into(),
                kind: Some("bit_reversed_positive".into()),
                skip_range_min: Some(1),
                skip_range_max: Some(1000),
                start_value: None,
            }]
        );
        assert_eq!(source.calls.borrow()[0].1, vec!["db", ""]);
    }

    #[test]
    fn test_full_snapshot() {
        let source = singers_indexes()
            .with(
                TABLES_QUERY,
                vec![
                    MetadataRow::new()
                        .with("TABLE_NAME", "Singers")
                        .with("PARENT_TABLE_NAME", MetaValue::Null),
                ],
            )
            .with(
                COLUMNS_QUERY,
                vec![MetadataRow::new()
                    .with("COLUMN_NAME", "SingerId")
                    .with("SPANNER_TYPE", "INT64")
                    .with("IS_NULLABLE", "NO")
                    .with("ORDINAL_POSITION", 1i64)],
            );
        let adapter = SnapshotAdapter::new(&source, DatabaseDialect::GoogleStandardSql);
        let snapshot = adapter.snapshot().unwrap();
        let singers = snapshot.table("Singers").unwrap();
        assert_eq!(singers.primary_key, vec!["SingerId"]);
        assert_eq!(singers.columns.len(), 1);
        assert_eq!(singers.indexes.len(), 3);
        assert!(singers.interleaved_in.is_none());
        assert!(snapshot.sequences.is_empty());
    }
}
