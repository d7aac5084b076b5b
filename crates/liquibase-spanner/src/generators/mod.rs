//! SQL generators.
//!
//! Portable generators live in [`standard`] at the default priority. The
//! remaining modules hold Cloud Spanner overrides, registered at
//! [`PRIORITY_DATABASE`](crate::core::PRIORITY_DATABASE) so they win
//! whenever both claim a statement.

pub mod changelog;
pub mod column;
pub mod composite;
pub mod dml;
pub mod foreign_key;
pub mod sequence;
pub mod standard;
pub mod table;
pub mod unsupported;
pub mod view;

use crate::core::catalog::GeneratorRegistry;
use crate::core::statement::Statement;
use crate::core::traits::SqlGenerator;
use crate::error::MigrateError;

pub use changelog::{
    CreateDatabaseChangeLogLockTableGeneratorSpanner, CreateDatabaseChangeLogTableGeneratorSpanner,
    InitializeChangeLogLockTableGeneratorSpanner,
};
pub use column::{
    AddColumnGeneratorSpanner, AddDefaultValueGeneratorSpanner, DropDefaultValueGeneratorSpanner,
    ModifyDataTypeGeneratorSpanner, SetNullableGeneratorSpanner,
};
pub use composite::{AddLookupTableGeneratorSpanner, MergeColumnsGeneratorSpanner};
pub use dml::{DeleteGeneratorSpanner, InsertOrUpdateGeneratorSpanner, UpdateGeneratorSpanner};
pub use foreign_key::{AddForeignKeyConstraintGeneratorSpanner, DropAllForeignKeysGeneratorSpanner};
pub use sequence::{
    AlterSequenceGeneratorSpanner, CreateSequenceGeneratorSpanner, RenameSequenceGeneratorSpanner,
};
pub use table::CreateTableGeneratorSpanner;
pub use unsupported::UnsupportedGenerator;
pub use view::CreateViewGeneratorSpanner;

/// Error for a generator handed a statement of another kind. The registry
/// never does this; direct callers can.
pub(crate) fn wrong_statement(generator: &dyn SqlGenerator, statement: &Statement) -> MigrateError {
    MigrateError::Generation(format!(
        "{} cannot generate SQL for {}",
        generator.name(),
        statement.kind()
    ))
}

/// Register the portable generators and every Cloud Spanner override.
pub fn register_builtins(registry: &mut GeneratorRegistry) {
    standard::register(registry);

    registry.register(CreateTableGeneratorSpanner);

    registry.register(AddColumnGeneratorSpanner);
    registry.register(AddDefaultValueGeneratorSpanner);
    registry.register(DropDefaultValueGeneratorSpanner);
    registry.register(ModifyDataTypeGeneratorSpanner);
    registry.register(SetNullableGeneratorSpanner);

    registry.register(InsertOrUpdateGeneratorSpanner);
    registry.register(UpdateGeneratorSpanner);
    registry.register(DeleteGeneratorSpanner);

    registry.register(AddForeignKeyConstraintGeneratorSpanner);
    registry.register(DropAllForeignKeysGeneratorSpanner);

    registry.register(AddLookupTableGeneratorSpanner);
    registry.register(MergeColumnsGeneratorSpanner);

    registry.register(CreateSequenceGeneratorSpanner);
    registry.register(AlterSequenceGeneratorSpanner);
    registry.register(RenameSequenceGeneratorSpanner);

    registry.register(CreateViewGeneratorSpanner);

    registry.register(CreateDatabaseChangeLogTableGeneratorSpanner);
    registry.register(CreateDatabaseChangeLogLockTableGeneratorSpanner);
    registry.register(InitializeChangeLogLockTableGeneratorSpanner);

    for generator in unsupported::UNSUPPORTED {
        registry.register(generator);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::core::catalog::GeneratorContext;
    use crate::core::statement::{
        DeleteStatement, DropTableStatement, StatementKind, TableRef,
    };
    use crate::core::traits::{PRIORITY_DATABASE, PRIORITY_DEFAULT};
    use crate::drivers::spanner::{DatabaseDialect, OfflineSchemaReader};

    const DIALECTS: [DatabaseDialect; 2] =
        [DatabaseDialect::GoogleStandardSql, DatabaseDialect::Postgresql];

    #[test]
    fn test_every_statement_kind_has_a_generator() {
        let registry = GeneratorRegistry::with_builtins();
        let kinds: HashSet<StatementKind> = registry.kinds().into_iter().collect();
        assert_eq!(kinds.len(), 38);
        assert!(kinds.contains(&StatementKind::InitializeChangeLogLockTable));
        assert!(kinds.contains(&StatementKind::Sql));
    }

    #[test]
    fn test_no_priority_ties_among_generators_of_a_kind() {
        let registry = GeneratorRegistry::with_builtins();
        for kind in registry.kinds() {
            let mut seen = HashSet::new();
            for generator in registry.generators_for(kind) {
                assert!(
                    seen.insert(generator.priority()),
                    "two generators for {} share priority {}",
                    kind,
                    generator.priority()
                );
            }
        }
    }

    #[test]
    fn test_spanner_override_wins_on_both_dialects() {
        let registry = GeneratorRegistry::with_builtins();
        let delete = Statement::Delete(DeleteStatement {
            table: TableRef::new("Singers"),
            where_clause: None,
        });
        for dialect in DIALECTS {
            let candidates = registry.candidates(&delete, dialect);
            assert_eq!(candidates.len(), 2);
            assert_eq!(candidates[0].name(), "DeleteGeneratorSpanner");
            assert_eq!(candidates[0].priority(), PRIORITY_DATABASE);
            assert_eq!(candidates[1].priority(), PRIORITY_DEFAULT);
        }
    }

    #[test]
    fn test_portable_generator_used_without_override() {
        let registry = GeneratorRegistry::with_builtins();
        let drop = Statement::DropTable(DropTableStatement {
            table: TableRef::new("Singers"),
        });
        let generator = registry
            .select(&drop, DatabaseDialect::GoogleStandardSql)
            .unwrap();
        assert_eq!(generator.priority(), PRIORITY_DEFAULT);
    }

    #[test]
    fn test_wrong_statement_is_a_generation_error() {
        let registry = GeneratorRegistry::with_builtins();
        let reader = OfflineSchemaReader;
        let ctx = GeneratorContext::new(DatabaseDialect::GoogleStandardSql, &registry, &reader);
        let drop = Statement::DropTable(DropTableStatement {
            table: TableRef::new("Singers"),
        });
        let err = DeleteGeneratorSpanner.generate(&drop, &ctx).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Generation failed: DeleteGeneratorSpanner cannot generate SQL for dropTable"
        );
    }
}
