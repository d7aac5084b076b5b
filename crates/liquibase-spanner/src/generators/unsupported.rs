//! Statements Cloud Spanner cannot express.
//!
//! Each generator here fails validation with a fixed message naming the
//! missing feature. `generate` is only reached when a caller skips
//! validation; it fails with the same message as an unsupported error.

use crate::core::catalog::GeneratorContext;
use crate::core::statement::{Sql, Statement, StatementKind};
use crate::core::traits::{SqlGenerator, ValidationErrors, PRIORITY_DATABASE};
use crate::error::{MigrateError, Result};

pub const ADD_PRIMARY_KEY_VALIDATION_ERROR: &str =
    "Cloud Spanner does not support adding a primary key to an existing table";

pub const DROP_PRIMARY_KEY_VALIDATION_ERROR: &str =
    "Cloud Spanner does not support dropping a primary key from a table";

pub const RENAME_COLUMN_VALIDATION_ERROR: &str = "Cloud Spanner does not support renaming a column";

pub const RENAME_VIEW_VALIDATION_ERROR: &str = "Cloud Spanner does not support renaming a view";

pub const UNIQUE_CONSTRAINT_VALIDATION_ERROR: &str =
    "Cloud Spanner does not support unique constraints. Use a unique index instead.";

pub const CREATE_PROCEDURE_VALIDATION_ERROR: &str =
    "Cloud Spanner does not support creating procedures";

pub const DROP_PROCEDURE_VALIDATION_ERROR: &str =
    "Cloud Spanner does not support dropping procedures";

pub(crate) fn unsupported_generate(message: &str) -> MigrateError {
    MigrateError::Unsupported(message.to_string())
}

/// A generator that rejects one statement kind outright.
pub struct UnsupportedGenerator {
    name: &'static str,
    kind: StatementKind,
    message: &'static str,
}

impl UnsupportedGenerator {
    pub const fn new(name: &'static str, kind: StatementKind, message: &'static str) -> Self {
        Self {
            name,
            kind,
            message,
        }
    }

    pub fn message(&self) -> &'static str {
        self.message
    }
}

impl SqlGenerator for UnsupportedGenerator {
    fn name(&self) -> &str {
        self.name
    }

    fn kind(&self) -> StatementKind {
        self.kind
    }

    fn priority(&self) -> i32 {
        PRIORITY_DATABASE
    }

    fn validate(&self, _statement: &Statement, _ctx: &GeneratorContext<'_>) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors.add(self.message);
        errors
    }

    fn generate(&self, _statement: &Statement, _ctx: &GeneratorContext<'_>) -> Result<Vec<Sql>> {
        Err(unsupported_generate(self.message))
    }
}

/// All unsupported-statement generators.
pub(crate) const UNSUPPORTED: [UnsupportedGenerator; 8] = [
    UnsupportedGenerator::new(
        "AddPrimaryKeyGeneratorSpanner",
        StatementKind::AddPrimaryKey,
        ADD_PRIMARY_KEY_VALIDATION_ERROR,
    ),
    UnsupportedGenerator::new(
        "DropPrimaryKeyGeneratorSpanner",
        StatementKind::DropPrimaryKey,
        DROP_PRIMARY_KEY_VALIDATION_ERROR,
    ),
    UnsupportedGenerator::new(
        "RenameColumnGeneratorSpanner",
        StatementKind::RenameColumn,
        RENAME_COLUMN_VALIDATION_ERROR,
    ),
    UnsupportedGenerator::new(
        "RenameViewGeneratorSpanner",
        StatementKind::RenameView,
        RENAME_VIEW_VALIDATION_ERROR,
    ),
    UnsupportedGenerator::new(
        "AddUniqueConstraintGeneratorSpanner",
        StatementKind::AddUniqueConstraint,
        UNIQUE_CONSTRAINT_VALIDATION_ERROR,
    ),
    UnsupportedGenerator::new(
        "DropUniqueConstraintGeneratorSpanner",
        StatementKind::DropUniqueConstraint,
        UNIQUE_CONSTRAINT_VALIDATION_ERROR,
    ),
    UnsupportedGenerator::new(
        "CreateProcedureGeneratorSpanner",
        StatementKind::CreateProcedure,
        CREATE_PROCEDURE_VALIDATION_ERROR,
    ),
    UnsupportedGenerator::new(
        "DropProcedureGeneratorSpanner",
        StatementKind::DropProcedure,
        DROP_PROCEDURE_VALIDATION_ERROR,
    ),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::GeneratorRegistry;
    use crate::core::statement::{
        AddPrimaryKeyStatement, AddUniqueConstraintStatement, CreateProcedureStatement,
        DropProcedureStatement, DropUniqueConstraintStatement, RenameColumnStatement,
        RenameViewStatement, TableRef,
    };
    use crate::drivers::spanner::{DatabaseDialect, OfflineSchemaReader};

    fn rejection(statement: Statement) -> MigrateError {
        let registry = GeneratorRegistry::with_builtins();
        let reader = OfflineSchemaReader;
        let ctx = GeneratorContext::new(DatabaseDialect::GoogleStandardSql, &registry, &reader);
        registry.generate(&statement, &ctx).unwrap_err()
    }

    // =========================================================================
    // Validation channel
    // =========================================================================

    #[test]
    fn test_add_primary_key_is_rejected() {
        let err = rejection(Statement::AddPrimaryKey(AddPrimaryKeyStatement {
            table: TableRef::new("Singers"),
            column_names: vec!["SingerId".into()],
            constraint_name: None,
        }));
        assert!(matches!(err, MigrateError::Validation { .. }));
        assert!(err
            .to_string()
            .contains("does not support adding a primary key to an existing table"));
    }

    #[test]
    fn test_rename_column_and_view_are_rejected() {
        let err = rejection(Statement::RenameColumn(RenameColumnStatement {
            table: TableRef::new("Singers"),
            old_column_name: "A".into(),
            new_column_name: "B".into(),
        }));
        assert!(err.to_string().contains(RENAME_COLUMN_VALIDATION_ERROR));

        let err = rejection(Statement::RenameView(RenameViewStatement {
            old_view_name: "V1".into(),
            new_view_name: "V2".into(),
        }));
        assert!(err.to_string().contains(RENAME_VIEW_VALIDATION_ERROR));
    }

    #[test]
    fn test_unique_constraints_suggest_unique_index() {
        let add = rejection(Statement::AddUniqueConstraint(AddUniqueConstraintStatement {
            table: TableRef::new("Singers"),
            column_names: vec!["LastName".into()],
            constraint_name: Some("UQ_LastName".into()),
        }));
        let drop = rejection(Statement::DropUniqueConstraint(
            DropUniqueConstraintStatement {
                table: TableRef::new("Singers"),
                constraint_name: "UQ_LastName".into(),
            },
        ));
        for err in [add, drop] {
            assert!(err.to_string().contains("Use a unique index instead."));
        }
    }

    #[test]
    fn test_procedures_are_rejected() {
        let err = rejection(Statement::CreateProcedure(CreateProcedureStatement {
            procedure_name: "p".into(),
            procedure_text: "BEGIN END".into(),
        }));
        assert!(err.to_string().contains(CREATE_PROCEDURE_VALIDATION_ERROR));

        let err = rejection(Statement::DropProcedure(DropProcedureStatement {
            procedure_name: "p".into(),
        }));
        assert!(err.to_string().contains(DROP_PROCEDURE_VALIDATION_ERROR));
    }

    // =========================================================================
    // Fatal channel
    // =========================================================================

    #[test]
    fn test_generate_without_validation_is_fatal() {
        let registry = GeneratorRegistry::new();
        let reader = OfflineSchemaReader;
        let ctx = GeneratorContext::new(DatabaseDialect::Postgresql, &registry, &reader);
        let statement = Statement::CreateProcedure(CreateProcedureStatement {
            procedure_name: "p".into(),
            procedure_text: "BEGIN END".into(),
        });

        let generator = &UNSUPPORTED[6];
        assert_eq!(generator.kind(), StatementKind::CreateProcedure);
        let err = generator.generate(&statement, &ctx).unwrap_err();
        assert!(matches!(err, MigrateError::Unsupported(_)));
        assert_eq!(err.to_string(), CREATE_PROCEDURE_VALIDATION_ERROR);
    }

    #[test]
    fn test_every_message_names_the_feature() {
        for generator in &UNSUPPORTED {
            assert!(
                generator.message().starts_with("Cloud Spanner does not support"),
                "{}",
                generator.name()
            );
        }
    }
}
