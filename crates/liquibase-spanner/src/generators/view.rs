//! Views on Cloud Spanner.

use crate::core::catalog::GeneratorContext;
use crate::core::statement::{DatabaseObject, Sql, Statement, StatementKind};
use crate::core::traits::{SqlGenerator, ValidationErrors, PRIORITY_DATABASE};
use crate::error::Result;

use super::wrong_statement;

/// `CREATE [OR REPLACE] VIEW v SQL SECURITY INVOKER AS <query>`.
///
/// Spanner only accepts invoker-rights views. A statement carrying a full
/// definition is passed through untouched.
pub struct CreateViewGeneratorSpanner;

impl SqlGenerator for CreateViewGeneratorSpanner {
    fn name(&self) -> &str {
        "CreateViewGeneratorSpanner"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::CreateView
    }

    fn priority(&self) -> i32 {
        PRIORITY_DATABASE
    }

    fn validate(&self, statement: &Statement, _ctx: &GeneratorContext<'_>) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if let Statement::CreateView(stmt) = statement {
            errors.check_required("viewName", &stmt.view_name);
            errors.check_required("selectQuery", &stmt.select_query);
        }
        errors
    }

    fn generate(&self, statement: &Statement, ctx: &GeneratorContext<'_>) -> Result<Vec<Sql>> {
        let Statement::CreateView(stmt) = statement else {
            return Err(wrong_statement(self, statement));
        };

        let mut sql = String::new();
        if !stmt.full_definition {
            sql.push_str("CREATE ");
            if stmt.replace_if_exists {
                sql.push_str("OR REPLACE ");
            }
            sql.push_str("VIEW ");
            sql.push_str(&ctx.dialect.escape_object_name(&stmt.view_name)?);
            sql.push_str(" SQL SECURITY INVOKER AS ");
        }
        sql.push_str(&stmt.select_query);

        Ok(vec![Sql::new(sql).affecting(DatabaseObject::View {
            name: stmt.view_name.clone(),
        })])
    }
}
