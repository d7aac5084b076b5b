//! YAML changelogs rendered to Cloud Spanner SQL.
//!
//! ```yaml
//! changeSets:
//!   - id: "1"
//!     author: dev
//!     changes:
//!       - createTable:
//!           tableName: Singers
//!           columns:
//!             - name: SingerId
//!               type: BIGINT
//!               primaryKey: true
//!     rollback:
//!       - dropTable:
//!           tableName: Singers
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::core::catalog::GeneratorContext;
use crate::core::statement::{Sql, Statement};
use crate::error::{MigrateError, Result};

/// A changelog file: an ordered list of change sets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeLog {
    #[serde(default)]
    pub change_sets: Vec<ChangeSet>,
}

/// One change set. Identified by id and author together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSet {
    pub id: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default)]
    pub changes: Vec<Statement>,
    #[serde(default)]
    pub rollback: Vec<Statement>,
}

impl ChangeSet {
    fn label(&self) -> String {
        format!("{}::{}", self.id, self.author)
    }
}

/// SQL rendered for one change set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangesetSql {
    pub id: String,
    pub author: String,
    /// SHA-256 of the rendered statements.
    pub checksum: String,
    pub statements: Vec<Sql>,
    pub rollback: Vec<Sql>,
}

impl ChangesetSql {
    /// Statements as a script, each followed by its end delimiter.
    pub fn script(&self) -> String {
        script(&self.statements)
    }
}

/// Join fragments into a script, one statement per line.
pub fn script(statements: &[Sql]) -> String {
    let mut out = String::new();
    for sql in statements {
        out.push_str(&sql.text);
        out.push_str(&sql.end_delimiter);
        out.push('\n');
    }
    out
}

fn checksum(statements: &[Sql]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(script(statements).as_bytes());
    format!("{:x}", hasher.finalize())
}

impl ChangeLog {
    /// Load a changelog from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse a changelog and check change set identities.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let changelog: ChangeLog = serde_yaml::from_str(yaml)?;
        changelog.check_identities()?;
        Ok(changelog)
    }

    fn check_identities(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for change_set in &self.change_sets {
            if change_set.id.trim().is_empty() {
                return Err(MigrateError::Config("changeSet id is required".into()));
            }
            if change_set.author.trim().is_empty() {
                return Err(MigrateError::Config(format!(
                    "changeSet {} has no author",
                    change_set.id
                )));
            }
            if !seen.insert((change_set.id.as_str(), change_set.author.as_str())) {
                return Err(MigrateError::Config(format!(
                    "duplicate changeSet {}",
                    change_set.label()
                )));
            }
        }
        Ok(())
    }

    /// Validate every change and rollback statement.
    ///
    /// All failures across the changelog are reported in one error.
    pub fn validate(&self, ctx: &GeneratorContext<'_>) -> Result<()> {
        let mut failures = Vec::new();
        for change_set in &self.change_sets {
            for statement in change_set.changes.iter().chain(&change_set.rollback) {
                let errors = ctx.registry.validate(statement, ctx)?;
                failures.extend(errors.into_vec().into_iter().map(|e| {
                    format!("{}: {}: {}", change_set.label(), statement.describe(), e)
                }));
            }
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(MigrateError::validation("changelog", failures))
        }
    }

    /// Render every change set. Nothing is rendered unless the whole
    /// changelog validates.
    pub fn render(&self, ctx: &GeneratorContext<'_>) -> Result<Vec<ChangesetSql>> {
        self.validate(ctx)?;

        let mut rendered = Vec::with_capacity(self.change_sets.len());
        for change_set in &self.change_sets {
            let statements = ctx.registry.generate_all(&change_set.changes, ctx)?;
            let rollback = ctx.registry.generate_all(&change_set.rollback, ctx)?;
            rendered.push(ChangesetSql {
                id: change_set.id.clone(),
                author: change_set.author.clone(),
                checksum: checksum(&statements),
                statements,
                rollback,
            });
        }

        info!(
            "Rendered {} change set(s) for {}",
            rendered.len(),
            ctx.database_dialect()
        );
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::GeneratorRegistry;
    use crate::drivers::spanner::{DatabaseDialect, OfflineSchemaReader};

    const CHANGELOG: &str = r#"
changeSets:
  - id: "1"
    author: dev
    changes:
      - createTable:
          tableName: Singers
          columns:
            - name: SingerId
              type: BIGINT
              primaryKey: true
            - name: LastName
              type: VARCHAR(100)
    rollback:
      - dropTable:
          tableName: Singers
  - id: "2"
    author: dev
    changes:
      - delete:
          tableName: Singers
"#;

    fn render(yaml: &str) -> Result<Vec<ChangesetSql>> {
        let registry = GeneratorRegistry::with_builtins();
        let reader = OfflineSchemaReader;
        let ctx = GeneratorContext::new(DatabaseDialect::GoogleStandardSql, &registry, &reader);
        ChangeLog::from_yaml(yaml)?.render(&ctx)
    }

    // =========================================================================
    // Parsing
    // =========================================================================

    #[test]
    fn test_parse_changelog() {
        let changelog = ChangeLog::from_yaml(CHANGELOG).unwrap();
        assert_eq!(changelog.change_sets.len(), 2);
        assert_eq!(changelog.change_sets[0].changes.len(), 1);
        assert_eq!(changelog.change_sets[0].rollback.len(), 1);
        assert!(changelog.change_sets[1].rollback.is_empty());
    }

    #[test]
    fn test_duplicate_change_set_rejected() {
        let yaml = r#"
changeSets:
  - id: "1"
    author: dev
  - id: "1"
    author: dev
"#;
        let err = ChangeLog::from_yaml(yaml).unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: duplicate changeSet 1::dev");
    }

    #[test]
    fn test_missing_author_rejected() {
        let yaml = r#"
changeSets:
  - id: "7"
    author: " "
"#;
        assert!(matches!(
            ChangeLog::from_yaml(yaml),
            Err(MigrateError::Config(_))
        ));
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    #[test]
    fn test_render_change_sets() {
        let rendered = render(CHANGELOG).unwrap();
        assert_eq!(rendered.len(), 2);
        assert_eq!(rendered[0].statements.len(), 1);
        assert!(rendered[0].statements[0]
            .text
            .ends_with("PRIMARY KEY (SingerId)"));
        assert_eq!(rendered[0].rollback[0].text, "DROP TABLE Singers");
        assert_eq!(rendered[1].statements[0].text, "DELETE FROM Singers WHERE true");
        assert_eq!(rendered[0].checksum.len(), 64);
        assert_ne!(rendered[0].checksum, rendered[1].checksum);
    }

    #[test]
    fn test_checksum_is_stable() {
        let first = render(CHANGELOG).unwrap();
        let second = render(CHANGELOG).unwrap();
        assert_eq!(first[0].checksum, second[0].checksum);
    }

    #[test]
    fn test_validation_errors_collected_before_rendering() {
        let yaml = r#"
changeSets:
  - id: "1"
    author: dev
    changes:
      - renameColumn:
          tableName: Singers
          oldColumnName: A
          newColumnName: B
  - id: "2"
    author: dev
    changes:
      - addPrimaryKey:
          tableName: Singers
          columnNames: [SingerId]
"#;
        let err = render(yaml).unwrap_err();
        let MigrateError::Validation { errors, .. } = err else {
            panic!("expected a validation error, got {err}");
        };
        assert_eq!(errors.len(), 2);
        assert!(errors[0].starts_with("1::dev: "));
        assert!(errors[1].contains("does not support adding a primary key"));
    }

    #[test]
    fn test_script_uses_end_delimiters() {
        let rendered = render(CHANGELOG).unwrap();
        assert_eq!(rendered[1].script(), "DELETE FROM Singers WHERE true;\n");
    }
}
