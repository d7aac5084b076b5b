//! Generator registry for explicit dependency injection.
//!
//! The [`GeneratorRegistry`] maps each [`StatementKind`] to the generators
//! that claim it. Unlike a global service loader, it is explicitly
//! constructed and passed to callers, so tests can build a registry with
//! exactly the generators they need.
//!
//! Dispatch is a deterministic lookup plus sort: among generators for the
//! statement's kind that support the dialect, the highest priority wins.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::config::ChangelogConfig;
use crate::dialect::SpannerTypeMapper;
use crate::drivers::spanner::{DatabaseDialect, SpannerDialect};
use crate::error::{MigrateError, Result};

use super::statement::{Sql, Statement, StatementKind};
use super::traits::{SchemaReader, SqlGenerator, TypeMapper, ValidationErrors};

static DEFAULT_TYPE_MAPPER: SpannerTypeMapper = SpannerTypeMapper;

/// Everything a generator may consult while validating or generating.
pub struct GeneratorContext<'a> {
    /// Dialect helpers for the target database.
    pub dialect: SpannerDialect,

    /// Live-schema lookups (nullability, foreign keys, defaults).
    pub reader: &'a dyn SchemaReader,

    /// Abstract type to Spanner type mapping.
    pub type_mapper: &'a dyn TypeMapper,

    /// Registry used by composite generators to delegate sub-statements.
    pub registry: &'a GeneratorRegistry,

    /// Names of the changelog tracking tables.
    pub changelog: ChangelogConfig,
}

impl<'a> GeneratorContext<'a> {
    /// Create a context with the built-in type mapper and default changelog
    /// table names.
    pub fn new(
        dialect: DatabaseDialect,
        registry: &'a GeneratorRegistry,
        reader: &'a dyn SchemaReader,
    ) -> Self {
        Self {
            dialect: SpannerDialect::new(dialect),
            reader,
            type_mapper: &DEFAULT_TYPE_MAPPER,
            registry,
            changelog: ChangelogConfig::default(),
        }
    }

    /// Override the type mapper.
    #[must_use]
    pub fn with_type_mapper(mut self, mapper: &'a dyn TypeMapper) -> Self {
        self.type_mapper = mapper;
        self
    }

    /// Override the changelog table names.
    #[must_use]
    pub fn with_changelog(mut self, changelog: ChangelogConfig) -> Self {
        self.changelog = changelog;
        self
    }

    /// The raw dialect value.
    pub fn database_dialect(&self) -> DatabaseDialect {
        self.dialect.dialect()
    }

    /// Map abstract type text to concrete type text for this dialect.
    pub fn map_type(&self, type_text: &str) -> String {
        self.type_mapper
            .resolve(type_text, self.database_dialect())
            .target_type
    }
}

/// Registry of SQL generators keyed by statement kind.
///
/// # Example
///
/// ```rust,ignore
/// let registry = GeneratorRegistry::with_builtins();
/// let reader = OfflineSchemaReader;
/// let ctx = GeneratorContext::new(DatabaseDialect::GoogleStandardSql, &registry, &reader);
/// let sql = registry.generate(&statement, &ctx)?;
/// ```
#[derive(Default)]
pub struct GeneratorRegistry {
    generators: HashMap<StatementKind, Vec<Arc<dyn SqlGenerator>>>,
}

impl GeneratorRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the portable generators and all Spanner
    /// overrides registered.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::generators::register_builtins(&mut registry);
        registry
    }

    /// Register a generator under its own kind.
    pub fn register(&mut self, generator: impl SqlGenerator + 'static) {
        self.register_arc(Arc::new(generator));
    }

    /// Register a generator as an Arc (for sharing).
    pub fn register_arc(&mut self, generator: Arc<dyn SqlGenerator>) {
        self.generators
            .entry(generator.kind())
            .or_default()
            .push(generator);
    }

    /// Generators that support the statement on `dialect`, highest priority
    /// first. Registration order breaks ties.
    pub fn candidates(
        &self,
        statement: &Statement,
        dialect: DatabaseDialect,
    ) -> Vec<Arc<dyn SqlGenerator>> {
        let mut found: Vec<Arc<dyn SqlGenerator>> = self
            .generators
            .get(&statement.kind())
            .map(|list| {
                list.iter()
                    .filter(|g| g.supports(statement, dialect))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        found.sort_by(|a, b| b.priority().cmp(&a.priority()));
        found
    }

    /// The winning generator for a statement, if any.
    pub fn select(
        &self,
        statement: &Statement,
        dialect: DatabaseDialect,
    ) -> Option<Arc<dyn SqlGenerator>> {
        self.candidates(statement, dialect).into_iter().next()
    }

    /// The winning generator, returning an error if none applies.
    pub fn require(
        &self,
        statement: &Statement,
        dialect: DatabaseDialect,
    ) -> Result<Arc<dyn SqlGenerator>> {
        self.select(statement, dialect).ok_or_else(|| {
            MigrateError::no_generator(statement.kind().to_string(), dialect.to_string())
        })
    }

    /// Validate a statement with its winning generator.
    pub fn validate(
        &self,
        statement: &Statement,
        ctx: &GeneratorContext<'_>,
    ) -> Result<ValidationErrors> {
        let generator = self.require(statement, ctx.database_dialect())?;
        Ok(generator.validate(statement, ctx))
    }

    /// Validate, then generate. Nothing is generated when validation fails.
    pub fn generate(&self, statement: &Statement, ctx: &GeneratorContext<'_>) -> Result<Vec<Sql>> {
        let generator = self.require(statement, ctx.database_dialect())?;

        let errors = generator.validate(statement, ctx);
        if errors.has_errors() {
            return Err(MigrateError::validation(
                statement.describe(),
                errors.into_vec(),
            ));
        }

        let sql = generator.generate(statement, ctx)?;
        for fragment in &sql {
            debug!("{}: {}", generator.name(), fragment.text);
        }
        Ok(sql)
    }

    /// Generate a sequence of statements.
    ///
    /// Every statement is validated before any SQL is produced, and all
    /// validation errors are reported together.
    pub fn generate_all(
        &self,
        statements: &[Statement],
        ctx: &GeneratorContext<'_>,
    ) -> Result<Vec<Sql>> {
        let mut failures = Vec::new();
        for statement in statements {
            let errors = self.validate(statement, ctx)?;
            if errors.has_errors() {
                failures.extend(
                    errors
                        .into_vec()
                        .into_iter()
                        .map(|e| format!("{}: {}", statement.describe(), e)),
                );
            }
        }
        if !failures.is_empty() {
            return Err(MigrateError::validation(
                format!("{} statement(s)", statements.len()),
                failures,
            ));
        }

        let mut all = Vec::new();
        for statement in statements {
            all.extend(self.generate(statement, ctx)?);
        }
        Ok(all)
    }

    /// Statement kinds with at least one registered generator.
    pub fn kinds(&self) -> Vec<StatementKind> {
        let mut kinds: Vec<StatementKind> = self.generators.keys().copied().collect();
        kinds.sort();
        kinds
    }

    /// All generators registered for a kind, in registration order.
    pub fn generators_for(&self, kind: StatementKind) -> &[Arc<dyn SqlGenerator>] {
        self.generators.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl std::fmt::Debug for GeneratorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<(&StatementKind, Vec<&str>)> = self
            .generators
            .iter()
            .map(|(k, v)| (k, v.iter().map(|g| g.name()).collect()))
            .collect();
        names.sort_by_key(|(k, _)| **k);
        f.debug_struct("GeneratorRegistry")
            .field("generators", &names)
            .finish()
    }
}
