//! liquibase-spanner CLI - Render Cloud Spanner SQL from YAML changelogs.

use clap::{Parser, Subcommand};
use liquibase_spanner::changelog::script;
use liquibase_spanner::{
    batch_statements, ChangeLog, Config, DatabaseDialect, GeneratorContext, GeneratorRegistry,
    MigrateError, OfflineSchemaReader, Sql, Statement,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, Level};
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Parser)]
#[command(name = "liquibase-spanner")]
#[command(about = "Render Cloud Spanner SQL from YAML changelogs")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the SQL a changelog would run, without connecting
    UpdateSql {
        /// Path to YAML changelog
        #[arg(long, default_value = "changelog.yaml")]
        changelog: PathBuf,

        /// Override database dialect: google_standard_sql or postgresql
        #[arg(long)]
        dialect: Option<String>,
    },

    /// Check a changelog against Cloud Spanner rules
    Validate {
        /// Path to YAML changelog
        #[arg(long, default_value = "changelog.yaml")]
        changelog: PathBuf,

        /// Override database dialect: google_standard_sql or postgresql
        #[arg(long)]
        dialect: Option<String>,
    },

    /// Print the DDL creating the changelog tracking tables
    Bootstrap,

    /// Print the connection URL with the client user agent
    ConnectionUrl,
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

fn run() -> Result<(), MigrateError> {
    let cli = Cli::parse();

    // Setup logging
    setup_logging(&cli.verbosity, &cli.log_format)
        .map_err(|e| MigrateError::Config(e.to_string()))?;

    let mut config = Config::load(&cli.config)?;
    info!("Loaded configuration from {:?}", cli.config);

    match cli.command {
        Commands::UpdateSql { changelog, dialect } => {
            apply_dialect_override(&mut config, dialect)?;
            let changelog = ChangeLog::load(&changelog)?;

            let registry = GeneratorRegistry::with_builtins();
            let reader = OfflineSchemaReader;
            let ctx = GeneratorContext::new(config.database.dialect, &registry, &reader)
                .with_changelog(config.changelog.clone());
            let mut rendered = changelog.render(&ctx)?;

            for change_set in &mut rendered {
                let statements = std::mem::take(&mut change_set.statements);
                change_set.statements = finish(statements, &config);
            }

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&rendered)?);
            } else {
                for change_set in &rendered {
                    println!("-- Changeset {}::{}", change_set.id, change_set.author);
                    print!("{}", change_set.script());
                    println!();
                }
            }
        }

        Commands::Validate { changelog, dialect } => {
            apply_dialect_override(&mut config, dialect)?;
            let changelog = ChangeLog::load(&changelog)?;

            let registry = GeneratorRegistry::with_builtins();
            let reader = OfflineSchemaReader;
            let ctx = GeneratorContext::new(config.database.dialect, &registry, &reader)
                .with_changelog(config.changelog.clone());
            changelog.validate(&ctx)?;

            if cli.output_json {
                let result = serde_json::json!({
                    "valid": true,
                    "change_sets": changelog.change_sets.len(),
                    "dialect": config.database.dialect,
                });
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!(
                    "Changelog is valid: {} change set(s) for {}",
                    changelog.change_sets.len(),
                    config.database.dialect
                );
            }
        }

        Commands::Bootstrap => {
            let registry = GeneratorRegistry::with_builtins();
            let reader = OfflineSchemaReader;
            let ctx = GeneratorContext::new(config.database.dialect, &registry, &reader)
                .with_changelog(config.changelog.clone());
            let statements = registry.generate_all(
                &[
                    Statement::CreateChangeLogTable,
                    Statement::CreateChangeLogLockTable,
                    Statement::InitializeChangeLogLockTable,
                ],
                &ctx,
            )?;
            let statements = finish(statements, &config);

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&statements)?);
            } else {
                print!("{}", script(&statements));
            }
        }

        Commands::ConnectionUrl => {
            let url = config.database.connection_url();
            if cli.output_json {
                println!("{}", serde_json::json!({ "url": url }));
            } else {
                println!("{}", url);
            }
        }
    }

    Ok(())
}

fn apply_dialect_override(config: &mut Config, dialect: Option<String>) -> Result<(), MigrateError> {
    if let Some(dialect) = dialect {
        config.database.dialect = dialect.parse::<DatabaseDialect>()?;
    }
    Ok(())
}

/// Apply output settings: the configured delimiter and optional DDL batching.
fn finish(statements: Vec<Sql>, config: &Config) -> Vec<Sql> {
    let statements = if config.output.batch_ddl {
        batch_statements(statements)
    } else {
        statements
    };
    statements
        .into_iter()
        .map(|sql| {
            if sql.end_delimiter == ";" {
                sql.with_delimiter(config.output.end_delimiter.as_str())
            } else {
                sql
            }
        })
        .collect()
}

fn setup_logging(verbosity: &str, format: &str) -> Result<(), String> {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Logs go to stderr so stdout only carries SQL or JSON.
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(std::io::stderr);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    Ok(())
}
