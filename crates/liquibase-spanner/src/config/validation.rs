//! Configuration validation.

use super::Config;
use crate::connection::URL_PREFIX;
use crate::core::identifier::validate_identifier;
use crate::error::{MigrateError, Result};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    // Database validation
    if config.database.url.is_empty() {
        return Err(MigrateError::Config("database.url is required".into()));
    }
    if !config.database.url.starts_with(URL_PREFIX) {
        return Err(MigrateError::Config(format!(
            "database.url must start with '{}', got '{}'",
            URL_PREFIX, config.database.url
        )));
    }
    if config.database.driver_major_version == 0 {
        return Err(MigrateError::Config(
            "database.driver_major_version must be at least 1".into(),
        ));
    }

    // Changelog tables
    validate_identifier(&config.changelog.table_name).map_err(|e| {
        MigrateError::Config(format!("changelog.table_name is invalid: {}", e))
    })?;
    validate_identifier(&config.changelog.lock_table_name).map_err(|e| {
        MigrateError::Config(format!("changelog.lock_table_name is invalid: {}", e))
    })?;
    if config
        .changelog
        .table_name
        .eq_ignore_ascii_case(&config.changelog.lock_table_name)
    {
        return Err(MigrateError::Config(
            "changelog.table_name and changelog.lock_table_name must differ".into(),
        ));
    }

    if config.output.end_delimiter.is_empty() {
        return Err(MigrateError::Config(
            "output.end_delimiter cannot be empty".into(),
        ));
    }

    Ok(())
}
