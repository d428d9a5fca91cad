//! Configuration validation

use tracing::debug;

use crate::error::{ConfigError, Result};

use super::types::{Config, RepositoryConfig};

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    debug!("validating configuration");
    validate_repository("target", &config.target)?;
    validate_repository("source", &config.source)?;
    validate_assets(config)?;
    validate_formula(config)?;
    validate_git(config)?;
    validate_deploy(config)?;
    debug!("configuration validation passed");
    Ok(())
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        message: message.to_string(),
    }
}

fn validate_repository(section: &str, repo: &RepositoryConfig) -> Result<()> {
    if repo.owner.trim().is_empty() {
        return Err(invalid(&format!("{}.owner", section), "owner cannot be empty").into());
    }
    if repo.repo.trim().is_empty() {
        return Err(invalid(&format!("{}.repo", section), "repo cannot be empty").into());
    }
    Ok(())
}

fn validate_assets(config: &Config) -> Result<()> {
    if config.assets.binary.trim().is_empty() {
        return Err(invalid("assets.binary", "binary name cannot be empty").into());
    }
    Ok(())
}

fn validate_formula(config: &Config) -> Result<()> {
    if config.formula.path.as_os_str().is_empty() {
        return Err(invalid("formula.path", "path cannot be empty").into());
    }
    if config.formula.path.is_absolute() {
        return Err(invalid("formula.path", "must be relative to the repository root").into());
    }
    Ok(())
}

fn validate_git(config: &Config) -> Result<()> {
    if config.git.remote.is_empty() {
        return Err(invalid("git.remote", "remote cannot be empty").into());
    }
    if config.git.author_name.is_empty() || config.git.author_email.is_empty() {
        return Err(invalid("git.author_name", "commit identity cannot be empty").into());
    }
    Ok(())
}

fn validate_deploy(config: &Config) -> Result<()> {
    if config.deploy.enabled && config.deploy.command.trim().is_empty() {
        let message = "command cannot be empty when deploy is enabled";
        return Err(invalid("deploy.command", message).into());
    }
    Ok(())
}
