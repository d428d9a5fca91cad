//! Configuration loading

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{ConfigError, Result};

use super::defaults::config_file_names;
use super::types::Config;
use super::validation::validate_config;

/// Load configuration from a file
pub fn load_config(path: &Path) -> Result<Config> {
    let format = if path
        .extension()
        .is_some_and(|e| e == "yaml" || e == "yml")
    {
        "YAML"
    } else {
        "TOML"
    };
    info!(path = %path.display(), format, "loading config");

    let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

    let config: Config = if format == "TOML" {
        toml::from_str(&content).map_err(ConfigError::TomlError)?
    } else {
        serde_yaml::from_str(&content).map_err(ConfigError::YamlError)?
    };

    validate_config(&config)?;
    debug!(path = %path.display(), "config loaded and validated");
    Ok(config)
}

/// Find a configuration file in the repository working copy.
///
/// Checks `<dir>/<name>` then `<dir>/.github/<name>` for each known name.
/// Parent directories are not searched; the working copy is the boundary.
pub fn find_config(dir: &Path) -> Option<PathBuf> {
    debug!(dir = %dir.display(), "searching for config file");
    for name in config_file_names() {
        let config_path = dir.join(name);
        if config_path.is_file() {
            info!(path = %config_path.display(), "found config file");
            return Some(config_path);
        }

        let github_path = dir.join(".github").join(name);
        if github_path.is_file() {
            info!(path = %github_path.display(), "found config file in .github/");
            return Some(github_path);
        }
    }

    debug!("no config file found");
    None
}

/// Load an explicit config file, or search `dir`, or fall back to defaults.
///
/// An explicit path that does not exist is an error; a missing file during
/// the search is not.
pub fn resolve_config(explicit: Option<&Path>, dir: &Path) -> Result<(Config, Option<PathBuf>)> {
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.to_path_buf()).into());
        }
        return Ok((load_config(path)?, Some(path.to_path_buf())));
    }

    match find_config(dir) {
        Some(path) => Ok((load_config(&path)?, Some(path))),
        None => {
            debug!(dir = %dir.display(), "no config found, using defaults");
            Ok((Config::default(), None))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReleaseError;
    use crate::types::AssetNaming;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_toml() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("mkrelease.toml");
        std::fs::write(&config_path, "[assets]\nbinary = \"tool\"").unwrap();

        assert_eq!(find_config(temp.path()), Some(config_path));
    }

    #[test]
    fn test_find_config_prefers_toml_over_yaml() {
        let temp = TempDir::new().unwrap();
        let toml_path = temp.path().join("mkrelease.toml");
        std::fs::write(&toml_path, "[assets]\nbinary = \"tool\"").unwrap();
        std::fs::write(temp.path().join("mkrelease.yaml"), "assets:\n  binary: other").unwrap();

        assert_eq!(find_config(temp.path()).unwrap(), toml_path);
    }

    #[test]
    fn test_find_config_in_github_dir() {
        let temp = TempDir::new().unwrap();
        let github_dir = temp.path().join(".github");
        std::fs::create_dir_all(&github_dir).unwrap();
        let config_path = github_dir.join("mkrelease.toml");
        std::fs::write(&config_path, "[assets]\nbinary = \"tool\"").unwrap();

        assert_eq!(find_config(temp.path()), Some(config_path));
    }

    #[test]
    fn test_load_config_toml() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("mkrelease.toml");
        std::fs::write(
            &config_path,
            "[target]\nowner = \"acme\"\nrepo = \"tool-releases\"\n\n[assets]\nbinary = \"tool\"\nnaming = \"versioned\"\n",
        )
        .unwrap();

        let config = load_config(&config_path).unwrap();
        assert_eq!(config.target.slug(), "acme/tool-releases");
        assert_eq!(config.assets.binary, "tool");
        assert_eq!(config.assets.naming, AssetNaming::Versioned);
        assert_eq!(config.source.slug(), "pagerguild/pagerguild");
    }

    #[test]
    fn test_load_config_yaml() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("mkrelease.yaml");
        std::fs::write(
            &config_path,
            "deploy:\n  enabled: true\n  command: ./deploy.sh\ngit:\n  remote: upstream\n",
        )
        .unwrap();

        let config = load_config(&config_path).unwrap();
        assert!(config.deploy.enabled);
        assert_eq!(config.deploy.command, "./deploy.sh");
        assert_eq!(config.git.remote, "upstream");
    }

    #[test]
    fn test_resolve_defaults_when_absent() {
        let temp = TempDir::new().unwrap();
        let (config, path) = resolve_config(None, temp.path()).unwrap();
        assert!(path.is_none());
        assert_eq!(config.assets.binary, "guilde-cli");
    }

    #[test]
    fn test_resolve_explicit_missing() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("custom.toml");
        let err = resolve_config(Some(&missing), temp.path()).unwrap_err();
        assert!(matches!(err, ReleaseError::Config(ConfigError::NotFound(_))));
    }
}
