//! Configuration types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::defaults::*;
use crate::types::AssetNaming;

/// Main configuration for mkrelease
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// GitHub endpoints
    pub github: GitHubConfig,

    /// Repository releases are published to
    pub target: RepositoryConfig,

    /// Repository build artifacts come from
    pub source: RepositoryConfig,

    /// Asset naming
    pub assets: AssetsConfig,

    /// Homebrew formula
    pub formula: FormulaConfig,

    /// Git configuration
    pub git: GitConfig,

    /// Post-release deployment
    pub deploy: DeployConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            github: GitHubConfig::default(),
            target: RepositoryConfig::default(),
            source: RepositoryConfig::default_source(),
            assets: AssetsConfig::default(),
            formula: FormulaConfig::default(),
            git: GitConfig::default(),
            deploy: DeployConfig::default(),
        }
    }
}

/// GitHub endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// REST API base URL
    pub api_url: String,

    /// Base URL for asset uploads
    pub uploads_url: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            uploads_url: DEFAULT_UPLOADS_URL.to_string(),
        }
    }
}

/// A GitHub repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Owner (user or organization)
    pub owner: String,

    /// Repository name
    pub repo: String,
}

impl RepositoryConfig {
    /// Create a repository reference
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// Default upstream repository
    pub fn default_source() -> Self {
        Self::new(DEFAULT_SOURCE_OWNER, DEFAULT_SOURCE_REPO)
    }

    /// `owner/repo`
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_OWNER, DEFAULT_TARGET_REPO)
    }
}

/// Asset naming configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Binary name used as the asset prefix
    pub binary: String,

    /// Whether asset names carry the version
    pub naming: AssetNaming,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            binary: DEFAULT_BINARY.to_string(),
            naming: AssetNaming::Plain,
        }
    }
}

/// Homebrew formula configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormulaConfig {
    /// Path of the formula relative to the repository root
    pub path: PathBuf,

    /// Custom template file; the built-in template is used when unset
    pub template: Option<PathBuf>,

    /// Formula `desc`
    pub description: String,
}

impl Default for FormulaConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_FORMULA_PATH),
            template: None,
            description: DEFAULT_FORMULA_DESCRIPTION.to_string(),
        }
    }
}

/// Git configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    /// Remote name
    pub remote: String,

    /// Commit and tag author name
    pub author_name: String,

    /// Commit and tag author email
    pub author_email: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            remote: "origin".to_string(),
            author_name: DEFAULT_AUTHOR_NAME.to_string(),
            author_email: DEFAULT_AUTHOR_EMAIL.to_string(),
        }
    }
}

/// Deployment step configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    /// Run the deploy command after uploading
    pub enabled: bool,

    /// Shell command to run in the repository working copy
    pub command: String,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            command: DEFAULT_DEPLOY_COMMAND.to_string(),
        }
    }
}
