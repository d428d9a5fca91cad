//! Error types for mkrelease

use std::path::PathBuf;
use thiserror::Error;

use crate::workflow::ReleaseStep;

/// Result type alias using ReleaseError
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Main error type for release operations
#[derive(Debug, Error)]
pub enum ReleaseError {
    /// Bad command line arguments or environment
    #[error("{0}")]
    Usage(String),

    /// Configuration-related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A required local file is missing
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Git-related errors
    #[error(transparent)]
    Git(#[from] GitError),

    /// GitHub API errors
    #[error(transparent)]
    GitHub(#[from] GitHubError),

    /// Formula rendering errors
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// A release for this tag is already published
    #[error("release {tag} already exists")]
    AlreadyExists { tag: String },

    /// The deploy command failed
    #[error("Deploy command `{command}` failed: {message}")]
    Deployment { command: String, message: String },

    /// IO error on a specific file
    #[error("IO error on {}: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A pipeline step failed
    #[error("{step}: {cause}")]
    Step {
        step: ReleaseStep,
        cause: Box<ReleaseError>,
    },

    /// A per-asset pipeline step failed
    #[error("{step} {asset}: {cause}")]
    AssetStep {
        step: ReleaseStep,
        asset: String,
        cause: Box<ReleaseError>,
    },
}

impl ReleaseError {
    /// Wrap an error with the step it happened in
    pub fn in_step(step: ReleaseStep, cause: impl Into<ReleaseError>) -> Self {
        Self::Step {
            step,
            cause: Box::new(cause.into()),
        }
    }

    /// Wrap an error with the step and the asset it happened on
    pub fn in_asset_step(
        step: ReleaseStep,
        asset: impl Into<String>,
        cause: impl Into<ReleaseError>,
    ) -> Self {
        Self::AssetStep {
            step,
            asset: asset.into(),
            cause: Box::new(cause.into()),
        }
    }

    /// Attach a path to an IO error
    pub fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::File {
            path: path.into(),
            source,
        }
    }

    /// The step that failed, if the error came out of the pipeline
    pub fn failed_step(&self) -> Option<ReleaseStep> {
        match self {
            Self::Step { step, .. } | Self::AssetStep { step, .. } => Some(*step),
            _ => None,
        }
    }

    /// Innermost error, skipping step wrappers
    pub fn root(&self) -> &ReleaseError {
        match self {
            Self::Step { cause, .. } | Self::AssetStep { cause, .. } => cause.root(),
            other => other,
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found at {0}")]
    NotFound(PathBuf),

    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {message}")]
    InvalidValue { field: String, message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// IO error
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
}

/// Local release files failed validation
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Release notes file is missing
    #[error("release notes not found at {}", .0.display())]
    MissingNotes(PathBuf),

    /// An asset archive is missing
    #[error("asset not found at {}", .0.display())]
    MissingAsset(PathBuf),

    /// The formula repository is not usable
    #[error("failed to open git repository at {}: {source}", .path.display())]
    Repository {
        path: PathBuf,
        #[source]
        source: GitError,
    },
}

/// Git-related errors
#[derive(Debug, Error)]
pub enum GitError {
    /// Not a git repository
    #[error("Not a git repository: {}", .0.display())]
    NotARepository(PathBuf),

    /// Failed to open repository
    #[error("Failed to open repository: {0}")]
    OpenFailed(String),

    /// Commit hash could not be parsed or found
    #[error("Commit not found: {0}")]
    CommitNotFound(String),

    /// Repository has no working directory
    #[error("Repository has no working directory")]
    BareRepository,

    /// HEAD does not point at a branch
    #[error("HEAD is not on a branch")]
    DetachedHead,

    /// Failed to create tag
    #[error("Failed to create tag {name}: {reason}")]
    TagCreationFailed { name: String, reason: String },

    /// Failed to push
    #[error("Failed to push to remote: {0}")]
    PushFailed(String),

    /// Remote not found
    #[error("Remote not found: {0}")]
    RemoteNotFound(String),

    /// Git2 library error
    #[error("Git error: {0}")]
    Git2(#[from] git2::Error),
}

/// GitHub API errors
#[derive(Debug, Error)]
pub enum GitHubError {
    /// Transport or decoding failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response from the API
    #[error("GitHub API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The remote rejected a duplicate release
    #[error("release {0} already exists")]
    AlreadyExists(String),

    /// An expected asset is not attached to the upstream release
    #[error("asset {name} not found in release {tag}")]
    AssetNotFound { name: String, tag: String },

    /// A redirect response without a usable Location header
    #[error("Redirect without a valid Location header for asset {0}")]
    MissingRedirect(u64),

    /// An API or upload base URL that cannot be used
    #[error("Invalid endpoint URL {url}: {reason}")]
    InvalidEndpoint { url: String, reason: String },

    /// Token cannot be used as a header value
    #[error("Invalid access token: {0}")]
    InvalidToken(String),

    /// IO error while streaming an asset
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Formula template errors
#[derive(Debug, Error)]
pub enum TemplateError {
    /// A `{{` with no closing `}}`
    #[error("Unterminated placeholder at byte {offset}")]
    Unterminated { offset: usize },

    /// Placeholder names an unknown variable
    #[error("Unknown template variable: {0}")]
    UnknownVariable(String),

    /// Checksum for an asset was never computed
    #[error("No checksum computed for asset {0}")]
    MissingChecksum(String),

    /// Template file could not be read
    #[error("Failed to read template {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
