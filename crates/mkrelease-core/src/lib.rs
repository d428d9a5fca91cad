//! mkrelease Core - Core library for the Homebrew release pipeline
//!
//! This crate provides the release data model, error handling, configuration,
//! formula templating and the step-by-step release workflow. Remote
//! operations are reached through the [`workflow::Release`] trait.

pub mod checksum;
pub mod config;
pub mod deploy;
pub mod error;
pub mod templates;
pub mod types;
pub mod validation;
pub mod workflow;

pub use checksum::sha256_file;
pub use config::Config;
pub use deploy::{DeployCommand, DeployOutput};
pub use error::{
    ConfigError, GitError, GitHubError, ReleaseError, Result, TemplateError, ValidationError,
};
pub use templates::{write_formula, FormulaTemplate, FormulaVariables};
pub use types::{
    tag_name, AssetNaming, Platform, ReleaseAsset, ReleaseBundle, ReleaseLookup, ReleaseSummary,
    TagOutcome,
};
pub use validation::validate_release_files;
pub use workflow::{
    CollectingReporter, Release, ReleaseEvent, ReleaseReporter, ReleaseStep, ReleaseStrategy,
    TracingReporter,
};
