//! CLI definition and command handling

pub mod output;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use console::style;
use tracing::info;

use mkrelease_core::config::{resolve_config, validate_config, Config};
use mkrelease_core::workflow::{ReleaseStrategy, ReporterRegistry};
use mkrelease_core::ReleaseError;

use crate::release::GitHubRelease;
use output::ConsoleReporter;

/// mkrelease - Publish a multi-platform CLI release and its Homebrew formula
#[derive(Debug, Parser)]
#[command(name = "mkrelease")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Version to release; a leading `v` is stripped
    #[arg(id = "release_version", value_name = "RELEASE_VERSION")]
    pub version: String,

    /// Directory the release archives and notes are downloaded into
    #[arg(value_name = "DIRECTORY_PATH")]
    pub directory: PathBuf,

    /// Working copy of the repository holding the formula
    #[arg(value_name = "REPO_PATH")]
    pub repo: PathBuf,

    /// Configuration file (default: search REPO_PATH)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Run the deploy command after uploading
    #[arg(long)]
    pub deploy: bool,

    /// GitHub access token
    #[arg(long, env = "GITHUB_PAT", hide_env_values = true)]
    pub token: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output
    Json,
}

impl Cli {
    /// Version with a single leading `v` removed
    pub fn normalized_version(&self) -> Result<String, ReleaseError> {
        let version = self.version.strip_prefix('v').unwrap_or(&self.version);
        if version.is_empty() {
            return Err(ReleaseError::Usage("Version cannot be empty".to_string()));
        }
        Ok(version.to_string())
    }

    /// Access token, which must be set and non-empty
    pub fn require_token(&self) -> Result<&str, ReleaseError> {
        match self.token.as_deref() {
            Some(token) if !token.trim().is_empty() => Ok(token),
            _ => Err(ReleaseError::Usage(
                "GITHUB_PAT environment variable is required".to_string(),
            )),
        }
    }

    /// Resolve configuration and apply command line overrides.
    ///
    /// Validation runs again after the overrides, since `--deploy` can
    /// enable a deploy section the file left incomplete.
    pub fn load_config(&self) -> Result<(Config, Option<PathBuf>), ReleaseError> {
        let (mut config, path) = resolve_config(self.config.as_deref(), &self.repo)?;
        if self.deploy {
            config.deploy.enabled = true;
            validate_config(&config)?;
        }
        Ok((config, path))
    }

    /// Execute the release
    pub fn execute(&self) -> anyhow::Result<()> {
        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(self.execute_async())
    }

    async fn execute_async(&self) -> anyhow::Result<()> {
        let version = self.normalized_version()?;
        let token = self.require_token()?;

        let (config, config_path) = self.load_config()?;
        let show_progress = !self.quiet && self.format == OutputFormat::Text;

        info!(
            version = %version,
            directory = %self.directory.display(),
            repo = %self.repo.display(),
            config = ?config_path,
            deploy = config.deploy.enabled,
            "executing release"
        );

        if show_progress {
            match &config_path {
                Some(path) => output::info(&format!(
                    "Using configuration from {}",
                    output::path_style().apply_to(path.display())
                )),
                None if self.verbose => output::info("No configuration found, using defaults"),
                None => {}
            }
            println!(
                "{} {} from {} to {}",
                output::header("Releasing"),
                output::version_style().apply_to(format!("v{}", version)),
                style(config.source.slug()).cyan(),
                style(config.target.slug()).cyan()
            );
        }

        let mut reporters = ReporterRegistry::new();
        if show_progress {
            reporters.register(ConsoleReporter::new(self.verbose));
        }

        let deploy = config.deploy.enabled;
        let mut release = GitHubRelease::new(version, &self.repo, config);
        let strategy = ReleaseStrategy::new(token, &self.directory)
            .with_deploy(deploy)
            .with_reporter(Arc::new(reporters));

        let summary = strategy.execute(&mut release).await?;

        if self.format == OutputFormat::Json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Ok(())
    }
}
