//! Release pipeline orchestration

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument};

use crate::error::{ReleaseError, Result};
use crate::types::{
    tag_name, ReleaseAsset, ReleaseBundle, ReleaseLookup, ReleaseSummary, TagOutcome,
    ASSET_MEDIA_TYPE,
};

use super::reporter::{ReleaseEvent, ReleaseReporter, TracingReporter};
use super::ReleaseStep;

/// Operations the release pipeline is built from.
///
/// The production implementation talks to GitHub and git; tests substitute
/// recording doubles. Implementations own the [`ReleaseBundle`] and fill it
/// in as the steps run.
#[async_trait]
pub trait Release: Send + Sync {
    /// Authenticated API client shared by the remote steps
    type Client: Send + Sync;

    /// Open handle to an archive, consumed by the upload
    type AssetFile: Send;

    /// Version without the `v` prefix
    fn version(&self) -> &str;

    /// Current state of the release
    fn bundle(&self) -> &ReleaseBundle;

    /// Tag for this release
    fn tag(&self) -> String {
        tag_name(self.version())
    }

    /// Build the API client
    async fn create_github_client(&self, token: &str) -> Result<Self::Client>;

    /// Fetch archives and notes into `dir`, filling in the bundle
    async fn download_assets_and_notes(&mut self, client: &Self::Client, dir: &Path)
        -> Result<()>;

    /// Check that every local file is present
    fn validate(&self) -> Result<()>;

    /// Hash every archive
    fn compute_checksums(&mut self) -> Result<()>;

    /// Look up the release in the target repository
    async fn release_exists(&self, client: &Self::Client) -> Result<ReleaseLookup>;

    /// Render the formula for this release
    fn render_formula(&self) -> Result<String>;

    /// Write the rendered formula into the working copy
    fn save_formula(&self, content: &str) -> Result<PathBuf>;

    /// Commit the formula, push the branch, return the commit hash
    async fn commit_formula_change(&self, token: &str, message: &str) -> Result<String>;

    /// Tag `commit` and push the tag
    async fn create_and_push_tag(&self, token: &str, commit: &str) -> Result<TagOutcome>;

    /// Publish the release, returning its id
    async fn create_github_release(&self, client: &Self::Client) -> Result<u64>;

    /// Open an archive for upload
    async fn open_asset_file(&self, asset: &ReleaseAsset) -> Result<Self::AssetFile>;

    /// Upload one archive, returning the bytes sent
    async fn upload_release_asset(
        &self,
        client: &Self::Client,
        release_id: u64,
        asset: &ReleaseAsset,
        media_type: &str,
        file: Self::AssetFile,
    ) -> Result<u64>;

    /// Run the deploy command, returning the command line
    async fn deploy(&self) -> Result<String>;
}

/// Runs the release steps in order, stopping at the first failure.
///
/// Nothing is retried and nothing is rolled back; side effects of steps
/// that already finished remain.
pub struct ReleaseStrategy {
    token: String,
    dir: PathBuf,
    deploy: bool,
    reporter: Arc<dyn ReleaseReporter>,
}

impl ReleaseStrategy {
    /// Create a strategy downloading into `dir`
    pub fn new(token: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            token: token.into(),
            dir: dir.into(),
            deploy: false,
            reporter: Arc::new(TracingReporter),
        }
    }

    /// Run the deploy step after uploading
    pub fn with_deploy(mut self, deploy: bool) -> Self {
        self.deploy = deploy;
        self
    }

    /// Send progress to `reporter`
    pub fn with_reporter(mut self, reporter: Arc<dyn ReleaseReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Working directory for downloads
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn start(&self, step: ReleaseStep) {
        self.reporter.report(&ReleaseEvent::StepStarted { step });
    }

    fn fail(&self, step: ReleaseStep, cause: ReleaseError) -> ReleaseError {
        let err = ReleaseError::in_step(step, cause);
        self.reporter.report(&ReleaseEvent::Failed {
            step,
            error: err.to_string(),
        });
        err
    }

    fn fail_asset(
        &self,
        step: ReleaseStep,
        asset: &ReleaseAsset,
        cause: ReleaseError,
    ) -> ReleaseError {
        let err = ReleaseError::in_asset_step(step, asset.file_name(), cause);
        self.reporter.report(&ReleaseEvent::Failed {
            step,
            error: err.to_string(),
        });
        err
    }

    /// Execute the pipeline against `release`
    #[instrument(skip_all, fields(version = %release.version(), dir = %self.dir.display()))]
    pub async fn execute<R: Release>(&self, release: &mut R) -> Result<ReleaseSummary> {
        info!("executing release strategy");

        self.start(ReleaseStep::CreateClient);
        let client = release
            .create_github_client(&self.token)
            .await
            .map_err(|e| self.fail(ReleaseStep::CreateClient, e))?;

        self.start(ReleaseStep::Download);
        release
            .download_assets_and_notes(&client, &self.dir)
            .await
            .map_err(|e| self.fail(ReleaseStep::Download, e))?;

        self.start(ReleaseStep::Validate);
        release
            .validate()
            .map_err(|e| self.fail(ReleaseStep::Validate, e))?;

        self.start(ReleaseStep::Checksums);
        release
            .compute_checksums()
            .map_err(|e| self.fail(ReleaseStep::Checksums, e))?;
        for asset in &release.bundle().assets {
            self.reporter.report(&ReleaseEvent::Checksum {
                file_name: asset.file_name(),
                checksum: asset.checksum.clone().unwrap_or_default(),
            });
        }

        let tag = release.tag();

        self.start(ReleaseStep::CheckExisting);
        let lookup = release
            .release_exists(&client)
            .await
            .map_err(|e| self.fail(ReleaseStep::CheckExisting, e))?;
        if lookup.exists() {
            let err = ReleaseError::AlreadyExists { tag };
            self.reporter.report(&ReleaseEvent::Failed {
                step: ReleaseStep::CheckExisting,
                error: err.to_string(),
            });
            return Err(err);
        }

        self.start(ReleaseStep::RenderFormula);
        let formula = release
            .render_formula()
            .map_err(|e| self.fail(ReleaseStep::RenderFormula, e))?;

        self.start(ReleaseStep::SaveFormula);
        release
            .save_formula(&formula)
            .map_err(|e| self.fail(ReleaseStep::SaveFormula, e))?;

        self.start(ReleaseStep::CommitFormula);
        let message = format!("Update formula for release {}", tag);
        let commit = release
            .commit_formula_change(&self.token, &message)
            .await
            .map_err(|e| self.fail(ReleaseStep::CommitFormula, e))?;
        self.reporter.report(&ReleaseEvent::Committed {
            commit: commit.clone(),
        });

        self.start(ReleaseStep::Tag);
        let tag_outcome = release
            .create_and_push_tag(&self.token, &commit)
            .await
            .map_err(|e| self.fail(ReleaseStep::Tag, e))?;
        self.reporter.report(&ReleaseEvent::Tagged {
            tag: tag.clone(),
            outcome: tag_outcome,
        });

        self.start(ReleaseStep::CreateRelease);
        let release_id = release
            .create_github_release(&client)
            .await
            .map_err(|e| self.fail(ReleaseStep::CreateRelease, e))?;
        self.reporter.report(&ReleaseEvent::ReleaseCreated {
            tag: tag.clone(),
            id: release_id,
        });

        let assets = release.bundle().assets.clone();
        for asset in &assets {
            self.start(ReleaseStep::OpenAsset);
            let file = release
                .open_asset_file(asset)
                .await
                .map_err(|e| self.fail_asset(ReleaseStep::OpenAsset, asset, e))?;

            self.start(ReleaseStep::UploadAsset);
            let bytes = release
                .upload_release_asset(&client, release_id, asset, ASSET_MEDIA_TYPE, file)
                .await
                .map_err(|e| self.fail_asset(ReleaseStep::UploadAsset, asset, e))?;
            self.reporter.report(&ReleaseEvent::AssetUploaded {
                file_name: asset.file_name(),
                bytes,
            });
        }

        if self.deploy {
            self.start(ReleaseStep::Deploy);
            let command = release
                .deploy()
                .await
                .map_err(|e| self.fail(ReleaseStep::Deploy, e))?;
            self.reporter.report(&ReleaseEvent::Deployed { command });
        }

        let summary = ReleaseSummary {
            version: release.version().to_string(),
            tag,
            tag_outcome,
            commit,
            release_id,
            assets,
            deployed: self.deploy,
        };
        self.reporter.report(&ReleaseEvent::Completed {
            summary: summary.clone(),
        });
        info!(release_id, "release complete");
        Ok(summary)
    }
}
