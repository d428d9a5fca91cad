//! Production release backed by GitHub and git

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::File;
use tracing::{debug, info};

use mkrelease_core::config::Config;
use mkrelease_core::templates::{write_formula, FormulaTemplate, FormulaVariables};
use mkrelease_core::{
    validate_release_files, DeployCommand, Release, ReleaseAsset, ReleaseBundle, ReleaseError,
    ReleaseLookup, Result, TagOutcome, ValidationError,
};
use mkrelease_git::{GitRepo, Identity, TokenCredentials};
use mkrelease_github::GitHubClient;

/// Publishes to GitHub and commits the formula with git
pub struct GitHubRelease {
    bundle: ReleaseBundle,
    config: Config,
}

impl GitHubRelease {
    /// Release `version` with the formula repository at `repo_path`
    pub fn new(version: impl Into<String>, repo_path: impl Into<PathBuf>, config: Config) -> Self {
        Self {
            bundle: ReleaseBundle::new(version, repo_path),
            config,
        }
    }

    fn repo_path(&self) -> &Path {
        &self.bundle.repo_path
    }

    fn formula_path(&self) -> PathBuf {
        self.repo_path().join(&self.config.formula.path)
    }

    fn identity(&self) -> Identity {
        Identity::from(&self.config.git)
    }

    fn template(&self) -> Result<FormulaTemplate> {
        match &self.config.formula.template {
            Some(path) => Ok(FormulaTemplate::from_file(&self.repo_path().join(path))?),
            None => Ok(FormulaTemplate::embedded()),
        }
    }
}

#[async_trait]
impl Release for GitHubRelease {
    type Client = GitHubClient;
    type AssetFile = File;

    fn version(&self) -> &str {
        &self.bundle.version
    }

    fn bundle(&self) -> &ReleaseBundle {
        &self.bundle
    }

    async fn create_github_client(&self, token: &str) -> Result<GitHubClient> {
        Ok(GitHubClient::from_config(token, &self.config.github)?)
    }

    async fn download_assets_and_notes(&mut self, client: &GitHubClient, dir: &Path) -> Result<()> {
        self.bundle
            .create_assets(dir, &self.config.assets.binary, self.config.assets.naming);
        let file_names: Vec<String> = self.bundle.assets.iter().map(|a| a.file_name()).collect();

        let downloaded = client
            .download_release(&self.config.source, &self.bundle.tag(), &file_names, dir)
            .await?;
        info!(
            source = %self.config.source.slug(),
            assets = downloaded.assets.len(),
            "downloaded release"
        );

        self.bundle.notes_path = downloaded.notes_path;
        self.bundle.notes = downloaded.notes;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        validate_release_files(&self.bundle)?;
        GitRepo::open(self.repo_path()).map_err(|source| ValidationError::Repository {
            path: self.repo_path().to_path_buf(),
            source,
        })?;
        Ok(())
    }

    fn compute_checksums(&mut self) -> Result<()> {
        self.bundle.compute_checksums()
    }

    async fn release_exists(&self, client: &GitHubClient) -> Result<ReleaseLookup> {
        Ok(client
            .release_exists(&self.config.target, &self.bundle.tag())
            .await?)
    }

    fn render_formula(&self) -> Result<String> {
        let vars = FormulaVariables::new(&self.bundle, &self.config);
        Ok(self.template()?.render(&vars)?)
    }

    fn save_formula(&self, content: &str) -> Result<PathBuf> {
        write_formula(&self.formula_path(), content)
    }

    async fn commit_formula_change(&self, token: &str, message: &str) -> Result<String> {
        let repo_path = self.repo_path().to_path_buf();
        let formula = self.config.formula.path.clone();
        let remote = self.config.git.remote.clone();
        let identity = self.identity();
        let credentials = TokenCredentials::new(token);
        let message = message.to_string();

        run_blocking(move || {
            let repo = GitRepo::open(&repo_path)?;
            let hash = repo.commit_path(&formula, &message, &identity)?;
            repo.push_branch(&remote, &credentials)?;
            debug!(commit = %hash, "pushed formula commit");
            Ok(hash)
        })
        .await
    }

    async fn create_and_push_tag(&self, token: &str, commit: &str) -> Result<TagOutcome> {
        let repo_path = self.repo_path().to_path_buf();
        let remote = self.config.git.remote.clone();
        let identity = self.identity();
        let credentials = TokenCredentials::new(token);
        let commit = commit.to_string();
        let tag = self.bundle.tag();

        run_blocking(move || {
            let repo = GitRepo::open(&repo_path)?;
            let target = repo.resolve_commit(Some(&commit))?;
            let message = format!("Release {}", tag);
            let outcome = repo.ensure_annotated_tag(&tag, target, &message, &identity)?;
            repo.push_tag(&remote, &tag, &credentials)?;
            Ok(outcome)
        })
        .await
    }

    async fn create_github_release(&self, client: &GitHubClient) -> Result<u64> {
        let release = client
            .create_release(&self.config.target, &self.bundle.tag(), &self.bundle.notes)
            .await?;
        Ok(release.id)
    }

    async fn open_asset_file(&self, asset: &ReleaseAsset) -> Result<File> {
        File::open(&asset.path)
            .await
            .map_err(|e| ReleaseError::file(&asset.path, e))
    }

    async fn upload_release_asset(
        &self,
        client: &GitHubClient,
        release_id: u64,
        asset: &ReleaseAsset,
        media_type: &str,
        file: File,
    ) -> Result<u64> {
        Ok(client
            .upload_asset(
                &self.config.target,
                release_id,
                &asset.file_name(),
                media_type,
                file,
            )
            .await?)
    }

    async fn deploy(&self) -> Result<String> {
        let command = DeployCommand::new(&self.config.deploy.command, self.repo_path());
        run_blocking(move || {
            let output = command.run()?;
            debug!(stdout = %output.stdout.trim(), "deploy output");
            Ok(command.command)
        })
        .await
    }
}

/// Run git or process work on the blocking pool
async fn run_blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ReleaseError::Io(std::io::Error::other(e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::{Repository, Signature};
    use mkrelease_core::{Platform, ReleaseStep, ReleaseStrategy};
    use serde_json::json;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct Fixture {
        server: MockServer,
        dir: TempDir,
        work: TempDir,
        origin: TempDir,
    }

    impl Fixture {
        async fn new() -> Self {
            let server = MockServer::start().await;
            let dir = TempDir::new().unwrap();
            let work = TempDir::new().unwrap();
            let origin = TempDir::new().unwrap();

            Repository::init_bare(origin.path()).unwrap();
            let repo = Repository::init(work.path()).unwrap();
            let sig = Signature::now("Test", "test@example.com").unwrap();
            std::fs::write(work.path().join("README.md"), "releases").unwrap();
            let mut index = repo.index().unwrap();
            index.add_path(Path::new("README.md")).unwrap();
            index.write().unwrap();
            let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
            repo.commit(Some("HEAD"), &sig, &sig, "Initial commit", &tree, &[])
                .unwrap();
            repo.remote("origin", origin.path().to_str().unwrap())
                .unwrap();

            Self {
                server,
                dir,
                work,
                origin,
            }
        }

        fn config(&self) -> Config {
            let mut config = Config::default();
            config.github.api_url = self.server.uri();
            config.github.uploads_url = self.server.uri();
            config
        }

        fn release(&self) -> GitHubRelease {
            GitHubRelease::new("1.2.3", self.work.path(), self.config())
        }

        async fn mount_source_release(&self) {
            let assets: Vec<_> = Platform::ALL
                .iter()
                .enumerate()
                .map(|(i, p)| json!({"id": i + 1, "name": format!("guilde-cli-{}.zip", p)}))
                .collect();
            Mock::given(method("GET"))
                .and(path("/repos/pagerguild/pagerguild/releases/tags/v1.2.3"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "id": 1,
                    "tag_name": "v1.2.3",
                    "body": "Test release notes",
                    "assets": assets
                })))
                .mount(&self.server)
                .await;
            for (i, platform) in Platform::ALL.iter().enumerate() {
                Mock::given(method("GET"))
                    .and(path(format!(
                        "/repos/pagerguild/pagerguild/releases/assets/{}",
                        i + 1
                    )))
                    .respond_with(
                        ResponseTemplate::new(200)
                            .set_body_bytes(platform.to_string().into_bytes()),
                    )
                    .mount(&self.server)
                    .await;
            }
        }

        async fn mount_target_lookup(&self, status: u16) {
            Mock::given(method("GET"))
                .and(path(
                    "/repos/pagerguild/guilde-cli-releases/releases/tags/v1.2.3",
                ))
                .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                    "id": 9,
                    "tag_name": "v1.2.3",
                    "message": "Not Found"
                })))
                .mount(&self.server)
                .await;
        }
    }

    #[tokio::test]
    async fn test_full_release() {
        let fixture = Fixture::new().await;
        fixture.mount_source_release().await;
        fixture.mount_target_lookup(404).await;
        Mock::given(method("POST"))
            .and(path("/repos/pagerguild/guilde-cli-releases/releases"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": 42,
                "tag_name": "v1.2.3"
            })))
            .expect(1)
            .mount(&fixture.server)
            .await;
        Mock::given(method("POST"))
            .and(path("/repos/pagerguild/guilde-cli-releases/releases/42/assets"))
            .and(query_param("name", "guilde-cli-linux-amd64.zip"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": 100,
                "name": "guilde-cli-linux-amd64.zip"
            })))
            .expect(1)
            .mount(&fixture.server)
            .await;
        Mock::given(method("POST"))
            .and(path("/repos/pagerguild/guilde-cli-releases/releases/42/assets"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": 101,
                "name": "other.zip"
            })))
            .mount(&fixture.server)
            .await;

        let mut release = fixture.release();
        let summary = ReleaseStrategy::new("test-token", fixture.dir.path())
            .execute(&mut release)
            .await
            .unwrap();

        assert_eq!(summary.tag, "v1.2.3");
        assert_eq!(summary.release_id, 42);
        assert_eq!(summary.tag_outcome, TagOutcome::Created);
        assert_eq!(
            summary.assets[0].checksum.as_deref(),
            Some("1a349b12b50ad5b43740e0952adc33c7805ce06f091074be977624d09ed9d432")
        );
        assert_eq!(
            std::fs::read_to_string(fixture.dir.path().join("RELEASE_NOTES.md")).unwrap(),
            "Test release notes"
        );

        let formula =
            std::fs::read_to_string(fixture.work.path().join("Formula/guilde-cli.rb")).unwrap();
        assert!(formula
            .contains("abb35c616421af72198ad7c2aeeef38516f08f6a7afb2a728cf0068a8a712ddc"));

        let origin = Repository::open_bare(fixture.origin.path()).unwrap();
        let tagged = origin
            .find_reference("refs/tags/v1.2.3")
            .unwrap()
            .peel_to_commit()
            .unwrap();
        assert_eq!(tagged.id().to_string(), summary.commit);
        assert_eq!(tagged.message(), Some("Update formula for release v1.2.3"));
        assert_eq!(tagged.author().name(), Some("Guilde CLI Release Bot"));
    }

    #[tokio::test]
    async fn test_existing_release_leaves_repository_untouched() {
        let fixture = Fixture::new().await;
        fixture.mount_source_release().await;
        fixture.mount_target_lookup(200).await;

        let mut release = fixture.release();
        let err = ReleaseStrategy::new("test-token", fixture.dir.path())
            .execute(&mut release)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "release v1.2.3 already exists");
        assert!(!fixture.work.path().join("Formula").exists());
        let origin = Repository::open_bare(fixture.origin.path()).unwrap();
        assert!(origin.find_reference("refs/tags/v1.2.3").is_err());
    }

    #[tokio::test]
    async fn test_not_a_repository_fails_validation() {
        let fixture = Fixture::new().await;
        fixture.mount_source_release().await;
        let not_repo = TempDir::new().unwrap();

        let mut release = GitHubRelease::new("1.2.3", not_repo.path(), fixture.config());
        let err = ReleaseStrategy::new("test-token", fixture.dir.path())
            .execute(&mut release)
            .await
            .unwrap_err();

        assert_eq!(err.failed_step(), Some(ReleaseStep::Validate));
        assert!(matches!(
            err.root(),
            ReleaseError::Validation(ValidationError::Repository { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_upstream_asset_fails_download() {
        let fixture = Fixture::new().await;
        Mock::given(method("GET"))
            .and(path("/repos/pagerguild/pagerguild/releases/tags/v1.2.3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 1,
                "tag_name": "v1.2.3",
                "body": "notes",
                "assets": []
            })))
            .mount(&fixture.server)
            .await;

        let mut release = fixture.release();
        let err = ReleaseStrategy::new("test-token", fixture.dir.path())
            .execute(&mut release)
            .await
            .unwrap_err();

        assert_eq!(err.failed_step(), Some(ReleaseStep::Download));
        assert_eq!(
            err.to_string(),
            "failed to download release assets: asset guilde-cli-darwin-arm64.zip not found in release v1.2.3"
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_deploy_runs_in_repository() {
        let fixture = Fixture::new().await;
        let mut config = fixture.config();
        config.deploy.command = "touch deployed.marker".to_string();
        let release = GitHubRelease::new("1.2.3", fixture.work.path(), config);

        let command = release.deploy().await.unwrap();
        assert_eq!(command, "touch deployed.marker");
        assert!(fixture.work.path().join("deployed.marker").exists());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_blocking_work_leaves_runtime_thread() {
        let runtime_thread = std::thread::current().id();
        let worker_thread = run_blocking(|| Ok(std::thread::current().id()))
            .await
            .unwrap();
        assert_ne!(worker_thread, runtime_thread);
    }

    #[tokio::test]
    async fn test_blocking_panic_becomes_error() {
        let err = run_blocking::<(), _>(|| panic!("boom")).await.unwrap_err();
        assert!(matches!(err, ReleaseError::Io(_)));
    }
}
