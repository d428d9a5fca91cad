//! Release lookup and creation

use reqwest::StatusCode;
use tracing::{debug, info, instrument};

use mkrelease_core::config::RepositoryConfig;
use mkrelease_core::error::GitHubError;
use mkrelease_core::types::ReleaseLookup;

use crate::client::{api_error, check, GitHubClient, Result};
use crate::types::{ApiErrorBody, CreateReleaseRequest, GitHubRelease};

/// Validation code GitHub reports for a duplicate tag
const ALREADY_EXISTS_CODE: &str = "already_exists";

impl GitHubClient {
    /// Fetch the release for `tag`, or `None` on a 404
    #[instrument(skip(self, repo), fields(repo = %repo.slug()))]
    pub async fn get_release_by_tag(
        &self,
        repo: &RepositoryConfig,
        tag: &str,
    ) -> Result<Option<GitHubRelease>> {
        let url = self.repo_url(repo, &["releases", "tags", tag]);
        debug!(%url, "fetching release");

        let response = self.api.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!(tag, "release not found");
            return Ok(None);
        }

        let release: GitHubRelease = check(response).await?.json().await?;
        debug!(tag, id = release.id, assets = release.assets.len(), "found release");
        Ok(Some(release))
    }

    /// Whether a release for `tag` exists
    pub async fn release_exists(
        &self,
        repo: &RepositoryConfig,
        tag: &str,
    ) -> Result<ReleaseLookup> {
        Ok(match self.get_release_by_tag(repo, tag).await? {
            Some(_) => ReleaseLookup::Exists,
            None => ReleaseLookup::Missing,
        })
    }

    /// Publish a non-draft, non-prerelease release named after its tag
    #[instrument(skip(self, repo, notes), fields(repo = %repo.slug()))]
    pub async fn create_release(
        &self,
        repo: &RepositoryConfig,
        tag: &str,
        notes: &str,
    ) -> Result<GitHubRelease> {
        let url = self.repo_url(repo, &["releases"]);
        let request = CreateReleaseRequest {
            tag_name: tag,
            name: tag,
            body: notes,
            draft: false,
            prerelease: false,
        };

        let response = self.api.post(url).json(&request).send().await?;
        let status = response.status();
        if status == StatusCode::UNPROCESSABLE_ENTITY {
            let body = response.text().await?;
            let duplicate = ApiErrorBody::parse(&body)
                .is_some_and(|b| b.has_code(ALREADY_EXISTS_CODE));
            if duplicate {
                return Err(GitHubError::AlreadyExists(tag.to_string()));
            }
            return Err(api_error(status, &body));
        }

        let release: GitHubRelease = check(response).await?.json().await?;
        info!(tag, id = release.id, "created release");
        Ok(release)
    }
}
