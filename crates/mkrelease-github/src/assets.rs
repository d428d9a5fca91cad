//! Asset upload and download

use std::path::Path;

use reqwest::header::{ACCEPT, CONTENT_LENGTH, CONTENT_TYPE, LOCATION};
use reqwest::{Body, Response};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument};

use mkrelease_core::config::RepositoryConfig;
use mkrelease_core::error::GitHubError;
use mkrelease_core::types::RELEASE_NOTES_FILE;

use crate::client::{check, GitHubClient, Result};
use crate::types::{DownloadedRelease, GitHubAsset};

impl GitHubClient {
    /// Upload `file` to a release as `file_name`, returning the bytes sent
    #[instrument(skip(self, repo, file), fields(repo = %repo.slug()))]
    pub async fn upload_asset(
        &self,
        repo: &RepositoryConfig,
        release_id: u64,
        file_name: &str,
        media_type: &str,
        file: File,
    ) -> Result<u64> {
        let size = file.metadata().await?.len();
        let release_segment = release_id.to_string();
        let url = self.upload_url(repo, &["releases", release_segment.as_str(), "assets"]);

        let response = self
            .api
            .post(url)
            .query(&[("name", file_name)])
            .header(CONTENT_TYPE, media_type)
            .header(CONTENT_LENGTH, size)
            .body(Body::from(file))
            .send()
            .await?;

        let asset: GitHubAsset = check(response).await?.json().await?;
        info!(file_name, id = asset.id, size, "uploaded asset");
        Ok(size)
    }

    /// Download an asset to `dest`, returning the bytes written.
    ///
    /// The API answers either with the file itself or with a redirect to
    /// storage; the redirect target is fetched without credentials.
    #[instrument(skip(self, repo), fields(repo = %repo.slug(), dest = %dest.display()))]
    pub async fn download_asset(
        &self,
        repo: &RepositoryConfig,
        asset_id: u64,
        dest: &Path,
    ) -> Result<u64> {
        let asset_segment = asset_id.to_string();
        let url = self.repo_url(repo, &["releases", "assets", asset_segment.as_str()]);
        let response = self
            .download
            .get(url)
            .header(ACCEPT, "application/octet-stream")
            .send()
            .await?;

        let response = if response.status().is_redirection() {
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .ok_or(GitHubError::MissingRedirect(asset_id))?;
            let target = response
                .url()
                .join(location)
                .map_err(|_| GitHubError::MissingRedirect(asset_id))?;
            debug!(asset_id, "following asset redirect");
            check(self.anonymous.get(target).send().await?).await?
        } else {
            check(response).await?
        };

        let written = stream_to_file(response, dest).await?;
        debug!(asset_id, bytes = written, "downloaded asset");
        Ok(written)
    }

    /// Fetch notes and the named archives of the release for `tag` into `dir`.
    ///
    /// Every name must match an attached asset exactly; a missing one fails
    /// the call before any archive is downloaded.
    #[instrument(skip(self, repo, file_names), fields(repo = %repo.slug(), dir = %dir.display()))]
    pub async fn download_release(
        &self,
        repo: &RepositoryConfig,
        tag: &str,
        file_names: &[String],
        dir: &Path,
    ) -> Result<DownloadedRelease> {
        let release = self
            .get_release_by_tag(repo, tag)
            .await?
            .ok_or_else(|| GitHubError::Api {
                status: 404,
                message: format!("release {} not found in {}", tag, repo.slug()),
            })?;

        tokio::fs::create_dir_all(dir).await?;
        let notes = release.body.clone().unwrap_or_default();
        let notes_path = dir.join(RELEASE_NOTES_FILE);
        tokio::fs::write(&notes_path, &notes).await?;
        info!(path = %notes_path.display(), "saved release notes");

        let mut wanted = Vec::with_capacity(file_names.len());
        for name in file_names {
            let asset = release
                .asset_named(name)
                .ok_or_else(|| GitHubError::AssetNotFound {
                    name: name.clone(),
                    tag: tag.to_string(),
                })?;
            wanted.push((asset.id, name));
        }

        let mut assets = Vec::with_capacity(wanted.len());
        for (id, name) in wanted {
            let dest = dir.join(name);
            info!(asset = %name, id, "downloading asset");
            self.download_asset(repo, id, &dest).await?;
            assets.push(dest);
        }

        Ok(DownloadedRelease {
            release,
            notes_path,
            notes,
            assets,
        })
    }
}

async fn stream_to_file(mut response: Response, dest: &Path) -> Result<u64> {
    let mut file = File::create(dest).await?;
    let mut written = 0u64;
    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;
    use wiremock::matchers::{body_string, header, method, path, query_param};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    fn repo() -> RepositoryConfig {
        RepositoryConfig::new("acme", "tool")
    }

    async fn client(server: &MockServer) -> GitHubClient {
        GitHubClient::with_endpoints("test-token", &server.uri(), &server.uri()).unwrap()
    }

    fn names() -> Vec<String> {
        vec!["tool-darwin-arm64.zip".to_string(), "tool-linux-amd64.zip".to_string()]
    }

    #[tokio::test]
    async fn test_upload_asset() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/repos/acme/tool/releases/7/assets"))
            .and(query_param("name", "tool-linux-amd64.zip"))
            .and(header("content-type", "application/zip"))
            .and(header("content-length", "14"))
            .and(header("authorization", "Bearer test-token"))
            .and(body_string("test content 1"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": 99,
                "name": "tool-linux-amd64.zip",
                "size": 14
            })))
            .expect(1)
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tool-linux-amd64.zip");
        std::fs::write(&path, "test content 1").unwrap();
        let file = File::open(&path).await.unwrap();

        let sent = client(&server)
            .await
            .upload_asset(&repo(), 7, "tool-linux-amd64.zip", "application/zip", file)
            .await
            .unwrap();
        assert_eq!(sent, 14);
    }

    #[tokio::test]
    async fn test_upload_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a.zip");
        std::fs::write(&path, "x").unwrap();
        let file = File::open(&path).await.unwrap();

        let err = client(&server)
            .await
            .upload_asset(&repo(), 7, "a.zip", "application/zip", file)
            .await
            .unwrap_err();
        assert!(matches!(err, GitHubError::Api { status: 500, ref message } if message == "boom"));
    }

    #[tokio::test]
    async fn test_download_direct() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/tool/releases/assets/5"))
            .and(header("accept", "application/octet-stream"))
            .and(header("authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"test content 2".to_vec()))
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("asset.zip");
        let written = client(&server)
            .await
            .download_asset(&repo(), 5, &dest)
            .await
            .unwrap();

        assert_eq!(written, 14);
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "test content 2");
    }

    #[tokio::test]
    async fn test_download_follows_redirect_without_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/tool/releases/assets/5"))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("Location", format!("{}/storage/blob-5", server.uri())),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/storage/blob-5"))
            .and(|req: &Request| !req.headers.contains_key("authorization"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"redirected".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("asset.zip");
        client(&server)
            .await
            .download_asset(&repo(), 5, &dest)
            .await
            .unwrap();

        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "redirected");
    }

    #[tokio::test]
    async fn test_redirect_without_location() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(302))
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let err = client(&server)
            .await
            .download_asset(&repo(), 5, &temp.path().join("a.zip"))
            .await
            .unwrap_err();
        assert!(matches!(err, GitHubError::MissingRedirect(5)));
    }

    #[tokio::test]
    async fn test_download_release() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/tool/releases/tags/v1.2.3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 3,
                "tag_name": "v1.2.3",
                "body": "Test release notes",
                "assets": [
                    {"id": 10, "name": "tool-darwin-arm64.zip"},
                    {"id": 11, "name": "tool-linux-amd64.zip"},
                    {"id": 12, "name": "tool-linux-amd64.zip.sig"}
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/tool/releases/assets/10"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"darwin-arm64".to_vec()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/tool/releases/assets/11"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"linux-amd64".to_vec()))
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let downloaded = client(&server)
            .await
            .download_release(&repo(), "v1.2.3", &names(), temp.path())
            .await
            .unwrap();

        assert_eq!(downloaded.notes, "Test release notes");
        assert_eq!(
            std::fs::read_to_string(temp.path().join("RELEASE_NOTES.md")).unwrap(),
            "Test release notes"
        );
        assert_eq!(
            downloaded.assets,
            vec![
                temp.path().join("tool-darwin-arm64.zip"),
                temp.path().join("tool-linux-amd64.zip"),
            ]
        );
        assert_eq!(
            std::fs::read_to_string(temp.path().join("tool-linux-amd64.zip")).unwrap(),
            "linux-amd64"
        );
    }

    #[tokio::test]
    async fn test_download_release_missing_asset() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/tool/releases/tags/v1.2.3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 3,
                "tag_name": "v1.2.3",
                "body": "notes",
                "assets": [{"id": 10, "name": "tool-darwin-arm64.zip"}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/tool/releases/assets/10"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"x".to_vec()))
            .expect(0)
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let err = client(&server)
            .await
            .download_release(&repo(), "v1.2.3", &names(), temp.path())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            GitHubError::AssetNotFound { ref name, ref tag }
                if name == "tool-linux-amd64.zip" && tag == "v1.2.3"
        ));
        assert!(!temp.path().join("tool-darwin-arm64.zip").exists());
    }

    #[tokio::test]
    async fn test_download_release_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let err = client(&server)
            .await
            .download_release(&repo(), "v9.9.9", &names(), temp.path())
            .await
            .unwrap_err();
        assert!(matches!(err, GitHubError::Api { status: 404, .. }));
    }
}
