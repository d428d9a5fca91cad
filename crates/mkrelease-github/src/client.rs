//! Authenticated GitHub API client

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{redirect, Client, Response, StatusCode, Url};
use tracing::debug;

use mkrelease_core::config::{
    GitHubConfig, RepositoryConfig, DEFAULT_API_URL, DEFAULT_UPLOADS_URL,
};
use mkrelease_core::error::GitHubError;

use crate::types::ApiErrorBody;

/// Result type for GitHub operations
pub type Result<T> = std::result::Result<T, GitHubError>;

/// REST API version requested on every call
pub const API_VERSION: &str = "2022-11-28";

/// User agent sent on every call
pub const USER_AGENT: &str = concat!("mkrelease/", env!("CARGO_PKG_VERSION"));

/// Client for the GitHub releases API.
///
/// Every request carries the bearer token. Asset downloads use a second
/// client that does not follow redirects, so the signed storage URL can be
/// fetched without credentials.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    pub(crate) api: Client,
    pub(crate) download: Client,
    pub(crate) anonymous: Client,
    api_url: Url,
    uploads_url: Url,
}

impl GitHubClient {
    /// Client for github.com
    pub fn new(token: &str) -> Result<Self> {
        Self::with_endpoints(token, DEFAULT_API_URL, DEFAULT_UPLOADS_URL)
    }

    /// Client using the endpoints from configuration
    pub fn from_config(token: &str, config: &GitHubConfig) -> Result<Self> {
        Self::with_endpoints(token, &config.api_url, &config.uploads_url)
    }

    /// Client for custom API and upload endpoints
    pub fn with_endpoints(token: &str, api_url: &str, uploads_url: &str) -> Result<Self> {
        if token.trim().is_empty() {
            return Err(GitHubError::InvalidToken("token is empty".to_string()));
        }
        let api_base = parse_endpoint(api_url)?;
        let uploads_base = parse_endpoint(uploads_url)?;

        let headers = default_headers(token)?;
        let api = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers.clone())
            .build()?;
        let download = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .redirect(redirect::Policy::none())
            .build()?;
        let anonymous = Client::builder().user_agent(USER_AGENT).build()?;

        debug!(api_url, uploads_url, "created GitHub client");
        Ok(Self {
            api,
            download,
            anonymous,
            api_url: api_base,
            uploads_url: uploads_base,
        })
    }

    /// Base URL of the REST API
    pub fn api_url(&self) -> &str {
        self.api_url.as_str().trim_end_matches('/')
    }

    /// Base URL for uploads
    pub fn uploads_url(&self) -> &str {
        self.uploads_url.as_str().trim_end_matches('/')
    }

    /// `<api>/repos/<owner>/<repo>/<segments...>`, each segment percent-encoded
    pub(crate) fn repo_url(&self, repo: &RepositoryConfig, segments: &[&str]) -> Url {
        join_segments(&self.api_url, repo, segments)
    }

    /// `<uploads>/repos/<owner>/<repo>/<segments...>`, each segment percent-encoded
    pub(crate) fn upload_url(&self, repo: &RepositoryConfig, segments: &[&str]) -> Url {
        join_segments(&self.uploads_url, repo, segments)
    }
}

fn parse_endpoint(url: &str) -> Result<Url> {
    let parsed = Url::parse(url).map_err(|e| GitHubError::InvalidEndpoint {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    if parsed.cannot_be_a_base() {
        return Err(GitHubError::InvalidEndpoint {
            url: url.to_string(),
            reason: "not a base URL".to_string(),
        });
    }
    Ok(parsed)
}

fn join_segments(base: &Url, repo: &RepositoryConfig, segments: &[&str]) -> Url {
    let mut url = base.clone();
    // Bases are checked in parse_endpoint, so the path is always extendable
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty()
            .extend(["repos", repo.owner.as_str(), repo.repo.as_str()])
            .extend(segments);
    }
    url
}

fn default_headers(token: &str) -> Result<HeaderMap> {
    let mut auth = HeaderValue::from_str(&format!("Bearer {}", token))
        .map_err(|e| GitHubError::InvalidToken(e.to_string()))?;
    auth.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, auth);
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/vnd.github+json"),
    );
    headers.insert("X-GitHub-Api-Version", HeaderValue::from_static(API_VERSION));
    Ok(headers)
}

/// Pass 2xx responses through; turn anything else into an API error
pub(crate) async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(api_error(status, &body))
}

/// API error for a failed response body, using its `message` when it parses
pub(crate) fn api_error(status: StatusCode, body: &str) -> GitHubError {
    let message = ApiErrorBody::parse(body)
        .map(|b| b.describe())
        .unwrap_or_else(|| body.to_string());
    GitHubError::Api {
        status: status.as_u16(),
        message,
    }
}
