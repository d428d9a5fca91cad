//! GitHub API payloads

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A release as returned by the API
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GitHubRelease {
    /// Numeric release id
    pub id: u64,
    /// Tag the release is attached to
    pub tag_name: String,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// Release notes
    #[serde(default)]
    pub body: Option<String>,
    /// Whether the release is a draft
    #[serde(default)]
    pub draft: bool,
    /// Whether the release is a prerelease
    #[serde(default)]
    pub prerelease: bool,
    /// Web page of the release
    #[serde(default)]
    pub html_url: Option<String>,
    /// Attached assets
    #[serde(default)]
    pub assets: Vec<GitHubAsset>,
}

impl GitHubRelease {
    /// Asset with exactly this file name
    pub fn asset_named(&self, name: &str) -> Option<&GitHubAsset> {
        self.assets.iter().find(|a| a.name == name)
    }
}

/// A file attached to a release
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GitHubAsset {
    /// Numeric asset id
    pub id: u64,
    /// File name
    pub name: String,
    /// Size in bytes
    #[serde(default)]
    pub size: u64,
    /// Media type
    #[serde(default)]
    pub content_type: Option<String>,
    /// Public download URL
    #[serde(default)]
    pub browser_download_url: Option<String>,
}

/// Body of a create-release request
#[derive(Debug, Clone, Serialize)]
pub(crate) struct CreateReleaseRequest<'a> {
    pub tag_name: &'a str,
    pub name: &'a str,
    pub body: &'a str,
    pub draft: bool,
    pub prerelease: bool,
}

/// Error body returned by the API
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub message: String,
    #[serde(default)]
    pub errors: Vec<ApiErrorDetail>,
}

/// One entry of a validation failure's `errors` list
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorDetail {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub field: Option<String>,
}

impl ApiErrorBody {
    /// Parse an error body; `None` if it is not GitHub's JSON shape
    pub fn parse(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }

    /// Whether any validation error carries `code`
    pub fn has_code(&self, code: &str) -> bool {
        self.errors.iter().any(|e| e.code.as_deref() == Some(code))
    }

    /// Message followed by the `field: code` pairs, if any
    pub fn describe(&self) -> String {
        let details: Vec<String> = self
            .errors
            .iter()
            .filter_map(|e| match (&e.field, &e.code) {
                (Some(field), Some(code)) => Some(format!("{}: {}", field, code)),
                (None, Some(code)) => Some(code.clone()),
                _ => None,
            })
            .collect();
        if details.is_empty() {
            self.message.clone()
        } else {
            format!("{} ({})", self.message, details.join(", "))
        }
    }
}

/// Files fetched from a source release
#[derive(Debug, Clone)]
pub struct DownloadedRelease {
    /// The source release
    pub release: GitHubRelease,
    /// Where the release notes were written
    pub notes_path: PathBuf,
    /// Release notes text
    pub notes: String,
    /// Downloaded archives, in the requested order
    pub assets: Vec<PathBuf>,
}
