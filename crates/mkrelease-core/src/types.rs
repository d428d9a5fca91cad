//! Core types for the release pipeline

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::checksum::sha256_file;
use crate::error::{ReleaseError, Result};

/// File extension of every release archive
pub const ASSET_FILE_TYPE: &str = "zip";

/// Media type used when uploading archives
pub const ASSET_MEDIA_TYPE: &str = "application/zip";

/// Name of the release notes file inside the working directory
pub const RELEASE_NOTES_FILE: &str = "RELEASE_NOTES.md";

/// Tag name for a version. No prefix de-duplication.
pub fn tag_name(version: &str) -> String {
    format!("v{}", version)
}

/// Build platforms a release ships archives for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Platform {
    /// macOS on Apple Silicon
    DarwinArm64,
    /// macOS on Intel
    DarwinAmd64,
    /// Linux on ARM64
    LinuxArm64,
    /// Linux on x86_64
    LinuxAmd64,
}

impl Platform {
    /// All platforms, in upload order
    pub const ALL: [Platform; 4] = [
        Platform::DarwinArm64,
        Platform::DarwinAmd64,
        Platform::LinuxArm64,
        Platform::LinuxAmd64,
    ];

    /// Operating system component
    pub fn os(&self) -> &'static str {
        match self {
            Self::DarwinArm64 | Self::DarwinAmd64 => "darwin",
            Self::LinuxArm64 | Self::LinuxAmd64 => "linux",
        }
    }

    /// Architecture component
    pub fn arch(&self) -> &'static str {
        match self {
            Self::DarwinArm64 | Self::LinuxArm64 => "arm64",
            Self::DarwinAmd64 | Self::LinuxAmd64 => "amd64",
        }
    }

    /// Identifier used for template variables (e.g. `darwin_arm64`)
    pub fn key(&self) -> String {
        format!("{}_{}", self.os(), self.arch())
    }

    /// Asset identifier for a binary, e.g. `guilde-cli-linux-amd64`
    pub fn asset_name(&self, binary: &str, naming: AssetNaming, version: &str) -> String {
        match naming {
            AssetNaming::Plain => format!("{}-{}-{}", binary, self.os(), self.arch()),
            AssetNaming::Versioned => {
                format!("{}-{}-{}-{}", binary, self.os(), self.arch(), version)
            }
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os(), self.arch())
    }
}

/// How asset identifiers are formed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetNaming {
    /// `<binary>-<os>-<arch>`
    #[default]
    Plain,
    /// `<binary>-<os>-<arch>-<version>`
    Versioned,
}

/// One platform archive attached to a release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseAsset {
    /// Base name without extension
    pub name: String,
    /// Platform this archive targets
    pub platform: Platform,
    /// Local path of the archive
    pub path: PathBuf,
    /// Lowercase hex SHA-256, once computed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

impl ReleaseAsset {
    /// Create an asset without a checksum
    pub fn new(name: impl Into<String>, platform: Platform, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            platform,
            path: path.into(),
            checksum: None,
        }
    }

    /// Set the checksum
    pub fn with_checksum(mut self, checksum: impl Into<String>) -> Self {
        self.checksum = Some(checksum.into());
        self
    }

    /// File name on the wire (`<name>.zip`)
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.name, ASSET_FILE_TYPE)
    }
}

/// Everything known about the release being published.
///
/// Filled in as the pipeline runs: assets, then checksums, then notes.
#[derive(Debug, Clone, Default)]
pub struct ReleaseBundle {
    /// Version without the `v` prefix
    pub version: String,
    /// Archives in upload order
    pub assets: Vec<ReleaseAsset>,
    /// Path of the release notes file
    pub notes_path: PathBuf,
    /// Release notes text
    pub notes: String,
    /// Working copy of the formula repository
    pub repo_path: PathBuf,
}

impl ReleaseBundle {
    /// Create a bundle with no assets yet
    pub fn new(version: impl Into<String>, repo_path: impl Into<PathBuf>) -> Self {
        Self {
            version: version.into(),
            repo_path: repo_path.into(),
            ..Default::default()
        }
    }

    /// Tag for this release
    pub fn tag(&self) -> String {
        tag_name(&self.version)
    }

    /// Expected asset list for `dir`. Pure; touches no files.
    pub fn create_assets(&mut self, dir: &Path, binary: &str, naming: AssetNaming) {
        self.assets = Platform::ALL
            .iter()
            .map(|platform| {
                let name = platform.asset_name(binary, naming, &self.version);
                let path = dir.join(format!("{}.{}", name, ASSET_FILE_TYPE));
                ReleaseAsset::new(name, *platform, path)
            })
            .collect();
        self.notes_path = dir.join(RELEASE_NOTES_FILE);
        debug!(dir = %dir.display(), count = self.assets.len(), "created asset list");
    }

    /// Hash every asset; stops at the first failure
    pub fn compute_checksums(&mut self) -> Result<()> {
        for asset in &mut self.assets {
            let checksum =
                sha256_file(&asset.path).map_err(|e| ReleaseError::file(&asset.path, e))?;
            debug!(asset = %asset.name, checksum = %checksum, "computed checksum");
            asset.checksum = Some(checksum);
        }
        Ok(())
    }

    /// Read release notes from `notes_path`
    pub fn load_notes(&mut self) -> Result<()> {
        self.notes = std::fs::read_to_string(&self.notes_path)
            .map_err(|e| ReleaseError::file(&self.notes_path, e))?;
        Ok(())
    }

    /// Asset for a platform
    pub fn asset_for(&self, platform: Platform) -> Option<&ReleaseAsset> {
        self.assets.iter().find(|a| a.platform == platform)
    }

    /// Checksum for a platform, if computed
    pub fn checksum_for(&self, platform: Platform) -> Option<&str> {
        self.asset_for(platform).and_then(|a| a.checksum.as_deref())
    }
}

/// Whether a release already exists on the remote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseLookup {
    /// A release with the tag exists
    Exists,
    /// No release with the tag
    Missing,
}

impl ReleaseLookup {
    /// True if the release exists
    pub fn exists(&self) -> bool {
        matches!(self, Self::Exists)
    }
}

/// Result of asking for a tag to exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TagOutcome {
    /// A new annotated tag was written
    Created,
    /// The tag was already present and is reused
    AlreadyExists,
}

/// Outcome of a completed release
#[derive(Debug, Clone, Serialize)]
pub struct ReleaseSummary {
    /// Released version
    pub version: String,
    /// Tag pushed
    pub tag: String,
    /// Whether the tag was new
    pub tag_outcome: TagOutcome,
    /// Commit carrying the formula update
    pub commit: String,
    /// GitHub release id
    pub release_id: u64,
    /// Uploaded assets with checksums
    pub assets: Vec<ReleaseAsset>,
    /// Whether the deploy step ran
    pub deployed: bool,
}
