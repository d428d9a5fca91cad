//! Pipeline steps

use std::fmt;

use serde::Serialize;

/// A step of the release pipeline, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReleaseStep {
    /// Build the authenticated GitHub client
    CreateClient,
    /// Fetch archives and notes from the source repository
    Download,
    /// Check local files and the working copy
    Validate,
    /// Hash every archive
    Checksums,
    /// Look for an existing release with the same tag
    CheckExisting,
    /// Fill in the formula template
    RenderFormula,
    /// Write the formula into the working copy
    SaveFormula,
    /// Commit and push the formula
    CommitFormula,
    /// Create and push the release tag
    Tag,
    /// Publish the GitHub release
    CreateRelease,
    /// Open an archive for upload
    OpenAsset,
    /// Upload an archive to the release
    UploadAsset,
    /// Run the deploy command
    Deploy,
}

impl ReleaseStep {
    /// All steps in execution order
    pub const ALL: [ReleaseStep; 13] = [
        Self::CreateClient,
        Self::Download,
        Self::Validate,
        Self::Checksums,
        Self::CheckExisting,
        Self::RenderFormula,
        Self::SaveFormula,
        Self::CommitFormula,
        Self::Tag,
        Self::CreateRelease,
        Self::OpenAsset,
        Self::UploadAsset,
        Self::Deploy,
    ];

    /// Short progress label
    pub fn label(&self) -> &'static str {
        match self {
            Self::CreateClient => "Connecting to GitHub",
            Self::Download => "Downloading release assets",
            Self::Validate => "Validating release files",
            Self::Checksums => "Computing checksums",
            Self::CheckExisting => "Checking for an existing release",
            Self::RenderFormula => "Rendering formula",
            Self::SaveFormula => "Saving formula",
            Self::CommitFormula => "Committing formula",
            Self::Tag => "Tagging release",
            Self::CreateRelease => "Creating GitHub release",
            Self::OpenAsset => "Opening asset",
            Self::UploadAsset => "Uploading asset",
            Self::Deploy => "Deploying",
        }
    }

    /// Description used as the prefix of a failure
    pub fn failure(&self) -> &'static str {
        match self {
            Self::CreateClient => "failed to create GitHub client",
            Self::Download => "failed to download release assets",
            Self::Validate => "release validation failed",
            Self::Checksums => "checksum computation failed",
            Self::CheckExisting => "failed to check if release exists",
            Self::RenderFormula => "failed to render formula",
            Self::SaveFormula => "failed to save formula file",
            Self::CommitFormula => "failed to commit formula change",
            Self::Tag => "failed to create and push tag",
            Self::CreateRelease => "failed to create GitHub release",
            Self::OpenAsset => "failed to open asset file",
            Self::UploadAsset => "failed to upload asset",
            Self::Deploy => "deployment failed",
        }
    }
}

impl fmt::Display for ReleaseStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.failure())
    }
}
