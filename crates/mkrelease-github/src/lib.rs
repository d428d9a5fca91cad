//! mkrelease GitHub - GitHub releases API client
//!
//! Looks up, creates and uploads to releases in the target repository and
//! downloads build archives and notes from the source repository.

mod assets;
mod client;
mod releases;
pub mod types;

pub use client::{GitHubClient, Result, API_VERSION, USER_AGENT};
pub use types::{DownloadedRelease, GitHubAsset, GitHubRelease};
