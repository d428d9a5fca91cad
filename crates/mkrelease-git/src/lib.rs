//! mkrelease Git - Git operations for the release pipeline
//!
//! This crate wraps `git2` for the steps that touch the formula repository:
//! opening the working copy, committing the formula, tagging, and pushing
//! with token authentication.

mod commits;
mod remote;
mod repository;
mod status;
mod tags;
pub mod types;

pub use remote::TokenCredentials;
pub use repository::{GitRepo, Result};
pub use types::{Identity, TagInfo, TagOutcome};
