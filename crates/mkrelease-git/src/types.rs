//! Git-related types

use chrono::{DateTime, Utc};

use mkrelease_core::config::{GitConfig, DEFAULT_AUTHOR_EMAIL, DEFAULT_AUTHOR_NAME};

pub use mkrelease_core::types::TagOutcome;

/// Information about a git tag
#[derive(Debug, Clone)]
pub struct TagInfo {
    /// Tag name
    pub name: String,
    /// Commit the tag points to
    pub target: String,
    /// Tag message (annotated tags only)
    pub message: Option<String>,
    /// Tagger name (annotated tags only)
    pub tagger: Option<String>,
    /// Tag timestamp (annotated tags only)
    pub timestamp: Option<DateTime<Utc>>,
}

impl TagInfo {
    /// Create a new tag info
    pub fn new(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            message: None,
            tagger: None,
            timestamp: None,
        }
    }

    /// Set message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Set tagger
    pub fn with_tagger(mut self, tagger: impl Into<String>) -> Self {
        self.tagger = Some(tagger.into());
        self
    }

    /// Set timestamp
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Whether this is an annotated tag
    pub fn is_annotated(&self) -> bool {
        self.message.is_some()
    }
}

/// Author and committer identity for commits and tags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
}

impl Identity {
    /// Create an identity
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// Signature stamped with the current time
    pub fn signature(&self) -> std::result::Result<git2::Signature<'static>, git2::Error> {
        git2::Signature::now(&self.name, &self.email)
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self::new(DEFAULT_AUTHOR_NAME, DEFAULT_AUTHOR_EMAIL)
    }
}

impl From<&GitConfig> for Identity {
    fn from(config: &GitConfig) -> Self {
        Self::new(&config.author_name, &config.author_email)
    }
}
