//! Tag operations

use chrono::{TimeZone, Utc};
use git2::Oid;
use tracing::{info, instrument};

use crate::repository::{GitRepo, Result};
use crate::types::{Identity, TagInfo, TagOutcome};
use mkrelease_core::error::GitError;

impl GitRepo {
    /// Find a specific tag by name
    pub fn find_tag(&self, name: &str) -> Result<Option<TagInfo>> {
        let tag_ref = format!("refs/tags/{}", name);

        let reference = match self.repo.find_reference(&tag_ref) {
            Ok(reference) => reference,
            Err(e) if e.code() == git2::ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(GitError::Git2(e)),
        };

        let target = reference.peel_to_commit()?;
        let mut info = TagInfo::new(name, target.id().to_string());

        if let Ok(tag) = reference.peel_to_tag() {
            if let Some(msg) = tag.message() {
                info = info.with_message(msg);
            }
            if let Some(tagger) = tag.tagger() {
                if let Some(tagger_name) = tagger.name() {
                    info = info.with_tagger(tagger_name);
                }
                let timestamp = Utc
                    .timestamp_opt(tagger.when().seconds(), 0)
                    .single()
                    .unwrap_or_else(Utc::now);
                info = info.with_timestamp(timestamp);
            }
        }

        Ok(Some(info))
    }

    /// Create an annotated tag on `target` unless one with `name` exists.
    ///
    /// An existing tag is reused as-is, even if it points elsewhere.
    #[instrument(skip(self, message, tagger), fields(%target))]
    pub fn ensure_annotated_tag(
        &self,
        name: &str,
        target: Oid,
        message: &str,
        tagger: &Identity,
    ) -> Result<TagOutcome> {
        if let Some(existing) = self.find_tag(name)? {
            info!(
                name,
                existing_target = %existing.target,
                "tag already exists, reusing"
            );
            return Ok(TagOutcome::AlreadyExists);
        }

        let object = self
            .repo
            .find_object(target, None)
            .map_err(|_| GitError::CommitNotFound(target.to_string()))?;
        let sig = tagger.signature()?;

        self.repo
            .tag(name, &object, &sig, message, false)
            .map_err(|e| GitError::TagCreationFailed {
                name: name.to_string(),
                reason: e.message().to_string(),
            })?;

        info!(name, target = %target, "created annotated tag");
        Ok(TagOutcome::Created)
    }
}
