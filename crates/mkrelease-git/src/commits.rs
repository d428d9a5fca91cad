//! Committing files

use std::path::Path;

use tracing::{info, instrument};

use crate::repository::{GitRepo, Result};
use crate::types::Identity;

impl GitRepo {
    /// Stage exactly `relative_path` and commit it on HEAD.
    ///
    /// Other changes in the working copy are left unstaged. Returns the new
    /// commit hash.
    #[instrument(skip(self, identity), fields(path = %relative_path.display()))]
    pub fn commit_path(
        &self,
        relative_path: &Path,
        message: &str,
        identity: &Identity,
    ) -> Result<String> {
        self.workdir()?;

        let mut index = self.repo.index()?;
        index.add_path(relative_path)?;
        index.write()?;

        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;
        let sig = identity.signature()?;

        let parent = match self.repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => None,
            Err(e) => return Err(e.into()),
        };
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

        let oid = self
            .repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)?;

        info!(commit = %oid, "committed");
        Ok(oid.to_string())
    }
}
