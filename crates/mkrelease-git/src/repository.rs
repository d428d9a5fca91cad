//! Git repository operations

use std::path::{Path, PathBuf};

use git2::{Oid, Repository};
use tracing::{debug, info, instrument};

use mkrelease_core::error::GitError;

/// Result type for git operations
pub type Result<T> = std::result::Result<T, GitError>;

/// Git repository wrapper
pub struct GitRepo {
    pub(crate) repo: Repository,
    path: PathBuf,
}

impl GitRepo {
    /// Open a repository at the given path
    #[instrument(fields(path = %path.display()))]
    pub fn open(path: &Path) -> Result<Self> {
        info!(path = %path.display(), "opening git repository");
        let repo = Repository::open(path).map_err(|e| {
            if e.code() == git2::ErrorCode::NotFound {
                GitError::NotARepository(path.to_path_buf())
            } else {
                GitError::OpenFailed(e.to_string())
            }
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            repo,
        })
    }

    /// Get the repository path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Working directory; bare repositories have none
    pub fn workdir(&self) -> Result<&Path> {
        self.repo.workdir().ok_or(GitError::BareRepository)
    }

    /// Get a reference to the inner git2 Repository
    pub fn inner(&self) -> &Repository {
        &self.repo
    }

    /// Get the HEAD commit
    pub fn head_commit(&self) -> Result<git2::Commit<'_>> {
        let head = self.repo.head()?;
        head.peel_to_commit().map_err(GitError::Git2)
    }

    /// Resolve an explicit commit hash, or the HEAD commit when none is given
    pub fn resolve_commit(&self, hash: Option<&str>) -> Result<Oid> {
        let oid = match hash {
            Some(hash) => {
                let oid =
                    Oid::from_str(hash).map_err(|_| GitError::CommitNotFound(hash.to_string()))?;
                self.repo
                    .find_commit(oid)
                    .map_err(|_| GitError::CommitNotFound(hash.to_string()))?
                    .id()
            }
            None => self.head_commit()?.id(),
        };
        debug!(commit = %oid, "resolved commit");
        Ok(oid)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::setup_repo;
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_repo() {
        let (temp, repo) = setup_repo();
        assert_eq!(repo.path(), temp.path());
        assert!(repo.workdir().is_ok());
    }

    #[test]
    fn test_not_a_repo() {
        let temp = TempDir::new().unwrap();
        let result = GitRepo::open(temp.path());
        assert!(matches!(result, Err(GitError::NotARepository(_))));
    }

    #[test]
    fn test_bare_has_no_workdir() {
        let temp = TempDir::new().unwrap();
        Repository::init_bare(temp.path()).unwrap();
        let repo = GitRepo::open(temp.path()).unwrap();
        assert!(matches!(repo.workdir(), Err(GitError::BareRepository)));
    }

    #[test]
    fn test_resolve_commit() {
        let (_temp, repo) = setup_repo();
        let head = repo.head_commit().unwrap().id();

        assert_eq!(repo.resolve_commit(None).unwrap(), head);
        assert_eq!(
            repo.resolve_commit(Some(&head.to_string())).unwrap(),
            head
        );
    }

    #[test]
    fn test_resolve_unknown_commit() {
        let (_temp, repo) = setup_repo();
        let result = repo.resolve_commit(Some("0123456789abcdef0123456789abcdef01234567"));
        assert!(matches!(result, Err(GitError::CommitNotFound(_))));

        let result = repo.resolve_commit(Some("not-a-hash"));
        assert!(matches!(result, Err(GitError::CommitNotFound(_))));
    }
}
