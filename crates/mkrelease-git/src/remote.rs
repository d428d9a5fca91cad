//! Remote operations

use std::fmt;

use git2::{Cred, PushOptions, RemoteCallbacks};
use tracing::{debug, info, instrument, warn};

use crate::repository::{GitRepo, Result};
use mkrelease_core::error::GitError;

/// Username sent with token authentication. Hosts ignore it.
const TOKEN_USERNAME: &str = "git";

/// Basic-auth credentials carrying an access token as the password
#[derive(Clone)]
pub struct TokenCredentials {
    /// Placeholder username
    pub username: String,
    /// Access token
    pub token: String,
}

impl TokenCredentials {
    /// Credentials for `token` with the placeholder username
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            username: TOKEN_USERNAME.to_string(),
            token: token.into(),
        }
    }
}

impl fmt::Debug for TokenCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCredentials")
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl GitRepo {
    /// Push refspecs to a remote with token authentication.
    ///
    /// Refs the remote already has are not an error. Refs the remote
    /// rejects are reported as [`GitError::PushFailed`].
    #[instrument(skip(self, credentials), fields(%remote_name))]
    pub fn push(
        &self,
        remote_name: &str,
        refspecs: &[String],
        credentials: &TokenCredentials,
    ) -> Result<()> {
        let start = std::time::Instant::now();
        let mut remote = self
            .repo
            .find_remote(remote_name)
            .map_err(|_| GitError::RemoteNotFound(remote_name.to_string()))?;

        let mut rejected = Vec::new();
        {
            let mut callbacks = RemoteCallbacks::new();
            callbacks.credentials(|_url, _username_from_url, _allowed| {
                Cred::userpass_plaintext(&credentials.username, &credentials.token)
            });
            callbacks.push_update_reference(|refname, status| {
                match status {
                    Some(message) => {
                        warn!(refname, message, "remote rejected ref");
                        rejected.push(format!("{} ({})", refname, message));
                    }
                    None => debug!(refname, "remote updated ref"),
                }
                Ok(())
            });

            let mut options = PushOptions::new();
            options.remote_callbacks(callbacks);

            remote
                .push(refspecs, Some(&mut options))
                .map_err(|e| GitError::PushFailed(format!("{}: {}", remote_name, e.message())))?;
        }

        if !rejected.is_empty() {
            return Err(GitError::PushFailed(format!(
                "{} rejected {}",
                remote_name,
                rejected.join(", ")
            )));
        }

        info!(
            remote = remote_name,
            duration_ms = start.elapsed().as_millis(),
            "pushed"
        );
        Ok(())
    }

    /// Push a tag to a remote
    pub fn push_tag(
        &self,
        remote_name: &str,
        tag_name: &str,
        credentials: &TokenCredentials,
    ) -> Result<()> {
        let refspec = format!("refs/tags/{}:refs/tags/{}", tag_name, tag_name);
        self.push(remote_name, &[refspec], credentials)
    }

    /// Push the current branch to the branch of the same name on a remote
    pub fn push_branch(&self, remote_name: &str, credentials: &TokenCredentials) -> Result<()> {
        let branch = self.current_branch()?.ok_or(GitError::DetachedHead)?;
        let refspec = format!("refs/heads/{}:refs/heads/{}", branch, branch);
        self.push(remote_name, &[refspec], credentials)
    }
}
