//! Local repository probing and git command execution.
//!
//! Every operation takes the repository path explicitly through [`GitRepo`];
//! nothing here depends on the process working directory. Command argument
//! vectors are constructed fresh on every call.

use std::path::{Path, PathBuf};
use tokio::process::Command as AsyncCommand;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Handle to a local git repository at a fixed path.
#[derive(Debug, Clone)]
pub struct GitRepo {
    path: PathBuf,
}

impl GitRepo {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True iff a `.git` metadata directory exists at the repository path.
    pub fn is_repository(&self) -> bool {
        self.path.join(".git").is_dir()
    }

    /// Read the configured origin remote URL.
    pub async fn origin_url(&self) -> Result<String> {
        self.remote_url("origin")
            .await?
            .ok_or_else(|| Error::NoOriginConfigured(self.path.clone()))
    }

    /// Read the configured upstream remote URL.
    ///
    /// Absence is the recoverable condition the sync engine uses to decide
    /// whether to derive and register an upstream automatically.
    pub async fn upstream_url(&self) -> Result<String> {
        self.remote_url("upstream")
            .await?
            .ok_or_else(|| Error::NoUpstreamConfigured(self.path.clone()))
    }

    async fn remote_url(&self, remote: &str) -> Result<Option<String>> {
        let output = AsyncCommand::new("git")
            .args(["config", "--get", &format!("remote.{}.url", remote)])
            .current_dir(&self.path)
            .output()
            .await?;

        // `git config --get` exits 1 when the key is simply absent
        if output.status.success() {
            let url = String::from_utf8_lossy(&output.stdout).trim().to_string();
            debug!("{} url for {}: {}", remote, self.path.display(), url);
            Ok(Some(url))
        } else {
            Ok(None)
        }
    }

    /// Register the parent repository as the `upstream` remote.
    pub async fn add_upstream(&self, url: &str) -> Result<()> {
        info!("Adding upstream remote {} in {}", url, self.path.display());
        self.run(&["remote", "add", "upstream", url]).await
    }

    /// Fetch the upstream remote.
    pub async fn fetch_upstream(&self) -> Result<()> {
        info!("Fetching upstream in {}", self.path.display());
        self.run(&["fetch", "upstream"]).await
    }

    /// Check out the primary branch.
    pub async fn checkout(&self, branch: &str) -> Result<()> {
        info!("Checking out {} in {}", branch, self.path.display());
        self.run(&["checkout", branch]).await
    }

    /// Merge `upstream/<branch>` into the current branch.
    pub async fn merge_upstream(&self, branch: &str) -> Result<()> {
        info!("Merging upstream/{} in {}", branch, self.path.display());
        self.run(&["merge", &format!("upstream/{}", branch)]).await
    }

    /// Push the primary branch to origin.
    pub async fn push_origin(&self, branch: &str) -> Result<()> {
        info!("Pushing {} to origin from {}", branch, self.path.display());
        self.run(&["push", "origin", branch]).await
    }

    /// Clone `url` into `dest` and return a handle to the clone.
    pub async fn clone_repository(url: &str, dest: &Path) -> Result<GitRepo> {
        info!("Cloning {} into {}", url, dest.display());

        let output = AsyncCommand::new("git")
            .args(["clone", url])
            .arg(dest)
            .output()
            .await?;

        if !output.status.success() {
            return Err(Error::CloneFailed {
                url: url.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(GitRepo::new(dest))
    }

    /// Run a git command in the repository, mapping a non-zero exit to
    /// [`Error::CommandFailed`]. Failures are never retried or rolled back;
    /// whatever state the command left behind is surfaced to the caller.
    async fn run(&self, args: &[&str]) -> Result<()> {
        let output = AsyncCommand::new("git")
            .args(args)
            .current_dir(&self.path)
            .output()
            .await?;

        if !output.status.success() {
            return Err(Error::CommandFailed {
                command: format!("git {}", args.join(" ")),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        debug!("git {} succeeded in {}", args.join(" "), self.path.display());
        Ok(())
    }
}
