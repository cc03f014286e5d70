//! Sync engine: orchestrates fork → clone → fetch → checkout → merge → push.
//!
//! The flow is strictly sequential. Local repository checks run first; a
//! missing upstream remote is the only recoverable failure, handled by
//! deriving the parent's clone URL from the origin repository's metadata
//! and registering it before running the same merge sequence.

use std::path::PathBuf;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::git::GitRepo;
use crate::github::GitHubClient;
use crate::giturl::RepoUrl;

/// Outcome of one sync invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub path: PathBuf,
    /// Whether an upstream remote had to be derived and registered.
    pub upstream_added: bool,
    /// Whether the fork was cloned (false when the clone already existed
    /// or when syncing a pre-existing checkout).
    pub cloned: bool,
}

/// Sequences local git operations and GitHub lookups for one repository.
pub struct SyncEngine {
    config: Config,
    github: GitHubClient,
}

impl SyncEngine {
    pub fn new(config: Config, github: GitHubClient) -> Self {
        Self { config, github }
    }

    /// Synchronize a locally cloned fork with its upstream parent.
    ///
    /// Preconditions: the path is a git repository with an origin remote;
    /// either failing is fatal. If no upstream remote is configured, one is
    /// derived from the origin repository's declared parent and added, then
    /// the same fetch/checkout/merge/push sequence runs.
    pub async fn sync(&self, repo: &GitRepo) -> Result<SyncReport> {
        info!("Starting fork sync in {}", repo.path().display());

        if !repo.is_repository() {
            return Err(Error::NotARepository(repo.path().to_path_buf()));
        }

        let origin_url = repo.origin_url().await?;

        let upstream_added = match repo.upstream_url().await {
            Ok(url) => {
                info!("Upstream remote already configured: {}", url);
                false
            }
            Err(Error::NoUpstreamConfigured(_)) => {
                warn!("No upstream remote configured, deriving one from origin");
                self.derive_and_add_upstream(repo, &origin_url).await?;
                true
            }
            Err(e) => return Err(e),
        };

        // Identical sequence on both paths, checkout included
        let branch = &self.config.sync.primary_branch;
        repo.fetch_upstream().await?;
        repo.checkout(branch).await?;
        repo.merge_upstream(branch).await?;
        repo.push_origin(branch).await?;

        info!("Fork sync complete in {}", repo.path().display());
        Ok(SyncReport {
            path: repo.path().to_path_buf(),
            upstream_added,
            cloned: false,
        })
    }

    /// Derive the parent repository's clone URL from the origin remote and
    /// register it as the upstream remote.
    async fn derive_and_add_upstream(&self, repo: &GitRepo, origin_url: &str) -> Result<()> {
        let origin = RepoUrl::parse(origin_url)?;
        let parent_url = self.github.parent_clone_url(&origin).await?;
        repo.add_upstream(&parent_url).await
    }

    /// Fork `url`, clone the fork under `<base>/<upstream-owner>/<name>`
    /// (skipping the clone when the target already exists), then sync.
    pub async fn fork_and_sync(&self, url: &str) -> Result<SyncReport> {
        let upstream = RepoUrl::parse(url)?;

        println!("Forking {} ...", upstream.slug());
        let fork = self.github.fork(&upstream).await?;

        // Clone target is named after the upstream owner, so forks of
        // different users' repositories with the same name do not collide
        let owner_dir = PathBuf::from(&self.config.base_directory).join(&upstream.owner);
        tokio::fs::create_dir_all(&owner_dir).await?;

        let target = owner_dir.join(&upstream.name);
        let cloned = if target.exists() {
            info!("Clone target {} already exists, skipping clone", target.display());
            false
        } else {
            println!("Cloning {} into {} ...", fork.slug(), target.display());
            GitRepo::clone_repository(&fork.https_url(), &target).await?;
            true
        };

        let repo = GitRepo::new(&target);
        let report = self.sync(&repo).await?;

        Ok(SyncReport { cloned, ..report })
    }
}
