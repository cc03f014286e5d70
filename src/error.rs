use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while forking or synchronizing a repository.
///
/// Only [`Error::NoUpstreamConfigured`] is recoverable: the sync engine
/// intercepts it and derives an upstream remote from the origin's parent.
/// Every other variant terminates the run.
#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed repository URL: {0}")]
    MalformedUrl(String),

    #[error("not a git repository: {0}")]
    NotARepository(PathBuf),

    #[error("no origin remote configured in {0}")]
    NoOriginConfigured(PathBuf),

    #[error("no upstream remote configured in {0}")]
    NoUpstreamConfigured(PathBuf),

    #[error("repository not found: {owner}/{name}")]
    RepositoryNotFound { owner: String, name: String },

    #[error("repository {owner}/{name} has no parent (not a fork?)")]
    NoParentRepository { owner: String, name: String },

    #[error("command `{command}` failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("failed to clone {url}: {stderr}")]
    CloneFailed { url: String, stderr: String },

    #[error("GitHub authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("GitHub API error: {0}")]
    Api(#[from] octocrab::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Exit code for the CLI: 1 for setup failures, 2 once sync steps
    /// have started making changes to the repository. A failed clone
    /// leaves no sync progress behind, so it counts as setup failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::CommandFailed { .. } => 2,
            _ => 1,
        }
    }
}
