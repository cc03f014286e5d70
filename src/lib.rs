//! forksync - Fork a GitHub repository and keep the clone in sync
//!
//! forksync automates the boilerplate of working against a fork: it forks a
//! repository through the GitHub API, clones the fork locally, registers the
//! parent repository as the `upstream` remote when it is missing, and then
//! fetches, merges and pushes the primary branch so the fork tracks its
//! parent.
//!
//! ## Modules
//!
//! - [`config`]: Configuration management and parsing
//! - [`giturl`]: Repository URL parsing (HTTPS and SSH forms)
//! - [`github`]: GitHub API integration and authentication
//! - [`git`]: Local git repository probing and command execution
//! - [`sync`]: The fork/clone/sync orchestration

pub mod config;
pub mod error;
pub mod git;
pub mod github;
pub mod giturl;
pub mod sync;

pub use config::Config;
pub use error::{Error, Result};
pub use git::GitRepo;
pub use github::GitHubClient;
pub use giturl::RepoUrl;
pub use sync::{SyncEngine, SyncReport};
