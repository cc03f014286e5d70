//! GitHub API integration: authentication, forking, and repository metadata.

use serde::Deserialize;
use std::env;
use std::future::Future;
use std::process::Command;
use std::time::Duration;
use tracing::{debug, info, warn};

use octocrab::Octocrab;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::giturl::RepoUrl;

/// GitHub client wrapper with authentication management
pub struct GitHubClient {
    client: Octocrab,
    http: reqwest::Client,
    username: String,
    api_url: String,
    retry_attempts: u32,
    retry_delay: Duration,
}

/// GitHub authentication strategies
#[derive(Debug, Clone)]
pub enum AuthStrategy {
    /// Use GitHub CLI authentication
    GitHubCLI,
    /// Use environment variable token
    EnvironmentToken,
}

/// Subset of the repository metadata body we care about: the declared parent
/// of a fork and its clone URL.
#[derive(Debug, Deserialize)]
struct RepoMetadata {
    parent: Option<ParentRepo>,
}

#[derive(Debug, Deserialize)]
struct ParentRepo {
    clone_url: String,
}

impl GitHubClient {
    /// Create a new GitHub client with automatic authentication
    pub async fn new(config: &Config) -> Result<Self> {
        let (auth_strategy, token) = Self::detect_authentication(config)?;

        info!("Using authentication strategy: {:?}", auth_strategy);

        let api_url = config.github.api_url.trim_end_matches('/').to_string();

        let client = Octocrab::builder()
            .base_uri(api_url.as_str())
            .map_err(|e| Error::AuthenticationFailed(format!("invalid API base URL: {}", e)))?
            .personal_token(token)
            .build()
            .map_err(|e| Error::AuthenticationFailed(format!("failed to build client: {}", e)))?;

        // Get authenticated user information
        let user = client.current().user().await.map_err(|e| {
            Error::AuthenticationFailed(format!(
                "could not fetch the authenticated user, check your token: {}",
                e
            ))
        })?;

        let username = config
            .github
            .username
            .clone()
            .unwrap_or_else(|| user.login.clone());

        info!("Authenticated as GitHub user: {}", username);

        Ok(Self {
            client,
            http: reqwest::Client::new(),
            username,
            api_url,
            retry_attempts: config.sync.retry_attempts.max(1),
            retry_delay: Duration::from_secs(config.sync.retry_delay_secs),
        })
    }

    /// Detect and obtain GitHub authentication
    fn detect_authentication(config: &Config) -> Result<(AuthStrategy, String)> {
        match config.github.auth_method.as_str() {
            "auto" => {
                // Try GitHub CLI first, then environment token
                if let Ok(token) = Self::try_github_cli() {
                    Ok((AuthStrategy::GitHubCLI, token))
                } else if let Ok(token) = Self::try_environment_token() {
                    Ok((AuthStrategy::EnvironmentToken, token))
                } else {
                    Err(Error::AuthenticationFailed(
                        "no GitHub authentication found; either authenticate the GitHub CLI \
                         (gh auth login) or set the GITHUB_TOKEN environment variable"
                            .to_string(),
                    ))
                }
            }
            "gh_cli" => {
                let token = Self::try_github_cli()?;
                Ok((AuthStrategy::GitHubCLI, token))
            }
            "token" => {
                let token = Self::try_environment_token()?;
                Ok((AuthStrategy::EnvironmentToken, token))
            }
            other => Err(Error::AuthenticationFailed(format!(
                "unknown auth method: {}",
                other
            ))),
        }
    }

    /// Try to get a token from the GitHub CLI
    fn try_github_cli() -> Result<String> {
        debug!("Attempting GitHub CLI authentication");

        let token_output = Command::new("gh")
            .args(["auth", "token"])
            .output()
            .map_err(|e| {
                Error::AuthenticationFailed(format!("GitHub CLI (gh) not available: {}", e))
            })?;

        if !token_output.status.success() {
            return Err(Error::AuthenticationFailed(format!(
                "GitHub CLI is not authenticated (run: gh auth login): {}",
                String::from_utf8_lossy(&token_output.stderr).trim()
            )));
        }

        let token = String::from_utf8_lossy(&token_output.stdout).trim().to_string();

        if token.is_empty() {
            return Err(Error::AuthenticationFailed(
                "GitHub CLI returned an empty token".to_string(),
            ));
        }

        debug!("Successfully obtained token from GitHub CLI");
        Ok(token)
    }

    /// Try to get a token from the environment
    fn try_environment_token() -> Result<String> {
        debug!("Attempting environment variable authentication");

        let token = env::var("GITHUB_TOKEN").map_err(|_| {
            Error::AuthenticationFailed("GITHUB_TOKEN environment variable not set".to_string())
        })?;

        if token.is_empty() {
            return Err(Error::AuthenticationFailed(
                "GITHUB_TOKEN is empty".to_string(),
            ));
        }

        Ok(token)
    }

    /// Get the authenticated username
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Fork `upstream` under the authenticated user's namespace and return
    /// the fork's URL.
    ///
    /// A missing upstream repository is fatal. If the API reports that the
    /// fork already exists (HTTP 422), the existing fork is looked up and
    /// returned instead; any other failure propagates unchanged.
    pub async fn fork(&self, upstream: &RepoUrl) -> Result<RepoUrl> {
        // Repository lookup is read-only and safe to retry
        let repo = self
            .with_retry(|| async move {
                self.client
                    .repos(&upstream.owner, &upstream.name)
                    .get()
                    .await
                    .map_err(|e| map_lookup_error(e, &upstream.owner, &upstream.name))
            })
            .await?;

        debug!(
            "Found upstream repository: {}",
            repo.full_name.as_deref().unwrap_or(&upstream.name)
        );

        let forked = match self
            .client
            .repos(&upstream.owner, &upstream.name)
            .create_fork()
            .send()
            .await
        {
            Ok(fork) => fork,
            Err(e) if is_already_exists(&e) => {
                info!(
                    "Fork of {} already exists under {}",
                    upstream.slug(),
                    self.username
                );
                self.client
                    .repos(&self.username, &upstream.name)
                    .get()
                    .await
                    .map_err(|e| map_lookup_error(e, &self.username, &upstream.name))?
            }
            Err(e) => return Err(e.into()),
        };

        let fork_url = match forked.ssh_url.as_deref() {
            Some(ssh_url) => RepoUrl::parse(ssh_url)?,
            None => RepoUrl {
                host: upstream.host.clone(),
                owner: self.username.clone(),
                name: upstream.name.clone(),
            },
        };

        info!("Forked {} to {}", upstream.slug(), fork_url.ssh_url());
        Ok(fork_url)
    }

    /// Best-effort probe for whether a GitHub user exists.
    ///
    /// Any failure folds into `false`, including network errors; callers
    /// cannot distinguish "no such user" from "GitHub unreachable".
    pub async fn user_exists(&self, username: &str) -> bool {
        match self.client.users(username).profile().await {
            Ok(_) => true,
            Err(e) => {
                debug!("User lookup for {} failed: {}", username, e);
                false
            }
        }
    }

    /// Look up the declared parent of `fork` via the unauthenticated
    /// repository metadata endpoint and return its clone URL.
    pub async fn parent_clone_url(&self, fork: &RepoUrl) -> Result<String> {
        let url = format!("{}/repos/{}/{}", self.api_url, fork.owner, fork.name);
        debug!("Fetching repository metadata from {}", url);

        let url = &url;
        let meta: RepoMetadata = self
            .with_retry(|| async move {
                let response = self
                    .http
                    .get(url)
                    .header(reqwest::header::USER_AGENT, "forksync")
                    .send()
                    .await?
                    .error_for_status()?;
                Ok(response.json().await?)
            })
            .await?;

        let parent = meta.parent.ok_or_else(|| Error::NoParentRepository {
            owner: fork.owner.clone(),
            name: fork.name.clone(),
        })?;

        info!("Upstream URL for {} is {}", fork.slug(), parent.clone_url);
        Ok(parent.clone_url)
    }

    /// Bounded retry with fixed backoff for read-only network lookups.
    /// Non-transient errors (not found, malformed data) fail immediately.
    async fn with_retry<T, F, Fut>(&self, op: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.retry_attempts && is_transient(&e) => {
                    warn!(
                        "Attempt {}/{} failed ({}), retrying in {:?}",
                        attempt, self.retry_attempts, e, self.retry_delay
                    );
                    tokio::time::sleep(self.retry_delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Map an octocrab lookup error: a 404 is a definitive "repository not
/// found"; everything else stays an API error.
fn map_lookup_error(e: octocrab::Error, owner: &str, name: &str) -> Error {
    if has_status(&e, 404) {
        Error::RepositoryNotFound {
            owner: owner.to_string(),
            name: name.to_string(),
        }
    } else {
        Error::Api(e)
    }
}

/// GitHub answers 422 Unprocessable Entity when the fork already exists.
fn is_already_exists(e: &octocrab::Error) -> bool {
    has_status(e, 422)
}

fn has_status(e: &octocrab::Error, status: u16) -> bool {
    matches!(e, octocrab::Error::GitHub { source, .. } if source.status_code.as_u16() == status)
}

/// Connection failures, timeouts and server errors are worth retrying;
/// 4xx answers and undecodable bodies are definitive and fail immediately.
fn is_transient(e: &Error) -> bool {
    match e {
        Error::Http(err) => {
            err.is_connect()
                || err.is_timeout()
                || err.status().is_some_and(|s| s.is_server_error())
        }
        Error::Api(octocrab::Error::GitHub { source, .. }) => source.status_code.is_server_error(),
        Error::Api(octocrab::Error::Serde { .. }) | Error::Api(octocrab::Error::Json { .. }) => {
            false
        }
        Error::Api(_) => true,
        _ => false,
    }
}
