//! Repository URL parsing.
//!
//! Accepts the two clone URL forms git hosting providers hand out:
//! `https://<host>/<owner>/<name>[.git]` and `git@<host>:<owner>/<name>[.git]`.
//! Both parse to the same `{host, owner, name}` triple so the rest of the
//! crate never cares which form the user (or the API) supplied.

use crate::error::{Error, Result};

/// A parsed repository reference: host, owner and repository name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoUrl {
    pub host: String,
    pub owner: String,
    pub name: String,
}

impl RepoUrl {
    /// Parse an HTTPS or SSH repository URL.
    ///
    /// Dispatches on the first character: `h` means HTTPS form, `g` means
    /// SSH form. Anything else is rejected as malformed.
    pub fn parse(url: &str) -> Result<Self> {
        let url = url.trim();

        let (host, path) = match url.chars().next() {
            Some('h') => {
                let rest = url
                    .strip_prefix("https://")
                    .ok_or_else(|| Error::MalformedUrl(url.to_string()))?;
                let slash = rest
                    .find('/')
                    .ok_or_else(|| Error::MalformedUrl(url.to_string()))?;
                (&rest[..slash], &rest[slash + 1..])
            }
            Some('g') => {
                let rest = url
                    .strip_prefix("git@")
                    .ok_or_else(|| Error::MalformedUrl(url.to_string()))?;
                let colon = rest
                    .find(':')
                    .ok_or_else(|| Error::MalformedUrl(url.to_string()))?;
                (&rest[..colon], &rest[colon + 1..])
            }
            _ => return Err(Error::MalformedUrl(url.to_string())),
        };

        // Trailing slash first, so `name.git/` still loses its suffix
        let path = path.trim_end_matches('/');
        let path = path.strip_suffix(".git").unwrap_or(path);

        let (owner, name) = path
            .split_once('/')
            .ok_or_else(|| Error::MalformedUrl(url.to_string()))?;

        if host.is_empty() || owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(Error::MalformedUrl(url.to_string()));
        }

        Ok(Self {
            host: host.to_string(),
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    /// HTTPS clone URL for this repository.
    pub fn https_url(&self) -> String {
        format!("https://{}/{}/{}", self.host, self.owner, self.name)
    }

    /// SSH clone URL for this repository.
    pub fn ssh_url(&self) -> String {
        format!("git@{}:{}/{}.git", self.host, self.owner, self.name)
    }

    /// `owner/name` slug, as used in API paths and log lines.
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl std::fmt::Display for RepoUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.host, self.owner, self.name)
    }
}
