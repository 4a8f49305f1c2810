//! Repository locator parsing
//!
//! Extracts owner and repository name from the user-supplied clone URL so
//! the release API knows which repository to talk to.

use url::Url;

use crate::error::{GitrelError, Result};

/// Parsed repository location: the raw clone URL plus owner/name
#[derive(Debug, Clone)]
pub struct RepoLocator {
    /// URL as supplied on the command line, used for cloning
    pub url: String,
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub name: String,
}

impl RepoLocator {
    /// Parse a clone URL in HTTPS or SSH form
    ///
    /// Supported formats:
    /// - `https://github.com/owner/repo.git`
    /// - `https://github.com/owner/repo`
    /// - `git@github.com:owner/repo.git`
    /// - `ssh://git@github.com/owner/repo.git`
    pub fn parse(url: &str) -> Result<Self> {
        let (owner, name) = parse_owner_and_name(url)?;
        Ok(Self {
            url: url.to_string(),
            owner,
            name,
        })
    }

    /// Full repository name (owner/name)
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

fn parse_owner_and_name(url: &str) -> Result<(String, String)> {
    // SCP-like SSH form: git@host:owner/repo.git
    if let Some(rest) = url.strip_prefix("git@") {
        if let Some((_host, path)) = rest.split_once(':') {
            return parse_owner_repo_path(path.trim_end_matches(".git"), url);
        }
    }

    // ssh:// and https:// forms share URL syntax
    if let Ok(parsed) = Url::parse(url) {
        if matches!(parsed.scheme(), "https" | "http" | "ssh") {
            let path = parsed
                .path()
                .trim_start_matches('/')
                .trim_end_matches(".git");
            return parse_owner_repo_path(path, url);
        }
    }

    Err(GitrelError::InvalidRepositoryUrl(url.to_string()))
}

fn parse_owner_repo_path(path: &str, original: &str) -> Result<(String, String)> {
    let mut parts = path.split('/');
    match (parts.next(), parts.next()) {
        (Some(owner), Some(name)) if !owner.is_empty() && !name.is_empty() => {
            Ok((owner.to_string(), name.to_string()))
        }
        _ => Err(GitrelError::InvalidRepositoryUrl(original.to_string())),
    }
}
