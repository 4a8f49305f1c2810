//! Release creation against the GitHub REST API
//!
//! Uses the access token obtained from the device flow. Release creation is
//! not safely idempotent, so nothing here retries; callers check for an
//! existing release first via [`ReleasePublisher::find_by_tag`].

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GitrelError, Result};
use crate::github::device_auth::AccessToken;
use crate::github::request;

/// Default GitHub REST API base
const API_BASE: &str = "https://api.github.com";

/// Outbound release-creation request
#[derive(Debug, Clone, Serialize)]
pub struct ReleaseRequest {
    /// Tag the release references
    pub tag_name: String,
    /// Commit-ish to tag on the provider side; unused when the tag exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_commitish: Option<String>,
    /// Release title
    pub name: String,
    /// Release body text
    pub body: String,
    /// Create as a draft
    pub draft: bool,
    /// Mark as a prerelease
    pub prerelease: bool,
}

/// Release record as returned by the provider
///
/// The provider is authoritative; ids and URLs are never guessed client-side.
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseRecord {
    /// Provider-assigned release id
    pub id: u64,
    /// Tag the release references
    pub tag_name: String,
    /// Release title
    #[serde(default)]
    pub name: Option<String>,
    /// Release body text
    #[serde(default)]
    pub body: Option<String>,
    /// Whether the release is a draft
    #[serde(default)]
    pub draft: bool,
    /// Whether the release is a prerelease
    #[serde(default)]
    pub prerelease: bool,
    /// API URL of the release
    pub url: String,
    /// Browser URL of the release
    pub html_url: String,
    /// Endpoint for asset uploads
    #[serde(default)]
    pub upload_url: Option<String>,
    /// Creation timestamp
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Publication timestamp
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    /// Uploaded assets
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

/// A single release asset
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseAsset {
    /// Provider-assigned asset id
    pub id: u64,
    /// Asset file name
    pub name: String,
    /// Asset state, e.g. "uploaded"
    #[serde(default)]
    pub state: Option<String>,
    /// Declared media type
    #[serde(default)]
    pub content_type: Option<String>,
    /// Size in bytes
    #[serde(default)]
    pub size: Option<u64>,
    /// Direct download URL
    #[serde(default)]
    pub browser_download_url: Option<String>,
}

/// Handler for release endpoints of one repository
pub struct ReleasePublisher {
    client: Client,
    api_base: String,
    owner: String,
    repo: String,
}

impl ReleasePublisher {
    /// Create a publisher for `owner/repo` against the public GitHub API
    pub fn new(owner: String, repo: String) -> Result<Self> {
        Self::with_api_base(owner, repo, API_BASE.to_string())
    }

    /// Create a publisher against a custom API base (used by tests)
    pub fn with_api_base(owner: String, repo: String, api_base: String) -> Result<Self> {
        Ok(Self {
            client: crate::github::device_auth::http_client()?,
            api_base,
            owner,
            repo,
        })
    }

    fn releases_url(&self) -> String {
        format!("{}/repos/{}/{}/releases", self.api_base, self.owner, self.repo)
    }

    fn auth_headers(token: &AccessToken) -> HashMap<String, String> {
        let mut headers = HashMap::new();
        headers.insert("Authorization".to_string(), token.authorization_header());
        // required by the GitHub REST API
        headers.insert("User-Agent".to_string(), "gitrel".to_string());
        headers
    }

    /// List the repository's releases
    pub async fn list(&self, token: &AccessToken) -> Result<Vec<ReleaseRecord>> {
        let headers = Self::auth_headers(token);
        let request = request::get(
            &self.client,
            &self.releases_url(),
            &[("per_page", "100")],
            Some(&headers),
        )?;
        let response = self.client.execute(request).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GitrelError::ReleaseApi(status.to_string()));
        }

        response
            .json()
            .await
            .map_err(|e| GitrelError::Protocol(e.to_string()))
    }

    /// Find an existing release referencing `tag`
    pub async fn find_by_tag(
        &self,
        token: &AccessToken,
        tag: &str,
    ) -> Result<Option<ReleaseRecord>> {
        let releases = self.list(token).await?;
        Ok(releases.into_iter().find(|r| r.tag_name == tag))
    }

    /// Create a release; the caller must have checked for duplicates first
    pub async fn create(
        &self,
        token: &AccessToken,
        release: &ReleaseRequest,
    ) -> Result<ReleaseRecord> {
        debug!(tag = %release.tag_name, draft = release.draft, "creating release");

        let response = self
            .client
            .post(self.releases_url())
            .header("Authorization", token.authorization_header())
            .header("Accept", "application/json")
            .header("User-Agent", "gitrel")
            .json(release)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GitrelError::ReleaseApi(status.to_string()));
        }

        response
            .json()
            .await
            .map_err(|e| GitrelError::Protocol(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn token() -> AccessToken {
        AccessToken::test_value("gho_xyz", "bearer", "repo")
    }

    fn record_json(id: u64, tag: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "tag_name": tag,
            "name": format!("Release {tag}"),
            "body": "notes",
            "draft": false,
            "prerelease": false,
            "url": format!("https://api.example.test/releases/{id}"),
            "html_url": format!("https://example.test/releases/{tag}"),
            "upload_url": "https://uploads.example.test/releases/1/assets{?name,label}",
            "created_at": "2024-05-01T10:00:00Z",
            "published_at": "2024-05-01T10:05:00Z",
            "assets": []
        })
    }

    #[tokio::test]
    async fn test_create_release_sends_token_and_decodes_record() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/repos/acme/widget/releases"))
            .and(header("authorization", "bearer gho_xyz"))
            .and(body_partial_json(serde_json::json!({
                "tag_name": "v1.0",
                "name": "v1.0",
                "draft": false,
                "prerelease": true
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(record_json(7, "v1.0")))
            .mount(&server)
            .await;

        let publisher =
            ReleasePublisher::with_api_base("acme".into(), "widget".into(), server.uri()).unwrap();
        let record = publisher
            .create(
                &token(),
                &ReleaseRequest {
                    tag_name: "v1.0".to_string(),
                    target_commitish: None,
                    name: "v1.0".to_string(),
                    body: "notes".to_string(),
                    draft: false,
                    prerelease: true,
                },
            )
            .await
            .unwrap();

        assert_eq!(record.id, 7);
        assert_eq!(record.tag_name, "v1.0");
        assert!(record.created_at.is_some());
    }

    #[tokio::test]
    async fn test_create_release_surfaces_provider_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/repos/acme/widget/releases"))
            .respond_with(ResponseTemplate::new(422))
            .mount(&server)
            .await;

        let publisher =
            ReleasePublisher::with_api_base("acme".into(), "widget".into(), server.uri()).unwrap();
        let err = publisher
            .create(
                &token(),
                &ReleaseRequest {
                    tag_name: "v1.0".to_string(),
                    target_commitish: None,
                    name: "v1.0".to_string(),
                    body: String::new(),
                    draft: false,
                    prerelease: false,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, GitrelError::ReleaseApi(_)));
    }

    #[tokio::test]
    async fn test_find_by_tag_matches_exact_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/widget/releases"))
            .and(query_param("per_page", "100"))
            .and(header("authorization", "bearer gho_xyz"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                record_json(1, "v0.9"),
                record_json(2, "v1.0"),
            ])))
            .mount(&server)
            .await;

        let publisher =
            ReleasePublisher::with_api_base("acme".into(), "widget".into(), server.uri()).unwrap();

        let found = publisher.find_by_tag(&token(), "v1.0").await.unwrap();
        assert_eq!(found.unwrap().id, 2);

        let missing = publisher.find_by_tag(&token(), "v2.0").await.unwrap();
        assert!(missing.is_none());
    }
}
