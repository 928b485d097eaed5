//! Release host HTTP client
//!
//! Blocking client for a GitHub-style release API: project metadata, the
//! paginated release listing, and raw asset downloads. All requests share
//! one [`reqwest::blocking::Client`] with a caller-supplied timeout, so no
//! network call blocks indefinitely.

use crate::reducer::BundleSource;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;

/// Default API base URL for the public release host.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const RELEASES_PER_PAGE: usize = 40;

/// Project metadata, used as the homepage fallback for plugins whose
/// manifest declares none.
#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    pub html_url: String,
}

/// Raw release metadata as returned by the host. Ephemeral input to the
/// reducer, never persisted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReleaseCandidate {
    #[serde(default)]
    pub tag_name: String,

    #[serde(default)]
    pub name: Option<String>,

    /// Release page URL, recorded as the entry's release notes URL.
    #[serde(default)]
    pub html_url: String,

    #[serde(default)]
    pub draft: bool,

    #[serde(default)]
    pub prerelease: bool,

    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

impl ReleaseCandidate {
    /// Human-readable release name for logs and error context.
    pub fn display_name(&self) -> String {
        match self.name.as_deref().filter(|n| !n.is_empty()) {
            Some(name) => format!("{} ({})", name, self.tag_name),
            None => self.tag_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReleaseAsset {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub browser_download_url: String,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ReleaseAsset {
    /// The asset's update timestamp, falling back to its creation timestamp.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.updated_at.or(self.created_at)
    }
}

pub struct HostClient {
    base_url: String,
    client: reqwest::blocking::Client,
    token: Option<String>,
}

impl HostClient {
    /// Create a client for the given API base URL.
    ///
    /// `token` enables authenticated requests for higher rate limits;
    /// `timeout` bounds every individual network call.
    pub fn new(
        base_url: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("pluginmart/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            base_url: base_url.into(),
            client,
            token,
        })
    }

    fn get(&self, url: &str) -> Result<reqwest::blocking::Response> {
        let mut request = self.client.get(url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Other(format!(
                "request to {} failed with status {}",
                url, status
            )));
        }

        Ok(response)
    }

    /// Fetch project metadata.
    pub fn project(&self, owner: &str, repo: &str) -> Result<Project> {
        let url = format!("{}/repos/{}/{}", self.base_url, owner, repo);
        Ok(self.get(&url)?.json()?)
    }

    /// Fetch every release of a project, walking all pages.
    pub fn releases(&self, owner: &str, repo: &str) -> Result<Vec<ReleaseCandidate>> {
        let mut result = Vec::new();
        let mut page = 1;

        loop {
            let url = format!(
                "{}/repos/{}/{}/releases?per_page={}&page={}",
                self.base_url, owner, repo, RELEASES_PER_PAGE, page
            );
            tracing::debug!(url = %url, "listing releases");

            let releases: Vec<ReleaseCandidate> = self.get(&url)?.json()?;
            let full_page = releases.len() == RELEASES_PER_PAGE;
            result.extend(releases);

            if !full_page {
                break;
            }
            page += 1;
        }

        Ok(result)
    }

    /// Download raw bytes from an absolute URL (bundles, signatures, icons).
    pub fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        Ok(self.get(url)?.bytes()?.to_vec())
    }
}

impl BundleSource for HostClient {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        HostClient::fetch(self, url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name() {
        let mut release = ReleaseCandidate {
            tag_name: "v1.2.0".to_string(),
            ..Default::default()
        };
        assert_eq!(release.display_name(), "v1.2.0");

        release.name = Some(String::new());
        assert_eq!(release.display_name(), "v1.2.0");

        release.name = Some("Big release".to_string());
        assert_eq!(release.display_name(), "Big release (v1.2.0)");
    }

    #[test]
    fn test_asset_timestamp_falls_back_to_created_at() {
        let created = "2020-01-01T00:00:00Z".parse().unwrap();
        let updated = "2020-06-01T00:00:00Z".parse().unwrap();

        let mut asset = ReleaseAsset {
            created_at: Some(created),
            ..Default::default()
        };
        assert_eq!(asset.timestamp(), Some(created));

        asset.updated_at = Some(updated);
        assert_eq!(asset.timestamp(), Some(updated));
    }

    #[test]
    fn test_releases_pagination() {
        let mut server = mockito::Server::new();

        let full_page: Vec<serde_json::Value> = (0..40)
            .map(|i| serde_json::json!({"tag_name": format!("v0.{}.0", i)}))
            .collect();
        let page1 = server
            .mock("GET", "/repos/acme/plugin-demo/releases")
            .match_query(mockito::Matcher::UrlEncoded("page".into(), "1".into()))
            .with_body(serde_json::to_string(&full_page).unwrap())
            .create();
        let page2 = server
            .mock("GET", "/repos/acme/plugin-demo/releases")
            .match_query(mockito::Matcher::UrlEncoded("page".into(), "2".into()))
            .with_body(r#"[{"tag_name":"v1.0.0"}]"#)
            .create();

        let client = HostClient::new(server.url(), None, Duration::from_secs(5)).unwrap();
        let releases = client.releases("acme", "plugin-demo").unwrap();

        page1.assert();
        page2.assert();
        assert_eq!(releases.len(), 41);
        assert_eq!(releases[40].tag_name, "v1.0.0");
    }

    #[test]
    fn test_error_status_is_reported() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/repos/acme/missing")
            .with_status(404)
            .create();

        let client = HostClient::new(server.url(), None, Duration::from_secs(5)).unwrap();
        let err = client.project("acme", "missing").unwrap_err();
        assert!(err.to_string().contains("404"));
    }
}
