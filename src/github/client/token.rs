use reqwest::Method;
use url::Url;

use super::{api_request, endpoint, GitHubClient};

/// Provides access to GitHub API using PAT, or anonymously without one.
pub struct TokenClient {
    api_uri: Url,
    token: Option<String>,
    client: reqwest::Client,
}

impl TokenClient {
    pub fn new(api_uri: Url, token: impl Into<String>) -> Self {
        Self {
            api_uri,
            token: Some(token.into()),
            client: reqwest::Client::new(),
        }
    }

    pub fn anonymous(api_uri: Url) -> Self {
        Self {
            api_uri,
            token: None,
            client: reqwest::Client::new(),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.token.is_none()
    }
}

#[async_trait::async_trait]
impl GitHubClient for TokenClient {
    fn api_uri(&self) -> &Url {
        &self.api_uri
    }

    async fn get(&self, end: &str) -> anyhow::Result<reqwest::Response> {
        tracing::debug!("GET {end}");
        api_request(
            &self.client,
            Method::GET,
            endpoint(&self.api_uri, end),
            self.token.as_deref(),
        )
        .send()
        .await
        .map_err(|e| anyhow::anyhow!(e))
    }
}
