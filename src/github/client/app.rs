use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, Header};
use reqwest::{Method, StatusCode};
use url::Url;

use super::{api_request, endpoint, GitHubClient};
use crate::github::GithubRepo;

/// Provides access to a single app installation (account) using the GitHub API.
pub struct AppClient {
    api_uri: Url,
    installation_token: String,
    client: reqwest::Client,
}

#[derive(serde::Deserialize, Debug)]
struct Installation {
    id: u64,
    account: Account,
}

#[derive(serde::Deserialize, Debug)]
struct Account {
    login: String,
}

#[derive(serde::Deserialize)]
struct AccessToken {
    token: String,
    expires_at: DateTime<Utc>,
}

impl AppClient {
    /// Create a JSON Web Token that can be used to authenticate an a GitHub application.
    ///
    /// See: https://docs.github.com/en/apps/creating-github-apps/authenticating-with-a-github-app/generating-a-json-web-token-jwt-for-a-github-app
    fn generate_bearer_token(app_id: u64, private_key: &str) -> Result<String> {
        let key = jsonwebtoken::EncodingKey::from_rsa_pem(private_key.as_bytes())
            .context("Could not encode private key")?;

        #[derive(serde::Serialize)]
        struct Claims {
            iss: String,
            iat: i64,
            exp: i64,
        }

        let now = Utc::now().timestamp();

        // Github only allows JWTs that expire in the next 10 minutes.
        // The token is issued 60 seconds in the past and expires in 9 minutes,
        // to allow some clock drift.
        let claims = Claims {
            iss: app_id.to_string(),
            iat: now - 60,       //drift
            exp: now + (9 * 60), //10min expire
        };

        let header = Header::new(Algorithm::RS256);

        Ok(jsonwebtoken::encode(&header, &claims, &key)?)
    }

    /// Authenticates as the app, then as its installation on `repo`.
    // Documentation: https://docs.github.com/en/rest/apps/apps?apiVersion=2022-11-28#get-a-repository-installation-for-the-authenticated-app
    pub async fn connect(
        api_uri: Url,
        app_id: u64,
        private_key: &str,
        repo: &GithubRepo,
    ) -> Result<Self> {
        let jwt = Self::generate_bearer_token(app_id, private_key)?;
        let client = reqwest::Client::new();

        let res = api_request(
            &client,
            Method::GET,
            endpoint(&api_uri, &format!("/repos/{repo}/installation")),
            Some(&jwt),
        )
        .send()
        .await
        .with_context(|| format!("Could not get installation of app {app_id} on {repo}"))?;
        let installation: Installation = match res.status() {
            StatusCode::OK => res
                .json()
                .await
                .with_context(|| format!("Could not parse installation of app {app_id}"))?,
            StatusCode::NOT_FOUND => {
                return Err(anyhow!("App {app_id} is not installed on {repo}"));
            }
            status => {
                return Err(anyhow!(
                    "Could not get installation of app {app_id} on {repo}: {status}"
                ));
            }
        };
        tracing::trace!(
            "App {app_id} is installed for {} as {}",
            installation.account.login,
            installation.id
        );

        let token: AccessToken = api_request(
            &client,
            Method::POST,
            endpoint(
                &api_uri,
                &format!("/app/installations/{}/access_tokens", installation.id),
            ),
            Some(&jwt),
        )
        .send()
        .await
        .and_then(|res| res.error_for_status())
        .with_context(|| {
            format!("Could not create token for installation {}", installation.id)
        })?
        .json()
        .await
        .context("Could not parse installation token")?;

        tracing::debug!(
            "Authenticated as installation {} of app {app_id} until {}",
            installation.id,
            token.expires_at
        );
        Ok(Self {
            api_uri,
            installation_token: token.token,
            client,
        })
    }
}

#[async_trait::async_trait]
impl GitHubClient for AppClient {
    fn api_uri(&self) -> &Url {
        &self.api_uri
    }

    async fn get(&self, end: &str) -> Result<reqwest::Response> {
        tracing::debug!("GET {end}");
        api_request(
            &self.client,
            Method::GET,
            endpoint(&self.api_uri, end),
            Some(&self.installation_token),
        )
        .send()
        .await
        .map_err(|e| anyhow::anyhow!(e))
    }
}
