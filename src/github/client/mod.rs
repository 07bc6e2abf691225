use anyhow::{Context, Result};
use reqwest::{Method, StatusCode};
use thiserror::Error;
use url::Url;

use super::GithubRepo;
use crate::permissions::PermissionLevel;
mod app;
mod auto;
mod token;
pub use app::AppClient;
pub use auto::{connect, ConnectedClient};
pub use token::TokenClient;

const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Joins an API endpoint path onto the base URI of a GitHub instance.
pub(crate) fn endpoint(api_uri: &Url, end: &str) -> String {
    format!("{}{end}", api_uri.as_str().trim_end_matches('/'))
}

/// Prepares a request carrying the headers GitHub expects.
pub(crate) fn api_request(
    client: &reqwest::Client,
    method: Method,
    url: String,
    bearer: Option<&str>,
) -> reqwest::RequestBuilder {
    let req = client
        .request(method, url)
        .header("X-GitHub-Api-Version", API_VERSION)
        .header("Accept", "application/vnd.github+json")
        .header("User-Agent", USER_AGENT);
    match bearer {
        Some(token) => req.bearer_auth(token),
        None => req,
    }
}

/// A repository as returned by `GET /repos/{owner}/{repo}`.
#[derive(serde::Deserialize, Debug, Clone)]
pub struct Repository {
    pub full_name: String,
}

/// Provides functionality for working with a (authorized) client.
#[async_trait::async_trait]
pub trait GitHubClient {
    fn api_uri(&self) -> &Url;

    async fn get(&self, end: &str) -> Result<reqwest::Response>;

    /// Resolve a repository by its owner and name.
    async fn get_repository(&self, repo: &GithubRepo) -> Result<Repository> {
        let end = format!("/repos/{repo}");
        let res = self
            .get(&end)
            .await
            .with_context(|| format!("Could not get repository {repo}"))?;
        match res.status() {
            StatusCode::OK => res
                .json()
                .await
                .with_context(|| format!("Could not parse repository {repo}")),
            StatusCode::NOT_FOUND => Err(ApiError::RepositoryNotFound(repo.to_string()).into()),
            status => Err(ApiError::Status { status, end }.into()),
        }
    }

    /// Permission `username` holds on `repo`.
    // Documentation: https://docs.github.com/en/rest/collaborators/collaborators?apiVersion=2022-11-28#get-repository-permissions-for-a-user
    async fn get_permission(
        &self,
        repo: &Repository,
        username: &str,
    ) -> Result<PermissionLevel> {
        #[derive(serde::Deserialize)]
        struct PermissionResponse {
            permission: String,
        }

        if !is_valid_login(username) {
            return Err(ApiError::InvalidUsername(username.to_owned()).into());
        }
        let end = format!(
            "/repos/{}/collaborators/{username}/permission",
            repo.full_name
        );
        let res = self.get(&end).await.with_context(|| {
            format!("Could not get permission of {username} on {}", repo.full_name)
        })?;

        let status = res.status();
        tracing::trace!(
            "Permission response for {username} on {}: status={status}",
            repo.full_name
        );
        match status {
            StatusCode::OK => {
                let response: PermissionResponse = res.json().await.with_context(|| {
                    format!("Could not parse permission of {username} on {}", repo.full_name)
                })?;
                Ok(PermissionLevel::from_api_name(&response.permission)?)
            }
            StatusCode::NOT_FOUND => Err(ApiError::UnknownUser {
                repo: repo.full_name.clone(),
                user: username.to_owned(),
            }
            .into()),
            _ => Err(ApiError::Status { status, end }.into()),
        }
    }
}

/// GitHub logins, including the `[bot]` suffix of app accounts.
fn is_valid_login(username: &str) -> bool {
    let login = username.strip_suffix("[bot]").unwrap_or(username);
    !login.is_empty()
        && login
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Repository {0} not found")]
    RepositoryNotFound(String),
    #[error("User {user} is not known to {repo}")]
    UnknownUser { repo: String, user: String },
    #[error("{0:?} is not a GitHub login")]
    InvalidUsername(String),
    #[error("Unexpected status {status} from {end}")]
    Status { status: StatusCode, end: String },
}
