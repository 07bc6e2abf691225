//! Chooses the client matching the credentials a job scans with.

use anyhow::Result;
use url::Url;

use super::{AppClient, GitHubClient, TokenClient};
use crate::github::credentials::Credential;
use crate::github::GithubRepo;

// selectors
macro_rules! dispatch {
    ($sef:expr,$fn:ident($($arg:expr),*)) => {
        match $sef {
            ConnectedClient::Token(cli) => cli.$fn($($arg),*).await,
            ConnectedClient::App(cli) => cli.$fn($($arg),*).await,
        }
    };
}

/// A client authenticated with whatever the scan credentials provide.
pub enum ConnectedClient {
    Token(TokenClient),
    App(AppClient),
}

/// Connects to the GitHub instance at `api_uri` to work on `repo`.
///
/// Anonymous and token access need no round trip, app credentials are
/// exchanged for a token of the installation covering `repo` first.
pub async fn connect(
    api_uri: &Url,
    credential: Option<&Credential>,
    repo: &GithubRepo,
) -> Result<ConnectedClient> {
    match credential {
        None => Ok(ConnectedClient::Token(TokenClient::anonymous(
            api_uri.clone(),
        ))),
        Some(Credential::Token { token }) => Ok(ConnectedClient::Token(TokenClient::new(
            api_uri.clone(),
            token.clone(),
        ))),
        Some(Credential::App {
            app_id,
            private_key,
            ..
        }) => {
            let client = AppClient::connect(api_uri.clone(), *app_id, private_key, repo).await?;
            Ok(ConnectedClient::App(client))
        }
    }
}

#[async_trait::async_trait]
impl GitHubClient for ConnectedClient {
    fn api_uri(&self) -> &Url {
        match self {
            ConnectedClient::Token(cli) => cli.api_uri(),
            ConnectedClient::App(cli) => cli.api_uri(),
        }
    }

    async fn get(&self, end: &str) -> Result<reqwest::Response> {
        dispatch!(self, get(end))
    }
}
