//! Credentials used to talk to the GitHub API.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;
use url::Url;

/// Secret used to authenticate against the GitHub API.
#[derive(serde::Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Credential {
    /// Personal access token.
    Token { token: String },
    /// GitHub App, authenticated as its installation on the scanned repository.
    /// When `owner` is set, only that owner's repositories may use it.
    App {
        app_id: u64,
        private_key: String,
        #[serde(default)]
        owner: Option<String>,
    },
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Credential::Token { .. } => f.debug_struct("Token").finish_non_exhaustive(),
            Credential::App { app_id, owner, .. } => f
                .debug_struct("App")
                .field("app_id", app_id)
                .field("owner", owner)
                .finish_non_exhaustive(),
        }
    }
}

/// A stored credential, optionally restricted to one API endpoint.
#[derive(serde::Deserialize, Debug, Clone)]
pub struct CredentialEntry {
    #[serde(default)]
    pub api_uri: Option<Url>,
    #[serde(flatten)]
    pub credential: Credential,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CredentialError {
    #[error("No credentials {id} for {api_uri}")]
    NotFound { id: String, api_uri: String },
    #[error("Credentials {id} are restricted to owner {expected}, not {actual}")]
    OwnerMismatch {
        id: String,
        expected: String,
        actual: String,
    },
}

/// Credentials by id.
#[derive(serde::Deserialize, Debug, Clone, Default)]
#[serde(transparent)]
pub struct CredentialStore(HashMap<String, CredentialEntry>);

impl CredentialStore {
    pub fn insert(&mut self, id: impl Into<String>, entry: CredentialEntry) {
        self.0.insert(id.into(), entry);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Finds the credential a job scans `repo_owner`'s repositories with.
    ///
    /// Returns `None` when the job has no credentials configured, which means
    /// anonymous access. App credentials restricted to an owner only match
    /// that owner's repositories.
    pub fn lookup_scan_credentials(
        &self,
        api_uri: &Url,
        credentials_id: Option<&str>,
        repo_owner: &str,
    ) -> Result<Option<Credential>, CredentialError> {
        let Some(id) = credentials_id else {
            return Ok(None);
        };
        let not_found = || CredentialError::NotFound {
            id: id.to_owned(),
            api_uri: api_uri.to_string(),
        };
        let entry = self.0.get(id).ok_or_else(not_found)?;
        if entry
            .api_uri
            .as_ref()
            .is_some_and(|uri| !same_endpoint(uri, api_uri))
        {
            return Err(not_found());
        }

        match &entry.credential {
            Credential::Token { .. } => Ok(Some(entry.credential.clone())),
            Credential::App { owner, .. } => {
                if let Some(expected) = owner {
                    if !expected.eq_ignore_ascii_case(repo_owner) {
                        return Err(CredentialError::OwnerMismatch {
                            id: id.to_owned(),
                            expected: expected.clone(),
                            actual: repo_owner.to_owned(),
                        });
                    }
                }
                Ok(Some(entry.credential.clone()))
            }
        }
    }
}

/// Endpoints match regardless of a trailing `/`.
fn same_endpoint(a: &Url, b: &Url) -> bool {
    a.as_str().trim_end_matches('/') == b.as_str().trim_end_matches('/')
}
