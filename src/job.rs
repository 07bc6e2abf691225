//! Build jobs and the source control backing them.

use thiserror::Error;
use url::Url;

use crate::github::{GithubRepo, API_ENDPOINT};

/// A build job whose pull request comments may trigger builds.
#[derive(serde::Deserialize, Debug, Clone)]
pub struct Job {
    /// Full name of the job, e.g. `widgets/main`.
    pub full_name: String,
    #[serde(default)]
    pub scm: Option<ScmSource>,
    /// Overrides the configured minimum permission for this job.
    #[serde(default)]
    pub minimum_permissions: Option<String>,
}

/// Where a job gets its sources from.
#[derive(serde::Deserialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScmSource {
    Github(GitHubScmSource),
    /// A plain git remote, no permission information is available.
    Git { remote: String },
}

/// A repository hosted on GitHub or GitHub Enterprise.
#[derive(serde::Deserialize, Debug, Clone)]
pub struct GitHubScmSource {
    #[serde(default = "default_api_uri")]
    pub api_uri: Url,
    /// Credentials used to scan the repository, anonymous when unset.
    #[serde(default)]
    pub credentials_id: Option<String>,
    pub repo_owner: String,
    pub repository: String,
}

#[derive(Error, Debug)]
pub enum ScmError {
    #[error("Job {0} has no SCM source.")]
    NoSource(String),
    #[error("Job's SCM is not GitHub.")]
    NotGitHub,
}

fn default_api_uri() -> Url {
    Url::parse(API_ENDPOINT).expect("GitHub API endpoint is a valid URL")
}

impl Job {
    pub fn new(full_name: impl Into<String>, scm: ScmSource) -> Self {
        Self {
            full_name: full_name.into(),
            scm: Some(scm),
            minimum_permissions: None,
        }
    }

    /// Returns the GitHub source of this job.
    pub fn github_source(&self) -> Result<&GitHubScmSource, ScmError> {
        match &self.scm {
            Some(ScmSource::Github(source)) => Ok(source),
            Some(_) => Err(ScmError::NotGitHub),
            None => Err(ScmError::NoSource(self.full_name.clone())),
        }
    }
}

impl GitHubScmSource {
    pub fn new(repo_owner: impl Into<String>, repository: impl Into<String>) -> Self {
        Self {
            api_uri: default_api_uri(),
            credentials_id: None,
            repo_owner: repo_owner.into(),
            repository: repository.into(),
        }
    }

    pub fn repo(&self) -> GithubRepo {
        GithubRepo::new(&self.repo_owner, &self.repository)
    }
}
