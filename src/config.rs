use std::path::Path;

use anyhow::Context;

use crate::github::credentials::CredentialStore;
use crate::github::resolver::GitHubPermissionResolver;
use crate::job::Job;

/// Minimum permission used when neither the config nor the job sets one.
pub const DEFAULT_MINIMUM_PERMISSIONS: &str = "WRITE";

/// Configuration loaded from a TOML file.
#[derive(serde::Deserialize, Debug)]
pub struct Config {
    /// Lowest collaborator permission allowed to trigger builds.
    ///
    /// Kept as written, it is parsed on every check so that a bad value
    /// denies instead of failing the load.
    #[serde(default = "default_minimum_permissions")]
    pub minimum_permissions: String,
    /// Credentials by id, referenced from job SCM sources.
    #[serde(default)]
    pub credentials: CredentialStore,
    #[serde(default)]
    pub jobs: Vec<Job>,
}

fn default_minimum_permissions() -> String {
    DEFAULT_MINIMUM_PERMISSIONS.to_string()
}

impl Config {
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        toml::from_str(content).context("Could not parse configuration")
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        Self::from_toml(&content)
    }

    pub fn job(&self, full_name: &str) -> Option<&Job> {
        self.jobs.iter().find(|job| job.full_name == full_name)
    }

    /// The job's own minimum permission, or the configured default.
    pub fn minimum_permissions_for<'a>(&'a self, job: &'a Job) -> &'a str {
        job.minimum_permissions
            .as_deref()
            .unwrap_or(&self.minimum_permissions)
    }

    pub fn resolver(&self) -> GitHubPermissionResolver {
        GitHubPermissionResolver::new(self.credentials.clone())
    }
}
