//! Collaborator permission levels and the rule deciding whether a level
//! satisfies a configured minimum.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::job::Job;

/// Access tier GitHub assigns a user on a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PermissionLevel {
    None,
    /// Never satisfies a threshold above `None`.
    Read,
    Write,
    Admin,
}

/// Lowest permission level that counts as authorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MinimumThreshold {
    /// Anyone is authorized.
    None,
    /// Collaborators with push access.
    Write,
    /// Repository administrators only.
    Admin,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PermissionError {
    #[error("Unknown permission level {0:?}")]
    Unknown(String),
}

const LEVELS: [PermissionLevel; 4] = [
    PermissionLevel::None,
    PermissionLevel::Read,
    PermissionLevel::Write,
    PermissionLevel::Admin,
];

impl PermissionLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionLevel::None => "NONE",
            PermissionLevel::Read => "READ",
            PermissionLevel::Write => "WRITE",
            PermissionLevel::Admin => "ADMIN",
        }
    }

    /// Parses the `permission` field of GitHub's collaborator permission
    /// response, which spells levels in lowercase.
    pub fn from_api_name(name: &str) -> Result<Self, PermissionError> {
        LEVELS
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| PermissionError::Unknown(name.to_owned()))
    }
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PermissionLevel {
    type Err = PermissionError;

    /// Only the exact uppercase names are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LEVELS
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| PermissionError::Unknown(s.to_owned()))
    }
}

impl From<PermissionLevel> for MinimumThreshold {
    /// Levels without a threshold of their own are treated as `Write`.
    fn from(level: PermissionLevel) -> Self {
        match level {
            PermissionLevel::None => MinimumThreshold::None,
            PermissionLevel::Admin => MinimumThreshold::Admin,
            PermissionLevel::Write => MinimumThreshold::Write,
            PermissionLevel::Read => {
                tracing::warn!("{level} is not a minimum permission, falling back to WRITE");
                MinimumThreshold::Write
            }
        }
    }
}

impl FromStr for MinimumThreshold {
    type Err = PermissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<PermissionLevel>().map(MinimumThreshold::from)
    }
}

/// Decides whether `actual` satisfies `minimum`.
pub fn evaluate(actual: PermissionLevel, minimum: MinimumThreshold) -> bool {
    match minimum {
        MinimumThreshold::None => true,
        MinimumThreshold::Write => {
            matches!(actual, PermissionLevel::Write | PermissionLevel::Admin)
        }
        MinimumThreshold::Admin => actual == PermissionLevel::Admin,
    }
}

/// Resolves the permission a GitHub user holds on the repository of a job.
#[async_trait::async_trait]
pub trait PermissionResolver {
    async fn resolve_permission(&self, job: &Job, username: &str)
        -> anyhow::Result<PermissionLevel>;
}
