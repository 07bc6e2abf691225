//! Access to repositories hosted on GitHub.
pub mod client;
pub mod credentials;
pub mod resolver;

use std::fmt;

/// Public GitHub REST API.
pub const API_ENDPOINT: &str = "https://api.github.com";

/// Repository identified by `owner/name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GithubRepo {
    pub owner: String,
    pub name: String,
}

impl GithubRepo {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for GithubRepo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
