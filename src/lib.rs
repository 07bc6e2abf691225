//! Decides whether a GitHub user may trigger a build from a pull request comment.
//!
//! The check compares the user's collaborator permission on the repository
//! backing a job with a configured minimum. Any failure while resolving that
//! permission denies the request.
pub mod authorize;
pub mod config;
pub mod github;
pub mod job;
pub mod permissions;
pub mod utils;

pub use authorize::{authorize_job, is_authorized};
pub use config::Config;
pub use github::resolver::GitHubPermissionResolver;
pub use job::{Job, ScmSource};
pub use permissions::{evaluate, MinimumThreshold, PermissionLevel, PermissionResolver};
