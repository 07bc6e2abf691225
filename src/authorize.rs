//! Entry points deciding whether a comment author may trigger a build.
//!
//! Every failure on the way to a decision denies. Callers cannot tell a
//! failed lookup from an insufficient permission.

use tracing::Instrument;

use crate::config::Config;
use crate::job::Job;
use crate::permissions::{evaluate, MinimumThreshold, PermissionResolver};
use crate::utils::logging::LogError;

/// Checks whether `author` holds at least `minimum_permissions` on the
/// repository backing `job`.
///
/// The permission is resolved even when the threshold lets everyone through,
/// a job whose repository cannot be resolved is never authorized.
pub async fn is_authorized<R>(
    resolver: &R,
    job: &Job,
    author: &str,
    minimum_permissions: &str,
) -> bool
where
    R: PermissionResolver + ?Sized,
{
    let span = tracing::debug_span!("Authorize", job = %job.full_name, author);
    match check(resolver, job, author, minimum_permissions)
        .instrument(span.clone())
        .await
    {
        Ok(authorized) => {
            tracing::debug!("User {author} authorized: {authorized}");
            authorized
        }
        Err(error) => {
            tracing::debug!(
                "Received an error while trying to check if user {author} is a collaborator for repo of job {}",
                job.full_name
            );
            span.log_error(error);
            false
        }
    }
}

async fn check<R>(
    resolver: &R,
    job: &Job,
    author: &str,
    minimum_permissions: &str,
) -> anyhow::Result<bool>
where
    R: PermissionResolver + ?Sized,
{
    let permission = resolver.resolve_permission(job, author).await?;
    let minimum: MinimumThreshold = minimum_permissions.parse()?;
    Ok(evaluate(permission, minimum))
}

/// Checks `author` against the configured job named `job_name`.
///
/// Unknown jobs are not authorized.
pub async fn authorize_job<R>(
    config: &Config,
    resolver: &R,
    job_name: &str,
    author: &str,
) -> bool
where
    R: PermissionResolver + ?Sized,
{
    let Some(job) = config.job(job_name) else {
        tracing::debug!("No job named {job_name}, denying {author}");
        return false;
    };
    is_authorized(resolver, job, author, config.minimum_permissions_for(job)).await
}
