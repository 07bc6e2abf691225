//! Resolves collaborator permissions through the GitHub API.

use anyhow::Context;

use super::client::{connect, GitHubClient};
use super::credentials::CredentialStore;
use crate::job::Job;
use crate::permissions::{PermissionLevel, PermissionResolver};

/// Looks a user's permission up on the GitHub repository a job builds.
#[derive(Debug, Clone, Default)]
pub struct GitHubPermissionResolver {
    credentials: CredentialStore,
}

impl GitHubPermissionResolver {
    pub fn new(credentials: CredentialStore) -> Self {
        Self { credentials }
    }
}

#[async_trait::async_trait]
impl PermissionResolver for GitHubPermissionResolver {
    async fn resolve_permission(
        &self,
        job: &Job,
        username: &str,
    ) -> anyhow::Result<PermissionLevel> {
        let source = job.github_source()?;
        let credential = self.credentials.lookup_scan_credentials(
            &source.api_uri,
            source.credentials_id.as_deref(),
            &source.repo_owner,
        )?;
        let repo = source.repo();
        let client = connect(&source.api_uri, credential.as_ref(), &repo)
            .await
            .with_context(|| format!("Could not connect to {}", source.api_uri))?;

        let repository = client.get_repository(&repo).await?;
        let permission = client.get_permission(&repository, username).await?;
        tracing::trace!(
            "{username} has {permission} permission on {}",
            repository.full_name
        );
        Ok(permission)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{header, header_regex, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::authorize::is_authorized;
    use crate::github::client::ApiError;
    use crate::github::credentials::{Credential, CredentialEntry};
    use crate::job::{GitHubScmSource, ScmSource};

    const APP_KEY: &str = include_str!("testdata/app_key.pem");

    async fn github() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/widgets"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "full_name": "octo/widgets" })),
            )
            .mount(&server)
            .await;
        server
    }

    async fn permission_reply(server: &MockServer, user: &str, reply: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(format!(
                "/repos/octo/widgets/collaborators/{user}/permission"
            )))
            .respond_with(reply)
            .mount(server)
            .await;
    }

    fn job(server: &MockServer, credentials_id: Option<&str>) -> Job {
        let mut source = GitHubScmSource::new("octo", "widgets");
        source.api_uri = Url::parse(&server.uri()).unwrap();
        source.credentials_id = credentials_id.map(str::to_owned);
        Job::new("widgets/main", ScmSource::Github(source))
    }

    fn with_token() -> GitHubPermissionResolver {
        let mut credentials = CredentialStore::default();
        credentials.insert(
            "bot",
            CredentialEntry {
                api_uri: None,
                credential: Credential::Token {
                    token: "ghp_secret".to_string(),
                },
            },
        );
        GitHubPermissionResolver::new(credentials)
    }

    fn with_app() -> GitHubPermissionResolver {
        let mut credentials = CredentialStore::default();
        credentials.insert(
            "app",
            CredentialEntry {
                api_uri: None,
                credential: Credential::App {
                    app_id: 42,
                    private_key: APP_KEY.to_string(),
                    owner: Some("octo".to_string()),
                },
            },
        );
        GitHubPermissionResolver::new(credentials)
    }

    #[tokio::test]
    async fn resolves_collaborator_permission() {
        let server = github().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/widgets/collaborators/alice/permission"))
            .and(header("Authorization", "Bearer ghp_secret"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "permission": "write", "role_name": "write" })),
            )
            .mount(&server)
            .await;

        let permission = with_token()
            .resolve_permission(&job(&server, Some("bot")), "alice")
            .await
            .unwrap();
        assert_eq!(permission, PermissionLevel::Write);
    }

    #[tokio::test]
    async fn anonymous_lookup() {
        let server = github().await;
        permission_reply(
            &server,
            "bob",
            ResponseTemplate::new(200).set_body_json(json!({ "permission": "read" })),
        )
        .await;

        let permission = GitHubPermissionResolver::default()
            .resolve_permission(&job(&server, None), "bob")
            .await
            .unwrap();
        assert_eq!(permission, PermissionLevel::Read);
    }

    #[tokio::test]
    async fn unknown_user() {
        let server = github().await;
        permission_reply(&server, "mallory", ResponseTemplate::new(404)).await;

        let error = with_token()
            .resolve_permission(&job(&server, Some("bot")), "mallory")
            .await
            .unwrap_err();
        assert!(matches!(
            error.downcast_ref::<ApiError>(),
            Some(ApiError::UnknownUser { .. })
        ));
    }

    #[tokio::test]
    async fn malformed_permission() {
        let server = github().await;
        permission_reply(
            &server,
            "carol",
            ResponseTemplate::new(200).set_body_json(json!({ "permission": "triage" })),
        )
        .await;

        let error = with_token()
            .resolve_permission(&job(&server, Some("bot")), "carol")
            .await
            .unwrap_err();
        assert_eq!(error.to_string(), r#"Unknown permission level "triage""#);
    }

    #[tokio::test]
    async fn missing_repository() {
        let server = MockServer::start().await;
        let error = with_token()
            .resolve_permission(&job(&server, Some("bot")), "alice")
            .await
            .unwrap_err();
        assert_eq!(error.to_string(), "Repository octo/widgets not found");
    }

    #[tokio::test]
    async fn missing_credentials() {
        let server = github().await;
        let error = GitHubPermissionResolver::default()
            .resolve_permission(&job(&server, Some("bot")), "alice")
            .await
            .unwrap_err();
        assert!(error.to_string().starts_with("No credentials bot for "));
    }

    #[tokio::test]
    async fn app_uses_installation_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/widgets/installation"))
            .and(header_regex("Authorization", "^Bearer ey"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "id": 7, "account": { "login": "octo" } })),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/app/installations/7/access_tokens"))
            .and(header_regex("Authorization", "^Bearer ey"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "token": "ghs_installation",
                "expires_at": "2030-01-01T00:00:00Z"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/widgets"))
            .and(header("Authorization", "Bearer ghs_installation"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "full_name": "octo/widgets" })),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/widgets/collaborators/alice/permission"))
            .and(header("Authorization", "Bearer ghs_installation"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "permission": "admin" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let permission = with_app()
            .resolve_permission(&job(&server, Some("app")), "alice")
            .await
            .unwrap();
        assert_eq!(permission, PermissionLevel::Admin);
    }

    #[tokio::test]
    async fn app_not_installed_denies() {
        let server = github().await;
        Mock::given(method("POST"))
            .and(path("/app/installations/7/access_tokens"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;
        permission_reply(
            &server,
            "alice",
            ResponseTemplate::new(200).set_body_json(json!({ "permission": "admin" })),
        )
        .await;

        let resolver = with_app();
        let job = job(&server, Some("app"));
        let error = resolver.resolve_permission(&job, "alice").await.unwrap_err();
        assert_eq!(
            format!("{error:#}"),
            format!(
                "Could not connect to {}: App 42 is not installed on octo/widgets",
                job.github_source().unwrap().api_uri
            )
        );
        assert!(!is_authorized(&resolver, &job, "alice", "NONE").await);
    }
}
