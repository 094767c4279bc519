// GitHub provider implementation - bridges API client with DirectoryProvider trait
use async_trait::async_trait;
use ghfinder_api::{ClientCredentials, GitHubClient};

use crate::{
    models::{DirectorySearchResult, DirectoryUser, Repository},
    provider::DirectoryProvider,
    Result,
};

/// Wrapper around GitHubClient that implements DirectoryProvider
pub struct GitHubProvider {
    client: GitHubClient,
}

impl GitHubProvider {
    pub fn with_base_url(credentials: Option<ClientCredentials>, base_url: String) -> Self {
        Self {
            client: GitHubClient::with_base_url(credentials, base_url),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.client.has_credentials()
    }
}

#[async_trait]
impl DirectoryProvider for GitHubProvider {
    async fn search_users(&self, query: &str) -> Result<Vec<DirectorySearchResult>> {
        let users = self.client.search_users(query).await?;
        Ok(users.into_iter().map(DirectorySearchResult::from).collect())
    }

    async fn get_user(&self, username: &str) -> Result<DirectoryUser> {
        let user = self.client.get_user(username).await?;
        Ok(DirectoryUser::from(user))
    }

    async fn get_user_repos(&self, username: &str) -> Result<Vec<Repository>> {
        let repos = self.client.get_user_repos(username).await?;
        Ok(repos.into_iter().map(Repository::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authenticated_only_with_credentials() {
        let anonymous = GitHubProvider::with_base_url(None, "http://127.0.0.1:9".to_string());
        assert!(!anonymous.is_authenticated());

        let credentials = ClientCredentials {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
        };
        let registered =
            GitHubProvider::with_base_url(Some(credentials), "http://127.0.0.1:9".to_string());
        assert!(registered.is_authenticated());
    }

    #[tokio::test]
    async fn test_transport_errors_convert_to_core_errors() {
        let provider = GitHubProvider::with_base_url(None, "http://127.0.0.1:9".to_string());
        let result = provider.get_user("octocat").await;
        assert!(matches!(result, Err(crate::Error::NetworkError(_))));
    }
}
