use crate::{
    models::{DirectorySearchResult, DirectoryUser, Repository},
    Result,
};

/// The remote directory, as far as the stores are concerned
///
/// GitHubProvider is the real one. Tests swap in mocks so the stores can be
/// exercised without a network.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait DirectoryProvider: Send + Sync {
    async fn search_users(&self, query: &str) -> Result<Vec<DirectorySearchResult>>;
    async fn get_user(&self, username: &str) -> Result<DirectoryUser>;
    /// At most one page, oldest-created first
    async fn get_user_repos(&self, username: &str) -> Result<Vec<Repository>>;
}
