// GitHub REST client - the only thing in here that talks to the network
pub mod github;

// Re-export common types
pub use github::{
    ClientCredentials, GitHubClient, GitHubError, GitHubRepo, GitHubSearchUser, GitHubUser,
    GITHUB_API_BASE, REPOS_PAGE_SIZE,
};
