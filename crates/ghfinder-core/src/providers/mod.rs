// Provider implementations for the remote directory
pub mod github;

pub use github::GitHubProvider;
