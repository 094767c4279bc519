use chrono::{DateTime, Utc};
use ghfinder_api::{GitHubRepo, GitHubSearchUser, GitHubUser};
use serde::{Deserialize, Serialize};

/// Full profile of a directory user - what the user view renders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryUser {
    pub id: u64,
    pub login: String,
    pub avatar_url: String,
    pub profile_url: String,
    /// "User" or "Organization"
    pub account_type: Option<String>,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub blog: Option<String>,
    pub email: Option<String>,
    pub twitter_handle: Option<String>,
    pub hireable: Option<bool>,
    pub public_repos: u32,
    pub public_gists: u32,
    pub followers: u32,
    pub following: u32,
}

/// Summary form of a user, as it comes back from a search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectorySearchResult {
    pub id: u64,
    pub login: String,
    pub avatar_url: String,
    pub profile_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub url: String,
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl DirectoryUser {
    /// Name if the user set one, login otherwise
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.login)
    }
}

impl From<GitHubUser> for DirectoryUser {
    fn from(gh: GitHubUser) -> Self {
        Self {
            id: gh.id,
            login: gh.login,
            avatar_url: gh.avatar_url,
            profile_url: gh.html_url,
            account_type: gh.account_type,
            name: gh.name,
            bio: gh.bio,
            company: gh.company,
            location: gh.location,
            blog: gh.blog.filter(|b| !b.is_empty()), // GitHub sends "" for no blog
            email: gh.email,
            twitter_handle: gh.twitter_username,
            hireable: gh.hireable,
            public_repos: gh.public_repos,
            public_gists: gh.public_gists,
            followers: gh.followers,
            following: gh.following,
        }
    }
}

impl From<GitHubSearchUser> for DirectorySearchResult {
    fn from(gh: GitHubSearchUser) -> Self {
        Self {
            id: gh.id,
            login: gh.login,
            avatar_url: gh.avatar_url,
            profile_url: gh.html_url,
        }
    }
}

impl From<GitHubRepo> for Repository {
    fn from(gh: GitHubRepo) -> Self {
        Self {
            id: gh.id,
            name: gh.name,
            url: gh.html_url,
            description: gh.description,
            created_at: gh.created_at,
        }
    }
}
