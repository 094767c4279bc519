use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const GITHUB_API_BASE: &str = "https://api.github.com";

/// How many repositories we ask for per user. Fixed, no paging past this.
pub const REPOS_PAGE_SIZE: u32 = 5;

#[derive(Error, Debug)]
pub enum GitHubError {
    #[error("API request failed with status {status}: {body}")]
    RequestFailed { status: u16, body: String },

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    ParseError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GitHubError>;

/// OAuth app credentials sent as `client_id` / `client_secret` query params
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

pub struct GitHubClient {
    client: reqwest::Client,
    credentials: Option<ClientCredentials>,
    base_url: String,
}

impl GitHubClient {
    pub fn new(credentials: Option<ClientCredentials>) -> Self {
        Self::with_base_url(credentials, GITHUB_API_BASE.to_string())
    }

    /// For GitHub Enterprise or a local test server
    pub fn with_base_url(credentials: Option<ClientCredentials>, base_url: String) -> Self {
        let mut headers = reqwest::header::HeaderMap::new();
        // GitHub rejects requests that don't send a user agent
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("ghfinder/0.1.0"),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/vnd.github+json"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            credentials,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    /// Search the user directory. Items come back in GitHub's relevance order.
    pub async fn search_users(&self, query: &str) -> Result<Vec<GitHubSearchUser>> {
        let response: SearchUsersResponse = self
            .send(self.search_users_request(query), query)
            .await?;
        debug!(
            "Search for '{}' matched {} users, returned {}",
            query,
            response.total_count,
            response.items.len()
        );
        Ok(response.items)
    }

    /// Fetch the full profile of a single user
    pub async fn get_user(&self, username: &str) -> Result<GitHubUser> {
        self.send(self.get_user_request(username), username).await
    }

    /// Fetch a user's repositories, oldest-created first, at most one page
    pub async fn get_user_repos(&self, username: &str) -> Result<Vec<GitHubRepo>> {
        let repos: Vec<GitHubRepo> = self
            .send(self.get_user_repos_request(username), username)
            .await?;
        debug!("Fetched {} repositories for {}", repos.len(), username);
        Ok(repos)
    }

    fn search_users_request(&self, query: &str) -> reqwest::RequestBuilder {
        self.get("/search/users").query(&[("q", query)])
    }

    fn get_user_request(&self, username: &str) -> reqwest::RequestBuilder {
        self.get(&format!("/users/{}", urlencoding::encode(username)))
    }

    fn get_user_repos_request(&self, username: &str) -> reqwest::RequestBuilder {
        self.get(&format!("/users/{}/repos", urlencoding::encode(username)))
            .query(&[
                ("per_page", REPOS_PAGE_SIZE.to_string().as_str()),
                ("sort", "created"),
                ("direction", "asc"),
            ])
    }

    /// GET against the API with credentials attached when we have them
    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        let request = self.client.get(format!("{}{}", self.base_url, path));

        match &self.credentials {
            Some(creds) => request.query(&[
                ("client_id", creds.client_id.as_str()),
                ("client_secret", creds.client_secret.as_str()),
            ]),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        subject: &str,
    ) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();
        debug!("GET {} -> {}", response.url().path(), status);

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(GitHubError::NotFound(subject.to_string()));
        }

        if is_rate_limited(status, response.headers()) {
            return Err(GitHubError::RateLimitExceeded);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GitHubError::RequestFailed {
                status: status.as_u16(),
                body,
            });
        }

        // Read the body first so a schema mismatch shows up as a parse error
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// GitHub signals an exhausted quota with 429, or 403 plus a zero remaining count
fn is_rate_limited(status: reqwest::StatusCode, headers: &reqwest::header::HeaderMap) -> bool {
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return true;
    }

    status == reqwest::StatusCode::FORBIDDEN
        && headers
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim() == "0")
            .unwrap_or(false)
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchUsersResponse {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub incomplete_results: bool,
    pub items: Vec<GitHubSearchUser>,
}

/// Summary form of a user as returned by `/search/users`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubSearchUser {
    pub id: u64,
    pub login: String,
    pub avatar_url: String,
    pub html_url: String,
}

/// Full profile from `/users/{username}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubUser {
    pub id: u64,
    pub login: String,
    pub avatar_url: String,
    pub html_url: String,
    #[serde(rename = "type", default)]
    pub account_type: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub blog: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub twitter_username: Option<String>,
    #[serde(default)]
    pub hireable: Option<bool>,
    #[serde(default)]
    pub public_repos: u32,
    #[serde(default)]
    pub public_gists: u32,
    #[serde(default)]
    pub followers: u32,
    #[serde(default)]
    pub following: u32,
}

/// Repository as listed by `/users/{username}/repos`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubRepo {
    pub id: u64,
    pub name: String,
    pub html_url: String,
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}
