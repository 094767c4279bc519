use ghfinder_api::{ClientCredentials, GITHUB_API_BASE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
///
/// Loaded once at startup from the config file, then combined with CLI flags.
/// Priority: CLI > File > Defaults. Credentials never live in the file, they
/// come from the environment of whichever profile is active.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

impl Config {
    /// Load config from default location, falling back to defaults if there's no file
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&contents)
                .map_err(|e| crate::Error::ConfigError(format!("Failed to parse config: {}", e)))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to disk
    pub fn save_to(&self, path: &Path) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| crate::Error::ConfigError(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Get the config file path (XDG on Linux, the platform equivalent elsewhere)
    pub fn config_path() -> crate::Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| crate::Error::ConfigError("Could not find config directory".into()))?
            .join("ghfinder");

        Ok(config_dir.join("config.toml"))
    }

    /// Which credential profile wins: the CLI flag, then the file, then the build mode
    pub fn effective_profile(&self, cli_override: Option<Profile>) -> Profile {
        cli_override
            .or(self.github.profile)
            .unwrap_or_else(Profile::for_build)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// API URL (for GitHub Enterprise)
    #[serde(default = "default_github_url")]
    pub api_url: String,

    /// Credential profile to use when the CLI doesn't say
    #[serde(default)]
    pub profile: Option<Profile>,
}

fn default_github_url() -> String {
    GITHUB_API_BASE.to_string()
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: default_github_url(),
            profile: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Title shown in the navbar
    #[serde(default = "default_title")]
    pub title: String,

    /// Enable mouse support in TUI
    #[serde(default = "default_mouse")]
    pub mouse_enabled: bool,
}

fn default_title() -> String {
    "GitHub Finder".to_string()
}

fn default_mouse() -> bool {
    true
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            mouse_enabled: default_mouse(),
        }
    }
}

/// Named credential profiles. Each one reads its own pair of env vars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    Development,
    Production,
}

impl Profile {
    /// Debug builds talk with dev credentials, release builds with prod ones
    pub fn for_build() -> Self {
        if cfg!(debug_assertions) {
            Profile::Development
        } else {
            Profile::Production
        }
    }

    /// (client id var, client secret var)
    pub fn env_vars(&self) -> (&'static str, &'static str) {
        match self {
            Profile::Development => ("DEV_GITHUB_CLIENT_ID", "DEV_GITHUB_CLIENT_SECRET"),
            Profile::Production => ("GITHUB_CLIENT_ID", "GITHUB_CLIENT_SECRET"),
        }
    }

    /// Read this profile's credentials from the process environment
    pub fn credentials(&self) -> Option<ClientCredentials> {
        self.credentials_from(|key| std::env::var(key).ok())
    }

    /// Same as `credentials`, with the lookup injected. Both halves must be
    /// present and non-blank or we go unauthenticated.
    pub fn credentials_from<F>(&self, lookup: F) -> Option<ClientCredentials>
    where
        F: Fn(&str) -> Option<String>,
    {
        let (id_var, secret_var) = self.env_vars();
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Some(ClientCredentials {
            client_id: non_blank(id_var)?,
            client_secret: non_blank(secret_var)?,
        })
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Profile::Development => write!(f, "development"),
            Profile::Production => write!(f, "production"),
        }
    }
}
