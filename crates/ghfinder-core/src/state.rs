use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    config::{Config, Profile},
    directory::DirectoryStore,
    notification::NotificationStore,
    provider::DirectoryProvider,
    providers::GitHubProvider,
};

/// The two stores, owned by the entry point and handed to whatever view needs them
#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<DirectoryStore>,
    pub notifications: Arc<NotificationStore>,
}

impl AppState {
    pub fn new(provider: Arc<dyn DirectoryProvider>) -> Self {
        Self {
            directory: Arc::new(DirectoryStore::new(provider)),
            notifications: Arc::new(NotificationStore::new()),
        }
    }

    /// Wire up the real GitHub provider, reading credentials for `profile` once
    pub fn from_config(config: &Config, profile: Profile) -> Self {
        let provider =
            GitHubProvider::with_base_url(profile.credentials(), config.github.api_url.clone());

        if provider.is_authenticated() {
            info!("Using {} credentials", profile);
        } else {
            let (id_var, secret_var) = profile.env_vars();
            warn!(
                "No {} credentials ({} / {}); requests will be unauthenticated and heavily rate limited",
                profile, id_var, secret_var
            );
        }

        Self::new(Arc::new(provider))
    }
}
