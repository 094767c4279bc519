// Core of ghfinder - the stores, the models they hold and where they get them from
pub mod config;
pub mod directory;
pub mod error;
pub mod models;
pub mod notification;
pub mod provider;
pub mod providers;
pub mod state;

pub use config::{Config, Profile};
pub use directory::{DirectoryAction, DirectoryState, DirectoryStore, RequestKind, REPOS_PAGE_SIZE};
pub use error::Error;
pub use models::{DirectorySearchResult, DirectoryUser, Repository};
pub use notification::{Notification, NotificationStore, Severity, NOTIFICATION_TIMEOUT};
pub use provider::DirectoryProvider;
pub use state::AppState;

/// Result type alias because typing Result<T, Error> everywhere is tedious
pub type Result<T> = std::result::Result<T, Error>;
