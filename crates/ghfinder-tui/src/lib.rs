// Terminal UI implementation using ratatui
// The pretty face of ghfinder

pub mod app;
pub mod routes;
pub mod runner;
pub mod ui;

pub use app::{App, InputMode};
pub use routes::Route;
pub use runner::run_tui;
