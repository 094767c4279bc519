use clap::{Parser, ValueEnum};
use ghfinder_core::{AppState, Config, DirectoryUser, Profile, Repository};
use ghfinder_tui::{App, Route};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ghfinder")]
#[command(version, about = "Search GitHub users and peek at their first repositories", long_about = None)]
struct Cli {
    /// Credential profile (defaults to the config file, then the build mode)
    #[arg(long, value_enum, global = true)]
    profile: Option<ProfileArg>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ProfileArg {
    Development,
    Production,
}

impl From<ProfileArg> for Profile {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::Development => Profile::Development,
            ProfileArg::Production => Profile::Production,
        }
    }
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Interactive terminal UI (the default)
    Tui {
        /// Start on this page, e.g. /about or /user/octocat
        #[arg(long)]
        route: Option<String>,
    },
    /// Search for users
    Search {
        /// Search query
        query: String,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show a user's profile and first-created repositories
    User {
        /// GitHub login
        login: String,
        #[arg(long)]
        json: bool,
    },
    /// Show where config lives and which credentials are in use
    Config {
        /// Write a default config file if there isn't one
        #[arg(long)]
        init: bool,
    },
}

#[derive(Serialize)]
struct UserReport<'a> {
    user: &'a DirectoryUser,
    repos: &'a [Repository],
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let interactive = matches!(cli.command, None | Some(Commands::Tui { .. }));
    init_logging(interactive);

    let config = Config::load()?;
    let profile = config.effective_profile(cli.profile.map(Profile::from));
    tracing::debug!("Profile {} against {}", profile, config.github.api_url);

    match cli.command {
        None => run_interactive(&config, profile, None).await,
        Some(Commands::Tui { route }) => run_interactive(&config, profile, route).await,
        Some(Commands::Search { query, json }) => search(&config, profile, &query, json).await,
        Some(Commands::User { login, json }) => show_user(&config, profile, &login, json).await,
        Some(Commands::Config { init }) => show_config(&config, profile, init),
    }
}

/// Logs go to stderr. The TUI owns the terminal, so there we only log when
/// RUST_LOG asks for it.
fn init_logging(interactive: bool) {
    let from_env = tracing_subscriber::EnvFilter::try_from_default_env();
    if interactive && from_env.is_err() {
        return;
    }

    tracing_subscriber::registry()
        .with(from_env.unwrap_or_else(|_| "ghfinder=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run_interactive(
    config: &Config,
    profile: Profile,
    route: Option<String>,
) -> anyhow::Result<()> {
    let state = AppState::from_config(config, profile);
    let mut app = App::new(state, config.ui.title.clone());

    if let Some(path) = route {
        let route = Route::parse(&path);
        if route == Route::Home {
            app.enter_search_mode();
        } else {
            app.navigate(route);
        }
    }

    ghfinder_tui::run_tui(app, config.ui.mouse_enabled).await
}

async fn search(config: &Config, profile: Profile, query: &str, json: bool) -> anyhow::Result<()> {
    if query.trim().is_empty() {
        anyhow::bail!("Please enter something to search for");
    }

    let state = AppState::from_config(config, profile);
    state.directory.search_users(query).await?;
    let users = state.directory.snapshot().users;

    if json {
        println!("{}", serde_json::to_string_pretty(&users)?);
        return Ok(());
    }

    if users.is_empty() {
        println!("No users found for '{}'", query);
        return Ok(());
    }

    for user in &users {
        println!("{:<30} {}", user.login, user.profile_url);
    }
    Ok(())
}

async fn show_user(
    config: &Config,
    profile: Profile,
    login: &str,
    json: bool,
) -> anyhow::Result<()> {
    let state = AppState::from_config(config, profile);

    let (user, repos) = tokio::join!(
        state.directory.get_user(login),
        state.directory.get_user_repos(login)
    );
    user?;
    repos?;

    let snapshot = state.directory.snapshot();
    let Some(user) = snapshot.user.as_ref() else {
        anyhow::bail!("No profile came back for {}", login);
    };
    let repos = snapshot.repos();

    if json {
        let report = UserReport { user, repos };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{} ({})", user.display_name(), user.login);
    if let Some(bio) = &user.bio {
        println!("  {}", bio);
    }
    let details = [
        ("Company", user.company.as_deref()),
        ("Location", user.location.as_deref()),
        ("Website", user.blog.as_deref()),
        ("Email", user.email.as_deref()),
        ("Twitter", user.twitter_handle.as_deref()),
    ];
    for (label, value) in details {
        if let Some(value) = value {
            println!("  {:<10}{}", label, value);
        }
    }
    println!(
        "  Hireable: {}",
        if user.hireable == Some(true) { "yes" } else { "no" }
    );
    println!(
        "  Followers: {}  Following: {}  Public repos: {}  Public gists: {}",
        user.followers, user.following, user.public_repos, user.public_gists
    );
    println!("  {}", user.profile_url);

    println!();
    println!("Repositories (first created):");
    if repos.is_empty() {
        println!("  (none)");
    }
    for repo in repos {
        println!("  {:<30} {}", repo.name, repo.url);
        if let Some(description) = &repo.description {
            println!("    {}", description);
        }
    }

    Ok(())
}

fn show_config(config: &Config, profile: Profile, init: bool) -> anyhow::Result<()> {
    let path = Config::config_path()?;

    if init && !path.exists() {
        config.save_to(&path)?;
        println!("Wrote default config to {}", path.display());
    }

    let (id_var, secret_var) = profile.env_vars();
    println!("Config file: {}", path.display());
    println!("API URL:     {}", config.github.api_url);
    println!("Profile:     {}", profile);
    println!(
        "Credentials: {} ({} / {})",
        if profile.credentials().is_some() { "found" } else { "missing" },
        id_var,
        secret_var
    );

    Ok(())
}
