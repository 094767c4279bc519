// TUI event loop and terminal management
use crate::{App, InputMode, Route};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind,
        MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ghfinder_core::{AppState, Severity};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// How often we redraw when nothing is happening, so store updates from
/// background requests and expiring alerts show up
const TICK: Duration = Duration::from_millis(100);

pub async fn run_tui(mut app: App, mouse_enabled: bool) -> anyhow::Result<()> {
    // Deep-linked straight into a profile? Kick off the fetch before the first frame
    if let Route::User(login) = app.route.clone() {
        let handle = spawn_profile_fetch(&app.state, login);
        app.track_profile_fetch(handle);
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    if mouse_enabled {
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    } else {
        execute!(stdout, EnterAlternateScreen)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut app).await;

    // Restore terminal even if the loop bailed out
    disable_raw_mode()?;
    if mouse_enabled {
        execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    } else {
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    }
    terminal.show_cursor()?;

    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> anyhow::Result<()> {
    loop {
        terminal.draw(|f| crate::ui::render(f, app))?;

        // crossterm's poll blocks, keep it off the runtime threads doing requests
        let next = tokio::task::block_in_place(|| -> io::Result<Option<Event>> {
            if event::poll(TICK)? {
                event::read().map(Some)
            } else {
                Ok(None)
            }
        })?;

        match next {
            Some(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                handle_key(app, key.code);
            }
            Some(Event::Mouse(mouse)) => match mouse.kind {
                MouseEventKind::ScrollDown => app.scroll_down(),
                MouseEventKind::ScrollUp => app.scroll_up(),
                _ => {}
            },
            _ => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, code: KeyCode) {
    match app.input_mode {
        InputMode::Searching => match code {
            KeyCode::Enter => {
                if let Some(query) = app.submit_search() {
                    spawn_search(&app.state, query);
                }
            }
            KeyCode::Char(c) => {
                app.search_input.push(c);
            }
            KeyCode::Backspace => {
                app.search_input.pop();
            }
            KeyCode::Esc => {
                app.enter_normal_mode();
            }
            _ => {}
        },
        InputMode::Normal => match (app.route.clone(), code) {
            (_, KeyCode::Char('q')) => app.quit(),
            (_, KeyCode::Char('/')) => app.enter_search_mode(),
            (_, KeyCode::Char('a')) => app.navigate(Route::About),
            (_, KeyCode::Char('x')) => app.state.notifications.clear_notification(),
            (_, KeyCode::Char('o')) => open_in_browser(app),
            (Route::Home, KeyCode::Char('j') | KeyCode::Down) => app.next_result(),
            (Route::Home, KeyCode::Char('k') | KeyCode::Up) => app.previous_result(),
            (Route::Home, KeyCode::Char('c')) => {
                if app.can_clear() {
                    app.clear_users();
                }
            }
            (Route::Home, KeyCode::Enter) => {
                if let Some(login) = app.open_selected_user() {
                    let handle = spawn_profile_fetch(&app.state, login);
                    app.track_profile_fetch(handle);
                }
            }
            (Route::User(_), KeyCode::Char('j') | KeyCode::Down) => app.next_repo(),
            (Route::User(_), KeyCode::Char('k') | KeyCode::Up) => app.previous_repo(),
            (_, KeyCode::Esc | KeyCode::Char('h')) => app.navigate(Route::Home),
            _ => {}
        },
    }
}

fn open_in_browser(app: &App) {
    if let Some(url) = app.focused_url() {
        debug!("Opening {}", url);
        if let Err(e) = open::that(&url) {
            app.state
                .notifications
                .set_notification(format!("Failed to open browser: {}", e), Severity::Error);
        }
    }
}

/// Run a search in the background; failures end up as an error alert
fn spawn_search(state: &AppState, query: String) {
    let state = state.clone();
    tokio::spawn(async move {
        if let Err(e) = state.directory.search_users(&query).await {
            state
                .notifications
                .set_notification(format!("Search failed: {}", e), Severity::Error);
        }
    });
}

/// Profile and repositories go out together
fn spawn_profile_fetch(state: &AppState, login: String) -> JoinHandle<()> {
    let state = state.clone();
    tokio::spawn(async move {
        let (user, repos) = tokio::join!(
            state.directory.get_user(&login),
            state.directory.get_user_repos(&login)
        );

        if let Err(e) = user.and(repos) {
            let message = if e.is_not_found() {
                format!("No user named {}", login)
            } else {
                format!("Loading {} failed: {}", login, e)
            };
            state.notifications.set_notification(message, Severity::Error);
        }
    })
}
