// UI rendering logic
use crate::{App, InputMode, Route};
use ghfinder_core::{DirectoryState, DirectoryUser, Notification, Severity};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

pub fn render(frame: &mut Frame, app: &mut App) {
    // Snapshot both stores once per frame so everything drawn agrees
    let directory = app.state.directory.snapshot();
    let notification = app.state.notifications.current();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),                                         // Navbar
            Constraint::Length(if notification.is_some() { 3 } else { 0 }), // Alert
            Constraint::Min(5),                                            // Page
            Constraint::Length(1),                                         // Status bar
        ])
        .split(frame.area());

    render_navbar(frame, app, chunks[0]);

    if let Some(notification) = &notification {
        render_alert(frame, notification, chunks[1]);
    }

    match app.route.clone() {
        Route::Home => render_home(frame, app, &directory, chunks[2]),
        Route::About => render_about(frame, chunks[2]),
        Route::User(login) => render_user_page(frame, app, &directory, &login, chunks[2]),
        Route::NotFound(path) => render_not_found(frame, &path, chunks[2]),
    }

    render_status_bar(frame, app, &directory, chunks[3]);
}

fn render_navbar(frame: &mut Frame, app: &App, area: Rect) {
    let tab = |label: &'static str, active: bool| {
        if active {
            Span::styled(
                format!(" {} ", label),
                Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled(format!(" {} ", label), Style::default().fg(Color::Gray))
        }
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", app.title),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw("   "),
        tab("Home", app.route == Route::Home),
        Span::raw(" "),
        tab("About", app.route == Route::About),
        Span::raw("   "),
        Span::styled(app.route.path(), Style::default().fg(Color::DarkGray)),
    ]);

    let navbar = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    frame.render_widget(navbar, area);
}

fn severity_style(severity: &Severity) -> Style {
    match severity {
        Severity::Light => Style::default().fg(Color::Black).bg(Color::Gray),
        Severity::Info => Style::default().fg(Color::Black).bg(Color::Cyan),
        Severity::Warning => Style::default().fg(Color::Black).bg(Color::Yellow),
        Severity::Error => Style::default().fg(Color::White).bg(Color::Red),
        Severity::Other(_) => Style::default().fg(Color::White).bg(Color::DarkGray),
    }
}

fn render_alert(frame: &mut Frame, notification: &Notification, area: Rect) {
    let style = severity_style(&notification.severity);
    let alert = Paragraph::new(Line::from(vec![
        Span::styled(" ⓘ ", style.add_modifier(Modifier::BOLD)),
        Span::styled(notification.message.as_str(), style),
    ]))
    .style(style)
    .block(Block::default().borders(Borders::ALL).border_style(style));
    frame.render_widget(alert, area);
}

fn render_home(frame: &mut Frame, app: &mut App, directory: &DirectoryState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    render_search_input(frame, app, chunks[0]);

    // The list gives way to a spinner while anything is loading
    if directory.loading {
        render_loading(frame, " Users ", chunks[1]);
        return;
    }

    let items: Vec<ListItem> = directory
        .users
        .iter()
        .enumerate()
        .map(|(i, user)| {
            let name_style = if i == app.selected_index {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            };
            ListItem::new(vec![
                Line::from(Span::styled(user.login.as_str(), name_style)),
                Line::from(Span::styled(
                    format!("  {}", user.profile_url),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();

    let title = if directory.users.is_empty() {
        " Users ".to_string()
    } else {
        format!(" Users ({}) - c to clear ", directory.users.len())
    };

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_symbol("▶ ");
    frame.render_stateful_widget(list, chunks[1], &mut app.list_state);
}

fn render_search_input(frame: &mut Frame, app: &App, area: Rect) {
    let input_style = match app.input_mode {
        InputMode::Searching => Style::default().fg(Color::Yellow),
        InputMode::Normal => Style::default(),
    };

    let input = Paragraph::new(app.search_input.as_str())
        .style(input_style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Search Users (ESC to navigate, / to search)")
                .border_style(input_style),
        );

    frame.render_widget(input, area);

    if app.input_mode == InputMode::Searching {
        // Stay inside the borders however long the input gets
        let typed = app.search_input.chars().count();
        let offset = typed.min(area.width.saturating_sub(2) as usize) as u16;
        frame.set_cursor_position((
            area.x.saturating_add(offset).saturating_add(1),
            area.y.saturating_add(1),
        ));
    }
}

fn render_loading(frame: &mut Frame, title: &str, area: Rect) {
    let loading_text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Loading...",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
    ];
    let paragraph = Paragraph::new(loading_text)
        .block(Block::default().borders(Borders::ALL).title(title.to_string()))
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

fn render_user_page(
    frame: &mut Frame,
    app: &mut App,
    directory: &DirectoryState,
    login: &str,
    area: Rect,
) {
    let user = directory
        .user
        .as_ref()
        .filter(|u| u.login.eq_ignore_ascii_case(login));

    let user = match user {
        Some(user) => user,
        None if directory.loading || app.profile_pending() => {
            render_loading(frame, " Profile ", area);
            return;
        }
        None => {
            let message = Paragraph::new(format!("Could not load {}", login))
                .block(Block::default().borders(Borders::ALL).title(" Profile "))
                .alignment(Alignment::Center);
            frame.render_widget(message, area);
            return;
        }
    };

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    render_profile(frame, user, chunks[0]);

    let repos = directory.repos();
    let items: Vec<ListItem> = repos
        .iter()
        .map(|repo| {
            let created = repo
                .created_at
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default();
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(
                        repo.name.as_str(),
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw("  "),
                    Span::styled(created, Style::default().fg(Color::DarkGray)),
                ]),
                Line::from(Span::styled(
                    format!("  {}", repo.description.as_deref().unwrap_or("No description")),
                    Style::default().fg(Color::Gray),
                )),
            ])
        })
        .collect();

    let title = if directory.loading && repos.is_empty() {
        " Repositories (loading...) ".to_string()
    } else {
        format!(" Repositories, first created ({}) ", repos.len())
    };

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_symbol("▶ ");
    frame.render_stateful_widget(list, chunks[1], &mut app.repo_list_state);
}

fn render_profile(frame: &mut Frame, user: &DirectoryUser, area: Rect) {
    let label = Style::default().fg(Color::DarkGray);
    let value = Style::default().fg(Color::White);

    let hireable = match user.hireable {
        Some(true) => Span::styled("✓ Hireable", Style::default().fg(Color::Green)),
        _ => Span::styled("✗ Not hireable", Style::default().fg(Color::Red)),
    };

    let mut lines = vec![
        Line::from(Span::styled(
            user.display_name().to_string(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(hireable),
        Line::from(""),
    ];

    if let Some(bio) = &user.bio {
        lines.push(Line::from(Span::styled("Bio", label)));
        lines.push(Line::from(Span::styled(bio.as_str(), value)));
        lines.push(Line::from(""));
    }

    let fields = [
        ("Username", Some(user.login.as_str())),
        ("Type", user.account_type.as_deref()),
        ("Company", user.company.as_deref()),
        ("Location", user.location.as_deref()),
        ("Website", user.blog.as_deref()),
        ("Email", user.email.as_deref()),
        ("Twitter", user.twitter_handle.as_deref()),
    ];
    for (name, field) in fields {
        if let Some(field) = field {
            lines.push(Line::from(vec![
                Span::styled(format!("{:<10}", name), label),
                Span::styled(field.to_string(), value),
            ]));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled(
            format!(" Followers: {} ", user.followers),
            Style::default().fg(Color::Black).bg(Color::Red),
        ),
        Span::raw(" "),
        Span::styled(
            format!(" Following: {} ", user.following),
            Style::default().fg(Color::Black).bg(Color::Green),
        ),
    ]));
    lines.push(Line::from(vec![
        Span::styled(
            format!(" Public Repos: {} ", user.public_repos),
            Style::default().fg(Color::Black).bg(Color::Gray),
        ),
        Span::raw(" "),
        Span::styled(
            format!(" Public Gists: {} ", user.public_gists),
            Style::default().fg(Color::Black).bg(Color::Blue),
        ),
    ]));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(user.profile_url.as_str(), label)));

    let profile = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Profile "))
        .wrap(Wrap { trim: true });
    frame.render_widget(profile, area);
}

fn render_about(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(Span::styled(
            "About This App",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Search GitHub users and see the first repositories each one created."),
        Line::from(""),
        Line::from(format!("Version: {}", env!("CARGO_PKG_VERSION"))),
    ];
    let about = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" About "))
        .wrap(Wrap { trim: true });
    frame.render_widget(about, area);
}

fn render_not_found(frame: &mut Frame, path: &str, area: Rect) {
    let message = Paragraph::new(vec![
        Line::from(Span::styled(
            "Not Found",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(format!("Nothing lives at {}", path)),
    ])
    .block(Block::default().borders(Borders::ALL))
    .alignment(Alignment::Center);
    frame.render_widget(message, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, directory: &DirectoryState, area: Rect) {
    let hints = match (&app.route, app.input_mode) {
        (Route::Home, InputMode::Searching) => "Enter: search | Esc: navigate",
        (Route::Home, InputMode::Normal) if !directory.users.is_empty() => {
            "/: search | j/k: move | Enter: open | c: clear | o: browser | a: about | q: quit"
        }
        (Route::Home, InputMode::Normal) => "/: search | a: about | q: quit",
        (Route::User(_), _) => "j/k: repos | o: browser | Esc: back | q: quit",
        _ => "Esc: home | q: quit",
    };

    let mut spans = vec![Span::styled(hints, Style::default().fg(Color::DarkGray))];
    if directory.loading {
        spans.push(Span::styled("  ⟳ loading", Style::default().fg(Color::Cyan)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
