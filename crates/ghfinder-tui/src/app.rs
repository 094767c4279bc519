// TUI application state - view-local bits only, the real state lives in the stores
use crate::Route;
use ghfinder_core::{AppState, DirectorySearchResult, Severity};
use ratatui::widgets::ListState;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,    // Navigating results / pages
    Searching, // Typing in search box
}

pub struct App {
    pub state: AppState,
    pub title: String,
    pub route: Route,
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub search_input: String,
    pub selected_index: usize,
    pub list_state: ListState,
    pub repo_list_state: ListState,
    /// Background profile fetch for the user page, if one was started
    pub profile_fetch: Option<JoinHandle<()>>,
}

impl App {
    pub fn new(state: AppState, title: impl Into<String>) -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));

        Self {
            state,
            title: title.into(),
            route: Route::Home,
            should_quit: false,
            input_mode: InputMode::Searching,
            search_input: String::new(),
            selected_index: 0,
            list_state,
            repo_list_state: ListState::default(),
            profile_fetch: None,
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn enter_search_mode(&mut self) {
        self.navigate(Route::Home);
        self.input_mode = InputMode::Searching;
    }

    pub fn enter_normal_mode(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn navigate(&mut self, route: Route) {
        if route != Route::Home {
            self.input_mode = InputMode::Normal;
        }
        if let Route::User(_) = route {
            self.repo_list_state.select(None);
        }
        self.route = route;
    }

    /// Validate and take the search input
    ///
    /// Blank input raises a notification and returns None; the directory store
    /// is never touched. Otherwise the input is cleared and handed back.
    pub fn submit_search(&mut self) -> Option<String> {
        if self.search_input.trim().is_empty() {
            self.state
                .notifications
                .set_notification("Please enter something", Severity::Light);
            return None;
        }

        let query = std::mem::take(&mut self.search_input);
        self.enter_normal_mode();
        self.reset_selection();
        Some(query)
    }

    /// Clear button only makes sense when there's something to clear
    pub fn can_clear(&self) -> bool {
        !self.state.directory.snapshot().users.is_empty()
    }

    pub fn clear_users(&mut self) {
        self.state.directory.clear_users();
        self.reset_selection();
    }

    pub fn next_result(&mut self) {
        let len = self.state.directory.snapshot().users.len();
        if len > 0 {
            self.selected_index = (self.selected_index + 1).min(len - 1);
            self.list_state.select(Some(self.selected_index));
        }
    }

    pub fn previous_result(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
            self.list_state.select(Some(self.selected_index));
        }
    }

    pub fn next_repo(&mut self) {
        let len = self.state.directory.snapshot().repos().len();
        if len > 0 {
            let next = self
                .repo_list_state
                .selected()
                .map(|i| (i + 1).min(len - 1))
                .unwrap_or(0);
            self.repo_list_state.select(Some(next));
        }
    }

    pub fn previous_repo(&mut self) {
        if let Some(i) = self.repo_list_state.selected() {
            self.repo_list_state.select(Some(i.saturating_sub(1)));
        }
    }

    /// Scrolling follows whichever list the current page shows
    pub fn scroll_down(&mut self) {
        match self.route {
            Route::Home => self.next_result(),
            Route::User(_) => self.next_repo(),
            Route::About | Route::NotFound(_) => {}
        }
    }

    pub fn scroll_up(&mut self) {
        match self.route {
            Route::Home => self.previous_result(),
            Route::User(_) => self.previous_repo(),
            Route::About | Route::NotFound(_) => {}
        }
    }

    pub fn track_profile_fetch(&mut self, handle: JoinHandle<()>) {
        self.profile_fetch = Some(handle);
    }

    /// A profile fetch was spawned and hasn't finished yet. Covers the gap
    /// before the task gets to mark the directory as loading.
    pub fn profile_pending(&self) -> bool {
        self.profile_fetch
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn selected_result(&self) -> Option<DirectorySearchResult> {
        self.state
            .directory
            .snapshot()
            .users
            .get(self.selected_index)
            .cloned()
    }

    /// Move to the profile page of the highlighted result, returning its login
    pub fn open_selected_user(&mut self) -> Option<String> {
        let login = self.selected_result()?.login;
        self.navigate(Route::User(login.clone()));
        Some(login)
    }

    /// Browser URL for whatever is focused on the current page
    pub fn focused_url(&self) -> Option<String> {
        match &self.route {
            Route::Home => self.selected_result().map(|r| r.profile_url),
            Route::User(_) => {
                let snapshot = self.state.directory.snapshot();
                match self.repo_list_state.selected() {
                    Some(i) => snapshot.repos().get(i).map(|r| r.url.clone()),
                    None => snapshot.user.map(|u| u.profile_url),
                }
            }
            Route::About | Route::NotFound(_) => None,
        }
    }

    fn reset_selection(&mut self) {
        self.selected_index = 0;
        self.list_state.select(Some(0));
    }
}
