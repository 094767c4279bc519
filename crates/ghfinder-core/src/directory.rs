// Directory store - search results, the selected profile and its repositories
//
// Every mutation goes through `reduce`, applied inside `send_modify`, so a
// collection is always either the old value or the whole new one. Nothing is
// held across an await.
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    models::{DirectorySearchResult, DirectoryUser, Repository},
    provider::DirectoryProvider,
    Result,
};

/// Repositories shown per user. No paging past this.
pub const REPOS_PAGE_SIZE: usize = ghfinder_api::REPOS_PAGE_SIZE as usize;

/// The three remote operations, each with its own request sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Search,
    User,
    Repos,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Sequences {
    search: u64,
    user: u64,
    repos: u64,
}

impl Sequences {
    fn slot(&mut self, kind: RequestKind) -> &mut u64 {
        match kind {
            RequestKind::Search => &mut self.search,
            RequestKind::User => &mut self.user,
            RequestKind::Repos => &mut self.repos,
        }
    }

    fn get(&self, kind: RequestKind) -> u64 {
        match kind {
            RequestKind::Search => self.search,
            RequestKind::User => self.user,
            RequestKind::Repos => self.repos,
        }
    }

    fn is_latest(&self, kind: RequestKind, seq: u64) -> bool {
        self.get(kind) == seq
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectoryState {
    pub users: Vec<DirectorySearchResult>,
    pub user: Option<DirectoryUser>,
    pub loading: bool,
    repos: Vec<Repository>,
    repos_owner: Option<String>,
    in_flight: usize,
    latest: Sequences,
}

impl DirectoryState {
    /// Repositories of the selected user
    ///
    /// Empty whenever the last repository fetch was for somebody other than
    /// the user currently on screen.
    pub fn repos(&self) -> &[Repository] {
        match (&self.user, &self.repos_owner) {
            (Some(user), Some(owner)) if !user.login.eq_ignore_ascii_case(owner) => &[],
            _ => &self.repos,
        }
    }

    /// Login the stored repositories were fetched for
    pub fn repos_owner(&self) -> Option<&str> {
        self.repos_owner.as_deref()
    }

    /// Remote calls still waiting on a response
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Sequence number of the most recently dispatched request of `kind`
    pub fn latest_request(&self, kind: RequestKind) -> u64 {
        self.latest.get(kind)
    }
}

/// Everything that can happen to the directory state
#[derive(Debug, Clone, PartialEq)]
pub enum DirectoryAction {
    /// A remote call of `kind` is about to go out
    SetLoading { kind: RequestKind },
    SearchUsers {
        seq: u64,
        users: Vec<DirectorySearchResult>,
    },
    GetUser {
        seq: u64,
        user: DirectoryUser,
    },
    GetRepos {
        seq: u64,
        owner: String,
        repos: Vec<Repository>,
    },
    /// The call failed or was dropped. Nothing to apply, just settle.
    RequestFailed { kind: RequestKind, seq: u64 },
    ClearUsers,
}

/// Pure transition function
pub fn reduce(state: &mut DirectoryState, action: DirectoryAction) {
    match action {
        DirectoryAction::SetLoading { kind } => {
            *state.latest.slot(kind) += 1;
            state.in_flight += 1;
            state.loading = true;
        }
        DirectoryAction::SearchUsers { seq, users } => {
            settle(state);
            if state.latest.is_latest(RequestKind::Search, seq) {
                state.users = users;
            } else {
                debug!("Dropping stale search response #{}", seq);
            }
        }
        DirectoryAction::GetUser { seq, user } => {
            settle(state);
            if state.latest.is_latest(RequestKind::User, seq) {
                let owns_repos = state
                    .repos_owner
                    .as_deref()
                    .map(|owner| owner.eq_ignore_ascii_case(&user.login))
                    .unwrap_or(false);
                if !owns_repos {
                    state.repos.clear();
                    state.repos_owner = None;
                }
                state.user = Some(user);
            } else {
                debug!("Dropping stale user response #{}", seq);
            }
        }
        DirectoryAction::GetRepos {
            seq,
            owner,
            mut repos,
        } => {
            settle(state);
            if state.latest.is_latest(RequestKind::Repos, seq) {
                repos.truncate(REPOS_PAGE_SIZE);
                state.repos = repos;
                state.repos_owner = Some(owner);
            } else {
                debug!("Dropping stale repos response #{}", seq);
            }
        }
        DirectoryAction::RequestFailed { .. } => settle(state),
        DirectoryAction::ClearUsers => {
            state.users.clear();
            // A search still on the wire must not bring the results back
            *state.latest.slot(RequestKind::Search) += 1;
            state.loading = state.in_flight > 0;
        }
    }
}

fn settle(state: &mut DirectoryState) {
    state.in_flight = state.in_flight.saturating_sub(1);
    state.loading = state.in_flight > 0;
}

/// Directory store shared by every view
pub struct DirectoryStore {
    state: watch::Sender<DirectoryState>,
    provider: Arc<dyn DirectoryProvider>,
}

impl DirectoryStore {
    pub fn new(provider: Arc<dyn DirectoryProvider>) -> Self {
        let (state, _) = watch::channel(DirectoryState::default());
        Self { state, provider }
    }

    /// Replace the search results with whatever the directory returns for `query`
    ///
    /// An empty query is not rejected here; validating input is the view's job.
    pub async fn search_users(&self, query: &str) -> Result<()> {
        info!("Searching users: {}", query);
        let pending = self.begin(RequestKind::Search);

        match self.provider.search_users(query).await {
            Ok(users) => {
                info!("Found {} users", users.len());
                let seq = pending.seq;
                pending.settle(DirectoryAction::SearchUsers { seq, users });
                Ok(())
            }
            Err(e) => {
                warn!("User search failed: {}", e);
                pending.fail();
                Err(e)
            }
        }
    }

    /// Fetch a profile and make it the selected user
    pub async fn get_user(&self, username: &str) -> Result<()> {
        info!("Fetching user: {}", username);
        let pending = self.begin(RequestKind::User);

        match self.provider.get_user(username).await {
            Ok(user) => {
                let seq = pending.seq;
                pending.settle(DirectoryAction::GetUser { seq, user });
                Ok(())
            }
            Err(e) => {
                warn!("Fetching user {} failed: {}", username, e);
                pending.fail();
                Err(e)
            }
        }
    }

    /// Fetch the first page of a user's repositories, oldest-created first
    pub async fn get_user_repos(&self, username: &str) -> Result<()> {
        info!("Fetching repositories for: {}", username);
        let pending = self.begin(RequestKind::Repos);

        match self.provider.get_user_repos(username).await {
            Ok(repos) => {
                let seq = pending.seq;
                pending.settle(DirectoryAction::GetRepos {
                    seq,
                    owner: username.to_string(),
                    repos,
                });
                Ok(())
            }
            Err(e) => {
                warn!("Fetching repositories for {} failed: {}", username, e);
                pending.fail();
                Err(e)
            }
        }
    }

    /// Empty the search results. Selected user and repositories stay put.
    pub fn clear_users(&self) {
        self.dispatch(DirectoryAction::ClearUsers);
    }

    pub fn snapshot(&self) -> DirectoryState {
        self.state.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn subscribe(&self) -> watch::Receiver<DirectoryState> {
        self.state.subscribe()
    }

    fn dispatch(&self, action: DirectoryAction) {
        self.state.send_modify(|state| reduce(state, action));
    }

    /// Flip loading on and hand back a guard that settles it on every exit path
    fn begin(&self, kind: RequestKind) -> Pending<'_> {
        let mut seq = 0;
        self.state.send_modify(|state| {
            reduce(state, DirectoryAction::SetLoading { kind });
            seq = state.latest_request(kind);
        });

        Pending {
            store: self,
            kind,
            seq,
            settled: false,
        }
    }
}

/// An outstanding request. If the future driving it is dropped before the
/// response lands, Drop settles it so `loading` can't get stuck.
struct Pending<'a> {
    store: &'a DirectoryStore,
    kind: RequestKind,
    seq: u64,
    settled: bool,
}

impl Pending<'_> {
    fn settle(mut self, action: DirectoryAction) {
        self.settled = true;
        self.store.dispatch(action);
    }

    fn fail(self) {
        let action = DirectoryAction::RequestFailed {
            kind: self.kind,
            seq: self.seq,
        };
        self.settle(action);
    }
}

impl Drop for Pending<'_> {
    fn drop(&mut self) {
        if !self.settled {
            debug!("Request {:?} #{} dropped before completion", self.kind, self.seq);
            self.store.dispatch(DirectoryAction::RequestFailed {
                kind: self.kind,
                seq: self.seq,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockDirectoryProvider;
    use crate::Error;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::oneshot;

    fn result(id: u64, login: &str) -> DirectorySearchResult {
        DirectorySearchResult {
            id,
            login: login.to_string(),
            avatar_url: format!("https://avatars.example/{}", id),
            profile_url: format!("https://github.com/{}", login),
        }
    }

    fn user(id: u64, login: &str) -> DirectoryUser {
        DirectoryUser {
            id,
            login: login.to_string(),
            avatar_url: format!("https://avatars.example/{}", id),
            profile_url: format!("https://github.com/{}", login),
            account_type: Some("User".to_string()),
            name: None,
            bio: None,
            company: None,
            location: None,
            blog: None,
            email: None,
            twitter_handle: None,
            hireable: None,
            public_repos: 3,
            public_gists: 0,
            followers: 1,
            following: 0,
        }
    }

    fn repo(id: u64, name: &str) -> Repository {
        Repository {
            id,
            name: name.to_string(),
            url: format!("https://github.com/octocat/{}", name),
            description: None,
            created_at: None,
        }
    }

    fn store_with(mock: MockDirectoryProvider) -> DirectoryStore {
        DirectoryStore::new(Arc::new(mock))
    }

    #[tokio::test]
    async fn test_search_replaces_results_in_order() {
        let mut mock = MockDirectoryProvider::new();
        mock.expect_search_users()
            .withf(|q| q == "octocat")
            .times(1)
            .returning(|_| Ok(vec![result(1, "octocat"), result(2, "octocat2")]));
        let store = store_with(mock);

        store.search_users("octocat").await.unwrap();

        let state = store.snapshot();
        assert_eq!(state.users.len(), 2);
        assert_eq!(state.users[0].login, "octocat");
        assert_eq!(state.users[1].login, "octocat2");
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_empty_query_still_hits_the_provider() {
        let mut mock = MockDirectoryProvider::new();
        mock.expect_search_users()
            .withf(|q| q.is_empty())
            .times(1)
            .returning(|_| {
                Err(Error::ApiError {
                    status: 422,
                    message: "Validation Failed".to_string(),
                })
            });
        let store = store_with(mock);

        let err = store.search_users("").await.unwrap_err();
        assert!(matches!(err, Error::ApiError { status: 422, .. }));
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_get_user_selects_profile() {
        let mut mock = MockDirectoryProvider::new();
        mock.expect_get_user()
            .withf(|u| u == "octocat")
            .returning(|_| Ok(user(1, "octocat")));
        let store = store_with(mock);

        store.get_user("octocat").await.unwrap();

        let state = store.snapshot();
        assert_eq!(state.user, Some(user(1, "octocat")));
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_failed_get_user_keeps_previous_profile_and_resets_loading() {
        let mut mock = MockDirectoryProvider::new();
        mock.expect_get_user()
            .withf(|u| u == "octocat")
            .returning(|_| Ok(user(1, "octocat")));
        mock.expect_get_user()
            .withf(|u| u == "ghost")
            .returning(|u| Err(Error::NotFound(u.to_string())));
        let store = store_with(mock);

        store.get_user("octocat").await.unwrap();
        let err = store.get_user("ghost").await.unwrap_err();

        assert!(err.is_not_found());
        let state = store.snapshot();
        assert!(!state.loading);
        assert_eq!(state.user.map(|u| u.login), Some("octocat".to_string()));
    }

    #[tokio::test]
    async fn test_repos_are_capped_at_page_size_and_keep_order() {
        let mut mock = MockDirectoryProvider::new();
        mock.expect_get_user_repos().returning(|_| {
            Ok((1..=7).map(|i| repo(i, &format!("repo-{}", i))).collect())
        });
        let store = store_with(mock);

        store.get_user_repos("octocat").await.unwrap();

        let state = store.snapshot();
        let ids: Vec<u64> = state.repos().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(state.repos_owner(), Some("octocat"));
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_clear_users_leaves_profile_and_repos_alone() {
        let mut mock = MockDirectoryProvider::new();
        mock.expect_search_users()
            .returning(|_| Ok(vec![result(1, "octocat")]));
        mock.expect_get_user().returning(|_| Ok(user(1, "octocat")));
        mock.expect_get_user_repos()
            .returning(|_| Ok(vec![repo(10, "hello-world")]));
        let store = store_with(mock);

        store.search_users("octo").await.unwrap();
        store.get_user("octocat").await.unwrap();
        store.get_user_repos("octocat").await.unwrap();
        store.clear_users();

        let state = store.snapshot();
        assert!(state.users.is_empty());
        assert!(!state.loading);
        assert_eq!(state.user.as_ref().map(|u| u.id), Some(1));
        assert_eq!(state.repos().len(), 1);
    }

    #[tokio::test]
    async fn test_new_user_hides_previous_users_repos() {
        let mut mock = MockDirectoryProvider::new();
        mock.expect_get_user()
            .withf(|u| u == "alice")
            .returning(|_| Ok(user(1, "alice")));
        mock.expect_get_user()
            .withf(|u| u == "bob")
            .returning(|_| Ok(user(2, "bob")));
        mock.expect_get_user_repos()
            .withf(|u| u == "alice")
            .returning(|_| Ok(vec![repo(10, "alice-repo")]));
        let store = store_with(mock);

        store.get_user("alice").await.unwrap();
        store.get_user_repos("alice").await.unwrap();
        assert_eq!(store.snapshot().repos().len(), 1);

        store.get_user("bob").await.unwrap();
        let state = store.snapshot();
        assert_eq!(state.user.as_ref().map(|u| u.login.as_str()), Some("bob"));
        assert!(state.repos().is_empty());
    }

    #[tokio::test]
    async fn test_repos_for_someone_else_are_not_shown() {
        let mut mock = MockDirectoryProvider::new();
        mock.expect_get_user().returning(|_| Ok(user(2, "bob")));
        mock.expect_get_user_repos()
            .returning(|_| Ok(vec![repo(10, "alice-repo")]));
        let store = store_with(mock);

        store.get_user("bob").await.unwrap();
        store.get_user_repos("alice").await.unwrap();
        assert!(store.snapshot().repos().is_empty());
    }

    #[tokio::test]
    async fn test_repos_arriving_before_their_user_survive() {
        let mut mock = MockDirectoryProvider::new();
        mock.expect_get_user()
            .withf(|u| u == "alice")
            .returning(|_| Ok(user(1, "alice")));
        mock.expect_get_user()
            .withf(|u| u == "Bob")
            .returning(|_| Ok(user(2, "bob")));
        mock.expect_get_user_repos()
            .returning(|_| Ok(vec![repo(20, "bob-repo")]));
        let store = store_with(mock);

        store.get_user("alice").await.unwrap();
        store.get_user_repos("Bob").await.unwrap();
        // Still looking at alice, so bob's repos stay hidden
        assert!(store.snapshot().repos().is_empty());

        store.get_user("Bob").await.unwrap();
        let state = store.snapshot();
        assert_eq!(state.repos().len(), 1);
        assert_eq!(state.repos()[0].name, "bob-repo");
    }

    #[test]
    fn test_reduce_tracks_overlapping_requests() {
        let mut state = DirectoryState::default();
        reduce(&mut state, DirectoryAction::SetLoading { kind: RequestKind::User });
        reduce(&mut state, DirectoryAction::SetLoading { kind: RequestKind::Repos });
        assert!(state.loading);
        assert_eq!(state.in_flight(), 2);

        reduce(
            &mut state,
            DirectoryAction::RequestFailed {
                kind: RequestKind::User,
                seq: 1,
            },
        );
        assert!(state.loading);

        reduce(
            &mut state,
            DirectoryAction::GetRepos {
                seq: 1,
                owner: "octocat".to_string(),
                repos: vec![repo(1, "a")],
            },
        );
        assert!(!state.loading);
        assert_eq!(state.in_flight(), 0);
    }

    #[test]
    fn test_clear_users_discards_search_still_in_flight() {
        let mut state = DirectoryState::default();
        reduce(&mut state, DirectoryAction::SetLoading { kind: RequestKind::Search });
        let seq = state.latest_request(RequestKind::Search);

        reduce(&mut state, DirectoryAction::ClearUsers);
        assert!(state.loading, "the search is still outstanding");

        reduce(
            &mut state,
            DirectoryAction::SearchUsers {
                seq,
                users: vec![result(1, "octocat")],
            },
        );
        assert!(state.users.is_empty());
        assert!(!state.loading);
    }

    /// Provider whose user lookups resolve only when the test says so
    #[derive(Default)]
    struct GatedProvider {
        users: Mutex<HashMap<String, oneshot::Receiver<Result<DirectoryUser>>>>,
    }

    impl GatedProvider {
        fn gate(&self, login: &str) -> oneshot::Sender<Result<DirectoryUser>> {
            let (tx, rx) = oneshot::channel();
            self.users.lock().unwrap().insert(login.to_string(), rx);
            tx
        }
    }

    #[async_trait::async_trait]
    impl DirectoryProvider for GatedProvider {
        async fn search_users(&self, _query: &str) -> Result<Vec<DirectorySearchResult>> {
            Ok(Vec::new())
        }

        async fn get_user(&self, username: &str) -> Result<DirectoryUser> {
            let rx = self.users.lock().unwrap().remove(username);
            match rx {
                Some(rx) => rx
                    .await
                    .unwrap_or_else(|_| Err(Error::NotFound(username.to_string()))),
                None => std::future::pending().await,
            }
        }

        async fn get_user_repos(&self, _username: &str) -> Result<Vec<Repository>> {
            Ok(Vec::new())
        }
    }

    // Overlapping get_user calls are sequenced: the response to the call made
    // last wins even when it lands first. This is a deliberate departure from
    // "whichever resolves last".
    #[tokio::test]
    async fn test_stale_user_response_is_discarded() {
        let provider = Arc::new(GatedProvider::default());
        let tx_a = provider.gate("a");
        let tx_b = provider.gate("b");
        let store = DirectoryStore::new(provider.clone());

        let driver = async {
            tokio::task::yield_now().await;
            assert!(store.is_loading());
            assert_eq!(store.snapshot().in_flight(), 2);

            tx_b.send(Ok(user(2, "b"))).unwrap();
            tokio::task::yield_now().await;
            tx_a.send(Ok(user(1, "a"))).unwrap();
        };

        let (first, second, _) = tokio::join!(store.get_user("a"), store.get_user("b"), driver);
        assert!(first.is_ok());
        assert!(second.is_ok());

        let state = store.snapshot();
        assert_eq!(state.user.map(|u| u.login), Some("b".to_string()));
        assert!(!state.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_request_does_not_leave_loading_stuck() {
        let store = DirectoryStore::new(Arc::new(GatedProvider::default()));

        // Nobody ever answers for "slow"
        let timed_out =
            tokio::time::timeout(Duration::from_millis(50), store.get_user("slow")).await;
        assert!(timed_out.is_err());

        let state = store.snapshot();
        assert!(!state.loading);
        assert_eq!(state.in_flight(), 0);
        assert!(state.user.is_none());
    }

    #[tokio::test]
    async fn test_subscribers_are_notified() {
        let mut mock = MockDirectoryProvider::new();
        mock.expect_search_users()
            .returning(|_| Ok(vec![result(1, "octocat")]));
        let store = store_with(mock);
        let mut rx = store.subscribe();

        store.search_users("octocat").await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().users.len(), 1);
    }
}
