//! Signup Controller
//!
//! The single owner of the teacher session and the page state. Every user
//! action on the signup page maps to one async method here:
//!
//! - [`SignupController::init`] - verify a stored token, then load the list
//! - [`SignupController::login`] / [`SignupController::logout`]
//! - [`SignupController::refresh`] - fetch and apply the activity catalog
//! - [`SignupController::signup`] / [`SignupController::unregister`]
//!
//! ## Ordering
//!
//! Page state sits behind an async lock that is never held across a
//! network call. List refreshes are numbered and a response is applied only
//! if no newer refresh has been applied already. Mutations take a
//! per-activity in-flight guard; a second mutation for the same activity is
//! refused while the first is on the wire.

mod inflight;

pub use inflight::{InFlight, InFlightGuard};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

use crate::client::{ActivityApi, ClientError, LoginRequest};
use crate::session::{LocalStorage, Session, TOKEN_KEY};
use crate::state::{Flash, FlashKind, ListState, PageState, DEFAULT_MESSAGE_DURATION_MS};
use crate::view::{render_page, PageView};

pub const MISSING_CREDENTIALS: &str = "Please enter both username and password";
pub const LOGIN_FAILED: &str = "Login failed";
pub const LOGIN_UNREACHABLE: &str = "Login failed. Please try again.";
pub const SIGNUP_REQUIRES_LOGIN: &str = "You must be logged in as a teacher to register students";
pub const UNREGISTER_REQUIRES_LOGIN: &str =
    "You must be logged in as a teacher to unregister students";
pub const SIGNUP_UNREACHABLE: &str = "Failed to sign up. Please try again.";
pub const UNREGISTER_UNREACHABLE: &str = "Failed to unregister. Please try again.";
pub const MISSING_SIGNUP_FIELDS: &str = "Please enter a student email and select an activity";
pub const GENERIC_API_ERROR: &str = "An error occurred";

/// How an action ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    /// Server accepted the request
    Succeeded,
    /// Server answered with an error
    Rejected,
    /// Server could not be reached or answered garbage
    Failed,
    /// Refused locally, no request sent
    Blocked,
    /// Same activity already has a request on the wire
    Busy,
}

impl ActionStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, ActionStatus::Succeeded)
    }
}

/// Tunables for the controller
#[derive(Debug, Clone)]
pub struct ControllerOptions {
    /// How long result messages stay visible
    pub message_duration: Duration,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            message_duration: Duration::milliseconds(DEFAULT_MESSAGE_DURATION_MS as i64),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Mutation {
    Signup,
    Unregister,
}

impl Mutation {
    fn name(&self) -> &'static str {
        match self {
            Mutation::Signup => "signup",
            Mutation::Unregister => "unregister",
        }
    }

    fn requires_login(&self) -> &'static str {
        match self {
            Mutation::Signup => SIGNUP_REQUIRES_LOGIN,
            Mutation::Unregister => UNREGISTER_REQUIRES_LOGIN,
        }
    }

    fn unreachable(&self) -> &'static str {
        match self {
            Mutation::Signup => SIGNUP_UNREACHABLE,
            Mutation::Unregister => UNREGISTER_UNREACHABLE,
        }
    }
}

/// Drives the signup page against an [`ActivityApi`]
pub struct SignupController<A, S> {
    api: A,
    storage: S,
    state: RwLock<PageState>,
    in_flight: InFlight,
    refresh_seq: AtomicU64,
    applied_seq: AtomicU64,
    options: ControllerOptions,
}

impl<A: ActivityApi, S: LocalStorage> SignupController<A, S> {
    /// Create a controller, restoring any token from storage
    pub fn new(api: A, storage: S, options: ControllerOptions) -> Self {
        let token = match storage.get_item(TOKEN_KEY) {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stored token, starting logged out");
                None
            }
        };

        Self {
            api,
            storage,
            state: RwLock::new(PageState::new(Session::restored(token))),
            in_flight: InFlight::new(),
            refresh_seq: AtomicU64::new(0),
            applied_seq: AtomicU64::new(0),
            options,
        }
    }

    /// Page start-up: verify the stored token, then load the list
    pub async fn init(&self) -> bool {
        let authenticated = self.verify().await;
        self.refresh().await;
        authenticated
    }

    /// Check the held token with the server
    ///
    /// Without a token no request is made. A negative answer, an error
    /// status or a transport failure clears the stored token.
    pub async fn verify(&self) -> bool {
        let token = self.state.read().await.session.token().map(str::to_string);
        let Some(token) = token else {
            self.state.write().await.session = Session::LoggedOut;
            return false;
        };

        let verified = match self.api.verify(&token).await {
            Ok(resp) if resp.authenticated => resp.username,
            Ok(_) => {
                tracing::info!("Stored token rejected by server");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Token verification failed");
                None
            }
        };

        let mut state = self.state.write().await;
        // A login or logout while verifying owns the session now
        if state.session.token() != Some(token.as_str()) {
            return state.is_authenticated();
        }

        match verified {
            Some(username) => {
                tracing::info!(%username, "Session verified");
                state.session = Session::logged_in(token, username);
                true
            }
            None => {
                self.forget_token();
                state.session = Session::LoggedOut;
                false
            }
        }
    }

    /// Submit credentials; on success store the token and reload the list
    pub async fn login(&self, username: &str, password: &str) -> ActionStatus {
        if username.is_empty() || password.is_empty() {
            self.state.write().await.login_error = Some(MISSING_CREDENTIALS.to_string());
            return ActionStatus::Blocked;
        }

        let credentials = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };

        let status = match self.api.login(&credentials).await {
            Ok(resp) => {
                if let Err(e) = self.storage.set_item(TOKEN_KEY, &resp.access_token) {
                    tracing::warn!(
                        error = %e,
                        "Failed to persist token, session will not survive restart"
                    );
                }

                let mut state = self.state.write().await;
                tracing::info!(username = %resp.username, "Logged in");
                state.session = Session::logged_in(resp.access_token, resp.username);
                state.login_panel_open = false;
                state.login_error = None;
                ActionStatus::Succeeded
            }
            Err(e) => {
                tracing::warn!(%username, error = %e, "Login failed");
                let (status, text) = describe_failure(&e, LOGIN_FAILED, LOGIN_UNREACHABLE);
                self.state.write().await.login_error = Some(text);
                status
            }
        };

        if status.is_success() {
            self.refresh().await;
        }
        status
    }

    /// Drop the session and reload the list without teacher controls
    pub async fn logout(&self) {
        self.forget_token();
        {
            let mut state = self.state.write().await;
            state.session = Session::LoggedOut;
            state.login_panel_open = false;
            state.login_error = None;
        }
        tracing::info!("Logged out");
        self.refresh().await;
    }

    /// Open or close the login panel; ignored while logged in
    pub async fn toggle_login_panel(&self) {
        let mut state = self.state.write().await;
        if !state.is_authenticated() {
            state.login_panel_open = !state.login_panel_open;
        }
    }

    pub async fn close_login_panel(&self) {
        let mut state = self.state.write().await;
        state.login_panel_open = false;
        state.login_error = None;
    }

    /// Fetch the catalog and apply it unless a newer fetch already landed
    pub async fn refresh(&self) -> bool {
        let seq = self.refresh_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let result = self.api.fetch_activities().await;

        let mut state = self.state.write().await;
        if seq <= self.applied_seq.load(Ordering::SeqCst) {
            tracing::debug!(seq, "Discarding stale activity list");
            return false;
        }
        self.applied_seq.store(seq, Ordering::SeqCst);

        match result {
            Ok(catalog) => {
                tracing::debug!(seq, activities = catalog.len(), "Applied activity list");
                state.list = ListState::Loaded(catalog);
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "Error fetching activities");
                state.list = ListState::Failed;
                false
            }
        }
    }

    /// Register a student for an activity
    pub async fn signup(&self, activity: &str, email: &str) -> ActionStatus {
        self.mutate(Mutation::Signup, activity, email).await
    }

    /// Remove a student from an activity
    pub async fn unregister(&self, activity: &str, email: &str) -> ActionStatus {
        self.mutate(Mutation::Unregister, activity, email).await
    }

    async fn mutate(&self, mutation: Mutation, activity: &str, email: &str) -> ActionStatus {
        let token = self.state.read().await.session.bearer().map(str::to_string);
        let Some(token) = token else {
            self.flash(FlashKind::Error, mutation.requires_login()).await;
            return ActionStatus::Blocked;
        };

        if activity.is_empty() || email.is_empty() {
            self.flash(FlashKind::Error, MISSING_SIGNUP_FIELDS).await;
            return ActionStatus::Blocked;
        }

        let Some(guard) = self.in_flight.try_acquire(activity) else {
            tracing::debug!(%activity, action = mutation.name(), "Request already in flight");
            self.flash(
                FlashKind::Error,
                format!("A request for {} is already in progress", activity),
            )
            .await;
            return ActionStatus::Busy;
        };

        let result = match mutation {
            Mutation::Signup => self.api.signup(&token, activity, email).await,
            Mutation::Unregister => self.api.unregister(&token, activity, email).await,
        };
        drop(guard);

        match result {
            Ok(resp) => {
                tracing::info!(%activity, %email, action = mutation.name(), "Request succeeded");
                self.flash(FlashKind::Success, resp.message).await;
                self.refresh().await;
                ActionStatus::Succeeded
            }
            Err(e) => {
                tracing::warn!(
                    %activity,
                    %email,
                    action = mutation.name(),
                    error = %e,
                    "Request failed"
                );
                let (status, text) =
                    describe_failure(&e, GENERIC_API_ERROR, mutation.unreachable());
                self.flash(FlashKind::Error, text).await;
                status
            }
        }
    }

    async fn flash(&self, kind: FlashKind, text: impl Into<String>) {
        let flash = Flash::new(text, kind, Utc::now(), self.options.message_duration);
        self.state.write().await.flash = Some(flash);
    }

    fn forget_token(&self) {
        if let Err(e) = self.storage.remove_item(TOKEN_KEY) {
            tracing::warn!(error = %e, "Failed to remove stored token");
        }
    }

    /// Copy of the current page state
    pub async fn snapshot(&self) -> PageState {
        self.state.read().await.clone()
    }

    /// Current session
    pub async fn session(&self) -> Session {
        self.state.read().await.session.clone()
    }

    /// Render the page as of `now`, dropping an expired message first
    pub async fn render(&self, now: DateTime<Utc>) -> PageView {
        let mut state = self.state.write().await;
        state.expire_flash(now);
        render_page(&state, now)
    }

    /// True while a mutation for `activity` is on the wire
    pub fn is_busy(&self, activity: &str) -> bool {
        self.in_flight.is_active(activity)
    }
}

/// Status and user-facing text for a failed call
fn describe_failure(e: &ClientError, fallback: &str, unreachable: &str) -> (ActionStatus, String) {
    if e.is_transport() {
        (ActionStatus::Failed, unreachable.to_string())
    } else {
        (
            ActionStatus::Rejected,
            e.detail().unwrap_or(fallback).to_string(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{
        ActivityCatalog, ClientResult, LoginResponse, MessageResponse, VerifyResponse,
    };
    use crate::session::MemoryStorage;
    use crate::view::fixtures::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use tokio::sync::oneshot;

    #[derive(Clone)]
    enum Reply<T> {
        Ok(T),
        Reject(u16, &'static str),
        Down,
    }

    impl<T: Clone> Reply<T> {
        fn get(&self) -> ClientResult<T> {
            match self {
                Reply::Ok(v) => Ok(v.clone()),
                Reply::Reject(status, detail) => Err(ClientError::Api {
                    status: *status,
                    detail: Some(detail.to_string()),
                }),
                Reply::Down => Err(ClientError::Unavailable),
            }
        }
    }

    /// Scripted backend recording every call
    struct FakeApi {
        calls: Mutex<Vec<String>>,
        catalogs: Mutex<VecDeque<ActivityCatalog>>,
        fetch: Mutex<Reply<()>>,
        verify: Mutex<Reply<VerifyResponse>>,
        login: Mutex<Reply<LoginResponse>>,
        mutate: Mutex<Reply<MessageResponse>>,
        gate: tokio::sync::Mutex<Option<oneshot::Receiver<()>>>,
    }

    impl Default for FakeApi {
        fn default() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                catalogs: Mutex::new(VecDeque::new()),
                fetch: Mutex::new(Reply::Ok(())),
                verify: Mutex::new(Reply::Ok(VerifyResponse::default())),
                login: Mutex::new(Reply::Ok(LoginResponse {
                    access_token: "tok-123".to_string(),
                    token_type: Some("bearer".to_string()),
                    username: "mrodriguez".to_string(),
                })),
                mutate: Mutex::new(Reply::Ok(MessageResponse {
                    message: "Signed up b@x.com for Chess Club".to_string(),
                })),
                gate: tokio::sync::Mutex::new(None),
            }
        }
    }

    impl FakeApi {
        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        async fn wait_gate(&self) {
            let gate = self.gate.lock().await.take();
            if let Some(rx) = gate {
                let _ = rx.await;
            }
        }
    }

    #[async_trait]
    impl ActivityApi for FakeApi {
        async fn fetch_activities(&self) -> ClientResult<ActivityCatalog> {
            self.record("fetch".to_string());
            let next = self.catalogs.lock().unwrap().pop_front();
            let catalog = next.unwrap_or_else(chess_catalog);
            self.wait_gate().await;
            self.fetch.lock().unwrap().get().map(|_| catalog)
        }

        async fn verify(&self, token: &str) -> ClientResult<VerifyResponse> {
            self.record(format!("verify:{}", token));
            self.verify.lock().unwrap().get()
        }

        async fn login(&self, credentials: &LoginRequest) -> ClientResult<LoginResponse> {
            self.record(format!("login:{}", credentials.username));
            self.login.lock().unwrap().get()
        }

        async fn signup(
            &self,
            token: &str,
            activity: &str,
            email: &str,
        ) -> ClientResult<MessageResponse> {
            self.record(format!("signup:{}:{}:{}", token, activity, email));
            self.wait_gate().await;
            self.mutate.lock().unwrap().get()
        }

        async fn unregister(
            &self,
            token: &str,
            activity: &str,
            email: &str,
        ) -> ClientResult<MessageResponse> {
            self.record(format!("unregister:{}:{}:{}", token, activity, email));
            self.mutate.lock().unwrap().get()
        }
    }

    fn controller(
        api: Arc<FakeApi>,
        storage: Arc<MemoryStorage>,
    ) -> SignupController<Arc<FakeApi>, Arc<MemoryStorage>> {
        SignupController::new(api, storage, ControllerOptions::default())
    }

    fn message(state: &PageState) -> Option<(FlashKind, String)> {
        state.flash.as_ref().map(|f| (f.kind, f.text.clone()))
    }

    #[tokio::test]
    async fn test_unauthenticated_signup_sends_nothing() {
        let api = Arc::new(FakeApi::default());
        let ctl = controller(api.clone(), Arc::new(MemoryStorage::new()));

        let status = ctl.signup("Chess Club", "b@x.com").await;

        assert_eq!(status, ActionStatus::Blocked);
        assert!(api.calls().is_empty());
        assert_eq!(
            message(&ctl.snapshot().await),
            Some((FlashKind::Error, SIGNUP_REQUIRES_LOGIN.to_string()))
        );
    }

    #[tokio::test]
    async fn test_unauthenticated_unregister_sends_nothing() {
        let api = Arc::new(FakeApi::default());
        let ctl = controller(api.clone(), Arc::new(MemoryStorage::new()));

        assert_eq!(ctl.unregister("Chess Club", "a@x.com").await, ActionStatus::Blocked);
        assert!(api.calls().is_empty());
        assert_eq!(
            message(&ctl.snapshot().await).map(|(_, t)| t),
            Some(UNREGISTER_REQUIRES_LOGIN.to_string())
        );
    }

    #[tokio::test]
    async fn test_login_token_used_for_mutations() {
        let api = Arc::new(FakeApi::default());
        let storage = Arc::new(MemoryStorage::new());
        let ctl = controller(api.clone(), storage.clone());

        assert_eq!(ctl.login("mrodriguez", "art123").await, ActionStatus::Succeeded);
        assert_eq!(storage.get_item(TOKEN_KEY).unwrap().as_deref(), Some("tok-123"));

        assert_eq!(ctl.signup("Chess Club", "b@x.com").await, ActionStatus::Succeeded);
        assert_eq!(ctl.unregister("Chess Club", "a@x.com").await, ActionStatus::Succeeded);

        let calls = api.calls();
        assert!(calls.contains(&"signup:tok-123:Chess Club:b@x.com".to_string()));
        assert!(calls.contains(&"unregister:tok-123:Chess Club:a@x.com".to_string()));
    }

    #[tokio::test]
    async fn test_login_closes_panel_and_reveals_controls() {
        let api = Arc::new(FakeApi::default());
        let ctl = controller(api.clone(), Arc::new(MemoryStorage::new()));
        ctl.refresh().await;

        let before = ctl.render(Utc::now()).await;
        assert!(!before.list.cards[0].roster[0].removable);

        ctl.toggle_login_panel().await;
        assert!(ctl.snapshot().await.login_panel_open);

        ctl.login("mrodriguez", "art123").await;
        let after = ctl.render(Utc::now()).await;
        assert!(!after.login_panel_open);
        assert!(after.list.cards[0].roster[0].removable);
        assert_eq!(after.auth.text, "Logged in as: mrodriguez");
        assert_eq!(api.calls().iter().filter(|c| *c == "fetch").count(), 2);
    }

    #[tokio::test]
    async fn test_login_requires_both_fields() {
        let api = Arc::new(FakeApi::default());
        let ctl = controller(api.clone(), Arc::new(MemoryStorage::new()));

        assert_eq!(ctl.login("mrodriguez", "").await, ActionStatus::Blocked);
        assert!(api.calls().is_empty());
        assert_eq!(ctl.snapshot().await.login_error.as_deref(), Some(MISSING_CREDENTIALS));
    }

    #[tokio::test]
    async fn test_login_rejection_shows_server_detail() {
        let api = Arc::new(FakeApi::default());
        *api.login.lock().unwrap() = Reply::Reject(401, "Invalid username or password");
        let ctl = controller(api.clone(), Arc::new(MemoryStorage::new()));

        assert_eq!(ctl.login("mrodriguez", "wrong").await, ActionStatus::Rejected);
        let state = ctl.snapshot().await;
        assert_eq!(state.login_error.as_deref(), Some("Invalid username or password"));
        assert!(!state.is_authenticated());

        *api.login.lock().unwrap() = Reply::Down;
        assert_eq!(ctl.login("mrodriguez", "wrong").await, ActionStatus::Failed);
        assert_eq!(ctl.snapshot().await.login_error.as_deref(), Some(LOGIN_UNREACHABLE));
    }

    #[tokio::test]
    async fn test_toggle_ignored_when_logged_in() {
        let api = Arc::new(FakeApi::default());
        let ctl = controller(api, Arc::new(MemoryStorage::new()));
        ctl.login("mrodriguez", "art123").await;

        ctl.toggle_login_panel().await;
        assert!(!ctl.snapshot().await.login_panel_open);
    }

    #[tokio::test]
    async fn test_verify_negative_clears_token() {
        let api = Arc::new(FakeApi::default());
        let storage = Arc::new(MemoryStorage::new());
        storage.set_item(TOKEN_KEY, "expired").unwrap();
        let ctl = controller(api.clone(), storage.clone());

        assert!(!ctl.init().await);
        assert_eq!(storage.get_item(TOKEN_KEY).unwrap(), None);
        assert_eq!(ctl.session().await, Session::LoggedOut);
        assert_eq!(api.calls()[0], "verify:expired");

        let view = ctl.render(Utc::now()).await;
        assert_eq!(view.auth.text, "Not logged in");
        assert!(view.teacher_notice_visible);
    }

    #[tokio::test]
    async fn test_verify_network_failure_clears_token() {
        let api = Arc::new(FakeApi::default());
        *api.verify.lock().unwrap() = Reply::Down;
        let storage = Arc::new(MemoryStorage::new());
        storage.set_item(TOKEN_KEY, "tok").unwrap();
        let ctl = controller(api, storage.clone());

        assert!(!ctl.verify().await);
        assert_eq!(storage.get_item(TOKEN_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn test_verify_positive_restores_session() {
        let api = Arc::new(FakeApi::default());
        *api.verify.lock().unwrap() = Reply::Ok(VerifyResponse {
            authenticated: true,
            username: Some("mchen".to_string()),
        });
        let storage = Arc::new(MemoryStorage::new());
        storage.set_item(TOKEN_KEY, "good").unwrap();
        let ctl = controller(api, storage.clone());

        assert!(ctl.init().await);
        assert_eq!(ctl.session().await, Session::logged_in("good", "mchen"));
        assert_eq!(storage.get_item(TOKEN_KEY).unwrap().as_deref(), Some("good"));
    }

    #[tokio::test]
    async fn test_verify_without_token_sends_nothing() {
        let api = Arc::new(FakeApi::default());
        let ctl = controller(api.clone(), Arc::new(MemoryStorage::new()));

        assert!(!ctl.verify().await);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_logout_hides_controls() {
        let api = Arc::new(FakeApi::default());
        let storage = Arc::new(MemoryStorage::new());
        let ctl = controller(api, storage.clone());
        ctl.login("mrodriguez", "art123").await;

        ctl.logout().await;
        assert_eq!(storage.get_item(TOKEN_KEY).unwrap(), None);
        let view = ctl.render(Utc::now()).await;
        assert!(!view.signup_form_visible);
        assert!(view.list.cards[0].roster.iter().all(|r| !r.removable));
    }

    #[tokio::test]
    async fn test_missing_fields_block_mutations() {
        let api = Arc::new(FakeApi::default());
        let ctl = controller(api.clone(), Arc::new(MemoryStorage::new()));
        ctl.login("mrodriguez", "art123").await;

        assert_eq!(ctl.signup("", "b@x.com").await, ActionStatus::Blocked);
        assert_eq!(
            message(&ctl.snapshot().await),
            Some((FlashKind::Error, MISSING_SIGNUP_FIELDS.to_string()))
        );
        assert_eq!(ctl.unregister("Chess Club", "").await, ActionStatus::Blocked);
        assert_eq!(
            message(&ctl.snapshot().await).map(|(_, t)| t),
            Some(MISSING_SIGNUP_FIELDS.to_string())
        );

        assert!(api
            .calls()
            .iter()
            .all(|c| !c.starts_with("signup") && !c.starts_with("unregister")));
    }

    #[tokio::test]
    async fn test_mutation_rejection_and_transport_messages() {
        let api = Arc::new(FakeApi::default());
        let ctl = controller(api.clone(), Arc::new(MemoryStorage::new()));
        ctl.login("mrodriguez", "art123").await;

        *api.mutate.lock().unwrap() = Reply::Reject(400, "Student is already signed up");
        assert_eq!(ctl.signup("Chess Club", "a@x.com").await, ActionStatus::Rejected);
        assert_eq!(
            message(&ctl.snapshot().await),
            Some((FlashKind::Error, "Student is already signed up".to_string()))
        );

        *api.mutate.lock().unwrap() = Reply::Down;
        assert_eq!(ctl.unregister("Chess Club", "a@x.com").await, ActionStatus::Failed);
        assert_eq!(
            message(&ctl.snapshot().await).map(|(_, t)| t),
            Some(UNREGISTER_UNREACHABLE.to_string())
        );
    }

    #[tokio::test]
    async fn test_message_hidden_after_duration() {
        let api = Arc::new(FakeApi::default());
        let ctl = SignupController::new(
            api,
            Arc::new(MemoryStorage::new()),
            ControllerOptions {
                message_duration: Duration::milliseconds(200),
            },
        );

        ctl.signup("Chess Club", "b@x.com").await;
        let expires_at = ctl.snapshot().await.flash.unwrap().expires_at;

        assert!(ctl.render(expires_at - Duration::milliseconds(1)).await.message.is_some());
        assert!(ctl.render(expires_at).await.message.is_none());
        assert!(ctl.snapshot().await.flash.is_none());
    }

    #[tokio::test]
    async fn test_fetch_failure_shows_static_error() {
        let api = Arc::new(FakeApi::default());
        *api.fetch.lock().unwrap() = Reply::Down;
        let ctl = controller(api, Arc::new(MemoryStorage::new()));

        assert!(!ctl.refresh().await);
        assert_eq!(ctl.snapshot().await.list, ListState::Failed);
    }

    #[tokio::test]
    async fn test_stale_refresh_is_discarded() {
        let api = Arc::new(FakeApi::default());
        let older = ActivityCatalog::new(vec![activity("Chess Club", 10, &[])]);
        let newer = ActivityCatalog::new(vec![activity("Chess Club", 10, &["a@x.com", "b@x.com"])]);
        api.catalogs.lock().unwrap().extend([older, newer.clone()]);

        let (tx, rx) = oneshot::channel();
        *api.gate.lock().await = Some(rx);
        let ctl = controller(api, Arc::new(MemoryStorage::new()));

        let (first, _) = tokio::join!(ctl.refresh(), async {
            let applied = ctl.refresh().await;
            tx.send(()).unwrap();
            applied
        });

        assert!(!first);
        assert_eq!(ctl.snapshot().await.list, ListState::Loaded(newer));
    }

    #[tokio::test]
    async fn test_concurrent_mutation_same_activity_is_refused() {
        let api = Arc::new(FakeApi::default());
        let ctl = controller(api.clone(), Arc::new(MemoryStorage::new()));
        ctl.login("mrodriguez", "art123").await;

        let (tx, rx) = oneshot::channel();
        *api.gate.lock().await = Some(rx);

        let (first, second) = tokio::join!(ctl.signup("Chess Club", "b@x.com"), async {
            assert!(ctl.is_busy("Chess Club"));
            let status = ctl.signup("Chess Club", "c@x.com").await;
            assert_eq!(
                message(&ctl.snapshot().await),
                Some((
                    FlashKind::Error,
                    "A request for Chess Club is already in progress".to_string()
                ))
            );
            tx.send(()).unwrap();
            status
        });

        assert_eq!(first, ActionStatus::Succeeded);
        assert_eq!(second, ActionStatus::Busy);
        assert!(!ctl.is_busy("Chess Club"));

        let signups: Vec<_> = api.calls().into_iter().filter(|c| c.starts_with("signup")).collect();
        assert_eq!(signups, vec!["signup:tok-123:Chess Club:b@x.com".to_string()]);
    }
}
