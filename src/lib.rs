//! # Signup Desk
//!
//! Teacher console for a school's extracurricular-activity signup page:
//! authenticate a teacher, list activities fetched from the activities API,
//! and register or unregister student emails.
//!
//! ## Modules
//!
//! - [`client`]: typed client for the remote activities API
//! - [`session`]: teacher session and its local token storage
//! - [`state`]: page state (list snapshot, flash messages, login panel)
//! - [`controller`]: the single owner of session and page state
//! - [`view`]: declarative rendering to a view model, HTML and text
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use signup_desk::{
//!     ClientConfig, ControllerOptions, FileStorage, HttpActivityClient, SignupController,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api = HttpActivityClient::new(ClientConfig::default())?;
//!     let storage = FileStorage::new("storage.json");
//!     let desk = SignupController::new(api, storage, ControllerOptions::default());
//!
//!     desk.init().await;
//!     desk.login("mrodriguez", "art123").await;
//!     desk.signup("Chess Club", "emma@mergington.edu").await;
//!
//!     let page = desk.render(chrono::Utc::now()).await;
//!     println!("{}", signup_desk::view::text::render_page_text(&page));
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod controller;
pub mod session;
pub mod state;
pub mod view;

pub use client::{
    Activity, ActivityApi, ActivityCatalog, ClientConfig, ClientError, ClientResult,
    HttpActivityClient, LoginRequest, LoginResponse, MessageResponse, VerifyResponse,
};

pub use session::{
    FileStorage, LocalStorage, MemoryStorage, Session, StorageError, StorageResult, TOKEN_KEY,
};

pub use state::{Flash, FlashKind, ListState, PageState};

pub use controller::{ActionStatus, ControllerOptions, SignupController};

pub use view::{
    render_activities, render_list, render_page, ActivityCard, ActivityListView, PageView,
    RosterRow,
};

pub use config::{Config, ConfigError, LoggingConfig};
