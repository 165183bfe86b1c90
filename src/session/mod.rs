//! Teacher Session
//!
//! The session is an explicit value owned by the controller instead of
//! ambient page state. It moves between three states:
//!
//! - **LoggedOut**: no token held
//! - **Unverified**: a token was loaded from storage but the server has
//!   not confirmed it yet
//! - **LoggedIn**: the server issued or confirmed the token
//!
//! Only `LoggedIn` unlocks teacher-only controls.

mod storage;

pub use storage::{FileStorage, LocalStorage, MemoryStorage, StorageError, StorageResult};

use serde::Serialize;

/// Local storage key the bearer token lives under
pub const TOKEN_KEY: &str = "authToken";

/// Client-side view of the teacher's authentication
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Session {
    #[default]
    LoggedOut,
    Unverified {
        #[serde(skip)]
        token: String,
    },
    LoggedIn {
        #[serde(skip)]
        token: String,
        username: String,
    },
}

impl Session {
    /// Session restored from storage, pending verification
    pub fn restored(token: Option<String>) -> Self {
        match token {
            Some(token) if !token.is_empty() => Session::Unverified { token },
            _ => Session::LoggedOut,
        }
    }

    pub fn logged_in(token: impl Into<String>, username: impl Into<String>) -> Self {
        Session::LoggedIn {
            token: token.into(),
            username: username.into(),
        }
    }

    /// True only for a verified token
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::LoggedIn { .. })
    }

    /// Bearer token for privileged requests (verified sessions only)
    pub fn bearer(&self) -> Option<&str> {
        match self {
            Session::LoggedIn { token, .. } => Some(token),
            _ => None,
        }
    }

    /// Token held in any state, verified or not
    pub fn token(&self) -> Option<&str> {
        match self {
            Session::LoggedOut => None,
            Session::Unverified { token } | Session::LoggedIn { token, .. } => Some(token),
        }
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            Session::LoggedIn { username, .. } => Some(username),
            _ => None,
        }
    }
}
