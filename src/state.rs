//! Page State
//!
//! Everything the signup page shows, held as plain data. The controller is
//! the only writer; renderers read immutable snapshots of it.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::client::ActivityCatalog;
use crate::session::Session;

/// How long a flash message stays visible by default
pub const DEFAULT_MESSAGE_DURATION_MS: u64 = 5000;

/// Flash message variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashKind {
    Success,
    Error,
}

impl FlashKind {
    /// CSS class used by the page markup
    pub fn css_class(&self) -> &'static str {
        match self {
            FlashKind::Success => "success",
            FlashKind::Error => "error",
        }
    }
}

/// A result message shown for a fixed duration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flash {
    pub text: String,
    pub kind: FlashKind,
    pub expires_at: DateTime<Utc>,
}

impl Flash {
    pub fn new(
        text: impl Into<String>,
        kind: FlashKind,
        now: DateTime<Utc>,
        duration: Duration,
    ) -> Self {
        Self {
            text: text.into(),
            kind,
            expires_at: now + duration,
        }
    }

    pub fn is_visible(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Activity list contents
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ListState {
    /// Nothing fetched yet
    #[default]
    Loading,
    /// Last successfully applied snapshot
    Loaded(ActivityCatalog),
    /// Last fetch failed at the transport level
    Failed,
}

/// Complete page state
#[derive(Debug, Clone, Default)]
pub struct PageState {
    pub session: Session,
    pub list: ListState,
    pub login_panel_open: bool,
    /// Login problem shown inside the login panel
    pub login_error: Option<String>,
    pub flash: Option<Flash>,
}

impl PageState {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            ..Self::default()
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Flash message if it has not expired yet
    pub fn visible_flash(&self, now: DateTime<Utc>) -> Option<&Flash> {
        self.flash.as_ref().filter(|f| f.is_visible(now))
    }

    /// Drop the flash once it has expired
    pub fn expire_flash(&mut self, now: DateTime<Utc>) {
        if self.flash.as_ref().is_some_and(|f| !f.is_visible(now)) {
            self.flash = None;
        }
    }

    pub fn catalog(&self) -> Option<&ActivityCatalog> {
        match &self.list {
            ListState::Loaded(catalog) => Some(catalog),
            _ => None,
        }
    }
}
