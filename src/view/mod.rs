//! Declarative Rendering
//!
//! Pure functions from an immutable page snapshot to a view model. The view
//! model is then turned into HTML ([`html`]) or terminal text ([`text`]);
//! neither step touches the network or mutates state.

pub mod html;
pub mod text;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::client::{Activity, ActivityCatalog};
use crate::state::{FlashKind, ListState, PageState};

/// Shown in place of the list when the catalog could not be fetched
pub const LIST_FAILED_TEXT: &str = "Failed to load activities. Please try again later.";

/// Shown before the first catalog arrives
pub const LIST_LOADING_TEXT: &str = "Loading activities...";

/// Shown for an activity without participants
pub const EMPTY_ROSTER_TEXT: &str = "No participants yet";

/// One participant line in an activity roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterRow {
    pub email: String,
    /// Teacher-only removal control
    pub removable: bool,
}

/// One rendered activity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityCard {
    pub name: String,
    pub description: String,
    pub schedule: String,
    pub spots_left: i64,
    pub roster: Vec<RosterRow>,
}

impl ActivityCard {
    pub fn availability(&self) -> String {
        format!("{} spots left", self.spots_left)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListStatus {
    Loading,
    Loaded,
    Failed,
}

/// The activity list region
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityListView {
    pub status: ListStatus,
    /// Static text replacing the cards; empty when cards are shown
    pub notice: String,
    pub cards: Vec<ActivityCard>,
}

/// Header showing who is logged in
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthBarView {
    pub text: String,
    pub show_logout: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageView {
    pub text: String,
    pub kind: FlashKind,
}

impl MessageView {
    pub fn css_class(&self) -> &'static str {
        self.kind.css_class()
    }
}

/// Whole-page view model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageView {
    pub auth: AuthBarView,
    pub teacher_mode: bool,
    pub login_panel_open: bool,
    pub login_error: Option<String>,
    pub signup_form_visible: bool,
    pub teacher_notice_visible: bool,
    /// One selection option per activity, in list order
    pub activity_options: Vec<String>,
    pub message: Option<MessageView>,
    pub list: ActivityListView,
}

impl PageView {
    /// Login error text, empty when there is none
    pub fn login_error_text(&self) -> &str {
        self.login_error.as_deref().unwrap_or("")
    }

    pub fn message_class(&self) -> &'static str {
        self.message.as_ref().map_or("hidden", MessageView::css_class)
    }

    pub fn message_text(&self) -> &str {
        self.message.as_ref().map_or("", |m| m.text.as_str())
    }
}

fn render_card(activity: &Activity, authenticated: bool) -> ActivityCard {
    ActivityCard {
        name: activity.name.clone(),
        description: activity.description.clone(),
        schedule: activity.schedule.clone(),
        spots_left: activity.spots_left(),
        roster: activity
            .participants
            .iter()
            .map(|email| RosterRow {
                email: email.clone(),
                removable: authenticated,
            })
            .collect(),
    }
}

/// Map a catalog snapshot to activity cards
pub fn render_activities(catalog: &ActivityCatalog, authenticated: bool) -> Vec<ActivityCard> {
    catalog
        .activities()
        .iter()
        .map(|activity| render_card(activity, authenticated))
        .collect()
}

/// Map the list state to the list region
pub fn render_list(list: &ListState, authenticated: bool) -> ActivityListView {
    match list {
        ListState::Loading => ActivityListView {
            status: ListStatus::Loading,
            notice: LIST_LOADING_TEXT.to_string(),
            cards: Vec::new(),
        },
        ListState::Failed => ActivityListView {
            status: ListStatus::Failed,
            notice: LIST_FAILED_TEXT.to_string(),
            cards: Vec::new(),
        },
        ListState::Loaded(catalog) => ActivityListView {
            status: ListStatus::Loaded,
            notice: String::new(),
            cards: render_activities(catalog, authenticated),
        },
    }
}

/// Map the full page state to a view, as of `now`
pub fn render_page(state: &PageState, now: DateTime<Utc>) -> PageView {
    let authenticated = state.is_authenticated();

    let auth = match state.session.username() {
        Some(username) if authenticated => AuthBarView {
            text: format!("Logged in as: {}", username),
            show_logout: true,
        },
        _ => AuthBarView {
            text: "Not logged in".to_string(),
            show_logout: false,
        },
    };

    let activity_options: Vec<String> = state
        .catalog()
        .map(|catalog| catalog.names().map(str::to_string).collect())
        .unwrap_or_default();

    PageView {
        auth,
        teacher_mode: authenticated,
        login_panel_open: state.login_panel_open && !authenticated,
        login_error: state.login_error.clone(),
        signup_form_visible: authenticated,
        teacher_notice_visible: !authenticated,
        activity_options,
        message: state.visible_flash(now).map(|flash| MessageView {
            text: flash.text.clone(),
            kind: flash.kind,
        }),
        list: render_list(&state.list, authenticated),
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::session::Session;
    use crate::state::{Flash, FlashKind};
    use chrono::Duration;

    #[test]
    fn test_chess_club_scenario() {
        let cards = render_activities(&chess_catalog(), false);

        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].availability(), "9 spots left");
        assert_eq!(cards[0].roster.len(), 1);
        assert_eq!(cards[0].roster[0].email, "a@x.com");
    }

    #[test]
    fn test_spots_left_matches_capacity_for_every_activity() {
        let catalog = ActivityCatalog::new(vec![
            activity("Gym Class", 30, &["john@mergington.edu", "olivia@mergington.edu"]),
            activity("Math Club", 10, &[]),
            activity("Full", 2, &["a@x.com", "b@x.com"]),
        ]);

        for (card, activity) in render_activities(&catalog, true)
            .iter()
            .zip(catalog.activities())
        {
            assert_eq!(
                card.spots_left,
                activity.max_participants as i64 - activity.participants.len() as i64
            );
        }
    }

    #[test]
    fn test_removal_control_follows_authentication() {
        let catalog = ActivityCatalog::new(vec![activity(
            "Drama Club",
            20,
            &["ella@x.com", "scarlett@x.com"],
        )]);

        let anon = render_activities(&catalog, false);
        assert!(anon[0].roster.iter().all(|row| !row.removable));

        let teacher = render_activities(&catalog, true);
        assert!(teacher[0].roster.iter().all(|row| row.removable));
    }

    #[test]
    fn test_unverified_token_hides_teacher_controls() {
        let mut state = PageState::new(Session::restored(Some("stale".into())));
        state.list = ListState::Loaded(chess_catalog());

        let view = render_page(&state, Utc::now());
        assert!(!view.teacher_mode);
        assert!(!view.signup_form_visible);
        assert!(view.teacher_notice_visible);
        assert_eq!(view.auth.text, "Not logged in");
        assert!(!view.list.cards[0].roster[0].removable);
    }

    #[test]
    fn test_logged_in_page() {
        let mut state = PageState::new(Session::logged_in("tok", "mrodriguez"));
        state.list = ListState::Loaded(chess_catalog());
        state.login_panel_open = true;

        let view = render_page(&state, Utc::now());
        assert_eq!(view.auth.text, "Logged in as: mrodriguez");
        assert!(view.auth.show_logout);
        assert!(view.signup_form_visible);
        assert!(!view.teacher_notice_visible);
        assert!(!view.login_panel_open);
        assert_eq!(view.activity_options, vec!["Chess Club".to_string()]);
        assert!(view.list.cards[0].roster[0].removable);
    }

    #[test]
    fn test_failed_and_loading_lists() {
        let failed = render_list(&ListState::Failed, true);
        assert_eq!(failed.status, ListStatus::Failed);
        assert_eq!(failed.notice, LIST_FAILED_TEXT);
        assert!(failed.cards.is_empty());

        let loading = render_list(&ListState::Loading, false);
        assert_eq!(loading.status, ListStatus::Loading);
        assert_eq!(loading.notice, LIST_LOADING_TEXT);
    }

    #[test]
    fn test_expired_message_is_hidden() {
        let now = Utc::now();
        let mut state = PageState::default();
        state.flash = Some(Flash::new("Signed up", FlashKind::Success, now, Duration::seconds(5)));

        assert!(render_page(&state, now).message.is_some());
        assert!(render_page(&state, now + Duration::seconds(5)).message.is_none());
    }
}
