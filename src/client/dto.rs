//! Activities API payloads
//!
//! Request and response bodies exchanged with the remote activities API.

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A named extracurricular offering
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Activity {
    pub name: String,
    pub description: String,
    pub schedule: String,
    pub max_participants: u32,
    pub participants: Vec<String>,
}

impl Activity {
    /// Remaining capacity (max minus current participants)
    ///
    /// Signed so an over-subscribed activity reported by the server shows
    /// up as negative instead of wrapping.
    pub fn spots_left(&self) -> i64 {
        i64::from(self.max_participants) - self.participants.len() as i64
    }
}

/// Activity body as the server sends it, keyed by name in the catalog
#[derive(Debug, Deserialize)]
struct ActivityDetails {
    #[serde(default)]
    description: String,
    #[serde(default)]
    schedule: String,
    max_participants: u32,
    #[serde(default)]
    participants: Vec<String>,
}

/// Snapshot of `GET /activities`, in server order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActivityCatalog {
    activities: Vec<Activity>,
}

impl ActivityCatalog {
    pub fn new(activities: Vec<Activity>) -> Self {
        Self { activities }
    }

    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    pub fn get(&self, name: &str) -> Option<&Activity> {
        self.activities.iter().find(|a| a.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.activities.iter().map(|a| a.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }
}

impl<'de> Deserialize<'de> for ActivityCatalog {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct CatalogVisitor;

        impl<'de> Visitor<'de> for CatalogVisitor {
            type Value = ActivityCatalog;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of activity name to activity details")
            }

            fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
            where
                M: MapAccess<'de>,
            {
                let mut activities = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, details)) = map.next_entry::<String, ActivityDetails>()? {
                    activities.push(Activity {
                        name,
                        description: details.description,
                        schedule: details.schedule,
                        max_participants: details.max_participants,
                        participants: details.participants,
                    });
                }
                Ok(ActivityCatalog { activities })
            }
        }

        deserializer.deserialize_map(CatalogVisitor)
    }
}

/// `POST /auth/login` body
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Successful login response
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    pub username: String,
}

/// `GET /auth/verify` response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerifyResponse {
    #[serde(default)]
    pub authenticated: bool,
    #[serde(default)]
    pub username: Option<String>,
}

/// Success body of the signup/unregister endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Error body returned with non-2xx statuses
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    /// Only plain-string details are user-presentable
    pub(crate) fn into_detail(self) -> Option<String> {
        match self.detail {
            Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s),
            _ => None,
        }
    }
}
