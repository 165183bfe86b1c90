//! Per-activity in-flight tracking

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

/// Set of activities with a mutation currently on the wire
#[derive(Debug, Default)]
pub struct InFlight {
    active: Mutex<HashSet<String>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    fn active(&self) -> MutexGuard<'_, HashSet<String>> {
        self.active.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Claim `key`; `None` if another request already holds it
    pub fn try_acquire(&self, key: &str) -> Option<InFlightGuard<'_>> {
        if self.active().insert(key.to_string()) {
            Some(InFlightGuard {
                owner: self,
                key: key.to_string(),
            })
        } else {
            None
        }
    }

    pub fn is_active(&self, key: &str) -> bool {
        self.active().contains(key)
    }
}

/// Releases its key on drop
#[derive(Debug)]
pub struct InFlightGuard<'a> {
    owner: &'a InFlight,
    key: String,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.owner.active().remove(&self.key);
    }
}
