//! Per-user concurrency tokens: at most one dispatch pipeline runs per user.
//!
//! The registry doubles as the monthly log's exclusion mechanism — no file
//! lock exists, so every history write must happen under a held guard.

use gbot_core::HandlerError;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// In-memory set of users with a dispatch in flight. Cloning shares the set.
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    active: Arc<Mutex<HashSet<i64>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the user's slot. Err([`HandlerError::SessionBusy`]) when a
    /// pipeline is already running for this user. The returned guard releases
    /// the slot on drop, whichever way the pipeline exits.
    pub fn acquire(&self, user_id: i64) -> Result<SessionGuard, HandlerError> {
        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        if !active.insert(user_id) {
            return Err(HandlerError::SessionBusy);
        }
        Ok(SessionGuard {
            user_id,
            active: self.active.clone(),
        })
    }

    pub fn is_busy(&self, user_id: i64) -> bool {
        self.active
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&user_id)
    }
}

/// Holds one user's slot; dropping it frees the slot.
#[derive(Debug)]
pub struct SessionGuard {
    user_id: i64,
    active: Arc<Mutex<HashSet<i64>>>,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.active
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.user_id);
    }
}
