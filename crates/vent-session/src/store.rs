//! Per-user conversation state arena.
//!
//! Hands out one lock per user so that all events belonging to the same
//! user are applied one at a time, while different users proceed fully
//! independently. Entries whose mode has returned to `Idle` are evicted
//! after use, so the arena never grows beyond the set of users with an
//! authoring session in progress.
//!
//! Locks are std-sync and must never be held across an await point; the
//! dispatcher runs on the blocking pool.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use vent_types::UserId;

use crate::machine::SessionMode;

/// In-memory arena of per-user conversation state.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<UserId, Arc<Mutex<SessionMode>>>>,
}

impl SessionStore {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` with exclusive access to the user's session mode.
    ///
    /// The entry is created lazily in `Idle`. The per-user mutex is held
    /// for the entire closure, which is what serialises concurrent events
    /// for the same user. After the closure returns, an entry left in
    /// `Idle` is evicted.
    pub fn with_session<T>(&self, user_id: UserId, f: impl FnOnce(&mut SessionMode) -> T) -> T {
        let entry = {
            let mut sessions = self
                .sessions
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            Arc::clone(
                sessions
                    .entry(user_id)
                    .or_insert_with(|| Arc::new(Mutex::new(SessionMode::Idle))),
            )
        };

        let result = {
            // A poisoned entry means a previous handler panicked before
            // write-back; the stored mode is still the last consistent one.
            let mut mode = entry.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            f(&mut mode)
        };

        self.evict_if_idle(user_id);
        result
    }

    /// Returns a snapshot of the user's current mode, if a session exists.
    pub fn mode_of(&self, user_id: UserId) -> Option<SessionMode> {
        let sessions = self
            .sessions
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        sessions.get(&user_id).map(|entry| {
            entry
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .clone()
        })
    }

    /// Number of users with a live session entry.
    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// True when no session entries exist.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn evict_if_idle(&self, user_id: UserId) {
        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(entry) = sessions.get(&user_id) {
            // Only evict when nothing else holds the entry: with the map
            // write lock held, strong_count == 1 means no other handler
            // can be waiting on (or holding) this mutex.
            if Arc::strong_count(entry) == 1 {
                let idle = entry
                    .try_lock()
                    .map(|mode| mode.is_idle())
                    .unwrap_or(false);
                if idle {
                    sessions.remove(&user_id);
                }
            }
        }
    }
}
