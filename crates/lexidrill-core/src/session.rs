//! The active word session.
//!
//! Readers load an `Arc<Session>` snapshot and keep it for as long as they
//! need; rotation publishes a fresh snapshot with a single atomic store, so
//! a reader sees either the old word list or the new one in full.

use std::sync::Arc;

use arc_swap::ArcSwapOption;

use crate::model::{Session, WordEntry};

/// Holds the currently active [`Session`].
pub struct SessionStore {
    current: ArcSwapOption<Session>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            current: ArcSwapOption::empty(),
        }
    }

    /// Replace the active session with one built from `words`.
    ///
    /// An empty `words` list is accepted and yields an empty session.
    pub fn rotate(&self, words: Vec<WordEntry>) -> Arc<Session> {
        let session = Arc::new(Session::new(words));
        self.current.store(Some(Arc::clone(&session)));
        tracing::info!(
            session = %session.id,
            words = session.words.len(),
            "rotated active session"
        );
        session
    }

    /// The active session, or `None` before the first rotation.
    pub fn current(&self) -> Option<Arc<Session>> {
        self.current.load_full()
    }
}
