//! Append-only store for user feedback.

use std::sync::Mutex;

use chrono::Utc;

use crate::model::{FeedbackEntry, UserId};

/// Feedback submitted through the `/feedback` command.
#[derive(Default)]
pub struct FeedbackLog {
    entries: Mutex<Vec<FeedbackEntry>>,
}

impl FeedbackLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `text`. Blank feedback is ignored and reported as `false`.
    pub fn submit(&self, user: UserId, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        let entry = FeedbackEntry {
            user,
            text: text.to_string(),
            submitted_at: Utc::now(),
        };
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(entry);
        tracing::debug!(%user, "feedback received");
        true
    }

    /// A copy of all entries in submission order.
    pub fn entries(&self) -> Vec<FeedbackEntry> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
