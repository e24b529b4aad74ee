//! Per-user history of credited words.

use std::collections::{BTreeSet, HashMap};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::model::{AwardTier, UserId};

/// Usage of one word by one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Set once the full first-use award has been paid.
    pub credited: bool,
    /// Number of times the word has been credited.
    pub count: u32,
}

/// Tracks which words each user has already been credited for.
///
/// Records are never removed. Each user's map lives behind one dashmap
/// shard lock, which makes the check-and-mark in [`record_usage`] atomic
/// per `(user, word)` while leaving users in other shards untouched.
///
/// [`record_usage`]: UsageLedger::record_usage
#[derive(Default)]
pub struct UsageLedger {
    users: DashMap<UserId, HashMap<String, UsageRecord>>,
}

impl UsageLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `user` for `word` and report which award tier applies.
    ///
    /// Words are compared case-insensitively.
    pub fn record_usage(&self, user: UserId, word: &str) -> AwardTier {
        let key = word.to_lowercase();
        let mut words = self.users.entry(user).or_default();
        let record = words.entry(key).or_insert(UsageRecord {
            credited: false,
            count: 0,
        });
        record.count += 1;
        if record.credited {
            AwardTier::RepeatUse
        } else {
            record.credited = true;
            AwardTier::FirstUse
        }
    }

    /// Words ever credited to `user`.
    pub fn history(&self, user: UserId) -> BTreeSet<String> {
        self.users
            .get(&user)
            .map(|words| words.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// The usage record for `(user, word)`, if the user was ever credited for it.
    pub fn usage(&self, user: UserId, word: &str) -> Option<UsageRecord> {
        self.users
            .get(&user)
            .and_then(|words| words.get(&word.to_lowercase()).copied())
    }
}
