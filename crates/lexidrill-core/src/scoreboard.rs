//! Cumulative scores and the leaderboard.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use crate::model::UserId;

#[derive(Debug, Clone, Copy)]
struct ScoreEntry {
    score: i64,
    /// Registration order, used to break ties in [`ScoreBoard::rank`].
    seq: u64,
}

/// Running point totals per user.
///
/// Totals are plain sums of deltas and may be negative.
#[derive(Default)]
pub struct ScoreBoard {
    entries: DashMap<UserId, ScoreEntry>,
    next_seq: AtomicU64,
}

impl ScoreBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `delta` to the user's total, registering them at 0 first if needed.
    ///
    /// Returns the new total.
    pub fn add_delta(&self, user: UserId, delta: i64) -> i64 {
        let mut entry = self.entries.entry(user).or_insert_with(|| ScoreEntry {
            score: 0,
            seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
        });
        entry.score += delta;
        entry.score
    }

    /// The user's total, or `None` if they never scored.
    pub fn score(&self, user: UserId) -> Option<i64> {
        self.entries.get(&user).map(|e| e.score)
    }

    /// All entries, highest score first; ties go to the earlier registration.
    pub fn rank(&self) -> Vec<(UserId, i64)> {
        let mut snapshot: Vec<(UserId, ScoreEntry)> =
            self.entries.iter().map(|e| (*e.key(), *e.value())).collect();
        snapshot.sort_by(|(_, a), (_, b)| b.score.cmp(&a.score).then(a.seq.cmp(&b.seq)));
        snapshot.into_iter().map(|(u, e)| (u, e.score)).collect()
    }

    /// Every user who has ever scored, in registration order.
    pub fn users(&self) -> Vec<UserId> {
        let mut users: Vec<(UserId, u64)> =
            self.entries.iter().map(|e| (*e.key(), e.seq)).collect();
        users.sort_by_key(|(_, seq)| *seq);
        users.into_iter().map(|(u, _)| u).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
