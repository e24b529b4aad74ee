//! Turns an inbound sentence into point awards.
//!
//! A message earns points for every active word it uses. The sentence is
//! graded once and the same issue list is charged against each matched
//! word.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::ledger::UsageLedger;
use crate::model::{AwardTier, GrammarIssue, UserId, WordEntry};
use crate::scoreboard::ScoreBoard;
use crate::session::SessionStore;
use crate::traits::GrammarChecker;

/// Point values used when scoring a word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    /// Base award the first time a user is credited for a word.
    #[serde(default = "default_first_use_points")]
    pub first_use_points: i64,
    /// Base award for every later use of the same word.
    #[serde(default = "default_repeat_use_points")]
    pub repeat_use_points: i64,
    /// Deducted per grammar issue, from every matched word.
    #[serde(default = "default_penalty_per_issue")]
    pub penalty_per_issue: i64,
}

fn default_first_use_points() -> i64 {
    30
}
fn default_repeat_use_points() -> i64 {
    20
}
fn default_penalty_per_issue() -> i64 {
    5
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            first_use_points: default_first_use_points(),
            repeat_use_points: default_repeat_use_points(),
            penalty_per_issue: default_penalty_per_issue(),
        }
    }
}

impl ScoringPolicy {
    pub fn base_points(&self, tier: AwardTier) -> i64 {
        match tier {
            AwardTier::FirstUse => self.first_use_points,
            AwardTier::RepeatUse => self.repeat_use_points,
        }
    }

    pub fn penalty(&self, issue_count: usize) -> i64 {
        self.penalty_per_issue * issue_count as i64
    }
}

/// Points awarded for one matched word.
#[derive(Debug, Clone)]
pub struct WordAward {
    pub word: String,
    pub tier: AwardTier,
    pub base: i64,
    pub penalty: i64,
    /// `base - penalty`; negative when the penalty exceeds the base.
    pub delta: i64,
    /// Issues found in the whole message, shared by every award from it.
    pub issues: Arc<Vec<GrammarIssue>>,
    /// The user's total right after this award was applied.
    pub total: i64,
}

impl WordAward {
    /// Reply text for this award.
    pub fn render(&self) -> String {
        let grammar = if self.issues.is_empty() {
            "No issues found.".to_string()
        } else {
            self.issues
                .iter()
                .map(|issue| {
                    if issue.suggestions.is_empty() {
                        format!("- {}", issue.message)
                    } else {
                        format!(
                            "- {}\n  Suggestions: {}",
                            issue.message,
                            issue.suggestions.join(", ")
                        )
                    }
                })
                .collect::<Vec<_>>()
                .join("\n")
        };
        format!(
            "Points earned for '{}': {}\nGrammar Feedback:\n{}\n\nTotal Points: {}",
            self.word, self.delta, grammar, self.total
        )
    }
}

/// Result of scoring one message.
#[derive(Debug, Clone)]
pub enum ScoreOutcome {
    /// No active session, an empty one, or none of its words were used.
    NoActiveWord,
    /// One award per matched word, in session order.
    Scored(Vec<WordAward>),
}

impl ScoreOutcome {
    pub fn awards(&self) -> &[WordAward] {
        match self {
            ScoreOutcome::NoActiveWord => &[],
            ScoreOutcome::Scored(awards) => awards,
        }
    }
}

/// Scores messages against the active session.
pub struct ScoringEngine {
    sessions: Arc<SessionStore>,
    ledger: Arc<UsageLedger>,
    board: Arc<ScoreBoard>,
    grammar: Arc<dyn GrammarChecker>,
    policy: ScoringPolicy,
}

impl ScoringEngine {
    pub fn new(
        sessions: Arc<SessionStore>,
        ledger: Arc<UsageLedger>,
        board: Arc<ScoreBoard>,
        grammar: Arc<dyn GrammarChecker>,
        policy: ScoringPolicy,
    ) -> Self {
        Self {
            sessions,
            ledger,
            board,
            grammar,
            policy,
        }
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    /// Score `text` sent by `user`.
    ///
    /// The session is read once up front; a rotation that lands while the
    /// grammar check is in flight does not change which words are scored.
    pub async fn score_message(&self, user: UserId, text: &str) -> ScoreOutcome {
        let Some(session) = self.sessions.current() else {
            return ScoreOutcome::NoActiveWord;
        };

        let matched = matched_words(&session.words, text);
        if matched.is_empty() {
            tracing::debug!(%user, session = %session.id, "no active word used");
            return ScoreOutcome::NoActiveWord;
        }

        let issues = Arc::new(self.grade(text).await);
        let penalty = self.policy.penalty(issues.len());

        let awards = matched
            .into_iter()
            .map(|entry| {
                let tier = self.ledger.record_usage(user, &entry.word);
                let base = self.policy.base_points(tier);
                let delta = base - penalty;
                let total = self.board.add_delta(user, delta);
                tracing::debug!(%user, word = %entry.word, %tier, delta, total, "word scored");
                WordAward {
                    word: entry.word.clone(),
                    tier,
                    base,
                    penalty,
                    delta,
                    issues: Arc::clone(&issues),
                    total,
                }
            })
            .collect();

        ScoreOutcome::Scored(awards)
    }

    /// Grammar issues for `text`; a checker failure counts as no issues.
    async fn grade(&self, text: &str) -> Vec<GrammarIssue> {
        match self.grammar.check(text).await {
            Ok(issues) => issues,
            Err(e) => {
                tracing::warn!(
                    checker = self.grammar.name(),
                    "grammar check failed, scoring with zero issues: {e:#}"
                );
                Vec::new()
            }
        }
    }
}

/// Session words that occur in `text` as case-insensitive substrings, in
/// session order, each at most once. "eloquently" uses "eloquent".
pub fn matched_words<'a>(words: &'a [WordEntry], text: &str) -> Vec<&'a WordEntry> {
    let lowered = text.to_lowercase();
    let mut seen = HashSet::new();
    words
        .iter()
        .filter(|entry| {
            let word = entry.word.to_lowercase();
            !word.is_empty() && lowered.contains(&word) && seen.insert(word)
        })
        .collect()
}
