//! Core data model types for lexidrill.
//!
//! These are the values that flow between the session store, the ledger,
//! the scoring engine and the collaborators.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A drill word together with its definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordEntry {
    /// The word as shown to users.
    pub word: String,
    /// Short definition.
    pub definition: String,
}

impl WordEntry {
    pub fn new(word: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            definition: definition.into(),
        }
    }
}

/// An immutable batch of active words.
///
/// Sessions are never edited after construction; rotation swaps in a whole
/// new value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Identifier used to correlate rotation and broadcast logs.
    pub id: Uuid,
    /// Active words, in the order they were supplied.
    pub words: Vec<WordEntry>,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(words: Vec<WordEntry>) -> Self {
        Self {
            id: Uuid::new_v4(),
            words,
            created_at: Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// One `word: definition` line per entry.
    pub fn render(&self) -> String {
        self.words
            .iter()
            .map(|w| format!("{}: {}", w.word, w.definition))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Opaque identifier of a chat participant.
///
/// Backed by the chat id, which is also the address replies are sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(UserId)
            .map_err(|_| format!("invalid user id: {s}"))
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        UserId(id)
    }
}

/// Classification of a scoring event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AwardTier {
    /// First time this user is credited for this word.
    FirstUse,
    /// The user has been credited for this word before.
    RepeatUse,
}

impl fmt::Display for AwardTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AwardTier::FirstUse => write!(f, "first use"),
            AwardTier::RepeatUse => write!(f, "repeat use"),
        }
    }
}

/// A single problem reported by the grammar checker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarIssue {
    /// Human-readable description.
    pub message: String,
    /// Suggested replacements, best first.
    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// A free-text message delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub user: UserId,
    pub text: String,
}

impl InboundMessage {
    pub fn new(user: impl Into<UserId>, text: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            text: text.into(),
        }
    }
}

/// A piece of feedback submitted through `/feedback`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub user: UserId,
    pub text: String,
    pub submitted_at: DateTime<Utc>,
}
