//! Collaborator trait definitions.
//!
//! These async traits are implemented by the `lexidrill-providers` crate.
//! The core only ever talks to the network through them.

use std::fmt;

use async_trait::async_trait;

use crate::error::LookupFailure;
use crate::model::{GrammarIssue, InboundMessage, UserId, WordEntry};

// ---------------------------------------------------------------------------
// Vocabulary
// ---------------------------------------------------------------------------

/// Supplies batches of candidate drill words with definitions.
#[async_trait]
pub trait WordSource: Send + Sync {
    /// Human-readable source name (e.g. "merriam-webster").
    fn name(&self) -> &str;

    /// Fetch up to `n` distinct words.
    async fn fetch(&self, n: usize) -> Result<Vec<WordEntry>, LookupFailure>;
}

/// Which kind of related words to look up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Synonym,
    Antonym,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relation::Synonym => write!(f, "synonyms"),
            Relation::Antonym => write!(f, "antonyms"),
        }
    }
}

/// Thesaurus-style lookups used by the `/synonym` and `/antonym` commands.
#[async_trait]
pub trait Thesaurus: Send + Sync {
    /// Related words for `word`, best first. An empty list means none known.
    async fn related(&self, word: &str, relation: Relation)
        -> Result<Vec<String>, LookupFailure>;
}

// ---------------------------------------------------------------------------
// Grammar
// ---------------------------------------------------------------------------

/// Grades a sentence.
#[async_trait]
pub trait GrammarChecker: Send + Sync {
    /// Human-readable checker name (e.g. "languagetool").
    fn name(&self) -> &str;

    /// Issues found in `text`, in document order.
    async fn check(&self, text: &str) -> anyhow::Result<Vec<GrammarIssue>>;
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// Chat transport: delivers inbound messages and sends replies.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Human-readable transport name (e.g. "telegram").
    fn name(&self) -> &str;

    /// Send `text` to `user`. Delivery is best effort.
    async fn send(&self, user: UserId, text: &str) -> anyhow::Result<()>;

    /// Wait for the next batch of inbound messages.
    ///
    /// Returns `Ok(None)` once the transport is closed and no more messages
    /// will arrive. An empty batch is a normal poll timeout.
    async fn receive(&self) -> anyhow::Result<Option<Vec<InboundMessage>>>;
}
