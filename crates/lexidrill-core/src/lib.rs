//! lexidrill-core — Session, usage ledger, scoring and broadcast engine.
//!
//! This crate owns the state that must stay consistent while a background
//! timer rotates the active word set and users submit sentences at the
//! same time. Every collaborator that talks to the network is a trait
//! defined in [`traits`] and implemented in `lexidrill-providers`.

pub mod error;
pub mod feedback;
pub mod ledger;
pub mod model;
pub mod scheduler;
pub mod scoreboard;
pub mod scoring;
pub mod session;
pub mod traits;

pub use error::LookupFailure;
pub use feedback::FeedbackLog;
pub use ledger::UsageLedger;
pub use model::{AwardTier, GrammarIssue, InboundMessage, Session, UserId, WordEntry};
pub use scheduler::{BroadcastScheduler, SchedulerConfig, TickReport};
pub use scoreboard::ScoreBoard;
pub use scoring::{ScoreOutcome, ScoringEngine, ScoringPolicy, WordAward};
pub use session::SessionStore;
