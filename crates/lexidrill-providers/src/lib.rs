//! lexidrill-providers — Collaborator integrations.
//!
//! Implements the `lexidrill-core` collaborator traits for the
//! Merriam-Webster dictionary and thesaurus, local word lists, the
//! LanguageTool grammar checker, and the Telegram and console transports.

pub mod config;
pub mod console;
pub mod dictionary;
pub mod error;
pub mod grammar;
pub mod mock;
pub mod telegram;
pub mod vocabulary;
pub mod wordlist;

pub use config::{load_config_from, LexidrillConfig};
pub use error::ProviderError;
