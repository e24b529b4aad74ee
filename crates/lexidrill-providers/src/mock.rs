//! Mock collaborators for testing the bot without network access.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use lexidrill_core::model::{GrammarIssue, InboundMessage, UserId, WordEntry};
use lexidrill_core::traits::{GrammarChecker, Relation, Thesaurus, Transport, WordSource};
use lexidrill_core::LookupFailure;

/// A word source that always hands out the same words.
pub struct MockWordSource {
    words: Vec<WordEntry>,
    failing: AtomicBool,
    call_count: AtomicU32,
}

impl MockWordSource {
    pub fn new(words: Vec<WordEntry>) -> Self {
        Self {
            words,
            failing: AtomicBool::new(false),
            call_count: AtomicU32::new(0),
        }
    }

    /// Shorthand for words whose definition is `"definition of <word>"`.
    pub fn with_words(words: &[&str]) -> Self {
        Self::new(
            words
                .iter()
                .map(|w| WordEntry::new(*w, format!("definition of {w}")))
                .collect(),
        )
    }

    /// Make subsequent fetches fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Relaxed);
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl WordSource for MockWordSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(&self, n: usize) -> Result<Vec<WordEntry>, LookupFailure> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        if self.failing.load(Ordering::Relaxed) {
            return Err(LookupFailure::NetworkError("mock word source is down".into()));
        }
        Ok(self.words.iter().take(n).cloned().collect())
    }
}

/// A thesaurus backed by a fixed table.
#[derive(Default)]
pub struct MockThesaurus {
    synonyms: HashMap<String, Vec<String>>,
    antonyms: HashMap<String, Vec<String>>,
}

impl MockThesaurus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn synonyms(mut self, word: &str, related: &[&str]) -> Self {
        self.synonyms
            .insert(word.to_lowercase(), related.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn antonyms(mut self, word: &str, related: &[&str]) -> Self {
        self.antonyms
            .insert(word.to_lowercase(), related.iter().map(|s| s.to_string()).collect());
        self
    }
}

#[async_trait]
impl Thesaurus for MockThesaurus {
    async fn related(
        &self,
        word: &str,
        relation: Relation,
    ) -> Result<Vec<String>, LookupFailure> {
        let table = match relation {
            Relation::Synonym => &self.synonyms,
            Relation::Antonym => &self.antonyms,
        };
        Ok(table.get(&word.to_lowercase()).cloned().unwrap_or_default())
    }
}

/// A grammar checker that reports the same issues for every text, or fails.
pub struct MockGrammarChecker {
    issues: Vec<GrammarIssue>,
    fail: bool,
    delays: Vec<(String, Duration)>,
    checked: Mutex<Vec<(String, Instant)>>,
}

impl MockGrammarChecker {
    pub fn clean() -> Self {
        Self::with_issues(Vec::new())
    }

    pub fn with_issues(issues: Vec<GrammarIssue>) -> Self {
        Self {
            issues,
            fail: false,
            delays: Vec::new(),
            checked: Mutex::new(Vec::new()),
        }
    }

    /// `count` issues with generated messages.
    pub fn with_issue_count(count: usize) -> Self {
        Self::with_issues(
            (1..=count)
                .map(|i| GrammarIssue {
                    message: format!("issue {i}"),
                    suggestions: Vec::new(),
                })
                .collect(),
        )
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::clean()
        }
    }

    /// Take `delay` to answer for any text containing `fragment`.
    pub fn delay_on(mut self, fragment: &str, delay: Duration) -> Self {
        self.delays.push((fragment.to_string(), delay));
        self
    }

    /// Every text passed to `check`, in call order.
    pub fn checked(&self) -> Vec<String> {
        self.checked_at().into_iter().map(|(text, _)| text).collect()
    }

    /// Like `checked`, with the instant each check started.
    pub fn checked_at(&self) -> Vec<(String, Instant)> {
        self.checked
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl GrammarChecker for MockGrammarChecker {
    fn name(&self) -> &str {
        "mock"
    }

    async fn check(&self, text: &str) -> anyhow::Result<Vec<GrammarIssue>> {
        self.checked
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((text.to_string(), Instant::now()));
        if let Some((_, delay)) = self.delays.iter().find(|(f, _)| text.contains(f.as_str())) {
            tokio::time::sleep(*delay).await;
        }
        if self.fail {
            anyhow::bail!("mock grammar checker is down");
        }
        Ok(self.issues.clone())
    }
}

/// A transport that replays scripted inbound batches and records sends.
///
/// Once the script is exhausted, `receive` reports the transport as closed.
#[derive(Default)]
pub struct RecordingTransport {
    inbound: Mutex<VecDeque<Vec<InboundMessage>>>,
    sent: Mutex<Vec<(UserId, String)>>,
    unreachable: Mutex<Vec<UserId>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a batch to be returned by a later `receive`.
    pub fn push_batch(&self, batch: Vec<InboundMessage>) {
        self.inbound
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(batch);
    }

    /// Make every send to `user` fail.
    pub fn fail_sends_to(&self, user: UserId) {
        self.unreachable
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(user);
    }

    /// Everything sent so far, in send order.
    pub fn sent(&self) -> Vec<(UserId, String)> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Texts sent to `user`, in send order.
    pub fn sent_to(&self, user: UserId) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter(|(u, _)| *u == user)
            .map(|(_, text)| text)
            .collect()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send(&self, user: UserId, text: &str) -> anyhow::Result<()> {
        if self
            .unreachable
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&user)
        {
            anyhow::bail!("user {user} is unreachable");
        }
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((user, text.to_string()));
        Ok(())
    }

    async fn receive(&self) -> anyhow::Result<Option<Vec<InboundMessage>>> {
        Ok(self
            .inbound
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn word_source_can_be_toggled() {
        let source = MockWordSource::with_words(&["eloquent", "zenith"]);
        assert_eq!(source.fetch(1).await.unwrap().len(), 1);
        source.set_failing(true);
        assert!(source.fetch(1).await.is_err());
        assert_eq!(source.call_count(), 2);
    }

    #[tokio::test]
    async fn recording_transport_replays_then_closes() {
        let transport = RecordingTransport::new();
        transport.push_batch(vec![InboundMessage::new(1, "hi")]);
        transport.fail_sends_to(UserId(2));

        assert_eq!(transport.receive().await.unwrap().unwrap().len(), 1);
        assert!(transport.receive().await.unwrap().is_none());

        transport.send(UserId(1), "hello").await.unwrap();
        assert!(transport.send(UserId(2), "hello").await.is_err());
        assert_eq!(transport.sent(), vec![(UserId(1), "hello".to_string())]);
    }

    #[tokio::test(start_paused = true)]
    async fn grammar_checker_delays_matching_texts() {
        let checker = MockGrammarChecker::clean().delay_on("slow", Duration::from_secs(15));
        let start = Instant::now();

        checker.check("quick one").await.unwrap();
        assert!(start.elapsed() < Duration::from_secs(1));
        checker.check("a slow one").await.unwrap();
        assert!(start.elapsed() >= Duration::from_secs(15));
        assert_eq!(checker.checked(), vec!["quick one", "a slow one"]);
    }

    #[tokio::test]
    async fn thesaurus_lookup_ignores_case() {
        let thesaurus = MockThesaurus::new().synonyms("happy", &["glad"]);
        assert_eq!(
            thesaurus.related("Happy", Relation::Synonym).await.unwrap(),
            vec!["glad"]
        );
        assert!(thesaurus
            .related("happy", Relation::Antonym)
            .await
            .unwrap()
            .is_empty());
    }
}
