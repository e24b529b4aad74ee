//! Slash commands and sentence scoring for incoming chat messages.

use std::sync::Arc;

use tracing::{debug, warn};

use lexidrill_core::traits::{GrammarChecker, Relation, Thesaurus, Transport, WordSource};
use lexidrill_core::{
    BroadcastScheduler, FeedbackLog, InboundMessage, SchedulerConfig, ScoreBoard, ScoreOutcome,
    ScoringEngine, ScoringPolicy, SessionStore, UsageLedger, UserId,
};

pub const WELCOME: &str = "Welcome to Vocabulary Booster Bot! Use /help to explore.";
pub const HELP: &str = "/start - Start the bot\n\
/dailyword - Get new words\n\
/synonym [word] - Fetch synonyms\n\
/antonym [word] - Fetch antonyms\n\
/leaderboard - View top users\n\
/feedback [text] - Provide feedback";
pub const NO_ACTIVE_WORD: &str = "Please use one of the active vocabulary words in your sentence.";
pub const FEEDBACK_THANKS: &str = "Thank you for your feedback!";
pub const FEEDBACK_EMPTY: &str = "Please provide feedback.";
pub const UNKNOWN_COMMAND: &str = "Unknown command. Use /help to see what I can do.";
const FETCH_FAILED: &str = "Could not fetch new words right now. Please try again later.";
const MAX_RELATED: usize = 5;

/// A parsed slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    Start,
    Help,
    DailyWord,
    Synonym(&'a str),
    Antonym(&'a str),
    Leaderboard,
    Feedback(&'a str),
    Unknown(&'a str),
}

impl<'a> Command<'a> {
    /// Parse `text` as a command. Returns `None` for ordinary sentences.
    ///
    /// A `@botname` suffix on the command (as Telegram sends in groups) is
    /// ignored.
    pub fn parse(text: &'a str) -> Option<Self> {
        let rest = text.trim().strip_prefix('/')?;
        let (head, args) = match rest.split_once(char::is_whitespace) {
            Some((head, args)) => (head, args.trim()),
            None => (rest, ""),
        };
        let name = head.split('@').next().unwrap_or(head);

        Some(match name.to_lowercase().as_str() {
            "start" => Command::Start,
            "help" => Command::Help,
            "dailyword" => Command::DailyWord,
            "synonym" => Command::Synonym(args),
            "antonym" => Command::Antonym(args),
            "leaderboard" => Command::Leaderboard,
            "feedback" => Command::Feedback(args),
            _ => Command::Unknown(name),
        })
    }
}

/// The bot: shared drill state plus the collaborators that feed it.
pub struct Bot {
    engine: ScoringEngine,
    scheduler: Arc<BroadcastScheduler>,
    thesaurus: Arc<dyn Thesaurus>,
    transport: Arc<dyn Transport>,
    sessions: Arc<SessionStore>,
    board: Arc<ScoreBoard>,
    feedback: FeedbackLog,
}

impl Bot {
    pub fn new(
        source: Arc<dyn WordSource>,
        thesaurus: Arc<dyn Thesaurus>,
        grammar: Arc<dyn GrammarChecker>,
        transport: Arc<dyn Transport>,
        policy: ScoringPolicy,
        scheduler_config: SchedulerConfig,
    ) -> Self {
        let sessions = Arc::new(SessionStore::new());
        let ledger = Arc::new(UsageLedger::new());
        let board = Arc::new(ScoreBoard::new());

        let engine = ScoringEngine::new(
            sessions.clone(),
            ledger,
            board.clone(),
            grammar,
            policy,
        );
        let scheduler = Arc::new(BroadcastScheduler::new(
            source,
            sessions.clone(),
            board.clone(),
            transport.clone(),
            scheduler_config,
        ));

        Self {
            engine,
            scheduler,
            thesaurus,
            transport,
            sessions,
            board,
            feedback: FeedbackLog::new(),
        }
    }

    pub fn policy(&self) -> &ScoringPolicy {
        self.engine.policy()
    }

    pub fn scheduler(&self) -> &Arc<BroadcastScheduler> {
        &self.scheduler
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    #[cfg(test)]
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    #[cfg(test)]
    pub fn board(&self) -> &ScoreBoard {
        &self.board
    }

    #[cfg(test)]
    pub fn feedback(&self) -> &FeedbackLog {
        &self.feedback
    }

    /// Handle one message and send every reply back to its author.
    pub async fn respond(&self, message: InboundMessage) {
        let user = message.user;
        for reply in self.handle(message).await {
            if let Err(e) = self.transport.send(user, &reply).await {
                warn!(%user, "failed to send reply: {e:#}");
            }
        }
    }

    /// Replies to one message, in send order.
    pub async fn handle(&self, message: InboundMessage) -> Vec<String> {
        let user = message.user;
        let Some(command) = Command::parse(&message.text) else {
            return self.score(user, &message.text).await;
        };

        debug!(%user, ?command, "command");
        let reply = match command {
            Command::Start => WELCOME.to_string(),
            Command::Help => HELP.to_string(),
            Command::DailyWord => self.daily_word().await,
            Command::Synonym(word) => self.related(word, Relation::Synonym).await,
            Command::Antonym(word) => self.related(word, Relation::Antonym).await,
            Command::Leaderboard => self.leaderboard(),
            Command::Feedback(text) => {
                if self.feedback.submit(user, text) {
                    FEEDBACK_THANKS.to_string()
                } else {
                    FEEDBACK_EMPTY.to_string()
                }
            }
            Command::Unknown(_) => UNKNOWN_COMMAND.to_string(),
        };
        vec![reply]
    }

    async fn score(&self, user: UserId, text: &str) -> Vec<String> {
        match self.engine.score_message(user, text).await {
            ScoreOutcome::NoActiveWord => vec![NO_ACTIVE_WORD.to_string()],
            ScoreOutcome::Scored(awards) => awards.iter().map(|a| a.render()).collect(),
        }
    }

    async fn daily_word(&self) -> String {
        match self.scheduler.rotate_now().await {
            Ok(session) => format!("Today's Vocabulary:\n{}", session.render()),
            Err(e) => {
                warn!(
                    active = self.sessions.current().is_some(),
                    "dailyword fetch failed: {e}"
                );
                FETCH_FAILED.to_string()
            }
        }
    }

    async fn related(&self, word: &str, relation: Relation) -> String {
        let (label, command) = match relation {
            Relation::Synonym => ("Synonyms", "synonym"),
            Relation::Antonym => ("Antonyms", "antonym"),
        };
        if word.is_empty() {
            return format!("Usage: /{command} <word>");
        }

        let words = self
            .thesaurus
            .related(word, relation)
            .await
            .unwrap_or_else(|e| {
                warn!(word, %relation, "thesaurus lookup failed: {e}");
                Vec::new()
            });

        let listed = if words.is_empty() {
            format!("No {relation} available.")
        } else {
            words
                .into_iter()
                .take(MAX_RELATED)
                .collect::<Vec<_>>()
                .join(", ")
        };
        format!("{label} for {word}: {listed}")
    }

    fn leaderboard(&self) -> String {
        let ranked = self.board.rank();
        if ranked.is_empty() {
            return "Leaderboard:\nNo scores yet.".to_string();
        }
        let lines: Vec<String> = ranked
            .into_iter()
            .map(|(user, score)| format!("User {user}: {score} points"))
            .collect();
        format!("Leaderboard:\n{}", lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use lexidrill_core::model::GrammarIssue;
    use lexidrill_providers::mock::{
        MockGrammarChecker, MockThesaurus, MockWordSource, RecordingTransport,
    };

    use super::*;

    struct Harness {
        bot: Bot,
        source: Arc<MockWordSource>,
        grammar: Arc<MockGrammarChecker>,
        transport: Arc<RecordingTransport>,
    }

    fn harness(grammar: MockGrammarChecker) -> Harness {
        harness_with(grammar, ScoringPolicy::default())
    }

    fn harness_with(grammar: MockGrammarChecker, policy: ScoringPolicy) -> Harness {
        let grammar = Arc::new(grammar);
        let source = Arc::new(MockWordSource::with_words(&["eloquent", "zenith"]));
        let transport = Arc::new(RecordingTransport::new());
        let thesaurus = MockThesaurus::new()
            .synonyms("happy", &["glad", "cheerful", "joyful", "merry", "jolly", "upbeat"])
            .antonyms("happy", &["sad"]);
        let bot = Bot::new(
            source.clone(),
            Arc::new(thesaurus),
            grammar.clone(),
            transport.clone(),
            policy,
            SchedulerConfig::default(),
        );
        Harness {
            bot,
            source,
            grammar,
            transport,
        }
    }

    async fn say(bot: &Bot, user: i64, text: &str) -> Vec<String> {
        bot.handle(InboundMessage::new(user, text)).await
    }

    #[test]
    fn parse_commands() {
        assert_eq!(Command::parse("/start"), Some(Command::Start));
        assert_eq!(Command::parse("  /HELP  "), Some(Command::Help));
        assert_eq!(Command::parse("/dailyword@LexiBot"), Some(Command::DailyWord));
        assert_eq!(
            Command::parse("/synonym   happy "),
            Some(Command::Synonym("happy"))
        );
        assert_eq!(
            Command::parse("/feedback more words please"),
            Some(Command::Feedback("more words please"))
        );
        assert_eq!(Command::parse("/feedback"), Some(Command::Feedback("")));
        assert_eq!(Command::parse("/dance"), Some(Command::Unknown("dance")));
        assert_eq!(Command::parse("she was eloquent"), None);
    }

    #[tokio::test]
    async fn start_and_help() {
        let h = harness(MockGrammarChecker::clean());
        assert_eq!(say(&h.bot, 1, "/start").await, vec![WELCOME]);
        assert_eq!(say(&h.bot, 1, "/help").await, vec![HELP]);
        assert_eq!(say(&h.bot, 1, "/nope").await, vec![UNKNOWN_COMMAND]);
    }

    #[tokio::test]
    async fn dailyword_rotates_and_lists_words() {
        let h = harness(MockGrammarChecker::clean());
        let reply = say(&h.bot, 1, "/dailyword").await;
        assert_eq!(
            reply,
            vec!["Today's Vocabulary:\neloquent: definition of eloquent\nzenith: definition of zenith"]
        );
        assert_eq!(h.bot.sessions().current().unwrap().words.len(), 2);
    }

    #[tokio::test]
    async fn dailyword_failure_keeps_previous_session() {
        let h = harness(MockGrammarChecker::clean());
        say(&h.bot, 1, "/dailyword").await;
        let before = h.bot.sessions().current().unwrap().id;

        h.source.set_failing(true);
        let reply = say(&h.bot, 1, "/dailyword").await;
        assert_eq!(reply, vec![FETCH_FAILED]);
        assert_eq!(h.bot.sessions().current().unwrap().id, before);
    }

    #[tokio::test]
    async fn sentence_scoring_first_then_repeat() {
        let h = harness(MockGrammarChecker::clean());
        say(&h.bot, 1, "/dailyword").await;

        let reply = say(&h.bot, 1, "She was eloquent today.").await;
        assert_eq!(
            reply,
            vec!["Points earned for 'eloquent': 30\nGrammar Feedback:\nNo issues found.\n\nTotal Points: 30"]
        );

        let reply = say(&h.bot, 1, "Eloquent again.").await;
        assert!(reply[0].starts_with("Points earned for 'eloquent': 20"));
        assert!(reply[0].ends_with("Total Points: 50"));
    }

    #[tokio::test]
    async fn grader_sees_the_sentence_as_written() {
        let h = harness(MockGrammarChecker::clean());
        say(&h.bot, 1, "/dailyword").await;
        say(&h.bot, 1, "hello there").await;
        say(&h.bot, 1, "At its Zenith, the speech was ELOQUENT.").await;

        // commands and sentences without an active word are never graded
        assert_eq!(
            h.grammar.checked(),
            vec!["At its Zenith, the speech was ELOQUENT."]
        );
    }

    #[tokio::test]
    async fn configured_policy_sets_the_awards() {
        let policy = ScoringPolicy {
            first_use_points: 50,
            repeat_use_points: 10,
            penalty_per_issue: 3,
        };
        let h = harness_with(MockGrammarChecker::with_issue_count(2), policy);
        assert_eq!(*h.bot.policy(), policy);
        say(&h.bot, 1, "/dailyword").await;

        let reply = say(&h.bot, 1, "eloquent").await;
        assert!(reply[0].starts_with("Points earned for 'eloquent': 44"));
        let reply = say(&h.bot, 1, "eloquent").await;
        assert!(reply[0].starts_with("Points earned for 'eloquent': 4\n"));
        assert!(reply[0].ends_with("Total Points: 48"));
    }

    #[tokio::test]
    async fn grammar_issues_are_listed_and_penalized() {
        let h = harness(MockGrammarChecker::with_issues(vec![GrammarIssue {
            message: "Possible spelling mistake".into(),
            suggestions: vec!["the".into(), "tea".into()],
        }]));
        say(&h.bot, 1, "/dailyword").await;

        let reply = say(&h.bot, 1, "teh zenith").await;
        assert_eq!(
            reply,
            vec!["Points earned for 'zenith': 25\nGrammar Feedback:\n- Possible spelling mistake\n  Suggestions: the, tea\n\nTotal Points: 25"]
        );
    }

    #[tokio::test]
    async fn one_reply_per_matched_word() {
        let h = harness(MockGrammarChecker::clean());
        say(&h.bot, 1, "/dailyword").await;

        let reply = say(&h.bot, 1, "At its zenith the speech was eloquent").await;
        assert_eq!(reply.len(), 2);
        assert!(reply[0].contains("'eloquent'"));
        assert!(reply[1].contains("'zenith'"));
        assert!(reply[1].ends_with("Total Points: 60"));
    }

    #[tokio::test]
    async fn sentence_without_active_word_gets_guidance() {
        let h = harness(MockGrammarChecker::clean());
        assert_eq!(say(&h.bot, 1, "hello there").await, vec![NO_ACTIVE_WORD]);

        say(&h.bot, 1, "/dailyword").await;
        assert_eq!(say(&h.bot, 1, "hello there").await, vec![NO_ACTIVE_WORD]);
        assert!(h.bot.board().is_empty());
    }

    #[tokio::test]
    async fn synonyms_and_antonyms() {
        let h = harness(MockGrammarChecker::clean());
        assert_eq!(
            say(&h.bot, 1, "/synonym happy").await,
            vec!["Synonyms for happy: glad, cheerful, joyful, merry, jolly"]
        );
        assert_eq!(
            say(&h.bot, 1, "/antonym happy").await,
            vec!["Antonyms for happy: sad"]
        );
        assert_eq!(
            say(&h.bot, 1, "/antonym zenith").await,
            vec!["Antonyms for zenith: No antonyms available."]
        );
        assert_eq!(
            say(&h.bot, 1, "/synonym").await,
            vec!["Usage: /synonym <word>"]
        );
    }

    #[tokio::test]
    async fn leaderboard_ranks_users() {
        let h = harness(MockGrammarChecker::clean());
        assert_eq!(
            say(&h.bot, 1, "/leaderboard").await,
            vec!["Leaderboard:\nNo scores yet."]
        );

        say(&h.bot, 1, "/dailyword").await;
        say(&h.bot, 7, "eloquent").await;
        say(&h.bot, 3, "eloquent zenith").await;

        assert_eq!(
            say(&h.bot, 1, "/leaderboard").await,
            vec!["Leaderboard:\nUser 3: 60 points\nUser 7: 30 points"]
        );
    }

    #[tokio::test]
    async fn feedback_is_recorded() {
        let h = harness(MockGrammarChecker::clean());
        assert_eq!(say(&h.bot, 1, "/feedback").await, vec![FEEDBACK_EMPTY]);
        assert_eq!(
            say(&h.bot, 1, "/feedback more words please").await,
            vec![FEEDBACK_THANKS]
        );
        let entries = h.bot.feedback().entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].text, "more words please");
        assert_eq!(entries[0].user, UserId(1));
    }

    #[tokio::test]
    async fn respond_sends_replies_to_author() {
        let h = harness(MockGrammarChecker::clean());
        h.bot.respond(InboundMessage::new(9, "/start")).await;
        assert_eq!(h.transport.sent_to(UserId(9)), vec![WELCOME]);
        assert_eq!(h.source.call_count(), 0);
    }
}
