//! The `lexidrill run` command.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use lexidrill_core::{InboundMessage, UserId};
use lexidrill_providers::config::{
    create_grammar_checker, create_thesaurus, create_transport, create_word_source,
    load_config_from,
};

use crate::handlers::Bot;

/// Pause before polling again after a failed receive.
const RECEIVE_RETRY: Duration = Duration::from_secs(5);

pub async fn execute(config_path: Option<PathBuf>, console: bool) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    config.validate()?;

    let source = create_word_source(&config.dictionary)?;
    let thesaurus = create_thesaurus(&config.dictionary)?;
    let grammar = create_grammar_checker(&config.grammar);
    let transport = create_transport(&config.telegram, console)?;

    info!(
        source = source.name(),
        grammar = grammar.name(),
        transport = transport.name(),
        "starting lexidrill"
    );

    let bot = Arc::new(Bot::new(
        source,
        thesaurus,
        grammar,
        transport,
        config.scoring,
        config.broadcast.to_scheduler_config(),
    ));
    let policy = bot.policy();
    let schedule = bot.scheduler().config();
    info!(
        first_use = policy.first_use_points,
        repeat_use = policy.repeat_use_points,
        penalty = policy.penalty_per_issue,
        interval_secs = schedule.interval.as_secs(),
        words_per_session = schedule.words_per_session,
        "drill settings"
    );
    let scheduler = bot.scheduler().clone().spawn();

    let result = tokio::select! {
        result = serve(bot) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted, shutting down");
            Ok(())
        }
    };

    scheduler.abort();
    result
}

/// Receive batches until the transport closes, handing each message to its
/// user's worker. Polling continues while workers are busy.
pub async fn serve(bot: Arc<Bot>) -> Result<()> {
    let mut dispatcher = Dispatcher::new(bot.clone());
    loop {
        match bot.transport().receive().await {
            Ok(Some(batch)) => dispatcher.dispatch(batch),
            Ok(None) => {
                info!(users = dispatcher.users(), "transport closed, draining workers");
                dispatcher.shutdown().await;
                return Ok(());
            }
            Err(e) => {
                warn!("receive failed, retrying in {}s: {e:#}", RECEIVE_RETRY.as_secs());
                tokio::time::sleep(RECEIVE_RETRY).await;
            }
        }
    }
}

/// Routes inbound messages to one long-lived worker task per user.
///
/// A worker handles its user's messages strictly in arrival order, so
/// workers for different users never wait on each other.
pub struct Dispatcher {
    bot: Arc<Bot>,
    queues: HashMap<UserId, mpsc::UnboundedSender<InboundMessage>>,
    workers: JoinSet<()>,
}

impl Dispatcher {
    pub fn new(bot: Arc<Bot>) -> Self {
        Self {
            bot,
            queues: HashMap::new(),
            workers: JoinSet::new(),
        }
    }

    /// Queue every message of `batch` without waiting for any of them.
    pub fn dispatch(&mut self, batch: Vec<InboundMessage>) {
        for message in batch {
            self.enqueue(message);
        }
    }

    fn enqueue(&mut self, message: InboundMessage) {
        let user = message.user;
        let message = match self.queues.get(&user) {
            Some(queue) => match queue.send(message) {
                Ok(()) => return,
                // the worker panicked and dropped its receiver
                Err(mpsc::error::SendError(message)) => {
                    warn!(%user, "worker stopped, starting a new one");
                    message
                }
            },
            None => message,
        };

        let queue = spawn_worker(&mut self.workers, self.bot.clone(), user);
        let _ = queue.send(message);
        self.queues.insert(user, queue);
    }

    /// Number of users with a worker.
    pub fn users(&self) -> usize {
        self.queues.len()
    }

    /// Close every queue and wait for the workers to finish what they hold.
    pub async fn shutdown(mut self) {
        self.queues.clear();
        while let Some(joined) = self.workers.join_next().await {
            if let Err(e) = joined {
                warn!("message worker panicked: {e}");
            }
        }
    }
}

fn spawn_worker(
    workers: &mut JoinSet<()>,
    bot: Arc<Bot>,
    user: UserId,
) -> mpsc::UnboundedSender<InboundMessage> {
    let (queue, mut inbox) = mpsc::unbounded_channel();
    workers.spawn(async move {
        debug!(%user, "worker started");
        while let Some(message) = inbox.recv().await {
            bot.respond(message).await;
        }
    });
    queue
}

#[cfg(test)]
mod tests {
    use lexidrill_core::{SchedulerConfig, ScoringPolicy};
    use lexidrill_providers::mock::{
        MockGrammarChecker, MockThesaurus, MockWordSource, RecordingTransport,
    };

    use super::*;

    fn bot(transport: Arc<RecordingTransport>) -> Arc<Bot> {
        bot_with(transport, Arc::new(MockGrammarChecker::clean()))
    }

    fn bot_with(
        transport: Arc<RecordingTransport>,
        grammar: Arc<MockGrammarChecker>,
    ) -> Arc<Bot> {
        Arc::new(Bot::new(
            Arc::new(MockWordSource::with_words(&["eloquent"])),
            Arc::new(MockThesaurus::new()),
            grammar,
            transport,
            ScoringPolicy::default(),
            SchedulerConfig::default(),
        ))
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn serve_keeps_per_user_order_until_closed() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push_batch(vec![InboundMessage::new(1, "/dailyword")]);
        transport.push_batch(vec![
            InboundMessage::new(1, "eloquent"),
            InboundMessage::new(2, "eloquent"),
            InboundMessage::new(1, "eloquent once more"),
            InboundMessage::new(2, "/leaderboard"),
        ]);
        let bot = bot(transport.clone());
        bot.scheduler().rotate_now().await.unwrap();

        serve(bot).await.unwrap();

        let to_one = transport.sent_to(UserId(1));
        assert_eq!(to_one.len(), 3);
        assert!(to_one[0].starts_with("Today's Vocabulary:"));
        assert!(to_one[1].starts_with("Points earned for 'eloquent': 30"));
        assert!(to_one[2].starts_with("Points earned for 'eloquent': 20"));
        assert!(to_one[2].ends_with("Total Points: 50"));

        let to_two = transport.sent_to(UserId(2));
        assert_eq!(to_two.len(), 2);
        assert!(to_two[0].ends_with("Total Points: 30"));
        assert!(to_two[1].starts_with("Leaderboard:\n"));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_grammar_check_does_not_hold_up_other_users() {
        let slow = Duration::from_secs(15);
        let transport = Arc::new(RecordingTransport::new());
        let grammar = Arc::new(MockGrammarChecker::clean().delay_on("slow", slow));
        transport.push_batch(vec![InboundMessage::new(1, "eloquent slow")]);
        transport.push_batch(vec![
            InboundMessage::new(2, "eloquent"),
            InboundMessage::new(1, "eloquent again"),
        ]);
        let bot = bot_with(transport.clone(), grammar.clone());
        bot.scheduler().rotate_now().await.unwrap();
        let start = tokio::time::Instant::now();

        serve(bot).await.unwrap();

        let started: HashMap<String, Duration> = grammar
            .checked_at()
            .into_iter()
            .map(|(text, at)| (text, at - start))
            .collect();
        assert!(started["eloquent"] < slow, "user 2 waited: {started:?}");
        assert!(started["eloquent again"] >= slow);

        let to_two = transport.sent_to(UserId(2));
        assert_eq!(to_two.len(), 1);
        assert!(to_two[0].ends_with("Total Points: 30"));
        let to_one = transport.sent_to(UserId(1));
        assert_eq!(to_one.len(), 2);
        assert!(to_one[0].ends_with("Total Points: 30"));
        assert!(to_one[1].ends_with("Total Points: 50"));
    }

    #[tokio::test]
    async fn unreachable_user_does_not_stop_the_batch() {
        let transport = Arc::new(RecordingTransport::new());
        transport.fail_sends_to(UserId(5));

        let mut dispatcher = Dispatcher::new(bot(transport.clone()));
        dispatcher.dispatch(vec![
            InboundMessage::new(5, "/start"),
            InboundMessage::new(6, "/start"),
            InboundMessage::new(5, "/help"),
        ]);
        assert_eq!(dispatcher.users(), 2);
        dispatcher.shutdown().await;

        assert!(transport.sent_to(UserId(5)).is_empty());
        assert_eq!(transport.sent_to(UserId(6)).len(), 1);
    }

    #[tokio::test]
    async fn empty_batch_is_a_no_op() {
        let transport = Arc::new(RecordingTransport::new());
        let mut dispatcher = Dispatcher::new(bot(transport.clone()));
        dispatcher.dispatch(Vec::new());
        assert_eq!(dispatcher.users(), 0);
        dispatcher.shutdown().await;
        assert!(transport.sent().is_empty());
    }
}
