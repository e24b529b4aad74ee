//! Line-oriented transport over stdin/stdout, for local play and tests.
//!
//! Each input line is one message from `default_user`. A line of the form
//! `@<id> <text>` is attributed to user `<id>` instead, which lets a single
//! terminal stand in for several chat participants. Outbound messages are
//! printed as `[to <id>] <text>`.

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;

use lexidrill_core::model::{InboundMessage, UserId};
use lexidrill_core::traits::Transport;

type Reader = Box<dyn AsyncBufRead + Send + Unpin>;
type Writer = Box<dyn AsyncWrite + Send + Unpin>;

pub struct ConsoleTransport {
    reader: Mutex<Reader>,
    writer: Mutex<Writer>,
    default_user: UserId,
}

impl ConsoleTransport {
    pub fn new(
        reader: impl AsyncBufRead + Send + Unpin + 'static,
        writer: impl AsyncWrite + Send + Unpin + 'static,
        default_user: UserId,
    ) -> Self {
        Self {
            reader: Mutex::new(Box::new(reader)),
            writer: Mutex::new(Box::new(writer)),
            default_user,
        }
    }

    pub fn stdio(default_user: UserId) -> Self {
        Self::new(
            BufReader::new(tokio::io::stdin()),
            tokio::io::stdout(),
            default_user,
        )
    }

    fn parse_line(&self, line: &str) -> InboundMessage {
        if let Some(rest) = line.strip_prefix('@') {
            let (id, text) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            if let Ok(user) = id.parse::<UserId>() {
                return InboundMessage::new(user, text.trim());
            }
        }
        InboundMessage::new(self.default_user, line)
    }
}

#[async_trait]
impl Transport for ConsoleTransport {
    fn name(&self) -> &str {
        "console"
    }

    async fn send(&self, user: UserId, text: &str) -> anyhow::Result<()> {
        let mut writer = self.writer.lock().await;
        writer
            .write_all(format!("[to {user}] {text}\n").as_bytes())
            .await?;
        writer.flush().await?;
        Ok(())
    }

    async fn receive(&self) -> anyhow::Result<Option<Vec<InboundMessage>>> {
        let mut reader = self.reader.lock().await;
        let mut line = String::new();
        loop {
            line.clear();
            if reader.read_line(&mut line).await? == 0 {
                return Ok(None);
            }
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                return Ok(Some(vec![self.parse_line(trimmed)]));
            }
        }
    }
}
