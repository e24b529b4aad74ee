//! Telegram Bot API transport (long polling).

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use lexidrill_core::model::{InboundMessage, UserId};
use lexidrill_core::traits::Transport;

use crate::error::ProviderError;

const DEFAULT_BASE_URL: &str = "https://api.telegram.org";
const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;

/// Longest text Telegram accepts in a single message.
pub const MAX_MESSAGE_CHARS: usize = 4096;

/// Long-polling Telegram client.
pub struct TelegramTransport {
    token: String,
    base_url: String,
    poll_timeout_secs: u64,
    offset: AtomicI64,
    client: reqwest::Client,
}

impl std::fmt::Debug for TelegramTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramTransport")
            .field("token", &"***")
            .field("base_url", &self.base_url)
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .finish()
    }
}

impl TelegramTransport {
    pub fn new(token: &str, base_url: Option<String>, poll_timeout_secs: Option<u64>) -> Self {
        let poll_timeout_secs = poll_timeout_secs.unwrap_or(DEFAULT_POLL_TIMEOUT_SECS);
        // The HTTP timeout has to outlast the long poll itself.
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(poll_timeout_secs + 10))
            .build()
            .expect("failed to build HTTP client");

        Self {
            token: token.to_string(),
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            poll_timeout_secs,
            offset: AtomicI64::new(0),
            client,
        }
    }

    async fn call<B: Serialize, T: DeserializeOwned>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<T, ProviderError> {
        let url = format!("{}/bot{}/{}", self.base_url, self.token, method);
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, self.poll_timeout_secs + 10))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, self.poll_timeout_secs + 10))?;

        let parsed: ApiResponse<T> = match serde_json::from_str(&text) {
            Ok(parsed) => parsed,
            Err(_) if status >= 400 => return Err(ProviderError::from_status(status, text)),
            Err(e) => return Err(ProviderError::Parse(e.to_string())),
        };

        match (parsed.ok, parsed.result) {
            (true, Some(result)) => Ok(result),
            (true, None) => Err(ProviderError::Parse(format!("{method}: missing result"))),
            (false, _) => Err(ProviderError::from_status(
                parsed.error_code.unwrap_or(status),
                parsed.description.unwrap_or_default(),
            )),
        }
    }
}

#[derive(Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    error_code: Option<u16>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Serialize)]
struct GetUpdates {
    offset: i64,
    timeout: u64,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
}

#[derive(Deserialize)]
struct Update {
    update_id: i64,
    #[serde(default)]
    message: Option<TgMessage>,
}

#[derive(Deserialize)]
struct TgMessage {
    chat: TgChat,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct TgChat {
    id: i64,
}

#[derive(Deserialize)]
struct Ignored {}

/// Split `text` into chunks of at most `limit` characters, preferring to
/// break after a newline.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut chunks = Vec::new();
    let mut rest = text;

    while rest.chars().count() > limit {
        let hard = rest
            .char_indices()
            .nth(limit)
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let cut = match rest[..hard].rfind('\n') {
            Some(nl) if nl > 0 => nl + 1,
            _ => hard,
        };
        chunks.push(rest[..cut].to_string());
        rest = &rest[cut..];
    }
    if !rest.is_empty() || chunks.is_empty() {
        chunks.push(rest.to_string());
    }
    chunks
}

#[async_trait]
impl Transport for TelegramTransport {
    fn name(&self) -> &str {
        "telegram"
    }

    #[instrument(skip(self, text), fields(chars = text.chars().count()))]
    async fn send(&self, user: UserId, text: &str) -> anyhow::Result<()> {
        for chunk in split_message(text, MAX_MESSAGE_CHARS) {
            let _: Ignored = self
                .call(
                    "sendMessage",
                    &SendMessage {
                        chat_id: user.0,
                        text: &chunk,
                    },
                )
                .await
                .with_context(|| format!("sendMessage to {user}"))?;
        }
        Ok(())
    }

    async fn receive(&self) -> anyhow::Result<Option<Vec<InboundMessage>>> {
        let request = GetUpdates {
            offset: self.offset.load(Ordering::Acquire),
            timeout: self.poll_timeout_secs,
        };
        let updates: Vec<Update> = self
            .call("getUpdates", &request)
            .await
            .context("getUpdates")?;

        if let Some(last) = updates.iter().map(|u| u.update_id).max() {
            self.offset.fetch_max(last + 1, Ordering::AcqRel);
        }

        let messages: Vec<InboundMessage> = updates
            .into_iter()
            .filter_map(|u| {
                let message = u.message?;
                let text = message.text?;
                Some(InboundMessage::new(message.chat.id, text))
            })
            .collect();
        debug!(count = messages.len(), "received updates");
        Ok(Some(messages))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn transport(server: &MockServer) -> TelegramTransport {
        TelegramTransport::new("123:abc", Some(server.uri()), Some(0))
    }

    #[tokio::test]
    async fn receive_keeps_text_messages_and_advances_offset() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/bot123:abc/getUpdates"))
            .and(body_json(serde_json::json!({"offset": 0, "timeout": 0})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true,
                "result": [
                    {"update_id": 7, "message": {"message_id": 1, "chat": {"id": 42}, "text": "/start"}},
                    {"update_id": 8, "message": {"message_id": 2, "chat": {"id": 42}, "sticker": {}}},
                    {"update_id": 9, "edited_message": {"message_id": 1, "chat": {"id": 42}, "text": "x"}}
                ]
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/bot123:abc/getUpdates"))
            .and(body_json(serde_json::json!({"offset": 10, "timeout": 0})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"ok": true, "result": []})),
            )
            .mount(&server)
            .await;

        let tg = transport(&server);
        let batch = tg.receive().await.unwrap().unwrap();
        assert_eq!(batch, vec![InboundMessage::new(42, "/start")]);

        let batch = tg.receive().await.unwrap().unwrap();
        assert!(batch.is_empty());
    }

    #[tokio::test]
    async fn send_posts_chat_id_and_text() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/bot123:abc/sendMessage"))
            .and(body_json(serde_json::json!({"chat_id": 42, "text": "hello"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true,
                "result": {"message_id": 5, "chat": {"id": 42}}
            })))
            .expect(1)
            .mount(&server)
            .await;

        transport(&server).send(UserId(42), "hello").await.unwrap();
    }

    #[tokio::test]
    async fn api_rejection_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/bot123:abc/sendMessage"))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "ok": false,
                "error_code": 403,
                "description": "Forbidden: bot was blocked by the user"
            })))
            .mount(&server)
            .await;

        let err = transport(&server).send(UserId(42), "hi").await.unwrap_err();
        let chain = format!("{err:#}");
        assert!(chain.contains("bot was blocked"), "{chain}");
    }

    #[test]
    fn long_messages_are_split() {
        assert_eq!(split_message("short", 10), vec!["short"]);
        assert_eq!(split_message("", 10), vec![""]);
        assert_eq!(split_message("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(split_message("ab\ncdef", 5), vec!["ab\n", "cdef"]);

        let long = "word: definition\n".repeat(400);
        let chunks = split_message(&long, MAX_MESSAGE_CHARS);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.chars().count() <= MAX_MESSAGE_CHARS));
        assert_eq!(chunks.concat(), long);
    }

    #[test]
    fn debug_masks_token() {
        let tg = TelegramTransport::new("secret-token", None, None);
        let shown = format!("{tg:?}");
        assert!(!shown.contains("secret-token"));
    }
}
