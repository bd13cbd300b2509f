use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use text_splitter::{MarkdownSplitter, TextSplitter};
use tracing::{debug, error, info};

use crate::config::TelegramConfig;
use crate::transport::{
    InboundMessage, Keyboard, OutboundMessage, ParseMode, Transport, TransportError,
};

/// Bot API hard limit on message text length.
pub const MAX_MESSAGE_CHARS: usize = 4096;

const POLL_ERROR_BACKOFF: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<TgMessage>,
}

#[derive(Debug, Deserialize)]
pub struct TgMessage {
    pub chat: TgChat,
    pub from: Option<TgUser>,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TgChat {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct TgUser {
    pub id: i64,
}

impl Update {
    pub fn into_inbound(self) -> Option<InboundMessage> {
        let message = self.message?;
        let text = message.text?;
        let user_id = message.from.map(|u| u.id).unwrap_or(message.chat.id);
        Some(InboundMessage { user_id, text })
    }
}

/// Receives every inbound text message picked up by polling.
#[async_trait]
pub trait InboundHandler: Send + Sync + 'static {
    async fn handle(&self, message: InboundMessage);
}

pub struct TelegramClient {
    client: Client,
    base_url: String,
    poll_timeout_secs: u64,
}

impl TelegramClient {
    pub fn new(config: &TelegramConfig) -> Result<Self, TransportError> {
        // Long polling holds the request open for poll_timeout_secs.
        let client = Client::builder()
            .timeout(Duration::from_secs(config.poll_timeout_secs + 10))
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: format!("{}/bot{}", config.api_base.trim_end_matches('/'), config.token),
            poll_timeout_secs: config.poll_timeout_secs,
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &Value,
    ) -> Result<T, TransportError> {
        let response = self
            .client
            .post(format!("{}/{}", self.base_url, method))
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        let parsed: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| TransportError::Api(format!("{} {}: {}", method, status, e)))?;

        if !parsed.ok {
            let description = parsed.description.unwrap_or_else(|| status.to_string());
            return Err(TransportError::Api(format!("{}: {}", method, description)));
        }

        parsed
            .result
            .ok_or_else(|| TransportError::Api(format!("{}: empty result", method)))
    }

    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, TransportError> {
        let body = json!({
            "offset": offset,
            "timeout": self.poll_timeout_secs,
            "allowed_updates": ["message"],
        });
        self.call("getUpdates", &body).await
    }

    pub async fn send_message(&self, message: &OutboundMessage) -> Result<(), TransportError> {
        for payload in send_message_payloads(message) {
            self.call::<Value>("sendMessage", &payload).await?;
        }
        Ok(())
    }

    /// Long-polls forever, handing each text message to its own task.
    pub async fn poll<H: InboundHandler>(self: Arc<Self>, handler: Arc<H>) {
        info!("Starting Telegram long polling");
        let mut offset = 0;

        loop {
            let updates = match self.get_updates(offset).await {
                Ok(updates) => updates,
                Err(e) => {
                    error!("Polling failed: {}", e);
                    tokio::time::sleep(POLL_ERROR_BACKOFF).await;
                    continue;
                }
            };

            for update in updates {
                offset = offset.max(update.update_id + 1);
                let Some(inbound) = update.into_inbound() else {
                    continue;
                };
                debug!("Inbound message from {}", inbound.user_id);

                let handler = handler.clone();
                tokio::spawn(async move {
                    handler.handle(inbound).await;
                });
            }
        }
    }
}

#[async_trait]
impl Transport for TelegramClient {
    async fn send(&self, message: OutboundMessage) -> Result<(), TransportError> {
        self.send_message(&message).await
    }
}

fn reply_markup(keyboard: &Keyboard) -> Value {
    match keyboard {
        Keyboard::Buttons(labels) => json!({
            "keyboard": labels
                .iter()
                .map(|label| vec![json!({ "text": label })])
                .collect::<Vec<_>>(),
            "resize_keyboard": true,
        }),
        Keyboard::Remove => json!({ "remove_keyboard": true }),
    }
}

/// Builds one `sendMessage` body per chunk; the keyboard rides on the last one.
pub fn send_message_payloads(message: &OutboundMessage) -> Vec<Value> {
    let chunks = split_text(&message.text, MAX_MESSAGE_CHARS, message.parse_mode);
    let last = chunks.len().saturating_sub(1);

    chunks
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| {
            let mut payload = json!({ "chat_id": message.chat_id, "text": chunk });
            if let Some(ParseMode::Markdown) = message.parse_mode {
                payload["parse_mode"] = json!("Markdown");
            }
            if let (true, Some(keyboard)) = (i == last, &message.keyboard) {
                payload["reply_markup"] = reply_markup(keyboard);
            }
            payload
        })
        .collect()
}

/// Splits text so every piece fits in `limit` characters. Markdown is split on
/// its own structure so escapes and entities stay inside one piece.
pub fn split_text(text: &str, limit: usize, parse_mode: Option<ParseMode>) -> Vec<String> {
    if text.chars().count() <= limit {
        return vec![text.to_string()];
    }

    match parse_mode {
        Some(ParseMode::Markdown) => MarkdownSplitter::new(limit)
            .chunks(text)
            .map(|s| s.to_string())
            .collect(),
        None => TextSplitter::new(limit)
            .chunks(text)
            .map(|s| s.to_string())
            .collect(),
    }
}
