use crate::config::Config;
use kinobot_domain::{ChatId, UserId};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    User(UserId),
    Chat(ChatId),
}

/// Delivery channel to the chat platform. Returns a reference to the
/// delivered message, which vote prompts keep around.
#[async_trait::async_trait]
pub trait INotifier: Send + Sync {
    async fn send(&self, recipient: Recipient, text: &str) -> anyhow::Result<i64>;
}

#[derive(Debug, Serialize)]
struct SendMessageBody<'a> {
    chat_id: Option<i64>,
    user_id: Option<i64>,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    message_id: i64,
}

/// Notifier talking to the bot gateway over HTTP.
pub struct BotApiNotifier {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl BotApiNotifier {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.external_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.notifier_url.clone(),
            api_key: config.notifier_api_key.clone(),
        })
    }
}

#[async_trait::async_trait]
impl INotifier for BotApiNotifier {
    async fn send(&self, recipient: Recipient, text: &str) -> anyhow::Result<i64> {
        let body = match recipient {
            Recipient::Chat(chat_id) => SendMessageBody {
                chat_id: Some(chat_id.0),
                user_id: None,
                text,
            },
            Recipient::User(user_id) => SendMessageBody {
                chat_id: None,
                user_id: Some(user_id.0),
                text,
            },
        };
        let res = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("kinobot-notifier-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("Error delivering notification: {:?}", e);
                e
            })?
            .error_for_status()?;
        let res: SendMessageResponse = res.json().await?;
        Ok(res.message_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    pub recipient: Recipient,
    pub text: String,
}

/// Recording notifier for tests.
pub struct InMemoryNotifier {
    sent: Mutex<Vec<SentMessage>>,
    next_message_ref: AtomicI64,
    failing: AtomicBool,
}

impl InMemoryNotifier {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            next_message_ref: AtomicI64::new(1),
            failing: AtomicBool::new(false),
        }
    }

    pub fn sent_messages(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl Default for InMemoryNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl INotifier for InMemoryNotifier {
    async fn send(&self, recipient: Recipient, text: &str) -> anyhow::Result<i64> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("Notifier is down"));
        }
        self.sent.lock().unwrap().push(SentMessage {
            recipient,
            text: text.to_string(),
        });
        Ok(self.next_message_ref.fetch_add(1, Ordering::SeqCst))
    }
}
