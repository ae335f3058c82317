//! Telegram Bot API 集成
//!
//! 长轮询 getUpdates 接收消息，逐条交给分发器处理完再取下一批；
//! 回复通过 sendMessage 携带 ReplyKeyboardMarkup 自定义键盘。

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::bot::Mentor;
use crate::menu::Reply;

/// getUpdates 响应
#[derive(Debug, Deserialize)]
struct UpdatesResponse {
    ok: bool,
    #[serde(default)]
    result: Vec<Update>,
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    message: Option<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    chat: Chat,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
}

/// sendMessage 请求体
#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<ReplyKeyboardMarkup>,
}

#[derive(Debug, Serialize)]
struct ReplyKeyboardMarkup {
    keyboard: Vec<Vec<KeyboardButton>>,
    resize_keyboard: bool,
}

#[derive(Debug, Serialize)]
struct KeyboardButton {
    text: String,
}

/// Telegram 长轮询运行时
pub struct TelegramBot {
    client: reqwest::Client,
    base_url: String,
    mentor: Arc<Mentor>,
    poll_timeout_secs: u64,
}

impl TelegramBot {
    pub fn new(token: &str, mentor: Arc<Mentor>, poll_timeout_secs: u64) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: format!("https://api.telegram.org/bot{}", token),
            mentor,
            poll_timeout_secs,
        }
    }

    /// 主循环：取更新 → 逐条处理到完成 → 回复；Ctrl-C 退出
    pub async fn run(&self) -> anyhow::Result<()> {
        tracing::info!("Mentor bot polling started");
        let mut offset: i64 = 0;

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Shutdown signal received");
                    return Ok(());
                }
                updates = self.get_updates(offset) => {
                    let updates = match updates {
                        Ok(u) => u,
                        Err(e) => {
                            tracing::error!(error = %e, "getUpdates failed");
                            tokio::time::sleep(Duration::from_secs(3)).await;
                            continue;
                        }
                    };
                    for update in updates {
                        offset = offset.max(update.update_id + 1);
                        let Some(message) = update.message else { continue };
                        let Some(text) = message.text else { continue };
                        self.dispatch(message.chat.id, &text).await;
                    }
                }
            }
        }
    }

    async fn get_updates(&self, offset: i64) -> anyhow::Result<Vec<Update>> {
        let url = format!("{}/getUpdates", self.base_url);
        let resp: UpdatesResponse = self
            .client
            .get(&url)
            .query(&[("offset", offset), ("timeout", self.poll_timeout_secs as i64)])
            .timeout(Duration::from_secs(self.poll_timeout_secs + 10))
            .send()
            .await?
            .json()
            .await?;
        if !resp.ok {
            anyhow::bail!("Telegram getUpdates returned ok=false");
        }
        Ok(resp.result)
    }

    /// 单条消息：分发器处理完毕后发送回复；错误不致命，记录后继续
    async fn dispatch(&self, chat_id: i64, text: &str) {
        match self.mentor.handle_message(chat_id, text).await {
            Ok(Some(reply)) => {
                if let Err(e) = self.send_reply(chat_id, &reply).await {
                    tracing::error!(chat_id, error = %e, "Failed to send reply");
                }
            }
            Ok(None) => {
                tracing::debug!(chat_id, "Action dropped without reply");
            }
            Err(e) => {
                tracing::error!(chat_id, error = %e, "Dispatch error");
            }
        }
    }

    async fn send_reply(&self, chat_id: i64, reply: &Reply) -> anyhow::Result<()> {
        let url = format!("{}/sendMessage", self.base_url);
        let reply_markup = reply.keyboard.as_ref().map(|rows| ReplyKeyboardMarkup {
            keyboard: rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|label| KeyboardButton {
                            text: label.clone(),
                        })
                        .collect()
                })
                .collect(),
            resize_keyboard: true,
        });

        let request = SendMessageRequest {
            chat_id,
            text: &reply.text,
            reply_markup,
        };

        let resp = self.client.post(&url).json(&request).send().await?;
        if !resp.status().is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Telegram sendMessage error: {}", body);
        }
        Ok(())
    }
}
