//! Thin client for the Telegram Bot API: long-poll update retrieval,
//! outbound message/keyboard calls, and file resolution for ingestion.
//! This is deliberately plumbing, not policy; all conversational logic
//! lives in `handler` and `interactions`.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::constants::{LONG_POLL_TIMEOUT_SECS, PLATFORM_HTTP_TIMEOUT_SECS};
use crate::error::{BotError, BotResult};

#[derive(Debug, Clone, Deserialize)]
pub struct TgUser {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhotoSize {
    pub file_id: String,
    #[serde(default)]
    pub file_size: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<TgUser>,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub photo: Vec<PhotoSize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: TgUser,
    #[serde(default)]
    pub data: Option<String>,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileInfo {
    pub file_id: String,
    #[serde(default)]
    pub file_path: Option<String>,
}

/// One inline-keyboard button.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Btn {
    pub text: String,
    pub callback_data: String,
}

impl Btn {
    pub fn new(text: impl Into<String>, callback_data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback_data: callback_data.into(),
        }
    }
}

/// Arrange buttons two per row; the remainder lands on the final row.
pub fn build_keyboard(buttons: &[Btn]) -> Value {
    let rows: Vec<Vec<&Btn>> = buttons.chunks(2).map(|c| c.iter().collect()).collect();
    json!({ "inline_keyboard": rows })
}

#[derive(Debug, Clone)]
pub struct Telegram {
    http: reqwest::Client,
    poll_http: reqwest::Client,
    token: String,
}

impl Telegram {
    pub fn new(token: String) -> BotResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(PLATFORM_HTTP_TIMEOUT_SECS))
            .build()?;
        // The long-poll call must outlive the normal per-call timeout.
        let poll_http = reqwest::Client::builder()
            .timeout(Duration::from_secs(LONG_POLL_TIMEOUT_SECS + 10))
            .build()?;
        Ok(Self {
            http,
            poll_http,
            token,
        })
    }

    fn url(&self, method: &str) -> String {
        format!("https://api.telegram.org/bot{}/{}", self.token, method)
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        client: &reqwest::Client,
        method: &str,
        body: Value,
    ) -> BotResult<T> {
        let resp = client.post(self.url(method)).json(&body).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(BotError::Platform {
                status: status.as_u16(),
                body,
            });
        }
        let parsed: ApiResponse<T> = resp.json().await?;
        if !parsed.ok {
            return Err(BotError::Platform {
                status: status.as_u16(),
                body: parsed.description.unwrap_or_default(),
            });
        }
        parsed.result.ok_or(BotError::Platform {
            status: status.as_u16(),
            body: "missing result".into(),
        })
    }

    pub async fn get_updates(&self, offset: i64) -> BotResult<Vec<Update>> {
        self.call(
            &self.poll_http,
            "getUpdates",
            json!({ "offset": offset, "timeout": LONG_POLL_TIMEOUT_SECS }),
        )
        .await
    }

    pub async fn send_message(&self, chat_id: i64, text: &str, buttons: &[Btn]) -> BotResult<()> {
        let mut body = json!({ "chat_id": chat_id, "text": text, "parse_mode": "HTML" });
        if !buttons.is_empty() {
            body["reply_markup"] = build_keyboard(buttons);
        }
        self.call::<Value>(&self.http, "sendMessage", body).await?;
        Ok(())
    }

    pub async fn edit_message(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        buttons: &[Btn],
    ) -> BotResult<()> {
        let mut body = json!({
            "chat_id": chat_id,
            "message_id": message_id,
            "text": text,
            "parse_mode": "HTML",
        });
        if !buttons.is_empty() {
            body["reply_markup"] = build_keyboard(buttons);
        }
        self.call::<Value>(&self.http, "editMessageText", body)
            .await?;
        Ok(())
    }

    pub async fn send_photo(&self, chat_id: i64, photo_url: &str, caption: &str) -> BotResult<()> {
        self.call::<Value>(
            &self.http,
            "sendPhoto",
            json!({
                "chat_id": chat_id,
                "photo": photo_url,
                "caption": caption,
                "parse_mode": "HTML",
            }),
        )
        .await?;
        Ok(())
    }

    /// Several result images in one grouped message; the caption rides on
    /// the first item.
    pub async fn send_media_group(
        &self,
        chat_id: i64,
        photo_urls: &[String],
        caption: &str,
    ) -> BotResult<()> {
        let media: Vec<Value> = photo_urls
            .iter()
            .enumerate()
            .map(|(i, url)| {
                if i == 0 {
                    json!({ "type": "photo", "media": url, "caption": caption, "parse_mode": "HTML" })
                } else {
                    json!({ "type": "photo", "media": url })
                }
            })
            .collect();
        self.call::<Value>(
            &self.http,
            "sendMediaGroup",
            json!({ "chat_id": chat_id, "media": media }),
        )
        .await?;
        Ok(())
    }

    /// Best-effort typing/uploading indicator.
    pub async fn send_chat_action(&self, chat_id: i64, action: &str) {
        let body = json!({ "chat_id": chat_id, "action": action });
        if let Err(e) = self.call::<Value>(&self.http, "sendChatAction", body).await {
            tracing::debug!(target: "tg", error = %e, "sendChatAction failed");
        }
    }

    /// Best-effort callback acknowledgement to stop the client spinner.
    pub async fn answer_callback(&self, callback_id: &str) {
        let body = json!({ "callback_query_id": callback_id });
        if let Err(e) = self
            .call::<Value>(&self.http, "answerCallbackQuery", body)
            .await
        {
            tracing::debug!(target: "tg", error = %e, "answerCallbackQuery failed");
        }
    }

    /// Resolve a file reference to a downloadable path.
    pub async fn get_file(&self, file_id: &str) -> BotResult<FileInfo> {
        self.call(&self.http, "getFile", json!({ "file_id": file_id }))
            .await
            .map_err(|e| BotError::SourceUnavailable(e.to_string()))
    }

    pub async fn download_file(&self, file_path: &str) -> BotResult<Vec<u8>> {
        let url = format!(
            "https://api.telegram.org/file/bot{}/{}",
            self.token, file_path
        );
        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(BotError::SourceUnavailable(format!(
                "file download status {status}"
            )));
        }
        Ok(resp.bytes().await?.to_vec())
    }
}
