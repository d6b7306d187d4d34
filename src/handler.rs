//! Message-side state machine: slash commands, free-text prompts, and
//! photo routing, plus the credit-metered generation flow.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use tokio::sync::OwnedMutexGuard;

use crate::database::{ChatState, Session};
use crate::draft;
use crate::error::{BotError, BotResult};
use crate::media;
use crate::model::AppState;
use crate::telegram::Message;
use crate::ui;

enum Command {
    Start,
    Img,
    Profile,
    Language,
    Unknown,
}

impl FromStr for Command {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "/start" => Ok(Command::Start),
            "/img" => Ok(Command::Img),
            "/profile" | "/status" => Ok(Command::Profile),
            "/language" | "/lang" => Ok(Command::Language),
            _ => Ok(Command::Unknown),
        }
    }
}

/// Time remaining until the next UTC midnight, formatted as `Xh Ym`.
pub fn reset_countdown(now: DateTime<Utc>) -> String {
    let next_midnight = (now + ChronoDuration::days(1))
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .expect("midnight is always valid")
        .and_utc();
    let remaining = next_midnight - now;
    format!(
        "{}h {}m",
        remaining.num_hours(),
        remaining.num_minutes() % 60
    )
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub async fn handle_message(app: Arc<AppState>, msg: Message) {
    let Some(from) = msg.from.clone() else { return };
    let chat_id = msg.chat.id;

    if let Err(e) = route_message(&app, &msg).await {
        tracing::error!(target: "handler", user_id = from.id, error = %e, "message handling failed");
        if let Some(key) = e.user_message_key() {
            let lang = app
                .store
                .get_or_create(from.id)
                .await
                .map(|s| s.language_code)
                .unwrap_or_else(|_| crate::constants::DEFAULT_LANG.to_string());
            let _ = app
                .telegram
                .send_message(chat_id, &app.i18n.get(&lang, key), &[])
                .await;
        }
    }
}

async fn route_message(app: &Arc<AppState>, msg: &Message) -> BotResult<()> {
    let user_id = msg.from.as_ref().map(|u| u.id).unwrap_or_default();
    let chat_id = msg.chat.id;

    let guard = app.store.lock_user(user_id).await;
    let session = app.store.get_or_create(user_id).await?;
    let lang = session.language_code.clone();

    if !msg.photo.is_empty() {
        return route_photo(app, session, msg, &lang).await;
    }

    let Some(text) = msg.text.as_deref() else {
        return Ok(());
    };

    if text.starts_with('/') {
        let command = Command::from_str(text.trim()).unwrap_or(Command::Unknown);
        match command {
            Command::Start => {
                app.store.clear(user_id).await?;
                let text = app.i18n.get_with(
                    &lang,
                    "welcome",
                    &[("credits", session.credits.to_string())],
                );
                return app.telegram.send_message(chat_id, &text, &[]).await;
            }
            Command::Img => {
                app.store.clear(user_id).await?;
                let (text, buttons) = ui::provider_list(&app.catalog, &app.i18n, &lang);
                return app.telegram.send_message(chat_id, &text, &buttons).await;
            }
            Command::Profile => {
                let text = app.i18n.get_with(
                    &lang,
                    "profile_msg",
                    &[
                        ("id", user_id.to_string()),
                        ("credits", session.credits.to_string()),
                        ("reset", reset_countdown(Utc::now())),
                    ],
                );
                return app.telegram.send_message(chat_id, &text, &[]).await;
            }
            Command::Language => {
                let (text, buttons) = ui::language_menu(&app.i18n, &lang);
                return app.telegram.send_message(chat_id, &text, &buttons).await;
            }
            Command::Unknown => {
                let text = app.i18n.get(&lang, "use_img_cmd");
                return app.telegram.send_message(chat_id, &text, &[]).await;
            }
        }
    }

    match session.state() {
        ChatState::WaitingPrompt if !session.selected_model.is_empty() => {
            run_generation(app, session, chat_id, text, guard).await
        }
        ChatState::UploadingImages => {
            let text = app.i18n.get(&lang, "finish_upload_first");
            app.telegram.send_message(chat_id, &text, &[]).await
        }
        _ => {
            let text = app.i18n.get(&lang, "use_img_cmd");
            app.telegram.send_message(chat_id, &text, &[]).await
        }
    }
}

/// Inbound photo: only meaningful inside the upload sub-mode, where it is
/// handed to the ingestion pipeline against the freshly fetched session.
async fn route_photo(
    app: &Arc<AppState>,
    mut session: Session,
    msg: &Message,
    lang: &str,
) -> BotResult<()> {
    let user_id = session.user_id;
    let chat_id = msg.chat.id;

    if session.state() != ChatState::UploadingImages {
        let text = app.i18n.get(lang, "photo_not_expected");
        return app.telegram.send_message(chat_id, &text, &[]).await;
    }

    let Some(model) = app.catalog.model(&session.selected_model) else {
        let text = app.i18n.get(lang, "use_img_cmd");
        return app.telegram.send_message(chat_id, &text, &[]).await;
    };

    // Telegram sends several sizes of the same photo; the last is largest.
    let file_id = msg
        .photo
        .last()
        .map(|p| p.file_id.clone())
        .unwrap_or_default();

    let occupancy =
        media::ingest_photo(app, user_id, model, session.draft_mut(), &file_id).await?;
    let text = app.i18n.get_with(
        lang,
        "img_received",
        &[
            ("current", occupancy.to_string()),
            ("max", draft::image_capacity(model).to_string()),
        ],
    );
    app.telegram.send_message(chat_id, &text, &[]).await
}

/// Dispatch one generation: check and deduct credits under the user lock,
/// release the lock for the long provider call, and refund on failure.
async fn run_generation(
    app: &Arc<AppState>,
    session: Session,
    chat_id: i64,
    prompt: &str,
    guard: OwnedMutexGuard<()>,
) -> BotResult<()> {
    let user_id = session.user_id;
    let lang = session.language_code.clone();

    let Some(model) = app.catalog.model(&session.selected_model) else {
        app.store.clear(user_id).await?;
        let text = app.i18n.get(&lang, "model_unavailable");
        return app.telegram.send_message(chat_id, &text, &[]).await;
    };

    let cost = draft::total_cost(model.cost, session.draft());
    if session.credits < cost {
        return Err(BotError::InsufficientCredits);
    }
    app.store.deduct_credits(user_id, cost).await?;

    // The provider call can run for minutes; other events for this user
    // must not be serialized behind it.
    drop(guard);

    app.telegram.send_chat_action(chat_id, "upload_photo").await;
    let _ = app
        .telegram
        .send_message(chat_id, &app.i18n.get(&lang, "generating"), &[])
        .await;

    let result = app
        .replicate
        .generate(model, prompt, session.draft())
        .await
        .and_then(|urls| {
            if urls.is_empty() {
                Err(BotError::GenerationFailed("empty output".into()))
            } else {
                Ok(urls)
            }
        });

    match result {
        Ok(urls) => {
            let caption = escape_html(prompt);
            if urls.len() == 1 {
                app.telegram.send_photo(chat_id, &urls[0], &caption).await?;
            } else {
                app.telegram
                    .send_media_group(chat_id, &urls, &caption)
                    .await?;
            }
            let text = app.i18n.get_with(
                &lang,
                "done_msg",
                &[("credits", (session.credits - cost).to_string())],
            );
            app.telegram.send_message(chat_id, &text, &[]).await?;
            tracing::info!(target: "gen", user_id, model = %model.id, cost, outputs = urls.len(), "generation complete");
            Ok(())
        }
        Err(e) => {
            // Failed or stuck generations give the credits back.
            if let Err(refund_err) = app.store.add_credits(user_id, cost).await {
                tracing::error!(target: "gen", user_id, cost, error = %refund_err, "credit refund failed");
            }
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn countdown_to_next_utc_midnight() {
        let now = Utc.with_ymd_and_hms(2026, 8, 26, 21, 30, 0).unwrap();
        assert_eq!(reset_countdown(now), "2h 30m");
    }

    #[test]
    fn countdown_just_after_midnight() {
        let now = Utc.with_ymd_and_hms(2026, 8, 26, 0, 0, 30).unwrap();
        assert_eq!(reset_countdown(now), "23h 59m");
    }

    #[test]
    fn html_escaping() {
        assert_eq!(escape_html("a <b> & c"), "a &lt;b&gt; &amp; c");
    }
}
