//! Callback-query side of the conversation state machine. Every inline
//! button tap lands here, keyed by the opaque callback-data payload, and
//! is answered by editing the originating message in place.

pub mod ids;

use std::sync::Arc;

use crate::database::ChatState;
use crate::draft::DraftValue;
use crate::error::BotResult;
use crate::model::AppState;
use crate::telegram::CallbackQuery;
use crate::ui;

pub async fn handle_callback(app: Arc<AppState>, cq: CallbackQuery) {
    app.telegram.answer_callback(&cq.id).await;

    let Some(data) = cq.data.clone() else { return };
    let Some(message) = &cq.message else { return };
    let user_id = cq.from.id;
    let chat_id = message.chat.id;
    let msg_id = message.message_id;

    if let Err(e) = dispatch(&app, user_id, chat_id, msg_id, &data).await {
        tracing::error!(target: "interactions", user_id, data = %data, error = %e, "callback failed");
        if let Some(key) = e.user_message_key() {
            let session = app.store.get_or_create(user_id).await.ok();
            let lang = session
                .map(|s| s.language_code)
                .unwrap_or_else(|| crate::constants::DEFAULT_LANG.to_string());
            let _ = app
                .telegram
                .send_message(chat_id, &app.i18n.get(&lang, key), &[])
                .await;
        }
    }
}

async fn dispatch(
    app: &AppState,
    user_id: i64,
    chat_id: i64,
    msg_id: i64,
    data: &str,
) -> BotResult<()> {
    // Language switches bypass the session state machine entirely.
    if let Some(code) = ids::lang_code(data) {
        app.store.set_language(user_id, code).await?;
        return app
            .telegram
            .send_message(chat_id, &app.i18n.get(code, "lang_updated"), &[])
            .await;
    }

    let _guard = app.store.lock_user(user_id).await;
    let mut session = app.store.get_or_create(user_id).await?;
    let lang = session.language_code.clone();

    match data {
        ids::NAV_PROVIDERS | ids::NAV_CANCEL => {
            app.store.clear(user_id).await?;
            let (text, buttons) = ui::provider_list(&app.catalog, &app.i18n, &lang);
            return app
                .telegram
                .edit_message(chat_id, msg_id, &text, &buttons)
                .await;
        }
        ids::BACK_TO_PANEL => {
            return render_panel(app, &session, chat_id, msg_id, &lang).await;
        }
        ids::UPLOAD_OPEN => {
            let Some(model) = app.catalog.model(&session.selected_model) else {
                return fall_back_to_providers(app, user_id, chat_id, msg_id, &lang).await;
            };
            if !model.accepts_image_input {
                return render_panel(app, &session, chat_id, msg_id, &lang).await;
            }
            app.store
                .set_state_only(user_id, ChatState::UploadingImages)
                .await?;
            let (text, buttons) = ui::upload_panel(model, session.draft(), &app.i18n, &lang);
            return app
                .telegram
                .edit_message(chat_id, msg_id, &text, &buttons)
                .await;
        }
        ids::UPLOAD_DONE => {
            app.store
                .set_state_only(user_id, ChatState::WaitingPrompt)
                .await?;
            // Re-fetch: the upload sub-mode may have appended images since
            // this session copy was read.
            let session = app.store.get_or_create(user_id).await?;
            return render_panel(app, &session, chat_id, msg_id, &lang).await;
        }
        _ => {}
    }

    if let Some(provider_id) = ids::provider_id(data) {
        let (text, buttons) = ui::model_list(&app.catalog, provider_id, &app.i18n, &lang);
        return app
            .telegram
            .edit_message(chat_id, msg_id, &text, &buttons)
            .await;
    }

    if let Some(model_id) = ids::model_id(data) {
        let Some(model) = app.catalog.model(model_id) else {
            tracing::warn!(target: "interactions", model_id, "unknown model in callback");
            return Ok(());
        };
        // New model: state moves to waiting_prompt and the draft restarts
        // from the descriptor's declared defaults, one merge per default.
        app.store
            .set_state(user_id, ChatState::WaitingPrompt, model_id)
            .await?;
        session.selected_model = model_id.to_string();
        session.draft_mut().clear();
        for param in &model.parameters {
            if let Some(default) = &param.default {
                app.store
                    .merge_draft(user_id, &param.name, default.clone())
                    .await?;
                session
                    .draft_mut()
                    .insert(param.name.clone(), default.clone());
            }
        }
        let (text, buttons) = ui::model_panel(model, session.draft(), &app.i18n, &lang);
        return app
            .telegram
            .edit_message(chat_id, msg_id, &text, &buttons)
            .await;
    }

    if let Some(param_name) = ids::set_open_param(data) {
        let Some(model) = app.catalog.model(&session.selected_model) else {
            return fall_back_to_providers(app, user_id, chat_id, msg_id, &lang).await;
        };
        let Some(param) = model.parameter(param_name) else {
            return render_panel(app, &session, chat_id, msg_id, &lang).await;
        };
        let (text, buttons) = ui::setting_options(param, &app.i18n, &lang);
        return app
            .telegram
            .edit_message(chat_id, msg_id, &text, &buttons)
            .await;
    }

    if let Some((param_name, value)) = ids::parse_set_val(data) {
        // Stored as a string token; type coercion happens at dispatch time.
        app.store
            .merge_draft(user_id, param_name, DraftValue::Str(value.to_string()))
            .await?;
        session
            .draft_mut()
            .insert(param_name.to_string(), DraftValue::Str(value.to_string()));
        return render_panel(app, &session, chat_id, msg_id, &lang).await;
    }

    tracing::debug!(target: "interactions", data, "unhandled callback data");
    Ok(())
}

async fn render_panel(
    app: &AppState,
    session: &crate::database::Session,
    chat_id: i64,
    msg_id: i64,
    lang: &str,
) -> BotResult<()> {
    let Some(model) = app.catalog.model(&session.selected_model) else {
        return fall_back_to_providers(app, session.user_id, chat_id, msg_id, lang).await;
    };
    let (text, buttons) = ui::model_panel(model, session.draft(), &app.i18n, lang);
    app.telegram
        .edit_message(chat_id, msg_id, &text, &buttons)
        .await
}

/// A panel action arrived without a valid selected model (stale keyboard
/// or a catalog change). Reset and show the provider list.
async fn fall_back_to_providers(
    app: &AppState,
    user_id: i64,
    chat_id: i64,
    msg_id: i64,
    lang: &str,
) -> BotResult<()> {
    app.store.clear(user_id).await?;
    let (text, buttons) = ui::provider_list(&app.catalog, &app.i18n, lang);
    app.telegram
        .edit_message(chat_id, msg_id, &text, &buttons)
        .await
}
