//! Durable per-user session records: credits, language, conversational
//! state, selected model, and the draft configuration map.
//!
//! Every mutation here follows fetch-then-write against Postgres. To keep
//! concurrent events for the same user from interleaving those cycles,
//! the store owns a keyed async mutex per user id; handlers take the lock
//! for the duration of their read-modify-write section.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use sqlx::types::Json;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::constants::DAILY_CREDIT_ALLOWANCE;
use crate::database::DbPool;
use crate::draft::{DraftConfig, DraftValue};
use crate::error::{BotError, BotResult};

/// Conversational state of one user. `Idle` is both the initial state and
/// the natural rest state reached via /start or cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatState {
    Idle,
    UploadingImages,
    WaitingPrompt,
}

impl ChatState {
    pub fn as_str(self) -> &'static str {
        match self {
            ChatState::Idle => "",
            ChatState::UploadingImages => "uploading_images",
            ChatState::WaitingPrompt => "waiting_prompt",
        }
    }

    /// Unknown strings collapse to `Idle` so a bad row never wedges a user.
    pub fn parse(s: &str) -> Self {
        match s {
            "uploading_images" => ChatState::UploadingImages,
            "waiting_prompt" => ChatState::WaitingPrompt,
            _ => ChatState::Idle,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Session {
    pub user_id: i64,
    pub language_code: String,
    pub credits: i32,
    pub last_reset_date: NaiveDate,
    pub current_state: String,
    pub selected_model: String,
    pub draft_config: Json<DraftConfig>,
}

impl Session {
    pub fn state(&self) -> ChatState {
        ChatState::parse(&self.current_state)
    }

    pub fn draft(&self) -> &DraftConfig {
        &self.draft_config.0
    }

    pub fn draft_mut(&mut self) -> &mut DraftConfig {
        &mut self.draft_config.0
    }
}

const SELECT_COLUMNS: &str =
    "user_id, language_code, credits, last_reset_date, current_state, selected_model, draft_config";

#[derive(Debug)]
pub struct SessionStore {
    pool: DbPool,
    locks: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl SessionStore {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Take the per-user mutation lock. Held across a handler's
    /// read-modify-write section so rapid double-taps cannot produce lost
    /// draft updates.
    pub async fn lock_user(&self, user_id: i64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks
                .entry(user_id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    /// Fetch the session, creating it with defaults on first contact, and
    /// apply the daily credit reset when the stored reset date is not
    /// today (UTC). The reset is idempotent within a day.
    pub async fn get_or_create(&self, user_id: i64) -> BotResult<Session> {
        let sql = format!(
            "WITH ins AS (INSERT INTO sessions (user_id, credits) VALUES ($1, $2) \
             ON CONFLICT (user_id) DO NOTHING) \
             SELECT {SELECT_COLUMNS} FROM sessions WHERE user_id = $1"
        );
        let mut session = sqlx::query_as::<_, Session>(&sql)
            .bind(user_id)
            .bind(DAILY_CREDIT_ALLOWANCE)
            .fetch_one(&self.pool)
            .await?;

        let today = Utc::now().date_naive();
        if session.last_reset_date != today {
            sqlx::query("UPDATE sessions SET credits = $2, last_reset_date = $3 WHERE user_id = $1")
                .bind(user_id)
                .bind(DAILY_CREDIT_ALLOWANCE)
                .bind(today)
                .execute(&self.pool)
                .await?;
            session.credits = DAILY_CREDIT_ALLOWANCE;
            session.last_reset_date = today;
            tracing::info!(target: "sessions", user_id, "daily credit reset applied");
        }
        Ok(session)
    }

    /// Transition state and select a model, clearing the draft: parameters
    /// accumulated for a previous model are meaningless for a new one.
    pub async fn set_state(
        &self,
        user_id: i64,
        state: ChatState,
        model_id: &str,
    ) -> BotResult<()> {
        sqlx::query(
            "UPDATE sessions SET current_state = $2, selected_model = $3, \
             draft_config = '{}'::jsonb WHERE user_id = $1",
        )
        .bind(user_id)
        .bind(state.as_str())
        .bind(model_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Transition state only; the draft survives. Used for sub-navigation
    /// such as entering or leaving the upload sub-mode.
    pub async fn set_state_only(&self, user_id: i64, state: ChatState) -> BotResult<()> {
        sqlx::query("UPDATE sessions SET current_state = $2 WHERE user_id = $1")
            .bind(user_id)
            .bind(state.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Read-modify-write of one draft key. Callers must hold the user
    /// lock; this is not atomic across concurrent writers on its own.
    pub async fn merge_draft(
        &self,
        user_id: i64,
        key: &str,
        value: DraftValue,
    ) -> BotResult<()> {
        let session = self.get_or_create(user_id).await?;
        let mut draft = session.draft_config.0;
        draft.insert(key.to_string(), value);
        self.write_draft(user_id, &draft).await
    }

    /// Persist a whole draft map. Used by the media pipeline which has
    /// already applied slot accounting to an in-memory copy.
    pub async fn write_draft(&self, user_id: i64, draft: &DraftConfig) -> BotResult<()> {
        sqlx::query("UPDATE sessions SET draft_config = $2 WHERE user_id = $1")
            .bind(user_id)
            .bind(Json(draft))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Back to idle: state, model, and draft reset; credits untouched.
    pub async fn clear(&self, user_id: i64) -> BotResult<()> {
        sqlx::query(
            "UPDATE sessions SET current_state = '', selected_model = '', \
             draft_config = '{}'::jsonb WHERE user_id = $1",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Guarded decrement; refuses to take the balance negative.
    pub async fn deduct_credits(&self, user_id: i64, amount: i32) -> BotResult<()> {
        let result = sqlx::query(
            "UPDATE sessions SET credits = credits - $2 \
             WHERE user_id = $1 AND credits >= $2",
        )
        .bind(user_id)
        .bind(amount)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 1 {
            Ok(())
        } else {
            Err(BotError::InsufficientCredits)
        }
    }

    pub async fn add_credits(&self, user_id: i64, amount: i32) -> BotResult<()> {
        sqlx::query("UPDATE sessions SET credits = credits + $2 WHERE user_id = $1")
            .bind(user_id)
            .bind(amount)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn set_language(&self, user_id: i64, lang: &str) -> BotResult<()> {
        sqlx::query("UPDATE sessions SET language_code = $2 WHERE user_id = $1")
            .bind(user_id)
            .bind(lang)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_state_round_trip() {
        for state in [
            ChatState::Idle,
            ChatState::UploadingImages,
            ChatState::WaitingPrompt,
        ] {
            assert_eq!(ChatState::parse(state.as_str()), state);
        }
    }

    #[test]
    fn unknown_state_collapses_to_idle() {
        assert_eq!(ChatState::parse("weird_legacy_state"), ChatState::Idle);
    }
}
