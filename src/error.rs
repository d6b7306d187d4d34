//! Application error taxonomy. Every failure a per-event task can hit is
//! funneled into `BotError` and converted to a single user-facing message
//! at the handler boundary; nothing here is allowed to crash a task.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BotError {
    /// Session store connectivity failure. The in-flight transition is
    /// aborted; the user sees no state change and must retry.
    #[error("session store unavailable: {0}")]
    Store(#[from] sqlx::Error),

    #[error("insufficient credits")]
    InsufficientCredits,

    #[error("upload limit reached ({current}/{max})")]
    UploadLimitReached { current: usize, max: usize },

    /// The messaging platform could not resolve the attached file.
    #[error("source file unavailable: {0}")]
    SourceUnavailable(String),

    #[error("object upload failed (status {status}): {body}")]
    UploadFailed { status: u16, body: String },

    #[error("invalid image url: {0}")]
    InvalidImageUrl(String),

    #[error("invalid provider route: {0}")]
    InvalidRouteFormat(String),

    #[error("generation failed: {0}")]
    GenerationFailed(String),

    #[error("generation still pending after {0} polls")]
    GenerationTimedOut(u32),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success response from the messaging platform API.
    #[error("platform api error (status {status}): {body}")]
    Platform { status: u16, body: String },
}

impl BotError {
    /// i18n key for the message shown to the user, or `None` for failures
    /// that are swallowed silently (store outages: the user simply sees no
    /// state change).
    pub fn user_message_key(&self) -> Option<&'static str> {
        match self {
            BotError::Store(_) => None,
            BotError::InsufficientCredits => Some("insufficient_credits"),
            BotError::UploadLimitReached { .. } => Some("upload_limit"),
            BotError::SourceUnavailable(_) | BotError::UploadFailed { .. } => {
                Some("upload_failed")
            }
            BotError::InvalidImageUrl(_) => Some("invalid_image"),
            BotError::InvalidRouteFormat(_) | BotError::GenerationFailed(_) => {
                Some("generation_failed")
            }
            BotError::GenerationTimedOut(_) => Some("generation_timeout"),
            BotError::Transport(_) | BotError::Platform { .. } => Some("generation_failed"),
        }
    }
}

pub type BotResult<T> = Result<T, BotError>;
