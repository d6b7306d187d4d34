//! Media ingestion: turn an ephemeral platform-hosted photo into a durable
//! public URL and record it in the user's draft.
//!
//! The draft write is synchronous, not fire-and-forget: losing an uploaded
//! image reference is worse than the added latency.

use std::path::Path;

use chrono::Utc;

use crate::catalog::ModelDescriptor;
use crate::draft::{self, DraftConfig};
use crate::error::{BotError, BotResult};
use crate::model::AppState;

/// Collision-resistant object name from the owning user, a
/// high-resolution timestamp, and the source extension (`.jpg` when the
/// platform path carries none).
pub fn object_name(user_id: i64, nanos: i64, source_path: &str) -> String {
    let ext = Path::new(source_path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_else(|| ".jpg".to_string());
    format!("{user_id}_{nanos}{ext}")
}

/// Fetch one platform file, re-host it in the public bucket, and append it
/// to the draft under the model's image parameter. The caller holds the
/// user lock and passes a freshly fetched draft so the capacity check is
/// not run against a stale in-memory copy. Returns the new occupancy.
pub async fn ingest_photo(
    app: &AppState,
    user_id: i64,
    model: &ModelDescriptor,
    draft: &mut DraftConfig,
    file_id: &str,
) -> BotResult<usize> {
    // Reject before any network work when the slots are already full.
    let capacity = draft::image_capacity(model);
    let current = draft::image_occupancy(draft, model);
    if current >= capacity {
        return Err(BotError::UploadLimitReached {
            current,
            max: capacity,
        });
    }

    let info = app.telegram.get_file(file_id).await?;
    let file_path = info
        .file_path
        .ok_or_else(|| BotError::SourceUnavailable("no file path in response".into()))?;
    let bytes = app.telegram.download_file(&file_path).await?;

    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let name = object_name(user_id, nanos, &file_path);
    app.storage.upload(&name, bytes).await?;
    let url = app.storage.public_url(&name);

    let occupancy = draft::append_image(draft, model, url)?;
    app.store.write_draft(user_id, draft).await?;
    tracing::info!(target: "media", user_id, object = %name, occupancy, "image ingested");
    Ok(occupancy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_name_keeps_extension() {
        assert_eq!(object_name(42, 123, "photos/file_9.png"), "42_123.png");
    }

    #[test]
    fn object_name_defaults_to_jpg() {
        assert_eq!(object_name(42, 123, "photos/file_9"), "42_123.jpg");
    }
}
