//! Object-storage client (Supabase storage REST surface): idempotent
//! bucket provisioning at startup, binary uploads, and deterministic
//! public-URL construction. No existence re-check is performed after an
//! upload; the URL is derived from bucket and object name alone.

use std::time::Duration;

use serde_json::json;

use crate::constants::STORAGE_HTTP_TIMEOUT_SECS;
use crate::error::{BotError, BotResult};

#[derive(Debug, Clone)]
pub struct StorageClient {
    http: reqwest::Client,
    base_url: String,
    key: String,
    bucket: String,
}

impl StorageClient {
    pub fn new(base_url: &str, key: String, bucket: String) -> BotResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(STORAGE_HTTP_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            key,
            bucket,
        })
    }

    /// Check for the bucket and create it public-read if absent. Runs once
    /// at startup; failure is fatal to the process.
    pub async fn ensure_bucket(&self) -> BotResult<()> {
        let check_url = format!("{}/storage/v1/bucket/{}", self.base_url, self.bucket);
        let resp = self
            .http
            .get(&check_url)
            .bearer_auth(&self.key)
            .send()
            .await?;
        if resp.status().is_success() {
            tracing::info!(target: "storage", bucket = %self.bucket, "bucket exists");
            return Ok(());
        }

        tracing::info!(target: "storage", bucket = %self.bucket, "creating bucket");
        let create_url = format!("{}/storage/v1/bucket", self.base_url);
        // Public so the generation provider can fetch uploaded references.
        let payload = json!({ "id": self.bucket, "name": self.bucket, "public": true });
        let resp = self
            .http
            .post(&create_url)
            .bearer_auth(&self.key)
            .json(&payload)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(BotError::UploadFailed {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    pub async fn upload(&self, object_name: &str, bytes: Vec<u8>) -> BotResult<()> {
        let url = format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url, self.bucket, object_name
        );
        let part = reqwest::multipart::Part::bytes(bytes).file_name(object_name.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);
        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.key)
            .multipart(form)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(BotError::UploadFailed {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    pub fn public_url(&self, object_name: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, object_name
        )
    }
}
