//! Generation dispatcher: builds a typed prediction payload from the model
//! descriptor plus the accumulated draft, submits it with a short
//! synchronous wait window, and falls back to a bounded polling loop.

use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::catalog::{ModelDescriptor, ParamType};
use crate::constants::{
    GENERATE_HTTP_TIMEOUT_SECS, MAX_POLL_ATTEMPTS, POLL_HTTP_TIMEOUT_SECS, POLL_INTERVAL_SECS,
    SYNC_WAIT_SECS,
};
use crate::draft::{image_param_name, DraftConfig, DraftValue};
use crate::error::{BotError, BotResult};

/// Parameters that conventionally carry image URLs even without a
/// descriptor-level override.
const IMAGE_PARAM_NAMES: [&str; 4] = ["image_input", "input_images", "reference_images", "image"];

/// Parameters that downstream models expect as a list; a lone URL string
/// under one of these keys is wrapped into a single-element list.
const LIST_PARAM_NAMES: [&str; 3] = ["image_input", "input_images", "reference_images"];

#[derive(Debug, Deserialize)]
struct PredictionUrls {
    #[serde(default)]
    get: String,
}

#[derive(Debug, Deserialize)]
struct PredictionResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    output: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
    #[serde(default)]
    urls: Option<PredictionUrls>,
}

/// Assemble the prediction input object. Defaults are seeded first, then
/// every draft entry is overlaid with type reconciliation, and the prompt
/// is set last so it overwrites any same-named default.
///
/// Image-array policy: list values are filtered down to http(s)-looking
/// strings and submitted as a plain string array; a lone string under a
/// conventionally-list parameter is wrapped into a one-element array. This
/// is the single normative construction path.
pub fn build_payload(
    model: &ModelDescriptor,
    prompt: &str,
    draft: &DraftConfig,
) -> BotResult<Map<String, Value>> {
    let mut payload = Map::new();

    for param in &model.parameters {
        if let Some(default) = &param.default {
            payload.insert(param.name.clone(), draft_to_json(default));
        }
    }

    let image_param = image_param_name(model);
    for (key, value) in draft {
        let coerced = match value {
            DraftValue::List(items) => {
                let urls: Vec<Value> = items
                    .iter()
                    .filter(|s| s.starts_with("http"))
                    .map(|s| Value::String(s.clone()))
                    .collect();
                Value::Array(urls)
            }
            DraftValue::Str(s) => {
                let is_image_param =
                    key == image_param || IMAGE_PARAM_NAMES.contains(&key.as_str());
                if is_image_param && !s.starts_with("http") {
                    return Err(BotError::InvalidImageUrl(s.clone()));
                }
                if LIST_PARAM_NAMES.contains(&key.as_str()) {
                    Value::Array(vec![Value::String(s.clone())])
                } else {
                    coerce_scalar(model, key, s)
                }
            }
            other => draft_to_json(other),
        };
        payload.insert(key.clone(), coerced);
    }

    payload.insert("prompt".into(), Value::String(prompt.to_string()));
    Ok(payload)
}

/// Numeric coercion for string tokens against the declared parameter type.
/// A failed parse passes the raw string through rather than failing the
/// whole request.
fn coerce_scalar(model: &ModelDescriptor, key: &str, raw: &str) -> Value {
    match model.parameter(key).map(|p| p.param_type) {
        Some(ParamType::Integer) => raw
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(raw.to_string())),
        Some(ParamType::Number) => raw
            .parse::<f64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(raw.to_string())),
        _ => Value::String(raw.to_string()),
    }
}

fn draft_to_json(value: &DraftValue) -> Value {
    match value {
        DraftValue::Bool(b) => Value::Bool(*b),
        DraftValue::Int(i) => Value::from(*i),
        DraftValue::Float(x) => Value::from(*x),
        DraftValue::Str(s) => Value::String(s.clone()),
        DraftValue::List(items) => {
            Value::Array(items.iter().map(|s| Value::String(s.clone())).collect())
        }
    }
}

/// Normalize the provider's output field to an ordered list of URL
/// strings, dropping non-string members.
pub fn parse_output(output: &Value) -> Vec<String> {
    match output {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

#[derive(Debug, Clone)]
pub struct ReplicateClient {
    http: reqwest::Client,
    poll_http: reqwest::Client,
    token: String,
}

impl ReplicateClient {
    pub fn new(token: String) -> BotResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(GENERATE_HTTP_TIMEOUT_SECS))
            .build()?;
        let poll_http = reqwest::Client::builder()
            .timeout(Duration::from_secs(POLL_HTTP_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            poll_http,
            token,
        })
    }

    /// Submit a prediction and resolve it to output URLs, either from the
    /// inline synchronous response or via the bounded polling loop.
    pub async fn generate(
        &self,
        model: &ModelDescriptor,
        prompt: &str,
        draft: &DraftConfig,
    ) -> BotResult<Vec<String>> {
        let payload = build_payload(model, prompt, draft)?;
        let (owner, name) = model.route_parts()?;
        let url = format!("https://api.replicate.com/v1/models/{owner}/{name}/predictions");

        tracing::debug!(target: "gen", model = %model.id, route = %model.route, "submitting prediction");
        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .header("Prefer", format!("wait={SYNC_WAIT_SECS}"))
            .json(&json!({ "input": payload }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(BotError::GenerationFailed(format!(
                "api status {status}: {body}"
            )));
        }

        let result: PredictionResponse = resp.json().await?;
        if let Some(err) = &result.error {
            return Err(BotError::GenerationFailed(err.to_string()));
        }
        if result.status == "succeeded" {
            let output = result.output.unwrap_or(Value::Null);
            return Ok(parse_output(&output));
        }

        let poll_url = result
            .urls
            .map(|u| u.get)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| BotError::GenerationFailed("missing poll url".into()))?;
        self.poll(&poll_url).await
    }

    async fn poll(&self, url: &str) -> BotResult<Vec<String>> {
        for attempt in 1..=MAX_POLL_ATTEMPTS {
            tokio::time::sleep(Duration::from_secs(POLL_INTERVAL_SECS)).await;
            let resp = self
                .poll_http
                .get(url)
                .bearer_auth(&self.token)
                .send()
                .await?;
            let result: PredictionResponse = resp.json().await?;
            tracing::debug!(target: "gen.poll", attempt, status = %result.status, "poll");

            match result.status.as_str() {
                "succeeded" => {
                    let output = result.output.unwrap_or(Value::Null);
                    return Ok(parse_output(&output));
                }
                "failed" | "canceled" => {
                    let detail = result
                        .error
                        .map(|e| e.to_string())
                        .unwrap_or_else(|| result.status.clone());
                    return Err(BotError::GenerationFailed(detail));
                }
                _ => {}
            }
        }
        Err(BotError::GenerationTimedOut(MAX_POLL_ATTEMPTS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_string_becomes_single_element_list() {
        let out = parse_output(&Value::String("https://x/a.png".into()));
        assert_eq!(out, vec!["https://x/a.png".to_string()]);
    }

    #[test]
    fn output_mixed_array_keeps_only_strings() {
        let out = parse_output(&json!(["https://x/a.png", 42, null, "https://x/b.png"]));
        assert_eq!(out, vec!["https://x/a.png", "https://x/b.png"]);
    }

    #[test]
    fn output_other_types_empty() {
        assert!(parse_output(&json!({"weird": true})).is_empty());
        assert!(parse_output(&Value::Null).is_empty());
    }
}
