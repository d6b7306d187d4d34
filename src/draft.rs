//! Draft configuration values and image-slot accounting.
//!
//! A draft is the partially-built set of parameter values a user
//! accumulates across turns before a generation request is submitted. It
//! is stored as a JSONB map on the session row and mirrored in memory for
//! immediate re-rendering.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::ModelDescriptor;
use crate::constants::{MULTI_IMAGE_CAPACITY, SINGLE_IMAGE_CAPACITY};
use crate::error::BotError;

/// Dynamically-typed draft value with explicit variants. Variant order
/// matters for untagged deserialization: integers must be tried before
/// floats so `5` round-trips as `Int(5)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DraftValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<String>),
}

impl fmt::Display for DraftValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DraftValue::Bool(b) => write!(f, "{b}"),
            DraftValue::Int(i) => write!(f, "{i}"),
            DraftValue::Float(x) => write!(f, "{x}"),
            DraftValue::Str(s) => write!(f, "{s}"),
            DraftValue::List(items) => write!(f, "{} item(s)", items.len()),
        }
    }
}

impl DraftValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DraftValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// BTreeMap so panel rendering iterates in a stable order.
pub type DraftConfig = BTreeMap<String, DraftValue>;

/// Resolve the parameter name that holds image attachments for a model:
/// an explicit override wins, otherwise `image_input` for multi-image
/// models and `image` for single-image ones.
pub fn image_param_name(model: &ModelDescriptor) -> &str {
    if !model.image_parameter_name.is_empty() {
        return &model.image_parameter_name;
    }
    if model.accepts_multiple_images {
        "image_input"
    } else {
        "image"
    }
}

pub fn image_capacity(model: &ModelDescriptor) -> usize {
    if model.accepts_multiple_images {
        MULTI_IMAGE_CAPACITY
    } else {
        SINGLE_IMAGE_CAPACITY
    }
}

/// How many image slots are currently taken in a draft.
pub fn image_occupancy(draft: &DraftConfig, model: &ModelDescriptor) -> usize {
    match draft.get(image_param_name(model)) {
        Some(DraftValue::List(items)) => items.len(),
        Some(DraftValue::Str(_)) => 1,
        _ => 0,
    }
}

/// Place a freshly re-hosted image URL into the draft, respecting the
/// model's slot capacity. Multi-image models append to an ordered list;
/// single-image models hold one URL and reject a second. Returns the new
/// occupancy on success.
pub fn append_image(
    draft: &mut DraftConfig,
    model: &ModelDescriptor,
    url: String,
) -> Result<usize, BotError> {
    let capacity = image_capacity(model);
    let current = image_occupancy(draft, model);
    if current >= capacity {
        return Err(BotError::UploadLimitReached {
            current,
            max: capacity,
        });
    }

    let key = image_param_name(model).to_string();
    if model.accepts_multiple_images {
        let entry = draft
            .entry(key)
            .or_insert_with(|| DraftValue::List(Vec::new()));
        match entry {
            DraftValue::List(items) => items.push(url),
            // A stray scalar under the multi-image key is promoted to a list.
            other => {
                let mut items = Vec::new();
                if let DraftValue::Str(s) = other {
                    items.push(s.clone());
                }
                items.push(url);
                *other = DraftValue::List(items);
            }
        }
    } else {
        draft.insert(key, DraftValue::Str(url));
    }
    Ok(image_occupancy(draft, model))
}

/// Total credit cost of one generation: the model's base cost scaled by a
/// numeric `num_outputs` draft entry when one is present.
pub fn total_cost(base: i32, draft: &DraftConfig) -> i32 {
    match draft.get("num_outputs") {
        Some(DraftValue::Int(n)) if *n > 1 => base * (*n as i32),
        Some(DraftValue::Str(s)) => match s.parse::<i32>() {
            Ok(n) if n > 1 => base * n,
            _ => base,
        },
        _ => base,
    }
}
