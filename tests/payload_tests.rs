//! Generation payload construction: default seeding, draft overlay, type
//! reconciliation, and image URL validation.

use pixelforge_bot::catalog::ModelDescriptor;
use pixelforge_bot::draft::{DraftConfig, DraftValue};
use pixelforge_bot::error::BotError;
use pixelforge_bot::replicate::build_payload;
use serde_json::json;

fn model(params: serde_json::Value) -> ModelDescriptor {
    serde_json::from_value(json!({
        "id": "m",
        "name": "M",
        "route": "acme/m",
        "cost": 1,
        "enabled": true,
        "parameters": params
    }))
    .unwrap()
}

#[test]
fn defaults_then_draft_then_prompt() {
    let m = model(json!([
        {"name": "a", "label": "A", "type": "integer", "default": 5},
        {"name": "b", "label": "B", "type": "string", "options": ["x", "y"]}
    ]));
    let mut draft = DraftConfig::new();
    draft.insert("a".into(), DraftValue::Int(5));
    draft.insert("b".into(), DraftValue::Str("y".into()));

    let payload = build_payload(&m, "cat", &draft).unwrap();
    assert_eq!(payload.get("a"), Some(&json!(5)));
    assert_eq!(payload.get("b"), Some(&json!("y")));
    assert_eq!(payload.get("prompt"), Some(&json!("cat")));
    assert_eq!(payload.len(), 3);
}

#[test]
fn prompt_overwrites_same_named_default() {
    let m = model(json!([
        {"name": "prompt", "label": "P", "type": "string", "default": "placeholder"}
    ]));
    let payload = build_payload(&m, "a red fox", &DraftConfig::new()).unwrap();
    assert_eq!(payload.get("prompt"), Some(&json!("a red fox")));
}

#[test]
fn string_coerces_to_declared_numeric_type() {
    let m = model(json!([
        {"name": "guidance", "label": "G", "type": "number"},
        {"name": "steps", "label": "S", "type": "integer"}
    ]));
    let mut draft = DraftConfig::new();
    draft.insert("guidance".into(), DraftValue::Str("3.5".into()));
    draft.insert("steps".into(), DraftValue::Str("20".into()));

    let payload = build_payload(&m, "cat", &draft).unwrap();
    assert_eq!(payload.get("guidance"), Some(&json!(3.5)));
    assert_eq!(payload.get("steps"), Some(&json!(20)));
}

#[test]
fn bad_numeric_string_passes_through_unchanged() {
    let m = model(json!([
        {"name": "guidance", "label": "G", "type": "number"}
    ]));
    let mut draft = DraftConfig::new();
    draft.insert("guidance".into(), DraftValue::Str("lots".into()));

    let payload = build_payload(&m, "cat", &draft).unwrap();
    assert_eq!(payload.get("guidance"), Some(&json!("lots")));
}

#[test]
fn image_list_is_filtered_to_urls() {
    let m = model(json!([]));
    let mut draft = DraftConfig::new();
    draft.insert(
        "image_input".into(),
        DraftValue::List(vec![
            "https://x/a.png".into(),
            "not-a-url".into(),
            "http://x/b.png".into(),
        ]),
    );
    let payload = build_payload(&m, "cat", &draft).unwrap();
    assert_eq!(
        payload.get("image_input"),
        Some(&json!(["https://x/a.png", "http://x/b.png"]))
    );
}

#[test]
fn lone_string_wrapped_for_list_parameters() {
    let m = model(json!([]));
    let mut draft = DraftConfig::new();
    draft.insert(
        "image_input".into(),
        DraftValue::Str("https://x/a.png".into()),
    );
    let payload = build_payload(&m, "cat", &draft).unwrap();
    assert_eq!(payload.get("image_input"), Some(&json!(["https://x/a.png"])));
}

#[test]
fn non_url_image_string_fails_the_request() {
    let m = model(json!([]));
    let mut draft = DraftConfig::new();
    draft.insert("image".into(), DraftValue::Str("file_id_abc".into()));
    let err = build_payload(&m, "cat", &draft).unwrap_err();
    assert!(matches!(err, BotError::InvalidImageUrl(_)));
}

#[test]
fn booleans_and_floats_survive_untouched() {
    let m = model(json!([]));
    let mut draft = DraftConfig::new();
    draft.insert("fast".into(), DraftValue::Bool(true));
    draft.insert("strength".into(), DraftValue::Float(0.8));
    let payload = build_payload(&m, "cat", &draft).unwrap();
    assert_eq!(payload.get("fast"), Some(&json!(true)));
    assert_eq!(payload.get("strength"), Some(&json!(0.8)));
}
