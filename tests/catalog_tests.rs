//! Catalog loading and provider/model matching rules.

use pixelforge_bot::catalog::Catalog;

const PROVIDERS: &str = r#"[
    {"id": "acme", "name": "Acme"},
    {"id": "google", "name": "Google"},
    {"id": "empty-co", "name": "Empty Co"}
]"#;

const MODELS: &str = r#"[
    {
        "id": "gen-one", "name": "Gen One", "route": "acme/gen-one",
        "cost": 1, "enabled": true,
        "parameters": [
            {"name": "a", "label": "A", "type": "integer", "default": 5},
            {"name": "b", "label": "B", "type": "string", "options": ["x", "y"]}
        ]
    },
    {
        "id": "gen-two", "name": "Gen Two", "route": "acme/gen-two",
        "cost": 2, "enabled": false, "parameters": []
    },
    {
        "id": "banana", "name": "Banana", "route": "google/banana",
        "cost": 3, "enabled": true,
        "accepts_image_input": true, "accepts_multiple_images": true,
        "image_parameter_name": "image_input", "parameters": []
    }
]"#;

fn catalog() -> Catalog {
    Catalog::from_json(PROVIDERS, MODELS).unwrap()
}

#[test]
fn lookup_by_id() {
    let c = catalog();
    assert_eq!(c.model("banana").unwrap().cost, 3);
    assert!(c.model("nope").is_none());
}

#[test]
fn provider_matching_skips_disabled_models() {
    let c = catalog();
    let acme: Vec<&str> = c
        .models_for_provider("acme")
        .iter()
        .map(|m| m.id.as_str())
        .collect();
    assert_eq!(acme, vec!["gen-one"]);
}

#[test]
fn google_prefix_special_case() {
    let c = catalog();
    let google: Vec<&str> = c
        .models_for_provider("google")
        .iter()
        .map(|m| m.id.as_str())
        .collect();
    assert_eq!(google, vec!["banana"]);
}

#[test]
fn unknown_provider_matches_nothing() {
    let c = catalog();
    assert!(c.models_for_provider("empty-co").is_empty());
}

#[test]
fn parameter_defaults_deserialize_typed() {
    use pixelforge_bot::draft::DraftValue;
    let c = catalog();
    let m = c.model("gen-one").unwrap();
    assert_eq!(m.parameter("a").unwrap().default, Some(DraftValue::Int(5)));
    assert!(m.parameter("a").unwrap().options.is_empty());
    assert_eq!(m.parameter("b").unwrap().options.len(), 2);
    assert!(m.parameter("b").unwrap().default.is_none());
}

#[test]
fn shipped_config_files_parse() {
    let providers = std::fs::read_to_string("config/providers.json").unwrap();
    let models = std::fs::read_to_string("config/models.json").unwrap();
    let c = Catalog::from_json(&providers, &models).unwrap();
    assert!(!c.providers.is_empty());
    assert!(!c.models.is_empty());
    for m in &c.models {
        m.route_parts().expect("every shipped route must be owner/name");
    }
}
