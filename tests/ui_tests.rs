//! Screen rendering: button wiring and the empty-model-list case.

use pixelforge_bot::catalog::Catalog;
use pixelforge_bot::draft::{append_image, DraftConfig, DraftValue};
use pixelforge_bot::i18n::I18n;
use pixelforge_bot::interactions::ids;
use pixelforge_bot::ui;

const PROVIDERS: &str = r#"[
    {"id": "acme", "name": "Acme"},
    {"id": "empty-co", "name": "Empty Co"}
]"#;

const MODELS: &str = r#"[
    {
        "id": "gen-one", "name": "Gen One", "route": "acme/gen-one",
        "cost": 2, "enabled": true,
        "accepts_image_input": true, "accepts_multiple_images": true,
        "parameters": [
            {"name": "aspect_ratio", "label": "Aspect Ratio", "type": "string",
             "default": "1:1", "options": ["1:1", "16:9"]},
            {"name": "seed", "label": "Seed", "type": "integer"}
        ]
    }
]"#;

fn fixtures() -> (Catalog, I18n) {
    let catalog = Catalog::from_json(PROVIDERS, MODELS).unwrap();
    let i18n = I18n::from_maps(vec![(
        "en",
        vec![
            ("select_provider", "pick provider"),
            ("select_model", "pick model"),
            ("model_unavailable", "nothing here"),
            ("back_to_prov", "back"),
            ("back_btn", "back"),
            ("cancel_btn", "cancel"),
            ("change_btn", "change {label}"),
            ("select_value", "value for {label}"),
            ("attach_btn", "attach {current}/{max}"),
            ("upload_panel", "send photos {current}/{max}"),
            ("upload_done_btn", "done"),
        ],
    )]);
    (catalog, i18n)
}

#[test]
fn provider_list_buttons() {
    let (catalog, i18n) = fixtures();
    let (text, buttons) = ui::provider_list(&catalog, &i18n, "en");
    assert_eq!(text, "pick provider");
    assert_eq!(buttons.len(), 2);
    assert_eq!(buttons[0].callback_data, "prov_acme");
}

#[test]
fn model_list_annotates_cost() {
    let (catalog, i18n) = fixtures();
    let (text, buttons) = ui::model_list(&catalog, "acme", &i18n, "en");
    assert_eq!(text, "pick model");
    assert_eq!(buttons[0].text, "Gen One (2 Cr)");
    assert_eq!(buttons[0].callback_data, "model_gen-one");
    assert_eq!(buttons.last().unwrap().callback_data, ids::NAV_PROVIDERS);
}

#[test]
fn empty_model_list_renders_unavailable() {
    let (catalog, i18n) = fixtures();
    let (text, buttons) = ui::model_list(&catalog, "empty-co", &i18n, "en");
    assert_eq!(text, "nothing here");
    // Only the back button remains.
    assert_eq!(buttons.len(), 1);
    assert_eq!(buttons[0].callback_data, ids::NAV_PROVIDERS);
}

#[test]
fn model_panel_buttons_cover_options_attach_cancel() {
    let (catalog, i18n) = fixtures();
    let model = catalog.model("gen-one").unwrap();
    let mut draft = DraftConfig::new();
    draft.insert("aspect_ratio".into(), DraftValue::Str("1:1".into()));

    let (text, buttons) = ui::model_panel(model, &draft, &i18n, "en");
    assert!(text.contains("Gen One"));
    assert!(text.contains("aspect ratio"));
    assert!(text.contains("Cost:</b> 2"));

    // One change button for the option parameter (none for free-typed
    // seed), then attach, then cancel.
    assert_eq!(buttons.len(), 3);
    assert_eq!(buttons[0].callback_data, ids::set_open_data("aspect_ratio"));
    assert_eq!(buttons[1].callback_data, ids::UPLOAD_OPEN);
    assert_eq!(buttons[2].callback_data, ids::NAV_CANCEL);
    assert_eq!(buttons[1].text, "attach 0/5");
}

#[test]
fn panel_shows_attached_marker_not_urls() {
    let (catalog, i18n) = fixtures();
    let model = catalog.model("gen-one").unwrap();
    let mut draft = DraftConfig::new();
    append_image(&mut draft, model, "https://x/a.png".into()).unwrap();
    let (text, _) = ui::model_panel(model, &draft, &i18n, "en");
    assert!(text.contains("Attached ✅"));
    assert!(!text.contains("https://x/a.png"));
}

#[test]
fn setting_options_buttons() {
    let (catalog, i18n) = fixtures();
    let model = catalog.model("gen-one").unwrap();
    let param = model.parameter("aspect_ratio").unwrap();
    let (text, buttons) = ui::setting_options(param, &i18n, "en");
    assert_eq!(text, "value for Aspect Ratio");
    assert_eq!(buttons.len(), 3);
    assert_eq!(buttons[0].callback_data, ids::set_val_data("aspect_ratio", "1:1"));
    assert_eq!(buttons[1].callback_data, ids::set_val_data("aspect_ratio", "16:9"));
    assert_eq!(buttons[2].callback_data, ids::BACK_TO_PANEL);
}

#[test]
fn upload_panel_counts_slots() {
    let (catalog, i18n) = fixtures();
    let model = catalog.model("gen-one").unwrap();
    let mut draft = DraftConfig::new();
    append_image(&mut draft, model, "https://x/a.png".into()).unwrap();
    append_image(&mut draft, model, "https://x/b.png".into()).unwrap();
    let (text, buttons) = ui::upload_panel(model, &draft, &i18n, "en");
    assert_eq!(text, "send photos 2/5");
    assert_eq!(buttons.len(), 1);
    assert_eq!(buttons[0].callback_data, ids::UPLOAD_DONE);
}
