//! Screen construction. Every function here is pure: it builds the
//! message text and button list for one screen, and the handlers decide
//! whether to send or edit. Keeping rendering side-effect free makes the
//! screens testable without a network.

use crate::catalog::{Catalog, ModelDescriptor, ModelParameter};
use crate::draft::{self, DraftConfig};
use crate::i18n::I18n;
use crate::interactions::ids;
use crate::telegram::Btn;

pub fn provider_list(catalog: &Catalog, i18n: &I18n, lang: &str) -> (String, Vec<Btn>) {
    let buttons = catalog
        .providers
        .iter()
        .map(|p| Btn::new(&p.name, format!("{}{}", ids::PROVIDER_PREFIX, p.id)))
        .collect();
    (i18n.get(lang, "select_provider"), buttons)
}

/// Models offered by one provider, cost-annotated, plus a back button.
/// An empty match renders the "model unavailable" text instead of a bare
/// back button.
pub fn model_list(
    catalog: &Catalog,
    provider_id: &str,
    i18n: &I18n,
    lang: &str,
) -> (String, Vec<Btn>) {
    let mut buttons: Vec<Btn> = catalog
        .models_for_provider(provider_id)
        .iter()
        .map(|m| {
            Btn::new(
                format!("{} ({} Cr)", m.name, m.cost),
                format!("{}{}", ids::MODEL_PREFIX, m.id),
            )
        })
        .collect();

    let text = if buttons.is_empty() {
        i18n.get(lang, "model_unavailable")
    } else {
        i18n.get(lang, "select_model")
    };
    buttons.push(Btn::new(i18n.get(lang, "back_to_prov"), ids::NAV_PROVIDERS));
    (text, buttons)
}

/// The model configuration panel: current draft values, total cost, one
/// change-button per menu-driven parameter, an attach button for
/// image-capable models, and cancel.
pub fn model_panel(
    model: &ModelDescriptor,
    draft: &DraftConfig,
    i18n: &I18n,
    lang: &str,
) -> (String, Vec<Btn>) {
    let image_param = draft::image_param_name(model);
    let mut settings = String::new();
    for (key, value) in draft {
        if key == image_param {
            let occupancy = draft::image_occupancy(draft, model);
            settings.push_str(&format!("\n• <b>Image:</b> Attached ✅ ({occupancy})"));
        } else {
            let clean_key = key.replace('_', " ");
            settings.push_str(&format!("\n• <b>{clean_key}:</b> {value}"));
        }
    }

    let cost = draft::total_cost(model.cost, draft);
    let text = format!(
        "🤖 <b>{}</b>\n\nCurrent Settings:{}\n\n💰 <b>Cost:</b> {} Credits\n\n👇 <i>Tap buttons to change settings, OR type a prompt to start:</i>",
        model.name, settings, cost
    );

    let mut buttons = Vec::new();
    for param in &model.parameters {
        if !param.options.is_empty() {
            buttons.push(Btn::new(
                i18n.get_with(
                    lang,
                    "change_btn",
                    &[("label", param.display_label().to_string())],
                ),
                ids::set_open_data(&param.name),
            ));
        }
    }
    if model.accepts_image_input {
        let current = draft::image_occupancy(draft, model);
        let max = draft::image_capacity(model);
        buttons.push(Btn::new(
            i18n.get_with(
                lang,
                "attach_btn",
                &[("current", current.to_string()), ("max", max.to_string())],
            ),
            ids::UPLOAD_OPEN,
        ));
    }
    buttons.push(Btn::new(i18n.get(lang, "cancel_btn"), ids::NAV_CANCEL));
    (text, buttons)
}

/// Option menu for one parameter, plus a back button.
pub fn setting_options(param: &ModelParameter, i18n: &I18n, lang: &str) -> (String, Vec<Btn>) {
    let text = i18n.get_with(
        lang,
        "select_value",
        &[("label", param.display_label().to_string())],
    );
    let mut buttons: Vec<Btn> = param
        .options
        .iter()
        .map(|opt| {
            let val = opt.to_string();
            Btn::new(val.clone(), ids::set_val_data(&param.name, &val))
        })
        .collect();
    buttons.push(Btn::new(i18n.get(lang, "back_btn"), ids::BACK_TO_PANEL));
    (text, buttons)
}

/// Upload sub-mode screen with current/max slot count.
pub fn upload_panel(
    model: &ModelDescriptor,
    draft: &DraftConfig,
    i18n: &I18n,
    lang: &str,
) -> (String, Vec<Btn>) {
    let current = draft::image_occupancy(draft, model);
    let max = draft::image_capacity(model);
    let text = i18n.get_with(
        lang,
        "upload_panel",
        &[("current", current.to_string()), ("max", max.to_string())],
    );
    let buttons = vec![Btn::new(i18n.get(lang, "upload_done_btn"), ids::UPLOAD_DONE)];
    (text, buttons)
}

pub fn language_menu(i18n: &I18n, lang: &str) -> (String, Vec<Btn>) {
    let buttons = vec![
        Btn::new("English 🇬🇧", format!("{}en", ids::LANG_PREFIX)),
        Btn::new("Bahasa Indonesia 🇮🇩", format!("{}id", ids::LANG_PREFIX)),
    ];
    (i18n.get(lang, "select_language"), buttons)
}
