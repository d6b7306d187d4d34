//! Centralized callback-data string constants for inline-keyboard
//! buttons. Consolidating here reduces typos and keeps the dispatch table
//! in `interactions::mod` readable.

pub const PROVIDER_PREFIX: &str = "prov_"; // followed by provider id
pub const MODEL_PREFIX: &str = "model_"; // followed by model id
pub const LANG_PREFIX: &str = "lang_"; // followed by language code

pub const NAV_PROVIDERS: &str = "nav_providers";
pub const NAV_CANCEL: &str = "nav_cancel";
pub const BACK_TO_PANEL: &str = "back_to_panel";

pub const SET_OPEN_PREFIX: &str = "set_open|"; // followed by parameter name
pub const SET_VAL_PREFIX: &str = "set_val|"; // followed by name|value

pub const UPLOAD_OPEN: &str = "upload_open";
pub const UPLOAD_DONE: &str = "upload_done";

pub fn provider_id(data: &str) -> Option<&str> {
    data.strip_prefix(PROVIDER_PREFIX).filter(|s| !s.is_empty())
}

pub fn model_id(data: &str) -> Option<&str> {
    data.strip_prefix(MODEL_PREFIX).filter(|s| !s.is_empty())
}

pub fn lang_code(data: &str) -> Option<&str> {
    data.strip_prefix(LANG_PREFIX).filter(|s| !s.is_empty())
}

pub fn set_open_param(data: &str) -> Option<&str> {
    data.strip_prefix(SET_OPEN_PREFIX).filter(|s| !s.is_empty())
}

/// Parse a `set_val|<param>|<value>` payload. The value may itself
/// contain `|`; only the first separator after the parameter name splits.
pub fn parse_set_val(data: &str) -> Option<(&str, &str)> {
    let rest = data.strip_prefix(SET_VAL_PREFIX)?;
    let (param, value) = rest.split_once('|')?;
    if param.is_empty() {
        return None;
    }
    Some((param, value))
}

/// Build the matching `set_val` payload for a parameter option button.
pub fn set_val_data(param: &str, value: &str) -> String {
    format!("{SET_VAL_PREFIX}{param}|{value}")
}

pub fn set_open_data(param: &str) -> String {
    format!("{SET_OPEN_PREFIX}{param}")
}
