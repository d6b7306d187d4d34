//! Translation-string lookup. Locale files are flat JSON maps loaded once
//! at startup; lookups fall back to `en`, then to the raw key so a missing
//! entry is visible instead of silently blank.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::constants::DEFAULT_LANG;

#[derive(Debug, Default)]
pub struct I18n {
    translations: HashMap<String, HashMap<String, String>>,
}

impl I18n {
    pub fn load(dir: &str) -> Result<Self, std::io::Error> {
        let mut translations = HashMap::new();
        for entry in fs::read_dir(Path::new(dir))? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(lang) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let content = fs::read_to_string(&path)?;
            match serde_json::from_str::<HashMap<String, String>>(&content) {
                Ok(map) => {
                    tracing::info!(target: "i18n", lang, entries = map.len(), "loaded locale");
                    translations.insert(lang.to_string(), map);
                }
                Err(e) => {
                    tracing::warn!(target: "i18n", lang, error = %e, "skipping unparsable locale file");
                }
            }
        }
        Ok(Self { translations })
    }

    /// Build from in-memory maps; used by tests.
    pub fn from_maps(maps: Vec<(&str, Vec<(&str, &str)>)>) -> Self {
        let translations = maps
            .into_iter()
            .map(|(lang, pairs)| {
                (
                    lang.to_string(),
                    pairs
                        .into_iter()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect(),
                )
            })
            .collect();
        Self { translations }
    }

    pub fn get(&self, lang: &str, key: &str) -> String {
        if let Some(val) = self.translations.get(lang).and_then(|m| m.get(key)) {
            return val.clone();
        }
        if let Some(val) = self.translations.get(DEFAULT_LANG).and_then(|m| m.get(key)) {
            return val.clone();
        }
        key.to_string()
    }

    /// Lookup plus `{name}` placeholder substitution.
    pub fn get_with(&self, lang: &str, key: &str, args: &[(&str, String)]) -> String {
        let mut text = self.get(lang, key);
        for (name, value) in args {
            text = text.replace(&format!("{{{name}}}"), value);
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> I18n {
        I18n::from_maps(vec![
            ("en", vec![("hello", "Hello {name}!"), ("only_en", "english")]),
            ("id", vec![("hello", "Halo {name}!")]),
        ])
    }

    #[test]
    fn lookup_and_substitution() {
        let i18n = sample();
        assert_eq!(
            i18n.get_with("id", "hello", &[("name", "Budi".into())]),
            "Halo Budi!"
        );
    }

    #[test]
    fn falls_back_to_english_then_key() {
        let i18n = sample();
        assert_eq!(i18n.get("id", "only_en"), "english");
        assert_eq!(i18n.get("id", "missing_everywhere"), "missing_everywhere");
    }
}
