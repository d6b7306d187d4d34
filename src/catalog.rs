//! Immutable provider/model catalog, loaded once at startup from the JSON
//! descriptor files and shared read-only across all tasks afterwards.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::draft::DraftValue;
use crate::error::BotError;

#[derive(Debug, Clone, Deserialize)]
pub struct Provider {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Integer,
    #[serde(alias = "float")]
    Number,
    Boolean,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelParameter {
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type")]
    pub param_type: ParamType,
    #[serde(default)]
    pub default: Option<DraftValue>,
    /// Non-empty options mean the value is chosen from a button menu
    /// rather than typed as free text.
    #[serde(default)]
    pub options: Vec<DraftValue>,
}

impl ModelParameter {
    /// Display label, falling back to the raw parameter name.
    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            &self.name
        } else {
            &self.label
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelDescriptor {
    pub id: String,
    pub name: String,
    /// Downstream `owner/name` pair identifying the hosted model.
    pub route: String,
    pub cost: i32,
    pub enabled: bool,
    #[serde(default)]
    pub accepts_image_input: bool,
    #[serde(default)]
    pub accepts_multiple_images: bool,
    #[serde(default)]
    pub image_parameter_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parameters: Vec<ModelParameter>,
}

impl ModelDescriptor {
    /// Split the route into its `(owner, name)` pair.
    pub fn route_parts(&self) -> Result<(&str, &str), BotError> {
        match self.route.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() => Ok((owner, name)),
            _ => Err(BotError::InvalidRouteFormat(self.route.clone())),
        }
    }

    pub fn parameter(&self, name: &str) -> Option<&ModelParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

#[derive(Debug, Clone)]
pub struct Catalog {
    pub providers: Vec<Provider>,
    pub models: Vec<ModelDescriptor>,
}

impl Catalog {
    /// Load both descriptor files from the config directory. Any failure
    /// here is fatal to startup; there is no partial-catalog mode.
    pub fn load(dir: &str) -> Result<Self, std::io::Error> {
        let providers = fs::read_to_string(Path::new(dir).join("providers.json"))?;
        let models = fs::read_to_string(Path::new(dir).join("models.json"))?;
        Self::from_json(&providers, &models)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    pub fn from_json(providers: &str, models: &str) -> Result<Self, serde_json::Error> {
        Ok(Self {
            providers: serde_json::from_str(providers)?,
            models: serde_json::from_str(models)?,
        })
    }

    pub fn model(&self, id: &str) -> Option<&ModelDescriptor> {
        self.models.iter().find(|m| m.id == id)
    }

    /// Enabled models offered by a provider, matched on the owner segment
    /// of the route. Routes under `google/` match provider id `google`
    /// even though the hosted catalog lists them under vendor aliases.
    pub fn models_for_provider(&self, provider_id: &str) -> Vec<&ModelDescriptor> {
        self.models
            .iter()
            .filter(|m| m.enabled && Self::provider_matches(&m.route, provider_id))
            .collect()
    }

    fn provider_matches(route: &str, provider_id: &str) -> bool {
        if route.starts_with("google/") && provider_id == "google" {
            return true;
        }
        route
            .split('/')
            .next()
            .is_some_and(|owner| owner == provider_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(route: &str) -> ModelDescriptor {
        ModelDescriptor {
            id: "m".into(),
            name: "M".into(),
            route: route.into(),
            cost: 1,
            enabled: true,
            accepts_image_input: false,
            accepts_multiple_images: false,
            image_parameter_name: String::new(),
            description: String::new(),
            parameters: Vec::new(),
        }
    }

    #[test]
    fn route_parts_ok() {
        let m = descriptor("acme/supergen");
        assert_eq!(m.route_parts().unwrap(), ("acme", "supergen"));
    }

    #[test]
    fn route_parts_rejects_missing_segment() {
        assert!(descriptor("acmeonly").route_parts().is_err());
        assert!(descriptor("acme/").route_parts().is_err());
        assert!(descriptor("/supergen").route_parts().is_err());
    }

    #[test]
    fn google_routes_match_google_provider() {
        assert!(Catalog::provider_matches("google/nano-banana", "google"));
        assert!(Catalog::provider_matches("acme/gen", "acme"));
        assert!(!Catalog::provider_matches("acme/gen", "google"));
    }
}
