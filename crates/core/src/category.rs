//! Product photo categories and their generation defaults.
//!
//! Each category carries a default list of style adapters applied during
//! image synthesis. Caller-supplied adapters are merged on top after
//! filtering out empty entries.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Default style adapter for on-model shots.
const ADAPTER_REALISM: &str = "VideoAditor/Flux-Lora-Realism";

/// Default style adapter for white-background retouch shots.
const ADAPTER_WHITE_BACKGROUND: &str = "gokaygokay/Flux-White-Background-LoRA";

/// Generation category for a prediction request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    /// Product worn by a model in a fashion-shoot setting.
    OnModel,
    /// Product staged in a creative photoshoot scene.
    Photoshoot,
    /// Product isolated on a clean white background.
    Retouch,
}

impl ProductCategory {
    /// Parse from the database/API `category` value.
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        match name {
            "on_model" => Ok(Self::OnModel),
            "photoshoot" => Ok(Self::Photoshoot),
            "retouch" => Ok(Self::Retouch),
            other => Err(CoreError::Validation(format!(
                "Unknown category '{other}'. Must be one of: on_model, photoshoot, retouch"
            ))),
        }
    }

    /// Database/API name value.
    pub fn name(self) -> &'static str {
        match self {
            Self::OnModel => "on_model",
            Self::Photoshoot => "photoshoot",
            Self::Retouch => "retouch",
        }
    }

    /// Default style adapters applied during synthesis for this category.
    pub fn default_style_adapters(self) -> &'static [&'static str] {
        match self {
            Self::OnModel => &[ADAPTER_REALISM],
            Self::Photoshoot => &[],
            Self::Retouch => &[ADAPTER_WHITE_BACKGROUND],
        }
    }
}

/// Merge the category defaults with caller-supplied adapters.
///
/// Caller entries are trimmed and empty strings dropped; defaults always
/// come first so category behavior is stable regardless of caller input.
pub fn merge_style_adapters(category: ProductCategory, extra: &[String]) -> Vec<String> {
    let mut adapters: Vec<String> = category
        .default_style_adapters()
        .iter()
        .map(|s| s.to_string())
        .collect();

    for entry in extra {
        let trimmed = entry.trim();
        if !trimmed.is_empty() {
            adapters.push(trimmed.to_string());
        }
    }

    adapters
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_from_name_roundtrip() {
        for name in ["on_model", "photoshoot", "retouch"] {
            assert_eq!(ProductCategory::from_name(name).unwrap().name(), name);
        }
        assert!(ProductCategory::from_name("portrait").is_err());
    }

    #[test]
    fn retouch_defaults_to_white_background_adapter() {
        assert_eq!(
            ProductCategory::Retouch.default_style_adapters(),
            [ADAPTER_WHITE_BACKGROUND].as_slice()
        );
    }

    #[test]
    fn photoshoot_has_no_default_adapters() {
        assert!(ProductCategory::Photoshoot.default_style_adapters().is_empty());
    }

    #[test]
    fn merge_keeps_defaults_first_and_filters_empties() {
        let merged = merge_style_adapters(
            ProductCategory::OnModel,
            &["  ".into(), "custom/adapter".into(), String::new()],
        );
        assert_eq!(merged, vec![ADAPTER_REALISM.to_string(), "custom/adapter".to_string()]);
    }

    #[test]
    fn merge_with_no_extras_is_exactly_the_defaults() {
        let merged = merge_style_adapters(ProductCategory::Retouch, &[]);
        assert_eq!(merged, vec![ADAPTER_WHITE_BACKGROUND.to_string()]);
    }
}
