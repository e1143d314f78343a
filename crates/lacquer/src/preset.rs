//! Theme presets: the packaged input to compilation.
//!
//! A preset bundles a primary theme, optional secondary themes, the
//! themeable-token allowlist for customer overrides, and the externally
//! generated naming registries. The engine treats both registries as opaque
//! lookup tables; it never invents a custom-property or SCSS variable name.

use lacquer_css::CssError;
use lacquer_tokens::{PropertiesMap, Theme, VariablesMap};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A complete, self-describing theming input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemePreset {
    /// The primary theme.
    pub theme: Theme,
    /// Additional themes composed onto the same page (e.g. a compact or
    /// high-contrast variant scoped to a class).
    #[serde(default)]
    pub secondary: Vec<Theme>,
    /// Tokens customers may override; everything else is dropped from
    /// overrides with a warning.
    #[serde(default)]
    pub themeable: Vec<String>,
    /// Tokens always emitted regardless of what stylesheets reference.
    #[serde(default)]
    pub exposed: Vec<String>,
    /// Token name → SCSS variable name (including the `$` prefix).
    #[serde(default)]
    pub variables_map: VariablesMap,
    /// Token name → CSS custom-property name (including the `--` prefix).
    #[serde(default)]
    pub properties_map: PropertiesMap,
}

impl ThemePreset {
    /// Parses a preset from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|err| Error::InvalidPreset {
            message: err.to_string(),
        })
    }

    /// Looks up the custom-property name for a token.
    pub fn property_name(&self, token: &str) -> Result<&str> {
        self.properties_map
            .get(token)
            .map(String::as_str)
            .ok_or_else(|| {
                Error::Css(CssError::MissingPropertyName {
                    token: token.to_string(),
                })
            })
    }

    /// Looks up the SCSS variable name for a token.
    pub fn variable_name(&self, token: &str) -> Result<&str> {
        self.variables_map
            .get(token)
            .map(String::as_str)
            .ok_or_else(|| Error::MissingVariableName {
                token: token.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_round_trips_through_json() {
        let json = r##"{
            "theme": {
                "id": "base",
                "selector": ":root",
                "tokens": {"grey": "#d5dbdb"}
            },
            "themeable": ["grey"],
            "exposed": ["grey"],
            "variablesMap": {"grey": "$color-grey"},
            "propertiesMap": {"grey": "--color-grey-x8d"}
        }"##;
        let preset = ThemePreset::from_json(json).unwrap();
        assert_eq!(preset.theme.id, "base");
        assert_eq!(preset.property_name("grey").unwrap(), "--color-grey-x8d");
        assert_eq!(preset.variable_name("grey").unwrap(), "$color-grey");
    }

    #[test]
    fn test_missing_registry_entries_are_descriptive() {
        let preset = ThemePreset::from_json(
            r#"{"theme": {"id": "base", "selector": ":root"}}"#,
        )
        .unwrap();
        let err = preset.property_name("grey").unwrap_err();
        assert!(err.to_string().contains("grey"));
        let err = preset.variable_name("grey").unwrap_err();
        assert!(err.to_string().contains("grey"));
    }

    #[test]
    fn test_malformed_preset_is_rejected() {
        assert!(matches!(
            ThemePreset::from_json(r#"{"secondary": []}"#),
            Err(Error::InvalidPreset { .. })
        ));
    }
}
