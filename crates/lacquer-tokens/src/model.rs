//! Typed representation of themes, modes, contexts, overrides, and palettes.
//!
//! This is the stable data contract between build-time theme authoring and
//! the engine. Every type here round-trips through JSON (camelCase field
//! names on the wire), and every map preserves insertion order so that
//! generated output is deterministic.
//!
//! # Token values
//!
//! A token's value is either a literal string (`"#ff6b35"`, `"0 2px 4px"`)
//! or a reference to another token written in curly braces
//! (`"{colorBackground}"`). References are followed during resolution.
//!
//! # Mode-bound tokens
//!
//! A token listed in [`Theme::token_mode_map`] is *mode-bound*: its
//! assignment must be a per-state map with one entry for every state of its
//! mode. Modes declare exactly one default state; the other states carry a
//! CSS selector and an optional media-query gate.

use indexmap::IndexMap;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, TokenError};

/// Token name → CSS custom-property name (including the `--` prefix).
///
/// Supplied by an external naming component; the engine treats it as an
/// opaque lookup table and never generates names itself.
pub type PropertiesMap = IndexMap<String, String>;

/// Token name → SCSS variable name (including the `$` prefix).
pub type VariablesMap = IndexMap<String, String>;

/// A single token value: a literal, or a `{name}` reference to another token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TokenValue {
    /// A concrete literal value, emitted as-is.
    Literal(String),
    /// A reference to another token by name.
    Reference(String),
}

impl TokenValue {
    /// Parses the `{name}` reference syntax; anything else is a literal.
    pub fn parse(raw: &str) -> Self {
        match raw.strip_prefix('{').and_then(|r| r.strip_suffix('}')) {
            Some(target) if !target.is_empty() => TokenValue::Reference(target.to_string()),
            _ => TokenValue::Literal(raw.to_string()),
        }
    }

    /// Returns the referenced token name, if this is a reference.
    pub fn reference_target(&self) -> Option<&str> {
        match self {
            TokenValue::Reference(target) => Some(target),
            TokenValue::Literal(_) => None,
        }
    }

    /// Returns true if this value is a `{name}` reference.
    pub fn is_reference(&self) -> bool {
        matches!(self, TokenValue::Reference(_))
    }
}

impl std::fmt::Display for TokenValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenValue::Literal(value) => write!(f, "{}", value),
            TokenValue::Reference(target) => write!(f, "{{{}}}", target),
        }
    }
}

impl From<&str> for TokenValue {
    fn from(raw: &str) -> Self {
        TokenValue::parse(raw)
    }
}

impl Serialize for TokenValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TokenValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(TokenValue::parse(&raw))
    }
}

/// A token's assignment: one value for every mode state, or a single value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Assignment {
    /// A single value, used when the token is not mode-bound.
    Global(TokenValue),
    /// State name → value, used when the token is mode-bound.
    PerMode(IndexMap<String, TokenValue>),
}

impl Assignment {
    /// Convenience constructor for a global literal or `{name}` reference.
    pub fn global(raw: &str) -> Self {
        Assignment::Global(TokenValue::parse(raw))
    }

    /// Convenience constructor for a per-state assignment.
    pub fn per_mode<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Assignment::PerMode(
            entries
                .into_iter()
                .map(|(state, raw)| (state.to_string(), TokenValue::parse(raw)))
                .collect(),
        )
    }

    /// Returns the per-state map, if this is a mode assignment.
    pub fn states(&self) -> Option<&IndexMap<String, TokenValue>> {
        match self {
            Assignment::PerMode(states) => Some(states),
            Assignment::Global(_) => None,
        }
    }
}

/// One state of a mode: either the single default, or an optional state
/// activated by a selector (and possibly gated by a media query).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModeState {
    /// The default state, active when no optional state applies.
    Default { default: bool },
    /// An optional state with its activation selector.
    Optional {
        selector: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        media: Option<String>,
    },
}

/// An axis of variation (color scheme, density, motion) with mutually
/// exclusive named states, exactly one of which is the default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mode {
    pub id: String,
    pub states: IndexMap<String, ModeState>,
}

impl Mode {
    /// Returns the name of the default state.
    pub fn default_state(&self) -> Result<&str> {
        let defaults: Vec<&str> = self
            .states
            .iter()
            .filter(|(_, state)| matches!(state, ModeState::Default { default: true }))
            .map(|(name, _)| name.as_str())
            .collect();
        match defaults.as_slice() {
            [name] => Ok(name),
            _ => Err(TokenError::InvalidDefaultState {
                mode: self.id.clone(),
                found: defaults.len(),
            }),
        }
    }

    /// Iterates the non-default states with their selectors.
    pub fn optional_states(&self) -> impl Iterator<Item = (&str, &str, Option<&str>)> {
        self.states.iter().filter_map(|(name, state)| match state {
            ModeState::Optional { selector, media } => {
                Some((name.as_str(), selector.as_str(), media.as_deref()))
            }
            ModeState::Default { .. } => None,
        })
    }
}

/// A DOM-scoped token override region (e.g. "inside navigation chrome").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Context {
    pub id: String,
    pub selector: String,
    #[serde(default)]
    pub tokens: IndexMap<String, Assignment>,
    /// Optional state name that mode-bound tokens collapse to inside this
    /// context (e.g. a navigation bar that is always dark).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_mode: Option<String>,
}

/// Seed input for a generated color palette: either a bare seed color, or
/// an explicit (possibly partial) map of palette steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorPaletteInput {
    /// A seed color; the full ramp is generated from it.
    Seed(String),
    /// Explicit per-step colors, optionally seeded for the missing steps.
    Steps {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        seed: Option<String>,
        /// Step number (as a string key on the wire) → hex color.
        #[serde(flatten)]
        steps: IndexMap<String, String>,
    },
}

/// Per-role palette inputs for the generated reference-token ramps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColorReferenceTokens {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<ColorPaletteInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neutral: Option<ColorPaletteInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ColorPaletteInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<ColorPaletteInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<ColorPaletteInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<ColorPaletteInput>,
}

/// Seed-derived token ramps exposed as ordinary tokens.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceTokens {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorReferenceTokens>,
}

/// A theme: tokens, modes, mode membership, and contexts under one selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub id: String,
    pub selector: String,
    #[serde(default)]
    pub tokens: IndexMap<String, Assignment>,
    #[serde(default)]
    pub modes: IndexMap<String, Mode>,
    #[serde(default)]
    pub token_mode_map: IndexMap<String, String>,
    #[serde(default)]
    pub contexts: IndexMap<String, Context>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_tokens: Option<ReferenceTokens>,
}

impl Theme {
    /// Creates an empty theme with the given id and selector.
    pub fn new(id: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            selector: selector.into(),
            tokens: IndexMap::new(),
            modes: IndexMap::new(),
            token_mode_map: IndexMap::new(),
            contexts: IndexMap::new(),
            reference_tokens: None,
        }
    }

    /// Loads a theme from JSON text.
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Returns the mode a token is bound to, if any.
    pub fn mode_of(&self, token: &str) -> Option<&Mode> {
        let mode_id = self.token_mode_map.get(token)?;
        self.modes.get(mode_id)
    }

    /// Checks the structural invariants of the model:
    ///
    /// - every `tokenModeMap` key has a corresponding token,
    /// - every referenced mode is declared,
    /// - every mode has exactly one default state,
    /// - every mode-bound token maps all states of its mode.
    pub fn validate(&self) -> Result<()> {
        for mode in self.modes.values() {
            mode.default_state()?;
        }
        for (token, mode_id) in &self.token_mode_map {
            let assignment = self
                .tokens
                .get(token)
                .ok_or_else(|| TokenError::DanglingModeMapEntry {
                    token: token.clone(),
                })?;
            let mode = self
                .modes
                .get(mode_id)
                .ok_or_else(|| TokenError::UnknownMode {
                    token: token.clone(),
                    mode: mode_id.clone(),
                })?;
            let malformed = || TokenError::MalformedModeValue {
                token: token.clone(),
                mode: mode_id.clone(),
            };
            let states = assignment.states().ok_or_else(malformed)?;
            if !mode.states.keys().all(|state| states.contains_key(state)) {
                return Err(malformed());
            }
        }
        Ok(())
    }
}

/// A customer-supplied token override value: always concrete (no
/// references), either a single global value or a partial per-state map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OverrideValue {
    Global(String),
    PerMode(IndexMap<String, String>),
}

/// Context-scoped portion of an override.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextOverride {
    #[serde(default)]
    pub tokens: IndexMap<String, OverrideValue>,
}

/// A customer-supplied theme override: a subset of tokens (and contexts)
/// with concrete replacement values.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ThemeOverride {
    pub tokens: IndexMap<String, OverrideValue>,
    #[serde(default)]
    pub contexts: IndexMap<String, ContextOverride>,
}

impl ThemeOverride {
    /// Parses an override from JSON text.
    ///
    /// This is the override-validation boundary: a missing or non-map
    /// `tokens` field fails here, before any merge is attempted.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|err| TokenError::InvalidOverrideShape {
            message: err.to_string(),
        })
    }
}

impl<'de> Deserialize<'de> for ThemeOverride {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            tokens: Option<serde_json::Value>,
            #[serde(default)]
            contexts: IndexMap<String, ContextOverride>,
        }
        let raw = Raw::deserialize(deserializer)?;
        let tokens = match raw.tokens {
            Some(value @ serde_json::Value::Object(_)) => {
                serde_json::from_value(value).map_err(D::Error::custom)?
            }
            Some(other) => {
                return Err(D::Error::custom(format!(
                    "override tokens must be a map, got {}",
                    json_kind(&other)
                )))
            }
            None => return Err(D::Error::custom("override is missing the tokens map")),
        };
        Ok(ThemeOverride {
            tokens,
            contexts: raw.contexts,
        })
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "a map",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn light_dark_mode() -> Mode {
        let mut states = IndexMap::new();
        states.insert("light".to_string(), ModeState::Default { default: true });
        states.insert(
            "dark".to_string(),
            ModeState::Optional {
                selector: ".dark-mode".to_string(),
                media: Some("(prefers-color-scheme: dark)".to_string()),
            },
        );
        Mode {
            id: "color".to_string(),
            states,
        }
    }

    #[test]
    fn test_token_value_parse_literal() {
        assert_eq!(
            TokenValue::parse("#ff6b35"),
            TokenValue::Literal("#ff6b35".to_string())
        );
    }

    #[test]
    fn test_token_value_parse_reference() {
        assert_eq!(
            TokenValue::parse("{colorBackground}"),
            TokenValue::Reference("colorBackground".to_string())
        );
    }

    #[test]
    fn test_token_value_empty_braces_is_literal() {
        assert_eq!(TokenValue::parse("{}"), TokenValue::Literal("{}".to_string()));
    }

    #[test]
    fn test_token_value_display_round_trips() {
        for raw in ["grey", "{grey}", "0 2px 4px rgba(0,0,0,.2)"] {
            assert_eq!(TokenValue::parse(raw).to_string(), raw);
        }
    }

    #[test]
    fn test_assignment_json_shapes() {
        let global: Assignment = serde_json::from_str(r#""{grey}""#).unwrap();
        assert_eq!(global, Assignment::global("{grey}"));

        let per_mode: Assignment =
            serde_json::from_str(r#"{"light": "{grey}", "dark": "black"}"#).unwrap();
        assert_eq!(
            per_mode,
            Assignment::per_mode([("light", "{grey}"), ("dark", "black")])
        );
    }

    #[test]
    fn test_mode_default_state() {
        let mode = light_dark_mode();
        assert_eq!(mode.default_state().unwrap(), "light");
        let optional: Vec<_> = mode.optional_states().collect();
        assert_eq!(
            optional,
            vec![("dark", ".dark-mode", Some("(prefers-color-scheme: dark)"))]
        );
    }

    #[test]
    fn test_mode_without_default_state_fails() {
        let mut mode = light_dark_mode();
        mode.states
            .insert("light".to_string(), ModeState::Default { default: false });
        assert!(matches!(
            mode.default_state(),
            Err(TokenError::InvalidDefaultState { found: 0, .. })
        ));
    }

    #[test]
    fn test_theme_validate_ok() {
        let mut theme = Theme::new("base", ".base");
        theme.modes.insert("color".to_string(), light_dark_mode());
        theme.tokens.insert(
            "shadow".to_string(),
            Assignment::per_mode([("light", "{grey}"), ("dark", "black")]),
        );
        theme
            .token_mode_map
            .insert("shadow".to_string(), "color".to_string());
        theme
            .tokens
            .insert("grey".to_string(), Assignment::global("grey"));
        assert!(theme.validate().is_ok());
    }

    #[test]
    fn test_theme_validate_dangling_mode_map_entry() {
        let mut theme = Theme::new("base", ".base");
        theme.modes.insert("color".to_string(), light_dark_mode());
        theme
            .token_mode_map
            .insert("missing".to_string(), "color".to_string());
        assert!(matches!(
            theme.validate(),
            Err(TokenError::DanglingModeMapEntry { token }) if token == "missing"
        ));
    }

    #[test]
    fn test_theme_validate_incomplete_states() {
        let mut theme = Theme::new("base", ".base");
        theme.modes.insert("color".to_string(), light_dark_mode());
        theme.tokens.insert(
            "shadow".to_string(),
            Assignment::per_mode([("light", "grey")]),
        );
        theme
            .token_mode_map
            .insert("shadow".to_string(), "color".to_string());
        assert!(matches!(
            theme.validate(),
            Err(TokenError::MalformedModeValue { token, .. }) if token == "shadow"
        ));
    }

    #[test]
    fn test_theme_json_round_trip() {
        let mut theme = Theme::new("base", ":root");
        theme.modes.insert("color".to_string(), light_dark_mode());
        theme.tokens.insert(
            "shadow".to_string(),
            Assignment::per_mode([("light", "{grey}"), ("dark", "black")]),
        );
        theme
            .token_mode_map
            .insert("shadow".to_string(), "color".to_string());
        theme.contexts.insert(
            "navigation".to_string(),
            Context {
                id: "navigation".to_string(),
                selector: ".navigation".to_string(),
                tokens: IndexMap::from_iter([(
                    "shadow".to_string(),
                    Assignment::global("none"),
                )]),
                default_mode: Some("dark".to_string()),
            },
        );

        let json = serde_json::to_string(&theme).unwrap();
        let back = Theme::from_json(&json).unwrap();
        assert_eq!(back, theme);
        assert!(json.contains("tokenModeMap"));
        assert!(json.contains("defaultMode"));
    }

    #[test]
    fn test_override_rejects_missing_tokens() {
        let err = ThemeOverride::from_json(r#"{"contexts": {}}"#).unwrap_err();
        assert!(matches!(err, TokenError::InvalidOverrideShape { .. }));
    }

    #[test]
    fn test_override_rejects_non_map_tokens() {
        let err = ThemeOverride::from_json(r#"{"tokens": ["a"]}"#).unwrap_err();
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn test_override_accepts_partial_state_map() {
        let parsed = ThemeOverride::from_json(r#"{"tokens": {"shadow": {"dark": "{grey}"}}}"#)
            .unwrap();
        assert_eq!(
            parsed.tokens.get("shadow"),
            Some(&OverrideValue::PerMode(IndexMap::from_iter([(
                "dark".to_string(),
                "{grey}".to_string()
            )])))
        );
    }

    #[test]
    fn test_palette_input_shapes() {
        let seed: ColorPaletteInput = serde_json::from_str(r##""#0073bb""##).unwrap();
        assert_eq!(seed, ColorPaletteInput::Seed("#0073bb".to_string()));

        let steps: ColorPaletteInput =
            serde_json::from_str(r##"{"seed": "#0073bb", "500": "#0172b5"}"##).unwrap();
        match steps {
            ColorPaletteInput::Steps { seed, steps } => {
                assert_eq!(seed.as_deref(), Some("#0073bb"));
                assert_eq!(steps.get("500").map(String::as_str), Some("#0172b5"));
            }
            ColorPaletteInput::Seed(_) => panic!("expected step map"),
        }
    }
}
