//! Error types for the token crate.

use thiserror::Error;

/// Errors that can occur while validating, resolving, or merging tokens.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TokenError {
    /// A token's reference chain revisits a token already on the current path.
    #[error("circular token reference: {}", path.join(" -> "))]
    CircularDependency {
        /// The walked chain, ending with the re-visited token.
        path: Vec<String>,
    },

    /// A reference points at a token that exists in neither the theme nor
    /// the base theme.
    #[error("token '{from}' references unknown token '{reference}'")]
    UnknownToken { from: String, reference: String },

    /// A mode-bound token was resolved without a mode state.
    #[error("mode-bound token '{token}' was resolved without a mode state")]
    MissingModeState { token: String },

    /// A token's resolution shape does not match the theme's declared mode
    /// membership. This is an internal invariant violation, never user input.
    #[error("resolution shape for token '{token}' does not match its mode declaration")]
    InconsistentModel { token: String },

    /// The override's `tokens` field is missing or not a plain map.
    #[error("invalid override shape: {message}")]
    InvalidOverrideShape { message: String },

    /// A token's mode membership names a mode the theme does not declare.
    #[error("token '{token}' is bound to undeclared mode '{mode}'")]
    UnknownMode { token: String, mode: String },

    /// A mode-bound token's key in `tokenModeMap` has no matching token.
    #[error("mode map entry '{token}' has no corresponding token")]
    DanglingModeMapEntry { token: String },

    /// A mode must declare exactly one default state.
    #[error("mode '{mode}' must declare exactly one default state, found {found}")]
    InvalidDefaultState { mode: String, found: usize },

    /// A mode-bound token's assignment is not a per-state map.
    #[error("mode-bound token '{token}' must map every state of mode '{mode}'")]
    MalformedModeValue { token: String, mode: String },

    /// A seed color could not be parsed as a hex color.
    #[error("invalid seed color '{value}': expected #rgb or #rrggbb")]
    InvalidSeedColor { value: String },

    /// The seed's tone landed outside every specification range even after
    /// nearest-range snapping. Unreachable by construction, checked anyway.
    #[error("seed tone {tone:.1} matches no range of the {role} palette specification")]
    PaletteSpecificationMismatch { role: String, tone: f64 },

    /// An explicit palette step key is not one of the known rungs.
    #[error("'{step}' is not a palette step (expected 50..=1000 in increments of 50)")]
    InvalidPaletteStep { step: String },
}

/// Result type for token operations.
pub type Result<T> = std::result::Result<T, TokenError>;
