//! Error types for stylesheet generation.

use lacquer_tokens::TokenError;
use thiserror::Error;

/// Errors that can occur while building stylesheets.
#[derive(Debug, Error)]
pub enum CssError {
    /// More than one theme in a multi-theme build claims a page-global
    /// selector; their cascade order would be unpredictable.
    #[error("multiple themes claim a page-global selector: {}", ids.join(", "))]
    MultipleGlobalThemes { ids: Vec<String> },

    /// The property registry has no custom-property name for a token that
    /// must be emitted.
    #[error("no custom-property name registered for token '{token}'")]
    MissingPropertyName { token: String },

    /// A token-level failure surfaced during rule generation.
    #[error(transparent)]
    Token(#[from] TokenError),
}

/// Result type for stylesheet operations.
pub type Result<T> = std::result::Result<T, CssError>;
