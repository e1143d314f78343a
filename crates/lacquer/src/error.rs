//! Error type for the compilation facade.

use lacquer_css::CssError;
use lacquer_tokens::TokenError;
use thiserror::Error;

/// Errors surfaced by the compilation facade.
#[derive(Debug, Error)]
pub enum Error {
    /// A token-level failure (resolution, merge, palette).
    #[error(transparent)]
    Token(#[from] TokenError),

    /// A stylesheet-generation failure.
    #[error(transparent)]
    Css(#[from] CssError),

    /// The variable registry has no SCSS name for a token.
    #[error("no SCSS variable name registered for token '{token}'")]
    MissingVariableName { token: String },

    /// The preset JSON does not match the expected shape.
    #[error("invalid theme preset: {message}")]
    InvalidPreset { message: String },
}

/// Result type for facade operations.
pub type Result<T> = std::result::Result<T, Error>;
