//! Lacquer tokens - design-token model, resolution, and merging.
//!
//! This crate is the computation core of the theming engine: it defines the
//! token data model and implements every pure transformation over it. CSS
//! generation lives in a separate crate; nothing here knows how to render
//! a stylesheet.
//!
//! - Typed model for themes, modes, contexts, and overrides ([`model`])
//! - Reference resolution with cycle detection and provenance ([`resolve`])
//! - Override sanitization, merging, and minimal-diff derivation ([`merge`])
//! - Seed-derived accessible color palettes ([`palette`])
//! - Non-fatal validation warnings ([`diagnostics`])
//!
//! # Quick Start
//!
//! ```rust
//! use lacquer_tokens::{
//!     resolve_theme, Assignment, Mode, ModeState, ResolveOptions, Theme,
//! };
//! use indexmap::IndexMap;
//!
//! let mut theme = Theme::new("base", ":root");
//! theme.tokens.insert("grey".into(), Assignment::global("#d5dbdb"));
//! theme.tokens.insert(
//!     "shadow".into(),
//!     Assignment::per_mode([("light", "{grey}"), ("dark", "black")]),
//! );
//! let mut states = IndexMap::new();
//! states.insert("light".to_string(), ModeState::Default { default: true });
//! states.insert(
//!     "dark".to_string(),
//!     ModeState::Optional { selector: ".dark-mode".into(), media: None },
//! );
//! theme.modes.insert("color".into(), Mode { id: "color".into(), states });
//! theme.token_mode_map.insert("shadow".into(), "color".into());
//!
//! let resolution = resolve_theme(&theme, None, &ResolveOptions::default()).unwrap();
//! assert_eq!(resolution.len(), 2);
//! ```
//!
//! # Determinism
//!
//! Every map in the model is insertion-ordered and every algorithm iterates
//! in that order, so identical inputs always produce identical outputs.

pub mod diagnostics;
pub mod error;
pub mod merge;
pub mod model;
pub mod palette;
pub mod resolve;

pub use diagnostics::{Diagnostics, Warning};
pub use error::{Result, TokenError};
pub use merge::{create_minimal_theme, difference, merge, sanitize_override};
pub use model::{
    Assignment, ColorPaletteInput, ColorReferenceTokens, Context, ContextOverride, Mode,
    ModeState, OverrideValue, PropertiesMap, ReferenceTokens, Theme, ThemeOverride, TokenValue,
    VariablesMap,
};
pub use palette::{
    expand_palette_input, generate_palette, get_palette, materialize_reference_tokens,
    palette_token_name, PaletteCache, PaletteMode, PaletteRole, PaletteStep,
    ReferencePaletteDefinition,
};
pub use resolve::{
    defaults_reducer, mode_reducer, resolve_context, resolve_theme, FullResolution,
    ResolveOptions, ResolvedEntry, ResolvedValue, SpecificResolution,
};
