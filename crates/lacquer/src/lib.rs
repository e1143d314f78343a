//! Lacquer - a design-token theming compiler.
//!
//! Lacquer takes a declarative token graph (values, `{name}` references,
//! per-mode variants, per-context overrides, and optional seed-based color
//! palettes) and compiles it into fully resolved token values plus a
//! minimal, cascade-correct CSS stylesheet of custom-property declarations.
//!
//! The workspace splits into three crates:
//!
//! - `lacquer-tokens` — token model, reference resolution, override
//!   merging, and accessible palette generation (pure computation)
//! - `lacquer-css` — selector algebra, rule generation, and the
//!   minimal-diff stylesheet transform
//! - `lacquer` (this crate) — presets and the end-to-end compilation
//!   pipeline
//!
//! # Quick Start
//!
//! ```rust
//! use lacquer::{compile_preset, CompileOptions, ThemePreset};
//!
//! let preset = ThemePreset::from_json(r##"{
//!     "theme": {
//!         "id": "base",
//!         "selector": ":root",
//!         "tokens": {"grey": "#d5dbdb", "shadow": "{grey}"}
//!     },
//!     "propertiesMap": {"grey": "--grey", "shadow": "--shadow"}
//! }"##).unwrap();
//!
//! let output = compile_preset(&preset, &CompileOptions::default()).unwrap();
//! assert!(output.css.contains("--shadow:#d5dbdb;"));
//! ```

pub mod compile;
pub mod error;
pub mod preset;
pub mod scss;

pub use compile::{compile_override, compile_preset, CompileOptions, CompileOutput};
pub use error::{Error, Result};
pub use preset::ThemePreset;
pub use scss::render_scss_variables;

pub use lacquer_css::{
    increase_specificity, increase_specificity_gradually, selector_for, Stylesheet,
};
pub use lacquer_tokens::{
    Assignment, Diagnostics, Theme, ThemeOverride, TokenValue, Warning,
};
