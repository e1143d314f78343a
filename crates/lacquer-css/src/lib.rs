//! Lacquer CSS - selector algebra and stylesheet generation.
//!
//! This crate turns resolved token values (from `lacquer-tokens`) into a
//! minimal, cascade-correct stylesheet of custom-property declarations:
//!
//! - Selector composition and specificity adjustment ([`selector`])
//! - Rule / stylesheet primitives with cascade-ancestor paths ([`stylesheet`])
//! - Single-theme rule generation ([`build`])
//! - Multi-theme composition with global-theme nesting ([`multi`])
//! - Minimal-diff transform removing inherited declarations ([`minimal`])
//!
//! Selectors are treated as opaque strings throughout; the crate composes
//! them, it never parses CSS.

pub mod build;
pub mod error;
pub mod minimal;
pub mod multi;
pub mod selector;
pub mod stylesheet;

pub use build::{build_single_theme, BuildOptions, Scope, ThemeRuleKeys};
pub use error::{CssError, Result};
pub use minimal::transform;
pub use multi::{build_multi_theme, MultiThemeEntry};
pub use selector::{
    increase_specificity, increase_specificity_gradually, is_global_selector, no_customization,
    selector_for, SelectorCustomizer, GLOBAL_SELECTORS,
};
pub use stylesheet::{Rule, Stylesheet};
