//! Override merging, sanitization, and minimal-theme derivation.
//!
//! Customer overrides are applied in three stages:
//!
//! 1. [`sanitize_override`] drops tokens outside the themeable allowlist and
//!    contexts the theme does not declare, recording a warning per offender.
//! 2. [`merge`] folds the surviving override values into a copy of the base
//!    theme, reconciling the value shapes (global vs per-state).
//! 3. [`create_minimal_theme`] reduces the merged theme to the tokens whose
//!    resolved output actually changed, so downstream stylesheet generation
//!    emits a patch rather than a full restatement.

use crate::diagnostics::{Diagnostics, Warning};
use crate::error::Result;
use crate::model::{Assignment, ContextOverride, OverrideValue, Theme, ThemeOverride, TokenValue};
use crate::resolve::{resolve_theme, FullResolution, ResolveOptions, ResolvedEntry};

/// Removes override entries the theme cannot accept.
///
/// Tokens outside `themeable` and contexts the theme does not declare are
/// dropped with a warning; everything else passes through untouched.
pub fn sanitize_override(
    override_: &ThemeOverride,
    themeable: &[String],
    theme: &Theme,
    diagnostics: &mut Diagnostics,
) -> ThemeOverride {
    let keep_token = |token: &String, diagnostics: &mut Diagnostics| {
        if themeable.contains(token) {
            true
        } else {
            diagnostics.warn(Warning::UnthemeableToken {
                token: token.clone(),
            });
            false
        }
    };

    let mut sanitized = ThemeOverride::default();
    for (token, value) in &override_.tokens {
        if keep_token(token, diagnostics) {
            sanitized.tokens.insert(token.clone(), value.clone());
        }
    }
    for (id, context) in &override_.contexts {
        if !theme.contexts.contains_key(id) {
            diagnostics.warn(Warning::InvalidContextId {
                context: id.clone(),
            });
            continue;
        }
        let mut kept = ContextOverride::default();
        for (token, value) in &context.tokens {
            if keep_token(token, diagnostics) {
                kept.tokens.insert(token.clone(), value.clone());
            }
        }
        sanitized.contexts.insert(id.clone(), kept);
    }
    sanitized
}

/// Merges an override into a copy of the theme.
///
/// Shape reconciliation per token:
///
/// - global value onto a global assignment: replace;
/// - global value onto a per-state assignment: broadcast over every state;
/// - per-state map onto a per-state assignment: shallow merge, override
///   state wins;
/// - per-state map onto a global assignment: incompatible, ignored with a
///   warning.
///
/// Override tokens the theme does not define are ignored (sanitization
/// should have flagged them already).
pub fn merge(theme: &Theme, override_: &ThemeOverride, diagnostics: &mut Diagnostics) -> Theme {
    let mut merged = theme.clone();
    merge_tokens(&mut merged.tokens, &override_.tokens, diagnostics);
    for (id, context_override) in &override_.contexts {
        if let Some(context) = merged.contexts.get_mut(id) {
            merge_tokens(&mut context.tokens, &context_override.tokens, diagnostics);
        }
    }
    merged
}

fn merge_tokens(
    tokens: &mut indexmap::IndexMap<String, Assignment>,
    overrides: &indexmap::IndexMap<String, OverrideValue>,
    diagnostics: &mut Diagnostics,
) {
    for (token, value) in overrides {
        let Some(assignment) = tokens.get_mut(token) else {
            continue;
        };
        match (&mut *assignment, value) {
            (Assignment::Global(current), OverrideValue::Global(raw)) => {
                *current = TokenValue::parse(raw);
            }
            (Assignment::PerMode(states), OverrideValue::Global(raw)) => {
                let parsed = TokenValue::parse(raw);
                for state_value in states.values_mut() {
                    *state_value = parsed.clone();
                }
            }
            (Assignment::PerMode(states), OverrideValue::PerMode(override_states)) => {
                for (state, raw) in override_states {
                    states.insert(state.clone(), TokenValue::parse(raw));
                }
            }
            (Assignment::Global(_), OverrideValue::PerMode(_)) => {
                diagnostics.warn(Warning::IncompatibleOverrideShape {
                    token: token.clone(),
                });
            }
        }
    }
}

/// Token names whose resolved output in `other` differs from `base`.
///
/// Comparison is by resolved value only (provenance paths are ignored); a
/// shape change or a state present on one side only counts as different.
pub fn difference(base: &FullResolution, other: &FullResolution) -> Vec<String> {
    other
        .iter()
        .filter(|(token, entry)| {
            base.get(*token)
                .map_or(true, |base_entry| !values_equal(base_entry, entry))
        })
        .map(|(token, _)| token.clone())
        .collect()
}

fn values_equal(a: &ResolvedEntry, b: &ResolvedEntry) -> bool {
    match (a, b) {
        (ResolvedEntry::Single(a), ResolvedEntry::Single(b)) => a.value == b.value,
        (ResolvedEntry::PerState(a), ResolvedEntry::PerState(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(state, value)| b.get(state).map_or(false, |v| v.value == value.value))
        }
        _ => false,
    }
}

/// Derives the smallest theme that, applied on top of `theme`, reproduces
/// the override's effect.
///
/// The merged theme is validated and resolved against the base resolution;
/// only tokens
/// whose resolved output changed survive. With `use_css_vars` the cut is
/// stricter still: a token only survives when the override names it
/// explicitly, because unchanged dependents inherit through `var()`
/// references and need no restatement.
pub fn create_minimal_theme(
    theme: &Theme,
    override_: &ThemeOverride,
    use_css_vars: bool,
    diagnostics: &mut Diagnostics,
) -> Result<Theme> {
    let merged = merge(theme, override_, diagnostics);
    merged.validate()?;

    let plain = ResolveOptions::default();
    let base_resolution = resolve_theme(theme, None, &plain)?;
    let merged_resolution = resolve_theme(&merged, None, &plain)?;
    let mut differing = difference(&base_resolution, &merged_resolution);
    if use_css_vars {
        differing.retain(|token| override_.tokens.contains_key(token));
    }

    let mut minimal = merged;
    minimal.tokens.retain(|token, _| differing.contains(token));
    minimal
        .token_mode_map
        .retain(|token, _| minimal.tokens.contains_key(token));
    for (id, context) in minimal.contexts.iter_mut() {
        let declared = override_.contexts.get(id);
        context
            .tokens
            .retain(|token, _| declared.map_or(false, |c| c.tokens.contains_key(token)));
    }
    minimal.contexts.retain(|_, context| !context.tokens.is_empty());
    Ok(minimal)
}
