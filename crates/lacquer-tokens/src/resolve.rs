//! Token reference resolution.
//!
//! Resolution follows a token's reference chain until a literal terminates
//! it, recording the chain of token names walked (the *resolution path*,
//! used as provenance by partial resolution and context pull-in). Cycle
//! detection is an explicit visited-path check: revisiting a token on the
//! current path is a fatal authoring error.
//!
//! Two refinements on top of the plain walk:
//!
//! - **CSS variable short-circuit**: with
//!   [`ResolveOptions::use_css_vars`] set, dereferencing a token that has a
//!   registered custom-property name stops the walk and emits a
//!   `var(--prop)` expression, so generated CSS keeps natural cascade
//!   inheritance instead of flattening every reference to a literal.
//! - **Partial resolution**: with a base theme supplied, a token only
//!   appears in the result when it lives in the (override) theme itself or
//!   its path touches a token that does. Unrelated tokens are dropped
//!   entirely rather than re-emitted unchanged.

use indexmap::IndexMap;

use crate::error::{Result, TokenError};
use crate::model::{Assignment, Context, Mode, PropertiesMap, Theme, TokenValue};

/// Options controlling a resolution pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveOptions<'a> {
    /// Emit `var(--prop)` for references to registered tokens.
    pub use_css_vars: bool,
    /// Token name → custom-property name registry for the short-circuit.
    pub properties: Option<&'a PropertiesMap>,
}

/// A resolved value with its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedValue {
    pub value: String,
    /// The token names walked to produce the value, starting with the
    /// token itself, in walk order.
    pub path: Vec<String>,
}

impl ResolvedValue {
    /// True if the resolution path passed through any key of `tokens`.
    pub fn touches(&self, tokens: &IndexMap<String, Assignment>) -> bool {
        self.path.iter().any(|name| tokens.contains_key(name))
    }
}

/// A token's resolution: one value, or one value per mode state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedEntry {
    Single(ResolvedValue),
    PerState(IndexMap<String, ResolvedValue>),
}

impl ResolvedEntry {
    fn touches(&self, tokens: &IndexMap<String, Assignment>) -> bool {
        match self {
            ResolvedEntry::Single(value) => value.touches(tokens),
            ResolvedEntry::PerState(states) => states.values().any(|v| v.touches(tokens)),
        }
    }
}

/// Every token resolved, keyed by token name.
pub type FullResolution = IndexMap<String, ResolvedEntry>;

/// Exactly one resolved string per token (a mode projection of a
/// [`FullResolution`]).
pub type SpecificResolution = IndexMap<String, String>;

/// Resolves every token of a theme.
///
/// With a `base` theme supplied this is a partial (override) resolution:
/// iteration runs over the base theme's tokens, lookups prefer the override
/// theme, and only tokens owned by or affected by the override are kept.
pub fn resolve_theme(
    theme: &Theme,
    base: Option<&Theme>,
    options: &ResolveOptions,
) -> Result<FullResolution> {
    let full = base.unwrap_or(theme);
    let mut resolution = IndexMap::new();

    for token in full.tokens.keys() {
        let entry = match full.mode_of(token) {
            Some(mode) => {
                let mut per_state = IndexMap::with_capacity(mode.states.len());
                for state in mode.states.keys() {
                    per_state.insert(
                        state.clone(),
                        resolve_value(token, Some(state), theme, base, options)?,
                    );
                }
                ResolvedEntry::PerState(per_state)
            }
            None => ResolvedEntry::Single(resolve_value(token, None, theme, base, options)?),
        };

        if base.is_some() && !theme.tokens.contains_key(token) && !entry.touches(&theme.tokens) {
            continue;
        }
        resolution.insert(token.clone(), entry);
    }
    Ok(resolution)
}

/// Resolves a single token by walking its reference chain.
fn resolve_value(
    start: &str,
    state: Option<&str>,
    theme: &Theme,
    base: Option<&Theme>,
    options: &ResolveOptions,
) -> Result<ResolvedValue> {
    let full = base.unwrap_or(theme);
    let mut path: Vec<String> = Vec::new();
    let mut current = start.to_string();

    loop {
        if path.contains(&current) {
            path.push(current);
            return Err(TokenError::CircularDependency { path });
        }
        path.push(current.clone());

        let assignment = theme
            .tokens
            .get(&current)
            .or_else(|| base.and_then(|b| b.tokens.get(&current)))
            .ok_or_else(|| TokenError::UnknownToken {
                from: path[path.len().saturating_sub(2)].clone(),
                reference: current.clone(),
            })?;

        let value = match assignment {
            Assignment::Global(value) => value,
            Assignment::PerMode(states) => state_value(states, state, &current, full)?,
        };

        match value {
            TokenValue::Literal(literal) => {
                return Ok(ResolvedValue {
                    value: literal.clone(),
                    path,
                })
            }
            TokenValue::Reference(target) => {
                if options.use_css_vars {
                    if let Some(property) = options.properties.and_then(|p| p.get(target)) {
                        path.push(target.clone());
                        return Ok(ResolvedValue {
                            value: format!("var({})", property),
                            path,
                        });
                    }
                }
                current = target.clone();
            }
        }
    }
}

/// Picks the value for a per-state assignment.
///
/// A referenced token may belong to a different mode than the one being
/// resolved; in that case the token's own mode default is used. An unmapped
/// state of the token's *own* mode is a fatal model error, never papered
/// over with the default.
fn state_value<'a>(
    states: &'a IndexMap<String, TokenValue>,
    state: Option<&str>,
    token: &str,
    full: &Theme,
) -> Result<&'a TokenValue> {
    let state = state.ok_or_else(|| TokenError::MissingModeState {
        token: token.to_string(),
    })?;
    if let Some(value) = states.get(state) {
        return Ok(value);
    }
    let mode = full
        .mode_of(token)
        .ok_or_else(|| TokenError::InconsistentModel {
            token: token.to_string(),
        })?;
    if mode.states.contains_key(state) {
        return Err(TokenError::MissingModeState {
            token: token.to_string(),
        });
    }
    states
        .get(mode.default_state()?)
        .ok_or_else(|| TokenError::MissingModeState {
            token: token.to_string(),
        })
}

/// Resolves a context's token scope to one concrete value per token.
///
/// Context resolution is mode-insensitive: all per-state assignments are
/// collapsed first (to `state` if given, else the context's `defaultMode`
/// state when the token's mode declares it, else the mode default). The
/// result covers the context's own tokens plus every theme token whose
/// resolution path passes through one of them.
///
/// With a base theme, layering encodes the precedence
/// `[override-context] > [base-context] > [override] > [base]` by seeding
/// from the base chain before applying the context's own tokens.
pub fn resolve_context(
    theme: &Theme,
    context: &Context,
    base: Option<&Theme>,
    base_resolution: Option<&FullResolution>,
    state: Option<&str>,
    options: &ResolveOptions,
) -> Result<SpecificResolution> {
    let full = base.unwrap_or(theme);

    // Layered, mode-collapsed scope for this context.
    let mut scoped = Theme::new(full.id.clone(), full.selector.clone());
    collapse_into(&mut scoped.tokens, &full.tokens, full, context, state)?;
    if base.is_some() {
        collapse_into(&mut scoped.tokens, &theme.tokens, full, context, state)?;
    }
    let base_context = base.and_then(|b| b.contexts.get(&context.id));
    if let Some(base_context) = base_context {
        collapse_into(&mut scoped.tokens, &base_context.tokens, full, context, state)?;
    }
    collapse_into(&mut scoped.tokens, &context.tokens, full, context, state)?;

    // Tokens the context overrides directly.
    let mut declared: Vec<&String> = context.tokens.keys().collect();
    if let Some(base_context) = base_context {
        for token in base_context.tokens.keys() {
            if !declared.contains(&token) {
                declared.push(token);
            }
        }
    }

    let mut resolution = IndexMap::new();
    for token in full.tokens.keys() {
        let included = declared.contains(&token)
            || dependent_on(token, &declared, base_resolution, &scoped, options)?;
        if !included {
            continue;
        }
        let resolved = resolve_value(token, None, &scoped, None, options)?;
        resolution.insert(token.clone(), resolved.value);
    }
    Ok(resolution)
}

/// True if `token`'s resolution path passes through a declared token.
///
/// Paths come from the theme-level resolution when one is supplied;
/// otherwise the token is resolved (without the `var()` short-circuit, so
/// the full chain is visible) inside the context scope.
fn dependent_on(
    token: &str,
    declared: &[&String],
    base_resolution: Option<&FullResolution>,
    scoped: &Theme,
    options: &ResolveOptions,
) -> Result<bool> {
    let touches = |path: &[String]| {
        path.iter()
            .any(|walked| declared.iter().any(|d| *d == walked) && walked != token)
    };
    if let Some(resolution) = base_resolution {
        if let Some(entry) = resolution.get(token) {
            return Ok(match entry {
                ResolvedEntry::Single(value) => touches(&value.path),
                ResolvedEntry::PerState(states) => states.values().any(|v| touches(&v.path)),
            });
        }
    }
    let plain = ResolveOptions {
        use_css_vars: false,
        properties: options.properties,
    };
    let resolved = resolve_value(token, None, scoped, None, &plain)?;
    Ok(touches(&resolved.path))
}

/// Collapses assignments to globals and overlays them onto `target`.
fn collapse_into(
    target: &mut IndexMap<String, Assignment>,
    source: &IndexMap<String, Assignment>,
    full: &Theme,
    context: &Context,
    state: Option<&str>,
) -> Result<()> {
    for (token, assignment) in source {
        let collapsed = match assignment {
            Assignment::Global(value) => Assignment::Global(value.clone()),
            Assignment::PerMode(states) => {
                let chosen = collapse_state(token, states, full, context, state)?;
                Assignment::Global(chosen.clone())
            }
        };
        target.insert(token.clone(), collapsed);
    }
    Ok(())
}

/// Chooses the state a per-mode assignment collapses to inside a context.
fn collapse_state<'a>(
    token: &str,
    states: &'a IndexMap<String, TokenValue>,
    full: &Theme,
    context: &Context,
    state: Option<&str>,
) -> Result<&'a TokenValue> {
    for candidate in [state, context.default_mode.as_deref()].into_iter().flatten() {
        if let Some(value) = states.get(candidate) {
            return Ok(value);
        }
    }
    let default = match full.mode_of(token) {
        Some(mode) => mode.default_state()?.to_string(),
        // A collapsed scope may carry per-state values for tokens the model
        // no longer marks mode-bound; fall back to the first state.
        None => states
            .keys()
            .next()
            .cloned()
            .ok_or_else(|| TokenError::MissingModeState {
                token: token.to_string(),
            })?,
    };
    states
        .get(&default)
        .ok_or_else(|| TokenError::MissingModeState {
            token: token.to_string(),
        })
}

/// Projects a [`FullResolution`] to the default state of every mode.
pub fn defaults_reducer(theme: &Theme, resolution: &FullResolution) -> Result<SpecificResolution> {
    reduce(theme, resolution, |mode| mode.default_state())
}

/// Projects a [`FullResolution`] to a named state of one mode; tokens of
/// other modes reduce to their default state, mode-free tokens pass
/// through unchanged.
pub fn mode_reducer(
    theme: &Theme,
    resolution: &FullResolution,
    mode_id: &str,
    state: &str,
) -> Result<SpecificResolution> {
    reduce(theme, resolution, |mode| {
        if mode.id == mode_id {
            Ok(state)
        } else {
            mode.default_state()
        }
    })
}

fn reduce<'m>(
    theme: &'m Theme,
    resolution: &FullResolution,
    pick: impl Fn(&'m Mode) -> Result<&'m str>,
) -> Result<SpecificResolution> {
    let mut specific = IndexMap::with_capacity(resolution.len());
    for (token, entry) in resolution {
        let inconsistent = || TokenError::InconsistentModel {
            token: token.clone(),
        };
        let value = match (entry, theme.mode_of(token)) {
            (ResolvedEntry::Single(value), None) => value.value.clone(),
            (ResolvedEntry::PerState(states), Some(mode)) => {
                states.get(pick(mode)?).ok_or_else(inconsistent)?.value.clone()
            }
            // The resolution shape disagrees with the theme's declared mode
            // membership: an internal invariant violation.
            _ => return Err(inconsistent()),
        };
        specific.insert(token.clone(), value);
    }
    Ok(specific)
}
