//! Single-theme rule generation.
//!
//! Rule generation walks a fixed enumeration for one theme: the root rule
//! (theme-scoped defaults), one rule per optional mode state, two rules per
//! context (theme-scoped and globally-scoped fallback), and two per
//! (context × optional mode state). Each rule's ancestor path is the
//! minimal set the minimal-diff transform needs: a context-within-mode rule
//! is diffed against the plain context rule, the plain mode rule, and the
//! root rule, never against a context of an unrelated mode.
//!
//! Declarations are bounded by an externally-computed needed-token set and
//! named through the caller's property registry; the builder never invents
//! custom-property names.

use indexmap::IndexMap;
use lacquer_tokens::{
    defaults_reducer, mode_reducer, resolve_context, resolve_theme, PropertiesMap, ResolveOptions,
    SpecificResolution, Theme,
};

use crate::error::{CssError, Result};
use crate::selector::{selector_for, SelectorCustomizer};
use crate::stylesheet::{Rule, Stylesheet};

/// Whether a context rule is nested under the theme selector or emitted as
/// a bare global fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Themed,
    Global,
}

/// Shared inputs for rule generation.
pub struct BuildOptions<'a> {
    /// Token name → custom-property name registry.
    pub properties: &'a PropertiesMap,
    /// Tokens worth emitting at all; `None` means every token.
    pub needed_tokens: Option<&'a [String]>,
    /// Resolve references to `var()` expressions instead of literals.
    pub use_css_vars: bool,
    pub customizer: SelectorCustomizer<'a>,
}

impl BuildOptions<'_> {
    fn needed(&self, token: &str) -> bool {
        self.needed_tokens
            .map_or(true, |needed| needed.iter().any(|n| n == token))
    }

    fn resolve_options(&self) -> ResolveOptions<'_> {
        ResolveOptions {
            use_css_vars: self.use_css_vars,
            properties: self.use_css_vars.then_some(self.properties),
        }
    }
}

/// The keys of every rule generated for one theme, used by multi-theme
/// composition to re-path secondary themes under the global theme.
#[derive(Debug, Default)]
pub struct ThemeRuleKeys {
    pub root: String,
    /// (mode id, state name) → rule key.
    pub modes: IndexMap<(String, String), String>,
    /// (context id, scope) → rule key.
    pub contexts: IndexMap<(String, Scope), String>,
    /// (context id, mode id, state name, scope) → rule key.
    pub context_modes: IndexMap<(String, String, String, Scope), String>,
}

/// Builds the full rule set for a single theme.
pub fn build_single_theme(
    theme: &Theme,
    base: Option<&Theme>,
    options: &BuildOptions,
) -> Result<Stylesheet> {
    let mut stylesheet = Stylesheet::new();
    build_theme_rules(&mut stylesheet, theme, base, options, true)?;
    Ok(stylesheet)
}

/// Appends one theme's rules to the stylesheet and reports their keys.
///
/// `global_context_scope` controls whether the globally-scoped context
/// fallback rules are generated; multi-theme composition disables them for
/// secondary themes, whose contexts fall back to the global theme's rules.
pub(crate) fn build_theme_rules(
    stylesheet: &mut Stylesheet,
    theme: &Theme,
    base: Option<&Theme>,
    options: &BuildOptions,
    global_context_scope: bool,
) -> Result<ThemeRuleKeys> {
    let full = base.unwrap_or(theme);
    let resolve_options = options.resolve_options();
    let resolution = resolve_theme(theme, base, &resolve_options)?;

    let mut keys = ThemeRuleKeys::default();

    // Root rule: theme-scoped defaults.
    let root_selector = selector_for(&[theme.selector.as_str()], &[], options.customizer);
    let mut root = Rule::new(root_selector, None, Vec::new());
    fill_declarations(&mut root, &defaults_reducer(full, &resolution)?, options)?;
    keys.root = root.key();
    stylesheet.append_rule(root);

    // One rule per optional mode state, holding only that mode's tokens.
    for mode in full.modes.values() {
        for (state, state_selector, media) in mode.optional_states() {
            let specific = mode_reducer(full, &resolution, &mode.id, state)?;
            let selector = selector_for(
                &[theme.selector.as_str(), state_selector],
                &[],
                options.customizer,
            );
            let mut rule = Rule::new(
                selector,
                media.map(str::to_string),
                vec![keys.root.clone()],
            );
            let of_this_mode: SpecificResolution = specific
                .into_iter()
                .filter(|(token, _)| full.token_mode_map.get(token) == Some(&mode.id))
                .collect();
            fill_declarations(&mut rule, &of_this_mode, options)?;
            keys.modes
                .insert((mode.id.clone(), state.to_string()), rule.key());
            stylesheet.append_rule(rule);
        }
    }

    // Context rules, theme-scoped and (optionally) globally-scoped. The
    // (override) theme's copy of a context wins over the base theme's.
    for base_context in full.contexts.values() {
        let context = theme.contexts.get(&base_context.id).unwrap_or(base_context);
        let specific = resolve_context(
            theme,
            context,
            base,
            Some(&resolution),
            None,
            &resolve_options,
        )?;
        let themed = selector_for(
            &[theme.selector.as_str()],
            &[context.selector.as_str()],
            options.customizer,
        );
        let global = selector_for(&[], &[context.selector.as_str()], options.customizer);
        let mut scopes = vec![(Scope::Themed, themed.clone())];
        // A :root theme produces identical themed and global context
        // selectors; emit the rule once.
        if global_context_scope && global != themed {
            scopes.push((Scope::Global, global));
        }
        for (scope, selector) in scopes {
            let mut rule = Rule::new(selector, None, vec![keys.root.clone()]);
            fill_declarations(&mut rule, &specific, options)?;
            keys.contexts
                .insert((context.id.clone(), scope), rule.key());
            stylesheet.append_rule(rule);
        }
    }

    // Context × optional mode state, in the same two scopings.
    for base_context in full.contexts.values() {
        let context = theme.contexts.get(&base_context.id).unwrap_or(base_context);
        for mode in full.modes.values() {
            for (state, state_selector, media) in mode.optional_states() {
                let specific = resolve_context(
                    theme,
                    context,
                    base,
                    None,
                    Some(state),
                    &resolve_options,
                )?;
                let themed = selector_for(
                    &[theme.selector.as_str(), state_selector],
                    &[context.selector.as_str()],
                    options.customizer,
                );
                let global = selector_for(
                    &[state_selector],
                    &[context.selector.as_str()],
                    options.customizer,
                );
                let mut scopes = vec![(Scope::Themed, themed.clone())];
                if global_context_scope && global != themed {
                    scopes.push((Scope::Global, global));
                }
                for (scope, selector) in scopes {
                    let mut path = vec![keys.root.clone()];
                    if let Some(mode_key) = keys.modes.get(&(mode.id.clone(), state.to_string())) {
                        path.push(mode_key.clone());
                    }
                    if let Some(context_key) = keys.contexts.get(&(context.id.clone(), scope)) {
                        path.push(context_key.clone());
                    }
                    let mut rule = Rule::new(selector, media.map(str::to_string), path);
                    fill_declarations(&mut rule, &specific, options)?;
                    keys.context_modes.insert(
                        (
                            context.id.clone(),
                            mode.id.clone(),
                            state.to_string(),
                            scope,
                        ),
                        rule.key(),
                    );
                    stylesheet.append_rule(rule);
                }
            }
        }
    }

    tracing::debug!(
        theme = %theme.id,
        rules = stylesheet.len(),
        "generated theme rules"
    );
    Ok(keys)
}

/// Copies needed tokens into a rule's declarations via the registry.
fn fill_declarations(
    rule: &mut Rule,
    specific: &SpecificResolution,
    options: &BuildOptions,
) -> Result<()> {
    for (token, value) in specific {
        if !options.needed(token) {
            continue;
        }
        let property = options
            .properties
            .get(token)
            .ok_or_else(|| CssError::MissingPropertyName {
                token: token.clone(),
            })?;
        rule.declarations.insert(property.clone(), value.clone());
    }
    Ok(())
}
