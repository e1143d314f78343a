//! Multi-theme composition.
//!
//! At most one theme on a page may claim a page-global selector; two or
//! more would cascade unpredictably, so that is a hard configuration error
//! surfaced before any rule generation. With no global theme every rule
//! tree is independent and the stylesheets simply concatenate. With exactly
//! one, every secondary theme's rules are re-pathed as cascade descendants
//! of the corresponding global-theme rules (root under root, mode under
//! mode, context under context, and their cross product), so the minimal
//! transform diffs a secondary theme against the global theme rather than
//! against nothing.

use std::collections::HashSet;

use crate::build::{build_theme_rules, BuildOptions, Scope, ThemeRuleKeys};
use crate::error::{CssError, Result};
use crate::selector::is_global_selector;
use crate::stylesheet::Stylesheet;
use lacquer_tokens::Theme;

/// One theme of a multi-theme build, with its optional base for partial
/// (override) resolution.
pub struct MultiThemeEntry<'a> {
    pub theme: &'a Theme,
    pub base: Option<&'a Theme>,
}

/// Builds one stylesheet covering every supplied theme.
pub fn build_multi_theme(
    entries: &[MultiThemeEntry],
    options: &BuildOptions,
) -> Result<Stylesheet> {
    let global_positions: Vec<usize> = entries
        .iter()
        .enumerate()
        .filter(|(_, entry)| is_global_selector(&entry.theme.selector))
        .map(|(index, _)| index)
        .collect();
    if global_positions.len() > 1 {
        let ids = global_positions
            .iter()
            .map(|&index| entries[index].theme.id.clone())
            .collect();
        return Err(CssError::MultipleGlobalThemes { ids });
    }

    let mut stylesheet = Stylesheet::new();
    let Some(&global_index) = global_positions.first() else {
        for entry in entries {
            build_theme_rules(&mut stylesheet, entry.theme, entry.base, options, true)?;
        }
        return Ok(stylesheet);
    };
    let global_entry = &entries[global_index];
    let global_keys = build_theme_rules(
        &mut stylesheet,
        global_entry.theme,
        global_entry.base,
        options,
        true,
    )?;

    for (index, entry) in entries.iter().enumerate() {
        if index == global_index {
            continue;
        }
        // Secondary themes skip the globally-scoped context fallback: the
        // global theme's own context rules already cover that ground.
        let keys = build_theme_rules(&mut stylesheet, entry.theme, entry.base, options, false)?;
        nest_under_global(&mut stylesheet, &global_keys, &keys);
    }
    Ok(stylesheet)
}

/// Rewrites a secondary theme's rule paths to descend from the global
/// theme's rules. Paths are ordered farthest-ancestor first and filtered
/// to rules that were actually appended.
fn nest_under_global(
    stylesheet: &mut Stylesheet,
    global: &ThemeRuleKeys,
    secondary: &ThemeRuleKeys,
) {
    let present: HashSet<String> = stylesheet.keys().cloned().collect();
    let mut updates: Vec<(String, Vec<Option<&String>>)> = Vec::new();

    updates.push((secondary.root.clone(), vec![Some(&global.root)]));

    for ((mode, state), key) in &secondary.modes {
        updates.push((
            key.clone(),
            vec![
                Some(&global.root),
                global.modes.get(&(mode.clone(), state.clone())),
                Some(&secondary.root),
            ],
        ));
    }

    let global_context = |id: &String, scope: Scope| global.contexts.get(&(id.clone(), scope));
    for ((id, _), key) in &secondary.contexts {
        updates.push((
            key.clone(),
            vec![
                Some(&global.root),
                Some(&secondary.root),
                global_context(id, Scope::Themed),
                global_context(id, Scope::Global),
            ],
        ));
    }

    for ((id, mode, state, _), key) in &secondary.context_modes {
        let global_context_mode = |scope: Scope| {
            global
                .context_modes
                .get(&(id.clone(), mode.clone(), state.clone(), scope))
        };
        updates.push((
            key.clone(),
            vec![
                Some(&global.root),
                global.modes.get(&(mode.clone(), state.clone())),
                Some(&secondary.root),
                secondary.modes.get(&(mode.clone(), state.clone())),
                global_context(id, Scope::Themed),
                global_context(id, Scope::Global),
                global_context_mode(Scope::Themed),
                global_context_mode(Scope::Global),
                secondary.contexts.get(&(id.clone(), Scope::Themed)),
            ],
        ));
    }

    for (key, path) in updates {
        let path: Vec<String> = path
            .into_iter()
            .flatten()
            .filter(|ancestor| present.contains(*ancestor))
            .cloned()
            .collect();
        if let Some(rule) = stylesheet.get_mut(&key) {
            rule.path = path;
        }
    }
}
