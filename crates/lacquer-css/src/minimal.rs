//! Minimal-diff stylesheet transform.
//!
//! Generated rules initially restate every declaration their cascade
//! ancestors already establish. This pass removes the redundancy: each rule
//! keeps only declarations that differ from the value aggregated over its
//! ancestor path, plus `var()` declarations that must survive for cascade
//! correctness. Rules left with nothing are dropped.
//!
//! Ancestors are processed first (ascending path length), so a rule always
//! diffs against ancestors that are already in their final, minimal form.

use indexmap::IndexMap;
use std::collections::HashSet;

use crate::selector::is_global_selector;
use crate::stylesheet::Stylesheet;

/// Reduces every rule to the declarations it actually needs. Mutates the
/// stylesheet in place and is idempotent.
pub fn transform(stylesheet: &mut Stylesheet) {
    let before = stylesheet.len();
    let mut keys: Vec<String> = stylesheet.keys().cloned().collect();
    // Stable sort: insertion (cascade) order is preserved among rules of
    // equal depth.
    keys.sort_by_key(|key| stylesheet.get(key).map_or(0, |rule| rule.path.len()));

    for key in keys {
        let Some(rule) = stylesheet.get(&key) else {
            continue;
        };
        if rule.path.is_empty() {
            continue;
        }

        // Aggregate ancestor declarations, nearest ancestor last so it
        // overwrites farther ones. Ancestors dropped by an earlier
        // iteration (or never appended) are skipped.
        let mut resolved_parent: IndexMap<&String, &String> = IndexMap::new();
        let mut chain: Vec<&IndexMap<String, String>> = Vec::new();
        for ancestor in &rule.path {
            if let Some(ancestor_rule) = stylesheet.get(ancestor) {
                for (property, value) in &ancestor_rule.declarations {
                    resolved_parent.insert(property, value);
                }
                chain.push(&ancestor_rule.declarations);
            }
        }

        let retain_cascade_vars = rule.media.is_none() && !is_global_selector(&rule.selector);
        let mut minimal: IndexMap<String, String> = IndexMap::new();
        for (property, value) in &rule.declarations {
            if resolved_parent.get(property) != Some(&value) {
                minimal.insert(property.clone(), value.clone());
                continue;
            }
            // Unchanged, but a var() reference may still need restating:
            // the rule's DOM node can sit under an uncontrolled element
            // that overrides the referenced property, so any declaration
            // whose referenced variable varies along the chain is kept.
            // Media-gated rules skip this; within one media context the
            // natural variable cascade is already correct. Globally scoped
            // rules have no uncontrolled ancestors to worry about.
            if !retain_cascade_vars {
                continue;
            }
            let Some(target) = var_reference(value) else {
                continue;
            };
            let mut values: HashSet<&str> = HashSet::new();
            for declarations in &chain {
                if let Some(v) = declarations.get(target) {
                    values.insert(v);
                }
            }
            if let Some(v) = rule.declarations.get(target) {
                values.insert(v);
            }
            if values.len() >= 2 {
                minimal.insert(property.clone(), value.clone());
            }
        }

        if minimal.is_empty() {
            stylesheet.remove(&key);
        } else if let Some(rule) = stylesheet.get_mut(&key) {
            rule.declarations = minimal;
        }
    }
    tracing::debug!(
        before,
        after = stylesheet.len(),
        "minimal-diff transform"
    );
}

/// Extracts the property name from a plain `var(--name)` expression.
fn var_reference(value: &str) -> Option<&str> {
    let inner = value.strip_prefix("var(")?.strip_suffix(')')?;
    (inner.starts_with("--") && !inner.contains(',')).then_some(inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stylesheet::Rule;

    fn rule(
        selector: &str,
        media: Option<&str>,
        path: &[&str],
        declarations: &[(&str, &str)],
    ) -> Rule {
        let mut rule = Rule::new(
            selector,
            media.map(str::to_string),
            path.iter().map(|p| p.to_string()).collect(),
        );
        for (property, value) in declarations {
            rule.declarations
                .insert(property.to_string(), value.to_string());
        }
        rule
    }

    #[test]
    fn test_unchanged_declarations_are_removed() {
        let mut stylesheet = Stylesheet::new();
        stylesheet.append_rule(rule(":root", None, &[], &[("--a", "1"), ("--b", "2")]));
        stylesheet.append_rule(rule(
            ".dark-mode",
            None,
            &[":root"],
            &[("--a", "1"), ("--b", "3")],
        ));
        transform(&mut stylesheet);

        let dark = stylesheet.get(".dark-mode").unwrap();
        assert!(!dark.declarations.contains_key("--a"));
        assert_eq!(dark.declarations["--b"], "3");
    }

    #[test]
    fn test_fully_redundant_rule_is_dropped() {
        let mut stylesheet = Stylesheet::new();
        stylesheet.append_rule(rule(":root", None, &[], &[("--a", "1")]));
        stylesheet.append_rule(rule(".dark-mode", None, &[":root"], &[("--a", "1")]));
        transform(&mut stylesheet);
        assert!(stylesheet.get(".dark-mode").is_none());
    }

    #[test]
    fn test_nearest_ancestor_wins_in_aggregation() {
        let mut stylesheet = Stylesheet::new();
        stylesheet.append_rule(rule(":root", None, &[], &[("--a", "1")]));
        stylesheet.append_rule(rule(".dark-mode", None, &[":root"], &[("--a", "2")]));
        stylesheet.append_rule(rule(
            ".dark-mode .navigation",
            None,
            &[":root", ".dark-mode"],
            &[("--a", "2")],
        ));
        transform(&mut stylesheet);
        // Matches the nearest ancestor, so it is redundant.
        assert!(stylesheet.get(".dark-mode .navigation").is_none());
    }

    #[test]
    fn test_missing_ancestors_are_skipped() {
        let mut stylesheet = Stylesheet::new();
        stylesheet.append_rule(rule(
            ".navigation",
            None,
            &[":root", ".never-appended"],
            &[("--a", "1")],
        ));
        transform(&mut stylesheet);
        assert_eq!(stylesheet.get(".navigation").unwrap().declarations["--a"], "1");
    }

    #[test]
    fn test_var_reference_retained_when_target_varies() {
        let mut stylesheet = Stylesheet::new();
        stylesheet.append_rule(rule(
            ":root",
            None,
            &[],
            &[("--grey", "grey"), ("--shadow", "var(--grey)")],
        ));
        stylesheet.append_rule(rule(
            ".navigation",
            None,
            &[":root"],
            &[("--grey", "#333"), ("--shadow", "var(--grey)")],
        ));
        transform(&mut stylesheet);
        // --shadow is numerically unchanged, but --grey varies along the
        // chain: a descendant of an uncontrolled --grey override must
        // restate the reference.
        let navigation = stylesheet.get(".navigation").unwrap();
        assert_eq!(navigation.declarations["--shadow"], "var(--grey)");
        assert_eq!(navigation.declarations["--grey"], "#333");
    }

    #[test]
    fn test_var_reference_dropped_when_target_is_stable() {
        let mut stylesheet = Stylesheet::new();
        stylesheet.append_rule(rule(
            ":root",
            None,
            &[],
            &[("--grey", "grey"), ("--shadow", "var(--grey)")],
        ));
        stylesheet.append_rule(rule(
            ".navigation",
            None,
            &[":root"],
            &[("--shadow", "var(--grey)"), ("--other", "1")],
        ));
        transform(&mut stylesheet);
        let navigation = stylesheet.get(".navigation").unwrap();
        assert!(!navigation.declarations.contains_key("--shadow"));
    }

    #[test]
    fn test_media_gated_rule_skips_var_retention() {
        let mut stylesheet = Stylesheet::new();
        stylesheet.append_rule(rule(
            ":root",
            None,
            &[],
            &[("--grey", "grey"), ("--shadow", "var(--grey)")],
        ));
        stylesheet.append_rule(rule(
            ".dark-mode",
            Some("(prefers-color-scheme: dark)"),
            &[":root"],
            &[("--grey", "#111"), ("--shadow", "var(--grey)")],
        ));
        transform(&mut stylesheet);
        let dark = stylesheet
            .get("(prefers-color-scheme: dark)|.dark-mode")
            .unwrap();
        assert_eq!(dark.declarations["--grey"], "#111");
        assert!(!dark.declarations.contains_key("--shadow"));
    }

    #[test]
    fn test_globally_scoped_rule_skips_var_retention() {
        let mut stylesheet = Stylesheet::new();
        stylesheet.append_rule(rule(
            ".theme",
            None,
            &[],
            &[("--grey", "grey"), ("--shadow", "var(--grey)")],
        ));
        stylesheet.append_rule(rule(
            "body",
            None,
            &[".theme"],
            &[("--grey", "#333"), ("--shadow", "var(--grey)")],
        ));
        transform(&mut stylesheet);
        let body = stylesheet.get("body").unwrap();
        assert!(!body.declarations.contains_key("--shadow"));
        assert_eq!(body.declarations["--grey"], "#333");
    }

    #[test]
    fn test_transform_is_idempotent() {
        let mut stylesheet = Stylesheet::new();
        stylesheet.append_rule(rule(
            ":root",
            None,
            &[],
            &[("--grey", "grey"), ("--shadow", "var(--grey)"), ("--a", "1")],
        ));
        stylesheet.append_rule(rule(
            ".dark-mode",
            None,
            &[":root"],
            &[("--grey", "#111"), ("--shadow", "var(--grey)"), ("--a", "1")],
        ));
        stylesheet.append_rule(rule(
            ".dark-mode .navigation",
            None,
            &[":root", ".dark-mode"],
            &[("--grey", "#111"), ("--a", "2")],
        ));
        transform(&mut stylesheet);
        let once = stylesheet.clone();
        transform(&mut stylesheet);
        assert_eq!(stylesheet, once);
    }
}
