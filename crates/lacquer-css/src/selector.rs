//! Stateless selector composition and specificity adjustment.
//!
//! The algebra treats selectors as opaque strings: it composes fragments,
//! sorts for determinism, and inserts specificity boosters, but never parses
//! CSS beyond locating compound boundaries. A caller-supplied customizer
//! runs over every produced selector (namespace prefixes, suffixes); the
//! algebra itself never special-cases specificity.

/// Selectors that address the page itself rather than a themed subtree.
pub const GLOBAL_SELECTORS: [&str; 4] = [":root", "html", "body", ":export"];

/// True if the selector addresses the page globally.
pub fn is_global_selector(selector: &str) -> bool {
    GLOBAL_SELECTORS.contains(&selector)
}

/// Maps every produced selector string (e.g. adds a namespace suffix).
pub type SelectorCustomizer<'a> = &'a dyn Fn(&str) -> String;

/// The identity customizer.
pub fn no_customization(selector: &str) -> String {
    selector.to_string()
}

/// Composes selector fragments into one selector string.
///
/// `global` fragments other than `:root` are concatenated into a compound
/// selector in lexicographic order, so repeated calls with the same
/// fragment set are deterministic regardless of call-site ordering. A
/// `local` part is appended as a descendant (space-joined). A bare `:root`
/// with no local part selects `:root` alone. The customizer runs over the
/// final string.
pub fn selector_for(global: &[&str], local: &[&str], customize: SelectorCustomizer) -> String {
    let mut fragments: Vec<&str> = global.iter().copied().filter(|s| *s != ":root").collect();
    fragments.sort_unstable();

    let mut selector = fragments.concat();
    if !local.is_empty() {
        let descendant = local.join(" ");
        if selector.is_empty() {
            selector = descendant;
        } else {
            selector = format!("{} {}", selector, descendant);
        }
    }
    if selector.is_empty() {
        selector = ":root".to_string();
    }
    customize(&selector)
}

/// No-op id-level specificity booster.
const BOOSTER: &str = ":not(#\\9)";

/// Appends an id-specificity booster to the first compound of the selector,
/// before any pseudo-class suffix. Global selectors pass through unmodified.
pub fn increase_specificity(selector: &str) -> String {
    if is_global_selector(selector) {
        return selector.to_string();
    }
    let compound_end = selector
        .find(char::is_whitespace)
        .unwrap_or(selector.len());
    let insert_at = selector[..compound_end].find(':').unwrap_or(compound_end);
    format!(
        "{}{}{}",
        &selector[..insert_at],
        BOOSTER,
        &selector[insert_at..]
    )
}

/// Raises specificity by one class level instead of one id level.
///
/// Repeats an existing class or attribute token of the first compound when
/// one exists; this avoids id-selector escalation across independently
/// versioned stylesheets sharing a page. Falls back to the id booster for
/// selectors with no such token. Global selectors pass through unmodified.
pub fn increase_specificity_gradually(selector: &str) -> String {
    if is_global_selector(selector) {
        return selector.to_string();
    }
    let compound_end = selector
        .find(char::is_whitespace)
        .unwrap_or(selector.len());
    match first_class_or_attribute(&selector[..compound_end]) {
        Some((start, end)) => format!(
            "{}{}{}",
            &selector[..end],
            &selector[start..end],
            &selector[end..]
        ),
        None => increase_specificity(selector),
    }
}

/// Byte range of the first `.class` or `[attr]` token in a compound.
fn first_class_or_attribute(compound: &str) -> Option<(usize, usize)> {
    let bytes = compound.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'.' => {
                let start = i;
                i += 1;
                while i < bytes.len() && !b".:[#".contains(&bytes[i]) {
                    i += 1;
                }
                if i > start + 1 {
                    return Some((start, i));
                }
            }
            b'[' => {
                let start = i;
                while i < bytes.len() && bytes[i] != b']' {
                    i += 1;
                }
                return (i < bytes.len()).then_some((start, i + 1));
            }
            _ => i += 1,
        }
    }
    None
}
