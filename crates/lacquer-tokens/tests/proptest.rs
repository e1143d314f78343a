//! Property-based tests for token resolution, merging, and palettes.

use lacquer_tokens::{
    generate_palette, merge, palette::Hct, resolve_theme, Assignment, Diagnostics, Mode,
    ModeState, PaletteRole, ResolveOptions, ResolvedEntry, Theme, ThemeOverride,
};

use indexmap::IndexMap;
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

/// An acyclic token graph: token `t<i>` is either a literal or a reference
/// to an earlier token.
fn token_graph_strategy() -> impl Strategy<Value = Theme> {
    prop::collection::vec(
        prop_oneof!["[a-z0-9#]{1,8}".prop_map(Ok), (0usize..8).prop_map(Err)],
        1..12,
    )
    .prop_map(|entries| {
        let mut theme = Theme::new("generated", ":root");
        for (index, entry) in entries.iter().enumerate() {
            let raw = match entry {
                Ok(literal) => literal.clone(),
                // The first token has nothing earlier to reference.
                Err(_) if index == 0 => "fallback".to_string(),
                Err(target) => format!("{{t{}}}", target % index),
            };
            theme
                .tokens
                .insert(format!("t{}", index), Assignment::global(&raw));
        }
        theme
    })
}

/// An in-gamut seed color.
fn seed_strategy() -> impl Strategy<Value = String> {
    (0u8..=255, 0u8..=255, 0u8..=255)
        .prop_map(|(r, g, b)| format!("#{:02x}{:02x}{:02x}", r, g, b))
}

fn mode_bound_theme() -> Theme {
    let mut theme = Theme::new("base", ":root");
    let mut states = IndexMap::new();
    states.insert("light".to_string(), ModeState::Default { default: true });
    states.insert(
        "dark".to_string(),
        ModeState::Optional {
            selector: ".dark-mode".to_string(),
            media: None,
        },
    );
    theme.modes.insert(
        "color".to_string(),
        Mode {
            id: "color".to_string(),
            states,
        },
    );
    theme.tokens.insert(
        "shadow".to_string(),
        Assignment::per_mode([("light", "grey"), ("dark", "black")]),
    );
    theme
        .token_mode_map
        .insert("shadow".to_string(), "color".to_string());
    theme
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    /// Resolution is deterministic and always terminates in a literal.
    #[test]
    fn resolution_is_deterministic_and_literal(theme in token_graph_strategy()) {
        let options = ResolveOptions::default();
        let first = resolve_theme(&theme, None, &options).unwrap();
        let second = resolve_theme(&theme, None, &options).unwrap();
        prop_assert_eq!(&first, &second);
        for entry in first.values() {
            let ResolvedEntry::Single(value) = entry else {
                prop_assert!(false, "mode-free token resolved per-state");
                continue;
            };
            prop_assert!(
                !value.value.starts_with('{'),
                "token resolved to an unfollowed reference: {}",
                value.value
            );
        }
    }

    /// A bare global override of a mode-bound token lands in every state.
    #[test]
    fn global_override_broadcasts_to_all_states(value in "[a-z0-9#]{1,10}") {
        let theme = mode_bound_theme();
        let override_ = ThemeOverride::from_json(
            &format!(r#"{{"tokens": {{"shadow": "{}"}}}}"#, value)
        ).unwrap();
        let mut diagnostics = Diagnostics::new();
        let merged = merge(&theme, &override_, &mut diagnostics);
        let states = merged.tokens["shadow"].states().unwrap();
        for state_value in states.values() {
            prop_assert_eq!(state_value.to_string(), value.clone());
        }
    }

    /// Generated palette tones strictly decrease toward darker steps, for
    /// any seed.
    #[test]
    fn palette_tones_are_strictly_monotonic(seed in seed_strategy()) {
        for role in [PaletteRole::Primary, PaletteRole::Neutral] {
            let palette = generate_palette(role, &seed, true, None).unwrap();
            let tones: Vec<f64> = palette
                .steps
                .values()
                .map(|hex| Hct::from_hex(hex).unwrap().tone)
                .collect();
            for pair in tones.windows(2) {
                prop_assert!(
                    pair[0] > pair[1],
                    "tones not decreasing for {:?} seeded {}: {:?}",
                    role,
                    &seed,
                    tones
                );
            }
        }
    }
}
