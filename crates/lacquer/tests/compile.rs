//! End-to-end compilation scenarios.

use lacquer::{
    compile_override, compile_preset, CompileOptions, ThemeOverride, ThemePreset,
};

fn shadow_preset(selector: &str) -> ThemePreset {
    ThemePreset::from_json(&format!(
        r##"{{
            "theme": {{
                "id": "base",
                "selector": "{selector}",
                "tokens": {{
                    "shadow": {{"light": "{{grey}}", "dark": "{{black}}"}},
                    "grey": "grey",
                    "black": "black",
                    "boxShadow": "{{grey}}"
                }},
                "modes": {{
                    "color": {{
                        "id": "color",
                        "states": {{
                            "light": {{"default": true}},
                            "dark": {{"selector": ".dark-mode"}}
                        }}
                    }}
                }},
                "tokenModeMap": {{"shadow": "color"}},
                "contexts": {{
                    "navigation": {{
                        "id": "navigation",
                        "selector": ".navigation",
                        "tokens": {{"boxShadow": "none"}}
                    }}
                }}
            }},
            "themeable": ["grey", "shadow", "boxShadow"],
            "propertiesMap": {{
                "shadow": "--shadow",
                "grey": "--grey",
                "black": "--black",
                "boxShadow": "--box-shadow"
            }}
        }}"##
    ))
    .unwrap()
}

#[test]
fn resolves_mode_bound_references() {
    let output = compile_preset(&shadow_preset(":root"), &CompileOptions::default()).unwrap();
    assert_eq!(output.resolution["shadow"], "grey");
    assert_eq!(output.resolution["grey"], "grey");
    assert_eq!(output.resolution["black"], "black");
    assert!(output.css.contains(".dark-mode{\n\t--shadow:black;\n}"));
}

#[test]
fn context_produces_scoped_and_global_rules() {
    let output = compile_preset(&shadow_preset(".theme"), &CompileOptions::default()).unwrap();
    // Both scopings survive with only the context's own declaration; the
    // rest is inherited from the root rule.
    assert!(output
        .css
        .contains(".theme .navigation{\n\t--box-shadow:none;\n}"));
    assert!(output.css.contains("\n.navigation{\n\t--box-shadow:none;\n}"));
}

#[test]
fn root_theme_context_collapses_to_one_rule() {
    let output = compile_preset(&shadow_preset(":root"), &CompileOptions::default()).unwrap();
    assert_eq!(output.css.matches(".navigation{").count(), 1);
}

#[test]
fn partial_mode_override_keeps_other_states() {
    let preset = shadow_preset(":root");
    let override_ =
        ThemeOverride::from_json(r##"{"tokens": {"shadow": {"dark": "{grey}"}}}"##).unwrap();
    let output = compile_override(&preset, &override_, &CompileOptions::default()).unwrap();
    // Both states now resolve to "grey": the root patch covers them and no
    // dark-mode rule is needed at all.
    assert!(output.css.contains(":root{\n\t--shadow:grey;\n}"));
    assert!(!output.css.contains(".dark-mode"));
    assert_eq!(output.resolution["shadow"], "grey");
    assert!(output.diagnostics.is_empty());
}

#[test]
fn override_patch_never_mentions_unrelated_tokens() {
    let preset = shadow_preset(":root");
    let override_ = ThemeOverride::from_json(r##"{"tokens": {"grey": "#eee"}}"##).unwrap();
    let output = compile_override(&preset, &override_, &CompileOptions::default()).unwrap();
    assert!(!output.css.contains("--black"));
    assert_eq!(output.resolution["grey"], "#eee");
    assert_eq!(output.resolution["boxShadow"], "#eee");
}

#[test]
fn css_vars_mode_emits_var_references() {
    let preset = shadow_preset(":root");
    let options = CompileOptions {
        use_css_vars: true,
        ..CompileOptions::default()
    };
    let output = compile_preset(&preset, &options).unwrap();
    assert!(output.css.contains("--shadow:var(--grey);"));
}

#[test]
fn generated_palette_tokens_are_compilable() {
    let preset = ThemePreset::from_json(
        r##"{
            "theme": {
                "id": "base",
                "selector": ":root",
                "tokens": {"accent": "{colorPrimary600}"},
                "referenceTokens": {"color": {"primary": "#0073bb"}}
            },
            "propertiesMap": {
                "accent": "--accent",
                "colorPrimary600": "--color-primary-600"
            }
        }"##,
    )
    .unwrap();
    let options = CompileOptions {
        needed_tokens: Some(vec!["accent".to_string(), "colorPrimary600".to_string()]),
        ..CompileOptions::default()
    };
    let output = compile_preset(&preset, &options).unwrap();
    let accent = &output.resolution["accent"];
    assert!(accent.starts_with('#'), "accent = {}", accent);
    assert_eq!(accent, &output.resolution["colorPrimary600"]);
    assert!(output.css.contains("--color-primary-600:#"));
}

#[test]
fn preset_loads_from_disk() {
    use std::io::Write as _;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    let json = r##"{
        "theme": {
            "id": "base",
            "selector": ":root",
            "tokens": {"grey": "#d5dbdb"}
        },
        "propertiesMap": {"grey": "--grey"}
    }"##;
    file.write_all(json.as_bytes()).unwrap();

    let loaded = std::fs::read_to_string(file.path()).unwrap();
    let preset = ThemePreset::from_json(&loaded).unwrap();
    let output = compile_preset(&preset, &CompileOptions::default()).unwrap();
    assert_eq!(output.css, ":root{\n\t--grey:#d5dbdb;\n}");
}

#[test]
fn multi_theme_secondary_is_diffed_against_global() {
    let preset = ThemePreset::from_json(
        r##"{
            "theme": {
                "id": "base",
                "selector": ":root",
                "tokens": {"grey": "grey", "space": "16px"}
            },
            "secondary": [{
                "id": "compact",
                "selector": ".compact",
                "tokens": {"grey": "grey", "space": "12px"}
            }],
            "propertiesMap": {"grey": "--grey", "space": "--space"}
        }"##,
    )
    .unwrap();
    let output = compile_preset(&preset, &CompileOptions::default()).unwrap();
    // The secondary theme restates only what differs from the global theme.
    assert!(output.css.contains(".compact{\n\t--space:12px;\n}"));
    assert!(!output.css.contains(".compact{\n\t--grey"));
    assert_eq!(output.secondary_resolutions["compact"]["space"], "12px");
}

#[test]
fn two_global_themes_fail_before_rule_generation() {
    let preset = ThemePreset::from_json(
        r##"{
            "theme": {"id": "a", "selector": ":root", "tokens": {"grey": "grey"}},
            "secondary": [{"id": "b", "selector": "body", "tokens": {"grey": "grey"}}],
            "propertiesMap": {"grey": "--grey"}
        }"##,
    )
    .unwrap();
    let err = compile_preset(&preset, &CompileOptions::default()).unwrap_err();
    assert!(err.to_string().contains("page-global"));
}
