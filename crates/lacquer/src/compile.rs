//! End-to-end theme compilation.
//!
//! The pipeline for a preset build: expand reference-token palettes,
//! validate the model, build the rule tree (single- or multi-theme), run
//! the minimal-diff transform, and render CSS text alongside the resolved
//! token values.
//!
//! The pipeline for a customer override: sanitize against the themeable
//! allowlist, merge, strip the merged theme down to what actually changed,
//! and generate a patch stylesheet resolved against the base theme.

use indexmap::IndexMap;
use lacquer_css::{
    build_multi_theme, build_single_theme, increase_specificity_gradually, minimal,
    no_customization, BuildOptions, MultiThemeEntry, SelectorCustomizer,
};
use lacquer_tokens::{
    create_minimal_theme, defaults_reducer, materialize_reference_tokens, resolve_theme,
    sanitize_override, Diagnostics, PaletteCache, ResolveOptions, SpecificResolution, Theme,
    ThemeOverride,
};

use crate::error::Result;
use crate::preset::ThemePreset;

/// Knobs for a compilation run.
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Resolve references to `var()` expressions so the generated CSS keeps
    /// natural cascade inheritance.
    pub use_css_vars: bool,
    /// Raise every non-global selector's specificity by one class level, so
    /// the output survives co-located legacy stylesheets.
    pub boost_specificity: bool,
    /// Tokens referenced by stylesheet sources; bounds which declarations
    /// are emitted. Exposed tokens are always added. `None` emits all.
    pub needed_tokens: Option<Vec<String>>,
}

/// Everything one compilation run produces.
#[derive(Debug)]
pub struct CompileOutput {
    /// The rendered stylesheet.
    pub css: String,
    /// Default-state resolution of the primary theme.
    pub resolution: SpecificResolution,
    /// Default-state resolutions of the secondary themes, by theme id.
    pub secondary_resolutions: IndexMap<String, SpecificResolution>,
    /// Non-fatal findings collected along the way.
    pub diagnostics: Diagnostics,
}

fn customizer(options: &CompileOptions) -> SelectorCustomizer<'static> {
    if options.boost_specificity {
        &increase_specificity_gradually
    } else {
        &no_customization
    }
}

fn needed_with_exposed(preset: &ThemePreset, options: &CompileOptions) -> Option<Vec<String>> {
    options.needed_tokens.as_ref().map(|needed| {
        let mut all = needed.clone();
        for token in &preset.exposed {
            if !all.contains(token) {
                all.push(token.clone());
            }
        }
        all
    })
}

/// Compiles a preset into its full stylesheet and resolved values.
pub fn compile_preset(preset: &ThemePreset, options: &CompileOptions) -> Result<CompileOutput> {
    let cache = PaletteCache::new();
    let theme = materialize_reference_tokens(&preset.theme, &cache)?;
    theme.validate()?;
    let mut secondary: Vec<Theme> = Vec::with_capacity(preset.secondary.len());
    for entry in &preset.secondary {
        let materialized = materialize_reference_tokens(entry, &cache)?;
        materialized.validate()?;
        secondary.push(materialized);
    }

    let needed = needed_with_exposed(preset, options);
    let build_options = BuildOptions {
        properties: &preset.properties_map,
        needed_tokens: needed.as_deref(),
        use_css_vars: options.use_css_vars,
        customizer: customizer(options),
    };

    let mut stylesheet = if secondary.is_empty() {
        build_single_theme(&theme, None, &build_options)?
    } else {
        let mut entries = vec![MultiThemeEntry {
            theme: &theme,
            base: None,
        }];
        entries.extend(secondary.iter().map(|theme| MultiThemeEntry {
            theme,
            base: None,
        }));
        build_multi_theme(&entries, &build_options)?
    };
    minimal::transform(&mut stylesheet);
    tracing::info!(
        theme = %theme.id,
        secondary = secondary.len(),
        "compiled theme preset"
    );

    let plain = ResolveOptions::default();
    let resolution = defaults_reducer(&theme, &resolve_theme(&theme, None, &plain)?)?;
    let mut secondary_resolutions = IndexMap::new();
    for theme in &secondary {
        let specific = defaults_reducer(theme, &resolve_theme(theme, None, &plain)?)?;
        secondary_resolutions.insert(theme.id.clone(), specific);
    }

    Ok(CompileOutput {
        css: stylesheet.render(),
        resolution,
        secondary_resolutions,
        diagnostics: Diagnostics::new(),
    })
}

/// Compiles a customer override into a patch stylesheet against the preset's
/// primary theme.
///
/// Override application is best-effort: unthemeable tokens and unknown
/// contexts are dropped with warnings (returned in the output), never
/// failing the build.
pub fn compile_override(
    preset: &ThemePreset,
    override_: &ThemeOverride,
    options: &CompileOptions,
) -> Result<CompileOutput> {
    let cache = PaletteCache::new();
    let base = materialize_reference_tokens(&preset.theme, &cache)?;
    base.validate()?;

    let mut diagnostics = Diagnostics::new();
    let sanitized = sanitize_override(override_, &preset.themeable, &base, &mut diagnostics);
    let minimal_theme =
        create_minimal_theme(&base, &sanitized, options.use_css_vars, &mut diagnostics)?;

    let needed = needed_with_exposed(preset, options);
    let build_options = BuildOptions {
        properties: &preset.properties_map,
        needed_tokens: needed.as_deref(),
        use_css_vars: options.use_css_vars,
        customizer: customizer(options),
    };
    let mut stylesheet = build_single_theme(&minimal_theme, Some(&base), &build_options)?;
    minimal::transform(&mut stylesheet);
    tracing::info!(
        theme = %base.id,
        overridden = minimal_theme.tokens.len(),
        warnings = diagnostics.warnings().len(),
        "compiled theme override"
    );

    let plain = ResolveOptions::default();
    let resolution = defaults_reducer(&base, &resolve_theme(&minimal_theme, Some(&base), &plain)?)?;

    Ok(CompileOutput {
        css: stylesheet.render(),
        resolution,
        secondary_resolutions: IndexMap::new(),
        diagnostics,
    })
}
