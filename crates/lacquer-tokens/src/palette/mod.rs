//! Accessibility-constrained palette generation.
//!
//! A palette turns one seed color into a full ramp of steps (50 darkest-to-
//! lightest numbering: 50 is the lightest rung, 1000 the darkest). Each
//! palette role (primary, neutral, warning, …) carries a fixed
//! specification: an ordered list of tone ranges and chroma fractions per
//! step, plus a chroma ceiling. Generation happens in a perceptual
//! colorspace (see [`hct`]) so two contracts can be guaranteed by
//! construction:
//!
//! - **Monotonic tone**: tone strictly decreases across ascending steps,
//!   for every seed.
//! - **Contrast-tone gaps**: designated background/foreground step pairs
//!   keep a minimum tone difference (≈47 for AA normal text, ≈37 for
//!   AA-large/interactive), for every seed.
//!
//! Both hold because every step's tone is interpolated at the *same*
//! fractional position inside its own range, and the ranges themselves are
//! authored so the guarantees hold at both range endpoints.
//!
//! Results are memoized by `(role, seed, auto_adjust, mode)`. The cache is
//! an optimization only: clearing it never changes a computed value, only
//! object identity.

mod hct;

pub use hct::{Hct, Rgb};

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, TokenError};
use crate::model::{Assignment, ColorPaletteInput, ColorReferenceTokens, Theme, TokenValue};

/// One rung of a palette, `50..=1000` in increments of 50.
///
/// The finer 50-increment steps (150, 250, …) are reserved for the neutral
/// ramp; chromatic ramps use the hundreds plus 50.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PaletteStep(u16);

impl PaletteStep {
    /// Creates a step, rejecting values outside the closed rung set.
    pub fn new(value: u16) -> Option<Self> {
        ((50..=1000).contains(&value) && value % 50 == 0).then_some(PaletteStep(value))
    }

    /// Parses a step from its wire form (a numeric string key).
    pub fn parse(raw: &str) -> Result<Self> {
        raw.parse::<u16>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| TokenError::InvalidPaletteStep {
                step: raw.to_string(),
            })
    }

    pub const fn get(self) -> u16 {
        self.0
    }
}

impl std::fmt::Display for PaletteStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for PaletteStep {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for PaletteStep {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        PaletteStep::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// The palette roles with fixed specifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaletteRole {
    Primary,
    Neutral,
    Error,
    Success,
    Warning,
    Info,
}

impl PaletteRole {
    pub const ALL: [PaletteRole; 6] = [
        PaletteRole::Primary,
        PaletteRole::Neutral,
        PaletteRole::Error,
        PaletteRole::Success,
        PaletteRole::Warning,
        PaletteRole::Info,
    ];

    /// Lowercase role name, used in messages and token names.
    pub fn name(self) -> &'static str {
        match self {
            PaletteRole::Primary => "primary",
            PaletteRole::Neutral => "neutral",
            PaletteRole::Error => "error",
            PaletteRole::Success => "success",
            PaletteRole::Warning => "warning",
            PaletteRole::Info => "info",
        }
    }

    /// The fixed specification for this role.
    pub fn specification(self) -> &'static PaletteSpecification {
        match self {
            PaletteRole::Primary => &PRIMARY_SPEC,
            PaletteRole::Neutral => &NEUTRAL_SPEC,
            PaletteRole::Error => &ERROR_SPEC,
            PaletteRole::Success => &SUCCESS_SPEC,
            PaletteRole::Warning => &WARNING_SPEC,
            PaletteRole::Info => &INFO_SPEC,
        }
    }
}

impl std::fmt::Display for PaletteRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Display mode a palette is generated for; affects only the accessible
/// tone band a seed is nudged into during auto-adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaletteMode {
    Light,
    Dark,
}

/// One step's entry in a palette specification.
#[derive(Debug, Clone, Copy)]
pub struct SpecEntry {
    pub step: u16,
    /// Fraction of the ramp's base chroma applied at this step.
    pub chroma_fraction: f64,
    pub min_tone: f64,
    pub max_tone: f64,
}

const fn entry(step: u16, chroma_fraction: f64, min_tone: f64, max_tone: f64) -> SpecEntry {
    SpecEntry {
        step,
        chroma_fraction,
        min_tone,
        max_tone,
    }
}

/// A background/foreground step pair with its minimum tone difference.
#[derive(Debug, Clone, Copy)]
pub struct ContrastPair {
    pub background: u16,
    pub foreground: u16,
    pub min_tone_gap: f64,
}

const fn pair(background: u16, foreground: u16, min_tone_gap: f64) -> ContrastPair {
    ContrastPair {
        background,
        foreground,
        min_tone_gap,
    }
}

/// A role's fixed palette specification.
///
/// Entries are ordered by ascending step and their tone ranges are strictly
/// descending at both endpoints; together with same-fraction interpolation
/// this makes the monotonicity and contrast contracts hold for every seed.
#[derive(Debug)]
pub struct PaletteSpecification {
    pub role: &'static str,
    pub entries: &'static [SpecEntry],
    /// Ceiling applied to every generated step's chroma.
    pub max_chroma: f64,
    /// Chroma clamp applied to the seed itself during auto-adjustment.
    pub seed_chroma_limit: Option<f64>,
    /// Tone bands a primary-style seed is nudged into per display mode.
    pub accessible_tone_bands: Option<AccessibleToneBands>,
    /// The documented accessibility pairs this specification guarantees.
    pub contrast_pairs: &'static [ContrastPair],
}

/// Accessible seed-tone bands, `(min_tone, max_tone)` per display mode.
#[derive(Debug, Clone, Copy)]
pub struct AccessibleToneBands {
    pub light: (f64, f64),
    pub dark: (f64, f64),
}

/// Roles with a chroma ceiling at or below this are treated as low-chroma:
/// base-chroma normalization is skipped so already-muted seeds are not
/// amplified back up.
const LOW_CHROMA_CEILING: f64 = 24.0;

/// Tone gap required for AA contrast with normal text.
pub const AA_NORMAL_TONE_GAP: f64 = 47.0;
/// Tone gap required for AA contrast with large text and interactive parts.
pub const AA_LARGE_TONE_GAP: f64 = 37.0;

/// The 11-step layout shared by the chromatic ramps.
static STANDARD_ENTRIES: [SpecEntry; 11] = [
    entry(50, 0.12, 96.0, 99.0),
    entry(100, 0.25, 92.0, 96.0),
    entry(200, 0.45, 83.0, 89.0),
    entry(300, 0.65, 72.0, 79.0),
    entry(400, 0.85, 58.0, 68.0),
    entry(500, 1.00, 49.0, 57.0),
    entry(600, 1.00, 40.0, 47.0),
    entry(700, 0.95, 32.0, 38.0),
    entry(800, 0.85, 22.0, 28.0),
    entry(900, 0.70, 12.0, 18.0),
    entry(1000, 0.55, 4.0, 10.0),
];

/// The finer 20-step layout used by the neutral ramp.
static NEUTRAL_ENTRIES: [SpecEntry; 20] = [
    entry(50, 0.60, 96.5, 99.0),
    entry(100, 0.70, 93.0, 96.0),
    entry(150, 0.80, 90.0, 93.0),
    entry(200, 0.90, 87.0, 90.0),
    entry(250, 1.00, 83.0, 86.5),
    entry(300, 1.00, 79.0, 82.5),
    entry(350, 1.00, 74.5, 78.0),
    entry(400, 1.00, 70.0, 74.0),
    entry(450, 1.00, 65.5, 69.5),
    entry(500, 1.00, 61.0, 65.0),
    entry(550, 1.00, 56.0, 60.5),
    entry(600, 1.00, 51.0, 56.0),
    entry(650, 1.00, 45.0, 50.5),
    entry(700, 1.00, 38.0, 44.0),
    entry(750, 1.00, 33.0, 37.5),
    entry(800, 1.00, 27.0, 32.5),
    entry(850, 0.90, 22.0, 26.5),
    entry(900, 0.85, 16.0, 21.5),
    entry(950, 0.80, 10.0, 15.5),
    entry(1000, 0.75, 4.0, 9.5),
];

static STANDARD_PAIRS: [ContrastPair; 3] = [
    pair(50, 600, AA_NORMAL_TONE_GAP),
    pair(400, 1000, AA_NORMAL_TONE_GAP),
    pair(100, 500, AA_LARGE_TONE_GAP),
];

static NEUTRAL_PAIRS: [ContrastPair; 2] = [
    pair(50, 700, AA_NORMAL_TONE_GAP),
    pair(200, 650, AA_LARGE_TONE_GAP),
];

static PRIMARY_SPEC: PaletteSpecification = PaletteSpecification {
    role: "primary",
    entries: &STANDARD_ENTRIES,
    max_chroma: 130.0,
    seed_chroma_limit: None,
    accessible_tone_bands: Some(AccessibleToneBands {
        light: (40.0, 57.0),
        dark: (58.0, 68.0),
    }),
    contrast_pairs: &STANDARD_PAIRS,
};

static NEUTRAL_SPEC: PaletteSpecification = PaletteSpecification {
    role: "neutral",
    entries: &NEUTRAL_ENTRIES,
    max_chroma: 16.0,
    seed_chroma_limit: Some(15.0),
    accessible_tone_bands: None,
    contrast_pairs: &NEUTRAL_PAIRS,
};

static ERROR_SPEC: PaletteSpecification = PaletteSpecification {
    role: "error",
    entries: &STANDARD_ENTRIES,
    max_chroma: 110.0,
    seed_chroma_limit: None,
    accessible_tone_bands: None,
    contrast_pairs: &STANDARD_PAIRS,
};

static SUCCESS_SPEC: PaletteSpecification = PaletteSpecification {
    role: "success",
    entries: &STANDARD_ENTRIES,
    max_chroma: 100.0,
    seed_chroma_limit: None,
    accessible_tone_bands: None,
    contrast_pairs: &STANDARD_PAIRS,
};

static WARNING_SPEC: PaletteSpecification = PaletteSpecification {
    role: "warning",
    entries: &STANDARD_ENTRIES,
    max_chroma: 105.0,
    seed_chroma_limit: None,
    accessible_tone_bands: None,
    contrast_pairs: &STANDARD_PAIRS,
};

static INFO_SPEC: PaletteSpecification = PaletteSpecification {
    role: "info",
    entries: &STANDARD_ENTRIES,
    max_chroma: 120.0,
    seed_chroma_limit: None,
    accessible_tone_bands: None,
    contrast_pairs: &STANDARD_PAIRS,
};

/// A generated palette: the seed plus one hex color per step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferencePaletteDefinition {
    pub seed: String,
    pub steps: IndexMap<PaletteStep, String>,
}

/// Generates the palette for a role from a seed color.
///
/// `auto_adjust` clamps the seed's chroma (and, for roles with accessible
/// tone bands, nudges its tone per `mode`) into the role's valid envelope
/// before matching. When `auto_adjust` is off and the seed's tone falls
/// inside a specification range, the matched step reproduces the seed hex
/// byte-for-byte.
pub fn generate_palette(
    role: PaletteRole,
    seed_hex: &str,
    auto_adjust: bool,
    mode: Option<PaletteMode>,
) -> Result<ReferencePaletteDefinition> {
    let spec = role.specification();
    let seed = Hct::from_hex(seed_hex)?;
    let mut hct = seed;
    let mut adjusted = false;

    if auto_adjust {
        let chroma_limit = spec.seed_chroma_limit.unwrap_or(spec.max_chroma);
        if hct.chroma > chroma_limit {
            hct.chroma = chroma_limit;
            adjusted = true;
        }
        if let (Some(bands), Some(mode)) = (spec.accessible_tone_bands, mode) {
            let (min, max) = match mode {
                PaletteMode::Light => bands.light,
                PaletteMode::Dark => bands.dark,
            };
            let nudged = hct.tone.clamp(min, max);
            if (nudged - hct.tone).abs() > f64::EPSILON {
                hct.tone = nudged;
                adjusted = true;
            }
        }
    }

    let (matched, snapped) = match_entry(spec, hct.tone)?;
    let tone = if snapped {
        (matched.min_tone + matched.max_tone) / 2.0
    } else {
        hct.tone
    };

    // The seed's proportional position inside its own matched range; every
    // step interpolates at this same fraction.
    let fraction = (tone - matched.min_tone) / (matched.max_tone - matched.min_tone);

    let normalize = spec.max_chroma > LOW_CHROMA_CEILING && matched.chroma_fraction > f64::EPSILON;
    let base_chroma = if normalize {
        hct.chroma / matched.chroma_fraction
    } else {
        hct.chroma
    };

    let mut steps = IndexMap::with_capacity(spec.entries.len());
    for step_entry in spec.entries {
        let step = PaletteStep(step_entry.step);
        let color = Hct {
            hue: hct.hue,
            chroma: (base_chroma * step_entry.chroma_fraction).min(spec.max_chroma),
            tone: step_entry.min_tone + fraction * (step_entry.max_tone - step_entry.min_tone),
        };
        steps.insert(step, color.to_hex());
    }

    if !auto_adjust && !adjusted && !snapped {
        steps.insert(PaletteStep(matched.step), seed_hex.to_string());
    }

    Ok(ReferencePaletteDefinition {
        seed: seed_hex.to_string(),
        steps,
    })
}

/// Finds the specification entry whose tone range contains `tone`; if it
/// falls in a gap, snaps to the nearest range (ties go to the darker one).
fn match_entry(spec: &PaletteSpecification, tone: f64) -> Result<(&'static SpecEntry, bool)> {
    if let Some(found) = spec
        .entries
        .iter()
        .find(|e| (e.min_tone..=e.max_tone).contains(&tone))
    {
        return Ok((found, false));
    }

    // Entries are ordered by descending tone, so scanning in order and
    // preferring strictly-smaller distances lands ties on the darker range.
    let nearest = spec
        .entries
        .iter()
        .map(|e| {
            let distance = if tone < e.min_tone {
                e.min_tone - tone
            } else {
                tone - e.max_tone
            };
            (e, distance)
        })
        .fold(None::<(&SpecEntry, f64)>, |best, candidate| match best {
            Some((_, best_distance)) if best_distance < candidate.1 => best,
            _ => Some(candidate),
        });

    match nearest {
        Some((found, _)) => Ok((found, true)),
        None => Err(TokenError::PaletteSpecificationMismatch {
            role: spec.role.to_string(),
            tone,
        }),
    }
}

// =============================================================================
// Memoization
// =============================================================================

type CacheKey = (PaletteRole, String, bool, Option<PaletteMode>);

/// Memoization cache for generated palettes.
///
/// Injectable so tests can isolate instances; [`get_palette`] uses a shared
/// process-wide default. Clearing a cache is always safe: it changes object
/// identity of future results, never their value.
#[derive(Debug, Default)]
pub struct PaletteCache {
    entries: Mutex<HashMap<CacheKey, Arc<ReferencePaletteDefinition>>>,
}

impl PaletteCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generates through this cache, returning the memoized definition.
    pub fn get(
        &self,
        role: PaletteRole,
        seed_hex: &str,
        auto_adjust: bool,
        mode: Option<PaletteMode>,
    ) -> Result<Arc<ReferencePaletteDefinition>> {
        let key = (role, seed_hex.to_string(), auto_adjust, mode);
        let mut entries = self.entries.lock().expect("palette cache poisoned");
        if let Some(found) = entries.get(&key) {
            return Ok(Arc::clone(found));
        }
        let definition = Arc::new(generate_palette(role, seed_hex, auto_adjust, mode)?);
        entries.insert(key, Arc::clone(&definition));
        Ok(definition)
    }

    pub fn clear(&self) {
        self.entries.lock().expect("palette cache poisoned").clear();
    }
}

static SHARED_CACHE: Lazy<PaletteCache> = Lazy::new(PaletteCache::new);

/// Generates a palette through the process-wide shared cache.
///
/// Repeated calls with identical inputs return the identical `Arc`.
pub fn get_palette(
    role: PaletteRole,
    seed_hex: &str,
    auto_adjust: bool,
    mode: Option<PaletteMode>,
) -> Result<Arc<ReferencePaletteDefinition>> {
    SHARED_CACHE.get(role, seed_hex, auto_adjust, mode)
}

// =============================================================================
// Reference tokens
// =============================================================================

/// The token name a palette step is exposed under, e.g. `colorPrimary500`.
pub fn palette_token_name(role: PaletteRole, step: PaletteStep) -> String {
    let name = role.name();
    let mut capitalized = String::with_capacity(name.len());
    let mut chars = name.chars();
    if let Some(first) = chars.next() {
        capitalized.extend(first.to_uppercase());
        capitalized.push_str(chars.as_str());
    }
    format!("color{}{}", capitalized, step)
}

/// Expands a palette input (seed or explicit steps) into a full definition.
pub fn expand_palette_input(
    role: PaletteRole,
    input: &ColorPaletteInput,
    cache: &PaletteCache,
) -> Result<ReferencePaletteDefinition> {
    match input {
        ColorPaletteInput::Seed(seed) => {
            Ok((*cache.get(role, seed, true, None)?).clone())
        }
        ColorPaletteInput::Steps { seed, steps } => {
            let mut definition = match seed {
                Some(seed) => (*cache.get(role, seed, true, None)?).clone(),
                None => ReferencePaletteDefinition {
                    seed: String::new(),
                    steps: IndexMap::new(),
                },
            };
            for (raw_step, color) in steps {
                let step = PaletteStep::parse(raw_step)?;
                definition.steps.insert(step, color.clone());
            }
            definition.steps.sort_keys();
            Ok(definition)
        }
    }
}

/// Returns a copy of the theme with its reference-token palettes expanded
/// into ordinary tokens (`colorPrimary500` and friends).
///
/// Explicitly authored tokens are never overwritten; the generated ramps
/// only fill in names the theme does not already define.
pub fn materialize_reference_tokens(theme: &Theme, cache: &PaletteCache) -> Result<Theme> {
    let Some(color) = theme.reference_tokens.as_ref().and_then(|r| r.color.as_ref()) else {
        return Ok(theme.clone());
    };

    let mut expanded = theme.clone();
    for (role, input) in role_inputs(color) {
        let definition = expand_palette_input(role, input, cache)?;
        for (step, hex) in &definition.steps {
            let name = palette_token_name(role, *step);
            expanded
                .tokens
                .entry(name)
                .or_insert_with(|| Assignment::Global(TokenValue::Literal(hex.clone())));
        }
    }
    Ok(expanded)
}

fn role_inputs(color: &ColorReferenceTokens) -> Vec<(PaletteRole, &ColorPaletteInput)> {
    [
        (PaletteRole::Primary, &color.primary),
        (PaletteRole::Neutral, &color.neutral),
        (PaletteRole::Error, &color.error),
        (PaletteRole::Success, &color.success),
        (PaletteRole::Warning, &color.warning),
        (PaletteRole::Info, &color.info),
    ]
    .into_iter()
    .filter_map(|(role, input)| input.as_ref().map(|i| (role, i)))
    .collect()
}
