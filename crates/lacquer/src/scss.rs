//! SCSS variable rendering.
//!
//! Emits the consumer contract for SCSS builds: one variable per resolved
//! token, reading the live custom property with the resolved value as a
//! static fallback (`$var: var(--prop, <value>);`). Both names come from
//! the preset's registries; a missing entry for a rendered token is a
//! descriptive error.

use lacquer_tokens::SpecificResolution;

use crate::error::Result;
use crate::preset::ThemePreset;

/// Renders a resolution as SCSS variable declarations, one per line, in
/// resolution order.
pub fn render_scss_variables(
    preset: &ThemePreset,
    resolution: &SpecificResolution,
) -> Result<String> {
    let mut lines = Vec::with_capacity(resolution.len());
    for (token, value) in resolution {
        let variable = preset.variable_name(token)?;
        let property = preset.property_name(token)?;
        lines.push(format!("{}: var({}, {});", variable, property, value));
    }
    Ok(lines.join("\n"))
}
