//! Perceptual (hue, chroma, tone) colorspace for palette generation.
//!
//! Palette ramps are generated in **CIE LCh(ab)**, the cylindrical form of
//! CIE LAB: tone is L* (perceptual lightness, the quantity WCAG contrast
//! tracks), chroma is C*ab (colorfulness), hue is h_ab in degrees. Equal
//! numerical tone distances correspond to equal perceived lightness
//! differences, which is what makes the accessibility contracts of the
//! palette generator expressible as plain tone arithmetic.
//!
//! Converting an (hue, chroma, tone) triple back to sRGB can land outside
//! the displayable gamut. Rather than clamping channels (which silently
//! shifts tone), [`Hct::to_rgb`] bisects chroma down to the largest value
//! that fits the gamut at the requested hue and tone, so tone guarantees
//! survive the round trip.

use crate::error::{Result, TokenError};

/// A simple RGB color triplet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Parses a `#rgb` or `#rrggbb` hex color.
    pub fn parse_hex(raw: &str) -> Result<Self> {
        let err = || TokenError::InvalidSeedColor {
            value: raw.to_string(),
        };
        let hex = raw.trim().strip_prefix('#').ok_or_else(err)?;
        match hex.len() {
            3 => {
                let channel = |i: usize| {
                    u8::from_str_radix(&hex[i..i + 1], 16)
                        .map(|c| c * 17)
                        .map_err(|_| err())
                };
                Ok(Rgb(channel(0)?, channel(1)?, channel(2)?))
            }
            6 => {
                let channel =
                    |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());
                Ok(Rgb(channel(0)?, channel(2)?, channel(4)?))
            }
            _ => Err(err()),
        }
    }

    /// Formats as lowercase `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// CIE LAB color (internal representation).
#[derive(Debug, Clone, Copy)]
struct Lab {
    l: f64,
    a: f64,
    b: f64,
}

/// D65 reference white point for CIE XYZ → LAB conversion.
const XN: f64 = 0.95047;
const YN: f64 = 1.00000;
const ZN: f64 = 1.08883;

/// Convert an sRGB component (0–255) to linear light (0.0–1.0).
fn srgb_to_linear(c: u8) -> f64 {
    let c = c as f64 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Convert a linear light value (0.0–1.0) to sRGB (0–255), clamped.
fn linear_to_srgb(c: f64) -> u8 {
    let c = c.clamp(0.0, 1.0);
    let s = if c <= 0.0031308 {
        12.92 * c
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    };
    (s * 255.0).round() as u8
}

/// LAB forward transform helper.
fn lab_f(t: f64) -> f64 {
    if t > 0.008856 {
        t.cbrt()
    } else {
        7.787 * t + 16.0 / 116.0
    }
}

/// LAB inverse transform helper.
fn lab_f_inv(t: f64) -> f64 {
    if t > 0.206896 {
        t * t * t
    } else {
        (t - 16.0 / 116.0) / 7.787
    }
}

/// Convert an [`Rgb`] value to CIE LAB via XYZ (D65 illuminant).
fn rgb_to_lab(rgb: Rgb) -> Lab {
    let r = srgb_to_linear(rgb.0);
    let g = srgb_to_linear(rgb.1);
    let b = srgb_to_linear(rgb.2);

    // sRGB → XYZ (D65) using the standard matrix
    let x = 0.4124564 * r + 0.3575761 * g + 0.1804375 * b;
    let y = 0.2126729 * r + 0.7151522 * g + 0.0721750 * b;
    let z = 0.0193339 * r + 0.1191920 * g + 0.9503041 * b;

    let fx = lab_f(x / XN);
    let fy = lab_f(y / YN);
    let fz = lab_f(z / ZN);

    Lab {
        l: 116.0 * fy - 16.0,
        a: 500.0 * (fx - fy),
        b: 200.0 * (fy - fz),
    }
}

/// Convert a CIE LAB value to linear RGB without clamping.
///
/// Returns the raw channel values so callers can detect out-of-gamut colors
/// before quantization.
fn lab_to_linear_rgb(lab: Lab) -> (f64, f64, f64) {
    let fy = (lab.l + 16.0) / 116.0;
    let fx = lab.a / 500.0 + fy;
    let fz = fy - lab.b / 200.0;

    let x = XN * lab_f_inv(fx);
    let y = YN * lab_f_inv(fy);
    let z = ZN * lab_f_inv(fz);

    // XYZ → linear RGB (D65)
    let r = 3.2404542 * x - 1.5371385 * y - 0.4985314 * z;
    let g = -0.9692660 * x + 1.8760108 * y + 0.0415560 * z;
    let b = 0.0556434 * x - 0.2040259 * y + 1.0572252 * z;

    (r, g, b)
}

/// Tolerance for the in-gamut check; quantization to 8 bits absorbs it.
const GAMUT_EPSILON: f64 = 1e-4;

fn in_gamut((r, g, b): (f64, f64, f64)) -> bool {
    let ok = |c: f64| (-GAMUT_EPSILON..=1.0 + GAMUT_EPSILON).contains(&c);
    ok(r) && ok(g) && ok(b)
}

/// A color expressed as perceptual hue, chroma, and tone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hct {
    /// Hue angle in degrees, `0.0..360.0`.
    pub hue: f64,
    /// Colorfulness, `0.0` for achromatic colors.
    pub chroma: f64,
    /// Perceptual lightness (L*), `0.0` black to `100.0` white.
    pub tone: f64,
}

impl Hct {
    /// Converts an sRGB color to its (hue, chroma, tone) representation.
    pub fn from_rgb(rgb: Rgb) -> Self {
        let lab = rgb_to_lab(rgb);
        let chroma = lab.a.hypot(lab.b);
        let hue = lab.b.atan2(lab.a).to_degrees().rem_euclid(360.0);
        Hct {
            hue,
            chroma,
            tone: lab.l,
        }
    }

    /// Parses a hex color into its (hue, chroma, tone) representation.
    pub fn from_hex(hex: &str) -> Result<Self> {
        Ok(Self::from_rgb(Rgb::parse_hex(hex)?))
    }

    /// Converts back to sRGB, preserving hue and tone.
    ///
    /// If the requested chroma is not displayable at this hue and tone, the
    /// chroma is bisected down to the gamut boundary. Tone is never
    /// sacrificed: the palette contracts are stated in tone.
    pub fn to_rgb(self) -> Rgb {
        let lab_at = |chroma: f64| {
            let radians = self.hue.to_radians();
            Lab {
                l: self.tone,
                a: chroma * radians.cos(),
                b: chroma * radians.sin(),
            }
        };

        let direct = lab_to_linear_rgb(lab_at(self.chroma));
        if in_gamut(direct) {
            let (r, g, b) = direct;
            return Rgb(linear_to_srgb(r), linear_to_srgb(g), linear_to_srgb(b));
        }

        // Bisect chroma against the gamut boundary. Chroma 0 (the grey
        // axis) is always displayable for tones in 0..=100.
        let mut low = 0.0;
        let mut high = self.chroma;
        for _ in 0..24 {
            let mid = (low + high) / 2.0;
            if in_gamut(lab_to_linear_rgb(lab_at(mid))) {
                low = mid;
            } else {
                high = mid;
            }
        }
        let (r, g, b) = lab_to_linear_rgb(lab_at(low));
        Rgb(linear_to_srgb(r), linear_to_srgb(g), linear_to_srgb(b))
    }

    /// Converts to a lowercase `#rrggbb` hex string.
    pub fn to_hex(self) -> String {
        self.to_rgb().to_hex()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_six_digit() {
        assert_eq!(Rgb::parse_hex("#0073bb").unwrap(), Rgb(0x00, 0x73, 0xbb));
    }

    #[test]
    fn test_parse_hex_three_digit() {
        assert_eq!(Rgb::parse_hex("#fff").unwrap(), Rgb(255, 255, 255));
    }

    #[test]
    fn test_parse_hex_rejects_garbage() {
        for bad in ["0073bb", "#00", "#gggggg", "blue"] {
            assert!(Rgb::parse_hex(bad).is_err(), "{} should not parse", bad);
        }
    }

    #[test]
    fn test_white_and_black_tones() {
        let white = Hct::from_rgb(Rgb(255, 255, 255));
        assert!((white.tone - 100.0).abs() < 0.01);
        assert!(white.chroma < 0.01);

        let black = Hct::from_rgb(Rgb(0, 0, 0));
        assert!(black.tone.abs() < 0.01);
    }

    #[test]
    fn test_round_trip_in_gamut_color() {
        let rgb = Rgb(0x00, 0x73, 0xbb);
        let back = Hct::from_rgb(rgb).to_rgb();
        // 8-bit quantization allows off-by-one per channel.
        assert!((back.0 as i32 - rgb.0 as i32).abs() <= 1);
        assert!((back.1 as i32 - rgb.1 as i32).abs() <= 1);
        assert!((back.2 as i32 - rgb.2 as i32).abs() <= 1);
    }

    #[test]
    fn test_out_of_gamut_chroma_preserves_tone() {
        // A very light, very chromatic blue cannot be displayed; the
        // conversion must give up chroma, not tone.
        let requested = Hct {
            hue: 280.0,
            chroma: 120.0,
            tone: 95.0,
        };
        let produced = Hct::from_rgb(requested.to_rgb());
        assert!((produced.tone - 95.0).abs() < 1.0);
        assert!(produced.chroma < 120.0);
    }

    #[test]
    fn test_tone_orders_luminance() {
        let light = Hct::from_rgb(Rgb(200, 200, 200));
        let dark = Hct::from_rgb(Rgb(50, 50, 50));
        assert!(light.tone > dark.tone);
    }
}
