//! Color parsing, normalization and interpolation
//!
//! Style colors may be written in any CSS form. SVG output always carries the
//! six digit lowercase hex form; alpha is dropped because opacity is a
//! separate style property.

use palette::{FromColor, IntoColor, Lab, LinSrgb, Lch, Mix, Srgb};
use serde_json::Value;

/// Color space used when interpolating between two colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorSpace {
    #[default]
    Rgb,
    Lab,
    Hcl,
}

/// Parse a CSS color into straight (non-premultiplied) RGBA in `0..=1`.
pub fn parse_rgba(value: &str) -> Option<[f64; 4]> {
    let color = csscolorparser::parse(value.trim()).ok()?;
    Some([
        color.r as f64,
        color.g as f64,
        color.b as f64,
        color.a as f64,
    ])
}

/// Normalize a CSS color to `#rrggbb`.
pub fn to_hex(value: &str) -> Option<String> {
    let [r, g, b, _] = csscolorparser::parse(value.trim()).ok()?.to_rgba8();
    Some(format!("#{:02x}{:02x}{:02x}", r, g, b))
}

/// Normalize a resolved style value to `#rrggbb`.
///
/// Accepts CSS strings and `[r, g, b]` / `[r, g, b, a]` component arrays in
/// `0..=1`.
pub fn value_to_hex(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => to_hex(s),
        Value::Array(components) if components.len() == 3 || components.len() == 4 => {
            let rgb = components
                .iter()
                .take(3)
                .map(|c| c.as_f64().map(channel_to_u8))
                .collect::<Option<Vec<u8>>>()?;
            Some(format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2]))
        }
        _ => None,
    }
}

/// CSS `rgba()` notation for an RGBA color in `0..=1`.
pub fn to_css_rgba(rgba: [f64; 4]) -> String {
    format!(
        "rgba({}, {}, {}, {})",
        channel_to_u8(rgba[0]),
        channel_to_u8(rgba[1]),
        channel_to_u8(rgba[2]),
        (rgba[3].clamp(0.0, 1.0) * 1000.0).round() / 1000.0
    )
}

/// Interpolate between two RGBA colors. Alpha is always mixed linearly.
pub fn mix(a: [f64; 4], b: [f64; 4], t: f64, space: ColorSpace) -> [f64; 4] {
    let from = Srgb::new(a[0] as f32, a[1] as f32, a[2] as f32);
    let to = Srgb::new(b[0] as f32, b[1] as f32, b[2] as f32);
    let factor = t as f32;

    let mixed: Srgb<f32> = match space {
        ColorSpace::Rgb => Srgb::new(
            from.red + (to.red - from.red) * factor,
            from.green + (to.green - from.green) * factor,
            from.blue + (to.blue - from.blue) * factor,
        ),
        ColorSpace::Lab => {
            let from: Lab = Lab::from_color(linear(from));
            let to: Lab = Lab::from_color(linear(to));
            let lin: LinSrgb<f32> = from.mix(to, factor).into_color();
            Srgb::from_linear(lin)
        }
        ColorSpace::Hcl => {
            let from: Lch = Lch::from_color(linear(from));
            let to: Lch = Lch::from_color(linear(to));
            let lin: LinSrgb<f32> = from.mix(to, factor).into_color();
            Srgb::from_linear(lin)
        }
    };

    [
        (mixed.red as f64).clamp(0.0, 1.0),
        (mixed.green as f64).clamp(0.0, 1.0),
        (mixed.blue as f64).clamp(0.0, 1.0),
        a[3] + (b[3] - a[3]) * t,
    ]
}

fn linear(color: Srgb<f32>) -> LinSrgb<f32> {
    color.into_linear()
}

fn channel_to_u8(value: f64) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}
