use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Rgb – backend-neutral colour
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const GRAY: Rgb = Rgb(128, 128, 128);

    /// Parse `#rrggbb` (leading `#` optional).
    pub fn from_hex(s: &str) -> Option<Rgb> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl From<Rgb> for Color32 {
    fn from(c: Rgb) -> Self {
        Color32::from_rgb(c.0, c.1, c.2)
    }
}

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Rgb> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.45);
            let rgb: Srgb = hsl.into_color();
            Rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Method styles: method name → colour + dash pattern
// ---------------------------------------------------------------------------

/// User-facing style entry, as written in the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleSpec {
    /// `#rrggbb`
    pub color: String,
    #[serde(default)]
    pub dashed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesStyle {
    pub color: Rgb,
    pub dashed: bool,
}

/// Built-in styles for the two usual methods.
pub fn default_styles() -> BTreeMap<String, StyleSpec> {
    BTreeMap::from([
        (
            "DFT".to_string(),
            StyleSpec {
                color: "#a50f15".into(),
                dashed: false,
            },
        ),
        (
            "DP".to_string(),
            StyleSpec {
                color: "#084594".into(),
                dashed: true,
            },
        ),
    ])
}

/// Maps method names to line styles. Configured entries win; every other
/// method gets a generated hue, alternating solid and dashed.
#[derive(Debug, Clone)]
pub struct StyleMap {
    mapping: BTreeMap<String, SeriesStyle>,
    default_style: SeriesStyle,
}

impl StyleMap {
    pub fn new(methods: &[String], configured: &BTreeMap<String, StyleSpec>) -> Self {
        let mut mapping = BTreeMap::new();
        let mut unstyled = Vec::new();

        for method in methods {
            match configured.get(method) {
                Some(spec) => match Rgb::from_hex(&spec.color) {
                    Some(color) => {
                        mapping.insert(
                            method.clone(),
                            SeriesStyle {
                                color,
                                dashed: spec.dashed,
                            },
                        );
                    }
                    None => {
                        log::warn!("invalid colour {:?} for method {method}, using a generated one", spec.color);
                        unstyled.push(method.clone());
                    }
                },
                None => unstyled.push(method.clone()),
            }
        }

        let palette = generate_palette(unstyled.len());
        for (i, (method, color)) in unstyled.into_iter().zip(palette).enumerate() {
            mapping.insert(
                method,
                SeriesStyle {
                    color,
                    dashed: i % 2 == 1,
                },
            );
        }

        StyleMap {
            mapping,
            default_style: SeriesStyle {
                color: Rgb::GRAY,
                dashed: false,
            },
        }
    }

    pub fn style_for(&self, method: &str) -> SeriesStyle {
        self.mapping
            .get(method)
            .copied()
            .unwrap_or(self.default_style)
    }
}
