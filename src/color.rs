use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Categorical palette
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

/// Stable colour per category label, so the same industry keeps its colour
/// across charts.
#[derive(Debug, Clone, Default)]
pub struct CategoryColors {
    mapping: BTreeMap<String, Color32>,
}

impl CategoryColors {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        labels.sort_unstable();
        labels.dedup();
        let palette = generate_palette(labels.len());
        let mapping = labels.into_iter().zip(palette).collect();
        Self { mapping }
    }

    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping.get(label).copied().unwrap_or(Color32::GRAY)
    }
}

// ---------------------------------------------------------------------------
// Sequential ramp for the heatmap
// ---------------------------------------------------------------------------

/// Yellow → green → blue stops.
const HEAT_STOPS: [(f32, f32, f32); 3] = [(1.0, 1.0, 0.85), (0.25, 0.71, 0.77), (0.03, 0.11, 0.35)];

/// Colour of a heatmap cell; `t` is clamped to `0..=1`.
pub fn heat_color(t: f64) -> Color32 {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) as f32 } else { 0.0 };
    let (lo, hi, local) = if t <= 0.5 {
        (HEAT_STOPS[0], HEAT_STOPS[1], t * 2.0)
    } else {
        (HEAT_STOPS[1], HEAT_STOPS[2], (t - 0.5) * 2.0)
    };
    let lo: LinSrgb = Srgb::new(lo.0, lo.1, lo.2).into_linear();
    let hi: LinSrgb = Srgb::new(hi.0, hi.1, hi.2).into_linear();
    to_color32(Srgb::from_linear(lo.mix(hi, local)))
}

/// Black or white, whichever reads better on `background`.
pub fn text_on(background: Color32) -> Color32 {
    let [r, g, b, _] = background.to_array();
    let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    if luma > 140.0 {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}

fn to_color32(rgb: Srgb) -> Color32 {
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}
