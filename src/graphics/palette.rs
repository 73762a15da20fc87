//! Colours shared by every chart.

#![allow(missing_docs)]

use plotters::style::RGBColor;

pub const BACKGROUND: RGBColor = RGBColor(12, 14, 24);
pub const AXIS: RGBColor = RGBColor(150, 156, 170);
pub const EMPTY_TILE: RGBColor = RGBColor(44, 48, 60);
pub const TEXT: RGBColor = RGBColor(225, 228, 236);
/// Table headings and rules.
pub const HEADER: RGBColor = RGBColor(245, 200, 110);

/// Series colours, cycled for operators, stations, and bands.
pub const SERIES: [RGBColor; 12] = [
    RGBColor(230, 80, 80),
    RGBColor(240, 160, 60),
    RGBColor(235, 220, 90),
    RGBColor(120, 200, 90),
    RGBColor(70, 190, 170),
    RGBColor(80, 150, 230),
    RGBColor(140, 110, 220),
    RGBColor(210, 100, 200),
    RGBColor(200, 200, 200),
    RGBColor(160, 120, 80),
    RGBColor(100, 220, 240),
    RGBColor(250, 130, 160),
];

/// Colour for series `index`, wrapping around.
#[must_use]
pub const fn series(index: usize) -> RGBColor {
    SERIES[index % SERIES.len()]
}

/// Heat ramp stops, cold to hot.
const HEAT: [(u8, u8, u8); 4] = [(30, 60, 160), (40, 170, 90), (240, 210, 60), (225, 50, 40)];

/// Map `t` in `[0, 1]` onto the heat ramp; out-of-range values are clamped.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn heat(t: f64) -> RGBColor {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let span = (HEAT.len() - 1) as f64;
    let pos = t * span;
    let idx = (pos.floor() as usize).min(HEAT.len() - 2);
    let frac = pos - idx as f64;
    let (a, b) = (HEAT[idx], HEAT[idx + 1]);
    let mix = |x: u8, y: u8| (f64::from(x) + (f64::from(y) - f64::from(x)) * frac).round() as u8;
    RGBColor(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}
