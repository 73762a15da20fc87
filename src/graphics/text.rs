//! Chart text: the embedded font and line sizes scaled to the drawing area.
//!
//! Text uses a monospace face compiled into the binary, registered with
//! plotters the first time a chart asks for a line size. Areas too small for
//! a legible line, or a process where registration failed, get no text at
//! all; the shapes still draw.

use std::sync::OnceLock;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontStyle, register_font};
use tracing::warn;

use crate::graphics::charts::DrawResult;
use crate::graphics::palette;

/// Family every chart asks for. Also plotters' default, so mesh labels and
/// captions resolve to the embedded face too.
pub const FONT_FAMILY: &str = "sans-serif";

/// Smallest line height, in pixels, worth drawing.
pub const MIN_LINE: u32 = 6;
/// Largest line height used for titles and labels.
pub const MAX_LINE: u32 = 24;

static FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSansMono.ttf");

/// Register the embedded face once; `false` if it could not be parsed.
pub fn font_ready() -> bool {
    static REGISTERED: OnceLock<bool> = OnceLock::new();
    *REGISTERED.get_or_init(|| {
        let ok = register_font(FONT_FAMILY, FontStyle::Normal, FONT).is_ok();
        if !ok {
            warn!("embedded font could not be loaded; charts will have no text");
        }
        ok
    })
}

/// `line` if it is legible and the font is available.
#[must_use]
pub fn usable(line: u32) -> Option<u32> {
    (line >= MIN_LINE && font_ready()).then_some(line.min(MAX_LINE))
}

/// Line height for an area `width` x `height` pixels, or `None` when it
/// should carry no text.
#[must_use]
pub fn line_for((width, height): (u32, u32)) -> Option<u32> {
    usable((height / 10).min(width / 12))
}

/// Text style at `line` pixels in `color`.
#[must_use]
pub fn style(line: u32, color: &RGBColor) -> TextStyle<'_> {
    TextStyle::from((FONT_FAMILY, f64::from(line)).into_font()).color(color)
}

/// Draw `title` across the top of `area` and return the part below it.
///
/// An area with no room for text comes back whole.
pub fn titled<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    title: &str,
    color: &RGBColor,
) -> Result<DrawingArea<DB, Shift>, DrawingAreaErrorKind<DB::ErrorType>> {
    match line_for(area.dim_in_pixel()) {
        Some(line) => area.titled(title, style(line, color)),
        None => Ok(area.clone()),
    }
}

/// Draw one line of text at `at` (area pixels), vertically centred and
/// horizontally anchored by `anchor`.
pub fn label<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    text: &str,
    at: (i32, i32),
    line: u32,
    anchor: HPos,
    color: &RGBColor,
) -> DrawResult<DB> {
    area.draw_text(text, &style(line, color).pos(Pos::new(anchor, VPos::Center)), at)
}

/// Pixel width of the widest of `texts` at `line`.
pub fn widest<DB: DrawingBackend, S: AsRef<str>>(
    area: &DrawingArea<DB, Shift>,
    texts: &[S],
    line: u32,
) -> Result<u32, DrawingAreaErrorKind<DB::ErrorType>> {
    let style = style(line, &palette::TEXT);
    let mut widest = 0;
    for text in texts {
        let (width, _) = area.estimate_text_size(text.as_ref(), &style)?;
        widest = widest.max(width);
    }
    Ok(widest)
}

/// Saturating pixel conversion for text positions.
#[must_use]
pub fn px(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
