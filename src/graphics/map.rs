//! Section map: one square tile per ARRL/RAC section, coloured by contacts.
//!
//! Tiles big enough for text carry their section name.

#![allow(clippy::cast_precision_loss)]

use std::collections::BTreeMap;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::HPos;
use tracing::debug;

use crate::graphics::charts::DrawResult;
use crate::graphics::sections::{GRID_COLUMNS, GRID_ROWS, SECTION_TILES, tile_for};
use crate::graphics::text::{self, px};
use crate::graphics::palette;

/// Pixel placement of the tile grid inside the drawing area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapLayout {
    /// Offset of the first column.
    pub left: u32,
    /// Offset of the first row.
    pub top: u32,
    /// Tile edge in pixels, gap included.
    pub tile: u32,
}

impl MapLayout {
    /// Largest square tiles that fit, centred. `None` when a tile would be
    /// smaller than one pixel.
    #[must_use]
    pub const fn fit(width: u32, height: u32) -> Option<Self> {
        let by_width = width / GRID_COLUMNS;
        let by_height = height / GRID_ROWS;
        let tile = if by_width < by_height { by_width } else { by_height };
        if tile == 0 {
            return None;
        }
        Some(Self {
            left: (width - tile * GRID_COLUMNS) / 2,
            top: (height - tile * GRID_ROWS) / 2,
            tile,
        })
    }

    /// Inclusive pixel corners of the tile at `(column, row)`.
    #[must_use]
    pub fn tile_corners(&self, column: u32, row: u32) -> [(i32, i32); 2] {
        let gap = u32::from(self.tile >= 4);
        let x = self.left + column * self.tile;
        let y = self.top + row * self.tile;
        let last = self.tile - 1 - gap;
        [(px(x), px(y)), (px(x + last), px(y + last))]
    }
}

/// Draw the section tiles for `counts`.
///
/// Names are matched case-insensitively; names with no tile (`DX`, typos)
/// are skipped.
pub fn draw_map<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    counts: &BTreeMap<String, u64>,
) -> DrawResult<DB> {
    let (width, height) = area.dim_in_pixel();
    let Some(layout) = MapLayout::fit(width, height) else {
        debug!("{width}x{height} is too small for the section grid");
        return Ok(());
    };

    let mut tallies: BTreeMap<(u32, u32), u64> = BTreeMap::new();
    for (section, &count) in counts {
        match tile_for(section) {
            Some(cell) => *tallies.entry(cell).or_default() += count,
            None => debug!("no map tile for section {section:?} ({count} contacts)"),
        }
    }
    let max = tallies.values().copied().max().unwrap_or(0);

    for &(_, column, row) in &SECTION_TILES {
        let count = tallies.get(&(column, row)).copied().unwrap_or(0);
        let color = if count == 0 || max == 0 {
            palette::EMPTY_TILE
        } else {
            palette::heat(count as f64 / max as f64)
        };
        area.draw(&Rectangle::new(layout.tile_corners(column, row), color.filled()))?;
    }

    if let Some(line) = text::usable(layout.tile.saturating_sub(2) * 2 / 5) {
        for &(name, column, row) in &SECTION_TILES {
            let [(x0, y0), (x1, y1)] = layout.tile_corners(column, row);
            let worked = tallies.get(&(column, row)).is_some_and(|&count| count > 0);
            let ink = if worked { palette::BACKGROUND } else { palette::AXIS };
            text::label(area, name, ((x0 + x1) / 2, (y0 + y1) / 2), line, HPos::Center, &ink)?;
        }
    }
    Ok(())
}
