//! Pixel buffer to terminal cells.
//!
//! A terminal cell shows two vertically stacked pixels: the upper half block
//! `▀` in the top pixel's colour over a background of the bottom pixel's
//! colour.

use crate::core::errors::{QgError, Result};
use crate::display::DisplaySurface;
use crate::graphics::PixelBuffer;

/// Glyph used for every cell.
pub const HALF_BLOCK: char = '▀';

/// Fill for the missing bottom pixel of an odd-height image.
const PAD: Rgb = (0, 0, 0);

/// One pixel as `(r, g, b)`.
pub type Rgb = (u8, u8, u8);

/// Two stacked pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// Drawn as the glyph's foreground.
    pub top: Rgb,
    /// Drawn as the cell's background.
    pub bottom: Rgb,
}

/// Display-native image: `width` columns by `ceil(height / 2)` rows of cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellImage {
    columns: u32,
    rows: u32,
    cells: Vec<Cell>,
}

impl CellImage {
    /// Convert an RGB buffer.
    ///
    /// # Errors
    ///
    /// `Render` when the buffer's data length is not `width * height * 3`.
    pub fn from_pixels(buffer: &PixelBuffer) -> Result<Self> {
        let expected = buffer.expected_len();
        if expected != Some(buffer.data().len()) {
            return Err(QgError::render(
                "presenter",
                format!(
                    "{}x{} buffer holds {} bytes, expected {}",
                    buffer.width(),
                    buffer.height(),
                    buffer.data().len(),
                    expected.map_or_else(|| "more than fits in memory".to_string(), |n| n.to_string()),
                ),
            ));
        }

        let columns = buffer.width();
        let rows = buffer.height().div_ceil(2);
        let mut cells = Vec::with_capacity(buffer.data().len() / 6 + columns as usize);
        for row in 0..rows {
            for x in 0..columns {
                let top = buffer.pixel(x, row * 2).unwrap_or(PAD);
                let bottom = buffer.pixel(x, row * 2 + 1).unwrap_or(PAD);
                cells.push(Cell { top, bottom });
            }
        }
        Ok(Self {
            columns,
            rows,
            cells,
        })
    }

    /// Width in cells, equal to the pixel width.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Height in cells.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Cell at `(column, row)`.
    #[must_use]
    pub fn cell(&self, column: u32, row: u32) -> Option<Cell> {
        if column >= self.columns || row >= self.rows {
            return None;
        }
        self.cells.get((row as usize) * (self.columns as usize) + column as usize).copied()
    }

    /// Cells of row `row`, left to right.
    #[must_use]
    pub fn row(&self, row: u32) -> &[Cell] {
        if row >= self.rows {
            return &[];
        }
        let start = (row as usize) * (self.columns as usize);
        &self.cells[start..start + self.columns as usize]
    }
}

/// Convert `buffer` and blit it at the surface origin.
///
/// # Errors
///
/// `Render` for a malformed buffer; display I/O errors from the blit.
pub fn present<S: DisplaySurface>(surface: &mut S, buffer: &PixelBuffer) -> Result<()> {
    let image = CellImage::from_pixels(buffer)?;
    surface.blit(&image)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn gradient(width: u32, height: u32) -> PixelBuffer {
        let mut data = Vec::new();
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&[x as u8, y as u8, 7]);
            }
        }
        PixelBuffer::from_raw(data, width, height)
    }

    #[test]
    fn pairs_rows_top_over_bottom() {
        let image = CellImage::from_pixels(&gradient(3, 4)).unwrap();
        assert_eq!((image.columns(), image.rows()), (3, 2));
        assert_eq!(
            image.cell(2, 1),
            Some(Cell {
                top: (2, 2, 7),
                bottom: (2, 3, 7)
            })
        );
        assert_eq!(image.row(0).len(), 3);
        assert!(image.row(2).is_empty());
    }

    #[test]
    fn odd_height_pads_last_row_with_black() {
        let image = CellImage::from_pixels(&gradient(2, 3)).unwrap();
        assert_eq!(image.rows(), 2);
        let last = image.cell(1, 1).unwrap();
        assert_eq!(last.top, (1, 2, 7));
        assert_eq!(last.bottom, PAD);
    }

    #[test]
    fn short_buffer_is_rejected() {
        let buffer = PixelBuffer::from_raw(vec![0; 10], 2, 2);
        let err = CellImage::from_pixels(&buffer).expect_err("12 bytes needed");
        assert_eq!(err.code(), "QG-4001");
        assert!(err.to_string().contains("expected 12"));
    }

    #[test]
    fn long_buffer_is_rejected() {
        let buffer = PixelBuffer::from_raw(vec![0; 13], 2, 2);
        assert!(CellImage::from_pixels(&buffer).is_err());
    }

    proptest! {
        #[test]
        fn cell_rows_are_half_the_pixel_rows_rounded_up(width in 1u32..24, height in 1u32..24) {
            let image = CellImage::from_pixels(&gradient(width, height)).unwrap();
            prop_assert_eq!(image.columns(), width);
            prop_assert_eq!(image.rows(), height.div_ceil(2));
            for row in 0..image.rows() {
                prop_assert_eq!(image.row(row).len(), width as usize);
            }
        }
    }
}
