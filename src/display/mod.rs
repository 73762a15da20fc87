//! Display seams: acquiring a surface, drawing to it, and reading its events.
//!
//! The orchestrator only talks to [`DisplayBackend`] and [`DisplaySurface`];
//! [`terminal`] is the crossterm implementation and tests supply scripted
//! fakes.

pub mod input;
pub mod presenter;
pub mod terminal;

use std::fmt;

use crate::core::errors::Result;
use crate::display::presenter::CellImage;

/// Drawable area in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceSize {
    /// Columns of pixels.
    pub width: u32,
    /// Rows of pixels; two per terminal cell row.
    pub height: u32,
}

impl SurfaceSize {
    /// `width` x `height` pixels.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// No drawable pixels.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Component-wise minimum.
    #[must_use]
    pub const fn clamp_to(self, limit: Self) -> Self {
        Self {
            width: if self.width < limit.width { self.width } else { limit.width },
            height: if self.height < limit.height { self.height } else { limit.height },
        }
    }
}

impl fmt::Display for SurfaceSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// One input event, already reduced to what the viewer cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayEvent {
    /// The window-close / hang-up signal.
    Close,
    /// A printable key press.
    Key(char),
    /// Any other key press, described for logging.
    OtherKey(String),
    /// New size in terminal cells.
    Resize(u16, u16),
    /// Focus, mouse, paste, and key releases.
    Other,
}

/// Acquires the display.
pub trait DisplayBackend {
    type Surface: DisplaySurface;

    /// Take over the display. `requested` narrows the surface when set.
    ///
    /// # Errors
    ///
    /// `DisplayInit` when the display cannot be acquired. Nothing is left
    /// half-initialized on failure.
    fn initialize(&self, requested: Option<SurfaceSize>) -> Result<Self::Surface>;
}

/// An acquired display.
pub trait DisplaySurface {
    /// Pixel size fixed at initialization.
    fn size(&self) -> SurfaceSize;

    /// Draw `image` with its top-left corner at the surface origin.
    fn blit(&mut self, image: &CellImage) -> Result<()>;

    /// Make everything blitted so far visible.
    fn flip(&mut self) -> Result<()>;

    /// Block until the next event.
    fn next_event(&mut self) -> Result<DisplayEvent>;

    /// Release the display. Later calls do nothing.
    fn shutdown(&mut self);
}
