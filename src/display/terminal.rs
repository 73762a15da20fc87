//! Terminal display backed by crossterm.
//!
//! [`TerminalBackend::initialize`] enters raw mode and the alternate screen
//! and hides the cursor; [`TerminalSurface`] restores all three on
//! [`DisplaySurface::shutdown`] and again on [`Drop`]. A panic hook restores
//! the terminal *before* the default panic message prints, so the message
//! lands on a usable screen.

use std::io::{self, IsTerminal, Stdout, Write};
use std::panic::{self, PanicHookInfo};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, queue};
use tracing::{debug, error, warn};

use crate::core::errors::{QgError, Result};
use crate::display::presenter::{CellImage, HALF_BLOCK, Rgb};
use crate::display::{DisplayBackend, DisplayEvent, DisplaySurface, SurfaceSize};

/// Set while this process has the terminal in raw mode. Checked by the panic
/// hook to decide whether restoration is needed.
static RAW_MODE_ACTIVE: AtomicBool = AtomicBool::new(false);

/// A panic hook that can be both chained to and reinstated.
type SharedHook = Arc<dyn Fn(&PanicHookInfo<'_>) + Send + Sync + 'static>;

/// Pixels per terminal cell, vertically.
const PIXELS_PER_ROW: u32 = 2;

/// Acquires the controlling terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalBackend;

impl DisplayBackend for TerminalBackend {
    type Surface = TerminalSurface;

    fn initialize(&self, requested: Option<SurfaceSize>) -> Result<TerminalSurface> {
        let stdout = io::stdout();
        if !stdout.is_terminal() {
            return Err(QgError::DisplayInit {
                details: "stdout is not a terminal".to_string(),
            });
        }

        let (columns, rows) = terminal::size().map_err(|error| init_error("reading terminal size", &error))?;
        let full = cells_to_pixels(columns, rows);
        let size = requested.map_or(full, |requested| requested.clamp_to(full));
        if size.is_empty() {
            return Err(QgError::DisplayInit {
                details: format!("no drawable area (terminal {columns}x{rows} cells, surface {size})"),
            });
        }

        let mut surface = TerminalSurface {
            stdout,
            size,
            active: false,
            previous_hook: None,
        };
        // On failure `surface` drops here and undoes whatever did succeed.
        surface.acquire()?;
        debug!("terminal {columns}x{rows} cells, drawing {size} pixels");
        Ok(surface)
    }
}

/// Pixel size of a terminal `columns` x `rows` cells big.
#[must_use]
pub fn cells_to_pixels(columns: u16, rows: u16) -> SurfaceSize {
    SurfaceSize::new(u32::from(columns), u32::from(rows) * PIXELS_PER_ROW)
}

fn init_error(step: &str, error: &io::Error) -> QgError {
    QgError::DisplayInit {
        details: format!("{step}: {error}"),
    }
}

/// The terminal while this process owns it.
pub struct TerminalSurface {
    stdout: Stdout,
    size: SurfaceSize,
    active: bool,
    /// Hook that was current before acquisition; put back on shutdown.
    previous_hook: Option<SharedHook>,
}

impl TerminalSurface {
    fn acquire(&mut self) -> Result<()> {
        terminal::enable_raw_mode().map_err(|error| init_error("enabling raw mode", &error))?;
        self.active = true;
        RAW_MODE_ACTIVE.store(true, Ordering::SeqCst);

        execute!(self.stdout, EnterAlternateScreen, Hide, Clear(ClearType::All))
            .map_err(|error| init_error("entering the alternate screen", &error))?;

        self.previous_hook = Some(install_restore_hook());
        Ok(())
    }
}

impl DisplaySurface for TerminalSurface {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn blit(&mut self, image: &CellImage) -> Result<()> {
        let visible_rows = image.rows().min(self.size.height.div_ceil(PIXELS_PER_ROW));
        let visible_columns = image.columns().min(self.size.width) as usize;

        for row in 0..visible_rows {
            let y = u16::try_from(row).unwrap_or(u16::MAX);
            queue!(self.stdout, MoveTo(0, y)).map_err(|error| QgError::display_io("blit", error))?;

            let mut current: Option<(Rgb, Rgb)> = None;
            for cell in &image.row(row)[..visible_columns.min(image.row(row).len())] {
                if current != Some((cell.top, cell.bottom)) {
                    queue!(
                        self.stdout,
                        SetForegroundColor(rgb(cell.top)),
                        SetBackgroundColor(rgb(cell.bottom))
                    )
                    .map_err(|error| QgError::display_io("blit", error))?;
                    current = Some((cell.top, cell.bottom));
                }
                queue!(self.stdout, Print(HALF_BLOCK)).map_err(|error| QgError::display_io("blit", error))?;
            }
        }
        queue!(self.stdout, ResetColor).map_err(|error| QgError::display_io("blit", error))?;
        Ok(())
    }

    fn flip(&mut self) -> Result<()> {
        self.stdout
            .flush()
            .map_err(|error| QgError::display_io("flip", error))
    }

    fn next_event(&mut self) -> Result<DisplayEvent> {
        let event = event::read().map_err(|error| QgError::display_io("reading input", error))?;
        Ok(map_event(event))
    }

    fn shutdown(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        RAW_MODE_ACTIVE.store(false, Ordering::SeqCst);

        if let Err(error) = execute!(self.stdout, ResetColor, Show, LeaveAlternateScreen) {
            warn!("could not leave the alternate screen: {error}");
        }
        if let Err(error) = terminal::disable_raw_mode() {
            warn!("could not disable raw mode: {error}");
        }

        // The hook cannot be swapped while unwinding; it stays installed and
        // finds RAW_MODE_ACTIVE already cleared.
        if !std::thread::panicking() {
            if let Some(previous) = self.previous_hook.take() {
                reinstate_hook(previous);
            }
        }
        debug!("terminal restored");
    }
}

impl Drop for TerminalSurface {
    fn drop(&mut self) {
        self.shutdown();
    }
}

const fn rgb((r, g, b): Rgb) -> Color {
    Color::Rgb { r, g, b }
}

/// Reduce a crossterm event to a [`DisplayEvent`].
///
/// Ctrl-C and Ctrl-D are the terminal's close signal: raw mode turns them
/// into ordinary key presses.
#[must_use]
pub fn map_event(event: Event) -> DisplayEvent {
    match event {
        Event::Key(key) => map_key(key),
        Event::Resize(columns, rows) => DisplayEvent::Resize(columns, rows),
        _ => DisplayEvent::Other,
    }
}

fn map_key(key: KeyEvent) -> DisplayEvent {
    if key.kind != KeyEventKind::Press {
        return DisplayEvent::Other;
    }
    match key.code {
        KeyCode::Char('c' | 'd') if key.modifiers.contains(KeyModifiers::CONTROL) => DisplayEvent::Close,
        KeyCode::Char(c) => DisplayEvent::Key(c),
        other => DisplayEvent::OtherKey(format!("{other:?}")),
    }
}

/// Chain a hook that restores the terminal and logs the panic in front of the
/// current one. Returns the hook it chained to.
fn install_restore_hook() -> SharedHook {
    let previous: SharedHook = Arc::from(panic::take_hook());
    let chained = Arc::clone(&previous);
    panic::set_hook(Box::new(move |info| {
        restore_terminal_best_effort();
        error!("panic with the terminal acquired: {info}");
        chained(info);
    }));
    previous
}

fn reinstate_hook(previous: SharedHook) {
    panic::set_hook(Box::new(move |info| previous(info)));
}

/// Best-effort terminal restoration from the panic hook. Safe to call
/// repeatedly; the flag makes later calls no-ops.
fn restore_terminal_best_effort() {
    if RAW_MODE_ACTIVE.swap(false, Ordering::SeqCst) {
        let mut stdout = io::stdout();
        let _ = execute!(stdout, ResetColor, Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

// ──────────────────── tests ────────────────────
