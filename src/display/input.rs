//! Dismissal loop: block on display events until the operator is done.

#![allow(missing_docs)]

use tracing::debug;

use crate::core::errors::Result;
use crate::display::{DisplayEvent, DisplaySurface};

/// Key that dismisses the chart. Case-sensitive.
pub const QUIT_KEY: char = 'q';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputState {
    Running,
    Dismissed,
}

/// Input state machine. `Dismissed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputLoop {
    state: InputState,
}

impl Default for InputLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl InputLoop {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: InputState::Running,
        }
    }

    #[must_use]
    pub const fn state(&self) -> InputState {
        self.state
    }

    /// Apply one event and return the resulting state.
    pub fn handle(&mut self, event: &DisplayEvent) -> InputState {
        if self.state == InputState::Dismissed {
            return self.state;
        }
        match event {
            DisplayEvent::Close => {
                debug!("close requested");
                self.state = InputState::Dismissed;
            }
            DisplayEvent::Key(QUIT_KEY) => {
                debug!("{QUIT_KEY:?} key pressed");
                self.state = InputState::Dismissed;
            }
            DisplayEvent::Key(key) => debug!("event key={key:?}"),
            DisplayEvent::OtherKey(key) => debug!("event key={key}"),
            DisplayEvent::Resize(columns, rows) => {
                debug!("resized to {columns}x{rows} cells; keeping the startup size");
            }
            DisplayEvent::Other => debug!("ignoring event"),
        }
        self.state
    }
}

/// Read events from `surface` until dismissed.
///
/// # Errors
///
/// Propagates the first event read failure.
pub fn run_until_dismissed<S: DisplaySurface>(surface: &mut S) -> Result<()> {
    let mut input = InputLoop::new();
    while input.state() == InputState::Running {
        let event = surface.next_event()?;
        input.handle(&event);
    }
    Ok(())
}
