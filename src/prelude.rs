//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use qso_glance::prelude::*;
//! ```

// Core
pub use crate::core::config::Config;
pub use crate::core::errors::{QgError, Result};

// Orchestration
pub use crate::app::{ACTIVE_VISUALIZATION, RunOptions, RunOutcome, run};

// Data
pub use crate::data::aggregates::{Aggregate, AggregateKind, LoadedAggregates};
pub use crate::data::session::{FetchPlan, load_aggregates, with_session};
pub use crate::data::store::{DataSession, DataStore, SqliteStore};

// Display
pub use crate::display::terminal::TerminalBackend;
pub use crate::display::{DisplayBackend, DisplayEvent, DisplaySurface, SurfaceSize};

// Graphics
pub use crate::graphics::{PixelBuffer, Visualization, render};
