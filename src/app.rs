//! One-shot chart viewer: acquire the display, load the log, draw one chart,
//! wait for dismissal, release the display.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, error, info};

use crate::core::config::Config;
use crate::core::errors::{QgError, Result};
use crate::data::aggregates::LoadedAggregates;
use crate::data::session::{FetchPlan, load_aggregates, with_session};
use crate::data::store::DataStore;
use crate::display::input::run_until_dismissed;
use crate::display::presenter::present;
use crate::display::{DisplayBackend, DisplaySurface, SurfaceSize};
use crate::graphics::{self, Visualization};

/// The chart the binary shows.
pub const ACTIVE_VISUALIZATION: Visualization = Visualization::SectionMap;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The operator closed the chart.
    Dismissed,
    /// Drawing or presenting failed or panicked; the display was released
    /// without waiting.
    RenderFailed,
    /// The display could not be acquired.
    DisplayFailed,
    /// The contact log could not be opened or read.
    DataFailed,
    /// Reading input failed while waiting for dismissal.
    InputFailed,
}

impl RunOutcome {
    /// Process exit status for this outcome.
    #[must_use]
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Dismissed | Self::RenderFailed => 0,
            Self::DisplayFailed | Self::DataFailed | Self::InputFailed => 1,
        }
    }
}

/// Per-run choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Chart to draw.
    pub visualization: Visualization,
    /// Narrower surface than the whole display, if configured.
    pub requested_size: Option<SurfaceSize>,
    /// Aggregates to load before drawing.
    pub plan: FetchPlan,
}

impl RunOptions {
    /// Options for `visualization` under `config`.
    ///
    /// A missing width or height means "as much as the display has".
    #[must_use]
    pub fn from_config(config: &Config, visualization: Visualization) -> Self {
        let requested_size = match (config.display.width, config.display.height) {
            (None, None) => None,
            (width, height) => Some(SurfaceSize::new(
                width.unwrap_or(u32::MAX),
                height.unwrap_or(u32::MAX),
            )),
        };
        Self {
            visualization,
            requested_size,
            plan: FetchPlan::new(config.data.preload_all, visualization.required_aggregate()),
        }
    }
}

/// Run the viewer to completion.
///
/// Every path that acquired the display releases it before returning.
pub fn run<B, D>(backend: &B, store: &D, options: &RunOptions) -> RunOutcome
where
    B: DisplayBackend,
    D: DataStore,
{
    let mut surface = match backend.initialize(options.requested_size) {
        Ok(surface) => surface,
        Err(err) => {
            error!(code = err.code(), "could not initialize display: {err}");
            return RunOutcome::DisplayFailed;
        }
    };
    info!("display ready at {}", surface.size());

    let outcome = run_on_surface(&mut surface, store, options);
    surface.shutdown();
    debug!("display shut down");
    outcome
}

fn run_on_surface<S, D>(surface: &mut S, store: &D, options: &RunOptions) -> RunOutcome
where
    S: DisplaySurface,
    D: DataStore,
{
    debug!("load data");
    let loaded = match with_session(store, |session| load_aggregates(session, options.plan)) {
        Ok(loaded) => loaded,
        Err(err) => {
            error!(code = err.code(), "could not load contact log: {err}");
            return RunOutcome::DataFailed;
        }
    };
    info!("loaded {:?} from {}", loaded.kinds(), store.describe());

    let shown = panic::catch_unwind(AssertUnwindSafe(|| {
        show(surface, &loaded, options.visualization)
    }));
    match shown {
        Ok(Ok(())) => {}
        Ok(Err(err)) => {
            error!(
                code = err.code(),
                "could not show {}: {err}",
                options.visualization
            );
            return RunOutcome::RenderFailed;
        }
        Err(payload) => {
            error!(
                "panic while showing {}: {}",
                options.visualization,
                panic_message(payload.as_ref())
            );
            return RunOutcome::RenderFailed;
        }
    }

    match run_until_dismissed(surface) {
        Ok(()) => {
            info!("chart dismissed");
            RunOutcome::Dismissed
        }
        Err(err) => {
            error!(code = err.code(), "input failed: {err}");
            RunOutcome::InputFailed
        }
    }
}

/// Render, present, and flip one frame.
fn show<S: DisplaySurface>(
    surface: &mut S,
    loaded: &LoadedAggregates,
    visualization: Visualization,
) -> Result<()> {
    let required = visualization.required_aggregate();
    let aggregate = loaded.get(required).ok_or_else(|| {
        QgError::render(visualization.as_str(), format!("{required} was not loaded"))
    })?;
    let buffer = graphics::render(visualization, aggregate, surface.size())?;
    present(surface, &buffer)?;
    surface.flip()
}

/// Text of a panic payload from `panic!` with a literal or a format string.
fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
