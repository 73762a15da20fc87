//! Scoped data sessions: open, fetch, and a close that runs on every exit path.
//!
//! [`with_session`] is the only way the orchestrator touches the store. The
//! session lives exactly as long as the closure; [`SessionScope`] closes it
//! when the closure returns, when it fails, and when it unwinds from a panic.

use tracing::{debug, info, warn};

use crate::core::errors::Result;
use crate::data::aggregates::{Aggregate, AggregateKind, LoadedAggregates};
use crate::data::store::{DataSession, DataStore, FetchContext};

/// Which aggregates one load fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPlan {
    /// Every aggregate, so swapping the chart needs no query changes.
    All,
    /// Only what one chart needs.
    Only(AggregateKind),
}

impl FetchPlan {
    /// Plan for a chart needing `required`, or everything when `preload_all`.
    #[must_use]
    pub const fn new(preload_all: bool, required: AggregateKind) -> Self {
        if preload_all {
            Self::All
        } else {
            Self::Only(required)
        }
    }

    /// Kinds to fetch, in fetch order.
    #[must_use]
    pub fn kinds(self) -> Vec<AggregateKind> {
        match self {
            Self::All => AggregateKind::ALL.to_vec(),
            Self::Only(AggregateKind::OperatorRates) => {
                vec![AggregateKind::LastQso, AggregateKind::OperatorRates]
            }
            Self::Only(kind) => vec![kind],
        }
    }
}

/// Owns an open session and guarantees it is closed exactly once.
pub struct SessionScope<S: DataSession> {
    session: S,
    closed: bool,
}

impl<S: DataSession> SessionScope<S> {
    /// Take ownership of an open session.
    pub const fn new(session: S) -> Self {
        Self {
            session,
            closed: false,
        }
    }

    /// The open session, for fetching.
    pub fn session_mut(&mut self) -> &mut S {
        &mut self.session
    }

    /// Close the session. A close failure is logged, not propagated: the
    /// connection is released either way.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        debug!("closing contact log session");
        if let Err(error) = self.session.close() {
            warn!(code = error.code(), "error while closing contact log: {error}");
        }
    }
}

impl<S: DataSession> Drop for SessionScope<S> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Open a session on `store`, run `work`, and close the session before returning.
pub fn with_session<D, T, F>(store: &D, work: F) -> Result<T>
where
    D: DataStore,
    F: FnOnce(&mut D::Session) -> Result<T>,
{
    debug!("connecting to contact log {}", store.describe());
    let mut scope = SessionScope::new(store.open()?);
    debug!("contact log connected");

    let outcome = work(scope.session_mut());
    scope.close();
    outcome
}

/// Fetch every aggregate named by `plan`, stopping at the first failure.
pub fn load_aggregates<S: DataSession>(session: &mut S, plan: FetchPlan) -> Result<LoadedAggregates> {
    let mut context = FetchContext::default();
    let mut values = Vec::new();

    for kind in plan.kinds() {
        debug!("fetching {kind}");
        let value = session.fetch(kind, &context)?;
        if let Aggregate::LastQso(last) = &value {
            context.last_qso_time = last.timestamp;
            info!("{}", last.message);
        }
        values.push(value);
    }

    Ok(LoadedAggregates::from_values(values))
}
