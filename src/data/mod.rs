//! Contact-log data access: SQLite store, scoped sessions, aggregate queries.

pub mod aggregates;
pub mod queries;
pub mod schema;
pub mod session;
pub mod store;
