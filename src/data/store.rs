//! Store and session seams plus the read-only SQLite implementation.

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags};

use crate::core::errors::{QgError, Result};
use crate::data::aggregates::{Aggregate, AggregateKind};
use crate::data::queries;

/// Inputs a fetch may depend on from earlier fetches in the same load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchContext {
    /// Timestamp of the newest contact, once `LastQso` has been fetched.
    pub last_qso_time: Option<i64>,
}

/// Something that can hand out data sessions.
pub trait DataStore {
    type Session: DataSession;

    /// Human-readable location for log lines.
    fn describe(&self) -> String;

    /// Connect. Fails with `DataStoreUnavailable` when the store cannot be reached.
    fn open(&self) -> Result<Self::Session>;
}

/// An open connection to the contact log.
pub trait DataSession {
    /// Run the named query for `kind`.
    fn fetch(&mut self, kind: AggregateKind, context: &FetchContext) -> Result<Aggregate>;

    /// Release the connection. Calling it again is a no-op.
    fn close(&mut self) -> Result<()>;
}

/// Contact-log database file, opened read-only.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    /// Store for the log at `path`; nothing is opened yet.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DataStore for SqliteStore {
    type Session = SqliteSession;

    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn open(&self) -> Result<SqliteSession> {
        let unavailable = |error: rusqlite::Error| QgError::DataStoreUnavailable {
            path: self.path.clone(),
            details: error.to_string(),
        };

        // Read-only: a missing file is an error instead of a fresh empty log.
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(unavailable)?;

        // SQLite defers reading the header; surface "not a database" here.
        conn.query_row("PRAGMA schema_version", [], |row| row.get::<_, i64>(0))
            .map_err(unavailable)?;

        Ok(SqliteSession {
            conn: Some(conn),
            path: self.path.clone(),
        })
    }
}

/// Open SQLite connection; closed explicitly or on drop.
#[derive(Debug)]
pub struct SqliteSession {
    conn: Option<Connection>,
    path: PathBuf,
}

impl SqliteSession {
    /// Whether `close` has not run yet.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }
}

impl DataSession for SqliteSession {
    fn fetch(&mut self, kind: AggregateKind, context: &FetchContext) -> Result<Aggregate> {
        let conn = self
            .conn
            .as_ref()
            .ok_or_else(|| QgError::DataStoreOperational {
                context: "fetch",
                details: format!("session for {} already closed", self.path.display()),
            })?;

        let aggregate = match kind {
            AggregateKind::LastQso => Aggregate::LastQso(queries::get_last_qso(conn)?),
            AggregateKind::OperatorCounts => {
                Aggregate::OperatorCounts(queries::get_operators_by_qsos(conn)?)
            }
            AggregateKind::StationCounts => {
                Aggregate::StationCounts(queries::get_station_qsos(conn)?)
            }
            AggregateKind::BandModes => Aggregate::BandModes(queries::get_qso_band_modes(conn)?),
            AggregateKind::OperatorRates => Aggregate::OperatorRates(
                queries::get_qsos_per_hour_per_operator(conn, context.last_qso_time)?,
            ),
            AggregateKind::HourlyBandRates => {
                Aggregate::HourlyBandRates(queries::get_qsos_per_hour_per_band(conn)?)
            }
            AggregateKind::SectionCounts => {
                Aggregate::SectionCounts(queries::get_qsos_by_section(conn)?)
            }
        };
        Ok(aggregate)
    }

    fn close(&mut self) -> Result<()> {
        match self.conn.take() {
            // On failure the connection comes back and is closed by its own Drop.
            Some(conn) => conn.close().map_err(|(_conn, error)| error.into()),
            None => Ok(()),
        }
    }
}

impl Drop for SqliteSession {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::schema::create_schema;

    fn fixture() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.db");
        let conn = Connection::open(&path).unwrap();
        create_schema(&conn).unwrap();
        conn.execute_batch(
            "INSERT INTO operator (id, name) VALUES (1, 'N1KDO');
             INSERT INTO qso_log (timestamp, band_id, mode_id, operator_id, section)
             VALUES (1719000000, 4, 1, 1, 'EMA');",
        )
        .unwrap();
        (dir, path)
    }

    #[test]
    fn nonexistent_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.db");
        let err = SqliteStore::new(&path).open().expect_err("file is missing");
        assert_eq!(err.code(), "QG-3001");
        assert!(!path.exists(), "read-only open must not create the file");
    }

    #[test]
    fn non_database_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.db");
        std::fs::write(&path, vec![0x5a; 4096]).unwrap();
        let err = SqliteStore::new(&path).open().expect_err("not a database");
        assert!(err.is_store_failure());
    }

    #[test]
    fn fetch_dispatches_named_queries() {
        let (_dir, path) = fixture();
        let mut session = SqliteStore::new(&path).open().unwrap();
        let sections = session
            .fetch(AggregateKind::SectionCounts, &FetchContext::default())
            .unwrap();
        match sections {
            Aggregate::SectionCounts(map) => assert_eq!(map.get("EMA"), Some(&1)),
            other => panic!("unexpected aggregate: {other:?}"),
        }
        let rates = session
            .fetch(
                AggregateKind::OperatorRates,
                &FetchContext {
                    last_qso_time: Some(1_719_000_000),
                },
            )
            .unwrap();
        assert_eq!(rates.kind(), AggregateKind::OperatorRates);
    }

    #[test]
    fn close_is_idempotent_and_blocks_fetches() {
        let (_dir, path) = fixture();
        let mut session = SqliteStore::new(&path).open().unwrap();
        assert!(session.is_open());
        session.close().unwrap();
        session.close().unwrap();
        assert!(!session.is_open());
        let err = session
            .fetch(AggregateKind::LastQso, &FetchContext::default())
            .expect_err("closed session");
        assert_eq!(err.code(), "QG-3002");
    }

    #[test]
    fn schema_less_database_fails_on_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.db");
        Connection::open(&path)
            .unwrap()
            .execute_batch("CREATE TABLE unrelated (x INTEGER);")
            .unwrap();
        let mut session = SqliteStore::new(&path).open().unwrap();
        let err = session
            .fetch(AggregateKind::OperatorCounts, &FetchContext::default())
            .expect_err("qso_log table is missing");
        assert_eq!(err.code(), "QG-3002");
        session.close().unwrap();
    }
}
