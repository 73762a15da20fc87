#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use qso_glance::core::errors::{QgError, Result};
use qso_glance::data::aggregates::{Aggregate, AggregateKind};
use qso_glance::data::schema::create_schema;
use qso_glance::data::store::{DataSession, DataStore, FetchContext, SqliteSession, SqliteStore};
use qso_glance::display::presenter::CellImage;
use qso_glance::display::{DisplayBackend, DisplayEvent, DisplaySurface, SurfaceSize};
use rusqlite::Connection;

// ──────────────────── journal ────────────────────

/// Ordered record of what the fakes saw, shared between display and store.
#[derive(Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<String>>>);

impl Journal {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.borrow_mut().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.0.borrow().iter().filter(|e| *e == entry).count()
    }

    pub fn position(&self, prefix: &str) -> Option<usize> {
        self.0.borrow().iter().position(|e| e.starts_with(prefix))
    }

    pub fn contains_prefix(&self, prefix: &str) -> bool {
        self.position(prefix).is_some()
    }
}

// ──────────────────── display fakes ────────────────────

/// One scripted `next_event` result.
#[derive(Debug, Clone)]
pub enum Scripted {
    Event(DisplayEvent),
    ReadError,
}

pub struct FakeBackend {
    journal: Journal,
    size: SurfaceSize,
    fail_init: bool,
    panic_on_blit: bool,
    script: RefCell<Vec<Scripted>>,
}

impl FakeBackend {
    pub fn new(journal: &Journal, size: SurfaceSize, script: Vec<Scripted>) -> Self {
        Self {
            journal: journal.clone(),
            size,
            fail_init: false,
            panic_on_blit: false,
            script: RefCell::new(script),
        }
    }

    /// A display whose surface panics in `blit`.
    pub fn panicking(journal: &Journal, size: SurfaceSize, script: Vec<Scripted>) -> Self {
        Self {
            panic_on_blit: true,
            ..Self::new(journal, size, script)
        }
    }

    pub fn failing(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            size: SurfaceSize::new(0, 0),
            fail_init: true,
            panic_on_blit: false,
            script: RefCell::new(Vec::new()),
        }
    }
}

impl DisplayBackend for FakeBackend {
    type Surface = FakeSurface;

    fn initialize(&self, requested: Option<SurfaceSize>) -> Result<FakeSurface> {
        self.journal.push("init");
        if self.fail_init {
            return Err(QgError::DisplayInit {
                details: "no display attached".to_string(),
            });
        }
        Ok(FakeSurface {
            journal: self.journal.clone(),
            size: requested.map_or(self.size, |r| r.clamp_to(self.size)),
            events: self.script.borrow_mut().drain(..).collect(),
            active: true,
            panic_on_blit: self.panic_on_blit,
        })
    }
}

pub struct FakeSurface {
    journal: Journal,
    size: SurfaceSize,
    events: VecDeque<Scripted>,
    active: bool,
    panic_on_blit: bool,
}

impl DisplaySurface for FakeSurface {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn blit(&mut self, image: &CellImage) -> Result<()> {
        self.journal
            .push(format!("blit:{}x{}", image.columns(), image.rows()));
        assert!(!self.panic_on_blit, "surface lost mid-blit");
        Ok(())
    }

    fn flip(&mut self) -> Result<()> {
        self.journal.push("flip");
        Ok(())
    }

    fn next_event(&mut self) -> Result<DisplayEvent> {
        self.journal.push("next_event");
        match self.events.pop_front() {
            Some(Scripted::Event(event)) => Ok(event),
            Some(Scripted::ReadError) | None => Err(QgError::display_io(
                "reading input",
                std::io::Error::new(std::io::ErrorKind::BrokenPipe, "input closed"),
            )),
        }
    }

    fn shutdown(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        self.journal.push("shutdown");
    }
}

impl Drop for FakeSurface {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// ──────────────────── store fakes ────────────────────

/// Real SQLite store that journals opens, fetches, and closes.
pub struct RecordingStore {
    inner: SqliteStore,
    journal: Journal,
}

impl RecordingStore {
    pub fn new(path: &Path, journal: &Journal) -> Self {
        Self {
            inner: SqliteStore::new(path),
            journal: journal.clone(),
        }
    }
}

impl DataStore for RecordingStore {
    type Session = RecordingSession;

    fn describe(&self) -> String {
        self.inner.describe()
    }

    fn open(&self) -> Result<RecordingSession> {
        self.journal.push("open");
        Ok(RecordingSession {
            inner: self.inner.open()?,
            journal: self.journal.clone(),
        })
    }
}

pub struct RecordingSession {
    inner: SqliteSession,
    journal: Journal,
}

impl DataSession for RecordingSession {
    fn fetch(&mut self, kind: AggregateKind, context: &FetchContext) -> Result<Aggregate> {
        self.journal.push(format!("fetch:{kind}"));
        self.inner.fetch(kind, context)
    }

    fn close(&mut self) -> Result<()> {
        self.journal.push("close");
        self.inner.close()
    }
}

// ──────────────────── fixtures ────────────────────

pub const T0: i64 = 1_719_000_000;

/// Contact log with the schema and no contacts.
pub fn empty_log(dir: &Path) -> PathBuf {
    let path = dir.join("empty.db");
    let conn = Connection::open(&path).expect("create fixture db");
    create_schema(&conn).expect("create schema");
    path
}

/// Contact log with a handful of contacts across three sections and one DX.
pub fn populated_log(dir: &Path) -> PathBuf {
    let path = dir.join("fieldday.db");
    let conn = Connection::open(&path).expect("create fixture db");
    create_schema(&conn).expect("create schema");
    conn.execute_batch(
        "INSERT INTO operator (id, name) VALUES (1, 'N1KDO'), (2, 'W1AW');
         INSERT INTO station (id, name) VALUES (1, 'CW-1'), (2, 'SSB-1');",
    )
    .expect("seed operators");
    let rows = [
        (T0, 4, 1, 1, 1, "EMA"),
        (T0 + 60, 4, 1, 1, 1, "ema"),
        (T0 + 120, 3, 2, 2, 2, "EMA"),
        (T0 + 600, 5, 2, 2, 2, "WWA"),
        (T0 + 3_700, 4, 3, 1, 1, "ONE"),
        (T0 + 3_800, 4, 1, 2, 1, "DX"),
    ];
    for (ts, band, mode, op, station, section) in rows {
        conn.execute(
            "INSERT INTO qso_log (timestamp, band_id, mode_id, operator_id, station_id,
                                  callsign, exchange, section)
             VALUES (?1, ?2, ?3, ?4, ?5, 'K1ABC', '2A', ?6)",
            rusqlite::params![ts, band, mode, op, station, section],
        )
        .expect("insert qso");
    }
    path
}

// ──────────────────── binary runner ────────────────────

pub struct CmdResult {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub log: String,
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis())
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Run the binary with piped stdio and the given environment, logging to a
/// per-case file under the system temp dir.
pub fn run_viewer_case(case_name: &str, envs: &[(&str, &str)]) -> CmdResult {
    let root = std::env::temp_dir().join("qso-glance-test-logs");
    fs::create_dir_all(&root).expect("create temp test log dir");
    let log_path = root.join(format!("{}-{}.log", sanitize(case_name), now_millis()));

    let output = Command::new(env!("CARGO_BIN_EXE_qso-glance"))
        .env_remove("QG_CONFIG")
        .env("QG_LOG_FILE", &log_path)
        .env("QG_LOG_LEVEL", "debug")
        .env("RUST_BACKTRACE", "1")
        .envs(envs.iter().copied())
        .output()
        .expect("execute qso-glance");

    CmdResult {
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        log: fs::read_to_string(&log_path).unwrap_or_default(),
    }
}
