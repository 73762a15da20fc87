#![forbid(unsafe_code)]

//! qso-glance: a one-shot viewer for a field-day contact log.
//!
//! Reads aggregate statistics from the SQLite contact log inside a scoped
//! session, draws one chart (the ARRL/RAC section map in the shipped binary),
//! shows it in the terminal, and waits until the operator presses `q`.
//!
//! # Library usage
//!
//! ```rust,no_run
//! use qso_glance::prelude::*;
//!
//! let config = Config::load_from_env()?;
//! let store = SqliteStore::new(&config.database.path);
//! let options = RunOptions::from_config(&config, ACTIVE_VISUALIZATION);
//! let outcome = run(&TerminalBackend, &store, &options);
//! std::process::exit(outcome.exit_code());
//! # Ok::<(), QgError>(())
//! ```

pub mod prelude;

pub mod app;
pub mod core;
pub mod data;
pub mod display;
pub mod graphics;
pub mod logger;
