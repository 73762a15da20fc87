//! Contact-log schema and the band/mode lookup tables its ids index.

use rusqlite::Connection;

use crate::core::errors::Result;

/// Band labels indexed by `qso_log.band_id`; id 0 is "unknown".
pub const BANDS: [&str; 13] = [
    "N/A", "160m", "80m", "40m", "20m", "15m", "10m", "6m", "2m", "1.25m", "70cm", "33cm", "23cm",
];

/// Simplified mode labels indexed by `qso_log.mode_id`; id 0 is "unknown".
pub const MODES: [&str; 4] = ["N/A", "CW", "PH", "DG"];

/// Look up a band id by label.
#[must_use]
pub fn band_id(label: &str) -> Option<usize> {
    BANDS.iter().position(|band| *band == label)
}

/// Look up a mode id by label.
#[must_use]
pub fn mode_id(label: &str) -> Option<usize> {
    MODES.iter().position(|mode| *mode == label)
}

/// Slot for `band_id` in per-band tables; unknown ids fold into `N/A`.
#[must_use]
pub const fn band_slot(band_id: usize) -> usize {
    if band_id < BANDS.len() { band_id } else { 0 }
}

/// Slot for `mode_id` in per-mode tables; unknown ids fold into `N/A`.
#[must_use]
pub const fn mode_slot(mode_id: usize) -> usize {
    if mode_id < MODES.len() { mode_id } else { 0 }
}

/// Create the contact-log tables if they do not exist.
///
/// The viewer itself opens the store read-only; this is used by whatever
/// collects the log and by test fixtures.
pub fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS operator (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS station (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS qso_log (
            id INTEGER PRIMARY KEY,
            timestamp INTEGER NOT NULL,
            mycall TEXT,
            band_id INTEGER,
            mode_id INTEGER,
            operator_id INTEGER REFERENCES operator(id),
            station_id INTEGER REFERENCES station(id),
            rx_freq INTEGER,
            tx_freq INTEGER,
            callsign TEXT,
            rst_sent TEXT,
            rst_recv TEXT,
            exchange TEXT,
            section TEXT,
            comment TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_qso_timestamp ON qso_log(timestamp);
        CREATE INDEX IF NOT EXISTS idx_qso_operator ON qso_log(operator_id);
        CREATE INDEX IF NOT EXISTS idx_qso_section ON qso_log(section);",
    )?;
    Ok(())
}
