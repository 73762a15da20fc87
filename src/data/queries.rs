//! Named aggregate queries over the contact log.
//!
//! Each query borrows an open connection and returns one aggregate. Any
//! SQLite failure (missing table, corrupt file, locked store) converts to
//! `DataStoreOperational` through `From<rusqlite::Error>`.

use std::collections::BTreeMap;

use chrono::DateTime;
use rusqlite::{Connection, OptionalExtension, params};

use crate::core::errors::Result;
use crate::data::aggregates::{
    BandModeTable, HourRow, HourlyBandRates, LastQso, NamedCount, OperatorRate,
};
use crate::data::schema::{BANDS, band_slot};

/// Seconds in the long operator-rate window.
pub const RATE_WINDOW_LONG_SECS: i64 = 60 * 60;
/// Seconds in the short operator-rate window.
pub const RATE_WINDOW_SHORT_SECS: i64 = 15 * 60;
/// Most recent hours kept by [`get_qsos_per_hour_per_band`].
pub const MAX_RATE_HOURS: usize = 72;

const SECS_PER_HOUR: i64 = 3600;

fn to_count(raw: i64) -> u64 {
    u64::try_from(raw).unwrap_or(0)
}

fn to_index(raw: Option<i64>) -> usize {
    raw.and_then(|id| usize::try_from(id).ok()).unwrap_or(0)
}

fn band_label(band_id: Option<i64>) -> &'static str {
    BANDS[band_slot(to_index(band_id))]
}

/// Newest contact and a one-line description of it.
pub fn get_last_qso(conn: &Connection) -> Result<LastQso> {
    let row = conn
        .prepare_cached(
            "SELECT qso_log.timestamp, qso_log.callsign, qso_log.exchange, qso_log.section,
                    operator.name, qso_log.band_id
             FROM qso_log LEFT JOIN operator ON operator.id = qso_log.operator_id
             ORDER BY qso_log.timestamp DESC, qso_log.id DESC
             LIMIT 1",
        )?
        .query_row([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, Option<i64>>(5)?,
            ))
        })
        .optional()?;

    let Some((timestamp, callsign, exchange, section, operator, band_id)) = row else {
        return Ok(LastQso {
            timestamp: None,
            message: "No QSOs logged".to_string(),
        });
    };

    let when = DateTime::from_timestamp(timestamp, 0).map_or_else(
        || timestamp.to_string(),
        |dt| dt.format("%H:%M:%S").to_string(),
    );
    let message = format!(
        "Last QSO: {} {} {} by {} on {} at {when}",
        callsign.unwrap_or_default(),
        exchange.unwrap_or_default(),
        section.unwrap_or_default(),
        operator.unwrap_or_else(|| "?".to_string()),
        band_label(band_id),
    );

    Ok(LastQso {
        timestamp: Some(timestamp),
        message,
    })
}

/// Operators ordered by contact count, most active first.
pub fn get_operators_by_qsos(conn: &Connection) -> Result<Vec<NamedCount>> {
    named_counts(
        conn,
        "SELECT operator.name, COUNT(qso_log.id)
         FROM qso_log JOIN operator ON operator.id = qso_log.operator_id
         GROUP BY qso_log.operator_id
         ORDER BY COUNT(qso_log.id) DESC, operator.name ASC",
    )
}

/// Stations ordered by contact count, busiest first.
pub fn get_station_qsos(conn: &Connection) -> Result<Vec<NamedCount>> {
    named_counts(
        conn,
        "SELECT station.name, COUNT(qso_log.id)
         FROM qso_log JOIN station ON station.id = qso_log.station_id
         GROUP BY qso_log.station_id
         ORDER BY COUNT(qso_log.id) DESC, station.name ASC",
    )
}

fn named_counts(conn: &Connection, sql: &str) -> Result<Vec<NamedCount>> {
    let mut stmt = conn.prepare_cached(sql)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(NamedCount {
                name: row.get(0)?,
                count: to_count(row.get(1)?),
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Contact counts per band and mode.
pub fn get_qso_band_modes(conn: &Connection) -> Result<BandModeTable> {
    let mut stmt = conn.prepare_cached(
        "SELECT band_id, mode_id, COUNT(*) FROM qso_log GROUP BY band_id, mode_id",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, Option<i64>>(0)?,
            row.get::<_, Option<i64>>(1)?,
            row.get::<_, i64>(2)?,
        ))
    })?;

    let mut table = BandModeTable::default();
    for row in rows {
        let (band_id, mode_id, count) = row?;
        table.add(to_index(band_id), to_index(mode_id), to_count(count));
    }
    Ok(table)
}

/// Per-operator contacts in the hour and quarter hour ending at `last_qso_time`.
///
/// An empty log (`None`) yields no rows.
pub fn get_qsos_per_hour_per_operator(
    conn: &Connection,
    last_qso_time: Option<i64>,
) -> Result<Vec<OperatorRate>> {
    let Some(last) = last_qso_time else {
        return Ok(Vec::new());
    };
    let hour_start = last - RATE_WINDOW_LONG_SECS;
    let quarter_start = last - RATE_WINDOW_SHORT_SECS;

    let mut stmt = conn.prepare_cached(
        "SELECT operator.name,
                COUNT(qso_log.id),
                SUM(CASE WHEN qso_log.timestamp > ?2 THEN 1 ELSE 0 END)
         FROM qso_log JOIN operator ON operator.id = qso_log.operator_id
         WHERE qso_log.timestamp > ?1 AND qso_log.timestamp <= ?3
         GROUP BY qso_log.operator_id
         ORDER BY COUNT(qso_log.id) DESC, operator.name ASC",
    )?;
    let rows = stmt
        .query_map(params![hour_start, quarter_start, last], |row| {
            Ok(OperatorRate {
                operator: row.get(0)?,
                last_hour: to_count(row.get(1)?),
                last_15_minutes: to_count(row.get::<_, Option<i64>>(2)?.unwrap_or(0)),
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Contacts per clock hour split by band, with gaps filled by empty hours.
///
/// Only the most recent [`MAX_RATE_HOURS`] hours are kept; band totals cover
/// the whole log.
pub fn get_qsos_per_hour_per_band(conn: &Connection) -> Result<HourlyBandRates> {
    let mut stmt = conn.prepare_cached(
        "SELECT (timestamp / 3600) * 3600 AS hour, band_id, COUNT(*)
         FROM qso_log
         GROUP BY hour, band_id
         ORDER BY hour ASC",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, Option<i64>>(1)?,
            row.get::<_, i64>(2)?,
        ))
    })?;

    let mut by_hour: BTreeMap<i64, Vec<u64>> = BTreeMap::new();
    let mut band_totals = vec![0u64; BANDS.len()];
    for row in rows {
        let (hour, band_id, count) = row?;
        let band = band_slot(to_index(band_id));
        let count = to_count(count);
        by_hour.entry(hour).or_insert_with(|| vec![0; BANDS.len()])[band] += count;
        band_totals[band] += count;
    }

    let hours = match (by_hour.keys().next(), by_hour.keys().next_back()) {
        (Some(&first), Some(&last)) => {
            let first = first.max(last - SECS_PER_HOUR * (MAX_RATE_HOURS as i64 - 1));
            (0..)
                .map(|step| first + step * SECS_PER_HOUR)
                .take_while(|hour| *hour <= last)
                .map(|hour_start| HourRow {
                    hour_start,
                    per_band: by_hour
                        .get(&hour_start)
                        .cloned()
                        .unwrap_or_else(|| vec![0; BANDS.len()]),
                })
                .collect()
        }
        _ => Vec::new(),
    };

    Ok(HourlyBandRates { hours, band_totals })
}

/// Contacts per ARRL/RAC section, upper-cased; blank sections are skipped.
pub fn get_qsos_by_section(conn: &Connection) -> Result<BTreeMap<String, u64>> {
    let mut stmt = conn.prepare_cached(
        "SELECT UPPER(TRIM(section)) AS sec, COUNT(*)
         FROM qso_log
         WHERE section IS NOT NULL AND TRIM(section) <> ''
         GROUP BY sec",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok((row.get::<_, String>(0)?, to_count(row.get(1)?)))
        })?
        .collect::<std::result::Result<BTreeMap<_, _>, _>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::schema::{band_id, create_schema, mode_id};

    const T0: i64 = 1_719_000_000; // 2024-06-21T20:00:00Z

    fn db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        create_schema(&conn).unwrap();
        conn.execute_batch(
            "INSERT INTO operator (id, name) VALUES (1, 'N1KDO'), (2, 'W1AW'), (3, 'K1IDLE');
             INSERT INTO station (id, name) VALUES (1, 'CW-1'), (2, 'SSB-1');",
        )
        .unwrap();
        conn
    }

    fn qso(conn: &Connection, ts: i64, op: i64, station: i64, band: &str, mode: &str, sec: &str) {
        conn.execute(
            "INSERT INTO qso_log (timestamp, band_id, mode_id, operator_id, station_id,
                                  callsign, exchange, section)
             VALUES (?1, ?2, ?3, ?4, ?5, 'K1ABC', '2A', ?6)",
            params![
                ts,
                band_id(band).unwrap() as i64,
                mode_id(mode).unwrap() as i64,
                op,
                station,
                sec
            ],
        )
        .unwrap();
    }

    #[test]
    fn empty_log_yields_empty_aggregates() {
        let conn = db();
        let last = get_last_qso(&conn).unwrap();
        assert_eq!(last.timestamp, None);
        assert!(get_operators_by_qsos(&conn).unwrap().is_empty());
        assert!(get_station_qsos(&conn).unwrap().is_empty());
        assert_eq!(get_qso_band_modes(&conn).unwrap().total(), 0);
        assert!(
            get_qsos_per_hour_per_operator(&conn, last.timestamp)
                .unwrap()
                .is_empty()
        );
        let hourly = get_qsos_per_hour_per_band(&conn).unwrap();
        assert!(hourly.hours.is_empty());
        assert!(get_qsos_by_section(&conn).unwrap().is_empty());
    }

    #[test]
    fn last_qso_describes_newest_contact() {
        let conn = db();
        qso(&conn, T0, 1, 1, "20m", "CW", "EMA");
        qso(&conn, T0 + 90, 2, 2, "40m", "PH", "ONE");
        let last = get_last_qso(&conn).unwrap();
        assert_eq!(last.timestamp, Some(T0 + 90));
        assert!(last.message.contains("W1AW"), "{}", last.message);
        assert!(last.message.contains("40m"), "{}", last.message);
        assert!(last.message.contains("20:01:30"), "{}", last.message);
    }

    #[test]
    fn operators_and_stations_sorted_by_count() {
        let conn = db();
        qso(&conn, T0, 1, 1, "20m", "CW", "EMA");
        qso(&conn, T0 + 1, 2, 2, "20m", "PH", "EMA");
        qso(&conn, T0 + 2, 2, 2, "20m", "PH", "EMA");
        let ops = get_operators_by_qsos(&conn).unwrap();
        assert_eq!(
            ops,
            vec![
                NamedCount {
                    name: "W1AW".to_string(),
                    count: 2
                },
                NamedCount {
                    name: "N1KDO".to_string(),
                    count: 1
                },
            ]
        );
        let stations = get_station_qsos(&conn).unwrap();
        assert_eq!(stations[0].name, "SSB-1");
        assert_eq!(stations[0].count, 2);
    }

    #[test]
    fn band_modes_grouped() {
        let conn = db();
        qso(&conn, T0, 1, 1, "20m", "CW", "EMA");
        qso(&conn, T0 + 1, 1, 1, "20m", "CW", "EMA");
        qso(&conn, T0 + 2, 1, 1, "40m", "DG", "EMA");
        let table = get_qso_band_modes(&conn).unwrap();
        assert_eq!(table.get(band_id("20m").unwrap(), mode_id("CW").unwrap()), 2);
        assert_eq!(table.get(band_id("40m").unwrap(), mode_id("DG").unwrap()), 1);
        assert_eq!(table.total(), 3);
    }

    #[test]
    fn operator_rates_use_trailing_windows() {
        let conn = db();
        let last = T0 + 4 * 3600;
        qso(&conn, last - 2 * 3600, 1, 1, "20m", "CW", "EMA"); // outside both windows
        qso(&conn, last - 30 * 60, 1, 1, "20m", "CW", "EMA"); // last hour only
        qso(&conn, last - 5 * 60, 1, 1, "20m", "CW", "EMA"); // both
        qso(&conn, last, 2, 2, "20m", "PH", "EMA"); // both
        let rates = get_qsos_per_hour_per_operator(&conn, Some(last)).unwrap();
        assert_eq!(
            rates,
            vec![
                OperatorRate {
                    operator: "N1KDO".to_string(),
                    last_hour: 2,
                    last_15_minutes: 1
                },
                OperatorRate {
                    operator: "W1AW".to_string(),
                    last_hour: 1,
                    last_15_minutes: 1
                },
            ]
        );
    }

    #[test]
    fn hourly_rates_fill_gaps() {
        let conn = db();
        qso(&conn, T0 + 10, 1, 1, "20m", "CW", "EMA");
        qso(&conn, T0 + 2 * 3600 + 5, 1, 1, "40m", "CW", "EMA");
        qso(&conn, T0 + 2 * 3600 + 6, 1, 1, "40m", "CW", "EMA");
        let hourly = get_qsos_per_hour_per_band(&conn).unwrap();
        assert_eq!(hourly.hours.len(), 3);
        assert_eq!(hourly.hours[0].hour_start, T0);
        assert_eq!(hourly.hours[1].total(), 0);
        assert_eq!(hourly.hours[2].per_band[band_id("40m").unwrap()], 2);
        assert_eq!(hourly.band_totals[band_id("20m").unwrap()], 1);
    }

    #[test]
    fn unknown_band_counts_as_na_in_hourly_and_band_mode_tables() {
        let conn = db();
        conn.execute(
            "INSERT INTO qso_log (timestamp, band_id, mode_id, operator_id, station_id, section)
             VALUES (?1, 99, 1, 1, 1, 'EMA')",
            params![T0],
        )
        .unwrap();
        let last_band = BANDS.len() - 1;

        let hourly = get_qsos_per_hour_per_band(&conn).unwrap();
        assert_eq!(hourly.band_totals[0], 1);
        assert_eq!(hourly.band_totals[last_band], 0);
        assert_eq!(hourly.hours[0].per_band[0], 1);

        let table = get_qso_band_modes(&conn).unwrap();
        assert_eq!(table.band_totals()[0], 1);
        assert_eq!(table.band_totals()[last_band], 0);
        assert_eq!(table.band_totals(), hourly.band_totals);

        assert!(get_last_qso(&conn).unwrap().message.contains("N/A"));
    }

    #[test]
    fn hourly_rates_keep_most_recent_hours() {
        let conn = db();
        qso(&conn, T0, 1, 1, "20m", "CW", "EMA");
        qso(&conn, T0 + 100 * 3600, 1, 1, "20m", "CW", "EMA");
        let hourly = get_qsos_per_hour_per_band(&conn).unwrap();
        assert_eq!(hourly.hours.len(), MAX_RATE_HOURS);
        assert_eq!(hourly.hours.last().unwrap().hour_start, T0 + 100 * 3600);
        assert_eq!(hourly.band_totals[band_id("20m").unwrap()], 2);
    }

    #[test]
    fn sections_normalized_and_blank_skipped() {
        let conn = db();
        qso(&conn, T0, 1, 1, "20m", "CW", "ema");
        qso(&conn, T0 + 1, 1, 1, "20m", "CW", " EMA ");
        qso(&conn, T0 + 2, 1, 1, "20m", "CW", "");
        qso(&conn, T0 + 3, 1, 1, "20m", "CW", "STX");
        let sections = get_qsos_by_section(&conn).unwrap();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections["EMA"], 2);
        assert_eq!(sections["STX"], 1);
    }

    #[test]
    fn missing_table_is_operational_error() {
        let conn = Connection::open_in_memory().unwrap();
        let err = get_qsos_by_section(&conn).expect_err("no schema");
        assert_eq!(err.code(), "QG-3002");
    }
}
