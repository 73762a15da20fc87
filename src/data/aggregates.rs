//! Aggregate result sets produced by the named queries.
//!
//! The orchestrator treats [`Aggregate`] as opaque: it is handed from the
//! data session to the render dispatcher unchanged. Only the drawing
//! functions look inside.

#![allow(missing_docs)]

use std::collections::BTreeMap;
use std::fmt;

use crate::data::schema::{BANDS, MODES, band_slot, mode_slot};

/// Field-less tag naming one statistic; used to plan fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AggregateKind {
    LastQso,
    OperatorCounts,
    StationCounts,
    BandModes,
    OperatorRates,
    HourlyBandRates,
    SectionCounts,
}

impl AggregateKind {
    /// Every kind, in the order a full load fetches them.
    ///
    /// `LastQso` precedes `OperatorRates` because the rate windows are
    /// anchored on the newest contact.
    pub const ALL: [Self; 7] = [
        Self::LastQso,
        Self::OperatorCounts,
        Self::StationCounts,
        Self::BandModes,
        Self::OperatorRates,
        Self::HourlyBandRates,
        Self::SectionCounts,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LastQso => "last_qso",
            Self::OperatorCounts => "operator_counts",
            Self::StationCounts => "station_counts",
            Self::BandModes => "band_modes",
            Self::OperatorRates => "operator_rates",
            Self::HourlyBandRates => "hourly_band_rates",
            Self::SectionCounts => "section_counts",
        }
    }
}

impl fmt::Display for AggregateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One aggregate result set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Aggregate {
    LastQso(LastQso),
    OperatorCounts(Vec<NamedCount>),
    StationCounts(Vec<NamedCount>),
    BandModes(BandModeTable),
    OperatorRates(Vec<OperatorRate>),
    HourlyBandRates(HourlyBandRates),
    SectionCounts(BTreeMap<String, u64>),
}

impl Aggregate {
    #[must_use]
    pub const fn kind(&self) -> AggregateKind {
        match self {
            Self::LastQso(_) => AggregateKind::LastQso,
            Self::OperatorCounts(_) => AggregateKind::OperatorCounts,
            Self::StationCounts(_) => AggregateKind::StationCounts,
            Self::BandModes(_) => AggregateKind::BandModes,
            Self::OperatorRates(_) => AggregateKind::OperatorRates,
            Self::HourlyBandRates(_) => AggregateKind::HourlyBandRates,
            Self::SectionCounts(_) => AggregateKind::SectionCounts,
        }
    }
}

/// Newest contact in the log, with the one-line summary shown to operators.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LastQso {
    /// Unix seconds; `None` for an empty log.
    pub timestamp: Option<i64>,
    pub message: String,
}

/// A name (operator or station) and its contact count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedCount {
    pub name: String,
    pub count: u64,
}

/// Contacts per operator inside the two trailing windows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorRate {
    pub operator: String,
    pub last_hour: u64,
    pub last_15_minutes: u64,
}

/// Contact counts indexed by `[band_id][mode_id]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandModeTable {
    cells: Vec<Vec<u64>>,
}

impl Default for BandModeTable {
    fn default() -> Self {
        Self {
            cells: vec![vec![0; MODES.len()]; BANDS.len()],
        }
    }
}

impl BandModeTable {
    /// Add `count` contacts; out-of-range ids land in the `N/A` row/column.
    pub fn add(&mut self, band_id: usize, mode_id: usize, count: u64) {
        self.cells[band_slot(band_id)][mode_slot(mode_id)] += count;
    }

    #[must_use]
    pub fn get(&self, band_id: usize, mode_id: usize) -> u64 {
        self.cells
            .get(band_id)
            .and_then(|row| row.get(mode_id))
            .copied()
            .unwrap_or(0)
    }

    /// Total contacts per band, indexed like [`BANDS`].
    #[must_use]
    pub fn band_totals(&self) -> Vec<u64> {
        self.cells.iter().map(|row| row.iter().sum()).collect()
    }

    /// Total contacts per mode, indexed like [`MODES`].
    #[must_use]
    pub fn mode_totals(&self) -> Vec<u64> {
        (0..MODES.len())
            .map(|mode| self.cells.iter().map(|row| row[mode]).sum())
            .collect()
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.cells.iter().flatten().sum()
    }
}

/// Contacts for one clock hour, split by band.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HourRow {
    /// Start of the hour, unix seconds.
    pub hour_start: i64,
    /// Indexed like [`BANDS`].
    pub per_band: Vec<u64>,
}

impl HourRow {
    #[must_use]
    pub fn total(&self) -> u64 {
        self.per_band.iter().sum()
    }
}

/// Hourly contact counts per band, oldest hour first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HourlyBandRates {
    pub hours: Vec<HourRow>,
    /// Whole-log totals, indexed like [`BANDS`].
    pub band_totals: Vec<u64>,
}

/// Values from one load, each assigned once.
#[derive(Debug, Clone, Default)]
pub struct LoadedAggregates {
    values: BTreeMap<AggregateKind, Aggregate>,
}

impl LoadedAggregates {
    /// Build from fetched values; a later value for the same kind is rejected
    /// by debug assertion and otherwise ignored.
    #[must_use]
    pub fn from_values(values: impl IntoIterator<Item = Aggregate>) -> Self {
        let mut map = BTreeMap::new();
        for value in values {
            let kind = value.kind();
            debug_assert!(!map.contains_key(&kind), "{kind} fetched twice");
            map.entry(kind).or_insert(value);
        }
        Self { values: map }
    }

    #[must_use]
    pub fn get(&self, kind: AggregateKind) -> Option<&Aggregate> {
        self.values.get(&kind)
    }

    /// Kinds present, in fetch order.
    #[must_use]
    pub fn kinds(&self) -> Vec<AggregateKind> {
        self.values.keys().copied().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
