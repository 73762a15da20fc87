//! Render dispatcher: one [`Visualization`] over one [`Aggregate`] into a
//! [`PixelBuffer`].
//!
//! Every chart gets its title across the top when the target has room for
//! text; the chart itself draws into the rest.

pub mod charts;
pub mod map;
pub mod palette;
pub mod sections;
pub mod tables;
pub mod text;

use std::fmt;

use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::debug;

use crate::core::errors::{QgError, Result};
use crate::data::aggregates::{Aggregate, AggregateKind};
use crate::display::SurfaceSize;

/// The charts this viewer can draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visualization {
    /// Section tiles coloured by contacts.
    SectionMap,
    /// Contacts per operator, as bars.
    OperatorsGraph,
    /// Contacts per station, as bars.
    StationsGraph,
    /// Contacts per band.
    BandsGraph,
    /// Contacts per mode.
    ModesGraph,
    /// Contacts per hour, stacked by band.
    RatesChart,
    /// Each operator's last-hour and last-15-minute counts, as bars.
    OperatorRatesGraph,
    /// Band by mode table.
    SummaryTable,
    /// Each operator's last-hour and last-15-minute counts, as a table.
    RatesTable,
    /// Contacts per operator, as a table.
    OperatorsTable,
}

impl Visualization {
    /// Every chart, in menu order.
    pub const ALL: [Self; 10] = [
        Self::SectionMap,
        Self::OperatorsGraph,
        Self::StationsGraph,
        Self::BandsGraph,
        Self::ModesGraph,
        Self::RatesChart,
        Self::OperatorRatesGraph,
        Self::SummaryTable,
        Self::RatesTable,
        Self::OperatorsTable,
    ];

    /// Stable name used in logs and errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SectionMap => "section_map",
            Self::OperatorsGraph => "operators_graph",
            Self::StationsGraph => "stations_graph",
            Self::BandsGraph => "bands_graph",
            Self::ModesGraph => "modes_graph",
            Self::RatesChart => "rates_chart",
            Self::OperatorRatesGraph => "operator_rates_graph",
            Self::SummaryTable => "qso_summary_table",
            Self::RatesTable => "qso_rates_table",
            Self::OperatorsTable => "qso_operators_table",
        }
    }

    /// Heading drawn above the chart.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::SectionMap => "QSOs by Section",
            Self::OperatorsGraph => "QSOs by Operator",
            Self::StationsGraph => "QSOs by Station",
            Self::BandsGraph => "QSOs by Band",
            Self::ModesGraph => "QSOs by Mode",
            Self::RatesChart => "QSOs per Hour",
            Self::OperatorRatesGraph => "Operator QSO Rates",
            Self::SummaryTable => "QSOs by Band and Mode",
            Self::RatesTable => "QSO Rates by Operator",
            Self::OperatorsTable => "Operator Totals",
        }
    }

    /// The aggregate this chart is drawn from.
    #[must_use]
    pub const fn required_aggregate(self) -> AggregateKind {
        match self {
            Self::SectionMap => AggregateKind::SectionCounts,
            Self::OperatorsGraph | Self::OperatorsTable => AggregateKind::OperatorCounts,
            Self::StationsGraph => AggregateKind::StationCounts,
            Self::BandsGraph | Self::ModesGraph | Self::SummaryTable => AggregateKind::BandModes,
            Self::RatesChart => AggregateKind::HourlyBandRates,
            Self::OperatorRatesGraph | Self::RatesTable => AggregateKind::OperatorRates,
        }
    }
}

impl fmt::Display for Visualization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row-major RGB pixels, three bytes each, with the size they claim to have.
///
/// Not validated on construction; the presenter rejects a buffer whose data
/// does not match its dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl PixelBuffer {
    /// Wrap `data` as a `width` x `height` image.
    #[must_use]
    pub const fn from_raw(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            data,
            width,
            height,
        }
    }

    /// Raw RGB bytes.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Claimed width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Claimed height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Byte length `width * height * 3`, or `None` on overflow.
    #[must_use]
    pub fn expected_len(&self) -> Option<usize> {
        usize::try_from(self.width)
            .ok()?
            .checked_mul(usize::try_from(self.height).ok()?)?
            .checked_mul(3)
    }

    /// `(r, g, b)` at `(x, y)`, if inside the buffer.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<(u8, u8, u8)> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (usize::try_from(y).ok()? * usize::try_from(self.width).ok()?
            + usize::try_from(x).ok()?)
            * 3;
        let px = self.data.get(idx..idx + 3)?;
        Some((px[0], px[1], px[2]))
    }
}

/// Draw `visualization` from `aggregate` at exactly `size`.
///
/// # Errors
///
/// `Render` when the aggregate is not the one the chart needs, when `size`
/// has no area, or when the bitmap backend fails.
pub fn render(visualization: Visualization, aggregate: &Aggregate, size: SurfaceSize) -> Result<PixelBuffer> {
    let name = visualization.as_str();
    if size.is_empty() {
        return Err(QgError::render(name, format!("zero-sized target {size}")));
    }
    if aggregate.kind() != visualization.required_aggregate() {
        return Err(QgError::render(
            name,
            format!(
                "needs {} but was given {}",
                visualization.required_aggregate(),
                aggregate.kind()
            ),
        ));
    }

    let len = usize::try_from(u64::from(size.width) * u64::from(size.height) * 3)
        .map_err(|_| QgError::render(name, format!("target {size} is too large")))?;
    let mut data = vec![0u8; len];
    {
        let area = BitMapBackend::with_buffer(&mut data, (size.width, size.height)).into_drawing_area();
        area.fill(&palette::BACKGROUND)
            .map_err(|error| QgError::render(name, error.to_string()))?;
        draw(visualization, aggregate, &area).map_err(|error| QgError::render(name, error.to_string()))?;
        area.present()
            .map_err(|error| QgError::render(name, error.to_string()))?;
    }
    debug!("rendered {visualization} at {size}");
    Ok(PixelBuffer::from_raw(data, size.width, size.height))
}

fn draw<DB: DrawingBackend>(
    visualization: Visualization,
    aggregate: &Aggregate,
    area: &DrawingArea<DB, Shift>,
) -> charts::DrawResult<DB> {
    let body = text::titled(area, visualization.title(), &palette::TEXT)?;
    let area = &body;
    match (visualization, aggregate) {
        (Visualization::SectionMap, Aggregate::SectionCounts(counts)) => map::draw_map(area, counts),
        (Visualization::OperatorsGraph, Aggregate::OperatorCounts(counts))
        | (Visualization::StationsGraph, Aggregate::StationCounts(counts)) => {
            charts::draw_named_counts(area, counts)
        }
        (Visualization::BandsGraph, Aggregate::BandModes(table)) => charts::draw_bands(area, table),
        (Visualization::ModesGraph, Aggregate::BandModes(table)) => charts::draw_modes(area, table),
        (Visualization::RatesChart, Aggregate::HourlyBandRates(rates)) => charts::draw_rates_chart(area, rates),
        (Visualization::OperatorRatesGraph, Aggregate::OperatorRates(rates)) => {
            charts::draw_operator_rates(area, rates)
        }
        (Visualization::SummaryTable, Aggregate::BandModes(table)) => tables::draw_summary_table(area, table),
        (Visualization::RatesTable, Aggregate::OperatorRates(rates)) => tables::draw_rates_table(area, rates),
        (Visualization::OperatorsTable, Aggregate::OperatorCounts(counts)) => {
            tables::draw_operators_table(area, counts)
        }
        // `render` checks the pairing before drawing.
        _ => Ok(()),
    }
}
