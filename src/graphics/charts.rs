//! Bar charts over the count aggregates.
//!
//! Values are scaled so the largest bar fills the plot; an empty aggregate
//! leaves just the axes. When the area has room for text, horizontal bars
//! carry their names in a column on the left and their values past the bar
//! end, and the hourly chart gets hour marks and a band legend underneath.

// Contact counts stay far below 2^52, so the f64 conversions are exact.
#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]

use chrono::DateTime;
use plotters::coord::Shift;
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::data::aggregates::{BandModeTable, HourlyBandRates, NamedCount, OperatorRate};
use crate::data::schema::{BANDS, MODES};
use crate::graphics::{palette, text};

/// Result of one drawing call on backend `DB`.
pub type DrawResult<DB> = Result<(), DrawingAreaErrorKind<<DB as DrawingBackend>::ErrorType>>;

type AreaResult<DB> = Result<DrawingArea<DB, Shift>, DrawingAreaErrorKind<<DB as DrawingBackend>::ErrorType>>;

type Chart<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

/// Most rows a ranked (operators, stations) chart shows.
pub const MAX_RANKED_BARS: usize = 20;

/// Share of each slot covered by its bar; the rest is the gap.
const BAR_FILL: f64 = 0.8;
/// Value-axis stretch that leaves room for value labels past the longest bar.
const VALUE_HEADROOM: f64 = 1.25;
const LAST_HOUR: RGBColor = palette::SERIES[5];
const LAST_15_MINUTES: RGBColor = palette::SERIES[1];

/// One labelled horizontal bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bar {
    /// Name written left of the bar.
    pub label: String,
    /// Bar length, in contacts.
    pub value: u64,
    /// Fill.
    pub color: RGBColor,
}

fn margin<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>) -> u32 {
    let (width, height) = area.dim_in_pixel();
    (width.min(height) / 20).max(1)
}

/// Upper bound of a value axis; never an empty range.
fn axis_max(max: u64) -> f64 {
    max.max(1) as f64
}

fn build<'a, DB: DrawingBackend>(
    area: &'a DrawingArea<DB, Shift>,
    margin: u32,
    x_max: f64,
    y_max: f64,
) -> Result<Chart<'a, DB>, DrawingAreaErrorKind<DB::ErrorType>> {
    ChartBuilder::on(area)
        .margin(margin)
        .build_cartesian_2d(0f64..x_max, 0f64..y_max)
}

fn draw_axes<DB: DrawingBackend>(chart: &mut Chart<'_, DB>, x_max: f64, y_max: f64) -> DrawResult<DB> {
    chart.draw_series([PathElement::new(
        vec![(0.0, y_max), (0.0, 0.0), (x_max, 0.0)],
        palette::AXIS.stroke_width(1),
    )])?;
    Ok(())
}

/// Pixel offset of the centre of slot `index` of `slots`, along a side
/// `length` pixels long plotted with `margin` at both ends.
fn slot_centre(length: u32, margin: u32, index: usize, slots: usize) -> i32 {
    let span = f64::from(length.saturating_sub(2 * margin));
    (f64::from(margin) + (index as f64 + 0.5) * span / slots.max(1) as f64).round() as i32
}

fn slot_size(length: u32, margin: u32, slots: usize) -> u32 {
    length.saturating_sub(2 * margin) / u32::try_from(slots.max(1)).unwrap_or(u32::MAX)
}

/// Write `labels` in a column split off the left of `area`, one per row of
/// a chart plotted with `margin` in the remainder, and return the remainder.
///
/// Labels shrink to fit thin rows; rows too thin for any text take no column.
fn label_rows<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    labels: &[&str],
    margin: u32,
    line: Option<u32>,
) -> AreaResult<DB> {
    let (width, height) = area.dim_in_pixel();
    let row = slot_size(height, margin, labels.len());
    let Some(line) = line.and_then(|line| text::usable(line.min(row))) else {
        return Ok(area.clone());
    };
    if labels.is_empty() {
        return Ok(area.clone());
    }

    let pad = (line / 2).max(1);
    let column = (text::widest(area, labels, line)? + 2 * pad).min(width / 3);
    let (names, plot) = area.split_horizontally(column);
    for (i, label) in labels.iter().enumerate() {
        let at = (text::px(column.saturating_sub(pad)), slot_centre(height, margin, i, labels.len()));
        text::label(&names, label, at, line, HPos::Right, &palette::TEXT)?;
    }
    Ok(plot)
}

/// Value labels just past the end of each bar; `bars` are `(value, centre)`.
fn label_values<DB: DrawingBackend>(
    chart: &mut Chart<'_, DB>,
    bars: &[(u64, f64)],
    x_max: f64,
    line: u32,
) -> DrawResult<DB> {
    let style = text::style(line, &palette::TEXT).pos(Pos::new(HPos::Left, VPos::Center));
    let gap = x_max / 100.0;
    chart.draw_series(
        bars.iter()
            .filter(|&&(value, _)| value > 0)
            .map(|&(value, centre)| Text::new(value.to_string(), (value as f64 + gap, centre), style.clone())),
    )?;
    Ok(())
}

/// Horizontal bars, one per entry, top to bottom in the order given.
pub fn draw_bars<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, bars: &[Bar]) -> DrawResult<DB> {
    let margin = margin(area);
    let line = text::line_for(area.dim_in_pixel());
    let labels: Vec<&str> = bars.iter().map(|bar| bar.label.as_str()).collect();
    let plot = label_rows(area, &labels, margin, line)?;

    let longest = axis_max(bars.iter().map(|bar| bar.value).max().unwrap_or(0));
    let x_max = if line.is_some() { longest * VALUE_HEADROOM } else { longest };
    let rows = bars.len().max(1) as f64;
    let centre = |i: usize| rows - i as f64 - 0.5;

    let mut chart = build(&plot, margin, x_max, rows)?;
    chart.draw_series(
        bars.iter()
            .enumerate()
            .filter(|(_, bar)| bar.value > 0)
            .map(|(i, bar)| {
                let top = centre(i) + BAR_FILL / 2.0;
                Rectangle::new([(0.0, top - BAR_FILL), (bar.value as f64, top)], bar.color.filled())
            }),
    )?;
    if let Some(line) = line.and_then(|line| text::usable(line.min(slot_size(plot.dim_in_pixel().1, margin, bars.len())))) {
        let values: Vec<(u64, f64)> = bars.iter().enumerate().map(|(i, bar)| (bar.value, centre(i))).collect();
        label_values(&mut chart, &values, x_max, line)?;
    }
    draw_axes(&mut chart, x_max, rows)
}

/// Ranked names (operators, stations), largest first, capped at
/// [`MAX_RANKED_BARS`].
pub fn draw_named_counts<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    counts: &[NamedCount],
) -> DrawResult<DB> {
    let bars: Vec<Bar> = counts
        .iter()
        .take(MAX_RANKED_BARS)
        .enumerate()
        .map(|(i, entry)| Bar {
            label: entry.name.clone(),
            value: entry.count,
            color: palette::series(i),
        })
        .collect();
    draw_bars(area, &bars)
}

/// Worked slots of a per-band or per-mode total, coloured by slot id.
fn worked_slots(totals: &[u64], labels: &[&str]) -> Vec<Bar> {
    totals
        .iter()
        .zip(labels)
        .enumerate()
        .filter(|&(_, (&value, _))| value > 0)
        .map(|(id, (&value, label))| Bar {
            label: (*label).to_string(),
            value,
            color: palette::series(id),
        })
        .collect()
}

/// Band totals for every worked band, `N/A` included.
pub fn draw_bands<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, table: &BandModeTable) -> DrawResult<DB> {
    draw_bars(area, &worked_slots(&table.band_totals(), &BANDS))
}

/// Mode totals for every worked mode, `N/A` included.
pub fn draw_modes<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, table: &BandModeTable) -> DrawResult<DB> {
    draw_bars(area, &worked_slots(&table.mode_totals(), &MODES))
}

/// One stacked column per hour, a segment per band.
///
/// With room for text, a strip under the plot marks the hour (UTC) of
/// every few columns and a second strip names each worked band in its
/// segment colour.
pub fn draw_rates_chart<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    rates: &HourlyBandRates,
) -> DrawResult<DB> {
    let margin = margin(area);
    let line = text::line_for(area.dim_in_pixel());
    let (_, height) = area.dim_in_pixel();
    let strip = line.map_or(0, |line| line + line / 2);
    let (plot, strips) = area.split_vertically(height.saturating_sub(2 * strip));

    let columns = rates.hours.len().max(1) as f64;
    let y_max = axis_max(rates.hours.iter().map(|hour| hour.total()).max().unwrap_or(0));

    let mut chart = build(&plot, margin, columns, y_max)?;
    for (i, hour) in rates.hours.iter().enumerate() {
        let left = i as f64 + (1.0 - BAR_FILL) / 2.0;
        let mut base = 0u64;
        let segments = hour
            .per_band
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count > 0)
            .map(|(band, &count)| {
                let bottom = base;
                base += count;
                Rectangle::new(
                    [(left, bottom as f64), (left + BAR_FILL, base as f64)],
                    palette::series(band).filled(),
                )
            })
            .collect::<Vec<_>>();
        chart.draw_series(segments)?;
    }
    draw_axes(&mut chart, columns, y_max)?;

    if let Some(line) = line {
        let (marks, legend) = strips.split_vertically(strip);
        draw_hour_marks(&marks, rates, margin, line)?;
        draw_band_legend(&legend, &rates.band_totals, margin, line)?;
    }
    Ok(())
}

fn draw_hour_marks<DB: DrawingBackend>(
    strip: &DrawingArea<DB, Shift>,
    rates: &HourlyBandRates,
    margin: u32,
    line: u32,
) -> DrawResult<DB> {
    let (width, height) = strip.dim_in_pixel();
    let label_width = text::widest(strip, &["00"], line)? + line;
    let column = slot_size(width, margin, rates.hours.len()).max(1);
    let every = label_width.div_ceil(column).max(1) as usize;
    let y = text::px(height / 2);
    for (i, hour) in rates.hours.iter().enumerate().step_by(every) {
        let Some(start) = DateTime::from_timestamp(hour.hour_start, 0) else {
            continue;
        };
        let x = slot_centre(width, margin, i, rates.hours.len());
        text::label(strip, &start.format("%H").to_string(), (x, y), line, HPos::Center, &palette::AXIS)?;
    }
    Ok(())
}

fn draw_band_legend<DB: DrawingBackend>(
    strip: &DrawingArea<DB, Shift>,
    band_totals: &[u64],
    margin: u32,
    line: u32,
) -> DrawResult<DB> {
    let (_, height) = strip.dim_in_pixel();
    let y = text::px(height / 2);
    let mut x = margin;
    for (band, _) in band_totals.iter().enumerate().filter(|&(_, &total)| total > 0) {
        let Some(label) = BANDS.get(band) else {
            continue;
        };
        text::label(strip, label, (text::px(x), y), line, HPos::Left, &palette::series(band))?;
        x += text::widest(strip, &[label], line)? + line;
    }
    Ok(())
}

/// Two horizontal bars per operator: the last hour above the last 15 minutes.
pub fn draw_operator_rates<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    rates: &[OperatorRate],
) -> DrawResult<DB> {
    let shown = &rates[..rates.len().min(MAX_RANKED_BARS)];
    let margin = margin(area);
    let line = text::line_for(area.dim_in_pixel());
    let labels: Vec<&str> = shown.iter().map(|rate| rate.operator.as_str()).collect();
    let plot = label_rows(area, &labels, margin, line)?;

    let longest = axis_max(
        shown
            .iter()
            .map(|rate| rate.last_hour.max(rate.last_15_minutes))
            .max()
            .unwrap_or(0),
    );
    let x_max = if line.is_some() { longest * VALUE_HEADROOM } else { longest };
    let rows = shown.len().max(1) as f64;
    let half = BAR_FILL / 2.0;

    let mut chart = build(&plot, margin, x_max, rows)?;
    let mut values = Vec::with_capacity(shown.len() * 2);
    for (i, rate) in shown.iter().enumerate() {
        let top = rows - i as f64 - (1.0 - BAR_FILL) / 2.0;
        let bars = [
            (rate.last_hour, top - half, top, LAST_HOUR),
            (rate.last_15_minutes, top - BAR_FILL, top - half, LAST_15_MINUTES),
        ];
        values.extend(bars.iter().map(|&(count, bottom, upper, _)| (count, (bottom + upper) / 2.0)));
        chart.draw_series(
            bars.into_iter()
                .filter(|&(count, ..)| count > 0)
                .map(|(count, bottom, upper, color)| {
                    Rectangle::new([(0.0, bottom), (count as f64, upper)], color.filled())
                }),
        )?;
    }
    let half_row = slot_size(plot.dim_in_pixel().1, margin, shown.len() * 2);
    if let Some(line) = line.and_then(|line| text::usable(line.min(half_row))) {
        label_values(&mut chart, &values, x_max, line)?;
    }
    draw_axes(&mut chart, x_max, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::aggregates::HourRow;

    const W: u32 = 120;
    const H: u32 = 80;

    fn draw_at<F>(width: u32, height: u32, draw: F) -> Vec<u8>
    where
        F: FnOnce(&DrawingArea<BitMapBackend<'_>, Shift>) -> DrawResult<BitMapBackend<'static>>,
    {
        let mut buffer = vec![0u8; (width * height * 3) as usize];
        {
            let area = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            area.fill(&palette::BACKGROUND).unwrap();
            draw(&area).unwrap();
            area.present().unwrap();
        }
        buffer
    }

    fn draw_with<F>(draw: F) -> Vec<u8>
    where
        F: FnOnce(&DrawingArea<BitMapBackend<'_>, Shift>) -> DrawResult<BitMapBackend<'static>>,
    {
        draw_at(W, H, draw)
    }

    fn count_color(buffer: &[u8], color: RGBColor) -> usize {
        buffer
            .chunks_exact(3)
            .filter(|px| *px == [color.0, color.1, color.2])
            .count()
    }

    /// Pixels in columns `x0..x1` that are not background.
    fn ink_in_columns(buffer: &[u8], width: u32, x0: u32, x1: u32) -> usize {
        let bg = [palette::BACKGROUND.0, palette::BACKGROUND.1, palette::BACKGROUND.2];
        buffer
            .chunks_exact(3)
            .enumerate()
            .filter(|(i, px)| {
                let x = (*i as u32) % width;
                x >= x0 && x < x1 && *px != bg
            })
            .count()
    }

    fn first_column_of(buffer: &[u8], width: u32, color: RGBColor) -> u32 {
        buffer
            .chunks_exact(3)
            .enumerate()
            .filter(|(_, px)| *px == [color.0, color.1, color.2])
            .map(|(i, _)| (i as u32) % width)
            .min()
            .unwrap()
    }

    fn named(name: &str, count: u64) -> NamedCount {
        NamedCount {
            name: name.to_string(),
            count,
        }
    }

    #[test]
    fn largest_named_count_gets_the_longest_bar() {
        let counts = vec![named("N1KDO", 40), named("W1AW", 10)];
        let buffer = draw_with(|area| draw_named_counts(area, &counts));
        let first = count_color(&buffer, palette::series(0));
        let second = count_color(&buffer, palette::series(1));
        assert!(first > 0 && second > 0);
        assert!(first > second * 3, "first={first} second={second}");
    }

    #[test]
    fn ranked_chart_is_capped() {
        let counts: Vec<NamedCount> = (0..30).map(|i| named(&format!("OP{i}"), 30 - i)).collect();
        let capped = draw_with(|area| draw_named_counts(area, &counts));
        let first_twenty = draw_with(|area| draw_named_counts(area, &counts[..MAX_RANKED_BARS]));
        assert_eq!(capped, first_twenty);
    }

    #[test]
    fn names_are_written_left_of_the_bars() {
        let (width, height) = (240, 160);
        let ink_left_of_bars = |counts: &[NamedCount]| {
            let buffer = draw_at(width, height, |area| draw_named_counts(area, counts));
            let bar_start = first_column_of(&buffer, width, palette::series(0));
            // The value axis sits one column left of the bars at most.
            ink_in_columns(&buffer, width, 0, bar_start.saturating_sub(2))
        };
        assert!(ink_left_of_bars(&[named("N1KDO", 40), named("W1AW", 10)]) > 0);
        assert_eq!(ink_left_of_bars(&[named("", 40), named("", 10)]), 0);
    }

    #[test]
    fn small_areas_draw_no_text() {
        let counts = vec![named("N1KDO", 40)];
        let buffer = draw_at(64, 48, |area| draw_named_counts(area, &counts));
        let text = [palette::TEXT.0, palette::TEXT.1, palette::TEXT.2];
        assert!(buffer.chunks_exact(3).all(|px| px != text));
    }

    #[test]
    fn empty_inputs_draw_only_axes() {
        let buffer = draw_with(|area| draw_named_counts(area, &[]));
        assert!(count_color(&buffer, palette::AXIS) > 0);
        assert_eq!(count_color(&buffer, palette::series(0)), 0);

        let buffer = draw_with(|area| draw_rates_chart(area, &HourlyBandRates::default()));
        assert!(count_color(&buffer, palette::AXIS) > 0);
    }

    #[test]
    fn bands_chart_colours_only_worked_bands() {
        let mut table = BandModeTable::default();
        table.add(4, 1, 25);
        let buffer = draw_with(|area| draw_bands(area, &table));
        assert!(count_color(&buffer, palette::series(4)) > 0);
        assert_eq!(count_color(&buffer, palette::series(3)), 0);
    }

    #[test]
    fn worked_slots_skip_idle_ones_and_keep_their_ids() {
        let mut table = BandModeTable::default();
        table.add(4, 1, 25);
        table.add(99, 1, 2);
        let bars = worked_slots(&table.band_totals(), &BANDS);
        let labels: Vec<&str> = bars.iter().map(|bar| bar.label.as_str()).collect();
        assert_eq!(labels, vec!["N/A", "20m"]);
        assert_eq!(bars[1].color, palette::series(4));
        assert_eq!(bars[1].value, 25);
    }

    #[test]
    fn modes_chart_draws_each_mode_total() {
        let mut table = BandModeTable::default();
        table.add(4, 1, 10);
        table.add(5, 2, 10);
        let buffer = draw_with(|area| draw_modes(area, &table));
        assert!(count_color(&buffer, palette::series(1)) > 0);
        assert!(count_color(&buffer, palette::series(2)) > 0);
        assert_eq!(count_color(&buffer, palette::series(3)), 0);
    }

    #[test]
    fn stacked_hours_use_band_colours() {
        let mut per_band = vec![0; BANDS.len()];
        per_band[3] = 5;
        per_band[4] = 5;
        let rates = HourlyBandRates {
            hours: vec![HourRow {
                hour_start: 0,
                per_band: per_band.clone(),
            }],
            band_totals: per_band,
        };
        let buffer = draw_with(|area| draw_rates_chart(area, &rates));
        assert!(count_color(&buffer, palette::series(3)) > 0);
        assert!(count_color(&buffer, palette::series(4)) > 0);
    }

    #[test]
    fn operator_rates_draw_both_windows() {
        let rates = vec![OperatorRate {
            operator: "N1KDO".to_string(),
            last_hour: 60,
            last_15_minutes: 15,
        }];
        let buffer = draw_with(|area| draw_operator_rates(area, &rates));
        let hour = count_color(&buffer, LAST_HOUR);
        let quarter = count_color(&buffer, LAST_15_MINUTES);
        assert!(hour > quarter && quarter > 0, "hour={hour} quarter={quarter}");
    }

    #[test]
    fn slot_centres_are_evenly_spaced_inside_the_margin() {
        assert_eq!(slot_centre(100, 0, 0, 2), 25);
        assert_eq!(slot_centre(100, 0, 1, 2), 75);
        assert_eq!(slot_centre(100, 10, 0, 1), 50);
        assert_eq!(slot_size(100, 10, 4), 20);
        assert_eq!(slot_size(100, 10, 0), 80);
    }
}
