//! Text tables: band/mode summary, operator rates, operator totals.
//!
//! A heading row, the body, and a total row. The first column is left
//! aligned, numbers are right aligned. Rows that do not fit are dropped from
//! the bottom of the body; the heading and total always show.

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::HPos;
use tracing::debug;

use crate::data::aggregates::{BandModeTable, NamedCount, OperatorRate};
use crate::data::schema::{BANDS, MODES};
use crate::graphics::charts::DrawResult;
use crate::graphics::{palette, text};

/// Mode columns of the summary table, by mode id. `N/A` goes last.
const SUMMARY_MODES: [usize; 4] = [1, 2, 3, 0];

fn row_height(line: u32) -> u32 {
    line + line / 3
}

/// Body rows that fit under the heading and above the total, or `None` when
/// not even those two fit.
fn body_capacity(height: u32, line: u32) -> Option<usize> {
    let pad = line / 2;
    let rows = height.saturating_sub(2 * pad) / row_height(line);
    rows.checked_sub(2).and_then(|body| usize::try_from(body).ok())
}

/// Widths of the name column and of each number column.
fn column_widths(width: u32, line: u32, columns: usize) -> (u32, u32) {
    let inner = width.saturating_sub(line / 2 * 2);
    let first = inner * 2 / 5;
    let numbers = u32::try_from(columns.saturating_sub(1).max(1)).unwrap_or(u32::MAX);
    (first, (inner - first) / numbers)
}

/// Shrink `line` until the widest cell of every column fits its column.
/// `None` when that would make the text illegible.
fn fit_columns<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    header: &[&str],
    body: &[Vec<String>],
    total: &[String],
    line: u32,
) -> Result<Option<u32>, DrawingAreaErrorKind<DB::ErrorType>> {
    let (first, other) = column_widths(area.dim_in_pixel().0, line, header.len());
    let mut fitted = line;
    for (column, heading) in header.iter().enumerate() {
        let mut cells: Vec<&str> = vec![heading];
        cells.extend(
            body.iter()
                .map(Vec::as_slice)
                .chain(std::iter::once(total))
                .filter_map(|row| row.get(column))
                .map(String::as_str),
        );
        let widest = text::widest(area, &cells, line)?;
        let room = if column == 0 { first } else { other }.saturating_sub(line / 4);
        if widest > room {
            let scaled = u64::from(line) * u64::from(room) / u64::from(widest);
            fitted = fitted.min(u32::try_from(scaled).unwrap_or(0));
        }
    }
    Ok(text::usable(fitted))
}

/// Draw `header`, as many `body` rows as fit, and `total`.
pub fn draw_table<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    header: &[&str],
    body: &[Vec<String>],
    total: &[String],
) -> DrawResult<DB> {
    let (width, height) = area.dim_in_pixel();
    let Some(line) = text::line_for((width, height)) else {
        debug!("{width}x{height} is too small for a table");
        return Ok(());
    };
    let Some(line) = fit_columns(area, header, body, total, line)? else {
        debug!("{width}x{height} is too narrow for the table columns");
        return Ok(());
    };
    let Some(capacity) = body_capacity(height, line) else {
        debug!("{width}x{height} has no room for table rows");
        return Ok(());
    };
    let shown = body.len().min(capacity);
    if shown < body.len() {
        debug!("table shows {shown} of {} rows", body.len());
    }

    let pad = line / 2;
    let row = row_height(line);
    let (first, other) = column_widths(width, line, header.len());
    let right_of = |column: usize| {
        let column = u32::try_from(column).unwrap_or(u32::MAX);
        pad + first + column * other - pad / 2
    };
    let centre_of = |index: u32| text::px(pad + index * row + row / 2);

    let draw_row = |cells: &[&str], index: u32, color: &RGBColor| -> DrawResult<DB> {
        let y = centre_of(index);
        for (column, cell) in cells.iter().enumerate() {
            if column == 0 {
                text::label(area, cell, (text::px(pad), y), line, HPos::Left, color)?;
            } else {
                text::label(area, cell, (text::px(right_of(column)), y), line, HPos::Right, color)?;
            }
        }
        Ok(())
    };
    let rule = |index: u32| {
        let y = text::px(pad + index * row);
        area.draw(&PathElement::new(
            vec![(text::px(pad), y), (text::px(width - pad), y)],
            palette::HEADER.stroke_width(1),
        ))
    };

    draw_row(header, 0, &palette::HEADER)?;
    rule(1)?;
    let mut index = 1;
    for cells in &body[..shown] {
        let cells: Vec<&str> = cells.iter().map(String::as_str).collect();
        draw_row(&cells, index, &palette::TEXT)?;
        index += 1;
    }
    rule(index)?;
    let total: Vec<&str> = total.iter().map(String::as_str).collect();
    draw_row(&total, index, &palette::HEADER)
}

/// Contacts per worked band and mode, with row and column totals.
pub fn draw_summary_table<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    table: &BandModeTable,
) -> DrawResult<DB> {
    let mut header = vec!["Band"];
    header.extend(SUMMARY_MODES.iter().map(|&mode| MODES[mode]));
    header.push("Total");

    let body: Vec<Vec<String>> = table
        .band_totals()
        .iter()
        .enumerate()
        .filter(|&(_, &total)| total > 0)
        .map(|(band, &total)| {
            let mut cells = vec![BANDS[band].to_string()];
            cells.extend(SUMMARY_MODES.iter().map(|&mode| table.get(band, mode).to_string()));
            cells.push(total.to_string());
            cells
        })
        .collect();

    let mode_totals = table.mode_totals();
    let mut total = vec!["Total".to_string()];
    total.extend(SUMMARY_MODES.iter().map(|&mode| mode_totals[mode].to_string()));
    total.push(table.total().to_string());

    draw_table(area, &header, &body, &total)
}

/// Each operator's contacts in the last hour and last 15 minutes.
pub fn draw_rates_table<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    rates: &[OperatorRate],
) -> DrawResult<DB> {
    let body: Vec<Vec<String>> = rates
        .iter()
        .map(|rate| {
            vec![
                rate.operator.clone(),
                rate.last_hour.to_string(),
                rate.last_15_minutes.to_string(),
            ]
        })
        .collect();
    let total = vec![
        "Total".to_string(),
        rates.iter().map(|rate| rate.last_hour).sum::<u64>().to_string(),
        rates.iter().map(|rate| rate.last_15_minutes).sum::<u64>().to_string(),
    ];
    draw_table(area, &["Operator", "Last hour", "Last 15m"], &body, &total)
}

/// Contacts per operator, busiest first.
pub fn draw_operators_table<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    counts: &[NamedCount],
) -> DrawResult<DB> {
    let body: Vec<Vec<String>> = counts
        .iter()
        .map(|entry| vec![entry.name.clone(), entry.count.to_string()])
        .collect();
    let total = vec![
        "Total".to_string(),
        counts.iter().map(|entry| entry.count).sum::<u64>().to_string(),
    ];
    draw_table(area, &["Operator", "QSOs"], &body, &total)
}
