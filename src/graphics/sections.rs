//! Tile positions for the section map.
//!
//! ARRL and RAC sections laid out on a coarse grid, west to east and north
//! to south. It is a cartogram: every section gets one equal tile, so small
//! dense sections stay readable next to large empty ones.

/// Grid width in tiles.
pub const GRID_COLUMNS: u32 = 16;
/// Grid height in tiles.
pub const GRID_ROWS: u32 = 10;

/// `(section, column, row)` for every known section.
pub const SECTION_TILES: [(&str, u32, u32); 85] = [
    // ──── row 0 ────
    ("AK", 0, 0),
    ("TER", 1, 0),
    ("NL", 15, 0),
    // ──── row 1 ────
    ("BC", 0, 1),
    ("AB", 1, 1),
    ("SK", 2, 1),
    ("MB", 3, 1),
    ("ONN", 7, 1),
    ("QC", 11, 1),
    ("NB", 13, 1),
    ("PE", 14, 1),
    ("NS", 15, 1),
    // ──── row 2 ────
    ("WWA", 0, 2),
    ("EWA", 1, 2),
    ("MT", 2, 2),
    ("ND", 3, 2),
    ("MN", 4, 2),
    ("WI", 6, 2),
    ("ONS", 7, 2),
    ("GH", 8, 2),
    ("ONE", 9, 2),
    ("NNY", 10, 2),
    ("VT", 11, 2),
    ("NH", 12, 2),
    ("ME", 13, 2),
    // ──── row 3 ────
    ("OR", 0, 3),
    ("ID", 1, 3),
    ("WY", 2, 3),
    ("SD", 3, 3),
    ("IA", 4, 3),
    ("MI", 6, 3),
    ("WNY", 9, 3),
    ("ENY", 10, 3),
    ("WMA", 11, 3),
    ("EMA", 12, 3),
    ("RI", 13, 3),
    // ──── row 4 ────
    ("SV", 0, 4),
    ("NV", 1, 4),
    ("UT", 2, 4),
    ("NE", 3, 4),
    ("IL", 5, 4),
    ("IN", 6, 4),
    ("OH", 7, 4),
    ("WPA", 8, 4),
    ("EPA", 9, 4),
    ("NNJ", 10, 4),
    ("CT", 11, 4),
    ("NLI", 12, 4),
    // ──── row 5 ────
    ("SF", 0, 5),
    ("EB", 1, 5),
    ("CO", 2, 5),
    ("KS", 3, 5),
    ("MO", 4, 5),
    ("KY", 6, 5),
    ("WV", 7, 5),
    ("MDC", 8, 5),
    ("SNJ", 9, 5),
    ("DE", 10, 5),
    // ──── row 6 ────
    ("SCV", 0, 6),
    ("SJV", 1, 6),
    ("AZ", 2, 6),
    ("NM", 3, 6),
    ("OK", 4, 6),
    ("AR", 5, 6),
    ("TN", 6, 6),
    ("VA", 7, 6),
    ("NC", 8, 6),
    // ──── row 7 ────
    ("SB", 0, 7),
    ("LAX", 1, 7),
    ("WTX", 2, 7),
    ("NTX", 3, 7),
    ("LA", 4, 7),
    ("MS", 5, 7),
    ("AL", 6, 7),
    ("GA", 7, 7),
    ("SC", 8, 7),
    // ──── row 8 ────
    ("ORG", 1, 8),
    ("SDG", 2, 8),
    ("STX", 3, 8),
    ("NFL", 7, 8),
    // ──── row 9 ────
    ("PAC", 0, 9),
    ("WCF", 7, 9),
    ("SFL", 8, 9),
    ("PR", 11, 9),
    ("VI", 12, 9),
];

/// Grid position of `section`, matched case-insensitively.
#[must_use]
pub fn tile_for(section: &str) -> Option<(u32, u32)> {
    let section = section.trim();
    SECTION_TILES
        .iter()
        .find(|(name, _, _)| name.eq_ignore_ascii_case(section))
        .map(|&(_, column, row)| (column, row))
}
