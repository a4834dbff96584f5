//! Format-neutral workbook model

use parking_common::db::models::PlateStats;
use parking_common::{Error, Result};
use serde::Serialize;

/// Longest sheet name spreadsheet formats accept
pub const MAX_SHEET_NAME_LEN: usize = 31;

/// Name of the all-plates sheet in a full export
pub const SUMMARY_SHEET: &str = "Summary";

/// Column headers of every statistics sheet
pub const STATS_HEADER: [&str; 4] = ["plate", "total_count", "first_date", "last_date"];

/// A single cell value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Number(i64),
    Empty,
}

impl Cell {
    fn optional_text(value: &Option<String>) -> Self {
        match value {
            Some(text) => Cell::Text(text.clone()),
            None => Cell::Empty,
        }
    }
}

/// Presentation rules every exported sheet must satisfy
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SheetFormat {
    pub header_bold: bool,
    /// Horizontal and vertical centering on every cell
    pub center_aligned: bool,
    /// Thin border on all four sides of every cell
    pub thin_border: bool,
    /// Fixed width of every column, in character units
    pub column_width: f64,
}

impl SheetFormat {
    pub const STANDARD: SheetFormat = SheetFormat {
        header_bold: true,
        center_aligned: true,
        thin_border: true,
        column_width: 15.0,
    };
}

impl Default for SheetFormat {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// One named sheet: a header row followed by data rows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sheet {
    pub name: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
    pub format: SheetFormat,
}

impl Sheet {
    pub fn new(name: impl Into<String>, header: &[&str]) -> Self {
        Self {
            name: name.into(),
            header: header.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
            format: SheetFormat::STANDARD,
        }
    }

    /// Empty sheet with the plate statistics header
    pub fn stats(name: impl Into<String>) -> Self {
        Self::new(name, &STATS_HEADER)
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    /// Append `[plate, total_count, first_date, last_date]`
    pub fn push_stats(&mut self, stats: &PlateStats) {
        self.push_row(vec![
            Cell::Text(stats.plate.to_string()),
            Cell::Number(stats.total_count),
            Cell::optional_text(&stats.first_date),
            Cell::optional_text(&stats.last_date),
        ]);
    }

    /// Data rows, excluding the header
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Widest of the header and every data row
    pub fn column_count(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.header.len()))
            .max()
            .unwrap_or(0)
    }
}

/// An ordered collection of sheets
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TabularDocument {
    pub sheets: Vec<Sheet>,
}

impl TabularDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_sheet(&mut self, sheet: Sheet) {
        self.sheets.push(sheet);
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    /// `base` if no sheet has that name yet, otherwise `base (2)`, `base (3)`, ...
    ///
    /// Names compare case-insensitively, as spreadsheet applications do.
    /// The numbered form is cut so it still fits [`MAX_SHEET_NAME_LEN`].
    pub fn unused_sheet_name(&self, base: &str) -> String {
        let taken = |name: &str| {
            let name = name.to_lowercase();
            self.sheets.iter().any(|s| s.name.to_lowercase() == name)
        };

        if !taken(base) {
            return base.to_string();
        }

        let mut n = 2;
        loop {
            let suffix = format!(" ({})", n);
            let keep = MAX_SHEET_NAME_LEN - suffix.chars().count();
            let candidate: String = base.chars().take(keep).chain(suffix.chars()).collect();
            if !taken(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}

/// Characters spreadsheet formats refuse in sheet names
const FORBIDDEN_SHEET_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

/// Sheet name for a date
///
/// Forbidden characters (`/` included) become `-`, surrounding apostrophes
/// are dropped, and the result is cut to 31 characters.
pub fn sheet_name_for_date(date: &str) -> String {
    let cleaned: String = date
        .trim()
        .chars()
        .map(|c| if FORBIDDEN_SHEET_CHARS.contains(&c) { '-' } else { c })
        .collect();
    let name: String = cleaned
        .trim_matches('\'')
        .chars()
        .take(MAX_SHEET_NAME_LEN)
        .collect();

    if name.is_empty() {
        "Sheet".to_string()
    } else {
        name
    }
}

/// Which export the caller asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportScope {
    /// One sheet for a single date
    Day(String),
    /// Summary sheet plus one sheet per date
    All,
}

impl ReportScope {
    /// Interpret the `scope` / `date` request pair
    ///
    /// `day` without a date falls back to a full export. A missing scope
    /// means `day`.
    pub fn from_request(scope: Option<&str>, date: Option<&str>) -> Result<Self> {
        let date = date.map(str::trim).filter(|d| !d.is_empty());

        match scope.map(str::trim).unwrap_or("day") {
            "day" => Ok(match date {
                Some(date) => ReportScope::Day(date.to_string()),
                None => ReportScope::All,
            }),
            "all" => Ok(ReportScope::All),
            other => Err(Error::InvalidInput(format!("unknown export scope: {}", other))),
        }
    }

    /// Download name: `<date>.xlsx`, or `<today>.xlsx` for a full export
    pub fn filename(&self, today: &str) -> String {
        match self {
            ReportScope::Day(date) => format!("{}.xlsx", sheet_name_for_date(date)),
            ReportScope::All => format!("{}.xlsx", today),
        }
    }
}
