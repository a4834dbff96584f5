//! Tabular exports of ledger aggregates
//!
//! [`compile`] turns query results into a [`TabularDocument`], a
//! format-neutral workbook model; [`xlsx`] serializes that model.

pub mod compile;
pub mod document;
pub mod xlsx;

pub use compile::{build_day_report, build_full_report, compile_day_report, compile_full_report};
pub use document::{sheet_name_for_date, Cell, ReportScope, Sheet, SheetFormat, TabularDocument};
