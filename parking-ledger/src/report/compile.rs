//! Report assembly from ledger aggregates
//!
//! The `build_*` functions are pure and take query results directly; the
//! `compile_*` functions run the queries first.

use std::collections::{BTreeMap, HashMap};

use parking_common::db::models::PlateStats;
use parking_common::time::canonical_date;
use parking_common::{PlateIdentity, Result};
use sqlx::SqlitePool;
use tracing::{info, warn};

use super::document::{sheet_name_for_date, Sheet, TabularDocument, SUMMARY_SHEET};
use crate::db;

/// Single-sheet report for one date
///
/// One row per plate recorded on `date`, carrying that plate's all-time
/// statistics, ordered by plate.
pub async fn compile_day_report(pool: &SqlitePool, date: &str) -> Result<TabularDocument> {
    let date = canonical_date(date)?;
    let stats = db::day_plate_stats(pool, &date).await?;
    let document = build_day_report(&date, &stats);

    info!("Compiled day report for {} ({} plates)", date, stats.len());
    Ok(document)
}

/// Summary sheet plus one sheet per date in history
pub async fn compile_full_report(pool: &SqlitePool) -> Result<TabularDocument> {
    let summary = db::summary_by_plate(pool).await?;
    let history = db::history_grouped_by_date(pool).await?;
    let document = build_full_report(&summary, &history);

    info!(
        "Compiled full report ({} plates, {} dates)",
        summary.len(),
        history.len()
    );
    Ok(document)
}

/// Assemble the day report from precomputed statistics
pub fn build_day_report(date: &str, stats: &[PlateStats]) -> TabularDocument {
    let mut sheet = Sheet::stats(sheet_name_for_date(date));
    for row in stats {
        sheet.push_stats(row);
    }

    let mut document = TabularDocument::new();
    document.push_sheet(sheet);
    document
}

/// Assemble the full report from the per-plate summary and grouped history
///
/// Date sheets look each plate up in the summary. A plate missing from the
/// summary (history and summary read at different moments) gets a
/// single-visit row for that date. Dates whose sheet names collide get
/// numbered names, so every date keeps its own sheet.
pub fn build_full_report(
    summary: &[PlateStats],
    history: &BTreeMap<String, Vec<PlateIdentity>>,
) -> TabularDocument {
    let mut document = TabularDocument::new();

    let mut summary_sheet = Sheet::stats(SUMMARY_SHEET);
    for row in summary {
        summary_sheet.push_stats(row);
    }
    document.push_sheet(summary_sheet);

    let by_plate: HashMap<&PlateIdentity, &PlateStats> =
        summary.iter().map(|s| (&s.plate, s)).collect();

    for (date, plates) in history {
        let base = sheet_name_for_date(date);
        let name = document.unused_sheet_name(&base);
        if name != base {
            warn!("Sheet name {:?} already used, {} goes to {:?}", base, date, name);
        }

        let mut sheet = Sheet::stats(name);
        for plate in plates {
            match by_plate.get(plate) {
                Some(stats) => sheet.push_stats(stats),
                None => {
                    warn!("{} on {} has no summary row, using single visit", plate, date);
                    sheet.push_stats(&PlateStats::single_visit(plate.clone(), date));
                }
            }
        }
        document.push_sheet(sheet);
    }

    document
}
