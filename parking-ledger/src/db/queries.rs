//! Read-only aggregates over the visit ledger
//!
//! Nothing here is cached: each call is a direct scan/aggregate, so results
//! always reflect the ledger as of the query.

use std::collections::BTreeMap;

use parking_common::db::models::{DailyRoster, PlateStats, RosterEntry};
use parking_common::time::canonical_date;
use parking_common::{PlateIdentity, Result};
use sqlx::SqlitePool;
use tracing::debug;

use super::stored_plate;

type StatsRow = (String, i64, Option<String>, Option<String>);

fn stats_from_row((plate, total_count, first_date, last_date): StatsRow) -> Result<PlateStats> {
    Ok(PlateStats {
        plate: stored_plate(plate)?,
        total_count,
        first_date,
        last_date,
    })
}

/// Vehicles recorded on `date`
///
/// Ordered by insertion time, ties broken by plate. Each entry carries the
/// plate's all-time visit count, not a count scoped to `date`.
pub async fn daily_roster(pool: &SqlitePool, date: &str) -> Result<DailyRoster> {
    let date = canonical_date(date)?;
    let rows: Vec<(i64, String, i64)> = sqlx::query_as(
        r#"
        SELECT
            v.id,
            v.plate,
            (SELECT COUNT(*) FROM visits t WHERE t.plate = v.plate) AS total_count
        FROM visits v
        WHERE v.date = ?
        ORDER BY v.time, v.plate, v.id
        "#,
    )
    .bind(&date)
    .fetch_all(pool)
    .await?;

    let entries = rows
        .into_iter()
        .map(|(id, plate, total_count)| {
            Ok(RosterEntry {
                id,
                plate: stored_plate(plate)?,
                total_count,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    debug!("Roster for {}: {} vehicles", date, entries.len());
    Ok(DailyRoster {
        date,
        entries,
    })
}

/// All-time statistics for one plate
///
/// An unknown plate is a normal answer: zero visits, no dates.
pub async fn plate_stats(pool: &SqlitePool, plate: &PlateIdentity) -> Result<PlateStats> {
    // Aggregate without GROUP BY always yields exactly one row
    let (total_count, first_date, last_date): (i64, Option<String>, Option<String>) =
        sqlx::query_as("SELECT COUNT(*), MIN(date), MAX(date) FROM visits WHERE plate = ?")
            .bind(plate.as_str())
            .fetch_one(pool)
            .await?;

    if total_count == 0 {
        return Ok(PlateStats::unseen(plate.clone()));
    }

    Ok(PlateStats {
        plate: plate.clone(),
        total_count,
        first_date,
        last_date,
    })
}

/// One row per distinct plate, ordered by plate
pub async fn summary_by_plate(pool: &SqlitePool) -> Result<Vec<PlateStats>> {
    let rows: Vec<StatsRow> = sqlx::query_as(
        r#"
        SELECT plate, COUNT(*), MIN(date), MAX(date)
        FROM visits
        GROUP BY plate
        ORDER BY plate
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(stats_from_row).collect()
}

/// Plates recorded on `date`, each with all-time statistics, ordered by plate
pub async fn day_plate_stats(pool: &SqlitePool, date: &str) -> Result<Vec<PlateStats>> {
    let date = canonical_date(date)?;
    let rows: Vec<StatsRow> = sqlx::query_as(
        r#"
        SELECT v.plate, COUNT(*), MIN(a.date), MAX(a.date)
        FROM visits v
        JOIN visits a ON a.plate = v.plate
        WHERE v.date = ?
        GROUP BY v.plate
        ORDER BY v.plate
        "#,
    )
    .bind(date)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(stats_from_row).collect()
}

/// Every visit grouped by date
///
/// Dates ascend; within a date plates keep insertion order.
pub async fn history_grouped_by_date(
    pool: &SqlitePool,
) -> Result<BTreeMap<String, Vec<PlateIdentity>>> {
    let rows: Vec<(String, String)> =
        sqlx::query_as("SELECT date, plate FROM visits ORDER BY date, id")
            .fetch_all(pool)
            .await?;

    let mut grouped: BTreeMap<String, Vec<PlateIdentity>> = BTreeMap::new();
    for (date, plate) in rows {
        grouped.entry(date).or_default().push(stored_plate(plate)?);
    }

    Ok(grouped)
}
