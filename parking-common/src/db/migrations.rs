//! Database schema migrations
//!
//! Versioned, run once each, tracked in `schema_version`.
//!
//! # Migration Guidelines
//!
//! 1. **Never modify existing migrations** - ledgers in the field depend on them
//! 2. **Always add new migrations** - one function per schema change
//! 3. **Make each step idempotent** - check before altering

use crate::plate::normalize;
use crate::time::DATE_FORMAT;
use crate::Result;
use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::{info, warn};

/// Current schema version
///
/// **IMPORTANT:** Increment this when adding new migrations
const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Name the pre-ledger table is renamed to once imported
pub const LEGACY_ARCHIVE_TABLE: &str = "records_legacy";

/// Date layouts accepted from legacy `records.date`
const LEGACY_DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];

/// Canonical `YYYY-MM-DD` form of a legacy date, `None` if unreadable
fn legacy_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    LEGACY_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .map(|date| date.format(DATE_FORMAT).to_string())
}

/// Get current schema version from database
///
/// Returns 0 if schema_version table doesn't exist or has no rows
pub async fn get_schema_version(pool: &SqlitePool) -> Result<i32> {
    if !table_exists(pool, "schema_version").await? {
        return Ok(0);
    }

    let version: Option<i32> =
        sqlx::query_scalar("SELECT version FROM schema_version ORDER BY version DESC LIMIT 1")
            .fetch_optional(pool)
            .await?;

    Ok(version.unwrap_or(0))
}

async fn set_schema_version(pool: &SqlitePool, version: i32) -> Result<()> {
    sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await?;

    Ok(())
}

async fn table_exists(pool: &SqlitePool, name: &str) -> Result<bool> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?)",
    )
    .bind(name)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

/// Run all pending migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    let current_version = get_schema_version(pool).await?;

    if current_version == CURRENT_SCHEMA_VERSION {
        info!("Database schema is up to date (v{})", current_version);
        return Ok(());
    }

    if current_version > CURRENT_SCHEMA_VERSION {
        warn!(
            "Database schema version ({}) is newer than code version ({})",
            current_version, CURRENT_SCHEMA_VERSION
        );
        return Ok(());
    }

    info!(
        "Running database migrations: v{} -> v{}",
        current_version, CURRENT_SCHEMA_VERSION
    );

    if current_version < 1 {
        migrate_v1(pool).await?;
        set_schema_version(pool, 1).await?;
        info!("Migration v1 completed");
    }

    Ok(())
}

/// Migration v1: import the loose `records(id, date, plate)` table
///
/// Older deployments stored every submission verbatim, with no plate
/// validation and no (date, plate) uniqueness. Plates and dates are
/// normalized and folded into `visits`; rows with a malformed plate or an
/// unreadable date, and same-day repeats, are dropped. The old table is
/// kept under [`LEGACY_ARCHIVE_TABLE`].
async fn migrate_v1(pool: &SqlitePool) -> Result<()> {
    if !table_exists(pool, "records").await? {
        return Ok(());
    }

    let rows: Vec<(i64, Option<String>, Option<String>)> =
        sqlx::query_as("SELECT id, date, plate FROM records ORDER BY id")
            .fetch_all(pool)
            .await?;

    let mut imported = 0u64;
    let mut skipped_invalid = 0u64;
    let mut skipped_duplicate = 0u64;

    let mut tx = pool.begin().await?;
    for (id, date, raw_plate) in rows {
        let raw_date = date.unwrap_or_default();
        let raw_plate = raw_plate.unwrap_or_default();
        let (date, plate) = match (legacy_date(&raw_date), normalize(&raw_plate)) {
            (Some(date), Ok(plate)) => (date, plate),
            _ => {
                warn!(
                    "Migration v1: dropping legacy record {} ({:?} on {:?})",
                    id, raw_plate, raw_date
                );
                skipped_invalid += 1;
                continue;
            }
        };

        let result = sqlx::query(
            "INSERT INTO visits (date, time, plate, memo) VALUES (?, NULL, ?, '') \
             ON CONFLICT(date, plate) DO NOTHING",
        )
        .bind(&date)
        .bind(plate.as_str())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            skipped_duplicate += 1;
        } else {
            imported += 1;
        }
    }

    let rename_sql = format!("ALTER TABLE records RENAME TO {}", LEGACY_ARCHIVE_TABLE);
    sqlx::query(&rename_sql).execute(&mut *tx).await?;
    tx.commit().await?;

    info!(
        "Migration v1: imported {} legacy records ({} invalid, {} duplicate)",
        imported, skipped_invalid, skipped_duplicate
    );
    Ok(())
}
