//! Visit persistence
//!
//! Append-only: rows are inserted once and may be hard-deleted, never
//! updated. (date, plate) uniqueness is enforced by the unique index and a
//! single `ON CONFLICT DO NOTHING` insert, so concurrent submissions of the
//! same plate cannot both land.

use parking_common::db::models::{InsertSummary, VisitEvent};
use parking_common::time::{canonical_date, now_time_of_day};
use parking_common::{normalize, PlateIdentity, Result};
use sqlx::SqlitePool;
use tracing::{debug, info};

use super::stored_plate;

/// Record a batch of raw plates for `date` with an empty memo
pub async fn insert_visits<S: AsRef<str>>(
    pool: &SqlitePool,
    date: &str,
    raw_plates: &[S],
) -> Result<InsertSummary> {
    insert_visits_with_memo(pool, date, raw_plates, "").await
}

/// Record a batch of raw plates for `date`
///
/// Each entry is handled on its own: a malformed plate bumps `invalid`, a
/// plate already recorded that day bumps `duplicated`, and neither stops
/// the rest of the batch. Storage failures abort the call; rows inserted
/// before the failure stay. `date` must be a `YYYY-MM-DD` calendar date and
/// is stored in that form.
pub async fn insert_visits_with_memo<S: AsRef<str>>(
    pool: &SqlitePool,
    date: &str,
    raw_plates: &[S],
    memo: &str,
) -> Result<InsertSummary> {
    let date = canonical_date(date)?;
    let date = date.as_str();

    let memo = memo.trim();
    let mut summary = InsertSummary::default();

    for raw in raw_plates {
        let plate = match normalize(raw.as_ref()) {
            Ok(plate) => plate,
            Err(rejected) => {
                debug!("Skipping {}", rejected);
                summary.invalid += 1;
                continue;
            }
        };

        if insert_one(pool, date, &plate, memo).await? {
            summary.added += 1;
        } else {
            debug!("{} already recorded on {}", plate, date);
            summary.duplicated += 1;
        }
    }

    info!(
        "Recorded visits for {}: {} added, {} duplicated, {} invalid",
        date, summary.added, summary.duplicated, summary.invalid
    );
    Ok(summary)
}

/// Insert one visit; `false` when (date, plate) already exists
async fn insert_one(
    pool: &SqlitePool,
    date: &str,
    plate: &PlateIdentity,
    memo: &str,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO visits (date, time, plate, memo)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(date, plate) DO NOTHING
        "#,
    )
    .bind(date)
    .bind(now_time_of_day())
    .bind(plate.as_str())
    .bind(memo)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Hard-delete a visit; `false` when no row had that id
pub async fn delete_visit(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM visits WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    let removed = result.rows_affected() > 0;
    if removed {
        info!("Deleted visit {}", id);
    } else {
        debug!("Delete of visit {} was a no-op", id);
    }
    Ok(removed)
}

/// Load one visit by id
pub async fn get_visit(pool: &SqlitePool, id: i64) -> Result<Option<VisitEvent>> {
    let row: Option<(i64, String, Option<String>, String, String)> =
        sqlx::query_as("SELECT id, date, time, plate, memo FROM visits WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;

    row.map(|(id, date, time, plate, memo)| {
        Ok(VisitEvent {
            id,
            date,
            time,
            plate: stored_plate(plate)?,
            memo,
        })
    })
    .transpose()
}

/// Every plate ever recorded, sorted and deduplicated
pub async fn all_distinct_plates(pool: &SqlitePool) -> Result<Vec<PlateIdentity>> {
    let plates: Vec<String> = sqlx::query_scalar("SELECT DISTINCT plate FROM visits ORDER BY plate")
        .fetch_all(pool)
        .await?;

    plates.into_iter().map(stored_plate).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::daily_roster;
    use parking_common::db::init::init_memory_database;
    use parking_common::Error;

    async fn count_rows(pool: &SqlitePool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM visits")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_blank_date_is_rejected_before_any_write() {
        let pool = init_memory_database().await.unwrap();

        let err = insert_visits(&pool, "  ", &["11저8604"]).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(count_rows(&pool).await, 0);
    }

    #[tokio::test]
    async fn test_non_iso_dates_are_rejected_before_any_write() {
        let pool = init_memory_database().await.unwrap();

        for date in ["2024/01/01", "2024:01:01", "2024-13-01", "[2024-01-01]"] {
            let err = insert_visits(&pool, date, &["11저8604"]).await.unwrap_err();
            assert!(matches!(err, Error::InvalidInput(_)), "accepted {:?}", date);
        }
        assert_eq!(count_rows(&pool).await, 0);
    }

    #[tokio::test]
    async fn test_padded_date_is_stored_canonical() {
        let pool = init_memory_database().await.unwrap();

        insert_visits(&pool, " 2024-01-01 ", &["11저8604"]).await.unwrap();
        let summary = insert_visits(&pool, "2024-01-01", &["11저8604"]).await.unwrap();
        assert_eq!(summary.duplicated, 1);

        let stored: String = sqlx::query_scalar("SELECT date FROM visits")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(stored, "2024-01-01");
        assert_eq!(daily_roster(&pool, " 2024-01-01 ").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_batch_is_all_zero() {
        let pool = init_memory_database().await.unwrap();

        let empty: [&str; 0] = [];
        let summary = insert_visits(&pool, "2024-01-01", &empty).await.unwrap();
        assert_eq!(summary, InsertSummary::default());
    }

    #[tokio::test]
    async fn test_blank_entries_count_as_invalid() {
        let pool = init_memory_database().await.unwrap();

        let summary = insert_visits(&pool, "2024-01-01", &["", "   ", "11저8604"])
            .await
            .unwrap();
        assert_eq!(summary.added, 1);
        assert_eq!(summary.invalid, 2);
    }

    #[tokio::test]
    async fn test_duplicate_within_one_batch() {
        let pool = init_memory_database().await.unwrap();

        let summary = insert_visits(&pool, "2024-01-01", &["11저8604", "11저 8604"])
            .await
            .unwrap();
        assert_eq!(summary.added, 1);
        assert_eq!(summary.duplicated, 1);
        assert_eq!(count_rows(&pool).await, 1);
    }

    #[tokio::test]
    async fn test_inserted_row_carries_time_and_memo() {
        let pool = init_memory_database().await.unwrap();

        insert_visits_with_memo(&pool, "2024-01-01", &["11저8604"], " visitor ")
            .await
            .unwrap();

        let visit = get_visit(&pool, 1).await.unwrap().expect("row 1 exists");
        assert_eq!(visit.date, "2024-01-01");
        assert_eq!(visit.plate.as_str(), "11저 8604");
        assert_eq!(visit.memo, "visitor");
        assert!(visit.time.is_some());
    }

    #[tokio::test]
    async fn test_duplicate_leaves_existing_row_untouched() {
        let pool = init_memory_database().await.unwrap();

        insert_visits_with_memo(&pool, "2024-01-01", &["11저8604"], "first")
            .await
            .unwrap();
        insert_visits_with_memo(&pool, "2024-01-01", &["11저8604"], "second")
            .await
            .unwrap();

        let visit = get_visit(&pool, 1).await.unwrap().unwrap();
        assert_eq!(visit.memo, "first");
    }

    #[tokio::test]
    async fn test_get_missing_visit() {
        let pool = init_memory_database().await.unwrap();
        assert!(get_visit(&pool, 42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_distinct_plates_sorted_across_dates() {
        let pool = init_memory_database().await.unwrap();

        insert_visits(&pool, "2024-01-01", &["145마9820", "11저8604"]).await.unwrap();
        insert_visits(&pool, "2024-01-02", &["11저8604"]).await.unwrap();

        let plates = all_distinct_plates(&pool).await.unwrap();
        let plates: Vec<&str> = plates.iter().map(PlateIdentity::as_str).collect();
        assert_eq!(plates, vec!["11저 8604", "145마 9820"]);
    }
}
