//! Ledger store and query engine
//!
//! Every function takes the pool explicitly; the caller owns its lifecycle.
//! All SQL is static with bound parameters.

use parking_common::{normalize, Error, PlateIdentity, Result};

pub mod queries;
pub mod visits;

pub use queries::{
    daily_roster, day_plate_stats, history_grouped_by_date, plate_stats, summary_by_plate,
};
pub use visits::{all_distinct_plates, delete_visit, get_visit, insert_visits, insert_visits_with_memo};

/// Rebuild a plate identity read back from the `plate` column
///
/// Only normalized plates are ever written, so a failure here means the
/// file was edited outside the ledger.
pub(crate) fn stored_plate(raw: String) -> Result<PlateIdentity> {
    normalize(&raw).map_err(|e| Error::Internal(format!("ledger holds {}", e)))
}
