//! Ledger records and the aggregate views derived from them

use serde::{Deserialize, Serialize};

use crate::plate::PlateIdentity;

/// One recorded vehicle entry
///
/// At most one exists per (date, plate). Rows are never updated in place,
/// only created or hard-deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitEvent {
    pub id: i64,
    pub date: String,
    /// Local time of day the row was inserted; advisory only
    pub time: Option<String>,
    pub plate: PlateIdentity,
    pub memo: String,
}

/// Outcome counts of a batch insert
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertSummary {
    pub added: u32,
    pub duplicated: u32,
    pub invalid: u32,
}

impl InsertSummary {
    /// Number of raw entries processed
    pub fn total(&self) -> u32 {
        self.added + self.duplicated + self.invalid
    }

    /// Operator-facing status line
    pub fn message(&self) -> String {
        format!(
            "added {}, duplicated {}, invalid {}",
            self.added, self.duplicated, self.invalid
        )
    }
}

/// All-time statistics for one plate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlateStats {
    pub plate: PlateIdentity,
    pub total_count: i64,
    pub first_date: Option<String>,
    pub last_date: Option<String>,
}

impl PlateStats {
    /// Stats for a plate that has never been recorded
    pub fn unseen(plate: PlateIdentity) -> Self {
        Self {
            plate,
            total_count: 0,
            first_date: None,
            last_date: None,
        }
    }

    /// Stand-in row for a plate seen once, on `date`
    pub fn single_visit(plate: PlateIdentity, date: &str) -> Self {
        Self {
            plate,
            total_count: 1,
            first_date: Some(date.to_string()),
            last_date: Some(date.to_string()),
        }
    }
}

/// One row of a daily roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub id: i64,
    pub plate: PlateIdentity,
    /// Visits across all history, not just this day
    pub total_count: i64,
}

/// Vehicles recorded on one date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRoster {
    pub date: String,
    pub entries: Vec<RosterEntry>,
}

impl DailyRoster {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
