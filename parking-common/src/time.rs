//! Local date/time utilities
//!
//! Visit dates are stored as `YYYY-MM-DD` text and insertion times as
//! `HH:MM:SS`, both in the facility's local time zone.

use chrono::{Local, NaiveDate};

use crate::{Error, Result};

/// Storage format for visit dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Storage format for insertion times
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// Today's local date as `YYYY-MM-DD`
pub fn today() -> String {
    Local::now().format(DATE_FORMAT).to_string()
}

/// Current local time of day as `HH:MM:SS`
pub fn now_time_of_day() -> String {
    Local::now().format(TIME_FORMAT).to_string()
}

/// Parse a client-supplied date, returning its canonical `YYYY-MM-DD` form
///
/// Returns `None` for anything that is not a real calendar date.
pub fn parse_date(raw: &str) -> Option<String> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .ok()
        .map(|d| d.format(DATE_FORMAT).to_string())
}

/// Canonical `YYYY-MM-DD` form of a date, or `InvalidInput`
///
/// Every date that reaches the ledger goes through here, so stored dates
/// compare, group and name sheets consistently.
pub fn canonical_date(raw: &str) -> Result<String> {
    parse_date(raw).ok_or_else(|| Error::InvalidInput(format!("not a YYYY-MM-DD date: {:?}", raw)))
}
