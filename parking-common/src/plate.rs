//! License plate normalization
//!
//! Operators type plates by hand, so the same vehicle shows up as `11저8604`,
//! `11저 8604` or ` 11 저 8604 `. Every form collapses to one canonical
//! identity: `<2-3 digits><one Hangul syllable> <4 digits>`.
//!
//! A string that does not fit the pattern has no identity. That is an
//! expected outcome during manual entry, so [`normalize`] reports it as a
//! [`RejectedPlate`] value rather than failing loudly.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix group (2-3 digits + Hangul syllable) and 4-digit suffix
static PLATE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{2,3}[가-힣])([0-9]{4})$").expect("Invalid plate regex")
});

/// Canonical plate identity, e.g. `"11저 8604"`
///
/// Only obtainable through [`normalize`], so holding one proves the text
/// matched the plate pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlateIdentity(String);

impl PlateIdentity {
    /// Canonical text form
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Digits plus Hangul syllable, e.g. `"11저"`
    pub fn prefix(&self) -> &str {
        self.0.split_once(' ').map(|(p, _)| p).unwrap_or(&self.0)
    }

    /// Trailing four digits, e.g. `"8604"`
    pub fn suffix(&self) -> &str {
        self.0.split_once(' ').map(|(_, s)| s).unwrap_or("")
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for PlateIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PlateIdentity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PlateIdentity {
    type Error = RejectedPlate;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        normalize(&raw)
    }
}

impl TryFrom<&str> for PlateIdentity {
    type Error = RejectedPlate;

    fn try_from(raw: &str) -> Result<Self, Self::Error> {
        normalize(raw)
    }
}

impl From<PlateIdentity> for String {
    fn from(plate: PlateIdentity) -> Self {
        plate.0
    }
}

/// Why a raw string has no plate identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Nothing left after stripping whitespace
    Empty,
    /// Wrong digit counts, missing or extra syllable, non-numeric suffix
    Malformed,
}

/// A raw plate string that failed normalization
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("not a valid plate: {raw:?} ({reason:?})")]
pub struct RejectedPlate {
    pub raw: String,
    pub reason: RejectReason,
}

/// Normalize raw operator input into a canonical [`PlateIdentity`]
///
/// Strips all whitespace, matches `^([0-9]{2,3}[가-힣])([0-9]{4})$` and
/// re-inserts exactly one space between the two groups.
pub fn normalize(raw: &str) -> Result<PlateIdentity, RejectedPlate> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();

    if compact.is_empty() {
        return Err(RejectedPlate {
            raw: raw.to_string(),
            reason: RejectReason::Empty,
        });
    }

    match PLATE_PATTERN.captures(&compact) {
        Some(caps) => Ok(PlateIdentity(format!("{} {}", &caps[1], &caps[2]))),
        None => Err(RejectedPlate {
            raw: raw.to_string(),
            reason: RejectReason::Malformed,
        }),
    }
}
