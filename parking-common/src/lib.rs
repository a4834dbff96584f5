//! # Parking Common Library
//!
//! Shared code for the parking visit ledger:
//! - Plate normalization (canonical plate identities)
//! - Database models, schema initialization and migrations
//! - Configuration loading
//! - Local date/time helpers

pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod plate;
pub mod time;

pub use error::{Error, Result};
pub use plate::{normalize, PlateIdentity, RejectedPlate};
