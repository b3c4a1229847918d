//! # Storage Module
//!
//! Persistence for the commission tracker. The domain never depends on this
//! module; the `Backend` calls into it after each successful mutation.

pub mod csv;
pub mod traits;

pub use self::csv::CsvConnection;
pub use traits::{Connection, SettingsStorage, StoredSettings, TransactionStorage};
