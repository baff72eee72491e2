#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Event storage for the quake risk map.
//!
//! Defines the [`EventRepository`] and [`StatisticsStore`] collaborator
//! traits the HTTP layer depends on, and a `DuckDB` implementation of
//! both in [`store`]. Calls are blocking; async callers run them on a
//! blocking pool.

pub mod import;
pub mod paths;
pub mod store;

use std::collections::BTreeMap;

use quake_risk_database_models::{EventQuery, LabelAggregate, SortDirection, SortKey};
use quake_risk_event_models::{EventRecord, SeverityLabel};

pub use store::DuckDbStore;

/// Errors that can occur during database operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// `DuckDB` error.
    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Catalog file could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Data conversion error.
    #[error("Data conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },

    /// A thread panicked while holding the connection.
    #[error("Database connection lock poisoned")]
    LockPoisoned,
}

/// Read access to the event catalog, plus batch insert for import.
pub trait EventRepository: Send + Sync {
    /// Returns events matching every filter set in `query`, ordered by
    /// insertion.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the query fails or a stored row is invalid.
    fn query(&self, query: &EventQuery) -> Result<Vec<EventRecord>, DbError>;

    /// Aggregates magnitude and depth over events carrying `label`.
    /// Returns `None` when there are no such events.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the query fails.
    fn aggregate_by_label(&self, label: SeverityLabel) -> Result<Option<LabelAggregate>, DbError>;

    /// Returns the first event when ordered by `key` in `direction`, ties
    /// broken by insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the query fails or the row is invalid.
    fn extreme(
        &self,
        key: SortKey,
        direction: SortDirection,
    ) -> Result<Option<EventRecord>, DbError>;

    /// Appends events to the catalog. Returns the number inserted.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the insert fails.
    fn insert_events(&self, events: &[EventRecord]) -> Result<u64, DbError>;
}

/// Persisted per-region event counts with last-writer-wins upserts.
pub trait StatisticsStore: Send + Sync {
    /// Sets the count for `region`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the upsert fails.
    fn upsert(&self, region: &str, count: u64) -> Result<(), DbError>;

    /// Upserts every entry. Returns the number of regions written.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if any upsert fails.
    fn upsert_all(&self, counts: &BTreeMap<String, u64>) -> Result<u64, DbError> {
        for (region, count) in counts {
            self.upsert(region, *count)?;
        }
        Ok(counts.len() as u64)
    }

    /// Returns all stored counts keyed by region name.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the query fails.
    fn read_all(&self) -> Result<BTreeMap<String, u64>, DbError>;
}
