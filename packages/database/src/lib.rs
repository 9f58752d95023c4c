#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Record store access for the conflict atlas.
//!
//! Uses `switchy_database` over `SQLite` for every query. Filters are built
//! with the [`filter::Conjunction`] builder and compiled into parameterized
//! `WHERE` clauses that run through `query_raw_params()`. The store is
//! read-only from this crate's point of view; [`schema::ensure_schema`]
//! only creates the tables when they are missing.

pub mod db;
pub mod filter;
pub mod queries;
pub mod rows;
pub mod schema;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use schema::ensure_schema;

/// Errors that can occur during database operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Database query error.
    #[error("Database error: {0}")]
    Database(#[from] switchy_database::DatabaseError),

    /// The database file could not be opened.
    #[error("Connection error: {0}")]
    Connection(String),

    /// An I/O operation failed (e.g., creating the data directory).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A lookup by primary key matched nothing.
    #[error("No row with id {id} in {table}")]
    NotFound {
        /// Table that was searched.
        table: &'static str,
        /// Requested primary key.
        id: i64,
    },
}

impl DbError {
    /// Returns `true` if this error is a missing-row lookup.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
