#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Facet extraction and aggregation over the full datasets.
//!
//! Unlike the filtered listings, everything here reads whole columns. The
//! store does the scanning; this crate does the coercion, deduplication
//! and grouping that the raw values need before they reach a UI.

pub mod aggregate;
pub mod facets;
pub mod join;

use conflict_atlas_database::DbError;
use conflict_atlas_records_models::InvalidFieldError;
use thiserror::Error;

/// Errors that can occur during analytics operations.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// Database operation failed.
    #[error(transparent)]
    Database(#[from] DbError),

    /// The request named a field or facet outside the allow-list.
    #[error("Invalid argument: {0}")]
    InvalidArgument(#[from] InvalidFieldError),
}
