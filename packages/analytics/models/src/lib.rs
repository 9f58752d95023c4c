#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Result types for facet extraction and aggregation.
//!
//! These are serialized straight into API responses, so every type here
//! uses camelCase field names.

use std::collections::BTreeMap;

use conflict_atlas_records_models::{Scalar, SharedGeoField};
use serde::{Deserialize, Serialize};

/// Distinct values per filterable column, keyed by facet name.
///
/// Each list is deduplicated, free of nulls and empty strings, and sorted
/// ascending.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterOptions {
    /// Facet name to option list.
    pub facets: BTreeMap<String, Vec<Scalar>>,
}

impl FilterOptions {
    /// Options of the named facet, if it exists.
    #[must_use]
    pub fn get(&self, facet: &str) -> Option<&[Scalar]> {
        self.facets.get(facet).map(Vec::as_slice)
    }
}

/// Number of records sharing one group key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupCount {
    /// Group key; `None` is the group of records with no value.
    pub value: Option<Scalar>,
    /// Records in the group.
    pub count: u64,
}

/// Summed land-title area for one group key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupAreaSum {
    /// Group key; `None` is the group of records with no value.
    pub value: Option<Scalar>,
    /// Sum of every parseable area in the group.
    pub total_area: f64,
    /// Number of records whose area was parseable.
    pub counted: u64,
}

/// One event/land-title pair sharing a geographic value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinMatch {
    /// Store id of the matched conflict event.
    pub event_id: i64,
    /// Store id of the matched land title.
    pub land_title_id: i64,
    /// The shared value.
    pub value: String,
}

/// Per-group event counts and land-title area sums for one shared field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoSummary {
    /// Field both lists are grouped by.
    pub field: SharedGeoField,
    /// Event counts per group.
    pub event_counts: Vec<GroupCount>,
    /// Land-title area sums per group.
    pub area_sums: Vec<GroupAreaSum>,
}
