#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Database row types and filter parameter definitions.
//!
//! These types represent records as decoded from the store. They are
//! distinct from the API response types in `conflict_atlas_server_models`,
//! which reshape them for the frontend.

use serde::{Deserialize, Serialize};

/// Page size used by every listing when the caller does not supply one.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// One of the two actor slots on a conflict event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorSlot {
    /// Actor category code.
    pub actor_type: Option<String>,
    /// Actor name.
    pub name: Option<String>,
    /// Specific description of the actor.
    pub specific_description: Option<String>,
    /// Reported head count, free text.
    pub specific_count: Option<String>,
    /// Weapons carried, free text.
    pub specific_weapons: Option<String>,
    /// Related actor.
    pub related_actor: Option<String>,
}

/// A conflict event row as retrieved from the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictEventRow {
    /// Primary key.
    pub id: i64,
    /// Event identifier assigned by the importer.
    pub event_id: Option<i64>,
    /// Identifier of a related event.
    pub related_event_id: Option<i64>,
    pub year: Option<i64>,
    pub month: Option<i64>,
    pub quarter: Option<i64>,
    /// Reported date as free text.
    pub reported_date: Option<String>,
    pub commune: Option<String>,
    pub province: Option<String>,
    pub region: Option<String>,
    pub location_type: Option<String>,
    /// Rural marker, free text.
    pub is_rural: Option<String>,
    pub event_type: Option<String>,
    pub event_specific: Option<String>,
    /// First actor slot.
    pub actor_1: ActorSlot,
    /// Second actor slot.
    pub actor_2: ActorSlot,
    /// Whether an indigenous actor took part (categorical text).
    pub actor_indigenous: Option<String>,
    /// Whether indigenous involvement was identified (categorical text).
    pub indigenous_identified: Option<String>,
    pub confrontation_type: Option<String>,
    pub initiator: Option<String>,
    pub description: Option<String>,
    pub property_destroyed: Option<String>,
    pub property_damaged: Option<String>,
    pub property_stolen: Option<String>,
    /// Estimated loss in local currency.
    pub estimated_loss: Option<f64>,
    pub arrests: Option<i64>,
    pub injured: Option<i64>,
    pub killed: Option<i64>,
    /// Severity index from the El Mercurio coding.
    pub mercurio_index: Option<f64>,
    /// Severity index from the Mella coding.
    pub mella_index: Option<f64>,
    /// Severity index from the OSAL coding.
    pub osal_index: Option<f64>,
    /// Regional flag, free text.
    pub citizen_flag: Option<String>,
    /// Regional flag, free text.
    pub biobio_flag: Option<String>,
}

/// A land-title grant row as retrieved from the database.
///
/// `area`, `geo_area` and `perimeter` stay as text because the source
/// values are frequently malformed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandTitleRow {
    /// Primary key.
    pub id: i64,
    pub region_id: Option<i64>,
    pub region_name: Option<String>,
    pub province_id: Option<i64>,
    pub province_name: Option<String>,
    pub commune_id: Option<i64>,
    pub commune_name: Option<String>,
    pub place: Option<String>,
    pub beneficiary: Option<String>,
    pub grant_year: Option<i64>,
    /// Reference text as written in the original grant.
    pub original_reference_text: Option<String>,
    pub grant_number: Option<String>,
    pub grant_letter_suffix: Option<String>,
    pub area: Option<String>,
    pub geo_area: Option<String>,
    pub perimeter: Option<String>,
    /// Longitude (west).
    pub longitude: Option<f64>,
    /// Latitude (south).
    pub latitude: Option<f64>,
}

/// Parameters for querying conflict events.
///
/// Every filter is optional; empty strings count as absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventQuery {
    pub year: Option<i64>,
    pub month: Option<i64>,
    pub quarter: Option<i64>,
    pub region: Option<String>,
    pub province: Option<String>,
    pub commune: Option<String>,
    pub event_type: Option<String>,
    pub event_specific: Option<String>,
    pub location_type: Option<String>,
    pub actor_indigenous: Option<String>,
    pub indigenous_identified: Option<String>,
    pub confrontation_type: Option<String>,
    pub initiator: Option<String>,
    /// Matches either actor slot's name.
    pub actor: Option<String>,
    /// Maximum number of results to return.
    pub limit: u32,
    /// Number of results to skip.
    pub offset: u32,
}

impl Default for EventQuery {
    fn default() -> Self {
        Self {
            year: None,
            month: None,
            quarter: None,
            region: None,
            province: None,
            commune: None,
            event_type: None,
            event_specific: None,
            location_type: None,
            actor_indigenous: None,
            indigenous_identified: None,
            confrontation_type: None,
            initiator: None,
            actor: None,
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

/// Parameters for querying land-title grants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandTitleQuery {
    pub region_id: Option<i64>,
    pub province_id: Option<i64>,
    pub commune_id: Option<i64>,
    pub region: Option<String>,
    pub province: Option<String>,
    pub commune: Option<String>,
    pub place: Option<String>,
    pub beneficiary: Option<String>,
    pub grant_year: Option<i64>,
    /// Inclusive lower bound on the numeric area.
    pub area_min: Option<f64>,
    /// Inclusive upper bound on the numeric area.
    pub area_max: Option<f64>,
    /// Maximum number of results to return.
    pub limit: u32,
    /// Number of results to skip.
    pub offset: u32,
}

impl Default for LandTitleQuery {
    fn default() -> Self {
        Self {
            region_id: None,
            province_id: None,
            commune_id: None,
            region: None,
            province: None,
            commune: None,
            place: None,
            beneficiary: None,
            grant_year: None,
            area_min: None,
            area_max: None,
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}
