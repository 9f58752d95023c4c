#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the conflict atlas server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the database row types to allow independent evolution of the API
//! contract.

use conflict_atlas_database_models::{
    ActorSlot, ConflictEventRow, DEFAULT_PAGE_SIZE, EventQuery, LandTitleQuery, LandTitleRow,
};
use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Deserializes an optional query value, treating a blank value
/// (`?year=`) the same as an absent one.
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// One participant in a conflict event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiActor {
    /// Actor category (community, police, company, ...).
    pub actor_type: Option<String>,
    pub name: Option<String>,
    pub specific_description: Option<String>,
    /// Reported head count, verbatim.
    pub specific_count: Option<String>,
    pub specific_weapons: Option<String>,
    pub related_actor: Option<String>,
}

impl From<ActorSlot> for ApiActor {
    fn from(slot: ActorSlot) -> Self {
        Self {
            actor_type: slot.actor_type,
            name: slot.name,
            specific_description: slot.specific_description,
            specific_count: slot.specific_count,
            specific_weapons: slot.specific_weapons,
            related_actor: slot.related_actor,
        }
    }
}

/// A conflict event as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConflictEvent {
    /// Store primary key.
    pub id: i64,
    /// Identifier assigned by the source dataset.
    pub event_id: Option<i64>,
    pub related_event_id: Option<i64>,
    pub year: Option<i64>,
    pub month: Option<i64>,
    pub quarter: Option<i64>,
    /// Date as reported by the source, unparsed.
    pub reported_date: Option<String>,
    pub region: Option<String>,
    pub province: Option<String>,
    pub commune: Option<String>,
    pub location_type: Option<String>,
    pub is_rural: Option<String>,
    pub event_type: Option<String>,
    pub event_specific: Option<String>,
    pub actor1: ApiActor,
    pub actor2: ApiActor,
    pub actor_indigenous: Option<String>,
    pub indigenous_identified: Option<String>,
    pub confrontation_type: Option<String>,
    pub initiator: Option<String>,
    pub description: Option<String>,
    pub property_destroyed: Option<String>,
    pub property_damaged: Option<String>,
    pub property_stolen: Option<String>,
    pub estimated_loss: Option<f64>,
    pub arrests: Option<i64>,
    pub injured: Option<i64>,
    pub killed: Option<i64>,
    pub mercurio_index: Option<f64>,
    pub mella_index: Option<f64>,
    pub osal_index: Option<f64>,
    pub citizen_flag: Option<String>,
    pub biobio_flag: Option<String>,
}

impl From<ConflictEventRow> for ApiConflictEvent {
    fn from(row: ConflictEventRow) -> Self {
        Self {
            id: row.id,
            event_id: row.event_id,
            related_event_id: row.related_event_id,
            year: row.year,
            month: row.month,
            quarter: row.quarter,
            reported_date: row.reported_date,
            region: row.region,
            province: row.province,
            commune: row.commune,
            location_type: row.location_type,
            is_rural: row.is_rural,
            event_type: row.event_type,
            event_specific: row.event_specific,
            actor1: row.actor_1.into(),
            actor2: row.actor_2.into(),
            actor_indigenous: row.actor_indigenous,
            indigenous_identified: row.indigenous_identified,
            confrontation_type: row.confrontation_type,
            initiator: row.initiator,
            description: row.description,
            property_destroyed: row.property_destroyed,
            property_damaged: row.property_damaged,
            property_stolen: row.property_stolen,
            estimated_loss: row.estimated_loss,
            arrests: row.arrests,
            injured: row.injured,
            killed: row.killed,
            mercurio_index: row.mercurio_index,
            mella_index: row.mella_index,
            osal_index: row.osal_index,
            citizen_flag: row.citizen_flag,
            biobio_flag: row.biobio_flag,
        }
    }
}

/// A land-title grant as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiLandTitle {
    pub id: i64,
    pub region_id: Option<i64>,
    pub region: Option<String>,
    pub province_id: Option<i64>,
    pub province: Option<String>,
    pub commune_id: Option<i64>,
    pub commune: Option<String>,
    pub place: Option<String>,
    pub beneficiary: Option<String>,
    pub grant_year: Option<i64>,
    /// Citation of the original title document.
    pub original_reference_text: Option<String>,
    pub grant_number: Option<String>,
    pub grant_letter_suffix: Option<String>,
    /// Granted area, verbatim (may not be numeric).
    pub area: Option<String>,
    pub geo_area: Option<String>,
    pub perimeter: Option<String>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
}

impl From<LandTitleRow> for ApiLandTitle {
    fn from(row: LandTitleRow) -> Self {
        Self {
            id: row.id,
            region_id: row.region_id,
            region: row.region_name,
            province_id: row.province_id,
            province: row.province_name,
            commune_id: row.commune_id,
            commune: row.commune_name,
            place: row.place,
            beneficiary: row.beneficiary,
            grant_year: row.grant_year,
            original_reference_text: row.original_reference_text,
            grant_number: row.grant_number,
            grant_letter_suffix: row.grant_letter_suffix,
            area: row.area,
            geo_area: row.geo_area,
            perimeter: row.perimeter,
            longitude: row.longitude,
            latitude: row.latitude,
        }
    }
}

/// Offset/limit query parameters for unfiltered listings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    /// Records to skip (default 0).
    #[serde(default, deserialize_with = "blank_as_none")]
    pub offset: Option<u32>,
    /// Maximum records to return (default 100).
    #[serde(default, deserialize_with = "blank_as_none")]
    pub limit: Option<u32>,
}

impl PageParams {
    /// Resolved `(offset, limit)` with defaults applied.
    #[must_use]
    pub fn resolve(&self) -> (u32, u32) {
        (self.offset.unwrap_or(0), self.limit.unwrap_or(DEFAULT_PAGE_SIZE))
    }
}

/// Query parameters for the event filter endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFilterParams {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub year: Option<i64>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub month: Option<i64>,
    #[serde(default, deserialize_with = "blank_as_none")]
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
    #[serde(default, deserialize_with = "blank_as_none")]
    pub offset: Option<u32>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub limit: Option<u32>,
}

impl From<EventFilterParams> for EventQuery {
    fn from(params: EventFilterParams) -> Self {
        Self {
            year: params.year,
            month: params.month,
            quarter: params.quarter,
            region: params.region,
            province: params.province,
            commune: params.commune,
            event_type: params.event_type,
            event_specific: params.event_specific,
            location_type: params.location_type,
            actor_indigenous: params.actor_indigenous,
            indigenous_identified: params.indigenous_identified,
            confrontation_type: params.confrontation_type,
            initiator: params.initiator,
            actor: params.actor,
            limit: params.limit.unwrap_or(DEFAULT_PAGE_SIZE),
            offset: params.offset.unwrap_or(0),
        }
    }
}

/// Query parameters for the land-title filter endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandTitleFilterParams {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub region_id: Option<i64>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub province_id: Option<i64>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub commune_id: Option<i64>,
    pub region: Option<String>,
    pub province: Option<String>,
    pub commune: Option<String>,
    pub place: Option<String>,
    pub beneficiary: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub grant_year: Option<i64>,
    /// Inclusive lower bound on numeric area.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub area_min: Option<f64>,
    /// Inclusive upper bound on numeric area.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub area_max: Option<f64>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub offset: Option<u32>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub limit: Option<u32>,
}

impl From<LandTitleFilterParams> for LandTitleQuery {
    fn from(params: LandTitleFilterParams) -> Self {
        Self {
            region_id: params.region_id,
            province_id: params.province_id,
            commune_id: params.commune_id,
            region: params.region,
            province: params.province,
            commune: params.commune,
            place: params.place,
            beneficiary: params.beneficiary,
            grant_year: params.grant_year,
            area_min: params.area_min,
            area_max: params.area_max,
            limit: params.limit.unwrap_or(DEFAULT_PAGE_SIZE),
            offset: params.offset.unwrap_or(0),
        }
    }
}

/// The `field` query parameter of the aggregation endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldParams {
    pub field: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the server is healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
}

/// Error body returned with every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

impl ApiError {
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
