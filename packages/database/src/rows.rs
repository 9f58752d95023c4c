//! Decoding of store rows into record types.
//!
//! `SQLite` columns are dynamically typed, and the importer wrote whatever
//! the spreadsheets contained, so no read here assumes the declared type.
//! Integer and float fields fall back to [`coerce_int`]/[`coerce_float`]
//! on the raw text; anything unusable decodes as `None`.

use conflict_atlas_database_models::{ActorSlot, ConflictEventRow, LandTitleRow};
use conflict_atlas_records_models::{
    Column, EventColumn, LandTitleColumn, Scalar, coerce_float, coerce_int,
};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::Row;

/// Reads a column as text regardless of its stored type.
#[must_use]
pub fn raw_text(row: &Row, column: &str) -> Option<String> {
    if let Ok(value) = row.to_value::<Option<String>>(column) {
        return value;
    }
    if let Ok(Some(value)) = row.to_value::<Option<i64>>(column) {
        return Some(value.to_string());
    }
    row.to_value::<Option<f64>>(column)
        .ok()
        .flatten()
        .map(|v| v.to_string())
}

/// Reads a column as an integer, coercing stored text.
#[must_use]
pub fn int_value(row: &Row, column: &str) -> Option<i64> {
    if let Ok(Some(value)) = row.to_value::<Option<i64>>(column) {
        return Some(value);
    }
    coerce_int(raw_text(row, column).as_deref())
}

/// Reads a column as a float, coercing stored text.
#[must_use]
pub fn float_value(row: &Row, column: &str) -> Option<f64> {
    if let Ok(Some(value)) = row.to_value::<Option<f64>>(column)
        && value.is_finite()
    {
        return Some(value);
    }
    coerce_float(raw_text(row, column).as_deref())
}

/// Reads a value whose `SQLite` storage class was selected alongside it as
/// `typeof(...)` in `type_column`.
///
/// Used for group keys, where `2010` must come back as a number and
/// `"Biobío"` as text.
#[must_use]
pub fn typed_scalar(row: &Row, value_column: &str, type_column: &str) -> Option<Scalar> {
    let storage: String = row.to_value(type_column).unwrap_or_default();
    match storage.as_str() {
        "integer" => int_value(row, value_column).map(Scalar::Int),
        "real" => float_value(row, value_column).map(Scalar::Float),
        "null" => None,
        _ => raw_text(row, value_column).map(Scalar::Text),
    }
}

fn event_text(row: &Row, column: EventColumn) -> Option<String> {
    raw_text(row, column.name())
}

fn event_int(row: &Row, column: EventColumn) -> Option<i64> {
    int_value(row, column.name())
}

fn event_float(row: &Row, column: EventColumn) -> Option<f64> {
    float_value(row, column.name())
}

fn actor_slot(
    row: &Row,
    [actor_type, name, specific, count, weapons, related]: [EventColumn; 6],
) -> ActorSlot {
    ActorSlot {
        actor_type: event_text(row, actor_type),
        name: event_text(row, name),
        specific_description: event_text(row, specific),
        specific_count: event_text(row, count),
        specific_weapons: event_text(row, weapons),
        related_actor: event_text(row, related),
    }
}

/// Converts a database row into a [`ConflictEventRow`].
#[must_use]
pub fn row_to_event(row: &Row) -> ConflictEventRow {
    ConflictEventRow {
        id: event_int(row, EventColumn::Id).unwrap_or(0),
        event_id: event_int(row, EventColumn::EventId),
        related_event_id: event_int(row, EventColumn::RelatedEventId),
        year: event_int(row, EventColumn::Year),
        month: event_int(row, EventColumn::Month),
        quarter: event_int(row, EventColumn::Quarter),
        reported_date: event_text(row, EventColumn::ReportedDate),
        commune: event_text(row, EventColumn::Commune),
        province: event_text(row, EventColumn::Province),
        region: event_text(row, EventColumn::Region),
        location_type: event_text(row, EventColumn::LocationType),
        is_rural: event_text(row, EventColumn::Rural),
        event_type: event_text(row, EventColumn::EventType),
        event_specific: event_text(row, EventColumn::EventSpecific),
        actor_1: actor_slot(
            row,
            [
                EventColumn::Actor1Type,
                EventColumn::Actor1Name,
                EventColumn::Actor1Specific,
                EventColumn::Actor1SpecificCount,
                EventColumn::Actor1SpecificWeapons,
                EventColumn::Actor1Related,
            ],
        ),
        actor_2: actor_slot(
            row,
            [
                EventColumn::Actor2Type,
                EventColumn::Actor2Name,
                EventColumn::Actor2Specific,
                EventColumn::Actor2SpecificCount,
                EventColumn::Actor2SpecificWeapons,
                EventColumn::Actor2Related,
            ],
        ),
        actor_indigenous: event_text(row, EventColumn::ActorIndigenous),
        indigenous_identified: event_text(row, EventColumn::IndigenousIdentified),
        confrontation_type: event_text(row, EventColumn::Confrontation),
        initiator: event_text(row, EventColumn::Initiator),
        description: event_text(row, EventColumn::Description),
        property_destroyed: event_text(row, EventColumn::PropertyDestroyed),
        property_damaged: event_text(row, EventColumn::PropertyDamaged),
        property_stolen: event_text(row, EventColumn::PropertyStolen),
        estimated_loss: event_float(row, EventColumn::EstimatedLoss),
        arrests: event_int(row, EventColumn::Arrests),
        injured: event_int(row, EventColumn::Injured),
        killed: event_int(row, EventColumn::Killed),
        mercurio_index: event_float(row, EventColumn::MercurioIndex),
        mella_index: event_float(row, EventColumn::MellaIndex),
        osal_index: event_float(row, EventColumn::OsalIndex),
        citizen_flag: event_text(row, EventColumn::CitizenFlag),
        biobio_flag: event_text(row, EventColumn::BiobioFlag),
    }
}

/// Converts a database row into a [`LandTitleRow`].
#[must_use]
pub fn row_to_land_title(row: &Row) -> LandTitleRow {
    let text = |column: LandTitleColumn| raw_text(row, column.name());
    let int = |column: LandTitleColumn| int_value(row, column.name());
    let float = |column: LandTitleColumn| float_value(row, column.name());

    LandTitleRow {
        id: int(LandTitleColumn::Id).unwrap_or(0),
        region_id: int(LandTitleColumn::RegionId),
        region_name: text(LandTitleColumn::RegionName),
        province_id: int(LandTitleColumn::ProvinceId),
        province_name: text(LandTitleColumn::ProvinceName),
        commune_id: int(LandTitleColumn::CommuneId),
        commune_name: text(LandTitleColumn::CommuneName),
        place: text(LandTitleColumn::Place),
        beneficiary: text(LandTitleColumn::Beneficiary),
        grant_year: int(LandTitleColumn::GrantYear),
        original_reference_text: text(LandTitleColumn::OriginalReference),
        grant_number: text(LandTitleColumn::GrantNumber),
        grant_letter_suffix: text(LandTitleColumn::GrantLetter),
        area: text(LandTitleColumn::Area),
        geo_area: text(LandTitleColumn::GeoArea),
        perimeter: text(LandTitleColumn::Perimeter),
        longitude: float(LandTitleColumn::Longitude),
        latitude: float(LandTitleColumn::Latitude),
    }
}
