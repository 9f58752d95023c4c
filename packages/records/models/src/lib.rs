#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Dataset columns, allow-listed grouping fields, and value coercion.
//!
//! Both datasets live in tables created by the bulk importer, so their
//! column names are the importer's. The rest of the workspace never spells
//! a column name directly: it goes through [`EventColumn`] and
//! [`LandTitleColumn`], and request-supplied field names are only accepted
//! through the closed allow-list enums ([`EventGroupField`],
//! [`LandTitleGroupField`], [`SharedGeoField`]).

pub mod coerce;

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

pub use coerce::{coerce_float, coerce_int, is_plain_decimal};

/// A single typed value read from, or compared against, the store.
///
/// Serializes without a tag so API consumers see plain JSON numbers and
/// strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Integer value.
    Int(i64),
    /// Floating-point value.
    Float(f64),
    /// Text value.
    Text(String),
}

impl Scalar {
    /// Total ordering used wherever scalar lists are sorted.
    ///
    /// Numbers (integer or float) sort numerically before any text; text
    /// sorts lexically.
    #[must_use]
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        match (self.as_f64(), other.as_f64()) {
            (Some(a), Some(b)) => a.total_cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.as_text().cmp(&other.as_text()),
        }
    }

    /// Numeric view of this value, if it is a number.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Text(_) => None,
        }
    }

    /// Text view of this value, if it is text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            Self::Int(_) | Self::Float(_) => None,
        }
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Orders optional scalars with `None` (the SQL `NULL` group) first.
#[must_use]
pub fn cmp_optional(a: Option<&Scalar>, b: Option<&Scalar>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(b),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// A column of one of the stored tables.
pub trait Column: Copy + std::fmt::Debug {
    /// Name of the table this column belongs to.
    const TABLE: &'static str;

    /// Column name as created by the importer.
    fn name(self) -> &'static str;
}

/// Columns of the conflict events table (`conflicto_maceda`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventColumn {
    Id,
    EventId,
    RelatedEventId,
    Year,
    Month,
    Quarter,
    ReportedDate,
    Commune,
    Province,
    Region,
    LocationType,
    Rural,
    EventType,
    EventSpecific,
    Actor1Type,
    Actor1Name,
    Actor1Specific,
    Actor1SpecificCount,
    Actor1SpecificWeapons,
    Actor1Related,
    Actor2Type,
    Actor2Name,
    Actor2Specific,
    Actor2SpecificCount,
    Actor2SpecificWeapons,
    Actor2Related,
    ActorIndigenous,
    IndigenousIdentified,
    Confrontation,
    Initiator,
    Description,
    PropertyDestroyed,
    PropertyDamaged,
    PropertyStolen,
    EstimatedLoss,
    Arrests,
    Injured,
    Killed,
    MercurioIndex,
    MellaIndex,
    OsalIndex,
    CitizenFlag,
    BiobioFlag,
}

impl Column for EventColumn {
    const TABLE: &'static str = "conflicto_maceda";

    fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::EventId => "id_evento",
            Self::RelatedEventId => "id_evento_relacionado",
            Self::Year => "año",
            Self::Month => "mes",
            Self::Quarter => "trimestre",
            Self::ReportedDate => "fecha_reportada",
            Self::Commune => "comuna",
            Self::Province => "provincia",
            Self::Region => "region",
            Self::LocationType => "ubicacion_tipo",
            Self::Rural => "rural",
            Self::EventType => "evento_tipo_maceda",
            Self::EventSpecific => "evento_especifico",
            Self::Actor1Type => "actor_tipo_1",
            Self::Actor1Name => "actor_tipo_1_nombre",
            Self::Actor1Specific => "actor_especifico_1",
            Self::Actor1SpecificCount => "actor_especifico_1_num",
            Self::Actor1SpecificWeapons => "actor_especifico_1_armas",
            Self::Actor1Related => "actor_relacionado_1",
            Self::Actor2Type => "actor_tipo_2",
            Self::Actor2Name => "actor_tipo_2_nombre",
            Self::Actor2Specific => "actor_especifico_2",
            Self::Actor2SpecificCount => "actor_especifico_2_num",
            Self::Actor2SpecificWeapons => "actor_especifico_2_armas",
            Self::Actor2Related => "actor_relacionado_2",
            Self::ActorIndigenous => "actor_mapuche",
            Self::IndigenousIdentified => "mapuche_identificado",
            Self::Confrontation => "confrontacion",
            Self::Initiator => "iniciador",
            Self::Description => "descripcion",
            Self::PropertyDestroyed => "propiedad_destruida",
            Self::PropertyDamaged => "propiedad_dañada",
            Self::PropertyStolen => "propiedad_robada",
            Self::EstimatedLoss => "perdida_estimada",
            Self::Arrests => "arrestos",
            Self::Injured => "heridos",
            Self::Killed => "muertos",
            Self::MercurioIndex => "mercurio",
            Self::MellaIndex => "mella",
            Self::OsalIndex => "osal",
            Self::CitizenFlag => "ciudadano",
            Self::BiobioFlag => "biobio",
        }
    }
}

/// Columns of the land-title grants table (`tierras_titulomerced`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LandTitleColumn {
    Id,
    RegionId,
    RegionName,
    ProvinceId,
    ProvinceName,
    CommuneId,
    CommuneName,
    Place,
    Beneficiary,
    GrantYear,
    OriginalReference,
    GrantNumber,
    GrantLetter,
    Area,
    GeoArea,
    Perimeter,
    Longitude,
    Latitude,
}

impl Column for LandTitleColumn {
    const TABLE: &'static str = "tierras_titulomerced";

    fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::RegionId => "region_id",
            Self::RegionName => "region_nombre",
            Self::ProvinceId => "provincia_id",
            Self::ProvinceName => "provincia_nombre",
            Self::CommuneId => "comuna_id",
            Self::CommuneName => "comuna_nombre",
            Self::Place => "lugar",
            Self::Beneficiary => "tdm_beneficiario",
            Self::GrantYear => "tdm_año",
            Self::OriginalReference => "tdm_original",
            Self::GrantNumber => "tdm_numero",
            Self::GrantLetter => "tdm_letra",
            Self::Area => "tdm_area",
            Self::GeoArea => "tdm_geoarea",
            Self::Perimeter => "tdm_perim",
            Self::Longitude => "longitud_W",
            Self::Latitude => "latitud_S",
        }
    }
}

/// Error returned when a request names a field outside an allow-list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidFieldError {
    /// The rejected field name.
    pub field: String,
    /// Field names that would have been accepted.
    pub allowed: Vec<&'static str>,
}

impl std::fmt::Display for InvalidFieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid field '{}': expected one of {}",
            self.field,
            self.allowed.join(", ")
        )
    }
}

impl std::error::Error for InvalidFieldError {}

/// Parses `field` into an allow-list enum, reporting the accepted names on
/// failure.
fn parse_field<F>(field: &str) -> Result<F, InvalidFieldError>
where
    F: std::str::FromStr + strum::IntoEnumIterator + Into<&'static str>,
{
    field.parse().map_err(|_| InvalidFieldError {
        field: field.to_string(),
        allowed: F::iter().map(Into::into).collect(),
    })
}

/// Fields conflict events may be grouped by.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
    strum_macros::IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EventGroupField {
    Year,
    EventType,
    Region,
}

impl EventGroupField {
    /// Parses a request-supplied field name.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidFieldError`] if `field` is not allow-listed.
    pub fn from_field(field: &str) -> Result<Self, InvalidFieldError> {
        parse_field(field)
    }

    /// The column this field groups on.
    #[must_use]
    pub const fn column(self) -> EventColumn {
        match self {
            Self::Year => EventColumn::Year,
            Self::EventType => EventColumn::EventType,
            Self::Region => EventColumn::Region,
        }
    }
}

/// Fields land titles may be grouped by.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
    strum_macros::IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LandTitleGroupField {
    Region,
    Province,
    Commune,
}

impl LandTitleGroupField {
    /// Parses a request-supplied field name.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidFieldError`] if `field` is not allow-listed.
    pub fn from_field(field: &str) -> Result<Self, InvalidFieldError> {
        parse_field(field)
    }

    /// The column this field groups on.
    #[must_use]
    pub const fn column(self) -> LandTitleColumn {
        match self {
            Self::Region => LandTitleColumn::RegionName,
            Self::Province => LandTitleColumn::ProvinceName,
            Self::Commune => LandTitleColumn::CommuneName,
        }
    }
}

/// Geographic fields present in both datasets, used to relate them.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
    strum_macros::IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SharedGeoField {
    Region,
    Province,
    Commune,
}

impl SharedGeoField {
    /// Parses a request-supplied field name.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidFieldError`] if `field` is not allow-listed.
    pub fn from_field(field: &str) -> Result<Self, InvalidFieldError> {
        parse_field(field)
    }

    /// Column holding this field in the events table.
    #[must_use]
    pub const fn event_column(self) -> EventColumn {
        match self {
            Self::Region => EventColumn::Region,
            Self::Province => EventColumn::Province,
            Self::Commune => EventColumn::Commune,
        }
    }

    /// Column holding this field in the land-titles table.
    #[must_use]
    pub const fn land_title_column(self) -> LandTitleColumn {
        match self {
            Self::Region => LandTitleColumn::RegionName,
            Self::Province => LandTitleColumn::ProvinceName,
            Self::Commune => LandTitleColumn::CommuneName,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_fields_accept_allow_listed_names() {
        assert_eq!(
            EventGroupField::from_field("year"),
            Ok(EventGroupField::Year)
        );
        assert_eq!(
            EventGroupField::from_field("event_type"),
            Ok(EventGroupField::EventType)
        );
        assert_eq!(
            LandTitleGroupField::from_field("commune"),
            Ok(LandTitleGroupField::Commune)
        );
        assert_eq!(
            SharedGeoField::from_field("province"),
            Ok(SharedGeoField::Province)
        );
    }

    #[test]
    fn group_fields_reject_everything_else() {
        let err = EventGroupField::from_field("description").unwrap_err();
        assert_eq!(err.field, "description");
        assert_eq!(err.allowed, vec!["year", "event_type", "region"]);

        assert!(EventGroupField::from_field("Year").is_err());
        assert!(EventGroupField::from_field("").is_err());
        assert!(LandTitleGroupField::from_field("tdm_area").is_err());
        assert!(SharedGeoField::from_field("region; DROP TABLE x").is_err());
    }

    #[test]
    fn invalid_field_message_lists_choices() {
        let err = SharedGeoField::from_field("place").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid field 'place': expected one of region, province, commune"
        );
    }

    #[test]
    fn shared_fields_map_to_both_tables() {
        assert_eq!(SharedGeoField::Region.event_column().name(), "region");
        assert_eq!(
            SharedGeoField::Region.land_title_column().name(),
            "region_nombre"
        );
        assert_eq!(SharedGeoField::Commune.event_column().name(), "comuna");
    }

    #[test]
    fn scalars_sort_numbers_before_text() {
        let mut values = vec![
            Scalar::Text("b".to_string()),
            Scalar::Float(2.5),
            Scalar::Int(10),
            Scalar::Text("a".to_string()),
            Scalar::Int(2),
        ];
        values.sort_by(Scalar::total_cmp);
        assert_eq!(
            values,
            vec![
                Scalar::Int(2),
                Scalar::Float(2.5),
                Scalar::Int(10),
                Scalar::Text("a".to_string()),
                Scalar::Text("b".to_string()),
            ]
        );
    }

    #[test]
    fn null_sorts_first() {
        assert_eq!(cmp_optional(None, Some(&Scalar::Int(1))), Ordering::Less);
        assert_eq!(cmp_optional(None, None), Ordering::Equal);
    }

    #[test]
    fn scalars_serialize_untagged() {
        let json = serde_json::to_string(&vec![
            Scalar::Int(2010),
            Scalar::Float(12.5),
            Scalar::Text("Biobío".to_string()),
        ])
        .unwrap();
        assert_eq!(json, r#"[2010,12.5,"Biobío"]"#);
    }
}
