//! Filter-option bundles for the frontend's filter controls.
//!
//! Each dataset has a fixed table of facets. A facet reads the distinct
//! values of one or more columns, drops nulls and empty strings, coerces
//! numeric facets (silently discarding values that don't parse), unions
//! multi-column facets, and returns a sorted, deduplicated list.

use conflict_atlas_analytics_models::FilterOptions;
use conflict_atlas_database::queries::distinct_values;
use conflict_atlas_records_models::{
    Column, EventColumn, InvalidFieldError, LandTitleColumn, Scalar, coerce_int,
};
use switchy_database::Database;

use crate::AnalyticsError;

/// How a facet's raw values are post-processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacetKind {
    /// Coerce to integers, dropping values that don't parse.
    Int,
    /// Pass text through unchanged.
    Text,
}

/// One entry of a dataset's facet table.
#[derive(Debug, Clone, Copy)]
pub struct FacetSpec<C: 'static> {
    /// Name the facet is published under.
    pub name: &'static str,
    /// Columns whose distinct values are unioned.
    pub columns: &'static [C],
    /// Post-processing applied to the unioned values.
    pub kind: FacetKind,
}

/// Facets exposed for conflict events.
pub const EVENT_FACETS: &[FacetSpec<EventColumn>] = &[
    FacetSpec {
        name: "years",
        columns: &[EventColumn::Year],
        kind: FacetKind::Int,
    },
    FacetSpec {
        name: "months",
        columns: &[EventColumn::Month],
        kind: FacetKind::Int,
    },
    FacetSpec {
        name: "quarters",
        columns: &[EventColumn::Quarter],
        kind: FacetKind::Int,
    },
    FacetSpec {
        name: "regions",
        columns: &[EventColumn::Region],
        kind: FacetKind::Text,
    },
    FacetSpec {
        name: "provinces",
        columns: &[EventColumn::Province],
        kind: FacetKind::Text,
    },
    FacetSpec {
        name: "communes",
        columns: &[EventColumn::Commune],
        kind: FacetKind::Text,
    },
    FacetSpec {
        name: "locationTypes",
        columns: &[EventColumn::LocationType],
        kind: FacetKind::Text,
    },
    FacetSpec {
        name: "eventTypes",
        columns: &[EventColumn::EventType],
        kind: FacetKind::Text,
    },
    FacetSpec {
        name: "eventSpecifics",
        columns: &[EventColumn::EventSpecific],
        kind: FacetKind::Text,
    },
    FacetSpec {
        name: "actorTypes",
        columns: &[EventColumn::Actor1Type, EventColumn::Actor2Type],
        kind: FacetKind::Text,
    },
    FacetSpec {
        name: "actorNames",
        columns: &[EventColumn::Actor1Name, EventColumn::Actor2Name],
        kind: FacetKind::Text,
    },
    FacetSpec {
        name: "actorIndigenous",
        columns: &[EventColumn::ActorIndigenous],
        kind: FacetKind::Text,
    },
    FacetSpec {
        name: "indigenousIdentified",
        columns: &[EventColumn::IndigenousIdentified],
        kind: FacetKind::Text,
    },
    FacetSpec {
        name: "confrontationTypes",
        columns: &[EventColumn::Confrontation],
        kind: FacetKind::Text,
    },
    FacetSpec {
        name: "initiators",
        columns: &[EventColumn::Initiator],
        kind: FacetKind::Text,
    },
];

/// Facets exposed for land-title grants.
pub const LAND_TITLE_FACETS: &[FacetSpec<LandTitleColumn>] = &[
    FacetSpec {
        name: "regionIds",
        columns: &[LandTitleColumn::RegionId],
        kind: FacetKind::Int,
    },
    FacetSpec {
        name: "provinceIds",
        columns: &[LandTitleColumn::ProvinceId],
        kind: FacetKind::Int,
    },
    FacetSpec {
        name: "communeIds",
        columns: &[LandTitleColumn::CommuneId],
        kind: FacetKind::Int,
    },
    FacetSpec {
        name: "grantYears",
        columns: &[LandTitleColumn::GrantYear],
        kind: FacetKind::Int,
    },
    FacetSpec {
        name: "regions",
        columns: &[LandTitleColumn::RegionName],
        kind: FacetKind::Text,
    },
    FacetSpec {
        name: "provinces",
        columns: &[LandTitleColumn::ProvinceName],
        kind: FacetKind::Text,
    },
    FacetSpec {
        name: "communes",
        columns: &[LandTitleColumn::CommuneName],
        kind: FacetKind::Text,
    },
    FacetSpec {
        name: "places",
        columns: &[LandTitleColumn::Place],
        kind: FacetKind::Text,
    },
    FacetSpec {
        name: "beneficiaries",
        columns: &[LandTitleColumn::Beneficiary],
        kind: FacetKind::Text,
    },
];

/// Turns raw distinct values into a facet's option list.
///
/// Nulls and empty strings are dropped; numeric kinds keep only values
/// that coerce. The result is sorted and deduplicated.
#[must_use]
pub fn facet_options(kind: FacetKind, raw: impl IntoIterator<Item = Option<String>>) -> Vec<Scalar> {
    let mut options: Vec<Scalar> = raw
        .into_iter()
        .flatten()
        .filter(|value| !value.is_empty())
        .filter_map(|value| match kind {
            FacetKind::Int => coerce_int(Some(&value)).map(Scalar::Int),
            FacetKind::Text => Some(Scalar::Text(value)),
        })
        .collect();

    options.sort_by(Scalar::total_cmp);
    options.dedup();
    options
}

/// Computes one facet against the store.
async fn extract<C: Column>(
    db: &dyn Database,
    spec: &FacetSpec<C>,
) -> Result<Vec<Scalar>, AnalyticsError> {
    let mut raw = Vec::new();
    for column in spec.columns {
        raw.extend(distinct_values(db, *column).await?);
    }
    Ok(facet_options(spec.kind, raw))
}

/// Computes every facet in `specs`.
async fn extract_all<C: Column>(
    db: &dyn Database,
    specs: &[FacetSpec<C>],
) -> Result<FilterOptions, AnalyticsError> {
    let mut options = FilterOptions::default();
    for spec in specs {
        let values = extract(db, spec).await?;
        log::debug!("Facet {}.{}: {} options", C::TABLE, spec.name, values.len());
        options.facets.insert(spec.name.to_string(), values);
    }
    Ok(options)
}

/// Finds a facet by name, rejecting names outside the table.
fn find_spec<'a, C>(
    specs: &'a [FacetSpec<C>],
    name: &str,
) -> Result<&'a FacetSpec<C>, InvalidFieldError> {
    specs
        .iter()
        .find(|spec| spec.name == name)
        .ok_or_else(|| InvalidFieldError {
            field: name.to_string(),
            allowed: specs.iter().map(|spec| spec.name).collect(),
        })
}

/// Builds the complete filter-option bundle for conflict events.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if a store query fails.
pub async fn event_filter_options(db: &dyn Database) -> Result<FilterOptions, AnalyticsError> {
    extract_all(db, EVENT_FACETS).await
}

/// Builds the complete filter-option bundle for land-title grants.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if a store query fails.
pub async fn land_title_filter_options(db: &dyn Database) -> Result<FilterOptions, AnalyticsError> {
    extract_all(db, LAND_TITLE_FACETS).await
}

/// Computes a single named event facet.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidArgument`] for an unknown facet name
/// (before touching the store), or a database error.
pub async fn event_facet(db: &dyn Database, name: &str) -> Result<Vec<Scalar>, AnalyticsError> {
    let spec = find_spec(EVENT_FACETS, name)?;
    extract(db, spec).await
}

/// Computes a single named land-title facet.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidArgument`] for an unknown facet name
/// (before touching the store), or a database error.
pub async fn land_title_facet(db: &dyn Database, name: &str) -> Result<Vec<Scalar>, AnalyticsError> {
    let spec = find_spec(LAND_TITLE_FACETS, name)?;
    extract(db, spec).await
}
