//! Cross-dataset matching on a shared geographic name.

use conflict_atlas_analytics_models::{GeoSummary, JoinMatch};
use conflict_atlas_database::queries::{group_counts, group_value_pairs, id_value_pairs};
use conflict_atlas_records_models::{LandTitleColumn, SharedGeoField};
use switchy_database::Database;

use crate::AnalyticsError;
use crate::aggregate::{ranked, sum_area_groups};

/// Pairs every event with every land title holding the same value.
///
/// Matching is exact string equality and a missing value never matches,
/// not even another missing value. Output follows event order, then
/// land-title order.
#[must_use]
pub fn match_pairs(
    events: &[(i64, Option<String>)],
    land_titles: &[(i64, Option<String>)],
) -> Vec<JoinMatch> {
    let mut matches = Vec::new();
    for (event_id, event_value) in events {
        let Some(event_value) = event_value else {
            continue;
        };
        for (land_title_id, land_title_value) in land_titles {
            if land_title_value.as_deref() == Some(event_value.as_str()) {
                matches.push(JoinMatch {
                    event_id: *event_id,
                    land_title_id: *land_title_id,
                    value: event_value.clone(),
                });
            }
        }
    }
    matches
}

/// Joins conflict events with land titles on `field`.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if a store query fails.
pub async fn join_by(
    db: &dyn Database,
    field: SharedGeoField,
) -> Result<Vec<JoinMatch>, AnalyticsError> {
    let events = id_value_pairs(db, field.event_column()).await?;
    let land_titles = id_value_pairs(db, field.land_title_column()).await?;

    let matches = match_pairs(&events, &land_titles);
    log::debug!(
        "Join on {field}: {} events x {} land titles -> {} matches",
        events.len(),
        land_titles.len(),
        matches.len()
    );
    Ok(matches)
}

/// Event counts and land-title area sums grouped by `field`.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if a store query fails.
pub async fn summary_by(
    db: &dyn Database,
    field: SharedGeoField,
) -> Result<GeoSummary, AnalyticsError> {
    let event_counts = ranked(group_counts(db, field.event_column()).await?);
    let pairs = group_value_pairs(db, field.land_title_column(), LandTitleColumn::Area).await?;

    Ok(GeoSummary {
        field,
        event_counts,
        area_sums: sum_area_groups(pairs),
    })
}
