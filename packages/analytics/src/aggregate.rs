//! Group-by counts and area sums.
//!
//! Grouping fields arrive already validated against their allow-lists, so
//! nothing here ever sees a caller-supplied column name.

use conflict_atlas_analytics_models::{GroupAreaSum, GroupCount};
use conflict_atlas_database::queries::{group_counts, group_value_pairs};
use conflict_atlas_records_models::{
    EventGroupField, LandTitleColumn, LandTitleGroupField, Scalar, cmp_optional, coerce_float,
};
use switchy_database::Database;

use crate::AnalyticsError;

/// Orders raw `(key, count)` rows by count descending, then key.
pub(crate) fn ranked(raw: Vec<(Option<Scalar>, u64)>) -> Vec<GroupCount> {
    let mut counts: Vec<GroupCount> = raw
        .into_iter()
        .map(|(value, count)| GroupCount { value, count })
        .collect();
    counts.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| cmp_optional(a.value.as_ref(), b.value.as_ref()))
    });
    counts
}

/// Counts conflict events per value of `field`.
///
/// Records with no value form their own group with a `null` key.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if the store query fails.
pub async fn count_events_by(
    db: &dyn Database,
    field: EventGroupField,
) -> Result<Vec<GroupCount>, AnalyticsError> {
    log::debug!("Counting events by {field}");
    Ok(ranked(group_counts(db, field.column()).await?))
}

/// Counts land titles per value of `field`.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if the store query fails.
pub async fn count_land_titles_by(
    db: &dyn Database,
    field: LandTitleGroupField,
) -> Result<Vec<GroupCount>, AnalyticsError> {
    log::debug!("Counting land titles by {field}");
    Ok(ranked(group_counts(db, field.column()).await?))
}

/// Sums areas per group key.
///
/// Areas that don't coerce to a number are left out of both the total and
/// `counted`; a group whose areas are all unparseable still appears, with
/// a zero total. Groups are ordered by total area descending, then key.
#[must_use]
pub fn sum_area_groups(
    pairs: impl IntoIterator<Item = (Option<Scalar>, Option<String>)>,
) -> Vec<GroupAreaSum> {
    let mut pairs: Vec<_> = pairs.into_iter().collect();
    pairs.sort_by(|a, b| cmp_optional(a.0.as_ref(), b.0.as_ref()));

    let mut sums: Vec<GroupAreaSum> = Vec::new();
    for (key, area) in pairs {
        let idx = match sums.last() {
            Some(last) if cmp_optional(last.value.as_ref(), key.as_ref()).is_eq() => {
                sums.len() - 1
            }
            _ => {
                sums.push(GroupAreaSum {
                    value: key,
                    total_area: 0.0,
                    counted: 0,
                });
                sums.len() - 1
            }
        };
        if let Some(area) = coerce_float(area.as_deref()) {
            sums[idx].total_area += area;
            sums[idx].counted += 1;
        }
    }

    sums.sort_by(|a, b| {
        b.total_area
            .total_cmp(&a.total_area)
            .then_with(|| cmp_optional(a.value.as_ref(), b.value.as_ref()))
    });
    sums
}

/// Sums land-title area per value of `field`.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if the store query fails.
pub async fn sum_area_by(
    db: &dyn Database,
    field: LandTitleGroupField,
) -> Result<Vec<GroupAreaSum>, AnalyticsError> {
    log::debug!("Summing land-title area by {field}");
    let pairs = group_value_pairs(db, field.column(), LandTitleColumn::Area).await?;
    Ok(sum_area_groups(pairs))
}
