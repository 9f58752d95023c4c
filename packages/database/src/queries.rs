//! Record store queries for both datasets.
//!
//! Listings always order by primary key so pages are stable. Filtered
//! listings go through [`event_filters`] / [`land_title_filters`], which
//! map request parameters onto column predicates before any SQL runs.

use std::fmt::Write as _;

use conflict_atlas_database_models::{ConflictEventRow, EventQuery, LandTitleQuery, LandTitleRow};
use conflict_atlas_records_models::{Column, EventColumn, LandTitleColumn, Scalar};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue, Row};

use crate::DbError;
use crate::filter::{
    Conjunction, FilterPair, Predicate, float, int, quote_ident, text, to_database_value,
};
use crate::rows::{row_to_event, row_to_land_title, typed_scalar};

/// Maps an [`EventQuery`] onto event predicates.
///
/// `actor` matches either actor slot; everything else is equality.
#[must_use]
pub fn event_filters(query: &EventQuery) -> Conjunction<EventColumn> {
    let pairs: [FilterPair<EventColumn>; 14] = [
        (int(query.year), |v| Predicate::Eq(EventColumn::Year, v)),
        (int(query.month), |v| Predicate::Eq(EventColumn::Month, v)),
        (int(query.quarter), |v| Predicate::Eq(EventColumn::Quarter, v)),
        (text(query.region.as_deref()), |v| {
            Predicate::Eq(EventColumn::Region, v)
        }),
        (text(query.province.as_deref()), |v| {
            Predicate::Eq(EventColumn::Province, v)
        }),
        (text(query.commune.as_deref()), |v| {
            Predicate::Eq(EventColumn::Commune, v)
        }),
        (text(query.event_type.as_deref()), |v| {
            Predicate::Eq(EventColumn::EventType, v)
        }),
        (text(query.event_specific.as_deref()), |v| {
            Predicate::Eq(EventColumn::EventSpecific, v)
        }),
        (text(query.location_type.as_deref()), |v| {
            Predicate::Eq(EventColumn::LocationType, v)
        }),
        (text(query.actor_indigenous.as_deref()), |v| {
            Predicate::Eq(EventColumn::ActorIndigenous, v)
        }),
        (text(query.indigenous_identified.as_deref()), |v| {
            Predicate::Eq(EventColumn::IndigenousIdentified, v)
        }),
        (text(query.confrontation_type.as_deref()), |v| {
            Predicate::Eq(EventColumn::Confrontation, v)
        }),
        (text(query.initiator.as_deref()), |v| {
            Predicate::Eq(EventColumn::Initiator, v)
        }),
        (text(query.actor.as_deref()), |v| {
            Predicate::AnyEq(vec![EventColumn::Actor1Name, EventColumn::Actor2Name], v)
        }),
    ];

    Conjunction::from_pairs(pairs)
}

/// Maps a [`LandTitleQuery`] onto land-title predicates.
///
/// `area_min`/`area_max` are inclusive numeric bounds on the text `area`
/// column; everything else is equality.
#[must_use]
pub fn land_title_filters(query: &LandTitleQuery) -> Conjunction<LandTitleColumn> {
    let pairs: [FilterPair<LandTitleColumn>; 11] = [
        (int(query.region_id), |v| {
            Predicate::Eq(LandTitleColumn::RegionId, v)
        }),
        (int(query.province_id), |v| {
            Predicate::Eq(LandTitleColumn::ProvinceId, v)
        }),
        (int(query.commune_id), |v| {
            Predicate::Eq(LandTitleColumn::CommuneId, v)
        }),
        (text(query.region.as_deref()), |v| {
            Predicate::Eq(LandTitleColumn::RegionName, v)
        }),
        (text(query.province.as_deref()), |v| {
            Predicate::Eq(LandTitleColumn::ProvinceName, v)
        }),
        (text(query.commune.as_deref()), |v| {
            Predicate::Eq(LandTitleColumn::CommuneName, v)
        }),
        (text(query.place.as_deref()), |v| {
            Predicate::Eq(LandTitleColumn::Place, v)
        }),
        (text(query.beneficiary.as_deref()), |v| {
            Predicate::Eq(LandTitleColumn::Beneficiary, v)
        }),
        (int(query.grant_year), |v| {
            Predicate::Eq(LandTitleColumn::GrantYear, v)
        }),
        (float(query.area_min), |v| {
            Predicate::AtLeast(LandTitleColumn::Area, v)
        }),
        (float(query.area_max), |v| {
            Predicate::AtMost(LandTitleColumn::Area, v)
        }),
    ];

    Conjunction::from_pairs(pairs)
}

/// Runs `SELECT *` against `C`'s table with the given filter and optional
/// page bounds, in primary-key order.
async fn select_rows<C: Column>(
    db: &dyn Database,
    filter: &Conjunction<C>,
    page: Option<(u32, u32)>,
) -> Result<Vec<Row>, DbError> {
    let compiled = filter.to_sql(1);
    let mut sql = format!(
        "SELECT * FROM {}{} ORDER BY id",
        C::TABLE,
        compiled.where_clause
    );
    let mut params: Vec<DatabaseValue> = compiled.params.iter().map(to_database_value).collect();

    if let Some((offset, limit)) = page {
        let idx = compiled.next_idx;
        write!(sql, " LIMIT ${idx} OFFSET ${}", idx + 1).unwrap();
        params.push(DatabaseValue::Int64(i64::from(limit)));
        params.push(DatabaseValue::Int64(i64::from(offset)));
    }

    log::debug!("{sql}");

    Ok(db.query_raw_params(&sql, &params).await?)
}

/// Looks up a single row of `C`'s table by primary key.
async fn select_by_id<C: Column>(db: &dyn Database, id: i64) -> Result<Row, DbError> {
    let rows = db
        .query_raw_params(
            &format!("SELECT * FROM {} WHERE id = $1", C::TABLE),
            &[DatabaseValue::Int64(id)],
        )
        .await?;

    rows.into_iter().next().ok_or(DbError::NotFound {
        table: C::TABLE,
        id,
    })
}

/// Fetches one conflict event by id.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no event has this id, or
/// [`DbError::Database`] if the query fails.
pub async fn find_event_by_id(db: &dyn Database, id: i64) -> Result<ConflictEventRow, DbError> {
    select_by_id::<EventColumn>(db, id)
        .await
        .map(|row| row_to_event(&row))
}

/// Fetches one land-title grant by id.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no grant has this id, or
/// [`DbError::Database`] if the query fails.
pub async fn find_land_title_by_id(db: &dyn Database, id: i64) -> Result<LandTitleRow, DbError> {
    select_by_id::<LandTitleColumn>(db, id)
        .await
        .map(|row| row_to_land_title(&row))
}

/// Returns an unfiltered page of conflict events.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn list_events(
    db: &dyn Database,
    offset: u32,
    limit: u32,
) -> Result<Vec<ConflictEventRow>, DbError> {
    let rows = select_rows(db, &Conjunction::<EventColumn>::new(), Some((offset, limit))).await?;
    Ok(rows.iter().map(row_to_event).collect())
}

/// Returns every conflict event.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn all_events(db: &dyn Database) -> Result<Vec<ConflictEventRow>, DbError> {
    let rows = select_rows(db, &Conjunction::<EventColumn>::new(), None).await?;
    Ok(rows.iter().map(row_to_event).collect())
}

/// Returns the page of conflict events matching every filter in `query`.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn query_events(
    db: &dyn Database,
    query: &EventQuery,
) -> Result<Vec<ConflictEventRow>, DbError> {
    let filter = event_filters(query);
    let rows = select_rows(db, &filter, Some((query.offset, query.limit))).await?;
    Ok(rows.iter().map(row_to_event).collect())
}

/// Returns an unfiltered page of land-title grants.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn list_land_titles(
    db: &dyn Database,
    offset: u32,
    limit: u32,
) -> Result<Vec<LandTitleRow>, DbError> {
    let rows = select_rows(
        db,
        &Conjunction::<LandTitleColumn>::new(),
        Some((offset, limit)),
    )
    .await?;
    Ok(rows.iter().map(row_to_land_title).collect())
}

/// Returns every land-title grant.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn all_land_titles(db: &dyn Database) -> Result<Vec<LandTitleRow>, DbError> {
    let rows = select_rows(db, &Conjunction::<LandTitleColumn>::new(), None).await?;
    Ok(rows.iter().map(row_to_land_title).collect())
}

/// Returns the page of land-title grants matching every filter in `query`.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn query_land_titles(
    db: &dyn Database,
    query: &LandTitleQuery,
) -> Result<Vec<LandTitleRow>, DbError> {
    let filter = land_title_filters(query);
    let rows = select_rows(db, &filter, Some((query.offset, query.limit))).await?;
    Ok(rows.iter().map(row_to_land_title).collect())
}

/// Returns the distinct values of `column` as text, `None` standing for
/// `NULL`. Order is unspecified.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn distinct_values<C: Column>(
    db: &dyn Database,
    column: C,
) -> Result<Vec<Option<String>>, DbError> {
    let sql = format!(
        "SELECT DISTINCT CAST({} AS TEXT) AS value FROM {}",
        quote_ident(column.name()),
        C::TABLE
    );
    let rows = db.query_raw_params(&sql, &[]).await?;

    Ok(rows
        .iter()
        .map(|row| row.to_value::<Option<String>>("value").unwrap_or(None))
        .collect())
}

/// Counts rows per distinct value of `column`, including the `NULL` group.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn group_counts<C: Column>(
    db: &dyn Database,
    column: C,
) -> Result<Vec<(Option<Scalar>, u64)>, DbError> {
    let col = quote_ident(column.name());
    let sql = format!(
        "SELECT {col} AS group_key, typeof({col}) AS key_type, COUNT(*) AS cnt
         FROM {}
         GROUP BY {col}",
        C::TABLE
    );
    let rows = db.query_raw_params(&sql, &[]).await?;

    Ok(rows
        .iter()
        .map(|row| {
            let cnt: i64 = row.to_value("cnt").unwrap_or(0);
            (
                typed_scalar(row, "group_key", "key_type"),
                u64::try_from(cnt).unwrap_or(0),
            )
        })
        .collect())
}

/// Returns `(group key, value as text)` for every row of `C`'s table.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn group_value_pairs<C: Column>(
    db: &dyn Database,
    group: C,
    value: C,
) -> Result<Vec<(Option<Scalar>, Option<String>)>, DbError> {
    let group_col = quote_ident(group.name());
    let sql = format!(
        "SELECT {group_col} AS group_key, typeof({group_col}) AS key_type,
                CAST({} AS TEXT) AS value
         FROM {}
         ORDER BY id",
        quote_ident(value.name()),
        C::TABLE
    );
    let rows = db.query_raw_params(&sql, &[]).await?;

    Ok(rows
        .iter()
        .map(|row| {
            (
                typed_scalar(row, "group_key", "key_type"),
                row.to_value::<Option<String>>("value").unwrap_or(None),
            )
        })
        .collect())
}

/// Returns `(id, value as text)` for every row of `C`'s table, in
/// primary-key order.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn id_value_pairs<C: Column>(
    db: &dyn Database,
    column: C,
) -> Result<Vec<(i64, Option<String>)>, DbError> {
    let sql = format!(
        "SELECT id, CAST({} AS TEXT) AS value FROM {} ORDER BY id",
        quote_ident(column.name()),
        C::TABLE
    );
    let rows = db.query_raw_params(&sql, &[]).await?;

    Ok(rows
        .iter()
        .map(|row| {
            (
                row.to_value("id").unwrap_or(0),
                row.to_value::<Option<String>>("value").unwrap_or(None),
            )
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use conflict_atlas_records_models::{cmp_optional, coerce_float};

    use super::*;
    use crate::testing::{TestDb, insert_row};

    async fn event(db: &dyn Database, values: &[(EventColumn, Scalar)]) -> i64 {
        insert_row(db, values).await
    }

    async fn title(db: &dyn Database, values: &[(LandTitleColumn, Scalar)]) -> i64 {
        insert_row(db, values).await
    }

    #[test]
    fn event_filters_skip_absent_and_empty_values() {
        let query = EventQuery {
            region: Some("Biobío".to_string()),
            province: Some(String::new()),
            year: Some(2010),
            ..EventQuery::default()
        };
        assert_eq!(
            event_filters(&query).predicates(),
            &[
                Predicate::Eq(EventColumn::Year, Scalar::Int(2010)),
                Predicate::Eq(EventColumn::Region, Scalar::from("Biobío")),
            ]
        );
        assert!(event_filters(&EventQuery::default()).is_empty());
    }

    #[test]
    fn land_title_area_bounds_become_range_predicates() {
        let query = LandTitleQuery {
            area_min: Some(5.0),
            area_max: Some(50.0),
            commune: Some("Ercilla".to_string()),
            ..LandTitleQuery::default()
        };
        assert_eq!(
            land_title_filters(&query).predicates(),
            &[
                Predicate::Eq(LandTitleColumn::CommuneName, Scalar::from("Ercilla")),
                Predicate::AtLeast(LandTitleColumn::Area, Scalar::Float(5.0)),
                Predicate::AtMost(LandTitleColumn::Area, Scalar::Float(50.0)),
            ]
        );
    }

    #[tokio::test]
    async fn region_and_year_filters_are_conjunctive() {
        let test_db = TestDb::new().await;
        let db = test_db.db();
        let first = event(
            db,
            &[
                (EventColumn::Year, Scalar::Int(2010)),
                (EventColumn::Region, Scalar::from("Biobío")),
            ],
        )
        .await;
        let second = event(
            db,
            &[
                (EventColumn::Year, Scalar::Int(2011)),
                (EventColumn::Region, Scalar::from("Biobío")),
            ],
        )
        .await;
        event(db, &[(EventColumn::Region, Scalar::from("Araucanía"))]).await;

        let by_region = query_events(
            db,
            &EventQuery {
                region: Some("Biobío".to_string()),
                ..EventQuery::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(
            by_region.iter().map(|e| e.id).collect::<Vec<_>>(),
            vec![first, second]
        );

        let by_region_and_year = query_events(
            db,
            &EventQuery {
                region: Some("Biobío".to_string()),
                year: Some(2010),
                ..EventQuery::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(
            by_region_and_year.iter().map(|e| e.id).collect::<Vec<_>>(),
            vec![first]
        );
    }

    #[tokio::test]
    async fn actor_filter_matches_either_slot_and_respects_other_filters() {
        let test_db = TestDb::new().await;
        let db = test_db.db();
        let slot_one = event(
            db,
            &[
                (EventColumn::Actor1Name, Scalar::from("Comunidad")),
                (EventColumn::Region, Scalar::from("Araucanía")),
            ],
        )
        .await;
        let slot_two = event(
            db,
            &[
                (EventColumn::Actor2Name, Scalar::from("Comunidad")),
                (EventColumn::Region, Scalar::from("Araucanía")),
            ],
        )
        .await;
        event(
            db,
            &[
                (EventColumn::Actor2Name, Scalar::from("Comunidad")),
                (EventColumn::Region, Scalar::from("Biobío")),
            ],
        )
        .await;
        event(db, &[(EventColumn::Actor1Name, Scalar::from("Forestal"))]).await;

        let found = query_events(
            db,
            &EventQuery {
                actor: Some("Comunidad".to_string()),
                region: Some("Araucanía".to_string()),
                ..EventQuery::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(
            found.iter().map(|e| e.id).collect::<Vec<_>>(),
            vec![slot_one, slot_two]
        );
        assert!(found.iter().all(|e| {
            e.actor_1.name.as_deref() == Some("Comunidad")
                || e.actor_2.name.as_deref() == Some("Comunidad")
        }));
    }

    #[tokio::test]
    async fn pagination_applies_after_filtering_in_id_order() {
        let test_db = TestDb::new().await;
        let db = test_db.db();
        let mut matching = Vec::new();
        for i in 0..5 {
            let region = if i % 2 == 0 { "Biobío" } else { "Los Ríos" };
            let id = event(db, &[(EventColumn::Region, Scalar::from(region))]).await;
            if i % 2 == 0 {
                matching.push(id);
            }
        }

        let page = query_events(
            db,
            &EventQuery {
                region: Some("Biobío".to_string()),
                offset: 1,
                limit: 1,
                ..EventQuery::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(page.iter().map(|e| e.id).collect::<Vec<_>>(), vec![matching[1]]);

        let unfiltered = list_events(db, 3, 100).await.unwrap();
        assert_eq!(unfiltered.len(), 2);
    }

    #[tokio::test]
    async fn get_by_id_round_trips_listed_records() {
        let test_db = TestDb::new().await;
        let db = test_db.db();
        event(
            db,
            &[
                (EventColumn::Year, Scalar::Int(2012)),
                (EventColumn::Killed, Scalar::Int(1)),
                (EventColumn::EstimatedLoss, Scalar::Float(1500.5)),
                (EventColumn::Description, Scalar::from("Quema de maquinaria")),
            ],
        )
        .await;
        event(db, &[]).await;

        for listed in all_events(db).await.unwrap() {
            let fetched = find_event_by_id(db, listed.id).await.unwrap();
            assert_eq!(fetched, listed);
        }
    }

    #[tokio::test]
    async fn missing_id_is_not_found() {
        let test_db = TestDb::new().await;
        let err = find_land_title_by_id(test_db.db(), 42).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(matches!(
            err,
            DbError::NotFound {
                table: "tierras_titulomerced",
                id: 42
            }
        ));
    }

    #[tokio::test]
    async fn malformed_numeric_columns_decode_as_none() {
        let test_db = TestDb::new().await;
        let db = test_db.db();
        let id = event(
            db,
            &[
                (EventColumn::Year, Scalar::from("abc")),
                (EventColumn::Month, Scalar::from("")),
                (EventColumn::Arrests, Scalar::from("3")),
                (EventColumn::MellaIndex, Scalar::from("n/a")),
            ],
        )
        .await;

        let row = find_event_by_id(db, id).await.unwrap();
        assert_eq!(row.year, None);
        assert_eq!(row.month, None);
        assert_eq!(row.arrests, Some(3));
        assert_eq!(row.mella_index, None);
    }

    #[tokio::test]
    async fn area_range_is_inclusive_and_ignores_free_text() {
        let test_db = TestDb::new().await;
        let db = test_db.db();
        let small = title(db, &[(LandTitleColumn::Area, Scalar::from("5"))]).await;
        let middle = title(db, &[(LandTitleColumn::Area, Scalar::from("12.5"))]).await;
        let large = title(db, &[(LandTitleColumn::Area, Scalar::from("100"))]).await;
        title(db, &[(LandTitleColumn::Area, Scalar::from("n/a"))]).await;
        title(db, &[(LandTitleColumn::Area, Scalar::from(""))]).await;
        title(db, &[]).await;

        let ids = |rows: Vec<LandTitleRow>| rows.iter().map(|r| r.id).collect::<Vec<_>>();

        let bounded = query_land_titles(
            db,
            &LandTitleQuery {
                area_min: Some(5.0),
                area_max: Some(12.5),
                ..LandTitleQuery::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(ids(bounded), vec![small, middle]);

        let lower_only = query_land_titles(
            db,
            &LandTitleQuery {
                area_min: Some(0.0),
                ..LandTitleQuery::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(ids(lower_only), vec![small, middle, large]);
    }

    #[tokio::test]
    async fn area_range_agrees_with_float_coercion() {
        let test_db = TestDb::new().await;
        let db = test_db.db();
        let mut seeded = Vec::new();
        for area in [".", "1.2.3", "-5", "1e3", "+7", ".5", "5.", " 9\t", "-", "12,5"] {
            let id = title(db, &[(LandTitleColumn::Area, Scalar::from(area))]).await;
            seeded.push((id, area));
        }

        for (min, max) in [(-100.0, 100.0), (-1.0, 10.0), (1.0, 2000.0)] {
            let found = query_land_titles(
                db,
                &LandTitleQuery {
                    area_min: Some(min),
                    area_max: Some(max),
                    ..LandTitleQuery::default()
                },
            )
            .await
            .unwrap();
            let expected: Vec<i64> = seeded
                .iter()
                .filter(|(_, area)| {
                    coerce_float(Some(area)).is_some_and(|a| (min..=max).contains(&a))
                })
                .map(|(id, _)| *id)
                .collect();
            assert_eq!(
                found.iter().map(|r| r.id).collect::<Vec<_>>(),
                expected,
                "bounds {min}..={max}"
            );
        }
    }

    #[tokio::test]
    async fn group_counts_keep_storage_types_and_null_group() {
        let test_db = TestDb::new().await;
        let db = test_db.db();
        for year in [2010, 2010, 2011] {
            event(db, &[(EventColumn::Year, Scalar::Int(year))]).await;
        }
        event(db, &[]).await;

        let mut counts = group_counts(db, EventColumn::Year).await.unwrap();
        counts.sort_by(|a, b| cmp_optional(a.0.as_ref(), b.0.as_ref()));
        assert_eq!(
            counts,
            vec![
                (None, 1),
                (Some(Scalar::Int(2010)), 2),
                (Some(Scalar::Int(2011)), 1),
            ]
        );
    }

    #[tokio::test]
    async fn distinct_values_include_null_marker() {
        let test_db = TestDb::new().await;
        let db = test_db.db();
        event(db, &[(EventColumn::Region, Scalar::from("Biobío"))]).await;
        event(db, &[(EventColumn::Region, Scalar::from("Biobío"))]).await;
        event(db, &[]).await;

        let mut values = distinct_values(db, EventColumn::Region).await.unwrap();
        values.sort();
        assert_eq!(values, vec![None, Some("Biobío".to_string())]);
    }
}
