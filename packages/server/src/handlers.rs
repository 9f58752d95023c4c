//! HTTP handler functions for the conflict atlas API.

use std::fmt::Display;

use actix_web::{HttpResponse, web};
use conflict_atlas_analytics::{AnalyticsError, aggregate, facets, join as join_ops};
use conflict_atlas_database::{DbError, queries};
use conflict_atlas_records_models::{EventGroupField, LandTitleGroupField, SharedGeoField};
use conflict_atlas_server_models::{
    ApiConflictEvent, ApiError, ApiHealth, ApiLandTitle, EventFilterParams, FieldParams,
    LandTitleFilterParams, PageParams,
};

use crate::AppState;

fn bad_request(e: &impl Display) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiError::new(e.to_string()))
}

fn server_error(action: &str, e: &impl Display) -> HttpResponse {
    log::error!("Failed to {action}: {e}");
    HttpResponse::InternalServerError().json(ApiError::new(format!("Failed to {action}")))
}

fn db_error(action: &str, e: &DbError) -> HttpResponse {
    if e.is_not_found() {
        HttpResponse::NotFound().json(ApiError::new(e.to_string()))
    } else {
        server_error(action, e)
    }
}

fn analytics_error(action: &str, e: &AnalyticsError) -> HttpResponse {
    match e {
        AnalyticsError::InvalidArgument(e) => bad_request(e),
        AnalyticsError::Database(e) => server_error(action, e),
    }
}

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/events?offset&limit`
pub async fn list_events(
    state: web::Data<AppState>,
    params: web::Query<PageParams>,
) -> HttpResponse {
    let (offset, limit) = params.resolve();
    match queries::list_events(state.db.as_ref(), offset, limit).await {
        Ok(rows) => {
            let events: Vec<ApiConflictEvent> = rows.into_iter().map(Into::into).collect();
            HttpResponse::Ok().json(events)
        }
        Err(e) => db_error("list events", &e),
    }
}

/// `GET /api/events/all`
pub async fn all_events(state: web::Data<AppState>) -> HttpResponse {
    match queries::all_events(state.db.as_ref()).await {
        Ok(rows) => {
            let events: Vec<ApiConflictEvent> = rows.into_iter().map(Into::into).collect();
            HttpResponse::Ok().json(events)
        }
        Err(e) => db_error("list events", &e),
    }
}

/// `GET /api/events/filter`
///
/// Every supplied filter must hold; `actor` matches either actor slot.
pub async fn filter_events(
    state: web::Data<AppState>,
    params: web::Query<EventFilterParams>,
) -> HttpResponse {
    let query = params.into_inner().into();
    match queries::query_events(state.db.as_ref(), &query).await {
        Ok(rows) => {
            let events: Vec<ApiConflictEvent> = rows.into_iter().map(Into::into).collect();
            HttpResponse::Ok().json(events)
        }
        Err(e) => db_error("query events", &e),
    }
}

/// `GET /api/events/filter-options`
pub async fn event_filter_options(state: web::Data<AppState>) -> HttpResponse {
    match facets::event_filter_options(state.db.as_ref()).await {
        Ok(options) => HttpResponse::Ok().json(options),
        Err(e) => analytics_error("build event filter options", &e),
    }
}

/// `GET /api/events/filter-options/{facet}`
pub async fn event_facet(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    match facets::event_facet(state.db.as_ref(), &path).await {
        Ok(values) => HttpResponse::Ok().json(values),
        Err(e) => analytics_error("build event facet", &e),
    }
}

/// `GET /api/events/count?field=`
pub async fn count_events(
    state: web::Data<AppState>,
    params: web::Query<FieldParams>,
) -> HttpResponse {
    let field = match EventGroupField::from_field(&params.field) {
        Ok(field) => field,
        Err(e) => return bad_request(&e),
    };
    match aggregate::count_events_by(state.db.as_ref(), field).await {
        Ok(counts) => HttpResponse::Ok().json(counts),
        Err(e) => analytics_error("count events", &e),
    }
}

/// `GET /api/events/{id}`
pub async fn get_event(state: web::Data<AppState>, path: web::Path<i64>) -> HttpResponse {
    match queries::find_event_by_id(state.db.as_ref(), path.into_inner()).await {
        Ok(row) => HttpResponse::Ok().json(ApiConflictEvent::from(row)),
        Err(e) => db_error("fetch event", &e),
    }
}

/// `GET /api/land-titles?offset&limit`
pub async fn list_land_titles(
    state: web::Data<AppState>,
    params: web::Query<PageParams>,
) -> HttpResponse {
    let (offset, limit) = params.resolve();
    match queries::list_land_titles(state.db.as_ref(), offset, limit).await {
        Ok(rows) => {
            let titles: Vec<ApiLandTitle> = rows.into_iter().map(Into::into).collect();
            HttpResponse::Ok().json(titles)
        }
        Err(e) => db_error("list land titles", &e),
    }
}

/// `GET /api/land-titles/all`
pub async fn all_land_titles(state: web::Data<AppState>) -> HttpResponse {
    match queries::all_land_titles(state.db.as_ref()).await {
        Ok(rows) => {
            let titles: Vec<ApiLandTitle> = rows.into_iter().map(Into::into).collect();
            HttpResponse::Ok().json(titles)
        }
        Err(e) => db_error("list land titles", &e),
    }
}

/// `GET /api/land-titles/filter`
///
/// `areaMin`/`areaMax` are inclusive and only consider numeric areas.
pub async fn filter_land_titles(
    state: web::Data<AppState>,
    params: web::Query<LandTitleFilterParams>,
) -> HttpResponse {
    let query = params.into_inner().into();
    match queries::query_land_titles(state.db.as_ref(), &query).await {
        Ok(rows) => {
            let titles: Vec<ApiLandTitle> = rows.into_iter().map(Into::into).collect();
            HttpResponse::Ok().json(titles)
        }
        Err(e) => db_error("query land titles", &e),
    }
}

/// `GET /api/land-titles/filter-options`
pub async fn land_title_filter_options(state: web::Data<AppState>) -> HttpResponse {
    match facets::land_title_filter_options(state.db.as_ref()).await {
        Ok(options) => HttpResponse::Ok().json(options),
        Err(e) => analytics_error("build land-title filter options", &e),
    }
}

/// `GET /api/land-titles/filter-options/{facet}`
pub async fn land_title_facet(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> HttpResponse {
    match facets::land_title_facet(state.db.as_ref(), &path).await {
        Ok(values) => HttpResponse::Ok().json(values),
        Err(e) => analytics_error("build land-title facet", &e),
    }
}

/// `GET /api/land-titles/count?field=`
pub async fn count_land_titles(
    state: web::Data<AppState>,
    params: web::Query<FieldParams>,
) -> HttpResponse {
    let field = match LandTitleGroupField::from_field(&params.field) {
        Ok(field) => field,
        Err(e) => return bad_request(&e),
    };
    match aggregate::count_land_titles_by(state.db.as_ref(), field).await {
        Ok(counts) => HttpResponse::Ok().json(counts),
        Err(e) => analytics_error("count land titles", &e),
    }
}

/// `GET /api/land-titles/area?field=`
pub async fn area_by(
    state: web::Data<AppState>,
    params: web::Query<FieldParams>,
) -> HttpResponse {
    let field = match LandTitleGroupField::from_field(&params.field) {
        Ok(field) => field,
        Err(e) => return bad_request(&e),
    };
    match aggregate::sum_area_by(state.db.as_ref(), field).await {
        Ok(sums) => HttpResponse::Ok().json(sums),
        Err(e) => analytics_error("sum land-title area", &e),
    }
}

/// `GET /api/land-titles/{id}`
pub async fn get_land_title(state: web::Data<AppState>, path: web::Path<i64>) -> HttpResponse {
    match queries::find_land_title_by_id(state.db.as_ref(), path.into_inner()).await {
        Ok(row) => HttpResponse::Ok().json(ApiLandTitle::from(row)),
        Err(e) => db_error("fetch land title", &e),
    }
}

/// `GET /api/join?field=`
pub async fn join(state: web::Data<AppState>, params: web::Query<FieldParams>) -> HttpResponse {
    let field = match SharedGeoField::from_field(&params.field) {
        Ok(field) => field,
        Err(e) => return bad_request(&e),
    };
    match join_ops::join_by(state.db.as_ref(), field).await {
        Ok(matches) => HttpResponse::Ok().json(matches),
        Err(e) => analytics_error("join datasets", &e),
    }
}

/// `GET /api/summary?field=`
pub async fn summary(
    state: web::Data<AppState>,
    params: web::Query<FieldParams>,
) -> HttpResponse {
    let field = match SharedGeoField::from_field(&params.field) {
        Ok(field) => field,
        Err(e) => return bad_request(&e),
    };
    match join_ops::summary_by(state.db.as_ref(), field).await {
        Ok(summary) => HttpResponse::Ok().json(summary),
        Err(e) => analytics_error("summarize datasets", &e),
    }
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use conflict_atlas_database::testing::{TestDb, insert_row};
    use conflict_atlas_records_models::{EventColumn, LandTitleColumn, Scalar};
    use serde_json::{Value, json};

    use crate::{AppState, configure};

    macro_rules! app {
        ($test_db:expr) => {
            test::init_service(
                App::new()
                    .app_data(actix_web::web::Data::new(AppState {
                        db: $test_db.shared(),
                    }))
                    .configure(configure),
            )
            .await
        };
    }

    async fn seed(test_db: &TestDb) {
        let db = test_db.db();
        for (year, region, actor1, actor2) in [
            (2010, "Biobío", "Comunidad", "Carabineros"),
            (2011, "Biobío", "Forestal", "Comunidad"),
            (2011, "Araucanía", "Carabineros", "Forestal"),
        ] {
            insert_row(
                db,
                &[
                    (EventColumn::Year, Scalar::Int(year)),
                    (EventColumn::Region, Scalar::from(region)),
                    (EventColumn::Actor1Name, Scalar::from(actor1)),
                    (EventColumn::Actor2Name, Scalar::from(actor2)),
                ],
            )
            .await;
        }
        for (region, area) in [("Biobío", "12.5"), ("Biobío", "n/a"), ("Araucanía", "30")] {
            insert_row(
                db,
                &[
                    (LandTitleColumn::RegionName, Scalar::from(region)),
                    (LandTitleColumn::Area, Scalar::from(area)),
                ],
            )
            .await;
        }
    }

    #[actix_web::test]
    async fn health_reports_version() {
        let test_db = TestDb::new().await;
        let app = app!(test_db);

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["healthy"], true);
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[actix_web::test]
    async fn filter_combines_region_and_year() {
        let test_db = TestDb::new().await;
        seed(&test_db).await;
        let app = app!(test_db);

        let req = test::TestRequest::get()
            .uri("/api/events/filter?region=Biob%C3%ADo&year=2010")
            .to_request();
        let body: Vec<Value> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.len(), 1);
        assert_eq!(body[0]["year"], 2010);
        assert_eq!(body[0]["actor1"]["name"], "Comunidad");
    }

    #[actix_web::test]
    async fn actor_filter_matches_either_slot() {
        let test_db = TestDb::new().await;
        seed(&test_db).await;
        let app = app!(test_db);

        let req = test::TestRequest::get()
            .uri("/api/events/filter?actor=Comunidad")
            .to_request();
        let body: Vec<Value> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.len(), 2);
    }

    #[actix_web::test]
    async fn blank_numeric_filters_are_ignored() {
        let test_db = TestDb::new().await;
        seed(&test_db).await;
        let app = app!(test_db);

        let req = test::TestRequest::get()
            .uri("/api/events/filter?region=Biob%C3%ADo&year=")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Vec<Value> = test::read_body_json(resp).await;
        assert_eq!(body.len(), 2);
        assert!(body.iter().all(|event| event["region"] == "Biobío"));

        let req = test::TestRequest::get()
            .uri("/api/land-titles/filter?areaMin=&limit=")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Vec<Value> = test::read_body_json(resp).await;
        assert_eq!(body.len(), 3);

        let req = test::TestRequest::get()
            .uri("/api/events/filter?year=soon")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn page_parameters_are_honored() {
        let test_db = TestDb::new().await;
        seed(&test_db).await;
        let app = app!(test_db);

        let req = test::TestRequest::get()
            .uri("/api/events?offset=1&limit=1")
            .to_request();
        let body: Vec<Value> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.len(), 1);
        assert_eq!(body[0]["year"], 2011);

        let req = test::TestRequest::get().uri("/api/events/all").to_request();
        let body: Vec<Value> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.len(), 3);
    }

    #[actix_web::test]
    async fn get_by_id_returns_404_when_missing() {
        let test_db = TestDb::new().await;
        seed(&test_db).await;
        let app = app!(test_db);

        let req = test::TestRequest::get()
            .uri("/api/land-titles/999")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get().uri("/api/land-titles/1").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["id"], 1);
        assert_eq!(body["region"], "Biobío");
    }

    #[actix_web::test]
    async fn count_by_year() {
        let test_db = TestDb::new().await;
        seed(&test_db).await;
        let app = app!(test_db);

        let req = test::TestRequest::get()
            .uri("/api/events/count?field=year")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(
            body,
            json!([{"value": 2011, "count": 2}, {"value": 2010, "count": 1}])
        );
    }

    #[actix_web::test]
    async fn area_sum_skips_unparseable_values() {
        let test_db = TestDb::new().await;
        seed(&test_db).await;
        let app = app!(test_db);

        let req = test::TestRequest::get()
            .uri("/api/land-titles/area?field=region")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(
            body,
            json!([
                {"value": "Araucanía", "totalArea": 30.0, "counted": 1},
                {"value": "Biobío", "totalArea": 12.5, "counted": 1},
            ])
        );
    }

    #[actix_web::test]
    async fn invalid_field_is_rejected_before_store_access() {
        let test_db = TestDb::new().await;
        test_db
            .db()
            .exec_raw("DROP TABLE conflicto_maceda")
            .await
            .unwrap();
        let app = app!(test_db);

        for uri in [
            "/api/events/count?field=description",
            "/api/land-titles/area?field=beneficiary",
            "/api/join?field=place",
            "/api/summary?field=year",
            "/api/events/filter-options/descriptions",
        ] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
            let body: Value = test::read_body_json(resp).await;
            assert!(body["error"].as_str().unwrap().contains("invalid field"));
        }
    }

    #[actix_web::test]
    async fn store_failure_is_500() {
        let test_db = TestDb::new().await;
        test_db
            .db()
            .exec_raw("DROP TABLE conflicto_maceda")
            .await
            .unwrap();
        let app = app!(test_db);

        let req = test::TestRequest::get().uri("/api/events").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[actix_web::test]
    async fn join_and_summary_on_region() {
        let test_db = TestDb::new().await;
        seed(&test_db).await;
        let app = app!(test_db);

        let req = test::TestRequest::get()
            .uri("/api/join?field=region")
            .to_request();
        let body: Vec<Value> = test::call_and_read_body_json(&app, req).await;
        // 2 Biobío events x 2 Biobío titles + 1 Araucanía pair
        assert_eq!(body.len(), 5);

        let req = test::TestRequest::get()
            .uri("/api/summary?field=region")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["field"], "region");
        assert_eq!(body["eventCounts"][0], json!({"value": "Biobío", "count": 2}));
        assert_eq!(body["areaSums"][0]["value"], "Araucanía");
    }

    #[actix_web::test]
    async fn filter_options_bundle() {
        let test_db = TestDb::new().await;
        seed(&test_db).await;
        let app = app!(test_db);

        let req = test::TestRequest::get()
            .uri("/api/events/filter-options")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["years"], json!([2010, 2011]));
        assert_eq!(
            body["actorNames"],
            json!(["Carabineros", "Comunidad", "Forestal"])
        );

        let req = test::TestRequest::get()
            .uri("/api/land-titles/filter-options/regions")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!(["Araucanía", "Biobío"]));
    }
}
