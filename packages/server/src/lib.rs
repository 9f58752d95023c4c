#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the conflict atlas.
//!
//! Serves read-only JSON endpoints over the conflict-event and land-title
//! datasets: paged and filtered listings, facet bundles for filter
//! controls, group-by counts and area sums, and the cross-dataset join.

mod handlers;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use conflict_atlas_database::{db, ensure_schema};
use switchy_database::Database;

/// Shared application state.
pub struct AppState {
    /// Record store connection.
    pub db: Arc<dyn Database>,
}

/// Registers every `/api` route.
///
/// Fixed path segments (`/all`, `/filter`, `/count`, ...) are registered
/// before the `/{id}` lookups so they are never parsed as ids.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/events", web::get().to(handlers::list_events))
            .route("/events/all", web::get().to(handlers::all_events))
            .route("/events/filter", web::get().to(handlers::filter_events))
            .route(
                "/events/filter-options",
                web::get().to(handlers::event_filter_options),
            )
            .route(
                "/events/filter-options/{facet}",
                web::get().to(handlers::event_facet),
            )
            .route("/events/count", web::get().to(handlers::count_events))
            .route("/events/{id}", web::get().to(handlers::get_event))
            .route("/land-titles", web::get().to(handlers::list_land_titles))
            .route("/land-titles/all", web::get().to(handlers::all_land_titles))
            .route(
                "/land-titles/filter",
                web::get().to(handlers::filter_land_titles),
            )
            .route(
                "/land-titles/filter-options",
                web::get().to(handlers::land_title_filter_options),
            )
            .route(
                "/land-titles/filter-options/{facet}",
                web::get().to(handlers::land_title_facet),
            )
            .route(
                "/land-titles/count",
                web::get().to(handlers::count_land_titles),
            )
            .route("/land-titles/area", web::get().to(handlers::area_by))
            .route("/land-titles/{id}", web::get().to(handlers::get_land_title))
            .route("/join", web::get().to(handlers::join))
            .route("/summary", web::get().to(handlers::summary)),
    );
}

/// Whether missing tables should be created at startup. Set
/// `ENSURE_SCHEMA=false` (or `0`) to skip.
fn ensure_schema_enabled() -> bool {
    !matches!(
        std::env::var("ENSURE_SCHEMA").as_deref(),
        Ok("false" | "0")
    )
}

/// Starts the conflict atlas API server.
///
/// Opens the `SQLite` store named by `DATABASE_PATH`, creates missing
/// tables, and starts the Actix-Web HTTP server on `BIND_ADDR:PORT`. The
/// caller is responsible for providing the async runtime (e.g. via
/// `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
///
/// # Panics
///
/// Panics if the database cannot be opened or the schema cannot be
/// created.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    log::info!("Connecting to database...");
    let db_conn = db::connect_from_env().expect("Failed to connect to database");

    if ensure_schema_enabled() {
        log::info!("Ensuring schema...");
        ensure_schema(db_conn.as_ref())
            .await
            .expect("Failed to create schema");
    }

    let state = web::Data::new(AppState {
        db: Arc::from(db_conn),
    });

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
