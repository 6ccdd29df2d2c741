#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the slope map prototype.
//!
//! Serves the REST API the map frontend renders from: filtered sensor
//! markers, risk area `GeoJSON`, legend summaries, grid clusters, heatmap
//! weight points, and the annotation scratch endpoints. Seed data is held
//! in memory for the process lifetime; only the annotation scratch file is
//! written to disk.

mod handlers;

use std::sync::{Mutex, RwLock};

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, middleware, web};
use slope_map_annotations::ScratchStore;
use slope_map_geo_models::RiskArea;
use slope_map_spatial::AreaIndex;
use slope_map_telemetry_models::SensorNode;

/// Shared application state.
pub struct AppState {
    /// Immutable seed sensor nodes.
    pub seed_sensors: Vec<SensorNode>,
    /// Immutable seed risk areas.
    pub seed_areas: Vec<RiskArea>,
    /// User annotation scratch store.
    pub scratch: Mutex<ScratchStore>,
    /// Spatial index over seed plus drawn areas; rebuilt when drawn areas
    /// change (cheap at prototype scale).
    pub index: RwLock<AreaIndex>,
}

impl AppState {
    /// Builds the state from the seed dataset and a loaded scratch store.
    #[must_use]
    pub fn new(scratch: ScratchStore) -> Self {
        let seed_sensors = slope_map_dataset::seed_sensors();
        let seed_areas = slope_map_dataset::seed_areas();
        let index = RwLock::new(build_index(&seed_areas, &scratch));
        Self {
            seed_sensors,
            seed_areas,
            scratch: Mutex::new(scratch),
            index,
        }
    }

    /// Rebuilds the spatial index after a drawn-area mutation.
    ///
    /// # Panics
    ///
    /// Panics if the index lock is poisoned.
    pub fn rebuild_index(&self, scratch: &ScratchStore) {
        let index = build_index(&self.seed_areas, scratch);
        *self.index.write().expect("index lock poisoned") = index;
    }
}

fn build_index(seed_areas: &[RiskArea], scratch: &ScratchStore) -> AreaIndex {
    let mut areas = seed_areas.to_vec();
    areas.extend(scratch.state().drawn_areas.iter().cloned());
    AreaIndex::build(&areas)
}

/// Starts the slope map API server.
///
/// Loads the seed dataset and the annotation scratch file, then starts the
/// Actix-Web HTTP server. This is a regular async function — the caller is
/// responsible for providing the async runtime (e.g. via
/// `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    let scratch_path = ScratchStore::default_path();
    log::info!("Loading annotation scratch from {}", scratch_path.display());
    let scratch = ScratchStore::load(scratch_path);

    let state = web::Data::new(AppState::new(scratch));
    log::info!(
        "Seeded {} sensors and {} risk areas",
        state.seed_sensors.len(),
        state.seed_areas.len()
    );

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
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(handlers::health))
                    .route("/risks", web::get().to(handlers::risks))
                    .route("/sensors", web::get().to(handlers::sensors))
                    .route("/areas", web::get().to(handlers::areas))
                    .route("/summary", web::get().to(handlers::summary))
                    .route("/clusters", web::get().to(handlers::clusters))
                    .route("/heatmap", web::get().to(handlers::heatmap))
                    .route("/notes", web::get().to(handlers::list_notes))
                    .route("/notes", web::post().to(handlers::create_note))
                    .route("/notes", web::delete().to(handlers::delete_note))
                    .route("/checkpoints", web::get().to(handlers::list_checkpoints))
                    .route("/checkpoints", web::post().to(handlers::create_checkpoint))
                    .route(
                        "/checkpoints",
                        web::delete().to(handlers::delete_checkpoint),
                    )
                    .route("/risk-areas", web::get().to(handlers::list_risk_areas))
                    .route("/risk-areas", web::post().to(handlers::create_risk_area))
                    .route("/risk-areas", web::delete().to(handlers::delete_risk_area)),
            )
            // Serve the map frontend (production build)
            .service(Files::new("/", "app/dist").index_file("index.html"))
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
