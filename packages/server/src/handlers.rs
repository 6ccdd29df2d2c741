//! HTTP handler functions for the slope map API.

use actix_web::{HttpResponse, web};
use slope_map_annotations::PolygonDraft;
use slope_map_geo_models::BoundingBox;
use slope_map_server_models::{
    ApiError, ApiHealth, ApiNote, ApiRiskLevel, ApiSensor, ApiSummary, CheckpointCreateRequest,
    ClusterQueryParams, DeleteParams, NoteCreateRequest, RiskAreaCreateRequest, SensorQueryParams,
};
use slope_map_telemetry_models::{RiskLevel, SensorNode};
use slope_map_view::{FilterState, ViewModel, cluster, filter_sensors, heatmap_points};

use crate::AppState;

/// Zoom level assumed when the clusters endpoint omits `zoom`.
const DEFAULT_CLUSTER_ZOOM: u8 = 12;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/risks`
///
/// Returns the four-level risk taxonomy with colors and heatmap weights.
pub async fn risks() -> HttpResponse {
    let levels: Vec<ApiRiskLevel> = RiskLevel::all()
        .iter()
        .map(|r| ApiRiskLevel::from(*r))
        .collect();
    HttpResponse::Ok().json(levels)
}

/// `GET /api/sensors`
///
/// Returns seed sensors plus user checkpoints through the filter pipeline,
/// each annotated with the risk area containing it.
pub async fn sensors(
    state: web::Data<AppState>,
    params: web::Query<SensorQueryParams>,
) -> HttpResponse {
    let filter = filter_from_params(&params);
    let scratch = state.scratch.lock().expect("scratch lock poisoned");
    let index = state.index.read().expect("index lock poisoned");

    let checkpoint_ids: Vec<&str> = scratch
        .state()
        .checkpoints
        .iter()
        .map(|c| c.id.as_str())
        .collect();
    let nodes = combined_nodes(&state, &scratch);
    let matched = filter_sensors(&nodes, &filter);

    let api_sensors: Vec<ApiSensor> = matched
        .iter()
        .map(|node| {
            let area = index
                .lookup(node.longitude, node.latitude)
                .map(|hit| hit.name.to_string());
            let checkpoint = checkpoint_ids.contains(&node.id.as_str());
            ApiSensor::from_node(node, area, checkpoint)
        })
        .collect();

    HttpResponse::Ok().json(api_sensors)
}

/// `GET /api/areas`
///
/// Returns seed plus drawn risk areas as a `GeoJSON` `FeatureCollection`.
pub async fn areas(state: web::Data<AppState>) -> HttpResponse {
    let scratch = state.scratch.lock().expect("scratch lock poisoned");
    let mut all = state.seed_areas.clone();
    all.extend(scratch.state().drawn_areas.iter().cloned());
    HttpResponse::Ok().json(slope_map_spatial::to_feature_collection(&all))
}

/// `GET /api/summary`
///
/// Returns total count, per-risk legend counts, and fitted bounds for the
/// current filter state.
pub async fn summary(
    state: web::Data<AppState>,
    params: web::Query<SensorQueryParams>,
) -> HttpResponse {
    let filter = filter_from_params(&params);
    let scratch = state.scratch.lock().expect("scratch lock poisoned");
    let nodes = combined_nodes(&state, &scratch);
    let vm = ViewModel::derive(&nodes, &filter);

    HttpResponse::Ok().json(ApiSummary {
        total_count: vm.sensors.len() as u64,
        by_risk: vm.counts,
        bounds: vm.bounds,
    })
}

/// `GET /api/clusters`
///
/// Returns zoom-dependent grid clusters for the current filter state.
pub async fn clusters(
    state: web::Data<AppState>,
    params: web::Query<ClusterQueryParams>,
) -> HttpResponse {
    let filter = FilterState {
        risks: parse_csv(params.risks.as_deref()),
        kinds: parse_csv(params.kinds.as_deref()),
        query: params.q.clone(),
        bbox: params.bbox.as_deref().and_then(parse_bbox),
    };
    let zoom = params.zoom.unwrap_or(DEFAULT_CLUSTER_ZOOM);

    let scratch = state.scratch.lock().expect("scratch lock poisoned");
    let nodes = combined_nodes(&state, &scratch);
    let matched = filter_sensors(&nodes, &filter);

    HttpResponse::Ok().json(cluster(&matched, zoom))
}

/// `GET /api/heatmap`
///
/// Returns one weight point per matching node for the kernel-density
/// overlay.
pub async fn heatmap(
    state: web::Data<AppState>,
    params: web::Query<SensorQueryParams>,
) -> HttpResponse {
    let filter = filter_from_params(&params);
    let scratch = state.scratch.lock().expect("scratch lock poisoned");
    let nodes = combined_nodes(&state, &scratch);
    let matched = filter_sensors(&nodes, &filter);

    HttpResponse::Ok().json(heatmap_points(&matched))
}

/// `GET /api/notes`
pub async fn list_notes(state: web::Data<AppState>) -> HttpResponse {
    let scratch = state.scratch.lock().expect("scratch lock poisoned");
    let notes: Vec<ApiNote> = scratch.state().notes.iter().map(ApiNote::from).collect();
    HttpResponse::Ok().json(notes)
}

/// `POST /api/notes`
pub async fn create_note(
    state: web::Data<AppState>,
    body: web::Json<NoteCreateRequest>,
) -> HttpResponse {
    if body.body.trim().is_empty() {
        return HttpResponse::BadRequest().json(ApiError::new("Note body must not be empty"));
    }

    let mut scratch = state.scratch.lock().expect("scratch lock poisoned");
    let note = ApiNote::from(scratch.add_note(body.longitude, body.latitude, body.body.clone()));
    match scratch.save() {
        Ok(()) => HttpResponse::Ok().json(note),
        Err(e) => {
            log::error!("Failed to save scratch state: {e}");
            HttpResponse::InternalServerError().json(ApiError::new("Failed to save annotations"))
        }
    }
}

/// `DELETE /api/notes?id=...`
pub async fn delete_note(
    state: web::Data<AppState>,
    params: web::Query<DeleteParams>,
) -> HttpResponse {
    let mut scratch = state.scratch.lock().expect("scratch lock poisoned");
    if !scratch.remove_note(&params.id) {
        return HttpResponse::NotFound().json(ApiError::new("No such note"));
    }
    persist(&scratch)
}

/// `GET /api/checkpoints`
pub async fn list_checkpoints(state: web::Data<AppState>) -> HttpResponse {
    let scratch = state.scratch.lock().expect("scratch lock poisoned");
    HttpResponse::Ok().json(scratch.state().checkpoints.clone())
}

/// `POST /api/checkpoints`
pub async fn create_checkpoint(
    state: web::Data<AppState>,
    body: web::Json<CheckpointCreateRequest>,
) -> HttpResponse {
    if body.name.trim().is_empty() {
        return HttpResponse::BadRequest().json(ApiError::new("Checkpoint name must not be empty"));
    }

    let node = SensorNode {
        id: format!("cp-{}", uuid::Uuid::new_v4()),
        name: body.name.clone(),
        longitude: body.longitude,
        latitude: body.latitude,
        kinds: body.kinds.clone(),
        risk: body.risk.unwrap_or(RiskLevel::Info),
        last_seen: chrono::Utc::now().to_rfc3339(),
        battery_voltage: 0.0,
    };

    let mut scratch = state.scratch.lock().expect("scratch lock poisoned");
    scratch.add_checkpoint(node.clone());
    match scratch.save() {
        Ok(()) => HttpResponse::Ok().json(node),
        Err(e) => {
            log::error!("Failed to save scratch state: {e}");
            HttpResponse::InternalServerError().json(ApiError::new("Failed to save annotations"))
        }
    }
}

/// `DELETE /api/checkpoints?id=...`
pub async fn delete_checkpoint(
    state: web::Data<AppState>,
    params: web::Query<DeleteParams>,
) -> HttpResponse {
    let mut scratch = state.scratch.lock().expect("scratch lock poisoned");
    if !scratch.remove_checkpoint(&params.id) {
        return HttpResponse::NotFound().json(ApiError::new("No such checkpoint"));
    }
    persist(&scratch)
}

/// `GET /api/risk-areas`
///
/// Returns only the user-drawn areas (seed areas come from `/api/areas`).
pub async fn list_risk_areas(state: web::Data<AppState>) -> HttpResponse {
    let scratch = state.scratch.lock().expect("scratch lock poisoned");
    HttpResponse::Ok().json(scratch.state().drawn_areas.clone())
}

/// `POST /api/risk-areas`
///
/// Finalizes a drawn polygon. Rejects drafts with fewer than three
/// vertices.
pub async fn create_risk_area(
    state: web::Data<AppState>,
    body: web::Json<RiskAreaCreateRequest>,
) -> HttpResponse {
    let mut draft = PolygonDraft::default();
    for &[lng, lat] in &body.vertices {
        draft.push_vertex(lng, lat);
    }

    let mut scratch = state.scratch.lock().expect("scratch lock poisoned");
    let area = match scratch.add_drawn_area(draft, body.name.clone(), body.risk) {
        Ok(area) => area.clone(),
        Err(e) => {
            return HttpResponse::BadRequest().json(ApiError::new(e.to_string()));
        }
    };

    if let Err(e) = scratch.save() {
        log::error!("Failed to save scratch state: {e}");
        return HttpResponse::InternalServerError().json(ApiError::new("Failed to save annotations"));
    }
    state.rebuild_index(&scratch);
    HttpResponse::Ok().json(area)
}

/// `DELETE /api/risk-areas?id=...`
pub async fn delete_risk_area(
    state: web::Data<AppState>,
    params: web::Query<DeleteParams>,
) -> HttpResponse {
    let mut scratch = state.scratch.lock().expect("scratch lock poisoned");
    if !scratch.remove_drawn_area(&params.id) {
        return HttpResponse::NotFound().json(ApiError::new("No such risk area"));
    }
    let response = persist(&scratch);
    state.rebuild_index(&scratch);
    response
}

/// Saves the scratch store, mapping failure to a 500 response.
fn persist(scratch: &slope_map_annotations::ScratchStore) -> HttpResponse {
    match scratch.save() {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "deleted": true })),
        Err(e) => {
            log::error!("Failed to save scratch state: {e}");
            HttpResponse::InternalServerError().json(ApiError::new("Failed to save annotations"))
        }
    }
}

/// Seed sensors followed by user checkpoints, cloned into one collection
/// for the derivation pipeline.
fn combined_nodes(
    state: &AppState,
    scratch: &slope_map_annotations::ScratchStore,
) -> Vec<SensorNode> {
    let mut nodes = state.seed_sensors.clone();
    nodes.extend(scratch.state().checkpoints.iter().cloned());
    nodes
}

/// Builds a [`FilterState`] from the shared query parameters.
fn filter_from_params(params: &SensorQueryParams) -> FilterState {
    FilterState {
        risks: parse_csv(params.risks.as_deref()),
        kinds: parse_csv(params.kinds.as_deref()),
        query: params.q.clone(),
        bbox: params.bbox.as_deref().and_then(parse_bbox),
    }
}

/// Parses a comma-separated enum list, silently skipping unknown names.
fn parse_csv<T: std::str::FromStr>(s: Option<&str>) -> Vec<T> {
    s.map(|s| s.split(',').filter_map(|v| v.trim().parse().ok()).collect())
        .unwrap_or_default()
}

/// Parses a bounding box string `"west,south,east,north"` into a
/// [`BoundingBox`].
fn parse_bbox(s: &str) -> Option<BoundingBox> {
    let parts: Vec<f64> = s.split(',').filter_map(|p| p.trim().parse().ok()).collect();
    if parts.len() == 4 {
        Some(BoundingBox::new(parts[0], parts[1], parts[2], parts[3]))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{App, test, web};
    use slope_map_annotations::ScratchStore;

    use super::*;

    fn test_state() -> web::Data<AppState> {
        let path =
            std::env::temp_dir().join(format!("slope-map-test-{}.json", uuid::Uuid::new_v4()));
        web::Data::new(AppState::new(ScratchStore::load(path)))
    }

    #[actix_web::test]
    async fn sensors_filter_by_risk() {
        let state = test_state();
        let app = test::init_service(
            App::new()
                .app_data(state)
                .route("/sensors", web::get().to(sensors)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/sensors?risks=EVACUATE")
            .to_request();
        let body: Vec<ApiSensor> = test::call_and_read_body_json(&app, req).await;
        assert!(!body.is_empty());
        assert!(body.iter().all(|s| s.risk == RiskLevel::Evacuate));
        assert!(body.iter().all(|s| !s.checkpoint));
    }

    #[actix_web::test]
    async fn summary_counts_all_seed_nodes() {
        let state = test_state();
        let seed_count = state.seed_sensors.len() as u64;
        let app = test::init_service(
            App::new()
                .app_data(state)
                .route("/summary", web::get().to(summary)),
        )
        .await;

        let req = test::TestRequest::get().uri("/summary").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["totalCount"], seed_count);
        assert!(body["bounds"].is_object());
    }

    #[actix_web::test]
    async fn risk_area_creation_enforces_vertex_minimum() {
        let state = test_state();
        let app = test::init_service(
            App::new()
                .app_data(state)
                .route("/risk-areas", web::post().to(create_risk_area)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/risk-areas")
            .set_json(serde_json::json!({
                "name": "Sketch",
                "risk": "WATCH",
                "vertices": [[0.0, 0.0], [1.0, 0.0]],
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn note_round_trip() {
        let state = test_state();
        let app = test::init_service(
            App::new()
                .app_data(state)
                .route("/notes", web::get().to(list_notes))
                .route("/notes", web::post().to(create_note))
                .route("/notes", web::delete().to(delete_note)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/notes")
            .set_json(serde_json::json!({
                "longitude": 137.55,
                "latitude": 36.29,
                "body": "Seepage at the toe",
            }))
            .to_request();
        let created: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let id = created["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::get().uri("/notes").to_request();
        let notes: Vec<serde_json::Value> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(notes.len(), 1);

        let req = test::TestRequest::delete()
            .uri(&format!("/notes?id={id}"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let req = test::TestRequest::get().uri("/notes").to_request();
        let notes: Vec<serde_json::Value> = test::call_and_read_body_json(&app, req).await;
        assert!(notes.is_empty());
    }
}
