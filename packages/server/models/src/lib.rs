#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the slope map server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the core model types so the API contract can evolve independently
//! of the derivation pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use slope_map_annotations::Note;
use slope_map_geo_models::BoundingBox;
use slope_map_telemetry_models::{RiskLevel, SensorKind, SensorNode};
use slope_map_view::RiskCount;

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// One entry in the risk taxonomy returned by `GET /api/risks`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRiskLevel {
    /// Risk level name.
    pub name: String,
    /// Numeric value (1-4).
    pub value: u8,
    /// Marker/polygon hex color.
    pub color: String,
    /// Heatmap intensity weight.
    pub heatmap_weight: f64,
}

impl From<RiskLevel> for ApiRiskLevel {
    fn from(risk: RiskLevel) -> Self {
        Self {
            name: risk.to_string(),
            value: risk.value(),
            color: risk.color().to_string(),
            heatmap_weight: risk.heatmap_weight(),
        }
    }
}

/// A sensor node as returned by the API, annotated with the containing
/// risk area (if any) and whether it is a user checkpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSensor {
    /// Node id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Longitude.
    pub longitude: f64,
    /// Latitude.
    pub latitude: f64,
    /// Instruments on this node.
    pub kinds: Vec<SensorKind>,
    /// Risk level.
    pub risk: RiskLevel,
    /// Risk numeric value (1-4).
    pub risk_value: u8,
    /// Marker hex color.
    pub color: String,
    /// Last telemetry timestamp string.
    pub last_seen: String,
    /// Battery voltage.
    pub battery_voltage: f64,
    /// Name of the risk area containing this node, if any.
    pub area: Option<String>,
    /// `true` for user-placed checkpoints, `false` for seed nodes.
    pub checkpoint: bool,
}

impl ApiSensor {
    /// Builds the API shape from a node plus its area attribution.
    #[must_use]
    pub fn from_node(node: &SensorNode, area: Option<String>, checkpoint: bool) -> Self {
        Self {
            id: node.id.clone(),
            name: node.name.clone(),
            longitude: node.longitude,
            latitude: node.latitude,
            kinds: node.kinds.clone(),
            risk: node.risk,
            risk_value: node.risk.value(),
            color: node.risk.color().to_string(),
            last_seen: node.last_seen.clone(),
            battery_voltage: node.battery_voltage,
            area,
            checkpoint,
        }
    }
}

/// Query parameters shared by the sensors, summary, heatmap, and clusters
/// endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorQueryParams {
    /// Bounding box as `west,south,east,north`.
    pub bbox: Option<String>,
    /// Comma-separated list of risk level names to include.
    pub risks: Option<String>,
    /// Comma-separated list of sensor kind names to include.
    pub kinds: Option<String>,
    /// Free-text query against node id and name.
    pub q: Option<String>,
}

/// Query parameters for the clusters endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterQueryParams {
    /// Bounding box as `west,south,east,north`.
    pub bbox: Option<String>,
    /// Current map zoom level.
    pub zoom: Option<u8>,
    /// Comma-separated list of risk level names to include.
    pub risks: Option<String>,
    /// Comma-separated list of sensor kind names to include.
    pub kinds: Option<String>,
    /// Free-text query against node id and name.
    pub q: Option<String>,
}

/// Summary statistics for the current filter state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSummary {
    /// Total node count matching the filter.
    pub total_count: u64,
    /// Per-risk legend counts (zero-filled).
    pub by_risk: Vec<RiskCount>,
    /// Fitted map bounds, `None` when nothing matched.
    pub bounds: Option<BoundingBox>,
}

/// Request body for creating a note.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteCreateRequest {
    /// Pin longitude.
    pub longitude: f64,
    /// Pin latitude.
    pub latitude: f64,
    /// Free-text body.
    pub body: String,
}

/// A note as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiNote {
    /// Note id.
    pub id: String,
    /// Pin longitude.
    pub longitude: f64,
    /// Pin latitude.
    pub latitude: f64,
    /// Free-text body.
    pub body: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<&Note> for ApiNote {
    fn from(note: &Note) -> Self {
        Self {
            id: note.id.clone(),
            longitude: note.longitude,
            latitude: note.latitude,
            body: note.body.clone(),
            created_at: note.created_at,
        }
    }
}

/// Request body for placing a checkpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckpointCreateRequest {
    /// Display name.
    pub name: String,
    /// Longitude.
    pub longitude: f64,
    /// Latitude.
    pub latitude: f64,
    /// Instruments flagged on the checkpoint (may be empty).
    #[serde(default)]
    pub kinds: Vec<SensorKind>,
    /// Risk level assigned by the user (defaults to `INFO`).
    pub risk: Option<RiskLevel>,
}

/// Request body for finalizing a drawn risk area.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAreaCreateRequest {
    /// Display name.
    pub name: String,
    /// Risk level for the fill color.
    pub risk: RiskLevel,
    /// Polygon vertices as `[lng, lat]` pairs, in click order.
    pub vertices: Vec<[f64; 2]>,
}

/// Query parameter for delete endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteParams {
    /// Id of the annotation to delete.
    pub id: String,
}

/// Generic JSON error body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Human-readable error message.
    pub error: String,
}

impl ApiError {
    /// Creates an error body with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
