#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! The filter/derivation pipeline behind the map view.
//!
//! Static sensor data plus user checkpoints flow through the user-controlled
//! [`FilterState`] into a derived [`ViewModel`]: filtered markers, per-risk
//! counts for the legend, heatmap weight points, fitted map bounds, and
//! zoom-dependent grid clusters. Everything here is a synchronous single
//! pass over in-memory arrays.

mod cluster;

pub use cluster::{Cluster, cluster};
use serde::{Deserialize, Serialize};
use slope_map_geo_models::BoundingBox;
use slope_map_telemetry_models::{RiskLevel, SensorKind, SensorNode};

/// User-controlled filter predicates composed over the sensor collection.
///
/// Empty selections mean "no restriction" so a fresh filter passes every
/// node.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    /// Selected risk levels (empty = all).
    pub risks: Vec<RiskLevel>,
    /// Selected sensor kinds (empty = all; a node matches if it carries any
    /// selected instrument).
    pub kinds: Vec<SensorKind>,
    /// Free-text query matched case-insensitively against id and name.
    pub query: Option<String>,
    /// Viewport restriction.
    pub bbox: Option<BoundingBox>,
}

impl FilterState {
    /// Returns `true` if the node passes every active predicate.
    #[must_use]
    pub fn matches(&self, node: &SensorNode) -> bool {
        if !self.risks.is_empty() && !self.risks.contains(&node.risk) {
            return false;
        }
        if !self.kinds.is_empty() && !self.kinds.iter().any(|k| node.has_kind(*k)) {
            return false;
        }
        if let Some(bbox) = &self.bbox {
            if !bbox.contains(node.longitude, node.latitude) {
                return false;
            }
        }
        if let Some(query) = self.query.as_deref() {
            let query = query.trim().to_lowercase();
            if !query.is_empty()
                && !node.name.to_lowercase().contains(&query)
                && !node.id.to_lowercase().contains(&query)
            {
                return false;
            }
        }
        true
    }
}

/// Applies the filter over a node collection, preserving input order.
#[must_use]
pub fn filter_sensors<'a>(nodes: &'a [SensorNode], filter: &FilterState) -> Vec<&'a SensorNode> {
    nodes.iter().filter(|n| filter.matches(n)).collect()
}

/// Per-risk-level count for the map legend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskCount {
    /// Risk level.
    pub risk: RiskLevel,
    /// Number of matching nodes at this level.
    pub count: u64,
}

/// Counts nodes per risk level, zero-filling so every level is present.
#[must_use]
pub fn counts_by_risk(nodes: &[&SensorNode]) -> Vec<RiskCount> {
    RiskLevel::all()
        .iter()
        .map(|risk| RiskCount {
            risk: *risk,
            count: nodes.iter().filter(|n| n.risk == *risk).count() as u64,
        })
        .collect()
}

/// A weighted point feeding the kernel-density heatmap overlay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapPoint {
    /// Longitude.
    pub lng: f64,
    /// Latitude.
    pub lat: f64,
    /// Intensity weight derived from the node's risk level.
    pub weight: f64,
}

/// Derives one heatmap weight point per node.
#[must_use]
pub fn heatmap_points(nodes: &[&SensorNode]) -> Vec<HeatmapPoint> {
    nodes
        .iter()
        .map(|n| HeatmapPoint {
            lng: n.longitude,
            lat: n.latitude,
            weight: n.risk.heatmap_weight(),
        })
        .collect()
}

/// Returns the bounding box union over the nodes, or `None` when the filter
/// matched nothing (the map then keeps its current viewport).
#[must_use]
pub fn fit_bounds(nodes: &[&SensorNode]) -> Option<BoundingBox> {
    BoundingBox::from_points(nodes.iter().map(|n| (n.longitude, n.latitude)))
}

/// The full derived view-model for one filter application.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewModel<'a> {
    /// Nodes passing the filter, in input order.
    pub sensors: Vec<&'a SensorNode>,
    /// Per-risk legend counts (zero-filled).
    pub counts: Vec<RiskCount>,
    /// Heatmap weight points.
    pub heatmap: Vec<HeatmapPoint>,
    /// Fitted bounds, `None` when nothing matched.
    pub bounds: Option<BoundingBox>,
}

impl<'a> ViewModel<'a> {
    /// Runs the whole derivation pipeline over `nodes`.
    #[must_use]
    pub fn derive(nodes: &'a [SensorNode], filter: &FilterState) -> Self {
        let sensors = filter_sensors(nodes, filter);
        let counts = counts_by_risk(&sensors);
        let heatmap = heatmap_points(&sensors);
        let bounds = fit_bounds(&sensors);
        log::debug!(
            "Derived view-model: {} of {} nodes match",
            sensors.len(),
            nodes.len()
        );
        Self {
            sensors,
            counts,
            heatmap,
            bounds,
        }
    }
}
