//! Zoom-dependent grid clustering for sensor markers.
//!
//! Nodes are bucketed into square cells sized from the map zoom level; each
//! occupied cell becomes one cluster with a weighted centroid, a member
//! count, and the highest risk level among its members (which drives the
//! cluster badge color).

use std::collections::BTreeMap;

use serde::Serialize;
use slope_map_telemetry_models::{RiskLevel, SensorNode};

/// Baseline cell size in degrees at zoom 0; halves with every zoom step.
const BASE_CELL_DEG: f64 = 45.0;

/// A cluster of nearby sensor markers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    /// Centroid longitude (mean of member positions).
    pub lng: f64,
    /// Centroid latitude.
    pub lat: f64,
    /// Number of member nodes.
    pub count: u64,
    /// Highest risk level among members.
    pub max_risk: RiskLevel,
}

/// Cell size in degrees for a zoom level.
fn cell_size(zoom: u8) -> f64 {
    BASE_CELL_DEG / f64::from(1_u32 << zoom.min(24))
}

/// Buckets nodes into grid cells for the given zoom level.
///
/// Output order is deterministic (cell row-major order) so repeated calls
/// with the same input render identically.
#[must_use]
pub fn cluster(nodes: &[&SensorNode], zoom: u8) -> Vec<Cluster> {
    let size = cell_size(zoom);

    #[derive(Default)]
    struct Cell {
        lng_sum: f64,
        lat_sum: f64,
        count: u64,
        max_risk: Option<RiskLevel>,
    }

    let mut cells: BTreeMap<(i64, i64), Cell> = BTreeMap::new();

    for node in nodes {
        #[allow(clippy::cast_possible_truncation)]
        let key = (
            (node.longitude / size).floor() as i64,
            (node.latitude / size).floor() as i64,
        );
        let cell = cells.entry(key).or_default();
        cell.lng_sum += node.longitude;
        cell.lat_sum += node.latitude;
        cell.count += 1;
        cell.max_risk = Some(cell.max_risk.map_or(node.risk, |r| r.max(node.risk)));
    }

    cells
        .into_values()
        .filter_map(|cell| {
            let max_risk = cell.max_risk?;
            #[allow(clippy::cast_precision_loss)]
            let denom = cell.count as f64;
            Some(Cluster {
                lng: cell.lng_sum / denom,
                lat: cell.lat_sum / denom,
                count: cell.count,
                max_risk,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use slope_map_telemetry_models::SensorKind;

    use super::*;

    fn node(id: &str, lng: f64, lat: f64, risk: RiskLevel) -> SensorNode {
        SensorNode {
            id: id.to_string(),
            name: id.to_string(),
            longitude: lng,
            latitude: lat,
            kinds: vec![SensorKind::Geophone],
            risk,
            last_seen: String::new(),
            battery_voltage: 4.0,
        }
    }

    #[test]
    fn low_zoom_merges_into_one_cluster() {
        let nodes = vec![
            node("a", 137.54, 36.29, RiskLevel::Info),
            node("b", 137.56, 36.28, RiskLevel::Evacuate),
        ];
        let refs: Vec<&SensorNode> = nodes.iter().collect();
        let clusters = cluster(&refs, 4);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].count, 2);
        assert_eq!(clusters[0].max_risk, RiskLevel::Evacuate);
        assert!((clusters[0].lng - 137.55).abs() < 1e-9);
    }

    #[test]
    fn high_zoom_splits_clusters() {
        let nodes = vec![
            node("a", 137.54, 36.29, RiskLevel::Info),
            node("b", 137.56, 36.28, RiskLevel::Evacuate),
        ];
        let refs: Vec<&SensorNode> = nodes.iter().collect();
        let clusters = cluster(&refs, 18);
        assert_eq!(clusters.len(), 2);
        assert!(clusters.iter().all(|c| c.count == 1));
    }

    #[test]
    fn empty_input_yields_no_clusters() {
        assert!(cluster(&[], 10).is_empty());
    }

    #[test]
    fn centroid_is_member_mean() {
        let nodes = vec![
            node("a", 0.0, 0.0, RiskLevel::Watch),
            node("b", 0.002, 0.002, RiskLevel::Watch),
            node("c", 0.001, 0.004, RiskLevel::Warning),
        ];
        let refs: Vec<&SensorNode> = nodes.iter().collect();
        let clusters = cluster(&refs, 8);
        assert_eq!(clusters.len(), 1);
        assert!((clusters[0].lng - 0.001).abs() < 1e-9);
        assert!((clusters[0].lat - 0.002).abs() < 1e-9);
        assert_eq!(clusters[0].max_risk, RiskLevel::Warning);
    }
}
