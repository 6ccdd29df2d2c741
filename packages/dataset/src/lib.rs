#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::too_many_lines)]

//! In-memory mock seed data for the slope-map prototype.
//!
//! There is no real sensor feed: every marker and polygon on the map starts
//! from the fixtures in this crate. The study area is a fictional valley
//! slope instrumented after a debris-flow event; coordinates sit in the
//! Hida mountains purely so the map opens somewhere plausible.

use slope_map_geo_models::{Coordinate, RiskArea};
use slope_map_telemetry_models::{RiskLevel, SensorKind, SensorNode};

/// Default map center longitude.
pub const DEFAULT_CENTER_LNG: f64 = 137.554;
/// Default map center latitude.
pub const DEFAULT_CENTER_LAT: f64 = 36.288;
/// Default map zoom level.
pub const DEFAULT_ZOOM: u8 = 14;

fn node(
    id: &str,
    name: &str,
    lng: f64,
    lat: f64,
    kinds: &[SensorKind],
    risk: RiskLevel,
    last_seen: &str,
    battery_voltage: f64,
) -> SensorNode {
    SensorNode {
        id: id.to_string(),
        name: name.to_string(),
        longitude: lng,
        latitude: lat,
        kinds: kinds.to_vec(),
        risk,
        last_seen: last_seen.to_string(),
        battery_voltage,
    }
}

/// Returns the immutable seed sensor nodes.
#[must_use]
pub fn seed_sensors() -> Vec<SensorNode> {
    use RiskLevel::{Evacuate, Info, Warning, Watch};
    use SensorKind::{
        Extensometer, Geophone, Inclinometer, Piezometer, RainGauge, SoilMoisture,
    };

    vec![
        node(
            "sn-crest-01",
            "Crest Inclinometer A",
            137.548,
            36.294,
            &[Inclinometer],
            Warning,
            "2026-08-28T06:12:00Z",
            3.71,
        ),
        node(
            "sn-crest-02",
            "Crest Extensometer",
            137.551,
            36.295,
            &[Extensometer],
            Evacuate,
            "2026-08-28T06:10:30Z",
            3.58,
        ),
        node(
            "sn-scarp-01",
            "Main Scarp Wire",
            137.553,
            36.292,
            &[Extensometer, Geophone],
            Evacuate,
            "2026-08-28T06:11:45Z",
            3.62,
        ),
        node(
            "sn-mid-01",
            "Midslope Piezometer 1",
            137.556,
            36.289,
            &[Piezometer],
            Warning,
            "2026-08-28T06:09:00Z",
            3.89,
        ),
        node(
            "sn-mid-02",
            "Midslope Piezometer 2",
            137.559,
            36.288,
            &[Piezometer, SoilMoisture],
            Watch,
            "2026-08-28T06:08:20Z",
            3.95,
        ),
        node(
            "sn-mid-03",
            "Midslope Moisture Array",
            137.554,
            36.287,
            &[SoilMoisture],
            Watch,
            "2026-08-28T05:58:00Z",
            4.02,
        ),
        node(
            "sn-rain-01",
            "Ridge Rain Gauge",
            137.546,
            36.297,
            &[RainGauge],
            Info,
            "2026-08-28T06:00:00Z",
            4.11,
        ),
        node(
            "sn-rain-02",
            "Valley Rain Gauge",
            137.563,
            36.282,
            &[RainGauge],
            Info,
            "2026-08-28T06:00:00Z",
            4.08,
        ),
        node(
            "sn-toe-01",
            "Toe Geophone North",
            137.560,
            36.284,
            &[Geophone],
            Watch,
            "2026-08-28T06:11:10Z",
            3.77,
        ),
        node(
            "sn-toe-02",
            "Toe Geophone South",
            137.562,
            36.283,
            &[Geophone, Piezometer],
            Warning,
            "2026-08-28T06:11:12Z",
            3.69,
        ),
        node(
            "sn-road-01",
            "Prefecture Road Tilt",
            137.565,
            36.281,
            &[Inclinometer],
            Info,
            "2026-08-28T05:45:00Z",
            3.99,
        ),
        node(
            "sn-bench-01",
            "Survey Bench GNSS Shed",
            137.544,
            36.290,
            &[Inclinometer, RainGauge],
            Info,
            "2026-08-28T04:30:00Z",
            3.41,
        ),
    ]
}

/// Returns the immutable seed risk areas.
///
/// # Panics
///
/// Panics if a fixture polygon has fewer than three vertices, which would be
/// a bug in this crate (covered by tests).
#[must_use]
pub fn seed_areas() -> Vec<RiskArea> {
    let fixtures = [
        (
            "ra-scarp",
            "Main scarp release zone",
            RiskLevel::Evacuate,
            vec![
                (137.547, 36.296),
                (137.554, 36.296),
                (137.556, 36.292),
                (137.550, 36.291),
            ],
        ),
        (
            "ra-track",
            "Debris track",
            RiskLevel::Warning,
            vec![
                (137.552, 36.291),
                (137.558, 36.290),
                (137.562, 36.285),
                (137.556, 36.284),
            ],
        ),
        (
            "ra-runout",
            "Runout fan",
            RiskLevel::Watch,
            vec![
                (137.558, 36.285),
                (137.565, 36.284),
                (137.567, 36.280),
                (137.559, 36.279),
            ],
        ),
        (
            "ra-road",
            "Road closure buffer",
            RiskLevel::Info,
            vec![
                (137.562, 36.282),
                (137.568, 36.282),
                (137.568, 36.279),
                (137.562, 36.279),
            ],
        ),
    ];

    fixtures
        .into_iter()
        .map(|(id, name, risk, points)| {
            let vertices = points
                .into_iter()
                .map(|(lng, lat)| Coordinate::new(lng, lat))
                .collect();
            RiskArea::new(id, name, risk, vertices).expect("seed polygon invalid")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn sensor_ids_are_unique() {
        let sensors = seed_sensors();
        let ids: BTreeSet<&str> = sensors.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids.len(), sensors.len());
    }

    #[test]
    fn every_risk_level_is_represented() {
        let sensors = seed_sensors();
        for risk in RiskLevel::all() {
            assert!(
                sensors.iter().any(|s| s.risk == *risk),
                "no seed sensor at {risk}"
            );
        }
    }

    #[test]
    fn every_sensor_has_at_least_one_kind() {
        for sensor in seed_sensors() {
            assert!(!sensor.kinds.is_empty(), "{} has no kinds", sensor.id);
        }
    }

    #[test]
    fn seed_areas_are_valid_polygons() {
        let areas = seed_areas();
        assert!(!areas.is_empty());
        let ids: BTreeSet<&str> = areas.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids.len(), areas.len());
        for area in &areas {
            assert!(area.vertices.len() >= 3);
        }
    }

    #[test]
    fn seed_data_sits_near_default_center() {
        for sensor in seed_sensors() {
            assert!((sensor.longitude - DEFAULT_CENTER_LNG).abs() < 0.1);
            assert!((sensor.latitude - DEFAULT_CENTER_LAT).abs() < 0.1);
        }
    }
}
