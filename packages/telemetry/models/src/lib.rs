#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Risk level taxonomy and sensor node types.
//!
//! This crate defines the canonical four-level landslide risk scale and the
//! sensor node shape used across the entire slope-map system. Seed sensors
//! and user-placed checkpoints share the same [`SensorNode`] type; they are
//! kept in separate collections by the callers.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Landslide risk level, from 1 (informational) to 4 (evacuate).
///
/// The ordering is meaningful: `Info < Watch < Warning < Evacuate`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    /// Level 1: Normal readings, shown for situational awareness only
    Info = 1,
    /// Level 2: Elevated readings worth keeping an eye on
    Watch = 2,
    /// Level 3: Sustained movement or saturation, field check advised
    Warning = 3,
    /// Level 4: Imminent failure indicators, evacuation zone
    Evacuate = 4,
}

impl RiskLevel {
    /// Returns the numeric value of this risk level.
    #[must_use]
    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Creates a risk level from a numeric value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not in the range 1-4.
    pub const fn from_value(value: u8) -> Result<Self, InvalidRiskError> {
        match value {
            1 => Ok(Self::Info),
            2 => Ok(Self::Watch),
            3 => Ok(Self::Warning),
            4 => Ok(Self::Evacuate),
            _ => Err(InvalidRiskError { value }),
        }
    }

    /// Returns the kernel-density weight applied to a node at this level.
    ///
    /// Used to intensify the heatmap overlay around higher-risk nodes.
    #[must_use]
    pub const fn heatmap_weight(self) -> f64 {
        match self {
            Self::Info => 0.2,
            Self::Watch => 0.45,
            Self::Warning => 0.7,
            Self::Evacuate => 1.0,
        }
    }

    /// Returns the hex color used for markers and polygons at this level.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Info => "#3b82f6",
            Self::Watch => "#eab308",
            Self::Warning => "#f97316",
            Self::Evacuate => "#dc2626",
        }
    }

    /// Returns all variants of this enum, lowest risk first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Info, Self::Watch, Self::Warning, Self::Evacuate]
    }
}

/// Error returned when attempting to create a [`RiskLevel`] from an invalid
/// numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidRiskError {
    /// The invalid risk value that was provided.
    pub value: u8,
}

impl std::fmt::Display for InvalidRiskError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid risk value {}: expected 1-4", self.value)
    }
}

impl std::error::Error for InvalidRiskError {}

/// Instrument type carried by a sensor node.
///
/// A node can carry more than one instrument, so [`SensorNode::kinds`] is a
/// list rather than a single value.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SensorKind {
    /// Borehole inclinometer measuring subsurface displacement
    Inclinometer,
    /// Wire extensometer measuring surface crack opening
    Extensometer,
    /// Piezometer measuring pore water pressure
    Piezometer,
    /// Tipping-bucket rain gauge
    RainGauge,
    /// Volumetric soil moisture probe
    SoilMoisture,
    /// Geophone picking up micro-seismic activity
    Geophone,
}

impl SensorKind {
    /// Returns a human-readable label for map popups and legends.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Inclinometer => "Inclinometer",
            Self::Extensometer => "Extensometer",
            Self::Piezometer => "Piezometer",
            Self::RainGauge => "Rain gauge",
            Self::SoilMoisture => "Soil moisture",
            Self::Geophone => "Geophone",
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Inclinometer,
            Self::Extensometer,
            Self::Piezometer,
            Self::RainGauge,
            Self::SoilMoisture,
            Self::Geophone,
        ]
    }
}

/// A telemetry node rendered as a marker on the map.
///
/// Seed nodes come from [`slope_map_dataset`] and are immutable; user
/// checkpoints follow the same shape and live in the annotation scratch
/// store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorNode {
    /// Stable node identifier (e.g. "sn-upper-01", or a UUID for checkpoints).
    pub id: String,
    /// Display name shown in popups and the sidebar.
    pub name: String,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Instruments carried by this node.
    pub kinds: Vec<SensorKind>,
    /// Current risk level driving marker color and heatmap weight.
    pub risk: RiskLevel,
    /// Last telemetry timestamp, as reported by the (mock) feed.
    pub last_seen: String,
    /// Battery voltage from the last report.
    pub battery_voltage: f64,
}

impl SensorNode {
    /// Returns `true` if this node carries the given instrument.
    #[must_use]
    pub fn has_kind(&self, kind: SensorKind) -> bool {
        self.kinds.contains(&kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_ordering_matches_severity() {
        assert!(RiskLevel::Info < RiskLevel::Watch);
        assert!(RiskLevel::Watch < RiskLevel::Warning);
        assert!(RiskLevel::Warning < RiskLevel::Evacuate);
    }

    #[test]
    fn risk_from_value_roundtrip() {
        for v in 1..=4u8 {
            let risk = RiskLevel::from_value(v).unwrap();
            assert_eq!(risk.value(), v);
        }
        assert!(RiskLevel::from_value(0).is_err());
        assert!(RiskLevel::from_value(5).is_err());
    }

    #[test]
    fn heatmap_weight_increases_with_risk() {
        let weights: Vec<f64> = RiskLevel::all()
            .iter()
            .map(|r| r.heatmap_weight())
            .collect();
        for pair in weights.windows(2) {
            assert!(pair[0] < pair[1], "weights must grow with risk: {weights:?}");
        }
        assert!((RiskLevel::Evacuate.heatmap_weight() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn risk_serializes_screaming_snake_case() {
        let json = serde_json::to_string(&RiskLevel::Evacuate).unwrap();
        assert_eq!(json, "\"EVACUATE\"");
        let parsed: RiskLevel = serde_json::from_str("\"WATCH\"").unwrap();
        assert_eq!(parsed, RiskLevel::Watch);
    }

    #[test]
    fn kind_parses_from_string() {
        let kind: SensorKind = "RAIN_GAUGE".parse().unwrap();
        assert_eq!(kind, SensorKind::RainGauge);
        assert_eq!(kind.to_string(), "RAIN_GAUGE");
    }
}
