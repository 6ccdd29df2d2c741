#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Coordinate, bounding box, and risk area polygon types.
//!
//! These are the geometric building blocks shared by the seed dataset, the
//! spatial index, and the derivation pipeline. Risk areas enforce the one
//! geometric invariant the system has: a polygon needs at least three
//! vertices to be finalized.

use serde::{Deserialize, Serialize};
use slope_map_telemetry_models::RiskLevel;

/// A WGS84 longitude/latitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinate {
    /// Longitude (WGS84).
    pub longitude: f64,
    /// Latitude (WGS84).
    pub latitude: f64,
}

impl Coordinate {
    /// Creates a coordinate from longitude and latitude.
    #[must_use]
    pub const fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }
}

/// A geographic bounding box in WGS84 coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Western longitude boundary.
    pub west: f64,
    /// Southern latitude boundary.
    pub south: f64,
    /// Eastern longitude boundary.
    pub east: f64,
    /// Northern latitude boundary.
    pub north: f64,
}

impl BoundingBox {
    /// Creates a new bounding box from the given coordinates.
    #[must_use]
    pub const fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Returns the smallest box covering all of `points`, or `None` for an
    /// empty input.
    #[must_use]
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut iter = points.into_iter();
        let (lng, lat) = iter.next()?;
        let mut bbox = Self::new(lng, lat, lng, lat);
        for (lng, lat) in iter {
            bbox.extend(lng, lat);
        }
        Some(bbox)
    }

    /// Grows the box to include the given point.
    pub fn extend(&mut self, lng: f64, lat: f64) {
        self.west = self.west.min(lng);
        self.south = self.south.min(lat);
        self.east = self.east.max(lng);
        self.north = self.north.max(lat);
    }

    /// Returns the union of this box and `other`.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            west: self.west.min(other.west),
            south: self.south.min(other.south),
            east: self.east.max(other.east),
            north: self.north.max(other.north),
        }
    }

    /// Returns `true` if the point lies within (or on the edge of) the box.
    #[must_use]
    pub fn contains(&self, lng: f64, lat: f64) -> bool {
        lng >= self.west && lng <= self.east && lat >= self.south && lat <= self.north
    }

    /// Returns the center point of the box.
    #[must_use]
    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            f64::midpoint(self.west, self.east),
            f64::midpoint(self.south, self.north),
        )
    }
}

/// A risk-colored polygon rendered on the map.
///
/// Seed areas come from the dataset crate; user-drawn areas are created via
/// the annotation draft flow. Both go through [`RiskArea::new`] so the
/// minimum-vertex invariant holds everywhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskArea {
    /// Stable area identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Risk level driving fill color.
    pub risk: RiskLevel,
    /// Ordered polygon vertices (unclosed; the renderer closes the ring).
    pub vertices: Vec<Coordinate>,
}

impl RiskArea {
    /// Creates a risk area, enforcing the minimum-vertex invariant.
    ///
    /// # Errors
    ///
    /// Returns [`PolygonError::TooFewVertices`] if fewer than three vertices
    /// are provided.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        risk: RiskLevel,
        vertices: Vec<Coordinate>,
    ) -> Result<Self, PolygonError> {
        if vertices.len() < 3 {
            return Err(PolygonError::TooFewVertices {
                count: vertices.len(),
            });
        }
        Ok(Self {
            id: id.into(),
            name: name.into(),
            risk,
            vertices,
        })
    }

    /// Converts the vertex list into a closed [`geo::Polygon`].
    #[must_use]
    pub fn to_polygon(&self) -> geo::Polygon<f64> {
        let ring: Vec<geo::Coord<f64>> = self
            .vertices
            .iter()
            .map(|c| geo::coord! { x: c.longitude, y: c.latitude })
            .collect();
        geo::Polygon::new(geo::LineString::new(ring), vec![])
    }

    /// Returns the bounding box of the polygon vertices.
    #[must_use]
    pub fn bounding_box(&self) -> BoundingBox {
        // Constructor guarantees at least three vertices.
        BoundingBox::from_points(self.vertices.iter().map(|c| (c.longitude, c.latitude)))
            .unwrap_or(BoundingBox::new(0.0, 0.0, 0.0, 0.0))
    }
}

/// Errors for risk area polygon construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PolygonError {
    /// A polygon needs at least three vertices to be finalized.
    #[error("polygon needs at least 3 vertices, got {count}")]
    TooFewVertices {
        /// Number of vertices provided.
        count: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tri() -> Vec<Coordinate> {
        vec![
            Coordinate::new(137.10, 36.60),
            Coordinate::new(137.12, 36.60),
            Coordinate::new(137.11, 36.62),
        ]
    }

    #[test]
    fn from_points_empty_is_none() {
        assert!(BoundingBox::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn extend_and_union_cover_all_points() {
        let mut bbox = BoundingBox::new(0.0, 0.0, 0.0, 0.0);
        bbox.extend(-1.0, 2.0);
        assert_eq!(bbox, BoundingBox::new(-1.0, 0.0, 0.0, 2.0));

        let other = BoundingBox::new(3.0, -4.0, 5.0, 1.0);
        let union = bbox.union(&other);
        assert_eq!(union, BoundingBox::new(-1.0, -4.0, 5.0, 2.0));
        assert!(union.contains(0.0, 0.0));
        assert!(!union.contains(6.0, 0.0));
    }

    #[test]
    fn center_is_midpoint() {
        let bbox = BoundingBox::new(-2.0, -2.0, 2.0, 4.0);
        let center = bbox.center();
        assert!((center.longitude - 0.0).abs() < f64::EPSILON);
        assert!((center.latitude - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn risk_area_requires_three_vertices() {
        let two = tri().into_iter().take(2).collect();
        let err = RiskArea::new("a-1", "Test", RiskLevel::Watch, two).unwrap_err();
        assert_eq!(err, PolygonError::TooFewVertices { count: 2 });

        let area = RiskArea::new("a-1", "Test", RiskLevel::Watch, tri()).unwrap();
        assert_eq!(area.vertices.len(), 3);
    }

    #[test]
    fn to_polygon_closes_ring() {
        let area = RiskArea::new("a-1", "Test", RiskLevel::Warning, tri()).unwrap();
        let polygon = area.to_polygon();
        // geo closes the exterior ring, so the first point repeats at the end.
        assert_eq!(polygon.exterior().0.len(), 4);
    }

    #[test]
    fn bounding_box_covers_vertices() {
        let area = RiskArea::new("a-1", "Test", RiskLevel::Info, tri()).unwrap();
        let bbox = area.bounding_box();
        for v in &area.vertices {
            assert!(bbox.contains(v.longitude, v.latitude));
        }
    }
}
