#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! In-memory spatial index for risk area attribution.
//!
//! Builds an R-tree over the risk area polygons (seed plus user-drawn) and
//! provides fast point-in-polygon lookups so every sensor marker can be
//! annotated with the area it sits in. Also exports areas as a `GeoJSON`
//! `FeatureCollection` for the map widget.

use geo::{Contains, Polygon};
use geojson::{Feature, FeatureCollection, Geometry, Value};
use rstar::{AABB, RTree, RTreeObject};
use slope_map_geo_models::{BoundingBox, RiskArea};
use slope_map_telemetry_models::RiskLevel;

/// A risk area polygon stored in the R-tree with its metadata.
struct AreaEntry {
    id: String,
    name: String,
    risk: RiskLevel,
    envelope: AABB<[f64; 2]>,
    polygon: Polygon<f64>,
}

impl RTreeObject for AreaEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// The risk area a point was attributed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaHit<'a> {
    /// Area identifier.
    pub id: &'a str,
    /// Area display name.
    pub name: &'a str,
    /// Area risk level.
    pub risk: RiskLevel,
}

/// Pre-built spatial index over risk area polygons.
///
/// Constructed from the seed areas plus any user-drawn areas, and rebuilt
/// whenever a drawn area is added or removed. Cheap to rebuild at prototype
/// scale.
pub struct AreaIndex {
    areas: RTree<AreaEntry>,
    len: usize,
}

impl AreaIndex {
    /// Builds the R-tree index from the given risk areas.
    #[must_use]
    pub fn build(areas: &[RiskArea]) -> Self {
        let entries: Vec<AreaEntry> = areas
            .iter()
            .map(|area| {
                let polygon = area.to_polygon();
                AreaEntry {
                    id: area.id.clone(),
                    name: area.name.clone(),
                    risk: area.risk,
                    envelope: compute_envelope(&polygon),
                    polygon,
                }
            })
            .collect();
        let len = entries.len();
        log::debug!("Built spatial index over {len} risk areas");
        Self {
            areas: RTree::bulk_load(entries),
            len,
        }
    }

    /// Returns the number of indexed areas.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no areas are indexed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Look up the risk area containing a point.
    ///
    /// Areas can overlap (a drawn area over a seed area); the highest risk
    /// level wins so attribution never understates danger.
    #[must_use]
    pub fn lookup(&self, lng: f64, lat: f64) -> Option<AreaHit<'_>> {
        let point = geo::Point::new(lng, lat);
        let query_env = AABB::from_point([lng, lat]);

        let mut best: Option<&AreaEntry> = None;

        for entry in self.areas.locate_in_envelope_intersecting(&query_env) {
            if entry.polygon.contains(&point) {
                match best {
                    None => best = Some(entry),
                    Some(current) if entry.risk > current.risk => best = Some(entry),
                    _ => {}
                }
            }
        }

        best.map(|e| AreaHit {
            id: &e.id,
            name: &e.name,
            risk: e.risk,
        })
    }

    /// Returns the ids of all areas whose envelope intersects the viewport.
    #[must_use]
    pub fn area_ids_in_bbox(&self, bbox: &BoundingBox) -> Vec<&str> {
        let query_env = AABB::from_corners([bbox.west, bbox.south], [bbox.east, bbox.north]);
        self.areas
            .locate_in_envelope_intersecting(&query_env)
            .map(|e| e.id.as_str())
            .collect()
    }
}

/// Converts risk areas into a `GeoJSON` `FeatureCollection` with `id`,
/// `name`, `risk`, and `color` properties for the map renderer.
#[must_use]
pub fn to_feature_collection(areas: &[RiskArea]) -> FeatureCollection {
    let features = areas
        .iter()
        .map(|area| {
            let geometry = Geometry::new(Value::from(&area.to_polygon()));
            let mut properties = geojson::JsonObject::new();
            properties.insert("id".to_string(), area.id.clone().into());
            properties.insert("name".to_string(), area.name.clone().into());
            properties.insert("risk".to_string(), area.risk.to_string().into());
            properties.insert("riskValue".to_string(), area.risk.value().into());
            properties.insert("color".to_string(), area.risk.color().into());

            Feature {
                bbox: None,
                geometry: Some(geometry),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Compute the bounding box envelope for a [`Polygon`].
fn compute_envelope(polygon: &Polygon<f64>) -> AABB<[f64; 2]> {
    use geo::BoundingRect;

    polygon.bounding_rect().map_or_else(
        || AABB::from_point([0.0, 0.0]),
        |rect| AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]),
    )
}

#[cfg(test)]
mod tests {
    use slope_map_geo_models::Coordinate;

    use super::*;

    fn square(id: &str, risk: RiskLevel, west: f64, south: f64, size: f64) -> RiskArea {
        RiskArea::new(
            id,
            id,
            risk,
            vec![
                Coordinate::new(west, south),
                Coordinate::new(west + size, south),
                Coordinate::new(west + size, south + size),
                Coordinate::new(west, south + size),
            ],
        )
        .unwrap()
    }

    #[test]
    fn lookup_finds_containing_area() {
        let index = AreaIndex::build(&[square("a", RiskLevel::Watch, 0.0, 0.0, 1.0)]);
        let hit = index.lookup(0.5, 0.5).unwrap();
        assert_eq!(hit.id, "a");
        assert_eq!(hit.risk, RiskLevel::Watch);
        assert!(index.lookup(2.0, 2.0).is_none());
    }

    #[test]
    fn overlap_resolves_to_highest_risk() {
        let index = AreaIndex::build(&[
            square("low", RiskLevel::Info, 0.0, 0.0, 2.0),
            square("high", RiskLevel::Evacuate, 1.0, 1.0, 2.0),
        ]);
        let hit = index.lookup(1.5, 1.5).unwrap();
        assert_eq!(hit.id, "high");
        let hit = index.lookup(0.5, 0.5).unwrap();
        assert_eq!(hit.id, "low");
    }

    #[test]
    fn bbox_query_returns_intersecting_areas() {
        let index = AreaIndex::build(&[
            square("a", RiskLevel::Info, 0.0, 0.0, 1.0),
            square("b", RiskLevel::Info, 10.0, 10.0, 1.0),
        ]);
        let bbox = BoundingBox::new(-0.5, -0.5, 0.5, 0.5);
        let ids = index.area_ids_in_bbox(&bbox);
        assert_eq!(ids, vec!["a"]);
    }

    #[test]
    fn feature_collection_carries_risk_properties() {
        let areas = vec![square("a", RiskLevel::Warning, 0.0, 0.0, 1.0)];
        let fc = to_feature_collection(&areas);
        assert_eq!(fc.features.len(), 1);
        let props = fc.features[0].properties.as_ref().unwrap();
        assert_eq!(props["risk"], "WARNING");
        assert_eq!(props["color"], RiskLevel::Warning.color());
    }
}
