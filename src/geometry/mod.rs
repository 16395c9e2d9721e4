//! GeoJSON geometry model
//!
//! Features arrive from the view provider as GeoJSON. This module holds the
//! typed model they deserialize into, plus conversions to `geo_types` for the
//! algorithms (simplification, winding, clipping, centroids) that the `geo`
//! crate provides.
//!
//! # Submodules
//!
//! - `stream` - ordered visitor over nested geometry
//! - `bounds` - axis-aligned bounds computed through the visitor
//! - `simplify` - zoom-dependent vertex reduction
//! - `winding` - polygon ring orientation

pub mod bounds;
pub mod simplify;
pub mod stream;
pub mod winding;

pub use bounds::{compute_bounds, Bounds, BoundsStream};
pub use simplify::{simplify_features, tolerance_for_zoom};
pub use stream::{GeometryStream, Streamable};
pub use winding::rewind;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A GeoJSON position: `[x, y]` or `[x, y, z]`.
pub type Position = Vec<f64>;

/// GeoJSON geometry, tagged by its `type` member.
///
/// Tags this crate does not know deserialize into `Unknown` and are skipped by
/// every consumer instead of failing the whole feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point {
        coordinates: Position,
    },
    MultiPoint {
        coordinates: Vec<Position>,
    },
    LineString {
        coordinates: Vec<Position>,
    },
    MultiLineString {
        coordinates: Vec<Vec<Position>>,
    },
    Polygon {
        coordinates: Vec<Vec<Position>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Position>>>,
    },
    GeometryCollection {
        geometries: Vec<Geometry>,
    },
    Sphere,
    #[serde(other)]
    Unknown,
}

impl Geometry {
    /// GeoJSON type name of this geometry.
    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::Point { .. } => "Point",
            Geometry::MultiPoint { .. } => "MultiPoint",
            Geometry::LineString { .. } => "LineString",
            Geometry::MultiLineString { .. } => "MultiLineString",
            Geometry::Polygon { .. } => "Polygon",
            Geometry::MultiPolygon { .. } => "MultiPolygon",
            Geometry::GeometryCollection { .. } => "GeometryCollection",
            Geometry::Sphere => "Sphere",
            Geometry::Unknown => "Unknown",
        }
    }

    /// Closed polygon covering an axis-aligned box, ring order
    /// NE, SE, SW, NW, NE.
    pub fn bbox_polygon(west: f64, south: f64, east: f64, north: f64) -> Self {
        Geometry::Polygon {
            coordinates: vec![vec![
                vec![east, north],
                vec![east, south],
                vec![west, south],
                vec![west, north],
                vec![east, north],
            ]],
        }
    }

    /// Convert to a `geo_types` geometry.
    ///
    /// Returns `None` for `Sphere`/`Unknown` and for positions with fewer than
    /// two ordinates. Z ordinates are dropped.
    pub fn to_geo(&self) -> Option<geo_types::Geometry<f64>> {
        use geo_types::{
            Geometry as G, GeometryCollection, LineString, MultiLineString, MultiPoint,
            MultiPolygon, Point,
        };

        Some(match self {
            Geometry::Point { coordinates } => G::Point(Point(to_coord(coordinates)?)),
            Geometry::MultiPoint { coordinates } => G::MultiPoint(MultiPoint(
                coordinates
                    .iter()
                    .map(|p| to_coord(p).map(Point))
                    .collect::<Option<Vec<_>>>()?,
            )),
            Geometry::LineString { coordinates } => G::LineString(to_line_string(coordinates)?),
            Geometry::MultiLineString { coordinates } => G::MultiLineString(MultiLineString(
                coordinates
                    .iter()
                    .map(|line| to_line_string(line))
                    .collect::<Option<Vec<LineString<f64>>>>()?,
            )),
            Geometry::Polygon { coordinates } => G::Polygon(to_polygon(coordinates)?),
            Geometry::MultiPolygon { coordinates } => G::MultiPolygon(MultiPolygon(
                coordinates
                    .iter()
                    .map(|rings| to_polygon(rings))
                    .collect::<Option<Vec<_>>>()?,
            )),
            Geometry::GeometryCollection { geometries } => {
                G::GeometryCollection(GeometryCollection(
                    geometries.iter().filter_map(Geometry::to_geo).collect(),
                ))
            }
            Geometry::Sphere | Geometry::Unknown => return None,
        })
    }

    /// Convert back from a `geo_types` geometry.
    pub fn from_geo(geometry: &geo_types::Geometry<f64>) -> Self {
        use geo_types::Geometry as G;

        match geometry {
            G::Point(p) => Geometry::Point {
                coordinates: vec![p.x(), p.y()],
            },
            G::MultiPoint(mp) => Geometry::MultiPoint {
                coordinates: mp.0.iter().map(|p| vec![p.x(), p.y()]).collect(),
            },
            G::Line(line) => Geometry::LineString {
                coordinates: vec![
                    vec![line.start.x, line.start.y],
                    vec![line.end.x, line.end.y],
                ],
            },
            G::LineString(ls) => Geometry::LineString {
                coordinates: from_line_string(ls),
            },
            G::MultiLineString(mls) => Geometry::MultiLineString {
                coordinates: mls.0.iter().map(from_line_string).collect(),
            },
            G::Polygon(poly) => Geometry::Polygon {
                coordinates: from_polygon(poly),
            },
            G::MultiPolygon(mp) => Geometry::MultiPolygon {
                coordinates: mp.0.iter().map(from_polygon).collect(),
            },
            G::Rect(rect) => Geometry::Polygon {
                coordinates: from_polygon(&rect.to_polygon()),
            },
            G::Triangle(tri) => Geometry::Polygon {
                coordinates: from_polygon(&tri.to_polygon()),
            },
            G::GeometryCollection(gc) => Geometry::GeometryCollection {
                geometries: gc.0.iter().map(Geometry::from_geo).collect(),
            },
        }
    }
}

fn to_coord(position: &[f64]) -> Option<geo_types::Coord<f64>> {
    match position {
        [x, y, ..] => Some(geo_types::coord! { x: *x, y: *y }),
        _ => None,
    }
}

fn to_line_string(positions: &[Position]) -> Option<geo_types::LineString<f64>> {
    positions
        .iter()
        .map(|p| to_coord(p))
        .collect::<Option<Vec<_>>>()
        .map(geo_types::LineString)
}

fn to_polygon(rings: &[Vec<Position>]) -> Option<geo_types::Polygon<f64>> {
    let mut rings = rings.iter();
    let exterior = match rings.next() {
        Some(ring) => to_line_string(ring)?,
        None => geo_types::LineString(vec![]),
    };
    let interiors = rings
        .map(|ring| to_line_string(ring))
        .collect::<Option<Vec<_>>>()?;
    Some(geo_types::Polygon::new(exterior, interiors))
}

fn from_line_string(ls: &geo_types::LineString<f64>) -> Vec<Position> {
    ls.0.iter().map(|c| vec![c.x, c.y]).collect()
}

fn from_polygon(poly: &geo_types::Polygon<f64>) -> Vec<Vec<Position>> {
    std::iter::once(poly.exterior())
        .chain(poly.interiors().iter())
        .map(from_line_string)
        .collect()
}

/// GeoJSON feature identifier (string or number).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureId {
    Number(serde_json::Number),
    String(String),
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureId::Number(n) => write!(f, "{}", n),
            FeatureId::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for FeatureId {
    fn from(s: &str) -> Self {
        FeatureId::String(s.to_string())
    }
}

impl From<u64> for FeatureId {
    fn from(n: u64) -> Self {
        FeatureId::Number(n.into())
    }
}

/// A GeoJSON feature: optional id, optional geometry and a flat property map.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub id: Option<FeatureId>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default, deserialize_with = "null_as_empty_map")]
    pub properties: Map<String, Value>,
}

/// Id given to the synthetic feature covering the whole viewport.
pub const BBOX_FEATURE_ID: &str = "bbox";

impl Feature {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            id: None,
            geometry: Some(geometry),
            properties: Map::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<FeatureId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    /// Whether this is the synthetic viewport feature of a background layer.
    pub fn is_bbox(&self) -> bool {
        matches!(&self.id, Some(FeatureId::String(s)) if s == BBOX_FEATURE_ID)
    }

    /// GeoJSON type name of the geometry, if any.
    pub fn geometry_type(&self) -> Option<&'static str> {
        self.geometry.as_ref().map(Geometry::type_name)
    }
}

/// An ordered set of features.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

fn null_as_empty_map<'de, D>(deserializer: D) -> std::result::Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_feature_from_geojson() {
        let feature: Feature = serde_json::from_value(json!({
            "type": "Feature",
            "id": 42,
            "geometry": {"type": "LineString", "coordinates": [[0, 0], [1, 1]]},
            "properties": {"class": "street"}
        }))
        .unwrap();

        assert_eq!(feature.id.as_ref().unwrap().to_string(), "42");
        assert_eq!(feature.geometry_type(), Some("LineString"));
        assert_eq!(feature.properties["class"], json!("street"));
    }

    #[test]
    fn test_null_properties_become_empty() {
        let feature: Feature = serde_json::from_value(json!({
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": [3, 4]},
            "properties": null
        }))
        .unwrap();
        assert!(feature.properties.is_empty());
        assert!(feature.id.is_none());
    }

    #[test]
    fn test_unknown_geometry_type_is_tolerated() {
        let feature: Feature = serde_json::from_value(json!({
            "type": "Feature",
            "geometry": {"type": "Curve", "coordinates": []},
            "properties": {}
        }))
        .unwrap();
        assert_eq!(feature.geometry, Some(Geometry::Unknown));
        assert!(Geometry::Unknown.to_geo().is_none());
    }

    #[test]
    fn test_bbox_polygon_ring() {
        let geometry = Geometry::bbox_polygon(0.0, 0.0, 1.0, 1.0);
        match geometry {
            Geometry::Polygon { coordinates } => {
                assert_eq!(coordinates[0].len(), 5);
                assert_eq!(coordinates[0][0], coordinates[0][4]);
                assert_eq!(coordinates[0][0], vec![1.0, 1.0]);
                assert_eq!(coordinates[0][2], vec![0.0, 0.0]);
            }
            other => panic!("expected polygon, got {:?}", other),
        }
    }

    #[test]
    fn test_geo_conversion_keeps_rings() {
        let polygon = Geometry::Polygon {
            coordinates: vec![
                vec![
                    vec![0.0, 0.0],
                    vec![4.0, 0.0],
                    vec![4.0, 4.0],
                    vec![0.0, 4.0],
                    vec![0.0, 0.0],
                ],
                vec![
                    vec![1.0, 1.0],
                    vec![1.0, 2.0],
                    vec![2.0, 2.0],
                    vec![1.0, 1.0],
                ],
            ],
        };
        let back = Geometry::from_geo(&polygon.to_geo().unwrap());
        assert_eq!(back, polygon);
    }

    #[test]
    fn test_short_position_rejected() {
        let point = Geometry::Point {
            coordinates: vec![1.0],
        };
        assert!(point.to_geo().is_none());
    }

    #[test]
    fn test_bbox_feature_marker() {
        let feature = Feature::new(Geometry::bbox_polygon(0.0, 0.0, 1.0, 1.0)).with_id("bbox");
        assert!(feature.is_bbox());
        assert!(!Feature::default().with_id(7u64).is_bbox());
    }
}
