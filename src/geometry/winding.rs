//! Polygon ring orientation
//!
//! Rendered features come back from the map with whatever winding the tiles
//! had. Before projection every polygon is rewound so exterior rings run
//! clockwise and holes counter-clockwise.

use geo::algorithm::orient::{Direction, Orient};
use geo_types::Geometry as GeoGeometry;

use super::{Feature, Geometry};

/// Rewind all polygons of a feature: clockwise exteriors, counter-clockwise
/// interiors. Non-polygonal geometry is returned unchanged.
pub fn rewind(mut feature: Feature) -> Feature {
    if let Some(geometry) = feature.geometry.take() {
        feature.geometry = Some(rewind_geometry(geometry));
    }
    feature
}

fn rewind_geometry(geometry: Geometry) -> Geometry {
    match geometry {
        Geometry::Polygon { .. } | Geometry::MultiPolygon { .. } => match geometry.to_geo() {
            Some(GeoGeometry::Polygon(poly)) => {
                Geometry::from_geo(&GeoGeometry::Polygon(poly.orient(Direction::Reversed)))
            }
            Some(GeoGeometry::MultiPolygon(mp)) => {
                Geometry::from_geo(&GeoGeometry::MultiPolygon(mp.orient(Direction::Reversed)))
            }
            _ => geometry,
        },
        Geometry::GeometryCollection { geometries } => Geometry::GeometryCollection {
            geometries: geometries.into_iter().map(rewind_geometry).collect(),
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Position;

    /// Shoelace sum; negative for clockwise rings in a y-up plane.
    fn signed_area(ring: &[Position]) -> f64 {
        ring.windows(2)
            .map(|w| w[0][0] * w[1][1] - w[1][0] * w[0][1])
            .sum::<f64>()
            / 2.0
    }

    #[test]
    fn test_counter_clockwise_exterior_is_reversed() {
        let ccw = Feature::new(Geometry::Polygon {
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
        });
        assert!(signed_area(match &ccw.geometry {
            Some(Geometry::Polygon { coordinates }) => &coordinates[0],
            _ => unreachable!(),
        }) > 0.0);

        let rewound = rewind(ccw);
        match rewound.geometry {
            Some(Geometry::Polygon { coordinates }) => {
                assert!(signed_area(&coordinates[0]) < 0.0);
                assert!(signed_area(&coordinates[1]) > 0.0);
                assert_eq!(coordinates[0].first(), coordinates[0].last());
            }
            other => panic!("expected polygon, got {:?}", other),
        }
    }

    #[test]
    fn test_lines_untouched() {
        let line = Feature::new(Geometry::LineString {
            coordinates: vec![vec![0.0, 0.0], vec![1.0, 1.0]],
        })
        .with_id("road-1");
        assert_eq!(rewind(line.clone()), line);
    }

    #[test]
    fn test_multipolygon_in_collection() {
        let feature = Feature::new(Geometry::GeometryCollection {
            geometries: vec![Geometry::MultiPolygon {
                coordinates: vec![vec![vec![
                    vec![0.0, 0.0],
                    vec![1.0, 0.0],
                    vec![1.0, 1.0],
                    vec![0.0, 0.0],
                ]]],
            }],
        });
        match rewind(feature).geometry {
            Some(Geometry::GeometryCollection { geometries }) => match &geometries[0] {
                Geometry::MultiPolygon { coordinates } => {
                    assert!(signed_area(&coordinates[0][0]) < 0.0);
                }
                other => panic!("expected multipolygon, got {:?}", other),
            },
            other => panic!("expected collection, got {:?}", other),
        }
    }
}
