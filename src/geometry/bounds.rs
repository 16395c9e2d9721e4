//! Axis-aligned bounds of streamed geometry
//!
//! [`compute_bounds`] is a pure function: every call owns its accumulator, so
//! sequential or concurrent fits never observe each other's state.

use super::stream::{GeometryStream, Streamable};

/// Axis-aligned bounding box `[[min_x, min_y], [max_x, max_y]]`.
///
/// An empty box has `min = +inf` and `max = -inf` on both axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl Bounds {
    pub const EMPTY: Bounds = Bounds {
        min: [f64::INFINITY, f64::INFINITY],
        max: [f64::NEG_INFINITY, f64::NEG_INFINITY],
    };

    pub fn new(min: [f64; 2], max: [f64; 2]) -> Self {
        Self { min, max }
    }

    pub fn width(&self) -> f64 {
        self.max[0] - self.min[0]
    }

    pub fn height(&self) -> f64 {
        self.max[1] - self.min[1]
    }

    /// True when no point has been added.
    pub fn is_empty(&self) -> bool {
        self.min[0] > self.max[0] || self.min[1] > self.max[1]
    }

    pub fn extend(&mut self, x: f64, y: f64) {
        if x < self.min[0] {
            self.min[0] = x;
        }
        if x > self.max[0] {
            self.max[0] = x;
        }
        if y < self.min[1] {
            self.min[1] = y;
        }
        if y > self.max[1] {
            self.max[1] = y;
        }
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min[0] && x <= self.max[0] && y >= self.min[1] && y <= self.max[1]
    }

    pub fn to_array(&self) -> [[f64; 2]; 2] {
        [self.min, self.max]
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Stream sink that widens a bounding box with every point.
#[derive(Debug, Clone, Default)]
pub struct BoundsStream {
    bounds: Bounds,
}

impl BoundsStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the accumulated bounds and reset the accumulator.
    pub fn result(&mut self) -> Bounds {
        std::mem::take(&mut self.bounds)
    }
}

impl GeometryStream for BoundsStream {
    fn point(&mut self, x: f64, y: f64, _z: Option<f64>) {
        self.bounds.extend(x, y);
    }
}

/// Bounds of every position in `object`.
pub fn compute_bounds<T: Streamable + ?Sized>(object: &T) -> Bounds {
    let mut sink = BoundsStream::new();
    object.stream(&mut sink);
    sink.result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Feature, FeatureCollection, Geometry, Position};
    use proptest::prelude::*;

    #[test]
    fn test_polygon_bounds() {
        let polygon = Geometry::Polygon {
            coordinates: vec![vec![
                vec![-3.0, 2.0],
                vec![5.0, -1.0],
                vec![1.0, 7.0],
                vec![-3.0, 2.0],
            ]],
        };
        let bounds = compute_bounds(&polygon);
        assert_eq!(bounds.to_array(), [[-3.0, -1.0], [5.0, 7.0]]);
        assert_eq!(bounds.width(), 8.0);
        assert_eq!(bounds.height(), 8.0);
    }

    #[test]
    fn test_empty_geometry_is_degenerate() {
        let bounds = compute_bounds(&FeatureCollection::default());
        assert!(bounds.is_empty());
        assert_eq!(
            bounds.to_array(),
            [
                [f64::INFINITY, f64::INFINITY],
                [f64::NEG_INFINITY, f64::NEG_INFINITY]
            ]
        );
    }

    #[test]
    fn test_result_resets_accumulator() {
        let mut sink = BoundsStream::new();
        Geometry::Point {
            coordinates: vec![10.0, 10.0],
        }
        .stream(&mut sink);
        let first = sink.result();
        assert_eq!(first.to_array(), [[10.0, 10.0], [10.0, 10.0]]);

        Geometry::Point {
            coordinates: vec![-1.0, 0.0],
        }
        .stream(&mut sink);
        let second = sink.result();
        assert_eq!(second.to_array(), [[-1.0, 0.0], [-1.0, 0.0]]);
        assert!(sink.result().is_empty());
    }

    #[test]
    fn test_sequential_calls_are_independent() {
        let a = compute_bounds(&Geometry::Point {
            coordinates: vec![100.0, 100.0],
        });
        let b = compute_bounds(&Geometry::Point {
            coordinates: vec![0.0, 0.0],
        });
        assert_eq!(a.to_array(), [[100.0, 100.0], [100.0, 100.0]]);
        assert_eq!(b.to_array(), [[0.0, 0.0], [0.0, 0.0]]);
    }

    fn position() -> impl Strategy<Value = Position> {
        (-180.0..180.0f64, -85.0..85.0f64).prop_map(|(x, y)| vec![x, y])
    }

    fn ring() -> impl Strategy<Value = Vec<Position>> {
        prop::collection::vec(position(), 3..10).prop_map(|mut ring| {
            ring.push(ring[0].clone());
            ring
        })
    }

    fn geometry() -> impl Strategy<Value = Geometry> {
        let leaf = prop_oneof![
            position().prop_map(|coordinates| Geometry::Point { coordinates }),
            prop::collection::vec(position(), 1..12)
                .prop_map(|coordinates| Geometry::LineString { coordinates }),
            prop::collection::vec(ring(), 1..3)
                .prop_map(|coordinates| Geometry::Polygon { coordinates }),
            prop::collection::vec(prop::collection::vec(ring(), 1..3), 1..3)
                .prop_map(|coordinates| Geometry::MultiPolygon { coordinates }),
        ];
        leaf.prop_recursive(2, 16, 4, |inner| {
            prop::collection::vec(inner, 1..4)
                .prop_map(|geometries| Geometry::GeometryCollection { geometries })
        })
    }

    fn collect_positions(geometry: &Geometry, out: &mut Vec<Position>) {
        match geometry {
            Geometry::Point { coordinates } => out.push(coordinates.clone()),
            Geometry::LineString { coordinates } => out.extend(coordinates.iter().cloned()),
            Geometry::Polygon { coordinates } => {
                out.extend(coordinates.iter().flatten().cloned())
            }
            Geometry::MultiPolygon { coordinates } => {
                out.extend(coordinates.iter().flatten().flatten().cloned())
            }
            Geometry::GeometryCollection { geometries } => {
                for geometry in geometries {
                    collect_positions(geometry, out);
                }
            }
            _ => {}
        }
    }

    proptest! {
        #[test]
        fn prop_bounds_contain_every_position(
            geometries in prop::collection::vec(geometry(), 1..6)
        ) {
            let collection = FeatureCollection::new(
                geometries.iter().cloned().map(Feature::new).collect(),
            );
            let bounds = compute_bounds(&collection);

            let mut positions = Vec::new();
            for geometry in &geometries {
                collect_positions(geometry, &mut positions);
            }
            prop_assert!(!positions.is_empty());
            prop_assert!(bounds.min[0] <= bounds.max[0]);
            prop_assert!(bounds.min[1] <= bounds.max[1]);
            for position in &positions {
                prop_assert!(bounds.contains(position[0], position[1]));
            }
        }
    }
}
