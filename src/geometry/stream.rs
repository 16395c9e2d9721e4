//! Geometry streaming
//!
//! A geometry stream walks an arbitrarily nested GeoJSON object and reports
//! its structure to a [`GeometryStream`] sink as an ordered series of
//! callbacks. Sinks only implement the callbacks they care about: bounds only
//! needs `point`, a projection adapter forwards everything.
//!
//! Callback order for each geometry type:
//!
//! - `Point` / `MultiPoint`: one `point` per position
//! - `LineString`: `line_start`, `point`…, `line_end`
//! - `Polygon`: `polygon_start`, then per ring `line_start`, `point`…,
//!   `line_end` with the closing duplicate position skipped, then
//!   `polygon_end`
//! - `Sphere`: `sphere`
//! - collections and features: their members in order

use super::{Feature, FeatureCollection, Geometry, Position};

/// Consumer of geometry stream callbacks.
pub trait GeometryStream {
    fn point(&mut self, x: f64, y: f64, z: Option<f64>);

    fn line_start(&mut self) {}

    fn line_end(&mut self) {}

    fn polygon_start(&mut self) {}

    fn polygon_end(&mut self) {}

    fn sphere(&mut self) {}
}

/// Anything that can be walked by a geometry stream.
pub trait Streamable {
    fn stream<S: GeometryStream + ?Sized>(&self, sink: &mut S);
}

impl Streamable for Geometry {
    fn stream<S: GeometryStream + ?Sized>(&self, sink: &mut S) {
        match self {
            Geometry::Point { coordinates } => stream_position(coordinates, sink),
            Geometry::MultiPoint { coordinates } => {
                for position in coordinates {
                    stream_position(position, sink);
                }
            }
            Geometry::LineString { coordinates } => stream_line(coordinates, sink, false),
            Geometry::MultiLineString { coordinates } => {
                for line in coordinates {
                    stream_line(line, sink, false);
                }
            }
            Geometry::Polygon { coordinates } => stream_polygon(coordinates, sink),
            Geometry::MultiPolygon { coordinates } => {
                for polygon in coordinates {
                    stream_polygon(polygon, sink);
                }
            }
            Geometry::GeometryCollection { geometries } => {
                for geometry in geometries {
                    geometry.stream(sink);
                }
            }
            Geometry::Sphere => sink.sphere(),
            Geometry::Unknown => {}
        }
    }
}

impl Streamable for Feature {
    fn stream<S: GeometryStream + ?Sized>(&self, sink: &mut S) {
        if let Some(geometry) = &self.geometry {
            geometry.stream(sink);
        }
    }
}

impl Streamable for FeatureCollection {
    fn stream<S: GeometryStream + ?Sized>(&self, sink: &mut S) {
        self.features.as_slice().stream(sink);
    }
}

impl Streamable for [Feature] {
    fn stream<S: GeometryStream + ?Sized>(&self, sink: &mut S) {
        for feature in self {
            feature.stream(sink);
        }
    }
}

fn stream_position<S: GeometryStream + ?Sized>(position: &Position, sink: &mut S) {
    if let [x, y, rest @ ..] = position.as_slice() {
        sink.point(*x, *y, rest.first().copied());
    }
}

fn stream_line<S: GeometryStream + ?Sized>(positions: &[Position], sink: &mut S, closed: bool) {
    let n = if closed {
        positions.len().saturating_sub(1)
    } else {
        positions.len()
    };
    sink.line_start();
    for position in &positions[..n] {
        stream_position(position, sink);
    }
    sink.line_end();
}

fn stream_polygon<S: GeometryStream + ?Sized>(rings: &[Vec<Position>], sink: &mut S) {
    sink.polygon_start();
    for ring in rings {
        stream_line(ring, sink, true);
    }
    sink.polygon_end();
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records callbacks as short tokens.
    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl GeometryStream for Recorder {
        fn point(&mut self, x: f64, y: f64, z: Option<f64>) {
            match z {
                Some(z) => self.events.push(format!("p({},{},{})", x, y, z)),
                None => self.events.push(format!("p({},{})", x, y)),
            }
        }
        fn line_start(&mut self) {
            self.events.push("ls".to_string());
        }
        fn line_end(&mut self) {
            self.events.push("le".to_string());
        }
        fn polygon_start(&mut self) {
            self.events.push("ps".to_string());
        }
        fn polygon_end(&mut self) {
            self.events.push("pe".to_string());
        }
        fn sphere(&mut self) {
            self.events.push("sphere".to_string());
        }
    }

    fn record<T: Streamable + ?Sized>(object: &T) -> Vec<String> {
        let mut recorder = Recorder::default();
        object.stream(&mut recorder);
        recorder.events
    }

    #[test]
    fn test_polygon_skips_closing_position() {
        let polygon = Geometry::Polygon {
            coordinates: vec![vec![
                vec![0.0, 0.0],
                vec![1.0, 0.0],
                vec![1.0, 1.0],
                vec![0.0, 0.0],
            ]],
        };
        assert_eq!(
            record(&polygon),
            vec!["ps", "ls", "p(0,0)", "p(1,0)", "p(1,1)", "le", "pe"]
        );
    }

    #[test]
    fn test_line_string_keeps_all_positions() {
        let line = Geometry::LineString {
            coordinates: vec![vec![0.0, 0.0], vec![2.0, 2.0], vec![0.0, 0.0]],
        };
        assert_eq!(
            record(&line),
            vec!["ls", "p(0,0)", "p(2,2)", "p(0,0)", "le"]
        );
    }

    #[test]
    fn test_point_with_elevation() {
        let point = Geometry::Point {
            coordinates: vec![1.0, 2.0, 3.0],
        };
        assert_eq!(record(&point), vec!["p(1,2,3)"]);
    }

    #[test]
    fn test_multi_point_has_no_line_events() {
        let multi = Geometry::MultiPoint {
            coordinates: vec![vec![1.0, 1.0], vec![2.0, 2.0]],
        };
        assert_eq!(record(&multi), vec!["p(1,1)", "p(2,2)"]);
    }

    #[test]
    fn test_collection_and_features_recurse() {
        let collection = FeatureCollection::new(vec![
            Feature::new(Geometry::GeometryCollection {
                geometries: vec![
                    Geometry::Point {
                        coordinates: vec![5.0, 5.0],
                    },
                    Geometry::Sphere,
                ],
            }),
            Feature::default(),
            Feature::new(Geometry::Unknown),
            Feature::new(Geometry::MultiLineString {
                coordinates: vec![vec![vec![0.0, 1.0], vec![1.0, 0.0]]],
            }),
        ]);

        assert_eq!(
            record(&collection),
            vec!["p(5,5)", "sphere", "ls", "p(0,1)", "p(1,0)", "le"]
        );
    }

    #[test]
    fn test_empty_ring_is_harmless() {
        let polygon = Geometry::Polygon {
            coordinates: vec![vec![]],
        };
        assert_eq!(record(&polygon), vec!["ps", "ls", "le", "pe"]);
    }
}
