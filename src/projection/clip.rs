//! Rectangle clipping of projected geometry
//!
//! Rings are clipped with Sutherland-Hodgman, one rectangle edge at a time.
//! Lines are clipped segment by segment (Liang-Barsky) and consecutive
//! visible segments are joined back into parts. Everything here operates on
//! screen coordinates, after projection.

use crate::geometry::{Geometry, Position};

/// Screen-space clip rectangle `[[x0, y0], [x1, y1]]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipExtent {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl ClipExtent {
    pub fn new(extent: [[f64; 2]; 2]) -> Self {
        let [[x0, y0], [x1, y1]] = extent;
        Self { x0, y0, x1, y1 }
    }

    /// Square extent `[[0, 0], [size, size]]`.
    pub fn square(size: f64) -> Self {
        Self::new([[0.0, 0.0], [size, size]])
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.y0 && y <= self.y1
    }

    /// Closed clockwise ring around the extent.
    pub fn ring(&self) -> Vec<Position> {
        vec![
            vec![self.x0, self.y0],
            vec![self.x1, self.y0],
            vec![self.x1, self.y1],
            vec![self.x0, self.y1],
            vec![self.x0, self.y0],
        ]
    }

    /// Clip projected geometry. Returns `None` when nothing is left.
    pub fn clip(&self, geometry: &Geometry) -> Option<Geometry> {
        match geometry {
            Geometry::Point { coordinates } => match coordinates.as_slice() {
                [x, y, ..] if self.contains(*x, *y) => Some(geometry.clone()),
                _ => None,
            },
            Geometry::MultiPoint { coordinates } => {
                let kept: Vec<Position> = coordinates
                    .iter()
                    .filter(|p| matches!(p.as_slice(), [x, y, ..] if self.contains(*x, *y)))
                    .cloned()
                    .collect();
                (!kept.is_empty()).then_some(Geometry::MultiPoint { coordinates: kept })
            }
            Geometry::LineString { coordinates } => {
                let parts = self.clip_line(coordinates);
                match parts.len() {
                    0 => None,
                    1 => parts.into_iter().next().map(|coordinates| Geometry::LineString {
                        coordinates,
                    }),
                    _ => Some(Geometry::MultiLineString { coordinates: parts }),
                }
            }
            Geometry::MultiLineString { coordinates } => {
                let parts: Vec<Vec<Position>> =
                    coordinates.iter().flat_map(|line| self.clip_line(line)).collect();
                (!parts.is_empty()).then_some(Geometry::MultiLineString { coordinates: parts })
            }
            Geometry::Polygon { coordinates } => self
                .clip_polygon(coordinates)
                .map(|coordinates| Geometry::Polygon { coordinates }),
            Geometry::MultiPolygon { coordinates } => {
                let polygons: Vec<Vec<Vec<Position>>> = coordinates
                    .iter()
                    .filter_map(|rings| self.clip_polygon(rings))
                    .collect();
                (!polygons.is_empty()).then_some(Geometry::MultiPolygon {
                    coordinates: polygons,
                })
            }
            Geometry::GeometryCollection { geometries } => {
                let kept: Vec<Geometry> = geometries.iter().filter_map(|g| self.clip(g)).collect();
                (!kept.is_empty()).then_some(Geometry::GeometryCollection { geometries: kept })
            }
            Geometry::Sphere => Some(Geometry::Polygon {
                coordinates: vec![self.ring()],
            }),
            Geometry::Unknown => None,
        }
    }

    /// Clip polygon rings. A polygon whose exterior vanishes is dropped with
    /// its holes.
    fn clip_polygon(&self, rings: &[Vec<Position>]) -> Option<Vec<Vec<Position>>> {
        let mut rings = rings.iter();
        let exterior = self.clip_ring(rings.next()?)?;
        let mut clipped = vec![exterior];
        clipped.extend(rings.filter_map(|ring| self.clip_ring(ring)));
        Some(clipped)
    }

    /// Sutherland-Hodgman against each edge in turn. Input and output rings
    /// are closed; rings reduced below three distinct vertices are dropped.
    fn clip_ring(&self, ring: &[Position]) -> Option<Vec<Position>> {
        let mut points: Vec<[f64; 2]> = ring
            .iter()
            .filter_map(|p| match p.as_slice() {
                [x, y, ..] => Some([*x, *y]),
                _ => None,
            })
            .collect();
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }

        let (x0, y0, x1, y1) = (self.x0, self.y0, self.x1, self.y1);
        points = clip_against_edge(&points, |p| p[0] >= x0, |a, b| {
            let t = (x0 - a[0]) / (b[0] - a[0]);
            [x0, a[1] + t * (b[1] - a[1])]
        });
        points = clip_against_edge(&points, |p| p[0] <= x1, |a, b| {
            let t = (x1 - a[0]) / (b[0] - a[0]);
            [x1, a[1] + t * (b[1] - a[1])]
        });
        points = clip_against_edge(&points, |p| p[1] >= y0, |a, b| {
            let t = (y0 - a[1]) / (b[1] - a[1]);
            [a[0] + t * (b[0] - a[0]), y0]
        });
        points = clip_against_edge(&points, |p| p[1] <= y1, |a, b| {
            let t = (y1 - a[1]) / (b[1] - a[1]);
            [a[0] + t * (b[0] - a[0]), y1]
        });

        points.dedup();
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        if points.len() < 3 {
            return None;
        }

        let mut closed: Vec<Position> = points.iter().map(|p| p.to_vec()).collect();
        closed.push(points[0].to_vec());
        Some(closed)
    }

    /// Clip an open line into the parts that stay visible.
    fn clip_line(&self, line: &[Position]) -> Vec<Vec<Position>> {
        let points: Vec<[f64; 2]> = line
            .iter()
            .filter_map(|p| match p.as_slice() {
                [x, y, ..] => Some([*x, *y]),
                _ => None,
            })
            .collect();

        let mut parts = Vec::new();
        let mut current: Vec<[f64; 2]> = Vec::new();

        for pair in points.windows(2) {
            let Some((start, end)) = self.clip_segment(pair[0], pair[1]) else {
                continue;
            };
            if current.last() != Some(&start) {
                flush_part(&mut current, &mut parts);
                current.push(start);
            }
            if current.last() != Some(&end) {
                current.push(end);
            }
        }
        flush_part(&mut current, &mut parts);

        parts
    }

    /// Liang-Barsky segment clipping.
    fn clip_segment(&self, a: [f64; 2], b: [f64; 2]) -> Option<([f64; 2], [f64; 2])> {
        let dx = b[0] - a[0];
        let dy = b[1] - a[1];
        let mut t0 = 0.0_f64;
        let mut t1 = 1.0_f64;

        for (p, q) in [
            (-dx, a[0] - self.x0),
            (dx, self.x1 - a[0]),
            (-dy, a[1] - self.y0),
            (dy, self.y1 - a[1]),
        ] {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let r = q / p;
            if p < 0.0 {
                if r > t1 {
                    return None;
                }
                t0 = t0.max(r);
            } else {
                if r < t0 {
                    return None;
                }
                t1 = t1.min(r);
            }
        }

        let start = if t0 > 0.0 {
            [a[0] + t0 * dx, a[1] + t0 * dy]
        } else {
            a
        };
        let end = if t1 < 1.0 {
            [a[0] + t1 * dx, a[1] + t1 * dy]
        } else {
            b
        };
        Some((start, end))
    }
}

fn flush_part(current: &mut Vec<[f64; 2]>, parts: &mut Vec<Vec<Position>>) {
    if current.len() >= 2 {
        parts.push(current.iter().map(|p| p.to_vec()).collect());
    }
    current.clear();
}

/// Clip an open vertex loop against a single half-plane.
fn clip_against_edge<F, I>(polygon: &[[f64; 2]], inside: F, intersect: I) -> Vec<[f64; 2]>
where
    F: Fn(&[f64; 2]) -> bool,
    I: Fn(&[f64; 2], &[f64; 2]) -> [f64; 2],
{
    let n = polygon.len();
    let mut output = Vec::with_capacity(n + 4);

    for i in 0..n {
        let current = &polygon[i];
        let next = &polygon[(i + 1) % n];

        match (inside(current), inside(next)) {
            (true, true) => output.push(*next),
            (true, false) => output.push(intersect(current, next)),
            (false, true) => {
                output.push(intersect(current, next));
                output.push(*next);
            }
            (false, false) => {}
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extent() -> ClipExtent {
        ClipExtent::square(10.0)
    }

    #[test]
    fn test_polygon_inside_is_unchanged() {
        let ring = vec![
            vec![1.0, 1.0],
            vec![4.0, 1.0],
            vec![4.0, 4.0],
            vec![1.0, 1.0],
        ];
        let polygon = Geometry::Polygon {
            coordinates: vec![ring.clone()],
        };
        match extent().clip(&polygon) {
            Some(Geometry::Polygon { coordinates }) => {
                assert_eq!(coordinates[0].len(), 4);
                assert_eq!(coordinates[0].first(), coordinates[0].last());
                for p in &ring {
                    assert!(coordinates[0].contains(p));
                }
            }
            other => panic!("expected polygon, got {:?}", other),
        }
    }

    #[test]
    fn test_polygon_covering_extent_becomes_extent() {
        let polygon = Geometry::Polygon {
            coordinates: vec![vec![
                vec![-5.0, -5.0],
                vec![15.0, -5.0],
                vec![15.0, 15.0],
                vec![-5.0, 15.0],
                vec![-5.0, -5.0],
            ]],
        };
        match extent().clip(&polygon) {
            Some(Geometry::Polygon { coordinates }) => {
                let ring = &coordinates[0];
                assert_eq!(ring.len(), 5);
                for p in ring {
                    assert!(p[0] == 0.0 || p[0] == 10.0);
                    assert!(p[1] == 0.0 || p[1] == 10.0);
                }
            }
            other => panic!("expected polygon, got {:?}", other),
        }
    }

    #[test]
    fn test_polygon_outside_is_dropped() {
        let polygon = Geometry::Polygon {
            coordinates: vec![vec![
                vec![20.0, 20.0],
                vec![30.0, 20.0],
                vec![30.0, 30.0],
                vec![20.0, 20.0],
            ]],
        };
        assert!(extent().clip(&polygon).is_none());
    }

    #[test]
    fn test_hole_outside_extent_is_dropped() {
        let polygon = Geometry::Polygon {
            coordinates: vec![
                vec![
                    vec![0.0, 0.0],
                    vec![30.0, 0.0],
                    vec![30.0, 30.0],
                    vec![0.0, 0.0],
                ],
                vec![
                    vec![20.0, 12.0],
                    vec![25.0, 12.0],
                    vec![25.0, 18.0],
                    vec![20.0, 12.0],
                ],
            ],
        };
        match extent().clip(&polygon) {
            Some(Geometry::Polygon { coordinates }) => assert_eq!(coordinates.len(), 1),
            other => panic!("expected polygon, got {:?}", other),
        }
    }

    #[test]
    fn test_line_crossing_splits_into_parts() {
        // in, out, back in
        let line = Geometry::LineString {
            coordinates: vec![vec![2.0, 5.0], vec![18.0, 5.0], vec![18.0, 8.0], vec![2.0, 8.0]],
        };
        match extent().clip(&line) {
            Some(Geometry::MultiLineString { coordinates }) => {
                assert_eq!(
                    coordinates,
                    vec![
                        vec![vec![2.0, 5.0], vec![10.0, 5.0]],
                        vec![vec![10.0, 8.0], vec![2.0, 8.0]],
                    ]
                );
            }
            other => panic!("expected multi line, got {:?}", other),
        }
    }

    #[test]
    fn test_line_inside_keeps_vertices() {
        let coordinates = vec![vec![1.0, 1.0], vec![2.0, 3.0], vec![5.0, 5.0]];
        let line = Geometry::LineString {
            coordinates: coordinates.clone(),
        };
        assert_eq!(
            extent().clip(&line),
            Some(Geometry::LineString { coordinates })
        );
    }

    #[test]
    fn test_points_filtered() {
        let multi = Geometry::MultiPoint {
            coordinates: vec![vec![1.0, 1.0], vec![-1.0, 1.0], vec![10.0, 10.0]],
        };
        assert_eq!(
            extent().clip(&multi),
            Some(Geometry::MultiPoint {
                coordinates: vec![vec![1.0, 1.0], vec![10.0, 10.0]]
            })
        );
        assert!(extent()
            .clip(&Geometry::Point {
                coordinates: vec![11.0, 0.0]
            })
            .is_none());
    }

    #[test]
    fn test_sphere_is_extent_outline() {
        match extent().clip(&Geometry::Sphere) {
            Some(Geometry::Polygon { coordinates }) => assert_eq!(coordinates[0], extent().ring()),
            other => panic!("expected polygon, got {:?}", other),
        }
    }
}
