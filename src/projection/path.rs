//! SVG path data from projected geometry
//!
//! [`PathWriter`] is a geometry stream sink that emits path commands in the
//! compact form browsers produce for geographic paths: `M x,y` to start a
//! line, `L x,y` for each following vertex, `Z` to close a polygon ring.
//! Stand-alone points are drawn as small circles.

use geo::Centroid;

use super::{project_geometry, Projection};
use crate::geometry::{Geometry, GeometryStream, Streamable};

/// Radius of the circle drawn for point geometry
pub const POINT_RADIUS: f64 = 4.5;

/// Format a coordinate with at most `precision` decimals, trailing zeros
/// trimmed.
pub fn format_number(value: f64, precision: u8) -> String {
    let mut text = format!("{:.*}", precision as usize, value);
    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
        text.truncate(trimmed);
    }
    if text == "-0" {
        text = "0".to_string();
    }
    text
}

/// Geometry stream sink accumulating SVG path data.
#[derive(Debug, Clone)]
pub struct PathWriter {
    buffer: String,
    precision: u8,
    radius: f64,
    in_polygon: bool,
    /// Index of the next vertex in the current line, `None` outside a line.
    vertex: Option<usize>,
}

impl PathWriter {
    pub fn new(precision: u8) -> Self {
        Self {
            buffer: String::new(),
            precision,
            radius: POINT_RADIUS,
            in_polygon: false,
            vertex: None,
        }
    }

    pub fn with_point_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    /// Path data written so far; `None` when nothing was drawn.
    pub fn finish(self) -> Option<String> {
        (!self.buffer.is_empty()).then_some(self.buffer)
    }

    fn push_xy(&mut self, command: char, x: f64, y: f64) {
        self.buffer.push(command);
        self.buffer.push_str(&format_number(x, self.precision));
        self.buffer.push(',');
        self.buffer.push_str(&format_number(y, self.precision));
    }

    fn push_circle(&mut self) {
        let r = format_number(self.radius, self.precision);
        let d = format_number(2.0 * self.radius, self.precision);
        self.buffer.push_str(&format!(
            "m0,{r}a{r},{r} 0 1,1 0,-{d}a{r},{r} 0 1,1 0,{d}z"
        ));
    }
}

impl GeometryStream for PathWriter {
    fn point(&mut self, x: f64, y: f64, _z: Option<f64>) {
        match self.vertex {
            Some(0) => {
                self.push_xy('M', x, y);
                self.vertex = Some(1);
            }
            Some(n) => {
                self.push_xy('L', x, y);
                self.vertex = Some(n + 1);
            }
            None => {
                self.push_xy('M', x, y);
                self.push_circle();
            }
        }
    }

    fn line_start(&mut self) {
        self.vertex = Some(0);
    }

    fn line_end(&mut self) {
        if self.in_polygon && self.vertex.is_some_and(|n| n > 0) {
            self.buffer.push('Z');
        }
        self.vertex = None;
    }

    fn polygon_start(&mut self) {
        self.in_polygon = true;
    }

    fn polygon_end(&mut self) {
        self.in_polygon = false;
    }
}

/// Project `geometry`, clip it to the projection's clip extent and render it
/// as path data. Returns `None` when nothing remains visible.
pub fn render_path<P: Projection + ?Sized>(
    geometry: &Geometry,
    projection: &P,
    precision: u8,
) -> Option<String> {
    render_path_with(geometry, projection, PathWriter::new(precision))
}

/// [`render_path`] with a preconfigured writer, e.g. a custom point radius.
pub fn render_path_with<P: Projection + ?Sized>(
    geometry: &Geometry,
    projection: &P,
    mut writer: PathWriter,
) -> Option<String> {
    let projected = clip_projected(geometry, projection)?;
    projected.stream(&mut writer);
    writer.finish()
}

/// Planar centroid of the visible, projected geometry.
pub fn projected_centroid<P: Projection + ?Sized>(
    geometry: &Geometry,
    projection: &P,
) -> Option<[f64; 2]> {
    let projected = clip_projected(geometry, projection)?;
    let centroid = projected.to_geo()?.centroid()?;
    let [x, y] = [centroid.x(), centroid.y()];
    (x.is_finite() && y.is_finite()).then_some([x, y])
}

/// Screen position for a label: the projected point for point geometry,
/// otherwise (or when that projection is not finite) the projected centroid.
pub fn label_anchor<P: Projection + ?Sized>(
    geometry: &Geometry,
    projection: &P,
) -> Option<[f64; 2]> {
    if let Geometry::Point { coordinates } = geometry {
        if let Some(position) = projection.project_position(coordinates) {
            return Some(position);
        }
    }
    projected_centroid(geometry, projection)
}

fn clip_projected<P: Projection + ?Sized>(geometry: &Geometry, projection: &P) -> Option<Geometry> {
    let projected = project_geometry(geometry, projection);
    match projection.clip_extent() {
        Some(extent) => extent.clip(&projected),
        None => Some(projected),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::{ClipExtent, Mercator};

    /// Identity-like projection over screen coordinates.
    struct Screen {
        clip: Option<ClipExtent>,
    }

    impl Projection for Screen {
        fn project(&self, lng: f64, lat: f64) -> [f64; 2] {
            [lng, lat]
        }
        fn scale(&self) -> f64 {
            1.0
        }
        fn set_scale(&mut self, _scale: f64) {}
        fn translate(&self) -> [f64; 2] {
            [0.0, 0.0]
        }
        fn set_translate(&mut self, _translate: [f64; 2]) {}
        fn clip_extent(&self) -> Option<ClipExtent> {
            self.clip
        }
        fn set_clip_extent(&mut self, extent: Option<ClipExtent>) {
            self.clip = extent;
        }
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1.0, 3), "1");
        assert_eq!(format_number(1.23456, 3), "1.235");
        assert_eq!(format_number(-0.0001, 3), "0");
        assert_eq!(format_number(120.0, 0), "120");
        assert_eq!(format_number(2.5, 3), "2.5");
    }

    #[test]
    fn test_polygon_path() {
        let polygon = Geometry::Polygon {
            coordinates: vec![vec![
                vec![0.0, 0.0],
                vec![10.0, 0.0],
                vec![10.0, 10.0],
                vec![0.0, 0.0],
            ]],
        };
        let d = render_path(&polygon, &Screen { clip: None }, 3);
        assert_eq!(d.as_deref(), Some("M0,0L10,0L10,10Z"));
    }

    #[test]
    fn test_line_path_is_open() {
        let line = Geometry::MultiLineString {
            coordinates: vec![
                vec![vec![0.0, 0.0], vec![1.5, 2.0]],
                vec![vec![3.0, 3.0], vec![4.0, 4.0]],
            ],
        };
        let d = render_path(&line, &Screen { clip: None }, 3);
        assert_eq!(d.as_deref(), Some("M0,0L1.5,2M3,3L4,4"));
    }

    #[test]
    fn test_point_path_is_circle() {
        let point = Geometry::Point {
            coordinates: vec![5.0, 6.0],
        };
        let d = render_path(&point, &Screen { clip: None }, 3);
        assert_eq!(
            d.as_deref(),
            Some("M5,6m0,4.5a4.5,4.5 0 1,1 0,-9a4.5,4.5 0 1,1 0,9z")
        );
    }

    #[test]
    fn test_clipped_away_geometry_has_no_path() {
        let point = Geometry::Point {
            coordinates: vec![50.0, 50.0],
        };
        let projection = Screen {
            clip: Some(ClipExtent::square(10.0)),
        };
        assert!(render_path(&point, &projection, 3).is_none());
        assert!(render_path(&Geometry::Unknown, &Screen { clip: None }, 3).is_none());
    }

    #[test]
    fn test_label_anchor_point_and_centroid() {
        let projection = Screen { clip: None };
        let point = Geometry::Point {
            coordinates: vec![2.0, 3.0],
        };
        assert_eq!(label_anchor(&point, &projection), Some([2.0, 3.0]));

        let square = Geometry::Polygon {
            coordinates: vec![vec![
                vec![0.0, 0.0],
                vec![4.0, 0.0],
                vec![4.0, 4.0],
                vec![0.0, 4.0],
                vec![0.0, 0.0],
            ]],
        };
        let [x, y] = label_anchor(&square, &projection).unwrap();
        assert!((x - 2.0).abs() < 1e-9);
        assert!((y - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_malformed_point_falls_back_to_nothing() {
        let projection = Screen { clip: None };
        let point = Geometry::Point {
            coordinates: vec![1.0],
        };
        assert!(label_anchor(&point, &projection).is_none());
    }

    #[test]
    fn test_mercator_path_stays_in_extent() {
        let projection = Mercator::new()
            .with_center(0.0, 0.0)
            .with_scale(1000.0)
            .with_translate(50.0, 50.0)
            .with_clip_extent(ClipExtent::square(100.0));
        let world = Geometry::bbox_polygon(-170.0, -80.0, 170.0, 80.0);
        let d = render_path(&world, &projection, 0).unwrap();
        assert!(d.starts_with('M'));
        assert!(d.ends_with('Z'));
        for number in d
            .split(|c: char| c == 'M' || c == 'L' || c == 'Z' || c == ',')
            .filter(|s| !s.is_empty())
        {
            let value: f64 = number.parse().unwrap();
            assert!((0.0..=100.0).contains(&value));
        }
    }
}
