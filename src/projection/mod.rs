//! Map projections for SVG export
//!
//! Geographic coordinates are projected with spherical Web Mercator, the same
//! projection the interactive map renders with. A projection is parameterized
//! by its center, scale, translate offset and an optional clip rectangle.
//!
//! # Submodules
//!
//! - `clip` - clipping projected geometry to a rectangle
//! - `fit` - discovering the scale that fits a geometry into an extent
//! - `path` - rendering projected geometry as SVG path data

pub mod clip;
pub mod fit;
pub mod path;

pub use clip::ClipExtent;
pub use fit::{fit_extent, FIT_PROBE_SCALE};
pub use path::{
    format_number, label_anchor, projected_centroid, render_path, render_path_with, PathWriter,
    POINT_RADIUS,
};

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use crate::geometry::{Geometry, GeometryStream, Position};

/// Latitude limit of Web Mercator, in degrees
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Scale used by a freshly created Mercator projection (961 / 2pi)
pub const DEFAULT_SCALE: f64 = 961.0 / std::f64::consts::TAU;

/// Geographic to screen coordinate transform.
pub trait Projection {
    /// Project a longitude/latitude pair, in degrees, to screen pixels.
    fn project(&self, lng: f64, lat: f64) -> [f64; 2];

    fn scale(&self) -> f64;

    fn set_scale(&mut self, scale: f64);

    fn translate(&self) -> [f64; 2];

    fn set_translate(&mut self, translate: [f64; 2]);

    fn clip_extent(&self) -> Option<ClipExtent>;

    fn set_clip_extent(&mut self, extent: Option<ClipExtent>);

    /// Project a GeoJSON position.
    ///
    /// Returns `None` unless the position has two ordinates and both projected
    /// values are finite.
    fn project_position(&self, position: &[f64]) -> Option<[f64; 2]> {
        match position {
            [lng, lat] | [lng, lat, _] => {
                let [x, y] = self.project(*lng, *lat);
                (x.is_finite() && y.is_finite()).then_some([x, y])
            }
            _ => None,
        }
    }
}

/// Spherical Mercator projection.
#[derive(Debug, Clone, PartialEq)]
pub struct Mercator {
    center: [f64; 2],
    scale: f64,
    translate: [f64; 2],
    clip: Option<ClipExtent>,
}

impl Default for Mercator {
    fn default() -> Self {
        Self {
            center: [0.0, 0.0],
            scale: DEFAULT_SCALE,
            translate: [480.0, 250.0],
            clip: None,
        }
    }
}

impl Mercator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Geographic point, in degrees, that lands on the translate offset.
    pub fn with_center(mut self, lng: f64, lat: f64) -> Self {
        self.center = [lng, lat];
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_translate(mut self, x: f64, y: f64) -> Self {
        self.translate = [x, y];
        self
    }

    pub fn with_clip_extent(mut self, extent: ClipExtent) -> Self {
        self.clip = Some(extent);
        self
    }

    pub fn center(&self) -> [f64; 2] {
        self.center
    }

    /// Unscaled Mercator in radians.
    fn raw(lng: f64, lat: f64) -> [f64; 2] {
        let lambda = lng.to_radians();
        let phi = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
        [lambda, (FRAC_PI_4 + phi / 2.0).tan().ln()]
    }
}

impl Projection for Mercator {
    fn project(&self, lng: f64, lat: f64) -> [f64; 2] {
        let [x, y] = Self::raw(lng, lat);
        let [cx, cy] = Self::raw(self.center[0], self.center[1]);
        [
            self.translate[0] + self.scale * (x - cx),
            self.translate[1] - self.scale * (y - cy),
        ]
    }

    fn scale(&self) -> f64 {
        self.scale
    }

    fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }

    fn translate(&self) -> [f64; 2] {
        self.translate
    }

    fn set_translate(&mut self, translate: [f64; 2]) {
        self.translate = translate;
    }

    fn clip_extent(&self) -> Option<ClipExtent> {
        self.clip
    }

    fn set_clip_extent(&mut self, extent: Option<ClipExtent>) {
        self.clip = extent;
    }
}

/// Stream adapter that projects every point before forwarding it.
pub struct ProjectionStream<'a, P: Projection + ?Sized, S: GeometryStream + ?Sized> {
    projection: &'a P,
    sink: &'a mut S,
}

impl<'a, P: Projection + ?Sized, S: GeometryStream + ?Sized> ProjectionStream<'a, P, S> {
    pub fn new(projection: &'a P, sink: &'a mut S) -> Self {
        Self { projection, sink }
    }
}

impl<P: Projection + ?Sized, S: GeometryStream + ?Sized> GeometryStream
    for ProjectionStream<'_, P, S>
{
    fn point(&mut self, x: f64, y: f64, z: Option<f64>) {
        let [px, py] = self.projection.project(x, y);
        self.sink.point(px, py, z);
    }

    fn line_start(&mut self) {
        self.sink.line_start();
    }

    fn line_end(&mut self) {
        self.sink.line_end();
    }

    fn polygon_start(&mut self) {
        self.sink.polygon_start();
    }

    fn polygon_end(&mut self) {
        self.sink.polygon_end();
    }

    fn sphere(&mut self) {
        self.sink.sphere();
    }
}

/// Project every position of a geometry to screen space, without clipping.
pub fn project_geometry<P: Projection + ?Sized>(geometry: &Geometry, projection: &P) -> Geometry {
    let line = |positions: &Vec<Position>| -> Vec<Position> {
        positions
            .iter()
            .filter_map(|p| projection.project_position(p))
            .map(|[x, y]| vec![x, y])
            .collect()
    };

    match geometry {
        Geometry::Point { coordinates } => match projection.project_position(coordinates) {
            Some([x, y]) => Geometry::Point {
                coordinates: vec![x, y],
            },
            None => Geometry::MultiPoint {
                coordinates: vec![],
            },
        },
        Geometry::MultiPoint { coordinates } => Geometry::MultiPoint {
            coordinates: line(coordinates),
        },
        Geometry::LineString { coordinates } => Geometry::LineString {
            coordinates: line(coordinates),
        },
        Geometry::MultiLineString { coordinates } => Geometry::MultiLineString {
            coordinates: coordinates.iter().map(line).collect(),
        },
        Geometry::Polygon { coordinates } => Geometry::Polygon {
            coordinates: coordinates.iter().map(line).collect(),
        },
        Geometry::MultiPolygon { coordinates } => Geometry::MultiPolygon {
            coordinates: coordinates
                .iter()
                .map(|rings| rings.iter().map(line).collect())
                .collect(),
        },
        Geometry::GeometryCollection { geometries } => Geometry::GeometryCollection {
            geometries: geometries
                .iter()
                .map(|g| project_geometry(g, projection))
                .collect(),
        },
        Geometry::Sphere => Geometry::Sphere,
        Geometry::Unknown => Geometry::Unknown,
    }
}

/// Latitude whose Mercator y equals `y` (radians in, degrees out).
pub fn inverse_latitude(y: f64) -> f64 {
    (2.0 * y.exp().atan() - FRAC_PI_2).to_degrees()
}
