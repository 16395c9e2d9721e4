//! Zoom-dependent geometry simplification
//!
//! Features are simplified with Ramer-Douglas-Peucker in geographic degrees
//! before projection. The tolerance grows as the view zooms out so that the
//! size of the output document stays bounded when a wide area is visible.

use geo::Simplify;
use geo_types::Geometry as GeoGeometry;

use super::{Feature, FeatureCollection, Geometry};

/// Finest tolerance, reached at zoom 13 and above
pub const MIN_TOLERANCE: f64 = 0.0001;

/// Coarsest tolerance, reached at zoom 5 and below
pub const MAX_TOLERANCE: f64 = 0.0075;

/// Zoom level the tolerance ramp is measured down from
const MAX_ZOOM: f64 = 18.0;

/// Domain of `MAX_ZOOM - zoom` mapped onto the tolerance range
const RAMP_DOMAIN: (f64, f64) = (5.0, 13.0);

/// Linearly map `value` from `[x1, y1]` onto `[x2, y2]`.
fn map_range(value: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    ((value - x1) * (y2 - x2)) / (y1 - x1) + x2
}

/// Simplification tolerance, in degrees, for a zoom level.
pub fn tolerance_for_zoom(zoom: f64) -> f64 {
    let tolerance = map_range(
        MAX_ZOOM - zoom,
        RAMP_DOMAIN.0,
        RAMP_DOMAIN.1,
        MIN_TOLERANCE,
        MAX_TOLERANCE,
    );
    tolerance.clamp(MIN_TOLERANCE, MAX_TOLERANCE)
}

/// Simplify every feature of a collection at the tolerance for `zoom`.
pub fn simplify_collection(collection: &FeatureCollection, zoom: f64) -> FeatureCollection {
    FeatureCollection::new(simplify_features(
        collection.features.clone(),
        tolerance_for_zoom(zoom),
    ))
}

/// Simplify owned features with an explicit tolerance.
///
/// Points and geometries that cannot be converted pass through untouched.
pub fn simplify_features(features: Vec<Feature>, tolerance: f64) -> Vec<Feature> {
    features
        .into_iter()
        .map(|mut feature| {
            if let Some(geometry) = feature.geometry.take() {
                feature.geometry = Some(simplify_geometry(geometry, tolerance));
            }
            feature
        })
        .collect()
}

fn simplify_geometry(geometry: Geometry, tolerance: f64) -> Geometry {
    match &geometry {
        Geometry::Point { .. }
        | Geometry::MultiPoint { .. }
        | Geometry::Sphere
        | Geometry::Unknown => geometry,
        Geometry::GeometryCollection { geometries } => Geometry::GeometryCollection {
            geometries: geometries
                .iter()
                .cloned()
                .map(|g| simplify_geometry(g, tolerance))
                .collect(),
        },
        _ => match geometry.to_geo() {
            Some(geo) => Geometry::from_geo(&simplify_geo(geo, tolerance)),
            None => geometry,
        },
    }
}

fn simplify_geo(geometry: GeoGeometry<f64>, tolerance: f64) -> GeoGeometry<f64> {
    match geometry {
        GeoGeometry::LineString(ls) => GeoGeometry::LineString(ls.simplify(&tolerance)),
        GeoGeometry::MultiLineString(mls) => {
            GeoGeometry::MultiLineString(mls.simplify(&tolerance))
        }
        GeoGeometry::Polygon(poly) => GeoGeometry::Polygon(poly.simplify(&tolerance)),
        GeoGeometry::MultiPolygon(mp) => GeoGeometry::MultiPolygon(mp.simplify(&tolerance)),
        other => other,
    }
}
