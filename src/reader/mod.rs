//! View provider abstraction for mapsvg
//!
//! The exporter never talks to a live map directly. Everything it needs from
//! the map, the viewport and the features currently rendered per style layer,
//! comes through the [`ViewProvider`] trait.
//!
//! # Example
//!
//! ```rust,ignore
//! use mapsvg::reader::{SnapshotView, ViewProvider};
//!
//! let view = SnapshotView::from_path("view.json")?;
//! println!("zoom {} at {}", view.zoom(), view.center());
//! let roads = view.query_rendered_features("roads")?;
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::geometry::{Feature, FeatureId, Geometry, BBOX_FEATURE_ID};
use crate::Result;

pub mod snapshot;

pub use snapshot::SnapshotView;

// ============================================================================
// Viewport types
// ============================================================================

/// A geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

impl fmt::Display for LngLat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lng, self.lat)
    }
}

/// Visible extent of the map, north-east and south-west corners.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewBounds {
    pub ne: LngLat,
    pub sw: LngLat,
}

impl ViewBounds {
    pub fn new(ne: LngLat, sw: LngLat) -> Self {
        Self { ne, sw }
    }

    /// Synthetic feature covering the whole viewport, used by background
    /// layers. Its ring runs NE, SE, SW, NW and back to NE.
    pub fn to_feature(&self) -> Feature {
        let mut feature = Feature::new(Geometry::bbox_polygon(
            self.sw.lng,
            self.sw.lat,
            self.ne.lng,
            self.ne.lat,
        ));
        feature.id = Some(FeatureId::String(BBOX_FEATURE_ID.to_string()));
        feature
    }
}

// ============================================================================
// ViewProvider Trait
// ============================================================================

/// Source of the current map view.
///
/// Implementations report the viewport at the moment of export and return the
/// features rendered for a style layer. All four calls must describe the same
/// view; the exporter calls them once per export and never caches across
/// exports.
pub trait ViewProvider {
    /// Current zoom level.
    fn zoom(&self) -> f64;

    /// Geographic center of the viewport.
    fn center(&self) -> LngLat;

    /// Geographic bounds of the viewport.
    fn bounds(&self) -> ViewBounds;

    /// Features currently rendered for a style layer id.
    ///
    /// # Errors
    ///
    /// Returns `MapSvgError::ViewError` if the provider cannot answer for this
    /// layer. The exporter treats that as a skipped layer.
    fn query_rendered_features(&self, layer_id: &str) -> Result<Vec<Feature>>;
}

impl<T: ViewProvider + ?Sized> ViewProvider for &T {
    fn zoom(&self) -> f64 {
        (**self).zoom()
    }

    fn center(&self) -> LngLat {
        (**self).center()
    }

    fn bounds(&self) -> ViewBounds {
        (**self).bounds()
    }

    fn query_rendered_features(&self, layer_id: &str) -> Result<Vec<Feature>> {
        (**self).query_rendered_features(layer_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_feature_ring_order() {
        let bounds = ViewBounds::new(LngLat::new(1.0, 1.0), LngLat::new(0.0, 0.0));
        let feature = bounds.to_feature();
        assert!(feature.is_bbox());

        let Some(Geometry::Polygon { coordinates }) = feature.geometry else {
            panic!("expected a polygon");
        };
        assert_eq!(
            coordinates[0],
            vec![
                vec![1.0, 1.0],
                vec![1.0, 0.0],
                vec![0.0, 0.0],
                vec![0.0, 1.0],
                vec![1.0, 1.0],
            ]
        );
    }

    #[test]
    fn test_lnglat_display() {
        assert_eq!(LngLat::new(13.4, 52.5).to_string(), "(13.4, 52.5)");
    }
}
