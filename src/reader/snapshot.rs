//! JSON view snapshots
//!
//! A snapshot freezes what a live map reported at one moment:
//!
//! ```json
//! {
//!   "zoom": 12.5,
//!   "center": {"lng": 13.40, "lat": 52.52},
//!   "bounds": {"ne": {"lng": 13.45, "lat": 52.55}, "sw": {"lng": 13.35, "lat": 52.49}},
//!   "layers": {
//!     "water": {"type": "FeatureCollection", "features": [...]},
//!     "roads": [...]
//!   }
//! }
//! ```
//!
//! Layer entries may be a feature collection or a bare feature array. Layers
//! absent from the snapshot rendered nothing.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use super::{LngLat, ViewBounds, ViewProvider};
use crate::geometry::{Feature, FeatureCollection};
use crate::{MapSvgError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum LayerFeatures {
    Collection(FeatureCollection),
    Features(Vec<Feature>),
}

impl LayerFeatures {
    fn features(&self) -> &[Feature] {
        match self {
            LayerFeatures::Collection(collection) => &collection.features,
            LayerFeatures::Features(features) => features,
        }
    }
}

/// A recorded map view.
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotView {
    zoom: f64,
    center: LngLat,
    bounds: ViewBounds,
    #[serde(default)]
    layers: HashMap<String, LayerFeatures>,
}

impl SnapshotView {
    /// Snapshot without any rendered features.
    pub fn new(zoom: f64, center: LngLat, bounds: ViewBounds) -> Self {
        Self {
            zoom,
            center,
            bounds,
            layers: HashMap::new(),
        }
    }

    /// Record the rendered features of one layer, replacing earlier ones.
    pub fn with_layer(mut self, layer_id: impl Into<String>, features: Vec<Feature>) -> Self {
        self.layers
            .insert(layer_id.into(), LayerFeatures::Features(features));
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let view: SnapshotView = serde_json::from_str(json)?;
        view.validate()?;
        Ok(view)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            MapSvgError::ViewError(format!(
                "Failed to read view snapshot '{}': {}",
                path.display(),
                e
            ))
        })?;
        let view = Self::from_json(&content)?;
        tracing::debug!(
            path = %path.display(),
            zoom = view.zoom,
            layers = view.layers.len(),
            "Loaded view snapshot"
        );
        Ok(view)
    }

    /// Layer ids with recorded features, sorted.
    pub fn layer_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.layers.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    fn validate(&self) -> Result<()> {
        let numbers = [
            self.zoom,
            self.center.lng,
            self.center.lat,
            self.bounds.ne.lng,
            self.bounds.ne.lat,
            self.bounds.sw.lng,
            self.bounds.sw.lat,
        ];
        if numbers.iter().any(|n| !n.is_finite()) {
            return Err(MapSvgError::ViewError(
                "Snapshot zoom, center and bounds must be finite".to_string(),
            ));
        }
        if self.bounds.sw.lat > self.bounds.ne.lat {
            return Err(MapSvgError::ViewError(format!(
                "South-west latitude {} is north of north-east latitude {}",
                self.bounds.sw.lat, self.bounds.ne.lat
            )));
        }
        Ok(())
    }
}

impl ViewProvider for SnapshotView {
    fn zoom(&self) -> f64 {
        self.zoom
    }

    fn center(&self) -> LngLat {
        self.center
    }

    fn bounds(&self) -> ViewBounds {
        self.bounds
    }

    fn query_rendered_features(&self, layer_id: &str) -> Result<Vec<Feature>> {
        Ok(self
            .layers
            .get(layer_id)
            .map(|layer| layer.features().to_vec())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Geometry;
    use std::io::Write;

    const SNAPSHOT: &str = r#"{
        "zoom": 12.5,
        "center": {"lng": 13.4, "lat": 52.52},
        "bounds": {"ne": {"lng": 13.45, "lat": 52.55}, "sw": {"lng": 13.35, "lat": 52.49}},
        "layers": {
            "water": {
                "type": "FeatureCollection",
                "features": [{
                    "type": "Feature",
                    "id": 7,
                    "geometry": {"type": "Point", "coordinates": [13.4, 52.5]},
                    "properties": {"name": "Spree"}
                }]
            },
            "roads": [
                {"type": "Feature", "geometry": {"type": "LineString", "coordinates": [[13.3, 52.5], [13.5, 52.5]]}, "properties": null}
            ]
        }
    }"#;

    #[test]
    fn test_parse_snapshot() {
        let view = SnapshotView::from_json(SNAPSHOT).unwrap();
        assert_eq!(view.zoom(), 12.5);
        assert_eq!(view.center(), LngLat::new(13.4, 52.52));
        assert_eq!(view.bounds().sw, LngLat::new(13.35, 52.49));
        assert_eq!(view.layer_ids(), vec!["roads", "water"]);

        let water = view.query_rendered_features("water").unwrap();
        assert_eq!(water.len(), 1);
        assert_eq!(water[0].properties["name"], "Spree");

        let roads = view.query_rendered_features("roads").unwrap();
        assert!(matches!(
            roads[0].geometry,
            Some(Geometry::LineString { .. })
        ));
        assert!(roads[0].properties.is_empty());
    }

    #[test]
    fn test_unknown_layer_is_empty() {
        let view = SnapshotView::from_json(SNAPSHOT).unwrap();
        assert!(view.query_rendered_features("buildings").unwrap().is_empty());
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let json = r#"{
            "zoom": 3,
            "center": {"lng": 0, "lat": 0},
            "bounds": {"ne": {"lng": 1, "lat": -1}, "sw": {"lng": -1, "lat": 1}}
        }"#;
        assert!(matches!(
            SnapshotView::from_json(json),
            Err(MapSvgError::ViewError(_))
        ));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SNAPSHOT.as_bytes()).unwrap();
        let view = SnapshotView::from_path(file.path()).unwrap();
        assert_eq!(view.zoom(), 12.5);

        let missing = SnapshotView::from_path(file.path().with_extension("missing"));
        assert!(matches!(missing, Err(MapSvgError::ViewError(_))));
    }
}
