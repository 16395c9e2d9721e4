//! mapsvg - export the rendered view of a styled vector map as SVG
//!
//! The crate takes the state of an interactive map (zoom, center, bounds and
//! the features currently rendered per style layer) together with the style
//! document that drives it, and produces a standalone SVG document that
//! reproduces every visible layer.
//!
//! # Architecture
//!
//! - `geometry` - GeoJSON model, geometry streaming, bounds, simplification
//! - `projection` - Mercator projection, extent fitting, SVG path rendering
//! - `style` - style document, property catalog, expression evaluation
//! - `reader` - view provider abstraction and JSON view snapshots
//! - `writer` - SVG document model, layer translation, output delivery
//!
//! # Example
//!
//! ```rust,ignore
//! use mapsvg::{ExportConfig, MapExporter, SnapshotView, StyleDocument};
//! use mapsvg::writer::FileDelivery;
//!
//! let style = StyleDocument::from_path("style.json")?;
//! let view = SnapshotView::from_path("view.json")?;
//! let mut delivery = FileDelivery::new("out");
//!
//! let exporter = MapExporter::new(ExportConfig::default());
//! let report = exporter.export_to(&view, &style, &mut delivery)?;
//! println!("{} elements written", report.element_count);
//! ```

pub mod config;
pub mod geometry;
pub mod projection;
pub mod reader;
pub mod style;
pub mod writer;

pub use config::ExportConfig;
pub use geometry::{Feature, FeatureCollection, Geometry, Streamable};
pub use projection::{Mercator, Projection};
pub use reader::{LngLat, SnapshotView, ViewBounds, ViewProvider};
pub use style::{LayerType, StyleDocument, StyleLayer};
pub use writer::svg::{Diagnostic, ExportReport, MapExporter, SvgDocument};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Main error type for mapsvg operations
#[derive(thiserror::Error, Debug)]
pub enum MapSvgError {
    #[error("Style error: {0}")]
    StyleError(String),

    #[error("View error: {0}")]
    ViewError(String),

    #[error("Export error: {0}")]
    ExportError(String),

    #[error("Delivery error: {0}")]
    DeliveryError(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MapSvgError>;
