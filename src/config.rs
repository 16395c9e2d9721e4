//! Export configuration
//!
//! `ExportConfig` carries every tunable of one export pass. It can be built in
//! code with the `with_*` methods or deserialized from JSON; missing fields
//! fall back to the defaults below.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{MapSvgError, Result};

/// Default square output side in pixels
pub const DEFAULT_SIZE: u32 = 1024;

/// Layer types that are never exported
pub const UNSUPPORTED_LAYER_TYPES: &[&str] = &["fill-extrusion", "heatmap"];

/// Configuration for a single map-to-SVG export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Side of the square output document in pixels.
    pub size: u32,
    /// Decimal places kept for path and transform coordinates.
    pub precision: u8,
    /// Value of the `title` attribute on the root element.
    pub title: String,
    /// Logical document name; the delivered file is `{file_stem}.svg`.
    pub file_stem: String,
    /// Emit an `<?xml ...?>` declaration before the root element.
    pub xml_declaration: bool,
    /// Layer type tags skipped entirely.
    pub unsupported_layer_types: Vec<String>,
    /// Simplify queried features before projecting them.
    pub simplify: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            precision: 3,
            title: "svg_title".to_string(),
            file_stem: "mapSvg".to_string(),
            xml_declaration: true,
            unsupported_layer_types: UNSUPPORTED_LAYER_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            simplify: true,
        }
    }
}

impl ExportConfig {
    /// Load a configuration from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    /// Parse a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ExportConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot produce a document.
    pub fn validate(&self) -> Result<()> {
        if self.size == 0 {
            return Err(MapSvgError::ExportError(
                "Output size must be greater than zero".to_string(),
            ));
        }
        if self.file_stem.trim().is_empty() {
            return Err(MapSvgError::ExportError(
                "Output file stem must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    pub fn with_precision(mut self, precision: u8) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_file_stem(mut self, stem: impl Into<String>) -> Self {
        self.file_stem = stem.into();
        self
    }

    /// Disable the XML declaration for embedding in HTML.
    pub fn without_xml_declaration(mut self) -> Self {
        self.xml_declaration = false;
        self
    }

    pub fn without_simplification(mut self) -> Self {
        self.simplify = false;
        self
    }

    /// Whether a layer type tag is in the unsupported set.
    pub fn is_unsupported(&self, layer_type: &str) -> bool {
        self.unsupported_layer_types.iter().any(|t| t == layer_type)
    }

    /// Suggested output filename.
    pub fn filename(&self) -> String {
        format!("{}.svg", self.file_stem)
    }
}
