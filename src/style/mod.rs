//! Style documents and property resolution
//!
//! A style document is an ordered list of layers. Each layer names a type and
//! carries two property maps, `layout` and `paint`, whose values are either
//! literals or data-driven expressions.
//!
//! # Submodules
//!
//! - `catalog` - declared value types and defaults per property id
//! - `expression` - restricted fast-path expression evaluation
//! - `engine` - complete expression compiler and evaluator
//! - `function` - legacy `{"stops": ...}` zoom and property functions
//! - `resolve` - per-feature property resolution combining the two
//! - `color` - CSS color parsing and hex normalization

pub mod catalog;
pub mod color;
pub mod engine;
pub mod expression;
pub mod function;
pub mod resolve;

pub use catalog::{BuiltinCatalog, PropertySpec, StyleCatalog, ValueType};
pub use engine::{CompiledExpression, EvalContext, StyleExpressionEngine};
pub use expression::Expr;
pub use resolve::{PropertyResolver, Resolved};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;

use crate::{MapSvgError, Result};

/// Which property map of a layer a property lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    Layout,
    Paint,
}

impl PropertyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyKind::Layout => "layout",
            PropertyKind::Paint => "paint",
        }
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PropertyKind {
    type Err = MapSvgError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "layout" => Ok(PropertyKind::Layout),
            "paint" => Ok(PropertyKind::Paint),
            other => Err(MapSvgError::StyleError(format!(
                "Unknown property type '{}', expected 'layout' or 'paint'",
                other
            ))),
        }
    }
}

/// Layer type tag, closed over the types the translator distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerType {
    Fill,
    Line,
    Background,
    Symbol,
    Circle,
    FillExtrusion,
    Heatmap,
    /// raster, hillshade and anything newer
    Other,
}

impl LayerType {
    pub fn from_name(name: &str) -> Self {
        match name {
            "fill" => LayerType::Fill,
            "line" => LayerType::Line,
            "background" => LayerType::Background,
            "symbol" => LayerType::Symbol,
            "circle" => LayerType::Circle,
            "fill-extrusion" => LayerType::FillExtrusion,
            "heatmap" => LayerType::Heatmap,
            _ => LayerType::Other,
        }
    }
}

/// One style layer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StyleLayer {
    pub id: String,
    /// Raw type name as written in the style.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(
        rename = "source-layer",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub source_layer: Option<String>,
    #[serde(default)]
    pub layout: Map<String, Value>,
    #[serde(default)]
    pub paint: Map<String, Value>,
}

impl StyleLayer {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            ..Default::default()
        }
    }

    pub fn with_paint(mut self, property: &str, value: Value) -> Self {
        self.paint.insert(property.to_string(), value);
        self
    }

    pub fn with_layout(mut self, property: &str, value: Value) -> Self {
        self.layout.insert(property.to_string(), value);
        self
    }

    pub fn layer_type(&self) -> LayerType {
        LayerType::from_name(&self.kind)
    }

    /// Raw value of a property, as written in the style.
    pub fn property(&self, kind: PropertyKind, property_id: &str) -> Option<&Value> {
        match kind {
            PropertyKind::Layout => self.layout.get(property_id),
            PropertyKind::Paint => self.paint.get(property_id),
        }
    }

    /// False only when layout visibility is explicitly `none`.
    pub fn is_visible(&self) -> bool {
        self.layout.get("visibility").and_then(Value::as_str) != Some("none")
    }
}

/// Parsed style document.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct StyleDocument {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub layers: Vec<StyleLayer>,
}

impl StyleDocument {
    pub fn new(layers: Vec<StyleLayer>) -> Self {
        Self { name: None, layers }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let document: StyleDocument = serde_json::from_str(json)?;
        document.validate()?;
        Ok(document)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            MapSvgError::StyleError(format!("Failed to read style '{}': {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    pub fn layer(&self, id: &str) -> Option<&StyleLayer> {
        self.layers.iter().find(|layer| layer.id == id)
    }

    fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for (index, layer) in self.layers.iter().enumerate() {
            if layer.id.is_empty() {
                return Err(MapSvgError::StyleError(format!(
                    "Layer {} has an empty id",
                    index
                )));
            }
            if !seen.insert(layer.id.as_str()) {
                return Err(MapSvgError::StyleError(format!(
                    "Duplicate layer id '{}'",
                    layer.id
                )));
            }
        }
        Ok(())
    }
}
