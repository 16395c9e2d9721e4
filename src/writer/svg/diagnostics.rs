//! Non-fatal export problems
//!
//! Nothing that goes wrong inside a layer aborts an export. The affected
//! layer or element is dropped, a [`Diagnostic`] is logged, passed to the
//! exporter's callback and collected in the [`ExportReport`].

use std::fmt;

/// Why a whole layer was left out.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// Layout visibility is `none`.
    Hidden,
    /// Layer type is in the unsupported set.
    UnsupportedType(String),
    /// The view provider could not return the layer's features.
    QueryFailed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Hidden => write!(f, "visibility is none"),
            SkipReason::UnsupportedType(kind) => write!(f, "unsupported layer type '{}'", kind),
            SkipReason::QueryFailed(message) => write!(f, "feature query failed: {}", message),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    LayerSkipped {
        layer_id: String,
        reason: SkipReason,
    },
    /// A feature produced no element, e.g. it lies outside the output extent.
    ElementSkipped {
        layer_id: String,
        element_id: String,
        reason: String,
    },
    ExpressionFallback {
        layer_id: String,
        element_id: String,
        property: String,
        reason: String,
    },
    /// A color-bearing property resolved to something that is not a color.
    InvalidColor {
        layer_id: String,
        element_id: String,
        property: String,
        value: String,
    },
    /// The viewport fit produced no usable scale; the layer renders nothing.
    DegenerateFit { layer_id: String, scale: f64 },
}

impl Diagnostic {
    pub fn layer_id(&self) -> &str {
        match self {
            Diagnostic::LayerSkipped { layer_id, .. }
            | Diagnostic::ElementSkipped { layer_id, .. }
            | Diagnostic::ExpressionFallback { layer_id, .. }
            | Diagnostic::InvalidColor { layer_id, .. }
            | Diagnostic::DegenerateFit { layer_id, .. } => layer_id,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::LayerSkipped { layer_id, reason } => {
                write!(f, "layer '{}' skipped: {}", layer_id, reason)
            }
            Diagnostic::ElementSkipped {
                layer_id,
                element_id,
                reason,
            } => write!(
                f,
                "element '{}' of layer '{}' skipped: {}",
                element_id, layer_id, reason
            ),
            Diagnostic::ExpressionFallback {
                layer_id,
                element_id,
                property,
                reason,
            } => write!(
                f,
                "'{}' on element '{}' of layer '{}' fell back: {}",
                property, element_id, layer_id, reason
            ),
            Diagnostic::InvalidColor {
                layer_id,
                element_id,
                property,
                value,
            } => write!(
                f,
                "'{}' on element '{}' of layer '{}' is not a color: {}",
                property, element_id, layer_id, value
            ),
            Diagnostic::DegenerateFit { layer_id, scale } => write!(
                f,
                "layer '{}' skipped: viewport fit gave scale {}",
                layer_id, scale
            ),
        }
    }
}

/// Summary of one export.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExportReport {
    /// Elements in the finished document.
    pub element_count: usize,
    /// Ids of layers that produced a group, in style order.
    pub layers_exported: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
    /// Delivered filename, set by `export_to`.
    pub filename: Option<String>,
    /// Serialized document size in bytes, set by `export_to`.
    pub bytes: usize,
}

impl ExportReport {
    /// Number of layers left out entirely.
    pub fn layers_skipped(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| {
                matches!(
                    d,
                    Diagnostic::LayerSkipped { .. } | Diagnostic::DegenerateFit { .. }
                )
            })
            .count()
    }

    /// Diagnostics concerning one layer.
    pub fn for_layer<'a>(&'a self, layer_id: &'a str) -> impl Iterator<Item = &'a Diagnostic> {
        self.diagnostics
            .iter()
            .filter(move |d| d.layer_id() == layer_id)
    }
}
