//! Style property to SVG attribute tables
//!
//! Each layer type maps a fixed set of style properties onto presentation
//! attributes, plus a few attributes with constant values. The tables are
//! plain data; [`convert_value`] turns one resolved style value into
//! attribute text.

use serde_json::{Map, Value};

use crate::style::color::value_to_hex;
use crate::style::engine::value_to_string;
use crate::style::function::{evaluate_legacy_function, is_legacy_function};
use crate::style::{LayerType, PropertyKind};

/// How a resolved value becomes attribute text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeTransform {
    /// Numbers and strings as written; arrays comma-joined.
    Plain,
    /// Any CSS color to `#rrggbb`.
    Hex,
    /// Font stack array joined with `,`.
    FontList,
}

/// One `attribute <- property` mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeRule {
    pub attribute: &'static str,
    pub kind: PropertyKind,
    pub property: &'static str,
    pub transform: AttributeTransform,
}

const fn paint(
    attribute: &'static str,
    property: &'static str,
    transform: AttributeTransform,
) -> AttributeRule {
    AttributeRule {
        attribute,
        kind: PropertyKind::Paint,
        property,
        transform,
    }
}

const fn layout(
    attribute: &'static str,
    property: &'static str,
    transform: AttributeTransform,
) -> AttributeRule {
    AttributeRule {
        attribute,
        kind: PropertyKind::Layout,
        property,
        transform,
    }
}

use AttributeTransform::{FontList, Hex, Plain};

/// Attribute table for one kind of element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerStyleSpec {
    pub rules: &'static [AttributeRule],
    /// Attributes with constant values, set after the rules.
    pub fixed: &'static [(&'static str, &'static str)],
}

impl LayerStyleSpec {
    /// Table for the path elements of a layer type. Symbol layers use
    /// [`LABEL_TEXT`], [`LABEL_HALO`] and [`LABEL_BLUR`] instead.
    pub fn for_layer_type(layer_type: LayerType) -> &'static LayerStyleSpec {
        match layer_type {
            LayerType::Line => &LINE,
            LayerType::Background => &BACKGROUND,
            LayerType::Circle => &CIRCLE,
            LayerType::Symbol => &LABEL_TEXT,
            LayerType::Fill | LayerType::FillExtrusion | LayerType::Heatmap | LayerType::Other => {
                &POLYGON
            }
        }
    }
}

pub const POLYGON: LayerStyleSpec = LayerStyleSpec {
    rules: &[
        paint("fill", "fill-color", Hex),
        paint("opacity", "fill-opacity", Plain),
    ],
    fixed: &[("stroke", "none")],
};

pub const LINE: LayerStyleSpec = LayerStyleSpec {
    rules: &[
        paint("stroke-width", "line-width", Plain),
        paint("stroke", "line-color", Hex),
        paint("opacity", "line-opacity", Plain),
    ],
    fixed: &[("fill", "none")],
};

pub const BACKGROUND: LayerStyleSpec = LayerStyleSpec {
    rules: &[
        paint("fill", "background-color", Hex),
        paint("opacity", "background-opacity", Plain),
    ],
    fixed: &[("stroke", "none")],
};

pub const CIRCLE: LayerStyleSpec = LayerStyleSpec {
    rules: &[
        paint("fill", "circle-color", Hex),
        paint("opacity", "circle-opacity", Plain),
        paint("stroke", "circle-stroke-color", Hex),
        paint("stroke-width", "circle-stroke-width", Plain),
    ],
    fixed: &[],
};

/// Attributes shared by the primary label and its halo.
const LABEL_COMMON: [AttributeRule; 3] = [
    layout("font-family", "text-font", FontList),
    layout("font-size", "text-size", Plain),
    paint("opacity", "text-opacity", Plain),
];

pub const LABEL_TEXT: LayerStyleSpec = LayerStyleSpec {
    rules: &[
        LABEL_COMMON[0],
        LABEL_COMMON[1],
        LABEL_COMMON[2],
        paint("fill", "text-color", Hex),
    ],
    fixed: &[("text-anchor", "middle")],
};

pub const LABEL_HALO: LayerStyleSpec = LayerStyleSpec {
    rules: &[
        LABEL_COMMON[0],
        LABEL_COMMON[1],
        LABEL_COMMON[2],
        paint("stroke", "text-halo-color", Hex),
        paint("stroke-width", "text-halo-width", Plain),
    ],
    fixed: &[("text-anchor", "middle"), ("fill", "none")],
};

pub const LABEL_BLUR: LayerStyleSpec = LayerStyleSpec {
    rules: &[paint("stdDeviation", "text-halo-blur", Plain)],
    fixed: &[],
};

/// Label content property
pub const TEXT_FIELD: &str = "text-field";

/// Case transform applied to label content
pub const TEXT_TRANSFORM: &str = "text-transform";

/// Radius of circle layer points
pub const CIRCLE_RADIUS: &str = "circle-radius";

/// Blur applied when the halo blur property resolves to nothing usable
pub const DEFAULT_HALO_BLUR: &str = "5";

/// Result of converting one resolved value.
#[derive(Debug, Clone, PartialEq)]
pub enum Converted {
    Set(String),
    /// Null, `false` or empty: the attribute is omitted.
    Skip,
    /// The value cannot be expressed by the transform.
    Invalid(String),
}

/// Convert a resolved style value into attribute text.
///
/// Legacy function objects are evaluated first, at `zoom` and for
/// `properties`.
pub fn convert_value(
    value: &Value,
    transform: AttributeTransform,
    properties: &Map<String, Value>,
    zoom: f64,
) -> Converted {
    let evaluated;
    let value = if is_legacy_function(value) {
        match evaluate_legacy_function(value, properties, zoom) {
            Some(result) => {
                evaluated = result;
                &evaluated
            }
            None => return Converted::Skip,
        }
    } else {
        value
    };

    match value {
        Value::Null | Value::Bool(false) => return Converted::Skip,
        Value::String(s) if s.is_empty() => return Converted::Skip,
        _ => {}
    }

    match transform {
        Hex => match value_to_hex(value) {
            Some(hex) => Converted::Set(hex),
            None => Converted::Invalid(value.to_string()),
        },
        FontList => match value {
            Value::String(font) => Converted::Set(font.clone()),
            Value::Array(fonts) => fonts
                .iter()
                .map(|font| font.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
                .map(|fonts| Converted::Set(fonts.join(",")))
                .unwrap_or_else(|| Converted::Invalid(value.to_string())),
            other => Converted::Invalid(other.to_string()),
        },
        Plain => match value {
            Value::Object(_) => Converted::Invalid(value.to_string()),
            Value::Array(items) => Converted::Set(
                items
                    .iter()
                    .map(value_to_string)
                    .collect::<Vec<_>>()
                    .join(","),
            ),
            other => Converted::Set(value_to_string(other)),
        },
    }
}
