//! Style property catalog
//!
//! The catalog answers "what kind of value does this property hold?". The
//! expression engine needs the declared value type to compile a data-driven
//! expression, and the resolver falls back to the declared default when an
//! expression cannot be evaluated.

use serde::Deserialize;
use serde_json::{json, Value};

use super::PropertyKind;

/// Declared type of a style property value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Number,
    String,
    Boolean,
    Color,
    Enum,
    Array,
    Formatted,
}

/// Catalog entry for one property id.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PropertySpec {
    #[serde(rename = "property-type")]
    pub kind: PropertyKind,
    #[serde(rename = "type")]
    pub value_type: ValueType,
    #[serde(default)]
    pub default: Option<Value>,
}

impl PropertySpec {
    pub fn new(kind: PropertyKind, value_type: ValueType) -> Self {
        Self {
            kind,
            value_type,
            default: None,
        }
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }
}

/// Source of property specifications.
pub trait StyleCatalog {
    fn property_spec(&self, property_id: &str) -> Option<PropertySpec>;
}

/// Catalog covering every property the SVG translator reads.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinCatalog;

impl StyleCatalog for BuiltinCatalog {
    fn property_spec(&self, property_id: &str) -> Option<PropertySpec> {
        use PropertyKind::{Layout, Paint};
        use ValueType as V;

        let (kind, value_type, default) = match property_id {
            "visibility" => (Layout, V::Enum, json!("visible")),

            "background-color" => (Paint, V::Color, json!("#000000")),
            "background-opacity" => (Paint, V::Number, json!(1)),

            "fill-color" => (Paint, V::Color, json!("#000000")),
            "fill-opacity" => (Paint, V::Number, json!(1)),
            "fill-outline-color" => (Paint, V::Color, Value::Null),
            "fill-antialias" => (Paint, V::Boolean, json!(true)),

            "line-color" => (Paint, V::Color, json!("#000000")),
            "line-width" => (Paint, V::Number, json!(1)),
            "line-opacity" => (Paint, V::Number, json!(1)),
            "line-blur" => (Paint, V::Number, json!(0)),
            "line-dasharray" => (Paint, V::Array, Value::Null),
            "line-cap" => (Layout, V::Enum, json!("butt")),
            "line-join" => (Layout, V::Enum, json!("miter")),

            "circle-color" => (Paint, V::Color, json!("#000000")),
            "circle-radius" => (Paint, V::Number, json!(5)),
            "circle-opacity" => (Paint, V::Number, json!(1)),
            "circle-stroke-color" => (Paint, V::Color, json!("#000000")),
            "circle-stroke-width" => (Paint, V::Number, json!(0)),

            "text-field" => (Layout, V::Formatted, json!("")),
            "text-font" => (
                Layout,
                V::Array,
                json!(["Open Sans Regular", "Arial Unicode MS Regular"]),
            ),
            "text-size" => (Layout, V::Number, json!(16)),
            "text-transform" => (Layout, V::Enum, json!("none")),
            "text-anchor" => (Layout, V::Enum, json!("center")),
            "text-offset" => (Layout, V::Array, json!([0, 0])),
            "text-color" => (Paint, V::Color, json!("#000000")),
            "text-opacity" => (Paint, V::Number, json!(1)),
            "text-halo-color" => (Paint, V::Color, json!("rgba(0, 0, 0, 0)")),
            "text-halo-width" => (Paint, V::Number, json!(0)),
            "text-halo-blur" => (Paint, V::Number, json!(0)),

            _ => return None,
        };

        let spec = PropertySpec::new(kind, value_type);
        Some(if default.is_null() {
            spec
        } else {
            spec.with_default(default)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        let spec = BuiltinCatalog.property_spec("line-color").unwrap();
        assert_eq!(spec.kind, PropertyKind::Paint);
        assert_eq!(spec.value_type, ValueType::Color);
        assert_eq!(spec.default, Some(json!("#000000")));

        let spec = BuiltinCatalog.property_spec("text-font").unwrap();
        assert_eq!(spec.kind, PropertyKind::Layout);
        assert_eq!(spec.value_type, ValueType::Array);
    }

    #[test]
    fn test_no_default() {
        let spec = BuiltinCatalog.property_spec("line-dasharray").unwrap();
        assert!(spec.default.is_none());
    }

    #[test]
    fn test_unknown_property() {
        assert!(BuiltinCatalog.property_spec("raster-hue-rotate").is_none());
    }

    #[test]
    fn test_spec_from_json() {
        let spec: PropertySpec = serde_json::from_value(json!({
            "property-type": "paint",
            "type": "number",
            "default": 2
        }))
        .unwrap();
        assert_eq!(
            spec,
            PropertySpec::new(PropertyKind::Paint, ValueType::Number).with_default(json!(2))
        );
    }
}
