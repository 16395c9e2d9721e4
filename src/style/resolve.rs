//! Per-feature style property resolution
//!
//! Resolution order for one `(layer, property, feature, zoom)`:
//!
//! 1. absent property: [`Resolved::Missing`]
//! 2. literal value: returned unchanged
//! 3. fast path ([`Expr`]): `zoom`, `get`, `has` and comparators substituted;
//!    a result that is no longer an expression is final
//! 4. full engine compile against the catalog value type; on failure a
//!    `coalesce` yields its first usable operand, anything else the catalog
//!    default
//! 5. full engine evaluation; on failure the catalog default
//!
//! Steps 4 and 5 never hand back an unevaluated expression array.

use serde_json::Value;

use super::catalog::{BuiltinCatalog, StyleCatalog};
use super::engine::{is_expression, EvalContext, StyleExpressionEngine};
use super::expression::Expr;
use super::{PropertyKind, StyleLayer};
use crate::geometry::Feature;

/// Outcome of resolving one property.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    /// The layer does not set the property.
    Missing,
    Value(Value),
    /// The expression could not be evaluated; `value` is the substitute.
    Fallback { value: Option<Value>, reason: String },
}

impl Resolved {
    pub fn value(&self) -> Option<&Value> {
        match self {
            Resolved::Missing => None,
            Resolved::Value(value) => Some(value),
            Resolved::Fallback { value, .. } => value.as_ref(),
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            Resolved::Missing => None,
            Resolved::Value(value) => Some(value),
            Resolved::Fallback { value, .. } => value,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Resolved::Fallback { .. })
    }
}

/// Resolves style properties against features.
#[derive(Clone, Copy)]
pub struct PropertyResolver<'a> {
    catalog: &'a dyn StyleCatalog,
    engine: StyleExpressionEngine,
}

impl Default for PropertyResolver<'static> {
    fn default() -> Self {
        Self::new(&BuiltinCatalog)
    }
}

impl<'a> PropertyResolver<'a> {
    pub fn new(catalog: &'a dyn StyleCatalog) -> Self {
        Self {
            catalog,
            engine: StyleExpressionEngine::new(),
        }
    }

    pub fn resolve(
        &self,
        layer: &StyleLayer,
        kind: PropertyKind,
        property_id: &str,
        feature: &Feature,
        zoom: f64,
    ) -> Resolved {
        let Some(raw) = layer.property(kind, property_id) else {
            return Resolved::Missing;
        };
        if !is_expression(raw) {
            return Resolved::Value(raw.clone());
        }

        let simplified = Expr::parse(raw).evaluate(&feature.properties, zoom);
        if !is_expression(&simplified) {
            return Resolved::Value(simplified);
        }

        let spec = self.catalog.property_spec(property_id);
        let default = spec.as_ref().and_then(|spec| spec.default.clone());
        let Some(spec) = spec else {
            return coalesce_fallback(&simplified, default).unwrap_or_else(|| Resolved::Fallback {
                value: None,
                reason: format!("no catalog entry for '{}'", property_id),
            });
        };

        let compiled = match self.engine.compile(&simplified, spec.value_type) {
            Ok(compiled) => compiled,
            Err(e) => {
                return coalesce_fallback(&simplified, default.clone()).unwrap_or(
                    Resolved::Fallback {
                        value: default,
                        reason: e.to_string(),
                    },
                )
            }
        };

        match compiled.evaluate(&EvalContext::for_feature(feature, zoom)) {
            Some(value) => Resolved::Value(value),
            None => Resolved::Fallback {
                value: default,
                reason: format!(
                    "'{}' did not evaluate to a {:?} value",
                    property_id, spec.value_type
                ),
            },
        }
    }
}

/// First usable operand of an uncompilable `coalesce`.
fn coalesce_fallback(expression: &Value, default: Option<Value>) -> Option<Resolved> {
    let items = expression.as_array()?;
    if items.first().and_then(Value::as_str) != Some("coalesce") {
        return None;
    }
    let operand = items[1..]
        .iter()
        .find(|item| !item.is_null() && !item.is_array())
        .cloned();
    Some(Resolved::Fallback {
        value: operand.or(default),
        reason: "coalesce could not be compiled".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Geometry;
    use serde_json::json;

    fn feature(properties: Value) -> Feature {
        let mut feature = Feature::new(Geometry::LineString {
            coordinates: vec![vec![0.0, 0.0], vec![1.0, 1.0]],
        });
        feature.properties = properties.as_object().cloned().unwrap_or_default();
        feature
    }

    fn line(property: &str, value: Value) -> StyleLayer {
        StyleLayer::new("roads", "line").with_paint(property, value)
    }

    #[test]
    fn test_missing_property() {
        let resolver = PropertyResolver::default();
        let layer = StyleLayer::new("roads", "line");
        assert_eq!(
            resolver.resolve(&layer, PropertyKind::Paint, "line-color", &feature(json!({})), 10.0),
            Resolved::Missing
        );
    }

    #[test]
    fn test_literals_unchanged() {
        let resolver = PropertyResolver::default();
        let literals = [
            json!("#ff0000"),
            json!(2.5),
            json!(0),
            json!(["Open Sans Regular", "Arial Unicode MS Regular"]),
            json!({"base": 1.4, "stops": [[5, 1], [15, 8]]}),
        ];
        for literal in literals {
            for zoom in [0.0, 7.3, 22.0] {
                let layer = line("line-width", literal.clone());
                let resolved = resolver.resolve(
                    &layer,
                    PropertyKind::Paint,
                    "line-width",
                    &feature(json!({"class": "x"})),
                    zoom,
                );
                assert_eq!(resolved, Resolved::Value(literal.clone()));
            }
        }
    }

    #[test]
    fn test_comparator_with_undefined_get_is_false() {
        let resolver = PropertyResolver::default();
        let layer = StyleLayer::new("labels", "symbol")
            .with_layout("text-allow-overlap", json!(["==", ["get", "class"], "city"]));
        assert_eq!(
            resolver.resolve(
                &layer,
                PropertyKind::Layout,
                "text-allow-overlap",
                &feature(json!({})),
                10.0
            ),
            Resolved::Value(json!(false))
        );
    }

    #[test]
    fn test_get_resolves_on_fast_path() {
        let resolver = PropertyResolver::default();
        let layer = line("line-color", json!(["get", "mycolor"]));
        let resolved = resolver.resolve(
            &layer,
            PropertyKind::Paint,
            "line-color",
            &feature(json!({"mycolor": "blue"})),
            10.0,
        );
        assert_eq!(resolved, Resolved::Value(json!("blue")));
    }

    #[test]
    fn test_full_engine_path() {
        let resolver = PropertyResolver::default();
        let layer = line(
            "line-width",
            json!(["interpolate", ["linear"], ["zoom"], 10, ["get", "w"], 20, 10]),
        );
        let resolved = resolver
            .resolve(&layer, PropertyKind::Paint, "line-width", &feature(json!({"w": 2})), 15.0)
            .into_value()
            .and_then(|v| v.as_f64());
        assert_eq!(resolved, Some(6.0));
    }

    #[test]
    fn test_uncompilable_coalesce_takes_first_operand() {
        let resolver = PropertyResolver::default();
        let layer = StyleLayer::new("labels", "symbol").with_layout(
            "text-field",
            json!(["coalesce", ["get", "name_en"], ["get", "name"], ["line-progress"]]),
        );
        let resolved = resolver.resolve(
            &layer,
            PropertyKind::Layout,
            "text-field",
            &feature(json!({"name": "Bern"})),
            10.0,
        );
        assert!(resolved.is_fallback());
        assert_eq!(resolved.into_value(), Some(json!("Bern")));
    }

    #[test]
    fn test_uncompilable_expression_uses_default() {
        let resolver = PropertyResolver::default();
        let layer = line("line-width", json!(["*", ["line-progress"], 2]));
        let resolved =
            resolver.resolve(&layer, PropertyKind::Paint, "line-width", &feature(json!({})), 10.0);
        assert!(resolved.is_fallback());
        assert_eq!(resolved.into_value(), Some(json!(1)));
    }

    #[test]
    fn test_evaluation_failure_uses_default() {
        let resolver = PropertyResolver::default();
        let layer = line("line-dasharray", json!(["at", 5, ["literal", [1, 2]]]));
        let resolved = resolver.resolve(
            &layer,
            PropertyKind::Paint,
            "line-dasharray",
            &feature(json!({})),
            10.0,
        );
        assert_eq!(
            resolved.value(),
            None,
            "line-dasharray has no default so the attribute is dropped"
        );
        assert!(resolved.is_fallback());
    }
}
