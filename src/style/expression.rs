//! Restricted fast-path expression evaluation
//!
//! Before an expression reaches the full engine, the parts that only depend
//! on the current zoom and the feature's properties are substituted in place:
//!
//! - `["zoom"]` becomes the zoom number
//! - `["get", key]` becomes the property value, or `""` when absent
//! - `["has", key]` becomes a boolean
//! - a comparator whose direct operand is an absent `get` becomes `false`
//! - every other array is walked element by element
//!
//! When the result is no longer an array the value is final. Otherwise the
//! partially evaluated array is handed to [`StyleExpressionEngine`].
//!
//! [`StyleExpressionEngine`]: super::engine::StyleExpressionEngine

use serde_json::{Map, Number, Value};

/// Operators that short-circuit to `false` on an undefined operand.
pub const COMPARATORS: &[&str] = &["==", "!", "!=", "<", "<=", ">", ">="];

/// Parsed form of a style value for fast-path evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Comparator { op: String, operands: Vec<Expr> },
    ZoomRef,
    PropertyGet(String),
    HasCheck(String),
    Literal(Value),
    /// Any other array; `coalesce` is one of these.
    Generic(Vec<Expr>),
}

impl Expr {
    pub fn parse(value: &Value) -> Expr {
        let Value::Array(items) = value else {
            return Expr::Literal(value.clone());
        };

        match items.as_slice() {
            [Value::String(op), operands @ ..] if COMPARATORS.contains(&op.as_str()) => {
                Expr::Comparator {
                    op: op.clone(),
                    operands: operands.iter().map(Expr::parse).collect(),
                }
            }
            [Value::String(op), ..] if op == "zoom" => Expr::ZoomRef,
            [Value::String(op), Value::String(key)] if op == "get" => {
                Expr::PropertyGet(key.clone())
            }
            [Value::String(op), Value::String(key)] if op == "has" => Expr::HasCheck(key.clone()),
            _ => Expr::Generic(items.iter().map(Expr::parse).collect()),
        }
    }

    /// Evaluate against feature properties at `zoom`.
    pub fn evaluate(&self, properties: &Map<String, Value>, zoom: f64) -> Value {
        match self {
            Expr::PropertyGet(key) => properties
                .get(key)
                .cloned()
                .unwrap_or_else(|| Value::String(String::new())),
            other => other
                .evaluate_operand(properties, zoom)
                .unwrap_or(Value::Null),
        }
    }

    /// Evaluate as an operand; `None` means undefined (an absent `get`).
    fn evaluate_operand(&self, properties: &Map<String, Value>, zoom: f64) -> Option<Value> {
        match self {
            Expr::Comparator { op, operands } => {
                let mut values = Vec::with_capacity(operands.len() + 1);
                values.push(Value::String(op.clone()));
                for operand in operands {
                    match operand.evaluate_operand(properties, zoom) {
                        Some(value) => values.push(value),
                        None => return Some(Value::Bool(false)),
                    }
                }
                Some(Value::Array(values))
            }
            Expr::ZoomRef => Some(Number::from_f64(zoom).map_or(Value::Null, Value::Number)),
            Expr::PropertyGet(key) => properties.get(key).cloned(),
            Expr::HasCheck(key) => Some(Value::Bool(
                properties.get(key).is_some_and(|value| !value.is_null()),
            )),
            Expr::Literal(value) => Some(value.clone()),
            Expr::Generic(items) => {
                // coalesce has to see absent properties as null to skip them
                let coalesce = matches!(
                    items.first(),
                    Some(Expr::Literal(Value::String(op))) if op == "coalesce"
                );
                Some(Value::Array(
                    items
                        .iter()
                        .map(|item| match item.evaluate_operand(properties, zoom) {
                            Some(value) => value,
                            None if coalesce => Value::Null,
                            None => Value::String(String::new()),
                        })
                        .collect(),
                ))
            }
        }
    }
}
