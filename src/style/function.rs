//! Legacy style functions
//!
//! Older styles write zoom- and data-driven values as objects rather than
//! expression arrays:
//!
//! ```json
//! {"base": 1.5, "stops": [[10, 1], [18, 6]]}
//! {"property": "class", "type": "categorical", "stops": [["park", "#0f0"]], "default": "#ccc"}
//! ```
//!
//! The resolver returns these unchanged like any literal; they are evaluated
//! when converted to an output attribute.

use serde_json::{Map, Value};

use super::color::ColorSpace;
use super::engine::{exponential_factor, interpolate_values, values_equal};

/// Whether `value` is a legacy function object.
pub fn is_legacy_function(value: &Value) -> bool {
    value.as_object().is_some_and(|object| {
        object.get("stops").is_some_and(Value::is_array) || is_identity(object)
    })
}

fn is_identity(object: &Map<String, Value>) -> bool {
    object.get("type").and_then(Value::as_str) == Some("identity")
}

/// Evaluate a legacy function at `zoom` for a feature's `properties`.
///
/// Returns the function's `default` (or `None`) when the input is missing or
/// no stop applies. Zoom-and-property functions, whose stop inputs are
/// objects, are not supported and also yield the default.
pub fn evaluate_legacy_function(
    function: &Value,
    properties: &Map<String, Value>,
    zoom: f64,
) -> Option<Value> {
    let object = function.as_object()?;
    let default = object.get("default").cloned();

    let input = match object.get("property").and_then(Value::as_str) {
        Some(property) => properties.get(property).cloned(),
        None => Some(Value::from(zoom)),
    };
    let Some(input) = input.filter(|value| !value.is_null()) else {
        return default;
    };

    if is_identity(object) {
        return Some(input);
    }

    let stops: Vec<(&Value, &Value)> = object
        .get("stops")?
        .as_array()?
        .iter()
        .filter_map(|stop| match stop.as_array()?.as_slice() {
            [stop_input, output] => Some((stop_input, output)),
            _ => None,
        })
        .collect();
    if stops.is_empty() || stops.iter().any(|(stop_input, _)| stop_input.is_object()) {
        return default;
    }

    let kind = object
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_else(|| default_kind(stops[0].1));

    let result = match kind {
        "categorical" => stops
            .iter()
            .find(|(stop_input, _)| values_equal(stop_input, &input))
            .map(|(_, output)| (*output).clone()),
        "interval" => input.as_f64().and_then(|input| interval(&stops, input)),
        "exponential" => {
            let base = object.get("base").and_then(Value::as_f64).unwrap_or(1.0);
            input
                .as_f64()
                .and_then(|input| exponential(&stops, input, base))
        }
        _ => None,
    };
    result.or(default)
}

/// Numbers, number arrays and colors interpolate; anything else steps.
fn default_kind(output: &Value) -> &'static str {
    match output {
        Value::Number(_) | Value::Array(_) => "exponential",
        Value::String(s) if super::color::parse_rgba(s).is_some() => "exponential",
        _ => "interval",
    }
}

fn interval(stops: &[(&Value, &Value)], input: f64) -> Option<Value> {
    let mut chosen = stops[0].1;
    for (stop_input, output) in stops {
        if stop_input.as_f64()? <= input {
            chosen = *output;
        } else {
            break;
        }
    }
    Some(chosen.clone())
}

fn exponential(stops: &[(&Value, &Value)], input: f64, base: f64) -> Option<Value> {
    let first = stops[0];
    if input <= first.0.as_f64()? {
        return Some(first.1.clone());
    }
    for pair in stops.windows(2) {
        let (lower, lower_out) = pair[0];
        let (upper, upper_out) = pair[1];
        let (lower, upper) = (lower.as_f64()?, upper.as_f64()?);
        if input < upper {
            let t = exponential_factor(base, input, lower, upper);
            return interpolate_values(lower_out, upper_out, t, ColorSpace::Rgb)
                .or_else(|| Some(lower_out.clone()));
        }
    }
    stops.last().map(|(_, output)| (*output).clone())
}
