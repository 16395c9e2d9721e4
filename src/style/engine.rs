//! Style expression engine
//!
//! Expressions are compiled once into a [`CompiledExpression`] tree, which
//! validates operator names and argument counts, and then evaluated per
//! feature. Compilation fails on unknown operators and malformed special
//! forms; evaluation returns `None` when an operand has the wrong type or the
//! result cannot be coerced to the property's declared value type.
//!
//! Supported operators:
//! - lookup: `get`, `has`, `at`, `length`, `literal`, `id`, `geometry-type`,
//!   `zoom`
//! - control: `interpolate` (+ `-hcl`, `-lab`), `step`, `match`, `case`,
//!   `coalesce`
//! - decision: `==`, `!=`, `<`, `<=`, `>`, `>=`, `all`, `any`, `!`
//! - math: `+`, `-`, `*`, `/`, `%`, `^`, `abs`, `ceil`, `floor`, `round`,
//!   `min`, `max`, `sqrt`, `ln`, `log10`, `log2`, `sin`, `cos`, `tan`
//! - strings: `concat`, `upcase`, `downcase`, `format`
//! - types: `to-number`, `to-string`, `to-boolean`, `to-color`, `typeof`
//! - color: `rgb`, `rgba`

use std::cmp::Ordering;

use serde_json::{Map, Number, Value};

use super::catalog::ValueType;
use super::color::{self, ColorSpace};
use crate::geometry::{Feature, FeatureId};
use crate::{MapSvgError, Result};

/// Inputs an expression may read.
#[derive(Debug, Clone)]
pub struct EvalContext<'a> {
    pub properties: &'a Map<String, Value>,
    pub zoom: f64,
    pub geometry_type: Option<&'a str>,
    pub feature_id: Option<&'a FeatureId>,
}

impl<'a> EvalContext<'a> {
    pub fn new(properties: &'a Map<String, Value>, zoom: f64) -> Self {
        Self {
            properties,
            zoom,
            geometry_type: None,
            feature_id: None,
        }
    }

    pub fn for_feature(feature: &'a Feature, zoom: f64) -> Self {
        Self {
            properties: &feature.properties,
            zoom,
            geometry_type: feature.geometry_type(),
            feature_id: feature.id.as_ref(),
        }
    }

    pub fn with_geometry_type(mut self, geometry_type: &'a str) -> Self {
        self.geometry_type = Some(geometry_type);
        self
    }
}

/// Interpolation curve.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Curve {
    Linear,
    Exponential(f64),
    CubicBezier([f64; 4]),
}

impl Curve {
    /// Interpolation factor of `input` between `lower` and `upper`.
    fn factor(&self, input: f64, lower: f64, upper: f64) -> f64 {
        let range = upper - lower;
        if range == 0.0 {
            return 0.0;
        }
        match *self {
            Curve::Linear => (input - lower) / range,
            Curve::Exponential(base) => exponential_factor(base, input, lower, upper),
            Curve::CubicBezier(points) => solve_bezier(points, (input - lower) / range),
        }
    }
}

/// Exponential interpolation factor; base 1 is linear.
pub(crate) fn exponential_factor(base: f64, input: f64, lower: f64, upper: f64) -> f64 {
    let range = upper - lower;
    let progress = input - lower;
    if range == 0.0 {
        0.0
    } else if base == 1.0 {
        progress / range
    } else {
        (base.powf(progress) - 1.0) / (base.powf(range) - 1.0)
    }
}

/// Y of a unit cubic bezier at the parameter where X equals `x`.
fn solve_bezier([x1, y1, x2, y2]: [f64; 4], x: f64) -> f64 {
    let bezier = |t: f64, p1: f64, p2: f64| {
        let u = 1.0 - t;
        3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t
    };
    let slope = |t: f64, p1: f64, p2: f64| {
        let u = 1.0 - t;
        3.0 * u * u * p1 + 6.0 * u * t * (p2 - p1) + 3.0 * t * t * (1.0 - p2)
    };

    let mut t = x;
    for _ in 0..8 {
        let error = bezier(t, x1, x2) - x;
        if error.abs() < 1e-7 {
            break;
        }
        let d = slope(t, x1, x2);
        if d.abs() < 1e-7 {
            break;
        }
        t = (t - error / d).clamp(0.0, 1.0);
    }
    bezier(t, y1, y2)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Get,
    Has,
    At,
    Length,
    Id,
    GeometryType,
    Zoom,
    Coalesce,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    All,
    Any,
    Not,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
    Abs,
    Ceil,
    Floor,
    Round,
    Min,
    Max,
    Sqrt,
    Ln,
    Log10,
    Log2,
    Sin,
    Cos,
    Tan,
    Concat,
    Upcase,
    Downcase,
    Format,
    ToNumber,
    ToString,
    ToBoolean,
    ToColor,
    Typeof,
    Rgb,
    Rgba,
}

impl Op {
    fn from_name(name: &str) -> Option<Op> {
        Some(match name {
            "get" => Op::Get,
            "has" => Op::Has,
            "at" => Op::At,
            "length" => Op::Length,
            "id" => Op::Id,
            "geometry-type" => Op::GeometryType,
            "zoom" => Op::Zoom,
            "coalesce" => Op::Coalesce,
            "==" => Op::Eq,
            "!=" => Op::Ne,
            "<" => Op::Lt,
            "<=" => Op::Le,
            ">" => Op::Gt,
            ">=" => Op::Ge,
            "all" => Op::All,
            "any" => Op::Any,
            "!" => Op::Not,
            "+" => Op::Add,
            "-" => Op::Sub,
            "*" => Op::Mul,
            "/" => Op::Div,
            "%" => Op::Rem,
            "^" => Op::Pow,
            "abs" => Op::Abs,
            "ceil" => Op::Ceil,
            "floor" => Op::Floor,
            "round" => Op::Round,
            "min" => Op::Min,
            "max" => Op::Max,
            "sqrt" => Op::Sqrt,
            "ln" => Op::Ln,
            "log10" => Op::Log10,
            "log2" => Op::Log2,
            "sin" => Op::Sin,
            "cos" => Op::Cos,
            "tan" => Op::Tan,
            "concat" => Op::Concat,
            "upcase" => Op::Upcase,
            "downcase" => Op::Downcase,
            "format" => Op::Format,
            "to-number" => Op::ToNumber,
            "to-string" => Op::ToString,
            "to-boolean" => Op::ToBoolean,
            "to-color" => Op::ToColor,
            "typeof" => Op::Typeof,
            "rgb" => Op::Rgb,
            "rgba" => Op::Rgba,
            _ => return None,
        })
    }

    /// Accepted argument count, `(min, max)`.
    fn arity(&self) -> (usize, Option<usize>) {
        match self {
            Op::Id | Op::GeometryType | Op::Zoom => (0, Some(0)),
            Op::Get | Op::Has => (1, Some(2)),
            Op::At => (2, Some(2)),
            Op::Eq | Op::Ne | Op::Lt | Op::Le | Op::Gt | Op::Ge => (2, Some(3)),
            Op::Sub => (1, Some(2)),
            Op::Div | Op::Rem | Op::Pow => (2, Some(2)),
            Op::Length
            | Op::Not
            | Op::Abs
            | Op::Ceil
            | Op::Floor
            | Op::Round
            | Op::Sqrt
            | Op::Ln
            | Op::Log10
            | Op::Log2
            | Op::Sin
            | Op::Cos
            | Op::Tan
            | Op::Upcase
            | Op::Downcase
            | Op::Typeof => (1, Some(1)),
            Op::Rgb => (3, Some(3)),
            Op::Rgba => (4, Some(4)),
            Op::Add | Op::Mul | Op::Min | Op::Max => (2, None),
            Op::Coalesce | Op::Concat | Op::Format | Op::All | Op::Any => (1, None),
            Op::ToNumber | Op::ToString | Op::ToBoolean | Op::ToColor => (1, None),
        }
    }
}

/// Names of the special forms compiled outside the [`Op`] table.
const SPECIAL_FORMS: &[&str] = &[
    "literal",
    "interpolate",
    "interpolate-hcl",
    "interpolate-lab",
    "step",
    "match",
    "case",
];

/// Whether `value` is an expression: an array led by a known operator name.
pub fn is_expression(value: &Value) -> bool {
    match value.as_array().and_then(|items| items.first()) {
        Some(Value::String(op)) => {
            Op::from_name(op).is_some() || SPECIAL_FORMS.contains(&op.as_str())
        }
        _ => false,
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Literal(Value),
    Call(Op, Vec<Node>),
    Interpolate {
        curve: Curve,
        space: ColorSpace,
        input: Box<Node>,
        stops: Vec<(f64, Node)>,
    },
    Step {
        input: Box<Node>,
        base: Box<Node>,
        stops: Vec<(f64, Node)>,
    },
    Match {
        input: Box<Node>,
        arms: Vec<(Vec<Value>, Node)>,
        fallback: Box<Node>,
    },
    Case {
        branches: Vec<(Node, Node)>,
        fallback: Box<Node>,
    },
}

/// Compiles style expressions.
#[derive(Debug, Clone, Copy, Default)]
pub struct StyleExpressionEngine;

impl StyleExpressionEngine {
    pub fn new() -> Self {
        Self
    }

    /// Compile `expression` for a property declared as `value_type`.
    pub fn compile(&self, expression: &Value, value_type: ValueType) -> Result<CompiledExpression> {
        Ok(CompiledExpression {
            root: compile_node(expression)?,
            value_type,
        })
    }
}

/// A compiled expression bound to its result type.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledExpression {
    root: Node,
    value_type: ValueType,
}

impl CompiledExpression {
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Evaluate and coerce to the declared type. `None` on failure.
    pub fn evaluate(&self, ctx: &EvalContext) -> Option<Value> {
        coerce(evaluate(&self.root, ctx)?, self.value_type)
    }
}

fn compile_error(message: String) -> MapSvgError {
    MapSvgError::StyleError(message)
}

fn compile_node(value: &Value) -> Result<Node> {
    let Value::Array(items) = value else {
        return Ok(Node::Literal(value.clone()));
    };

    let Some(Value::String(name)) = items.first() else {
        return Err(compile_error(format!(
            "Expected an operator name at the start of {}",
            value
        )));
    };
    let args = &items[1..];

    match name.as_str() {
        "literal" => match args {
            [literal] => Ok(Node::Literal(literal.clone())),
            _ => Err(compile_error("'literal' takes exactly one argument".into())),
        },
        "interpolate" => compile_interpolate(args, ColorSpace::Rgb),
        "interpolate-lab" => compile_interpolate(args, ColorSpace::Lab),
        "interpolate-hcl" => compile_interpolate(args, ColorSpace::Hcl),
        "step" => compile_step(args),
        "match" => compile_match(args),
        "case" => compile_case(args),
        other => {
            let op = Op::from_name(other)
                .ok_or_else(|| compile_error(format!("Unknown expression operator '{}'", other)))?;
            let (min, max) = op.arity();
            if args.len() < min || max.is_some_and(|max| args.len() > max) {
                return Err(compile_error(format!(
                    "'{}' got {} argument(s)",
                    other,
                    args.len()
                )));
            }
            let args = args.iter().map(compile_node).collect::<Result<Vec<_>>>()?;
            Ok(Node::Call(op, args))
        }
    }
}

fn compile_stops(pairs: &[Value], form: &str) -> Result<Vec<(f64, Node)>> {
    if pairs.is_empty() || pairs.len() % 2 != 0 {
        return Err(compile_error(format!(
            "'{}' expects input/output stop pairs",
            form
        )));
    }
    let mut stops: Vec<(f64, Node)> = Vec::with_capacity(pairs.len() / 2);
    for pair in pairs.chunks(2) {
        let input = pair[0].as_f64().ok_or_else(|| {
            compile_error(format!("'{}' stop inputs must be numbers, got {}", form, pair[0]))
        })?;
        if stops.last().is_some_and(|(previous, _)| *previous >= input) {
            return Err(compile_error(format!(
                "'{}' stop inputs must be strictly ascending",
                form
            )));
        }
        stops.push((input, compile_node(&pair[1])?));
    }
    Ok(stops)
}

fn compile_interpolate(args: &[Value], space: ColorSpace) -> Result<Node> {
    let [curve, input, stops @ ..] = args else {
        return Err(compile_error("'interpolate' is missing its curve or input".into()));
    };

    let curve = match curve.as_array().map(Vec::as_slice) {
        Some([Value::String(kind)]) if kind == "linear" => Curve::Linear,
        Some([Value::String(kind), base]) if kind == "exponential" => Curve::Exponential(
            base.as_f64()
                .ok_or_else(|| compile_error("exponential base must be a number".into()))?,
        ),
        Some([Value::String(kind), x1, y1, x2, y2]) if kind == "cubic-bezier" => {
            let points = [x1, y1, x2, y2]
                .iter()
                .map(|v| v.as_f64())
                .collect::<Option<Vec<f64>>>()
                .ok_or_else(|| compile_error("cubic-bezier control points must be numbers".into()))?;
            Curve::CubicBezier([points[0], points[1], points[2], points[3]])
        }
        _ => return Err(compile_error(format!("Unknown interpolation type {}", curve))),
    };

    Ok(Node::Interpolate {
        curve,
        space,
        input: Box::new(compile_node(input)?),
        stops: compile_stops(stops, "interpolate")?,
    })
}

fn compile_step(args: &[Value]) -> Result<Node> {
    let [input, base, stops @ ..] = args else {
        return Err(compile_error("'step' is missing its input or base output".into()));
    };
    let stops = if stops.is_empty() {
        Vec::new()
    } else {
        compile_stops(stops, "step")?
    };
    Ok(Node::Step {
        input: Box::new(compile_node(input)?),
        base: Box::new(compile_node(base)?),
        stops,
    })
}

fn compile_match(args: &[Value]) -> Result<Node> {
    if args.len() < 4 || args.len() % 2 != 0 {
        return Err(compile_error(
            "'match' expects an input, label/output pairs and a fallback".into(),
        ));
    }
    let input = compile_node(&args[0])?;
    let fallback = compile_node(&args[args.len() - 1])?;

    let mut arms = Vec::new();
    for pair in args[1..args.len() - 1].chunks(2) {
        let labels = match &pair[0] {
            Value::Array(labels) => labels.clone(),
            label @ (Value::String(_) | Value::Number(_)) => vec![label.clone()],
            other => {
                return Err(compile_error(format!(
                    "'match' labels must be strings or numbers, got {}",
                    other
                )))
            }
        };
        arms.push((labels, compile_node(&pair[1])?));
    }

    Ok(Node::Match {
        input: Box::new(input),
        arms,
        fallback: Box::new(fallback),
    })
}

fn compile_case(args: &[Value]) -> Result<Node> {
    if args.len() < 3 || args.len() % 2 != 1 {
        return Err(compile_error(
            "'case' expects condition/output pairs and a fallback".into(),
        ));
    }
    let branches = args[..args.len() - 1]
        .chunks(2)
        .map(|pair| Ok((compile_node(&pair[0])?, compile_node(&pair[1])?)))
        .collect::<Result<Vec<_>>>()?;
    Ok(Node::Case {
        branches,
        fallback: Box::new(compile_node(&args[args.len() - 1])?),
    })
}

fn number(value: f64) -> Option<Value> {
    Number::from_f64(value).map(Value::Number)
}

fn evaluate(node: &Node, ctx: &EvalContext) -> Option<Value> {
    match node {
        Node::Literal(value) => Some(value.clone()),
        Node::Call(op, args) => evaluate_call(*op, args, ctx),
        Node::Interpolate {
            curve,
            space,
            input,
            stops,
        } => {
            let input = evaluate(input, ctx)?.as_f64()?;
            let upper_index = stops.iter().position(|(stop, _)| *stop > input);
            match upper_index {
                Some(0) => evaluate(&stops[0].1, ctx),
                None => evaluate(&stops[stops.len() - 1].1, ctx),
                Some(i) => {
                    let (lower, lower_out) = &stops[i - 1];
                    let (upper, upper_out) = &stops[i];
                    let t = curve.factor(input, *lower, *upper);
                    interpolate_values(
                        &evaluate(lower_out, ctx)?,
                        &evaluate(upper_out, ctx)?,
                        t,
                        *space,
                    )
                }
            }
        }
        Node::Step { input, base, stops } => {
            let input = evaluate(input, ctx)?.as_f64()?;
            let chosen = stops
                .iter()
                .take_while(|(stop, _)| input >= *stop)
                .last()
                .map_or(base.as_ref(), |(_, output)| output);
            evaluate(chosen, ctx)
        }
        Node::Match {
            input,
            arms,
            fallback,
        } => {
            let input = evaluate(input, ctx)?;
            let arm = arms
                .iter()
                .find(|(labels, _)| labels.iter().any(|label| values_equal(&input, label)));
            match arm {
                Some((_, output)) => evaluate(output, ctx),
                None => evaluate(fallback, ctx),
            }
        }
        Node::Case { branches, fallback } => {
            for (condition, output) in branches {
                if evaluate(condition, ctx)?.as_bool()? {
                    return evaluate(output, ctx);
                }
            }
            evaluate(fallback, ctx)
        }
    }
}

fn evaluate_call(op: Op, args: &[Node], ctx: &EvalContext) -> Option<Value> {
    let eval = |i: usize| evaluate(&args[i], ctx);
    let eval_f64 = |i: usize| evaluate(&args[i], ctx).and_then(|v| v.as_f64());
    let unary = |f: fn(f64) -> f64| number(f(eval_f64(0)?));

    match op {
        Op::Get => {
            let key = eval(0)?;
            let key = key.as_str()?;
            let found = match args.get(1) {
                Some(node) => evaluate(node, ctx)?.get(key).cloned(),
                None => ctx.properties.get(key).cloned(),
            };
            Some(found.unwrap_or(Value::Null))
        }
        Op::Has => {
            let key = eval(0)?;
            let present = match args.get(1) {
                Some(node) => match evaluate(node, ctx)? {
                    Value::Object(map) => map.contains_key(key.as_str()?),
                    _ => return None,
                },
                None => ctx.properties.contains_key(key.as_str()?),
            };
            Some(Value::Bool(present))
        }
        Op::At => {
            let index = eval_f64(0)?;
            let array = eval(1)?;
            let array = array.as_array()?;
            if index < 0.0 || index.fract() != 0.0 {
                return None;
            }
            array.get(index as usize).cloned()
        }
        Op::Length => match eval(0)? {
            Value::String(s) => number(s.chars().count() as f64),
            Value::Array(a) => number(a.len() as f64),
            _ => None,
        },
        Op::Id => Some(match ctx.feature_id {
            Some(FeatureId::Number(n)) => Value::Number(n.clone()),
            Some(FeatureId::String(s)) => Value::String(s.clone()),
            None => Value::Null,
        }),
        Op::GeometryType => Some(
            ctx.geometry_type
                .map_or(Value::Null, |t| Value::String(t.to_string())),
        ),
        Op::Zoom => number(ctx.zoom),
        Op::Coalesce => args
            .iter()
            .filter_map(|arg| evaluate(arg, ctx))
            .find(|value| !value.is_null())
            .or(Some(Value::Null)),

        Op::Eq => Some(Value::Bool(values_equal(&eval(0)?, &eval(1)?))),
        Op::Ne => Some(Value::Bool(!values_equal(&eval(0)?, &eval(1)?))),
        Op::Lt | Op::Le | Op::Gt | Op::Ge => {
            let ordering = compare_values(&eval(0)?, &eval(1)?)?;
            Some(Value::Bool(match op {
                Op::Lt => ordering == Ordering::Less,
                Op::Le => ordering != Ordering::Greater,
                Op::Gt => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            }))
        }
        Op::All => {
            for i in 0..args.len() {
                if !eval(i)?.as_bool()? {
                    return Some(Value::Bool(false));
                }
            }
            Some(Value::Bool(true))
        }
        Op::Any => {
            for i in 0..args.len() {
                if eval(i)?.as_bool()? {
                    return Some(Value::Bool(true));
                }
            }
            Some(Value::Bool(false))
        }
        Op::Not => Some(Value::Bool(!eval(0)?.as_bool()?)),

        Op::Add => number(fold_numbers(args, ctx, 0.0, |a, b| a + b)?),
        Op::Mul => number(fold_numbers(args, ctx, 1.0, |a, b| a * b)?),
        Op::Min => number(fold_numbers(args, ctx, f64::INFINITY, f64::min)?),
        Op::Max => number(fold_numbers(args, ctx, f64::NEG_INFINITY, f64::max)?),
        Op::Sub if args.len() == 1 => number(-eval_f64(0)?),
        Op::Sub => number(eval_f64(0)? - eval_f64(1)?),
        Op::Div => number(eval_f64(0)? / eval_f64(1)?),
        Op::Rem => number(eval_f64(0)? % eval_f64(1)?),
        Op::Pow => number(eval_f64(0)?.powf(eval_f64(1)?)),
        Op::Abs => unary(f64::abs),
        Op::Ceil => unary(f64::ceil),
        Op::Floor => unary(f64::floor),
        Op::Round => unary(f64::round),
        Op::Sqrt => unary(f64::sqrt),
        Op::Ln => unary(f64::ln),
        Op::Log10 => unary(f64::log10),
        Op::Log2 => unary(f64::log2),
        Op::Sin => unary(f64::sin),
        Op::Cos => unary(f64::cos),
        Op::Tan => unary(f64::tan),

        Op::Concat => {
            let mut text = String::new();
            for i in 0..args.len() {
                text.push_str(&value_to_string(&eval(i)?));
            }
            Some(Value::String(text))
        }
        Op::Upcase => Some(Value::String(eval(0)?.as_str()?.to_uppercase())),
        Op::Downcase => Some(Value::String(eval(0)?.as_str()?.to_lowercase())),
        Op::Format => {
            // section options are objects and carry no text
            let mut text = String::new();
            for i in 0..args.len() {
                match eval(i)? {
                    Value::Object(_) => {}
                    value => text.push_str(&value_to_string(&value)),
                }
            }
            Some(Value::String(text))
        }

        Op::ToNumber => (0..args.len()).find_map(|i| match eval(i)? {
            Value::Null => number(0.0),
            Value::Bool(b) => number(if b { 1.0 } else { 0.0 }),
            Value::Number(n) => Some(Value::Number(n)),
            Value::String(s) => s.trim().parse::<f64>().ok().and_then(number),
            _ => None,
        }),
        Op::ToString => Some(Value::String(value_to_string(&eval(0)?))),
        Op::ToBoolean => Some(Value::Bool(truthy(&eval(0)?))),
        Op::ToColor => (0..args.len()).find_map(|i| {
            let value = eval(i)?;
            let rgba = match &value {
                Value::String(s) => color::parse_rgba(s)?,
                Value::Array(c) if c.len() == 3 || c.len() == 4 => {
                    let channel = |j: usize| c.get(j).and_then(Value::as_f64);
                    [
                        channel(0)? / 255.0,
                        channel(1)? / 255.0,
                        channel(2)? / 255.0,
                        channel(3).unwrap_or(1.0),
                    ]
                }
                _ => return None,
            };
            Some(Value::String(color::to_css_rgba(rgba)))
        }),
        Op::Typeof => Some(Value::String(
            match eval(0)? {
                Value::Null => "null",
                Value::Bool(_) => "boolean",
                Value::Number(_) => "number",
                Value::String(_) => "string",
                Value::Array(_) => "array",
                Value::Object(_) => "object",
            }
            .to_string(),
        )),
        Op::Rgb | Op::Rgba => {
            let alpha = if op == Op::Rgba { eval_f64(3)? } else { 1.0 };
            Some(Value::String(color::to_css_rgba([
                eval_f64(0)? / 255.0,
                eval_f64(1)? / 255.0,
                eval_f64(2)? / 255.0,
                alpha,
            ])))
        }
    }
}

fn fold_numbers(args: &[Node], ctx: &EvalContext, init: f64, f: fn(f64, f64) -> f64) -> Option<f64> {
    args.iter()
        .try_fold(init, |acc, arg| Some(f(acc, evaluate(arg, ctx)?.as_f64()?)))
}

pub(crate) fn interpolate_values(a: &Value, b: &Value, t: f64, space: ColorSpace) -> Option<Value> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64()?, y.as_f64()?);
            number(x + (y - x) * t)
        }
        (Value::Array(xs), Value::Array(ys)) if xs.len() == ys.len() => xs
            .iter()
            .zip(ys)
            .map(|(x, y)| interpolate_values(x, y, t, space))
            .collect::<Option<Vec<_>>>()
            .map(Value::Array),
        (Value::String(x), Value::String(y)) => {
            let from = color::parse_rgba(x)?;
            let to = color::parse_rgba(y)?;
            Some(Value::String(color::to_css_rgba(color::mix(
                from, to, t, space,
            ))))
        }
        _ => None,
    }
}

pub(crate) fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0 && !v.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Text form used by `concat`, `format` and `to-string`.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

/// Coerce an evaluation result to the declared property type.
fn coerce(value: Value, value_type: ValueType) -> Option<Value> {
    match (value_type, value) {
        (_, Value::Null) => None,
        (ValueType::Number, value @ Value::Number(_)) => Some(value),
        (ValueType::Boolean, value @ Value::Bool(_)) => Some(value),
        (ValueType::String | ValueType::Enum, value @ Value::String(_)) => Some(value),
        (ValueType::Array, value @ Value::Array(_)) => Some(value),
        (ValueType::Formatted, value @ (Value::String(_) | Value::Number(_) | Value::Bool(_))) => {
            Some(Value::String(value_to_string(&value)))
        }
        (ValueType::Color, Value::String(s)) => color::parse_rgba(&s).map(|_| Value::String(s)),
        (ValueType::Color, Value::Array(c)) if c.len() == 3 || c.len() == 4 => {
            let channels = c.iter().map(Value::as_f64).collect::<Option<Vec<f64>>>()?;
            Some(Value::String(color::to_css_rgba([
                channels[0],
                channels[1],
                channels[2],
                channels.get(3).copied().unwrap_or(1.0),
            ])))
        }
        _ => None,
    }
}
