use std::fmt;

use crate::types::geometry::{Color, Geometry, Path, PathPoint, Texture, Vector};

// ─── Types ───────────────────────────────────────────────────────────────────

/// Shapes an argument list can be coerced into. `ColorOrTexture`, `Pair`
/// and `Paths` only steer coercion; no value reports them as its type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Color,
    Texture,
    ColorOrTexture,
    Font,
    Number,
    Vector,
    Size,
    String,
    Path,
    Paths,
    Mesh,
    Tuple,
    Point,
    Pair,
    Range,
    Void,
}

impl ValueType {
    pub fn description(self) -> &'static str {
        match self {
            ValueType::Color          => "color",
            ValueType::Texture        => "texture",
            ValueType::ColorOrTexture => "color or texture",
            ValueType::Font           => "font",
            ValueType::Number         => "number",
            ValueType::Vector         => "vector",
            ValueType::Size           => "size",
            ValueType::String         => "string",
            ValueType::Path           => "path",
            ValueType::Paths          => "path",
            ValueType::Mesh           => "mesh",
            ValueType::Tuple          => "tuple",
            ValueType::Point          => "point",
            ValueType::Pair           => "pair",
            ValueType::Range          => "range",
            ValueType::Void           => "void",
        }
    }
}

/// "first" for 0, "second" for 1, and so on.
pub fn ordinal(index: usize) -> String {
    if let Some(name) = ORDINALS.get(index) {
        return (*name).to_string();
    }
    let n = index + 1;
    let suffix = match (n % 10, n % 100) {
        (1, r) if r != 11 => "st",
        (2, r) if r != 12 => "nd",
        (3, r) if r != 13 => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

const ORDINALS: [&str; 10] = [
    "first", "second", "third", "fourth", "fifth",
    "sixth", "seventh", "eighth", "ninth", "tenth",
];

// ─── Ranges ──────────────────────────────────────────────────────────────────

/// Inclusive numeric range. The step is never zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeValue {
    pub start: f64,
    pub end: f64,
    pub step: f64,
}

impl RangeValue {
    pub fn new(start: f64, end: f64, step: f64) -> Option<Self> {
        (step != 0.0).then_some(Self { start, end, step })
    }

    pub fn iter(&self) -> RangeIter {
        RangeIter { range: *self, index: 0 }
    }
}

impl IntoIterator for &RangeValue {
    type Item = f64;
    type IntoIter = RangeIter;
    fn into_iter(self) -> RangeIter { self.iter() }
}

/// Values are computed as `start + i * step` so error does not accumulate.
#[derive(Debug, Clone)]
pub struct RangeIter {
    range: RangeValue,
    index: usize,
}

impl Iterator for RangeIter {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        let RangeValue { start, end, step } = self.range;
        let value = start + self.index as f64 * step;
        if (step > 0.0 && value > end) || (step < 0.0 && value < end) {
            return None;
        }
        self.index += 1;
        Some(value)
    }
}

// ─── Values ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Color(Color),
    Texture(Option<Texture>),
    Number(f64),
    Vector(Vector),
    Size(Vector),
    String(Option<String>),
    Path(Path),
    Mesh(Geometry),
    Point(PathPoint),
    Tuple(Vec<Value>),
    Range(RangeValue),
}

impl Value {
    pub const VOID: Value = Value::Tuple(Vec::new());

    pub fn string(s: impl Into<String>) -> Self { Value::String(Some(s.into())) }

    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Color(_)   => ValueType::Color,
            Value::Texture(_) => ValueType::Texture,
            Value::Number(_)  => ValueType::Number,
            Value::Vector(_)  => ValueType::Vector,
            Value::Size(_)    => ValueType::Size,
            Value::String(_)  => ValueType::String,
            Value::Path(_)    => ValueType::Path,
            Value::Mesh(_)    => ValueType::Mesh,
            Value::Point(_)   => ValueType::Point,
            Value::Range(_)   => ValueType::Range,
            Value::Tuple(values) => match values.as_slice() {
                []  => ValueType::Void,
                [v] => v.value_type(),
                _   => ValueType::Tuple,
            },
        }
    }

    pub fn is_void(&self) -> bool { matches!(self, Value::Tuple(v) if v.is_empty()) }

    /// Collapse single-element tuples until none remain.
    pub fn unwrapped(self) -> Value {
        let mut value = self;
        loop {
            match value {
                Value::Tuple(mut values) if values.len() == 1 => value = values.remove(0),
                other => return other,
            }
        }
    }

    pub fn unwrapped_ref(&self) -> &Value {
        let mut value = self;
        while let Value::Tuple(values) = value {
            match values.as_slice() {
                [inner] => value = inner,
                _ => break,
            }
        }
        value
    }

    pub fn as_number(&self) -> Option<f64> {
        match self.unwrapped_ref() {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Elements as they take part in argument lists: a tuple contributes its
    /// items, anything else contributes itself.
    pub fn into_elements(self) -> Vec<Value> {
        match self {
            Value::Tuple(values) => values,
            other => vec![other],
        }
    }

    // ─── Members ─────────────────────────────────────────────────────────────

    /// Names accepted by `value.name`.
    pub fn members(&self) -> Vec<String> {
        let fixed: &[&str] = match self {
            Value::Vector(_) | Value::Point(_) => &["x", "y", "z"],
            Value::Size(_)                     => &["width", "height", "depth"],
            Value::Color(_)                    => &["red", "green", "blue", "alpha"],
            Value::Range(_)                    => &["start", "end", "step"],
            Value::Mesh(_)                     => &["name"],
            Value::Path(_)                     => &["points"],
            Value::String(_)                   => &["length"],
            Value::Texture(_) | Value::Number(_) => &[],
            Value::Tuple(values) => return tuple_members(values),
        };
        fixed.iter().map(|s| s.to_string()).collect()
    }

    pub fn member(&self, name: &str) -> Option<Value> {
        let number = |n: f64| Some(Value::Number(n));
        match self {
            Value::Vector(v) => vector_member(v, name).and_then(number),
            Value::Point(p)  => vector_member(&p.position, name).and_then(number),
            Value::Size(s)   => size_member(s, name).and_then(number),
            Value::Color(c)  => color_member(c, name).and_then(number),
            Value::Range(r) => match name {
                "start" => number(r.start),
                "end"   => number(r.end),
                "step"  => number(r.step),
                _ => None,
            },
            Value::Mesh(g) => match name {
                "name" => Some(Value::String(g.name.clone())),
                _ => None,
            },
            Value::Path(p) => match name {
                "points" => Some(Value::Tuple(p.points.iter().copied().map(Value::Point).collect())),
                _ => None,
            },
            Value::String(s) => match name {
                "length" => number(s.as_deref().map_or(0, |s| s.chars().count()) as f64),
                _ => None,
            },
            Value::Texture(_) | Value::Number(_) => None,
            Value::Tuple(values) => tuple_member(values, name),
        }
    }
}

fn numbers(values: &[Value]) -> Option<Vec<f64>> {
    values
        .iter()
        .map(|v| match v.unwrapped_ref() {
            Value::Number(n) => Some(*n),
            _ => None,
        })
        .collect()
}

fn tuple_members(values: &[Value]) -> Vec<String> {
    let mut members: Vec<String> = ORDINALS.iter().take(values.len()).map(|s| s.to_string()).collect();
    match numbers(values) {
        Some(_) if !values.is_empty() => {
            if values.len() <= 3 {
                members.extend(["x", "y", "z", "width", "height", "depth"].map(String::from));
            }
            if values.len() <= 4 {
                members.extend(["red", "green", "blue", "alpha"].map(String::from));
            }
        }
        _ => {
            if let [single] = values {
                members.extend(single.members());
            }
        }
    }
    members
}

fn tuple_member(values: &[Value], name: &str) -> Option<Value> {
    if let Some(index) = ORDINALS.iter().position(|o| *o == name) {
        return values.get(index).cloned();
    }
    match numbers(values) {
        Some(n) if !n.is_empty() => {
            let value = match name {
                "x" | "y" | "z" if n.len() <= 3 => vector_member(&Vector::from_components(&n), name),
                "width" | "height" | "depth" if n.len() <= 3 => {
                    size_member(&Vector::size_from_components(&n), name)
                }
                "red" | "green" | "blue" | "alpha" if n.len() <= 4 => {
                    color_member(&Color::from_components(&n), name)
                }
                _ => None,
            };
            value.map(Value::Number)
        }
        _ => match values {
            [single] => single.member(name),
            _ => None,
        },
    }
}

fn vector_member(v: &Vector, name: &str) -> Option<f64> {
    match name {
        "x" => Some(v.x),
        "y" => Some(v.y),
        "z" => Some(v.z),
        _ => None,
    }
}

fn size_member(v: &Vector, name: &str) -> Option<f64> {
    match name {
        "width"  => Some(v.x),
        "height" => Some(v.y),
        "depth"  => Some(v.z),
        _ => None,
    }
}

fn color_member(c: &Color, name: &str) -> Option<f64> {
    match name {
        "red"   => Some(c.r),
        "green" => Some(c.g),
        "blue"  => Some(c.b),
        "alpha" => Some(c.a),
        _ => None,
    }
}

// ─── Display ─────────────────────────────────────────────────────────────────

fn join(f: &mut fmt::Formatter<'_>, parts: &[f64]) -> fmt::Result {
    for (i, p) in parts.iter().enumerate() {
        if i > 0 { write!(f, " ")?; }
        write!(f, "{p}")?;
    }
    Ok(())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Color(c)   => join(f, &c.components()),
            Value::Texture(t) => write!(f, "{}", t.as_ref().map_or("", |t| t.name.as_str())),
            Value::Number(n)  => write!(f, "{n}"),
            Value::Vector(v) | Value::Size(v) => join(f, &v.components()),
            Value::String(s)  => write!(f, "{}", s.as_deref().unwrap_or("")),
            Value::Path(p)    => write!(f, "path ({} points)", p.points.len()),
            Value::Mesh(g)    => match &g.name {
                Some(name) => write!(f, "mesh '{name}'"),
                None => write!(f, "mesh"),
            },
            Value::Point(p)   => join(f, &p.position.components()),
            Value::Range(r) if r.step == 1.0 => write!(f, "{} to {}", r.start, r.end),
            Value::Range(r)   => write!(f, "{} to {} step {}", r.start, r.end, r.step),
            Value::Tuple(values) => {
                for (i, v) in values.iter().enumerate() {
                    if i > 0 { write!(f, " ")?; }
                    write!(f, "{v}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nums(n: &[f64]) -> Value { Value::Tuple(n.iter().copied().map(Value::Number).collect()) }

    #[test]
    fn nested_single_tuples_unwrap_fully() {
        let v = Value::Tuple(vec![Value::Tuple(vec![Value::Tuple(vec![Value::Number(3.0)])])]);
        assert_eq!(v.value_type(), ValueType::Number);
        assert_eq!(v.unwrapped(), Value::Number(3.0));
        let multi = Value::Tuple(vec![nums(&[1.0, 2.0])]);
        assert_eq!(multi.unwrapped(), nums(&[1.0, 2.0]));
    }

    #[test]
    fn void_is_the_empty_tuple() {
        assert_eq!(Value::VOID.value_type(), ValueType::Void);
        assert!(Value::VOID.is_void());
    }

    #[test]
    fn range_iteration_is_inclusive_and_restartable() {
        let r = RangeValue::new(1.0, 10.0, 2.0).unwrap();
        assert_eq!(r.iter().collect::<Vec<_>>(), vec![1.0, 3.0, 5.0, 7.0, 9.0]);
        assert_eq!(r.iter().count(), 5);
        let down = RangeValue::new(3.0, 1.0, -1.0).unwrap();
        assert_eq!(down.iter().collect::<Vec<_>>(), vec![3.0, 2.0, 1.0]);
        assert!(RangeValue::new(1.0, 2.0, 1.0).unwrap().iter().next().is_some());
        assert!(RangeValue::new(2.0, 1.0, 1.0).unwrap().iter().next().is_none());
        assert!(RangeValue::new(1.0, 2.0, 0.0).is_none());
    }

    #[test]
    fn numeric_tuple_members() {
        let v = nums(&[1.0, 2.0, 3.0]);
        assert_eq!(v.member("second"), Some(Value::Number(2.0)));
        assert_eq!(v.member("z"), Some(Value::Number(3.0)));
        assert_eq!(v.member("depth"), Some(Value::Number(3.0)));
        assert_eq!(v.member("alpha"), Some(Value::Number(1.0)));
        assert_eq!(nums(&[1.0, 2.0, 3.0, 4.0]).member("x"), None);
        assert_eq!(nums(&[0.5]).member("green"), Some(Value::Number(0.5)));
    }

    #[test]
    fn tuple_member_names() {
        let v = nums(&[1.0, 2.0]);
        let members = v.members();
        assert!(members.starts_with(&["first".to_string(), "second".to_string()]));
        assert!(members.contains(&"x".to_string()) && members.contains(&"red".to_string()));
        let single = Value::Tuple(vec![Value::Vector(Vector::new(1.0, 2.0, 3.0))]);
        assert_eq!(single.member("y"), Some(Value::Number(2.0)));
        assert!(single.members().contains(&"z".to_string()));
    }

    #[test]
    fn ordinals() {
        assert_eq!(ordinal(0), "first");
        assert_eq!(ordinal(9), "tenth");
        assert_eq!(ordinal(10), "11th");
        assert_eq!(ordinal(21), "22nd");
    }

    #[test]
    fn display() {
        assert_eq!(nums(&[1.0, 2.5]).to_string(), "1 2.5");
        assert_eq!(Value::string("hi").to_string(), "hi");
        assert_eq!(Value::Range(RangeValue::new(1.0, 5.0, 1.0).unwrap()).to_string(), "1 to 5");
    }
}
