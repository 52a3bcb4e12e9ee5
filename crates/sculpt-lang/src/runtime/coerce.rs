//! Turning evaluated argument lists into single typed values.

use crate::error::{RuntimeError, RuntimeErrorKind};
use crate::runtime::context::EvaluationContext;
use crate::runtime::value::{Value, ValueType};
use crate::syntax::ast::Span;
use crate::types::geometry::{Color, Geometry, Texture, Vector};

/// An evaluated argument and the source range it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub value: Value,
    pub span: Span,
}

impl Argument {
    pub fn new(value: Value, span: Span) -> Self { Self { value, span } }
}

/// Argument-count bounds for the composite numeric types.
fn numeric_bounds(ty: ValueType) -> Option<(usize, usize)> {
    match ty {
        ValueType::Color                   => Some((1, 4)),
        ValueType::Vector | ValueType::Size => Some((1, 3)),
        ValueType::Pair                    => Some((2, 2)),
        _ => None,
    }
}

impl EvaluationContext<'_> {
    /// Coerce `args` to `ty` for the symbol `for_name`.
    pub fn coerce(&self, mut args: Vec<Argument>, ty: ValueType, for_name: &str) -> Result<Value, RuntimeError> {
        if args.len() == 1 && args[0].value.value_type() == ty {
            return Ok(args.remove(0).value.unwrapped());
        }

        if let Some((min, max)) = numeric_bounds(ty) {
            return self.coerce_numeric(args, ty, for_name, min, max);
        }

        match ty {
            ValueType::Texture => self.coerce_texture(args, for_name),
            ValueType::Font => self.coerce_font(args, for_name),
            ValueType::ColorOrTexture => {
                let is_texture = matches!(
                    args.as_slice(),
                    [a] if matches!(a.value.unwrapped_ref(), Value::String(_) | Value::Texture(_))
                );
                if is_texture {
                    self.coerce_texture(args, for_name)
                } else {
                    self.coerce(args, ValueType::Color, for_name)
                }
            }
            ValueType::Paths => self.coerce_paths(args, for_name),
            ValueType::Void => match args.first() {
                Some(first) => Err(RuntimeError::new(
                    RuntimeErrorKind::UnexpectedArgument { for_name: for_name.into(), max: 0 },
                    first.span,
                )),
                None => Ok(Value::VOID),
            },
            ValueType::String => self.coerce_string(args, for_name),
            ValueType::Tuple => Ok(match args.len() {
                1 => match args.remove(0).value {
                    tuple @ Value::Tuple(_) => tuple,
                    other => Value::Tuple(vec![other]),
                },
                _ => Value::Tuple(args.into_iter().map(|a| a.value).collect()),
            }),
            _ => {
                let arg = self.single(args, ty, for_name)?;
                match (ty, arg.value.unwrapped()) {
                    (ValueType::Mesh, Value::Path(path)) => Ok(Value::Mesh(Geometry::path(path))),
                    (_, value) if value.value_type() == ty => Ok(value),
                    (_, value) => Err(mismatch(for_name, 0, ty.description(), &value, arg.span)),
                }
            }
        }
    }

    /// Exactly one argument.
    fn single(&self, mut args: Vec<Argument>, ty: ValueType, for_name: &str) -> Result<Argument, RuntimeError> {
        match args.len() {
            0 => Err(self.missing(for_name, 0, ty.description(), None)),
            1 => Ok(args.remove(0)),
            _ => Err(RuntimeError::new(
                RuntimeErrorKind::UnexpectedArgument { for_name: for_name.into(), max: 1 },
                args[1].span,
            )),
        }
    }

    fn missing(&self, for_name: &str, index: usize, expected: &str, after: Option<Span>) -> RuntimeError {
        RuntimeError::new(
            RuntimeErrorKind::MissingArgument { for_name: for_name.into(), index, expected: expected.into() },
            after.map_or(self.cursor.after(), Span::after),
        )
    }

    fn coerce_numeric(
        &self,
        args: Vec<Argument>,
        ty: ValueType,
        for_name: &str,
        min: usize,
        max: usize,
    ) -> Result<Value, RuntimeError> {
        // A vector passes as a size and the other way round.
        if let [arg] = args.as_slice() {
            match (ty, arg.value.unwrapped_ref()) {
                (ValueType::Size, Value::Vector(v)) => return Ok(Value::Size(*v)),
                (ValueType::Vector, Value::Size(v)) => return Ok(Value::Vector(*v)),
                _ => {}
            }
        }

        let elements = flatten(args);
        if let Some(excess) = elements.get(max) {
            return Err(RuntimeError::new(
                RuntimeErrorKind::UnexpectedArgument { for_name: for_name.into(), max },
                excess.span,
            ));
        }

        let mut numbers = Vec::with_capacity(elements.len());
        for (index, arg) in elements.iter().enumerate() {
            match arg.value.as_number() {
                Some(n) => numbers.push(n),
                None => {
                    let expected = if index == 0 { ty.description() } else { "number" };
                    return Err(mismatch(for_name, index, expected, &arg.value, arg.span));
                }
            }
        }

        if numbers.len() < min {
            let index = numbers.len();
            let expected = if index == 0 { ty.description() } else { "number" };
            return Err(self.missing(for_name, index, expected, elements.last().map(|a| a.span)));
        }

        Ok(match ty {
            ValueType::Color => Value::Color(Color::from_components(&numbers)),
            ValueType::Size  => Value::Size(Vector::size_from_components(&numbers)),
            ValueType::Pair  => Value::Tuple(numbers.into_iter().map(Value::Number).collect()),
            _                => Value::Vector(Vector::from_components(&numbers)),
        })
    }

    fn coerce_texture(&self, args: Vec<Argument>, for_name: &str) -> Result<Value, RuntimeError> {
        let arg = self.single(args, ValueType::Texture, for_name)?;
        match arg.value.unwrapped() {
            texture @ Value::Texture(_) => Ok(texture),
            Value::String(None) => Ok(Value::Texture(None)),
            Value::String(Some(name)) if name.is_empty() => Ok(Value::Texture(None)),
            Value::String(Some(name)) => {
                let url = self.resolve_url(&name);
                Ok(Value::Texture(Some(Texture { name, url })))
            }
            other => Err(mismatch(for_name, 0, ValueType::Texture.description(), &other, arg.span)),
        }
    }

    fn coerce_font(&self, args: Vec<Argument>, for_name: &str) -> Result<Value, RuntimeError> {
        let arg = self.single(args, ValueType::Font, for_name)?;
        let name = match arg.value.unwrapped() {
            Value::String(name) => name.unwrap_or_default(),
            other => return Err(mismatch(for_name, 0, ValueType::Font.description(), &other, arg.span)),
        };
        let installed = self.delegate().font_names();
        let unknown = |name: String, options: Vec<String>| {
            RuntimeError::new(RuntimeErrorKind::UnknownFont { name, options }, arg.span)
        };
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(unknown(String::new(), installed.unwrap_or_default()));
        }
        match installed {
            None => Ok(Value::string(trimmed)),
            Some(fonts) => match fonts.iter().find(|f| f.eq_ignore_ascii_case(trimmed)) {
                Some(font) => Ok(Value::string(font.clone())),
                None => Err(unknown(trimmed.to_string(), fonts)),
            },
        }
    }

    fn coerce_paths(&self, args: Vec<Argument>, for_name: &str) -> Result<Value, RuntimeError> {
        if args.is_empty() {
            return Err(self.missing(for_name, 0, ValueType::Paths.description(), None));
        }
        let mut paths = Vec::new();
        for arg in args {
            collect_paths(arg.value, arg.span, for_name, &mut paths)?;
        }
        Ok(Value::Tuple(paths))
    }

    fn coerce_string(&self, args: Vec<Argument>, for_name: &str) -> Result<Value, RuntimeError> {
        let elements = flatten(args);
        if elements.is_empty() {
            return Err(self.missing(for_name, 0, ValueType::String.description(), None));
        }
        let mut parts = Vec::with_capacity(elements.len());
        for (index, arg) in elements.into_iter().enumerate() {
            match arg.value.unwrapped() {
                Value::String(s) => parts.push(s.unwrap_or_default()),
                Value::Number(n) => parts.push(n.to_string()),
                other => return Err(mismatch(for_name, index, ValueType::String.description(), &other, arg.span)),
            }
        }
        Ok(Value::string(parts.join(" ")))
    }
}

/// A lone tuple argument stands for its elements.
fn flatten(mut args: Vec<Argument>) -> Vec<Argument> {
    if args.len() != 1 {
        return args;
    }
    let arg = args.remove(0);
    let span = arg.span;
    match arg.value.unwrapped() {
        Value::Tuple(values) => values.into_iter().map(|value| Argument::new(value, span)).collect(),
        value => vec![Argument::new(value, span)],
    }
}

fn collect_paths(value: Value, span: Span, for_name: &str, out: &mut Vec<Value>) -> Result<(), RuntimeError> {
    match value {
        path @ Value::Path(_) => {
            out.push(path);
            Ok(())
        }
        Value::Tuple(values) => values.into_iter().try_for_each(|v| collect_paths(v, span, for_name, out)),
        other => {
            let index = out.len();
            Err(mismatch(for_name, index, ValueType::Paths.description(), &other, span))
        }
    }
}

fn mismatch(for_name: &str, index: usize, expected: &str, got: &Value, span: Span) -> RuntimeError {
    RuntimeError::new(
        RuntimeErrorKind::TypeMismatch {
            for_name: for_name.into(),
            index,
            expected: expected.into(),
            got: got.value_type().description().into(),
        },
        span,
    )
}
