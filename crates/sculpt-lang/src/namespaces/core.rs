//! Always-available built-ins: math, named colors, `debug` and the
//! `detail` / `font` / `name` properties.

use crate::error::EvalResult;
use crate::runtime::context::{CommandFn, EvaluationContext, Symbol, SymbolTable};
use crate::runtime::value::{Value, ValueType};
use crate::types::geometry::Color;
use super::{Namespace, as_number, as_pair, as_string};

pub struct CoreNamespace;

impl Namespace for CoreNamespace {
    fn name(&self) -> &'static str { "core" }

    fn symbols(&self, table: SymbolTable) -> Vec<(&'static str, Symbol)> {
        if table != SymbolTable::Global { return Vec::new(); }
        vec![
            // Math
            ("sin",   unary(sin)),
            ("cos",   unary(cos)),
            ("tan",   unary(tan)),
            ("asin",  unary(asin)),
            ("acos",  unary(acos)),
            ("atan",  unary(atan)),
            ("sqrt",  unary(sqrt)),
            ("abs",   unary(abs)),
            ("floor", unary(floor)),
            ("ceil",  unary(ceil)),
            ("round", unary(round)),
            ("atan2", binary(atan2)),
            ("pow",   binary(pow)),
            ("min",   binary(min)),
            ("max",   binary(max)),
            ("pi",    Symbol::Constant(Value::Number(std::f64::consts::PI))),

            // Named colors
            ("black",   color(Color::BLACK)),
            ("white",   color(Color::WHITE)),
            ("clear",   color(Color::CLEAR)),
            ("gray",    color(Color::rgba(0.5, 0.5, 0.5, 1.0))),
            ("grey",    color(Color::rgba(0.5, 0.5, 0.5, 1.0))),
            ("red",     color(Color::rgba(1.0, 0.0, 0.0, 1.0))),
            ("green",   color(Color::rgba(0.0, 1.0, 0.0, 1.0))),
            ("blue",    color(Color::rgba(0.0, 0.0, 1.0, 1.0))),
            ("yellow",  color(Color::rgba(1.0, 1.0, 0.0, 1.0))),
            ("cyan",    color(Color::rgba(0.0, 1.0, 1.0, 1.0))),
            ("magenta", color(Color::rgba(1.0, 0.0, 1.0, 1.0))),
            ("orange",  color(Color::rgba(1.0, 0.65, 0.0, 1.0))),

            // Scene state
            ("debug",  Symbol::Command(ValueType::Tuple, debug)),
            ("detail", Symbol::Property(ValueType::Number, set_detail, get_detail)),
            ("font",   Symbol::Property(ValueType::Font, set_font, get_font)),
            ("name",   Symbol::Property(ValueType::String, set_name, get_name)),
        ]
    }
}

fn unary(f: CommandFn) -> Symbol { Symbol::Command(ValueType::Number, f) }
fn binary(f: CommandFn) -> Symbol { Symbol::Command(ValueType::Pair, f) }
fn color(c: Color) -> Symbol { Symbol::Constant(Value::Color(c)) }

// ─── Math ────────────────────────────────────────────────────────────────────

fn apply1(v: Value, name: &str, ctx: &EvaluationContext<'_>, f: fn(f64) -> f64) -> EvalResult<Value> {
    Ok(Value::Number(f(as_number(&v, name, ctx)?)))
}

fn apply2(v: Value, name: &str, ctx: &EvaluationContext<'_>, f: fn(f64, f64) -> f64) -> EvalResult<Value> {
    let (a, b) = as_pair(&v, name, ctx)?;
    Ok(Value::Number(f(a, b)))
}

fn sin(v: Value, ctx: &mut EvaluationContext<'_>) -> EvalResult<Value>   { apply1(v, "sin", ctx, f64::sin) }
fn cos(v: Value, ctx: &mut EvaluationContext<'_>) -> EvalResult<Value>   { apply1(v, "cos", ctx, f64::cos) }
fn tan(v: Value, ctx: &mut EvaluationContext<'_>) -> EvalResult<Value>   { apply1(v, "tan", ctx, f64::tan) }
fn asin(v: Value, ctx: &mut EvaluationContext<'_>) -> EvalResult<Value>  { apply1(v, "asin", ctx, f64::asin) }
fn acos(v: Value, ctx: &mut EvaluationContext<'_>) -> EvalResult<Value>  { apply1(v, "acos", ctx, f64::acos) }
fn atan(v: Value, ctx: &mut EvaluationContext<'_>) -> EvalResult<Value>  { apply1(v, "atan", ctx, f64::atan) }
fn sqrt(v: Value, ctx: &mut EvaluationContext<'_>) -> EvalResult<Value>  { apply1(v, "sqrt", ctx, f64::sqrt) }
fn abs(v: Value, ctx: &mut EvaluationContext<'_>) -> EvalResult<Value>   { apply1(v, "abs", ctx, f64::abs) }
fn floor(v: Value, ctx: &mut EvaluationContext<'_>) -> EvalResult<Value> { apply1(v, "floor", ctx, f64::floor) }
fn ceil(v: Value, ctx: &mut EvaluationContext<'_>) -> EvalResult<Value>  { apply1(v, "ceil", ctx, f64::ceil) }
fn round(v: Value, ctx: &mut EvaluationContext<'_>) -> EvalResult<Value> { apply1(v, "round", ctx, f64::round) }

fn atan2(v: Value, ctx: &mut EvaluationContext<'_>) -> EvalResult<Value> { apply2(v, "atan2", ctx, f64::atan2) }
fn pow(v: Value, ctx: &mut EvaluationContext<'_>) -> EvalResult<Value>   { apply2(v, "pow", ctx, f64::powf) }
fn min(v: Value, ctx: &mut EvaluationContext<'_>) -> EvalResult<Value>   { apply2(v, "min", ctx, f64::min) }
fn max(v: Value, ctx: &mut EvaluationContext<'_>) -> EvalResult<Value>   { apply2(v, "max", ctx, f64::max) }

// ─── Debug ───────────────────────────────────────────────────────────────────

fn debug(v: Value, ctx: &mut EvaluationContext<'_>) -> EvalResult<Value> {
    ctx.delegate().debug_log(&v.into_elements());
    Ok(Value::VOID)
}

// ─── Properties ──────────────────────────────────────────────────────────────

fn set_detail(v: Value, ctx: &mut EvaluationContext<'_>) -> EvalResult<()> {
    let n = as_number(&v, "detail", ctx)?;
    ctx.state.detail = n.max(0.0).round() as usize;
    Ok(())
}

fn get_detail(ctx: &EvaluationContext<'_>) -> Value { Value::Number(ctx.state.detail as f64) }

fn set_font(v: Value, ctx: &mut EvaluationContext<'_>) -> EvalResult<()> {
    ctx.state.font = Some(as_string(&v, "font", ctx)?);
    Ok(())
}

fn get_font(ctx: &EvaluationContext<'_>) -> Value { Value::String(ctx.state.font.clone()) }

fn set_name(v: Value, ctx: &mut EvaluationContext<'_>) -> EvalResult<()> {
    ctx.state.name = Some(as_string(&v, "name", ctx)?);
    Ok(())
}

fn get_name(ctx: &EvaluationContext<'_>) -> Value { Value::String(ctx.state.name.clone()) }

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::context::Environment;
    use crate::runtime::delegate::DefaultDelegate;

    fn never() -> bool { false }

    fn call(name: &str, v: Value) -> Value {
        let delegate = DefaultDelegate::new();
        let env = Environment::new(&delegate, &never);
        let mut ctx = EvaluationContext::root(&env, "".into(), None);
        match ctx.symbol(name) {
            Some(Symbol::Command(_, f)) => f(v, &mut ctx).unwrap(),
            other => panic!("{name} is not a command: {other:?}"),
        }
    }

    fn pair(a: f64, b: f64) -> Value { Value::Tuple(vec![Value::Number(a), Value::Number(b)]) }

    #[test]
    fn unary_math() {
        assert_eq!(call("sqrt", Value::Number(9.0)), Value::Number(3.0));
        assert_eq!(call("floor", Value::Number(-1.5)), Value::Number(-2.0));
        assert_eq!(call("abs", Value::Number(-4.0)), Value::Number(4.0));
    }

    #[test]
    fn binary_math() {
        assert_eq!(call("pow", pair(2.0, 10.0)), Value::Number(1024.0));
        assert_eq!(call("min", pair(2.0, -1.0)), Value::Number(-1.0));
        assert_eq!(call("atan2", pair(0.0, 1.0)), Value::Number(0.0));
    }

    #[test]
    fn detail_rounds_and_clamps() {
        let delegate = DefaultDelegate::new();
        let env = Environment::new(&delegate, &never);
        let mut ctx = EvaluationContext::root(&env, "".into(), None);
        set_detail(Value::Number(7.6), &mut ctx).unwrap();
        assert_eq!(get_detail(&ctx), Value::Number(8.0));
        set_detail(Value::Number(-3.0), &mut ctx).unwrap();
        assert_eq!(ctx.state.detail, 0);
    }
}
