//! Placement: child-transform commands everywhere, and the own-transform
//! properties of shape-producing blocks.

use crate::error::EvalResult;
use crate::runtime::context::{EvaluationContext, Symbol, SymbolTable};
use crate::runtime::value::{Value, ValueType};
use crate::types::geometry::Transform;
use super::{Namespace, as_vector};

pub struct CoordsNamespace;

impl Namespace for CoordsNamespace {
    fn name(&self) -> &'static str { "coords" }

    fn symbols(&self, table: SymbolTable) -> Vec<(&'static str, Symbol)> {
        match table {
            SymbolTable::Global => vec![
                ("translate", Symbol::Command(ValueType::Vector, translate)),
                ("rotate",    Symbol::Command(ValueType::Vector, rotate)),
                ("scale",     Symbol::Command(ValueType::Size, scale)),
            ],
            SymbolTable::Primitive | SymbolTable::Builder | SymbolTable::Path | SymbolTable::Definition => vec![
                ("position",    Symbol::Property(ValueType::Vector, set_position, get_position)),
                ("orientation", Symbol::Property(ValueType::Vector, set_orientation, get_orientation)),
                ("size",        Symbol::Property(ValueType::Size, set_size, get_size)),
            ],
            SymbolTable::Root => Vec::new(),
        }
    }
}

// ─── Child transform ─────────────────────────────────────────────────────────

fn compose(ctx: &mut EvaluationContext<'_>, t: Transform) -> EvalResult<Value> {
    ctx.state.child_transform = ctx.state.child_transform.compose(&t);
    Ok(Value::VOID)
}

fn translate(v: Value, ctx: &mut EvaluationContext<'_>) -> EvalResult<Value> {
    let offset = as_vector(&v, "translate", ctx)?;
    compose(ctx, Transform::translation(offset))
}

fn rotate(v: Value, ctx: &mut EvaluationContext<'_>) -> EvalResult<Value> {
    let turns = as_vector(&v, "rotate", ctx)?;
    compose(ctx, Transform::rotation(turns))
}

fn scale(v: Value, ctx: &mut EvaluationContext<'_>) -> EvalResult<Value> {
    let factor = as_vector(&v, "scale", ctx)?;
    compose(ctx, Transform::scaling(factor))
}

// ─── Own transform ───────────────────────────────────────────────────────────

fn set_position(v: Value, ctx: &mut EvaluationContext<'_>) -> EvalResult<()> {
    ctx.state.position = as_vector(&v, "position", ctx)?;
    Ok(())
}

fn get_position(ctx: &EvaluationContext<'_>) -> Value { Value::Vector(ctx.state.position) }

fn set_orientation(v: Value, ctx: &mut EvaluationContext<'_>) -> EvalResult<()> {
    ctx.state.orientation = as_vector(&v, "orientation", ctx)?;
    Ok(())
}

fn get_orientation(ctx: &EvaluationContext<'_>) -> Value { Value::Vector(ctx.state.orientation) }

fn set_size(v: Value, ctx: &mut EvaluationContext<'_>) -> EvalResult<()> {
    ctx.state.scale = as_vector(&v, "size", ctx)?;
    Ok(())
}

fn get_size(ctx: &EvaluationContext<'_>) -> Value { Value::Size(ctx.state.scale) }
