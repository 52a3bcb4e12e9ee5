//! Material properties and the scene background.

use crate::error::EvalResult;
use crate::runtime::context::{EvaluationContext, Symbol, SymbolTable};
use crate::runtime::value::{Value, ValueType};
use crate::types::geometry::MaterialProperty;
use super::{Namespace, as_number};

pub struct RenderNamespace;

impl Namespace for RenderNamespace {
    fn name(&self) -> &'static str { "render" }

    fn symbols(&self, table: SymbolTable) -> Vec<(&'static str, Symbol)> {
        match table {
            SymbolTable::Global => vec![
                ("color",   Symbol::Property(ValueType::Color, set_diffuse, get_color)),
                ("texture", Symbol::Property(ValueType::Texture, set_diffuse, get_texture)),
                ("opacity", Symbol::Property(ValueType::Number, set_opacity, get_opacity)),
            ],
            SymbolTable::Root => vec![
                ("background", Symbol::Property(ValueType::ColorOrTexture, set_background, get_background)),
            ],
            _ => Vec::new(),
        }
    }
}

fn to_property(v: Value) -> Option<MaterialProperty> {
    match v.unwrapped() {
        Value::Color(c)         => Some(MaterialProperty::Color(c)),
        Value::Texture(Some(t)) => Some(MaterialProperty::Texture(t)),
        _ => None,
    }
}

fn from_property(p: Option<&MaterialProperty>) -> Value {
    match p {
        Some(MaterialProperty::Color(c))   => Value::Color(*c),
        Some(MaterialProperty::Texture(t)) => Value::Texture(Some(t.clone())),
        None => Value::Texture(None),
    }
}

// ─── Material ────────────────────────────────────────────────────────────────

/// Shared by `color` and `texture`. An empty texture name clears it.
fn set_diffuse(v: Value, ctx: &mut EvaluationContext<'_>) -> EvalResult<()> {
    ctx.state.material.diffuse = to_property(v);
    Ok(())
}

fn get_color(ctx: &EvaluationContext<'_>) -> Value { Value::Color(ctx.state.material.color()) }

fn get_texture(ctx: &EvaluationContext<'_>) -> Value {
    Value::Texture(ctx.state.material.texture().cloned())
}

fn set_opacity(v: Value, ctx: &mut EvaluationContext<'_>) -> EvalResult<()> {
    ctx.state.material.opacity = as_number(&v, "opacity", ctx)?.clamp(0.0, 1.0);
    Ok(())
}

fn get_opacity(ctx: &EvaluationContext<'_>) -> Value { Value::Number(ctx.state.material.opacity) }

// ─── Background ──────────────────────────────────────────────────────────────

fn set_background(v: Value, ctx: &mut EvaluationContext<'_>) -> EvalResult<()> {
    ctx.state.background = to_property(v);
    Ok(())
}

fn get_background(ctx: &EvaluationContext<'_>) -> Value { from_property(ctx.state.background.as_ref()) }

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::context::Environment;
    use crate::runtime::delegate::DefaultDelegate;
    use crate::types::geometry::{Color, Texture};

    fn never() -> bool { false }

    #[test]
    fn texture_replaces_color_and_blank_clears() {
        let delegate = DefaultDelegate::new();
        let env = Environment::new(&delegate, &never);
        let mut ctx = EvaluationContext::root(&env, "".into(), None);
        set_diffuse(Value::Color(Color::BLACK), &mut ctx).unwrap();
        assert_eq!(get_color(&ctx), Value::Color(Color::BLACK));
        let wood = Texture { name: "wood.png".into(), url: "wood.png".into() };
        set_diffuse(Value::Texture(Some(wood.clone())), &mut ctx).unwrap();
        assert_eq!(get_texture(&ctx), Value::Texture(Some(wood)));
        assert_eq!(get_color(&ctx), Value::Color(Color::WHITE));
        set_diffuse(Value::Texture(None), &mut ctx).unwrap();
        assert_eq!(ctx.state.material.diffuse, None);
    }

    #[test]
    fn opacity_is_clamped() {
        let delegate = DefaultDelegate::new();
        let env = Environment::new(&delegate, &never);
        let mut ctx = EvaluationContext::root(&env, "".into(), None);
        set_opacity(Value::Number(1.5), &mut ctx).unwrap();
        assert_eq!(get_opacity(&ctx), Value::Number(1.0));
    }
}
