//! Shape-producing blocks and path points.

use std::rc::Rc;

use crate::error::EvalResult;
use crate::runtime::context::{BlockType, EvaluationContext, Symbol, SymbolTable};
use crate::runtime::value::{Value, ValueType};
use crate::types::geometry::{Geometry, GeometryKind, Path, PathPoint};
use super::{Namespace, as_vector};

type BuildFn = fn(&mut EvaluationContext<'_>) -> EvalResult<Value>;

fn block(children: &[ValueType], table: SymbolTable, build: BuildFn) -> Symbol {
    Symbol::Block(BlockType::new(children.to_vec(), table), Rc::new(build))
}

pub struct ShapesNamespace;

impl Namespace for ShapesNamespace {
    fn name(&self) -> &'static str { "shapes" }

    fn symbols(&self, table: SymbolTable) -> Vec<(&'static str, Symbol)> {
        use SymbolTable::{Builder, Primitive};
        const MESH: &[ValueType] = &[ValueType::Mesh];
        const PATH: &[ValueType] = &[ValueType::Path];

        match table {
            SymbolTable::Global => vec![
                // Primitives
                ("cube",     block(&[], Primitive, cube)),
                ("sphere",   block(&[], Primitive, sphere)),
                ("cylinder", block(&[], Primitive, cylinder)),
                ("cone",     block(&[], Primitive, cone)),

                // Groups and CSG
                ("group",        block(MESH, Builder, group)),
                ("union",        block(MESH, Builder, union)),
                ("difference",   block(MESH, Builder, difference)),
                ("intersection", block(MESH, Builder, intersection)),

                // Path builders
                ("fill",  block(PATH, Builder, fill)),
                ("lathe", block(PATH, Builder, lathe)),
                ("extrude", Symbol::Block(
                    BlockType::new(PATH.to_vec(), Builder).with_option("along", ValueType::Paths),
                    Rc::new(extrude as BuildFn),
                )),

                // Paths
                ("path",   block(&[ValueType::Point], SymbolTable::Path, path)),
                ("circle", block(&[], Primitive, circle)),
                ("square", block(&[], Primitive, square)),
            ],
            SymbolTable::Path => vec![
                ("point", Symbol::Command(ValueType::Vector, point)),
                ("curve", Symbol::Command(ValueType::Vector, curve)),
            ],
            _ => Vec::new(),
        }
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Geometry carrying the frame's name, own transform and material.
fn node(ctx: &EvaluationContext<'_>, kind: GeometryKind) -> Geometry {
    let mut geometry = Geometry::new(kind);
    geometry.name = ctx.state.name.clone();
    geometry.transform = ctx.state.transform();
    geometry.material = ctx.state.material.clone();
    geometry
}

fn mesh_children(ctx: &mut EvaluationContext<'_>) -> Vec<Geometry> {
    std::mem::take(&mut ctx.state.children)
        .into_iter()
        .filter_map(|child| match child {
            Value::Mesh(geometry) => Some(geometry),
            _ => None,
        })
        .collect()
}

fn paths(values: Vec<Value>) -> Vec<Path> {
    values
        .into_iter()
        .flat_map(Value::into_elements)
        .filter_map(|value| match value {
            Value::Path(path) => Some(path),
            _ => None,
        })
        .collect()
}

fn with_children(ctx: &mut EvaluationContext<'_>, kind: GeometryKind) -> EvalResult<Value> {
    let children = mesh_children(ctx);
    Ok(Value::Mesh(Geometry { children, ..node(ctx, kind) }))
}

// ─── Primitives ──────────────────────────────────────────────────────────────

fn cube(ctx: &mut EvaluationContext<'_>) -> EvalResult<Value> { Ok(Value::Mesh(node(ctx, GeometryKind::Cube))) }

fn sphere(ctx: &mut EvaluationContext<'_>) -> EvalResult<Value> {
    Ok(Value::Mesh(node(ctx, GeometryKind::Sphere { segments: ctx.state.detail })))
}

fn cylinder(ctx: &mut EvaluationContext<'_>) -> EvalResult<Value> {
    Ok(Value::Mesh(node(ctx, GeometryKind::Cylinder { segments: ctx.state.detail })))
}

fn cone(ctx: &mut EvaluationContext<'_>) -> EvalResult<Value> {
    Ok(Value::Mesh(node(ctx, GeometryKind::Cone { segments: ctx.state.detail })))
}

// ─── Groups ──────────────────────────────────────────────────────────────────

fn group(ctx: &mut EvaluationContext<'_>) -> EvalResult<Value>        { with_children(ctx, GeometryKind::Group) }
fn union(ctx: &mut EvaluationContext<'_>) -> EvalResult<Value>        { with_children(ctx, GeometryKind::Union) }
fn difference(ctx: &mut EvaluationContext<'_>) -> EvalResult<Value>   { with_children(ctx, GeometryKind::Difference) }
fn intersection(ctx: &mut EvaluationContext<'_>) -> EvalResult<Value> { with_children(ctx, GeometryKind::Intersection) }

// ─── Path builders ───────────────────────────────────────────────────────────

fn fill(ctx: &mut EvaluationContext<'_>) -> EvalResult<Value> {
    let shapes = paths(std::mem::take(&mut ctx.state.children));
    Ok(Value::Mesh(node(ctx, GeometryKind::Fill(shapes))))
}

fn lathe(ctx: &mut EvaluationContext<'_>) -> EvalResult<Value> {
    let shapes = paths(std::mem::take(&mut ctx.state.children));
    Ok(Value::Mesh(node(ctx, GeometryKind::Lathe { shapes, segments: ctx.state.detail })))
}

fn extrude(ctx: &mut EvaluationContext<'_>) -> EvalResult<Value> {
    let shapes = paths(std::mem::take(&mut ctx.state.children));
    let along = ctx.option_value("along").map(|v| paths(vec![v])).unwrap_or_default();
    Ok(Value::Mesh(node(ctx, GeometryKind::Extrude { shapes, along })))
}

// ─── Paths ───────────────────────────────────────────────────────────────────

fn path(ctx: &mut EvaluationContext<'_>) -> EvalResult<Value> {
    let points = std::mem::take(&mut ctx.state.children)
        .into_iter()
        .filter_map(|child| match child {
            Value::Point(p) => Some(p),
            _ => None,
        })
        .collect();
    Ok(Value::Path(Path::new(points).transformed(&ctx.state.transform())))
}

fn circle(ctx: &mut EvaluationContext<'_>) -> EvalResult<Value> {
    Ok(Value::Path(Path::circle(ctx.state.detail).transformed(&ctx.state.transform())))
}

fn square(ctx: &mut EvaluationContext<'_>) -> EvalResult<Value> {
    Ok(Value::Path(Path::square().transformed(&ctx.state.transform())))
}

fn point(v: Value, ctx: &mut EvaluationContext<'_>) -> EvalResult<Value> {
    Ok(Value::Point(PathPoint::point(as_vector(&v, "point", ctx)?)))
}

fn curve(v: Value, ctx: &mut EvaluationContext<'_>) -> EvalResult<Value> {
    Ok(Value::Point(PathPoint::curve(as_vector(&v, "curve", ctx)?)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::context::Environment;
    use crate::runtime::delegate::DefaultDelegate;
    use crate::types::geometry::Vector;

    fn never() -> bool { false }

    #[test]
    fn primitives_use_detail() {
        let delegate = DefaultDelegate::new();
        let env = Environment::new(&delegate, &never);
        let mut ctx = EvaluationContext::root(&env, "".into(), None);
        ctx.state.detail = 8;
        let Value::Mesh(g) = sphere(&mut ctx).unwrap() else { panic!("not a mesh") };
        assert_eq!(g.kind, GeometryKind::Sphere { segments: 8 });
    }

    #[test]
    fn path_collects_points() {
        let delegate = DefaultDelegate::new();
        let env = Environment::new(&delegate, &never);
        let mut ctx = EvaluationContext::root(&env, "".into(), None);
        ctx.state.children = vec![
            Value::Point(PathPoint::point(Vector::ZERO)),
            Value::Point(PathPoint::curve(Vector::new(1.0, 0.0, 0.0))),
        ];
        let Value::Path(p) = path(&mut ctx).unwrap() else { panic!("not a path") };
        assert_eq!(p.points.len(), 2);
        assert!(p.points[1].is_curved);
        assert!(ctx.state.children.is_empty());
    }

    #[test]
    fn extrude_declares_along() {
        let symbols = ShapesNamespace.symbols(SymbolTable::Global);
        let Some((_, Symbol::Block(ty, _))) = symbols.iter().find(|(n, _)| *n == "extrude") else {
            panic!("extrude missing");
        };
        assert_eq!(ty.option("along"), Some(ValueType::Paths));
    }
}
