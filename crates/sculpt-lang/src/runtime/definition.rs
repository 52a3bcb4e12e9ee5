//! `define` statements: constants and user block closures.

use std::path::PathBuf;
use std::rc::Rc;

use crate::error::{EvalError, EvalResult, ImportError, RuntimeError, RuntimeErrorKind};
use crate::runtime::context::{
    transformed, BlockType, Builder, EvaluationContext, MAX_RECURSION_DEPTH, Symbol,
};
use crate::runtime::delegate::file_name;
use crate::runtime::value::{Value, ValueType};
use crate::syntax::ast::{Block, Definition, Expr, Stmt};
use crate::types::geometry::{Geometry, GeometryKind};

impl EvaluationContext<'_> {
    pub fn evaluate_definition(&mut self, definition: &Definition) -> EvalResult<Symbol> {
        match definition {
            Definition::Expression(expr) => {
                let value = self.push_definition().evaluate_expr(expr)?;
                let value = match value {
                    tuple @ Value::Tuple(_) => tuple,
                    other => Value::Tuple(vec![other]),
                };
                Ok(Symbol::Constant(value))
            }
            Definition::Block(block) => Ok(self.define_block(block)),
        }
    }

    fn define_block(&self, block: &Block) -> Symbol {
        let options = block
            .statements
            .iter()
            .filter_map(|stmt| match stmt {
                Stmt::Option(name, default, _) => Some((name.name.clone(), static_type(default))),
                _ => None,
            })
            .collect();
        let closure = Closure {
            body: Rc::new(block.clone()),
            source: self.source.clone(),
            base_url: self.base_url.clone(),
        };
        let builder: Builder = Rc::new(move |caller: &mut EvaluationContext<'_>| closure.invoke(caller));
        Symbol::Block(BlockType::custom(None, options), builder)
    }

    /// Statements of a closure body. An `option` binds its default unless
    /// the caller already supplied a value.
    fn evaluate_closure_body(&mut self, statements: &[Stmt]) -> EvalResult<()> {
        for stmt in statements {
            match stmt {
                Stmt::Option(name, default, span) => {
                    self.cursor = *span;
                    if !self.is_user_symbol(&name.name) {
                        let value = self.evaluate_expr(default)?;
                        self.define(name.name.clone(), Symbol::Constant(value));
                    }
                }
                other => self.evaluate_stmt(other)?,
            }
        }
        Ok(())
    }

    /// What a closure invocation evaluates to, given its accumulated children.
    fn closure_result(&mut self) -> Value {
        let transform = self.state.transform();
        let name = self.state.name.take();
        let mut children = std::mem::take(&mut self.state.children);

        if children.len() == 1 {
            match children.remove(0) {
                Value::Path(path) => {
                    let path = path.transformed(&transform);
                    return match name {
                        Some(name) => Value::Mesh(Geometry { name: Some(name), ..Geometry::path(path) }),
                        None => Value::Path(path),
                    };
                }
                Value::Mesh(geometry) => {
                    let mut geometry = geometry.transformed(&transform);
                    if name.is_some() {
                        geometry.name = name;
                    }
                    return Value::Mesh(geometry);
                }
                other => children.push(other),
            }
        }

        if name.is_none() && !children.is_empty() && children.iter().all(|c| matches!(c, Value::Path(_))) {
            return Value::Tuple(children.into_iter().map(|c| transformed(c, &transform)).collect());
        }

        let mut group = Geometry::new(GeometryKind::Group);
        group.name = name;
        group.transform = transform;
        group.material = self.state.material.clone();
        group.children = children
            .into_iter()
            .filter_map(|child| match child {
                Value::Mesh(geometry) => Some(geometry),
                Value::Path(path) => Some(Geometry::path(path)),
                _ => None,
            })
            .collect();
        Value::Mesh(group)
    }
}

// ─── Closures ────────────────────────────────────────────────────────────────

/// A user-defined block. It sees the symbols visible where it is used, not
/// where it was defined.
struct Closure {
    body: Rc<Block>,
    source: Rc<str>,
    base_url: Option<PathBuf>,
}

impl Closure {
    fn invoke(&self, caller: &mut EvaluationContext<'_>) -> EvalResult<Value> {
        let call_site = caller.cursor;
        let depth = caller.stack_depth + 1;
        tracing::trace!(depth, "invoking user block");
        if depth > MAX_RECURSION_DEPTH {
            return Err(caller.recursion_error(call_site));
        }

        let mut ctx = EvaluationContext::detached(caller.env, self.source.clone(), self.base_url.clone());
        ctx.stack_depth = depth;
        ctx.cursor = self.body.span;
        for (name, symbol) in caller.user_symbols() {
            ctx.define(name, symbol);
        }
        ctx.state.children = caller.state.children.clone();
        ctx.state.name = caller.state.name.clone();
        ctx.state.position = caller.state.position;
        ctx.state.orientation = caller.state.orientation;
        ctx.state.scale = caller.state.scale;
        ctx.state.material = caller.state.material.clone();
        ctx.state.detail = caller.state.detail;
        ctx.state.font = caller.state.font.clone();

        let result = ctx.evaluate_closure_body(&self.body.statements).map(|()| ctx.closure_result());
        match (result, &self.base_url) {
            (Err(EvalError::Runtime(error)), Some(url)) if caller.base_url.as_ref() != Some(url) => {
                Err(RuntimeError::new(
                    RuntimeErrorKind::ImportError {
                        error: Box::new(ImportError::Runtime(error)),
                        for_name: file_name(url),
                        source_text: self.source.clone(),
                    },
                    call_site,
                )
                .into())
            }
            (result, _) => result,
        }
    }
}

/// Option type implied by the shape of its default.
fn static_type(expr: &Expr) -> ValueType {
    match expr {
        Expr::Number(..) | Expr::Prefix { .. } | Expr::Infix { .. } => ValueType::Number,
        Expr::StringLit(..)          => ValueType::String,
        Expr::Color(..)              => ValueType::Color,
        Expr::Range { .. }           => ValueType::Range,
        Expr::Subexpression(inner, _) => static_type(inner),
        _ => ValueType::Tuple,
    }
}
