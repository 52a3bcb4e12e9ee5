pub mod syntax;
pub mod types;
pub mod runtime;
pub mod error;
pub mod suggest;
pub mod namespaces;

pub use error::{ImportError, LexerError, ParseError, ParserError, RuntimeError, RuntimeErrorKind};
pub use runtime::delegate::{DefaultDelegate, EvaluationDelegate};
pub use runtime::value::{Value, ValueType};
pub use syntax::ast::{Program, Span};
pub use syntax::parse;
pub use types::geometry::{Color, Geometry, GeometryKind, Material, MaterialProperty, Path, Texture, Transform, Vector};

use std::sync::Arc;

use error::EvalError;
use runtime::context::{EvaluationContext, Environment};

// ─── Public API types ─────────────────────────────────────────────────────────

/// Host-owned tessellation cache. The evaluator only carries it through to
/// the resulting [`Scene`].
#[derive(Debug, Default)]
pub struct GeometryCache {
    _private: (),
}

impl GeometryCache {
    pub fn new() -> Self { Self::default() }
}

/// The result of evaluating a program.
#[derive(Debug, Clone)]
pub struct Scene {
    pub background: Option<MaterialProperty>,
    pub children: Vec<Geometry>,
    pub cache: Option<Arc<GeometryCache>>,
}

// ─── Public API ───────────────────────────────────────────────────────────────

/// Evaluate `program` into a scene.
///
/// `is_cancelled` is polled once per loop iteration. When it reports true,
/// evaluation stops and the scene built so far is returned.
#[tracing::instrument(level = "debug", skip_all)]
pub fn evaluate(
    program: &Program,
    delegate: &dyn EvaluationDelegate,
    cache: Option<Arc<GeometryCache>>,
    is_cancelled: &dyn Fn() -> bool,
) -> Result<Scene, RuntimeError> {
    let env = Environment::new(delegate, is_cancelled);
    let mut ctx = EvaluationContext::root(&env, program.source.clone(), None);
    tracing::debug!(statements = program.statements.len(), "evaluation started");

    match ctx.evaluate_statements(&program.statements) {
        Ok(()) => {}
        Err(EvalError::Cancelled) => tracing::debug!("evaluation cancelled, returning partial scene"),
        Err(EvalError::Runtime(error)) => {
            tracing::debug!(%error, "evaluation failed");
            return Err(error);
        }
    }

    let children: Vec<Geometry> = ctx
        .state
        .children
        .into_iter()
        .filter_map(|child| match child {
            Value::Mesh(geometry) => Some(geometry),
            _ => None,
        })
        .collect();
    tracing::debug!(children = children.len(), "evaluation finished");
    Ok(Scene { background: ctx.state.background, children, cache })
}
