//! Standard symbol tables. Each namespace contributes symbols to one or more
//! [`SymbolTable`]s; the registry merges them at startup.

use std::collections::HashMap;

use crate::error::{RuntimeError, RuntimeErrorKind};
use crate::runtime::context::{EvaluationContext, Symbol, SymbolTable};
use crate::runtime::value::{Value, ValueType};
use crate::types::geometry::Vector;

pub mod coords;
pub mod core;
pub mod render;
pub mod shapes;

pub const TABLES: [SymbolTable; 6] = [
    SymbolTable::Global,
    SymbolTable::Root,
    SymbolTable::Primitive,
    SymbolTable::Builder,
    SymbolTable::Path,
    SymbolTable::Definition,
];

// ─── Provider interface ──────────────────────────────────────────────────────

pub trait Namespace {
    fn name(&self) -> &'static str;

    /// Symbols this namespace adds to `table`.
    fn symbols(&self, table: SymbolTable) -> Vec<(&'static str, Symbol)>;
}

// ─── Registry ────────────────────────────────────────────────────────────────

pub struct NamespaceRegistry {
    tables: HashMap<SymbolTable, HashMap<&'static str, Symbol>>,
}

impl NamespaceRegistry {
    pub fn new() -> Self { Self { tables: HashMap::new() } }

    pub fn register(&mut self, namespace: Box<dyn Namespace>) {
        for table in TABLES {
            let symbols = namespace.symbols(table);
            if symbols.is_empty() { continue; }
            tracing::trace!(namespace = namespace.name(), ?table, count = symbols.len(), "registering symbols");
            self.tables.entry(table).or_default().extend(symbols);
        }
    }

    /// `name` in `table`, falling back to the global table.
    pub fn lookup(&self, table: SymbolTable, name: &str) -> Option<&Symbol> {
        self.get(table, name).or_else(|| self.get(SymbolTable::Global, name))
    }

    fn get(&self, table: SymbolTable, name: &str) -> Option<&Symbol> {
        self.tables.get(&table).and_then(|t| t.get(name))
    }

    /// Every name visible from `table`.
    pub fn names(&self, table: SymbolTable) -> impl Iterator<Item = &str> {
        let global = self.tables.get(&SymbolTable::Global);
        let local = (table != SymbolTable::Global).then(|| self.tables.get(&table)).flatten();
        global.into_iter().chain(local).flat_map(|t| t.keys().copied())
    }

    pub fn standard() -> Self {
        let mut r = Self::new();
        r.register(Box::new(core::CoreNamespace));
        r.register(Box::new(shapes::ShapesNamespace));
        r.register(Box::new(render::RenderNamespace));
        r.register(Box::new(coords::CoordsNamespace));
        r
    }
}

impl Default for NamespaceRegistry {
    fn default() -> Self { Self::standard() }
}

// ─── Shared helpers ──────────────────────────────────────────────────────────

// Arguments arrive already coerced; these only fail on a mis-declared symbol.

fn mismatch(ctx: &EvaluationContext<'_>, name: &str, expected: ValueType, got: &Value) -> RuntimeError {
    ctx.error(RuntimeErrorKind::TypeMismatch {
        for_name: name.into(),
        index: 0,
        expected: expected.description().into(),
        got: got.value_type().description().into(),
    })
}

pub(crate) fn as_number(v: &Value, name: &str, ctx: &EvaluationContext<'_>) -> Result<f64, RuntimeError> {
    v.as_number().ok_or_else(|| mismatch(ctx, name, ValueType::Number, v))
}

pub(crate) fn as_vector(v: &Value, name: &str, ctx: &EvaluationContext<'_>) -> Result<Vector, RuntimeError> {
    match v.unwrapped_ref() {
        Value::Vector(v) | Value::Size(v) => Ok(*v),
        other => Err(mismatch(ctx, name, ValueType::Vector, other)),
    }
}

pub(crate) fn as_pair(v: &Value, name: &str, ctx: &EvaluationContext<'_>) -> Result<(f64, f64), RuntimeError> {
    match v {
        Value::Tuple(values) => match values.as_slice() {
            [a, b] => Ok((as_number(a, name, ctx)?, as_number(b, name, ctx)?)),
            _ => Err(mismatch(ctx, name, ValueType::Pair, v)),
        },
        other => Err(mismatch(ctx, name, ValueType::Pair, other)),
    }
}

pub(crate) fn as_string(v: &Value, name: &str, ctx: &EvaluationContext<'_>) -> Result<String, RuntimeError> {
    match v.unwrapped_ref() {
        Value::String(s) => Ok(s.clone().unwrap_or_default()),
        other => Err(mismatch(ctx, name, ValueType::String, other)),
    }
}
