//! Scopes, symbols and child accumulation.
//!
//! Contexts form a tree through borrowed parent links. A child is owned by
//! the frame that pushed it and is gone when that frame returns, so the
//! parent is only ever read through the link.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::{EvalResult, RuntimeError, RuntimeErrorKind};
use crate::namespaces::NamespaceRegistry;
use crate::runtime::delegate::EvaluationDelegate;
use crate::runtime::value::{Value, ValueType};
use crate::syntax::ast::Span;
use crate::syntax::token::KEYWORDS;
use crate::types::geometry::{Geometry, Material, MaterialProperty, Transform, Vector};

/// Closure invocations and imports deeper than this fail.
pub const MAX_RECURSION_DEPTH: usize = 25;

/// Default curve subdivision count.
pub const DEFAULT_DETAIL: usize = 16;

// ─── Symbols ─────────────────────────────────────────────────────────────────

pub type CommandFn = fn(Value, &mut EvaluationContext<'_>) -> EvalResult<Value>;
pub type SetterFn = fn(Value, &mut EvaluationContext<'_>) -> EvalResult<()>;
pub type GetterFn = fn(&EvaluationContext<'_>) -> Value;
pub type Builder = Rc<dyn Fn(&mut EvaluationContext<'_>) -> EvalResult<Value>>;

#[derive(Clone)]
pub enum Symbol {
    Command(ValueType, CommandFn),
    Property(ValueType, SetterFn, GetterFn),
    Block(BlockType, Builder),
    Constant(Value),
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Command(ty, _)     => write!(f, "Command({ty:?})"),
            Symbol::Property(ty, _, _) => write!(f, "Property({ty:?})"),
            Symbol::Block(ty, _)       => write!(f, "Block({ty:?})"),
            Symbol::Constant(v)        => write!(f, "Constant({v:?})"),
        }
    }
}

// ─── Block types ─────────────────────────────────────────────────────────────

/// Which standard table a block exposes. `Global` is visible everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolTable {
    Global,
    Root,
    Primitive,
    Builder,
    Path,
    Definition,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockType {
    pub children: Vec<ValueType>,
    options: Vec<(String, ValueType)>,
    pub table: SymbolTable,
}

impl BlockType {
    pub fn new(children: Vec<ValueType>, table: SymbolTable) -> Self {
        Self { children, options: Vec::new(), table }
    }

    pub fn root() -> Self { Self::new(vec![ValueType::Mesh], SymbolTable::Root) }

    pub fn definition() -> Self {
        Self::new(vec![ValueType::Mesh, ValueType::Path], SymbolTable::Definition)
    }

    pub fn with_option(mut self, name: &str, ty: ValueType) -> Self {
        self.set_option(name.to_string(), ty);
        self
    }

    /// A user-defined type layered over `base`. Its options override the
    /// base's; without a base it takes no children.
    pub fn custom(base: Option<&BlockType>, options: Vec<(String, ValueType)>) -> Self {
        let mut ty = match base {
            Some(base) => base.clone(),
            None => Self::new(Vec::new(), SymbolTable::Primitive),
        };
        for (name, option) in options {
            ty.set_option(name, option);
        }
        ty
    }

    fn set_option(&mut self, name: String, ty: ValueType) {
        match self.options.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = ty,
            None => self.options.push((name, ty)),
        }
    }

    pub fn option(&self, name: &str) -> Option<ValueType> {
        self.options.iter().find(|(n, _)| n == name).map(|(_, ty)| *ty)
    }

    pub fn options(&self) -> impl Iterator<Item = (&str, ValueType)> {
        self.options.iter().map(|(n, ty)| (n.as_str(), *ty))
    }

    pub fn accepts(&self, ty: ValueType) -> bool { self.children.contains(&ty) }

    /// "mesh or path", for diagnostics.
    pub fn children_description(&self) -> String {
        let names: Vec<&str> = self.children.iter().map(|t| t.description()).collect();
        match names.as_slice() {
            [] => "nothing".into(),
            [only] => only.to_string(),
            [rest @ .., last] => format!("{} or {last}", rest.join(", ")),
        }
    }
}

// ─── Shared environment ──────────────────────────────────────────────────────

/// Everything fixed for one `evaluate` call.
pub struct Environment<'a> {
    pub delegate: &'a dyn EvaluationDelegate,
    pub is_cancelled: &'a dyn Fn() -> bool,
    pub library: NamespaceRegistry,
}

impl<'a> Environment<'a> {
    pub fn new(delegate: &'a dyn EvaluationDelegate, is_cancelled: &'a dyn Fn() -> bool) -> Self {
        Self { delegate, is_cancelled, library: NamespaceRegistry::standard() }
    }
}

// ─── Mutable state ───────────────────────────────────────────────────────────

/// The part of a context that statements mutate.
#[derive(Debug, Clone)]
pub struct State {
    pub children: Vec<Value>,
    /// Set by `translate`, `rotate` and `scale`; applied to later children.
    pub child_transform: Transform,
    pub position: Vector,
    pub orientation: Vector,
    pub scale: Vector,
    pub material: Material,
    pub detail: usize,
    pub name: Option<String>,
    pub background: Option<MaterialProperty>,
    pub font: Option<String>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            children: Vec::new(),
            child_transform: Transform::IDENTITY,
            position: Vector::ZERO,
            orientation: Vector::ZERO,
            scale: Vector::ONE,
            material: Material::default(),
            detail: DEFAULT_DETAIL,
            name: None,
            background: None,
            font: None,
        }
    }
}

impl State {
    /// Transform of the value this context builds.
    pub fn transform(&self) -> Transform {
        Transform::from_parts(self.position, self.orientation, self.scale)
    }
}

// ─── Context ─────────────────────────────────────────────────────────────────

pub struct EvaluationContext<'a> {
    pub env: &'a Environment<'a>,
    parent: Option<&'a EvaluationContext<'a>>,
    pub block_type: BlockType,
    symbols: HashMap<String, Symbol>,
    pub state: State,
    pub source: Rc<str>,
    /// Location of the file being evaluated, if it came from one.
    pub base_url: Option<PathBuf>,
    /// Range of the statement being evaluated.
    pub cursor: Span,
    pub stack_depth: usize,
}

impl<'a> EvaluationContext<'a> {
    pub fn root(env: &'a Environment<'a>, source: Rc<str>, base_url: Option<PathBuf>) -> Self {
        Self {
            env,
            parent: None,
            block_type: BlockType::root(),
            symbols: HashMap::new(),
            state: State::default(),
            source,
            base_url,
            cursor: Span::default(),
            stack_depth: 0,
        }
    }

    /// Parentless frame for a closure body. The caller copies in whatever
    /// the body may see.
    pub fn detached(env: &'a Environment<'a>, source: Rc<str>, base_url: Option<PathBuf>) -> Self {
        Self { block_type: BlockType::definition(), ..Self::root(env, source, base_url) }
    }

    fn child(&self, block_type: BlockType, state: State) -> EvaluationContext<'_> {
        EvaluationContext {
            env: self.env,
            parent: Some(self),
            block_type,
            symbols: HashMap::new(),
            state,
            source: self.source.clone(),
            base_url: self.base_url.clone(),
            cursor: self.cursor,
            stack_depth: self.stack_depth,
        }
    }

    /// Child for a block body. Material, detail and font carry over. Name
    /// and transforms start fresh, since the parent applies its own when
    /// the result is added back.
    pub fn push(&self, block_type: BlockType) -> EvaluationContext<'_> {
        let state = State {
            material: self.state.material.clone(),
            detail: self.state.detail,
            font: self.state.font.clone(),
            ..State::default()
        };
        self.child(block_type, state)
    }

    /// Run `body` in a child that owns this context's state for the
    /// duration. Bindings made in the child are dropped; state flows back.
    pub fn push_scope<T>(
        &mut self,
        body: impl FnOnce(&mut EvaluationContext<'_>) -> EvalResult<T>,
    ) -> EvalResult<T> {
        let state = std::mem::take(&mut self.state);
        let (result, state) = {
            let mut scope = self.child(self.block_type.clone(), state);
            let result = body(&mut scope);
            (result, scope.state)
        };
        self.state = state;
        result
    }

    /// Child for the right-hand side of a `define`, isolated from this
    /// context's children.
    pub fn push_definition(&self) -> EvaluationContext<'_> {
        self.push(BlockType::definition())
    }

    // ─── Symbols ─────────────────────────────────────────────────────────────

    pub fn define(&mut self, name: impl Into<String>, symbol: Symbol) {
        self.symbols.insert(name.into(), symbol);
    }

    /// Local table, then ancestors, then the block's standard table.
    pub fn symbol(&self, name: &str) -> Option<Symbol> {
        self.user_symbol(name)
            .or_else(|| self.env.library.lookup(self.block_type.table, name).cloned())
    }

    pub fn user_symbol(&self, name: &str) -> Option<Symbol> {
        match self.symbols.get(name) {
            Some(symbol) => Some(symbol.clone()),
            None => self.parent.and_then(|p| p.user_symbol(name)),
        }
    }

    /// A block option bound in this frame only.
    pub fn option_value(&self, name: &str) -> Option<Value> {
        match self.symbols.get(name) {
            Some(Symbol::Constant(value)) => Some(value.clone()),
            _ => None,
        }
    }

    pub fn is_user_symbol(&self, name: &str) -> bool {
        self.symbols.contains_key(name) || self.parent.is_some_and(|p| p.is_user_symbol(name))
    }

    /// Every user binding visible here, inner bindings shadowing outer ones.
    pub fn user_symbols(&self) -> HashMap<String, Symbol> {
        let mut all = self.parent.map(|p| p.user_symbols()).unwrap_or_default();
        all.extend(self.symbols.iter().map(|(k, v)| (k.clone(), v.clone())));
        all
    }

    /// Candidate names for "did you mean" hints.
    pub fn symbol_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.user_symbols().into_keys().collect();
        names.extend(self.env.library.names(self.block_type.table).map(str::to_string));
        names.extend(KEYWORDS.iter().map(|k| k.to_string()));
        names.sort();
        names.dedup();
        names
    }

    // ─── Children ────────────────────────────────────────────────────────────

    /// Accept `value` as a child of this block, or fail with "unused value".
    pub fn add_value(&mut self, value: Value) -> Result<(), RuntimeError> {
        let ty = value.value_type();
        if self.block_type.accepts(ty) {
            let value = transformed(value.unwrapped(), &self.state.child_transform);
            self.state.children.push(value);
            return Ok(());
        }
        match value.unwrapped() {
            Value::Path(path) if self.block_type.accepts(ValueType::Mesh) => {
                let mesh = Geometry::path(path).transformed(&self.state.child_transform);
                self.state.children.push(Value::Mesh(mesh));
                Ok(())
            }
            Value::Tuple(values) => values.into_iter().try_for_each(|v| self.add_value(v)),
            _ => Err(self.error(RuntimeErrorKind::UnusedValue { type_name: ty.description().into() })),
        }
    }

    // ─── Helpers ─────────────────────────────────────────────────────────────

    pub fn delegate(&self) -> &'a dyn EvaluationDelegate { self.env.delegate }

    pub fn is_cancelled(&self) -> bool { (self.env.is_cancelled)() }

    /// Error anchored at the current statement.
    pub fn error(&self, kind: RuntimeErrorKind) -> RuntimeError {
        RuntimeError::new(kind, self.cursor)
    }

    /// Relative paths resolve next to the file being evaluated.
    pub fn resolve_url(&self, path: &str) -> PathBuf {
        match self.base_url.as_deref().and_then(Path::parent) {
            Some(dir) if Path::new(path).is_relative() => dir.join(path),
            _ => self.delegate().resolve_url(path),
        }
    }
}

/// Apply `t` to the kinds of value that have a position in space.
pub fn transformed(value: Value, t: &Transform) -> Value {
    if t.is_identity() { return value; }
    match value {
        Value::Mesh(g)   => Value::Mesh(g.transformed(t)),
        Value::Vector(v) => Value::Vector(t.apply(v)),
        Value::Point(p)  => Value::Point(p.transformed(t)),
        Value::Path(p)   => Value::Path(p.transformed(t)),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::delegate::DefaultDelegate;
    use crate::types::geometry::{GeometryKind, Path as GeoPath};

    fn never() -> bool { false }

    #[test]
    fn custom_block_options_override_base() {
        let base = BlockType::new(vec![ValueType::Path], SymbolTable::Builder)
            .with_option("along", ValueType::Paths);
        let custom = BlockType::custom(Some(&base), vec![
            ("along".into(), ValueType::Number),
            ("twist".into(), ValueType::Number),
        ]);
        assert_eq!(custom.option("along"), Some(ValueType::Number));
        assert_eq!(custom.option("twist"), Some(ValueType::Number));
        assert!(custom.accepts(ValueType::Path));
        assert!(BlockType::custom(None, vec![]).children.is_empty());
    }

    #[test]
    fn lookup_walks_parents_then_tables() {
        let delegate = DefaultDelegate::new();
        let env = Environment::new(&delegate, &never);
        let mut root = EvaluationContext::root(&env, "".into(), None);
        root.define("width", Symbol::Constant(Value::Number(2.0)));
        let child = root.push(BlockType::new(vec![], SymbolTable::Primitive));
        assert!(matches!(child.symbol("width"), Some(Symbol::Constant(Value::Number(n))) if n == 2.0));
        assert!(matches!(child.symbol("position"), Some(Symbol::Property(..))));
        assert!(root.symbol("position").is_none());
        assert!(child.symbol("cube").is_some());
    }

    #[test]
    fn scoped_bindings_are_dropped_but_state_flows_back() {
        let delegate = DefaultDelegate::new();
        let env = Environment::new(&delegate, &never);
        let mut root = EvaluationContext::root(&env, "".into(), None);
        root.push_scope(|scope| {
            scope.define("i", Symbol::Constant(Value::Number(1.0)));
            scope.add_value(Value::Mesh(Geometry::new(GeometryKind::Cube)))?;
            Ok(())
        }).unwrap();
        assert!(root.user_symbol("i").is_none());
        assert_eq!(root.state.children.len(), 1);
    }

    #[test]
    fn add_value_filters_and_promotes() {
        let delegate = DefaultDelegate::new();
        let env = Environment::new(&delegate, &never);
        let mut root = EvaluationContext::root(&env, "".into(), None);
        root.add_value(Value::Path(GeoPath::square())).unwrap();
        assert!(matches!(&root.state.children[0], Value::Mesh(g) if matches!(g.kind, GeometryKind::Path(_))));
        root.add_value(Value::VOID).unwrap();
        let err = root.add_value(Value::Number(1.0)).unwrap_err();
        assert_eq!(err.kind, RuntimeErrorKind::UnusedValue { type_name: "number".into() });
    }

    #[test]
    fn children_are_transformed_on_insert() {
        let delegate = DefaultDelegate::new();
        let env = Environment::new(&delegate, &never);
        let mut ctx = EvaluationContext::root(&env, "".into(), None);
        ctx.block_type = BlockType::new(vec![ValueType::Point], SymbolTable::Path);
        ctx.state.child_transform = Transform::translation(Vector::new(1.0, 0.0, 0.0));
        ctx.add_value(Value::Point(crate::types::geometry::PathPoint::point(Vector::ZERO))).unwrap();
        assert!(matches!(&ctx.state.children[0], Value::Point(p) if p.position == Vector::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn children_description() {
        assert_eq!(BlockType::definition().children_description(), "mesh or path");
        assert_eq!(BlockType::custom(None, vec![]).children_description(), "nothing");
    }
}
