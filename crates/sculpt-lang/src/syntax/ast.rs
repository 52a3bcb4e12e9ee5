use std::rc::Rc;

use crate::types::geometry::Color;

/// Half-open byte range into the program source, attached to every node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Zero-width span at `pos`.
    pub fn empty_at(pos: usize) -> Self {
        Self { start: pos, end: pos }
    }

    /// The zero-width span immediately following this one.
    pub fn after(self) -> Self {
        Self::empty_at(self.end)
    }

    pub fn merge(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }

    pub fn is_empty(&self) -> bool { self.start == self.end }
}

// ─── Top level ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Program {
    pub source: Rc<str>,
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub span: Span,
}

/// Right-hand side of `define`.
#[derive(Debug, Clone, PartialEq)]
pub enum Definition {
    Expression(Expr),
    Block(Block),
}

// ─── Statements ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `cube`, `size 1 2 3`, `translate x 0 0`
    Command(Identifier, Option<Expr>, Span),
    /// `cube { ... }`
    Block(Identifier, Block, Span),
    /// `define wheel { ... }` or `define width 3`
    Define(Identifier, Definition, Span),
    /// `option radius 1`: only meaningful inside a block definition.
    Option(Identifier, Expr, Span),
    /// `for i in 1 to 5 { ... }` or `for 1 to 5 { ... }`
    ForLoop {
        index: Option<Identifier>,
        range: Expr,
        body: Block,
        span: Span,
    },
    /// `import "file.shape"`
    Import(Expr, Span),
    /// A standalone expression used as a statement.
    Expr(Expr),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Command(_, _, s)      => *s,
            Stmt::Block(_, _, s)        => *s,
            Stmt::Define(_, _, s)       => *s,
            Stmt::Option(_, _, s)       => *s,
            Stmt::ForLoop { span, .. }  => *span,
            Stmt::Import(_, s)          => *s,
            Stmt::Expr(e)               => e.span(),
        }
    }
}

// ─── Expressions ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64, Span),
    StringLit(String, Span),
    Color(Color, Span),
    Ident(String, Span),

    /// `sphere { detail 32 }` used as a value.
    Block(Identifier, Block, Span),

    /// Juxtaposed values: `1 2 3`
    Tuple(Vec<Expr>, Span),

    /// `-x`, `+x`
    Prefix {
        op: PrefixOp,
        operand: Box<Expr>,
        span: Span,
    },

    /// `a + b`, `a * b`, etc.
    Infix {
        left: Box<Expr>,
        op: InfixOp,
        right: Box<Expr>,
        span: Span,
    },

    /// `from to to [step step]`
    Range {
        from: Box<Expr>,
        to: Box<Expr>,
        step: Option<Box<Expr>>,
        span: Span,
    },

    /// `expr.name`
    Member {
        expr: Box<Expr>,
        member: Identifier,
        span: Span,
    },

    /// `( expr )`
    Subexpression(Box<Expr>, Span),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Number(_, s)          => *s,
            Expr::StringLit(_, s)       => *s,
            Expr::Color(_, s)           => *s,
            Expr::Ident(_, s)           => *s,
            Expr::Block(_, _, s)        => *s,
            Expr::Tuple(_, s)           => *s,
            Expr::Prefix { span, .. }   => *span,
            Expr::Infix { span, .. }    => *span,
            Expr::Range { span, .. }    => *span,
            Expr::Member { span, .. }   => *span,
            Expr::Subexpression(_, s)   => *s,
        }
    }
}

// ─── Operators ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOp {
    Minus,
    Plus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixOp {
    Add, Sub, Mul, Div,
}

impl PrefixOp {
    pub fn as_str(self) -> &'static str {
        match self {
            PrefixOp::Minus => "-",
            PrefixOp::Plus  => "+",
        }
    }
}

impl InfixOp {
    pub fn as_str(self) -> &'static str {
        match self {
            InfixOp::Add => "+",
            InfixOp::Sub => "-",
            InfixOp::Mul => "*",
            InfixOp::Div => "/",
        }
    }
}
