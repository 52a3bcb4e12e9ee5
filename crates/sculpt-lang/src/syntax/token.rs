use crate::syntax::ast::Span;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Number(f64),
    Ident(String),
    StringLit(String),
    HexColor(String), // digits only: "f00", "ff0000" or "ff000080"

    // Keywords
    Define,
    Option,
    For,
    In,
    Import,
    To,
    Step,

    // Operators
    Plus,   // +
    Minus,  // -
    Star,   // *
    Slash,  // /

    // Punctuation
    Dot,    // .
    LParen, // (
    RParen, // )
    LBrace, // {
    RBrace, // }

    Linebreak,
    Eof,
}

/// Reserved words, in the order they are suggested.
pub const KEYWORDS: &[&str] = &["define", "option", "for", "in", "import", "to", "step"];

impl TokenKind {
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            Self::Define | Self::Option | Self::For | Self::In | Self::Import | Self::To | Self::Step
        )
    }

    /// Human-readable form used in parser diagnostics.
    pub fn description(&self) -> String {
        match self {
            Self::Number(n)    => format!("numeric literal {n}"),
            Self::Ident(s)     => format!("identifier '{s}'"),
            Self::StringLit(_) => "string literal".into(),
            Self::HexColor(s)  => format!("color literal #{s}"),
            Self::Define       => "keyword 'define'".into(),
            Self::Option       => "keyword 'option'".into(),
            Self::For          => "keyword 'for'".into(),
            Self::In           => "keyword 'in'".into(),
            Self::Import       => "keyword 'import'".into(),
            Self::To           => "keyword 'to'".into(),
            Self::Step         => "keyword 'step'".into(),
            Self::Plus         => "operator '+'".into(),
            Self::Minus        => "operator '-'".into(),
            Self::Star         => "operator '*'".into(),
            Self::Slash        => "operator '/'".into(),
            Self::Dot          => "'.'".into(),
            Self::LParen       => "'('".into(),
            Self::RParen       => "')'".into(),
            Self::LBrace       => "'{'".into(),
            Self::RBrace       => "'}'".into(),
            Self::Linebreak    => "end of line".into(),
            Self::Eof          => "end of file".into(),
        }
    }
}

/// Maps an identifier string to its keyword token, or returns `Ident`.
pub fn keyword_or_ident(s: String) -> TokenKind {
    match s.as_str() {
        "define" => TokenKind::Define,
        "option" => TokenKind::Option,
        "for"    => TokenKind::For,
        "in"     => TokenKind::In,
        "import" => TokenKind::Import,
        "to"     => TokenKind::To,
        "step"   => TokenKind::Step,
        _        => TokenKind::Ident(s),
    }
}

// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    /// Whitespace (or start of input) immediately precedes this token.
    /// Distinguishes `1 -2` (two values) from `1 - 2` (subtraction).
    pub space_before: bool,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span, space_before: bool) -> Self {
        Self { kind, span, space_before }
    }
}
