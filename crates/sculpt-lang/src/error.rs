use std::path::PathBuf;
use std::rc::Rc;

use thiserror::Error;

use crate::runtime::value::ordinal;
use crate::suggest;
use crate::syntax::ast::Span;

// ─── Lexer ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexerErrorKind {
    #[error("Unexpected character '{0}'")]
    UnexpectedCharacter(char),
    #[error("Unterminated string literal")]
    UnterminatedString,
    #[error("Invalid escape sequence '\\{0}'")]
    InvalidEscape(char),
    #[error("Invalid color literal '#{0}'")]
    InvalidColor(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}")]
pub struct LexerError {
    pub kind: LexerErrorKind,
    pub span: Span,
}

impl LexerError {
    pub fn new(kind: LexerErrorKind, span: Span) -> Self { Self { kind, span } }

    pub fn hint(&self) -> Option<String> {
        match &self.kind {
            LexerErrorKind::UnexpectedCharacter(_) => None,
            LexerErrorKind::UnterminatedString => {
                Some("Try adding a closing \" (double quote) at the end of the line.".into())
            }
            LexerErrorKind::InvalidEscape(_) => {
                Some("Supported escape sequences are \\\", \\\\, \\n and \\t.".into())
            }
            LexerErrorKind::InvalidColor(_) => {
                Some("Hex colors must have 3, 4, 6 or 8 hexadecimal digits.".into())
            }
        }
    }
}

// ─── Parser ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParserErrorKind {
    #[error("Unexpected {found}")]
    UnexpectedToken { found: String, expected: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}")]
pub struct ParserError {
    pub kind: ParserErrorKind,
    pub span: Span,
}

impl ParserError {
    pub fn new(kind: ParserErrorKind, span: Span) -> Self { Self { kind, span } }

    pub fn hint(&self) -> Option<String> {
        match &self.kind {
            ParserErrorKind::UnexpectedToken { expected: Some(e), .. } => Some(format!("Expected {e}.")),
            ParserErrorKind::UnexpectedToken { expected: None, .. } => None,
        }
    }
}

/// Either front-end failure, as returned by `parse`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Lexer(#[from] LexerError),
    #[error(transparent)]
    Parser(#[from] ParserError),
}

impl ParseError {
    pub fn hint(&self) -> Option<String> {
        match self {
            ParseError::Lexer(e)  => e.hint(),
            ParseError::Parser(e) => e.hint(),
        }
    }

    pub fn span(&self) -> Span {
        match self {
            ParseError::Lexer(e)  => e.span,
            ParseError::Parser(e) => e.span,
        }
    }
}

// ─── Runtime ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeErrorKind {
    #[error("{}", unknown_symbol_message(.name))]
    UnknownSymbol { name: String, options: Vec<String> },

    #[error("Unknown {of} member property '{name}'")]
    UnknownMember { name: String, of: String, options: Vec<String> },

    #[error("{}", unknown_font_message(.name))]
    UnknownFont { name: String, options: Vec<String> },

    #[error("Type mismatch")]
    TypeMismatch { for_name: String, index: usize, expected: String, got: String },

    #[error("Unexpected argument")]
    UnexpectedArgument { for_name: String, max: usize },

    #[error("Missing argument")]
    MissingArgument { for_name: String, index: usize, expected: String },

    #[error("Unused value")]
    UnusedValue { type_name: String },

    #[error("Assertion failure: {0}")]
    AssertionFailure(String),

    #[error("File not found")]
    FileNotFound { for_name: String, path: Option<PathBuf> },

    #[error("Unable to access file")]
    FileAccessRestricted { for_name: String, path: PathBuf },

    #[error("Unsupported file type")]
    FileTypeMismatch { for_name: String, path: PathBuf, expected: Option<String> },

    #[error("Unable to parse file")]
    FileParsingError { for_name: String, path: PathBuf, message: String },

    #[error("{}", import_message(.error, .for_name))]
    ImportError { error: Box<ImportError>, for_name: String, source_text: Rc<str> },
}

fn unknown_symbol_message(name: &str) -> String {
    if crate::syntax::token::KEYWORDS.contains(&name) {
        format!("Unexpected keyword '{name}'")
    } else {
        format!("Unknown symbol '{name}'")
    }
}

fn unknown_font_message(name: &str) -> String {
    if name.is_empty() { "Font name cannot be blank".into() } else { format!("Unknown font '{name}'") }
}

fn import_message(error: &ImportError, for_name: &str) -> String {
    match error {
        ImportError::Runtime(RuntimeError { kind: RuntimeErrorKind::ImportError { .. }, .. }) => error.to_string(),
        _ => format!("Error in imported file '{for_name}': {error}"),
    }
}

fn the_argument(index: usize) -> String {
    if index == 0 { "The argument".into() } else { format!("The {} argument", ordinal(index)) }
}

/// Prefixes a type description with "a" or "an".
fn article(description: &str) -> String {
    match description.chars().next() {
        Some('a' | 'e' | 'i' | 'o' | 'u') => format!("an {description}"),
        _ => format!("a {description}"),
    }
}

fn did_you_mean(suggestion: Option<String>) -> Option<String> {
    suggestion.map(|s| format!("Did you mean '{s}'?"))
}

impl RuntimeErrorKind {
    pub fn suggestion(&self) -> Option<String> {
        match self {
            RuntimeErrorKind::UnknownSymbol { name, options }
            | RuntimeErrorKind::UnknownMember { name, options, .. } => suggest::best_match(name, options),
            RuntimeErrorKind::UnknownFont { name, options } if !name.is_empty() => {
                suggest::best_match(name, options)
            }
            RuntimeErrorKind::ImportError { error, .. } => error.suggestion(),
            _ => None,
        }
    }

    pub fn hint(&self) -> Option<String> {
        match self {
            RuntimeErrorKind::UnknownSymbol { name, .. } if name == "option" => {
                Some("Options can only be declared inside a block definition.".into())
            }
            RuntimeErrorKind::UnknownSymbol { .. } | RuntimeErrorKind::UnknownMember { .. } => {
                did_you_mean(self.suggestion())
            }
            RuntimeErrorKind::UnknownFont { name, .. } if name.is_empty() => {
                Some("Set the font to the name of an installed font.".into())
            }
            RuntimeErrorKind::UnknownFont { .. } => did_you_mean(self.suggestion()),
            RuntimeErrorKind::TypeMismatch { for_name, index, expected, got } => Some(format!(
                "{} for {for_name} should be {}, not {}.",
                the_argument(*index), article(expected), article(got),
            )),
            RuntimeErrorKind::UnexpectedArgument { for_name, max: 0 } => {
                Some(format!("The {for_name} command does not expect any arguments."))
            }
            RuntimeErrorKind::UnexpectedArgument { for_name, max: 1 } => {
                Some(format!("The {for_name} command expects only a single argument."))
            }
            RuntimeErrorKind::UnexpectedArgument { for_name, max } => {
                Some(format!("The {for_name} command expects a maximum of {max} arguments."))
            }
            RuntimeErrorKind::MissingArgument { for_name, index: 0, expected } => {
                Some(format!("The {for_name} command expects {} argument.", article(expected)))
            }
            RuntimeErrorKind::MissingArgument { for_name, index, expected } => Some(format!(
                "The {for_name} command expects {} as its {} argument.",
                article(expected), ordinal(*index),
            )),
            RuntimeErrorKind::UnusedValue { type_name } => {
                Some(format!("{} value was not expected in this context.", capitalized(&article(type_name))))
            }
            RuntimeErrorKind::AssertionFailure(_) => None,
            RuntimeErrorKind::FileNotFound { for_name, path: Some(path) } => Some(format!(
                "Check that the file '{for_name}' exists and is located at {}.", path.display(),
            )),
            RuntimeErrorKind::FileNotFound { for_name, path: None } => {
                Some(format!("Check that the file '{for_name}' exists."))
            }
            RuntimeErrorKind::FileAccessRestricted { for_name, .. } => {
                Some(format!("The file '{for_name}' could not be read. Check its permissions."))
            }
            RuntimeErrorKind::FileTypeMismatch { for_name, expected: Some(e), .. } => {
                Some(format!("The file '{for_name}' should be {}.", article(e)))
            }
            RuntimeErrorKind::FileTypeMismatch { for_name, expected: None, .. } => {
                Some(format!("The type of the file '{for_name}' is not supported."))
            }
            RuntimeErrorKind::FileParsingError { message, .. } => Some(punctuated(message)),
            RuntimeErrorKind::ImportError { error, .. } => error.hint(),
        }
    }
}

fn capitalized(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Hints always end in terminal punctuation.
fn punctuated(s: &str) -> String {
    match s.trim_end().chars().last() {
        Some('.' | '?' | '!') => s.trim_end().to_string(),
        _ => format!("{}.", s.trim_end()),
    }
}

/// A structured evaluation failure anchored to a source range.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}")]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub span: Span,
}

impl RuntimeError {
    pub fn new(kind: RuntimeErrorKind, span: Span) -> Self { Self { kind, span } }

    pub fn message(&self) -> String { self.kind.to_string() }

    pub fn hint(&self) -> Option<String> { self.kind.hint().map(|h| punctuated(&h)) }

    pub fn suggestion(&self) -> Option<String> { self.kind.suggestion() }

    pub fn span(&self) -> Span { self.span }
}

// ─── Imports ─────────────────────────────────────────────────────────────────

/// A failure raised while lexing, parsing or evaluating another file.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ImportError {
    #[error(transparent)]
    Lexer(LexerError),
    #[error(transparent)]
    Parser(ParserError),
    #[error(transparent)]
    Runtime(RuntimeError),
}

impl ImportError {
    pub fn hint(&self) -> Option<String> {
        match self {
            ImportError::Lexer(e)   => e.hint(),
            ImportError::Parser(e)  => e.hint(),
            ImportError::Runtime(e) => e.hint(),
        }
    }

    pub fn suggestion(&self) -> Option<String> {
        match self {
            ImportError::Runtime(e) => e.suggestion(),
            _ => None,
        }
    }

    /// Range within the imported file's source text.
    pub fn span(&self) -> Span {
        match self {
            ImportError::Lexer(e)   => e.span,
            ImportError::Parser(e)  => e.span,
            ImportError::Runtime(e) => e.span,
        }
    }
}

impl From<ParseError> for ImportError {
    fn from(e: ParseError) -> Self {
        match e {
            ParseError::Lexer(e)  => ImportError::Lexer(e),
            ParseError::Parser(e) => ImportError::Parser(e),
        }
    }
}

// ─── Internal control flow ───────────────────────────────────────────────────

/// What the evaluator threads internally. `Cancelled` never escapes `evaluate`.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    Runtime(RuntimeError),
    Cancelled,
}

impl From<RuntimeError> for EvalError {
    fn from(e: RuntimeError) -> Self { EvalError::Runtime(e) }
}

pub type EvalResult<T> = Result<T, EvalError>;
