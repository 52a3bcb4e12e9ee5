pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;

use crate::error::ParseError;
use ast::Program;
use lexer::Lexer;
use parser::Parser;

/// Lex and parse `source` into a program ready for evaluation.
pub fn parse(source: &str) -> Result<Program, ParseError> {
    let tokens = Lexer::new(source).tokenize()?;
    let statements = Parser::new(tokens).parse()?;
    Ok(Program { source: source.into(), statements })
}
