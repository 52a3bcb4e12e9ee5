use crate::error::{ParserError, ParserErrorKind};
use crate::syntax::ast::*;
use crate::syntax::token::{Token, TokenKind};
use crate::types::geometry::Color;

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Span of the most recently consumed token.
    last: Span,
    /// Inside `( ... )` newlines are not statement terminators.
    paren_depth: usize,
    /// Cleared while parsing a `for` range, where `{` opens the loop body.
    allow_block: bool,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0, last: Span::default(), paren_depth: 0, allow_block: true }
    }

    pub fn parse(mut self) -> Result<Vec<Stmt>, ParserError> {
        let statements = self.parse_statements()?;
        if !self.is_at_end() {
            return Err(self.unexpected("statement"));
        }
        Ok(statements)
    }

    // ─── Statements ──────────────────────────────────────────────────────────

    fn parse_statements(&mut self) -> Result<Vec<Stmt>, ParserError> {
        let mut statements = Vec::new();
        loop {
            while self.matches(&TokenKind::Linebreak) {}
            if self.is_at_end() || self.check(&TokenKind::RBrace) { break; }

            statements.push(self.parse_stmt()?);

            match self.peek_kind() {
                TokenKind::Linebreak => { self.advance(); }
                TokenKind::Eof | TokenKind::RBrace => {}
                _ => return Err(self.unexpected("end of line")),
            }
        }
        Ok(statements)
    }

    fn parse_block(&mut self) -> Result<Block, ParserError> {
        let open = self.expect(&TokenKind::LBrace, "'{'")?;
        let (depth, allow) = (self.paren_depth, self.allow_block);
        self.paren_depth = 0;
        self.allow_block = true;
        let statements = self.parse_statements()?;
        let close = self.expect(&TokenKind::RBrace, "'}'")?;
        self.paren_depth = depth;
        self.allow_block = allow;
        Ok(Block { statements, span: open.span.merge(close.span) })
    }

    fn parse_stmt(&mut self) -> Result<Stmt, ParserError> {
        let start = self.peek().span;
        match self.peek_kind().clone() {
            TokenKind::Define => {
                self.advance();
                let name = self.expect_ident()?;
                let definition = if self.check(&TokenKind::LBrace) {
                    Definition::Block(self.parse_block()?)
                } else {
                    Definition::Expression(self.parse_expression()?)
                };
                Ok(Stmt::Define(name, definition, start.merge(self.last)))
            }
            TokenKind::Option => {
                self.advance();
                let name = self.expect_ident()?;
                let value = self.parse_expression()?;
                Ok(Stmt::Option(name, value, start.merge(self.last)))
            }
            TokenKind::For => self.parse_for(),
            TokenKind::Import => {
                self.advance();
                let path = self.parse_expression()?;
                Ok(Stmt::Import(path, start.merge(self.last)))
            }
            TokenKind::Ident(_) => self.parse_command(),
            _ => Ok(Stmt::Expr(self.parse_expression()?)),
        }
    }

    /// A statement starting with an identifier: block, command, or expression.
    fn parse_command(&mut self) -> Result<Stmt, ParserError> {
        let next = self.pos + 1;
        let next_kind = self.tokens[next].kind.clone();
        match next_kind {
            TokenKind::LBrace => {
                let name = self.expect_ident()?;
                let body = self.parse_block()?;
                let span = name.span.merge(body.span);
                Ok(Stmt::Block(name, body, span))
            }
            TokenKind::Linebreak | TokenKind::Eof | TokenKind::RBrace => {
                let name = self.expect_ident()?;
                let span = name.span;
                Ok(Stmt::Command(name, None, span))
            }
            TokenKind::Dot | TokenKind::Star | TokenKind::Slash | TokenKind::To | TokenKind::Step => {
                Ok(Stmt::Expr(self.parse_expression()?))
            }
            TokenKind::Plus | TokenKind::Minus if !self.is_prefix_at(next) => {
                Ok(Stmt::Expr(self.parse_expression()?))
            }
            _ => {
                let name = self.expect_ident()?;
                let arg = self.parse_expression()?;
                let span = name.span.merge(arg.span());
                Ok(Stmt::Command(name, Some(arg), span))
            }
        }
    }

    fn parse_for(&mut self) -> Result<Stmt, ParserError> {
        let start = self.advance().span;
        let named = matches!(self.tokens[self.pos].kind, TokenKind::Ident(_))
            && self.tokens.get(self.pos + 1).is_some_and(|t| t.kind == TokenKind::In);
        let index = if named {
            let name = self.expect_ident()?;
            self.advance();
            Some(name)
        } else {
            None
        };
        let allow = self.allow_block;
        self.allow_block = false;
        let range = self.parse_expression();
        self.allow_block = allow;
        let range = range?;
        let body = self.parse_block()?;
        let span = start.merge(body.span);
        Ok(Stmt::ForLoop { index, range, body, span })
    }

    // ─── Expressions (precedence climbing) ───────────────────────────────────

    /// Juxtaposed range expressions form a tuple: `1 2 3`.
    pub fn parse_expression(&mut self) -> Result<Expr, ParserError> {
        let first = self.parse_range()?;
        if !self.starts_operand() {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.starts_operand() {
            items.push(self.parse_range()?);
        }
        let span = items[0].span().merge(self.last);
        Ok(Expr::Tuple(items, span))
    }

    fn parse_range(&mut self) -> Result<Expr, ParserError> {
        let from = self.parse_sum()?;
        if !self.matches(&TokenKind::To) {
            return Ok(from);
        }
        let to = self.parse_sum()?;
        let step = if self.matches(&TokenKind::Step) { Some(Box::new(self.parse_sum()?)) } else { None };
        let span = from.span().merge(self.last);
        Ok(Expr::Range { from: Box::new(from), to: Box::new(to), step, span })
    }

    fn parse_sum(&mut self) -> Result<Expr, ParserError> {
        let mut left = self.parse_product()?;
        loop {
            let i = self.index();
            let op = match self.tokens[i].kind {
                TokenKind::Plus  if !self.is_prefix_at(i) => InfixOp::Add,
                TokenKind::Minus if !self.is_prefix_at(i) => InfixOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_product()?;
            let span = left.span().merge(right.span());
            left = Expr::Infix { left: Box::new(left), op, right: Box::new(right), span };
        }
        Ok(left)
    }

    fn parse_product(&mut self) -> Result<Expr, ParserError> {
        let mut left = self.parse_prefix()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star  => InfixOp::Mul,
                TokenKind::Slash => InfixOp::Div,
                _ => break,
            };
            self.advance();
            let right = self.parse_prefix()?;
            let span = left.span().merge(right.span());
            left = Expr::Infix { left: Box::new(left), op, right: Box::new(right), span };
        }
        Ok(left)
    }

    fn parse_prefix(&mut self) -> Result<Expr, ParserError> {
        let op = match self.peek_kind() {
            TokenKind::Minus => PrefixOp::Minus,
            TokenKind::Plus  => PrefixOp::Plus,
            _ => return self.parse_postfix(),
        };
        let start = self.advance().span;
        let operand = self.parse_prefix()?;
        let span = start.merge(operand.span());
        Ok(Expr::Prefix { op, operand: Box::new(operand), span })
    }

    fn parse_postfix(&mut self) -> Result<Expr, ParserError> {
        let mut expr = self.parse_primary()?;
        while self.matches(&TokenKind::Dot) {
            let member = self.expect_ident()?;
            let span = expr.span().merge(member.span);
            expr = Expr::Member { expr: Box::new(expr), member, span };
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParserError> {
        let tok = self.peek().clone();
        match tok.kind {
            TokenKind::Number(n) => { self.advance(); Ok(Expr::Number(n, tok.span)) }
            TokenKind::StringLit(s) => { self.advance(); Ok(Expr::StringLit(s, tok.span)) }
            TokenKind::HexColor(ref digits) => {
                let color = Color::from_hex(digits).ok_or_else(|| self.unexpected("color"))?;
                self.advance();
                Ok(Expr::Color(color, tok.span))
            }
            TokenKind::Ident(_) => {
                let name = self.expect_ident()?;
                if self.allow_block && self.check(&TokenKind::LBrace) {
                    let body = self.parse_block()?;
                    let span = name.span.merge(body.span);
                    Ok(Expr::Block(name, body, span))
                } else {
                    Ok(Expr::Ident(name.name, name.span))
                }
            }
            TokenKind::LParen => {
                self.advance();
                self.paren_depth += 1;
                let allow = self.allow_block;
                self.allow_block = true;
                let inner = if self.check(&TokenKind::RParen) {
                    Expr::Tuple(Vec::new(), tok.span.after())
                } else {
                    self.parse_expression()?
                };
                let close = self.expect(&TokenKind::RParen, "')'")?;
                self.paren_depth -= 1;
                self.allow_block = allow;
                Ok(Expr::Subexpression(Box::new(inner), tok.span.merge(close.span)))
            }
            _ => Err(self.unexpected("operand")),
        }
    }

    // ─── Token primitives ────────────────────────────────────────────────────

    /// Index of the next significant token.
    fn index(&self) -> usize {
        let mut i = self.pos;
        if self.paren_depth > 0 {
            while i + 1 < self.tokens.len() && self.tokens[i].kind == TokenKind::Linebreak { i += 1; }
        }
        i
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.index()]
    }

    fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    fn advance(&mut self) -> Token {
        let i = self.index();
        let tok = self.tokens[i].clone();
        self.pos = if i + 1 < self.tokens.len() { i + 1 } else { i };
        self.last = tok.span;
        tok
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn matches(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) { self.advance(); true } else { false }
    }

    fn expect(&mut self, kind: &TokenKind, expected: &str) -> Result<Token, ParserError> {
        if self.check(kind) { Ok(self.advance()) } else { Err(self.unexpected(expected)) }
    }

    fn expect_ident(&mut self) -> Result<Identifier, ParserError> {
        match self.peek_kind() {
            TokenKind::Ident(_) => {}
            _ => return Err(self.unexpected("identifier")),
        }
        let tok = self.advance();
        match tok.kind {
            TokenKind::Ident(name) => Ok(Identifier { name, span: tok.span }),
            _ => Err(self.unexpected("identifier")),
        }
    }

    /// `1 -2`: a sign preceded by space and glued to its operand starts a
    /// new tuple element instead of subtracting.
    fn is_prefix_at(&self, i: usize) -> bool {
        let Some(next) = self.tokens.get(i + 1) else { return false };
        self.tokens[i].space_before
            && !next.space_before
            && !matches!(next.kind, TokenKind::Linebreak | TokenKind::Eof)
    }

    fn starts_operand(&self) -> bool {
        let i = self.index();
        match self.tokens[i].kind {
            TokenKind::Number(_) | TokenKind::StringLit(_) | TokenKind::HexColor(_)
            | TokenKind::Ident(_) | TokenKind::LParen => true,
            TokenKind::Plus | TokenKind::Minus => self.is_prefix_at(i),
            _ => false,
        }
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    fn unexpected(&self, expected: &str) -> ParserError {
        let tok = self.peek();
        ParserError::new(
            ParserErrorKind::UnexpectedToken {
                found: tok.kind.description(),
                expected: Some(expected.to_string()),
            },
            tok.span,
        )
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
