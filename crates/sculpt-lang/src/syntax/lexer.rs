use crate::error::{LexerError, LexerErrorKind};
use crate::syntax::ast::Span;
use crate::syntax::token::{Token, TokenKind, keyword_or_ident};

pub struct Lexer<'a> {
    source: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source: source.as_bytes(), pos: 0 }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, LexerError> {
        let mut tokens = Vec::new();

        loop {
            let after_newline = matches!(tokens.last(), None | Some(Token { kind: TokenKind::Linebreak, .. }));
            let space_before = self.skip_whitespace() || after_newline;

            if self.is_at_end() {
                tokens.push(Token::new(TokenKind::Eof, Span::empty_at(self.pos), space_before));
                break;
            }

            let start = self.pos;
            let kind = self.next_token()?;
            tokens.push(Token::new(kind, Span::new(start, self.pos), space_before));
        }

        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<TokenKind, LexerError> {
        let start = self.pos;
        let ch = self.advance();

        let kind = match ch {
            b'\n' => TokenKind::Linebreak,
            b'+' => TokenKind::Plus,
            b'-' => TokenKind::Minus,
            b'*' => TokenKind::Star,
            b'.' => TokenKind::Dot,
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'{' => TokenKind::LBrace,
            b'}' => TokenKind::RBrace,

            b'/' => TokenKind::Slash,

            b'#' => TokenKind::HexColor(self.read_hex_color(start)?),
            b'"' => TokenKind::StringLit(self.read_string(start)?),
            b'0'..=b'9' => TokenKind::Number(self.read_number(start)),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => keyword_or_ident(self.read_ident(start)),

            _ => {
                let c = self.char_at(start);
                self.pos = start + c.len_utf8();
                return Err(LexerError::new(
                    LexerErrorKind::UnexpectedCharacter(c),
                    Span::new(start, self.pos),
                ));
            }
        };

        Ok(kind)
    }

    // ─── Primitives ──────────────────────────────────────────────────────────

    fn advance(&mut self) -> u8 {
        let ch = self.source[self.pos];
        self.pos += 1;
        ch
    }

    fn peek(&self) -> u8 {
        if self.is_at_end() { 0 } else { self.source[self.pos] }
    }

    fn peek_next(&self) -> u8 {
        if self.pos + 1 >= self.source.len() { 0 } else { self.source[self.pos + 1] }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    /// Full (possibly multi-byte) character starting at `pos`.
    fn char_at(&self, pos: usize) -> char {
        std::str::from_utf8(&self.source[pos..])
            .ok()
            .and_then(|s| s.chars().next())
            .unwrap_or(char::REPLACEMENT_CHARACTER)
    }

    fn text(&self, start: usize) -> String {
        String::from_utf8_lossy(&self.source[start..self.pos]).into_owned()
    }

    /// Skips blanks and comments. Newlines are tokens, so they stop the scan.
    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while !self.is_at_end() {
            match (self.peek(), self.peek_next()) {
                (b' ' | b'\t' | b'\r', _) => { self.advance(); }
                (b'/', b'/') => self.skip_line(),
                (b'/', b'*') => { self.advance(); self.skip_block_comment(); }
                _ => break,
            }
        }
        self.pos > start
    }

    fn skip_line(&mut self) {
        while !self.is_at_end() && self.peek() != b'\n' { self.advance(); }
    }

    fn skip_block_comment(&mut self) {
        self.advance(); // consume *
        while !self.is_at_end() {
            if self.peek() == b'*' && self.peek_next() == b'/' {
                self.advance(); // *
                self.advance(); // /
                break;
            }
            self.advance();
        }
    }

    // ─── Readers ─────────────────────────────────────────────────────────────

    fn read_hex_color(&mut self, start: usize) -> Result<String, LexerError> {
        let digits_start = self.pos;
        while !self.is_at_end() && (self.peek().is_ascii_alphanumeric() || self.peek() == b'_') {
            self.advance();
        }
        let digits = self.text(digits_start);
        let valid = matches!(digits.len(), 3 | 4 | 6 | 8) && digits.bytes().all(|b| b.is_ascii_hexdigit());
        if !valid {
            return Err(LexerError::new(LexerErrorKind::InvalidColor(digits), Span::new(start, self.pos)));
        }
        Ok(digits)
    }

    fn read_string(&mut self, start: usize) -> Result<String, LexerError> {
        let mut bytes = Vec::new();
        loop {
            if self.is_at_end() || self.peek() == b'\n' {
                return Err(LexerError::new(LexerErrorKind::UnterminatedString, Span::new(start, self.pos)));
            }
            let ch = self.advance();
            if ch == b'"' { break; }
            if ch == b'\\' {
                let esc_start = self.pos - 1;
                if self.is_at_end() {
                    return Err(LexerError::new(LexerErrorKind::UnterminatedString, Span::new(start, self.pos)));
                }
                match self.advance() {
                    b'n'  => bytes.push(b'\n'),
                    b't'  => bytes.push(b'\t'),
                    b'"'  => bytes.push(b'"'),
                    b'\\' => bytes.push(b'\\'),
                    _ => {
                        let c = self.char_at(self.pos - 1);
                        self.pos = self.pos - 1 + c.len_utf8();
                        return Err(LexerError::new(
                            LexerErrorKind::InvalidEscape(c),
                            Span::new(esc_start, self.pos),
                        ));
                    }
                }
            } else {
                bytes.push(ch);
            }
        }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn read_number(&mut self, start: usize) -> f64 {
        while !self.is_at_end() && self.peek().is_ascii_digit() { self.advance(); }
        // consume decimal only if followed by at least one digit
        // (avoids treating `.` in `(1 2).x` as a decimal point)
        if !self.is_at_end() && self.peek() == b'.' && self.peek_next().is_ascii_digit() {
            self.advance();
            while !self.is_at_end() && self.peek().is_ascii_digit() { self.advance(); }
        }
        self.text(start).parse().unwrap_or(0.0)
    }

    fn read_ident(&mut self, start: usize) -> String {
        while !self.is_at_end() && (self.peek().is_ascii_alphanumeric() || self.peek() == b'_') {
            self.advance();
        }
        self.text(start)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
