//! Script lexer/tokenizer
//!
//! This module implements a lexer for the script subset understood by the
//! bundled parser. Tokens borrow their text from the source; string and
//! number literal values are decoded on demand with [`string_value`] and
//! [`number_value`].

mod token;

pub use token::{Keyword, Token, TokenKind};

use crate::error::{Error, Result, SourceLocation};
use crate::runtime::convert::string_to_number;

/// A lexer for script source code
pub struct Lexer<'src> {
    /// Source code being lexed
    source: &'src str,
    /// Current position in bytes
    pos: usize,
    /// Current line number (1-indexed)
    line: u32,
    /// Current column number (1-indexed)
    column: u32,
}

fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source code
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    /// Get current source location
    fn location(&self) -> SourceLocation {
        SourceLocation {
            line: self.line,
            column: self.column,
            offset: self.pos,
        }
    }

    /// Create a lexer error with source context
    fn error(&self, message: impl Into<String>, location: SourceLocation) -> Error {
        Error::lexer_error_with_context(message, location, self.source)
    }

    /// Peek at current character without consuming
    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    /// Peek at next character (one ahead)
    fn peek_next(&self) -> Option<char> {
        let mut chars = self.source[self.pos..].chars();
        chars.next();
        chars.next()
    }

    /// Advance and return current character
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Consume `expected` if it is next
    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Skip whitespace and comments, reporting whether a line terminator was crossed
    fn skip_whitespace_and_comments(&mut self) -> Result<bool> {
        let mut newline = false;
        loop {
            while let Some(c) = self.peek() {
                if c.is_whitespace() || c == '\u{FEFF}' {
                    newline |= is_line_terminator(c);
                    self.advance();
                } else {
                    break;
                }
            }

            if self.peek() == Some('/') {
                if self.peek_next() == Some('/') {
                    while let Some(c) = self.peek() {
                        if is_line_terminator(c) {
                            break;
                        }
                        self.advance();
                    }
                    continue;
                } else if self.peek_next() == Some('*') {
                    let start_loc = self.location();
                    self.advance(); // /
                    self.advance(); // *
                    loop {
                        match self.peek() {
                            None => return Err(self.error("Unterminated comment", start_loc)),
                            Some('*') if self.peek_next() == Some('/') => {
                                self.advance();
                                self.advance();
                                break;
                            }
                            Some(c) => {
                                newline |= is_line_terminator(c);
                                self.advance();
                            }
                        }
                    }
                    continue;
                }
            }

            return Ok(newline);
        }
    }

    /// Check if character can start an identifier
    fn is_id_start(c: char) -> bool {
        c == '_' || c == '$' || unicode_xid::UnicodeXID::is_xid_start(c)
    }

    /// Check if character can continue an identifier
    fn is_id_continue(c: char) -> bool {
        c == '_' || c == '$' || unicode_xid::UnicodeXID::is_xid_continue(c)
    }

    /// Scan an identifier or keyword
    fn scan_identifier(&mut self) -> TokenKind {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if Self::is_id_continue(c) {
                self.advance();
            } else {
                break;
            }
        }
        match Keyword::lookup(&self.source[start..self.pos]) {
            Some(keyword) => TokenKind::Keyword(keyword),
            None => TokenKind::Identifier,
        }
    }

    fn skip_digits(&mut self, radix: u32) -> usize {
        let mut count = 0;
        while self.peek().is_some_and(|c| c.is_digit(radix)) {
            self.advance();
            count += 1;
        }
        count
    }

    /// Scan a numeric literal
    fn scan_number(&mut self, start_loc: SourceLocation) -> Result<TokenKind> {
        if self.peek() == Some('0') {
            let radix = match self.peek_next() {
                Some('x' | 'X') => Some(16),
                Some('o' | 'O') => Some(8),
                Some('b' | 'B') => Some(2),
                _ => None,
            };
            if let Some(radix) = radix {
                self.advance();
                self.advance();
                if self.skip_digits(radix) == 0 {
                    return Err(self.error("Invalid or unexpected token", start_loc));
                }
                return self.end_number(start_loc);
            }
        }

        self.skip_digits(10);
        if self.peek() == Some('.') {
            self.advance();
            self.skip_digits(10);
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            self.advance();
            if matches!(self.peek(), Some('+' | '-')) {
                self.advance();
            }
            if self.skip_digits(10) == 0 {
                return Err(self.error("Invalid or unexpected token", start_loc));
            }
        }
        self.end_number(start_loc)
    }

    /// A numeric literal must not run into an identifier
    fn end_number(&self, start_loc: SourceLocation) -> Result<TokenKind> {
        match self.peek() {
            Some(c) if Self::is_id_start(c) || c.is_ascii_digit() => {
                Err(self.error("Invalid or unexpected token", start_loc))
            }
            _ => Ok(TokenKind::NumberLiteral),
        }
    }

    /// Scan a string literal
    fn scan_string(&mut self, quote: char, start_loc: SourceLocation) -> Result<TokenKind> {
        self.advance(); // Opening quote
        loop {
            match self.peek() {
                None => return Err(self.error("Unterminated string literal", start_loc)),
                Some(c) if is_line_terminator(c) => {
                    return Err(self.error("Unterminated string literal", start_loc));
                }
                Some('\\') => {
                    self.advance();
                    self.advance(); // Escaped character
                }
                Some(c) if c == quote => {
                    self.advance();
                    return Ok(TokenKind::StringLiteral);
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    fn punctuator(&mut self, c: char, start_loc: SourceLocation) -> Result<TokenKind> {
        self.advance();
        let kind = match c {
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '{' => TokenKind::LeftBrace,
            '}' => TokenKind::RightBrace,
            '[' => TokenKind::LeftBracket,
            ']' => TokenKind::RightBracket,
            '.' => TokenKind::Dot,
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            '?' => TokenKind::Question,
            '+' if self.eat('=') => TokenKind::PlusEquals,
            '+' => TokenKind::Plus,
            '-' if self.eat('=') => TokenKind::MinusEquals,
            '-' => TokenKind::Minus,
            '*' if self.eat('=') => TokenKind::StarEquals,
            '*' => TokenKind::Star,
            '/' if self.eat('=') => TokenKind::SlashEquals,
            '/' => TokenKind::Slash,
            '%' if self.eat('=') => TokenKind::PercentEquals,
            '%' => TokenKind::Percent,
            '<' if self.eat('=') => TokenKind::LessEquals,
            '<' => TokenKind::Less,
            '>' if self.eat('=') => TokenKind::GreaterEquals,
            '>' => TokenKind::Greater,
            '=' if self.eat('=') => {
                if self.eat('=') {
                    TokenKind::EqualsEqualsEquals
                } else {
                    TokenKind::EqualsEquals
                }
            }
            '=' => TokenKind::Equals,
            '!' if self.eat('=') => {
                if self.eat('=') {
                    TokenKind::BangEqualsEquals
                } else {
                    TokenKind::BangEquals
                }
            }
            '!' => TokenKind::Bang,
            '&' if self.eat('&') => TokenKind::AmpersandAmpersand,
            '|' if self.eat('|') => TokenKind::PipePipe,
            _ => return Err(self.error(format!("Unexpected character '{}'", c), start_loc)),
        };
        Ok(kind)
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Result<Token<'src>> {
        let newline_before = self.skip_whitespace_and_comments()?;
        let start = self.pos;
        let start_loc = self.location();

        let kind = match self.peek() {
            None => TokenKind::Eof,
            Some(c) if Self::is_id_start(c) => self.scan_identifier(),
            Some(c)
                if c.is_ascii_digit()
                    || (c == '.' && self.peek_next().is_some_and(|n| n.is_ascii_digit())) =>
            {
                self.scan_number(start_loc)?
            }
            Some(c @ ('"' | '\'')) => self.scan_string(c, start_loc)?,
            Some(c) => self.punctuator(c, start_loc)?,
        };

        Ok(Token {
            kind,
            text: &self.source[start..self.pos],
            location: start_loc,
            newline_before,
        })
    }

    /// Tokenize the entire source into a vector of tokens
    pub fn tokenize(&mut self) -> Result<Vec<Token<'src>>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                return Ok(tokens);
            }
        }
    }
}

/// The numeric value of a number literal token
pub fn number_value(text: &str) -> f64 {
    string_to_number(text)
}

/// The cooked value of a string literal token (quotes included in `text`)
pub fn string_value(text: &str, location: SourceLocation) -> Result<String> {
    let inner = &text[1..text.len().saturating_sub(1)];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    let invalid = || Error::lexer_error("Invalid escape sequence", location);

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(escape) = chars.next() else {
            return Err(invalid());
        };
        match escape {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{C}'),
            'v' => out.push('\u{B}'),
            '0' if !chars.peek().is_some_and(|c| c.is_ascii_digit()) => out.push('\0'),
            'x' => {
                let code = hex_digits(&mut chars, 2).ok_or_else(invalid)?;
                out.push(char::from_u32(code).ok_or_else(invalid)?);
            }
            'u' => {
                let unit = unicode_escape(&mut chars).ok_or_else(invalid)?;
                if (0xD800..0xDC00).contains(&unit) {
                    // High surrogate: pair it with a following \uXXXX low surrogate
                    let mut lookahead = chars.clone();
                    let low = match (lookahead.next(), lookahead.next()) {
                        (Some('\\'), Some('u')) => unicode_escape(&mut lookahead),
                        _ => None,
                    };
                    match low {
                        Some(low) if (0xDC00..0xE000).contains(&low) => {
                            chars = lookahead;
                            let code = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
                            out.push(char::from_u32(code).ok_or_else(invalid)?);
                        }
                        _ => out.push('\u{FFFD}'),
                    }
                } else {
                    out.push(char::from_u32(unit).unwrap_or('\u{FFFD}'));
                }
            }
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            c if is_line_terminator(c) => {}
            c if c.is_ascii_digit() => return Err(invalid()),
            other => out.push(other),
        }
    }
    Ok(out)
}

fn hex_digits(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, count: usize) -> Option<u32> {
    let mut value = 0;
    for _ in 0..count {
        value = value * 16 + chars.next()?.to_digit(16)?;
    }
    Some(value)
}

fn unicode_escape(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<u32> {
    if chars.peek() == Some(&'{') {
        chars.next();
        let mut value: u32 = 0;
        let mut digits = 0;
        loop {
            match chars.next()? {
                '}' if digits > 0 => return (value <= 0x10FFFF).then_some(value),
                c => {
                    value = value.checked_mul(16)?.checked_add(c.to_digit(16)?)?;
                    digits += 1;
                }
            }
        }
    }
    hex_digits(chars, 4)
}
