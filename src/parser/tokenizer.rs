//! Tokenizer for the TypeScript configuration subset
//!
//! Byte-oriented scanner producing spanned tokens:
//! - identifiers borrow from the input; keywords are plain identifiers that
//!   the parser recognizes by text
//! - string escapes are processed eagerly
//! - template literals are split into cooked quasis and the byte ranges of
//!   their substitutions, which the parser sub-parses

use super::error::{ParseError, ParseResult};
use super::lexer::{is_identifier_continue, is_identifier_start};
use super::span::Spanned;
use std::fmt;

/// Template literal token payload
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateToken {
    /// Cooked text segments; always one more than `substitutions`
    pub quasis: Vec<String>,
    /// Byte ranges of `${ ... }` contents in the original input
    pub substitutions: Vec<(usize, usize)>,
}

/// Lexical token
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'input> {
    // Literals
    /// Numeric literal
    Number(f64),
    /// String literal with escapes processed
    String(String),
    /// Template literal (boxed for size optimization)
    Template(Box<TemplateToken>),

    /// Identifier or keyword
    Identifier(&'input str),

    // Delimiters
    /// Left curly brace {
    LeftBrace,
    /// Right curly brace }
    RightBrace,
    /// Left parenthesis (
    LeftParen,
    /// Right parenthesis )
    RightParen,
    /// Left square bracket [
    LeftBracket,
    /// Right square bracket ]
    RightBracket,
    /// Semicolon (;)
    Semicolon,
    /// Comma (,)
    Comma,
    /// Colon (:)
    Colon,
    /// Dot (.)
    Dot,
    /// Spread (...)
    Ellipsis,
    /// Question mark (?)
    Question,
    /// Optional chaining (?.)
    QuestionDot,
    /// Arrow (=>)
    Arrow,
    /// Assignment (=)
    Assign,
    /// At sign (@), decorators
    At,

    // Operators
    /// Addition (+)
    Plus,
    /// Subtraction (-)
    Minus,
    /// Multiplication (*)
    Multiply,
    /// Division (/)
    Divide,
    /// Remainder (%)
    Percent,
    /// Exponentiation (**)
    Power,
    /// Loose equality (==)
    Equal,
    /// Loose inequality (!=)
    NotEqual,
    /// Strict equality (===)
    StrictEqual,
    /// Strict inequality (!==)
    StrictNotEqual,
    /// Less than (<)
    LessThan,
    /// Less than or equal (<=)
    LessThanOrEqual,
    /// Greater than (>)
    GreaterThan,
    /// Greater than or equal (>=)
    GreaterThanOrEqual,
    /// Logical NOT (!)
    Not,
    /// Logical AND (&&)
    And,
    /// Logical OR (||)
    Or,
    /// Presence coalescing (??)
    Coalesce,
    /// Ampersand (&), intersection types
    Ampersand,
    /// Pipe (|), union types
    Pipe,
}

impl<'input> Token<'input> {
    /// Identifier text, if this is an identifier
    pub fn as_identifier(&self) -> Option<&'input str> {
        match self {
            Token::Identifier(name) => Some(*name),
            _ => None,
        }
    }

    /// Whether this is the identifier/keyword `word`
    pub fn is_word(&self, word: &str) -> bool {
        self.as_identifier() == Some(word)
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Token::Number(n) => return write!(f, "{n}"),
            Token::String(s) => return write!(f, "{s:?}"),
            Token::Template(_) => "template literal",
            Token::Identifier(name) => *name,
            Token::LeftBrace => "{",
            Token::RightBrace => "}",
            Token::LeftParen => "(",
            Token::RightParen => ")",
            Token::LeftBracket => "[",
            Token::RightBracket => "]",
            Token::Semicolon => ";",
            Token::Comma => ",",
            Token::Colon => ":",
            Token::Dot => ".",
            Token::Ellipsis => "...",
            Token::Question => "?",
            Token::QuestionDot => "?.",
            Token::Arrow => "=>",
            Token::Assign => "=",
            Token::At => "@",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Multiply => "*",
            Token::Divide => "/",
            Token::Percent => "%",
            Token::Power => "**",
            Token::Equal => "==",
            Token::NotEqual => "!=",
            Token::StrictEqual => "===",
            Token::StrictNotEqual => "!==",
            Token::LessThan => "<",
            Token::LessThanOrEqual => "<=",
            Token::GreaterThan => ">",
            Token::GreaterThanOrEqual => ">=",
            Token::Not => "!",
            Token::And => "&&",
            Token::Or => "||",
            Token::Coalesce => "??",
            Token::Ampersand => "&",
            Token::Pipe => "|",
        };
        f.write_str(text)
    }
}

/// Byte-oriented tokenizer
pub struct Tokenizer<'input> {
    input: &'input str,
    bytes: &'input [u8],
    pos: usize,
    end: usize,
}

impl<'input> Tokenizer<'input> {
    /// Create a tokenizer over the whole input
    pub fn new(input: &'input str) -> Self {
        Self::with_range(input, 0, input.len())
    }

    /// Create a tokenizer over `input[start..end]`, reporting absolute offsets
    pub fn with_range(input: &'input str, start: usize, end: usize) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: start,
            end: end.min(input.len()),
        }
    }

    /// Current byte offset
    pub fn position(&self) -> usize {
        self.pos
    }

    fn peek_byte(&self, offset: usize) -> Option<u8> {
        let index = self.pos + offset;
        if index < self.end {
            Some(self.bytes[index])
        } else {
            None
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.pos..self.end)?.chars().next()
    }

    fn skip_whitespace_and_comments(&mut self) -> ParseResult<()> {
        while self.pos < self.end {
            match self.bytes[self.pos] {
                b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c => self.pos += 1,
                b'/' if self.peek_byte(1) == Some(b'/') => self.skip_single_line_comment(),
                b'/' if self.peek_byte(1) == Some(b'*') => self.skip_multi_line_comment()?,
                b if b >= 0x80 => match self.current_char() {
                    // NBSP, BOM, line/paragraph separators and other Unicode spaces
                    Some(c) if c.is_whitespace() || c == '\u{feff}' => self.pos += c.len_utf8(),
                    _ => break,
                },
                _ => break,
            }
        }
        Ok(())
    }

    fn skip_single_line_comment(&mut self) {
        while self.pos < self.end && self.bytes[self.pos] != b'\n' {
            self.pos += 1;
        }
    }

    fn skip_multi_line_comment(&mut self) -> ParseResult<()> {
        let start = self.pos;
        self.pos += 2;
        while self.pos + 1 < self.end {
            if self.bytes[self.pos] == b'*' && self.bytes[self.pos + 1] == b'/' {
                self.pos += 2;
                return Ok(());
            }
            self.pos += 1;
        }
        Err(ParseError::Unterminated {
            construct: "comment",
            position: start,
        })
    }

    fn parse_identifier(&mut self) -> &'input str {
        let start = self.pos;
        while let Some(c) = self.current_char() {
            if is_identifier_continue(c) {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
        &self.input[start..self.pos]
    }

    fn scan_digits(&mut self, accept: impl Fn(u8) -> bool) {
        while let Some(b) = self.peek_byte(0) {
            if accept(b) || (b == b'_' && self.peek_byte(1).is_some_and(&accept)) {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn parse_number(&mut self) -> ParseResult<Token<'input>> {
        let start = self.pos;
        let radix = match (self.peek_byte(0), self.peek_byte(1)) {
            (Some(b'0'), Some(b'x' | b'X')) => Some(16),
            (Some(b'0'), Some(b'o' | b'O')) => Some(8),
            (Some(b'0'), Some(b'b' | b'B')) => Some(2),
            _ => None,
        };

        let value = if let Some(radix) = radix {
            self.pos += 2;
            let digits_start = self.pos;
            self.scan_digits(|b| (b as char).is_digit(radix));
            let digits: String = self.input[digits_start..self.pos]
                .chars()
                .filter(|c| *c != '_')
                .collect();
            u64::from_str_radix(&digits, radix)
                .map(|v| v as f64)
                .map_err(|_| ParseError::InvalidLiteral {
                    literal_type: "number".to_string(),
                    value: self.input[start..self.pos].to_string(),
                    position: start,
                })?
        } else {
            self.scan_digits(|b| b.is_ascii_digit());
            if self.peek_byte(0) == Some(b'.') {
                self.pos += 1;
                self.scan_digits(|b| b.is_ascii_digit());
            }
            if matches!(self.peek_byte(0), Some(b'e' | b'E')) {
                let exponent_start = self.pos;
                self.pos += 1;
                if matches!(self.peek_byte(0), Some(b'+' | b'-')) {
                    self.pos += 1;
                }
                if !self.peek_byte(0).is_some_and(|b| b.is_ascii_digit()) {
                    self.pos = exponent_start;
                } else {
                    self.scan_digits(|b| b.is_ascii_digit());
                }
            }
            let text: String = self.input[start..self.pos]
                .chars()
                .filter(|c| *c != '_')
                .collect();
            text.parse::<f64>().map_err(|_| ParseError::InvalidLiteral {
                literal_type: "number".to_string(),
                value: text.clone(),
                position: start,
            })?
        };

        if let Some(c) = self.current_char() {
            if c == 'n' {
                return Err(ParseError::InvalidLiteral {
                    literal_type: "bigint".to_string(),
                    value: format!("{}n", &self.input[start..self.pos]),
                    position: start,
                });
            }
            if is_identifier_start(c) || c.is_ascii_digit() {
                return Err(ParseError::InvalidLiteral {
                    literal_type: "number".to_string(),
                    value: self.input[start..self.pos + c.len_utf8()].to_string(),
                    position: start,
                });
            }
        }
        Ok(Token::Number(value))
    }

    fn parse_hex_escape(&mut self, digits: usize, escape_start: usize) -> ParseResult<char> {
        let text = self
            .input
            .get(self.pos..self.pos + digits)
            .filter(|t| t.len() == digits && t.bytes().all(|b| b.is_ascii_hexdigit()))
            .ok_or_else(|| self.invalid_escape(escape_start))?;
        self.pos += digits;
        let code = u32::from_str_radix(text, 16).map_err(|_| self.invalid_escape(escape_start))?;
        self.code_point(code, escape_start)
    }

    fn code_point(&mut self, code: u32, escape_start: usize) -> ParseResult<char> {
        if (0xD800..0xDC00).contains(&code) {
            // high surrogate: pair it with a following `\uDC00`-`\uDFFF` escape
            if self.input.get(self.pos..self.pos + 2) == Some("\\u") {
                let saved = self.pos;
                self.pos += 2;
                if let Some(text) = self.input.get(self.pos..self.pos + 4) {
                    if let Ok(low) = u32::from_str_radix(text, 16) {
                        if (0xDC00..0xE000).contains(&low) {
                            self.pos += 4;
                            let combined = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
                            return char::from_u32(combined)
                                .ok_or_else(|| self.invalid_escape(escape_start));
                        }
                    }
                }
                self.pos = saved;
            }
            return Ok(char::REPLACEMENT_CHARACTER);
        }
        if (0xDC00..0xE000).contains(&code) {
            return Ok(char::REPLACEMENT_CHARACTER);
        }
        char::from_u32(code).ok_or_else(|| self.invalid_escape(escape_start))
    }

    fn invalid_escape(&self, escape_start: usize) -> ParseError {
        let end = (self.pos + 1).min(self.end).max(escape_start);
        ParseError::InvalidEscape {
            sequence: self.input.get(escape_start..end).unwrap_or("\\").to_string(),
            position: escape_start,
        }
    }

    /// Process one escape sequence; `self.pos` points just after the backslash.
    /// Returns `None` for line continuations.
    fn parse_escape(&mut self) -> ParseResult<Option<char>> {
        let escape_start = self.pos - 1;
        let c = self.current_char().ok_or(ParseError::Unterminated {
            construct: "string literal",
            position: escape_start,
        })?;
        self.pos += c.len_utf8();
        let cooked = match c {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            'b' => '\u{8}',
            'f' => '\u{c}',
            'v' => '\u{b}',
            '0' if !self.peek_byte(0).is_some_and(|b| b.is_ascii_digit()) => '\0',
            'x' => self.parse_hex_escape(2, escape_start)?,
            'u' if self.peek_byte(0) == Some(b'{') => {
                self.pos += 1;
                let digits_start = self.pos;
                while self.peek_byte(0).is_some_and(|b| b.is_ascii_hexdigit()) {
                    self.pos += 1;
                }
                let text = &self.input[digits_start..self.pos];
                if text.is_empty() || self.peek_byte(0) != Some(b'}') {
                    return Err(self.invalid_escape(escape_start));
                }
                self.pos += 1;
                let code =
                    u32::from_str_radix(text, 16).map_err(|_| self.invalid_escape(escape_start))?;
                self.code_point(code, escape_start)?
            }
            'u' => self.parse_hex_escape(4, escape_start)?,
            '\r' => {
                if self.peek_byte(0) == Some(b'\n') {
                    self.pos += 1;
                }
                return Ok(None);
            }
            '\n' | '\u{2028}' | '\u{2029}' => return Ok(None),
            '1'..='9' | '0' => return Err(self.invalid_escape(escape_start)),
            other => other,
        };
        Ok(Some(cooked))
    }

    fn parse_string_literal(&mut self, quote: u8) -> ParseResult<String> {
        let start = self.pos;
        self.pos += 1;
        let mut value = String::new();
        loop {
            let c = self.current_char().ok_or(ParseError::Unterminated {
                construct: "string literal",
                position: start,
            })?;
            match c {
                '\\' => {
                    self.pos += 1;
                    if let Some(cooked) = self.parse_escape()? {
                        value.push(cooked);
                    }
                }
                '\n' | '\r' => {
                    return Err(ParseError::Unterminated {
                        construct: "string literal",
                        position: start,
                    });
                }
                c if c as u32 == quote as u32 => {
                    self.pos += 1;
                    return Ok(value);
                }
                c => {
                    value.push(c);
                    self.pos += c.len_utf8();
                }
            }
        }
    }

    fn parse_template_literal(&mut self) -> ParseResult<TemplateToken> {
        let start = self.pos;
        self.pos += 1;
        let mut quasis = Vec::new();
        let mut substitutions = Vec::new();
        let mut current = String::new();
        let unterminated = ParseError::Unterminated {
            construct: "template literal",
            position: start,
        };

        loop {
            let c = self.current_char().ok_or_else(|| unterminated.clone())?;
            match c {
                '`' => {
                    self.pos += 1;
                    quasis.push(current);
                    return Ok(TemplateToken {
                        quasis,
                        substitutions,
                    });
                }
                '\\' => {
                    self.pos += 1;
                    if let Some(cooked) = self.parse_escape()? {
                        current.push(cooked);
                    }
                }
                '$' if self.peek_byte(1) == Some(b'{') => {
                    self.pos += 2;
                    let expr_start = self.pos;
                    let expr_end = self.skip_substitution(start)?;
                    substitutions.push((expr_start, expr_end));
                    quasis.push(std::mem::take(&mut current));
                }
                '\r' => {
                    // raw CRLF and CR in templates are normalized to LF
                    self.pos += 1;
                    if self.peek_byte(0) == Some(b'\n') {
                        self.pos += 1;
                    }
                    current.push('\n');
                }
                c => {
                    current.push(c);
                    self.pos += c.len_utf8();
                }
            }
        }
    }

    /// Advance past a `${ ... }` body, returning the offset of its closing brace
    fn skip_substitution(&mut self, template_start: usize) -> ParseResult<usize> {
        let mut depth = 0usize;
        loop {
            let token = self.next_token()?.ok_or(ParseError::Unterminated {
                construct: "template literal",
                position: template_start,
            })?;
            match token.value {
                Token::LeftBrace => depth += 1,
                Token::RightBrace if depth == 0 => return Ok(token.start),
                Token::RightBrace => depth -= 1,
                _ => {}
            }
        }
    }

    fn single(&mut self, token: Token<'input>, len: usize) -> Token<'input> {
        self.pos += len;
        token
    }

    /// Scan the next token
    pub fn next_token(&mut self) -> ParseResult<Option<Spanned<Token<'input>>>> {
        self.skip_whitespace_and_comments()?;
        if self.pos >= self.end {
            return Ok(None);
        }

        let start = self.pos;
        let b0 = self.bytes[self.pos];
        let b1 = self.peek_byte(1);
        let b2 = self.peek_byte(2);

        let token = match b0 {
            b'{' => self.single(Token::LeftBrace, 1),
            b'}' => self.single(Token::RightBrace, 1),
            b'(' => self.single(Token::LeftParen, 1),
            b')' => self.single(Token::RightParen, 1),
            b'[' => self.single(Token::LeftBracket, 1),
            b']' => self.single(Token::RightBracket, 1),
            b';' => self.single(Token::Semicolon, 1),
            b',' => self.single(Token::Comma, 1),
            b':' => self.single(Token::Colon, 1),
            b'@' => self.single(Token::At, 1),
            b'.' => match (b1, b2) {
                (Some(b'.'), Some(b'.')) => self.single(Token::Ellipsis, 3),
                (Some(d), _) if d.is_ascii_digit() => self.parse_number()?,
                _ => self.single(Token::Dot, 1),
            },
            b'?' => match (b1, b2) {
                (Some(b'?'), _) => self.single(Token::Coalesce, 2),
                // `a ? .5 : 1` is a conditional, not optional chaining
                (Some(b'.'), Some(d)) if d.is_ascii_digit() => self.single(Token::Question, 1),
                (Some(b'.'), _) => self.single(Token::QuestionDot, 2),
                _ => self.single(Token::Question, 1),
            },
            b'=' => match (b1, b2) {
                (Some(b'='), Some(b'=')) => self.single(Token::StrictEqual, 3),
                (Some(b'='), _) => self.single(Token::Equal, 2),
                (Some(b'>'), _) => self.single(Token::Arrow, 2),
                _ => self.single(Token::Assign, 1),
            },
            b'!' => match (b1, b2) {
                (Some(b'='), Some(b'=')) => self.single(Token::StrictNotEqual, 3),
                (Some(b'='), _) => self.single(Token::NotEqual, 2),
                _ => self.single(Token::Not, 1),
            },
            b'<' => match b1 {
                Some(b'=') => self.single(Token::LessThanOrEqual, 2),
                _ => self.single(Token::LessThan, 1),
            },
            b'>' => match b1 {
                Some(b'=') => self.single(Token::GreaterThanOrEqual, 2),
                _ => self.single(Token::GreaterThan, 1),
            },
            b'+' => self.single(Token::Plus, 1),
            b'-' => self.single(Token::Minus, 1),
            b'*' => match b1 {
                Some(b'*') => self.single(Token::Power, 2),
                _ => self.single(Token::Multiply, 1),
            },
            b'/' => self.single(Token::Divide, 1),
            b'%' => self.single(Token::Percent, 1),
            b'&' => match b1 {
                Some(b'&') => self.single(Token::And, 2),
                _ => self.single(Token::Ampersand, 1),
            },
            b'|' => match b1 {
                Some(b'|') => self.single(Token::Or, 2),
                _ => self.single(Token::Pipe, 1),
            },
            b'\'' | b'"' => Token::String(self.parse_string_literal(b0)?),
            b'`' => Token::Template(Box::new(self.parse_template_literal()?)),
            b'0'..=b'9' => self.parse_number()?,
            _ => match self.current_char() {
                Some(c) if is_identifier_start(c) => Token::Identifier(self.parse_identifier()),
                Some(c) => return Err(ParseError::UnexpectedCharacter { character: c, position: start }),
                None => return Ok(None),
            },
        };

        Ok(Some(Spanned::new(token, start, self.pos)))
    }

    /// Tokenize the whole range
    pub fn tokenize_all(&mut self) -> ParseResult<Vec<Spanned<Token<'input>>>> {
        let mut tokens = Vec::with_capacity((self.end - self.pos) / 3);
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }
}

/// Tokenize a whole input string
pub fn tokenize(input: &str) -> ParseResult<Vec<Spanned<Token<'_>>>> {
    Tokenizer::new(input).tokenize_all()
}
