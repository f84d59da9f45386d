//! Lexical analysis utilities

use super::error::{ParseError, ParseResult};
use super::span::Spanned;
use super::tokenizer::Token;

/// Check if a character can start an identifier
pub fn is_identifier_start(c: char) -> bool {
    unicode_xid::UnicodeXID::is_xid_start(c) || c == '_' || c == '$'
}

/// Check if a character can continue an identifier
pub fn is_identifier_continue(c: char) -> bool {
    unicode_xid::UnicodeXID::is_xid_continue(c) || c == '$' || c == '\u{200c}' || c == '\u{200d}'
}

/// Token stream with lookahead capability
#[derive(Debug)]
pub struct TokenStream<'input> {
    source: &'input str,
    tokens: Vec<Spanned<Token<'input>>>,
    position: usize,
}

impl<'input> TokenStream<'input> {
    /// Create a new token stream over tokens scanned from `source`
    pub fn new(source: &'input str, tokens: Vec<Spanned<Token<'input>>>) -> Self {
        Self {
            source,
            tokens,
            position: 0,
        }
    }

    /// Source text the tokens were scanned from
    pub fn source(&self) -> &'input str {
        self.source
    }

    /// Peek at the current token without consuming
    pub fn peek(&self) -> Option<&Spanned<Token<'input>>> {
        self.tokens.get(self.position)
    }

    /// Peek at the current token's value
    pub fn peek_token(&self) -> Option<&Token<'input>> {
        self.peek().map(|t| &t.value)
    }

    /// Peek at a token n positions ahead
    pub fn peek_ahead(&self, n: usize) -> Option<&Spanned<Token<'input>>> {
        self.tokens.get(self.position + n)
    }

    /// Consume and return the current token
    pub fn next(&mut self) -> Option<Spanned<Token<'input>>> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    /// Check if we're at the end of the stream
    pub fn is_eof(&self) -> bool {
        self.position >= self.tokens.len()
    }

    /// Get the current position in the stream
    pub fn position(&self) -> usize {
        self.position
    }

    /// Reset to a previous position
    pub fn reset_to(&mut self, position: usize) {
        self.position = position.min(self.tokens.len());
    }

    /// Byte offset of the current token, or of the end of input
    pub fn offset(&self) -> usize {
        self.peek()
            .map(|t| t.start)
            .or_else(|| self.tokens.last().map(|t| t.end))
            .unwrap_or(0)
    }

    /// End offset of the most recently consumed token
    pub fn previous_end(&self) -> usize {
        self.position
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|t| t.end)
            .unwrap_or(0)
    }

    /// Whether a line break separates the current token from the previous one
    pub fn newline_before(&self) -> bool {
        match (self.position.checked_sub(1), self.peek()) {
            (Some(prev), Some(current)) => self
                .source
                .get(self.tokens[prev].end..current.start)
                .is_some_and(|gap| gap.contains(['\n', '\r', '\u{2028}', '\u{2029}'])),
            _ => false,
        }
    }

    /// Whether the current token is `expected`
    pub fn check(&self, expected: &Token<'input>) -> bool {
        self.peek_token()
            .is_some_and(|t| std::mem::discriminant(t) == std::mem::discriminant(expected))
    }

    /// Whether the current token is the identifier/keyword `word`
    pub fn check_word(&self, word: &str) -> bool {
        self.peek_token().is_some_and(|t| t.is_word(word))
    }

    /// Consume a token if it matches the predicate
    pub fn consume_if<F>(&mut self, predicate: F) -> Option<Spanned<Token<'input>>>
    where
        F: FnOnce(&Token<'input>) -> bool,
    {
        if self.peek_token().is_some_and(predicate) {
            return self.next();
        }
        None
    }

    /// Consume the current token if it is `expected`
    pub fn eat(&mut self, expected: &Token<'input>) -> bool {
        self.consume_if(|t| std::mem::discriminant(t) == std::mem::discriminant(expected))
            .is_some()
    }

    /// Consume the keyword `word` if present
    pub fn eat_word(&mut self, word: &str) -> bool {
        self.consume_if(|t| t.is_word(word)).is_some()
    }

    /// Expect a specific token type
    pub fn expect(&mut self, expected: Token<'input>) -> ParseResult<Spanned<Token<'input>>> {
        if self.check(&expected) {
            return self.next().ok_or(ParseError::UnexpectedEof {
                position: self.offset(),
            });
        }
        Err(self.expected(&format!("'{expected}'")))
    }

    /// Expect an identifier and return its text
    pub fn expect_identifier(&mut self) -> ParseResult<Spanned<&'input str>> {
        match self.peek() {
            Some(Spanned {
                value: Token::Identifier(name),
                start,
                end,
            }) => {
                let spanned = Spanned::new(*name, *start, *end);
                self.position += 1;
                Ok(spanned)
            }
            _ => Err(self.expected("identifier")),
        }
    }

    /// Build an "expected X" error at the current token
    pub fn expected(&self, what: &str) -> ParseError {
        match self.peek() {
            Some(token) => ParseError::ExpectedToken {
                expected: what.to_string(),
                found: token.value.to_string(),
                position: token.start,
            },
            None => ParseError::UnexpectedEof {
                position: self.offset(),
            },
        }
    }

    /// Build an "unexpected token" error at the current token
    pub fn unexpected(&self) -> ParseError {
        match self.peek() {
            Some(token) => ParseError::UnexpectedToken {
                token: token.value.to_string(),
                position: token.start,
            },
            None => ParseError::UnexpectedEof {
                position: self.offset(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tokenizer::tokenize;

    #[test]
    fn test_identifier_chars() {
        assert!(is_identifier_start('a'));
        assert!(is_identifier_start('Z'));
        assert!(is_identifier_start('_'));
        assert!(is_identifier_start('$'));
        assert!(!is_identifier_start('0'));
        assert!(!is_identifier_start('-'));

        assert!(is_identifier_continue('a'));
        assert!(is_identifier_continue('0'));
        assert!(is_identifier_continue('_'));
        assert!(!is_identifier_continue('-'));
    }

    #[test]
    fn test_newline_before() {
        let source = "a\nb /* x\n */ c d";
        let mut stream = TokenStream::new(source, tokenize(source).unwrap());
        assert!(!stream.newline_before());
        stream.next();
        assert!(stream.newline_before());
        stream.next();
        assert!(stream.newline_before());
        stream.next();
        assert!(!stream.newline_before());
    }

    #[test]
    fn test_expect_reports_found_token() {
        let source = "a ]";
        let mut stream = TokenStream::new(source, tokenize(source).unwrap());
        assert!(stream.expect_identifier().is_ok());
        let err = stream.expect(Token::RightParen).unwrap_err();
        assert_eq!(err.to_string(), "Expected ')', found ']'");
        assert_eq!(err.position(), 2);
    }
}
