//! Parser error types

use crate::diagnostics::{LineIndex, SourceLocation};
use crate::error::ConfError;
use crate::program::FileId;
use thiserror::Error;

/// Result type for parser operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Parse error with the byte offset it occurred at
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Syntax error with a free-form message
    #[error("{message}")]
    SyntaxError {
        /// Error message describing the syntax error
        message: String,
        /// Byte offset where the error occurred
        position: usize,
    },

    /// Unexpected token
    #[error("Unexpected token '{token}'")]
    UnexpectedToken {
        /// The unexpected token that was found
        token: String,
        /// Byte offset where the token was found
        position: usize,
    },

    /// Expected token
    #[error("Expected {expected}, found '{found}'")]
    ExpectedToken {
        /// The expected token description
        expected: String,
        /// The token actually found
        found: String,
        /// Byte offset where the token was expected
        position: usize,
    },

    /// Unexpected end of input
    #[error("Unexpected end of input")]
    UnexpectedEof {
        /// Byte offset of the end of input
        position: usize,
    },

    /// Character that starts no token
    #[error("Unexpected character '{character}'")]
    UnexpectedCharacter {
        /// The offending character
        character: char,
        /// Byte offset of the character
        position: usize,
    },

    /// Invalid literal value
    #[error("Invalid {literal_type} literal: {value}")]
    InvalidLiteral {
        /// Type of literal that failed to parse
        literal_type: String,
        /// The invalid value that was encountered
        value: String,
        /// Byte offset where the invalid literal was found
        position: usize,
    },

    /// Invalid escape sequence
    #[error("Invalid escape sequence: {sequence}")]
    InvalidEscape {
        /// The invalid escape sequence
        sequence: String,
        /// Byte offset where the escape sequence was found
        position: usize,
    },

    /// Unclosed string, template or comment
    #[error("Unterminated {construct}")]
    Unterminated {
        /// What was left open
        construct: &'static str,
        /// Byte offset where the construct started
        position: usize,
    },
}

impl ParseError {
    /// Byte offset the error refers to
    pub fn position(&self) -> usize {
        match self {
            ParseError::SyntaxError { position, .. }
            | ParseError::UnexpectedToken { position, .. }
            | ParseError::ExpectedToken { position, .. }
            | ParseError::UnexpectedEof { position }
            | ParseError::UnexpectedCharacter { position, .. }
            | ParseError::InvalidLiteral { position, .. }
            | ParseError::InvalidEscape { position, .. }
            | ParseError::Unterminated { position, .. } => *position,
        }
    }

    /// Move the error by `offset` bytes (for sub-parsed template substitutions)
    pub fn shifted(mut self, offset: usize) -> Self {
        match &mut self {
            ParseError::SyntaxError { position, .. }
            | ParseError::UnexpectedToken { position, .. }
            | ParseError::ExpectedToken { position, .. }
            | ParseError::UnexpectedEof { position }
            | ParseError::UnexpectedCharacter { position, .. }
            | ParseError::InvalidLiteral { position, .. }
            | ParseError::InvalidEscape { position, .. }
            | ParseError::Unterminated { position, .. } => *position += offset,
        }
        self
    }

    /// Create a syntax error
    pub fn syntax(message: impl Into<String>, position: usize) -> Self {
        ParseError::SyntaxError {
            message: message.into(),
            position,
        }
    }

    /// Attach file and line/character information
    pub fn into_conf_error(self, file: &FileId, index: &LineIndex) -> ConfError {
        ConfError::Parse {
            location: SourceLocation::new(file.clone(), index.position(self.position())),
            message: self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Position;

    #[test]
    fn test_into_conf_error_resolves_position() {
        let text = "export default {\n  a: ,\n};";
        let err = ParseError::UnexpectedToken {
            token: ",".to_string(),
            position: text.find(',').unwrap_or_default(),
        };
        let conf = err.into_conf_error(&FileId::new("cfg.ts"), &LineIndex::new(text));
        assert_eq!(conf.location().position, Some(Position::new(2, 6)));
        assert_eq!(conf.to_string(), "Parse error: Unexpected token ',' (cfg.ts:2:6)");
    }
}
