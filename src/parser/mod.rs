//! TypeScript subset parser
//!
//! Converts configuration source files into [`SourceModule`]s: import and
//! export declarations, enums, top-level bindings and the default export
//! expression. A hand-written tokenizer feeds a Pratt parser for
//! expressions; module statements are handled in [`module`].

pub mod error;
pub mod lexer;
pub mod module;
pub mod pratt;
pub mod span;
pub mod tokenizer;

pub use error::{ParseError, ParseResult};
pub use pratt::{Parser, parse_expression};
pub use span::Spanned;

use crate::ast::SourceModule;
use crate::error::ConfResult;
use crate::program::FileId;

/// Parse a whole source file
pub fn parse_module(file: &FileId, text: &str) -> ConfResult<SourceModule> {
    let mut module = SourceModule::new(file.clone(), text);
    let result = Parser::new(text).and_then(|mut parser| parser.parse_module_into(&mut module));
    match result {
        Ok(()) => Ok(module),
        Err(err) => Err(err.into_conf_error(file, &module.line_index)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Position;
    use crate::error::ErrorKind;

    #[test]
    fn test_parse_module_reports_location() {
        let file = FileId::new("/project/conf.ts");
        let err = parse_module(&file, "export default {\n  a: 1,,\n};").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert_eq!(err.location().position, Some(Position::new(2, 8)));
        assert_eq!(err.file(), &file);
    }

    #[test]
    fn test_parse_module_empty_file() {
        let module = parse_module(&FileId::new("empty.ts"), "").unwrap();
        assert!(module.default_export.is_none());
        assert!(module.imports.is_empty());
    }
}
