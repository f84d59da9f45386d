//! Module-level parsing: imports, exports, enums and variable declarations
//!
//! Statements outside the supported subset (type aliases, interfaces,
//! functions, classes, `declare` blocks, destructuring, expression
//! statements) are skipped so that ordinary project files do not break a
//! compile that never references them.

use super::error::{ParseError, ParseResult};
use super::pratt::Parser;
use super::span::Spanned;
use super::tokenizer::Token;
use crate::ast::{
    Binding, BindingKind, EnumDeclaration, EnumMember, ExportSpecifier, ExpressionNode,
    ImportDeclaration, ImportSpecifier, SourceModule,
};
use crate::model::coercion::number_to_string;

/// Keywords that start a new top-level statement
const STATEMENT_KEYWORDS: &[&str] = &[
    "import", "export", "const", "let", "var", "enum", "type", "interface", "function", "class",
    "declare", "namespace", "module", "abstract",
];

impl<'input> Parser<'input> {
    /// Parse every top-level statement into `module`
    pub fn parse_module_into(&mut self, module: &mut SourceModule) -> ParseResult<()> {
        while !self.stream.is_eof() {
            self.parse_statement(module)?;
        }
        Ok(())
    }

    fn parse_statement(&mut self, module: &mut SourceModule) -> ParseResult<()> {
        if self.stream.eat(&Token::Semicolon) {
            return Ok(());
        }
        let Some(word) = self.stream.peek_token().and_then(Token::as_identifier) else {
            return self.skip_statement();
        };

        match word {
            "import" if !self.is_dynamic_import() => {
                if let Some(import) = self.parse_import()? {
                    module.imports.push(import);
                }
                Ok(())
            }
            "export" => self.parse_export(module),
            "const" | "let" | "var" => {
                if self.peek_word_is(1, "enum") {
                    self.stream.next();
                    let decl = self.parse_enum(false)?;
                    module.enums.push(decl);
                    return Ok(());
                }
                let bindings = self.parse_variable_statement(false)?;
                module.bindings.extend(bindings);
                Ok(())
            }
            "enum" => {
                let decl = self.parse_enum(false)?;
                module.enums.push(decl);
                Ok(())
            }
            _ => self.skip_statement(),
        }
    }

    fn peek_word_is(&self, n: usize, word: &str) -> bool {
        self.stream
            .peek_ahead(n)
            .is_some_and(|t| t.value.is_word(word))
    }

    fn is_dynamic_import(&self) -> bool {
        matches!(
            self.stream.peek_ahead(1).map(|t| &t.value),
            Some(Token::LeftParen | Token::Dot)
        )
    }

    fn expect_module_specifier(&mut self) -> ParseResult<String> {
        match self.stream.next() {
            Some(Spanned {
                value: Token::String(specifier),
                ..
            }) => Ok(specifier),
            Some(token) => Err(ParseError::ExpectedToken {
                expected: "module specifier string".to_string(),
                found: token.value.to_string(),
                position: token.start,
            }),
            None => Err(ParseError::UnexpectedEof {
                position: self.stream.offset(),
            }),
        }
    }

    /// Import/export attributes: `with { type: 'json' }`
    fn skip_import_attributes(&mut self) -> ParseResult<()> {
        if (self.stream.check_word("with") || self.stream.check_word("assert"))
            && !self.stream.newline_before()
        {
            self.stream.next();
            self.skip_balanced(Token::LeftBrace, Token::RightBrace)?;
        }
        Ok(())
    }

    fn end_statement(&mut self) -> ParseResult<()> {
        if self.stream.eat(&Token::Semicolon)
            || self.stream.is_eof()
            || self.stream.check(&Token::RightBrace)
            || self.stream.newline_before()
        {
            return Ok(());
        }
        Err(self.stream.expected("';'"))
    }

    fn parse_import(&mut self) -> ParseResult<Option<ImportDeclaration>> {
        let start = self.stream.offset();
        self.stream.next();

        // `import x = require('...')` / `import x = Namespace.y`
        if self.stream.peek_ahead(1).is_some_and(|t| matches!(t.value, Token::Assign)) {
            self.skip_statement()?;
            return Ok(None);
        }

        let mut import = ImportDeclaration {
            module: String::new(),
            default: None,
            namespace: None,
            named: Vec::new(),
            type_only: false,
            start,
        };

        if let Some(Token::String(_)) = self.stream.peek_token() {
            import.module = self.expect_module_specifier()?;
            self.skip_import_attributes()?;
            self.end_statement()?;
            return Ok(Some(import));
        }

        // `import type X from` but not `import type from './x'`
        if self.stream.check_word("type")
            && !self.peek_word_is(1, "from")
            && !matches!(
                self.stream.peek_ahead(1).map(|t| &t.value),
                Some(Token::Comma)
            )
        {
            self.stream.next();
            import.type_only = true;
        }

        if let Some(Token::Identifier(name)) = self.stream.peek_token() {
            import.default = Some(name.to_string());
            self.stream.next();
            if !self.stream.eat(&Token::Comma) {
                return self.finish_import(import).map(Some);
            }
        }

        if self.stream.eat(&Token::Multiply) {
            if !self.stream.eat_word("as") {
                return Err(self.stream.expected("'as'"));
            }
            import.namespace = Some(self.stream.expect_identifier()?.value.to_string());
        } else if self.stream.check(&Token::LeftBrace) {
            import.named = self.parse_named_specifiers()?;
        } else {
            return Err(self.stream.expected("import clause"));
        }

        self.finish_import(import).map(Some)
    }

    fn finish_import(&mut self, mut import: ImportDeclaration) -> ParseResult<ImportDeclaration> {
        if !self.stream.eat_word("from") {
            return Err(self.stream.expected("'from'"));
        }
        import.module = self.expect_module_specifier()?;
        self.skip_import_attributes()?;
        self.end_statement()?;
        Ok(import)
    }

    /// `{ a, b as c, type d, 'e' as f }`
    fn parse_named_specifiers(&mut self) -> ParseResult<Vec<ImportSpecifier>> {
        self.stream.expect(Token::LeftBrace)?;
        let mut specifiers = Vec::new();
        while !self.stream.eat(&Token::RightBrace) {
            let mut type_only = false;
            if self.stream.check_word("type")
                && matches!(
                    self.stream.peek_ahead(1).map(|t| &t.value),
                    Some(Token::Identifier(_) | Token::String(_))
                )
                && !self.peek_word_is(1, "as")
            {
                self.stream.next();
                type_only = true;
            }
            let imported = self.parse_module_export_name()?;
            let local = if self.stream.eat_word("as") {
                self.parse_module_export_name()?
            } else {
                imported.clone()
            };
            specifiers.push(ImportSpecifier {
                imported,
                local,
                type_only,
            });
            if !self.stream.eat(&Token::Comma) {
                self.stream.expect(Token::RightBrace)?;
                break;
            }
        }
        Ok(specifiers)
    }

    fn parse_module_export_name(&mut self) -> ParseResult<String> {
        match self.stream.peek_token() {
            Some(Token::String(name)) => {
                let name = name.clone();
                self.stream.next();
                Ok(name)
            }
            _ => Ok(self.stream.expect_identifier()?.value.to_string()),
        }
    }

    fn parse_export(&mut self, module: &mut SourceModule) -> ParseResult<()> {
        let export_start = self.stream.offset();
        self.stream.next();

        if self.stream.check_word("default") {
            self.stream.next();
            if ["function", "class", "interface", "abstract", "async"]
                .iter()
                .any(|w| self.stream.check_word(w))
            {
                return self.skip_statement();
            }
            if module.default_export.is_some() {
                return Err(ParseError::syntax(
                    "A module cannot have multiple default exports",
                    export_start,
                ));
            }
            let expr = self.parse_expression()?;
            self.end_statement()?;
            module.default_export = Some(expr);
            return Ok(());
        }

        if self.stream.check(&Token::Multiply) {
            self.stream.next();
            if self.stream.eat_word("as") {
                // `export * as ns from` has no counterpart in the value model
                self.stream.expect_identifier()?;
                return self.skip_statement();
            }
            if !self.stream.eat_word("from") {
                return Err(self.stream.expected("'from'"));
            }
            let specifier = self.expect_module_specifier()?;
            self.skip_import_attributes()?;
            self.end_statement()?;
            module.exports.push(ExportSpecifier::ReExportAll { module: specifier });
            return Ok(());
        }

        if self.stream.check_word("type") && self.stream.peek_ahead(1).is_some_and(|t| matches!(t.value, Token::LeftBrace)) {
            return self.skip_statement();
        }

        if self.stream.check(&Token::LeftBrace) {
            return self.parse_export_list(module, export_start);
        }

        match self.stream.peek_token().and_then(Token::as_identifier) {
            Some("const" | "let" | "var") => {
                if self.peek_word_is(1, "enum") {
                    self.stream.next();
                    let decl = self.parse_enum(true)?;
                    module.enums.push(decl);
                    return Ok(());
                }
                let bindings = self.parse_variable_statement(true)?;
                module.bindings.extend(bindings);
                Ok(())
            }
            Some("enum") => {
                let decl = self.parse_enum(true)?;
                module.enums.push(decl);
                Ok(())
            }
            _ => self.skip_statement(),
        }
    }

    /// `export { a, b as c }` or `export { a } from './x'`
    fn parse_export_list(&mut self, module: &mut SourceModule, export_start: usize) -> ParseResult<()> {
        let specifiers = self.parse_named_specifiers()?;
        if self.stream.eat_word("from") {
            let source = self.expect_module_specifier()?;
            self.skip_import_attributes()?;
            self.end_statement()?;
            module.exports.extend(
                specifiers
                    .into_iter()
                    .filter(|s| !s.type_only)
                    .map(|s| ExportSpecifier::ReExport {
                        module: source.clone(),
                        imported: s.imported,
                        exported: s.local,
                    }),
            );
            return Ok(());
        }
        self.end_statement()?;

        for spec in specifiers.into_iter().filter(|s| !s.type_only) {
            if spec.local == "default" {
                if module.default_export.is_some() {
                    return Err(ParseError::syntax(
                        "A module cannot have multiple default exports",
                        export_start,
                    ));
                }
                module.default_export = Some(Spanned::new(
                    ExpressionNode::identifier(spec.imported.clone()),
                    export_start,
                    self.stream.previous_end(),
                ));
            }
            module.exports.push(ExportSpecifier::Local {
                local: spec.imported,
                exported: spec.local,
            });
        }
        Ok(())
    }

    /// `const a = 1, b: T = 2;`
    fn parse_variable_statement(&mut self, exported: bool) -> ParseResult<Vec<Binding>> {
        let statement_start = self.stream.position();
        let kind = match self.stream.next().map(|t| t.value) {
            Some(Token::Identifier("const")) => BindingKind::Const,
            Some(Token::Identifier("let")) => BindingKind::Let,
            _ => BindingKind::Var,
        };

        let mut bindings = Vec::new();
        loop {
            if self.stream.check(&Token::LeftBrace) || self.stream.check(&Token::LeftBracket) {
                // destructuring is outside the supported subset
                self.stream.reset_to(statement_start);
                self.skip_statement()?;
                return Ok(Vec::new());
            }
            let name = self.stream.expect_identifier()?;
            self.stream.eat(&Token::Not);
            if self.stream.eat(&Token::Colon) {
                self.skip_type()?;
            }
            let initializer = if self.stream.eat(&Token::Assign) {
                Some(self.parse_expression()?)
            } else {
                None
            };
            bindings.push(Binding {
                name: name.value.to_string(),
                kind,
                initializer,
                exported,
                start: name.start,
            });
            if !self.stream.eat(&Token::Comma) {
                break;
            }
        }
        self.end_statement()?;
        Ok(bindings)
    }

    /// `enum Name { A, B = 2, 'C' = 'c' }`; the current token is `enum`
    fn parse_enum(&mut self, exported: bool) -> ParseResult<EnumDeclaration> {
        let start = self.stream.offset();
        self.stream.next();
        let name = self.stream.expect_identifier()?;
        self.stream.expect(Token::LeftBrace)?;

        let mut members = Vec::new();
        while !self.stream.eat(&Token::RightBrace) {
            let Some(token) = self.stream.next() else {
                return Err(ParseError::UnexpectedEof {
                    position: self.stream.offset(),
                });
            };
            let member_name = match token.value {
                Token::Identifier(n) => n.to_string(),
                Token::String(s) => s,
                Token::Number(n) => {
                    return Err(ParseError::syntax(
                        format!("An enum member cannot have a numeric name: {}", number_to_string(n)),
                        token.start,
                    ));
                }
                other => {
                    return Err(ParseError::UnexpectedToken {
                        token: other.to_string(),
                        position: token.start,
                    });
                }
            };
            let initializer = if self.stream.eat(&Token::Assign) {
                Some(self.parse_expression()?)
            } else {
                None
            };
            members.push(EnumMember {
                name: member_name,
                initializer,
                start: token.start,
            });
            if !self.stream.eat(&Token::Comma) {
                self.stream.expect(Token::RightBrace)?;
                break;
            }
        }

        Ok(EnumDeclaration {
            name: name.value.to_string(),
            members,
            exported,
            start,
        })
    }

    /// Skip tokens up to the end of the current statement
    fn skip_statement(&mut self) -> ParseResult<()> {
        let start = self.stream.offset();
        let mut depth = 0usize;
        let mut consumed = false;
        let mut closed_block = false;

        while let Some(token) = self.stream.peek_token() {
            if depth == 0 && consumed {
                if matches!(token, Token::Semicolon) {
                    self.stream.next();
                    return Ok(());
                }
                let at_new_line = self.stream.newline_before();
                let starts_statement = token
                    .as_identifier()
                    .is_some_and(|w| STATEMENT_KEYWORDS.contains(&w));
                if at_new_line && (closed_block || starts_statement) {
                    return Ok(());
                }
            }
            closed_block = false;
            match token {
                Token::LeftBrace | Token::LeftParen | Token::LeftBracket => depth += 1,
                Token::RightBrace | Token::RightParen | Token::RightBracket => {
                    if depth == 0 {
                        return Err(ParseError::UnexpectedToken {
                            token: token.to_string(),
                            position: self.stream.offset(),
                        });
                    }
                    depth -= 1;
                    closed_block = depth == 0 && matches!(token, Token::RightBrace);
                }
                _ => {}
            }
            self.stream.next();
            consumed = true;
        }

        if depth > 0 {
            return Err(ParseError::UnexpectedEof { position: start });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::LiteralValue;
    use crate::program::FileId;
    use pretty_assertions::assert_eq;

    fn module(source: &str) -> SourceModule {
        let mut module = SourceModule::new(FileId::new("test.ts"), source);
        let mut parser = Parser::new(source).unwrap();
        parser
            .parse_module_into(&mut module)
            .unwrap_or_else(|e| panic!("parse failed: {e}"));
        module
    }

    #[test]
    fn test_imports() {
        let m = module(
            "import { env, arrayMap as map } from '@conf-ts/macro';\n\
             import Default, * as ns from './a';\n\
             import type { T } from './types';\n\
             import { type U, V } from \"./v\"\n\
             import './side-effect';",
        );
        assert_eq!(m.imports.len(), 5);
        let macros = &m.imports[0];
        assert_eq!(macros.module, "@conf-ts/macro");
        assert_eq!(macros.named[1].imported, "arrayMap");
        assert_eq!(macros.named[1].local, "map");
        assert_eq!(m.imports[1].default.as_deref(), Some("Default"));
        assert_eq!(m.imports[1].namespace.as_deref(), Some("ns"));
        assert!(m.imports[2].type_only);
        let values: Vec<_> = m.imports[3].value_specifiers().map(|s| s.local.as_str()).collect();
        assert_eq!(values, vec!["V"]);
        assert_eq!(m.imports[4].module, "./side-effect");
    }

    #[test]
    fn test_bindings_and_default_export() {
        let m = module(
            "const a = 1, b: number = 2\n\
             export let c!: string;\n\
             export default { a, b } satisfies Config;",
        );
        let names: Vec<_> = m.bindings.iter().map(|b| (b.name.as_str(), b.exported)).collect();
        assert_eq!(names, vec![("a", false), ("b", false), ("c", true)]);
        assert!(m.bindings[2].initializer.is_none());
        assert!(matches!(
            m.default_export.map(|e| e.value),
            Some(ExpressionNode::TypeAssertion(_))
        ));
    }

    #[test]
    fn test_enums() {
        let m = module("export enum Color { Red, Green = 'g', Blue = 5, }\nconst enum Size { 'X-Large' }");
        assert_eq!(m.enums.len(), 2);
        assert!(m.enums[0].exported);
        assert_eq!(m.enums[0].members.len(), 3);
        assert_eq!(
            m.enums[0].members[1].initializer.as_ref().map(|e| &e.value),
            Some(&ExpressionNode::literal(LiteralValue::String("g".into())))
        );
        assert_eq!(m.enums[1].name, "Size");
        assert_eq!(m.enums[1].members[0].name, "X-Large");
    }

    #[test]
    fn test_export_lists() {
        let m = module(
            "const base = 1;\n\
             export { base as value, base as default };\n\
             export { other } from './other';\n\
             export * from './all';",
        );
        assert_eq!(
            m.exports,
            vec![
                ExportSpecifier::Local {
                    local: "base".into(),
                    exported: "value".into()
                },
                ExportSpecifier::Local {
                    local: "base".into(),
                    exported: "default".into()
                },
                ExportSpecifier::ReExport {
                    module: "./other".into(),
                    imported: "other".into(),
                    exported: "other".into()
                },
                ExportSpecifier::ReExportAll {
                    module: "./all".into()
                },
            ]
        );
        assert_eq!(
            m.default_export.clone().map(|e| e.value),
            Some(ExpressionNode::identifier("base"))
        );
        assert_eq!(m.exports_locally("value"), Some("base"));
    }

    #[test]
    fn test_unsupported_statements_are_skipped() {
        let m = module(
            "type Config = {\n  a: number\n}\n\
             interface Other { b: string }\n\
             function helper(x: number) {\n  return x;\n}\n\
             declare const injected: string;\n\
             const { a } = { a: 1 };\n\
             console.log('side effect');\n\
             export default { ok: true };",
        );
        assert!(m.bindings.is_empty());
        assert!(m.default_export.is_some());
    }

    #[test]
    fn test_duplicate_default_export_is_an_error() {
        let source = "export default 1;\nexport default 2;";
        let mut module = SourceModule::new(FileId::new("dup.ts"), source);
        let err = Parser::new(source)
            .unwrap()
            .parse_module_into(&mut module)
            .unwrap_err();
        assert!(err.to_string().contains("multiple default exports"));
    }
}
