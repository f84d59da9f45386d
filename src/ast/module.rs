//! Top-level declarations of a parsed source file

use super::expression::Expression;
use crate::diagnostics::LineIndex;
use crate::program::FileId;

/// Named import `{ imported as local }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpecifier {
    /// Name exported by the target module
    pub imported: String,
    /// Name bound in the importing file
    pub local: String,
    /// `import { type X }`
    pub type_only: bool,
}

/// `import ... from 'module'`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDeclaration {
    /// Module specifier text (quotes removed)
    pub module: String,
    /// `import name from ...`
    pub default: Option<String>,
    /// `import * as name from ...`
    pub namespace: Option<String>,
    /// `import { a, b as c } from ...`
    pub named: Vec<ImportSpecifier>,
    /// `import type ...`
    pub type_only: bool,
    /// Byte offset of the declaration
    pub start: usize,
}

impl ImportDeclaration {
    /// Named specifiers that bind values (type-only ones excluded)
    pub fn value_specifiers(&self) -> impl Iterator<Item = &ImportSpecifier> {
        self.named
            .iter()
            .filter(move |s| !self.type_only && !s.type_only)
    }
}

/// Member of an enum declaration
#[derive(Debug, Clone, PartialEq)]
pub struct EnumMember {
    /// Member name
    pub name: String,
    /// Explicit initializer, if any
    pub initializer: Option<Expression>,
    /// Byte offset of the member
    pub start: usize,
}

/// `enum Name { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDeclaration {
    /// Enum name
    pub name: String,
    /// Members in declaration order
    pub members: Vec<EnumMember>,
    /// Declared with `export`
    pub exported: bool,
    /// Byte offset of the declaration
    pub start: usize,
}

/// Declaration keyword of a binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    /// `const`
    Const,
    /// `let`
    Let,
    /// `var`
    Var,
}

/// Top-level `const`/`let`/`var` declarator
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    /// Bound name
    pub name: String,
    /// Declaration keyword
    pub kind: BindingKind,
    /// Initializer; `let x;` has none and reads as undefined
    pub initializer: Option<Expression>,
    /// Declared with `export`
    pub exported: bool,
    /// Byte offset of the declarator
    pub start: usize,
}

/// Entry of an `export { ... }` list or re-export
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportSpecifier {
    /// `export { local as exported }`
    Local {
        /// Local name
        local: String,
        /// Exported name
        exported: String,
    },
    /// `export { imported as exported } from 'module'`
    ReExport {
        /// Source module
        module: String,
        /// Name in the source module
        imported: String,
        /// Exported name
        exported: String,
    },
    /// `export * from 'module'`
    ReExportAll {
        /// Source module
        module: String,
    },
}

/// Parsed representation of one source file
#[derive(Debug, Clone, PartialEq)]
pub struct SourceModule {
    /// File identifier
    pub file: FileId,
    /// Import declarations in source order
    pub imports: Vec<ImportDeclaration>,
    /// Enum declarations in source order
    pub enums: Vec<EnumDeclaration>,
    /// Top-level bindings in source order
    pub bindings: Vec<Binding>,
    /// Export lists and re-exports
    pub exports: Vec<ExportSpecifier>,
    /// `export default <expr>`
    pub default_export: Option<Expression>,
    /// Offset to line/character conversion
    pub line_index: LineIndex,
}

impl SourceModule {
    /// Create an empty module for a file
    pub fn new(file: FileId, text: &str) -> Self {
        Self {
            file,
            imports: Vec::new(),
            enums: Vec::new(),
            bindings: Vec::new(),
            exports: Vec::new(),
            default_export: None,
            line_index: LineIndex::new(text),
        }
    }

    /// Whether the file exports a value under `name`, either directly
    /// or through an export list. Re-exports are not followed here.
    pub fn exports_locally(&self, name: &str) -> Option<&str> {
        if let Some(binding) = self.bindings.iter().find(|b| b.exported && b.name == name) {
            return Some(&binding.name);
        }
        if let Some(decl) = self.enums.iter().find(|e| e.exported && e.name == name) {
            return Some(&decl.name);
        }
        self.exports.iter().find_map(|spec| match spec {
            ExportSpecifier::Local { local, exported } if exported == name => Some(local.as_str()),
            _ => None,
        })
    }
}
