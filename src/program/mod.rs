//! Program graph: the parsed files of one compile and how they link together
//!
//! The evaluator only talks to the [`ProgramGraph`] trait. [`Program`] is the
//! implementation built by this crate's own front-end; other front-ends can
//! plug in by implementing the trait.

pub mod builder;
pub mod config;
pub mod file_id;
pub mod host;
pub mod resolver;

pub use builder::ProgramBuilder;
pub use config::{ProjectConfig, TsConfig};
pub use file_id::FileId;
pub use host::{DiskHost, MemoryHost, SourceHost};
pub use resolver::ModuleResolver;

use crate::ast::{Binding, EnumDeclaration, ExportSpecifier, Expression, ImportDeclaration, SourceModule};
use crate::diagnostics::Position;
use rustc_hash::FxHashMap;

/// Read-only view of a parsed program
pub trait ProgramGraph: Send + Sync {
    /// Non-declaration files, dependencies before dependents
    fn files(&self) -> &[FileId];

    /// Enum declarations of a file, in source order
    fn enum_declarations(&self, file: &FileId) -> &[EnumDeclaration];

    /// Import declarations of a file, in source order
    fn import_declarations(&self, file: &FileId) -> &[ImportDeclaration];

    /// The `export default` expression of a file
    fn exported_expression(&self, file: &FileId) -> Option<&Expression>;

    /// Top-level `const`/`let`/`var` bindings of a file
    fn local_bindings(&self, file: &FileId) -> &[Binding];

    /// Export lists and re-exports of a file
    fn export_specifiers(&self, file: &FileId) -> &[ExportSpecifier];

    /// Target of an import specifier written in `file`
    fn resolve_import(&self, file: &FileId, specifier: &str) -> Option<FileId>;

    /// Convert a byte offset in `file` to a line/character position
    fn locate(&self, file: &FileId, offset: usize) -> Position;

    /// Whether the graph holds parsed contents for `file`
    fn contains(&self, file: &FileId) -> bool {
        self.files().contains(file)
    }

    /// The last top-level binding named `name`
    fn local_binding(&self, file: &FileId, name: &str) -> Option<&Binding> {
        self.local_bindings(file).iter().rev().find(|b| b.name == name)
    }

    /// The enum declaration named `name`
    fn enum_declaration(&self, file: &FileId, name: &str) -> Option<&EnumDeclaration> {
        self.enum_declarations(file).iter().find(|e| e.name == name)
    }
}

/// Program produced by [`ProgramBuilder`]
#[derive(Debug, Clone)]
pub struct Program {
    pub(crate) entry: FileId,
    pub(crate) files: Vec<FileId>,
    pub(crate) modules: FxHashMap<FileId, SourceModule>,
    pub(crate) resolutions: FxHashMap<FileId, FxHashMap<String, FileId>>,
}

impl Program {
    /// Load a program from `host`, starting at `entry`
    pub fn load<H: SourceHost + ?Sized>(
        host: &H,
        config: &ProjectConfig,
        entry: impl AsRef<std::path::Path>,
    ) -> crate::error::ConfResult<Self> {
        ProgramBuilder::new(host, config).build(entry.as_ref())
    }

    /// The entry file the program was built from
    pub fn entry(&self) -> &FileId {
        &self.entry
    }

    /// Parsed module of a file
    pub fn module(&self, file: &FileId) -> Option<&SourceModule> {
        self.modules.get(file)
    }
}

impl ProgramGraph for Program {
    fn files(&self) -> &[FileId] {
        &self.files
    }

    fn enum_declarations(&self, file: &FileId) -> &[EnumDeclaration] {
        self.module(file).map(|m| m.enums.as_slice()).unwrap_or_default()
    }

    fn import_declarations(&self, file: &FileId) -> &[ImportDeclaration] {
        self.module(file).map(|m| m.imports.as_slice()).unwrap_or_default()
    }

    fn exported_expression(&self, file: &FileId) -> Option<&Expression> {
        self.module(file).and_then(|m| m.default_export.as_ref())
    }

    fn local_bindings(&self, file: &FileId) -> &[Binding] {
        self.module(file).map(|m| m.bindings.as_slice()).unwrap_or_default()
    }

    fn export_specifiers(&self, file: &FileId) -> &[ExportSpecifier] {
        self.module(file).map(|m| m.exports.as_slice()).unwrap_or_default()
    }

    fn resolve_import(&self, file: &FileId, specifier: &str) -> Option<FileId> {
        self.resolutions.get(file)?.get(specifier).cloned()
    }

    fn locate(&self, file: &FileId, offset: usize) -> Position {
        self.module(file)
            .map(|m| m.line_index.position(offset))
            .unwrap_or_else(Position::start)
    }

    fn contains(&self, file: &FileId) -> bool {
        self.modules.contains_key(file)
    }
}
