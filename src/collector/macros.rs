//! Macro import validation

use crate::program::{FileId, ProgramGraph};
use crate::registry::{MACRO_MODULE, MacroKind};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;

/// Macros a single file imported, keyed by local name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MacroImports {
    by_local: IndexMap<String, MacroKind>,
}

impl MacroImports {
    /// The macro bound to `local`, if any
    pub fn get(&self, local: &str) -> Option<MacroKind> {
        self.by_local.get(local).copied()
    }

    /// Whether `local` names an imported macro
    pub fn contains(&self, local: &str) -> bool {
        self.by_local.contains_key(local)
    }

    /// `(local name, macro)` pairs in import order
    pub fn iter(&self) -> impl Iterator<Item = (&str, MacroKind)> {
        self.by_local.iter().map(|(name, kind)| (name.as_str(), *kind))
    }

    /// Number of imported macros
    pub fn len(&self) -> usize {
        self.by_local.len()
    }

    /// Whether the file imports no macros
    pub fn is_empty(&self) -> bool {
        self.by_local.is_empty()
    }
}

/// Per-file macro imports for a whole program
#[derive(Debug, Clone, Default)]
pub struct MacroImportTable {
    files: FxHashMap<FileId, MacroImports>,
}

impl MacroImportTable {
    /// Imports of one file
    pub fn get(&self, file: &FileId) -> Option<&MacroImports> {
        self.files.get(file)
    }

    /// The macro bound to `local` in `file`
    pub fn lookup(&self, file: &FileId, local: &str) -> Option<MacroKind> {
        self.files.get(file).and_then(|imports| imports.get(local))
    }

    /// Record the imports of a file
    pub fn insert(&mut self, file: FileId, imports: MacroImports) {
        self.files.insert(file, imports);
    }
}

/// Finds the macros each file opted into via `import { ... } from '@conf-ts/macro'`
pub struct MacroImportValidator;

impl MacroImportValidator {
    /// Macros imported by one file; always empty when macro mode is off.
    ///
    /// Only named, non-type imports count. Default and namespace imports of
    /// the macro module bind nothing callable.
    pub fn validate(graph: &dyn ProgramGraph, file: &FileId, macro_enabled: bool) -> MacroImports {
        let mut imports = MacroImports::default();
        if !macro_enabled {
            return imports;
        }

        for declaration in graph.import_declarations(file) {
            if declaration.module != MACRO_MODULE {
                continue;
            }
            for specifier in declaration.value_specifiers() {
                match MacroKind::from_name(&specifier.imported) {
                    Some(kind) => {
                        imports.by_local.insert(specifier.local.clone(), kind);
                    }
                    None => log::debug!(
                        "{file}: '{}' is not a macro exported by {MACRO_MODULE}",
                        specifier.imported
                    ),
                }
            }
        }
        imports
    }

    /// Macro imports of every file in the program
    pub fn collect(graph: &dyn ProgramGraph, macro_enabled: bool) -> MacroImportTable {
        let mut table = MacroImportTable::default();
        for file in graph.files() {
            table.insert(file.clone(), Self::validate(graph, file, macro_enabled));
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::{MemoryHost, Program, ProjectConfig};
    use std::path::Path;

    fn program(source: &str) -> Program {
        let host = MemoryHost::new().with_file("/m/conf.ts", source);
        let config = ProjectConfig::detached(Path::new("/m"));
        Program::load(&host, &config, "/m/conf.ts").unwrap()
    }

    #[test]
    fn test_named_imports_with_aliases() {
        let program = program(
            "import { env, arrayMap as map, unknown } from '@conf-ts/macro';\n\
             import macros from '@conf-ts/macro';\n\
             import { type env as envType } from '@conf-ts/macro';\n\
             export default 1;",
        );
        let file = FileId::new("/m/conf.ts");
        let imports = MacroImportValidator::validate(&program, &file, true);
        let names: Vec<_> = imports.iter().collect();
        assert_eq!(names, vec![("env", MacroKind::Env), ("map", MacroKind::ArrayMap)]);
        assert!(!imports.contains("arrayMap"));
        assert!(!imports.contains("macros"));
    }

    #[test]
    fn test_disabled_macro_mode_imports_nothing() {
        let program = program("import { env } from '@conf-ts/macro';\nexport default 1;");
        let table = MacroImportValidator::collect(&program, false);
        assert!(table.get(&FileId::new("/m/conf.ts")).is_some_and(MacroImports::is_empty));
    }
}
