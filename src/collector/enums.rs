//! Enum collection
//!
//! Folds every enum member of the program into an [`EnumTable`] before the
//! entry is evaluated. Files are visited in graph order, which puts imported
//! files before their importers.

use super::macros::MacroImportTable;
use crate::ast::EnumDeclaration;
use crate::compiler::CompileOptions;
use crate::error::ConfResult;
use crate::evaluator::{DependencySet, Evaluator};
use crate::model::ConfValue;
use crate::program::{FileId, ProgramGraph};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;

/// Folded value of one enum member
#[derive(Debug, Clone, PartialEq)]
pub struct EnumEntry {
    /// Member value
    pub value: ConfValue,
    /// Files the member's initializer consulted
    pub dependencies: DependencySet,
}

/// Enum member values of a whole program, keyed by file then `Enum.Member`
#[derive(Debug, Clone, Default)]
pub struct EnumTable {
    files: FxHashMap<FileId, IndexMap<String, EnumEntry>>,
}

impl EnumTable {
    /// Look up `enum_name.member` declared in `file`
    pub fn get(&self, file: &FileId, enum_name: &str, member: &str) -> Option<&EnumEntry> {
        self.files.get(file)?.get(&member_key(enum_name, member))
    }

    /// Record a member value
    pub fn insert(&mut self, file: &FileId, enum_name: &str, member: &str, entry: EnumEntry) {
        self.files
            .entry(file.clone())
            .or_default()
            .insert(member_key(enum_name, member), entry);
    }

    /// `(Enum.Member, entry)` pairs of one file in collection order
    pub fn members(&self, file: &FileId) -> impl Iterator<Item = (&str, &EnumEntry)> {
        self.files
            .get(file)
            .into_iter()
            .flat_map(|members| members.iter().map(|(key, entry)| (key.as_str(), entry)))
    }

    /// Total number of members
    pub fn len(&self) -> usize {
        self.files.values().map(IndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.files.values().all(IndexMap::is_empty)
    }
}

fn member_key(enum_name: &str, member: &str) -> String {
    format!("{enum_name}.{member}")
}

/// Builds the [`EnumTable`] for a program
pub struct EnumCollector<'a> {
    graph: &'a dyn ProgramGraph,
    macros: &'a MacroImportTable,
    options: &'a CompileOptions,
}

impl<'a> EnumCollector<'a> {
    pub fn new(graph: &'a dyn ProgramGraph, macros: &'a MacroImportTable, options: &'a CompileOptions) -> Self {
        Self {
            graph,
            macros,
            options,
        }
    }

    /// Fold every member of every enum; the first failing initializer
    /// aborts collection
    pub fn collect(&self) -> ConfResult<EnumTable> {
        let mut table = EnumTable::default();
        for file in self.graph.files() {
            for declaration in self.graph.enum_declarations(file) {
                self.collect_enum(&mut table, file, declaration)?;
            }
        }
        log::debug!("Collected {} enum members", table.len());
        Ok(table)
    }

    /// Implicit members count up from the last numeric value; a string
    /// member leaves the counter where it was
    fn collect_enum(&self, table: &mut EnumTable, file: &FileId, declaration: &EnumDeclaration) -> ConfResult<()> {
        let mut counter = 0.0;
        for member in &declaration.members {
            let entry = match &member.initializer {
                Some(initializer) => {
                    let mut evaluator = Evaluator::new(self.graph, table, self.macros, self.options);
                    let value = evaluator.evaluate_enum_initializer(initializer, file, &declaration.name)?;
                    if let ConfValue::Number(n) = value {
                        counter = n + 1.0;
                    }
                    EnumEntry {
                        value,
                        dependencies: evaluator.into_dependencies(),
                    }
                }
                None => {
                    let value = ConfValue::Number(counter);
                    counter += 1.0;
                    EnumEntry {
                        value,
                        dependencies: DependencySet::new(),
                    }
                }
            };
            log::trace!("{file}: {}.{} = {:?}", declaration.name, member.name, entry.value);
            table.insert(file, &declaration.name, &member.name, entry);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::MacroImportValidator;
    use crate::error::ErrorKind;
    use crate::program::{MemoryHost, Program, ProjectConfig};
    use pretty_assertions::assert_eq;
    use std::path::Path;

    fn collect(files: &[(&str, &str)]) -> ConfResult<(Program, EnumTable)> {
        let host: MemoryHost = files
            .iter()
            .map(|(name, text)| (name.to_string(), text.to_string()))
            .collect();
        let config = ProjectConfig::detached(Path::new("/p"));
        let program = Program::load(&host, &config, files[0].0)?;
        let options = CompileOptions::default();
        let macros = MacroImportValidator::collect(&program, false);
        let table = EnumCollector::new(&program, &macros, &options).collect()?;
        Ok((program, table))
    }

    fn values(table: &EnumTable, file: &str) -> Vec<(String, ConfValue)> {
        table
            .members(&FileId::new(file))
            .map(|(key, entry)| (key.to_string(), entry.value.clone()))
            .collect()
    }

    #[test]
    fn test_auto_increment_and_string_members() {
        let (_, table) = collect(&[(
            "/p/enums.ts",
            "export enum E { A, B = 10, C, D = 'd', F, G = B * 2, H }\nexport default 1;",
        )])
        .unwrap();
        assert_eq!(
            values(&table, "/p/enums.ts"),
            vec![
                ("E.A".to_string(), ConfValue::from(0)),
                ("E.B".to_string(), ConfValue::from(10)),
                ("E.C".to_string(), ConfValue::from(11)),
                ("E.D".to_string(), ConfValue::from("d")),
                ("E.F".to_string(), ConfValue::from(12)),
                ("E.G".to_string(), ConfValue::from(20)),
                ("E.H".to_string(), ConfValue::from(21)),
            ]
        );
    }

    #[test]
    fn test_leading_string_member_keeps_zero_baseline() {
        let (_, table) = collect(&[("/p/enums.ts", "enum S { X = 'x', Y }\nexport default 1;")]).unwrap();
        let file = FileId::new("/p/enums.ts");
        assert_eq!(table.get(&file, "S", "Y").map(|e| &e.value), Some(&ConfValue::from(0)));
    }

    #[test]
    fn test_initializer_dependencies_are_recorded() {
        let (_, table) = collect(&[
            (
                "/p/main.ts",
                "import { BASE } from './base';\nexport enum Port { Http = BASE + 80 }\nexport default Port.Http;",
            ),
            ("/p/base.ts", "export const BASE = 8000;"),
        ])
        .unwrap();
        let entry = table.get(&FileId::new("/p/main.ts"), "Port", "Http").unwrap();
        assert_eq!(entry.value, ConfValue::from(8080));
        assert!(entry.dependencies.contains(&FileId::new("/p/base.ts")));
    }

    #[test]
    fn test_failing_initializer_aborts() {
        let err = collect(&[("/p/enums.ts", "enum E { A = missing }\nexport default 1;")]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnresolvedReference);
        assert_eq!(err.file(), &FileId::new("/p/enums.ts"));
    }
}
