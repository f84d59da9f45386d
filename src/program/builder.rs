//! Program construction: root discovery, parsing and import following

use super::config::ProjectConfig;
use super::host::SourceHost;
use super::resolver::{ModuleResolver, is_source_file, normalize_path};
use super::{FileId, Program};
use crate::ast::{ExportSpecifier, SourceModule};
use crate::error::ConfResult;
use crate::parser::parse_module;
use indexmap::IndexSet;
use rustc_hash::{FxHashMap, FxHashSet};
use std::path::{Path, PathBuf};

/// Builds a [`Program`] from a host and a project configuration.
///
/// Files are enumerated depth-first in post-order over their imports, so
/// every file appears after the files it imports. The entry file and
/// everything it reaches must parse; other root files that fail to parse
/// are left out of the program with a warning.
pub struct ProgramBuilder<'a, H: SourceHost + ?Sized> {
    host: &'a H,
    config: &'a ProjectConfig,
    order: Vec<FileId>,
    modules: FxHashMap<FileId, SourceModule>,
    resolutions: FxHashMap<FileId, FxHashMap<String, FileId>>,
    visited: FxHashSet<FileId>,
}

impl<'a, H: SourceHost + ?Sized> ProgramBuilder<'a, H> {
    /// Create a builder
    pub fn new(host: &'a H, config: &'a ProjectConfig) -> Self {
        Self {
            host,
            config,
            order: Vec::new(),
            modules: FxHashMap::default(),
            resolutions: FxHashMap::default(),
            visited: FxHashSet::default(),
        }
    }

    /// Build the program reachable from `entry` and the configured roots
    pub fn build(mut self, entry: &Path) -> ConfResult<Program> {
        let entry = FileId::from(normalize_path(entry).as_path());
        self.visit(&entry, true)?;

        for root in self.configured_roots() {
            let file = FileId::from(root.as_path());
            if let Err(err) = self.visit(&file, false) {
                log::warn!("Skipping {file}: {err}");
            }
        }

        log::debug!(
            "Program has {} files ({} parsed)",
            self.order.len(),
            self.modules.len()
        );
        Ok(Program {
            entry,
            files: self.order,
            modules: self.modules,
            resolutions: self.resolutions,
        })
    }

    fn configured_roots(&self) -> IndexSet<PathBuf> {
        let mut roots: IndexSet<PathBuf> = self
            .config
            .files
            .iter()
            .filter(|file| self.host.file_exists(file))
            .cloned()
            .collect();
        for pattern in &self.config.include {
            roots.extend(
                self.host
                    .glob(pattern)
                    .into_iter()
                    .filter(|path| is_source_file(path) && !self.config.is_excluded(path)),
            );
        }
        roots
    }

    fn visit(&mut self, file: &FileId, required: bool) -> ConfResult<()> {
        if !self.visited.insert(file.clone()) {
            return Ok(());
        }
        if file.is_declaration() {
            log::trace!("Not parsing declaration file {file}");
            return Ok(());
        }

        let text = self.host.read_file(file.as_path())?;
        let module = parse_module(file, &text)?;
        log::trace!(
            "Parsed {file}: {} imports, {} enums, {} bindings",
            module.imports.len(),
            module.enums.len(),
            module.bindings.len()
        );

        let specifiers: Vec<String> = module
            .imports
            .iter()
            .filter(|import| !import.type_only)
            .map(|import| import.module.clone())
            .chain(module.exports.iter().filter_map(|export| match export {
                ExportSpecifier::ReExport { module, .. } | ExportSpecifier::ReExportAll { module } => {
                    Some(module.clone())
                }
                ExportSpecifier::Local { .. } => None,
            }))
            .collect();
        self.modules.insert(file.clone(), module);

        let resolver = ModuleResolver::new(self.host, self.config);
        for specifier in specifiers {
            let Some(target) = resolver.resolve(file, &specifier) else {
                continue;
            };
            self.resolutions
                .entry(file.clone())
                .or_default()
                .insert(specifier, target.clone());
            match self.visit(&target, required) {
                Ok(()) => {}
                Err(err) if !required => log::warn!("Skipping {target}: {err}"),
                Err(err) => return Err(err),
            }
        }

        self.order.push(file.clone());
        Ok(())
    }
}
