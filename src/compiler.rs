//! Compile entry points
//!
//! A compile runs in three steps over an immutable program: the collection
//! pass builds the macro and enum tables, the evaluator folds the entry's
//! default export, and the output stage renders the value. Every compile owns
//! its tables, so independent compiles can run concurrently.

use crate::collector;
use crate::error::{ConfError, ConfResult};
use crate::evaluator::{DependencySet, Evaluator};
use crate::model::ConfValue;
use crate::output::OutputFormat;
use crate::program::resolver::is_source_file;
use crate::program::{DiskHost, FileId, MemoryHost, Program, ProgramGraph, ProjectConfig, TsConfig};
use indexmap::IndexMap;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Options of one compile
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Expand macros imported from `@conf-ts/macro`
    pub macro_enabled: bool,
    /// Keep mapping keys in evaluation order instead of normalizing them
    pub preserve_key_order: bool,
    /// Variables visible to the `env` macro
    pub env: IndexMap<String, String>,
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_macros(mut self, enabled: bool) -> Self {
        self.macro_enabled = enabled;
        self
    }

    pub fn with_preserved_key_order(mut self, preserve: bool) -> Self {
        self.preserve_key_order = preserve;
        self
    }

    /// Add one variable for the `env` macro
    pub fn with_env_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(name.into(), value.into());
        self
    }

    /// Add variables for the `env` macro
    pub fn with_env<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env
            .extend(vars.into_iter().map(|(name, value)| (name.into(), value.into())));
        self
    }

    /// Options from an untyped object such as
    /// `{ "macro": true, "preserveKeyOrder": false, "env": { "HOME": "/root" } }`.
    ///
    /// Missing keys keep their defaults; keys with the wrong type are an
    /// [`ConfError::InvalidOption`].
    pub fn from_json(value: &serde_json::Value) -> ConfResult<Self> {
        let serde_json::Value::Object(fields) = value else {
            return Err(ConfError::invalid_option("options must be an object"));
        };

        let mut options = Self::default();
        for (key, field) in fields {
            match key.as_str() {
                "macro" => {
                    options.macro_enabled = field
                        .as_bool()
                        .ok_or_else(|| ConfError::invalid_option("macro must be boolean"))?;
                }
                "preserveKeyOrder" => {
                    options.preserve_key_order = field
                        .as_bool()
                        .ok_or_else(|| ConfError::invalid_option("preserveKeyOrder must be boolean"))?;
                }
                "env" => {
                    let serde_json::Value::Object(vars) = field else {
                        return Err(ConfError::invalid_option("env must be an object of strings"));
                    };
                    for (name, var) in vars {
                        let Some(text) = var.as_str() else {
                            return Err(ConfError::invalid_option(format!("env.{name} must be a string")));
                        };
                        options.env.insert(name.clone(), text.to_string());
                    }
                }
                other => log::debug!("Ignoring unknown compile option '{other}'"),
            }
        }
        Ok(options)
    }
}

/// Rendered configuration and the files it was built from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompileOutput {
    /// Rendered text
    pub output: String,
    /// Consulted files, entry first
    pub dependencies: DependencySet,
}

/// Evaluated configuration and the files it was built from
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Value of the entry's default export
    pub value: ConfValue,
    /// Consulted files, entry first
    pub dependencies: DependencySet,
}

/// Compile a file on disk. The nearest `tsconfig.json` above the entry is
/// required and supplies `baseUrl`, `paths` and the project files.
pub fn compile(entry: impl AsRef<Path>, format: OutputFormat, options: &CompileOptions) -> ConfResult<CompileOutput> {
    let entry = absolute_entry(entry.as_ref())?;
    let host = DiskHost;
    let config = ProjectConfig::require(&host, &entry)?;
    log::debug!("Using project root {}", config.root.display());

    let program = Program::load(&host, &config, &entry)?;
    let entry_id = program.entry().clone();
    compile_program(&program, &entry_id, format, options)
}

/// Compile from an in-memory file map. Every file in the map is a program
/// root.
///
/// `config` plays the role of a `tsconfig.json` next to the entry; without
/// it, a `tsconfig.json` in the map is used if present.
pub fn compile_in_memory<I, K, V>(
    files: I,
    entry: impl AsRef<Path>,
    format: OutputFormat,
    options: &CompileOptions,
    config: Option<TsConfig>,
) -> ConfResult<CompileOutput>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<Path>,
    V: Into<String>,
{
    let host: MemoryHost = files.into_iter().collect();
    let entry = entry.as_ref();
    let root = entry.parent().unwrap_or_else(|| Path::new("/"));

    let mut project = match config {
        Some(config) => ProjectConfig::new(config, root),
        None => ProjectConfig::discover(&host, entry)?.unwrap_or_else(|| ProjectConfig::detached(root)),
    };
    project.files = host
        .file_names()
        .filter(|name| is_source_file(name))
        .map(Path::to_path_buf)
        .collect();

    let program = Program::load(&host, &project, entry)?;
    let entry_id = program.entry().clone();
    compile_program(&program, &entry_id, format, options)
}

/// Evaluate and render `entry` of an already built program
pub fn compile_program(
    graph: &dyn ProgramGraph,
    entry: &FileId,
    format: OutputFormat,
    options: &CompileOptions,
) -> ConfResult<CompileOutput> {
    let Evaluation { value, dependencies } = evaluate_program(graph, entry, options)?;
    let output = format.render(&value, options.preserve_key_order)?;
    Ok(CompileOutput { output, dependencies })
}

/// Evaluate the default export of `entry` without rendering it
pub fn evaluate_program(graph: &dyn ProgramGraph, entry: &FileId, options: &CompileOptions) -> ConfResult<Evaluation> {
    log::debug!(
        "Compiling {entry} ({} files, macros {})",
        graph.files().len(),
        if options.macro_enabled { "enabled" } else { "disabled" }
    );
    let tables = collector::collect(graph, options)?;

    let mut evaluator = Evaluator::new(graph, &tables.enums, &tables.macros, options);
    let value = evaluator.evaluate_default_export(entry)?;
    let dependencies = evaluator.into_dependencies();
    log::debug!("{entry} depends on {} files", dependencies.len());
    Ok(Evaluation { value, dependencies })
}

fn absolute_entry(entry: &Path) -> ConfResult<PathBuf> {
    if entry.is_absolute() {
        return Ok(entry.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(|e| ConfError::io(FileId::from(entry), &e))?;
    Ok(cwd.join(entry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_options_from_json() {
        let options = CompileOptions::from_json(&json!({
            "macro": true,
            "preserveKeyOrder": true,
            "env": { "STAGE": "prod" }
        }))
        .unwrap();
        assert_eq!(
            options,
            CompileOptions::new()
                .with_macros(true)
                .with_preserved_key_order(true)
                .with_env_var("STAGE", "prod")
        );
        assert_eq!(CompileOptions::from_json(&json!({})).unwrap(), CompileOptions::default());
    }

    #[test]
    fn test_invalid_options() {
        let err = CompileOptions::from_json(&json!({ "macro": "yes" })).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOption);
        assert_eq!(err.to_string(), "Invalid option: macro must be boolean");

        for bad in [json!([]), json!({ "env": { "A": 1 } }), json!({ "preserveKeyOrder": 0 })] {
            assert_eq!(CompileOptions::from_json(&bad).unwrap_err().kind(), ErrorKind::InvalidOption);
        }
    }

    #[test]
    fn test_in_memory_compile_reports_dependencies() {
        let files = [
            ("/app/main.ts", "import { port } from './net';\nexport default { port };"),
            ("/app/net.ts", "export const port = 8080;"),
            ("/app/unused.ts", "export const other = 1;"),
        ];
        let output = compile_in_memory(files, "/app/main.ts", OutputFormat::Json, &CompileOptions::new(), None).unwrap();
        assert_eq!(output.output, "{\n  \"port\": 8080\n}");
        assert_eq!(output.dependencies.to_strings(), vec!["/app/main.ts", "/app/net.ts"]);
    }
}
