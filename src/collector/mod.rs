//! Program-wide tables built before the entry is evaluated
//!
//! Macro imports are gathered first so that enum initializers may already
//! expand macros; enum members are then folded in graph order.

mod enums;
mod macros;

pub use enums::{EnumCollector, EnumEntry, EnumTable};
pub use macros::{MacroImportTable, MacroImportValidator, MacroImports};

use crate::compiler::CompileOptions;
use crate::error::ConfResult;
use crate::program::ProgramGraph;

/// Tables shared read-only by the evaluation pass
#[derive(Debug, Clone, Default)]
pub struct CompileTables {
    /// Folded enum members
    pub enums: EnumTable,
    /// Per-file macro imports
    pub macros: MacroImportTable,
}

/// Run the collection passes over a program
pub fn collect(graph: &dyn ProgramGraph, options: &CompileOptions) -> ConfResult<CompileTables> {
    let macros = MacroImportValidator::collect(graph, options.macro_enabled);
    let enums = EnumCollector::new(graph, &macros, options).collect()?;
    log::debug!(
        "Collection pass over {} files: {} enum members",
        graph.files().len(),
        enums.len()
    );
    Ok(CompileTables { enums, macros })
}
