//! Compile a statically-checked subset of TypeScript into JSON or YAML
//!
//! A configuration is a TypeScript file whose `export default` expression
//! can be folded at compile time: literals, objects, arrays, enums, imported
//! constants, operators, template literals, simple arrow functions and the
//! opt-in macros of `@conf-ts/macro`.
//!
//! ```no_run
//! use conf_ts::{CompileOptions, OutputFormat, compile};
//!
//! let options = CompileOptions::new().with_macros(true);
//! let result = compile("config/app.ts", OutputFormat::Yaml, &options)?;
//! println!("{}", result.output);
//! # Ok::<(), conf_ts::ConfError>(())
//! ```

pub mod ast;
pub mod collector;
pub mod compiler;
pub mod diagnostics;
pub mod error;
pub mod evaluator;
pub mod model;
pub mod output;
pub mod parser;
pub mod program;
pub mod registry;

pub use compiler::{
    CompileOptions, CompileOutput, Evaluation, compile, compile_in_memory, compile_program, evaluate_program,
};
pub use error::{ConfError, ConfResult, ErrorKind};
pub use evaluator::DependencySet;
pub use model::ConfValue;
pub use output::OutputFormat;
pub use parser::{ParseError, parse_expression, parse_module};
pub use program::{FileId, ProgramGraph};
pub use registry::{MACRO_MODULE, MacroKind};
