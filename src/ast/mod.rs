//! Abstract Syntax Tree (AST) definitions for configuration sources
//!
//! Expressions cover the literal-foldable subset of TypeScript; module-level
//! declarations record what the program graph exposes (imports, enums,
//! bindings, exports).

mod expression;
mod module;
mod operator;

pub use expression::*;
pub use module::*;
pub use operator::*;
