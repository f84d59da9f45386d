//! Operator semantics, independent of expression traversal
//!
//! Each evaluator works on already-folded operands. Short-circuiting is
//! driven by the engine through [`LogicalEvaluator::short_circuit`].

pub mod arithmetic;
pub mod comparison;
pub mod logical;

pub use arithmetic::ArithmeticEvaluator;
pub use comparison::ComparisonEvaluator;
pub use logical::LogicalEvaluator;
