//! Expression evaluator
//!
//! Folds an [`Expression`] into a [`ConfValue`]. Identifier resolution lives
//! in `symbols.rs`, object and array construction in `object.rs` and macro
//! expansion in `macros.rs`; this file holds the dispatch loop, binding
//! evaluation and arrow application.

use super::context::{Callable, Frame, Scope};
use super::dependency::DependencySet;
use super::operators::{ArithmeticEvaluator, ComparisonEvaluator, LogicalEvaluator};
use crate::ast::{BinaryOpData, CallData, Expression, ExpressionNode, LiteralValue};
use crate::collector::{EnumTable, MacroImportTable};
use crate::compiler::CompileOptions;
use crate::diagnostics::SourceLocation;
use crate::error::{ConfError, ConfResult};
use crate::model::ConfValue;
use crate::model::coercion::to_display_string;
use crate::program::{FileId, ProgramGraph};
use rustc_hash::{FxHashMap, FxHashSet};

/// Nested arrow applications allowed before evaluation gives up
const MAX_CALL_DEPTH: usize = 64;

/// A top-level value that is evaluated at most once per evaluator
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(super) enum ValueSource {
    /// Binding declared at this offset
    Binding(FileId, usize),
    /// `export default` of a file
    DefaultExport(FileId),
}

#[derive(Debug, Clone)]
struct CachedValue {
    value: ConfValue,
    dependencies: DependencySet,
}

/// Recursive expression folder for one compile.
///
/// The enum and macro tables are shared read-only. Every file consulted
/// while evaluating is recorded in the evaluator's [`DependencySet`].
pub struct Evaluator<'a> {
    pub(super) graph: &'a dyn ProgramGraph,
    pub(super) enums: &'a EnumTable,
    pub(super) macros: &'a MacroImportTable,
    pub(super) options: &'a CompileOptions,
    pub(super) dependencies: DependencySet,
    cache: FxHashMap<ValueSource, CachedValue>,
    in_progress: FxHashSet<ValueSource>,
    call_depth: usize,
}

impl<'a> Evaluator<'a> {
    /// Create an evaluator over a program and its collected tables
    pub fn new(
        graph: &'a dyn ProgramGraph,
        enums: &'a EnumTable,
        macros: &'a MacroImportTable,
        options: &'a CompileOptions,
    ) -> Self {
        Self {
            graph,
            enums,
            macros,
            options,
            dependencies: DependencySet::new(),
            cache: FxHashMap::default(),
            in_progress: FxHashSet::default(),
            call_depth: 0,
        }
    }

    /// Evaluate an expression at the top level of `file`
    pub fn evaluate(&mut self, expr: &'a Expression, file: &FileId) -> ConfResult<ConfValue> {
        self.eval(expr, Frame::top(file))
    }

    /// Evaluate an enum member initializer; earlier members of `enum_name`
    /// are visible by bare name
    pub fn evaluate_enum_initializer(
        &mut self,
        expr: &'a Expression,
        file: &FileId,
        enum_name: &str,
    ) -> ConfResult<ConfValue> {
        self.eval(expr, Frame::enum_initializer(file, enum_name))
    }

    /// Evaluate the `export default` expression of `file`
    pub fn evaluate_default_export(&mut self, file: &FileId) -> ConfResult<ConfValue> {
        let Some(expr) = self.graph.exported_expression(file) else {
            return Err(ConfError::NoExportedExpression {
                location: SourceLocation::file_start(file.clone()),
            });
        };
        self.dependencies.insert(file);
        self.evaluate_source(
            ValueSource::DefaultExport(file.clone()),
            "default",
            file,
            Some(expr),
            (file, expr.start),
        )
    }

    /// Files consulted so far
    pub fn dependencies(&self) -> &DependencySet {
        &self.dependencies
    }

    /// Consume the evaluator, keeping the files it consulted
    pub fn into_dependencies(self) -> DependencySet {
        self.dependencies
    }

    /// Line/character location of `offset` in `file`
    pub(super) fn location(&self, file: &FileId, offset: usize) -> SourceLocation {
        SourceLocation::new(file.clone(), self.graph.locate(file, offset))
    }

    pub(super) fn unsupported(&self, file: &FileId, offset: usize, message: impl Into<String>) -> ConfError {
        ConfError::UnsupportedExpression {
            message: message.into(),
            location: self.location(file, offset),
        }
    }

    /// Fold one expression
    pub(super) fn eval(&mut self, expr: &'a Expression, frame: Frame<'_>) -> ConfResult<ConfValue> {
        match &expr.value {
            ExpressionNode::Literal(literal) => Ok(match literal {
                LiteralValue::Boolean(b) => ConfValue::Boolean(*b),
                LiteralValue::Number(n) => ConfValue::Number(*n),
                LiteralValue::String(s) => ConfValue::String(s.clone()),
                LiteralValue::Null => ConfValue::Null,
            }),
            ExpressionNode::Identifier(_)
            | ExpressionNode::Member { .. }
            | ExpressionNode::Index { .. } => {
                let reference = self.resolve_reference(expr, frame)?;
                self.reference_value(reference, expr, frame)
            }
            ExpressionNode::Template(template) => {
                let Some((head, tail)) = template.quasis.split_first() else {
                    return Ok(ConfValue::string(""));
                };
                let mut text = head.clone();
                for (substitution, quasi) in template.expressions.iter().zip(tail) {
                    let value = self.eval(substitution, frame)?;
                    text.push_str(&to_display_string(&value));
                    text.push_str(quasi);
                }
                Ok(ConfValue::String(text))
            }
            ExpressionNode::Object(members) => self.eval_object(members, frame),
            ExpressionNode::Array(elements) => self.eval_array(elements, frame),
            ExpressionNode::Call(call) => self.eval_call(call, expr, frame),
            ExpressionNode::Arrow(_) => Err(self.unsupported(
                frame.file,
                expr.start,
                "Arrow functions can only be called or passed to a macro",
            )),
            ExpressionNode::UnaryOp { op, operand } => {
                let value = self.eval(operand, frame)?;
                Ok(ArithmeticEvaluator::unary(*op, &value))
            }
            ExpressionNode::BinaryOp(data) => self.eval_binary(data, frame),
            ExpressionNode::Conditional(data) => {
                if self.eval(&data.condition, frame)?.is_truthy() {
                    self.eval(&data.then_expr, frame)
                } else {
                    self.eval(&data.else_expr, frame)
                }
            }
            ExpressionNode::TypeAssertion(inner) => self.eval(inner, frame),
        }
    }

    fn eval_binary(&mut self, data: &'a BinaryOpData, frame: Frame<'_>) -> ConfResult<ConfValue> {
        let left = self.eval(&data.left, frame)?;
        if data.op.is_logical() {
            return match LogicalEvaluator::short_circuit(data.op, left) {
                Some(settled) => Ok(settled),
                None => self.eval(&data.right, frame),
            };
        }
        let right = self.eval(&data.right, frame)?;
        if data.op.is_comparison() {
            Ok(ComparisonEvaluator::evaluate(data.op, &left, &right))
        } else {
            Ok(ArithmeticEvaluator::evaluate(data.op, &left, &right))
        }
    }

    fn eval_call(&mut self, call: &'a CallData, expr: &'a Expression, frame: Frame<'_>) -> ConfResult<ConfValue> {
        let callee = &call.callee;
        if let ExpressionNode::Identifier(name) = callee.value.unwrap_type_assertions() {
            if frame.parameter(name).is_none() {
                if let Some(kind) = self.macros.lookup(frame.file, name) {
                    return self.expand_macro(kind, call, expr, frame);
                }
            }
        }

        let reference = match self.resolve_reference(callee, frame) {
            Ok(reference) => reference,
            Err(ConfError::UnresolvedReference { name, location, .. })
                if crate::registry::MacroKind::from_name(&name).is_some()
                    && callee.value.as_identifier() == Some(name.as_str()) =>
            {
                return Err(ConfError::MacroNotImported {
                    name,
                    macro_enabled: self.options.macro_enabled,
                    location,
                });
            }
            Err(err) => return Err(err),
        };
        let Some(callable) = self.reference_callable(reference, callee, frame)? else {
            return Ok(ConfValue::Absent);
        };

        let mut args = Vec::with_capacity(call.args.len());
        for arg in &call.args {
            args.push(self.eval(arg, frame)?);
        }
        self.apply(&callable, args, (frame.file, expr.start))
    }

    /// Apply an arrow function to already-evaluated arguments
    pub(super) fn apply(
        &mut self,
        callable: &Callable<'a, '_>,
        args: Vec<ConfValue>,
        (file, offset): (&FileId, usize),
    ) -> ConfResult<ConfValue> {
        if self.call_depth >= MAX_CALL_DEPTH {
            return Err(self.unsupported(
                file,
                offset,
                format!("Call depth exceeds {MAX_CALL_DEPTH}; recursion is not supported"),
            ));
        }
        let scope = Scope::bind(&callable.lambda.params, args, callable.scope);
        let frame = Frame::top(&callable.file).with_scope(&scope);

        self.call_depth += 1;
        let result = self.eval(&callable.lambda.body, frame);
        self.call_depth -= 1;
        result
    }

    /// Evaluate a top-level binding or default export once, guarding
    /// against cycles and caching the value with the files it consulted
    pub(super) fn evaluate_source(
        &mut self,
        source: ValueSource,
        name: &str,
        file: &FileId,
        initializer: Option<&'a Expression>,
        (site_file, site_offset): (&FileId, usize),
    ) -> ConfResult<ConfValue> {
        if let Some(cached) = self.cache.get(&source) {
            self.dependencies.extend(&cached.dependencies);
            return Ok(cached.value.clone());
        }
        if !self.in_progress.insert(source.clone()) {
            return Err(ConfError::CycleDetected {
                name: name.to_string(),
                location: self.location(site_file, site_offset),
            });
        }
        log::trace!("Evaluating '{name}' in {file}");

        let outer = std::mem::replace(&mut self.dependencies, [file.clone()].into_iter().collect());
        let result = match initializer {
            Some(expr) => self.eval(expr, Frame::top(file)),
            None => Ok(ConfValue::Absent),
        };
        self.in_progress.remove(&source);
        let consulted = std::mem::replace(&mut self.dependencies, outer);

        let value = result?;
        self.dependencies.extend(&consulted);
        self.cache.insert(
            source,
            CachedValue {
                value: value.clone(),
                dependencies: consulted,
            },
        );
        Ok(value)
    }
}
