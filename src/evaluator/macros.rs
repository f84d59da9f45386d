//! Macro expansion
//!
//! Only reached for callees found in the current file's macro imports, so
//! every call here is an opted-in use of `@conf-ts/macro`.

use super::context::{Callable, Frame};
use super::engine::Evaluator;
use super::symbols::Reference;
use crate::ast::{CallData, Expression, ExpressionNode};
use crate::error::{ConfError, ConfResult};
use crate::model::ConfValue;
use crate::registry::MacroKind;

impl<'a> Evaluator<'a> {
    /// Expand a macro call in place
    pub(super) fn expand_macro(
        &mut self,
        kind: MacroKind,
        call: &'a CallData,
        expr: &'a Expression,
        frame: Frame<'_>,
    ) -> ConfResult<ConfValue> {
        let (min, max) = kind.arity();
        let count = call.args.len();
        if count < min || count > max {
            let expected = if min == max {
                min.to_string()
            } else {
                format!("{min} to {max}")
            };
            return Err(self.invalid_argument(
                kind,
                format!("expected {expected} arguments, got {count}"),
                frame,
                expr.start,
            ));
        }

        log::trace!("Expanding {kind}() in {}", frame.file);
        self.dependencies.insert(frame.file);
        match kind {
            MacroKind::Env => self.expand_env(&call.args, frame),
            MacroKind::ArrayMap => self.expand_array_map(&call.args, expr, frame),
        }
    }

    /// `env(name, fallback?)`; the fallback is only evaluated on a miss
    fn expand_env(&mut self, args: &'a [Expression], frame: Frame<'_>) -> ConfResult<ConfValue> {
        let [name_expr, rest @ ..] = args else {
            return Ok(ConfValue::Absent);
        };
        let name = match self.eval(name_expr, frame)? {
            ConfValue::String(name) => name,
            other => {
                return Err(self.invalid_argument(
                    MacroKind::Env,
                    format!("variable name must be a string, got {}", other.type_name()),
                    frame,
                    name_expr.start,
                ));
            }
        };

        if let Some(value) = self.options.env.get(&name) {
            return Ok(ConfValue::String(value.clone()));
        }
        match rest.first() {
            Some(fallback) => self.eval(fallback, frame),
            None => Ok(ConfValue::Absent),
        }
    }

    /// `arrayMap(sequence, transform)`; the transform receives the element
    /// and its index
    fn expand_array_map(
        &mut self,
        args: &'a [Expression],
        expr: &'a Expression,
        frame: Frame<'_>,
    ) -> ConfResult<ConfValue> {
        let [sequence_expr, transform_expr] = args else {
            return Err(self.invalid_argument(MacroKind::ArrayMap, "expected 2 arguments", frame, expr.start));
        };
        let items = match self.eval(sequence_expr, frame)? {
            ConfValue::Sequence(items) => items,
            other => {
                return Err(self.invalid_argument(
                    MacroKind::ArrayMap,
                    format!("first argument must be an array, got {}", other.type_name()),
                    frame,
                    sequence_expr.start,
                ));
            }
        };
        let transform = self.callable_argument(transform_expr, frame)?;

        let mut mapped = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            let args = vec![item, ConfValue::Number(index as f64)];
            mapped.push(self.apply(&transform, args, (frame.file, transform_expr.start))?);
        }
        Ok(ConfValue::Sequence(mapped))
    }

    /// An inline arrow, or a reference to a binding holding one
    fn callable_argument<'f>(&mut self, arg: &'a Expression, frame: Frame<'f>) -> ConfResult<Callable<'a, 'f>> {
        if let ExpressionNode::Arrow(lambda) = arg.value.unwrap_type_assertions() {
            return Ok(Callable {
                lambda,
                file: frame.file.clone(),
                scope: frame.scope,
            });
        }
        match self.resolve_reference(arg, frame)? {
            Reference::Function { lambda, file } => Ok(Callable {
                lambda,
                file,
                scope: None,
            }),
            Reference::Value(value) => Err(self.invalid_argument(
                MacroKind::ArrayMap,
                format!("transform must be an arrow function, got {}", value.type_name()),
                frame,
                arg.start,
            )),
            _ => Err(self.invalid_argument(
                MacroKind::ArrayMap,
                "transform must be an arrow function",
                frame,
                arg.start,
            )),
        }
    }

    fn invalid_argument(
        &self,
        kind: MacroKind,
        message: impl Into<String>,
        frame: Frame<'_>,
        offset: usize,
    ) -> ConfError {
        ConfError::InvalidMacroArgument {
            macro_name: kind.name().to_string(),
            message: message.into(),
            location: self.location(frame.file, offset),
        }
    }
}
