//! Evaluation frames and parameter scopes

use crate::ast::LambdaData;
use crate::model::ConfValue;
use crate::program::FileId;
use smallvec::SmallVec;

/// Arrow-function parameters bound during one application, chained to the
/// scope the arrow was written in
#[derive(Debug)]
pub struct Scope<'s> {
    bindings: SmallVec<[(String, ConfValue); 2]>,
    parent: Option<&'s Scope<'s>>,
}

impl<'s> Scope<'s> {
    /// Bind `params` to `args`; missing arguments read as undefined
    pub fn bind(params: &[String], args: Vec<ConfValue>, parent: Option<&'s Scope<'s>>) -> Self {
        let mut args = args.into_iter();
        let bindings = params
            .iter()
            .map(|param| (param.clone(), args.next().unwrap_or_default()))
            .collect();
        Self { bindings, parent }
    }

    /// Look a parameter up in this scope, then in enclosing ones
    pub fn lookup(&self, name: &str) -> Option<&ConfValue> {
        self.bindings
            .iter()
            .rev()
            .find(|(param, _)| param == name)
            .map(|(_, value)| value)
            .or_else(|| self.parent.and_then(|parent| parent.lookup(name)))
    }
}

/// Where an expression is being evaluated
#[derive(Debug, Clone, Copy)]
pub struct Frame<'f> {
    /// File the expression belongs to
    pub file: &'f FileId,
    /// Innermost arrow parameter scope
    pub scope: Option<&'f Scope<'f>>,
    /// Enum whose earlier members are in scope by bare name
    pub enum_name: Option<&'f str>,
}

impl<'f> Frame<'f> {
    /// Top-level frame of a file
    pub fn top(file: &'f FileId) -> Self {
        Self {
            file,
            scope: None,
            enum_name: None,
        }
    }

    /// Frame for an enum member initializer
    pub fn enum_initializer(file: &'f FileId, enum_name: &'f str) -> Self {
        Self {
            file,
            scope: None,
            enum_name: Some(enum_name),
        }
    }

    /// Frame with an additional parameter scope
    pub fn with_scope(self, scope: &'f Scope<'f>) -> Self {
        Self {
            scope: Some(scope),
            ..self
        }
    }

    /// Look up an arrow parameter visible from this frame
    pub fn parameter(&self, name: &str) -> Option<&'f ConfValue> {
        self.scope.and_then(|scope| scope.lookup(name))
    }
}

/// An arrow function ready to be applied
#[derive(Debug, Clone)]
pub struct Callable<'a, 'f> {
    /// Parameters and body
    pub lambda: &'a LambdaData,
    /// File the arrow is written in
    pub file: FileId,
    /// Scope the arrow closes over
    pub scope: Option<&'f Scope<'f>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inner_scope_shadows_outer() {
        let outer = Scope::bind(
            &["x".to_string(), "y".to_string()],
            vec![ConfValue::from(1), ConfValue::from(2)],
            None,
        );
        let inner = Scope::bind(&["x".to_string()], vec![ConfValue::from("inner")], Some(&outer));
        assert_eq!(inner.lookup("x"), Some(&ConfValue::from("inner")));
        assert_eq!(inner.lookup("y"), Some(&ConfValue::from(2)));
        assert_eq!(inner.lookup("z"), None);

        let partial = Scope::bind(&["a".to_string(), "b".to_string()], vec![], None);
        assert_eq!(partial.lookup("b"), Some(&ConfValue::Absent));
    }
}
