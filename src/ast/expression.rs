//! Expression AST for the configuration language
//!
//! Nodes are wrapped in [`Spanned`] so that every evaluation error can point
//! back at the offending source text. Large variants are boxed to keep the
//! enum small.

use smallvec::SmallVec;

use super::operator::{BinaryOperator, UnaryOperator};
use crate::parser::Spanned;

/// An expression with its byte span in the owning file
pub type Expression = Spanned<ExpressionNode>;

/// AST representation of expressions
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionNode {
    /// Literal value (string, number, boolean, null)
    Literal(LiteralValue),

    /// Identifier reference (binding, import, enum, parameter)
    Identifier(String),

    /// Template literal with substitutions (boxed for size optimization)
    Template(Box<TemplateData>),

    /// Object literal
    Object(Vec<ObjectMember>),

    /// Array literal
    Array(Vec<ArrayElement>),

    /// Property access (`base.property` or `base?.property`)
    Member {
        /// Base expression
        base: Box<Expression>,
        /// Property name
        property: String,
        /// Optional chaining (`?.`)
        optional: bool,
    },

    /// Element access (`base[index]` or `base?.[index]`)
    Index {
        /// Base expression
        base: Box<Expression>,
        /// Index expression
        index: Box<Expression>,
        /// Optional chaining (`?.[`)
        optional: bool,
    },

    /// Function call (boxed for size optimization)
    Call(Box<CallData>),

    /// Arrow function (boxed for size optimization)
    Arrow(Box<LambdaData>),

    /// Unary operation
    UnaryOp {
        /// The operator
        op: UnaryOperator,
        /// The operand
        operand: Box<Expression>,
    },

    /// Binary operation (boxed for size optimization)
    BinaryOp(Box<BinaryOpData>),

    /// Conditional expression `a ? b : c` (boxed for size optimization)
    Conditional(Box<ConditionalData>),

    /// Type-only wrapper (`x as T`, `x satisfies T`, `x!`, `<T>x`); transparent
    TypeAssertion(Box<Expression>),
}

/// Literal values
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// Boolean literal
    Boolean(bool),
    /// Numeric literal
    Number(f64),
    /// String literal (escapes already processed)
    String(String),
    /// `null`
    Null,
}

/// Template literal parts: `quasis.len() == expressions.len() + 1`
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateData {
    /// Cooked text segments
    pub quasis: Vec<String>,
    /// Substitutions between the segments
    pub expressions: Vec<Expression>,
}

/// Key of an object literal property
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKey {
    /// Identifier, string or numeric key, already normalized to its text
    Static(String),
    /// Computed key `[expr]`
    Computed(Box<Expression>),
}

/// Member of an object literal
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectMember {
    /// `key: value`
    Property {
        /// Property key
        key: PropertyKey,
        /// Property value
        value: Expression,
    },
    /// `{ name }`
    Shorthand(Spanned<String>),
    /// `{ ...expr }`
    Spread(Expression),
}

/// Element of an array literal
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayElement {
    /// Plain element
    Item(Expression),
    /// `...expr`
    Spread(Expression),
    /// Elision (`[1, , 3]`)
    Hole,
}

/// Call data (separate struct to optimize enum size)
#[derive(Debug, Clone, PartialEq)]
pub struct CallData {
    /// Callee expression
    pub callee: Expression,
    /// Call arguments (SmallVec for the common case of 1-2 args)
    pub args: SmallVec<[Expression; 2]>,
}

/// Arrow function data (separate struct to optimize enum size)
#[derive(Debug, Clone, PartialEq)]
pub struct LambdaData {
    /// Parameter names (SmallVec for common case of 0-2 params)
    pub params: SmallVec<[String; 2]>,
    /// Arrow body
    pub body: Expression,
}

/// Binary operation data (separate struct to optimize enum size)
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOpData {
    /// The operator
    pub op: BinaryOperator,
    /// Left operand
    pub left: Expression,
    /// Right operand
    pub right: Expression,
}

/// Conditional expression data (separate struct to optimize enum size)
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalData {
    /// Condition
    pub condition: Expression,
    /// Then branch
    pub then_expr: Expression,
    /// Else branch
    pub else_expr: Expression,
}

impl ExpressionNode {
    /// Create a literal expression
    pub fn literal(value: LiteralValue) -> Self {
        Self::Literal(value)
    }

    /// Create an identifier expression
    pub fn identifier(name: impl Into<String>) -> Self {
        Self::Identifier(name.into())
    }

    /// Create a binary operation
    pub fn binary_op(op: BinaryOperator, left: Expression, right: Expression) -> Self {
        Self::BinaryOp(Box::new(BinaryOpData { op, left, right }))
    }

    /// Create a unary operation
    pub fn unary_op(op: UnaryOperator, operand: Expression) -> Self {
        Self::UnaryOp {
            op,
            operand: Box::new(operand),
        }
    }

    /// Create a property access
    pub fn member(base: Expression, property: impl Into<String>, optional: bool) -> Self {
        Self::Member {
            base: Box::new(base),
            property: property.into(),
            optional,
        }
    }

    /// Create an element access
    pub fn index(base: Expression, index: Expression, optional: bool) -> Self {
        Self::Index {
            base: Box::new(base),
            index: Box::new(index),
            optional,
        }
    }

    /// Create a call expression
    pub fn call(callee: Expression, args: impl Into<SmallVec<[Expression; 2]>>) -> Self {
        Self::Call(Box::new(CallData {
            callee,
            args: args.into(),
        }))
    }

    /// Create an arrow function with multiple parameters
    pub fn lambda(params: impl Into<SmallVec<[String; 2]>>, body: Expression) -> Self {
        Self::Arrow(Box::new(LambdaData {
            params: params.into(),
            body,
        }))
    }

    /// Create an arrow function with a single parameter
    pub fn lambda_single(param: impl Into<String>, body: Expression) -> Self {
        let mut params = SmallVec::new();
        params.push(param.into());
        Self::lambda(params, body)
    }

    /// Create a conditional expression
    pub fn conditional(condition: Expression, then_expr: Expression, else_expr: Expression) -> Self {
        Self::Conditional(Box::new(ConditionalData {
            condition,
            then_expr,
            else_expr,
        }))
    }

    /// Create a template literal
    pub fn template(quasis: Vec<String>, expressions: Vec<Expression>) -> Self {
        Self::Template(Box::new(TemplateData {
            quasis,
            expressions,
        }))
    }

    /// Wrap an expression in a transparent type assertion
    pub fn type_assertion(expression: Expression) -> Self {
        Self::TypeAssertion(Box::new(expression))
    }

    /// Get identifier name if this is an identifier
    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Self::Identifier(name) => Some(name),
            _ => None,
        }
    }

    /// Get literal value if this is a literal
    pub fn as_literal(&self) -> Option<&LiteralValue> {
        match self {
            Self::Literal(value) => Some(value),
            _ => None,
        }
    }

    /// Strip type-only wrappers
    pub fn unwrap_type_assertions(&self) -> &ExpressionNode {
        let mut node = self;
        while let Self::TypeAssertion(inner) = node {
            node = &inner.value;
        }
        node
    }

    /// Short description used in error messages
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Literal(_) => "literal",
            Self::Identifier(_) => "identifier",
            Self::Template(_) => "template literal",
            Self::Object(_) => "object literal",
            Self::Array(_) => "array literal",
            Self::Member { .. } => "property access",
            Self::Index { .. } => "element access",
            Self::Call(_) => "call expression",
            Self::Arrow(_) => "arrow function",
            Self::UnaryOp { .. } => "unary expression",
            Self::BinaryOp(_) => "binary expression",
            Self::Conditional(_) => "conditional expression",
            Self::TypeAssertion(_) => "type assertion",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spanned(node: ExpressionNode) -> Expression {
        Spanned::new(node, 0, 0)
    }

    #[test]
    fn test_unwrap_type_assertions() {
        let inner = spanned(ExpressionNode::identifier("config"));
        let outer = ExpressionNode::type_assertion(spanned(ExpressionNode::type_assertion(inner)));
        assert_eq!(outer.unwrap_type_assertions().as_identifier(), Some("config"));
    }

    #[test]
    fn test_lambda_single() {
        let node = ExpressionNode::lambda_single("x", spanned(ExpressionNode::identifier("x")));
        match node {
            ExpressionNode::Arrow(data) => assert_eq!(data.params.as_slice(), ["x".to_string()]),
            other => panic!("expected arrow, got {other:?}"),
        }
    }
}
