//! Logical operators: `&&`, `||`, `??`

use crate::ast::BinaryOperator;
use crate::model::ConfValue;

/// Evaluator for the short-circuiting operators
pub struct LogicalEvaluator;

impl LogicalEvaluator {
    /// Decide whether `left` settles the operation.
    ///
    /// Returns `Some(left)` when the right operand must not be evaluated,
    /// `None` when the result is the right operand.
    pub fn short_circuit(op: BinaryOperator, left: ConfValue) -> Option<ConfValue> {
        let settled = match op {
            BinaryOperator::And => !left.is_truthy(),
            BinaryOperator::Or => left.is_truthy(),
            BinaryOperator::Coalesce => !left.is_nullish(),
            _ => true,
        };
        settled.then_some(left)
    }

    /// Both operands already known
    pub fn evaluate(op: BinaryOperator, left: ConfValue, right: ConfValue) -> ConfValue {
        Self::short_circuit(op, left).unwrap_or(right)
    }

    /// Logical NOT
    pub fn not(operand: &ConfValue) -> ConfValue {
        ConfValue::Boolean(!operand.is_truthy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ConfValue::Boolean(true), ConfValue::Boolean(true), ConfValue::Boolean(true))]
    #[case(ConfValue::Boolean(true), ConfValue::Boolean(false), ConfValue::Boolean(false))]
    #[case(ConfValue::from(1), ConfValue::from("a"), ConfValue::from("a"))]
    #[case(ConfValue::from(0), ConfValue::from("a"), ConfValue::from(0))]
    #[case(ConfValue::from(""), ConfValue::from(1), ConfValue::from(""))]
    #[case(ConfValue::Null, ConfValue::from("a"), ConfValue::Null)]
    fn test_and(#[case] left: ConfValue, #[case] right: ConfValue, #[case] expected: ConfValue) {
        assert_eq!(LogicalEvaluator::evaluate(BinaryOperator::And, left, right), expected);
    }

    #[rstest]
    #[case(ConfValue::Boolean(false), ConfValue::Boolean(true), ConfValue::Boolean(true))]
    #[case(ConfValue::from(0), ConfValue::from("a"), ConfValue::from("a"))]
    #[case(ConfValue::from(""), ConfValue::from(1), ConfValue::from(1))]
    #[case(ConfValue::Number(f64::NAN), ConfValue::Null, ConfValue::Null)]
    fn test_or(#[case] left: ConfValue, #[case] right: ConfValue, #[case] expected: ConfValue) {
        assert_eq!(LogicalEvaluator::evaluate(BinaryOperator::Or, left, right), expected);
    }

    #[rstest]
    #[case(ConfValue::Null, ConfValue::from("d"))]
    #[case(ConfValue::Absent, ConfValue::from("d"))]
    #[case(ConfValue::from(0), ConfValue::from(0))]
    #[case(ConfValue::Boolean(false), ConfValue::Boolean(false))]
    #[case(ConfValue::from(""), ConfValue::from(""))]
    fn test_coalesce(#[case] left: ConfValue, #[case] expected: ConfValue) {
        assert_eq!(
            LogicalEvaluator::evaluate(BinaryOperator::Coalesce, left, ConfValue::from("d")),
            expected
        );
    }

    #[test]
    fn test_not_is_always_boolean() {
        assert_eq!(LogicalEvaluator::not(&ConfValue::from("x")), ConfValue::Boolean(false));
        assert_eq!(LogicalEvaluator::not(&ConfValue::Absent), ConfValue::Boolean(true));
    }
}
