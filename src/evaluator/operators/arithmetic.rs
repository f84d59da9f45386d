//! Arithmetic and unary operators with JavaScript coercions

use super::LogicalEvaluator;
use crate::ast::{BinaryOperator, UnaryOperator};
use crate::model::ConfValue;
use crate::model::coercion::{to_display_string, to_number, to_primitive};

/// Evaluator for `+ - * / % **` and the numeric unary operators
pub struct ArithmeticEvaluator;

impl ArithmeticEvaluator {
    /// Apply an arithmetic operator
    pub fn evaluate(op: BinaryOperator, left: &ConfValue, right: &ConfValue) -> ConfValue {
        if op == BinaryOperator::Add {
            return Self::add(left, right);
        }
        let (a, b) = (to_number(left), to_number(right));
        let result = match op {
            BinaryOperator::Subtract => a - b,
            BinaryOperator::Multiply => a * b,
            BinaryOperator::Divide => a / b,
            // f64 `%` truncates like JavaScript's remainder
            BinaryOperator::Modulo => a % b,
            BinaryOperator::Exponent => Self::power(a, b),
            _ => f64::NAN,
        };
        ConfValue::Number(result)
    }

    /// `+`: string concatenation if either primitive is a string, numeric addition otherwise
    pub fn add(left: &ConfValue, right: &ConfValue) -> ConfValue {
        let (left, right) = (to_primitive(left), to_primitive(right));
        if matches!(left, ConfValue::String(_)) || matches!(right, ConfValue::String(_)) {
            let mut text = to_display_string(&left);
            text.push_str(&to_display_string(&right));
            return ConfValue::String(text);
        }
        ConfValue::Number(to_number(&left) + to_number(&right))
    }

    /// `**`, where `1 ** NaN` and `(±1) ** ±Infinity` are NaN
    fn power(base: f64, exponent: f64) -> f64 {
        if exponent.is_nan() || (base.abs() == 1.0 && exponent.is_infinite()) {
            return f64::NAN;
        }
        base.powf(exponent)
    }

    /// Apply a unary operator
    pub fn unary(op: UnaryOperator, operand: &ConfValue) -> ConfValue {
        match op {
            UnaryOperator::Not => LogicalEvaluator::not(operand),
            UnaryOperator::Negate => ConfValue::Number(-to_number(operand)),
            UnaryOperator::Plus => ConfValue::Number(to_number(operand)),
            UnaryOperator::TypeOf => ConfValue::string(operand.type_tag()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ConfValue::from(1), ConfValue::from(2), ConfValue::from(3))]
    #[case(ConfValue::from("a"), ConfValue::from(1), ConfValue::from("a1"))]
    #[case(ConfValue::from(1), ConfValue::from("1"), ConfValue::from("11"))]
    #[case(ConfValue::Boolean(true), ConfValue::from(1), ConfValue::from(2))]
    #[case(ConfValue::Null, ConfValue::from(1), ConfValue::from(1))]
    #[case(ConfValue::Sequence(vec![ConfValue::from(1), ConfValue::from(2)]), ConfValue::from("x"), ConfValue::from("1,2x"))]
    fn test_add(#[case] left: ConfValue, #[case] right: ConfValue, #[case] expected: ConfValue) {
        assert_eq!(ArithmeticEvaluator::add(&left, &right), expected);
    }

    #[test]
    fn test_numeric_operators() {
        let eval = |op, a: f64, b: f64| {
            ArithmeticEvaluator::evaluate(op, &ConfValue::Number(a), &ConfValue::Number(b))
        };
        assert_eq!(eval(BinaryOperator::Subtract, 5.0, 7.0), ConfValue::from(-2));
        assert_eq!(eval(BinaryOperator::Modulo, -7.0, 3.0), ConfValue::from(-1));
        assert_eq!(eval(BinaryOperator::Exponent, 2.0, 10.0), ConfValue::from(1024));
        assert_eq!(eval(BinaryOperator::Divide, 1.0, 0.0), ConfValue::Number(f64::INFINITY));
        let ConfValue::Number(n) = eval(BinaryOperator::Exponent, 1.0, f64::NAN) else {
            panic!("expected a number");
        };
        assert!(n.is_nan());
    }

    #[test]
    fn test_unary() {
        assert_eq!(
            ArithmeticEvaluator::unary(UnaryOperator::Negate, &ConfValue::from("3")),
            ConfValue::from(-3)
        );
        assert_eq!(
            ArithmeticEvaluator::unary(UnaryOperator::TypeOf, &ConfValue::Null),
            ConfValue::from("object")
        );
        assert_eq!(
            ArithmeticEvaluator::unary(UnaryOperator::Plus, &ConfValue::Boolean(true)),
            ConfValue::from(1)
        );
    }
}
