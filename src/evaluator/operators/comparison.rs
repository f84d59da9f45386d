//! Equality and relational operators

use crate::ast::BinaryOperator;
use crate::model::ConfValue;
use crate::model::coercion::{loose_equals, strict_equals, to_number, to_primitive};
use std::cmp::Ordering;

/// Evaluator for `== != === !== < <= > >=`
pub struct ComparisonEvaluator;

impl ComparisonEvaluator {
    /// Apply a comparison operator; always yields a boolean
    pub fn evaluate(op: BinaryOperator, left: &ConfValue, right: &ConfValue) -> ConfValue {
        let result = match op {
            BinaryOperator::Equal => loose_equals(left, right),
            BinaryOperator::NotEqual => !loose_equals(left, right),
            BinaryOperator::StrictEqual => strict_equals(left, right),
            BinaryOperator::StrictNotEqual => !strict_equals(left, right),
            BinaryOperator::LessThan => Self::compare(left, right) == Some(Ordering::Less),
            BinaryOperator::LessThanOrEqual => {
                matches!(Self::compare(left, right), Some(Ordering::Less | Ordering::Equal))
            }
            BinaryOperator::GreaterThan => Self::compare(left, right) == Some(Ordering::Greater),
            BinaryOperator::GreaterThanOrEqual => {
                matches!(Self::compare(left, right), Some(Ordering::Greater | Ordering::Equal))
            }
            _ => false,
        };
        ConfValue::Boolean(result)
    }

    /// Abstract relational comparison; `None` when either side is NaN
    fn compare(left: &ConfValue, right: &ConfValue) -> Option<Ordering> {
        let (left, right) = (to_primitive(left), to_primitive(right));
        if let (ConfValue::String(a), ConfValue::String(b)) = (&left, &right) {
            // strings compare by UTF-16 code units
            return Some(a.encode_utf16().cmp(b.encode_utf16()));
        }
        to_number(&left).partial_cmp(&to_number(&right))
    }
}
