//! Object and array literal construction

use super::context::Frame;
use super::engine::Evaluator;
use crate::ast::{ArrayElement, ObjectMember, PropertyKey};
use crate::error::{ConfError, ConfResult};
use crate::model::coercion::to_property_key;
use crate::model::{ConfValue, Mapping};

/// Accumulates the entries of an object literal.
///
/// Assigning a key that already exists moves it to the end, so every key
/// ends up at the position of its last assignment with the rightmost value.
#[derive(Debug, Default)]
pub(super) struct ObjectBuilder {
    entries: Mapping,
}

impl ObjectBuilder {
    pub fn set(&mut self, key: String, value: ConfValue) {
        self.entries.shift_remove(&key);
        self.entries.insert(key, value);
    }

    /// Splice a spread source in: mappings by entry, sequences by index,
    /// anything else contributes nothing
    pub fn spread(&mut self, source: ConfValue) {
        match source {
            ConfValue::Mapping(entries) => {
                for (key, value) in entries {
                    self.set(key, value);
                }
            }
            ConfValue::Sequence(items) => {
                for (index, item) in items.into_iter().enumerate() {
                    self.set(index.to_string(), item);
                }
            }
            _ => {}
        }
    }

    pub fn build(self) -> ConfValue {
        ConfValue::Mapping(self.entries)
    }
}

impl<'a> Evaluator<'a> {
    pub(super) fn eval_object(&mut self, members: &'a [ObjectMember], frame: Frame<'_>) -> ConfResult<ConfValue> {
        let mut object = ObjectBuilder::default();
        for member in members {
            match member {
                ObjectMember::Property { key, value } => {
                    let key = match key {
                        PropertyKey::Static(key) => key.clone(),
                        PropertyKey::Computed(expr) => to_property_key(&self.eval(expr, frame)?),
                    };
                    let value = self.eval(value, frame)?;
                    object.set(key, value);
                }
                ObjectMember::Shorthand(name) => {
                    let value = self.identifier_value(&name.value, name.start, frame)?;
                    object.set(name.value.clone(), value);
                }
                ObjectMember::Spread(expr) => {
                    let source = self.eval(expr, frame)?;
                    object.spread(source);
                }
            }
        }
        Ok(object.build())
    }

    pub(super) fn eval_array(&mut self, elements: &'a [ArrayElement], frame: Frame<'_>) -> ConfResult<ConfValue> {
        let mut items = Vec::with_capacity(elements.len());
        for element in elements {
            match element {
                ArrayElement::Item(expr) => items.push(self.eval(expr, frame)?),
                ArrayElement::Hole => items.push(ConfValue::Absent),
                ArrayElement::Spread(expr) => match self.eval(expr, frame)? {
                    ConfValue::Sequence(values) => items.extend(values),
                    ConfValue::String(text) => {
                        items.extend(text.chars().map(|c| ConfValue::String(c.to_string())))
                    }
                    other => {
                        return Err(ConfError::TypeMismatch {
                            expected: "iterable".to_string(),
                            actual: other.type_name().to_string(),
                            location: self.location(frame.file, expr.start),
                        });
                    }
                },
            }
        }
        Ok(ConfValue::Sequence(items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn keys(value: &ConfValue) -> Vec<&str> {
        value
            .as_mapping()
            .map(|m| m.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_reassigned_key_moves_to_last_assignment() {
        let mut object = ObjectBuilder::default();
        object.set("a".into(), ConfValue::from(1));
        object.set("b".into(), ConfValue::from(2));
        object.set("a".into(), ConfValue::from(3));
        let value = object.build();
        assert_eq!(keys(&value), vec!["b", "a"]);
        assert_eq!(value.get("a"), Some(&ConfValue::from(3)));
    }

    #[test]
    fn test_spread_sources() {
        let mut object = ObjectBuilder::default();
        object.set("x".into(), ConfValue::from(true));
        object.spread(ConfValue::Null);
        object.spread(ConfValue::Absent);
        object.spread(ConfValue::from("ab"));
        object.spread(ConfValue::Sequence(vec![ConfValue::from("p"), ConfValue::from("q")]));

        let mut base = Mapping::new();
        base.insert("x".into(), ConfValue::from(false));
        base.insert("y".into(), ConfValue::Absent);
        object.spread(ConfValue::Mapping(base));

        let value = object.build();
        assert_eq!(keys(&value), vec!["0", "1", "x", "y"]);
        assert_eq!(value.get("x"), Some(&ConfValue::from(false)));
    }
}
