//! Primitive conversions with the source language's semantics
//!
//! These mirror ToNumber, ToString and the equality algorithms closely
//! enough for compile-time folding of configuration values.

use super::value::ConfValue;

/// Parse a canonical array index (`"0"`, `"17"`, but not `"01"` or `"-1"`)
pub fn array_index(key: &str) -> Option<usize> {
    if key.is_empty() || (key.len() > 1 && key.starts_with('0')) {
        return None;
    }
    if !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse::<u32>()
        .ok()
        .filter(|i| *i < u32::MAX)
        .map(|i| i as usize)
}

/// ToNumber
pub fn to_number(value: &ConfValue) -> f64 {
    match value {
        ConfValue::Null => 0.0,
        ConfValue::Absent => f64::NAN,
        ConfValue::Boolean(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        ConfValue::Number(n) => *n,
        ConfValue::String(s) => string_to_number(s),
        ConfValue::Sequence(items) => match items.as_slice() {
            [] => 0.0,
            [single] => to_number(&ConfValue::String(to_display_string(single))),
            _ => f64::NAN,
        },
        ConfValue::Mapping(_) => f64::NAN,
    }
}

/// String to number conversion: whitespace-trimmed decimal, hex, octal or
/// binary literal; empty string is zero
pub fn string_to_number(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    let radix = |prefix: &[&str], radix: u32| -> Option<f64> {
        prefix
            .iter()
            .find_map(|p| trimmed.strip_prefix(p))
            .map(|digits| {
                u64::from_str_radix(digits, radix)
                    .map(|v| v as f64)
                    .unwrap_or(f64::NAN)
            })
    };
    if let Some(v) = radix(&["0x", "0X"], 16) {
        return v;
    }
    if let Some(v) = radix(&["0o", "0O"], 8) {
        return v;
    }
    if let Some(v) = radix(&["0b", "0B"], 2) {
        return v;
    }
    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    // Rust accepts "inf"/"nan" spellings that are not numbers here
    if trimmed
        .bytes()
        .any(|b| !(b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-')))
    {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// Number to string conversion
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    let abs = n.abs();
    if n.fract() == 0.0 && abs < 1e21 {
        return format!("{n:.0}");
    }
    if (1e-6..1e21).contains(&abs) {
        return format!("{n}");
    }
    exponential(n)
}

fn exponential(n: f64) -> String {
    // `{:e}` yields the shortest round-trip digits, e.g. `1.5e-7` or `1e21`
    let formatted = format!("{n:e}");
    match formatted.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
        _ => formatted,
    }
}

/// ToString as used by template literals and string concatenation
pub fn to_display_string(value: &ConfValue) -> String {
    match value {
        ConfValue::Null => "null".to_string(),
        ConfValue::Absent => "undefined".to_string(),
        ConfValue::Boolean(b) => b.to_string(),
        ConfValue::Number(n) => number_to_string(*n),
        ConfValue::String(s) => s.clone(),
        ConfValue::Sequence(items) => items
            .iter()
            .map(|item| {
                if item.is_nullish() {
                    String::new()
                } else {
                    to_display_string(item)
                }
            })
            .collect::<Vec<_>>()
            .join(","),
        ConfValue::Mapping(_) => "[object Object]".to_string(),
    }
}

/// Key used when a value is used as a property name (`obj[key]`, `{[key]: v}`)
pub fn to_property_key(value: &ConfValue) -> String {
    to_display_string(value)
}

/// Strict equality (`===`). Mappings and sequences compare structurally,
/// since compile-time values have no identity.
pub fn strict_equals(left: &ConfValue, right: &ConfValue) -> bool {
    match (left, right) {
        (ConfValue::Number(a), ConfValue::Number(b)) => a == b,
        _ => left == right,
    }
}

/// Loose equality (`==`)
pub fn loose_equals(left: &ConfValue, right: &ConfValue) -> bool {
    use ConfValue::*;
    match (left, right) {
        (Null | Absent, Null | Absent) => true,
        (Null | Absent, _) | (_, Null | Absent) => false,
        (Mapping(_) | Sequence(_), Mapping(_) | Sequence(_)) => strict_equals(left, right),
        (Mapping(_) | Sequence(_), _) | (_, Mapping(_) | Sequence(_)) => {
            loose_equals(&to_primitive(left), &to_primitive(right))
        }
        (String(a), String(b)) => a == b,
        _ => to_number(left) == to_number(right),
    }
}

/// ToPrimitive with the default hint: objects become their string form
pub fn to_primitive(value: &ConfValue) -> ConfValue {
    match value {
        ConfValue::Mapping(_) | ConfValue::Sequence(_) => ConfValue::String(to_display_string(value)),
        other => other.clone(),
    }
}
