//! Rendering of evaluated configurations

use crate::error::{ConfError, ConfResult};
use crate::model::ConfValue;
use std::fmt;
use std::str::FromStr;

/// Output format of a compile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputFormat {
    /// Two-space indented JSON
    #[default]
    Json,
    /// YAML
    Yaml,
}

impl OutputFormat {
    /// Render `value`. Unless `preserve_key_order` is set, mapping keys
    /// are reordered with integer-like keys first, ascending.
    pub fn render(self, value: &ConfValue, preserve_key_order: bool) -> ConfResult<String> {
        let normalized;
        let value = if preserve_key_order {
            value
        } else {
            normalized = value.with_normalized_key_order();
            &normalized
        };

        match self {
            OutputFormat::Json => serde_json::to_string_pretty(value).map_err(|e| ConfError::render(e.to_string())),
            OutputFormat::Yaml => serde_yaml::to_string(value).map_err(|e| ConfError::render(e.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = ConfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(OutputFormat::Json),
            "yaml" => Ok(OutputFormat::Yaml),
            other => Err(ConfError::unsupported_format(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::model::Mapping;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn sample() -> ConfValue {
        let mut nested = Mapping::new();
        nested.insert("z".into(), ConfValue::from(1.5));
        nested.insert("1".into(), ConfValue::Absent);
        let mut root = Mapping::new();
        root.insert("name".into(), ConfValue::from("app"));
        root.insert("2".into(), ConfValue::from(true));
        root.insert("nested".into(), ConfValue::Mapping(nested));
        root.insert(
            "list".into(),
            ConfValue::Sequence(vec![ConfValue::from(1), ConfValue::Absent]),
        );
        ConfValue::Mapping(root)
    }

    #[test]
    fn test_json_normalizes_key_order() {
        let text = OutputFormat::Json.render(&sample(), false).unwrap();
        assert_eq!(
            text,
            "{\n  \"2\": true,\n  \"name\": \"app\",\n  \"nested\": {\n    \"z\": 1.5\n  },\n  \"list\": [\n    1,\n    null\n  ]\n}"
        );
    }

    #[test]
    fn test_json_preserves_key_order() {
        let text = OutputFormat::Json.render(&sample(), true).unwrap();
        assert!(text.starts_with("{\n  \"name\": \"app\",\n  \"2\": true,"));
    }

    #[test]
    fn test_yaml() {
        let text = OutputFormat::Yaml.render(&sample(), false).unwrap();
        assert_eq!(text, "'2': true\nname: app\nnested:\n  z: 1.5\nlist:\n- 1\n- null\n");
    }

    #[rstest]
    #[case("json", OutputFormat::Json)]
    #[case("yaml", OutputFormat::Yaml)]
    fn test_parse_known_formats(#[case] input: &str, #[case] expected: OutputFormat) {
        assert_eq!(input.parse::<OutputFormat>().unwrap(), expected);
        assert_eq!(expected.to_string(), input);
    }

    #[rstest]
    #[case("xml")]
    #[case("JSON")]
    #[case("")]
    fn test_unsupported_formats(#[case] input: &str) {
        let err = input.parse::<OutputFormat>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
    }
}
