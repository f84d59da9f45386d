//! End-to-end compiles of the fixture projects under `tests/fixtures`

use conf_ts::{CompileOptions, ErrorKind, FileId, OutputFormat, compile};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::path::PathBuf;

fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(path)
}

fn compile_json(path: &str, options: &CompileOptions) -> Value {
    let result = compile(fixture(path), OutputFormat::Json, options).unwrap();
    serde_json::from_str(&result.output).unwrap()
}

#[test]
fn test_logical_truth_table() {
    let value = compile_json("logical/main.ts", &CompileOptions::default());
    assert_eq!(
        value,
        json!({
            "and": {
                "trueTrue": true,
                "trueFalse": false,
                "numberString": "a",
                "zeroString": 0,
                "emptyNumber": "",
                "nullString": null,
            },
            "or": { "falseTrue": true, "zeroString": "a", "emptyNumber": 1 },
            "coalesce": {
                "nullDefault": "d",
                "undefinedDefault": "d",
                "zeroDefault": 0,
                "falseDefault": false,
                "emptyDefault": "",
            },
        })
    );
}

#[test]
fn test_key_order_is_normalized_by_default() {
    let result = compile(fixture("key_order/main.ts"), OutputFormat::Json, &CompileOptions::default()).unwrap();
    assert_eq!(
        result.output,
        r#"{
  "2": "two",
  "10": "ten",
  "name": "ordering",
  "merged": {
    "b": 2,
    "a": 9,
    "c": 4
  }
}"#
    );
}

#[test]
fn test_key_order_can_be_preserved() {
    let options = CompileOptions::new().with_preserved_key_order(true);
    let result = compile(fixture("key_order/main.ts"), OutputFormat::Yaml, &options).unwrap();
    assert_eq!(
        result.output,
        "name: ordering\n'10': ten\n'2': two\nmerged:\n  b: 2\n  a: 9\n  c: 4\n"
    );
}

#[test]
fn test_multi_file_dependencies_are_minimal() {
    let result = compile(fixture("multi_file/main.ts"), OutputFormat::Json, &CompileOptions::default()).unwrap();
    let value: Value = serde_json::from_str(&result.output).unwrap();
    assert_eq!(value, json!({ "debug": false, "region": "eu-west-1", "replicas": 6 }));

    let deps = &result.dependencies;
    let id = |path: &str| FileId::from(fixture(path).as_path());
    assert_eq!(deps.iter().next(), Some(&id("multi_file/main.ts")));
    assert!(deps.contains(&id("multi_file/enums/region.ts")));
    assert!(deps.contains(&id("multi_file/shared/defaults.ts")));
    assert!(!deps.contains(&id("multi_file/enums/unused.ts")));
    assert!(!deps.contains(&id("multi_file/shared/types.ts")));
    assert_eq!(deps.len(), 3);
}

#[test]
fn test_macros() {
    let options = CompileOptions::new()
        .with_macros(true)
        .with_env_var("CONF_TS_EXISTS", "from-env");
    let value = compile_json("macros/main.ts", &options);
    assert_eq!(
        value,
        json!({
            "exists": "from-env",
            "missing": "default",
            "doubled": [2, 4, 6, 8, 10],
            "labels": ["0-a", "1-b"],
        })
    );
}

#[test]
fn test_macros_require_macro_mode() {
    let err = compile(fixture("macros/main.ts"), OutputFormat::Json, &CompileOptions::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MacroNotImported);
}

#[test]
fn test_compiles_are_idempotent() {
    let options = CompileOptions::new().with_macros(true);
    for format in [OutputFormat::Json, OutputFormat::Yaml] {
        let first = compile(fixture("macros/main.ts"), format, &options).unwrap();
        let second = compile(fixture("macros/main.ts"), format, &options).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn test_compile_failures() {
    let cases = [
        ("errors/no_export.ts", ErrorKind::NoExportedExpression),
        ("errors/macro_disabled.ts", ErrorKind::MacroNotImported),
        ("errors/cycle.ts", ErrorKind::CycleDetected),
        ("errors/unresolved.ts", ErrorKind::UnresolvedReference),
        ("errors/missing.ts", ErrorKind::Io),
    ];
    for (path, expected) in cases {
        let err = compile(fixture(path), OutputFormat::Json, &CompileOptions::default()).unwrap_err();
        assert_eq!(err.kind(), expected, "{path}: {err}");
    }
}

#[test]
fn test_no_export_names_the_entry() {
    let err = compile(fixture("errors/no_export.ts"), OutputFormat::Json, &CompileOptions::default()).unwrap_err();
    assert!(err.to_string().ends_with("errors/no_export.ts"), "{err}");
}

#[test]
fn test_missing_tsconfig() {
    let dir = tempfile::tempdir().unwrap();
    let entry = dir.path().join("main.ts");
    std::fs::write(&entry, "export default 1;").unwrap();

    let err = compile(&entry, OutputFormat::Json, &CompileOptions::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigurationMissing);
}
