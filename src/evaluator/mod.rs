//! Compile-time evaluation of configuration expressions
//!
//! The [`Evaluator`] folds expressions of a [`ProgramGraph`](crate::program::ProgramGraph)
//! into [`ConfValue`](crate::model::ConfValue)s, resolving identifiers across
//! files and recording every file it consults in a [`DependencySet`].

mod context;
mod dependency;
mod engine;
mod macros;
mod object;
mod operators;
mod symbols;

pub use dependency::DependencySet;
pub use engine::Evaluator;
pub use operators::{ArithmeticEvaluator, ComparisonEvaluator, LogicalEvaluator};

#[cfg(test)]
mod tests {
    use crate::compiler::{CompileOptions, evaluate_program};
    use crate::error::{ConfResult, ErrorKind};
    use crate::model::ConfValue;
    use crate::program::{FileId, MemoryHost, Program, ProjectConfig};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::{Value, json};
    use std::path::Path;

    fn evaluate_files(files: &[(&str, &str)], options: &CompileOptions) -> ConfResult<ConfValue> {
        let host: MemoryHost = files.iter().map(|(name, text)| (*name, *text)).collect();
        let config = ProjectConfig::detached(Path::new("/src"));
        let program = Program::load(&host, &config, files[0].0)?;
        evaluate_program(&program, &FileId::new(files[0].0), options).map(|e| e.value)
    }

    fn evaluate(source: &str) -> ConfResult<ConfValue> {
        evaluate_files(&[("/src/main.ts", source)], &CompileOptions::default())
    }

    fn json_of(source: &str) -> Value {
        serde_json::to_value(evaluate(source).unwrap()).unwrap()
    }

    #[rstest]
    #[case("true && true", json!(true))]
    #[case("true && false", json!(false))]
    #[case("1 && 'a'", json!("a"))]
    #[case("0 && 'a'", json!(0))]
    #[case("'' && 1", json!(""))]
    #[case("null && 'a'", json!(null))]
    #[case("false || true", json!(true))]
    #[case("0 || 'a'", json!("a"))]
    #[case("'' || 1", json!(1))]
    #[case("null ?? 'd'", json!("d"))]
    #[case("undefined ?? 'd'", json!("d"))]
    #[case("0 ?? 'd'", json!(0))]
    #[case("false ?? 'd'", json!(false))]
    #[case("'' ?? 'd'", json!(""))]
    fn test_logical_truth_table(#[case] expr: &str, #[case] expected: Value) {
        assert_eq!(json_of(&format!("export default {expr};")), expected);
    }

    #[rstest]
    #[case("1 + 2 * 3", json!(7))]
    #[case("'a' + 1", json!("a1"))]
    #[case("2 ** 3 ** 2", json!(512))]
    #[case("7 % 3", json!(1))]
    #[case("-'3' + +'4'", json!(1))]
    #[case("`${1 + 1}-${true}-${null}`", json!("2-true-null"))]
    #[case("typeof 'x'", json!("string"))]
    #[case("!0", json!(true))]
    #[case("1 < 2 ? 'yes' : 'no'", json!("yes"))]
    #[case("'10' == 10", json!(true))]
    #[case("'10' === 10", json!(false))]
    #[case("[1, 2, 3].length", json!(3))]
    #[case("({ a: { b: 5 } }).a.b", json!(5))]
    #[case("({ a: null }).a?.b", json!(null))]
    #[case("[...[1, 2], ...'ab']", json!([1, 2, "a", "b"]))]
    #[case("({ ['k' + 1]: true, 2: 'two' })", json!({"k1": true, "2": "two"}))]
    #[case("(42 as number) satisfies number", json!(42))]
    fn test_expressions(#[case] expr: &str, #[case] expected: Value) {
        assert_eq!(json_of(&format!("export default {expr};")), expected);
    }

    // `missing` is unresolved, so these only succeed if the operand is skipped
    #[rstest]
    #[case("false && missing", json!(false))]
    #[case("true || missing", json!(true))]
    #[case("0 ?? missing", json!(0))]
    #[case("false ? missing : 2", json!(2))]
    #[case("true ? 1 : missing", json!(1))]
    #[case("({ a: null }).a?.b.c[missing]", json!(null))]
    fn test_skipped_operands_are_not_evaluated(#[case] expr: &str, #[case] expected: Value) {
        assert_eq!(json_of(&format!("export default {expr};")), expected);
    }

    #[test]
    fn test_env_fallback_is_lazy() {
        let options = CompileOptions::new().with_macros(true).with_env_var("EXISTS", "x");
        let value = evaluate_files(
            &[(
                "/src/main.ts",
                "import { env } from '@conf-ts/macro';\nexport default env('EXISTS', missing);",
            )],
            &options,
        )
        .unwrap();
        assert_eq!(value, ConfValue::from("x"));

        let err = evaluate_files(
            &[(
                "/src/main.ts",
                "import { env } from '@conf-ts/macro';\nexport default env('MISSING', missing);",
            )],
            &options,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnresolvedReference);
    }

    #[test]
    fn test_object_spread_merge() {
        let value = evaluate(
            "const base = { a: 1, b: 2 };\n\
             export default { ...base, c: 3, d: { e: 5, ...{ f: 6 } } };",
        )
        .unwrap();
        let keys: Vec<&String> = value.as_mapping().unwrap().keys().collect();
        assert_eq!(keys, vec!["a", "b", "c", "d"]);
        assert_eq!(
            serde_json::to_value(&value).unwrap(),
            json!({"a": 1, "b": 2, "c": 3, "d": {"e": 5, "f": 6}})
        );
    }

    #[test]
    fn test_rightmost_spread_wins() {
        let value = evaluate(
            "const override = { a: 1, b: 2 };\n\
             const override2 = { b: 3, c: 4 };\n\
             export default { ...override, ...override2, ...null };",
        )
        .unwrap();
        let keys: Vec<&String> = value.as_mapping().unwrap().keys().collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert_eq!(value.get("b"), Some(&ConfValue::from(3)));
    }

    #[test]
    fn test_arrow_bindings_can_be_called() {
        let value = evaluate(
            "const double = (x: number) => x * 2;\n\
             const add = (a, b) => { return a + b; };\n\
             export default { four: double(2), sum: add(1, double(3)), missing: add(1) };",
        )
        .unwrap();
        assert_eq!(
            serde_json::to_value(&value).unwrap(),
            json!({"four": 4, "sum": 7, "missing": null})
        );
        assert!(value.get("missing").and_then(ConfValue::as_number).is_some_and(f64::is_nan));
    }

    #[test]
    fn test_enum_members_and_imports() {
        let value = evaluate_files(
            &[
                (
                    "/src/main.ts",
                    "import { Level } from './levels';\n\
                     import * as levels from './levels';\n\
                     export default { debug: Level.Debug, info: levels.Level.Info, name: levels.NAME };",
                ),
                ("/src/levels.ts", "export enum Level { Debug, Info }\nexport const NAME = 'levels';"),
            ],
            &CompileOptions::default(),
        )
        .unwrap();
        assert_eq!(
            serde_json::to_value(&value).unwrap(),
            json!({"debug": 0, "info": 1, "name": "levels"})
        );
    }

    #[test]
    fn test_reexports() {
        let value = evaluate_files(
            &[
                ("/src/main.ts", "import { port, host as h } from './index';\nexport default `${h}:${port}`;"),
                ("/src/index.ts", "export { port } from './net';\nexport * from './names';"),
                ("/src/net.ts", "const p = 80;\nexport { p as port };"),
                ("/src/names.ts", "export const host = 'localhost';"),
            ],
            &CompileOptions::default(),
        )
        .unwrap();
        assert_eq!(value, ConfValue::from("localhost:80"));
    }

    #[test]
    fn test_default_import() {
        let value = evaluate_files(
            &[
                ("/src/main.ts", "import shared from './shared';\nexport default { ...shared, own: true };"),
                ("/src/shared.ts", "export default { shared: 1 };"),
            ],
            &CompileOptions::default(),
        )
        .unwrap();
        assert_eq!(serde_json::to_value(&value).unwrap(), json!({"shared": 1, "own": true}));
    }

    #[test]
    fn test_macros() {
        let options = CompileOptions::new()
            .with_macros(true)
            .with_env_var("EXISTS", "from-env");
        let value = evaluate_files(
            &[(
                "/src/main.ts",
                "import { env, arrayMap as map } from '@conf-ts/macro';\n\
                 const double = (x: number) => x * 2;\n\
                 export default {\n\
                   present: env('EXISTS', 'default'),\n\
                   missing: env('MISSING', 'default'),\n\
                   nested: env('MISSING', env('EXISTS')),\n\
                   absent: env('MISSING'),\n\
                   doubled: map([1, 2, 3, 4, 5], double),\n\
                   indexed: map(['a', 'b'], (item, i) => `${i}:${item}`),\n\
                 };",
            )],
            &options,
        )
        .unwrap();
        assert_eq!(
            serde_json::to_value(&value).unwrap(),
            json!({
                "present": "from-env",
                "missing": "default",
                "nested": "from-env",
                "doubled": [2, 4, 6, 8, 10],
                "indexed": ["0:a", "1:b"],
            })
        );
        assert_eq!(value.get("absent"), Some(&ConfValue::Absent));
    }

    #[rstest]
    #[case("export const a = 1;", ErrorKind::NoExportedExpression)]
    #[case("export default missing;", ErrorKind::UnresolvedReference)]
    #[case("export default env('HOME');", ErrorKind::MacroNotImported)]
    #[case("import { env } from '@conf-ts/macro';\nexport default env('HOME');", ErrorKind::MacroNotImported)]
    #[case("const a = b;\nconst b = a;\nexport default a;", ErrorKind::CycleDetected)]
    #[case("export default null.x;", ErrorKind::TypeMismatch)]
    #[case("export default [...1];", ErrorKind::TypeMismatch)]
    #[case("const f = (n) => f(n);\nexport default f(1);", ErrorKind::UnsupportedExpression)]
    #[case("enum E { A }\nexport default E;", ErrorKind::UnsupportedExpression)]
    #[case("enum E { A }\nexport default E.B;", ErrorKind::UnresolvedReference)]
    #[case("import { x } from './nowhere';\nexport default x;", ErrorKind::UnresolvedReference)]
    fn test_failures(#[case] source: &str, #[case] expected: ErrorKind) {
        assert_eq!(evaluate(source).unwrap_err().kind(), expected);
    }

    #[test]
    fn test_invalid_macro_arguments() {
        let options = CompileOptions::new().with_macros(true);
        for source in [
            "export default env(1);",
            "export default env();",
            "export default arrayMap(1, (x) => x);",
            "export default arrayMap([1], 2);",
        ] {
            let text = format!("import {{ env, arrayMap }} from '@conf-ts/macro';\n{source}");
            let err = evaluate_files(&[("/src/main.ts", text.as_str())], &options).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidMacroArgument, "{source}");
        }
    }

    #[test]
    fn test_error_positions() {
        let err = evaluate("const a = 1;\nexport default {\n  b: missing,\n};").unwrap_err();
        let position = err.location().position.unwrap();
        assert_eq!((position.line, position.character), (3, 6));
    }
}
