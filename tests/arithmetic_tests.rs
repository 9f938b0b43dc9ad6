use recurtrace::interpreter::errors::RuntimeError;
use recurtrace::{Executor, ExecutorConfig};
use rstest::rstest;

fn executor() -> Executor {
    Executor::new(ExecutorConfig {
        stack_size: 16 * 1024 * 1024,
        ..ExecutorConfig::default()
    })
}

/// Run top-level statements and return the printed lines
fn output_of(source: &str) -> Vec<String> {
    let timeline = executor().run_source(source).expect("Execution failed");
    timeline.output().into_iter().map(str::to_string).collect()
}

#[rstest]
#[case::integer_division("cout << 7 / 2 << endl;", "3")]
#[case::negative_modulo("cout << -7 % 3 << endl;", "-1")]
#[case::float_division("cout << 7.0 / 2 << endl;", "3.5")]
#[case::integral_float("cout << 2.5 * 2 << endl;", "5")]
#[case::precedence("cout << 2 + 3 * 4 - (1 + 1) << endl;", "12")]
#[case::bool_output("cout << (3 > 2) << \" \" << !true << endl;", "true false")]
#[case::string_concat("string s = \"ab\";\ncout << s + \"c\" + s[0] << endl;", "abca")]
#[case::ternary("int x = 4;\ncout << (x % 2 == 0 ? \"even\" : \"odd\") << endl;", "even")]
#[case::compound_assign("int x = 10;\nx -= 3;\nx *= 2;\ncout << x << endl;", "14")]
#[case::post_increment("int x = 1;\nint y = x++;\ncout << x << y << endl;", "21")]
#[case::pre_decrement("int x = 1;\nint y = --x;\ncout << x << y << endl;", "00")]
#[case::short_circuit("vector<int> v = {};\ncout << (v.size() > 0 && v[0] == 1) << endl;", "false")]
#[case::library_calls("cout << max(3, 9) << min(3, 9) << abs(-4) << to_string(12) << endl;", "93412")]
fn test_expression_output(#[case] source: &str, #[case] expected: &str) {
    assert_eq!(output_of(source), vec![expected.to_string()]);
}

#[rstest]
#[case::nested_index_write(
    "vector<vector<int>> grid = {{0, 0}, {0, 0}};\ngrid[1][0] = 5;\ncout << grid << endl;",
    "[[0, 0], [5, 0]]"
)]
#[case::grid_fill_rows_are_independent(
    "vector<vector<int>> g(2, vector<int>(2, 0));\ng[0][1] = 4;\ncout << g << endl;",
    "[[0, 4], [0, 0]]"
)]
#[case::nested_vector_return_type(
    "vector<vector<int>> make(int n) {\n    vector<vector<int>> g = {};\n    for (int i = 0; i < n; i++) {\n        g.push_back({i});\n    }\n    return g;\n}\ncout << make(2) << endl;",
    "[[0], [1]]"
)]
#[case::fill_constructor("vector<int> memo(3, -1);\nmemo[2] = 7;\ncout << memo << endl;", "[-1, -1, 7]")]
#[case::zero_values("int n;\nstring s;\nvector<int> v;\ncout << n << \"|\" << s << \"|\" << v << endl;", "0||[]")]
#[case::back_and_pop("vector<int> v = {1, 2, 3};\nv.pop_back();\ncout << v.back() << v.size() << v.empty() << endl;", "22false")]
#[case::string_edit("string s = \"abc\";\ns[0] = 'z';\ns.push_back('d');\ncout << s << \" \" << s.size() << endl;", "zbcd 4")]
#[case::substr("string s = \"recursion\";\ncout << s.substr(2, 3) << s.substr(6) << endl;", "curion")]
#[case::declaration_copies_list("vector<int> a = {1};\nvector<int> b = a;\nb.push_back(2);\ncout << a << b << endl;", "[1][1, 2]")]
#[case::assignment_copies_list("vector<int> a = {1};\nvector<int> b = {};\nb = a;\na[0] = 9;\ncout << b << endl;", "[1]")]
fn test_container_output(#[case] source: &str, #[case] expected: &str) {
    assert_eq!(output_of(source), vec![expected.to_string()]);
}

#[test]
fn test_printf_formats() {
    let source = "printf(\"%d-%s %.2f%% %c\\n\", 7, \"x\", 1.5, 'q');";
    assert_eq!(output_of(source), vec!["7-x 1.50% q".to_string()]);
}

#[test]
fn test_loops_with_break_and_continue() {
    let source = r#"int total = 0;
for (int i = 0; i < 10; i++) {
    if (i % 2 == 1) continue;
    if (i > 6) break;
    total += i;
}
int k = 0;
do {
    k++;
} while (k < 3);
while (k > 0) {
    k -= 2;
}
cout << total << " " << k << endl;"#;

    assert_eq!(output_of(source), vec!["12 -1".to_string()]);
}

#[rstest]
#[case::division_by_zero("int x = 1 / 0;", "Division by zero")]
#[case::modulo_by_zero("int x = 1 % 0;", "Modulo by zero")]
#[case::overflow("long x = 9223372036854775807;\nx = x + 1;", "Integer overflow")]
#[case::index("vector<int> v = {1};\ncout << v[3] << endl;", "Index 3 out of bounds for size 1")]
#[case::pop_empty("vector<int> v = {};\nv.pop_back();", "pop_back on an empty container")]
#[case::negative_size("vector<int> v(-2, 0);", "Invalid container size -2")]
#[case::undefined_variable("cout << ghost << endl;", "Undefined variable 'ghost'")]
#[case::printf_missing_arg("printf(\"%d %d\", 1);", "Not enough arguments")]
fn test_runtime_errors(#[case] source: &str, #[case] message: &str) {
    let err = executor().run_source(source).unwrap_err();
    assert!(
        err.to_string().contains(message),
        "expected {:?} in {:?}",
        message,
        err.to_string()
    );
    assert!(matches!(err.runtime_error(), Some(e) if !e.is_degradation()));
}

#[test]
fn test_argument_count_mismatch() {
    let err = executor()
        .run_source("int f(int a, int b) {\n    return a + b;\n}\nf(1);")
        .unwrap_err();

    assert!(matches!(
        err.runtime_error(),
        Some(RuntimeError::ArgumentCountMismatch {
            expected: 2,
            got: 1,
            line: 4,
            ..
        })
    ));
}
