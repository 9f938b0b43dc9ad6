// Integration tests for translation, execution and tracing

use pretty_assertions::assert_eq;
use recurtrace::trace::{EventPayload, FrameId, RecordedValue};
use recurtrace::{EventKind, Executor, ExecutorConfig, Timeline, TraceEvent, Tracer};

fn executor() -> Executor {
    Executor::new(ExecutorConfig {
        stack_size: 32 * 1024 * 1024,
        ..ExecutorConfig::default()
    })
}

fn run(source: &str) -> Timeline {
    match executor().run_source(source) {
        Ok(timeline) => timeline,
        Err(err) => panic!("Execution failed: {}", err),
    }
}

fn call_args(timeline: &[TraceEvent], name: &str) -> Vec<RecordedValue> {
    timeline
        .iter()
        .filter_map(|e| match &e.payload {
            EventPayload::Call { frame, .. } if frame.name == name => {
                frame.args.iter().next().map(|(_, v)| v.clone())
            }
            _ => None,
        })
        .collect()
}

fn return_values(timeline: &[TraceEvent]) -> Vec<RecordedValue> {
    timeline
        .iter()
        .filter_map(|e| e.return_value().cloned())
        .collect()
}

#[test]
fn test_factorial_calls_and_returns_nest() {
    let source = r#"int factorial(int n) {
    if (n <= 1) return 1;
    return n * factorial(n - 1);
}
factorial(3);"#;

    let timeline = run(source);

    assert_eq!(timeline.count(EventKind::Call), 3);
    assert_eq!(timeline.count(EventKind::Return), 3);
    assert_eq!(
        call_args(&timeline, "factorial"),
        vec![RecordedValue::Int(3), RecordedValue::Int(2), RecordedValue::Int(1)]
    );
    assert_eq!(
        return_values(&timeline),
        vec![RecordedValue::Int(1), RecordedValue::Int(2), RecordedValue::Int(6)]
    );
    assert_eq!(timeline.root_result(), Some(&RecordedValue::Int(6)));

    let kinds: Vec<EventKind> = timeline.iter().map(TraceEvent::kind).collect();
    assert_eq!(
        kinds,
        vec![
            EventKind::Call,
            EventKind::Line,
            EventKind::Line,
            EventKind::Call,
            EventKind::Line,
            EventKind::Line,
            EventKind::Call,
            EventKind::Line,
            EventKind::Return,
            EventKind::Return,
            EventKind::Return,
        ]
    );
    assert_eq!(timeline[0].line, Some(1));
    assert_eq!(timeline[0].message, "Called function factorial");
    assert_eq!(timeline[8].line, Some(2));
}

#[test]
fn test_mutual_recursion_alternates() {
    let source = r#"bool isEven(int n);
bool isOdd(int n);

bool isEven(int n) {
    if (n == 0) return true;
    return isOdd(n - 1);
}

bool isOdd(int n) {
    if (n == 0) return false;
    return isEven(n - 1);
}

isEven(2);"#;

    let timeline = run(source);

    let names: Vec<&str> = timeline
        .iter()
        .filter(|e| e.is_call())
        .filter_map(|e| e.frame().map(|f| f.name.as_str()))
        .collect();
    assert_eq!(names, vec!["isEven", "isOdd", "isEven"]);
    assert_eq!(timeline.count(EventKind::Return), 3);
    assert_eq!(timeline.root_result(), Some(&RecordedValue::Bool(true)));
}

#[test]
fn test_fall_through_records_undefined_at_closing_brace() {
    let source = r#"void greet(int n) {
    cout << "hi " << n << endl;
}
greet(1);"#;

    let timeline = run(source);

    let kinds: Vec<EventKind> = timeline.iter().map(TraceEvent::kind).collect();
    assert_eq!(
        kinds,
        vec![EventKind::Call, EventKind::Line, EventKind::Log, EventKind::Return]
    );
    assert_eq!(timeline.output(), vec!["hi 1"]);
    assert_eq!(timeline[3].line, Some(3));
    assert_eq!(timeline[3].return_value(), Some(&RecordedValue::Undefined));
}

#[test]
fn test_implicit_return_only_when_control_falls_through() {
    let source = r#"void walk(int n) {
    if (n > 0) {
        return;
    }
}
walk(1);
walk(0);"#;

    let timeline = run(source);
    let lines: Vec<Option<usize>> = timeline
        .iter()
        .filter(|e| e.is_return())
        .map(|e| e.line)
        .collect();

    // explicit return on line 3, then the fall-through at the closing brace
    assert_eq!(lines, vec![Some(3), Some(5)]);
}

#[test]
fn test_tracer_reset_starts_a_fresh_session() {
    let mut tracer = Tracer::new();
    tracer.call("f", &[("n".to_string(), 1i64)], Some(1));
    tracer.ret(&1i64, Some(2));
    assert_eq!(tracer.len(), 2);

    tracer.reset();
    assert!(tracer.timeline().is_empty());
    assert_eq!(tracer.call("g", &[("n".to_string(), 2i64)], Some(1)), FrameId(0));
    assert_eq!(tracer.timeline()[0].frame_id, Some(FrameId(0)));
}

#[test]
fn test_frame_depth_follows_parent() {
    let source = r#"int fib(int n) {
    if (n <= 1) return n;
    return fib(n - 1) + fib(n - 2);
}
fib(4);"#;

    let timeline = run(source);
    let frames: Vec<_> = timeline.iter().filter_map(|e| if e.is_call() { e.frame() } else { None }).collect();

    assert_eq!(frames.len(), 9);
    for frame in &frames {
        match frame.parent {
            None => assert_eq!(frame.depth, 0),
            Some(parent) => {
                let parent = frames.iter().find(|f| f.id == parent).unwrap();
                assert_eq!(frame.depth, parent.depth + 1);
            }
        }
    }
    assert_eq!(timeline.root_result(), Some(&RecordedValue::Int(3)));
}

#[test]
fn test_argument_snapshots_ignore_later_mutation() {
    let source = r#"void fill(vector<int>& v, int n) {
    if (n == 0) return;
    v.push_back(n);
    fill(v, n - 1);
}
vector<int> data = {};
fill(data, 3);
cout << data << endl;"#;

    let timeline = run(source);

    let list = |items: &[i64]| RecordedValue::List(items.iter().map(|n| RecordedValue::Int(*n)).collect());
    assert_eq!(
        call_args(&timeline, "fill"),
        vec![list(&[]), list(&[3]), list(&[3, 2]), list(&[3, 2, 1])]
    );
    assert_eq!(timeline.output(), vec!["[3, 2, 1]"]);
}

#[test]
fn test_by_value_list_parameter_is_a_copy() {
    let source = r#"void touch(vector<int> v) {
    v.push_back(9);
}
vector<int> a = {1};
touch(a);
cout << a.size() << endl;"#;

    assert_eq!(run(source).output(), vec!["1"]);
}

#[test]
fn test_variable_set_carries_locals_snapshot() {
    let source = r#"int sum(int n) {
    int total = 0;
    for (int i = 1; i <= n; i++) {
        total += i;
    }
    return total;
}
sum(3);"#;

    let timeline = run(source);
    let last_set = timeline
        .iter()
        .rev()
        .find_map(|e| match &e.payload {
            EventPayload::VariableSet { name, locals, .. } => Some((name.clone(), locals.clone())),
            _ => None,
        })
        .unwrap();

    assert_eq!(last_set.0, "i");
    assert_eq!(last_set.1.get("total"), Some(&RecordedValue::Int(6)));
    assert_eq!(last_set.1.get("i"), Some(&RecordedValue::Int(4)));
    assert_eq!(timeline.root_result(), Some(&RecordedValue::Int(6)));
}

#[test]
fn test_main_runs_after_driver_statements() {
    let source = r#"int twice(int x) {
    return 2 * x;
}

int main() {
    int y = twice(4);
    cout << y << endl;
    return 0;
}"#;

    let timeline = run(source);
    let names: Vec<&str> = timeline
        .iter()
        .filter(|e| e.is_call())
        .filter_map(|e| e.frame().map(|f| f.name.as_str()))
        .collect();

    assert_eq!(names, vec!["main", "twice"]);
    assert_eq!(timeline.output(), vec!["8"]);
}

#[test]
fn test_main_called_from_driver_runs_once() {
    let source = r#"int main() {
    cout << "once" << endl;
    return 0;
}
main();"#;

    let timeline = run(source);
    assert_eq!(timeline.count(EventKind::Call), 1);
    assert_eq!(timeline.output(), vec!["once"]);
}

#[test]
fn test_top_level_output_has_no_frame() {
    let timeline = run("cout << \"top\" << endl;");

    assert_eq!(timeline.len(), 1);
    assert_eq!(timeline[0].kind(), EventKind::Log);
    assert_eq!(timeline[0].frame_id, None);
}

#[test]
fn test_reached_unsupported_construct_fails_with_partial_timeline() {
    let source = r#"int f(int n) {
    int *p = &n;
    return n;
}
f(1);"#;

    let program = recurtrace::translate(source);
    assert_eq!(program.degradations().len(), 1);
    assert_eq!(program.degradations()[0].location.line, 2);

    let err = executor().run(&program).unwrap_err();
    assert!(err.is_degradation());
    assert_eq!(err.timeline.count(EventKind::Call), 1);
    assert_eq!(err.timeline.count(EventKind::Return), 0);
}

#[test]
fn test_unreached_unsupported_construct_is_inert() {
    let source = r#"int g(int n) {
    if (n > 100) {
        int *p = &n;
    }
    return n;
}
g(1);"#;

    let timeline = run(source);
    assert_eq!(timeline.root_result(), Some(&RecordedValue::Int(1)));
}

#[test]
fn test_undefined_function_is_a_runtime_error() {
    let err = executor().run_source("int f() {\n    return g(1);\n}\nf();").unwrap_err();

    assert_eq!(err.runtime_error().map(|e| e.line()), Some(2));
    assert!(err.to_string().contains("Undefined function 'g'"));
}

#[test]
fn test_timeline_serializes_to_json() {
    let timeline = run("int one() {\n    return 1;\n}\none();");
    let json = serde_json::to_value(&timeline).unwrap();

    assert_eq!(json[0]["type"], "call");
    assert_eq!(json[0]["frame"]["name"], "one");
    assert_eq!(json[0]["frame_id"], 0);
    assert_eq!(json[2]["type"], "return");
    assert_eq!(json[2]["value"], 1);
}

#[test]
fn test_global_writes_are_not_frame_locals() {
    let source = r#"int count = 0;
void bump(int n) {
    int local = n;
    count += n;
}
bump(2);
cout << count << endl;"#;

    let timeline = run(source);
    let set_names: Vec<&str> = timeline
        .iter()
        .filter_map(|e| match &e.payload {
            EventPayload::VariableSet { name, .. } => Some(name.as_str()),
            _ => None,
        })
        .collect();

    assert_eq!(set_names, vec!["local"]);
    assert_eq!(timeline.output(), vec!["2"]);

    let state = recurtrace::reconstruct(&timeline, timeline.len() - 1);
    let bump = state.frames.iter().find(|f| f.name == "bump").unwrap();
    assert_eq!(bump.locals.get("count"), None);
    assert_eq!(bump.locals.get("local"), Some(&RecordedValue::Int(2)));
}
