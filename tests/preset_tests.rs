use pretty_assertions::assert_eq;
use recurtrace::presets::{self, Preset};
use recurtrace::trace::EventPayload;
use recurtrace::{EventKind, Executor, ExecutorConfig, RecordedValue, Timeline};
use rstest::rstest;

fn executor() -> Executor {
    Executor::new(ExecutorConfig {
        stack_size: 32 * 1024 * 1024,
        ..ExecutorConfig::default()
    })
}

fn run_preset(id: &str, input: Option<&str>) -> Timeline {
    let preset: &Preset = presets::find(id).expect("unknown preset");
    let program = match input {
        Some(input) => preset.program(input),
        None => preset.default_program(),
    };
    match executor().run_source(&program) {
        Ok(timeline) => timeline,
        Err(err) => panic!("preset {} failed: {}", id, err),
    }
}

#[rstest]
#[case("factorial")]
#[case("sum_array")]
#[case("reverse_string")]
#[case("fibonacci")]
#[case("merge_sort")]
#[case("permutations")]
#[case("subsets")]
#[case("tail_factorial")]
#[case("even_odd")]
#[case("ackermann")]
#[case("playground")]
fn test_preset_runs_balanced(#[case] id: &str) {
    let timeline = run_preset(id, None);

    assert!(timeline.count(EventKind::Call) > 0);
    assert_eq!(
        timeline.count(EventKind::Call),
        timeline.count(EventKind::Return)
    );
}

#[test]
fn test_every_preset_translates_completely() {
    for (_, preset) in presets::all() {
        let program = recurtrace::translate(&preset.default_program());
        assert!(
            program.is_complete(),
            "{} degraded: {:?}",
            preset.id,
            program.degradations()
        );
    }
}

#[rstest]
#[case("factorial", RecordedValue::Int(120))]
#[case("sum_array", RecordedValue::Int(15))]
#[case("reverse_string", RecordedValue::Str("olleh".to_string()))]
#[case("fibonacci", RecordedValue::Int(5))]
#[case("tail_factorial", RecordedValue::Int(120))]
#[case("even_odd", RecordedValue::Bool(false))]
#[case("ackermann", RecordedValue::Int(5))]
fn test_preset_default_results(#[case] id: &str, #[case] expected: RecordedValue) {
    assert_eq!(run_preset(id, None).root_result(), Some(&expected));
}

#[test]
fn test_custom_input_drives_the_run() {
    assert_eq!(
        run_preset("factorial", Some("6")).root_result(),
        Some(&RecordedValue::Int(720))
    );
    assert_eq!(
        run_preset("sum_array", Some("10, 20")).root_result(),
        Some(&RecordedValue::Int(30))
    );
    assert_eq!(
        run_preset("ackermann", Some("1, 2")).root_result(),
        Some(&RecordedValue::Int(4))
    );
}

#[test]
fn test_permutations_output_and_snapshots() {
    let timeline = run_preset("permutations", None);

    assert_eq!(
        timeline.output(),
        vec![
            "Found: [1, 2, 3]",
            "Found: [1, 3, 2]",
            "Found: [2, 1, 3]",
            "Found: [2, 3, 1]",
            "Found: [3, 1, 2]",
            "Found: [3, 2, 1]",
        ]
    );

    // `curr` as recorded at each call always has exactly `depth` elements,
    // even though the caller keeps pushing and popping it afterwards.
    for event in timeline.iter() {
        if let EventPayload::Call { frame, .. } = &event.payload {
            let curr = frame.args.get("curr").and_then(RecordedValue::as_list);
            assert_eq!(curr.map(<[RecordedValue]>::len), Some(frame.depth));
        }
    }
}

#[test]
fn test_subsets_prints_power_set() {
    let timeline = run_preset("subsets", Some("1, 2"));

    assert_eq!(
        timeline.output(),
        vec!["Subset: []", "Subset: [1]", "Subset: [1, 2]", "Subset: [2]"]
    );
}

#[test]
fn test_merge_sort_call_tree_shape() {
    let timeline = run_preset("merge_sort", Some("4, 3, 2, 1"));
    let tree = recurtrace::call_tree(&timeline);

    // 7 mergeSort frames over 4 elements, plus 3 merges
    assert_eq!(tree.roots.len(), 1);
    assert_eq!(tree.len(), 10);
    assert_eq!(tree.height(), 3);
}
