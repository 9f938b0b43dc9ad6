use proptest::prelude::*;
use recurtrace::replay::{reconstruct, FrameStatus};
use recurtrace::{presets, EventKind, Executor, ExecutorConfig, Timeline};

fn fib_timeline(n: u8) -> Timeline {
    let program = presets::find("fibonacci")
        .expect("fibonacci preset")
        .program(&n.to_string());
    Executor::new(ExecutorConfig {
        stack_size: 8 * 1024 * 1024,
        ..ExecutorConfig::default()
    })
    .run_source(&program)
    .expect("fib runs")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn active_depth_matches_prefix_balance(n in 0u8..8, index in 0usize..400) {
        let timeline = fib_timeline(n);
        let state = reconstruct(&timeline, index);
        let index = index.min(timeline.len() - 1);
        prop_assert_eq!(state.index, index);

        let prefix = &timeline[..=index];
        let calls = prefix.iter().filter(|e| e.kind() == EventKind::Call).count();
        let returns = prefix.iter().filter(|e| e.kind() == EventKind::Return).count();
        prop_assert_eq!(state.active_depth(), calls - returns);

        let returning = state.stack().filter(|f| f.status == FrameStatus::Returning).count();
        prop_assert_eq!(returning, usize::from(timeline[index].is_return()));
    }

    #[test]
    fn reconstruct_is_deterministic(n in 0u8..8, index in 0usize..400) {
        let timeline = fib_timeline(n);
        prop_assert_eq!(reconstruct(&timeline, index), reconstruct(&timeline, index));
        prop_assert_eq!(&fib_timeline(n), &timeline);
    }
}

#[test]
fn stepping_back_matches_a_fresh_reconstruction() {
    let timeline = fib_timeline(4);
    let forward: Vec<_> = (0..timeline.len()).map(|i| reconstruct(&timeline, i)).collect();

    for i in (0..timeline.len()).rev() {
        assert_eq!(reconstruct(&timeline, i), forward[i]);
    }
    assert_eq!(forward.last().map(|s| s.active_depth()), Some(0));
}
