//! Test: Shared Definition - one compiled pipeline, many independent runs

use crate::helpers::*;
use stepline::execution::{run, ExecutionEngine};
use std::sync::Arc;

/// Two sequential runs with fresh states do not see each other
#[test]
fn test_runs_do_not_interfere() {
    let invocations = Invocations::new();
    let pipeline = linear_pipeline(&["A", "B", "C", "D"], None, &invocations);

    let first = run(&pipeline, TestState::default()).unwrap();
    let second = run(&pipeline, TestState::default()).unwrap();

    assert_eq!(first.state, second.state);
    assert_eq!(first.state.log, vec!["A", "B", "C", "D"]);
    assert_eq!(first.visited, second.visited);
    assert_ne!(first.record.execution_id, second.record.execution_id);
    assert_eq!(invocations.count("A"), 2);
}

/// Concurrent runs share the pipeline and engine through `Arc`
#[tokio::test]
async fn test_concurrent_runs_share_pipeline() {
    let invocations = Invocations::new();
    let pipeline = Arc::new(linear_pipeline(&["A", "B", "C", "D"], None, &invocations));
    let engine = Arc::new(ExecutionEngine::new());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let pipeline = pipeline.clone();
            let engine = engine.clone();
            tokio::task::spawn_blocking(move || {
                let initial = TestState {
                    log: vec![format!("run-{}", i)],
                    status: String::new(),
                };
                engine.run(&pipeline, initial)
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let outcome = handle.await.unwrap().unwrap();
        assert_eq!(
            outcome.state.log,
            vec![format!("run-{}", i), "A".into(), "B".into(), "C".into(), "D".into()]
        );
        assert_visited(&outcome, &["A", "B", "C", "D"]);
    }

    assert_eq!(invocations.count("D"), 8);
}
