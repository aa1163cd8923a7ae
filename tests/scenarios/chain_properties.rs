//! Test: Chain Properties - ordering and definition rules across chain lengths

use crate::helpers::*;
use stepline::core::{Defect, DefinitionError, PipelineBuilder, StepError};
use stepline::execution::run;

fn noop(_: &mut TestState) -> Result<(), StepError> {
    Ok(())
}

fn chain_names(len: usize) -> Vec<String> {
    (1..=len).map(|i| format!("step{}", i)).collect()
}

/// Every chain length visits steps in chain order, each exactly once
#[test]
fn test_each_step_runs_once_in_order() {
    for len in 1..=8 {
        let names = chain_names(len);
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let invocations = Invocations::new();
        let pipeline = linear_pipeline(&refs, None, &invocations);

        let outcome = run(&pipeline, TestState::default()).unwrap();

        assert_visited(&outcome, &refs);
        assert_eq!(outcome.state.log, names, "chain of {} steps", len);
        assert_eq!(pipeline.execution_order(), refs);
        for name in &refs {
            assert_eq!(invocations.count(name), 1, "step {} in chain of {}", name, len);
        }
    }
}

/// A failure at any position stops the chain right there
#[test]
fn test_failure_at_every_position() {
    let names = chain_names(5);
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();

    for (position, failing) in refs.iter().enumerate() {
        let invocations = Invocations::new();
        let pipeline = linear_pipeline(&refs, Some(*failing), &invocations);

        let err = run(&pipeline, TestState::default()).unwrap_err();

        assert_step_failed(&err, failing);
        assert_eq!(err.completed(), &names[..position]);
        assert_eq!(invocations.names(), &names[..=position]);
    }
}

/// Registration order does not matter, only the transitions do
#[test]
fn test_order_follows_transitions_not_registration() {
    let mut builder = PipelineBuilder::new("shuffled");
    for name in ["C", "A", "D", "B"] {
        builder
            .register_step(name, move |state: &mut TestState| {
                state.log.push(name.to_string());
                Ok(())
            })
            .unwrap();
    }
    builder
        .add_transition("A", "B")
        .unwrap()
        .add_transition("B", "C")
        .unwrap()
        .add_transition("C", "D")
        .unwrap()
        .set_entry("A")
        .unwrap();
    let pipeline = builder.compile().unwrap();

    let outcome = run(&pipeline, TestState::default()).unwrap();
    assert_visited(&outcome, &["A", "B", "C", "D"]);
}

#[test]
fn test_duplicate_name_rejected() {
    let mut builder = PipelineBuilder::new("dup");
    builder.register_step("A", noop).unwrap();

    let err = builder.register_step("A", noop).unwrap_err();
    assert_eq!(err, DefinitionError::DuplicateStep("A".to_string()));
    assert_eq!(builder.len(), 1);
}

#[test]
fn test_unknown_step_in_transition() {
    let mut builder = PipelineBuilder::new("unknown");
    builder.register_step("A", noop).unwrap();

    assert_eq!(
        builder.add_transition("A", "missing").unwrap_err(),
        DefinitionError::UnknownStep("missing".to_string())
    );
    assert_eq!(
        builder.add_transition("ghost", "A").unwrap_err(),
        DefinitionError::UnknownStep("ghost".to_string())
    );
    assert_eq!(
        builder.set_entry("ghost").unwrap_err(),
        DefinitionError::UnknownStep("ghost".to_string())
    );
}

/// A second outgoing transition is refused and the first one survives
#[test]
fn test_second_outgoing_transition_rejected() {
    let mut builder = PipelineBuilder::new("fork");
    for name in ["A", "B", "C"] {
        builder.register_step(name, noop).unwrap();
    }
    builder.add_transition("A", "B").unwrap();

    let err = builder.add_transition("A", "C").unwrap_err();
    assert_eq!(
        err,
        DefinitionError::MultipleOutgoingTransition {
            from: "A".to_string(),
            existing: "B".to_string(),
            attempted: "C".to_string(),
        }
    );

    builder.set_entry("A").unwrap();
    let pipeline = builder.compile().unwrap();
    assert_eq!(pipeline.next_step("A"), Some("B"));
    assert_eq!(pipeline.unreachable_steps(), vec!["C"]);
}

/// Closing the chain back on itself is refused when the edge is added
#[test]
fn test_cycle_rejected() {
    let mut builder = PipelineBuilder::new("loop");
    for name in ["A", "B", "C"] {
        builder.register_step(name, noop).unwrap();
    }
    builder
        .add_transition("A", "B")
        .unwrap()
        .add_transition("B", "C")
        .unwrap();

    assert!(matches!(
        builder.add_transition("C", "A").unwrap_err(),
        DefinitionError::Cycle { .. }
    ));
    assert!(matches!(
        builder.add_transition("A", "A").unwrap_err(),
        DefinitionError::MultipleOutgoingTransition { .. }
    ));
    assert!(matches!(
        builder.add_transition("C", "C").unwrap_err(),
        DefinitionError::Cycle { .. }
    ));
}

#[test]
fn test_compile_without_entry() {
    let mut builder = PipelineBuilder::new("headless");
    builder.register_step("A", noop).unwrap();

    assert_eq!(builder.compile().unwrap_err(), DefinitionError::NoEntryPoint);
}

/// Two steps feeding one are reported together at compile time
#[test]
fn test_merging_transitions_reported() {
    let mut builder = PipelineBuilder::new("merge");
    for name in ["A", "B", "C"] {
        builder.register_step(name, noop).unwrap();
    }
    builder
        .add_transition("A", "C")
        .unwrap()
        .add_transition("B", "C")
        .unwrap()
        .set_entry("A")
        .unwrap();

    match builder.compile().unwrap_err() {
        DefinitionError::Validation(defects) => assert_eq!(
            defects,
            vec![Defect::MergingTransitions {
                step: "C".to_string(),
                sources: vec!["A".to_string(), "B".to_string()],
            }]
        ),
        other => panic!("Expected validation defects, got {:?}", other),
    }
}
