//! Test: Layout - pipelines described in YAML and resolved against a catalog

use crate::helpers::*;
use stepline::core::{DefinitionError, PipelineBuilder, PipelineConfig, StepCatalog};
use stepline::demo::{self, ConversationState};
use stepline::execution::run;

fn logging_catalog(names: &[&'static str]) -> StepCatalog<TestState> {
    let mut catalog = StepCatalog::new();
    for name in names {
        let name = *name;
        catalog.insert(name, move |state: &mut TestState| {
            state.log.push(name.to_string());
            state.status = status_for(name);
            Ok(())
        });
    }
    catalog
}

const ABCD: &str = r#"
name: "abcd"
entry: A
steps: [A, B, C, D]
transitions:
  - { from: A, to: B }
  - { from: B, to: C }
  - { from: C, to: D }
"#;

#[test]
fn test_layout_runs_like_builder() {
    let config = PipelineConfig::from_yaml(ABCD).unwrap();
    let pipeline = config.build(&logging_catalog(&["A", "B", "C", "D"])).unwrap();

    let outcome = run(&pipeline, TestState::default()).unwrap();
    assert_visited(&outcome, &["A", "B", "C", "D"]);
    assert_eq!(outcome.state.status, status_for("D"));
    assert_eq!(outcome.record.pipeline_name, "abcd");
    assert!(config.pacing().is_none());
}

#[test]
fn test_duplicate_step_in_layout() {
    let yaml = r#"
name: "dup"
entry: A
steps: [A, B, A]
"#;
    let err = PipelineConfig::from_yaml(yaml).unwrap_err();
    assert!(err.to_string().contains("Duplicate step name: A"));
}

#[test]
fn test_step_missing_from_catalog() {
    let config = PipelineConfig::from_yaml(ABCD).unwrap();
    let err = config.build(&logging_catalog(&["A", "B", "D"])).unwrap_err();

    let message = format!("{:#}", err);
    assert!(message.contains("Step 'C' is not in the catalog"), "{}", message);
    assert!(message.contains("available: A, B, D"), "{}", message);
}

/// Definition errors keep their type behind the layout context
#[test]
fn test_layout_with_fork() {
    let yaml = r#"
name: "fork"
entry: A
steps: [A, B, C]
transitions:
  - { from: A, to: B }
  - { from: A, to: C }
"#;
    let config = PipelineConfig::from_yaml(yaml).unwrap();
    let err = config.build(&logging_catalog(&["A", "B", "C"])).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<DefinitionError>(),
        Some(DefinitionError::MultipleOutgoingTransition { .. })
    ));
}

#[test]
fn test_layout_with_unknown_entry() {
    let yaml = r#"
name: "lost"
entry: Z
steps: [A]
"#;
    let config = PipelineConfig::from_yaml(yaml).unwrap();
    let err = config.build(&logging_catalog(&["A"])).unwrap_err();

    assert_eq!(
        err.downcast_ref::<DefinitionError>(),
        Some(&DefinitionError::UnknownStep("Z".to_string()))
    );
}

#[test]
fn test_layout_from_file() {
    let path = std::env::temp_dir().join(format!("stepline-layout-{}.yaml", std::process::id()));
    std::fs::write(&path, ABCD).unwrap();

    let config = PipelineConfig::from_file(&path);
    std::fs::remove_file(&path).unwrap();

    let config = config.unwrap();
    assert_eq!(config.name, "abcd");
    assert_eq!(config.transitions.len(), 3);
}

#[test]
fn test_missing_layout_file() {
    let err = PipelineConfig::from_file("/nonexistent/stepline/layout.yaml").unwrap_err();
    assert!(err.to_string().contains("Failed to read layout file"));
}

/// The built-in conversation layout matches a hand-wired pipeline
#[test]
fn test_demo_layout_matches_builder() {
    let from_layout = demo::default_config().unwrap().build(&demo::catalog()).unwrap();

    let catalog = demo::catalog();
    let mut builder = PipelineBuilder::new("conversation");
    for (name, _, _) in demo::STEPS {
        builder.register_step_fn(name, catalog.get(name).unwrap()).unwrap();
    }
    for pair in demo::STEPS.windows(2) {
        builder.add_transition(pair[0].0, pair[1].0).unwrap();
    }
    builder.set_entry("greet").unwrap();
    let by_hand = builder.compile().unwrap();

    assert_eq!(from_layout.execution_order(), by_hand.execution_order());
    assert_eq!(from_layout.transitions(), by_hand.transitions());

    let a = run(&from_layout, ConversationState::new()).unwrap();
    let b = run(&by_hand, ConversationState::new()).unwrap();
    assert_eq!(a.state, b.state);
    assert_eq!(a.state.thought_process.len(), 4);
}
