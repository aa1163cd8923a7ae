use anyhow::{Context, Result};
use stepline::cli::commands::{DescribeCommand, RunCommand, ValidateCommand};
use stepline::cli::output::*;
use stepline::cli::{Cli, Command};
use stepline::core::{Pipeline, PipelineConfig};
use stepline::demo::{self, ConversationState};
use stepline::execution::{ExecutionEngine, ExecutionError, RunOutcome};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

type RunResult = Result<RunOutcome<ConversationState>, ExecutionError<ConversationState>>;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    // Execute command
    match &cli.command {
        Command::Run(cmd) => run_conversation(cmd).await?,
        Command::Validate(cmd) => validate_layout(cmd)?,
        Command::Describe(cmd) => describe_layout(cmd)?,
    }

    Ok(())
}

fn load_config(file: Option<&str>) -> Result<PipelineConfig> {
    match file {
        Some(path) => {
            info!("Loading pipeline layout from {}", path);
            PipelineConfig::from_file(path).context("Failed to load pipeline layout")
        }
        None => demo::default_config(),
    }
}

async fn run_conversation(cmd: &RunCommand) -> Result<()> {
    let config = load_config(cmd.file.as_deref())?;

    let mut catalog = demo::catalog();
    if let Some(step) = &cmd.fail_at {
        demo::inject_failure(&mut catalog, step)?;
        warn!("Step {} will fail on purpose", step);
    }

    let show_progress = !cmd.json && cmd.runs == 1;
    if show_progress {
        println!("\n{}", separator());
        println!("{} {}", ROCKET, style("SIMPLE PIPELINE DEMO").bold());
        println!("This demo shows how a pipeline passes state through steps and transitions");
        println!("\n{} Creating pipeline {}", INFO, style(&config.name).bold());
        println!("{} Adding steps: {}", INFO, config.steps.join(", "));
        println!("{} Adding {} transitions", INFO, config.transitions.len());
        println!("{} Setting entry point: {}", INFO, style(&config.entry).cyan());
        println!("{} Compiling pipeline...", INFO);
    }

    let pipeline = Arc::new(config.build(&catalog)?);
    for step in pipeline.unreachable_steps() {
        warn!("Step {} is not reachable from entry {}", step, pipeline.entry());
    }

    let pacing = cmd
        .delay_ms
        .map(Duration::from_millis)
        .or_else(|| config.pacing())
        .filter(|d| !d.is_zero());
    let deadline = cmd
        .deadline_ms
        .map(|ms| Instant::now() + Duration::from_millis(ms));
    let engine = Arc::new(build_engine(pacing, deadline, show_progress));

    if cmd.runs > 1 {
        return run_many(engine, pipeline, cmd.runs, cmd.json).await;
    }

    if show_progress {
        println!("\n{} Running pipeline...", ROCKET);
        println!("{}", separator());
    }
    let result = spawn_run(engine, pipeline).await?;

    if cmd.json {
        println!("{}", run_result_json(&result)?);
        if result.is_err() {
            std::process::exit(1);
        }
        return Ok(());
    }

    match result {
        Ok(outcome) => {
            println!("\n{}", separator());
            println!("{} FINAL STATE:", SPARKLES);
            println!("Current step: {}", style(&outcome.state.current_step).bold());
            println!("\nThought process:");
            println!("{}", format_thoughts(&outcome.state));
            println!("\n{}", separator());
            println!("{}", format_record(&outcome.record));
        }
        Err(err) => {
            println!("\n{}", separator());
            println!(
                "{} Run stopped at {} after {} completed steps",
                CROSS,
                style(err.step()).red(),
                err.completed().len()
            );
            println!("{}", format_record(err.record()));
            error!("{}", err);
            let state = err.into_state();
            if !state.thought_process.is_empty() {
                println!("\nThought process so far:");
                println!("{}", format_thoughts(&state));
            }
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Build the engine used by the demo; the core itself prints nothing
fn build_engine(
    pacing: Option<Duration>,
    deadline: Option<Instant>,
    show_progress: bool,
) -> ExecutionEngine<ConversationState> {
    let mut engine: ExecutionEngine<ConversationState> = ExecutionEngine::new();

    if show_progress || pacing.is_some() {
        engine = engine.on_step_enter(move |step, _state| {
            if show_progress {
                println!("\n{}", format_step_enter(step));
            }
            if let Some(delay) = pacing {
                if show_progress {
                    pace(delay);
                } else {
                    std::thread::sleep(delay);
                }
            }
        });
    }

    if show_progress {
        engine = engine.on_step_exit(|step, state| {
            println!("{}", format_step_exit(step, state));
        });
    }

    if let Some(deadline) = deadline {
        engine = engine.with_cancellation(move |step, _state| {
            let expired = Instant::now() >= deadline;
            if expired {
                debug!("Deadline passed before step {}", step);
            }
            expired
        });
    }

    engine
}

/// Runs are synchronous; keep them off the async worker threads
async fn spawn_run(
    engine: Arc<ExecutionEngine<ConversationState>>,
    pipeline: Arc<Pipeline<ConversationState>>,
) -> Result<RunResult> {
    tokio::task::spawn_blocking(move || engine.run(&pipeline, ConversationState::new()))
        .await
        .context("Pipeline run panicked")
}

async fn run_many(
    engine: Arc<ExecutionEngine<ConversationState>>,
    pipeline: Arc<Pipeline<ConversationState>>,
    runs: u32,
    json: bool,
) -> Result<()> {
    info!("Starting {} independent runs of {}", runs, pipeline.name());

    let handles: Vec<_> = (0..runs)
        .map(|_| tokio::spawn(spawn_run(engine.clone(), pipeline.clone())))
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        results.push(handle.await.context("Pipeline task failed")??);
    }

    let failed = results.iter().filter(|r| r.is_err()).count();
    if json {
        let items = results
            .iter()
            .map(run_result_value)
            .collect::<Result<Vec<_>>>()?;
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        for (i, result) in results.iter().enumerate() {
            let record = match result {
                Ok(outcome) => &outcome.record,
                Err(err) => err.record(),
            };
            println!("  run {}: {}", i + 1, format_record(record));
        }
        println!(
            "\n{} {} of {} runs completed",
            INFO,
            style(results.len() - failed).green(),
            results.len()
        );
    }

    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn run_result_value(result: &RunResult) -> Result<serde_json::Value> {
    let value = match result {
        Ok(outcome) => serde_json::to_value(outcome)?,
        Err(err) => serde_json::json!({
            "error": err.to_string(),
            "completed": err.completed(),
            "record": err.record(),
        }),
    };
    Ok(value)
}

fn run_result_json(result: &RunResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(&run_result_value(result)?)?)
}

fn validate_layout(cmd: &ValidateCommand) -> Result<()> {
    println!("{} Validating pipeline layout...", INFO);

    let result = PipelineConfig::from_file(&cmd.file)
        .and_then(|config| config.build(&demo::catalog()).map(|pipeline| (config, pipeline)));

    match result {
        Ok((config, pipeline)) => {
            println!("{} Pipeline layout is valid!", CHECK);
            println!("  Name: {}", style(pipeline.name()).bold());
            println!("  Steps: {}", style(pipeline.len()).cyan());
            println!("  Transitions: {}", style(pipeline.transitions().len()).cyan());
            println!("  Entry: {}", style(pipeline.entry()).cyan());
            for step in pipeline.unreachable_steps() {
                println!("  {} {} is not reachable from the entry step", WARN, style(step).yellow());
            }

            if cmd.json {
                let json = serde_json::to_string_pretty(&config)?;
                println!("\n{}", json);
            }
            Ok(())
        }
        Err(e) => {
            println!("{} Validation failed:", CROSS);
            println!("  {}", style(format!("{:#}", e)).red());
            std::process::exit(1);
        }
    }
}

fn describe_layout(cmd: &DescribeCommand) -> Result<()> {
    let config = load_config(cmd.file.as_deref())?;
    let pipeline = config.build(&demo::catalog())?;

    println!("{} Pipeline {}", INFO, style(pipeline.name()).bold());
    println!("  Entry: {}", style(pipeline.entry()).cyan());
    println!("  Chain: {}", format_chain(&pipeline));
    println!("  Transitions:");
    for transition in pipeline.transitions() {
        println!("    {}", transition);
    }
    if let Some(pacing) = config.pacing() {
        println!("  Pacing: {}ms", pacing.as_millis());
    }

    let unreachable = pipeline.unreachable_steps();
    if !unreachable.is_empty() {
        println!("  {} Unreachable: {}", WARN, unreachable.join(", "));
    }

    Ok(())
}
