//! `fieldtrack` CLI: scenario runs, replay import/export.

use anyhow::Result;
use clap::{Parser, Subcommand};
use fieldmap_core::pipeline::{FieldPipeline, PipelineConfig};
use fieldmap_core::types::ClassId;
use sim::camera_sim::CameraSimulator;
use sim::replay::{save_replay, ReplayLog, TruthFrame, TruthState};
use sim::scenarios::{Scenario, ScenarioKind};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fieldtrack", about = "Field perception pipeline CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a named scenario in batch mode and print a summary.
    RunScenario {
        #[arg(value_enum)]
        scenario: ScenarioKind,
        /// Random seed for reproducibility
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Output summary metrics to a JSON file
        #[arg(long)]
        output: Option<PathBuf>,
        /// Also save the full replay log
        #[arg(long)]
        save_replay: Option<PathBuf>,
    },
    /// Load and replay a previously recorded scenario log.
    Replay {
        /// Path to replay JSON file
        input: PathBuf,
        /// Output summary metrics to a JSON file
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::RunScenario {
            scenario,
            seed,
            output,
            save_replay: save_path,
        } => {
            run_scenario(scenario, seed, output.as_deref(), save_path.as_deref())?;
        }
        Commands::Replay { input, output } => {
            run_replay(&input, output.as_deref())?;
        }
    }

    Ok(())
}

fn run_scenario(
    kind: ScenarioKind,
    seed: u64,
    output_path: Option<&std::path::Path>,
    replay_path: Option<&std::path::Path>,
) -> Result<()> {
    let mut scenario = Scenario::build(kind, seed);
    let mut camera_sim = CameraSimulator::new(scenario.cameras.clone(), seed);
    let mut pipeline = FieldPipeline::new(PipelineConfig::default())?;

    let dt = scenario.sim_dt;
    let duration = scenario.duration;
    let field = scenario.field;
    let mut sim_time = 0.0f64;
    let mut total_batches = 0usize;
    let mut all_batches = Vec::new();
    let mut truth_frames = Vec::new();

    println!(
        "Running scenario '{}' (seed={}, duration={:.0}s)...",
        scenario.name, seed, duration
    );

    let start = std::time::Instant::now();

    while sim_time < duration {
        for obj in &mut scenario.objects {
            obj.step(sim_time, dt, field);
        }
        sim_time += dt;

        truth_frames.push(TruthFrame {
            time: sim_time,
            objects: scenario
                .objects
                .iter()
                .filter(|o| o.is_active(sim_time))
                .map(|o| TruthState {
                    id: o.id,
                    class: o.class,
                    state: o.state,
                })
                .collect(),
        });

        let batches = camera_sim.generate_batches(&scenario.objects, sim_time);
        for batch in batches {
            total_batches += 1;
            all_batches.push(batch.clone());
            pipeline.submit_batch(batch);
        }
        pipeline.process_tick(dt);
    }

    let elapsed = start.elapsed();
    println!(
        "Done: {} ticks, {} batches, elapsed={:.2}s",
        (duration / dt) as u64,
        total_batches,
        elapsed.as_secs_f64(),
    );
    print_summary(&pipeline);

    if let Some(rpath) = replay_path {
        let log = ReplayLog {
            scenario_name: scenario.name.clone(),
            seed,
            sim_dt: dt,
            duration,
            batches: all_batches,
            ground_truth: truth_frames,
        };
        save_replay(&log, rpath)?;
        println!("Replay saved to {}", rpath.display());
    }

    if let Some(opath) = output_path {
        write_metrics(opath, &scenario.name, seed, elapsed.as_secs_f64(), &pipeline)?;
        println!("Metrics saved to {}", opath.display());
    }

    Ok(())
}

fn run_replay(input: &std::path::Path, output_path: Option<&std::path::Path>) -> Result<()> {
    let log = sim::replay::load_replay(input)?;
    println!(
        "Replaying '{}' ({} batches)...",
        log.scenario_name,
        log.batches.len()
    );

    let mut pipeline = FieldPipeline::new(PipelineConfig::default())?;
    let start = std::time::Instant::now();

    for batch in &log.batches {
        pipeline.submit_batch(batch.clone());
        pipeline.process_tick(log.sim_dt);
    }

    let elapsed = start.elapsed();
    println!("Replay done: elapsed={:.2}s", elapsed.as_secs_f64());
    print_summary(&pipeline);

    if let Some(opath) = output_path {
        write_metrics(opath, &log.scenario_name, log.seed, elapsed.as_secs_f64(), &pipeline)?;
    }

    Ok(())
}

fn print_summary(pipeline: &FieldPipeline) {
    for (idx, class) in pipeline.config.classes.iter().enumerate() {
        let class_id = ClassId(idx as u32);
        let (x, y, conf) = pipeline.map().highest(class_id);
        let candidates = pipeline.candidates(class_id, 0.3);
        let identities = pipeline.cache(class_id).map_or(0, |c| c.len());
        println!(
            "{}: peak ({:.0}, {:.0}) cm @ {:.2} | {} candidates above 0.3 | {} live identities",
            class.name,
            x,
            y,
            conf,
            candidates.len(),
            identities,
        );
    }
}

fn write_metrics(
    path: &std::path::Path,
    scenario: &str,
    seed: u64,
    elapsed_s: f64,
    pipeline: &FieldPipeline,
) -> Result<()> {
    let per_class: Vec<serde_json::Value> = pipeline
        .config
        .classes
        .iter()
        .enumerate()
        .map(|(idx, class)| {
            let class_id = ClassId(idx as u32);
            let (x, y, conf) = pipeline.map().highest(class_id);
            serde_json::json!({
                "class": class.name,
                "peak": [x, y, conf],
                "candidates": pipeline.candidates(class_id, 0.3).len(),
                "identities": pipeline.cache(class_id).map_or(0, |c| c.len()),
            })
        })
        .collect();
    let json = serde_json::json!({
        "scenario": scenario,
        "seed": seed,
        "elapsed_s": elapsed_s,
        "classes": per_class,
    });
    std::fs::write(path, serde_json::to_string_pretty(&json)?)?;
    Ok(())
}
