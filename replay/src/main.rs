use anyhow::Context;
use clap::Parser;
use generator::signal::{build_signal, GeneratorConfig};
use log::info;
use std::fs;
use std::path::PathBuf;
use workflow::config::WorkflowConfig;
use workflow::runner::Runner;

mod generator;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Offline trace replay driver for the BCI signal core")]
struct Args {
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Replay a recorded two-column trace file
    #[arg(long)]
    trace: Option<PathBuf>,
    /// Generate and replay a synthetic sinusoid instead of a trace
    #[arg(long, default_value_t = false)]
    synthetic: bool,
    /// Window size when no workflow config is given
    #[arg(long, default_value_t = 256)]
    window_size: usize,
    #[arg(long, default_value_t = 128.0)]
    sample_rate_hz: f64,
    #[arg(long, default_value_t = 4.0)]
    frequency_hz: f64,
    #[arg(long, default_value_t = 1.0)]
    amplitude: f64,
    #[arg(long, default_value_t = 0.02)]
    noise: f64,
    #[arg(long, default_value_t = 512)]
    samples: usize,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Write the processed window back out as a two-column trace
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = if let Some(path) = args.workflow.as_ref() {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::with_window_size(args.window_size)
    };
    let runner = Runner::new(config);

    info!(
        "replaying {} input",
        if args.synthetic { "synthetic" } else { "trace" }
    );

    let result = if args.synthetic {
        let generator = GeneratorConfig {
            sample_rate_hz: args.sample_rate_hz,
            frequency_hz: args.frequency_hz,
            amplitude: args.amplitude,
            noise: args.noise,
            samples: args.samples,
            seed: args.seed,
        };
        let signal = build_signal(&generator)?;
        runner.replay_samples(&signal)?
    } else {
        let path = args
            .trace
            .context("either --trace or --synthetic is required")?;
        let text = fs::read_to_string(&path)
            .with_context(|| format!("reading trace {}", path.display()))?;
        runner.replay_trace(&text)?
    };

    println!(
        "Replay -> stored {}, events {}, peak {:.4}, offset {:.3}, evicted {}, dropped {}",
        result.snapshot.len(),
        result.nonzero_events,
        result.peak,
        result.time_offset,
        result.metrics.evicted,
        result.metrics.dropped
    );

    if let Some(out) = args.out {
        fs::write(&out, &result.csv)
            .with_context(|| format!("writing processed trace {}", out.display()))?;
        println!("Processed window written to {}", out.display());
    }

    Ok(())
}
