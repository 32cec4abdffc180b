//! Headless nodeflow runner.
//!
//! Steps a simulation for a fixed number of ticks and logs population
//! statistics. Optionally holds a pointer at the viewport center for a span
//! of ticks to exercise the perturbation model.

use std::path::PathBuf;

use clap::Parser;
use nodeflow::prelude::*;
use nodeflow::spawn::clock_seed;

#[derive(Debug, Parser)]
#[command(name = "nodeflow", version, about = "Run a nodeflow simulation without a window")]
struct Cli {
    /// JSON configuration file; defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Ticks to run.
    #[arg(long, default_value_t = 3_600)]
    ticks: u64,
    /// Viewport width.
    #[arg(long, default_value_t = 1280.0)]
    width: f32,
    /// Viewport height.
    #[arg(long, default_value_t = 720.0)]
    height: f32,
    /// Random seed; seeded from the clock when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Hold a pointer at the viewport center from this tick...
    #[arg(long)]
    press_at: Option<u64>,
    /// ...for this many ticks.
    #[arg(long, default_value_t = 120)]
    press_for: u64,
    /// Log statistics every this many ticks.
    #[arg(long, default_value_t = 300)]
    report_every: u64,
    /// Write the effective configuration to this path and exit.
    #[arg(long)]
    dump_config: Option<PathBuf>,
}

const POINTER: u64 = 0;

fn main() -> nodeflow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => FlowConfig::load(path)?,
        None => FlowConfig::default(),
    };
    if let Some(path) = &cli.dump_config {
        config.save(path)?;
        tracing::info!(path = %path.display(), "configuration written");
        return Ok(());
    }

    let viewport = Vec2::new(cli.width, cli.height);
    let seed = cli.seed.unwrap_or_else(clock_seed);
    let mut sim = Simulation::new(config, viewport, seed)?;
    tracing::info!(
        nodes = sim.graph().node_count(),
        edges = sim.graph().edge_count(),
        ticks = cli.ticks,
        "running"
    );

    let center = viewport * 0.5;
    for tick in 1..=cli.ticks {
        let mut input = TickInput::new(viewport);
        if let Some(start) = cli.press_at {
            if tick == start {
                input = input.with_event(InteractionEvent::start(center, POINTER));
            } else if tick == start + cli.press_for {
                input = input.with_event(InteractionEvent::end(center, POINTER));
            }
        }

        let stats = sim.step(input);
        if cli.report_every > 0 && tick % cli.report_every == 0 {
            tracing::info!(
                tick = stats.tick,
                population = stats.population,
                perturbations = stats.perturbations,
                rotation = sim.rotation(),
                "progress"
            );
        }
    }

    let totals = sim.pool_stats();
    tracing::info!(
        spawned = totals.spawned,
        dropped = totals.dropped,
        truncated = totals.truncated,
        expired = totals.deaths.expired,
        faded = totals.deaths.faded,
        hop_limit = totals.deaths.hop_limit,
        dead_end = totals.deaths.dead_end,
        "finished"
    );
    Ok(())
}
