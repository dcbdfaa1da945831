//! Headless runner: drives a world until its tick budget, extinction, or a
//! shutdown signal.

mod telemetry;

use alife_core::{CellKind, Color, LineageStats, PopulationStats, SimulationConfig};
use alife_world::{HeadlessGeometry, LifeData, World};
use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::signal;
use tokio::time::{interval, Duration, Instant, MissedTickBehavior};
use tracing::info;

/// Host frame period in realtime mode; the world clock decides which frames tick
const FRAME: Duration = Duration::from_millis(16);

#[derive(Debug, Parser)]
#[command(name = "alife-runner", version, about = "Run a genome-driven artificial-life world")]
struct Args {
    /// JSON simulation config; defaults are used when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Ticks to run, 0 for no limit
    #[arg(long, default_value_t = 1000)]
    ticks: u64,

    /// Override the config's random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Pace ticks by the world clock instead of running flat out
    #[arg(long)]
    realtime: bool,

    /// Enable OpenTelemetry tracing
    #[arg(long, env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    otel_endpoint: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

/// Live cells of one kind, with the color a renderer draws them in
#[derive(Debug, Serialize)]
struct KindSummary {
    kind: CellKind,
    count: usize,
    color: Color,
}

/// Final state printed to stdout when the run ends
#[derive(Debug, Serialize)]
struct RunReport {
    stats: PopulationStats,
    kinds: Vec<KindSummary>,
    lives: Vec<LifeData>,
    lineages: Vec<LineageStats>,
}

impl RunReport {
    fn from_world(world: &World) -> Self {
        let mut lineages: Vec<LineageStats> = world.lineage_stats().values().cloned().collect();
        lineages.sort_by(|a, b| {
            b.total_lives
                .cmp(&a.total_lives)
                .then_with(|| a.lineage_id.0.cmp(&b.lineage_id.0))
        });

        let stats = world.stats();
        let kinds = CellKind::all()
            .into_iter()
            .map(|kind| KindSummary {
                kind,
                count: stats.count(kind),
                color: kind.base_color(),
            })
            .collect();

        Self {
            stats,
            kinds,
            lives: world.lives().map(LifeData::from).collect(),
            lineages,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    telemetry::init_telemetry(args.otel_endpoint.as_deref(), args.json_logs)?;

    let mut config = match &args.config {
        Some(path) => SimulationConfig::from_json_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    info!("Starting alife runner");
    info!(
        seed = config.seed,
        ticks = args.ticks,
        realtime = args.realtime,
        genome_bytes = config.seed_genome.len(),
        "Run configuration"
    );

    let mut world = World::new(config, HeadlessGeometry::new())?;

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = stop.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            stop.store(true, Ordering::Relaxed);
        });
    }

    if args.realtime {
        run_realtime(&mut world, args.ticks, &stop).await?;
    } else {
        run_fast(&mut world, args.ticks, &stop).await?;
    }

    world.emit_run_summary();
    println!("{}", serde_json::to_string_pretty(&RunReport::from_world(&world))?);

    telemetry::shutdown_telemetry();

    Ok(())
}

fn finished(world: &World, budget: u64, stop: &AtomicBool) -> bool {
    if stop.load(Ordering::Relaxed) {
        info!(tick = world.tick_count(), "Stopping on shutdown signal");
        return true;
    }
    if world.is_extinct() {
        info!(event = "extinction", tick = world.tick_count(), "Population went extinct");
        return true;
    }
    budget > 0 && world.tick_count() >= budget
}

/// Tick back to back
async fn run_fast(world: &mut World, budget: u64, stop: &AtomicBool) -> Result<()> {
    while !finished(world, budget, stop) {
        world.tick()?;

        // Let the signal task in on single-threaded runtimes
        if world.tick_count() % 256 == 0 {
            tokio::task::yield_now().await;
        }
    }
    Ok(())
}

/// Offer the world a frame every `FRAME` and let its clock gate the ticks
async fn run_realtime(world: &mut World, budget: u64, stop: &AtomicBool) -> Result<()> {
    let started = Instant::now();
    let mut frames = interval(FRAME);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

    while !finished(world, budget, stop) {
        frames.tick().await;
        world.advance(started.elapsed().as_secs_f64())?;
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
