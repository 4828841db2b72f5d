//! Bridge Sim - Headless Runner
//!
//! Run with: `cargo run --bin bridge-sim -- --ticks 600 --hazard volcano`
//!
//! Steps a simulation at a fixed dt without a window, feeding every tick
//! into a recording render sink, and logs a summary at the end. Set
//! `RUST_LOG=bridge_sim_engine=debug` to see individual explosions and
//! respawn fallbacks.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use bridge_sim_engine::game::{HazardKind, InteractionRequest, ScenarioKind, SimConfig, Simulation};
use bridge_sim_engine::render::{RecordingSink, RenderChannel};
use clap::{Parser, ValueEnum};
use glam::Vec3;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(
    name = "bridge-sim",
    about = "Step the bridge simulation headlessly and report what happened"
)]
struct Args {
    /// JSON config file; command-line flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of ticks to run
    #[arg(long, default_value_t = 600)]
    ticks: u32,

    /// Seconds per tick
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, value_enum)]
    scenario: Option<ScenarioArg>,

    #[arg(long)]
    density: Option<f32>,

    #[arg(long)]
    speed: Option<f32>,

    /// Hazards triggered on the first tick (repeatable)
    #[arg(long = "hazard", value_enum)]
    hazards: Vec<HazardArg>,

    /// Detonate at X,Y,Z on the first tick
    #[arg(long, value_delimiter = ',', num_args = 3)]
    explode: Option<Vec<f32>>,

    /// Print the effective config as JSON and exit
    #[arg(long)]
    print_config: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ScenarioArg {
    GoldenBridge,
    CityBlock,
}

impl From<ScenarioArg> for ScenarioKind {
    fn from(arg: ScenarioArg) -> Self {
        match arg {
            ScenarioArg::GoldenBridge => ScenarioKind::GoldenBridge,
            ScenarioArg::CityBlock => ScenarioKind::CityBlock,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum HazardArg {
    Volcano,
    Meteors,
    Tornado,
}

impl From<HazardArg> for HazardKind {
    fn from(arg: HazardArg) -> Self {
        match arg {
            HazardArg::Volcano => HazardKind::Volcano,
            HazardArg::Meteors => HazardKind::MeteorShower,
            HazardArg::Tornado => HazardKind::Tornado,
        }
    }
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = build_config(&args)?;

    if args.print_config {
        println!("{}", config.to_json_pretty()?);
        return Ok(());
    }
    if !(args.dt > 0.0) {
        bail!("--dt must be positive, got {}", args.dt);
    }

    let mut sim = Simulation::new(config).context("failed to start simulation")?;
    info!(
        scenario = sim.scenario_name(),
        voxels = sim.grid().len(),
        cars = sim.traffic().active_count(),
        "simulation ready"
    );

    for hazard in &args.hazards {
        if !sim.request(InteractionRequest::Trigger((*hazard).into())) {
            warn!(?hazard, "hazard already active");
        }
    }
    if let Some(point) = &args.explode {
        if let [x, y, z] = point.as_slice() {
            sim.request(InteractionRequest::Explode {
                point: Vec3::new(*x, *y, *z),
            });
        }
    }

    let mut sink = RecordingSink::new();
    for _ in 0..args.ticks {
        sim.tick(args.dt);
        sim.emit_render(&mut sink);
    }

    let stats = sim.traffic().stats();
    info!(
        ticks = sim.ticks(),
        time = sim.time(),
        voxels = sim.grid().len(),
        removed = sim.destruction().total_removed(),
        detached = sim.destruction().total_detached(),
        debris = sim.destruction().debris().count(),
        crashes = stats.crashes,
        explosions = stats.explosions,
        falls = stats.falls,
        captures = stats.captures,
        respawns = stats.respawns,
        ships_sunk = sim.population().ships.sunk_total(),
        visible_debris = sink.visible_count(RenderChannel::Debris),
        sink_writes = sink.writes,
        "run finished"
    );
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();
}

fn build_config(args: &Args) -> Result<SimConfig> {
    let mut config = match &args.config {
        Some(path) => SimConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => SimConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(scenario) = args.scenario {
        config.scenario = scenario.into();
    }
    if let Some(density) = args.density {
        config.traffic_density = density;
    }
    if let Some(speed) = args.speed {
        config.speed_multiplier = speed;
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}
