//! Runs a scenario file through the simulation core.
//!
//! Events are printed as JSON lines on stdout as they occur, followed by a
//! final summary with every ship's snapshot. Logs go to stderr.

use std::{fs, path::{Path, PathBuf}};

use anyhow::{bail, Context, Result};
use clap::Parser;
use flaxos_core::prelude::*;
use flaxos_core::world::ShipSnapshot;
use serde::Serialize;
use tracing::{info, warn, Level};

#[derive(Parser, Debug)]
#[command(name = "flaxos-demo", version, about = "Run a Flaxos scenario and print events as JSON")]
struct Opts {
    /// Scenario JSON file
    scenario: PathBuf,
    /// Number of ticks to run
    #[arg(long, default_value_t = 60)]
    ticks: u64,
    /// Tick length (s)
    #[arg(long, default_value_t = 1.0)]
    dt: f64,
    /// Log every tick
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct Summary {
    tick: u64,
    time_s: f64,
    events: usize,
    ships: Vec<ShipSnapshot>,
}

fn load(path: &Path) -> Result<Scenario> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading scenario {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing scenario {}", path.display()))
}

fn main() -> Result<()> {
    let opts = Opts::parse();

    tracing_subscriber::fmt()
        .with_max_level(if opts.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    if !(opts.dt.is_finite() && opts.dt > 0.0) {
        bail!("--dt must be a positive number of seconds, got {}", opts.dt);
    }

    let scenario = load(&opts.scenario)?;
    let mut sim = scenario
        .build_simulation()
        .context("building simulation from scenario")?;
    info!(
        ships = sim.world().ship_count(),
        gravity_bodies = sim.world().gravity_bodies().len(),
        ticks = opts.ticks,
        dt = opts.dt,
        "scenario loaded"
    );

    let mut cursor = sim.world().time_s();
    for _ in 0..opts.ticks {
        let report = sim.step(opts.dt);
        for failure in &report.failures {
            warn!(ship = %failure.ship_id, tick = report.tick, "ship skipped: {}", failure.error);
        }
        for event in sim.world().drain_events(cursor) {
            println!("{}", serde_json::to_string(&event)?);
        }
        cursor = report.time_s;
    }

    let world = sim.world();
    let summary = Summary {
        tick: world.tick(),
        time_s: world.time_s(),
        events: world.events().len(),
        ships: world.snapshots(),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    info!(tick = summary.tick, events = summary.events, "run complete");
    Ok(())
}
