//! Tessera - headless scene runner
//!
//! Builds the demo scene and drives it for a fixed number of frames.
//!
//! Usage: `tessera [settings.toml] [--save-settings]`

mod demo;
mod settings;

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, reload};

use tessera_scene::{FrameStats, World};

use settings::Settings;

fn main() -> Result<()> {
    let mut path = None;
    let mut save = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--save-settings" => save = true,
            other => path = Some(PathBuf::from(other)),
        }
    }

    // Initialize logging at INFO so settings diagnostics are visible, then
    // switch to the configured level.
    let (filter, level) = reload::Layer::new(LevelFilter::INFO);
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .try_init()
        .context("Failed to set tracing subscriber")?;

    let settings = Settings::load(path.as_deref());
    level
        .modify(|filter| *filter = LevelFilter::from_level(settings.level()))
        .context("Failed to apply log level")?;

    info!("Starting Tessera scene runner...");

    if save {
        let saved = settings.save().context("Failed to save settings")?;
        info!("Settings written to {:?}", saved);
    }

    let mut world = World::new(settings.world.clone());
    let rig = demo::build(&mut world);

    let mut totals = FrameStats::default();
    for _ in 0..settings.frames {
        let stats = world.tick(settings.delta);
        if settings.render {
            let render = world.render();
            totals.faults += render.faults;
        }
        totals.spawned += stats.spawned;
        totals.destroyed += stats.destroyed;
        totals.components_started += stats.components_started;
        totals.components_destroyed += stats.components_destroyed;
        totals.faults += stats.faults;
        totals.frame = stats.frame;
    }

    let satellites = world.children(rig).len();
    info!(
        world = world.name(),
        frames = totals.frame,
        simulated_seconds = world.clock().total_time,
        actors = world.actor_count(),
        satellites,
        spawned = totals.spawned,
        destroyed = totals.destroyed,
        components_started = totals.components_started,
        components_destroyed = totals.components_destroyed,
        "Run complete"
    );
    if totals.faults > 0 {
        warn!(faults = totals.faults, "Hooks reported failures during the run");
    }

    Ok(())
}
