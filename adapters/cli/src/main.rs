#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Arena Siege headlessly under an autopilot.

mod autopilot;
mod logging;
mod store;

use std::{ops::ControlFlow, path::PathBuf};

use anyhow::{Context, Result};
use arena_siege_core::{Event, Tuning};
use arena_siege_rendering::{HeadlessPresenter, Renderer, SpriteManifest};
use arena_siege_system_simulation::{load_tuning, GameLoop, LevelTable, Phase, Simulation};
use arena_siege_world::query;
use autopilot::Autopilot;
use clap::Parser;
use store::JsonFileStore;

/// Command-line arguments for the headless runner.
#[derive(Debug, Parser)]
#[command(name = "arena-siege", version, about = "Wave-survival arena simulation")]
struct Args {
    /// Level to start from.
    #[arg(long, default_value_t = 1)]
    level: u32,
    /// Number of ticks to simulate before stopping.
    #[arg(long, default_value_t = 3_600)]
    ticks: u64,
    /// TOML file overriding the default tuning.
    #[arg(long)]
    tuning: Option<PathBuf>,
    /// TOML file describing levels and their waves.
    #[arg(long)]
    levels: Option<PathBuf>,
    /// TOML manifest mapping enemy kinds to sprite files.
    #[arg(long)]
    sprites: Option<PathBuf>,
    /// Where the player profile is saved between runs.
    #[arg(long, default_value = "arena-siege-profile.json")]
    save: PathBuf,
    /// Overrides the world and spawn seed.
    #[arg(long)]
    seed: Option<u64>,
    /// Paces ticks against the wall clock instead of running flat out.
    #[arg(long)]
    realtime: bool,
    /// Enables debug logging.
    #[arg(short, long)]
    verbose: bool,
}

/// Counters reported once the run ends.
#[derive(Debug, Default)]
struct RunSummary {
    ticks: u64,
    waves_cleared: u32,
    levels_completed: u32,
    bosses_defeated: u32,
    player_died: bool,
}

impl RunSummary {
    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::WaveCleared { .. } => self.waves_cleared += 1,
                Event::LevelCompleted { .. } => self.levels_completed += 1,
                Event::BossDefeated { .. } => self.bosses_defeated += 1,
                Event::PlayerDied => self.player_died = true,
                _ => {}
            }
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let mut tuning = match &args.tuning {
        Some(path) => load_tuning(path)
            .with_context(|| format!("failed to load tuning from {}", path.display()))?,
        None => Tuning::default(),
    };
    if let Some(seed) = args.seed {
        tuning.timing.seed = seed;
    }
    let tick = tuning.timing.tick;

    let levels = match &args.levels {
        Some(path) => LevelTable::load(path)
            .with_context(|| format!("failed to load levels from {}", path.display()))?,
        None => LevelTable::default(),
    };
    let manifest = match &args.sprites {
        Some(path) => SpriteManifest::load(path)
            .with_context(|| format!("failed to load sprites from {}", path.display()))?,
        None => SpriteManifest::default(),
    };

    let store = JsonFileStore::new(&args.save);
    log::info!("profile stored at {}", store.path().display());
    let mut simulation = Simulation::new(tuning, levels, Box::new(store));
    let mut presenter = HeadlessPresenter::new(manifest);
    let mut pilot = Autopilot::new();
    let mut summary = RunSummary::default();

    simulation
        .start(args.level)
        .with_context(|| format!("failed to start level {}", args.level))?;

    let mut failure = None;
    let mut tick_once = || match advance(&mut simulation, &mut presenter, &mut pilot, &mut summary) {
        Ok(flow) if summary.ticks < args.ticks => flow,
        Ok(_) => ControlFlow::Break(()),
        Err(error) => {
            failure = Some(error);
            ControlFlow::Break(())
        }
    };
    if args.realtime {
        let _ = GameLoop::new(tick).run(&mut tick_once);
    } else {
        while tick_once().is_continue() {}
    }
    if let Some(error) = failure {
        return Err(error);
    }

    let phase = simulation.phase();
    let tally = query::tally(simulation.world());
    simulation.stop().context("failed to stop the simulation")?;

    println!("finished in phase {phase} after {} ticks", summary.ticks);
    println!(
        "level {} wave {}: {} waves cleared, {} levels completed, {} bosses defeated",
        query::level(simulation.world()),
        query::wave(simulation.world()),
        summary.waves_cleared,
        summary.levels_completed,
        summary.bosses_defeated,
    );
    println!(
        "{} kills, {} currency, player {}",
        tally.total_kills,
        tally.currency,
        if summary.player_died { "died" } else { "survived" },
    );
    if !presenter.missing_sprites().is_empty() {
        println!("missing sprites: {:?}", presenter.missing_sprites());
    }
    Ok(())
}

/// Drives the simulation one step according to its phase.
fn advance(
    simulation: &mut Simulation,
    presenter: &mut HeadlessPresenter,
    pilot: &mut Autopilot,
    summary: &mut RunSummary,
) -> Result<ControlFlow<()>> {
    match simulation.phase() {
        Phase::Combat | Phase::Clearing { .. } => {
            let scene = simulation.scene();
            let input = pilot.input(&scene);
            summary.record(simulation.step(&input));
            summary.ticks += 1;
            presenter.present(&simulation.scene())?;
        }
        Phase::AbilitySelection => {
            let upgrade = pilot.next_upgrade();
            log::info!("choosing upgrade {upgrade:?}");
            simulation.choose_upgrade(upgrade)?;
            summary.record(simulation.events());
        }
        Phase::LevelComplete => {
            simulation.advance_level()?;
            summary.record(simulation.events());
        }
        Phase::Idle | Phase::GameOver | Phase::Stopped => return Ok(ControlFlow::Break(())),
    }
    Ok(ControlFlow::Continue(()))
}
