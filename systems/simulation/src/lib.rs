#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tick orchestrator for Arena Siege.
//!
//! [`Simulation`] owns the world, the per-tick systems and the spawn
//! scheduler. Each [`Simulation::step`] runs one fixed-interval tick on the
//! calling thread; spawn workers only ever reach the world through the
//! proposal channel drained at the start of a step.

mod camera;
mod controls;
mod game_loop;
mod levels;
mod persistence;

use std::{
    fmt,
    sync::mpsc::{self, Receiver},
    time::Duration,
};

use arena_siege_core::{
    Command, Event, PlayerInput, PlayerProfile, SceneSnapshot, Tuning, Upgrade,
};
use arena_siege_system_ai::Ai;
use arena_siege_system_collision::Resolver;
use arena_siege_system_spawning::{SchedulerError, SpawnScheduler};
use arena_siege_world::{self as world, query, Blast, World};
use thiserror::Error;

pub use camera::{Camera, FollowCamera};
pub use controls::PlayerControls;
pub use game_loop::{GameLoop, LoopControl};
pub use levels::{
    load_tuning, tuning_from_toml_str, ConfigError, LevelConfig, LevelTable, WaveConfig,
};
pub use persistence::{InMemoryStore, Persistence, PersistenceError};

/// Where the run currently stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// No level has been started.
    Idle,
    /// A wave is being fought.
    Combat,
    /// The wave was cleared and the wave-clear effect is expanding.
    Clearing {
        /// Phase entered once the effect finishes.
        then: Transition,
    },
    /// Waiting for [`Simulation::choose_upgrade`].
    AbilitySelection,
    /// Waiting for [`Simulation::advance_level`].
    LevelComplete,
    /// The player died; the run is frozen.
    GameOver,
    /// The simulation was stopped.
    Stopped,
}

/// Phase that follows a wave-clear effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// More waves remain in the level.
    AbilitySelection,
    /// The level's final wave was cleared.
    LevelComplete,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Combat => "combat",
            Self::Clearing { .. } => "clearing",
            Self::AbilitySelection => "ability selection",
            Self::LevelComplete => "level complete",
            Self::GameOver => "game over",
            Self::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Failures reported by the orchestrator.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// The operation is not valid in the current phase.
    #[error("cannot {operation} during {phase}")]
    WrongPhase {
        /// Operation that was attempted.
        operation: &'static str,
        /// Phase the simulation was in.
        phase: Phase,
    },
    /// The spawn scheduler failed.
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}

/// Single-threaded tick orchestrator.
pub struct Simulation {
    world: World,
    levels: LevelTable,
    ai: Ai,
    resolver: Resolver,
    controls: PlayerControls,
    scheduler: SpawnScheduler,
    proposals: Receiver<Command>,
    deferred: Vec<Command>,
    persistence: Box<dyn Persistence>,
    camera: Box<dyn Camera>,
    phase: Phase,
    paused: bool,
    boss_wave: bool,
    boss_seen: bool,
    last_wall: Duration,
    events: Vec<Event>,
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("phase", &self.phase)
            .field("paused", &self.paused)
            .field("level", &query::level(&self.world))
            .field("wave", &query::wave(&self.world))
            .field("enemies", &query::enemies(&self.world).len())
            .finish_non_exhaustive()
    }
}

impl Simulation {
    /// Creates an idle simulation following the player with a [`FollowCamera`].
    #[must_use]
    pub fn new(tuning: Tuning, levels: LevelTable, persistence: Box<dyn Persistence>) -> Self {
        let camera = Box::new(FollowCamera::new(tuning.timing.view_half_extents));
        Self::with_camera(tuning, levels, persistence, camera)
    }

    /// Creates an idle simulation with a custom camera.
    #[must_use]
    pub fn with_camera(
        tuning: Tuning,
        levels: LevelTable,
        persistence: Box<dyn Persistence>,
        camera: Box<dyn Camera>,
    ) -> Self {
        let (sender, proposals) = mpsc::channel();
        let scheduler = SpawnScheduler::new(sender, tuning.spawning.clone(), tuning.timing.seed);
        Self {
            world: World::new(tuning),
            levels,
            ai: Ai::new(),
            resolver: Resolver::new(),
            controls: PlayerControls::new(),
            scheduler,
            proposals,
            deferred: Vec::new(),
            persistence,
            camera,
            phase: Phase::Idle,
            paused: false,
            boss_wave: false,
            boss_seen: false,
            last_wall: Duration::ZERO,
            events: Vec::new(),
        }
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Reports whether stepping is suspended.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Read-only world state.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Level and wave table in use.
    #[must_use]
    pub const fn levels(&self) -> &LevelTable {
        &self.levels
    }

    /// Events produced by the most recent operation.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Presentation state for the renderer.
    #[must_use]
    pub fn scene(&self) -> SceneSnapshot {
        query::scene(&self.world)
    }

    /// Starts `level` from the persisted profile and begins its first wave.
    ///
    /// A profile that fails to load is replaced by a fresh one.
    pub fn start(&mut self, level: u32) -> Result<(), SimulationError> {
        self.halt_workers();
        self.events.clear();
        let profile = match self.persistence.load() {
            Ok(Some(profile)) => profile,
            Ok(None) => PlayerProfile::fresh(&query::tuning(&self.world).player),
            Err(error) => {
                log::warn!("failed to load profile, starting fresh: {error}");
                PlayerProfile::fresh(&query::tuning(&self.world).player)
            }
        };
        self.enter_level(level.max(1), profile)
    }

    /// Applies the chosen upgrade and starts the next wave.
    pub fn choose_upgrade(&mut self, upgrade: Upgrade) -> Result<(), SimulationError> {
        self.expect_phase(Phase::AbilitySelection, "choose an upgrade")?;
        self.events.clear();
        self.apply(Command::ApplyUpgrade { upgrade });
        let next = query::wave(&self.world) + 1;
        self.begin_wave(next)
    }

    /// Starts the level after the one just completed.
    pub fn advance_level(&mut self) -> Result<(), SimulationError> {
        self.expect_phase(Phase::LevelComplete, "advance the level")?;
        self.events.clear();
        let profile = query::profile(&self.world);
        let next = query::level(&self.world) + 1;
        self.enter_level(next, profile)
    }

    /// Suspends stepping and spawning.
    pub fn pause(&mut self) {
        self.paused = true;
        self.scheduler.pause();
        log::debug!("simulation paused");
    }

    /// Resumes stepping and spawning.
    pub fn resume(&mut self) {
        self.paused = false;
        self.scheduler.resume();
        log::debug!("simulation resumed");
    }

    /// Stops the spawn workers and saves the profile.
    pub fn stop(&mut self) -> Result<(), SimulationError> {
        let stopped = self.scheduler.stop();
        if self.phase != Phase::Idle {
            self.save_profile();
        }
        self.phase = Phase::Stopped;
        log::debug!("simulation stopped");
        stopped.map_err(SimulationError::from)
    }

    /// Runs one fixed-interval tick and returns the events it produced.
    ///
    /// Nothing advances while paused or outside of combat.
    pub fn step(&mut self, input: &PlayerInput) -> &[Event] {
        self.events.clear();
        if self.paused || !matches!(self.phase, Phase::Combat | Phase::Clearing { .. }) {
            return &self.events;
        }

        self.drain_proposals();
        let dt = query::tuning(&self.world).timing.tick;
        self.apply(Command::Tick { dt });
        self.raise_walls();

        let mut commands = Vec::new();
        {
            let mut frame = self.world.frame(&mut self.events, &mut commands);
            let now = frame.now;
            for enemy in frame.enemies.iter_mut() {
                let burn = enemy.status.refresh(now, dt);
                if burn > 0.0 {
                    let _ = enemy.take_damage(burn);
                }
            }

            self.controls.update(&mut frame, input);

            if wave_clear_active(&frame) {
                self.resolver.apply_wave_clear(&mut frame);
                self.resolver.reap(&mut frame);
            } else {
                self.resolver.resolve(&mut frame);
            }

            self.ai.update(&mut frame);
            cull(&mut frame);
        }
        self.deferred.extend(commands);

        self.check_wave();
        self.check_game_over();
        &self.events
    }

    fn enter_level(&mut self, level: u32, profile: PlayerProfile) -> Result<(), SimulationError> {
        self.ai.clear();
        self.deferred.clear();
        self.controls = PlayerControls::new();
        self.apply(Command::StartLevel { level, profile });
        self.last_wall = query::now(&self.world);
        self.begin_wave(1)
    }

    fn begin_wave(&mut self, wave: u32) -> Result<(), SimulationError> {
        self.halt_workers();
        self.drop_stale_proposals();
        self.apply(Command::BeginWave { wave });
        self.sync_viewport();

        let level = query::level(&self.world);
        let config = self.levels.wave(level, wave).cloned().unwrap_or_default();
        self.boss_wave = config.is_boss_wave();
        self.boss_seen = false;
        self.phase = Phase::Combat;

        if let Some(kind) = config.boss {
            let player = query::player(&self.world).position;
            let roster = &query::tuning(&self.world).enemies;
            self.scheduler.spawn_boss(kind, wave, player, roster)?;
        }
        self.scheduler.start(wave, &config.spawn_rates)?;
        Ok(())
    }

    fn drain_proposals(&mut self) {
        self.sync_viewport();
        let mut pending = std::mem::take(&mut self.deferred);
        pending.extend(self.proposals.try_iter());
        for command in pending {
            self.apply(command);
        }
    }

    fn drop_stale_proposals(&mut self) {
        let dropped = self.proposals.try_iter().count() + self.deferred.len();
        self.deferred.clear();
        if dropped > 0 {
            log::debug!("dropped {dropped} proposals at wave boundary");
        }
    }

    fn sync_viewport(&mut self) {
        let viewport = self.camera.viewport(query::player(&self.world).position);
        self.scheduler.set_viewport(viewport);
        self.apply(Command::ConfigureViewport { viewport });
    }

    fn raise_walls(&mut self) {
        if self.boss_wave || self.phase != Phase::Combat {
            return;
        }
        let now = query::now(&self.world);
        let interval = query::tuning(&self.world).walls.ephemeral_interval;
        if now.saturating_sub(self.last_wall) >= interval {
            self.last_wall = now;
            self.apply(Command::RaiseEphemeralWall);
        }
    }

    fn check_wave(&mut self) {
        match self.phase {
            Phase::Combat => {
                if self.boss_wave && query::boss_present(&self.world) {
                    self.boss_seen = true;
                }
                let complete = if self.boss_wave {
                    self.boss_seen && !query::boss_present(&self.world)
                } else {
                    let threshold = query::tuning(&self.world)
                        .spawning
                        .kills_per_wave
                        .saturating_mul(query::wave(&self.world));
                    query::tally(&self.world).wave_kills >= threshold
                };
                if complete {
                    self.clear_wave();
                }
            }
            Phase::Clearing { then } if !query::wave_clear_active(&self.world) => {
                self.phase = match then {
                    Transition::AbilitySelection => Phase::AbilitySelection,
                    Transition::LevelComplete => {
                        let level = query::level(&self.world);
                        log::info!("level {level} completed");
                        self.events.push(Event::LevelCompleted { level });
                        self.save_profile();
                        Phase::LevelComplete
                    }
                };
            }
            _ => {}
        }
    }

    fn clear_wave(&mut self) {
        self.halt_workers();
        let level = query::level(&self.world);
        let wave = query::wave(&self.world);
        log::info!("level {level} wave {wave} cleared");
        self.events.push(Event::WaveCleared { level, wave });

        let spawning = query::tuning(&self.world).spawning.clone();
        let mut commands = Vec::new();
        {
            let mut frame = self.world.frame(&mut self.events, &mut commands);
            let blast = Blast::wave_clear(
                frame.player.position,
                spawning.wave_clear_radius,
                spawning.wave_clear_growth,
                frame.now,
            );
            frame.blasts.push(blast);
            frame.projectiles.clear_hostile();
        }

        let then = if wave >= self.levels.wave_count(level) {
            Transition::LevelComplete
        } else {
            Transition::AbilitySelection
        };
        self.phase = Phase::Clearing { then };
    }

    fn check_game_over(&mut self) {
        if self.phase == Phase::GameOver || query::player(&self.world).is_alive() {
            return;
        }
        log::info!("game over at level {} wave {}", query::level(&self.world), query::wave(&self.world));
        self.halt_workers();
        self.phase = Phase::GameOver;
        self.save_profile();
    }

    fn halt_workers(&mut self) {
        if let Err(error) = self.scheduler.stop() {
            log::warn!("spawn workers did not stop cleanly: {error}");
        }
    }

    fn save_profile(&mut self) {
        let profile = query::profile(&self.world);
        if let Err(error) = self.persistence.save(&profile) {
            log::warn!("failed to save profile: {error}");
        }
    }

    fn expect_phase(&self, expected: Phase, operation: &'static str) -> Result<(), SimulationError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(SimulationError::WrongPhase {
                operation,
                phase: self.phase,
            })
        }
    }

    fn apply(&mut self, command: Command) {
        world::apply(&mut self.world, command, &mut self.events);
    }
}

impl Drop for Simulation {
    fn drop(&mut self) {
        self.halt_workers();
    }
}

/// Lethal blasts stay pending after they finish growing so the last pass
/// runs at their full radius.
fn wave_clear_active(frame: &world::Frame<'_>) -> bool {
    frame.blasts.iter().any(|blast| blast.lethal)
}

/// Removes regular enemies that strayed beyond the cull radius.
fn cull(frame: &mut world::Frame<'_>) {
    let limit = frame.viewport.half_diagonal() * frame.tuning.combat.cull_factor;
    let player = frame.player.position;
    let far: Vec<_> = frame
        .enemies
        .iter()
        .filter(|enemy| !enemy.kind().is_boss())
        .filter(|enemy| enemy.position.distance(player) > limit)
        .map(|enemy| enemy.id())
        .collect();
    for id in far {
        if frame.enemies.remove(id).is_some() {
            log::trace!("culled {id:?}");
            frame.events.push(Event::EnemyCulled { id });
        }
    }
}
