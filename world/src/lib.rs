#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Arena Siege.
//!
//! The world owns every collection the simulation mutates: the player, the
//! enemy arena, projectiles, area effects, and walls. Insertions arrive as
//! [`Command`] values through [`apply`]; per-tick systems borrow a [`Frame`]
//! of disjoint mutable views for the duration of one tick.

mod enemies;
pub mod navigation;
mod player;
mod projectiles;
pub mod walls;
mod zones;

use std::time::Duration;

use arena_siege_core::{Command, DamageSource, EnemyKind, Event, PlayerProfile, Tuning, Viewport};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub use enemies::{Enemy, EnemyArena};
pub use player::{cooldown_elapsed, Player};
pub use projectiles::{Ignite, Projectile, ProjectileSet, Slow};
pub use zones::{Blast, Hazard, HazardPhase};

use walls::WallMap;

/// Kill and currency counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tally {
    /// Kills credited during the active wave.
    pub wave_kills: u32,
    /// Kills credited across the whole run.
    pub total_kills: u64,
    /// Currency earned across the whole run.
    pub currency: u64,
}

impl Tally {
    /// Credits one regular kill and its reward.
    pub fn record_kill(&mut self, reward: u32) {
        self.award_kills(1);
        self.currency = self.currency.saturating_add(u64::from(reward));
    }

    /// Credits `kills` kills without currency.
    pub fn award_kills(&mut self, kills: u32) {
        self.wave_kills = self.wave_kills.saturating_add(kills);
        self.total_kills = self.total_kills.saturating_add(u64::from(kills));
    }
}

/// Represents the authoritative Arena Siege world state.
#[derive(Debug)]
pub struct World {
    tuning: Tuning,
    clock: Duration,
    last_dt: Duration,
    tick_index: u64,
    level: u32,
    wave: u32,
    highest_level: u32,
    player: Player,
    enemies: EnemyArena,
    projectiles: ProjectileSet,
    blasts: Vec<Blast>,
    hazards: Vec<Hazard>,
    walls: WallMap,
    viewport: Viewport,
    rng: ChaCha8Rng,
    tally: Tally,
}

impl World {
    /// Creates a world with a fresh player standing at the origin.
    #[must_use]
    pub fn new(tuning: Tuning) -> Self {
        let seed = tuning.timing.seed;
        let walls = WallMap::new(tuning.walls.clone(), tuning.pathfinding.clone(), seed);
        let profile = PlayerProfile::fresh(&tuning.player);
        let player = Player::from_profile(&profile, &tuning.player);
        let viewport = Viewport::centered(player.position, tuning.timing.view_half_extents);
        let mut world = Self {
            tuning,
            clock: Duration::ZERO,
            last_dt: Duration::ZERO,
            tick_index: 0,
            level: 1,
            wave: 0,
            highest_level: 1,
            player,
            enemies: EnemyArena::new(),
            projectiles: ProjectileSet::default(),
            blasts: Vec::new(),
            hazards: Vec::new(),
            walls,
            viewport,
            rng: ChaCha8Rng::seed_from_u64(seed.rotate_left(17)),
            tally: Tally::default(),
        };
        world.walls.ensure_chunks_around(world.player.position);
        world
    }

    /// Borrows the per-tick simulation context.
    pub fn frame<'a>(&'a mut self, events: &'a mut Vec<Event>, commands: &'a mut Vec<Command>) -> Frame<'a> {
        Frame {
            now: self.clock,
            dt: self.last_dt,
            level: self.level,
            wave: self.wave,
            tuning: &self.tuning,
            walls: &self.walls,
            viewport: self.viewport,
            player: &mut self.player,
            enemies: &mut self.enemies,
            projectiles: &mut self.projectiles,
            blasts: &mut self.blasts,
            hazards: &mut self.hazards,
            tally: &mut self.tally,
            rng: &mut self.rng,
            events,
            commands,
        }
    }

    fn spawn_position(&self, proposed: glam::Vec2) -> Option<glam::Vec2> {
        let position =
            navigation::unstuck_from_wall(&self.walls, proposed, self.tuning.pathfinding.unstuck_radius);
        (!self.walls.is_wall(position)).then_some(position)
    }
}

/// Disjoint views of the world borrowed by systems for one tick.
///
/// Systems never retain references past the tick; collaborators that need
/// state across ticks copy it out or keep identifiers.
#[derive(Debug)]
pub struct Frame<'a> {
    /// Simulation time at the end of the current tick.
    pub now: Duration,
    /// Simulated time advanced by the current tick.
    pub dt: Duration,
    /// One-based level number.
    pub level: u32,
    /// One-based wave number; zero before the first wave.
    pub wave: u32,
    /// Tuning in effect.
    pub tuning: &'a Tuning,
    /// Wall state.
    pub walls: &'a WallMap,
    /// Camera bounds.
    pub viewport: Viewport,
    /// Player avatar.
    pub player: &'a mut Player,
    /// Enemy arena.
    pub enemies: &'a mut EnemyArena,
    /// Projectiles in flight.
    pub projectiles: &'a mut ProjectileSet,
    /// Player-owned blasts.
    pub blasts: &'a mut Vec<Blast>,
    /// Boss-owned hazards.
    pub hazards: &'a mut Vec<Hazard>,
    /// Kill and currency counters.
    pub tally: &'a mut Tally,
    /// Simulation random stream.
    pub rng: &'a mut ChaCha8Rng,
    /// Events produced during the tick.
    pub events: &'a mut Vec<Event>,
    /// Insertions proposed during the tick, applied on the next drain.
    pub commands: &'a mut Vec<Command>,
}

impl Frame<'_> {
    /// Removes hit points from the player, announcing the damage and a death.
    pub fn damage_player(&mut self, amount: f32, source: DamageSource) {
        if amount <= 0.0 || !self.player.is_alive() {
            return;
        }
        self.player.hit_points -= amount;
        self.events.push(Event::PlayerDamaged { amount, source });
        if !self.player.is_alive() {
            log::info!("player died at {:?}", self.now);
            self.events.push(Event::PlayerDied);
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.clock = world.clock.saturating_add(dt);
            world.last_dt = dt;
            world.tick_index = world.tick_index.saturating_add(1);
            world.walls.sync_clock(world.clock);
            let expired = world.walls.expire();
            if expired > 0 {
                log::trace!("{expired} ephemeral walls expired");
            }
            world.walls.ensure_chunks_around(world.player.position);
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::ConfigureViewport { viewport } => {
            world.viewport = viewport;
        }
        Command::StartLevel { level, profile } => {
            log::info!("starting level {level}");
            world.level = level;
            world.wave = 0;
            world.highest_level = profile.highest_level.max(level);
            world.enemies.clear();
            world.projectiles.clear();
            world.blasts.clear();
            world.hazards.clear();
            world.walls.clear_ephemeral();
            world.walls.lower_arena();
            world.player = Player::from_profile(&profile, &world.tuning.player);
            world.tally = Tally {
                wave_kills: 0,
                total_kills: profile.total_kills,
                currency: profile.currency,
            };
            world.walls.ensure_chunks_around(world.player.position);
        }
        Command::BeginWave { wave } => {
            world.wave = wave;
            world.tally.wave_kills = 0;
            world.projectiles.clear_hostile();
            world.hazards.clear();
            world.walls.lower_arena();
            log::info!("level {} wave {} started", world.level, wave);
            out_events.push(Event::WaveStarted {
                level: world.level,
                wave,
            });
        }
        Command::ApplyUpgrade { upgrade } => {
            log::debug!("applying upgrade {upgrade:?}");
            world.player.apply_upgrade(upgrade, &world.tuning.player);
        }
        Command::RaiseEphemeralWall => {
            let near = world.player.position;
            if let Some(center) = world.walls.spawn_ephemeral_wall(near, &mut world.rng) {
                out_events.push(Event::WallRaised { center });
            }
        }
        Command::SpawnEnemy {
            kind,
            position,
            wave,
        } => {
            if kind.is_boss() || wave != world.wave {
                log::debug!("discarding {kind:?} proposal for wave {wave} (active wave {})", world.wave);
                out_events.push(Event::SpawnRejected { kind, position });
                return;
            }
            let Some(position) = world.spawn_position(position) else {
                out_events.push(Event::SpawnRejected { kind, position });
                return;
            };
            let profile = world.tuning.enemies.profile(kind);
            let id = world.enemies.insert(kind, position, profile, profile.hit_points);
            log::trace!("spawned {kind:?} as {id:?}");
            out_events.push(Event::EnemySpawned { id, kind, position });
        }
        Command::SpawnBoss {
            kind,
            position,
            hit_points,
            wave,
        } => {
            let tag = EnemyKind::from(kind);
            if wave != world.wave {
                out_events.push(Event::SpawnRejected {
                    kind: tag,
                    position,
                });
                return;
            }
            world.walls.raise_arena(world.player.position);
            let Some(position) = world.spawn_position(position) else {
                log::warn!("boss {kind:?} could not be placed");
                out_events.push(Event::SpawnRejected {
                    kind: tag,
                    position,
                });
                return;
            };
            let profile = world.tuning.enemies.profile(tag);
            let id = world.enemies.insert(tag, position, profile, hit_points);
            log::info!("boss {kind:?} entered with {hit_points:.0} hit points");
            out_events.push(Event::EnemySpawned {
                id,
                kind: tag,
                position,
            });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use arena_siege_core::{PlayerProfile, SceneSnapshot, Tuning, Viewport, ZoneKind};

    use super::{Blast, EnemyArena, Hazard, Player, ProjectileSet, Tally, World};
    use crate::walls::WallMap;

    /// Simulation time.
    #[must_use]
    pub fn now(world: &World) -> Duration {
        world.clock
    }

    /// Number of ticks applied.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// One-based level number.
    #[must_use]
    pub fn level(world: &World) -> u32 {
        world.level
    }

    /// Active wave number; zero before the first wave.
    #[must_use]
    pub fn wave(world: &World) -> u32 {
        world.wave
    }

    /// Tuning in effect.
    #[must_use]
    pub fn tuning(world: &World) -> &Tuning {
        &world.tuning
    }

    /// Player avatar.
    #[must_use]
    pub fn player(world: &World) -> &Player {
        &world.player
    }

    /// Enemy arena.
    #[must_use]
    pub fn enemies(world: &World) -> &EnemyArena {
        &world.enemies
    }

    /// Projectiles in flight.
    #[must_use]
    pub fn projectiles(world: &World) -> &ProjectileSet {
        &world.projectiles
    }

    /// Player-owned blasts.
    #[must_use]
    pub fn blasts(world: &World) -> &[Blast] {
        &world.blasts
    }

    /// Boss-owned hazards.
    #[must_use]
    pub fn hazards(world: &World) -> &[Hazard] {
        &world.hazards
    }

    /// Wall state.
    #[must_use]
    pub fn walls(world: &World) -> &WallMap {
        &world.walls
    }

    /// Camera bounds.
    #[must_use]
    pub fn viewport(world: &World) -> Viewport {
        world.viewport
    }

    /// Kill and currency counters.
    #[must_use]
    pub fn tally(world: &World) -> Tally {
        world.tally
    }

    /// Reports whether a boss is in the arena, dying bosses included.
    #[must_use]
    pub fn boss_present(world: &World) -> bool {
        world.enemies.boss().is_some()
    }

    /// Reports whether a wave-clear blast is waiting to be resolved. A blast
    /// that reached its full radius stays pending until its final pass.
    #[must_use]
    pub fn wave_clear_active(world: &World) -> bool {
        world.blasts.iter().any(|blast| blast.kind() == ZoneKind::WaveClear)
    }

    /// Player progression suitable for persistence.
    #[must_use]
    pub fn profile(world: &World) -> PlayerProfile {
        PlayerProfile {
            hit_points: world.player.hit_points.max(0.0),
            upgrades: world.player.upgrades,
            currency: world.tally.currency,
            total_kills: world.tally.total_kills,
            highest_level: world.highest_level.max(world.level),
        }
    }

    /// Read-only presentation state for the current tick.
    #[must_use]
    pub fn scene(world: &World) -> SceneSnapshot {
        let now = world.clock;
        SceneSnapshot {
            time: now,
            level: world.level,
            wave: world.wave,
            player: world.player.snapshot(),
            enemies: world.enemies.iter().map(|enemy| enemy.snapshot(now)).collect(),
            projectiles: world.projectiles.iter().map(|projectile| projectile.snapshot()).collect(),
            walls: world.walls.snapshot_in(&world.viewport),
            zones: world
                .blasts
                .iter()
                .map(|blast| blast.snapshot(now))
                .chain(world.hazards.iter().map(|hazard| hazard.snapshot(now)))
                .collect(),
            arena: world.walls.arena_snapshot(),
            viewport: world.viewport,
        }
    }
}
