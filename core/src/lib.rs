#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Arena Siege engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and the per-tick systems. Spawn workers and boss
//! behaviors propose [`Command`] values describing insertions, the world
//! executes those commands via its `apply` entry point, and then broadcasts
//! [`Event`] values that the orchestrator and adapters react to. Systems
//! borrow the world's simulation context for the duration of a tick and never
//! retain references across ticks.

use std::time::Duration;

pub use glam::Vec2;
use serde::{Deserialize, Serialize};

mod profile;
mod scene;
mod status;
mod tuning;

pub use profile::{PlayerProfile, Upgrade, UpgradeSheet};
pub use scene::{
    ArenaSnapshot, EnemySnapshot, PlayerSnapshot, ProjectileSnapshot, SceneSnapshot,
    WallSnapshot, ZoneSnapshot,
};
pub use status::{Burn, Chill, StatusEffects};
pub use tuning::{
    CasterTuning, CombatTuning, EnemyProfile, EnemyRoster, JumperTuning, PathTuning,
    PlayerTuning, ShooterTuning, SpawnTuning, TickTuning, Tuning, WallTuning,
};

/// Commands that express all permissible insertions into the world.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that a regular enemy be instantiated at the provided position.
    SpawnEnemy {
        /// Kind of enemy to instantiate.
        kind: EnemyKind,
        /// World position proposed for the new enemy.
        position: Vec2,
        /// Wave that was active when the proposal was made.
        wave: u32,
    },
    /// Replaces the view bounds supplied by the camera collaborator.
    ConfigureViewport {
        /// New view bounds.
        viewport: Viewport,
    },
    /// Resets the arena for a level and restores the player from a profile.
    StartLevel {
        /// One-based level number.
        level: u32,
        /// Player progression carried into the level.
        profile: PlayerProfile,
    },
    /// Activates a wave, resetting the per-wave kill count.
    BeginWave {
        /// One-based wave number within the active level.
        wave: u32,
    },
    /// Raises one upgrade level on the player.
    ApplyUpgrade {
        /// Upgrade to apply.
        upgrade: Upgrade,
    },
    /// Requests an ephemeral wall cluster near the player.
    RaiseEphemeralWall,
    /// Requests that a boss be instantiated with explicit hit points.
    SpawnBoss {
        /// Boss archetype to instantiate.
        kind: BossKind,
        /// World position proposed for the boss.
        position: Vec2,
        /// Hit points already scaled for the active wave.
        hit_points: f32,
        /// Wave that was active when the proposal was made.
        wave: u32,
    },
}

/// Events broadcast by the world and systems while a tick is processed.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that an enemy entered the arena.
    EnemySpawned {
        /// Identifier assigned to the enemy by the arena.
        id: EnemyId,
        /// Kind of the spawned enemy.
        kind: EnemyKind,
        /// Position the enemy occupies after spawning.
        position: Vec2,
    },
    /// Reports that a spawn proposal was discarded.
    SpawnRejected {
        /// Kind of enemy that was proposed.
        kind: EnemyKind,
        /// Position that could not host the enemy.
        position: Vec2,
    },
    /// Confirms that an enemy died and was removed from the arena.
    EnemyKilled {
        /// Identifier of the removed enemy.
        id: EnemyId,
        /// Kind of the removed enemy.
        kind: EnemyKind,
        /// Position at which the enemy died.
        position: Vec2,
    },
    /// Reports that an enemy was removed for straying too far from the player.
    EnemyCulled {
        /// Identifier of the removed enemy.
        id: EnemyId,
    },
    /// Confirms that a boss finished dying and left the arena.
    BossDefeated {
        /// Archetype of the defeated boss.
        kind: BossKind,
        /// Kill-count credited for the defeat.
        kills_awarded: u32,
    },
    /// Reports damage dealt to the player.
    PlayerDamaged {
        /// Amount of hit points removed.
        amount: f32,
        /// Origin of the damage.
        source: DamageSource,
    },
    /// Announces that the player's hit points reached zero.
    PlayerDied,
    /// Announces that a new wave began.
    WaveStarted {
        /// One-based level number.
        level: u32,
        /// One-based wave number within the level.
        wave: u32,
    },
    /// Announces that the active wave met its completion condition.
    WaveCleared {
        /// One-based level number.
        level: u32,
        /// One-based wave number within the level.
        wave: u32,
    },
    /// Announces that the final wave of a level was cleared.
    LevelCompleted {
        /// One-based level number.
        level: u32,
    },
    /// Confirms that an ephemeral wall started its telegraph phase.
    WallRaised {
        /// Center of the new wall cluster.
        center: Vec2,
    },
}

/// Origin of damage applied to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DamageSource {
    /// Melee contact with an enemy.
    Contact(EnemyKind),
    /// Projectile fired by a regular enemy.
    EnemyProjectile,
    /// Projectile fired by a boss.
    BossProjectile,
    /// Area hazard such as a meteor or stomp shockwave.
    Hazard(ZoneKind),
}

/// Boss archetypes that may appear during boss waves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BossKind {
    /// Jump-attacker that stomps and leaps toward the player.
    Jumper,
    /// Caster that teleports, calls meteors, and fires projectile barrages.
    Caster,
}

/// Type tag carried by every enemy in the arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    /// Baseline melee chaser.
    Normal,
    /// Slow, durable melee chaser.
    Giant,
    /// Fast, fragile melee chaser.
    Small,
    /// Ranged enemy that holds distance and fires projectiles.
    Shooter,
    /// Sluggish melee chaser with a wide body.
    Slime,
    /// Jump-attacking boss.
    JumperBoss,
    /// Teleporting caster boss.
    CasterBoss,
}

impl EnemyKind {
    /// Regular enemy kinds that spawn workers may produce.
    pub const MINIONS: [EnemyKind; 5] = [
        Self::Normal,
        Self::Giant,
        Self::Small,
        Self::Shooter,
        Self::Slime,
    ];

    /// Returns the boss archetype when the kind denotes a boss.
    #[must_use]
    pub const fn boss(self) -> Option<BossKind> {
        match self {
            Self::JumperBoss => Some(BossKind::Jumper),
            Self::CasterBoss => Some(BossKind::Caster),
            _ => None,
        }
    }

    /// Reports whether the kind denotes a boss.
    #[must_use]
    pub const fn is_boss(self) -> bool {
        self.boss().is_some()
    }

    /// Reports whether the kind attacks from range instead of by contact.
    #[must_use]
    pub const fn is_ranged(self) -> bool {
        matches!(self, Self::Shooter)
    }
}

impl From<BossKind> for EnemyKind {
    fn from(kind: BossKind) -> Self {
        match kind {
            BossKind::Jumper => Self::JumperBoss,
            BossKind::Caster => Self::CasterBoss,
        }
    }
}

/// Stable identifier of an enemy slot in the arena.
///
/// The generation distinguishes successive occupants of the same slot so a
/// stale identifier never aliases a newer enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId {
    index: u32,
    generation: u32,
}

impl EnemyId {
    /// Creates a new enemy identifier from a slot index and generation.
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index occupied by the enemy.
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Generation of the slot when the enemy was inserted.
    #[must_use]
    pub const fn generation(&self) -> u32 {
        self.generation
    }
}

/// Owner of a projectile, which determines what it may hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProjectileOwner {
    /// Fired by the player; damages enemies.
    Player,
    /// Fired by a regular enemy; damages the player.
    Enemy,
    /// Fired by a boss; damages the player.
    Boss,
}

/// Category of an area effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ZoneKind {
    /// Player-triggered explosion damaging enemies once each.
    Explosion,
    /// Radius-growing effect that mass-kills enemies between waves.
    WaveClear,
    /// Boss meteor impact damaging the player once.
    Meteor,
    /// Boss stomp or landing shockwave damaging the player once.
    Shockwave,
}

/// Lifecycle phase of a wall as observed by collaborators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WallPhase {
    /// Permanent chunk wall or arena structure; always solid.
    Permanent,
    /// Warning phase; does not block.
    Telegraph,
    /// Blocking phase.
    Solid,
    /// Fading phase; does not block.
    Fading,
    /// Lifetime elapsed; pending removal.
    Expired,
}

/// Axis-aligned view bounds supplied by the camera collaborator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    min: Vec2,
    max: Vec2,
}

impl Viewport {
    /// Creates a viewport from two corners, normalising their order.
    #[must_use]
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Creates a viewport centered on `center` extending `half_extents` each way.
    #[must_use]
    pub fn centered(center: Vec2, half_extents: Vec2) -> Self {
        let half = half_extents.abs();
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Lower-left corner of the view.
    #[must_use]
    pub const fn min(&self) -> Vec2 {
        self.min
    }

    /// Upper-right corner of the view.
    #[must_use]
    pub const fn max(&self) -> Vec2 {
        self.max
    }

    /// Center of the view.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Distance from the center to any corner.
    #[must_use]
    pub fn half_diagonal(&self) -> f32 {
        (self.max - self.min).length() * 0.5
    }

    /// Reports whether the point lies inside the view bounds.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::centered(Vec2::ZERO, TickTuning::default().view_half_extents)
    }
}

/// Spawn cadence of one enemy kind within a wave.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnRate {
    /// Kind produced by the worker.
    pub kind: EnemyKind,
    /// Proposals per second; zero or less disables the kind.
    pub per_second: f32,
}

impl SpawnRate {
    /// Creates a spawn rate.
    #[must_use]
    pub const fn new(kind: EnemyKind, per_second: f32) -> Self {
        Self { kind, per_second }
    }

    /// Sleep between two proposals, or `None` when the rate is disabled.
    #[must_use]
    pub fn interval(&self) -> Option<Duration> {
        (self.per_second > 0.0 && self.per_second.is_finite())
            .then(|| Duration::from_secs_f64(1.0 / f64::from(self.per_second)))
    }
}

/// Per-tick input supplied by the input layer.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlayerInput {
    /// Desired movement direction; normalised by the simulation.
    pub movement: Vec2,
    /// Aim point expressed in world coordinates.
    pub aim: Vec2,
    /// Whether the shoot trigger is held.
    pub shoot: bool,
    /// Whether a dash was requested on this tick.
    pub dash: bool,
    /// Whether the explosion ability was requested on this tick.
    pub explosion: bool,
}

#[cfg(test)]
mod tests {
    use super::{BossKind, EnemyId, EnemyKind, SpawnRate, Vec2, Viewport};
    use std::time::Duration;

    #[test]
    fn boss_kinds_map_to_enemy_tags() {
        assert_eq!(EnemyKind::from(BossKind::Jumper), EnemyKind::JumperBoss);
        assert_eq!(EnemyKind::CasterBoss.boss(), Some(BossKind::Caster));
        assert!(EnemyKind::MINIONS.iter().all(|kind| !kind.is_boss()));
    }

    #[test]
    fn only_shooters_are_ranged() {
        let ranged: Vec<_> = EnemyKind::MINIONS
            .iter()
            .filter(|kind| kind.is_ranged())
            .collect();
        assert_eq!(ranged, vec![&EnemyKind::Shooter]);
    }

    #[test]
    fn spawn_rate_interval_is_reciprocal() {
        let rate = SpawnRate::new(EnemyKind::Normal, 5.0);
        assert_eq!(rate.interval(), Some(Duration::from_millis(200)));
        assert_eq!(SpawnRate::new(EnemyKind::Small, 0.0).interval(), None);
    }

    #[test]
    fn enemy_ids_order_by_slot_then_generation() {
        let first = EnemyId::new(1, 0);
        let reused = EnemyId::new(1, 1);
        let second = EnemyId::new(2, 0);
        assert!(first < reused);
        assert!(reused < second);
    }

    #[test]
    fn viewport_normalises_corners() {
        let view = Viewport::new(Vec2::new(10.0, -5.0), Vec2::new(-10.0, 5.0));
        assert_eq!(view.min(), Vec2::new(-10.0, -5.0));
        assert_eq!(view.max(), Vec2::new(10.0, 5.0));
        assert!(view.contains(Vec2::ZERO));
        assert!(!view.contains(Vec2::new(11.0, 0.0)));
        assert!((view.half_diagonal() - (20.0_f32.powi(2) + 10.0_f32.powi(2)).sqrt() / 2.0).abs() < 1e-4);
    }
}
