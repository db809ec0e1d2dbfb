//! Named tuning values for every subsystem.
//!
//! Every struct deserialises with all fields defaulted, so a TOML override
//! file only needs to name the values it changes. Durations are expressed in
//! whole milliseconds on the wire.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::EnemyKind;

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

const fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

/// Root of the tuning tree.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Procedural and ephemeral wall parameters.
    pub walls: WallTuning,
    /// Line-of-sight and A* parameters.
    pub pathfinding: PathTuning,
    /// Per-kind enemy statistics.
    pub enemies: EnemyRoster,
    /// Ranged enemy parameters.
    pub shooter: ShooterTuning,
    /// Jump-attacking boss parameters.
    pub jumper: JumperTuning,
    /// Caster boss parameters.
    pub caster: CasterTuning,
    /// Collision resolver parameters.
    pub combat: CombatTuning,
    /// Player statistics and upgrade scaling.
    pub player: PlayerTuning,
    /// Spawn scheduler and wave progression parameters.
    pub spawning: SpawnTuning,
    /// Fixed-step timing and world seeding.
    pub timing: TickTuning,
}

/// Wall generation and ephemeral wall lifecycle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WallTuning {
    /// Edge length of one wall block and of one navigation cell.
    pub block_size: f32,
    /// Edge length of a chunk, in blocks.
    pub chunk_blocks: i32,
    /// Fewest wall clusters placed in a chunk.
    pub clusters_min: u32,
    /// Most wall clusters placed in a chunk.
    pub clusters_max: u32,
    /// Radius around the world origin kept free of permanent walls.
    pub spawn_clearance: f32,
    /// Duration of the non-blocking warning phase.
    #[serde(rename = "telegraph_ms", with = "millis")]
    pub telegraph: Duration,
    /// Duration of the blocking phase.
    #[serde(rename = "solid_ms", with = "millis")]
    pub solid: Duration,
    /// Duration of the non-blocking fade phase.
    #[serde(rename = "fade_ms", with = "millis")]
    pub fade: Duration,
    /// Closest an ephemeral wall block may be placed to the player.
    pub ephemeral_min_distance: f32,
    /// Outer radius of the ephemeral placement ring.
    pub ephemeral_max_distance: f32,
    /// Placement attempts before giving up for the tick.
    pub ephemeral_attempts: u32,
    /// Interval between ephemeral wall proposals outside boss waves.
    #[serde(rename = "ephemeral_interval_ms", with = "millis")]
    pub ephemeral_interval: Duration,
    /// Most ephemeral walls alive at once.
    pub ephemeral_cap: usize,
    /// Inner radius of the boss arena ring.
    pub arena_radius: f32,
    /// Thickness of the boss arena ring.
    pub arena_thickness: f32,
    /// Distance of the arena pillars from the arena center.
    pub arena_pillar_ring: f32,
    /// Edge length of one arena pillar.
    pub arena_pillar_size: f32,
    /// Number of arena pillars.
    pub arena_pillars: u32,
}

impl WallTuning {
    /// Edge length of a chunk in world units.
    #[must_use]
    pub fn chunk_size(&self) -> f32 {
        self.block_size * self.chunk_blocks as f32
    }

    /// Full lifetime of an ephemeral wall.
    #[must_use]
    pub fn ephemeral_lifetime(&self) -> Duration {
        self.telegraph + self.solid + self.fade
    }
}

impl Default for WallTuning {
    fn default() -> Self {
        Self {
            block_size: 40.0,
            chunk_blocks: 32,
            clusters_min: 2,
            clusters_max: 4,
            spawn_clearance: 240.0,
            telegraph: ms(1_200),
            solid: ms(6_000),
            fade: ms(800),
            ephemeral_min_distance: 160.0,
            ephemeral_max_distance: 420.0,
            ephemeral_attempts: 12,
            ephemeral_interval: ms(5_000),
            ephemeral_cap: 6,
            arena_radius: 560.0,
            arena_thickness: 40.0,
            arena_pillar_ring: 280.0,
            arena_pillar_size: 60.0,
            arena_pillars: 4,
        }
    }
}

/// Line-of-sight sampling and A* limits.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathTuning {
    /// Most node expansions a single search may perform.
    pub max_iterations: u32,
    /// Minimum interval between path recomputations for one enemy.
    #[serde(rename = "recompute_interval_ms", with = "millis")]
    pub recompute_interval: Duration,
    /// Distance between samples along a line-of-sight segment.
    pub sample_spacing: f32,
    /// Diagonal offset used to approximate entity thickness.
    pub thickness_offset: f32,
    /// Largest spiral radius, in blocks, searched by unstuck recovery.
    pub unstuck_radius: i32,
}

impl Default for PathTuning {
    fn default() -> Self {
        Self {
            max_iterations: 500,
            recompute_interval: ms(300),
            sample_spacing: 10.0,
            thickness_offset: 8.0,
            unstuck_radius: 5,
        }
    }
}

/// Statistics of one enemy kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyProfile {
    /// Starting hit points; bosses scale this by the wave number.
    pub hit_points: f32,
    /// Base movement speed in units per second.
    pub speed: f32,
    /// Collision radius.
    pub radius: f32,
    /// Damage dealt per melee contact.
    pub contact_damage: f32,
    /// Minimum interval between melee contacts.
    #[serde(rename = "attack_cooldown_ms", with = "millis")]
    pub attack_cooldown: Duration,
    /// Currency awarded when killed.
    pub reward: u32,
}

impl EnemyProfile {
    const fn new(hit_points: f32, speed: f32, radius: f32, contact_damage: f32, cooldown_ms: u64, reward: u32) -> Self {
        Self {
            hit_points,
            speed,
            radius,
            contact_damage,
            attack_cooldown: ms(cooldown_ms),
            reward,
        }
    }
}

impl Default for EnemyProfile {
    fn default() -> Self {
        Self::new(30.0, 90.0, 16.0, 10.0, 1_000, 1)
    }
}

/// Statistics for every enemy kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyRoster {
    /// Baseline chaser.
    pub normal: EnemyProfile,
    /// Durable chaser.
    pub giant: EnemyProfile,
    /// Fast chaser.
    pub small: EnemyProfile,
    /// Ranged enemy.
    pub shooter: EnemyProfile,
    /// Wide, slow chaser.
    pub slime: EnemyProfile,
    /// Jump-attacking boss; hit points are per wave.
    pub jumper: EnemyProfile,
    /// Caster boss; hit points are per wave.
    pub caster: EnemyProfile,
}

impl EnemyRoster {
    /// Returns the statistics for `kind`.
    #[must_use]
    pub const fn profile(&self, kind: EnemyKind) -> &EnemyProfile {
        match kind {
            EnemyKind::Normal => &self.normal,
            EnemyKind::Giant => &self.giant,
            EnemyKind::Small => &self.small,
            EnemyKind::Shooter => &self.shooter,
            EnemyKind::Slime => &self.slime,
            EnemyKind::JumperBoss => &self.jumper,
            EnemyKind::CasterBoss => &self.caster,
        }
    }
}

impl Default for EnemyRoster {
    fn default() -> Self {
        Self {
            normal: EnemyProfile::new(30.0, 90.0, 16.0, 10.0, 1_000, 1),
            giant: EnemyProfile::new(120.0, 55.0, 28.0, 25.0, 1_500, 3),
            small: EnemyProfile::new(12.0, 150.0, 10.0, 5.0, 700, 1),
            shooter: EnemyProfile::new(25.0, 70.0, 16.0, 5.0, 1_000, 2),
            slime: EnemyProfile::new(45.0, 60.0, 20.0, 12.0, 1_200, 2),
            jumper: EnemyProfile::new(1_500.0, 80.0, 48.0, 20.0, 1_000, 50),
            caster: EnemyProfile::new(1_200.0, 70.0, 40.0, 15.0, 1_000, 50),
        }
    }
}

/// Ranged enemy behavior.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShooterTuning {
    /// Distance at which the shooter stops advancing and fires.
    pub range: f32,
    /// Distance below which the shooter backs away.
    pub retreat_distance: f32,
    /// Interval between shots.
    #[serde(rename = "fire_interval_ms", with = "millis")]
    pub fire_interval: Duration,
    /// Projectile speed in units per second.
    pub projectile_speed: f32,
    /// Damage per projectile.
    pub projectile_damage: f32,
    /// Projectile lifetime.
    #[serde(rename = "projectile_ttl_ms", with = "millis")]
    pub projectile_ttl: Duration,
    /// Projectile collision radius.
    pub projectile_radius: f32,
}

impl Default for ShooterTuning {
    fn default() -> Self {
        Self {
            range: 320.0,
            retreat_distance: 160.0,
            fire_interval: ms(1_500),
            projectile_speed: 260.0,
            projectile_damage: 8.0,
            projectile_ttl: ms(3_000),
            projectile_radius: 6.0,
        }
    }
}

/// Jump-attacking boss.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JumperTuning {
    /// Interval between special attack selections.
    #[serde(rename = "special_interval_ms", with = "millis")]
    pub special_interval: Duration,
    /// Duration of one telegraph frame before a jump.
    #[serde(rename = "telegraph_frame_ms", with = "millis")]
    pub telegraph_frame: Duration,
    /// Telegraph frames shown before leaving the ground.
    pub telegraph_frames: u32,
    /// Airtime of one jump.
    #[serde(rename = "jump_duration_ms", with = "millis")]
    pub jump_duration: Duration,
    /// Longest distance covered by one jump.
    pub max_jump_distance: f32,
    /// Jumps chained by one jump-attack.
    pub chain_length: u32,
    /// Radius of the ground stomp.
    pub stomp_radius: f32,
    /// Damage of the ground stomp.
    pub stomp_damage: f32,
    /// Duration of the ground stomp damage window.
    #[serde(rename = "stomp_window_ms", with = "millis")]
    pub stomp_window: Duration,
    /// Radius of the landing shockwave.
    pub landing_radius: f32,
    /// Damage of the landing shockwave.
    pub landing_damage: f32,
    /// Duration of the landing shockwave damage window.
    #[serde(rename = "landing_window_ms", with = "millis")]
    pub landing_window: Duration,
}

impl Default for JumperTuning {
    fn default() -> Self {
        Self {
            special_interval: ms(6_000),
            telegraph_frame: ms(120),
            telegraph_frames: 2,
            jump_duration: ms(700),
            max_jump_distance: 420.0,
            chain_length: 3,
            stomp_radius: 170.0,
            stomp_damage: 25.0,
            stomp_window: ms(600),
            landing_radius: 90.0,
            landing_damage: 20.0,
            landing_window: ms(150),
        }
    }
}

/// Teleporting caster boss.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CasterTuning {
    /// Interval between special attack selections.
    #[serde(rename = "attack_interval_ms", with = "millis")]
    pub attack_interval: Duration,
    /// Interval between displacement samples.
    #[serde(rename = "stuck_check_interval_ms", with = "millis")]
    pub stuck_check_interval: Duration,
    /// Displacement below which a sample counts as stuck.
    pub stuck_threshold: f32,
    /// Consecutive stuck samples required before teleporting.
    pub stuck_checks: u32,
    /// Minimum interval between teleports.
    #[serde(rename = "teleport_cooldown_ms", with = "millis")]
    pub teleport_cooldown: Duration,
    /// Total duration of the teleport fade.
    #[serde(rename = "teleport_duration_ms", with = "millis")]
    pub teleport_duration: Duration,
    /// Candidate positions tried around the player.
    pub teleport_attempts: u32,
    /// Smallest teleport offset from the player.
    pub teleport_min_offset: f32,
    /// Largest teleport offset from the player.
    pub teleport_max_offset: f32,
    /// Meteors dropped by one meteor barrage.
    pub meteor_count: u32,
    /// Interval between meteors.
    #[serde(rename = "meteor_interval_ms", with = "millis")]
    pub meteor_interval: Duration,
    /// Largest offset of a meteor from the player.
    pub meteor_scatter: f32,
    /// Impact radius of a meteor.
    pub meteor_radius: f32,
    /// Warning time before a meteor lands.
    #[serde(rename = "meteor_telegraph_ms", with = "millis")]
    pub meteor_telegraph: Duration,
    /// Duration of a meteor's damage phase.
    #[serde(rename = "meteor_impact_ms", with = "millis")]
    pub meteor_impact: Duration,
    /// Damage of a meteor.
    pub meteor_damage: f32,
    /// Total duration of a projectile barrage.
    #[serde(rename = "barrage_duration_ms", with = "millis")]
    pub barrage_duration: Duration,
    /// Interval between barrage emissions.
    #[serde(rename = "barrage_interval_ms", with = "millis")]
    pub barrage_interval: Duration,
    /// Projectiles in a ring burst.
    pub ring_count: u32,
    /// Projectiles in a rotating ring.
    pub rotating_count: u32,
    /// Rotation added to the rotating ring per emission, in degrees.
    pub rotation_step_degrees: f32,
    /// Projectiles in a spread fan.
    pub fan_count: u32,
    /// Total angular width of a spread fan, in degrees.
    pub fan_spread_degrees: f32,
    /// Boss projectile speed.
    pub projectile_speed: f32,
    /// Boss projectile damage.
    pub projectile_damage: f32,
    /// Boss projectile lifetime.
    #[serde(rename = "projectile_ttl_ms", with = "millis")]
    pub projectile_ttl: Duration,
    /// Boss projectile collision radius.
    pub projectile_radius: f32,
    /// Minions proposed by one summon.
    pub summon_count: u32,
    /// Distance of summoned minions from the boss.
    pub summon_radius: f32,
    /// Frames in the death animation.
    pub death_frames: u32,
    /// Duration of one death frame.
    #[serde(rename = "death_frame_ms", with = "millis")]
    pub death_frame: Duration,
}

impl Default for CasterTuning {
    fn default() -> Self {
        Self {
            attack_interval: ms(7_000),
            stuck_check_interval: ms(500),
            stuck_threshold: 12.0,
            stuck_checks: 4,
            teleport_cooldown: ms(5_000),
            teleport_duration: ms(900),
            teleport_attempts: 12,
            teleport_min_offset: 140.0,
            teleport_max_offset: 280.0,
            meteor_count: 5,
            meteor_interval: ms(450),
            meteor_scatter: 120.0,
            meteor_radius: 70.0,
            meteor_telegraph: ms(900),
            meteor_impact: ms(250),
            meteor_damage: 22.0,
            barrage_duration: ms(3_000),
            barrage_interval: ms(250),
            ring_count: 12,
            rotating_count: 8,
            rotation_step_degrees: 15.0,
            fan_count: 5,
            fan_spread_degrees: 40.0,
            projectile_speed: 220.0,
            projectile_damage: 10.0,
            projectile_ttl: ms(4_000),
            projectile_radius: 8.0,
            summon_count: 4,
            summon_radius: 90.0,
            death_frames: 8,
            death_frame: ms(120),
        }
    }
}

/// Collision resolver parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatTuning {
    /// Interval between player-stuck checks.
    #[serde(rename = "stuck_check_interval_ms", with = "millis")]
    pub stuck_check_interval: Duration,
    /// Displacement applied to each side when the player touches an enemy.
    pub contact_push: f32,
    /// Fraction of the overlap resolved per tick by enemy separation.
    pub separation_strength: f32,
    /// Kill-count credited per wave number when a boss dies.
    pub boss_kill_weight: u32,
    /// Culling distance as a multiple of the viewport half-diagonal.
    pub cull_factor: f32,
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            stuck_check_interval: ms(500),
            contact_push: 6.0,
            separation_strength: 0.5,
            boss_kill_weight: 10,
            cull_factor: 1.6,
        }
    }
}

/// Player statistics and upgrade scaling.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    /// Hit points of a fresh player.
    pub max_hit_points: f32,
    /// Collision radius.
    pub radius: f32,
    /// Movement speed in units per second.
    pub speed: f32,
    /// Interval between shots.
    #[serde(rename = "shot_cooldown_ms", with = "millis")]
    pub shot_cooldown: Duration,
    /// Player projectile speed.
    pub shot_speed: f32,
    /// Player projectile collision radius.
    pub shot_radius: f32,
    /// Base damage of a player projectile.
    pub shot_damage: f32,
    /// Player projectile lifetime.
    #[serde(rename = "shot_ttl_ms", with = "millis")]
    pub shot_ttl: Duration,
    /// Longest distance a player projectile travels.
    pub shot_range: f32,
    /// Damage added per damage upgrade level.
    pub damage_per_level: f32,
    /// Burn damage per second per fire upgrade level.
    pub burn_per_level: f32,
    /// Burn duration.
    #[serde(rename = "burn_duration_ms", with = "millis")]
    pub burn_duration: Duration,
    /// Speed factor applied by a slow.
    pub slow_multiplier: f32,
    /// Slow duration per slow upgrade level.
    #[serde(rename = "slow_duration_ms", with = "millis")]
    pub slow_duration: Duration,
    /// Maximum hit points added per vitality level.
    pub vitality_per_level: f32,
    /// Distance covered by a dash.
    pub dash_distance: f32,
    /// Interval between dashes.
    #[serde(rename = "dash_cooldown_ms", with = "millis")]
    pub dash_cooldown: Duration,
    /// Final radius of the explosion ability.
    pub explosion_radius: f32,
    /// Time the explosion takes to reach its final radius.
    #[serde(rename = "explosion_growth_ms", with = "millis")]
    pub explosion_growth: Duration,
    /// Damage dealt by the explosion ability.
    pub explosion_damage: f32,
    /// Interval between explosions.
    #[serde(rename = "explosion_cooldown_ms", with = "millis")]
    pub explosion_cooldown: Duration,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            max_hit_points: 100.0,
            radius: 16.0,
            speed: 220.0,
            shot_cooldown: ms(250),
            shot_speed: 620.0,
            shot_radius: 5.0,
            shot_damage: 10.0,
            shot_ttl: ms(1_500),
            shot_range: 900.0,
            damage_per_level: 4.0,
            burn_per_level: 4.0,
            burn_duration: ms(3_000),
            slow_multiplier: 0.55,
            slow_duration: ms(2_000),
            vitality_per_level: 20.0,
            dash_distance: 140.0,
            dash_cooldown: ms(1_500),
            explosion_radius: 200.0,
            explosion_growth: ms(400),
            explosion_damage: 40.0,
            explosion_cooldown: ms(8_000),
        }
    }
}

/// Spawn scheduler and wave progression.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnTuning {
    /// Gap between the viewport half-diagonal and the spawn ring.
    pub ring_margin: f32,
    /// Radial depth of the spawn ring.
    pub ring_depth: f32,
    /// Longest time `stop` waits for workers to finish.
    #[serde(rename = "shutdown_timeout_ms", with = "millis")]
    pub shutdown_timeout: Duration,
    /// Kills per wave number required to clear a normal wave.
    pub kills_per_wave: u32,
    /// Final radius of the wave-clear effect.
    pub wave_clear_radius: f32,
    /// Time the wave-clear effect takes to reach its final radius.
    #[serde(rename = "wave_clear_growth_ms", with = "millis")]
    pub wave_clear_growth: Duration,
    /// Distance from the player at which bosses appear.
    pub boss_offset: f32,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self {
            ring_margin: 80.0,
            ring_depth: 160.0,
            shutdown_timeout: ms(500),
            kills_per_wave: 50,
            wave_clear_radius: 2_400.0,
            wave_clear_growth: ms(1_200),
            boss_offset: 320.0,
        }
    }
}

/// Fixed-step timing and world seeding.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickTuning {
    /// Simulated time advanced by one step.
    #[serde(rename = "tick_ms", with = "millis")]
    pub tick: Duration,
    /// Seed for wall generation and every simulation random stream.
    pub seed: u64,
    /// Half extents of the default camera view.
    pub view_half_extents: Vec2,
}

impl Default for TickTuning {
    fn default() -> Self {
        Self {
            tick: ms(16),
            seed: 0x5eed_a7e7_a51e_6e00,
            view_half_extents: Vec2::new(640.0, 360.0),
        }
    }
}
