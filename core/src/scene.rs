//! Read-only scene snapshots handed to presentation adapters.

use std::time::Duration;

use glam::Vec2;

use crate::{EnemyId, EnemyKind, ProjectileOwner, Viewport, WallPhase, ZoneKind};

/// Everything a renderer needs to present one tick.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneSnapshot {
    /// Simulation time of the snapshot.
    pub time: Duration,
    /// One-based level number.
    pub level: u32,
    /// One-based wave number.
    pub wave: u32,
    /// Player state.
    pub player: PlayerSnapshot,
    /// Enemies ordered by identifier.
    pub enemies: Vec<EnemySnapshot>,
    /// Projectiles of every owner.
    pub projectiles: Vec<ProjectileSnapshot>,
    /// Walls overlapping the viewport.
    pub walls: Vec<WallSnapshot>,
    /// Blasts and hazards.
    pub zones: Vec<ZoneSnapshot>,
    /// Boss arena ring, while raised.
    pub arena: Option<ArenaSnapshot>,
    /// View bounds used for the snapshot.
    pub viewport: Viewport,
}

/// Player presentation state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerSnapshot {
    /// World position.
    pub position: Vec2,
    /// Remaining hit points.
    pub hit_points: f32,
    /// Maximum hit points.
    pub max_hit_points: f32,
}

/// Enemy presentation state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Arena identifier.
    pub id: EnemyId,
    /// Kind tag used to select a sprite.
    pub kind: EnemyKind,
    /// World position.
    pub position: Vec2,
    /// Collision radius.
    pub radius: f32,
    /// Remaining hit points.
    pub hit_points: f32,
    /// Opacity in `[0, 1]`; bosses fade while teleporting.
    pub alpha: f32,
    /// Whether a burn is active.
    pub burning: bool,
    /// Whether a slow is active.
    pub chilled: bool,
}

/// Projectile presentation state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// World position.
    pub position: Vec2,
    /// Unit travel direction.
    pub direction: Vec2,
    /// Side that fired the projectile.
    pub owner: ProjectileOwner,
}

/// Wall presentation state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WallSnapshot {
    /// Lower-left corner.
    pub min: Vec2,
    /// Upper-right corner.
    pub max: Vec2,
    /// Lifecycle phase.
    pub phase: WallPhase,
}

/// Area effect presentation state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoneSnapshot {
    /// Effect category.
    pub kind: ZoneKind,
    /// World position of the center.
    pub center: Vec2,
    /// Current radius.
    pub radius: f32,
    /// Whether the zone currently deals damage.
    pub armed: bool,
}

/// Boss arena presentation state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArenaSnapshot {
    /// World position of the arena center.
    pub center: Vec2,
    /// Inner radius of the ring.
    pub inner_radius: f32,
    /// Thickness of the ring.
    pub thickness: f32,
}
