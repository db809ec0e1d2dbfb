//! Projectiles fired by the player, regular enemies, and bosses.

use std::time::Duration;

use arena_siege_core::{EnemyId, ProjectileOwner, ProjectileSnapshot};
use glam::Vec2;

/// Burn applied on hit by fire-upgraded player projectiles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ignite {
    /// Burn damage per second.
    pub damage_per_second: f32,
    /// Burn duration.
    pub duration: Duration,
}

/// Slow applied on hit by frost-upgraded player projectiles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Slow {
    /// Speed factor while slowed.
    pub multiplier: f32,
    /// Slow duration.
    pub duration: Duration,
}

/// A projectile in flight.
#[derive(Clone, Debug, PartialEq)]
pub struct Projectile {
    owner: ProjectileOwner,
    /// World position.
    pub position: Vec2,
    /// Unit travel direction.
    pub direction: Vec2,
    /// Speed in units per second.
    pub speed: f32,
    /// Collision radius.
    pub radius: f32,
    /// Damage per hit.
    pub damage: f32,
    /// Simulation time at which the projectile expires.
    pub expires_at: Duration,
    /// Distance the projectile may still travel.
    pub range_left: f32,
    /// Burn applied on hit.
    pub ignite: Option<Ignite>,
    /// Slow applied on hit.
    pub slow: Option<Slow>,
    pierce: Option<u32>,
    hits: Vec<EnemyId>,
}

impl Projectile {
    /// Creates a player projectile that may damage `pierce` enemies.
    #[must_use]
    pub fn player(position: Vec2, direction: Vec2, speed: f32, pierce: u32) -> Self {
        Self::new(ProjectileOwner::Player, position, direction, speed, Some(pierce.max(1)))
    }

    /// Creates a hostile projectile fired by an enemy or boss.
    #[must_use]
    pub fn hostile(owner: ProjectileOwner, position: Vec2, direction: Vec2, speed: f32) -> Self {
        Self::new(owner, position, direction, speed, None)
    }

    fn new(owner: ProjectileOwner, position: Vec2, direction: Vec2, speed: f32, pierce: Option<u32>) -> Self {
        Self {
            owner,
            position,
            direction: direction.normalize_or_zero(),
            speed,
            radius: 4.0,
            damage: 0.0,
            expires_at: Duration::MAX,
            range_left: f32::INFINITY,
            ignite: None,
            slow: None,
            pierce,
            hits: Vec::new(),
        }
    }

    /// Sets the hit radius and damage.
    #[must_use]
    pub fn with_hit(mut self, radius: f32, damage: f32) -> Self {
        self.radius = radius;
        self.damage = damage;
        self
    }

    /// Sets the time and distance budgets.
    #[must_use]
    pub fn with_budget(mut self, expires_at: Duration, range: f32) -> Self {
        self.expires_at = expires_at;
        self.range_left = range;
        self
    }

    /// Side that fired the projectile.
    #[must_use]
    pub const fn owner(&self) -> ProjectileOwner {
        self.owner
    }

    /// Remaining pierce count; `None` for hostile projectiles.
    #[must_use]
    pub const fn pierce(&self) -> Option<u32> {
        self.pierce
    }

    /// Reports whether the enemy was already hit by this projectile.
    #[must_use]
    pub fn has_hit(&self, id: EnemyId) -> bool {
        self.hits.contains(&id)
    }

    /// Records a hit on `id` and consumes one pierce.
    ///
    /// Returns `true` when the projectile is spent by this hit.
    pub fn register_hit(&mut self, id: EnemyId) -> bool {
        self.hits.push(id);
        match self.pierce.as_mut() {
            Some(remaining) => {
                *remaining = remaining.saturating_sub(1);
                *remaining == 0
            }
            None => true,
        }
    }

    /// Moves the projectile by `dt`; returns `false` once a budget is spent.
    pub fn advance(&mut self, now: Duration, dt: Duration) -> bool {
        let step = self.speed * dt.as_secs_f32();
        self.position += self.direction * step;
        self.range_left -= step;
        self.range_left > 0.0 && now < self.expires_at && self.pierce != Some(0)
    }

    /// Presentation state.
    #[must_use]
    pub fn snapshot(&self) -> ProjectileSnapshot {
        ProjectileSnapshot {
            position: self.position,
            direction: self.direction,
            owner: self.owner,
        }
    }
}

/// Projectiles grouped by owner, in the order the resolver consumes them.
#[derive(Clone, Debug, Default)]
pub struct ProjectileSet {
    /// Projectiles fired by the player.
    pub player: Vec<Projectile>,
    /// Projectiles fired by regular enemies.
    pub enemy: Vec<Projectile>,
    /// Projectiles fired by bosses.
    pub boss: Vec<Projectile>,
}

impl ProjectileSet {
    /// Adds a projectile to its owner's group.
    pub fn push(&mut self, projectile: Projectile) {
        match projectile.owner() {
            ProjectileOwner::Player => self.player.push(projectile),
            ProjectileOwner::Enemy => self.enemy.push(projectile),
            ProjectileOwner::Boss => self.boss.push(projectile),
        }
    }

    /// Removes every projectile.
    pub fn clear(&mut self) {
        self.player.clear();
        self.enemy.clear();
        self.boss.clear();
    }

    /// Removes hostile projectiles only.
    pub fn clear_hostile(&mut self) {
        self.enemy.clear();
        self.boss.clear();
    }

    /// Total projectiles in flight.
    #[must_use]
    pub fn len(&self) -> usize {
        self.player.len() + self.enemy.len() + self.boss.len()
    }

    /// Reports whether nothing is in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterator over every projectile.
    pub fn iter(&self) -> impl Iterator<Item = &Projectile> {
        self.player.iter().chain(self.enemy.iter()).chain(self.boss.iter())
    }
}
