//! Area effects: player blasts that damage enemies and boss hazards that
//! damage the player.

use std::{collections::BTreeSet, time::Duration};

use arena_siege_core::{EnemyId, ZoneKind, ZoneSnapshot};
use glam::Vec2;

/// Player-owned area effect whose radius grows over time.
///
/// Each enemy is damaged at most once per blast.
#[derive(Clone, Debug, PartialEq)]
pub struct Blast {
    kind: ZoneKind,
    center: Vec2,
    max_radius: f32,
    started_at: Duration,
    growth: Duration,
    /// Damage per enemy; ignored by lethal blasts.
    pub damage: f32,
    /// Whether the blast kills every non-boss enemy it reaches.
    pub lethal: bool,
    hits: BTreeSet<EnemyId>,
}

impl Blast {
    /// Creates a damaging explosion.
    #[must_use]
    pub fn explosion(center: Vec2, max_radius: f32, growth: Duration, damage: f32, now: Duration) -> Self {
        Self {
            kind: ZoneKind::Explosion,
            center,
            max_radius,
            started_at: now,
            growth,
            damage,
            lethal: false,
            hits: BTreeSet::new(),
        }
    }

    /// Creates the wave-clear effect that kills regular enemies outright.
    #[must_use]
    pub fn wave_clear(center: Vec2, max_radius: f32, growth: Duration, now: Duration) -> Self {
        Self {
            kind: ZoneKind::WaveClear,
            center,
            max_radius,
            started_at: now,
            growth,
            damage: 0.0,
            lethal: true,
            hits: BTreeSet::new(),
        }
    }

    /// Effect category.
    #[must_use]
    pub const fn kind(&self) -> ZoneKind {
        self.kind
    }

    /// World position of the center.
    #[must_use]
    pub const fn center(&self) -> Vec2 {
        self.center
    }

    /// Radius at `now`, growing linearly to its maximum.
    #[must_use]
    pub fn radius(&self, now: Duration) -> f32 {
        let elapsed = now.saturating_sub(self.started_at);
        if self.growth.is_zero() || elapsed >= self.growth {
            return self.max_radius;
        }
        self.max_radius * (elapsed.as_secs_f32() / self.growth.as_secs_f32())
    }

    /// Reports whether the blast reached its maximum radius.
    #[must_use]
    pub fn finished(&self, now: Duration) -> bool {
        now.saturating_sub(self.started_at) >= self.growth
    }

    /// Records a hit; returns `false` when the enemy was already hit.
    pub fn mark_hit(&mut self, id: EnemyId) -> bool {
        self.hits.insert(id)
    }

    /// Presentation state.
    #[must_use]
    pub fn snapshot(&self, now: Duration) -> ZoneSnapshot {
        ZoneSnapshot {
            kind: self.kind,
            center: self.center,
            radius: self.radius(now),
            armed: !self.finished(now),
        }
    }
}

/// Phase of a hazard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HazardPhase {
    /// Warning phase.
    Telegraph,
    /// Damage window.
    Armed,
    /// Lifetime elapsed.
    Expired,
}

/// Boss-owned area effect that damages the player at most once.
#[derive(Clone, Debug, PartialEq)]
pub struct Hazard {
    kind: ZoneKind,
    center: Vec2,
    radius: f32,
    damage: f32,
    armed_at: Duration,
    expires_at: Duration,
    damaged: bool,
}

impl Hazard {
    /// Creates a hazard that telegraphs until `armed_at` and deals damage
    /// until `expires_at`.
    #[must_use]
    pub fn new(kind: ZoneKind, center: Vec2, radius: f32, damage: f32, armed_at: Duration, expires_at: Duration) -> Self {
        Self {
            kind,
            center,
            radius,
            damage,
            armed_at,
            expires_at: expires_at.max(armed_at),
            damaged: false,
        }
    }

    /// Effect category.
    #[must_use]
    pub const fn kind(&self) -> ZoneKind {
        self.kind
    }

    /// World position of the center.
    #[must_use]
    pub const fn center(&self) -> Vec2 {
        self.center
    }

    /// Impact radius.
    #[must_use]
    pub const fn radius(&self) -> f32 {
        self.radius
    }

    /// Phase at `now`.
    #[must_use]
    pub fn phase(&self, now: Duration) -> HazardPhase {
        if now < self.armed_at {
            HazardPhase::Telegraph
        } else if now < self.expires_at {
            HazardPhase::Armed
        } else {
            HazardPhase::Expired
        }
    }

    /// Damage dealt if the target is inside the armed zone and the hazard has
    /// not damaged it before. Consumes the one-shot flag on success.
    pub fn strike(&mut self, now: Duration, target: Vec2, target_radius: f32) -> Option<f32> {
        if self.damaged || self.phase(now) != HazardPhase::Armed {
            return None;
        }
        if target.distance(self.center) > self.radius + target_radius {
            return None;
        }
        self.damaged = true;
        Some(self.damage)
    }

    /// Presentation state.
    #[must_use]
    pub fn snapshot(&self, now: Duration) -> ZoneSnapshot {
        ZoneSnapshot {
            kind: self.kind,
            center: self.center,
            radius: self.radius,
            armed: self.phase(now) == HazardPhase::Armed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Blast, Hazard, HazardPhase};
    use arena_siege_core::{EnemyId, ZoneKind};
    use glam::Vec2;
    use std::time::Duration;

    #[test]
    fn hazard_damages_exactly_once() {
        let mut meteor = Hazard::new(
            ZoneKind::Meteor,
            Vec2::ZERO,
            50.0,
            20.0,
            Duration::from_millis(900),
            Duration::from_millis(1_200),
        );
        assert_eq!(meteor.strike(Duration::from_millis(100), Vec2::ZERO, 10.0), None);
        assert_eq!(meteor.strike(Duration::from_millis(1_000), Vec2::ZERO, 10.0), Some(20.0));
        assert_eq!(meteor.strike(Duration::from_millis(1_100), Vec2::ZERO, 10.0), None);
        assert_eq!(meteor.phase(Duration::from_millis(1_200)), HazardPhase::Expired);
    }

    #[test]
    fn blast_grows_and_hits_each_enemy_once() {
        let mut blast = Blast::explosion(Vec2::ZERO, 200.0, Duration::from_millis(400), 40.0, Duration::ZERO);
        assert!((blast.radius(Duration::from_millis(200)) - 100.0).abs() < 1e-3);
        assert!((blast.radius(Duration::from_secs(5)) - 200.0).abs() < f32::EPSILON);
        let id = EnemyId::new(3, 1);
        assert!(blast.mark_hit(id));
        assert!(!blast.mark_hit(id));
    }
}
