//! The player avatar.

use std::time::Duration;

use arena_siege_core::{PlayerProfile, PlayerSnapshot, PlayerTuning, Upgrade, UpgradeSheet};
use glam::Vec2;

/// Reports whether `cooldown` elapsed since `last` at `now`.
#[must_use]
pub fn cooldown_elapsed(last: Option<Duration>, cooldown: Duration, now: Duration) -> bool {
    last.map_or(true, |last| now.saturating_sub(last) >= cooldown)
}

/// Player avatar state.
#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    /// World position.
    pub position: Vec2,
    /// Remaining hit points.
    pub hit_points: f32,
    /// Maximum hit points.
    pub max_hit_points: f32,
    /// Collision radius.
    pub radius: f32,
    /// Acquired upgrades.
    pub upgrades: UpgradeSheet,
    /// Time of the most recent shot.
    pub last_shot: Option<Duration>,
    /// Time of the most recent dash.
    pub last_dash: Option<Duration>,
    /// Time of the most recent explosion.
    pub last_explosion: Option<Duration>,
    /// Time of the most recent stuck check.
    pub last_stuck_check: Duration,
}

impl Player {
    /// Restores a player at the origin from a persisted profile.
    #[must_use]
    pub fn from_profile(profile: &PlayerProfile, tuning: &PlayerTuning) -> Self {
        let max_hit_points = profile.max_hit_points(tuning);
        let hit_points = if profile.hit_points > 0.0 {
            profile.hit_points.min(max_hit_points)
        } else {
            max_hit_points
        };
        Self {
            position: Vec2::ZERO,
            hit_points,
            max_hit_points,
            radius: tuning.radius,
            upgrades: profile.upgrades,
            last_shot: None,
            last_dash: None,
            last_explosion: None,
            last_stuck_check: Duration::ZERO,
        }
    }

    /// Reports whether hit points remain.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.hit_points > 0.0
    }

    /// Raises one upgrade level; vitality also heals by the added maximum.
    pub fn apply_upgrade(&mut self, upgrade: Upgrade, tuning: &PlayerTuning) {
        self.upgrades.apply(upgrade);
        if upgrade == Upgrade::Vitality {
            self.max_hit_points += tuning.vitality_per_level;
            self.hit_points = (self.hit_points + tuning.vitality_per_level).min(self.max_hit_points);
        }
    }

    /// Damage of one shot after upgrades.
    #[must_use]
    pub fn shot_damage(&self, tuning: &PlayerTuning) -> f32 {
        tuning.shot_damage + tuning.damage_per_level * self.upgrades.damage as f32
    }

    /// Presentation state.
    #[must_use]
    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            position: self.position,
            hit_points: self.hit_points,
            max_hit_points: self.max_hit_points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{cooldown_elapsed, Player};
    use arena_siege_core::{PlayerProfile, PlayerTuning, Upgrade};
    use std::time::Duration;

    #[test]
    fn dead_profile_restores_at_full_health() {
        let tuning = PlayerTuning::default();
        let profile = PlayerProfile {
            hit_points: 0.0,
            ..PlayerProfile::default()
        };
        let player = Player::from_profile(&profile, &tuning);
        assert!((player.hit_points - tuning.max_hit_points).abs() < f32::EPSILON);
    }

    #[test]
    fn vitality_heals_by_the_added_maximum() {
        let tuning = PlayerTuning::default();
        let mut player = Player::from_profile(&PlayerProfile::default(), &tuning);
        player.hit_points = 50.0;
        player.apply_upgrade(Upgrade::Vitality, &tuning);
        assert!((player.hit_points - (50.0 + tuning.vitality_per_level)).abs() < f32::EPSILON);
        assert!((player.max_hit_points - (tuning.max_hit_points + tuning.vitality_per_level)).abs() < f32::EPSILON);
    }

    #[test]
    fn cooldowns_start_ready() {
        let cooldown = Duration::from_millis(250);
        assert!(cooldown_elapsed(None, cooldown, Duration::ZERO));
        assert!(!cooldown_elapsed(Some(Duration::ZERO), cooldown, Duration::from_millis(249)));
        assert!(cooldown_elapsed(Some(Duration::ZERO), cooldown, cooldown));
    }
}
