//! Player progression persisted between levels.

use serde::{Deserialize, Serialize};

use crate::PlayerTuning;

/// Upgrade offered during ability selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Upgrade {
    /// Adds projectile damage.
    Damage,
    /// Lets each projectile pass through one more enemy.
    Piercing,
    /// Makes projectiles ignite enemies.
    Fire,
    /// Makes projectiles slow enemies.
    Slow,
    /// Raises maximum hit points and heals by the same amount.
    Vitality,
}

impl Upgrade {
    /// Every upgrade in presentation order.
    pub const ALL: [Upgrade; 5] = [
        Self::Damage,
        Self::Piercing,
        Self::Fire,
        Self::Slow,
        Self::Vitality,
    ];
}

/// Levels acquired for each upgrade.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpgradeSheet {
    /// Damage upgrade level.
    pub damage: u32,
    /// Piercing upgrade level.
    pub piercing: u32,
    /// Fire upgrade level.
    pub fire: u32,
    /// Slow upgrade level.
    pub slow: u32,
    /// Vitality upgrade level.
    pub vitality: u32,
}

impl UpgradeSheet {
    /// Raises the level of `upgrade` by one.
    pub fn apply(&mut self, upgrade: Upgrade) {
        let level = match upgrade {
            Upgrade::Damage => &mut self.damage,
            Upgrade::Piercing => &mut self.piercing,
            Upgrade::Fire => &mut self.fire,
            Upgrade::Slow => &mut self.slow,
            Upgrade::Vitality => &mut self.vitality,
        };
        *level = level.saturating_add(1);
    }

    /// Current level of `upgrade`.
    #[must_use]
    pub const fn level(&self, upgrade: Upgrade) -> u32 {
        match upgrade {
            Upgrade::Damage => self.damage,
            Upgrade::Piercing => self.piercing,
            Upgrade::Fire => self.fire,
            Upgrade::Slow => self.slow,
            Upgrade::Vitality => self.vitality,
        }
    }

    /// Enemies a single projectile may damage before it is consumed.
    #[must_use]
    pub const fn pierce_count(&self) -> u32 {
        self.piercing.saturating_add(1)
    }
}

/// Player state carried between levels and across sessions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    /// Hit points at the time of saving.
    pub hit_points: f32,
    /// Acquired upgrades.
    pub upgrades: UpgradeSheet,
    /// Currency earned from kills.
    pub currency: u64,
    /// Kills across every level played.
    pub total_kills: u64,
    /// Highest level reached.
    pub highest_level: u32,
}

impl PlayerProfile {
    /// Creates a fresh profile for a player with the provided tuning.
    #[must_use]
    pub fn fresh(tuning: &PlayerTuning) -> Self {
        Self {
            hit_points: tuning.max_hit_points,
            upgrades: UpgradeSheet::default(),
            currency: 0,
            total_kills: 0,
            highest_level: 1,
        }
    }

    /// Maximum hit points granted by the profile's vitality level.
    #[must_use]
    pub fn max_hit_points(&self, tuning: &PlayerTuning) -> f32 {
        tuning.max_hit_points + tuning.vitality_per_level * self.upgrades.vitality as f32
    }
}

impl Default for PlayerProfile {
    fn default() -> Self {
        Self::fresh(&PlayerTuning::default())
    }
}
