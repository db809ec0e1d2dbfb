//! Time-limited status effects carried by enemies.

use std::time::Duration;

/// Damage-over-time applied by fire-upgraded player projectiles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Burn {
    /// Hit points removed per second while active.
    pub damage_per_second: f32,
    /// Simulation time at which the burn ends.
    pub expires_at: Duration,
}

/// Movement slow applied by frost-upgraded player projectiles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Chill {
    /// Factor applied to the enemy's base speed while active.
    pub multiplier: f32,
    /// Simulation time at which the slow ends.
    pub expires_at: Duration,
}

/// Active status effects on a single enemy.
///
/// Reapplying an effect replaces it outright: the new expiry is always
/// `now + duration`, so an effect never outlives one duration from its most
/// recent application.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StatusEffects {
    burn: Option<Burn>,
    chill: Option<Chill>,
}

impl StatusEffects {
    /// Applies or refreshes a burn.
    pub fn ignite(&mut self, now: Duration, damage_per_second: f32, duration: Duration) {
        self.burn = Some(Burn {
            damage_per_second,
            expires_at: now.saturating_add(duration),
        });
    }

    /// Applies or refreshes a slow.
    pub fn chill(&mut self, now: Duration, multiplier: f32, duration: Duration) {
        self.chill = Some(Chill {
            multiplier: multiplier.clamp(0.0, 1.0),
            expires_at: now.saturating_add(duration),
        });
    }

    /// Currently active burn, if any.
    #[must_use]
    pub const fn burn(&self) -> Option<Burn> {
        self.burn
    }

    /// Currently active slow, if any.
    #[must_use]
    pub const fn chilled(&self) -> Option<Chill> {
        self.chill
    }

    /// Advances the effects to `now` and returns burn damage dealt during the
    /// `dt` window that ended at `now`. Expired effects are cleared.
    pub fn refresh(&mut self, now: Duration, dt: Duration) -> f32 {
        let mut damage = 0.0;
        if let Some(burn) = self.burn {
            let window_start = now.saturating_sub(dt);
            let active = burn.expires_at.min(now).saturating_sub(window_start);
            damage = burn.damage_per_second * active.as_secs_f32();
            if now >= burn.expires_at {
                self.burn = None;
            }
        }
        if let Some(chill) = self.chill {
            if now >= chill.expires_at {
                self.chill = None;
            }
        }
        damage
    }

    /// Speed factor contributed by an active slow.
    #[must_use]
    pub fn speed_multiplier(&self, now: Duration) -> f32 {
        match self.chill {
            Some(chill) if now < chill.expires_at => chill.multiplier,
            _ => 1.0,
        }
    }
}
