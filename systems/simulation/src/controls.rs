//! Player movement and abilities.

use arena_siege_core::PlayerInput;
use arena_siege_world::{cooldown_elapsed, Blast, Frame, Ignite, Projectile, Slow};
use glam::Vec2;

/// Turns per-tick input into player movement, shots, dashes and blasts.
#[derive(Debug)]
pub struct PlayerControls {
    facing: Vec2,
}

impl Default for PlayerControls {
    fn default() -> Self {
        Self { facing: Vec2::X }
    }
}

impl PlayerControls {
    /// Creates controls facing along the positive x axis.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Direction of the last aim.
    #[must_use]
    pub const fn facing(&self) -> Vec2 {
        self.facing
    }

    /// Applies one tick of input. A dead player does nothing.
    pub fn update(&mut self, frame: &mut Frame<'_>, input: &PlayerInput) {
        if !frame.player.is_alive() {
            return;
        }
        let tuning = frame.tuning;
        let settings = &tuning.player;
        let now = frame.now;

        let heading = input.movement.normalize_or_zero();
        let step = heading * settings.speed * frame.dt.as_secs_f32();
        frame.player.position = frame.walls.slide(frame.player.position, step);

        if let Some(aim) = (input.aim - frame.player.position).try_normalize() {
            self.facing = aim;
        }

        if input.dash && cooldown_elapsed(frame.player.last_dash, settings.dash_cooldown, now) {
            let direction = if heading == Vec2::ZERO { self.facing } else { heading };
            frame.player.position = frame
                .walls
                .slide(frame.player.position, direction * settings.dash_distance);
            frame.player.last_dash = Some(now);
            log::trace!("player dashed to {:?}", frame.player.position);
        }

        if input.shoot && cooldown_elapsed(frame.player.last_shot, settings.shot_cooldown, now) {
            let upgrades = frame.player.upgrades;
            let mut shot = Projectile::player(
                frame.player.position,
                self.facing,
                settings.shot_speed,
                upgrades.pierce_count(),
            )
            .with_hit(settings.shot_radius, frame.player.shot_damage(settings))
            .with_budget(now + settings.shot_ttl, settings.shot_range);
            if upgrades.fire > 0 {
                shot.ignite = Some(Ignite {
                    damage_per_second: settings.burn_per_level * upgrades.fire as f32,
                    duration: settings.burn_duration,
                });
            }
            if upgrades.slow > 0 {
                shot.slow = Some(Slow {
                    multiplier: settings.slow_multiplier,
                    duration: settings.slow_duration,
                });
            }
            frame.projectiles.push(shot);
            frame.player.last_shot = Some(now);
        }

        if input.explosion
            && cooldown_elapsed(frame.player.last_explosion, settings.explosion_cooldown, now)
        {
            frame.blasts.push(Blast::explosion(
                frame.player.position,
                settings.explosion_radius,
                settings.explosion_growth,
                settings.explosion_damage,
                now,
            ));
            frame.player.last_explosion = Some(now);
            log::debug!("player explosion at {:?}", frame.player.position);
        }
    }
}
