use std::time::Duration;

use arena_siege_core::{EnemyId, ProjectileOwner};
use arena_siege_world::{cooldown_elapsed, Frame, Projectile};

use crate::{Behavior, Pursuit};

/// Melee enemy that closes in on the player until it touches them.
#[derive(Debug, Default)]
pub struct Chaser {
    pursuit: Pursuit,
}

impl Behavior for Chaser {
    fn update(&mut self, id: EnemyId, frame: &mut Frame<'_>) {
        let Some(enemy) = frame.enemies.get(id) else {
            return;
        };
        let target = frame.player.position;
        let reach = enemy.radius + frame.player.radius;
        let gap = enemy.position.distance(target) - reach;
        if gap <= 0.0 {
            return;
        }

        let step = (enemy.current_speed(frame.now) * frame.dt.as_secs_f32()).min(gap);
        let from = enemy.position;
        let moved = self.pursuit.advance(
            frame.walls,
            &frame.tuning.pathfinding,
            frame.now,
            from,
            target,
            step,
        );
        if let Some(enemy) = frame.enemies.get_mut(id) {
            enemy.position = moved;
        }
    }
}

/// Ranged enemy that holds its distance and fires on a fixed interval.
#[derive(Debug, Default)]
pub struct Gunner {
    pursuit: Pursuit,
    last_shot: Option<Duration>,
}

impl Behavior for Gunner {
    fn update(&mut self, id: EnemyId, frame: &mut Frame<'_>) {
        let Some(enemy) = frame.enemies.get(id) else {
            return;
        };
        let settings = frame.tuning;
        let tuning = &settings.shooter;
        let paths = &settings.pathfinding;
        let from = enemy.position;
        let target = frame.player.position;
        let distance = from.distance(target);
        let step = enemy.current_speed(frame.now) * frame.dt.as_secs_f32();
        let in_sight = frame.walls.has_clear_path(from, target);

        let moved = if !in_sight {
            self.pursuit
                .advance(frame.walls, paths, frame.now, from, target, step)
        } else if distance > tuning.range {
            self.pursuit.advance(
                frame.walls,
                paths,
                frame.now,
                from,
                target,
                step.min(distance - tuning.range),
            )
        } else if distance < tuning.retreat_distance {
            let away = (from - target).normalize_or_zero();
            frame.walls.slide(from, away * step)
        } else {
            from
        };

        if in_sight
            && distance <= tuning.range
            && cooldown_elapsed(self.last_shot, tuning.fire_interval, frame.now)
        {
            let direction = (target - from).normalize_or_zero();
            let projectile = Projectile::hostile(ProjectileOwner::Enemy, from, direction, tuning.projectile_speed)
                .with_hit(tuning.projectile_radius, tuning.projectile_damage)
                .with_budget(
                    frame.now + tuning.projectile_ttl,
                    tuning.projectile_speed * tuning.projectile_ttl.as_secs_f32(),
                );
            frame.projectiles.push(projectile);
            self.last_shot = Some(frame.now);
            log::trace!("{id:?} fired at the player");
        }

        if let Some(enemy) = frame.enemies.get_mut(id) {
            enemy.position = moved;
        }
    }
}
