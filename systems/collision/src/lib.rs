#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Collision and interaction resolver.
//!
//! The resolver is the only system that removes enemies. It runs once per
//! tick in a fixed order because several interactions compound within one
//! tick: a projectile can kill an enemy that would otherwise have touched the
//! player, and a blast can finish an enemy already burning.

use arena_siege_core::{DamageSource, EnemyId, EnemyKind, Event, ProjectileOwner};
use arena_siege_world::{navigation, Enemy, Frame, HazardPhase, Projectile};
use glam::Vec2;

/// Interaction steps in the order they run each tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// Periodic player unstuck recovery.
    PlayerStuck,
    /// Boss projectiles and hazards against the player.
    BossProjectiles,
    /// Regular enemy projectiles against the player.
    EnemyProjectiles,
    /// Removal of bosses that finished dying.
    DeadBosses,
    /// Player and enemy body contact.
    Contact,
    /// Player blasts against enemies.
    Blasts,
    /// Player projectiles against enemies.
    PlayerProjectiles,
    /// Enemy crowd separation.
    Separation,
}

impl Step {
    /// Every step in execution order.
    pub const ORDER: [Step; 8] = [
        Step::PlayerStuck,
        Step::BossProjectiles,
        Step::EnemyProjectiles,
        Step::DeadBosses,
        Step::Contact,
        Step::Blasts,
        Step::PlayerProjectiles,
        Step::Separation,
    ];
}

/// Reports whether a dead boss may leave the arena.
///
/// Casters stay until their death countdown completes; other bosses leave as
/// soon as their hit points run out.
#[must_use]
pub fn boss_removable(enemy: &Enemy) -> bool {
    enemy.kind().is_boss()
        && !enemy.is_alive()
        && (enemy.kind() != EnemyKind::CasterBoss || enemy.death_complete)
}

/// Per-tick collision and interaction resolver.
#[derive(Debug, Default)]
pub struct Resolver {
    scratch: Vec<EnemyId>,
}

impl Resolver {
    /// Creates a resolver with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs every interaction step in order, then reaps enemies whose hit
    /// points ran out during the tick.
    pub fn resolve(&mut self, frame: &mut Frame<'_>) {
        for step in Step::ORDER {
            self.run(step, frame);
        }
        self.reap(frame);
    }

    /// Runs a single interaction step.
    pub fn run(&mut self, step: Step, frame: &mut Frame<'_>) {
        match step {
            Step::PlayerStuck => recover_stuck_player(frame),
            Step::BossProjectiles => {
                hostile_projectiles(frame, ProjectileOwner::Boss);
                hazards(frame);
            }
            Step::EnemyProjectiles => hostile_projectiles(frame, ProjectileOwner::Enemy),
            Step::DeadBosses => self.remove_dead_bosses(frame),
            Step::Contact => self.contact(frame),
            Step::Blasts => self.blasts(frame),
            Step::PlayerProjectiles => player_projectiles(frame),
            Step::Separation => self.separate(frame),
        }
    }

    /// Removes regular enemies with no hit points left, crediting each kill.
    pub fn reap(&mut self, frame: &mut Frame<'_>) {
        self.scratch.clear();
        self.scratch.extend(
            frame
                .enemies
                .iter()
                .filter(|enemy| !enemy.kind().is_boss() && !enemy.is_alive())
                .map(Enemy::id),
        );
        for id in self.scratch.drain(..) {
            kill(frame, id);
        }
    }

    /// Resolves active wave-clear blasts, killing every regular enemy they
    /// reach. Finished wave-clear blasts are removed afterwards.
    pub fn apply_wave_clear(&mut self, frame: &mut Frame<'_>) {
        let now = frame.now;
        self.scratch.clear();
        for blast in frame.blasts.iter().filter(|blast| blast.lethal) {
            let radius = blast.radius(now);
            let center = blast.center();
            self.scratch.extend(
                frame
                    .enemies
                    .iter()
                    .filter(|enemy| !enemy.kind().is_boss())
                    .filter(|enemy| enemy.position.distance(center) <= radius + enemy.radius)
                    .map(Enemy::id),
            );
        }
        self.scratch.sort_unstable();
        self.scratch.dedup();
        let cleared: Vec<EnemyId> = self.scratch.drain(..).collect();
        for id in cleared {
            if let Some(enemy) = frame.enemies.get_mut(id) {
                enemy.hit_points = 0.0;
            }
            kill(frame, id);
        }
        frame.blasts.retain(|blast| !(blast.lethal && blast.finished(now)));
    }

    fn remove_dead_bosses(&mut self, frame: &mut Frame<'_>) {
        self.scratch.clear();
        self.scratch
            .extend(frame.enemies.iter().filter(|enemy| boss_removable(enemy)).map(Enemy::id));

        for id in self.scratch.drain(..) {
            let Some(boss) = frame.enemies.remove(id) else {
                continue;
            };
            let Some(kind) = boss.kind().boss() else {
                continue;
            };
            let kills_awarded = frame.wave.max(1).saturating_mul(frame.tuning.combat.boss_kill_weight);
            frame.tally.award_kills(kills_awarded);
            frame.tally.currency = frame.tally.currency.saturating_add(u64::from(boss.reward));
            log::info!("boss {kind:?} defeated; {kills_awarded} kills awarded");
            frame.events.push(Event::EnemyKilled {
                id,
                kind: boss.kind(),
                position: boss.position,
            });
            frame.events.push(Event::BossDefeated {
                kind,
                kills_awarded,
            });
        }
    }

    fn contact(&mut self, frame: &mut Frame<'_>) {
        let push = frame.tuning.combat.contact_push;
        self.scratch.clear();
        self.scratch.extend(frame.enemies.ids());

        for id in self.scratch.drain(..) {
            let Some(enemy) = frame.enemies.get_mut(id) else {
                continue;
            };
            if !enemy.is_alive() || enemy.airborne {
                continue;
            }
            let offset = frame.player.position - enemy.position;
            let reach = frame.player.radius + enemy.radius;
            if offset.length_squared() > reach * reach {
                continue;
            }

            let axis = if offset.x.abs() >= offset.y.abs() {
                Vec2::new(offset.x.signum(), 0.0)
            } else {
                Vec2::new(0.0, offset.y.signum())
            };
            let player_target = frame.player.position + axis * push;
            if !frame.walls.is_wall(player_target) {
                frame.player.position = player_target;
            }
            if !enemy.kind().is_boss() {
                let enemy_target = enemy.position - axis * push;
                if !frame.walls.is_wall(enemy_target) {
                    enemy.position = enemy_target;
                }
            }

            if enemy.attack_ready(frame.now) {
                enemy.last_attack = Some(frame.now);
                let damage = enemy.contact_damage;
                let kind = enemy.kind();
                frame.damage_player(damage, DamageSource::Contact(kind));
            }
        }
    }

    fn blasts(&mut self, frame: &mut Frame<'_>) {
        let now = frame.now;
        let mut blasts = std::mem::take(frame.blasts);
        for blast in blasts.iter_mut().filter(|blast| !blast.lethal) {
            let radius = blast.radius(now);
            let center = blast.center();
            self.scratch.clear();
            self.scratch.extend(
                frame
                    .enemies
                    .iter()
                    .filter(|enemy| enemy.is_alive())
                    .filter(|enemy| enemy.position.distance(center) <= radius + enemy.radius)
                    .map(Enemy::id),
            );
            for id in self.scratch.drain(..) {
                if !blast.mark_hit(id) {
                    continue;
                }
                let Some(enemy) = frame.enemies.get_mut(id) else {
                    continue;
                };
                let lethal = enemy.take_damage(blast.damage);
                if lethal && !enemy.kind().is_boss() {
                    kill(frame, id);
                }
            }
        }
        blasts.retain(|blast| blast.lethal || !blast.finished(now));
        blasts.append(frame.blasts);
        *frame.blasts = blasts;
    }

    fn separate(&mut self, frame: &mut Frame<'_>) {
        let strength = frame.tuning.combat.separation_strength;
        self.scratch.clear();
        self.scratch.extend(
            frame
                .enemies
                .iter()
                .filter(|enemy| enemy.is_alive() && !enemy.kind().is_ranged() && !enemy.kind().is_boss())
                .map(Enemy::id),
        );

        for (index, &first) in self.scratch.iter().enumerate() {
            for &second in &self.scratch[index + 1..] {
                let Some((a, b)) = frame.enemies.pair_mut(first, second) else {
                    continue;
                };
                let offset = b.position - a.position;
                let reach = a.radius + b.radius;
                let distance = offset.length();
                if distance >= reach {
                    continue;
                }
                let normal = if distance > f32::EPSILON { offset / distance } else { Vec2::X };
                let shift = normal * (reach - distance) * strength * 0.5;
                let a_target = a.position - shift;
                let b_target = b.position + shift;
                if !frame.walls.is_wall(a_target) {
                    a.position = a_target;
                }
                if !frame.walls.is_wall(b_target) {
                    b.position = b_target;
                }
            }
        }
    }
}

fn recover_stuck_player(frame: &mut Frame<'_>) {
    let interval = frame.tuning.combat.stuck_check_interval;
    if frame.now.saturating_sub(frame.player.last_stuck_check) < interval {
        return;
    }
    frame.player.last_stuck_check = frame.now;
    let position = frame.player.position;
    let freed = navigation::unstuck_from_wall(frame.walls, position, frame.tuning.pathfinding.unstuck_radius);
    if freed != position {
        log::debug!("player freed from wall");
        frame.player.position = freed;
    }
}

fn hostile_projectiles(frame: &mut Frame<'_>, owner: ProjectileOwner) {
    let (now, dt) = (frame.now, frame.dt);
    let mut projectiles = match owner {
        ProjectileOwner::Boss => std::mem::take(&mut frame.projectiles.boss),
        _ => std::mem::take(&mut frame.projectiles.enemy),
    };
    let source = if owner == ProjectileOwner::Boss {
        DamageSource::BossProjectile
    } else {
        DamageSource::EnemyProjectile
    };

    projectiles.retain_mut(|projectile| {
        if !projectile.advance(now, dt) || frame.walls.is_wall(projectile.position) {
            return false;
        }
        let reach = projectile.radius + frame.player.radius;
        if projectile.position.distance(frame.player.position) > reach {
            return true;
        }
        frame.damage_player(projectile.damage, source);
        false
    });

    match owner {
        ProjectileOwner::Boss => frame.projectiles.boss = projectiles,
        _ => frame.projectiles.enemy = projectiles,
    }
}

fn hazards(frame: &mut Frame<'_>) {
    let now = frame.now;
    let mut hazards = std::mem::take(frame.hazards);
    hazards.retain_mut(|hazard| {
        let (position, radius) = (frame.player.position, frame.player.radius);
        if let Some(damage) = hazard.strike(now, position, radius) {
            frame.damage_player(damage, DamageSource::Hazard(hazard.kind()));
        }
        hazard.phase(now) != HazardPhase::Expired
    });
    *frame.hazards = hazards;
}

fn player_projectiles(frame: &mut Frame<'_>) {
    let (now, dt) = (frame.now, frame.dt);
    let mut projectiles = std::mem::take(&mut frame.projectiles.player);
    projectiles.retain_mut(|projectile| {
        if !projectile.advance(now, dt) || frame.walls.is_wall(projectile.position) {
            return false;
        }
        strike_enemies(frame, projectile)
    });
    frame.projectiles.player = projectiles;
}

/// Applies a player projectile to every enemy it overlaps, in slot order,
/// until its pierce is spent. Returns whether the projectile survives.
fn strike_enemies(frame: &mut Frame<'_>, projectile: &mut Projectile) -> bool {
    let now = frame.now;
    let targets: Vec<EnemyId> = frame
        .enemies
        .iter()
        .filter(|enemy| enemy.is_alive() && !projectile.has_hit(enemy.id()))
        .filter(|enemy| enemy.position.distance(projectile.position) <= enemy.radius + projectile.radius)
        .map(Enemy::id)
        .collect();

    for id in targets {
        let Some(enemy) = frame.enemies.get_mut(id) else {
            continue;
        };
        let lethal = enemy.take_damage(projectile.damage);
        if let Some(ignite) = projectile.ignite {
            enemy.status.ignite(now, ignite.damage_per_second, ignite.duration);
        }
        if let Some(slow) = projectile.slow {
            enemy.status.chill(now, slow.multiplier, slow.duration);
        }
        let boss = enemy.kind().is_boss();
        let spent = projectile.register_hit(id);
        if lethal && !boss {
            kill(frame, id);
        }
        if spent {
            return false;
        }
    }
    true
}

fn kill(frame: &mut Frame<'_>, id: EnemyId) {
    let Some(enemy) = frame.enemies.remove(id) else {
        return;
    };
    frame.tally.record_kill(enemy.reward);
    log::trace!("{:?} {id:?} killed", enemy.kind());
    frame.events.push(Event::EnemyKilled {
        id,
        kind: enemy.kind(),
        position: enemy.position,
    });
}

#[cfg(test)]
mod tests {
    use super::Step;

    #[test]
    fn order_is_fixed() {
        assert_eq!(Step::ORDER[0], Step::PlayerStuck);
        assert_eq!(Step::ORDER[3], Step::DeadBosses);
        assert_eq!(Step::ORDER[7], Step::Separation);
    }
}
