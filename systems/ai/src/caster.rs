use std::{f32::consts::TAU, time::Duration};

use arena_siege_core::{CasterTuning, Command, EnemyId, EnemyKind, ProjectileOwner, ZoneKind};
use arena_siege_world::{Frame, Hazard, Projectile};
use glam::Vec2;
use rand::Rng;

use crate::{Behavior, Pursuit};

/// Minion kinds the caster may summon.
const SUMMONS: [EnemyKind; 3] = [EnemyKind::Normal, EnemyKind::Small, EnemyKind::Slime];

/// Emission patterns cycled by the projectile barrage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BarragePattern {
    /// Evenly spaced ring around the caster.
    Ring,
    /// Single shot at the player.
    Aimed,
    /// Ring whose phase advances every emission.
    RotatingRing,
    /// Fan centered on the player.
    Fan,
}

impl BarragePattern {
    /// Pattern fired on emission number `phase`.
    #[must_use]
    pub const fn for_phase(phase: u32) -> Self {
        match phase % 4 {
            0 => Self::Ring,
            1 => Self::Aimed,
            2 => Self::RotatingRing,
            _ => Self::Fan,
        }
    }
}

/// State of the caster boss.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CasterState {
    /// Walking toward the player.
    Moving,
    /// Fading out, swapping position at the midpoint, and fading back in.
    Teleporting {
        /// Time the fade started.
        started_at: Duration,
        /// Position taken at the midpoint.
        destination: Vec2,
        /// Whether the swap already happened.
        swapped: bool,
    },
    /// Dropping meteors near the player.
    Meteor {
        /// Time the next meteor drops.
        next_at: Duration,
        /// Meteors still to drop.
        remaining: u32,
    },
    /// Firing projectile patterns.
    Projectile {
        /// Time the barrage started.
        started_at: Duration,
        /// Time of the next emission.
        next_at: Duration,
        /// Emissions fired so far.
        phase: u32,
    },
    /// Playing the death animation.
    Dying {
        /// Frames already shown.
        frame: u32,
        /// Time the current frame started.
        frame_started: Duration,
    },
    /// Death animation complete; awaiting removal.
    Dead,
}

/// Samples displacement on a fixed cadence and counts consecutive samples
/// that moved less than the threshold.
#[derive(Clone, Copy, Debug, Default)]
struct StuckDetector {
    last_sample: Option<(Duration, Vec2)>,
    run: u32,
}

impl StuckDetector {
    fn sample(&mut self, now: Duration, position: Vec2, interval: Duration, threshold: f32) -> u32 {
        match self.last_sample {
            None => self.last_sample = Some((now, position)),
            Some((at, previous)) if now.saturating_sub(at) >= interval => {
                if position.distance(previous) < threshold {
                    self.run = self.run.saturating_add(1);
                } else {
                    self.run = 0;
                }
                self.last_sample = Some((now, position));
            }
            Some(_) => {}
        }
        self.run
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Boss that teleports, calls meteors, fires barrages, and summons minions.
#[derive(Debug)]
pub struct Caster {
    tuning: CasterTuning,
    state: CasterState,
    pursuit: Pursuit,
    stuck: StuckDetector,
    last_attack: Option<Duration>,
    last_teleport: Option<Duration>,
    rotation: f32,
}

impl Caster {
    /// Creates the behavior with the provided tuning.
    #[must_use]
    pub fn new(tuning: CasterTuning) -> Self {
        Self {
            tuning,
            state: CasterState::Moving,
            pursuit: Pursuit::new(),
            stuck: StuckDetector::default(),
            last_attack: None,
            last_teleport: None,
            rotation: 0.0,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> CasterState {
        self.state
    }

    fn begin_dying(&mut self, id: EnemyId, now: Duration) {
        log::debug!("{id:?} begins dying");
        self.state = CasterState::Dying {
            frame: 0,
            frame_started: now,
        };
    }

    fn teleport_destination(&self, frame: &mut Frame<'_>) -> Vec2 {
        let player = frame.player.position;
        let low = self.tuning.teleport_min_offset;
        let high = self.tuning.teleport_max_offset.max(low);
        for _ in 0..self.tuning.teleport_attempts {
            let angle = frame.rng.gen_range(0.0..TAU);
            let offset = frame.rng.gen_range(low..=high);
            let candidate = player + Vec2::from_angle(angle) * offset;
            if !frame.walls.is_wall(candidate) {
                return candidate;
            }
        }
        log::debug!("teleport search failed; falling back to the player position");
        player
    }

    fn update_moving(&mut self, id: EnemyId, frame: &mut Frame<'_>, position: Vec2, speed: f32) -> Vec2 {
        let player = frame.player.position;
        let moved = self.pursuit.advance(
            frame.walls,
            &frame.tuning.pathfinding,
            frame.now,
            position,
            player,
            speed * frame.dt.as_secs_f32(),
        );

        let run = self.stuck.sample(
            frame.now,
            moved,
            self.tuning.stuck_check_interval,
            self.tuning.stuck_threshold,
        );
        let teleport_ready = self
            .last_teleport
            .map_or(true, |last| frame.now.saturating_sub(last) >= self.tuning.teleport_cooldown);
        if run >= self.tuning.stuck_checks && teleport_ready && !frame.walls.has_clear_path(moved, player) {
            let destination = self.teleport_destination(frame);
            log::debug!("{id:?} is stuck; teleporting");
            self.state = CasterState::Teleporting {
                started_at: frame.now,
                destination,
                swapped: false,
            };
            self.last_teleport = Some(frame.now);
            self.stuck.reset();
            return moved;
        }

        let last = *self.last_attack.get_or_insert(frame.now);
        if frame.now.saturating_sub(last) >= self.tuning.attack_interval {
            self.last_attack = Some(frame.now);
            match frame.rng.gen_range(0..3) {
                0 => {
                    log::debug!("{id:?} calls a meteor barrage");
                    self.state = CasterState::Meteor {
                        next_at: frame.now,
                        remaining: self.tuning.meteor_count,
                    };
                }
                1 => {
                    log::debug!("{id:?} starts a projectile barrage");
                    self.state = CasterState::Projectile {
                        started_at: frame.now,
                        next_at: frame.now,
                        phase: 0,
                    };
                }
                _ => self.summon(id, frame, moved),
            }
        }
        moved
    }

    fn summon(&mut self, id: EnemyId, frame: &mut Frame<'_>, position: Vec2) {
        let count = self.tuning.summon_count.max(1);
        log::debug!("{id:?} summons {count} minions");
        for index in 0..count {
            let angle = TAU * index as f32 / count as f32;
            let kind = SUMMONS[frame.rng.gen_range(0..SUMMONS.len())];
            frame.commands.push(Command::SpawnEnemy {
                kind,
                position: position + Vec2::from_angle(angle) * self.tuning.summon_radius,
                wave: frame.wave,
            });
        }
    }

    fn drop_meteor(&self, frame: &mut Frame<'_>) {
        let scatter = self.tuning.meteor_scatter;
        let offset = Vec2::new(
            frame.rng.gen_range(-scatter..=scatter),
            frame.rng.gen_range(-scatter..=scatter),
        );
        let armed_at = frame.now + self.tuning.meteor_telegraph;
        frame.hazards.push(Hazard::new(
            ZoneKind::Meteor,
            frame.player.position + offset,
            self.tuning.meteor_radius,
            self.tuning.meteor_damage,
            armed_at,
            armed_at + self.tuning.meteor_impact,
        ));
    }

    fn emit(&mut self, frame: &mut Frame<'_>, origin: Vec2, pattern: BarragePattern) {
        let aim = (frame.player.position - origin)
            .try_normalize()
            .unwrap_or(Vec2::X);
        let heading = aim.y.atan2(aim.x);
        let directions: Vec<Vec2> = match pattern {
            BarragePattern::Ring => ring(self.tuning.ring_count, 0.0),
            BarragePattern::Aimed => vec![aim],
            BarragePattern::RotatingRing => {
                let directions = ring(self.tuning.rotating_count, self.rotation);
                self.rotation = (self.rotation + self.tuning.rotation_step_degrees.to_radians()) % TAU;
                directions
            }
            BarragePattern::Fan => {
                let count = self.tuning.fan_count.max(1);
                let spread = self.tuning.fan_spread_degrees.to_radians();
                let (base, step) = if count > 1 {
                    (heading - spread * 0.5, spread / (count - 1) as f32)
                } else {
                    (heading, 0.0)
                };
                (0..count)
                    .map(|index| Vec2::from_angle(base + step * index as f32))
                    .collect()
            }
        };

        let ttl = self.tuning.projectile_ttl;
        for direction in directions {
            frame.projectiles.push(
                Projectile::hostile(ProjectileOwner::Boss, origin, direction, self.tuning.projectile_speed)
                    .with_hit(self.tuning.projectile_radius, self.tuning.projectile_damage)
                    .with_budget(frame.now + ttl, self.tuning.projectile_speed * ttl.as_secs_f32()),
            );
        }
    }
}

fn ring(count: u32, phase: f32) -> Vec<Vec2> {
    let count = count.max(1);
    (0..count)
        .map(|index| Vec2::from_angle(phase + TAU * index as f32 / count as f32))
        .collect()
}

impl Behavior for Caster {
    fn update(&mut self, id: EnemyId, frame: &mut Frame<'_>) {
        let Some(enemy) = frame.enemies.get(id) else {
            return;
        };
        let alive = enemy.is_alive();
        let mut position = enemy.position;
        let speed = enemy.current_speed(frame.now);
        let mut alpha = 1.0;
        let mut death_complete = false;

        if !alive && !matches!(self.state, CasterState::Dying { .. } | CasterState::Dead) {
            self.begin_dying(id, frame.now);
        }

        match self.state {
            CasterState::Moving => {
                position = self.update_moving(id, frame, position, speed);
            }
            CasterState::Teleporting {
                started_at,
                destination,
                swapped,
            } => {
                let duration = self.tuning.teleport_duration.as_secs_f32().max(f32::EPSILON);
                let t = (frame.now.saturating_sub(started_at).as_secs_f32() / duration).min(1.0);
                if t < 0.5 {
                    alpha = 1.0 - 2.0 * t;
                } else {
                    if !swapped {
                        position = destination;
                        self.pursuit.reset();
                        self.state = CasterState::Teleporting {
                            started_at,
                            destination,
                            swapped: true,
                        };
                    }
                    alpha = 2.0 * t - 1.0;
                }
                if t >= 1.0 {
                    alpha = 1.0;
                    self.state = CasterState::Moving;
                }
            }
            CasterState::Meteor { next_at, remaining } => {
                if remaining == 0 {
                    self.state = CasterState::Moving;
                } else if frame.now >= next_at {
                    self.drop_meteor(frame);
                    self.state = CasterState::Meteor {
                        next_at: next_at + self.tuning.meteor_interval,
                        remaining: remaining - 1,
                    };
                }
            }
            CasterState::Projectile {
                started_at,
                mut next_at,
                mut phase,
            } => {
                let interval = self.tuning.barrage_interval.max(Duration::from_millis(1));
                let end = started_at + self.tuning.barrage_duration;
                while frame.now >= next_at && next_at < end {
                    self.emit(frame, position, BarragePattern::for_phase(phase));
                    phase = phase.wrapping_add(1);
                    next_at += interval;
                }
                self.state = if frame.now >= end {
                    CasterState::Moving
                } else {
                    CasterState::Projectile {
                        started_at,
                        next_at,
                        phase,
                    }
                };
            }
            CasterState::Dying {
                frame: shown,
                frame_started,
            } => {
                let frames = self.tuning.death_frames.max(1);
                let mut shown = shown;
                let mut frame_started = frame_started;
                while frame.now.saturating_sub(frame_started) >= self.tuning.death_frame && shown < frames {
                    shown += 1;
                    frame_started += self.tuning.death_frame;
                }
                alpha = 1.0 - shown as f32 / frames as f32;
                if shown >= frames {
                    log::debug!("{id:?} finished dying");
                    self.state = CasterState::Dead;
                    death_complete = true;
                } else {
                    self.state = CasterState::Dying {
                        frame: shown,
                        frame_started,
                    };
                }
            }
            CasterState::Dead => {
                alpha = 0.0;
                death_complete = true;
            }
        }

        if let Some(enemy) = frame.enemies.get_mut(id) {
            enemy.position = position;
            enemy.alpha = alpha.clamp(0.0, 1.0);
            enemy.death_complete = death_complete;
        }
    }
}
