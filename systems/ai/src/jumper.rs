use std::time::Duration;

use arena_siege_core::{EnemyId, JumperTuning, ZoneKind};
use arena_siege_world::{navigation, Frame, Hazard};
use glam::Vec2;
use rand::Rng;

use crate::{Behavior, Pursuit};

/// Position along a jump arc's ground track at `progress` in `[0, 1]`.
///
/// Progress at or below zero yields `start`; at or above one yields `target`
/// exactly.
#[must_use]
pub fn jump_position(start: Vec2, target: Vec2, progress: f32) -> Vec2 {
    if progress <= 0.0 {
        start
    } else if progress >= 1.0 {
        target
    } else {
        start.lerp(target, progress)
    }
}

/// Movement phase of the jump-attacking boss.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum JumpPhase {
    /// Grounded and free to walk.
    Idle,
    /// Crouching before take-off; the target is fixed when crouching starts.
    PreJump {
        /// Telegraph frames already shown.
        frame: u32,
        /// Time the current frame started.
        frame_started: Duration,
        /// Landing point.
        target: Vec2,
    },
    /// Airborne between `start` and `target`.
    Jumping {
        /// Take-off point.
        start: Vec2,
        /// Landing point.
        target: Vec2,
        /// Time of take-off.
        started_at: Duration,
    },
}

/// Special attack currently driving the jump-attacking boss.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpecialAttack {
    /// No special attack in progress.
    Ready,
    /// Standing still while the stomp damage window is open.
    Stomping {
        /// Time the window closes.
        until: Duration,
    },
    /// Chaining jumps toward the player.
    JumpAttacking {
        /// Jumps still to start.
        remaining: u32,
    },
}

/// Boss that stomps and leaps at the player.
#[derive(Debug)]
pub struct Jumper {
    tuning: JumperTuning,
    phase: JumpPhase,
    special: SpecialAttack,
    last_special: Option<Duration>,
    pursuit: Pursuit,
}

impl Jumper {
    /// Creates the behavior with the provided tuning.
    #[must_use]
    pub fn new(tuning: JumperTuning) -> Self {
        Self {
            tuning,
            phase: JumpPhase::Idle,
            special: SpecialAttack::Ready,
            last_special: None,
            pursuit: Pursuit::new(),
        }
    }

    /// Current movement phase.
    #[must_use]
    pub const fn phase(&self) -> JumpPhase {
        self.phase
    }

    /// Current special attack.
    #[must_use]
    pub const fn special(&self) -> SpecialAttack {
        self.special
    }

    fn select_special(&mut self, id: EnemyId, frame: &mut Frame<'_>, position: Vec2) {
        let last = *self.last_special.get_or_insert(frame.now);
        if frame.now.saturating_sub(last) < self.tuning.special_interval {
            return;
        }
        self.last_special = Some(frame.now);

        if frame.rng.gen_bool(0.5) {
            log::debug!("{id:?} stomps");
            let until = frame.now + self.tuning.stomp_window;
            frame.hazards.push(Hazard::new(
                ZoneKind::Shockwave,
                position,
                self.tuning.stomp_radius,
                self.tuning.stomp_damage,
                frame.now,
                until,
            ));
            self.special = SpecialAttack::Stomping { until };
        } else {
            log::debug!("{id:?} begins a jump attack");
            self.special = SpecialAttack::JumpAttacking {
                remaining: self.tuning.chain_length,
            };
        }
    }

    fn jump_target(&self, frame: &Frame<'_>, from: Vec2) -> Vec2 {
        let offset = frame.player.position - from;
        let target = from + offset.clamp_length_max(self.tuning.max_jump_distance);
        navigation::unstuck_from_wall(frame.walls, target, frame.tuning.pathfinding.unstuck_radius)
    }
}

impl Behavior for Jumper {
    fn update(&mut self, id: EnemyId, frame: &mut Frame<'_>) {
        let Some(enemy) = frame.enemies.get(id) else {
            return;
        };
        let position = enemy.position;
        let speed = enemy.current_speed(frame.now);

        if let SpecialAttack::Stomping { until } = self.special {
            if frame.now >= until {
                self.special = SpecialAttack::Ready;
            }
        }

        let next = match self.phase {
            JumpPhase::Idle => {
                if self.special == SpecialAttack::Ready {
                    self.select_special(id, frame, position);
                }
                match self.special {
                    SpecialAttack::JumpAttacking { remaining } if remaining > 0 => {
                        self.special = SpecialAttack::JumpAttacking {
                            remaining: remaining - 1,
                        };
                        self.phase = JumpPhase::PreJump {
                            frame: 0,
                            frame_started: frame.now,
                            target: self.jump_target(frame, position),
                        };
                        position
                    }
                    SpecialAttack::JumpAttacking { .. } => {
                        self.special = SpecialAttack::Ready;
                        position
                    }
                    SpecialAttack::Stomping { .. } => position,
                    SpecialAttack::Ready => self.pursuit.advance(
                        frame.walls,
                        &frame.tuning.pathfinding,
                        frame.now,
                        position,
                        frame.player.position,
                        speed * frame.dt.as_secs_f32(),
                    ),
                }
            }
            JumpPhase::PreJump {
                frame: shown,
                frame_started,
                target,
            } => {
                if frame.now.saturating_sub(frame_started) >= self.tuning.telegraph_frame {
                    let shown = shown + 1;
                    self.phase = if shown >= self.tuning.telegraph_frames {
                        JumpPhase::Jumping {
                            start: position,
                            target,
                            started_at: frame.now,
                        }
                    } else {
                        JumpPhase::PreJump {
                            frame: shown,
                            frame_started: frame.now,
                            target,
                        }
                    };
                }
                position
            }
            JumpPhase::Jumping {
                start,
                target,
                started_at,
            } => {
                let elapsed = frame.now.saturating_sub(started_at).as_secs_f32();
                let progress = elapsed / self.tuning.jump_duration.as_secs_f32().max(f32::EPSILON);
                let landed = progress >= 1.0;
                if landed {
                    self.phase = JumpPhase::Idle;
                    self.pursuit.reset();
                    frame.hazards.push(Hazard::new(
                        ZoneKind::Shockwave,
                        target,
                        self.tuning.landing_radius,
                        self.tuning.landing_damage,
                        frame.now,
                        frame.now + self.tuning.landing_window,
                    ));
                }
                jump_position(start, target, progress)
            }
        };

        if let Some(enemy) = frame.enemies.get_mut(id) {
            enemy.position = next;
            enemy.airborne = matches!(self.phase, JumpPhase::Jumping { .. });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::jump_position;
    use glam::Vec2;

    #[test]
    fn jump_endpoints_are_exact() {
        let start = Vec2::new(-13.7, 42.1);
        let target = Vec2::new(311.3, -97.9);
        assert_eq!(jump_position(start, target, 0.0), start);
        assert_eq!(jump_position(start, target, 1.0), target);
        assert_eq!(jump_position(start, target, 1.7), target);
    }

    #[test]
    fn jump_midpoint_is_linear() {
        let start = Vec2::ZERO;
        let target = Vec2::new(100.0, 50.0);
        let midpoint = jump_position(start, target, 0.5);
        assert!((midpoint - Vec2::new(50.0, 25.0)).length() < 1e-4);
    }
}
