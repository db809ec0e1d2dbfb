#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Enemy and boss behaviors driven once per tick by the simulation thread.
//!
//! Each enemy owns one [`Behavior`] chosen from its kind when it is first
//! seen. Behaviors move their enemy, fire projectiles, open hazards, and
//! propose minion spawns through the frame's command queue; they never insert
//! or remove enemies themselves.

mod caster;
mod jumper;
mod minions;
mod pursuit;

use std::collections::BTreeMap;

use arena_siege_core::{EnemyId, EnemyKind, Tuning};
use arena_siege_world::Frame;

pub use caster::{BarragePattern, Caster, CasterState};
pub use jumper::{jump_position, JumpPhase, Jumper, SpecialAttack};
pub use minions::{Chaser, Gunner};
pub use pursuit::Pursuit;

/// Per-enemy decision logic.
pub trait Behavior: std::fmt::Debug + Send {
    /// Advances the enemy identified by `id` by one tick.
    fn update(&mut self, id: EnemyId, frame: &mut Frame<'_>);
}

/// Builds the behavior for an enemy of `kind`.
#[must_use]
pub fn behavior_for(kind: EnemyKind, tuning: &Tuning) -> Box<dyn Behavior> {
    match kind {
        EnemyKind::Normal | EnemyKind::Giant | EnemyKind::Small | EnemyKind::Slime => {
            Box::<Chaser>::default()
        }
        EnemyKind::Shooter => Box::<Gunner>::default(),
        EnemyKind::JumperBoss => Box::new(Jumper::new(tuning.jumper.clone())),
        EnemyKind::CasterBoss => Box::new(Caster::new(tuning.caster.clone())),
    }
}

/// AI engine holding one behavior per live enemy.
#[derive(Debug, Default)]
pub struct Ai {
    behaviors: BTreeMap<EnemyId, Box<dyn Behavior>>,
}

impl Ai {
    /// Creates an engine with no behaviors.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates every enemy in identifier order.
    ///
    /// Behaviors of removed enemies are dropped first. Dead regular enemies
    /// and dead jumpers are skipped; a dead caster keeps running its death
    /// countdown until it marks itself removable.
    pub fn update(&mut self, frame: &mut Frame<'_>) {
        self.behaviors.retain(|id, _| frame.enemies.contains(*id));

        for id in frame.enemies.ids() {
            let Some(enemy) = frame.enemies.get(id) else {
                continue;
            };
            let kind = enemy.kind();
            if !enemy.is_alive() && kind != EnemyKind::CasterBoss {
                continue;
            }
            let tuning = frame.tuning;
            let behavior = self
                .behaviors
                .entry(id)
                .or_insert_with(|| behavior_for(kind, tuning));
            behavior.update(id, frame);
        }
    }

    /// Drops every behavior.
    pub fn clear(&mut self) {
        self.behaviors.clear();
    }

    /// Number of tracked behaviors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.behaviors.len()
    }

    /// Reports whether no behaviors are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.behaviors.is_empty()
    }
}
