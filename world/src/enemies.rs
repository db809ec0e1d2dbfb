//! Enemy storage with stable, generation-checked identifiers.

use std::time::Duration;

use arena_siege_core::{EnemyId, EnemyKind, EnemyProfile, EnemySnapshot, StatusEffects};
use glam::Vec2;

/// A live enemy or boss.
#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    id: EnemyId,
    kind: EnemyKind,
    /// World position.
    pub position: Vec2,
    /// Remaining hit points.
    pub hit_points: f32,
    /// Hit points at spawn.
    pub max_hit_points: f32,
    /// Speed before status effects.
    pub base_speed: f32,
    /// Collision radius.
    pub radius: f32,
    /// Damage dealt per melee contact.
    pub contact_damage: f32,
    /// Minimum interval between melee contacts.
    pub attack_cooldown: Duration,
    /// Time of the most recent melee contact.
    pub last_attack: Option<Duration>,
    /// Currency awarded when killed.
    pub reward: u32,
    /// Active fire and slow effects.
    pub status: StatusEffects,
    /// Opacity in `[0, 1]`.
    pub alpha: f32,
    /// Whether the enemy is mid-air and ignores contact.
    pub airborne: bool,
    /// Whether a boss finished its death countdown and may be removed.
    pub death_complete: bool,
}

impl Enemy {
    fn new(id: EnemyId, kind: EnemyKind, position: Vec2, profile: &EnemyProfile, hit_points: f32) -> Self {
        Self {
            id,
            kind,
            position,
            hit_points,
            max_hit_points: hit_points,
            base_speed: profile.speed,
            radius: profile.radius,
            contact_damage: profile.contact_damage,
            attack_cooldown: profile.attack_cooldown,
            last_attack: None,
            reward: profile.reward,
            status: StatusEffects::default(),
            alpha: 1.0,
            airborne: false,
            death_complete: false,
        }
    }

    /// Arena identifier.
    #[must_use]
    pub const fn id(&self) -> EnemyId {
        self.id
    }

    /// Kind tag.
    #[must_use]
    pub const fn kind(&self) -> EnemyKind {
        self.kind
    }

    /// Reports whether hit points remain.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.hit_points > 0.0
    }

    /// Movement speed after status effects.
    #[must_use]
    pub fn current_speed(&self, now: Duration) -> f32 {
        self.base_speed * self.status.speed_multiplier(now)
    }

    /// Removes hit points; returns `true` when this damage was lethal.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        let was_alive = self.is_alive();
        self.hit_points -= amount.max(0.0);
        was_alive && !self.is_alive()
    }

    /// Reports whether the melee cooldown elapsed.
    #[must_use]
    pub fn attack_ready(&self, now: Duration) -> bool {
        self.last_attack
            .map_or(true, |last| now.saturating_sub(last) >= self.attack_cooldown)
    }

    /// Presentation state.
    #[must_use]
    pub fn snapshot(&self, now: Duration) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            radius: self.radius,
            hit_points: self.hit_points,
            alpha: self.alpha,
            burning: self.status.burn().is_some_and(|burn| now < burn.expires_at),
            chilled: self.status.speed_multiplier(now) < 1.0,
        }
    }
}

#[derive(Clone, Debug, Default)]
struct Slot {
    generation: u32,
    enemy: Option<Enemy>,
}

/// Slot arena holding every enemy.
///
/// Removing an enemy bumps its slot's generation and recycles the slot, so an
/// identifier held past removal never resolves to a newer occupant.
#[derive(Clone, Debug, Default)]
pub struct EnemyArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
}

impl EnemyArena {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an enemy built from `profile` with explicit hit points.
    pub fn insert(&mut self, kind: EnemyKind, position: Vec2, profile: &EnemyProfile, hit_points: f32) -> EnemyId {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot::default());
                u32::try_from(self.slots.len() - 1).unwrap_or(u32::MAX)
            }
        };
        let slot = &mut self.slots[index as usize];
        let id = EnemyId::new(index, slot.generation);
        slot.enemy = Some(Enemy::new(id, kind, position, profile, hit_points));
        self.len += 1;
        id
    }

    /// Removes and returns the enemy, if the identifier is current.
    pub fn remove(&mut self, id: EnemyId) -> Option<Enemy> {
        let slot = self.slots.get_mut(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        let enemy = slot.enemy.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index());
        self.len -= 1;
        Some(enemy)
    }

    /// Removes every enemy.
    pub fn clear(&mut self) {
        let ids = self.ids();
        for id in ids {
            let _ = self.remove(id);
        }
    }

    /// Enemy with the identifier, if current.
    #[must_use]
    pub fn get(&self, id: EnemyId) -> Option<&Enemy> {
        self.slots
            .get(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.enemy.as_ref())
    }

    /// Mutable enemy with the identifier, if current.
    pub fn get_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        self.slots
            .get_mut(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.enemy.as_mut())
    }

    /// Mutable access to two distinct enemies at once.
    pub fn pair_mut(&mut self, a: EnemyId, b: EnemyId) -> Option<(&mut Enemy, &mut Enemy)> {
        if a.index() == b.index() || self.get(a).is_none() || self.get(b).is_none() {
            return None;
        }
        let (low, high, swapped) = if a.index() < b.index() {
            (a.index() as usize, b.index() as usize, false)
        } else {
            (b.index() as usize, a.index() as usize, true)
        };
        let (head, tail) = self.slots.split_at_mut(high);
        let first = head[low].enemy.as_mut()?;
        let second = tail[0].enemy.as_mut()?;
        if swapped {
            Some((second, first))
        } else {
            Some((first, second))
        }
    }

    /// Reports whether the identifier is current.
    #[must_use]
    pub fn contains(&self, id: EnemyId) -> bool {
        self.get(id).is_some()
    }

    /// Number of live enemies.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Reports whether the arena is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Identifiers of every enemy in slot order.
    #[must_use]
    pub fn ids(&self) -> Vec<EnemyId> {
        self.iter().map(Enemy::id).collect()
    }

    /// Iterator over every enemy in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &Enemy> {
        self.slots.iter().filter_map(|slot| slot.enemy.as_ref())
    }

    /// Mutable iterator over every enemy in slot order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Enemy> {
        self.slots.iter_mut().filter_map(|slot| slot.enemy.as_mut())
    }

    /// First live boss, if any.
    #[must_use]
    pub fn boss(&self) -> Option<&Enemy> {
        self.iter().find(|enemy| enemy.kind().is_boss())
    }
}
