use std::time::Duration;

use arena_siege_core::PathTuning;
use arena_siege_world::{navigation, walls::WallMap};
use glam::Vec2;

/// Distance under which a cached waypoint counts as reached.
const WAYPOINT_REACHED: f32 = 2.0;

/// Shared chase movement used by every melee mover and the bosses.
///
/// With line of sight the mover heads straight for its target. Otherwise it
/// follows a cached waypoint from the bounded grid search, recomputed no more
/// often than the configured interval.
#[derive(Clone, Debug, Default)]
pub struct Pursuit {
    waypoint: Option<Vec2>,
    last_search: Option<Duration>,
    searches: u32,
}

impl Pursuit {
    /// Creates a pursuit with no cached waypoint.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of grid searches performed so far.
    #[must_use]
    pub const fn searches(&self) -> u32 {
        self.searches
    }

    /// Cached waypoint, if any.
    #[must_use]
    pub const fn waypoint(&self) -> Option<Vec2> {
        self.waypoint
    }

    /// Moves `from` up to `distance` units toward `target`, returning the new
    /// position.
    pub fn advance(
        &mut self,
        walls: &WallMap,
        tuning: &PathTuning,
        now: Duration,
        from: Vec2,
        target: Vec2,
        distance: f32,
    ) -> Vec2 {
        let heading = self.heading(walls, tuning, now, from, target);
        let offset = heading - from;
        let length = offset.length();
        if length <= f32::EPSILON || distance <= 0.0 {
            return from;
        }
        let delta = offset / length * distance.min(length);
        walls.slide(from, delta)
    }

    /// Drops the cached waypoint; the next blocked advance searches at once.
    pub fn reset(&mut self) {
        self.waypoint = None;
        self.last_search = None;
    }

    fn heading(&mut self, walls: &WallMap, tuning: &PathTuning, now: Duration, from: Vec2, target: Vec2) -> Vec2 {
        if walls.has_clear_path(from, target) {
            self.waypoint = None;
            return target;
        }

        let due = self
            .last_search
            .map_or(true, |last| now.saturating_sub(last) >= tuning.recompute_interval);
        if due {
            self.waypoint = Some(navigation::find_next_step(walls, from, target, tuning));
            self.last_search = Some(now);
            self.searches = self.searches.saturating_add(1);
        }

        match self.waypoint {
            Some(waypoint) if waypoint.distance(from) > WAYPOINT_REACHED => waypoint,
            _ => target,
        }
    }
}
