//! Procedural permanent walls, timed ephemeral walls, and the boss arena.

use std::{
    collections::{BTreeMap, BTreeSet},
    f32::consts::TAU,
    time::Duration,
};

use arena_siege_core::{ArenaSnapshot, PathTuning, Viewport, WallPhase, WallSnapshot, WallTuning};
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Block offsets of every wall cluster pattern.
const PATTERNS: [&[(i32, i32)]; 6] = [
    &[(0, 0), (1, 0), (2, 0), (3, 0)],
    &[(0, 0), (0, 1), (0, 2), (0, 3)],
    &[(0, 0), (0, 1), (0, 2), (1, 2), (2, 2)],
    &[(0, 0), (1, 0), (0, 1), (1, 1)],
    &[(0, 0), (1, 0), (2, 0), (1, 1), (1, 2)],
    &[(1, 0), (0, 1), (1, 1), (2, 1), (1, 2)],
];

/// Widest extent, in blocks, of any pattern.
const PATTERN_SPAN: i32 = 4;

/// Axis-aligned wall rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WallRect {
    min: Vec2,
    max: Vec2,
}

impl WallRect {
    /// Creates a rectangle from two corners, normalising their order.
    #[must_use]
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Lower-left corner.
    #[must_use]
    pub const fn min(&self) -> Vec2 {
        self.min
    }

    /// Upper-right corner.
    #[must_use]
    pub const fn max(&self) -> Vec2 {
        self.max
    }

    /// Center of the rectangle.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Reports whether the point lies inside the rectangle.
    ///
    /// The upper edges are exclusive so adjacent blocks never both claim a
    /// shared boundary point.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x < self.max.x && point.y >= self.min.y && point.y < self.max.y
    }

    /// Reports whether two rectangles share any interior area.
    #[must_use]
    pub fn overlaps(&self, other: &WallRect) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }

    /// Distance from the point to the closest point of the rectangle.
    #[must_use]
    pub fn distance_to(&self, point: Vec2) -> f32 {
        (point - point.clamp(self.min, self.max)).length()
    }

    fn expanded(&self, margin: f32) -> Self {
        Self {
            min: self.min - Vec2::splat(margin),
            max: self.max + Vec2::splat(margin),
        }
    }

    fn translated(&self, offset: Vec2) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }
}

/// Coordinate of a wall-generation chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    x: i32,
    y: i32,
}

impl ChunkCoord {
    /// Creates a chunk coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal chunk index.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical chunk index.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    fn seed(&self, world_seed: u64) -> u64 {
        let x = u64::from(self.x as u32).wrapping_mul(0x9e37_79b9_7f4a_7c15);
        let y = u64::from(self.y as u32).wrapping_mul(0xc2b2_ae3d_27d4_eb4f);
        world_seed ^ x ^ y.rotate_left(31)
    }
}

/// Ephemeral wall cluster with a timed lifecycle.
#[derive(Clone, Debug, PartialEq)]
pub struct EphemeralWall {
    blocks: Vec<WallRect>,
    spawned_at: Duration,
    telegraph: Duration,
    solid: Duration,
    fade: Duration,
}

impl EphemeralWall {
    /// Creates a cluster spawned at `spawned_at` with the tuned phase durations.
    #[must_use]
    pub fn new(blocks: Vec<WallRect>, spawned_at: Duration, tuning: &WallTuning) -> Self {
        Self {
            blocks,
            spawned_at,
            telegraph: tuning.telegraph,
            solid: tuning.solid,
            fade: tuning.fade,
        }
    }

    /// Blocks making up the cluster.
    #[must_use]
    pub fn blocks(&self) -> &[WallRect] {
        &self.blocks
    }

    /// Lifecycle phase at `now`.
    #[must_use]
    pub fn phase(&self, now: Duration) -> WallPhase {
        let elapsed = now.saturating_sub(self.spawned_at);
        if elapsed < self.telegraph {
            WallPhase::Telegraph
        } else if elapsed < self.telegraph + self.solid {
            WallPhase::Solid
        } else if elapsed < self.telegraph + self.solid + self.fade {
            WallPhase::Fading
        } else {
            WallPhase::Expired
        }
    }

    /// Reports whether the cluster blocks movement at `now`.
    #[must_use]
    pub fn is_solid(&self, now: Duration) -> bool {
        self.phase(now) == WallPhase::Solid
    }

    fn contains(&self, point: Vec2) -> bool {
        self.blocks.iter().any(|block| block.contains(point))
    }
}

/// Ring-and-pillar structure enclosing a boss fight.
#[derive(Clone, Debug, PartialEq)]
pub struct BossArena {
    center: Vec2,
    inner_radius: f32,
    thickness: f32,
    pillars: Vec<WallRect>,
}

impl BossArena {
    fn raise(center: Vec2, tuning: &WallTuning) -> Self {
        let half = Vec2::splat(tuning.arena_pillar_size * 0.5);
        let count = tuning.arena_pillars.max(1);
        let pillars = (0..tuning.arena_pillars)
            .map(|index| {
                let angle = TAU * index as f32 / count as f32 + TAU / 8.0;
                let anchor = center + Vec2::from_angle(angle) * tuning.arena_pillar_ring;
                WallRect::new(anchor - half, anchor + half)
            })
            .collect();
        Self {
            center,
            inner_radius: tuning.arena_radius,
            thickness: tuning.arena_thickness,
            pillars,
        }
    }

    /// Center of the arena.
    #[must_use]
    pub const fn center(&self) -> Vec2 {
        self.center
    }

    /// Inner radius of the ring.
    #[must_use]
    pub const fn inner_radius(&self) -> f32 {
        self.inner_radius
    }

    /// Pillars standing inside the ring.
    #[must_use]
    pub fn pillars(&self) -> &[WallRect] {
        &self.pillars
    }

    /// Reports whether the point lies inside the ring or a pillar.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        let distance = point.distance(self.center);
        let in_ring = distance >= self.inner_radius && distance <= self.inner_radius + self.thickness;
        in_ring || self.pillars.iter().any(|pillar| pillar.contains(point))
    }

    fn overlaps(&self, rect: &WallRect) -> bool {
        if self.pillars.iter().any(|pillar| pillar.overlaps(rect)) {
            return true;
        }
        let nearest = rect.distance_to(self.center);
        let farthest = [
            rect.min,
            rect.max,
            Vec2::new(rect.min.x, rect.max.y),
            Vec2::new(rect.max.x, rect.min.y),
        ]
        .into_iter()
        .map(|corner| corner.distance(self.center))
        .fold(0.0_f32, f32::max);
        nearest <= self.inner_radius + self.thickness && farthest >= self.inner_radius
    }
}

/// Authoritative wall state queried by movement, collision, and pathfinding.
#[derive(Clone, Debug)]
pub struct WallMap {
    tuning: WallTuning,
    path: PathTuning,
    seed: u64,
    now: Duration,
    generated: BTreeSet<ChunkCoord>,
    permanent: BTreeMap<ChunkCoord, Vec<WallRect>>,
    ephemeral: Vec<EphemeralWall>,
    arena: Option<BossArena>,
}

impl WallMap {
    /// Creates an empty wall map; chunks are generated lazily.
    #[must_use]
    pub fn new(tuning: WallTuning, path: PathTuning, seed: u64) -> Self {
        Self {
            tuning,
            path,
            seed,
            now: Duration::ZERO,
            generated: BTreeSet::new(),
            permanent: BTreeMap::new(),
            ephemeral: Vec::new(),
            arena: None,
        }
    }

    /// Wall tuning in effect.
    #[must_use]
    pub const fn tuning(&self) -> &WallTuning {
        &self.tuning
    }

    /// Edge length of one block and one navigation cell.
    #[must_use]
    pub const fn block_size(&self) -> f32 {
        self.tuning.block_size
    }

    /// Simulation time the map last synchronised to.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Advances the map's view of the simulation clock.
    pub fn sync_clock(&mut self, now: Duration) {
        self.now = now;
    }

    /// Chunk containing the point.
    #[must_use]
    pub fn chunk_of(&self, point: Vec2) -> ChunkCoord {
        let size = self.tuning.chunk_size().max(f32::EPSILON);
        ChunkCoord::new((point.x / size).floor() as i32, (point.y / size).floor() as i32)
    }

    /// Reports whether permanent walls exist for the chunk.
    #[must_use]
    pub fn is_generated(&self, chunk: ChunkCoord) -> bool {
        self.generated.contains(&chunk)
    }

    /// Generates the permanent walls of a chunk.
    ///
    /// Placement is derived from the world seed and the chunk coordinate only,
    /// so regeneration after a reset yields identical walls. Returns `false`
    /// when the chunk was already generated.
    pub fn generate_chunk_walls(&mut self, chunk: ChunkCoord) -> bool {
        if !self.generated.insert(chunk) {
            return false;
        }

        let mut rng = ChaCha8Rng::seed_from_u64(chunk.seed(self.seed));
        let block = self.tuning.block_size;
        let origin = Vec2::new(chunk.x as f32, chunk.y as f32) * self.tuning.chunk_size();
        let anchors = (self.tuning.chunk_blocks - PATTERN_SPAN).max(1);
        let low = self.tuning.clusters_min.min(self.tuning.clusters_max);
        let clusters = rng.gen_range(low..=self.tuning.clusters_max);

        let mut placed = Vec::new();
        for _ in 0..clusters {
            let pattern = PATTERNS[rng.gen_range(0..PATTERNS.len())];
            let anchor = Vec2::new(
                rng.gen_range(0..anchors) as f32,
                rng.gen_range(0..anchors) as f32,
            );
            let blocks: Vec<WallRect> = pattern
                .iter()
                .map(|&(dx, dy)| {
                    let min = origin + (anchor + Vec2::new(dx as f32, dy as f32)) * block;
                    WallRect::new(min, min + Vec2::splat(block))
                })
                .collect();

            let blocks_spawn = blocks
                .iter()
                .any(|rect| rect.distance_to(Vec2::ZERO) < self.tuning.spawn_clearance);
            if blocks_spawn {
                continue;
            }
            placed.extend(blocks);
        }

        log::trace!(
            "generated {} wall blocks for chunk ({}, {})",
            placed.len(),
            chunk.x,
            chunk.y
        );
        let _ = self.permanent.insert(chunk, placed);
        true
    }

    /// Generates the 3x3 chunk neighborhood around a position.
    pub fn ensure_chunks_around(&mut self, position: Vec2) {
        let center = self.chunk_of(position);
        for dy in -1..=1 {
            for dx in -1..=1 {
                let _ = self.generate_chunk_walls(ChunkCoord::new(center.x + dx, center.y + dy));
            }
        }
    }

    /// Places a permanent wall outside procedural generation.
    pub fn add_permanent_wall(&mut self, rect: WallRect) {
        let low = self.chunk_of(rect.min);
        let high = self.chunk_of(rect.max);
        for y in low.y..=high.y {
            for x in low.x..=high.x {
                self.permanent
                    .entry(ChunkCoord::new(x, y))
                    .or_default()
                    .push(rect);
            }
        }
    }

    /// Attempts to place an ephemeral wall cluster on a ring around `near`.
    ///
    /// Candidates closer than the minimum distance to `near`, or overlapping
    /// permanent walls, the arena, or another live ephemeral cluster are
    /// rejected. Returns the cluster center on success and `None` once every
    /// attempt failed.
    pub fn spawn_ephemeral_wall<R: Rng>(&mut self, near: Vec2, rng: &mut R) -> Option<Vec2> {
        if self.ephemeral.len() >= self.tuning.ephemeral_cap {
            return None;
        }

        let block = self.tuning.block_size;
        let low = self.tuning.ephemeral_min_distance;
        let high = self.tuning.ephemeral_max_distance.max(low);

        for _ in 0..self.tuning.ephemeral_attempts {
            let angle = rng.gen_range(0.0..TAU);
            let distance = rng.gen_range(low..=high);
            let center = near + Vec2::from_angle(angle) * distance;
            let pattern = PATTERNS[rng.gen_range(0..PATTERNS.len())];
            let offset = center - Vec2::splat(block * PATTERN_SPAN as f32 * 0.5);
            let blocks: Vec<WallRect> = pattern
                .iter()
                .map(|&(dx, dy)| {
                    let min = Vec2::new(dx as f32, dy as f32) * block;
                    WallRect::new(min, min + Vec2::splat(block)).translated(offset)
                })
                .collect();

            if blocks.iter().any(|rect| rect.distance_to(near) < low) {
                continue;
            }
            if blocks.iter().any(|rect| self.overlaps_structure(rect)) {
                continue;
            }

            self.ephemeral
                .push(EphemeralWall::new(blocks, self.now, &self.tuning));
            return Some(center);
        }

        log::trace!("ephemeral wall placement exhausted its attempts");
        None
    }

    /// Drops ephemeral walls whose full lifetime elapsed; returns how many.
    pub fn expire(&mut self) -> usize {
        let now = self.now;
        let before = self.ephemeral.len();
        self.ephemeral
            .retain(|wall| wall.phase(now) != WallPhase::Expired);
        before - self.ephemeral.len()
    }

    /// Removes every ephemeral wall.
    pub fn clear_ephemeral(&mut self) {
        self.ephemeral.clear();
    }

    /// Live ephemeral wall clusters.
    #[must_use]
    pub fn ephemeral_walls(&self) -> &[EphemeralWall] {
        &self.ephemeral
    }

    /// Encloses `center` in the boss arena.
    pub fn raise_arena(&mut self, center: Vec2) {
        log::debug!("raising boss arena at ({:.0}, {:.0})", center.x, center.y);
        self.arena = Some(BossArena::raise(center, &self.tuning));
    }

    /// Removes the boss arena.
    pub fn lower_arena(&mut self) {
        if self.arena.take().is_some() {
            log::debug!("lowering boss arena");
        }
    }

    /// Boss arena, while raised.
    #[must_use]
    pub fn arena(&self) -> Option<&BossArena> {
        self.arena.as_ref()
    }

    /// Reports whether the point is blocked.
    ///
    /// Permanent walls and the boss arena always block; ephemeral clusters
    /// block only during their solid phase.
    #[must_use]
    pub fn is_wall(&self, point: Vec2) -> bool {
        let chunk = self.chunk_of(point);
        let permanent = self
            .permanent
            .get(&chunk)
            .is_some_and(|rects| rects.iter().any(|rect| rect.contains(point)));
        if permanent {
            return true;
        }

        if self
            .ephemeral
            .iter()
            .any(|wall| wall.is_solid(self.now) && wall.contains(point))
        {
            return true;
        }

        self.arena
            .as_ref()
            .is_some_and(|arena| arena.contains(point))
    }

    /// Reports whether the straight segment between two points is unobstructed.
    ///
    /// The segment is sampled at a fixed spacing; each sample tests its center
    /// and two diagonal offsets that approximate the mover's thickness.
    #[must_use]
    pub fn has_clear_path(&self, from: Vec2, to: Vec2) -> bool {
        let delta = to - from;
        let spacing = self.path.sample_spacing.max(1.0);
        let steps = (delta.length() / spacing).ceil().max(1.0) as u32;
        let offset = Vec2::splat(self.path.thickness_offset);

        (0..=steps).all(|step| {
            let sample = from + delta * (step as f32 / steps as f32);
            !self.is_wall(sample) && !self.is_wall(sample + offset) && !self.is_wall(sample - offset)
        })
    }

    /// Moves `from` by `delta`, sliding along obstacles.
    ///
    /// The full diagonal move is tried first, then its horizontal component,
    /// then its vertical component. A fully blocked mover stays put.
    #[must_use]
    pub fn slide(&self, from: Vec2, delta: Vec2) -> Vec2 {
        [delta, Vec2::new(delta.x, 0.0), Vec2::new(0.0, delta.y)]
            .into_iter()
            .filter(|candidate| *candidate != Vec2::ZERO)
            .map(|candidate| from + candidate)
            .find(|target| !self.is_wall(*target))
            .unwrap_or(from)
    }

    /// Wall snapshots overlapping the viewport.
    #[must_use]
    pub fn snapshot_in(&self, viewport: &Viewport) -> Vec<WallSnapshot> {
        let view = WallRect::new(viewport.min(), viewport.max());
        let low = self.chunk_of(viewport.min());
        let high = self.chunk_of(viewport.max());

        let mut walls = Vec::new();
        for (_, rects) in self
            .permanent
            .range(ChunkCoord::new(low.x, i32::MIN)..=ChunkCoord::new(high.x, i32::MAX))
            .filter(|(chunk, _)| chunk.y >= low.y && chunk.y <= high.y)
        {
            walls.extend(rects.iter().filter(|rect| rect.overlaps(&view)).map(|rect| WallSnapshot {
                min: rect.min,
                max: rect.max,
                phase: WallPhase::Permanent,
            }));
        }
        for wall in &self.ephemeral {
            let phase = wall.phase(self.now);
            walls.extend(wall.blocks.iter().filter(|rect| rect.overlaps(&view)).map(|rect| WallSnapshot {
                min: rect.min,
                max: rect.max,
                phase,
            }));
        }
        if let Some(arena) = &self.arena {
            walls.extend(arena.pillars.iter().map(|rect| WallSnapshot {
                min: rect.min,
                max: rect.max,
                phase: WallPhase::Permanent,
            }));
        }
        walls
    }

    /// Arena ring for presentation.
    #[must_use]
    pub fn arena_snapshot(&self) -> Option<ArenaSnapshot> {
        self.arena.as_ref().map(|arena| ArenaSnapshot {
            center: arena.center,
            inner_radius: arena.inner_radius,
            thickness: arena.thickness,
        })
    }

    fn overlaps_structure(&self, rect: &WallRect) -> bool {
        let padded = rect.expanded(self.tuning.block_size * 0.5);
        let low = self.chunk_of(padded.min);
        let high = self.chunk_of(padded.max);
        for y in low.y..=high.y {
            for x in low.x..=high.x {
                let blocked = self
                    .permanent
                    .get(&ChunkCoord::new(x, y))
                    .is_some_and(|rects| rects.iter().any(|wall| wall.overlaps(&padded)));
                if blocked {
                    return true;
                }
            }
        }

        let ephemeral = self
            .ephemeral
            .iter()
            .any(|wall| wall.blocks.iter().any(|block| block.overlaps(&padded)));
        if ephemeral {
            return true;
        }

        self.arena
            .as_ref()
            .is_some_and(|arena| arena.overlaps(&padded))
    }
}

#[cfg(test)]
mod tests {
    use super::{ChunkCoord, EphemeralWall, WallMap, WallRect};
    use arena_siege_core::{PathTuning, WallPhase, WallTuning};
    use glam::Vec2;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::time::Duration;

    fn empty_map() -> WallMap {
        let tuning = WallTuning {
            clusters_min: 0,
            clusters_max: 0,
            ..WallTuning::default()
        };
        WallMap::new(tuning, PathTuning::default(), 7)
    }

    fn block_at(x: f32, y: f32) -> WallRect {
        WallRect::new(Vec2::new(x, y), Vec2::new(x + 40.0, y + 40.0))
    }

    #[test]
    fn ephemeral_wall_is_solid_only_between_telegraph_and_fade() {
        let tuning = WallTuning::default();
        let wall = EphemeralWall::new(vec![block_at(0.0, 0.0)], Duration::ZERO, &tuning);

        let just_before = tuning.telegraph - Duration::from_millis(1);
        assert!(!wall.is_solid(Duration::ZERO));
        assert!(!wall.is_solid(just_before));
        assert!(wall.is_solid(tuning.telegraph));
        assert!(wall.is_solid(tuning.telegraph + tuning.solid - Duration::from_millis(1)));
        assert!(!wall.is_solid(tuning.telegraph + tuning.solid));
        assert_eq!(wall.phase(tuning.telegraph + tuning.solid), WallPhase::Fading);
        assert_eq!(wall.phase(tuning.ephemeral_lifetime()), WallPhase::Expired);
    }

    #[test]
    fn expired_ephemeral_walls_are_removed() {
        let mut map = empty_map();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(map.spawn_ephemeral_wall(Vec2::ZERO, &mut rng).is_some());
        let lifetime = map.tuning().ephemeral_lifetime();

        map.sync_clock(lifetime - Duration::from_millis(1));
        assert_eq!(map.expire(), 0);
        map.sync_clock(lifetime);
        assert_eq!(map.expire(), 1);
        assert!(map.ephemeral_walls().is_empty());
    }

    #[test]
    fn ephemeral_walls_respect_minimum_distance() {
        let mut map = empty_map();
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let player = Vec2::new(300.0, -120.0);
        for _ in 0..4 {
            let _ = map.spawn_ephemeral_wall(player, &mut rng);
        }
        let min = map.tuning().ephemeral_min_distance;
        for wall in map.ephemeral_walls() {
            for block in wall.blocks() {
                assert!(block.distance_to(player) >= min);
            }
        }
    }

    #[test]
    fn ephemeral_walls_never_overlap_each_other() {
        let mut map = empty_map();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..6 {
            let _ = map.spawn_ephemeral_wall(Vec2::ZERO, &mut rng);
        }
        let walls = map.ephemeral_walls();
        for (index, wall) in walls.iter().enumerate() {
            for other in &walls[index + 1..] {
                for block in wall.blocks() {
                    assert!(other.blocks().iter().all(|candidate| !candidate.overlaps(block)));
                }
            }
        }
    }

    #[test]
    fn chunk_generation_is_idempotent_and_deterministic() {
        let tuning = WallTuning::default();
        let mut first = WallMap::new(tuning.clone(), PathTuning::default(), 11);
        let mut second = WallMap::new(tuning, PathTuning::default(), 11);
        let chunk = ChunkCoord::new(2, -3);

        assert!(first.generate_chunk_walls(chunk));
        assert!(!first.generate_chunk_walls(chunk));
        assert!(second.generate_chunk_walls(chunk));
        assert_eq!(first.permanent.get(&chunk), second.permanent.get(&chunk));
    }

    #[test]
    fn spawn_clearance_stays_open() {
        let mut map = WallMap::new(WallTuning::default(), PathTuning::default(), 5);
        map.ensure_chunks_around(Vec2::ZERO);
        let clearance = map.tuning().spawn_clearance;
        for step in 0..64 {
            let angle = step as f32 / 64.0 * std::f32::consts::TAU;
            let point = Vec2::from_angle(angle) * (clearance - 1.0);
            assert!(!map.is_wall(point));
        }
        assert!(!map.is_wall(Vec2::ZERO));
    }

    #[test]
    fn clear_path_detects_blocking_wall() {
        let mut map = empty_map();
        map.add_permanent_wall(block_at(100.0, -20.0));

        assert!(map.has_clear_path(Vec2::new(0.0, 200.0), Vec2::new(300.0, 200.0)));
        assert!(!map.has_clear_path(Vec2::new(0.0, 0.0), Vec2::new(300.0, 0.0)));
    }

    #[test]
    fn telegraphed_walls_do_not_block() {
        let mut map = empty_map();
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let center = map
            .spawn_ephemeral_wall(Vec2::ZERO, &mut rng)
            .expect("placement succeeds on an empty map");
        let point = map.ephemeral_walls()[0].blocks()[0].center();
        assert!(!map.is_wall(point));

        let telegraph = map.tuning().telegraph;
        map.sync_clock(telegraph);
        assert!(map.is_wall(point));
        assert!(center.length() >= map.tuning().ephemeral_min_distance);
    }

    #[test]
    fn arena_ring_blocks_only_while_raised() {
        let mut map = empty_map();
        let radius = map.tuning().arena_radius;
        let point = Vec2::new(radius + 10.0, 0.0);
        assert!(!map.is_wall(point));
        map.raise_arena(Vec2::ZERO);
        assert!(map.is_wall(point));
        assert!(!map.is_wall(Vec2::ZERO));
        map.lower_arena();
        assert!(!map.is_wall(point));
    }
}
