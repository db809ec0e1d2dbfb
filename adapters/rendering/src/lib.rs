#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Arena Siege adapters.

use std::{
    collections::{BTreeMap, BTreeSet},
    error::Error,
    fmt, fs,
    path::Path,
};

use anyhow::Result as AnyResult;
use arena_siege_core::{EnemyKind, ProjectileOwner, SceneSnapshot, WallPhase, ZoneKind};
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);
        let lift = |channel: f32| channel + (1.0 - channel) * amount;
        Self {
            red: lift(self.red),
            green: lift(self.green),
            blue: lift(self.blue),
            alpha: self.alpha,
        }
    }

    /// Returns the color with its alpha scaled by `factor`.
    #[must_use]
    pub fn faded(self, factor: f32) -> Self {
        Self {
            alpha: self.alpha * factor.clamp(0.0, 1.0),
            ..self
        }
    }
}

/// Fallback colors used when a sprite is missing.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    enemies: BTreeMap<EnemyKind, Color>,
    player: Color,
    wall: Color,
}

impl Default for Palette {
    fn default() -> Self {
        let enemies = BTreeMap::from([
            (EnemyKind::Normal, Color::from_rgb_u8(0xc8, 0x2a, 0x36)),
            (EnemyKind::Giant, Color::from_rgb_u8(0x7b, 0x1f, 0xa2)),
            (EnemyKind::Small, Color::from_rgb_u8(0xff, 0xc1, 0x07)),
            (EnemyKind::Shooter, Color::from_rgb_u8(0x58, 0x47, 0xff)),
            (EnemyKind::Slime, Color::from_rgb_u8(0x2f, 0x95, 0x32)),
            (EnemyKind::JumperBoss, Color::from_rgb_u8(0x8d, 0x6e, 0x63)),
            (EnemyKind::CasterBoss, Color::from_rgb_u8(0x00, 0x96, 0x88)),
        ]);
        Self {
            enemies,
            player: Color::from_rgb_u8(0xec, 0xef, 0xf1),
            wall: Color::from_rgb_u8(0x45, 0x5a, 0x64),
        }
    }
}

impl Palette {
    /// Fill color for an enemy, lightened while burning and faded with its
    /// alpha.
    #[must_use]
    pub fn enemy(&self, kind: EnemyKind, alpha: f32, burning: bool) -> Color {
        let base = self.enemies.get(&kind).copied().unwrap_or(self.player);
        let base = if burning { base.lighten(0.35) } else { base };
        base.faded(alpha)
    }

    /// Fill color for the player.
    #[must_use]
    pub const fn player(&self) -> Color {
        self.player
    }

    /// Fill color for a wall in `phase`; non-blocking phases are translucent.
    #[must_use]
    pub fn wall(&self, phase: WallPhase) -> Color {
        match phase {
            WallPhase::Permanent | WallPhase::Solid => self.wall,
            WallPhase::Telegraph => self.wall.lighten(0.5).faded(0.4),
            WallPhase::Fading => self.wall.faded(0.5),
            WallPhase::Expired => self.wall.faded(0.0),
        }
    }
}

/// Sprite key for an enemy kind.
#[must_use]
pub const fn sprite_key(kind: EnemyKind) -> &'static str {
    match kind {
        EnemyKind::Normal => "normal",
        EnemyKind::Giant => "giant",
        EnemyKind::Small => "small",
        EnemyKind::Shooter => "shooter",
        EnemyKind::Slime => "slime",
        EnemyKind::JumperBoss => "jumper_boss",
        EnemyKind::CasterBoss => "caster_boss",
    }
}

/// Mapping from sprite keys to image paths.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteManifest {
    /// Image path per sprite key.
    #[serde(default)]
    pub sprites: BTreeMap<String, String>,
}

impl SpriteManifest {
    /// Parses a manifest from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ManifestError> {
        toml::from_str(text).map_err(|error| ManifestError::Parse(error.to_string()))
    }

    /// Reads a manifest from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|error| ManifestError::Read {
            path: path.display().to_string(),
            reason: error.to_string(),
        })?;
        Self::from_toml_str(&text)
    }

    /// Image path for an enemy kind.
    #[must_use]
    pub fn sprite(&self, kind: EnemyKind) -> Option<&str> {
        self.sprites.get(sprite_key(kind)).map(String::as_str)
    }
}

/// Errors raised while loading a sprite manifest.
#[derive(Debug, PartialEq, Eq)]
pub enum ManifestError {
    /// The manifest file could not be read.
    Read {
        /// Path of the manifest.
        path: String,
        /// Operating-system message.
        reason: String,
    },
    /// The manifest is not valid TOML.
    Parse(String),
}

impl fmt::Display for ManifestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, reason } => write!(f, "failed to read sprite manifest {path}: {reason}"),
            Self::Parse(reason) => write!(f, "invalid sprite manifest: {reason}"),
        }
    }
}

impl Error for ManifestError {}

/// Presentation backend that consumes one snapshot per tick.
pub trait Renderer {
    /// Presents `scene`. Errors are reported to the adapter; the simulation
    /// keeps running regardless.
    fn present(&mut self, scene: &SceneSnapshot) -> AnyResult<()>;
}

/// Counts of what a presented frame contained.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameSummary {
    /// Enemies in the scene.
    pub enemies: usize,
    /// Enemies inside the viewport.
    pub visible_enemies: usize,
    /// Player projectiles in flight.
    pub player_projectiles: usize,
    /// Enemy and boss projectiles in flight.
    pub hostile_projectiles: usize,
    /// Walls overlapping the viewport.
    pub walls: usize,
    /// Armed hazards and blasts.
    pub armed_zones: usize,
    /// Whether a wave-clear effect is on screen.
    pub wave_clear: bool,
    /// Whether the boss arena is raised.
    pub arena: bool,
}

impl FrameSummary {
    /// Summarises `scene`.
    #[must_use]
    pub fn of(scene: &SceneSnapshot) -> Self {
        let hostile = scene
            .projectiles
            .iter()
            .filter(|projectile| projectile.owner != ProjectileOwner::Player)
            .count();
        Self {
            enemies: scene.enemies.len(),
            visible_enemies: scene
                .enemies
                .iter()
                .filter(|enemy| scene.viewport.contains(enemy.position))
                .count(),
            player_projectiles: scene.projectiles.len() - hostile,
            hostile_projectiles: hostile,
            walls: scene.walls.len(),
            armed_zones: scene.zones.iter().filter(|zone| zone.armed).count(),
            wave_clear: scene
                .zones
                .iter()
                .any(|zone| zone.kind == ZoneKind::WaveClear && zone.armed),
            arena: scene.arena.is_some(),
        }
    }
}

/// Renderer without a window. It resolves sprites and colors for every
/// entity and records a summary of each frame.
#[derive(Debug, Default)]
pub struct HeadlessPresenter {
    manifest: SpriteManifest,
    palette: Palette,
    missing: BTreeSet<EnemyKind>,
    frames: u64,
    last: FrameSummary,
    focus: Vec2,
}

impl HeadlessPresenter {
    /// Creates a presenter resolving sprites through `manifest`.
    #[must_use]
    pub fn new(manifest: SpriteManifest) -> Self {
        Self {
            manifest,
            ..Self::default()
        }
    }

    /// Frames presented so far.
    #[must_use]
    pub const fn frames(&self) -> u64 {
        self.frames
    }

    /// Summary of the most recent frame.
    #[must_use]
    pub const fn last_frame(&self) -> FrameSummary {
        self.last
    }

    /// Player position in the most recent frame.
    #[must_use]
    pub const fn focus(&self) -> Vec2 {
        self.focus
    }

    /// Enemy kinds drawn with a fallback color because their sprite is
    /// missing.
    #[must_use]
    pub fn missing_sprites(&self) -> &BTreeSet<EnemyKind> {
        &self.missing
    }
}

impl Renderer for HeadlessPresenter {
    fn present(&mut self, scene: &SceneSnapshot) -> AnyResult<()> {
        for enemy in &scene.enemies {
            if self.manifest.sprite(enemy.kind).is_none() && self.missing.insert(enemy.kind) {
                log::warn!(
                    "no sprite for {:?}; drawing it as a {:?} circle",
                    enemy.kind,
                    self.palette.enemy(enemy.kind, 1.0, false)
                );
            }
        }
        self.focus = scene.player.position;
        self.last = FrameSummary::of(scene);
        self.frames += 1;
        log::trace!("frame {} at {:?}: {:?}", self.frames, scene.time, self.last);
        Ok(())
    }
}
