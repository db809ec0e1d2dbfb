//! Level and wave tables.

use std::{fs, path::Path};

use arena_siege_core::{BossKind, EnemyKind, SpawnRate, Tuning};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures raised while loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {path}")]
    Io {
        /// Path that was read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The contents are not valid TOML for the expected shape.
    #[error("invalid configuration")]
    Parse(#[from] toml::de::Error),
    /// The level table lists no levels.
    #[error("level table is empty")]
    NoLevels,
    /// A level lists no waves.
    #[error("level {level} has no waves")]
    NoWaves {
        /// One-based level number.
        level: usize,
    },
}

/// Content of one wave.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveConfig {
    /// Worker cadence per regular enemy kind.
    pub spawn_rates: Vec<SpawnRate>,
    /// Boss that makes this a boss wave.
    pub boss: Option<BossKind>,
}

impl WaveConfig {
    /// Regular wave with the given rates.
    #[must_use]
    pub fn regular(spawn_rates: Vec<SpawnRate>) -> Self {
        Self {
            spawn_rates,
            boss: None,
        }
    }

    /// Boss wave without regular workers.
    #[must_use]
    pub fn boss(kind: BossKind) -> Self {
        Self {
            spawn_rates: Vec::new(),
            boss: Some(kind),
        }
    }

    /// Reports whether the wave completes on boss defeat.
    #[must_use]
    pub const fn is_boss_wave(&self) -> bool {
        self.boss.is_some()
    }
}

/// Ordered waves of one level.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    /// Waves in play order.
    pub waves: Vec<WaveConfig>,
}

/// Every level of a run. Levels past the end of the table replay the last
/// configured level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelTable {
    /// Levels in play order.
    pub levels: Vec<LevelConfig>,
}

impl LevelTable {
    /// Parses and validates a table from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let table: Self = toml::from_str(text)?;
        table.validate()?;
        Ok(table)
    }

    /// Reads a table from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_str(&read(path.as_ref())?)
    }

    /// Configuration of the one-based `level`.
    #[must_use]
    pub fn level(&self, level: u32) -> Option<&LevelConfig> {
        let index = (level.max(1) as usize - 1).min(self.levels.len().saturating_sub(1));
        self.levels.get(index)
    }

    /// Configuration of the one-based `wave` within `level`.
    #[must_use]
    pub fn wave(&self, level: u32, wave: u32) -> Option<&WaveConfig> {
        let index = (wave as usize).checked_sub(1)?;
        self.level(level)?.waves.get(index)
    }

    /// Number of waves in `level`.
    #[must_use]
    pub fn wave_count(&self, level: u32) -> u32 {
        self.level(level)
            .map_or(0, |config| u32::try_from(config.waves.len()).unwrap_or(u32::MAX))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.levels.is_empty() {
            return Err(ConfigError::NoLevels);
        }
        if let Some(index) = self.levels.iter().position(|level| level.waves.is_empty()) {
            return Err(ConfigError::NoWaves { level: index + 1 });
        }
        Ok(())
    }
}

impl Default for LevelTable {
    fn default() -> Self {
        use EnemyKind::{Giant, Normal, Shooter, Slime, Small};

        let rate = SpawnRate::new;
        Self {
            levels: vec![
                LevelConfig {
                    waves: vec![
                        WaveConfig::regular(vec![rate(Normal, 2.0), rate(Small, 1.0)]),
                        WaveConfig::regular(vec![rate(Normal, 2.5), rate(Giant, 0.5), rate(Small, 1.5)]),
                        WaveConfig::boss(BossKind::Jumper),
                    ],
                },
                LevelConfig {
                    waves: vec![
                        WaveConfig::regular(vec![rate(Normal, 2.5), rate(Shooter, 0.5)]),
                        WaveConfig::regular(vec![rate(Normal, 2.5), rate(Slime, 1.0), rate(Shooter, 0.75)]),
                        WaveConfig::regular(vec![rate(Giant, 1.0), rate(Small, 2.5), rate(Shooter, 1.0)]),
                        WaveConfig::boss(BossKind::Caster),
                    ],
                },
                LevelConfig {
                    waves: vec![
                        WaveConfig::regular(vec![rate(Normal, 3.0), rate(Small, 2.0), rate(Shooter, 1.0)]),
                        WaveConfig::boss(BossKind::Jumper),
                        WaveConfig::regular(vec![rate(Giant, 1.5), rate(Slime, 1.5), rate(Shooter, 1.5)]),
                        WaveConfig::boss(BossKind::Caster),
                    ],
                },
            ],
        }
    }
}

/// Parses tuning from TOML text; omitted fields keep their defaults.
pub fn tuning_from_toml_str(text: &str) -> Result<Tuning, ConfigError> {
    Ok(toml::from_str(text)?)
}

/// Reads tuning from a TOML file.
pub fn load_tuning(path: impl AsRef<Path>) -> Result<Tuning, ConfigError> {
    tuning_from_toml_str(&read(path.as_ref())?)
}

fn read(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })
}
