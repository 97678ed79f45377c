//! Simulation settings. Loaded from `game.ron` at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Server-side simulation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Client slots; entities `1..=max_clients` are players.
    #[serde(default = "default_max_clients")]
    pub max_clients: usize,
    /// Size of the entity arena, world and clients included.
    #[serde(default = "default_max_entities")]
    pub max_entities: usize,
    /// Server frame length in milliseconds.
    #[serde(default = "default_frame_time_ms")]
    pub frame_time_ms: i64,
    /// Distance projectiles are pushed forward when fired.
    #[serde(default = "default_projectile_prestep")]
    pub projectile_prestep: f32,
    /// Race rules: projectiles only clip world geometry, no plasma backtrace.
    #[serde(default)]
    pub race_gametype: bool,
    /// Teammates can hurt each other.
    #[serde(default)]
    pub friendly_fire: bool,
    #[serde(default = "default_gravity")]
    pub gravity: f32,
    /// Seed for spread and bubble ring randomness.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_max_clients() -> usize {
    16
}
fn default_max_entities() -> usize {
    1024
}
fn default_frame_time_ms() -> i64 {
    16
}
fn default_projectile_prestep() -> f32 {
    100.0
}
fn default_gravity() -> f32 {
    850.0
}
fn default_seed() -> u64 {
    0x5eed
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_clients: default_max_clients(),
            max_entities: default_max_entities(),
            frame_time_ms: default_frame_time_ms(),
            projectile_prestep: default_projectile_prestep(),
            race_gametype: false,
            friendly_fire: false,
            gravity: default_gravity(),
            seed: default_seed(),
        }
    }
}

impl GameConfig {
    /// Load config from `game.ron`. If the file is missing or invalid, returns default config.
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        if let Ok(data) = std::fs::read_to_string(path) {
            match Self::parse(&data) {
                Ok(c) => return c,
                Err(e) => log::warn!("Invalid config at {:?}: {}, using defaults", path, e),
            }
        }
        Self::default()
    }

    pub fn parse(data: &str) -> anyhow::Result<Self> {
        let mut config: Self = ron::from_str(data)?;
        // Room for the world, every client and at least one spawned entity.
        if config.max_entities < config.max_clients + 2 {
            log::warn!(
                "max_entities {} too small for {} clients, raising",
                config.max_entities,
                config.max_clients
            );
            config.max_entities = config.max_clients + 2;
        }
        config.frame_time_ms = config.frame_time_ms.max(1);
        Ok(config)
    }

    /// Write the config as pretty RON.
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        let s = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        std::fs::write(path, s)?;
        Ok(())
    }
}

fn config_path() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join("game.ron")
}
