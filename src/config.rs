//! Persistent settings

use crate::playlist::PlaybackMode;
use crate::session::EngineConfig;
use anyhow::{Context, Result};
use keyplay_core::GameMode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const CONFIG_FILE: &str = "keyplay.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub game_mode: GameMode,
    pub songs_dir: String,
    pub speed: f64,
    /// Hold for every profile; `None` keeps each profile's default
    pub hold_ms: Option<u64>,
    /// Per-profile hold, keyed by mode name
    pub profile_hold_ms: BTreeMap<String, u64>,
    pub lead_in_ms: u64,
    pub playback_mode: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            game_mode: GameMode::default(),
            songs_dir: "songs".to_string(),
            speed: 1.0,
            hold_ms: None,
            profile_hold_ms: BTreeMap::new(),
            lead_in_ms: 2000,
            playback_mode: PlaybackMode::default().name().to_string(),
        }
    }
}

impl AppConfig {
    /// Loads config from a specified path.
    /// Returns default config if file doesn't exist.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("invalid config {}", path.display()))?;
        Ok(config)
    }

    /// Saves config to a specified path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)
            .with_context(|| format!("failed to write config {}", path.display()))?;
        Ok(())
    }

    /// Configured playlist mode; unknown names fall back to `once`
    pub fn playback_mode(&self) -> PlaybackMode {
        self.playback_mode.parse().unwrap_or_else(|e| {
            tracing::warn!("{}", e);
            PlaybackMode::default()
        })
    }

    pub fn engine_config(&self) -> EngineConfig {
        let mut profile_hold = std::collections::HashMap::new();
        for (name, ms) in &self.profile_hold_ms {
            match GameMode::parse(name) {
                Some(mode) => {
                    profile_hold.insert(mode, Duration::from_millis(*ms));
                }
                None => tracing::warn!(mode = %name, "ignoring hold override for unknown game mode"),
            }
        }
        EngineConfig {
            lead_in: Duration::from_millis(self.lead_in_ms),
            hold: self.hold_ms.map(Duration::from_millis),
            profile_hold,
        }
    }
}
