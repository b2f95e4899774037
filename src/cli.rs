use std::path::PathBuf;

use clap::Parser;
use keyplay::config::{AppConfig, CONFIG_FILE};
use keyplay_core::GameMode;

#[derive(Debug, Parser, Clone)]
#[command(name = "keyplay")]
#[command(about = "Plays song sheets into a game window as timed key presses")]
pub struct Cli {
    /// Settings file; missing files fall back to defaults.
    #[arg(long, env = "KEYPLAY_CONFIG", default_value = CONFIG_FILE)]
    pub config: PathBuf,

    /// Directory scanned for song files.
    #[arg(long, env = "KEYPLAY_SONGS_DIR")]
    pub songs_dir: Option<String>,

    /// Key profile: sky or genshin.
    #[arg(long, value_parser = parse_mode)]
    pub mode: Option<GameMode>,

    /// Playback speed, 0.5 to 2.0.
    #[arg(long)]
    pub speed: Option<f64>,

    /// Key hold time in milliseconds for every profile.
    #[arg(long)]
    pub hold_ms: Option<u64>,

    /// Delay before the first key after `play`, in milliseconds.
    #[arg(long)]
    pub lead_in_ms: Option<u64>,

    /// Log keys instead of sending them to the OS.
    #[arg(long)]
    pub dry_run: bool,

    /// Enable debug logging.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Apply command-line overrides on top of file settings
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(dir) = &self.songs_dir {
            config.songs_dir = dir.clone();
        }
        if let Some(mode) = self.mode {
            config.game_mode = mode;
        }
        if let Some(speed) = self.speed {
            config.speed = speed;
        }
        if let Some(hold) = self.hold_ms {
            config.hold_ms = Some(hold);
        }
        if let Some(lead_in) = self.lead_in_ms {
            config.lead_in_ms = lead_in;
        }
    }
}

fn parse_mode(name: &str) -> Result<GameMode, String> {
    GameMode::parse(name)
        .ok_or_else(|| format!("unknown game mode '{}' (expected sky or genshin)", name))
}
