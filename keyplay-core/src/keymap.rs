//! Key map registry
//!
//! Maps logical key ids (`1Key0`, `1Key1`, ...) to physical scan codes, one
//! table per game profile. The tables are static; the lookup maps are built
//! once on first access and shared by the whole process.

use crate::types::ScanCode;
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;
use std::time::Duration;

/// Supported game profiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum GameMode {
    /// 15-key instrument layout (3 rows of 5)
    #[default]
    Sky,
    /// 21-key lyre layout (3 rows of 7)
    Genshin,
}

impl GameMode {
    pub const ALL: [GameMode; 2] = [GameMode::Sky, GameMode::Genshin];

    /// Parse a profile name (case-insensitive)
    pub fn parse(s: &str) -> Option<GameMode> {
        match s.trim().to_lowercase().as_str() {
            "sky" => Some(GameMode::Sky),
            "genshin" => Some(GameMode::Genshin),
            _ => None,
        }
    }

    /// Parse a profile name, falling back to the default profile
    pub fn from_name(s: &str) -> GameMode {
        Self::parse(s).unwrap_or_default()
    }

    pub fn name(&self) -> &'static str {
        match self {
            GameMode::Sky => "sky",
            GameMode::Genshin => "genshin",
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Default time a key is held down before release
pub const DEFAULT_HOLD: Duration = Duration::from_millis(20);

// Y U I O P / H J K L ; / N M , . /
const SKY_KEYS: &[(&str, u16)] = &[
    ("1Key0", 0x15),
    ("1Key1", 0x16),
    ("1Key2", 0x17),
    ("1Key3", 0x18),
    ("1Key4", 0x19),
    ("1Key5", 0x23),
    ("1Key6", 0x24),
    ("1Key7", 0x25),
    ("1Key8", 0x26),
    ("1Key9", 0x27),
    ("1Key10", 0x31),
    ("1Key11", 0x32),
    ("1Key12", 0x33),
    ("1Key13", 0x34),
    ("1Key14", 0x35),
];

// Z..M (low) / A..J (middle) / Q..U (high)
const GENSHIN_KEYS: &[(&str, u16)] = &[
    ("1Key0", 0x2c),
    ("1Key1", 0x2d),
    ("1Key2", 0x2e),
    ("1Key3", 0x2f),
    ("1Key4", 0x30),
    ("1Key5", 0x31),
    ("1Key6", 0x32),
    ("1Key7", 0x1e),
    ("1Key8", 0x1f),
    ("1Key9", 0x20),
    ("1Key10", 0x21),
    ("1Key11", 0x22),
    ("1Key12", 0x23),
    ("1Key13", 0x24),
    ("1Key14", 0x10),
    ("1Key15", 0x11),
    ("1Key16", 0x12),
    ("1Key17", 0x13),
    ("1Key18", 0x14),
    ("1Key19", 0x15),
    ("1Key20", 0x16),
];

/// Key table and timing defaults for one game
#[derive(Debug)]
pub struct KeyProfile {
    pub mode: GameMode,
    /// Default key-down to key-up interval
    pub hold: Duration,
    table: &'static [(&'static str, u16)],
    lookup: HashMap<&'static str, ScanCode>,
}

impl KeyProfile {
    fn new(mode: GameMode, table: &'static [(&'static str, u16)]) -> Self {
        let lookup = table
            .iter()
            .map(|&(key, code)| (key, ScanCode::new(code)))
            .collect();
        Self {
            mode,
            hold: DEFAULT_HOLD,
            table,
            lookup,
        }
    }

    pub fn resolve(&self, logical_key: &str) -> Option<ScanCode> {
        self.lookup.get(logical_key).copied()
    }

    /// Number of logical keys in this layout
    pub fn key_count(&self) -> usize {
        self.table.len()
    }

    /// All (logical key, code) pairs in layout order
    pub fn keys(&self) -> impl Iterator<Item = (&'static str, ScanCode)> + '_ {
        self.table
            .iter()
            .map(|&(key, code)| (key, ScanCode::new(code)))
    }
}

/// All key profiles known to the process
#[derive(Debug)]
pub struct KeyMapRegistry {
    sky: KeyProfile,
    genshin: KeyProfile,
}

impl KeyMapRegistry {
    /// The process-wide registry
    pub fn global() -> &'static KeyMapRegistry {
        static REGISTRY: OnceLock<KeyMapRegistry> = OnceLock::new();
        REGISTRY.get_or_init(|| KeyMapRegistry {
            sky: KeyProfile::new(GameMode::Sky, SKY_KEYS),
            genshin: KeyProfile::new(GameMode::Genshin, GENSHIN_KEYS),
        })
    }

    pub fn profile(&self, mode: GameMode) -> &KeyProfile {
        match mode {
            GameMode::Sky => &self.sky,
            GameMode::Genshin => &self.genshin,
        }
    }

    /// Resolve a logical key under a profile name; unknown profiles use the default
    pub fn resolve(&self, game_mode: &str, logical_key: &str) -> Option<ScanCode> {
        self.profile(GameMode::from_name(game_mode))
            .resolve(logical_key)
    }
}

/// Resolve a logical key to a physical code. `None` means the note should be skipped.
pub fn resolve(game_mode: &str, logical_key: &str) -> Option<ScanCode> {
    KeyMapRegistry::global().resolve(game_mode, logical_key)
}
