//! What to play after a song finishes

use rand::Rng;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackMode {
    /// Stop after the current song
    #[default]
    Once,
    /// Advance through the library, stopping after the last song
    Sequence,
    /// Pick a random different song each time
    Shuffle,
    /// Loop the current song
    RepeatOne,
}

impl PlaybackMode {
    pub const ALL: [PlaybackMode; 4] = [
        PlaybackMode::Once,
        PlaybackMode::Sequence,
        PlaybackMode::Shuffle,
        PlaybackMode::RepeatOne,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PlaybackMode::Once => "once",
            PlaybackMode::Sequence => "sequence",
            PlaybackMode::Shuffle => "shuffle",
            PlaybackMode::RepeatOne => "repeat-one",
        }
    }
}

impl fmt::Display for PlaybackMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PlaybackMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "once" => Ok(PlaybackMode::Once),
            "sequence" | "seq" => Ok(PlaybackMode::Sequence),
            "shuffle" | "random" => Ok(PlaybackMode::Shuffle),
            "repeat-one" | "repeat" => Ok(PlaybackMode::RepeatOne),
            other => Err(format!(
                "unknown playback mode '{}' (expected once, sequence, shuffle or repeat-one)",
                other
            )),
        }
    }
}

/// Index of the song to play after `current` in a library of `len` songs
pub fn next_index<R: Rng + ?Sized>(
    mode: PlaybackMode,
    current: usize,
    len: usize,
    rng: &mut R,
) -> Option<usize> {
    if len == 0 {
        return None;
    }
    match mode {
        PlaybackMode::Once => None,
        PlaybackMode::Sequence => {
            let next = current + 1;
            (next < len).then_some(next)
        }
        PlaybackMode::RepeatOne => Some(current.min(len - 1)),
        PlaybackMode::Shuffle => {
            if len == 1 {
                return Some(0);
            }
            // Draw from the other len - 1 songs
            let pick = rng.gen_range(0..len - 1);
            Some(if pick >= current { pick + 1 } else { pick })
        }
    }
}
