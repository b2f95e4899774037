//! Song files
//!
//! Songs are JSON, either a single object or an array of objects, in the
//! format exported by the community sheet tools:
//!
//! ```json
//! [{ "name": "Ode", "author": "", "bpm": 120,
//!    "songNotes": [{ "time": 0, "key": "1Key0" }, { "time": 250, "key": "1Key4" }] }]
//! ```
//!
//! Files are frequently saved as UTF-16 with a BOM, so bytes go through
//! [`decode_song_bytes`] before parsing.

use anyhow::{bail, Context, Result};
use keyplay_core::NoteEvent;
use serde::Deserialize;
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// A parsed song
#[derive(Debug, Clone, PartialEq)]
pub struct Song {
    pub name: String,
    pub author: Option<String>,
    pub transcribed_by: Option<String>,
    pub bpm: Option<f64>,
    pub notes: Vec<NoteEvent>,
    /// File the song was loaded from, if any
    pub source: Option<PathBuf>,
}

impl Song {
    /// Time of the last note
    pub fn duration_ms(&self) -> u64 {
        self.notes.iter().map(|note| note.time).max().unwrap_or(0)
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SongFile {
    Many(Vec<RawSong>),
    One(RawSong),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSong {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    transcribed_by: Option<String>,
    #[serde(default)]
    bpm: Option<f64>,
    song_notes: Vec<RawNote>,
}

#[derive(Debug, Deserialize)]
struct RawNote {
    time: f64,
    key: String,
}

impl RawSong {
    fn into_song(self, index: usize) -> Song {
        let notes = self
            .song_notes
            .into_iter()
            .filter(|note| note.time.is_finite() && note.time >= 0.0)
            .map(|note| NoteEvent::new(note.time.round() as u64, note.key))
            .collect();
        Song {
            name: self
                .name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| format!("Untitled {}", index + 1)),
            author: self.author.filter(|s| !s.is_empty()),
            transcribed_by: self.transcribed_by.filter(|s| !s.is_empty()),
            bpm: self.bpm,
            notes,
            source: None,
        }
    }
}

/// Decode raw file bytes to text.
///
/// A UTF-8 or UTF-16 (LE/BE) byte order mark selects the encoding and is
/// stripped. Without a BOM the bytes are read as UTF-8, replacing invalid
/// sequences.
pub fn decode_song_bytes(bytes: &[u8]) -> Result<String> {
    if let Some((encoding, bom_len)) = encoding_rs::Encoding::for_bom(bytes) {
        let (text, had_errors) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        if had_errors {
            bail!("malformed {} text", encoding.name());
        }
        return Ok(text.into_owned());
    }
    Ok(match String::from_utf8_lossy(bytes) {
        Cow::Borrowed(text) => text.to_string(),
        Cow::Owned(text) => text,
    })
}

/// Parse every song in a JSON document
pub fn parse_songs(text: &str) -> Result<Vec<Song>> {
    let text = text.trim_start_matches('\u{feff}');
    let file: SongFile = serde_json::from_str(text).context("invalid song JSON")?;
    let raw = match file {
        SongFile::Many(songs) => songs,
        SongFile::One(song) => vec![song],
    };
    Ok(raw
        .into_iter()
        .enumerate()
        .map(|(index, song)| song.into_song(index))
        .collect())
}

/// Read, decode and parse a song file
pub fn load_file(path: &Path) -> Result<Vec<Song>> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let text = decode_song_bytes(&bytes).with_context(|| format!("in {}", path.display()))?;
    let mut songs = parse_songs(&text).with_context(|| format!("in {}", path.display()))?;
    for song in &mut songs {
        song.source = Some(path.to_path_buf());
    }
    Ok(songs)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ODE: &str = r#"{
        "name": "Ode",
        "author": "LvB",
        "transcribedBy": "someone",
        "bpm": 120,
        "songNotes": [
            {"time": 0, "key": "1Key0"},
            {"time": 249.6, "key": "1Key4"},
            {"time": -10, "key": "1Key1"}
        ]
    }"#;

    #[test]
    fn test_parse_object() {
        let songs = parse_songs(ODE).unwrap();
        assert_eq!(songs.len(), 1);
        let song = &songs[0];
        assert_eq!(song.name, "Ode");
        assert_eq!(song.author.as_deref(), Some("LvB"));
        assert_eq!(song.transcribed_by.as_deref(), Some("someone"));
        assert_eq!(song.bpm, Some(120.0));
        assert_eq!(
            song.notes,
            vec![NoteEvent::new(0, "1Key0"), NoteEvent::new(250, "1Key4")]
        );
        assert_eq!(song.duration_ms(), 250);
    }

    #[test]
    fn test_parse_array_with_missing_metadata() {
        let text = r#"[
            {"songNotes": [{"time": 10, "key": "1Key2"}]},
            {"name": "B", "songNotes": []}
        ]"#;
        let songs = parse_songs(text).unwrap();
        assert_eq!(songs.len(), 2);
        assert_eq!(songs[0].name, "Untitled 1");
        assert_eq!(songs[0].author, None);
        assert_eq!(songs[1].name, "B");
        assert_eq!(songs[1].duration_ms(), 0);
    }

    #[test]
    fn test_missing_notes_is_error() {
        assert!(parse_songs(r#"{"name": "x"}"#).is_err());
        assert!(parse_songs("not json").is_err());
    }

    #[test]
    fn test_decode_utf8_bom() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"[]");
        assert_eq!(decode_song_bytes(&bytes).unwrap(), "[]");
    }

    #[test]
    fn test_decode_utf16le_bom() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "[{\"songNotes\":[]}]".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let text = decode_song_bytes(&bytes).unwrap();
        assert_eq!(text, "[{\"songNotes\":[]}]");
        assert_eq!(parse_songs(&text).unwrap().len(), 1);
    }

    #[test]
    fn test_decode_utf16be_bom() {
        let mut bytes = vec![0xFE, 0xFF];
        for unit in "{}".encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        assert_eq!(decode_song_bytes(&bytes).unwrap(), "{}");
    }

    #[test]
    fn test_decode_without_bom_is_lossy_utf8() {
        assert_eq!(decode_song_bytes(b"abc").unwrap(), "abc");
        assert_eq!(decode_song_bytes(&[b'a', 0xFF]).unwrap(), "a\u{fffd}");
    }
}
