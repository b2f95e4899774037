//! Song library: every song found in the songs directory

pub mod watcher;

use crate::song::{self, Song};
use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

/// File extensions scanned for songs
pub const SONG_EXTENSIONS: [&str; 2] = ["txt", "json"];

pub fn is_song_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SONG_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

#[derive(Debug, Clone)]
pub struct SongLibrary {
    dir: PathBuf,
    songs: Vec<Song>,
    /// Files that failed to load on the last scan, with the reason
    skipped: Vec<(PathBuf, String)>,
}

impl SongLibrary {
    /// Load every song file in `dir`, in file-name order.
    ///
    /// Unreadable or malformed files are logged and skipped. A missing
    /// directory is an error.
    pub fn scan<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let mut library = Self::empty(dir);
        library.rescan()?;
        Ok(library)
    }

    /// An empty library for `dir`, for when the initial scan fails
    pub fn empty<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            songs: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// Reload the directory, replacing the current song list
    pub fn rescan(&mut self) -> Result<usize> {
        if !self.dir.is_dir() {
            bail!("songs directory not found: {}", self.dir.display());
        }

        let mut files: Vec<PathBuf> = std::fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && is_song_file(path))
            .collect();
        files.sort();

        let mut songs = Vec::new();
        let mut skipped = Vec::new();
        for path in files {
            match song::load_file(&path) {
                Ok(loaded) => {
                    tracing::debug!(file = %path.display(), songs = loaded.len(), "loaded song file");
                    songs.extend(loaded);
                }
                Err(e) => {
                    tracing::warn!(file = %path.display(), "skipping song file: {:#}", e);
                    skipped.push((path, format!("{:#}", e)));
                }
            }
        }

        tracing::info!(
            dir = %self.dir.display(),
            songs = songs.len(),
            skipped = skipped.len(),
            "song library scanned"
        );
        self.songs = songs;
        self.skipped = skipped;
        Ok(self.songs.len())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    pub fn skipped(&self) -> &[(PathBuf, String)] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Song> {
        self.songs.get(index)
    }

    /// Look up a song by its 1-based list number or by a case-insensitive
    /// substring of its name. Returns the 0-based index.
    pub fn find(&self, query: &str) -> Option<usize> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }
        if let Ok(number) = query.parse::<usize>() {
            return (1..=self.songs.len())
                .contains(&number)
                .then(|| number - 1);
        }
        let needle = query.to_lowercase();
        self.songs
            .iter()
            .position(|song| song.name.to_lowercase() == needle)
            .or_else(|| {
                self.songs
                    .iter()
                    .position(|song| song.name.to_lowercase().contains(&needle))
            })
    }
}
