//! Command registry for REPL commands
//!
//! Each command is a prefix plus a handler taking the remaining arguments.

pub mod general;
pub mod library;
pub mod playback;

use crate::config::AppConfig;
use crate::library::SongLibrary;
use crate::playlist::{self, PlaybackMode};
use crate::session::SessionController;
use crate::song::Song;
use anyhow::{anyhow, Result};
use keyplay_core::GameMode;
use std::path::PathBuf;

/// Result of executing a command
#[derive(Debug)]
pub enum CommandResult {
    /// Command executed successfully, continue REPL
    Success,
    /// Command executed, show this message
    Message(String),
    /// Exit the REPL
    Exit,
    /// No command matched the input
    NotACommand,
    /// Error occurred
    Error(String),
    /// Toggle watching the songs directory
    Watch,
}

/// State shared by all command handlers
pub struct CommandContext {
    pub controller: SessionController,
    pub library: SongLibrary,
    pub game_mode: GameMode,
    pub playback_mode: PlaybackMode,
    /// Library index of the loaded song
    pub loaded: Option<usize>,
    pub watching: bool,
    /// Settings as read from disk, and where `save` writes them back
    pub config: AppConfig,
    pub config_file: Option<PathBuf>,
}

impl CommandContext {
    pub fn new(
        controller: SessionController,
        library: SongLibrary,
        game_mode: GameMode,
        playback_mode: PlaybackMode,
    ) -> Self {
        Self {
            controller,
            library,
            game_mode,
            playback_mode,
            loaded: None,
            watching: false,
            config: AppConfig::default(),
            config_file: None,
        }
    }

    /// Remember the on-disk settings so `save` can write them back
    pub fn with_config_file(mut self, config: AppConfig, path: impl Into<PathBuf>) -> Self {
        self.config = config;
        self.config_file = Some(path.into());
        self
    }

    /// Write the current game mode, speed and playlist mode to the config file
    pub fn save_settings(&mut self) -> Result<PathBuf> {
        let path = self
            .config_file
            .clone()
            .ok_or_else(|| anyhow!("no config file to save to"))?;
        self.config.game_mode = self.game_mode;
        self.config.speed = self.controller.speed().get();
        self.config.playback_mode = self.playback_mode.name().to_string();
        self.config.save_to(&path)?;
        Ok(path)
    }

    pub fn loaded_song(&self) -> Option<&Song> {
        self.loaded.and_then(|index| self.library.get(index))
    }

    /// Resolve a list number or name to a library index
    pub fn select(&self, query: &str) -> Result<usize> {
        if self.library.is_empty() {
            return Err(anyhow!(
                "no songs in {}; add song files and run 'rescan'",
                self.library.dir().display()
            ));
        }
        self.library
            .find(query)
            .ok_or_else(|| anyhow!("no song matches '{}'", query))
    }

    /// Rescan the library, keeping the loaded song selected if it is still there
    pub fn rescan(&mut self) -> Result<usize> {
        let loaded_name = self.loaded_song().map(|song| song.name.clone());
        let count = self.library.rescan()?;
        self.loaded = loaded_name
            .and_then(|name| self.library.songs().iter().position(|song| song.name == name));
        Ok(count)
    }

    /// Start playing the song at `index` and mark it loaded
    pub fn play_index(&mut self, index: usize) -> Result<String> {
        let song = self
            .library
            .get(index)
            .ok_or_else(|| anyhow!("song {} is no longer in the library", index + 1))?;
        let name = song.name.clone();
        let notes = song.notes.clone();

        self.loaded = Some(index);
        self.controller.play(notes, self.game_mode.name())?;

        let lead_in = self.controller.config().lead_in;
        Ok(if lead_in.is_zero() {
            format!("Playing {}", name)
        } else {
            format!(
                "Playing {} in {:.1}s, switch to the game window",
                name,
                lead_in.as_secs_f64()
            )
        })
    }

    /// Play whatever the playlist mode picks after the loaded song.
    ///
    /// Returns `None` when the playlist has nothing more to play.
    pub fn advance(&mut self) -> Option<Result<String>> {
        let current = self.loaded?;
        let next = playlist::next_index(
            self.playback_mode,
            current,
            self.library.len(),
            &mut rand::thread_rng(),
        )?;
        Some(self.play_index(next))
    }
}

/// A command handler function
pub type CommandHandler = fn(&str, &mut CommandContext) -> CommandResult;

/// Registry of available commands
pub struct CommandRegistry {
    /// Sorted by prefix length descending for longest-match-first lookup
    commands: Vec<(String, CommandHandler)>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    pub fn register(&mut self, prefix: &str, handler: CommandHandler) {
        self.commands.push((prefix.to_string(), handler));
        self.commands.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    }

    /// Execute a command, returning NotACommand if no match found
    pub fn execute(&self, input: &str, ctx: &mut CommandContext) -> CommandResult {
        for (prefix, handler) in &self.commands {
            if input == prefix || input.starts_with(&format!("{} ", prefix)) {
                let args = if input.len() > prefix.len() {
                    input[prefix.len()..].trim()
                } else {
                    ""
                };
                return handler(args, ctx);
            }
        }
        CommandResult::NotACommand
    }

    pub fn list_commands(&self) -> Vec<&str> {
        self.commands.iter().map(|(p, _)| p.as_str()).collect()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a registry with every built-in command
pub fn create_registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();

    // Library
    registry.register("songs", library::cmd_songs);
    registry.register("load", library::cmd_load);
    registry.register("rescan", library::cmd_rescan);
    registry.register("watch", library::cmd_watch);

    // Playback
    registry.register("play", playback::cmd_play);
    registry.register("stop", playback::cmd_stop);
    registry.register("speed", playback::cmd_speed);
    registry.register("seek", playback::cmd_seek);
    registry.register("status", playback::cmd_status);
    registry.register("playmode", playback::cmd_playmode);

    // General
    registry.register("mode", general::cmd_mode);
    registry.register("save", general::cmd_save);
    registry.register("keys", general::cmd_keys);
    registry.register("help", general::cmd_help);
    registry.register("quit", general::cmd_quit);
    registry.register("exit", general::cmd_quit);

    registry
}
