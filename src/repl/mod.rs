//! Interactive terminal front end
//!
//! Line input runs on its own thread. The main loop selects over typed
//! commands, session events from the playback engine, and file-watcher
//! events for the songs directory.

use crate::commands::{create_registry, CommandContext, CommandRegistry, CommandResult};
use crate::engine::SessionEvent;
use crate::library::watcher::{self, FileWatcher};
use anyhow::{Context, Result};
use colored::*;
use crossbeam_channel::{unbounded, Receiver, Sender};
use notify::Event;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::thread;

/// Interactive session over a [`CommandContext`]
pub struct Repl {
    ctx: CommandContext,
    registry: CommandRegistry,
    session_events: Receiver<SessionEvent>,

    tx_watcher: Sender<notify::Result<Event>>,
    rx_watcher: Receiver<notify::Result<Event>>,
    watcher: Option<FileWatcher>,
}

impl Repl {
    pub fn new(ctx: CommandContext) -> Self {
        let session_events = ctx.controller.events();
        let (tx_watcher, rx_watcher) = unbounded();
        Self {
            ctx,
            registry: create_registry(),
            session_events,
            tx_watcher,
            rx_watcher,
            watcher: None,
        }
    }

    /// Start the REPL loop
    pub fn run(&mut self) -> Result<()> {
        let mut editor = DefaultEditor::new().context("failed to initialize line editor")?;

        println!(
            "{} {}",
            "🎹".bright_yellow(),
            "keyplay, song sheets to key presses".bright_cyan().bold()
        );
        println!(
            "{} songs in {}, game mode {}, backend {}",
            self.ctx.library.len(),
            self.ctx.library.dir().display(),
            self.ctx.game_mode.to_string().bright_green(),
            self.ctx.controller.backend_name()
        );
        println!(
            "Type '{}' for commands, '{}' or {} to exit.\n",
            "help".bright_green(),
            "quit".bright_red(),
            "Ctrl+C".bright_red()
        );

        let (tx_input, rx_input) = unbounded::<Result<String, ReadlineError>>();
        thread::spawn(move || loop {
            let prompt = format!("{} ", "keyplay>".bright_magenta().bold());
            match editor.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim().to_string();
                    if !line.is_empty() {
                        let _ = editor.add_history_entry(&line);
                    }
                    if tx_input.send(Ok(line)).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    let _ = tx_input.send(Err(err));
                    break;
                }
            }
        });

        let session_events = self.session_events.clone();
        let rx_watcher = self.rx_watcher.clone();

        loop {
            crossbeam_channel::select! {
                recv(rx_input) -> msg => match msg {
                    Ok(Ok(line)) => {
                        if line.is_empty() {
                            continue;
                        }
                        if !self.handle_line(&line) {
                            break;
                        }
                    }
                    Ok(Err(ReadlineError::Interrupted)) | Ok(Err(ReadlineError::Eof)) => {
                        println!("{} 🎹", "Goodbye!".bright_cyan());
                        break;
                    }
                    Ok(Err(err)) => {
                        println!(
                            "{} {}",
                            "Error reading input:".bright_red().bold(),
                            err.to_string().red()
                        );
                        break;
                    }
                    Err(_) => break,
                },

                recv(session_events) -> msg => match msg {
                    Ok(event) => self.handle_session_event(event),
                    Err(_) => break,
                },

                recv(rx_watcher) -> msg => match msg {
                    Ok(Ok(event)) => self.handle_watch_event(&event),
                    Ok(Err(e)) => println!("{} Watch error: {}", "Error:".red(), e),
                    Err(_) => break,
                }
            }
        }

        // Release anything still held before the process exits
        self.ctx.controller.stop();
        Ok(())
    }

    /// Run one command line. Returns false when the REPL should exit.
    fn handle_line(&mut self, line: &str) -> bool {
        match self.registry.execute(line, &mut self.ctx) {
            CommandResult::Success => {}
            CommandResult::Message(msg) => println!("{}", msg),
            CommandResult::Exit => {
                println!("{} 🎹", "Goodbye!".bright_cyan());
                return false;
            }
            CommandResult::Error(e) => println!("{} {}", "Error:".bright_red().bold(), e.red()),
            CommandResult::Watch => self.toggle_watch(),
            CommandResult::NotACommand => println!(
                "{} Unknown command '{}'. Type '{}' for a list.",
                "Error:".bright_red().bold(),
                line,
                "help".bright_green()
            ),
        }
        true
    }

    fn handle_session_event(&mut self, event: SessionEvent) {
        if !self.ctx.controller.on_event(&event) {
            return;
        }
        match event {
            SessionEvent::Ready { .. } => {
                tracing::debug!(session = event.session(), "first key dispatched");
                let name = self.ctx.loaded_song().map(|song| song.name.as_str());
                println!("{}", ready_line(name));
            }
            SessionEvent::Finished { .. } => {
                let name = self
                    .ctx
                    .loaded_song()
                    .map(|song| song.name.clone())
                    .unwrap_or_default();
                println!("{} Finished {}", "✓".bright_green(), name.bright_cyan());
                match self.ctx.advance() {
                    Some(Ok(message)) => println!("{}", format!("▶ {}", message).bright_green()),
                    Some(Err(e)) => println!("{} {}", "Error:".bright_red().bold(), e.to_string().red()),
                    None => {}
                }
            }
        }
    }

    fn handle_watch_event(&mut self, event: &Event) {
        if !watcher::affects_songs(event) {
            return;
        }
        match self.ctx.rescan() {
            Ok(count) => {
                println!(
                    "{} Songs changed, {} available",
                    "⚡".bright_yellow(),
                    count
                );
            }
            Err(e) => println!("{} Rescan failed: {}", "Error:".red(), e),
        }
    }

    fn toggle_watch(&mut self) {
        let dir = self.ctx.library.dir().to_path_buf();

        if self.ctx.watching {
            if let Some(w) = &mut self.watcher {
                if let Err(e) = w.unwatch(&dir) {
                    println!("{} Failed to stop watching {}: {}", "Error:".red(), dir.display(), e);
                    return;
                }
            }
            self.ctx.watching = false;
            println!("Stopped watching {}", dir.display());
            return;
        }

        if self.watcher.is_none() {
            match FileWatcher::new(self.tx_watcher.clone()) {
                Ok(w) => self.watcher = Some(w),
                Err(e) => {
                    println!("{} Failed to create watcher: {}", "Error:".red(), e);
                    return;
                }
            }
        }

        if let Some(w) = &mut self.watcher {
            match w.watch(&dir) {
                Ok(()) => {
                    self.ctx.watching = true;
                    println!(
                        "{} Watching {} for changes...",
                        "👀".bright_cyan(),
                        dir.display().to_string().bright_green()
                    );
                }
                Err(e) => println!("{} Failed to watch {}: {}", "Error:".red(), dir.display(), e),
            }
        }
    }
}

/// Cue printed when the first key of a session goes out
fn ready_line(song: Option<&str>) -> String {
    match song {
        Some(name) => format!("{} Now playing {}", "♪".bright_green(), name.bright_cyan()),
        None => format!("{} Now playing", "♪".bright_green()),
    }
}
