//! General REPL commands (mode, keys, save, help, quit)

use crate::commands::{CommandContext, CommandResult};
use colored::*;
use keyplay_core::{GameMode, KeyMapRegistry};

/// Handle `help` command
pub fn cmd_help(_args: &str, _ctx: &mut CommandContext) -> CommandResult {
    print_help();
    CommandResult::Success
}

/// Handle `quit` or `exit` command
pub fn cmd_quit(_args: &str, _ctx: &mut CommandContext) -> CommandResult {
    CommandResult::Exit
}

/// Handle `mode [sky|genshin]` command
pub fn cmd_mode(args: &str, ctx: &mut CommandContext) -> CommandResult {
    if args.is_empty() {
        let modes: Vec<&str> = GameMode::ALL.iter().map(|m| m.name()).collect();
        return CommandResult::Message(format!(
            "Game mode: {} (available: {})",
            ctx.game_mode,
            modes.join(", ")
        ));
    }

    match GameMode::parse(args) {
        Some(mode) => {
            ctx.game_mode = mode;
            let mut message = format!("🎮 Game mode set to {}", mode)
                .bright_green()
                .to_string();
            if ctx.controller.is_playing() {
                message.push_str("\nTakes effect on the next 'play'");
            }
            CommandResult::Message(message)
        }
        None => CommandResult::Error(format!("Unknown game mode '{}'", args)),
    }
}

/// Handle `save` command: persist game mode, speed and playlist mode
pub fn cmd_save(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    match ctx.save_settings() {
        Ok(path) => CommandResult::Message(format!("Settings saved to {}", path.display())),
        Err(e) => CommandResult::Error(e.to_string()),
    }
}

/// Handle `keys` command: show the key layout of the current game mode
pub fn cmd_keys(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    let profile = KeyMapRegistry::global().profile(ctx.game_mode);
    let mut output = format!(
        "{} keys ({}, hold {} ms):\n",
        ctx.game_mode.to_string().bold(),
        profile.key_count(),
        profile.hold.as_millis()
    );
    for (key, code) in profile.keys() {
        output.push_str(&format!("  {:<8} {}\n", key.cyan(), code));
    }
    CommandResult::Message(output.trim_end().to_string())
}

/// Print help information
fn print_help() {
    println!("{}", "🎹 keyplay Help".bold());
    println!("{}", "===============".bold());
    println!();
    println!("{}", "Library:".green());
    println!("  {}                 - List songs in the songs directory", "songs".cyan());
    println!("  {}  - Select a song by list number or name", "load <n|name>".cyan());
    println!("  {}                - Reload the songs directory", "rescan".cyan());
    println!("  {}                 - Toggle reloading when song files change", "watch".cyan());
    println!();
    println!("{}", "Playback:".green());
    println!("  {}  - Play a song (or the loaded one)", "play [n|name]".cyan());
    println!("  {}                  - Stop playback and release keys", "stop".cyan());
    println!("  {}             - Show or set speed (0.5 to 2.0)", "speed [x]".cyan());
    println!("  {}      - Jump to a position in the current song", "seek <ms|m:ss>".cyan());
    println!("  {}                - Show what is playing", "status".cyan());
    println!(
        "  {} - Set what plays next: once, sequence, shuffle, repeat-one",
        "playmode [mode]".cyan()
    );
    println!();
    println!("{}", "Game:".green());
    println!("  {}           - Show or set the key profile (sky, genshin)", "mode [name]".cyan());
    println!("  {}                  - Show the key layout", "keys".cyan());
    println!("  {}                  - Save mode, speed and playlist mode", "save".cyan());
    println!();
    println!("{}", "Other:".green());
    println!("  {}                  - Show this help", "help".cyan());
    println!("  {}           - Exit", "quit, exit".cyan());
}
