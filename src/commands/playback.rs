//! Playback commands (play, stop, speed, seek, status, playmode)

use crate::commands::library::format_ms;
use crate::commands::{CommandContext, CommandResult};
use crate::playlist::PlaybackMode;
use colored::*;
use keyplay_core::PlaybackSpeed;

/// Handle `play [n|name]` command
pub fn cmd_play(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let index = if args.is_empty() {
        match ctx.loaded {
            Some(index) => index,
            None => {
                return CommandResult::Error(
                    "No song loaded. Use 'play <number|name>' or 'load' first".to_string(),
                )
            }
        }
    } else {
        match ctx.select(args) {
            Ok(index) => index,
            Err(e) => return CommandResult::Error(e.to_string()),
        }
    };

    match ctx.play_index(index) {
        Ok(message) => CommandResult::Message(format!("▶ {}", message).bright_green().to_string()),
        Err(e) => CommandResult::Error(e.to_string()),
    }
}

/// Handle `stop` command
pub fn cmd_stop(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    let was_playing = ctx.controller.is_playing();
    ctx.controller.stop();
    if was_playing {
        CommandResult::Message("⏹ Stopped".to_string())
    } else {
        CommandResult::Message("Nothing is playing".to_string())
    }
}

/// Handle `speed [x]` command
pub fn cmd_speed(args: &str, ctx: &mut CommandContext) -> CommandResult {
    if args.is_empty() {
        return CommandResult::Message(format!("Current speed: {}", ctx.controller.speed()));
    }

    let requested = match args.trim_end_matches('x').parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => value,
        _ => return CommandResult::Error("Invalid speed. Use a number such as 0.75 or 1.5".to_string()),
    };

    match ctx.controller.set_speed(requested) {
        Ok(restarted) => {
            let speed = ctx.controller.speed();
            let mut message = format!("Speed set to {}", speed);
            if PlaybackSpeed::is_clamped(requested) {
                message.push_str(&format!(
                    " (limited to {}x-{}x)",
                    PlaybackSpeed::MIN,
                    PlaybackSpeed::MAX
                ));
            }
            if !restarted {
                message.push_str(", applies to the next song");
            }
            CommandResult::Message(message.bright_green().to_string())
        }
        Err(e) => CommandResult::Error(e.to_string()),
    }
}

/// Handle `seek <ms|m:ss>` command
pub fn cmd_seek(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let Some(time_ms) = parse_song_time(args) else {
        return CommandResult::Error("Usage: seek <milliseconds|m:ss>".to_string());
    };

    match ctx.controller.seek(time_ms as f64) {
        Ok(true) => CommandResult::Message(format!("⏩ Jumped to {}", format_ms(time_ms))),
        Ok(false) => CommandResult::Error("Nothing is playing".to_string()),
        Err(e) => CommandResult::Error(e.to_string()),
    }
}

/// Handle `status` command
pub fn cmd_status(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    let mut lines = Vec::new();

    let state = if ctx.controller.is_playing() {
        "playing".bright_green()
    } else {
        "idle".yellow()
    };
    lines.push(format!("State:     {}", state));

    match ctx.loaded_song() {
        Some(song) => {
            let position = ctx
                .controller
                .position_ms()
                .filter(|_| ctx.controller.is_playing())
                .map(|ms| format!("{} / ", format_ms(ms as u64)))
                .unwrap_or_default();
            lines.push(format!(
                "Song:      {} [{}{}]",
                song.name.bright_cyan(),
                position,
                format_ms(song.duration_ms())
            ));
        }
        None => lines.push("Song:      (none loaded)".to_string()),
    }

    if let Some(elapsed) = ctx.controller.playing_for() {
        lines.push(format!(
            "Playing:   {}",
            format_ms(elapsed.as_millis() as u64)
        ));
    } else if ctx.controller.is_playing() {
        lines.push("Playing:   waiting for lead-in".to_string());
    }
    lines.push(format!("Game mode: {}", ctx.game_mode));
    lines.push(format!("Speed:     {}", ctx.controller.speed()));
    lines.push(format!("Playlist:  {}", ctx.playback_mode));
    lines.push(format!("Backend:   {}", ctx.controller.backend_name()));
    lines.push(format!(
        "Watching:  {}",
        if ctx.watching { "yes" } else { "no" }
    ));

    CommandResult::Message(lines.join("\n"))
}

/// Handle `playmode [once|sequence|shuffle|repeat-one]` command
pub fn cmd_playmode(args: &str, ctx: &mut CommandContext) -> CommandResult {
    if args.is_empty() {
        let modes: Vec<&str> = PlaybackMode::ALL.iter().map(|m| m.name()).collect();
        return CommandResult::Message(format!(
            "Playlist mode: {} (available: {})",
            ctx.playback_mode,
            modes.join(", ")
        ));
    }
    match args.parse::<PlaybackMode>() {
        Ok(mode) => {
            ctx.playback_mode = mode;
            CommandResult::Message(format!("Playlist mode set to {}", mode))
        }
        Err(e) => CommandResult::Error(e),
    }
}

/// Parse `1500`, `1:05` or `1:05.250` into milliseconds
pub fn parse_song_time(input: &str) -> Option<u64> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    match input.split_once(':') {
        None => input.parse::<u64>().ok(),
        Some((minutes, seconds)) => {
            let minutes: u64 = minutes.parse().ok()?;
            let seconds: f64 = seconds.parse().ok()?;
            if !(0.0..60.0).contains(&seconds) {
                return None;
            }
            minutes
                .checked_mul(60_000)?
                .checked_add((seconds * 1000.0).round() as u64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::*;
    use crate::input::KeyRecorder;
    use keyplay_core::ScanCode;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn test_parse_song_time() {
        assert_eq!(parse_song_time("1500"), Some(1500));
        assert_eq!(parse_song_time("1:05"), Some(65_000));
        assert_eq!(parse_song_time("0:01.25"), Some(1250));
        assert_eq!(parse_song_time("1:75"), None);
        assert_eq!(parse_song_time("abc"), None);
        assert_eq!(parse_song_time("999999999999999999:00"), None);
        assert_eq!(parse_song_time("-1:00"), None);
        assert_eq!(parse_song_time(""), None);
    }

    #[test]
    fn test_play_without_loaded_song() {
        let dir = tempdir().unwrap();
        write_song(dir.path(), "a.txt", "Alpha", &[(0, "1Key0")]);
        let mut ctx = context(dir.path(), &KeyRecorder::new());
        assert!(matches!(cmd_play("", &mut ctx), CommandResult::Error(_)));
    }

    #[test]
    fn test_play_by_name_dispatches_keys() {
        let dir = tempdir().unwrap();
        write_song(dir.path(), "a.txt", "Alpha", &[(0, "1Key0"), (20, "1Key5")]);
        let recorder = KeyRecorder::new();
        let mut ctx = context(dir.path(), &recorder);

        assert!(matches!(cmd_play("alpha", &mut ctx), CommandResult::Message(_)));
        assert_eq!(ctx.loaded, Some(0));

        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while recorder.pressed().len() < 2 && std::time::Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(
            recorder.pressed(),
            vec![ScanCode::new(0x15), ScanCode::new(0x23)]
        );
        ctx.controller.stop();
    }

    #[test]
    fn test_speed_while_idle_is_stored() {
        let dir = tempdir().unwrap();
        let mut ctx = context(dir.path(), &KeyRecorder::new());

        assert!(matches!(cmd_speed("1.5x", &mut ctx), CommandResult::Message(_)));
        assert_eq!(ctx.controller.speed().get(), 1.5);
        assert!(matches!(cmd_speed("5", &mut ctx), CommandResult::Message(_)));
        assert_eq!(ctx.controller.speed().get(), 2.0);
        assert!(matches!(cmd_speed("-1", &mut ctx), CommandResult::Error(_)));
        assert!(matches!(cmd_speed("fast", &mut ctx), CommandResult::Error(_)));
    }

    #[test]
    fn test_seek_and_stop_while_idle() {
        let dir = tempdir().unwrap();
        let mut ctx = context(dir.path(), &KeyRecorder::new());
        assert!(matches!(cmd_seek("0:30", &mut ctx), CommandResult::Error(_)));
        assert!(matches!(cmd_seek("", &mut ctx), CommandResult::Error(_)));
        assert!(matches!(cmd_stop("", &mut ctx), CommandResult::Message(_)));
    }

    #[test]
    fn test_status_reports_elapsed_after_first_key() {
        let dir = tempdir().unwrap();
        write_song(dir.path(), "a.txt", "Alpha", &[(0, "1Key0"), (2_000, "1Key1")]);
        let mut ctx = context(dir.path(), &KeyRecorder::new());

        let idle = match cmd_status("", &mut ctx) {
            CommandResult::Message(text) => text,
            other => panic!("unexpected {:?}", other),
        };
        assert!(!idle.contains("Playing:"));

        cmd_play("alpha", &mut ctx);
        let events = ctx.controller.events();
        let ready = events.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(ctx.controller.on_event(&ready));

        match cmd_status("", &mut ctx) {
            CommandResult::Message(text) => assert!(text.contains("Playing:   0:0")),
            other => panic!("unexpected {:?}", other),
        }
        ctx.controller.stop();
    }

    #[test]
    fn test_playmode() {
        let dir = tempdir().unwrap();
        let mut ctx = context(dir.path(), &KeyRecorder::new());
        assert!(matches!(cmd_playmode("shuffle", &mut ctx), CommandResult::Message(_)));
        assert_eq!(ctx.playback_mode, PlaybackMode::Shuffle);
        assert!(matches!(cmd_playmode("bogus", &mut ctx), CommandResult::Error(_)));
    }
}
