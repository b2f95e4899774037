//! Library commands (songs, load, rescan, watch)

use crate::commands::{CommandContext, CommandResult};
use colored::*;

/// Handle `songs` command
pub fn cmd_songs(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    if ctx.library.is_empty() {
        return CommandResult::Message(format!(
            "No songs in {}",
            ctx.library.dir().display()
        ));
    }

    let mut output = format!(
        "{} ({}):\n",
        "Songs".bold(),
        ctx.library.dir().display()
    );
    for (index, song) in ctx.library.songs().iter().enumerate() {
        let marker = if ctx.loaded == Some(index) { "▶" } else { " " };
        output.push_str(&format!(
            "{} {:>3}. {}",
            marker.bright_green(),
            index + 1,
            song.name.bright_cyan()
        ));
        if let Some(author) = &song.author {
            output.push_str(&format!(" - {}", author));
        }
        output.push_str(&format!(
            " {}\n",
            format!("({} notes, {})", song.notes.len(), format_ms(song.duration_ms())).dimmed()
        ));
    }
    for (path, reason) in ctx.library.skipped() {
        output.push_str(&format!(
            "  {} {}: {}\n",
            "skipped".yellow(),
            path.display(),
            reason
        ));
    }
    CommandResult::Message(output.trim_end().to_string())
}

/// Handle `load <n|name>` command
pub fn cmd_load(args: &str, ctx: &mut CommandContext) -> CommandResult {
    if args.is_empty() {
        return CommandResult::Error("Usage: load <number|name>".to_string());
    }
    match ctx.select(args) {
        Ok(index) => {
            ctx.loaded = Some(index);
            let name = ctx.library.songs()[index].name.clone();
            CommandResult::Message(format!("Loaded {}", name.bright_cyan()))
        }
        Err(e) => CommandResult::Error(e.to_string()),
    }
}

/// Handle `rescan` command
pub fn cmd_rescan(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    match ctx.rescan() {
        Ok(count) => CommandResult::Message(format!("Found {} songs", count)),
        Err(e) => CommandResult::Error(e.to_string()),
    }
}

/// Handle `watch` command
pub fn cmd_watch(_args: &str, _ctx: &mut CommandContext) -> CommandResult {
    CommandResult::Watch
}

/// Format a song time as `m:ss`
pub fn format_ms(ms: u64) -> String {
    let secs = ms / 1000;
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::*;
    use crate::input::KeyRecorder;
    use tempfile::tempdir;

    #[test]
    fn test_format_ms() {
        assert_eq!(format_ms(0), "0:00");
        assert_eq!(format_ms(61_500), "1:01");
        assert_eq!(format_ms(600_000), "10:00");
    }

    #[test]
    fn test_load_by_name_and_number() {
        let dir = tempdir().unwrap();
        write_song(dir.path(), "a.txt", "Alpha", &[(0, "1Key0")]);
        write_song(dir.path(), "b.txt", "Beta", &[(0, "1Key1")]);
        let mut ctx = context(dir.path(), &KeyRecorder::new());

        assert!(matches!(cmd_load("beta", &mut ctx), CommandResult::Message(_)));
        assert_eq!(ctx.loaded, Some(1));
        assert!(matches!(cmd_load("1", &mut ctx), CommandResult::Message(_)));
        assert_eq!(ctx.loaded, Some(0));
        assert!(matches!(cmd_load("gamma", &mut ctx), CommandResult::Error(_)));
        assert!(matches!(cmd_load("", &mut ctx), CommandResult::Error(_)));
    }

    #[test]
    fn test_rescan_keeps_selection() {
        let dir = tempdir().unwrap();
        write_song(dir.path(), "b.txt", "Beta", &[(0, "1Key1")]);
        let mut ctx = context(dir.path(), &KeyRecorder::new());
        cmd_load("beta", &mut ctx);
        assert_eq!(ctx.loaded, Some(0));

        write_song(dir.path(), "a.txt", "Alpha", &[(0, "1Key0")]);
        assert!(matches!(cmd_rescan("", &mut ctx), CommandResult::Message(_)));
        assert_eq!(ctx.loaded, Some(1));
    }

    #[test]
    fn test_songs_lists_library() {
        let dir = tempdir().unwrap();
        write_song(dir.path(), "a.txt", "Alpha", &[(0, "1Key0"), (65_000, "1Key1")]);
        let mut ctx = context(dir.path(), &KeyRecorder::new());
        match cmd_songs("", &mut ctx) {
            CommandResult::Message(text) => {
                assert!(text.contains("Alpha"));
                assert!(text.contains("1:05"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
