use crate::library::is_song_file;
use crossbeam_channel::Sender;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;

/// Watches the songs directory on notify's background thread and forwards
/// raw events to a channel.
pub struct FileWatcher {
    watcher: RecommendedWatcher,
}

impl FileWatcher {
    pub fn new(tx: Sender<notify::Result<Event>>) -> notify::Result<Self> {
        let watcher = notify::recommended_watcher(move |res| {
            // Receiver gone means the REPL is shutting down
            let _ = tx.send(res);
        })?;

        Ok(Self { watcher })
    }

    pub fn watch<P: AsRef<Path>>(&mut self, dir: P) -> notify::Result<()> {
        self.watcher.watch(dir.as_ref(), RecursiveMode::NonRecursive)
    }

    pub fn unwatch<P: AsRef<Path>>(&mut self, dir: P) -> notify::Result<()> {
        self.watcher.unwatch(dir.as_ref())
    }
}

/// True when `event` adds, changes or removes a song file
pub fn affects_songs(event: &Event) -> bool {
    matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    ) && event.paths.iter().any(|path| is_song_file(path))
}
