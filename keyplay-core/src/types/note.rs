//! Note events as handed over by song loaders

/// One key press to simulate: a song-relative timestamp and a logical key id
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NoteEvent {
    /// Milliseconds from the start of the song
    pub time: u64,
    /// Profile-independent key id, e.g. `1Key7`
    pub key: String,
}

impl NoteEvent {
    pub fn new(time: u64, key: impl Into<String>) -> Self {
        Self {
            time,
            key: key.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_event_new() {
        let note = NoteEvent::new(250, "1Key3");
        assert_eq!(note.time, 250);
        assert_eq!(note.key, "1Key3");
    }
}
