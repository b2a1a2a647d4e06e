use dashmap::DashMap;
use poise::serenity_prelude as serenity;

use crate::commands::music::audio_sources::Track;

/// The track each live "now playing" panel was posted for, keyed by message.
///
/// Buttons on a panel act on that panel's track, not on whatever the guild
/// happens to be playing when the button is pressed.
#[derive(Debug, Default)]
pub struct NowPlayingPanels {
    panels: DashMap<serenity::MessageId, Track>,
}

impl NowPlayingPanels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remember(&self, message_id: serenity::MessageId, track: Track) {
        self.panels.insert(message_id, track);
    }

    /// Track shown on the panel, or `None` once the panel has been retired
    pub fn track(&self, message_id: serenity::MessageId) -> Option<Track> {
        self.panels.get(&message_id).map(|entry| entry.value().clone())
    }

    pub fn forget(&self, message_id: serenity::MessageId) {
        self.panels.remove(&message_id);
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn message(id: u64) -> serenity::MessageId {
        serenity::MessageId::new(id)
    }

    #[test]
    fn test_each_panel_keeps_its_own_track() {
        let panels = NowPlayingPanels::new();
        let first = Track::new("First", "https://www.youtube.com/watch?v=first");
        let second = Track::new("Second", "https://www.youtube.com/watch?v=second");

        panels.remember(message(1), first.clone());
        panels.remember(message(2), second.clone());

        assert_eq!(panels.track(message(1)), Some(first));
        assert_eq!(panels.track(message(2)), Some(second));
        assert_eq!(panels.len(), 2);
    }

    #[test]
    fn test_retired_panel_has_no_track() {
        let panels = NowPlayingPanels::new();
        panels.remember(message(7), Track::new("Song", "https://youtu.be/x"));

        panels.forget(message(7));

        assert_eq!(panels.track(message(7)), None);
        assert!(panels.is_empty());
    }

    #[test]
    fn test_unknown_panel_has_no_track() {
        let panels = NowPlayingPanels::new();
        assert_eq!(panels.track(message(42)), None);
    }
}
