//! Defines `Track`, the resolved song reference shared by the queue, the
//! now-playing slot and the persisted playlists.

use serde::{Deserialize, Serialize};

/// A playable song: display title plus the page URL handed to yt-dlp.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Track {
    /// The title of the track.
    pub title: String,
    /// The YouTube watch URL for the track.
    pub url: String,
}

impl Track {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }

    /// Title cut down to fit a button label (Discord caps labels at 80 characters).
    pub fn short_title(&self, max_chars: usize) -> String {
        truncate_chars(&self.title, max_chars)
    }
}

/// Cut `text` to at most `max_chars` characters, marking the cut with '…'
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut short: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    short.push('…');
    short
}
