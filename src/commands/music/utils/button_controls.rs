use serenity::all::{ButtonStyle, CreateActionRow, CreateButton, ReactionType};

use super::playlist_store::Slot;
use crate::commands::music::audio_sources::{Track, track_metadata::truncate_chars};

/// Prefix of every component handled by the global dispatcher
pub const CONTROL_PREFIX: &str = "music_";
/// Prefix of one-shot prompt buttons, consumed by collectors instead
pub const PROMPT_PREFIX: &str = "prompt_";

pub const PROMPT_PLAY_NOW: &str = "prompt_play_now";
pub const PROMPT_QUEUE: &str = "prompt_queue";
pub const PROMPT_RENAME_YES: &str = "prompt_rename_yes";
pub const PROMPT_RENAME_NO: &str = "prompt_rename_no";
const PROMPT_SLOT: &str = "prompt_slot_";
const PROMPT_SONG: &str = "prompt_song_";

/// Discord's limit on button label length
const MAX_LABEL_CHARS: usize = 80;

/// Every persistent control the bot renders, each mapped to one behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Search,
    Pause,
    Resume,
    Stop,
    Skip,
    VolumeUp,
    VolumeDown,
    AddToPlaylist,
    OpenPlaylist(Slot),
}

impl Control {
    pub fn custom_id(self) -> String {
        let suffix = match self {
            Control::Search => "search",
            Control::Pause => "pause",
            Control::Resume => "resume",
            Control::Stop => "stop",
            Control::Skip => "skip",
            Control::VolumeUp => "volume_up",
            Control::VolumeDown => "volume_down",
            Control::AddToPlaylist => "add_to_playlist",
            Control::OpenPlaylist(slot) => return format!("{CONTROL_PREFIX}open_{}", slot.key()),
        };
        format!("{CONTROL_PREFIX}{suffix}")
    }

    pub fn from_custom_id(custom_id: &str) -> Option<Self> {
        let control = match custom_id.strip_prefix(CONTROL_PREFIX)? {
            "search" => Control::Search,
            "pause" => Control::Pause,
            "resume" => Control::Resume,
            "stop" => Control::Stop,
            "skip" => Control::Skip,
            "volume_up" => Control::VolumeUp,
            "volume_down" => Control::VolumeDown,
            "add_to_playlist" => Control::AddToPlaylist,
            other => Control::OpenPlaylist(Slot::from_key(other.strip_prefix("open_")?)?),
        };
        Some(control)
    }

    fn emoji(self) -> &'static str {
        match self {
            Control::Search => "🔍",
            Control::Pause => "⏸️",
            Control::Resume => "▶️",
            Control::Stop => "⏹️",
            Control::Skip => "⏭️",
            Control::VolumeUp => "🔊",
            Control::VolumeDown => "🔉",
            Control::AddToPlaylist => "➕",
            Control::OpenPlaylist(_) => "🎵",
        }
    }

    fn style(self) -> ButtonStyle {
        match self {
            Control::Search | Control::Pause | Control::OpenPlaylist(_) => ButtonStyle::Primary,
            Control::Resume | Control::AddToPlaylist => ButtonStyle::Success,
            Control::Stop => ButtonStyle::Danger,
            Control::Skip | Control::VolumeUp | Control::VolumeDown => ButtonStyle::Secondary,
        }
    }

    fn default_label(self) -> &'static str {
        match self {
            Control::Search => "Search Song",
            Control::Pause => "Pause",
            Control::Resume => "Resume",
            Control::Stop => "Stop",
            Control::Skip => "Skip",
            Control::VolumeUp => "Volume +",
            Control::VolumeDown => "Volume -",
            Control::AddToPlaylist => "Add to Playlist",
            Control::OpenPlaylist(_) => "Playlist",
        }
    }

    /// Render the control as a button, optionally overriding its label
    pub fn button(self, label: Option<&str>) -> CreateButton {
        CreateButton::new(self.custom_id())
            .emoji(ReactionType::Unicode(self.emoji().to_string()))
            .style(self.style())
            .label(truncate_chars(
                label.unwrap_or(self.default_label()),
                MAX_LABEL_CHARS,
            ))
    }
}

/// Main control surface: search, playback and one button per playlist
pub fn main_controls(playlist_names: &[(Slot, String)]) -> Vec<CreateActionRow> {
    let playback = [
        Control::Search,
        Control::Pause,
        Control::Resume,
        Control::Stop,
        Control::Skip,
    ]
    .into_iter()
    .map(|control| control.button(None))
    .collect();

    let playlists = playlist_names
        .iter()
        .map(|(slot, name)| Control::OpenPlaylist(*slot).button(Some(name)))
        .collect();

    vec![
        CreateActionRow::Buttons(playback),
        CreateActionRow::Buttons(playlists),
    ]
}

/// Controls attached to a "now playing" message
pub fn now_playing_controls() -> Vec<CreateActionRow> {
    let row = |controls: &[Control]| {
        CreateActionRow::Buttons(controls.iter().map(|c| c.button(None)).collect())
    };

    vec![
        row(&[
            Control::Pause,
            Control::Resume,
            Control::Stop,
            Control::Skip,
            Control::VolumeUp,
        ]),
        row(&[Control::VolumeDown, Control::AddToPlaylist]),
    ]
}

/// "Play now or add to queue?" choice
pub fn play_now_or_queue_buttons() -> Vec<CreateActionRow> {
    vec![CreateActionRow::Buttons(vec![
        CreateButton::new(PROMPT_PLAY_NOW)
            .style(ButtonStyle::Primary)
            .label("Play Now"),
        CreateButton::new(PROMPT_QUEUE)
            .style(ButtonStyle::Secondary)
            .label("Add to Queue"),
    ])]
}

/// "Rename the playlist?" choice
pub fn rename_prompt_buttons() -> Vec<CreateActionRow> {
    vec![CreateActionRow::Buttons(vec![
        CreateButton::new(PROMPT_RENAME_YES)
            .style(ButtonStyle::Success)
            .label("Yes"),
        CreateButton::new(PROMPT_RENAME_NO)
            .style(ButtonStyle::Danger)
            .label("No"),
    ])]
}

/// One button per playlist slot, used to pick a destination playlist
pub fn playlist_picker(playlist_names: &[(Slot, String)]) -> Vec<CreateActionRow> {
    let buttons = playlist_names
        .iter()
        .map(|(slot, name)| {
            CreateButton::new(format!("{PROMPT_SLOT}{}", slot.key()))
                .emoji(ReactionType::Unicode("🎵".to_string()))
                .style(ButtonStyle::Primary)
                .label(truncate_chars(name, MAX_LABEL_CHARS))
        })
        .collect();

    vec![CreateActionRow::Buttons(buttons)]
}

pub fn slot_from_prompt(custom_id: &str) -> Option<Slot> {
    Slot::from_key(custom_id.strip_prefix(PROMPT_SLOT)?)
}

/// One button per song, five to a row
pub fn playlist_song_buttons(songs: &[Track]) -> Vec<CreateActionRow> {
    songs
        .chunks(5)
        .enumerate()
        .map(|(row, chunk)| {
            let buttons = chunk
                .iter()
                .enumerate()
                .map(|(i, song)| {
                    CreateButton::new(format!("{PROMPT_SONG}{}", row * 5 + i))
                        .style(ButtonStyle::Secondary)
                        .label(song.short_title(MAX_LABEL_CHARS))
                })
                .collect();
            CreateActionRow::Buttons(buttons)
        })
        .collect()
}

pub fn song_index_from_prompt(custom_id: &str) -> Option<usize> {
    custom_id.strip_prefix(PROMPT_SONG)?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case(Control::Search, "music_search")]
    #[test_case(Control::VolumeDown, "music_volume_down")]
    #[test_case(Control::AddToPlaylist, "music_add_to_playlist")]
    #[test_case(Control::OpenPlaylist(Slot::Playlist2), "music_open_playlist2")]
    fn test_custom_ids(control: Control, expected: &str) {
        assert_eq!(control.custom_id(), expected);
        assert_eq!(Control::from_custom_id(expected), Some(control));
    }

    #[test_case("prompt_play_now" ; "prompt ids are not controls")]
    #[test_case("music_open_playlist9" ; "unknown slot")]
    #[test_case("music_dance" ; "unknown control")]
    #[test_case("search" ; "missing prefix")]
    fn test_unknown_custom_ids(custom_id: &str) {
        assert_eq!(Control::from_custom_id(custom_id), None);
    }

    #[test]
    fn test_every_control_id_is_unique() {
        let controls = [
            Control::Search,
            Control::Pause,
            Control::Resume,
            Control::Stop,
            Control::Skip,
            Control::VolumeUp,
            Control::VolumeDown,
            Control::AddToPlaylist,
            Control::OpenPlaylist(Slot::Playlist1),
            Control::OpenPlaylist(Slot::Playlist2),
            Control::OpenPlaylist(Slot::Playlist3),
        ];
        let mut ids: Vec<String> = controls.iter().map(|c| c.custom_id()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), controls.len());
    }

    #[test]
    fn test_prompt_ids() {
        assert_eq!(slot_from_prompt("prompt_slot_playlist3"), Some(Slot::Playlist3));
        assert_eq!(slot_from_prompt("prompt_song_3"), None);
        assert_eq!(song_index_from_prompt("prompt_song_7"), Some(7));
        assert_eq!(song_index_from_prompt("prompt_song_x"), None);
    }

    #[test]
    fn test_song_rows_hold_five_buttons() {
        let songs: Vec<Track> = (0..10)
            .map(|i| Track::new(format!("Song {}", i), format!("https://youtu.be/{}", i)))
            .collect();
        assert_eq!(playlist_song_buttons(&songs).len(), 2);
        assert_eq!(playlist_song_buttons(&songs[..3]).len(), 1);
        assert!(playlist_song_buttons(&[]).is_empty());
    }

    #[test]
    fn test_long_playlist_names_fit_in_labels() {
        let name = "y".repeat(100);
        let button = Control::OpenPlaylist(Slot::Playlist1).button(Some(&name));

        let json = serde_json::to_value(&button).unwrap();
        let label = json["label"].as_str().unwrap();
        assert_eq!(label.chars().count(), MAX_LABEL_CHARS);
        assert!(label.ends_with('…'));
    }
}
