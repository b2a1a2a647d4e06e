use poise::serenity_prelude as serenity;
use serenity::all::{ChannelId, CreateEmbed, CreateMessage, EditMessage, Http, Message};
use std::fmt::Display;
use std::sync::Arc;
use tracing::{debug, warn};

use super::{
    PANEL_TIMEOUT,
    button_controls::{main_controls, now_playing_controls},
    music_manager::SkippedTrack,
    now_playing_panels::NowPlayingPanels,
    playlist_store::{MAX_SONGS_PER_PLAYLIST, Playlist, PlaylistStore, Slot},
};
use crate::{Error, commands::music::audio_sources::Track};

const SUCCESS: u32 = 0x00ff00;
const FAILURE: u32 = 0xff0000;

/// Entries listed in one embed before the rest are summarized.
/// Keeps descriptions under Discord's 4096 character limit.
const MAX_QUEUE_LINES: usize = 15;
const MAX_SKIPPED_LINES: usize = 10;

fn link(track: &Track) -> String {
    format!("[{}]({})", track.title, track.url)
}

fn and_more(total: usize, shown: usize) -> Option<String> {
    (total > shown).then(|| format!("…and {} more", total - shown))
}

fn percent(volume: f32) -> String {
    format!("{}%", (volume * 100.0).round() as u32)
}

/// Create an error embed
pub fn error(message: impl Display) -> CreateEmbed {
    CreateEmbed::new()
        .title("❌ Error")
        .description(message.to_string())
        .color(FAILURE)
}

/// Create an embed for when a song is now playing
pub fn now_playing(track: &Track, volume: f32) -> CreateEmbed {
    CreateEmbed::new()
        .title("🎵 Now Playing")
        .description(link(track))
        .field("Volume", format!("`{}`", percent(volume)), true)
        .color(SUCCESS)
}

/// Create an embed for when a song is added to the queue
pub fn added_to_queue(track: &Track, position: usize) -> CreateEmbed {
    CreateEmbed::new()
        .title("🎵 Added to Queue")
        .description(link(track))
        .field("Position", format!("`#{}`", position), true)
        .color(SUCCESS)
}

pub fn paused(track: &Track) -> CreateEmbed {
    CreateEmbed::new()
        .title("⏸️ Paused")
        .description(format!("Paused {}", link(track)))
        .color(SUCCESS)
}

pub fn resumed(track: &Track) -> CreateEmbed {
    CreateEmbed::new()
        .title("▶️ Resumed")
        .description(format!("Resumed {}", link(track)))
        .color(SUCCESS)
}

pub fn stopped() -> CreateEmbed {
    CreateEmbed::new()
        .title("⏹️ Stopped")
        .description("Playback stopped and queue cleared")
        .color(SUCCESS)
}

pub fn skipped(track: &Track) -> CreateEmbed {
    CreateEmbed::new()
        .title("⏭️ Skipped")
        .description(format!("Skipped {}", link(track)))
        .color(SUCCESS)
}

pub fn volume_changed(volume: f32) -> CreateEmbed {
    CreateEmbed::new()
        .title("🔊 Volume")
        .description(format!("Volume set to `{}`", percent(volume)))
        .color(SUCCESS)
}

/// Create an embed for the music queue
pub fn music_queue(current: Option<&Track>, queue: &[Track]) -> CreateEmbed {
    let mut description = String::new();

    match current {
        Some(track) => {
            description.push_str("**🎵 Now Playing**\n");
            description.push_str(&format!("**{}**\n\n", link(track)));
        }
        None => description.push_str("**🔇 Nothing playing**\n\n"),
    }

    if queue.is_empty() {
        description.push_str("**📭 Queue is empty**");
    } else {
        description.push_str(&format!("**📋 Queue - {} tracks**\n", queue.len()));
        for (index, track) in queue.iter().take(MAX_QUEUE_LINES).enumerate() {
            description.push_str(&format!("`{}.` {}\n", index + 1, link(track)));
        }
        if let Some(more) = and_more(queue.len(), MAX_QUEUE_LINES) {
            description.push_str(&more);
        }
    }

    CreateEmbed::new()
        .title("🎵 Music Queue")
        .description(description)
        .color(SUCCESS)
}

/// List the songs of a playlist; the buttons underneath are numbered the same way
pub fn playlist_songs(playlist: &Playlist) -> CreateEmbed {
    let description = if playlist.songs.is_empty() {
        "This playlist is empty. Add the current song with ➕ on the player.".to_string()
    } else {
        playlist
            .songs
            .iter()
            .enumerate()
            .map(|(index, song)| format!("`{}.` {}", index + 1, link(song)))
            .collect::<Vec<_>>()
            .join("\n")
    };

    CreateEmbed::new()
        .title(format!("📜 {}", playlist.name))
        .description(description)
        .footer(serenity::CreateEmbedFooter::new(format!(
            "{}/{} songs",
            playlist.songs.len(),
            MAX_SONGS_PER_PLAYLIST
        )))
        .color(SUCCESS)
}

pub fn added_to_playlist(track: &Track, playlist: &Playlist) -> CreateEmbed {
    CreateEmbed::new()
        .title("➕ Added to Playlist")
        .description(format!("Added {} to **{}**", link(track), playlist.name))
        .field(
            "Songs",
            format!("`{}/{}`", playlist.songs.len(), MAX_SONGS_PER_PLAYLIST),
            true,
        )
        .color(SUCCESS)
}

pub fn playlist_renamed(old_name: &str, new_name: &str) -> CreateEmbed {
    CreateEmbed::new()
        .title("✏️ Playlist Renamed")
        .description(format!("**{}** is now called **{}**", old_name, new_name))
        .color(SUCCESS)
}

/// Ask the user which playlist should receive `track`
pub fn choose_playlist(track: &Track) -> CreateEmbed {
    CreateEmbed::new()
        .title("➕ Add to Playlist")
        .description(format!("Which playlist should {} go to?", link(track)))
        .color(SUCCESS)
}

pub fn ask_rename(slot: Slot, name: &str) -> CreateEmbed {
    CreateEmbed::new()
        .title("✏️ Rename Playlist?")
        .description(format!(
            "Do you want to rename **{}** ({})?",
            name,
            slot.default_name()
        ))
        .color(SUCCESS)
}

pub fn ask_play_now(track: &Track) -> CreateEmbed {
    CreateEmbed::new()
        .title("🎶 Something is already playing")
        .description(format!("Play {} now, or add it to the queue?", link(track)))
        .color(SUCCESS)
}

/// Report the queued tracks auto-advance had to pass over
pub fn skipped_tracks(skipped: &[SkippedTrack]) -> CreateMessage {
    let mut lines: Vec<String> = skipped
        .iter()
        .take(MAX_SKIPPED_LINES)
        .map(|s| format!("{}: {}", link(&s.track), s.reason))
        .collect();
    lines.extend(and_more(skipped.len(), MAX_SKIPPED_LINES));
    let description = lines.join("\n");

    CreateMessage::new().embed(
        CreateEmbed::new()
            .title("⚠️ Skipped Unplayable Tracks")
            .description(description)
            .color(FAILURE),
    )
}

pub fn main_controls_embed() -> CreateEmbed {
    CreateEmbed::new()
        .title("🎶 Music Controls")
        .description("Search for a song or start one from a playlist")
        .color(SUCCESS)
}

/// The main control surface as a standalone channel message
pub fn main_controls_message(playlist_names: &[(Slot, String)]) -> CreateMessage {
    CreateMessage::new()
        .embed(main_controls_embed())
        .components(main_controls(playlist_names))
}

/// Post the "now playing" panel in `channel_id`.
///
/// The panel is remembered in `panels` so its buttons act on `track`. After
/// [`PANEL_TIMEOUT`] it is forgotten, loses its buttons and a fresh main
/// control surface is posted below it.
pub async fn post_now_playing(
    http: Arc<Http>,
    playlists: Arc<PlaylistStore>,
    panels: Arc<NowPlayingPanels>,
    channel_id: ChannelId,
    track: &Track,
    volume: f32,
) -> Result<Message, Error> {
    let message = channel_id
        .send_message(
            &http,
            CreateMessage::new()
                .embed(now_playing(track, volume))
                .components(now_playing_controls()),
        )
        .await?;

    let message_id = message.id;
    panels.remember(message_id, track.clone());
    tokio::spawn(async move {
        tokio::time::sleep(PANEL_TIMEOUT).await;
        debug!("Retiring now playing panel {}", message_id);
        panels.forget(message_id);

        if let Err(e) = channel_id
            .edit_message(&http, message_id, EditMessage::new().components(vec![]))
            .await
        {
            warn!("Failed to remove buttons from panel {}: {}", message_id, e);
        }

        let names = playlists.names().await;
        if let Err(e) = channel_id
            .send_message(&http, main_controls_message(&names))
            .await
        {
            warn!("Failed to repost controls in {}: {}", channel_id, e);
        }
    });

    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_percent_rounds() {
        assert_eq!(percent(0.5), "50%");
        assert_eq!(percent(0.7), "70%");
        assert_eq!(percent(1.0), "100%");
        assert_eq!(percent(0.0), "0%");
    }

    fn queue_of(len: usize) -> Vec<Track> {
        (0..len)
            .map(|i| Track::new(format!("Song {}", i), format!("https://youtu.be/{}", i)))
            .collect()
    }

    fn description(embed: &CreateEmbed) -> String {
        let json = serde_json::to_value(embed).unwrap();
        json["description"].as_str().unwrap_or_default().to_string()
    }

    #[test]
    fn test_long_queue_is_summarized() {
        let queue = queue_of(200);

        let text = description(&music_queue(None, &queue));

        assert!(text.contains("Queue - 200 tracks"));
        assert!(text.contains("`15.` [Song 14]"));
        assert!(!text.contains("`16.`"));
        assert!(text.ends_with("…and 185 more"));
        assert!(text.chars().count() < 4096);
    }

    #[test]
    fn test_short_queue_lists_everything() {
        let text = description(&music_queue(None, &queue_of(3)));

        assert!(text.contains("`3.` [Song 2]"));
        assert!(!text.contains("more"));
    }

    #[test]
    fn test_many_skipped_tracks_are_summarized() {
        let skipped: Vec<SkippedTrack> = queue_of(40)
            .into_iter()
            .map(|track| SkippedTrack {
                track,
                reason: "Playback error: video unavailable".to_string(),
            })
            .collect();

        let json = serde_json::to_value(skipped_tracks(&skipped)).unwrap();
        let text = json["embeds"][0]["description"].as_str().unwrap();

        assert_eq!(text.lines().count(), MAX_SKIPPED_LINES + 1);
        assert_eq!(text.lines().last(), Some("…and 30 more"));
    }

    #[test]
    fn test_link_uses_markdown() {
        let track = Track::new("Song", "https://www.youtube.com/watch?v=abc");
        assert_eq!(link(&track), "[Song](https://www.youtube.com/watch?v=abc)");
    }
}
