//! Test fixtures for the music bot
//! This module contains sample ids and tracks used in tests

use fake::Fake;
use fake::faker::lorem::en::Words;
use sil3ntbot::commands::music::audio_sources::Track;
use serenity::model::id::{ChannelId, GuildId};

/// Sample guild ID for testing
pub const SAMPLE_GUILD_ID: u64 = 123456789;

/// Sample voice channel ID for testing
pub const SAMPLE_VOICE_CHANNEL_ID: u64 = 987654321;

pub fn guild() -> GuildId {
    GuildId::new(SAMPLE_GUILD_ID)
}

pub fn other_guild() -> GuildId {
    GuildId::new(SAMPLE_GUILD_ID + 1)
}

pub fn voice_channel() -> ChannelId {
    ChannelId::new(SAMPLE_VOICE_CHANNEL_ID)
}

pub fn track(title: &str) -> Track {
    let id: String = title.chars().filter(|c| c.is_alphanumeric()).collect();
    Track::new(title, format!("https://www.youtube.com/watch?v={}", id))
}

/// A track with a random, unique-enough title
pub fn random_track(n: usize) -> Track {
    let words: Vec<String> = Words(2..4).fake();
    track(&format!("{} {}", words.join(" "), n))
}
