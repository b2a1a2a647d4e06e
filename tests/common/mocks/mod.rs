//! Mock implementations for external dependencies
//! This module contains mock objects used for testing

use async_trait::async_trait;
use serenity::model::id::{ChannelId, GuildId};
use sil3ntbot::commands::music::{
    audio_sources::Track,
    utils::{
        event_handlers::Announcer,
        music_manager::{MusicError, MusicResult, SkippedTrack},
        voice_backend::VoiceBackend,
    },
};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Everything the controller asked the voice layer to do
#[derive(Debug, Clone, PartialEq)]
pub enum VoiceCall {
    Join(GuildId, ChannelId),
    Leave(GuildId),
    Play {
        guild_id: GuildId,
        title: String,
        volume: f32,
        token: u64,
    },
    Pause(GuildId),
    Resume(GuildId),
    Stop(GuildId),
    SetVolume(GuildId, f32),
}

/// In-memory voice backend that records calls instead of streaming audio
#[derive(Default)]
pub struct FakeBackend {
    connected: Mutex<HashSet<GuildId>>,
    calls: Mutex<Vec<VoiceCall>>,
    unplayable: Mutex<HashSet<String>>,
    join_error: Mutex<Option<MusicError>>,
    slow: Mutex<HashMap<String, Duration>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the backend as connected without recording a join
    pub fn join_now(&self, guild_id: GuildId, _channel_id: ChannelId) {
        self.connected.lock().unwrap().insert(guild_id);
    }

    /// Make resolution of the track titled `title` fail
    pub fn fail_resolving(&self, title: &str) {
        self.unplayable.lock().unwrap().insert(title.to_string());
    }

    /// Make resolution of the track titled `title` take `delay`
    pub fn delay_resolving(&self, title: &str, delay: Duration) {
        self.slow.lock().unwrap().insert(title.to_string(), delay);
    }

    /// Make the next join fail with `error`
    pub fn fail_joining(&self, error: MusicError) {
        *self.join_error.lock().unwrap() = Some(error);
    }

    pub fn calls(&self) -> Vec<VoiceCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Titles handed to `play`, in order
    pub fn played(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                VoiceCall::Play { title, .. } => Some(title),
                _ => None,
            })
            .collect()
    }

    /// Token of the most recently started track
    pub fn last_token(&self) -> Option<u64> {
        self.calls().into_iter().rev().find_map(|call| match call {
            VoiceCall::Play { token, .. } => Some(token),
            _ => None,
        })
    }

    fn record(&self, call: VoiceCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl VoiceBackend for FakeBackend {
    type Source = Track;

    fn is_connected(&self, guild_id: GuildId) -> bool {
        self.connected.lock().unwrap().contains(&guild_id)
    }

    async fn join(&self, guild_id: GuildId, channel_id: ChannelId) -> MusicResult<()> {
        self.record(VoiceCall::Join(guild_id, channel_id));
        // Like songbird, a failed join still leaves a call registered
        self.connected.lock().unwrap().insert(guild_id);
        match self.join_error.lock().unwrap().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn leave(&self, guild_id: GuildId) -> MusicResult<()> {
        self.record(VoiceCall::Leave(guild_id));
        if self.connected.lock().unwrap().remove(&guild_id) {
            Ok(())
        } else {
            Err(MusicError::NotConnected)
        }
    }

    async fn resolve(&self, track: &Track) -> MusicResult<Track> {
        let delay = self.slow.lock().unwrap().get(&track.title).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.unplayable.lock().unwrap().contains(&track.title) {
            return Err(MusicError::Playback(format!(
                "{}: video unavailable",
                track.title
            )));
        }
        Ok(track.clone())
    }

    async fn play(
        &self,
        guild_id: GuildId,
        source: Track,
        volume: f32,
        token: u64,
    ) -> MusicResult<()> {
        self.record(VoiceCall::Play {
            guild_id,
            title: source.title,
            volume,
            token,
        });
        Ok(())
    }

    fn pause(&self, guild_id: GuildId) -> MusicResult<()> {
        self.record(VoiceCall::Pause(guild_id));
        Ok(())
    }

    fn resume(&self, guild_id: GuildId) -> MusicResult<()> {
        self.record(VoiceCall::Resume(guild_id));
        Ok(())
    }

    fn stop(&self, guild_id: GuildId) {
        self.record(VoiceCall::Stop(guild_id));
    }

    fn set_volume(&self, guild_id: GuildId, volume: f32) -> MusicResult<()> {
        self.record(VoiceCall::SetVolume(guild_id, volume));
        Ok(())
    }
}

/// What the completion loop reported
#[derive(Debug, Clone, PartialEq)]
pub enum Announcement {
    Started {
        guild_id: GuildId,
        title: String,
        skipped: Vec<String>,
    },
    Finished {
        guild_id: GuildId,
        skipped: Vec<String>,
    },
}

/// Announcer that forwards every report to a channel the test reads from
pub struct RecordingAnnouncer {
    announcements: UnboundedSender<Announcement>,
}

impl RecordingAnnouncer {
    pub fn new() -> (Self, UnboundedReceiver<Announcement>) {
        let (announcements, rx) = mpsc::unbounded_channel();
        (Self { announcements }, rx)
    }
}

fn titles(skipped: &[SkippedTrack]) -> Vec<String> {
    skipped.iter().map(|s| s.track.title.clone()).collect()
}

#[async_trait]
impl Announcer for RecordingAnnouncer {
    async fn track_started(
        &self,
        guild_id: GuildId,
        track: &Track,
        skipped: &[SkippedTrack],
        _volume: f32,
    ) -> Result<(), sil3ntbot::Error> {
        self.announcements.send(Announcement::Started {
            guild_id,
            title: track.title.clone(),
            skipped: titles(skipped),
        })?;
        Ok(())
    }

    async fn queue_finished(
        &self,
        guild_id: GuildId,
        skipped: &[SkippedTrack],
    ) -> Result<(), sil3ntbot::Error> {
        self.announcements.send(Announcement::Finished {
            guild_id,
            skipped: titles(skipped),
        })?;
        Ok(())
    }
}
