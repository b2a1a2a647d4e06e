//! The seam between the playback state machine and the voice/audio layer.
//!
//! `MusicManager` only talks to a `VoiceBackend`; production uses
//! `SongbirdBackend`, tests plug in an in-memory fake.

use dashmap::DashMap;
use serenity::async_trait;
use serenity::model::id::{ChannelId, GuildId};
use songbird::input::{Compose, Input, YoutubeDl};
use songbird::tracks::{Track as SongbirdTrack, TrackHandle};
use songbird::{Event, Songbird, TrackEvent};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use super::event_handlers::{SongEndNotifier, TrackEnded};
use super::music_manager::{MusicError, MusicResult};
use crate::commands::music::audio_sources::Track;

/// Voice transport and audio playback operations needed by the controller.
#[async_trait]
pub trait VoiceBackend: Send + Sync {
    /// A resolved, ready-to-play audio source
    type Source: Send;

    fn is_connected(&self, guild_id: GuildId) -> bool;

    async fn join(&self, guild_id: GuildId, channel_id: ChannelId) -> MusicResult<()>;

    async fn leave(&self, guild_id: GuildId) -> MusicResult<()>;

    /// Resolve the playable audio behind `track`. Called right before playback.
    async fn resolve(&self, track: &Track) -> MusicResult<Self::Source>;

    /// Start `source`, replacing anything the guild is playing. Completion of
    /// the track must be reported with `token`.
    async fn play(
        &self,
        guild_id: GuildId,
        source: Self::Source,
        volume: f32,
        token: u64,
    ) -> MusicResult<()>;

    fn pause(&self, guild_id: GuildId) -> MusicResult<()>;

    fn resume(&self, guild_id: GuildId) -> MusicResult<()>;

    /// Halt the current track. Its completion event still fires.
    fn stop(&self, guild_id: GuildId);

    fn set_volume(&self, guild_id: GuildId, volume: f32) -> MusicResult<()>;
}

/// Songbird-backed implementation streaming YouTube audio through yt-dlp
pub struct SongbirdBackend {
    songbird: Arc<Songbird>,
    http_client: reqwest::Client,
    cookies: Option<PathBuf>,
    tracks: DashMap<GuildId, TrackHandle>,
    completions: UnboundedSender<TrackEnded>,
}

impl SongbirdBackend {
    pub fn new(
        songbird: Arc<Songbird>,
        http_client: reqwest::Client,
        cookies: Option<PathBuf>,
        completions: UnboundedSender<TrackEnded>,
    ) -> Self {
        Self {
            songbird,
            http_client,
            cookies,
            tracks: DashMap::new(),
            completions,
        }
    }

    fn current_track(&self, guild_id: GuildId) -> MusicResult<TrackHandle> {
        self.tracks
            .get(&guild_id)
            .map(|handle| handle.clone())
            .ok_or(MusicError::NothingPlaying)
    }
}

#[async_trait]
impl VoiceBackend for SongbirdBackend {
    type Source = Input;

    fn is_connected(&self, guild_id: GuildId) -> bool {
        self.songbird.get(guild_id).is_some()
    }

    async fn join(&self, guild_id: GuildId, channel_id: ChannelId) -> MusicResult<()> {
        info!("Joining voice channel {} in guild {}", channel_id, guild_id);
        if let Err(e) = self.songbird.join(guild_id, channel_id).await {
            // songbird keeps the half-open call registered, which would make
            // the guild look connected on the next request
            if let Err(remove_err) = self.songbird.remove(guild_id).await {
                debug!(
                    "No call to clean up after failed join in guild {}: {}",
                    guild_id, remove_err
                );
            }
            return Err(MusicError::Connection(e.to_string()));
        }
        Ok(())
    }

    async fn leave(&self, guild_id: GuildId) -> MusicResult<()> {
        self.tracks.remove(&guild_id);

        if self.songbird.get(guild_id).is_none() {
            return Err(MusicError::NotConnected);
        }

        info!("Leaving voice channel in guild {}", guild_id);
        self.songbird
            .remove(guild_id)
            .await
            .map_err(|e| MusicError::Connection(e.to_string()))
    }

    async fn resolve(&self, track: &Track) -> MusicResult<Input> {
        let mut source = YoutubeDl::new(self.http_client.clone(), track.url.clone());
        if let Some(cookies) = &self.cookies {
            source = source.user_args(vec![
                "--cookies".to_string(),
                cookies.display().to_string(),
            ]);
        }

        // Runs the yt-dlp query now so an unplayable URL is reported to the requester
        source
            .aux_metadata()
            .await
            .map_err(|e| MusicError::Playback(format!("{}: {}", track.title, e)))?;

        debug!("Resolved audio source for '{}'", track.title);
        Ok(source.into())
    }

    async fn play(
        &self,
        guild_id: GuildId,
        source: Input,
        volume: f32,
        token: u64,
    ) -> MusicResult<()> {
        let call = self
            .songbird
            .get(guild_id)
            .ok_or(MusicError::NotConnected)?;

        let handle = {
            let mut handler = call.lock().await;
            handler.play_only(SongbirdTrack::from(source).volume(volume))
        };

        for event in [TrackEvent::End, TrackEvent::Error] {
            handle
                .add_event(
                    Event::Track(event),
                    SongEndNotifier {
                        guild_id,
                        token,
                        completions: self.completions.clone(),
                    },
                )
                .map_err(|e| MusicError::Playback(e.to_string()))?;
        }

        self.tracks.insert(guild_id, handle);
        Ok(())
    }

    fn pause(&self, guild_id: GuildId) -> MusicResult<()> {
        self.current_track(guild_id)?
            .pause()
            .map_err(|e| MusicError::Playback(e.to_string()))
    }

    fn resume(&self, guild_id: GuildId) -> MusicResult<()> {
        self.current_track(guild_id)?
            .play()
            .map_err(|e| MusicError::Playback(e.to_string()))
    }

    fn stop(&self, guild_id: GuildId) {
        if let Some((_, handle)) = self.tracks.remove(&guild_id) {
            match handle.stop() {
                Ok(_) => (),
                // The track already ended on its own
                Err(songbird::error::ControlError::Finished) => (),
                Err(e) => warn!("Error stopping track in guild {}: {}", guild_id, e),
            }
        }
    }

    fn set_volume(&self, guild_id: GuildId, volume: f32) -> MusicResult<()> {
        self.current_track(guild_id)?
            .set_volume(volume)
            .map_err(|e| MusicError::Playback(e.to_string()))
    }
}
