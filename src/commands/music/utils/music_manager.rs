use dashmap::DashMap;
use serenity::model::id::{ChannelId, GuildId};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::queue_manager::{GuildRegistry, PlayerState};
use super::voice_backend::VoiceBackend;
use crate::commands::music::audio_sources::Track;

/// Errors that can occur during music operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MusicError {
    #[error("Not in a guild")]
    NotInGuild,

    #[error("You need to be in a voice channel to play music")]
    NotInVoiceChannel,

    #[error("Failed to join voice channel: {0}")]
    Connection(String),

    #[error("Not connected to a voice channel")]
    NotConnected,

    #[error("Playback failed: {0}")]
    Playback(String),

    #[error("The queue is empty")]
    QueueEmpty,

    #[error("No results found")]
    NoSearchResults,

    #[error("No track is currently playing")]
    NothingPlaying,

    #[error("No track is currently paused")]
    NothingPaused,
}

/// Result type for music operations
pub type MusicResult<T> = Result<T, MusicError>;

/// What happened to a play request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayOutcome {
    /// The track started playing right away
    Started(Track),
    /// Something was already playing; the track waits at `position` (1-based)
    Queued { track: Track, position: usize },
}

/// A queued track auto-advance could not start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedTrack {
    pub track: Track,
    pub reason: String,
}

/// Result of handling a track completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// The completion belonged to a superseded or stopped track
    Ignored,
    Started {
        track: Track,
        skipped: Vec<SkippedTrack>,
    },
    /// The queue ran dry and the bot left the voice channel
    Disconnected { skipped: Vec<SkippedTrack> },
}

/// Per-guild playback state machine.
///
/// States are `Idle`, `ConnectedIdle`, `Playing` and `Paused` (see
/// [`PlayerState`]). Transitions for one guild are serialized through a
/// per-guild lock; different guilds never wait on each other.
pub struct MusicManager<B: VoiceBackend> {
    backend: B,
    registry: GuildRegistry,
    transitions: DashMap<GuildId, Arc<Mutex<()>>>,
}

impl<B: VoiceBackend> MusicManager<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            registry: GuildRegistry::new(),
            transitions: DashMap::new(),
        }
    }

    pub fn registry(&self) -> &GuildRegistry {
        &self.registry
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn transition_lock(&self, guild_id: GuildId) -> Arc<Mutex<()>> {
        self.transitions.entry(guild_id).or_default().clone()
    }

    /// Play `track` for a requester sitting in `requester_channel`.
    ///
    /// Joins the requester's channel when not connected. While a track is
    /// loaded the new one is queued, unless `play_now` is set, in which case
    /// it replaces the current track without going through the queue.
    pub async fn request(
        &self,
        guild_id: GuildId,
        requester_channel: Option<ChannelId>,
        track: Track,
        play_now: bool,
    ) -> MusicResult<PlayOutcome> {
        let lock = self.transition_lock(guild_id);
        let _guard = lock.lock().await;

        self.ensure_connected(guild_id, requester_channel).await?;

        if self.registry.player_state(guild_id).has_track() && !play_now {
            let position = self.registry.enqueue(guild_id, track.clone());
            info!(
                "Queued '{}' at position {} for guild {}",
                track.title, position, guild_id
            );
            return Ok(PlayOutcome::Queued { track, position });
        }

        self.start_track(guild_id, track.clone()).await?;
        Ok(PlayOutcome::Started(track))
    }

    async fn ensure_connected(
        &self,
        guild_id: GuildId,
        requester_channel: Option<ChannelId>,
    ) -> MusicResult<()> {
        if self.backend.is_connected(guild_id) {
            if self.registry.player_state(guild_id) == PlayerState::Idle {
                self.registry
                    .set_player_state(guild_id, PlayerState::ConnectedIdle);
            }
            return Ok(());
        }

        let channel_id = requester_channel.ok_or(MusicError::NotInVoiceChannel)?;
        if let Err(e) = self.backend.join(guild_id, channel_id).await {
            if self.backend.is_connected(guild_id) {
                warn!("Dropping half-open voice connection in guild {}", guild_id);
                let _ = self.backend.leave(guild_id).await;
            }
            return Err(e);
        }
        self.registry
            .set_player_state(guild_id, PlayerState::ConnectedIdle);
        Ok(())
    }

    /// Single entry point for starting playback, shared by user requests and
    /// auto-advance. Resolution happens first so a bad source leaves the
    /// current state untouched.
    async fn start_track(&self, guild_id: GuildId, track: Track) -> MusicResult<()> {
        let source = self.backend.resolve(&track).await?;

        let token = self.registry.next_generation(guild_id);
        if self.registry.player_state(guild_id).has_track() {
            self.backend.stop(guild_id);
        }

        let volume = self.registry.volume(guild_id);
        if let Err(e) = self.backend.play(guild_id, source, volume, token).await {
            self.registry
                .set_player_state(guild_id, PlayerState::ConnectedIdle);
            return Err(e);
        }

        info!("Now playing '{}' in guild {}", track.title, guild_id);
        self.registry.set_playing(guild_id, track);
        Ok(())
    }

    /// Pause the current track
    pub async fn pause(&self, guild_id: GuildId) -> MusicResult<Track> {
        let lock = self.transition_lock(guild_id);
        let _guard = lock.lock().await;

        if self.registry.player_state(guild_id) != PlayerState::Playing {
            return Err(MusicError::NothingPlaying);
        }

        self.backend.pause(guild_id)?;
        self.registry.set_player_state(guild_id, PlayerState::Paused);
        self.registry
            .now_playing(guild_id)
            .ok_or(MusicError::NothingPlaying)
    }

    /// Resume a paused track
    pub async fn resume(&self, guild_id: GuildId) -> MusicResult<Track> {
        let lock = self.transition_lock(guild_id);
        let _guard = lock.lock().await;

        if self.registry.player_state(guild_id) != PlayerState::Paused {
            return Err(MusicError::NothingPaused);
        }

        self.backend.resume(guild_id)?;
        self.registry.set_player_state(guild_id, PlayerState::Playing);
        self.registry
            .now_playing(guild_id)
            .ok_or(MusicError::NothingPaused)
    }

    /// Clear the queue and halt playback, staying in the voice channel
    pub async fn stop(&self, guild_id: GuildId) -> MusicResult<()> {
        let lock = self.transition_lock(guild_id);
        let _guard = lock.lock().await;

        if !self.registry.player_state(guild_id).has_track() {
            return Err(MusicError::NothingPlaying);
        }

        self.registry.clear(guild_id);
        // The halted track must not auto-advance
        self.registry.next_generation(guild_id);
        self.backend.stop(guild_id);
        self.registry
            .set_player_state(guild_id, PlayerState::ConnectedIdle);
        info!("Stopped playback for guild {}", guild_id);
        Ok(())
    }

    /// Halt the current track; its completion event advances the queue.
    /// Returns the skipped track.
    pub async fn skip(&self, guild_id: GuildId) -> MusicResult<Track> {
        let lock = self.transition_lock(guild_id);
        let _guard = lock.lock().await;

        if self.registry.player_state(guild_id) != PlayerState::Playing {
            return Err(MusicError::NothingPlaying);
        }

        let current = self
            .registry
            .now_playing(guild_id)
            .ok_or(MusicError::NothingPlaying)?;
        self.backend.stop(guild_id);
        info!("Skipped '{}' in guild {}", current.title, guild_id);
        Ok(current)
    }

    /// Change the guild volume by `delta` and apply it to the live track
    pub async fn adjust_volume(&self, guild_id: GuildId, delta: f32) -> f32 {
        let lock = self.transition_lock(guild_id);
        let _guard = lock.lock().await;

        let volume = self.registry.adjust_volume(guild_id, delta);
        if self.registry.player_state(guild_id).has_track() {
            if let Err(e) = self.backend.set_volume(guild_id, volume) {
                warn!("Failed to apply volume in guild {}: {}", guild_id, e);
            }
        }
        volume
    }

    /// Handle the end of the track started with `token`.
    ///
    /// Starts the next queued track, skipping entries that fail to start. When
    /// nothing is left the bot leaves the voice channel and the guild becomes
    /// `Idle`, even if leaving fails.
    pub async fn on_track_end(&self, guild_id: GuildId, token: u64) -> AdvanceOutcome {
        let lock = self.transition_lock(guild_id);
        let _guard = lock.lock().await;

        if token != self.registry.generation(guild_id)
            || !self.registry.player_state(guild_id).has_track()
        {
            debug!(
                "Track end with token {} is stale for guild {}",
                token, guild_id
            );
            return AdvanceOutcome::Ignored;
        }

        let mut skipped = Vec::new();
        while let Ok(next) = self.registry.dequeue_next(guild_id) {
            match self.start_track(guild_id, next.clone()).await {
                Ok(()) => {
                    return AdvanceOutcome::Started {
                        track: next,
                        skipped,
                    };
                }
                Err(e) => {
                    warn!(
                        "Could not start queued track '{}' in guild {}: {}",
                        next.title, guild_id, e
                    );
                    skipped.push(SkippedTrack {
                        track: next,
                        reason: e.to_string(),
                    });
                }
            }
        }

        self.disconnect(guild_id).await;
        AdvanceOutcome::Disconnected { skipped }
    }

    async fn disconnect(&self, guild_id: GuildId) {
        self.registry.set_player_state(guild_id, PlayerState::Idle);
        if let Err(e) = self.backend.leave(guild_id).await {
            warn!("Failed to leave voice channel in guild {}: {}", guild_id, e);
        }
        info!("Queue finished, disconnected from guild {}", guild_id);
    }
}
