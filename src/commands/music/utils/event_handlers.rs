use poise::serenity_prelude as serenity;
use serenity::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};

use super::{
    control_channel, embedded_messages,
    music_manager::{AdvanceOutcome, MusicManager, SkippedTrack},
    now_playing_panels::NowPlayingPanels,
    playlist_store::PlaylistStore,
    voice_backend::VoiceBackend,
};
use crate::commands::music::audio_sources::Track;

/// Message sent from songbird's event context when a track stops for any reason
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackEnded {
    pub guild_id: serenity::GuildId,
    pub token: u64,
}

/// Event handler attached to every started track
pub struct SongEndNotifier {
    pub guild_id: serenity::GuildId,
    pub token: u64,
    pub completions: UnboundedSender<TrackEnded>,
}

#[async_trait]
impl songbird::EventHandler for SongEndNotifier {
    async fn act(&self, ctx: &songbird::EventContext<'_>) -> Option<songbird::Event> {
        if let songbird::EventContext::Track(_) = ctx {
            let ended = TrackEnded {
                guild_id: self.guild_id,
                token: self.token,
            };
            if self.completions.send(ended).is_err() {
                warn!(
                    "Completion loop is gone, dropping track end for guild {}",
                    self.guild_id
                );
            }
        }
        None
    }
}

/// Where the outcome of an automatic advance is reported
#[async_trait]
pub trait Announcer: Send + Sync {
    /// `track` started after the previous one ended, passing over `skipped`
    async fn track_started(
        &self,
        guild_id: serenity::GuildId,
        track: &Track,
        skipped: &[SkippedTrack],
        volume: f32,
    ) -> Result<(), crate::Error>;

    /// The queue ran out and the bot left; `skipped` could not be played
    async fn queue_finished(
        &self,
        guild_id: serenity::GuildId,
        skipped: &[SkippedTrack],
    ) -> Result<(), crate::Error>;
}

/// Announces in the guild's control channel, creating it when missing
pub struct ChannelAnnouncer {
    pub http: Arc<serenity::Http>,
    pub playlists: Arc<PlaylistStore>,
    pub panels: Arc<NowPlayingPanels>,
    pub control_channel: String,
}

#[async_trait]
impl Announcer for ChannelAnnouncer {
    async fn track_started(
        &self,
        guild_id: serenity::GuildId,
        track: &Track,
        skipped: &[SkippedTrack],
        volume: f32,
    ) -> Result<(), crate::Error> {
        let channel_id =
            control_channel::ensure_control_channel(&self.http, guild_id, &self.control_channel)
                .await?;

        if !skipped.is_empty() {
            channel_id
                .send_message(&self.http, embedded_messages::skipped_tracks(skipped))
                .await?;
        }

        embedded_messages::post_now_playing(
            self.http.clone(),
            self.playlists.clone(),
            self.panels.clone(),
            channel_id,
            track,
            volume,
        )
        .await?;
        Ok(())
    }

    async fn queue_finished(
        &self,
        guild_id: serenity::GuildId,
        skipped: &[SkippedTrack],
    ) -> Result<(), crate::Error> {
        if skipped.is_empty() {
            return Ok(());
        }
        let channel_id =
            control_channel::ensure_control_channel(&self.http, guild_id, &self.control_channel)
                .await?;
        channel_id
            .send_message(&self.http, embedded_messages::skipped_tracks(skipped))
            .await?;
        Ok(())
    }
}

/// Advances queues when tracks end and hands the result to an [`Announcer`]
pub struct CompletionLoop<B: VoiceBackend, A: Announcer> {
    pub music: Arc<MusicManager<B>>,
    pub announcer: A,
}

impl<B: VoiceBackend + 'static, A: Announcer + 'static> CompletionLoop<B, A> {
    /// Consume track-end messages until every sender is dropped.
    ///
    /// Each message is handled on its own task, so resolving the next song
    /// in one guild never holds up another guild. Ordering within a guild is
    /// kept by the manager's transition lock and generation tokens.
    pub async fn run(self, mut completions: UnboundedReceiver<TrackEnded>) {
        info!("Track completion loop started");
        let this = Arc::new(self);

        while let Some(ended) = completions.recv().await {
            let this = this.clone();
            tokio::spawn(async move { this.advance(ended).await });
        }

        info!("Track completion loop finished");
    }

    async fn advance(&self, TrackEnded { guild_id, token }: TrackEnded) {
        match self.music.on_track_end(guild_id, token).await {
            AdvanceOutcome::Ignored => {
                debug!("Ignored stale track end for guild {}", guild_id)
            }
            AdvanceOutcome::Started { track, skipped } => {
                let volume = self.music.registry().volume(guild_id);
                if let Err(e) = self
                    .announcer
                    .track_started(guild_id, &track, &skipped, volume)
                    .await
                {
                    error!("Failed to announce next track for guild {}: {}", guild_id, e);
                }
            }
            AdvanceOutcome::Disconnected { skipped } => {
                if let Err(e) = self.announcer.queue_finished(guild_id, &skipped).await {
                    error!(
                        "Failed to report skipped tracks for guild {}: {}",
                        guild_id, e
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use songbird::EventHandler;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_track_end_is_forwarded_with_its_token() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let notifier = SongEndNotifier {
            guild_id: serenity::GuildId::new(1),
            token: 7,
            completions: tx,
        };

        let next = notifier.act(&songbird::EventContext::Track(&[])).await;

        assert!(next.is_none());
        assert_eq!(
            rx.try_recv(),
            Ok(TrackEnded {
                guild_id: serenity::GuildId::new(1),
                token: 7
            })
        );
    }

    #[tokio::test]
    async fn test_track_end_without_listener_is_dropped() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let notifier = SongEndNotifier {
            guild_id: serenity::GuildId::new(1),
            token: 1,
            completions: tx,
        };

        assert!(notifier.act(&songbird::EventContext::Track(&[])).await.is_none());
    }
}
