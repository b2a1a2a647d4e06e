use dashmap::DashMap;
use serenity::model::id::GuildId;
use std::collections::VecDeque;

use super::music_manager::{MusicError, MusicResult};
use crate::commands::music::audio_sources::Track;

/// Volume used for a guild until someone touches the volume buttons
pub const DEFAULT_VOLUME: f32 = 0.5;
/// Amount a single volume button press changes the volume by
pub const VOLUME_STEP: f32 = 0.1;

/// Lifecycle of playback in a single guild
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerState {
    /// Not connected to a voice channel
    #[default]
    Idle,
    /// Connected, nothing playing
    ConnectedIdle,
    Playing,
    Paused,
}

impl PlayerState {
    /// True while a track is loaded, whether audible or paused
    pub fn has_track(self) -> bool {
        matches!(self, PlayerState::Playing | PlayerState::Paused)
    }
}

#[derive(Debug, Default)]
struct GuildState {
    volume: Option<f32>,
    queue: VecDeque<Track>,
    player: PlayerState,
    now_playing: Option<Track>,
    // Identifies the most recently started track; completion events carrying
    // an older value belong to a superseded track
    generation: u64,
}

/// Per-process registry of guild playback state.
///
/// Every accessor takes and releases the map guard before returning, so no
/// guard is ever held across an await point.
#[derive(Debug, Default)]
pub struct GuildRegistry {
    guilds: DashMap<GuildId, GuildState>,
}

impl GuildRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current volume for the guild, or the default if never adjusted
    pub fn volume(&self, guild_id: GuildId) -> f32 {
        self.guilds
            .get(&guild_id)
            .and_then(|state| state.volume)
            .unwrap_or(DEFAULT_VOLUME)
    }

    /// Add `delta` to the guild volume, clamped to [0.0, 1.0] and rounded to
    /// two decimals. Returns the stored value.
    pub fn adjust_volume(&self, guild_id: GuildId, delta: f32) -> f32 {
        let mut state = self.guilds.entry(guild_id).or_default();
        let current = state.volume.unwrap_or(DEFAULT_VOLUME);
        let adjusted = (((current + delta) * 100.0).round() / 100.0).clamp(0.0, 1.0);
        state.volume = Some(adjusted);
        adjusted
    }

    /// Append a track to the guild queue. Returns its 1-based position.
    pub fn enqueue(&self, guild_id: GuildId, track: Track) -> usize {
        let mut state = self.guilds.entry(guild_id).or_default();
        state.queue.push_back(track);
        state.queue.len()
    }

    /// Remove and return the head of the guild queue
    pub fn dequeue_next(&self, guild_id: GuildId) -> MusicResult<Track> {
        self.guilds
            .get_mut(&guild_id)
            .and_then(|mut state| state.queue.pop_front())
            .ok_or(MusicError::QueueEmpty)
    }

    /// Clear the queue for a guild
    pub fn clear(&self, guild_id: GuildId) {
        if let Some(mut state) = self.guilds.get_mut(&guild_id) {
            state.queue.clear();
        }
    }

    /// Snapshot of the pending tracks, head first
    pub fn queue(&self, guild_id: GuildId) -> Vec<Track> {
        self.guilds
            .get(&guild_id)
            .map(|state| state.queue.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn queue_len(&self, guild_id: GuildId) -> usize {
        self.guilds
            .get(&guild_id)
            .map_or(0, |state| state.queue.len())
    }

    pub fn player_state(&self, guild_id: GuildId) -> PlayerState {
        self.guilds
            .get(&guild_id)
            .map(|state| state.player)
            .unwrap_or_default()
    }

    pub fn now_playing(&self, guild_id: GuildId) -> Option<Track> {
        self.guilds
            .get(&guild_id)
            .and_then(|state| state.now_playing.clone())
    }

    pub(crate) fn set_player_state(&self, guild_id: GuildId, player: PlayerState) {
        let mut state = self.guilds.entry(guild_id).or_default();
        state.player = player;
        if !player.has_track() {
            state.now_playing = None;
        }
    }

    /// Mark `track` as the one now playing
    pub(crate) fn set_playing(&self, guild_id: GuildId, track: Track) {
        let mut state = self.guilds.entry(guild_id).or_default();
        state.player = PlayerState::Playing;
        state.now_playing = Some(track);
    }

    pub(crate) fn generation(&self, guild_id: GuildId) -> u64 {
        self.guilds.get(&guild_id).map_or(0, |state| state.generation)
    }

    /// Bump the guild generation, invalidating completion events of the running track
    pub(crate) fn next_generation(&self, guild_id: GuildId) -> u64 {
        let mut state = self.guilds.entry(guild_id).or_default();
        state.generation += 1;
        state.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn guild() -> GuildId {
        GuildId::new(42)
    }

    fn track(n: usize) -> Track {
        Track::new(format!("Song {}", n), format!("https://www.youtube.com/watch?v={}", n))
    }

    #[test]
    fn test_volume_defaults_to_half() {
        let registry = GuildRegistry::new();
        assert_eq!(registry.volume(guild()), DEFAULT_VOLUME);
    }

    #[rstest]
    #[case(0.1, 0.6)]
    #[case(-0.1, 0.4)]
    #[case(0.6, 1.0)]
    #[case(-0.9, 0.0)]
    #[case(0.0, 0.5)]
    fn test_adjust_volume_single_step(#[case] delta: f32, #[case] expected: f32) {
        let registry = GuildRegistry::new();
        assert_eq!(registry.adjust_volume(guild(), delta), expected);
        assert_eq!(registry.volume(guild()), expected);
    }

    #[rstest]
    #[case(VOLUME_STEP, 1.0)]
    #[case(-VOLUME_STEP, 0.0)]
    fn test_adjust_volume_stays_clamped(#[case] delta: f32, #[case] bound: f32) {
        let registry = GuildRegistry::new();
        for _ in 0..25 {
            let volume = registry.adjust_volume(guild(), delta);
            assert!((0.0..=1.0).contains(&volume));
        }
        assert_eq!(registry.volume(guild()), bound);
    }

    #[test]
    fn test_five_steps_reach_exact_bounds() {
        let registry = GuildRegistry::new();
        for _ in 0..5 {
            registry.adjust_volume(guild(), VOLUME_STEP);
        }
        assert_eq!(registry.volume(guild()), 1.0);
        for _ in 0..10 {
            registry.adjust_volume(guild(), -VOLUME_STEP);
        }
        assert_eq!(registry.volume(guild()), 0.0);
    }

    #[test]
    fn test_queue_is_fifo() {
        let registry = GuildRegistry::new();
        assert_eq!(registry.enqueue(guild(), track(1)), 1);
        assert_eq!(registry.enqueue(guild(), track(2)), 2);
        assert_eq!(registry.enqueue(guild(), track(3)), 3);

        assert_eq!(registry.dequeue_next(guild()).unwrap(), track(1));
        assert_eq!(registry.dequeue_next(guild()).unwrap(), track(2));
        assert_eq!(registry.queue(guild()), vec![track(3)]);
    }

    #[test]
    fn test_dequeue_empty_signals_queue_empty() {
        let registry = GuildRegistry::new();
        assert_matches!(registry.dequeue_next(guild()), Err(MusicError::QueueEmpty));

        registry.enqueue(guild(), track(1));
        registry.clear(guild());
        assert_eq!(registry.queue_len(guild()), 0);
        assert_matches!(registry.dequeue_next(guild()), Err(MusicError::QueueEmpty));
    }

    #[test]
    fn test_guilds_are_independent() {
        let registry = GuildRegistry::new();
        let other = GuildId::new(7);
        registry.enqueue(guild(), track(1));
        registry.adjust_volume(other, 0.2);

        assert_eq!(registry.queue_len(other), 0);
        assert_eq!(registry.volume(guild()), DEFAULT_VOLUME);
        assert_eq!(registry.volume(other), 0.7);
    }

    #[test]
    fn test_leaving_track_states_clears_now_playing() {
        let registry = GuildRegistry::new();
        registry.set_playing(guild(), track(1));
        assert_eq!(registry.player_state(guild()), PlayerState::Playing);
        assert_eq!(registry.now_playing(guild()), Some(track(1)));

        registry.set_player_state(guild(), PlayerState::Paused);
        assert_eq!(registry.now_playing(guild()), Some(track(1)));

        registry.set_player_state(guild(), PlayerState::ConnectedIdle);
        assert_eq!(registry.now_playing(guild()), None);
    }

    #[test]
    fn test_generation_increments() {
        let registry = GuildRegistry::new();
        assert_eq!(registry.generation(guild()), 0);
        assert_eq!(registry.next_generation(guild()), 1);
        assert_eq!(registry.next_generation(guild()), 2);
        assert_eq!(registry.generation(guild()), 2);
    }
}
