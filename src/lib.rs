//! Voice-channel music bot: YouTube search, per-guild queues, button controls
//! and three persisted playlists.

use std::sync::Arc;

pub mod commands;
pub mod config;
pub mod events;

use commands::music::audio_sources::SearchGateway;
use commands::music::utils::{
    music_manager::MusicManager, now_playing_panels::NowPlayingPanels,
    playlist_store::PlaylistStore, voice_backend::SongbirdBackend,
};
use config::Config;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
pub type CommandResult = Result<(), Error>;

/// User data, which is stored and accessible in all command invocations and event handlers
#[derive(Clone)]
pub struct Data {
    pub music: Arc<MusicManager<SongbirdBackend>>,
    pub playlists: Arc<PlaylistStore>,
    pub panels: Arc<NowPlayingPanels>,
    pub search: Arc<dyn SearchGateway>,
    pub config: Arc<Config>,
}

#[poise::command(slash_command, category = "General")]
pub async fn help(
    ctx: Context<'_>,
    #[description = "Specific command to show help about"]
    #[autocomplete = "poise::builtins::autocomplete_command"]
    command: Option<String>,
) -> CommandResult {
    poise::builtins::help(
        ctx,
        command.as_deref(),
        poise::builtins::HelpConfiguration {
            show_context_menu_commands: true,
            ..Default::default()
        },
    )
    .await
    .map_err(|e| e.into())
}

#[poise::command(prefix_command, hide_in_help)]
pub async fn register(ctx: Context<'_>) -> Result<(), Error> {
    poise::builtins::register_application_commands_buttons(ctx)
        .await
        .map_err(|e| e.into())
}
