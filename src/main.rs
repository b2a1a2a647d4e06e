use ::serenity::all::ClientBuilder;
use dotenv::dotenv;
use poise::serenity_prelude as serenity;
use songbird::{SerenityInit, Songbird};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use sil3ntbot::{
    Data, Error,
    commands::music::{
        audio_sources::YoutubeSearch,
        controls::*,
        pause::*,
        play::*,
        queue::*,
        skip::*,
        stop::*,
        utils::{
            event_handlers::{ChannelAnnouncer, CompletionLoop},
            music_manager::MusicManager,
            now_playing_panels::NowPlayingPanels,
            playlist_store::PlaylistStore,
            voice_backend::SongbirdBackend,
        },
        volume::*,
    },
    config::Config,
    events::Handler,
    help, register,
};

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Initialize logging with debug level for our crate
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("sil3ntbot=debug,warn")),
        )
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .with_target(true)
        .with_ansi(true)
        .pretty()
        .init();

    dotenv().ok();

    let config = match Config::from_env() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            error!("{}", e);
            return Err(e.into());
        }
    };

    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::GUILD_VOICE_STATES;

    let http_client = reqwest::Client::new();
    let songbird = Songbird::serenity();
    let (completions_tx, completions_rx) = mpsc::unbounded_channel();

    let backend = SongbirdBackend::new(
        songbird.clone(),
        http_client.clone(),
        config.ytdlp_cookies.clone(),
        completions_tx,
    );
    let playlists = PlaylistStore::open(config.playlists_file.clone()).await;
    info!("Loaded playlists from {}", playlists.path().display());

    let data = Data {
        music: Arc::new(MusicManager::new(backend)),
        playlists: Arc::new(playlists),
        panels: Arc::new(NowPlayingPanels::new()),
        search: Arc::new(YoutubeSearch::new(
            http_client,
            config.youtube_api_base_url.clone(),
            config.youtube_api_key.clone(),
        )),
        config: config.clone(),
    };

    let commands = vec![
        // Default commands
        register(),
        help(),
        // Music commands
        controls(),
        play(),
        pause(),
        resume(),
        stop(),
        skip(),
        volume(),
        queue(),
    ];

    let framework_data = data.clone();
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands,
            ..Default::default()
        })
        .setup(move |ctx, _ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;

                let completion_loop = CompletionLoop {
                    music: framework_data.music.clone(),
                    announcer: ChannelAnnouncer {
                        http: ctx.http.clone(),
                        playlists: framework_data.playlists.clone(),
                        panels: framework_data.panels.clone(),
                        control_channel: framework_data.config.control_channel.clone(),
                    },
                };
                tokio::spawn(completion_loop.run(completions_rx));

                Ok(framework_data)
            })
        });

    let mut client = ClientBuilder::new(&config.discord_token, intents)
        .event_handler(Handler { data })
        .framework(framework.build())
        .register_songbird_with(songbird)
        .await?;

    client.start().await.map_err(Into::into)
}
