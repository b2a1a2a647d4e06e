use ::serenity::all::{
    ChannelId, ComponentInteraction, CreateActionRow, CreateEmbed,
    CreateInteractionResponseFollowup, CreateQuickModal, GuildId, Message, MessageId,
    ModalInteraction, User,
};
use poise::serenity_prelude::{self as serenity, Context};
use serenity::{InputTextStyle, builder::CreateInputText};
use std::fmt::Display;
use tracing::{error, info, warn};

use super::{
    MODAL_TIMEOUT, PROMPT_TIMEOUT,
    button_controls::{self, Control, PROMPT_PLAY_NOW, PROMPT_RENAME_YES},
    control_channel, embedded_messages,
    music_manager::{MusicError, PlayOutcome},
    playlist_store::{MAX_NAME_LENGTH, Slot},
    queue_manager::VOLUME_STEP,
};
use crate::{
    Data, Error,
    commands::music::audio_sources::{self, Track},
};

type ButtonInteractionResult = Result<(), Error>;

/// The interaction a flow answers to; prompts and notices are sent as its
/// ephemeral followups.
#[derive(Clone, Copy)]
enum Origin<'a> {
    Component(&'a ComponentInteraction),
    Modal(&'a ModalInteraction),
}

impl Origin<'_> {
    fn user(&self) -> &User {
        match self {
            Origin::Component(interaction) => &interaction.user,
            Origin::Modal(interaction) => &interaction.user,
        }
    }

    fn channel_id(&self) -> ChannelId {
        match self {
            Origin::Component(interaction) => interaction.channel_id,
            Origin::Modal(interaction) => interaction.channel_id,
        }
    }

    async fn followup(
        &self,
        ctx: &Context,
        builder: CreateInteractionResponseFollowup,
    ) -> Result<Message, Error> {
        let message = match self {
            Origin::Component(interaction) => interaction.create_followup(&ctx.http, builder).await?,
            Origin::Modal(interaction) => interaction.create_followup(&ctx.http, builder).await?,
        };
        Ok(message)
    }

    async fn discard(&self, ctx: &Context, message_id: MessageId) {
        let result = match self {
            Origin::Component(interaction) => {
                interaction.delete_followup(&ctx.http, message_id).await
            }
            Origin::Modal(interaction) => interaction.delete_followup(&ctx.http, message_id).await,
        };
        if let Err(e) = result {
            warn!("Failed to delete prompt {}: {}", message_id, e);
        }
    }
}

/// Handle a button interaction
pub async fn handle_interaction(
    ctx: &Context,
    data: &Data,
    interaction: &ComponentInteraction,
) -> ButtonInteractionResult {
    let origin = Origin::Component(interaction);

    let Some(control) = Control::from_custom_id(&interaction.data.custom_id) else {
        error!("Unknown button ID: {}", interaction.data.custom_id);
        interaction.defer(&ctx.http).await?;
        return error_followup(ctx, origin, "Unknown button action.").await;
    };

    // A modal must be the first response, so the search button is not deferred
    if control != Control::Search {
        interaction.defer(&ctx.http).await?;
    }

    let Some(guild_id) = interaction.guild_id else {
        return error_followup(ctx, origin, MusicError::NotInGuild).await;
    };

    info!(
        "Handling {:?} for user {} in guild {}",
        control, interaction.user.id, guild_id
    );

    match control {
        Control::Search => handle_search(ctx, data, interaction, guild_id).await,
        Control::Pause => match data.music.pause(guild_id).await {
            Ok(track) => notify(ctx, origin, embedded_messages::paused(&track)).await,
            Err(e) => error_followup(ctx, origin, e).await,
        },
        Control::Resume => match data.music.resume(guild_id).await {
            Ok(track) => notify(ctx, origin, embedded_messages::resumed(&track)).await,
            Err(e) => error_followup(ctx, origin, e).await,
        },
        Control::Stop => match data.music.stop(guild_id).await {
            Ok(()) => notify(ctx, origin, embedded_messages::stopped()).await,
            Err(e) => error_followup(ctx, origin, e).await,
        },
        Control::Skip => match data.music.skip(guild_id).await {
            Ok(track) => notify(ctx, origin, embedded_messages::skipped(&track)).await,
            Err(e) => error_followup(ctx, origin, e).await,
        },
        Control::VolumeUp => handle_volume(ctx, data, origin, guild_id, VOLUME_STEP).await,
        Control::VolumeDown => handle_volume(ctx, data, origin, guild_id, -VOLUME_STEP).await,
        Control::AddToPlaylist => {
            handle_add_to_playlist(ctx, data, origin, interaction.message.id).await
        }
        Control::OpenPlaylist(slot) => {
            handle_open_playlist(ctx, data, origin, guild_id, slot).await
        }
    }
}

/// Handler for Search button - presents a modal
async fn handle_search(
    ctx: &Context,
    data: &Data,
    interaction: &ComponentInteraction,
    guild_id: GuildId,
) -> ButtonInteractionResult {
    let input_text = CreateInputText::new(
        InputTextStyle::Short,
        "Song name or URL",
        "search_query_input",
    )
    .placeholder("Enter a song name...")
    .required(true);

    let modal = CreateQuickModal::new("Search Song")
        .timeout(MODAL_TIMEOUT)
        .field(input_text);

    let Some(response) = interaction.quick_modal(ctx, modal).await? else {
        return Ok(());
    };
    let modal = response.interaction;
    modal.defer(&ctx.http).await?;
    let origin = Origin::Modal(&modal);

    // This modal only has a single input field
    let query = &response.inputs[0];
    info!("Searching for '{}' in guild {}", query, guild_id);

    match audio_sources::find_track(data.search.as_ref(), query).await {
        Ok(track) => play_or_offer(ctx, data, origin, guild_id, track).await,
        Err(e) => error_followup(ctx, origin, e).await,
    }
}

/// Play `track` right away when nothing is loaded, otherwise ask whether
/// to replace the current track or queue it
async fn play_or_offer(
    ctx: &Context,
    data: &Data,
    origin: Origin<'_>,
    guild_id: GuildId,
    track: Track,
) -> ButtonInteractionResult {
    if !data.music.registry().player_state(guild_id).has_track() {
        return start_or_queue(ctx, data, origin, guild_id, track, false).await;
    }

    let Some(choice) = ask(
        ctx,
        data,
        origin,
        embedded_messages::ask_play_now(&track),
        button_controls::play_now_or_queue_buttons(),
    )
    .await?
    else {
        return Ok(());
    };

    choice.defer(&ctx.http).await?;
    let play_now = choice.data.custom_id == PROMPT_PLAY_NOW;
    start_or_queue(ctx, data, origin, guild_id, track, play_now).await
}

async fn start_or_queue(
    ctx: &Context,
    data: &Data,
    origin: Origin<'_>,
    guild_id: GuildId,
    track: Track,
    play_now: bool,
) -> ButtonInteractionResult {
    let requester_channel =
        control_channel::user_voice_channel(&ctx.cache, guild_id, origin.user().id);

    match data
        .music
        .request(guild_id, requester_channel, track, play_now)
        .await
    {
        Ok(PlayOutcome::Started(track)) => {
            let volume = data.music.registry().volume(guild_id);
            embedded_messages::post_now_playing(
                ctx.http.clone(),
                data.playlists.clone(),
                data.panels.clone(),
                origin.channel_id(),
                &track,
                volume,
            )
            .await?;
            Ok(())
        }
        Ok(PlayOutcome::Queued { track, position }) => {
            notify(
                ctx,
                origin,
                embedded_messages::added_to_queue(&track, position),
            )
            .await
        }
        Err(e) => error_followup(ctx, origin, e).await,
    }
}

async fn handle_volume(
    ctx: &Context,
    data: &Data,
    origin: Origin<'_>,
    guild_id: GuildId,
    delta: f32,
) -> ButtonInteractionResult {
    let volume = data.music.adjust_volume(guild_id, delta).await;
    notify(ctx, origin, embedded_messages::volume_changed(volume)).await
}

/// Handler for the playlist buttons: list the songs and play the chosen one
async fn handle_open_playlist(
    ctx: &Context,
    data: &Data,
    origin: Origin<'_>,
    guild_id: GuildId,
    slot: Slot,
) -> ButtonInteractionResult {
    let playlist = data.playlists.get(slot).await;
    if playlist.songs.is_empty() {
        return notify(ctx, origin, embedded_messages::playlist_songs(&playlist)).await;
    }

    let Some(choice) = ask(
        ctx,
        data,
        origin,
        embedded_messages::playlist_songs(&playlist),
        button_controls::playlist_song_buttons(&playlist.songs),
    )
    .await?
    else {
        return Ok(());
    };
    choice.defer(&ctx.http).await?;

    let Some(track) = button_controls::song_index_from_prompt(&choice.data.custom_id)
        .and_then(|index| playlist.songs.get(index).cloned())
    else {
        return error_followup(ctx, origin, "That song is no longer in the playlist.").await;
    };

    play_or_offer(ctx, data, origin, guild_id, track).await
}

/// Handler for the add to playlist button: pick a playlist, add the track
/// the pressed panel was posted for, then offer to rename the playlist
async fn handle_add_to_playlist(
    ctx: &Context,
    data: &Data,
    origin: Origin<'_>,
    panel_id: MessageId,
) -> ButtonInteractionResult {
    let Some(track) = data.panels.track(panel_id) else {
        let expired = "This player has expired, use the latest one.";
        return error_followup(ctx, origin, expired).await;
    };

    let names = data.playlists.names().await;
    let Some(choice) = ask(
        ctx,
        data,
        origin,
        embedded_messages::choose_playlist(&track),
        button_controls::playlist_picker(&names),
    )
    .await?
    else {
        return Ok(());
    };
    choice.defer(&ctx.http).await?;

    let Some(slot) = button_controls::slot_from_prompt(&choice.data.custom_id) else {
        return error_followup(ctx, origin, "Unknown playlist.").await;
    };

    let playlist = match data.playlists.add_track(slot, track.clone()).await {
        Ok(playlist) => playlist,
        Err(e) => {
            error_followup(ctx, origin, e).await?;
            return post_main_controls(ctx, data, origin.channel_id()).await;
        }
    };
    notify(
        ctx,
        origin,
        embedded_messages::added_to_playlist(&track, &playlist),
    )
    .await?;

    let Some(answer) = ask(
        ctx,
        data,
        origin,
        embedded_messages::ask_rename(slot, &playlist.name),
        button_controls::rename_prompt_buttons(),
    )
    .await?
    else {
        return Ok(());
    };

    if answer.data.custom_id == PROMPT_RENAME_YES {
        rename_playlist(ctx, data, &answer, slot, &playlist.name).await?;
    } else {
        answer.defer(&ctx.http).await?;
    }

    post_main_controls(ctx, data, origin.channel_id()).await
}

async fn rename_playlist(
    ctx: &Context,
    data: &Data,
    answer: &ComponentInteraction,
    slot: Slot,
    current_name: &str,
) -> ButtonInteractionResult {
    let input_text = CreateInputText::new(InputTextStyle::Short, "New name", "playlist_name_input")
        .placeholder(current_name)
        .max_length(MAX_NAME_LENGTH as u16)
        .required(true);

    let modal = CreateQuickModal::new("Rename Playlist")
        .timeout(MODAL_TIMEOUT)
        .field(input_text);

    let Some(response) = answer.quick_modal(ctx, modal).await? else {
        return Ok(());
    };
    let modal = response.interaction;
    modal.defer(&ctx.http).await?;
    let origin = Origin::Modal(&modal);

    match data.playlists.rename(slot, &response.inputs[0]).await {
        Ok(old_name) => {
            let new_name = data.playlists.get(slot).await.name;
            notify(
                ctx,
                origin,
                embedded_messages::playlist_renamed(&old_name, &new_name),
            )
            .await
        }
        Err(e) => error_followup(ctx, origin, e).await,
    }
}

/// Post an ephemeral prompt and wait for its author to press one of its
/// buttons. The prompt is removed either way; on timeout the main control
/// surface is posted and `None` is returned. The caller must respond to the
/// returned interaction.
async fn ask(
    ctx: &Context,
    data: &Data,
    origin: Origin<'_>,
    embed: CreateEmbed,
    components: Vec<CreateActionRow>,
) -> Result<Option<ComponentInteraction>, Error> {
    let prompt = origin
        .followup(
            ctx,
            CreateInteractionResponseFollowup::new()
                .embed(embed)
                .components(components)
                .ephemeral(true),
        )
        .await?;

    let answer = prompt
        .await_component_interaction(&ctx.shard)
        .author_id(origin.user().id)
        .timeout(PROMPT_TIMEOUT)
        .await;

    origin.discard(ctx, prompt.id).await;

    if answer.is_none() {
        info!("Prompt {} timed out", prompt.id);
        post_main_controls(ctx, data, origin.channel_id()).await?;
    }
    Ok(answer)
}

async fn post_main_controls(
    ctx: &Context,
    data: &Data,
    channel_id: ChannelId,
) -> ButtonInteractionResult {
    let names = data.playlists.names().await;
    channel_id
        .send_message(&ctx.http, embedded_messages::main_controls_message(&names))
        .await?;
    Ok(())
}

async fn notify(ctx: &Context, origin: Origin<'_>, embed: CreateEmbed) -> ButtonInteractionResult {
    origin
        .followup(
            ctx,
            CreateInteractionResponseFollowup::new()
                .embed(embed)
                .ephemeral(true),
        )
        .await?;
    Ok(())
}

/// Send an ephemeral error followup
async fn error_followup(
    ctx: &Context,
    origin: Origin<'_>,
    message: impl Display,
) -> ButtonInteractionResult {
    notify(ctx, origin, embedded_messages::error(message)).await
}
