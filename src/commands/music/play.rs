use super::*;
use crate::commands::music::{
    audio_sources,
    utils::{control_channel, music_manager::PlayOutcome},
};
use tracing::info;

/// Search YouTube and play the first result, queueing it if something is already playing
#[poise::command(slash_command, category = "Music")]
pub async fn play(
    ctx: Context<'_>,
    #[description = "Song name or URL"] query: String,
) -> CommandResult {
    info!("Received play command with query: {}", query);
    let guild_id = require_guild(&ctx)?;
    let data = ctx.data();

    // Searching and joining the channel might take a while
    ctx.defer_ephemeral().await?;

    let track = match audio_sources::find_track(data.search.as_ref(), &query).await {
        Ok(track) => track,
        Err(err) => {
            ctx.send(error_reply(err)).await?;
            return Ok(());
        }
    };

    let requester_channel =
        control_channel::user_voice_channel(ctx.cache(), guild_id, ctx.author().id);

    match data
        .music
        .request(guild_id, requester_channel, track, false)
        .await
    {
        Ok(PlayOutcome::Started(track)) => {
            let volume = data.music.registry().volume(guild_id);
            embedded_messages::post_now_playing(
                ctx.serenity_context().http.clone(),
                data.playlists.clone(),
                data.panels.clone(),
                ctx.channel_id(),
                &track,
                volume,
            )
            .await?;
            ctx.send(reply(embedded_messages::now_playing(&track, volume)))
                .await?;
        }
        Ok(PlayOutcome::Queued { track, position }) => {
            ctx.send(reply(embedded_messages::added_to_queue(&track, position)))
                .await?;
        }
        Err(err) => {
            ctx.send(error_reply(err)).await?;
        }
    }

    Ok(())
}
