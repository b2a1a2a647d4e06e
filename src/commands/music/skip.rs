use super::*;

/// Skip the currently playing song
#[poise::command(slash_command, category = "Music")]
pub async fn skip(ctx: Context<'_>) -> CommandResult {
    let guild_id = require_guild(&ctx)?;

    match ctx.data().music.skip(guild_id).await {
        Ok(track) => ctx.send(reply(embedded_messages::skipped(&track))).await?,
        Err(err) => ctx.send(error_reply(err)).await?,
    };

    Ok(())
}
