use super::*;

/// Stop the music and clear the queue
#[poise::command(slash_command, category = "Music")]
pub async fn stop(ctx: Context<'_>) -> CommandResult {
    let guild_id = require_guild(&ctx)?;

    match ctx.data().music.stop(guild_id).await {
        Ok(()) => ctx.send(reply(embedded_messages::stopped())).await?,
        Err(err) => ctx.send(error_reply(err)).await?,
    };

    Ok(())
}
