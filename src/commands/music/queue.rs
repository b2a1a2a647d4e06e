use super::*;

/// View the current music queue
#[poise::command(slash_command, category = "Music")]
pub async fn queue(ctx: Context<'_>) -> CommandResult {
    let guild_id = require_guild(&ctx)?;
    let registry = ctx.data().music.registry();

    let current = registry.now_playing(guild_id);
    let queue = registry.queue(guild_id);
    ctx.send(reply(embedded_messages::music_queue(current.as_ref(), &queue)))
        .await?;

    Ok(())
}
