use super::*;
use crate::commands::music::utils::queue_manager::VOLUME_STEP;

#[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
pub enum Direction {
    #[name = "up"]
    Up,
    #[name = "down"]
    Down,
}

/// Turn the volume up or down by 10%
#[poise::command(slash_command, category = "Music")]
pub async fn volume(
    ctx: Context<'_>,
    #[description = "Which way to turn the volume"] direction: Direction,
) -> CommandResult {
    let guild_id = require_guild(&ctx)?;

    let delta = match direction {
        Direction::Up => VOLUME_STEP,
        Direction::Down => -VOLUME_STEP,
    };
    let volume = ctx.data().music.adjust_volume(guild_id, delta).await;
    ctx.send(reply(embedded_messages::volume_changed(volume)))
        .await?;

    Ok(())
}
