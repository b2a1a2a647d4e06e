use super::*;
use crate::commands::music::utils::button_controls;

/// Post the music control panel in this channel
#[poise::command(slash_command, category = "Music")]
pub async fn controls(ctx: Context<'_>) -> CommandResult {
    let names = ctx.data().playlists.names().await;
    ctx.send(
        reply(embedded_messages::main_controls_embed())
            .components(button_controls::main_controls(&names)),
    )
    .await?;
    Ok(())
}
