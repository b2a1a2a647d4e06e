use serenity::all::{ComponentInteraction, VoiceState};
use serenity::async_trait;
use serenity::model::application::Interaction;
use serenity::prelude::*;
use tracing::{debug, error, info};

use crate::commands::music::utils::{
    button_controls::CONTROL_PREFIX, component_handlers, control_channel, embedded_messages,
};
use crate::{Data, Error};

pub struct Handler {
    pub data: Data,
}

#[async_trait]
impl serenity::prelude::EventHandler for Handler {
    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::Component(component) = interaction {
            if component.data.custom_id.starts_with(CONTROL_PREFIX) {
                music_component_interaction(&ctx, &self.data, &component).await;
            }
        }
    }

    async fn voice_state_update(&self, ctx: Context, old: Option<VoiceState>, new: VoiceState) {
        if let Err(e) = announce_voice_join(&ctx, &self.data, old.as_ref(), &new).await {
            error!("Error announcing voice channel join: {}", e);
        }
    }
}

/// Handle component interactions for components with identities starting with "music_"
async fn music_component_interaction(ctx: &Context, data: &Data, component: &ComponentInteraction) {
    if let Err(e) = component_handlers::handle_interaction(ctx, data, component).await {
        error!("Error handling component interaction: {}", e);
    }
}

/// Greet a member who joined or moved to a voice channel with the control surface
async fn announce_voice_join(
    ctx: &Context,
    data: &Data,
    old: Option<&VoiceState>,
    new: &VoiceState,
) -> Result<(), Error> {
    let (Some(guild_id), Some(channel_id)) = (new.guild_id, new.channel_id) else {
        return Ok(());
    };

    // Mute, deafen and stream toggles keep the same channel
    if old.and_then(|state| state.channel_id) == Some(channel_id) {
        return Ok(());
    }

    let Some(member) = &new.member else {
        debug!("Voice state update without member data in guild {}", guild_id);
        return Ok(());
    };
    if member.user.bot {
        return Ok(());
    }

    let text_channel =
        control_channel::ensure_control_channel(&ctx.http, guild_id, &data.config.control_channel)
            .await?;

    info!(
        "{} joined voice channel {} in guild {}",
        member.display_name(),
        channel_id,
        guild_id
    );

    let names = data.playlists.names().await;
    text_channel
        .send_message(
            &ctx.http,
            embedded_messages::main_controls_message(&names).content(format!(
                "{} joined {}",
                member.display_name(),
                channel_id.mention()
            )),
        )
        .await?;

    Ok(())
}
