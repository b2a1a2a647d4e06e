use poise::serenity_prelude as serenity;
use serenity::{ChannelType, CreateChannel, GuildId, Http};
use tracing::info;

use crate::Error;

/// Find the guild text channel named `name`, creating it when missing
pub async fn ensure_control_channel(
    http: &Http,
    guild_id: GuildId,
    name: &str,
) -> Result<serenity::ChannelId, Error> {
    let channels = guild_id.channels(http).await?;

    if let Some(channel) = channels
        .values()
        .find(|channel| channel.kind == ChannelType::Text && channel.name == name)
    {
        return Ok(channel.id);
    }

    info!("Creating control channel #{} in guild {}", name, guild_id);
    let channel = guild_id
        .create_channel(http, CreateChannel::new(name).kind(ChannelType::Text))
        .await?;

    Ok(channel.id)
}

/// The voice channel `user_id` is currently connected to, read from the cache
pub fn user_voice_channel(
    cache: &serenity::Cache,
    guild_id: GuildId,
    user_id: serenity::UserId,
) -> Option<serenity::ChannelId> {
    let guild = cache.guild(guild_id)?;
    guild.voice_states.get(&user_id)?.channel_id
}
