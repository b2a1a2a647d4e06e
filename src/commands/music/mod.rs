//! Voice playback: slash commands plus the button-driven control surface.

pub mod controls;
pub mod pause;
pub mod play;
pub mod queue;
pub mod skip;
pub mod stop;
pub mod volume;

pub mod audio_sources;
pub mod utils;

use poise::{CreateReply, serenity_prelude as serenity};
use serenity::all::{CreateEmbed, GuildId};
use std::fmt::Display;

use crate::{CommandResult, Context, Error};
use utils::{embedded_messages, music_manager::MusicError};

fn require_guild(ctx: &Context<'_>) -> Result<GuildId, Error> {
    ctx.guild_id()
        .ok_or_else(|| Box::new(MusicError::NotInGuild) as Error)
}

fn reply(embed: CreateEmbed) -> CreateReply {
    CreateReply::default().embed(embed)
}

/// Errors caused by the user are shown only to them
fn error_reply(err: impl Display) -> CreateReply {
    CreateReply::default()
        .embed(embedded_messages::error(err))
        .ephemeral(true)
}
