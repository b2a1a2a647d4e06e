//! This module aggregates all the command modules for the bot.

/// Commands and controls for music playback.
pub mod music;
