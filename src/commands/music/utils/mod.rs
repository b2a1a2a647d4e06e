use std::time::Duration;

// Export music utilities
pub mod button_controls;
pub mod component_handlers;
pub mod control_channel;
pub mod embedded_messages;
pub mod event_handlers;
pub mod music_manager;
pub mod now_playing_panels;
pub mod playlist_store;
pub mod queue_manager;
pub mod voice_backend;

/// How long a yes/no or picker prompt waits for an answer
pub const PROMPT_TIMEOUT: Duration = Duration::from_secs(30);
/// How long the now playing panel keeps its buttons
pub const PANEL_TIMEOUT: Duration = Duration::from_secs(20);
/// How long a text modal stays open
pub const MODAL_TIMEOUT: Duration = Duration::from_secs(300);
