//! Search providers that turn a free-text query into a playable `Track`.

/// Submodule defining the `Track` struct used across the music commands.
pub mod track_metadata;
/// Submodule implementing the `SearchGateway` trait for the YouTube Data API.
pub mod youtube;

use crate::commands::music::utils::music_manager::{MusicError, MusicResult};
use serenity::async_trait;
use tracing::info;

pub use track_metadata::Track;
pub use youtube::YoutubeSearch;

/// Trait defining the common interface for search providers.
/// Requires `Send + Sync` to be safely shared across handler tasks.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SearchGateway: Send + Sync {
    /// Returns the best match for `query`, or `None` when the provider has no
    /// result or the call failed. Callers report `None` as "no results".
    async fn search(&self, query: &str) -> Option<Track>;
}

/// Run a user query through the gateway, turning an empty answer into a
/// reportable `NoSearchResults`.
pub async fn find_track(gateway: &dyn SearchGateway, query: &str) -> MusicResult<Track> {
    let query = query.trim();
    if query.is_empty() {
        return Err(MusicError::NoSearchResults);
    }

    let track = gateway
        .search(query)
        .await
        .ok_or(MusicError::NoSearchResults)?;
    info!("Found '{}' for query '{}'", track.title, query);
    Ok(track)
}
