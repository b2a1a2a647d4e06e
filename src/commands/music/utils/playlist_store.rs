//! Persistence for the three shared playlists.
//!
//! The whole set lives in one JSON file that is rewritten on every mutation:
//!
//! ```json
//! {
//!     "playlist1": { "name": "Playlist 1", "songs": [{ "title": "...", "url": "..." }] },
//!     "playlist2": { "name": "Playlist 2", "songs": [] },
//!     "playlist3": { "name": "Playlist 3", "songs": [] }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::commands::music::audio_sources::Track;

/// Maximum number of songs a playlist can hold
pub const MAX_SONGS_PER_PLAYLIST: usize = 10;
/// Maximum length of a playlist name, matching the rename modal
pub const MAX_NAME_LENGTH: usize = 50;

/// Errors that can occur when changing a playlist
#[derive(Error, Debug)]
pub enum PlaylistError {
    #[error("Playlist {name} is full")]
    Full { name: String },

    #[error("The name cannot be empty")]
    EmptyName,

    #[error("The name cannot be longer than {max} characters")]
    NameTooLong { max: usize },

    /// The change was applied in memory but could not be written to disk.
    #[error("Playlist changed but could not be saved: {0}")]
    Unsaved(#[from] io::Error),

    #[error("Unable to serialize playlists: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// One of the three fixed playlist slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Playlist1,
    Playlist2,
    Playlist3,
}

impl Slot {
    pub const ALL: [Slot; 3] = [Slot::Playlist1, Slot::Playlist2, Slot::Playlist3];

    /// Key used in the persisted file and in component ids
    pub fn key(self) -> &'static str {
        match self {
            Slot::Playlist1 => "playlist1",
            Slot::Playlist2 => "playlist2",
            Slot::Playlist3 => "playlist3",
        }
    }

    pub fn from_key(key: &str) -> Option<Slot> {
        Slot::ALL.into_iter().find(|slot| slot.key() == key)
    }

    pub fn default_name(self) -> String {
        match self {
            Slot::Playlist1 => "Playlist 1".to_string(),
            Slot::Playlist2 => "Playlist 2".to_string(),
            Slot::Playlist3 => "Playlist 3".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub name: String,
    #[serde(default)]
    pub songs: Vec<Track>,
}

impl Playlist {
    pub fn empty(slot: Slot) -> Self {
        Self {
            name: slot.default_name(),
            songs: Vec::new(),
        }
    }

    pub fn is_full(&self) -> bool {
        self.songs.len() >= MAX_SONGS_PER_PLAYLIST
    }
}

/// The full persisted set, always holding all three slots
pub type Playlists = BTreeMap<Slot, Playlist>;

pub fn default_playlists() -> Playlists {
    Slot::ALL
        .into_iter()
        .map(|slot| (slot, Playlist::empty(slot)))
        .collect()
}

/// Read the playlists from `path`, falling back to the defaults when the
/// file is missing or unreadable.
pub async fn load(path: &Path) -> Playlists {
    let contents = match fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("No playlist file at {}, starting empty", path.display());
            return default_playlists();
        }
        Err(e) => {
            warn!("Unable to read {}: {}. Using defaults.", path.display(), e);
            return default_playlists();
        }
    };

    let mut playlists: Playlists = match serde_json::from_str(&contents) {
        Ok(playlists) => playlists,
        Err(e) => {
            warn!("Unable to parse {}: {}. Using defaults.", path.display(), e);
            return default_playlists();
        }
    };

    for slot in Slot::ALL {
        let playlist = playlists
            .entry(slot)
            .or_insert_with(|| Playlist::empty(slot));
        if playlist.songs.len() > MAX_SONGS_PER_PLAYLIST {
            warn!(
                "{} holds {} songs, keeping the first {}",
                slot.key(),
                playlist.songs.len(),
                MAX_SONGS_PER_PLAYLIST
            );
            playlist.songs.truncate(MAX_SONGS_PER_PLAYLIST);
        }
    }

    playlists
}

/// Serialize the full set with a four-space indent
pub fn to_json(playlists: &Playlists) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    playlists.serialize(&mut serializer)?;
    Ok(buf)
}

/// Replace the contents of `path` with `playlists`. Writes a sibling temp
/// file first and renames it over the target.
pub async fn save(path: &Path, playlists: &Playlists) -> Result<(), PlaylistError> {
    let json = to_json(playlists)?;

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, &json).await?;
    fs::rename(&tmp_path, path).await?;
    Ok(())
}

/// In-memory copy of the playlists plus the file it is mirrored to.
///
/// Mutations hold the lock until the file is written, so overlapping
/// interactions cannot interleave their writes.
pub struct PlaylistStore {
    path: PathBuf,
    playlists: Mutex<Playlists>,
}

impl PlaylistStore {
    /// Load the store from `path`
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let playlists = load(&path).await;
        Self {
            path,
            playlists: Mutex::new(playlists),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn snapshot(&self) -> Playlists {
        self.playlists.lock().await.clone()
    }

    pub async fn get(&self, slot: Slot) -> Playlist {
        self.playlists
            .lock()
            .await
            .get(&slot)
            .cloned()
            .unwrap_or_else(|| Playlist::empty(slot))
    }

    /// Slot and display name for every playlist, in slot order
    pub async fn names(&self) -> Vec<(Slot, String)> {
        let playlists = self.playlists.lock().await;
        Slot::ALL
            .into_iter()
            .map(|slot| {
                let name = playlists
                    .get(&slot)
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| slot.default_name());
                (slot, name)
            })
            .collect()
    }

    /// Append `track` to the playlist in `slot` and persist.
    /// Returns the updated playlist.
    pub async fn add_track(&self, slot: Slot, track: Track) -> Result<Playlist, PlaylistError> {
        let mut playlists = self.playlists.lock().await;
        let playlist = playlists
            .entry(slot)
            .or_insert_with(|| Playlist::empty(slot));

        if playlist.is_full() {
            return Err(PlaylistError::Full {
                name: playlist.name.clone(),
            });
        }

        info!("Adding '{}' to {}", track.title, playlist.name);
        playlist.songs.push(track);
        let updated = playlist.clone();

        self.persist(&playlists).await?;
        Ok(updated)
    }

    /// Rename the playlist in `slot` and persist. Returns the previous name.
    pub async fn rename(&self, slot: Slot, new_name: &str) -> Result<String, PlaylistError> {
        let new_name = validate_name(new_name)?;

        let mut playlists = self.playlists.lock().await;
        let playlist = playlists
            .entry(slot)
            .or_insert_with(|| Playlist::empty(slot));

        let old_name = std::mem::replace(&mut playlist.name, new_name);
        info!("Renamed {} from '{}' to '{}'", slot.key(), old_name, playlist.name);

        self.persist(&playlists).await?;
        Ok(old_name)
    }

    async fn persist(&self, playlists: &Playlists) -> Result<(), PlaylistError> {
        save(&self.path, playlists).await.inspect_err(|e| {
            error!(
                "Failed to save playlists to {}: {}",
                self.path.display(),
                e
            )
        })
    }
}

/// Trim `name` and check it fits a playlist name
pub fn validate_name(name: &str) -> Result<String, PlaylistError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(PlaylistError::EmptyName);
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(PlaylistError::NameTooLong {
            max: MAX_NAME_LENGTH,
        });
    }
    Ok(name.to_string())
}
