//! Domain model for the playlist service
//!
//! Song, Playlist, and User records, with conversion between the typed model
//! and the plain JSON mapping shape the stores persist and the web layer
//! exchanges.
//!
//! Decoding is explicit and loud: a malformed song fails the whole playlist
//! decode with an error naming the offending field, instead of silently
//! dropping list members.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{MeloError, Result};

/// Decode a JSON mapping into a typed record
///
/// The serde error already names the missing/mistyped field; `what` adds
/// which record kind was being decoded.
fn decode<T: DeserializeOwned>(what: &str, value: &Value) -> Result<T> {
    serde_json::from_value(value.clone())
        .map_err(|e| MeloError::InvalidArgument(format!("malformed {} record: {}", what, e)))
}

// =============================================================================
// Song
// =============================================================================

/// One song within a playlist
///
/// An immutable value with no identity beyond structural equality by name
/// within its playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    /// Song title
    pub name: String,
    /// Source URL the player streams from
    pub url: String,
    /// Duration in seconds, kept string-encoded as received from the source
    pub duration: String,
    /// Artist name
    pub author: String,
}

impl Song {
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        duration: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            duration: duration.into(),
            author: author.into(),
        }
    }

    /// Decode from a JSON mapping; all four fields are required
    pub fn from_value(value: &Value) -> Result<Self> {
        decode("song", value)
    }

    /// The persisted/wire mapping shape
    pub fn to_value(&self) -> Value {
        json!({
            "name": self.name,
            "url": self.url,
            "duration": self.duration,
            "author": self.author,
        })
    }
}

// =============================================================================
// Playlist
// =============================================================================

/// A named, ordered sequence of songs
///
/// Insertion order is significant and duplicates are allowed. A playlist is
/// owned exclusively by the user row containing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    /// Playlist name, unique within its owning user
    pub name: String,
    /// Songs in play order
    pub songs: Vec<Song>,
}

impl Playlist {
    /// Create an empty playlist
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            songs: Vec::new(),
        }
    }

    /// Append a song (duplicates allowed)
    pub fn push(&mut self, song: Song) {
        self.songs.push(song);
    }

    /// True iff a song with this name is in the playlist
    pub fn contains_song(&self, name: &str) -> bool {
        self.songs.iter().any(|s| s.name == name)
    }

    /// First song with this name, if any
    pub fn song(&self, name: &str) -> Option<&Song> {
        self.songs.iter().find(|s| s.name == name)
    }

    /// Remove the first song with this name, returning it
    pub fn remove_song(&mut self, name: &str) -> Option<Song> {
        let position = self.songs.iter().position(|s| s.name == name)?;
        Some(self.songs.remove(position))
    }

    /// Number of songs
    pub fn len(&self) -> usize {
        self.songs.len()
    }

    /// True iff the playlist holds no songs
    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    /// Decode from a JSON mapping
    ///
    /// Requires `name` and a `songs` sequence; any malformed song fails the
    /// whole decode.
    pub fn from_value(value: &Value) -> Result<Self> {
        decode("playlist", value)
    }

    /// The persisted/wire mapping shape
    pub fn to_value(&self) -> Value {
        json!({
            "name": self.name,
            "songs": self.songs,
        })
    }
}

// =============================================================================
// User
// =============================================================================

/// Session capabilities consumed by the auth layer
///
/// The core only stores these; enforcement happens in the web layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionFlags {
    /// May establish a browser login session
    pub web_session: bool,
    /// May authenticate requests with the API key
    pub api_access: bool,
}

impl Default for SessionFlags {
    fn default() -> Self {
        Self {
            web_session: true,
            api_access: true,
        }
    }
}

/// A user account: the decoded value of one row in the `users` database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique name; immutable after creation and always equal to the row key
    /// the record is stored under
    pub username: String,
    /// Password hash (never plaintext; hashing lives in the auth layer)
    pub password: String,
    /// API key token for non-session access
    pub apikey: String,
    /// The user's playlists (order irrelevant, names unique)
    pub playlists: Vec<Playlist>,
    /// Session capabilities; defaulted for rows written before the field
    /// existed
    #[serde(default)]
    pub flags: SessionFlags,
}

impl User {
    /// Create a user with no playlists and default capabilities
    pub fn new(
        username: impl Into<String>,
        password_hash: impl Into<String>,
        apikey: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password_hash.into(),
            apikey: apikey.into(),
            playlists: Vec::new(),
            flags: SessionFlags::default(),
        }
    }

    /// Decode from a JSON mapping
    ///
    /// Requires `username`, `password`, `apikey`, and a `playlists` sequence.
    pub fn from_value(value: &Value) -> Result<Self> {
        decode("user", value)
    }

    /// The persisted mapping shape (everything, including secrets)
    pub fn to_value(&self) -> Value {
        json!({
            "username": self.username,
            "password": self.password,
            "apikey": self.apikey,
            "playlists": self.playlists,
            "flags": self.flags,
        })
    }

    // -------------------------------------------------------------------------
    // Playlist access
    // -------------------------------------------------------------------------

    /// True iff the user owns a playlist with this name
    pub fn has_playlist(&self, name: &str) -> bool {
        self.playlists.iter().any(|p| p.name == name)
    }

    /// The playlist with this name, if any
    pub fn playlist(&self, name: &str) -> Option<&Playlist> {
        self.playlists.iter().find(|p| p.name == name)
    }

    /// Mutable access to the playlist with this name, if any
    pub fn playlist_mut(&mut self, name: &str) -> Option<&mut Playlist> {
        self.playlists.iter_mut().find(|p| p.name == name)
    }

    /// Add a playlist
    ///
    /// Fails with `AlreadyExists` if the user already owns one with the same
    /// name.
    pub fn add_playlist(&mut self, playlist: Playlist) -> Result<()> {
        if self.has_playlist(&playlist.name) {
            return Err(MeloError::already_exists(playlist.name.clone()));
        }
        self.playlists.push(playlist);
        Ok(())
    }

    /// Remove the playlist with this name, returning it
    ///
    /// Fails with `NotFound` if the user owns no such playlist.
    pub fn remove_playlist(&mut self, name: &str) -> Result<Playlist> {
        let position = self
            .playlists
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| MeloError::not_found(name))?;
        Ok(self.playlists.remove(position))
    }

    // -------------------------------------------------------------------------
    // Key handling and response shaping
    // -------------------------------------------------------------------------

    /// Replace the API key, returning the previous one
    ///
    /// Key material comes from the caller; the core carries no RNG policy.
    pub fn rotate_apikey(&mut self, new_key: impl Into<String>) -> String {
        std::mem::replace(&mut self.apikey, new_key.into())
    }

    /// The shape handed to clients: no password hash, no API key
    pub fn public_view(&self) -> Value {
        json!({
            "username": self.username,
            "playlists": self.playlists,
        })
    }

    /// The key-exchange payload returned once after login
    pub fn apikey_view(&self) -> Value {
        json!({
            "username": self.username,
            "apikey": self.apikey,
        })
    }
}
