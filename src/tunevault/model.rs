use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Playlist id used for the synthetic "Liked Songs" entry returned by
/// membership queries. Never stored in the playlists table.
pub const SAVED_TRACKS_ID: &str = "__saved_tracks__";

/// A single track as mirrored from the remote service.
///
/// Identity is the `id` field: re-inserting a track with the same id is a
/// full overwrite of every other field (last-write-wins).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    /// Joined display string of all artist names, "Unknown Artist" if none.
    pub artist: String,
    pub album: String,
    pub duration_ms: u64,
    #[serde(default)]
    pub popularity: u32,
    #[serde(default)]
    pub explicit: bool,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub external_url: String,
    #[serde(default)]
    pub preview_url: String,
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub is_local: bool,
}

impl Track {
    /// Deterministic id for tracks the remote reports without one
    /// (local files, unavailable items). Derived from URI and name so the
    /// same file maps to the same row on every sync.
    pub fn derived_id(uri: &str, name: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(uri.as_bytes());
        hasher.update(b":");
        hasher.update(name.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

/// A playlist row. Upsert semantics by `id` on re-sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub collaborative: bool,
    /// Track count as reported by the remote, not derived locally.
    #[serde(default)]
    pub tracks_total: u64,
    /// Opaque remote revision token. Absent until the first successful
    /// membership sync commits it.
    #[serde(default)]
    pub snapshot_id: Option<String>,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub external_url: String,
}

impl Playlist {
    /// The pseudo-playlist representing the liked-songs collection in
    /// membership views.
    pub fn liked_songs() -> Self {
        Self {
            id: SAVED_TRACKS_ID.to_string(),
            name: "❤️ Liked Songs".to_string(),
            description: String::new(),
            owner: "You".to_string(),
            public: false,
            collaborative: false,
            tracks_total: 0,
            snapshot_id: None,
            uri: String::new(),
            external_url: String::new(),
        }
    }
}

/// Join row between playlists and tracks. The same track may appear at
/// several positions in one playlist; the full triple is the identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistEntry {
    pub playlist_id: String,
    pub track_id: String,
    /// Zero-based, matching the remote UI ordering.
    pub position: u64,
}

/// Marker that a track is in the user's liked/saved collection.
/// Unique by track id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedTrack {
    pub track_id: String,
    pub added_at: String,
}

/// A playlist enriched with every position a given track occupies in it.
/// Produced by membership queries; positions are sorted ascending and are
/// empty for the synthetic liked-songs entry.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistMembership {
    pub playlist: Playlist,
    pub positions: Vec<u64>,
}

/// One entry of the duplicate report: a track plus the number of
/// relationship rows it occupies across all playlists (always > 1).
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateTrack {
    pub track: Track,
    pub occurrences: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LibraryStats {
    pub total_tracks: u64,
    pub total_playlists: u64,
    pub saved_tracks: u64,
}

/// Case-insensitive substring filter over track fields.
///
/// All present constraints must hold: `text` matches when any of
/// name/artist/album contains it, while the field-specific constraints each
/// pin one field. This covers free-text, structured, and hybrid queries.
#[derive(Debug, Clone, Default)]
pub struct TrackFilter {
    pub text: Option<String>,
    pub name: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
}

impl TrackFilter {
    pub fn text(query: impl Into<String>) -> Self {
        Self {
            text: Some(query.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.name.is_none() && self.artist.is_none() && self.album.is_none()
    }

    pub fn matches(&self, track: &Track) -> bool {
        let name = track.name.to_lowercase();
        let artist = track.artist.to_lowercase();
        let album = track.album.to_lowercase();

        if let Some(text) = &self.text {
            let text = text.to_lowercase();
            if !name.contains(&text) && !artist.contains(&text) && !album.contains(&text) {
                return false;
            }
        }
        if let Some(q) = &self.name {
            if !name.contains(&q.to_lowercase()) {
                return false;
            }
        }
        if let Some(q) = &self.artist {
            if !artist.contains(&q.to_lowercase()) {
                return false;
            }
        }
        if let Some(q) = &self.album {
            if !album.contains(&q.to_lowercase()) {
                return false;
            }
        }
        true
    }
}
