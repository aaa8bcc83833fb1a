//! # Remote Library Client
//!
//! The interface the sync commands consume from the streaming service,
//! abstracted behind a trait so sync logic is testable with a stub client.
//!
//! All calls are synchronous and blocking. Paginated calls report progress
//! through a `(current_page, total_pages)` callback, invoked zero or more
//! times and finishing with `current == total`. Callbacks must return
//! quickly or they stall the fetch loop.

use crate::error::Result;
use crate::model::{Playlist, Track};

pub mod spotify;

pub use spotify::SpotifyRemote;

/// Progress callback for paginated fetches: `(current_page, total_pages)`.
pub type PageProgress<'a> = &'a mut dyn FnMut(u64, u64);

#[derive(Debug, Clone, Default)]
pub struct RemoteUser {
    pub display_name: String,
    pub email: Option<String>,
    pub country: Option<String>,
}

/// One liked track together with the time it was saved.
#[derive(Debug, Clone)]
pub struct SavedItem {
    pub track: Track,
    pub added_at: String,
}

pub trait RemoteLibrary {
    fn current_user(&self) -> Result<RemoteUser>;

    /// Total liked-track count, without fetching all pages.
    fn saved_tracks_total(&self) -> Result<u64>;

    fn saved_tracks(&self, progress: PageProgress) -> Result<Vec<SavedItem>>;

    fn user_playlists(&self, progress: PageProgress) -> Result<Vec<Playlist>>;

    /// Full membership of a playlist as `(track, position)` pairs.
    ///
    /// Positions count every remote item in original order, including items
    /// that are unavailable and dropped from the result, so stored positions
    /// always match the remote UI ordering.
    fn playlist_tracks(&self, playlist_id: &str, progress: PageProgress)
        -> Result<Vec<(Track, u64)>>;
}
