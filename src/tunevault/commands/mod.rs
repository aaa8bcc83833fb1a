use crate::model::{LibraryStats, Playlist, PlaylistMembership, Track};
use chrono::{DateTime, Utc};

pub mod clear;
pub mod duplicates;
pub mod list;
pub mod search;
pub mod stats;
pub mod sync;
pub mod sync_diff;

#[derive(Debug, Clone)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

/// One track in a query result, enriched with everything the CLI renders
/// for it: its playlist memberships and, for the duplicate report, the
/// occurrence count.
#[derive(Debug, Clone)]
pub struct TrackReport {
    pub track: Track,
    pub memberships: Vec<PlaylistMembership>,
    pub occurrences: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct PlaylistDetail {
    pub playlist: Playlist,
    pub tracks: Vec<Track>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SyncReport {
    pub saved_tracks: u64,
    pub playlists: u64,
    pub playlists_updated: u64,
    pub playlists_skipped: u64,
    pub total_tracks: u64,
}

#[derive(Debug, Clone)]
pub struct StatsReport {
    pub stats: LibraryStats,
    pub total_hours: f64,
    pub top_artists: Vec<(String, u64)>,
    pub last_synced: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub track_reports: Vec<TrackReport>,
    pub playlists: Vec<Playlist>,
    pub playlist_detail: Option<PlaylistDetail>,
    pub stats: Option<StatsReport>,
    pub sync: Option<SyncReport>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_track_reports(mut self, reports: Vec<TrackReport>) -> Self {
        self.track_reports = reports;
        self
    }

    pub fn with_playlists(mut self, playlists: Vec<Playlist>) -> Self {
        self.playlists = playlists;
        self
    }

    pub fn with_playlist_detail(mut self, detail: PlaylistDetail) -> Self {
        self.playlist_detail = Some(detail);
        self
    }

    pub fn with_stats(mut self, stats: StatsReport) -> Self {
        self.stats = Some(stats);
        self
    }

    pub fn with_sync(mut self, sync: SyncReport) -> Self {
        self.sync = Some(sync);
        self
    }
}

/// Receives sync progress so the CLI can render feedback while a fetch is
/// running. Callbacks are synchronous; they must not block or they stall
/// the fetch loop.
pub trait SyncObserver {
    /// A new fetch phase started (saved tracks, playlist listing).
    fn phase(&mut self, _label: &str) {}

    /// Membership fetch for one playlist is starting.
    fn playlist(&mut self, _index: u64, _total: u64, _name: &str, _tracks_total: u64) {}

    /// A paginated fetch advanced to `current` of `total` pages.
    fn page(&mut self, _current: u64, _total: u64) {}
}

/// Observer that discards all progress. Used by tests and quiet paths.
pub struct NullObserver;

impl SyncObserver for NullObserver {}

#[cfg(test)]
pub(crate) mod testing {
    use crate::error::{Result, VaultError};
    use crate::model::{Playlist, Track};
    use crate::remote::{PageProgress, RemoteLibrary, RemoteUser, SavedItem};
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Stub remote for sync scenarios, mirroring the shape of the real
    /// client: fixed data in, call counting out.
    #[derive(Default)]
    pub struct FakeRemote {
        pub saved: Vec<SavedItem>,
        pub playlists: Vec<Playlist>,
        pub tracks_by_playlist: HashMap<String, Vec<(Track, u64)>>,
        pub fail_playlist_fetch: bool,
        pub membership_fetches: RefCell<u64>,
    }

    impl FakeRemote {
        pub fn track(id: &str, name: &str) -> Track {
            Track {
                id: id.into(),
                name: name.into(),
                artist: "Artist".into(),
                album: "Album".into(),
                duration_ms: 180_000,
                popularity: 50,
                explicit: false,
                uri: format!("spotify:track:{}", id),
                external_url: String::new(),
                preview_url: String::new(),
                release_date: "2020-01-01".into(),
                is_local: false,
            }
        }

        pub fn playlist(id: &str, name: &str, tracks_total: u64, snapshot: Option<&str>) -> Playlist {
            Playlist {
                id: id.into(),
                name: name.into(),
                description: String::new(),
                owner: "Owner".into(),
                public: false,
                collaborative: false,
                tracks_total,
                snapshot_id: snapshot.map(String::from),
                uri: String::new(),
                external_url: String::new(),
            }
        }
    }

    impl RemoteLibrary for FakeRemote {
        fn current_user(&self) -> Result<RemoteUser> {
            Ok(RemoteUser {
                display_name: "Test User".into(),
                email: None,
                country: None,
            })
        }

        fn saved_tracks_total(&self) -> Result<u64> {
            Ok(self.saved.len() as u64)
        }

        fn saved_tracks(&self, progress: PageProgress) -> Result<Vec<SavedItem>> {
            progress(1, 1);
            Ok(self.saved.clone())
        }

        fn user_playlists(&self, progress: PageProgress) -> Result<Vec<Playlist>> {
            progress(1, 1);
            Ok(self.playlists.clone())
        }

        fn playlist_tracks(
            &self,
            playlist_id: &str,
            progress: PageProgress,
        ) -> Result<Vec<(Track, u64)>> {
            *self.membership_fetches.borrow_mut() += 1;
            if self.fail_playlist_fetch {
                return Err(VaultError::Api("simulated fetch failure".into()));
            }
            progress(1, 1);
            Ok(self
                .tracks_by_playlist
                .get(playlist_id)
                .cloned()
                .unwrap_or_default())
        }
    }
}
