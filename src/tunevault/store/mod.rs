//! # Storage Layer
//!
//! The local mirror of the remote library. [`StorageBackend`] handles raw
//! document I/O and [`MirrorStore`] carries the data-access contract the
//! commands consume.
//!
//! ## Implementations
//!
//! - [`fs::FsBackend`]: production storage, one JSON document on disk
//! - [`memory::MemBackend`]: in-memory storage for fast, isolated tests
//!
//! ## Storage Format
//!
//! A single JSON object with four top-level tables, each a list of flat
//! records:
//!
//! ```text
//! library.json
//! ├── tracks           # Track rows, keyed by id
//! ├── playlists        # Playlist rows, keyed by id
//! ├── playlist_tracks  # (playlist_id, track_id, position) join rows
//! └── saved_tracks     # (track_id, added_at) liked markers
//! ```
//!
//! ## Write Caching
//!
//! The store buffers the whole document in memory and writes it back only
//! on [`MirrorStore::flush`]. The CLI flushes once at process end, mirroring
//! the original cached-storage behavior. The file is not safe for
//! concurrent writers from other processes.
//!
//! ## Dangling Relationships
//!
//! Join rows whose track or playlist no longer exists are expected (a crash
//! between clear and insert, manual edits) and are silently skipped by all
//! read queries, never raised as errors.

use crate::error::Result;
use crate::model::{
    DuplicateTrack, LibraryStats, Playlist, PlaylistEntry, PlaylistMembership, SavedTrack, Track,
    TrackFilter,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub mod backend;
pub mod fs;
pub mod memory;

pub use backend::StorageBackend;

/// The persisted document: four flat tables plus a sync timestamp.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LibraryDocument {
    #[serde(default)]
    pub tracks: Vec<Track>,
    #[serde(default)]
    pub playlists: Vec<Playlist>,
    #[serde(default)]
    pub playlist_tracks: Vec<PlaylistEntry>,
    #[serde(default)]
    pub saved_tracks: Vec<SavedTrack>,
    #[serde(default)]
    pub last_synced: Option<DateTime<Utc>>,
}

/// Domain layer over a [`StorageBackend`]: upserts, scoped truncation, and
/// relationship queries. No business logic lives here.
pub struct MirrorStore<B: StorageBackend> {
    backend: B,
    doc: LibraryDocument,
    dirty: bool,
}

impl<B: StorageBackend> MirrorStore<B> {
    pub fn open(backend: B) -> Result<Self> {
        let doc = backend.load()?;
        Ok(Self {
            backend,
            doc,
            dirty: false,
        })
    }

    /// Write the buffered document back if anything changed.
    pub fn flush(&mut self) -> Result<()> {
        if self.dirty {
            self.backend.save(&self.doc)?;
            self.dirty = false;
        }
        Ok(())
    }

    // --- Truncation ---

    pub fn clear_all(&mut self) {
        self.doc.tracks.clear();
        self.doc.playlists.clear();
        self.doc.playlist_tracks.clear();
        self.doc.saved_tracks.clear();
        self.dirty = true;
    }

    pub fn clear_saved_tracks(&mut self) {
        self.doc.saved_tracks.clear();
        self.dirty = true;
    }

    /// Remove all join rows for one playlist, used before a rewrite.
    pub fn clear_playlist_entries(&mut self, playlist_id: &str) {
        self.doc
            .playlist_tracks
            .retain(|e| e.playlist_id != playlist_id);
        self.dirty = true;
    }

    // --- Tracks ---

    /// Insert or fully overwrite a track by id.
    pub fn upsert_track(&mut self, track: &Track) {
        match self.doc.tracks.iter_mut().find(|t| t.id == track.id) {
            Some(existing) => *existing = track.clone(),
            None => self.doc.tracks.push(track.clone()),
        }
        self.dirty = true;
    }

    pub fn get_track(&self, track_id: &str) -> Option<&Track> {
        self.doc.tracks.iter().find(|t| t.id == track_id)
    }

    pub fn all_tracks(&self) -> &[Track] {
        &self.doc.tracks
    }

    pub fn search_tracks(&self, filter: &TrackFilter) -> Vec<Track> {
        self.doc
            .tracks
            .iter()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect()
    }

    // --- Playlists ---

    /// Insert or fully overwrite a playlist by id.
    pub fn upsert_playlist(&mut self, playlist: &Playlist) {
        match self
            .doc
            .playlists
            .iter_mut()
            .find(|p| p.id == playlist.id)
        {
            Some(existing) => *existing = playlist.clone(),
            None => self.doc.playlists.push(playlist.clone()),
        }
        self.dirty = true;
    }

    pub fn get_playlist(&self, playlist_id: &str) -> Option<&Playlist> {
        self.doc.playlists.iter().find(|p| p.id == playlist_id)
    }

    pub fn all_playlists(&self) -> &[Playlist] {
        &self.doc.playlists
    }

    /// Update only the snapshot marker. This is the last write of a
    /// playlist resync; everything before it is retried if we crash.
    pub fn set_playlist_snapshot(&mut self, playlist_id: &str, snapshot_id: &str) {
        if let Some(pl) = self
            .doc
            .playlists
            .iter_mut()
            .find(|p| p.id == playlist_id)
        {
            pl.snapshot_id = Some(snapshot_id.to_string());
            self.dirty = true;
        }
    }

    // --- Playlist-track relationships ---

    /// Insert a join row unless the identical (playlist, track, position)
    /// triple already exists. The same track at a different position is a
    /// new row, not a replacement.
    pub fn add_playlist_entry(&mut self, playlist_id: &str, track_id: &str, position: u64) {
        let exists = self.doc.playlist_tracks.iter().any(|e| {
            e.playlist_id == playlist_id && e.track_id == track_id && e.position == position
        });
        if !exists {
            self.doc.playlist_tracks.push(PlaylistEntry {
                playlist_id: playlist_id.to_string(),
                track_id: track_id.to_string(),
                position,
            });
            self.dirty = true;
        }
    }

    pub fn playlist_entry_count(&self, playlist_id: &str) -> u64 {
        self.doc
            .playlist_tracks
            .iter()
            .filter(|e| e.playlist_id == playlist_id)
            .count() as u64
    }

    /// Tracks of a playlist ordered by ascending position. Rows whose
    /// track id has no track record are skipped.
    pub fn playlist_tracks(&self, playlist_id: &str) -> Vec<Track> {
        let mut entries: Vec<&PlaylistEntry> = self
            .doc
            .playlist_tracks
            .iter()
            .filter(|e| e.playlist_id == playlist_id)
            .collect();
        entries.sort_by_key(|e| e.position);

        entries
            .iter()
            .filter_map(|e| self.get_track(&e.track_id).cloned())
            .collect()
    }

    /// Every playlist containing the given track, with all its positions
    /// grouped and sorted. Appends the synthetic liked-songs entry when the
    /// track carries a saved marker. The result is ordered
    /// case-insensitively by playlist name for deterministic output.
    pub fn playlists_for_track(&self, track_id: &str) -> Vec<PlaylistMembership> {
        let mut positions_per_playlist: HashMap<&str, Vec<u64>> = HashMap::new();
        for entry in self
            .doc
            .playlist_tracks
            .iter()
            .filter(|e| e.track_id == track_id)
        {
            positions_per_playlist
                .entry(entry.playlist_id.as_str())
                .or_default()
                .push(entry.position);
        }

        let mut memberships: Vec<PlaylistMembership> = positions_per_playlist
            .into_iter()
            .filter_map(|(playlist_id, mut positions)| {
                let playlist = self.get_playlist(playlist_id)?.clone();
                positions.sort_unstable();
                Some(PlaylistMembership {
                    playlist,
                    positions,
                })
            })
            .collect();

        if self.is_saved(track_id) {
            memberships.push(PlaylistMembership {
                playlist: Playlist::liked_songs(),
                positions: Vec::new(),
            });
        }

        memberships.sort_by_key(|m| m.playlist.name.to_lowercase());
        memberships
    }

    // --- Saved tracks ---

    /// Mark a track as saved. A track cannot be saved twice; re-adding an
    /// existing marker is a no-op.
    pub fn add_saved_track(&mut self, track_id: &str, added_at: &str) {
        let exists = self.doc.saved_tracks.iter().any(|s| s.track_id == track_id);
        if !exists {
            self.doc.saved_tracks.push(SavedTrack {
                track_id: track_id.to_string(),
                added_at: added_at.to_string(),
            });
            self.dirty = true;
        }
    }

    pub fn is_saved(&self, track_id: &str) -> bool {
        self.doc.saved_tracks.iter().any(|s| s.track_id == track_id)
    }

    pub fn saved_track_count(&self) -> u64 {
        self.doc.saved_tracks.len() as u64
    }

    /// Saved markers joined with their track rows; dangling markers are
    /// skipped.
    pub fn saved_tracks(&self) -> Vec<(Track, String)> {
        self.doc
            .saved_tracks
            .iter()
            .filter_map(|s| {
                let track = self.get_track(&s.track_id)?.clone();
                Some((track, s.added_at.clone()))
            })
            .collect()
    }

    // --- Aggregates ---

    pub fn stats(&self) -> LibraryStats {
        LibraryStats {
            total_tracks: self.doc.tracks.len() as u64,
            total_playlists: self.doc.playlists.len() as u64,
            saved_tracks: self.doc.saved_tracks.len() as u64,
        }
    }

    /// Tracks occupying more than one relationship row across all
    /// playlists, sorted by descending count then track name.
    pub fn duplicate_tracks(&self) -> Vec<DuplicateTrack> {
        let mut counts: HashMap<&str, u64> = HashMap::new();
        for entry in &self.doc.playlist_tracks {
            *counts.entry(entry.track_id.as_str()).or_default() += 1;
        }

        let mut dupes: Vec<DuplicateTrack> = counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .filter_map(|(track_id, occurrences)| {
                let track = self.get_track(track_id)?.clone();
                Some(DuplicateTrack { track, occurrences })
            })
            .collect();

        dupes.sort_by(|a, b| {
            b.occurrences
                .cmp(&a.occurrences)
                .then_with(|| a.track.name.cmp(&b.track.name))
        });
        dupes
    }

    pub fn last_synced(&self) -> Option<DateTime<Utc>> {
        self.doc.last_synced
    }

    pub fn mark_synced(&mut self, at: DateTime<Utc>) {
        self.doc.last_synced = Some(at);
        self.dirty = true;
    }
}
