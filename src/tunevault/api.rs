//! # API Facade
//!
//! Thin facade over the command layer: the single entry point for every
//! tunevault operation, regardless of the UI driving it.
//!
//! The facade dispatches to command functions and returns structured
//! `Result<CmdResult>` values. It does no business logic, no I/O
//! formatting, and never touches stdout or the process exit code.
//!
//! `VaultApi<B: StorageBackend>` is generic over the storage backend:
//! production runs on `FsBackend`, tests on `MemBackend` without touching
//! the filesystem.

use crate::commands;
use crate::commands::{CmdResult, SyncObserver};
use crate::error::Result;
use crate::model::TrackFilter;
use crate::remote::RemoteLibrary;
use crate::store::{MirrorStore, StorageBackend};

pub struct VaultApi<B: StorageBackend> {
    store: MirrorStore<B>,
}

impl<B: StorageBackend> VaultApi<B> {
    pub fn open(backend: B) -> Result<Self> {
        Ok(Self {
            store: MirrorStore::open(backend)?,
        })
    }

    /// Write buffered store changes back to the backend. The CLI calls
    /// this once at process end, even after a failed sync, so partially
    /// committed collections survive exactly as last written.
    pub fn flush(&mut self) -> Result<()> {
        self.store.flush()
    }

    pub fn sync_full<R: RemoteLibrary>(
        &mut self,
        remote: &R,
        clear: bool,
        observer: &mut dyn SyncObserver,
    ) -> Result<CmdResult> {
        commands::sync::run(&mut self.store, remote, clear, observer)
    }

    pub fn sync_diff<R: RemoteLibrary>(
        &mut self,
        remote: &R,
        observer: &mut dyn SyncObserver,
    ) -> Result<CmdResult> {
        commands::sync_diff::run(&mut self.store, remote, observer)
    }

    pub fn search(&self, filter: &TrackFilter, limit: usize) -> Result<CmdResult> {
        commands::search::run(&self.store, filter, limit)
    }

    pub fn list(&self, playlist_name: Option<&str>) -> Result<CmdResult> {
        commands::list::run(&self.store, playlist_name)
    }

    pub fn stats(&self) -> Result<CmdResult> {
        commands::stats::run(&self.store)
    }

    pub fn duplicates(&self, limit: usize) -> Result<CmdResult> {
        commands::duplicates::run(&self.store, limit)
    }

    pub fn clear_cache(&mut self) -> Result<CmdResult> {
        commands::clear::run(&mut self.store)
    }
}

pub use crate::commands::{
    CmdMessage, MessageLevel, NullObserver, PlaylistDetail, StatsReport, SyncReport, TrackReport,
};
