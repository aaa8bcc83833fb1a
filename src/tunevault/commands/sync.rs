use crate::commands::{CmdMessage, CmdResult, SyncObserver, SyncReport};
use crate::error::Result;
use crate::model::Playlist;
use crate::remote::RemoteLibrary;
use crate::store::{MirrorStore, StorageBackend};
use chrono::Utc;

/// Full sync: unconditionally fetch and replace liked tracks and every
/// playlist's membership. With `clear`, all local collections are
/// truncated first.
///
/// There is no global transaction: a remote failure mid-way aborts and
/// leaves collections committed before the failure as last written.
pub fn run<B: StorageBackend, R: RemoteLibrary>(
    store: &mut MirrorStore<B>,
    remote: &R,
    clear: bool,
    observer: &mut dyn SyncObserver,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();

    if clear {
        store.clear_all();
        result.add_message(CmdMessage::info("Cleared existing data"));
    }

    let user = remote.current_user()?;
    result.add_message(CmdMessage::info(format!("User: {}", user.display_name)));

    // Saved tracks: fetch everything, then replace the marker collection.
    observer.phase("Fetching saved tracks");
    let saved = remote.saved_tracks(&mut |current, total| observer.page(current, total))?;

    store.clear_saved_tracks();
    for item in &saved {
        store.upsert_track(&item.track);
        store.add_saved_track(&item.track.id, &item.added_at);
    }
    result.add_message(CmdMessage::success(format!(
        "Saved {} liked tracks",
        saved.len()
    )));

    observer.phase("Fetching playlists");
    let playlists = remote.user_playlists(&mut |current, total| observer.page(current, total))?;
    result.add_message(CmdMessage::success(format!(
        "Found {} playlists",
        playlists.len()
    )));

    let playlist_count = playlists.len() as u64;
    for (i, playlist) in playlists.iter().enumerate() {
        observer.playlist(
            i as u64 + 1,
            playlist_count,
            &playlist.name,
            playlist.tracks_total,
        );
        resync_playlist(store, remote, playlist, observer)?;
    }

    store.mark_synced(Utc::now());

    let stats = store.stats();
    let report = SyncReport {
        saved_tracks: saved.len() as u64,
        playlists: playlist_count,
        playlists_updated: playlist_count,
        playlists_skipped: 0,
        total_tracks: stats.total_tracks,
    };
    result.add_message(CmdMessage::success("Sync completed successfully"));
    Ok(result.with_sync(report))
}

/// Replace one playlist's row and membership.
///
/// Write ordering is the staleness invariant: the playlist row goes in
/// carrying its previous local snapshot marker, membership is rewritten
/// (clear-then-insert), and the new marker is committed last. A crash
/// anywhere before that final write leaves a marker that cannot match the
/// remote, so the playlist is picked up again on the next pass.
pub(super) fn resync_playlist<B: StorageBackend, R: RemoteLibrary>(
    store: &mut MirrorStore<B>,
    remote: &R,
    playlist: &Playlist,
    observer: &mut dyn SyncObserver,
) -> Result<()> {
    let prior_snapshot = store
        .get_playlist(&playlist.id)
        .and_then(|p| p.snapshot_id.clone());
    let row = Playlist {
        snapshot_id: prior_snapshot,
        ..playlist.clone()
    };
    store.upsert_playlist(&row);

    let membership = if playlist.tracks_total > 0 {
        remote.playlist_tracks(&playlist.id, &mut |current, total| {
            observer.page(current, total)
        })?
    } else {
        Vec::new()
    };

    store.clear_playlist_entries(&playlist.id);
    for (track, position) in &membership {
        store.upsert_track(track);
        store.add_playlist_entry(&playlist.id, &track.id, *position);
    }

    if let Some(snapshot) = &playlist.snapshot_id {
        store.set_playlist_snapshot(&playlist.id, snapshot);
    }
    Ok(())
}
