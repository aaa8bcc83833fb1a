use crate::commands::{sync, CmdMessage, CmdResult, SyncObserver, SyncReport};
use crate::error::Result;
use crate::remote::RemoteLibrary;
use crate::store::{MirrorStore, StorageBackend};
use chrono::Utc;

/// Differential sync: refetch only the collections whose remote summary
/// disagrees with the local one.
///
/// Saved tracks compare by total count. Playlists compare by snapshot
/// marker when both sides carry one, falling back to a relationship-count
/// comparison. Replacement per playlist is clear-then-insert with the
/// snapshot marker written last, so a failed pass is safely retried.
pub fn run<B: StorageBackend, R: RemoteLibrary>(
    store: &mut MirrorStore<B>,
    remote: &R,
    observer: &mut dyn SyncObserver,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();

    let user = remote.current_user()?;
    result.add_message(CmdMessage::info(format!("User: {}", user.display_name)));

    // Saved tracks: count disagreement means the whole collection is stale.
    let remote_total = remote.saved_tracks_total()?;
    let local_total = store.saved_track_count();
    result.add_message(CmdMessage::info(format!(
        "Saved tracks: remote {} / local {}",
        remote_total, local_total
    )));

    let mut saved_count = local_total;
    if remote_total != local_total {
        observer.phase("Fetching saved tracks");
        let saved = remote.saved_tracks(&mut |current, total| observer.page(current, total))?;
        store.clear_saved_tracks();
        for item in &saved {
            store.upsert_track(&item.track);
            store.add_saved_track(&item.track.id, &item.added_at);
        }
        saved_count = saved.len() as u64;
        result.add_message(CmdMessage::success(format!(
            "Saved tracks updated: {}",
            saved.len()
        )));
    } else {
        result.add_message(CmdMessage::info("Saved tracks up-to-date, skipping"));
    }

    observer.phase("Fetching playlists");
    let playlists = remote.user_playlists(&mut |current, total| observer.page(current, total))?;
    result.add_message(CmdMessage::success(format!(
        "Found {} playlists",
        playlists.len()
    )));

    let playlist_count = playlists.len() as u64;
    let mut updated = 0;
    let mut skipped = 0;

    for (i, playlist) in playlists.iter().enumerate() {
        if is_fresh(store, playlist) {
            skipped += 1;
            continue;
        }

        observer.playlist(
            i as u64 + 1,
            playlist_count,
            &playlist.name,
            playlist.tracks_total,
        );
        sync::resync_playlist(store, remote, playlist, observer)?;
        updated += 1;
    }

    store.mark_synced(Utc::now());

    let report = SyncReport {
        saved_tracks: saved_count,
        playlists: playlist_count,
        playlists_updated: updated,
        playlists_skipped: skipped,
        total_tracks: store.stats().total_tracks,
    };
    result.add_message(CmdMessage::success("Diff sync completed"));
    Ok(result.with_sync(report))
}

/// Whether the local copy of a playlist can be trusted without refetching.
///
/// Snapshot markers win when both sides have a non-empty one: equal means
/// fresh, unequal means stale with no further checks. Without comparable
/// markers, a local copy whose relationship count matches the remote
/// reported total is treated as fresh.
fn is_fresh<B: StorageBackend>(
    store: &MirrorStore<B>,
    playlist: &crate::model::Playlist,
) -> bool {
    let local = store.get_playlist(&playlist.id);

    let local_snapshot = local
        .and_then(|p| p.snapshot_id.as_deref())
        .filter(|s| !s.is_empty());
    let remote_snapshot = playlist.snapshot_id.as_deref().filter(|s| !s.is_empty());

    match (local_snapshot, remote_snapshot) {
        (Some(local_snap), Some(remote_snap)) => local_snap == remote_snap,
        _ => local.is_some() && store.playlist_entry_count(&playlist.id) == playlist.tracks_total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::FakeRemote;
    use crate::commands::NullObserver;
    use crate::remote::SavedItem;
    use crate::store::memory::MemBackend;

    fn store() -> MirrorStore<MemBackend> {
        MirrorStore::open(MemBackend::new()).unwrap()
    }

    #[test]
    fn matching_snapshot_skips_membership_fetch() {
        let mut s = store();
        s.upsert_playlist(&FakeRemote::playlist("p1", "Mix", 1, Some("snap1")));

        let mut remote = FakeRemote::default();
        remote.playlists = vec![FakeRemote::playlist("p1", "Mix", 1, Some("snap1"))];

        let result = run(&mut s, &remote, &mut NullObserver).unwrap();
        let report = result.sync.unwrap();

        assert_eq!(report.playlists_skipped, 1);
        assert_eq!(report.playlists_updated, 0);
        assert_eq!(*remote.membership_fetches.borrow(), 0);
    }

    #[test]
    fn changed_snapshot_triggers_exactly_one_fetch_and_commits_marker() {
        let mut s = store();
        s.upsert_playlist(&FakeRemote::playlist("p1", "Mix", 1, Some("snap1")));

        let mut remote = FakeRemote::default();
        remote.playlists = vec![FakeRemote::playlist("p1", "Mix", 1, Some("snap2"))];
        remote
            .tracks_by_playlist
            .insert("p1".into(), vec![(FakeRemote::track("t1", "Song A"), 0)]);

        let result = run(&mut s, &remote, &mut NullObserver).unwrap();
        let report = result.sync.unwrap();

        assert_eq!(report.playlists_updated, 1);
        assert_eq!(*remote.membership_fetches.borrow(), 1);
        assert_eq!(
            s.get_playlist("p1").unwrap().snapshot_id.as_deref(),
            Some("snap2")
        );
        let ids: Vec<String> = s.playlist_tracks("p1").into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["t1"]);
    }

    #[test]
    fn missing_snapshot_falls_back_to_count_comparison() {
        let mut s = store();
        // Local copy exists with matching count: fresh.
        s.upsert_playlist(&FakeRemote::playlist("p1", "Stable", 1, None));
        s.add_playlist_entry("p1", "t0", 0);

        let mut remote = FakeRemote::default();
        remote.playlists = vec![
            FakeRemote::playlist("p1", "Stable", 1, None),
            // Count disagrees: stale.
            FakeRemote::playlist("p2", "Growing", 2, None),
        ];
        remote.tracks_by_playlist.insert(
            "p2".into(),
            vec![
                (FakeRemote::track("t1", "One"), 0),
                (FakeRemote::track("t2", "Two"), 1),
            ],
        );

        let result = run(&mut s, &remote, &mut NullObserver).unwrap();
        let report = result.sync.unwrap();

        assert_eq!(report.playlists_skipped, 1);
        assert_eq!(report.playlists_updated, 1);
        assert_eq!(*remote.membership_fetches.borrow(), 1);
        assert_eq!(s.playlist_entry_count("p2"), 2);
    }

    #[test]
    fn unknown_playlist_is_always_fetched() {
        let mut s = store();
        let mut remote = FakeRemote::default();
        // Remote reports zero tracks, but with no local copy the count
        // fallback must not declare it fresh.
        remote.playlists = vec![FakeRemote::playlist("p1", "New", 0, None)];

        let result = run(&mut s, &remote, &mut NullObserver).unwrap();
        assert_eq!(result.sync.unwrap().playlists_updated, 1);
        assert!(s.get_playlist("p1").is_some());
    }

    #[test]
    fn saved_tracks_skip_when_counts_match() {
        let mut s = store();
        s.upsert_track(&FakeRemote::track("s1", "Liked"));
        s.add_saved_track("s1", "2021-01-01T00:00:00Z");

        let mut remote = FakeRemote::default();
        remote.saved = vec![SavedItem {
            track: FakeRemote::track("s1", "Liked"),
            added_at: "2021-01-01T00:00:00Z".into(),
        }];

        run(&mut s, &remote, &mut NullObserver).unwrap();
        // Marker untouched: same added_at as the original insert.
        assert_eq!(s.saved_tracks()[0].1, "2021-01-01T00:00:00Z");
    }

    #[test]
    fn saved_tracks_replaced_when_counts_differ() {
        let mut s = store();
        s.upsert_track(&FakeRemote::track("gone", "Unliked"));
        s.add_saved_track("gone", "2019-01-01T00:00:00Z");

        let mut remote = FakeRemote::default();
        remote.saved = vec![
            SavedItem {
                track: FakeRemote::track("s1", "Liked One"),
                added_at: "2021-01-01T00:00:00Z".into(),
            },
            SavedItem {
                track: FakeRemote::track("s2", "Liked Two"),
                added_at: "2021-02-01T00:00:00Z".into(),
            },
        ];

        let result = run(&mut s, &remote, &mut NullObserver).unwrap();
        assert_eq!(result.sync.unwrap().saved_tracks, 2);
        assert!(!s.is_saved("gone"));
        assert!(s.is_saved("s1"));
        assert!(s.is_saved("s2"));
    }

    #[test]
    fn fetch_failure_leaves_old_marker_for_retry() {
        let mut s = store();
        s.upsert_playlist(&FakeRemote::playlist("p1", "Mix", 1, Some("snap1")));
        s.upsert_track(&FakeRemote::track("t0", "Old Song"));
        s.add_playlist_entry("p1", "t0", 0);

        let mut remote = FakeRemote::default();
        remote.playlists = vec![FakeRemote::playlist("p1", "Mix", 2, Some("snap2"))];
        remote.fail_playlist_fetch = true;

        assert!(run(&mut s, &remote, &mut NullObserver).is_err());

        // Old marker survives, so the next diff pass retries this playlist,
        // and the old membership was not cleared by the failed fetch.
        assert_eq!(
            s.get_playlist("p1").unwrap().snapshot_id.as_deref(),
            Some("snap1")
        );
        assert_eq!(s.playlist_entry_count("p1"), 1);
    }
}
