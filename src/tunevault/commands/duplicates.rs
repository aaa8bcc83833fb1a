use crate::commands::{CmdMessage, CmdResult, TrackReport};
use crate::error::Result;
use crate::store::{MirrorStore, StorageBackend};

/// Report tracks occupying more than one relationship row across all
/// playlists, ordered by descending occurrence count.
pub fn run<B: StorageBackend>(store: &MirrorStore<B>, limit: usize) -> Result<CmdResult> {
    let mut result = CmdResult::default();

    let dupes = store.duplicate_tracks();
    if dupes.is_empty() {
        result.add_message(CmdMessage::success("No duplicates found across playlists"));
        return Ok(result);
    }

    let total = dupes.len();
    let reports: Vec<TrackReport> = dupes
        .into_iter()
        .take(limit)
        .map(|dup| {
            let memberships = store.playlists_for_track(&dup.track.id);
            TrackReport {
                track: dup.track,
                memberships,
                occurrences: Some(dup.occurrences),
            }
        })
        .collect();

    result.add_message(CmdMessage::info(format!(
        "{} duplicated track(s), showing up to {}",
        total, limit
    )));
    Ok(result.with_track_reports(reports))
}
