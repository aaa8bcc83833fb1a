use crate::commands::{CmdMessage, CmdResult, TrackReport};
use crate::error::{Result, VaultError};
use crate::model::TrackFilter;
use crate::store::{MirrorStore, StorageBackend};

/// Search the mirror with a free-text and/or field-scoped filter. Each hit
/// is returned together with its playlist memberships so the CLI can show
/// where the track lives.
pub fn run<B: StorageBackend>(
    store: &MirrorStore<B>,
    filter: &TrackFilter,
    limit: usize,
) -> Result<CmdResult> {
    if filter.is_empty() {
        return Err(VaultError::Api("Search needs a query or a field filter".into()));
    }

    let hits = store.search_tracks(filter);
    let total = hits.len();

    let mut result = CmdResult::default();
    if total == 0 {
        result.add_message(CmdMessage::error("No results found"));
        return Ok(result);
    }

    result.add_message(CmdMessage::success(format!("Found {} result(s)", total)));

    let reports: Vec<TrackReport> = hits
        .into_iter()
        .take(limit)
        .map(|track| {
            let memberships = store.playlists_for_track(&track.id);
            TrackReport {
                track,
                memberships,
                occurrences: None,
            }
        })
        .collect();

    if total > limit {
        result.add_message(CmdMessage::info(format!(
            "... and {} more results",
            total - limit
        )));
    }
    Ok(result.with_track_reports(reports))
}
