use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::{MirrorStore, StorageBackend};

/// Truncate every mirror collection. The backing file itself stays in
/// place; the next flush writes an empty document.
pub fn run<B: StorageBackend>(store: &mut MirrorStore<B>) -> Result<CmdResult> {
    let stats = store.stats();
    store.clear_all();

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Cleared {} tracks, {} playlists, {} saved markers",
        stats.total_tracks, stats.total_playlists, stats.saved_tracks
    )));
    Ok(result)
}
