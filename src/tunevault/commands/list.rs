use crate::commands::{CmdMessage, CmdResult, PlaylistDetail};
use crate::error::{Result, VaultError};
use crate::store::{MirrorStore, StorageBackend};

/// List all playlists, or show the tracks of the playlist whose name
/// matches `name_filter` (case-insensitive substring).
pub fn run<B: StorageBackend>(
    store: &MirrorStore<B>,
    name_filter: Option<&str>,
) -> Result<CmdResult> {
    let Some(filter) = name_filter else {
        let playlists = store.all_playlists().to_vec();
        let mut result = CmdResult::default().with_playlists(playlists);
        if result.playlists.is_empty() {
            result.add_message(CmdMessage::warning("No playlists found. Run 'sync' first."));
        }
        return Ok(result);
    };

    let needle = filter.to_lowercase();
    let mut matches: Vec<_> = store
        .all_playlists()
        .iter()
        .filter(|p| p.name.to_lowercase().contains(&needle))
        .cloned()
        .collect();

    if matches.is_empty() {
        return Err(VaultError::PlaylistNotFound(filter.to_string()));
    }
    matches.sort_by_key(|p| p.name.to_lowercase());

    let mut result = CmdResult::default();
    if matches.len() > 1 {
        result.add_message(CmdMessage::info(format!(
            "{} playlists match '{}'; showing '{}'",
            matches.len(),
            filter,
            matches[0].name
        )));
    }

    let playlist = matches.swap_remove(0);
    let tracks = store.playlist_tracks(&playlist.id);
    Ok(result.with_playlist_detail(PlaylistDetail { playlist, tracks }))
}
