use crate::commands::{CmdResult, StatsReport};
use crate::error::Result;
use crate::store::{MirrorStore, StorageBackend};
use std::collections::HashMap;

const TOP_ARTISTS: usize = 5;

/// Library statistics: collection counts plus listening time and the most
/// common artists, both derived from the track table at query time.
pub fn run<B: StorageBackend>(store: &MirrorStore<B>) -> Result<CmdResult> {
    let stats = store.stats();

    let tracks = store.all_tracks();
    let total_ms: u64 = tracks.iter().map(|t| t.duration_ms).sum();
    let total_hours = total_ms as f64 / (1000.0 * 60.0 * 60.0);

    let mut artist_counts: HashMap<&str, u64> = HashMap::new();
    for track in tracks {
        // The artist field is a joined display string.
        for artist in track.artist.split(", ") {
            if !artist.is_empty() {
                *artist_counts.entry(artist).or_default() += 1;
            }
        }
    }
    let mut top_artists: Vec<(String, u64)> = artist_counts
        .into_iter()
        .map(|(name, count)| (name.to_string(), count))
        .collect();
    top_artists.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    top_artists.truncate(TOP_ARTISTS);

    let report = StatsReport {
        stats,
        total_hours,
        top_artists,
        last_synced: store.last_synced(),
    };
    Ok(CmdResult::default().with_stats(report))
}
