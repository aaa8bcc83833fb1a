use super::{PageProgress, RemoteLibrary, RemoteUser, SavedItem};
use crate::config::VaultConfig;
use crate::error::Result;
use crate::model::{Playlist, Track};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;

const SAVED_PAGE_SIZE: u64 = 50;
const PLAYLIST_PAGE_SIZE: u64 = 50;
const PLAYLIST_ITEMS_PAGE_SIZE: u64 = 100;

// Trim the playlist-items payload to what we actually store.
const PLAYLIST_ITEM_FIELDS: &str = "items(is_local,track(id,name,artists,album,duration_ms,\
     popularity,explicit,uri,external_urls,preview_url)),next,total";

/// Blocking client for the Spotify Web API.
///
/// Authenticates with a ready-made bearer token; the OAuth flow is outside
/// this crate. One network round-trip per page, no parallel fetches.
pub struct SpotifyRemote {
    http: reqwest::blocking::Client,
    api_base: String,
    token: String,
}

impl SpotifyRemote {
    pub fn new(config: &VaultConfig) -> Result<Self> {
        let token = config.require_token()?.to_string();
        Ok(Self {
            http: reqwest::blocking::Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}{}", self.api_base, path);
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .query(query)
            .send()?
            .error_for_status()?;
        Ok(response.json()?)
    }
}

impl RemoteLibrary for SpotifyRemote {
    fn current_user(&self) -> Result<RemoteUser> {
        let user: ApiUser = self.get_json("/me", &[])?;
        Ok(RemoteUser {
            display_name: user.display_name.unwrap_or_else(|| user.id),
            email: user.email,
            country: user.country,
        })
    }

    fn saved_tracks_total(&self) -> Result<u64> {
        let page: Paging<SavedTrackItem> =
            self.get_json("/me/tracks", &[("limit", "1".to_string())])?;
        Ok(page.total.unwrap_or(0))
    }

    fn saved_tracks(&self, progress: PageProgress) -> Result<Vec<SavedItem>> {
        let mut items = Vec::new();
        let limit = SAVED_PAGE_SIZE;
        let mut offset = 0;
        let mut page = 0;
        let mut pages_total: Option<u64> = None;

        loop {
            let results: Paging<SavedTrackItem> = self.get_json(
                "/me/tracks",
                &[
                    ("limit", limit.to_string()),
                    ("offset", offset.to_string()),
                ],
            )?;
            page += 1;
            if pages_total.is_none() {
                pages_total = Some(page_count(results.total.unwrap_or(0), limit));
            }

            if results.items.is_empty() {
                break;
            }

            let has_next = results.next.is_some();
            for item in results.items {
                if let Some(api_track) = item.track {
                    let track = extract_track(api_track, item.is_local);
                    items.push(SavedItem {
                        track,
                        added_at: item.added_at.unwrap_or_default(),
                    });
                }
            }

            if let Some(total) = pages_total {
                progress(page, total);
            }
            if !has_next {
                break;
            }
            offset += limit;
        }

        // Final callback always reaches current == total.
        if let Some(total) = pages_total {
            progress(total, total);
        }
        Ok(items)
    }

    fn user_playlists(&self, progress: PageProgress) -> Result<Vec<Playlist>> {
        let mut playlists = Vec::new();
        let limit = PLAYLIST_PAGE_SIZE;
        let mut offset = 0;
        let mut page = 0;
        let mut pages_total: Option<u64> = None;

        loop {
            let results: Paging<ApiPlaylist> = self.get_json(
                "/me/playlists",
                &[
                    ("limit", limit.to_string()),
                    ("offset", offset.to_string()),
                ],
            )?;
            page += 1;
            if pages_total.is_none() {
                pages_total = Some(page_count(results.total.unwrap_or(0), limit));
            }

            if results.items.is_empty() {
                break;
            }

            let has_next = results.next.is_some();
            for item in results.items {
                playlists.push(item.into_playlist());
            }

            if let Some(total) = pages_total {
                progress(page, total);
            }
            if !has_next {
                break;
            }
            offset += limit;
        }

        if let Some(total) = pages_total {
            progress(total, total);
        }
        Ok(playlists)
    }

    fn playlist_tracks(
        &self,
        playlist_id: &str,
        progress: PageProgress,
    ) -> Result<Vec<(Track, u64)>> {
        let mut tracks = Vec::new();
        let limit = PLAYLIST_ITEMS_PAGE_SIZE;
        let mut offset = 0;
        let mut position: u64 = 0;
        let mut page = 0;
        let mut pages_total: Option<u64> = None;

        loop {
            let results: Paging<PlaylistItem> = self.get_json(
                &format!("/playlists/{}/tracks", playlist_id),
                &[
                    ("limit", limit.to_string()),
                    ("offset", offset.to_string()),
                    ("fields", PLAYLIST_ITEM_FIELDS.to_string()),
                ],
            )?;
            page += 1;
            if pages_total.is_none() {
                pages_total = Some(page_count(results.total.unwrap_or(0), limit));
            }

            if results.items.is_empty() {
                break;
            }

            let has_next = results.next.is_some();
            for item in results.items {
                // Position advances for every remote item, even ones we
                // drop, so stored positions match the remote UI ordering.
                if let Some(api_track) = item.track {
                    let track = extract_track(api_track, item.is_local);
                    tracks.push((track, position));
                }
                position += 1;
            }

            if let Some(total) = pages_total {
                progress(page, total);
            }
            if !has_next {
                break;
            }
            offset += limit;
        }

        if let Some(total) = pages_total {
            progress(total, total);
        }
        Ok(tracks)
    }
}

fn page_count(total: u64, limit: u64) -> u64 {
    std::cmp::max(1, total.div_ceil(limit))
}

/// Build a [`Track`] from the wire representation.
///
/// Local files may come back with a null id; those get a deterministic id
/// derived from URI and name so re-syncs hit the same row. Market data is
/// deliberately ignored as a playability signal; only `is_local` counts.
fn extract_track(api: ApiTrack, is_local_item: bool) -> Track {
    let artist_names: Vec<&str> = api
        .artists
        .iter()
        .filter_map(|a| a.name.as_deref())
        .filter(|n| !n.is_empty())
        .collect();
    let artist = if artist_names.is_empty() {
        "Unknown Artist".to_string()
    } else {
        artist_names.join(", ")
    };

    let uri = api.uri.unwrap_or_default();
    let name = api.name.unwrap_or_default();
    let id = match api.id {
        Some(id) if !id.is_empty() => id,
        _ => Track::derived_id(&uri, &name),
    };

    let (album, release_date) = match api.album {
        Some(album) => (
            album.name.unwrap_or_default(),
            album.release_date.unwrap_or_default(),
        ),
        None => (String::new(), String::new()),
    };

    Track {
        id,
        name,
        artist,
        album,
        duration_ms: api.duration_ms.unwrap_or(0),
        popularity: api.popularity.unwrap_or(0),
        explicit: api.explicit,
        uri,
        external_url: api
            .external_urls
            .get("spotify")
            .cloned()
            .unwrap_or_default(),
        preview_url: api.preview_url.unwrap_or_default(),
        release_date,
        is_local: is_local_item || api.is_local,
    }
}

// --- Wire types ---

#[derive(Debug, Deserialize)]
struct Paging<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
    #[serde(default)]
    total: Option<u64>,
    #[serde(default)]
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiUser {
    id: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SavedTrackItem {
    #[serde(default)]
    added_at: Option<String>,
    #[serde(default)]
    is_local: bool,
    #[serde(default)]
    track: Option<ApiTrack>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    #[serde(default)]
    is_local: bool,
    #[serde(default)]
    track: Option<ApiTrack>,
}

#[derive(Debug, Deserialize)]
struct ApiTrack {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    artists: Vec<ApiArtist>,
    #[serde(default)]
    album: Option<ApiAlbum>,
    #[serde(default)]
    duration_ms: Option<u64>,
    #[serde(default)]
    popularity: Option<u32>,
    #[serde(default)]
    explicit: bool,
    #[serde(default)]
    uri: Option<String>,
    #[serde(default)]
    external_urls: HashMap<String, String>,
    #[serde(default)]
    preview_url: Option<String>,
    #[serde(default)]
    is_local: bool,
}

#[derive(Debug, Deserialize)]
struct ApiArtist {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiAlbum {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    release_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiPlaylist {
    id: String,
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    owner: Option<ApiOwner>,
    #[serde(default)]
    public: Option<bool>,
    #[serde(default)]
    collaborative: bool,
    tracks: ApiTrackRef,
    #[serde(default)]
    snapshot_id: Option<String>,
    #[serde(default)]
    uri: Option<String>,
    #[serde(default)]
    external_urls: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct ApiOwner {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiTrackRef {
    #[serde(default)]
    total: u64,
}

impl ApiPlaylist {
    fn into_playlist(self) -> Playlist {
        let owner = self
            .owner
            .and_then(|o| o.display_name.filter(|n| !n.is_empty()).or(o.id))
            .unwrap_or_else(|| "Unknown".to_string());
        Playlist {
            id: self.id,
            name: self.name,
            description: self.description.unwrap_or_default(),
            owner,
            public: self.public.unwrap_or(false),
            collaborative: self.collaborative,
            tracks_total: self.tracks.total,
            snapshot_id: self.snapshot_id.filter(|s| !s.is_empty()),
            uri: self.uri.unwrap_or_default(),
            external_url: self
                .external_urls
                .get("spotify")
                .cloned()
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_track_joins_artists() {
        let api: ApiTrack = serde_json::from_str(
            r#"{
                "id": "abc",
                "name": "Song",
                "artists": [{"name": "A"}, {"name": "B"}],
                "album": {"name": "Album", "release_date": "1999-09-09"},
                "duration_ms": 123456,
                "popularity": 42,
                "explicit": true,
                "uri": "spotify:track:abc",
                "external_urls": {"spotify": "https://open.spotify.com/track/abc"},
                "preview_url": "https://p.scdn.co/abc"
            }"#,
        )
        .unwrap();

        let track = extract_track(api, false);
        assert_eq!(track.id, "abc");
        assert_eq!(track.artist, "A, B");
        assert_eq!(track.album, "Album");
        assert_eq!(track.release_date, "1999-09-09");
        assert_eq!(track.duration_ms, 123456);
        assert!(track.explicit);
        assert!(!track.is_local);
        assert_eq!(track.external_url, "https://open.spotify.com/track/abc");
    }

    #[test]
    fn extract_track_handles_missing_artists_and_id() {
        let api: ApiTrack = serde_json::from_str(
            r#"{"id": null, "name": "Home Recording", "uri": "spotify:local:x", "artists": []}"#,
        )
        .unwrap();

        let track = extract_track(api, true);
        assert_eq!(track.artist, "Unknown Artist");
        assert_eq!(track.id, Track::derived_id("spotify:local:x", "Home Recording"));
        assert!(track.is_local);
        assert_eq!(track.duration_ms, 0);
    }

    #[test]
    fn playlist_owner_falls_back_to_id() {
        let api: ApiPlaylist = serde_json::from_str(
            r#"{
                "id": "p1",
                "name": "Mix",
                "owner": {"id": "user123", "display_name": null},
                "tracks": {"total": 7},
                "snapshot_id": ""
            }"#,
        )
        .unwrap();

        let pl = api.into_playlist();
        assert_eq!(pl.owner, "user123");
        assert_eq!(pl.tracks_total, 7);
        // Empty snapshot markers are treated as absent.
        assert_eq!(pl.snapshot_id, None);
    }

    #[test]
    fn paging_tolerates_missing_fields() {
        let page: Paging<PlaylistItem> = serde_json::from_str(r#"{"items": []}"#).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, None);
        assert!(page.next.is_none());
    }

    #[test]
    fn page_count_rounds_up_with_floor_of_one() {
        assert_eq!(page_count(0, 50), 1);
        assert_eq!(page_count(50, 50), 1);
        assert_eq!(page_count(51, 50), 2);
        assert_eq!(page_count(101, 100), 2);
    }
}
