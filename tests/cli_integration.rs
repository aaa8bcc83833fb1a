use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use std::path::Path;

fn tunevault(data_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("tunevault").unwrap();
    cmd.env("TUNEVAULT_DATA_DIR", data_dir)
        .env_remove("SPOTIFY_ACCESS_TOKEN");
    cmd
}

fn seed_library(data_dir: &Path) {
    let doc = json!({
        "tracks": [
            {
                "id": "t1",
                "name": "Blue Train",
                "artist": "John Coltrane",
                "album": "Blue Train",
                "duration_ms": 643000,
                "popularity": 70,
                "explicit": false,
                "uri": "spotify:track:t1",
                "external_url": "https://open.spotify.com/track/t1",
                "preview_url": "",
                "release_date": "1958-01-01",
                "is_local": false
            },
            {
                "id": "t2",
                "name": "Moment's Notice",
                "artist": "John Coltrane",
                "album": "Blue Train",
                "duration_ms": 546000,
                "popularity": 60,
                "explicit": false,
                "uri": "spotify:track:t2",
                "external_url": "https://open.spotify.com/track/t2",
                "preview_url": "",
                "release_date": "1958-01-01",
                "is_local": false
            }
        ],
        "playlists": [
            {
                "id": "p1",
                "name": "Jazz Classics",
                "description": "",
                "owner": "tester",
                "public": true,
                "collaborative": false,
                "tracks_total": 2,
                "snapshot_id": "snap1",
                "uri": "spotify:playlist:p1",
                "external_url": "https://open.spotify.com/playlist/p1"
            }
        ],
        "playlist_tracks": [
            { "playlist_id": "p1", "track_id": "t1", "position": 0 },
            { "playlist_id": "p1", "track_id": "t2", "position": 1 }
        ],
        "saved_tracks": [
            { "track_id": "t1", "added_at": "2021-01-01T00:00:00Z" }
        ],
        "last_synced": null
    });
    std::fs::write(
        data_dir.join("library.json"),
        serde_json::to_string_pretty(&doc).unwrap(),
    )
    .unwrap();
}

#[test]
fn stats_on_empty_library_succeeds() {
    let temp_dir = tempfile::tempdir().unwrap();

    tunevault(temp_dir.path())
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Library statistics"));
}

#[test]
fn sync_without_credentials_fails() {
    let temp_dir = tempfile::tempdir().unwrap();

    tunevault(temp_dir.path())
        .arg("sync")
        .assert()
        .failure()
        .stderr(predicate::str::contains("SPOTIFY_ACCESS_TOKEN"));
}

#[test]
fn search_without_any_filter_fails() {
    let temp_dir = tempfile::tempdir().unwrap();

    tunevault(temp_dir.path())
        .arg("search")
        .assert()
        .failure()
        .stderr(predicate::str::contains("query"));
}

#[test]
fn search_finds_seeded_track_with_memberships() {
    let temp_dir = tempfile::tempdir().unwrap();
    seed_library(temp_dir.path());

    tunevault(temp_dir.path())
        .arg("search")
        .arg("blue train")
        .assert()
        .success()
        .stdout(predicate::str::contains("Blue Train"))
        .stdout(predicate::str::contains("Jazz Classics"));
}

#[test]
fn search_by_artist_field() {
    let temp_dir = tempfile::tempdir().unwrap();
    seed_library(temp_dir.path());

    tunevault(temp_dir.path())
        .arg("search")
        .arg("--artist")
        .arg("coltrane")
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2 result(s)"));
}

#[test]
fn search_with_no_hits_reports_nothing_found() {
    let temp_dir = tempfile::tempdir().unwrap();
    seed_library(temp_dir.path());

    tunevault(temp_dir.path())
        .arg("search")
        .arg("polka")
        .assert()
        .success()
        .stdout(predicate::str::contains("No results found"));
}

#[test]
fn list_shows_all_playlists() {
    let temp_dir = tempfile::tempdir().unwrap();
    seed_library(temp_dir.path());

    tunevault(temp_dir.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Jazz Classics"))
        .stdout(predicate::str::contains("2 tracks"));
}

#[test]
fn list_playlist_detail_in_position_order() {
    let temp_dir = tempfile::tempdir().unwrap();
    seed_library(temp_dir.path());

    tunevault(temp_dir.path())
        .arg("list")
        .arg("--playlist")
        .arg("jazz")
        .assert()
        .success()
        .stdout(predicate::str::contains("Blue Train").and(predicate::str::contains("Moment's Notice")));
}

#[test]
fn list_unknown_playlist_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    seed_library(temp_dir.path());

    tunevault(temp_dir.path())
        .arg("list")
        .arg("--playlist")
        .arg("does-not-exist")
        .assert()
        .failure()
        .stderr(predicate::str::contains("does-not-exist"));
}

#[test]
fn duplicates_on_clean_library_reports_none() {
    let temp_dir = tempfile::tempdir().unwrap();
    seed_library(temp_dir.path());

    tunevault(temp_dir.path())
        .arg("duplicates")
        .assert()
        .success()
        .stdout(predicate::str::contains("No duplicates found"));
}

#[test]
fn clear_cache_requires_confirmation() {
    let temp_dir = tempfile::tempdir().unwrap();
    seed_library(temp_dir.path());

    tunevault(temp_dir.path())
        .arg("clear-cache")
        .assert()
        .success()
        .stdout(predicate::str::contains("--yes"));

    // Without confirmation nothing was deleted.
    tunevault(temp_dir.path())
        .arg("search")
        .arg("blue")
        .assert()
        .success()
        .stdout(predicate::str::contains("Blue Train"));
}

#[test]
fn clear_cache_with_yes_empties_the_mirror() {
    let temp_dir = tempfile::tempdir().unwrap();
    seed_library(temp_dir.path());

    tunevault(temp_dir.path())
        .arg("clear-cache")
        .arg("--yes")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared 2 tracks, 1 playlists, 1 saved markers"));

    tunevault(temp_dir.path())
        .arg("search")
        .arg("blue")
        .assert()
        .success()
        .stdout(predicate::str::contains("No results found"));
}

#[test]
fn corrupt_library_file_fails_loudly() {
    let temp_dir = tempfile::tempdir().unwrap();
    std::fs::write(temp_dir.path().join("library.json"), "{not json").unwrap();

    tunevault(temp_dir.path())
        .arg("stats")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}
