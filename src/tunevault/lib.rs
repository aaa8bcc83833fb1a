//! # Tunevault Architecture
//!
//! Tunevault mirrors a streaming-service library (liked tracks, playlists,
//! playlist membership) into a local JSON document store and answers
//! search, statistics, and duplicate queries without touching the network.
//! It is a **UI-agnostic library** with a CLI client, not a CLI that
//! happens to expose library code.
//!
//! ## The Layer Stack
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (args.rs, wired by main.rs)                      │
//! │  - Parses arguments, renders progress bars and output       │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands                                │
//! │  - Returns structured Result types                          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Sync orchestration and query logic                       │
//! │  - Reports progress through an observer, returns Rust types │
//! └─────────────────────────────────────────────────────────────┘
//!                    │                       │
//!                    ▼                       ▼
//! ┌──────────────────────────┐ ┌──────────────────────────────┐
//! │  Storage Layer (store/)  │ │  Remote Layer (remote/)      │
//! │  - MirrorStore over an   │ │  - RemoteLibrary trait       │
//! │    abstract backend      │ │  - Blocking Spotify client   │
//! └──────────────────────────┘ └──────────────────────────────┘
//! ```
//!
//! ## Sync Model
//!
//! Everything is single-threaded and blocking. A full sync replaces every
//! collection; a differential sync compares cheap summaries first
//! (saved-track counts, playlist snapshot markers) and refetches only what
//! disagrees. Per playlist, membership is rewritten clear-then-insert and
//! the snapshot marker is committed last, so any interrupted pass is
//! retried by the next one (at-least-once, idempotent writes).
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From `api.rs` inward, code takes plain arguments, returns
//! `Result<CmdResult>`, and never writes to stdout, calls
//! `std::process::exit`, or assumes a terminal. Progress during long
//! fetches flows out through the `SyncObserver` trait; the CLI turns it
//! into progress bars, tests discard it.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for all operations
//! - [`commands`]: Sync orchestration and query logic
//! - [`store`]: Local mirror over an abstract storage backend
//! - [`remote`]: Remote library client trait and Spotify implementation
//! - [`model`]: Core data types (`Track`, `Playlist`, relationships)
//! - [`config`]: Runtime configuration
//! - [`error`]: Error types

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod model;
pub mod remote;
pub mod store;
