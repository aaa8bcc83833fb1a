use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "tunevault")]
#[command(about = "Mirror and search your streaming music library locally", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download and sync your entire library
    Sync {
        /// Clear existing data before syncing
        #[arg(long)]
        clear: bool,
    },

    /// Sync only collections that changed since the last pass
    #[command(name = "sync-diff", alias = "diff")]
    SyncDiff,

    /// Search tracks in the local mirror
    Search {
        /// Free-text query matched against name, artist, and album
        #[arg(required = false)]
        query: Option<String>,

        /// Require a name match
        #[arg(long)]
        name: Option<String>,

        /// Require an artist match
        #[arg(long)]
        artist: Option<String>,

        /// Require an album match
        #[arg(long)]
        album: Option<String>,

        /// Maximum number of results to show
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },

    /// List playlists, or the tracks of one playlist
    #[command(alias = "ls")]
    List {
        /// Show tracks of the playlist matching this name
        #[arg(short, long)]
        playlist: Option<String>,
    },

    /// Show library statistics
    Stats,

    /// List duplicate tracks across playlists, most duplicated first
    #[command(alias = "dup")]
    Duplicates {
        /// Maximum number of duplicate entries to show
        #[arg(short, long, default_value_t = 5)]
        limit: usize,
    },

    /// Verify credentials against the remote service
    Auth,

    /// Delete all locally mirrored data
    #[command(name = "clear-cache")]
    ClearCache {
        /// Skip the confirmation requirement
        #[arg(long)]
        yes: bool,
    },
}
