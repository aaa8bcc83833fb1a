use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use tunevault::api::{
    CmdMessage, MessageLevel, PlaylistDetail, StatsReport, SyncReport, TrackReport, VaultApi,
};
use tunevault::commands::SyncObserver;
use tunevault::config::VaultConfig;
use tunevault::error::Result;
use tunevault::model::{Playlist, TrackFilter};
use tunevault::remote::{RemoteLibrary, SpotifyRemote};
use tunevault::store::fs::FsBackend;

use clap::Parser;

mod args;
use args::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

struct AppContext {
    api: VaultApi<FsBackend>,
    config: VaultConfig,
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = VaultConfig::from_env();
    let api = VaultApi::open(FsBackend::new(config.db_path()))?;
    let mut ctx = AppContext { api, config };

    let outcome = dispatch(&mut ctx, cli.command);

    // Flush even when the command failed: a sync that died halfway keeps
    // every collection committed before the failure.
    let flushed = ctx.api.flush();
    outcome?;
    flushed
}

fn dispatch(ctx: &mut AppContext, command: Commands) -> Result<()> {
    match command {
        Commands::Sync { clear } => handle_sync(ctx, clear),
        Commands::SyncDiff => handle_sync_diff(ctx),
        Commands::Search {
            query,
            name,
            artist,
            album,
            limit,
        } => handle_search(ctx, query, name, artist, album, limit),
        Commands::List { playlist } => handle_list(ctx, playlist),
        Commands::Stats => handle_stats(ctx),
        Commands::Duplicates { limit } => handle_duplicates(ctx, limit),
        Commands::Auth => handle_auth(ctx),
        Commands::ClearCache { yes } => handle_clear_cache(ctx, yes),
    }
}

fn handle_sync(ctx: &mut AppContext, clear: bool) -> Result<()> {
    let remote = SpotifyRemote::new(&ctx.config)?;
    let mut observer = CliObserver::new();
    let result = ctx.api.sync_full(&remote, clear, &mut observer);
    observer.finish();
    let result = result?;
    print_messages(&result.messages);
    if let Some(report) = &result.sync {
        print_sync_report(report);
    }
    Ok(())
}

fn handle_sync_diff(ctx: &mut AppContext) -> Result<()> {
    let remote = SpotifyRemote::new(&ctx.config)?;
    let mut observer = CliObserver::new();
    let result = ctx.api.sync_diff(&remote, &mut observer);
    observer.finish();
    let result = result?;
    print_messages(&result.messages);
    if let Some(report) = &result.sync {
        print_sync_report(report);
    }
    Ok(())
}

fn handle_search(
    ctx: &mut AppContext,
    query: Option<String>,
    name: Option<String>,
    artist: Option<String>,
    album: Option<String>,
    limit: usize,
) -> Result<()> {
    let filter = TrackFilter {
        text: query,
        name,
        artist,
        album,
    };
    let result = ctx.api.search(&filter, limit)?;
    print_track_reports(&result.track_reports);
    print_messages(&result.messages);
    Ok(())
}

fn handle_list(ctx: &mut AppContext, playlist: Option<String>) -> Result<()> {
    let result = ctx.api.list(playlist.as_deref())?;
    print_messages(&result.messages);
    if let Some(detail) = &result.playlist_detail {
        print_playlist_detail(detail);
    } else {
        print_playlists(&result.playlists);
    }
    Ok(())
}

fn handle_stats(ctx: &mut AppContext) -> Result<()> {
    let result = ctx.api.stats()?;
    if let Some(report) = &result.stats {
        print_stats(report);
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_duplicates(ctx: &mut AppContext, limit: usize) -> Result<()> {
    let result = ctx.api.duplicates(limit)?;
    print_track_reports(&result.track_reports);
    print_messages(&result.messages);
    Ok(())
}

fn handle_auth(ctx: &mut AppContext) -> Result<()> {
    let remote = SpotifyRemote::new(&ctx.config)?;
    let user = remote.current_user()?;
    println!("{} {}", "Authenticated as".green(), user.display_name.bold());
    if let Some(email) = &user.email {
        println!("  email:   {}", email);
    }
    if let Some(country) = &user.country {
        println!("  country: {}", country);
    }
    Ok(())
}

fn handle_clear_cache(ctx: &mut AppContext, yes: bool) -> Result<()> {
    if !yes {
        println!(
            "{}",
            "This deletes all locally mirrored data. Re-run with --yes to confirm.".yellow()
        );
        return Ok(());
    }
    let result = ctx.api.clear_cache()?;
    print_messages(&result.messages);
    Ok(())
}

fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

fn print_sync_report(report: &SyncReport) {
    println!();
    println!("{}", "Sync complete".green().bold());
    println!("  saved tracks:      {}", report.saved_tracks);
    println!(
        "  playlists:         {} ({} updated, {} unchanged)",
        report.playlists, report.playlists_updated, report.playlists_skipped
    );
    println!("  tracks in mirror:  {}", report.total_tracks);
}

fn print_track_reports(reports: &[TrackReport]) {
    for (i, report) in reports.iter().enumerate() {
        if i > 0 {
            println!();
        }
        let occurrences = report
            .occurrences
            .map(|n| format!(" ({} occurrences)", n))
            .unwrap_or_default();
        println!(
            "{}{}",
            report.track.name.bold(),
            occurrences.yellow()
        );
        println!(
            "  {} {}",
            report.track.artist,
            format!("({})", report.track.album).dimmed()
        );
        println!(
            "  {}  {}",
            format_duration(report.track.duration_ms).dimmed(),
            report.track.external_url.dimmed()
        );
        if !report.memberships.is_empty() {
            println!("  In playlists:");
            for membership in &report.memberships {
                let positions: Vec<String> = membership
                    .positions
                    .iter()
                    .map(|p| (p + 1).to_string())
                    .collect();
                println!(
                    "    - {} (#{})",
                    membership.playlist.name,
                    positions.join(", #")
                );
            }
        }
    }
}

fn print_playlists(playlists: &[Playlist]) {
    for (i, playlist) in playlists.iter().enumerate() {
        let visibility = if playlist.collaborative {
            "collab"
        } else if playlist.public {
            "public"
        } else {
            "private"
        };
        println!(
            "{:>3}. {} {} {}",
            i + 1,
            playlist.name.bold(),
            format!("({} tracks)", playlist.tracks_total).dimmed(),
            format!("[{}]", visibility).dimmed()
        );
        if !playlist.owner.is_empty() {
            println!("     by {}", playlist.owner.dimmed());
        }
    }
}

fn print_playlist_detail(detail: &PlaylistDetail) {
    println!(
        "{} {}",
        detail.playlist.name.bold(),
        format!("({} tracks)", detail.tracks.len()).dimmed()
    );
    if !detail.playlist.description.is_empty() {
        println!("{}", detail.playlist.description.dimmed());
    }
    println!("--------------------------------");
    for (i, track) in detail.tracks.iter().enumerate() {
        println!(
            "{:>4}. {} {} {}",
            i + 1,
            track.name,
            format!("- {}", track.artist).dimmed(),
            format_duration(track.duration_ms).dimmed()
        );
    }
}

fn print_stats(report: &StatsReport) {
    println!("{}", "Library statistics".bold());
    println!("--------------------------------");
    println!("  tracks:        {}", report.stats.total_tracks);
    println!("  playlists:     {}", report.stats.total_playlists);
    println!("  saved tracks:  {}", report.stats.saved_tracks);
    println!("  listening:     {:.1} hours", report.total_hours);
    if !report.top_artists.is_empty() {
        println!();
        println!("  Top artists:");
        for (artist, count) in &report.top_artists {
            println!("    {:>4}  {}", count, artist);
        }
    }
    if let Some(last) = report.last_synced {
        println!();
        println!(
            "  last synced: {}",
            last.format("%Y-%m-%d %H:%M UTC").to_string().dimmed()
        );
    }
}

fn format_duration(ms: u64) -> String {
    let total_secs = ms / 1000;
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

/// Renders sync progress as indicatif bars: one bar per fetch phase, one
/// per playlist membership fetch, advanced page by page.
struct CliObserver {
    bar: Option<ProgressBar>,
}

impl CliObserver {
    fn new() -> Self {
        Self { bar: None }
    }

    fn start_bar(&mut self, msg: String) {
        self.finish();
        let pb = ProgressBar::new(1);
        pb.set_style(bar_style());
        pb.set_message(msg);
        self.bar = Some(pb);
    }

    fn finish(&mut self) {
        if let Some(pb) = self.bar.take() {
            pb.finish();
        }
    }
}

impl SyncObserver for CliObserver {
    fn phase(&mut self, label: &str) {
        self.start_bar(label.to_string());
    }

    fn playlist(&mut self, index: u64, total: u64, name: &str, tracks_total: u64) {
        self.start_bar(format!(
            "[{}/{}] {} ({} tracks)",
            index, total, name, tracks_total
        ));
    }

    fn page(&mut self, current: u64, total: u64) {
        if let Some(pb) = &self.bar {
            pb.set_length(total.max(1));
            pb.set_position(current);
        }
    }
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{msg} [{bar:40.cyan/blue}] {pos}/{len} pages")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ")
}
