// src/main.rs

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};

use mangashelf::application::{commands::*, dto::*};
use mangashelf::{AppState, ClientConfig, LibraryDraft, ReadingStatus};

/// Manga library and reader client.
#[derive(Parser, Debug)]
#[command(name = "mangashelf")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file.
    #[arg(short, long, env = "MANGASHELF_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Answer yes to confirmation prompts.
    #[arg(short, long, global = true)]
    yes: bool,

    /// Print JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default config file.
    Init {
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },

    /// List the library.
    List {
        /// Only entries with this status.
        #[arg(short, long)]
        status: Option<String>,
        /// Match title, author or tag.
        #[arg(short, long, default_value = "")]
        query: String,
        /// Only favorites.
        #[arg(short, long)]
        favorites: bool,
        /// title, rating, progress, date_added or date_updated.
        #[arg(long)]
        sort: Option<String>,
    },

    /// Show library statistics.
    Stats,

    /// Toggle the favorite flag of an entry.
    Favorite { id: String },

    /// Change the reading status of an entry.
    Status { id: String, status: String },

    /// Rate an entry (1-5). Omit the rating to clear it.
    Rate { id: String, rating: Option<u8> },

    /// Replace the notes of an entry.
    Notes { id: String, notes: String },

    /// Record the current chapter (and volume) of an entry.
    Progress {
        id: String,
        chapter: u32,
        #[arg(long)]
        volume: Option<u32>,
    },

    /// Set or clear the known chapter count of an entry.
    Total { id: String, total: Option<u32> },

    /// Add a manga to the library.
    Add {
        title: String,
        #[arg(long)]
        author: Option<String>,
        #[arg(long, default_value = "plan_to_read")]
        status: String,
        /// Catalog id, for quick-adding a search result.
        #[arg(long)]
        manga_id: Option<String>,
    },

    /// Remove an entry, after confirmation.
    Remove { id: String },

    /// Resolve the cover URL of a manga.
    Cover {
        manga_id: String,
        /// 256, 512 or original.
        #[arg(short, long)]
        quality: Option<String>,
    },

    /// Read a manga. Keys are read line by line from stdin:
    /// empty/right/n, left/p, up, down, q.
    Read {
        manga_id: String,
        #[arg(long)]
        chapter: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if let Command::Init { force } = cli.command {
        return init_config(cli.config, force);
    }

    let config = ClientConfig::resolve(cli.config.as_deref())?;
    let state = AppState::from_config(&config, cli.yes)?;
    let out = Output { json: cli.json };

    // Every command works on a loaded library except the reader and covers
    if !matches!(cli.command, Command::Read { .. } | Command::Cover { .. }) {
        let view = load_library(&state).await.map_err(anyhow::Error::msg)?;
        if view.demo_mode {
            info!("Showing demo library");
        }
    }

    match cli.command {
        // Written before any state is built
        Command::Init { .. } => {}

        Command::List {
            status,
            query,
            favorites,
            sort,
        } => {
            let view = get_library(
                &state,
                LibraryQueryDto {
                    status,
                    query,
                    favorites_only: favorites,
                    sort,
                },
            )
            .map_err(anyhow::Error::msg)?;
            out.library(&view)?;
        }

        Command::Stats => {
            let stats = get_library_stats(&state).await.map_err(anyhow::Error::msg)?;
            out.stats(&stats)?;
        }

        Command::Favorite { id } => {
            out.entry(&toggle_favorite(&state, id).await.map_err(anyhow::Error::msg)?)?
        }
        Command::Status { id, status } => out.entry(
            &update_status(&state, id, status)
                .await
                .map_err(anyhow::Error::msg)?,
        )?,
        Command::Rate { id, rating } => out.entry(
            &update_rating(&state, id, rating)
                .await
                .map_err(anyhow::Error::msg)?,
        )?,
        Command::Notes { id, notes } => out.entry(
            &update_notes(&state, id, notes)
                .await
                .map_err(anyhow::Error::msg)?,
        )?,
        Command::Progress {
            id,
            chapter,
            volume,
        } => out.entry(
            &update_progress(&state, id, chapter, volume)
                .await
                .map_err(anyhow::Error::msg)?,
        )?,
        Command::Total { id, total } => out.entry(
            &update_total_chapters(&state, id, total)
                .await
                .map_err(anyhow::Error::msg)?,
        )?,

        Command::Add {
            title,
            author,
            status,
            manga_id,
        } => {
            let view = match (manga_id, author) {
                (Some(manga_id), None) if status == ReadingStatus::PlanToRead.as_str() => {
                    quick_add(&state, manga_id, title).await
                }
                (manga_id, author) => {
                    let status = status.parse::<ReadingStatus>()?;
                    let draft = LibraryDraft {
                        manga_id,
                        author,
                        status,
                        ..LibraryDraft::new(title)
                    };
                    add_manga(&state, draft).await
                }
            }
            .map_err(anyhow::Error::msg)?;
            out.library(&view)?;
        }

        Command::Remove { id } => {
            let removed = remove_from_library(&state, id.clone())
                .await
                .map_err(anyhow::Error::msg)?;
            out.line(if removed {
                format!("Removed {}", id)
            } else {
                format!("Kept {}", id)
            });
        }

        Command::Cover { manga_id, quality } => {
            let cover = get_cover_url(&state, manga_id, quality)
                .await
                .map_err(anyhow::Error::msg)?;
            out.value(&cover, &cover.url)?;
        }

        Command::Read { manga_id, chapter } => {
            read_interactively(&state, &out, manga_id, chapter).await?;
        }
    }

    Ok(())
}

async fn read_interactively(
    state: &AppState,
    out: &Output,
    manga_id: String,
    chapter: Option<String>,
) -> Result<()> {
    let view = open_reader(state, manga_id, chapter)
        .await
        .map_err(anyhow::Error::msg)?;
    out.page(&view)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match reader_key(state, line) {
            Ok(Some(view)) => out.page(&view)?,
            Ok(None) => return Ok(()),
            Err(e) => out.line(e),
        }
    }

    close_reader(state).map_err(anyhow::Error::msg)
}

fn init_config(explicit: Option<PathBuf>, force: bool) -> Result<()> {
    let path = explicit
        .or_else(|| dirs::config_dir().map(|p| p.join("mangashelf").join("config.toml")))
        .ok_or_else(|| anyhow!("No config directory on this platform, pass --config"))?;

    if path.exists() && !force {
        return Err(anyhow!(
            "{} already exists, use --force to overwrite",
            path.display()
        ));
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    std::fs::write(&path, ClientConfig::generate_default())
        .with_context(|| format!("writing {}", path.display()))?;

    println!("Wrote {}", path.display());
    Ok(())
}

// ============================================================================
// OUTPUT
// ============================================================================

struct Output {
    json: bool,
}

impl Output {
    fn line(&self, text: impl std::fmt::Display) {
        println!("{}", text);
    }

    fn value<T: Serialize>(&self, value: &T, text: &str) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            println!("{}", text);
        }
        Ok(())
    }

    fn library(&self, view: &LibraryViewDto) -> Result<()> {
        if self.json {
            return self.value(view, "");
        }
        if view.demo_mode {
            println!("(demo library)");
        }
        if let Some(error) = &view.error {
            println!("! {}", error);
        }
        for entry in &view.entries {
            println!("{}", entry_line(entry));
        }
        Ok(())
    }

    fn entry(&self, entry: &LibraryEntryDto) -> Result<()> {
        self.value(entry, &entry_line(entry))
    }

    fn stats(&self, stats: &LibraryStatsDto) -> Result<()> {
        let text = format!(
            "total {}  reading {}  completed {}  on hold {}  plan to read {}  dropped {}\n\
             chapters read {}  average rating {:.2}",
            stats.total_manga,
            stats.reading,
            stats.completed,
            stats.on_hold,
            stats.plan_to_read,
            stats.dropped,
            stats.total_chapters_read,
            stats.average_rating
        );
        self.value(stats, &text)
    }

    fn page(&self, view: &ReaderViewDto) -> Result<()> {
        let text = format!(
            "{}  page {}/{}{}",
            view.chapter.display_title,
            view.page_number,
            view.total_pages,
            if view.demo { "  (demo)" } else { "" }
        );
        self.value(view, &text)
    }
}

fn entry_line(entry: &LibraryEntryDto) -> String {
    let total = entry
        .total_chapters
        .map(|t| t.to_string())
        .unwrap_or_else(|| "?".to_string());
    format!(
        "{:>4} {} {:<32} {:<13} ch {}/{} ({}%) {}",
        entry.id,
        if entry.is_favorite { "*" } else { " " },
        entry.title,
        entry.status,
        entry.current_chapter,
        total,
        entry.progress_percentage,
        entry
            .rating
            .map(|r| format!("{}/5", r))
            .unwrap_or_default()
    )
}
