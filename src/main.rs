//! Tracker Monitor CLI
//!
//! Watch a Teamwork-style project tracker and surface new activity as
//! desktop notifications and an unread badge.

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use tracker_monitor::{
    run_poll_loop, ConfigStore, DesktopSink, FileBadge, NotificationStore, TrackedItem,
};

#[derive(Parser)]
#[command(name = "twm")]
#[command(about = "Watch a project tracker and surface new activity as desktop notifications")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the watcher in the foreground
    Watch {
        /// Override the configured poll interval (milliseconds)
        #[arg(long)]
        interval_ms: Option<u64>,
    },
    /// Show the current configuration and cursor
    Status {
        /// Output JSON format
        #[arg(long)]
        json: bool,
    },
    /// Manage the tracked-item watch list
    Track {
        #[command(subcommand)]
        action: TrackAction,
    },
    /// Change watcher options
    Set {
        /// Tracker host, scheme included
        #[arg(long)]
        host: Option<String>,
        /// Poll interval in milliseconds
        #[arg(long)]
        ping_ms: Option<u64>,
        /// Show comment previews instead of the unread counter
        #[arg(long)]
        previews: Option<bool>,
    },
    /// Show recently delivered notifications
    Recent {
        /// Show the last N notifications
        #[arg(long, short, default_value = "10")]
        limit: usize,
    },
}

#[derive(Subcommand)]
enum TrackAction {
    /// Track an item by its tracker URL
    Add {
        /// Item URL (e.g. https://host/tasks/view/123)
        url: String,
    },
    /// Stop tracking an item
    Remove {
        /// Item URL as shown by `track list`
        url: String,
    },
    /// List tracked items
    List {
        /// Output JSON format
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing() {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let store = ConfigStore::new();

    match cli.command {
        Commands::Watch { interval_ms } => {
            let sink = DesktopSink::new();
            let badge = FileBadge::new(store.badge_path());
            run_poll_loop(&store, &sink, &badge, interval_ms).await
        }
        Commands::Status { json } => {
            let config = store.load()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                println!("host:           {}", config.tw_host);
                println!("poll interval:  {}ms", config.ping_ms);
                println!("cursor:         {}", config.last_tid);
                println!("previews:       {}", config.show_previews);
                println!("tracked items:  {}", config.tracked.len());
            }
            Ok(())
        }
        Commands::Track { action } => run_track(&store, action),
        Commands::Set {
            host,
            ping_ms,
            previews,
        } => {
            let mut config = store.load()?;
            if let Some(host) = host {
                config.tw_host = host.trim_end_matches('/').to_string();
            }
            if let Some(ping_ms) = ping_ms {
                config.ping_ms = ping_ms;
            }
            if let Some(previews) = previews {
                config.show_previews = previews;
            }
            store.save(&config)?;
            info!("configuration updated");
            Ok(())
        }
        Commands::Recent { limit } => {
            let log = NotificationStore::new();
            for record in log.recent(limit)? {
                if record.body.is_empty() {
                    println!("{}  {}  {}", record.ts.to_rfc3339(), record.id, record.title);
                } else {
                    println!(
                        "{}  {}  {} — {}",
                        record.ts.to_rfc3339(),
                        record.id,
                        record.title,
                        record.body
                    );
                }
            }
            Ok(())
        }
    }
}

fn run_track(store: &ConfigStore, action: TrackAction) -> Result<()> {
    match action {
        TrackAction::Add { url } => {
            let item = TrackedItem::parse_url(&url)
                .ok_or_else(|| anyhow!("unrecognized item url: {}", url))?;

            let mut config = store.load()?;
            if config
                .tracked
                .iter()
                .any(|existing| existing.module_id == item.module_id && existing.record_id == item.record_id)
            {
                println!("already tracking {}", url);
                return Ok(());
            }

            config.tracked.push(item);
            store.save(&config)?;
            println!("tracking {}", url);
            Ok(())
        }
        TrackAction::Remove { url } => {
            let mut config = store.load()?;
            let before = config.tracked.len();
            config.tracked.retain(|item| item.original_url != url);

            if config.tracked.len() == before {
                return Err(anyhow!("not tracking {}", url));
            }

            store.save(&config)?;
            println!("removed {}", url);
            Ok(())
        }
        TrackAction::List { json } => {
            let config = store.load()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config.tracked)?);
            } else if config.tracked.is_empty() {
                println!("no tracked items (watching everything)");
            } else {
                for item in &config.tracked {
                    println!(
                        "module {}  record {}  {}",
                        item.module_id, item.record_id, item.original_url
                    );
                }
            }
            Ok(())
        }
    }
}
