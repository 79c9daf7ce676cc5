use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde::Serialize;

use screen_nx::{get_entries, App, AppPaths, ClientOptions};

#[derive(Parser)]
#[command(name = "screen-nx", version, about = "Upload captures to a configured hoster")]
struct Cli {
    /// Data directory holding sites/, config.ini and .temp/
    #[arg(long, env = "SCREEN_NX_ROOT")]
    root: Option<PathBuf>,

    /// Accept any TLS certificate when uploading (no server identity check)
    #[arg(long, env = "SCREEN_NX_INSECURE_TLS")]
    insecure: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Errors only
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the data directory layout
    Init,
    /// List captures under an album directory, newest first
    Entries {
        album: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// List usable hoster configurations
    Configs {
        #[arg(long)]
        json: bool,
    },
    /// Show or change the default hoster
    Default {
        /// Persist this index as the new default
        #[arg(long, allow_negative_numbers = true)]
        set: Option<i64>,
        #[arg(long)]
        json: bool,
    },
    /// Upload a file and print its URL
    Upload {
        file: PathBuf,
        /// Hoster index instead of the default one
        #[arg(long)]
        config: Option<usize>,
    },
    /// Print the path of a thumbnail for a capture
    Thumbnail { file: PathBuf, width: u32, height: u32 },
    /// Delete cache records and thumbnails older than 30 days
    Sweep,
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => log::LevelFilter::Error,
        (false, 0) => log::LevelFilter::Info,
        (false, 1) => log::LevelFilter::Debug,
        (false, _) => log::LevelFilter::Trace,
    };

    // RUST_LOG, when set, overrides the flag-derived level.
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let paths = AppPaths::new(cli.root.unwrap_or_else(AppPaths::default_root));
    let app = App::open(paths).context("failed to prepare data directory")?;
    log::debug!("Using data directory {}", app.paths.root().display());

    match cli.command {
        Commands::Init => {
            println!("{}", app.paths.root().display());
        }
        Commands::Entries { album, json } => {
            let entries = get_entries(&album);
            if json {
                print_json(&entries)?;
            } else {
                for entry in &entries {
                    println!("{}\t{}", entry.title, entry.path.display());
                }
            }
        }
        Commands::Configs { json } => {
            let configs = app.registry.get_configs();
            if json {
                print_json(&configs)?;
            } else {
                for (i, config) in configs.iter().enumerate() {
                    println!("{}\t{}\t{}", i, config.name, config.url);
                }
            }
        }
        Commands::Default { set, json } => {
            if let Some(index) = set {
                app.registry.set_default_config(index)?;
            }
            let config = app.registry.get_default_config()?;
            if json {
                print_json(&config)?;
            } else {
                println!("{}\t{}", config.name, config.url);
            }
        }
        Commands::Upload { file, config } => {
            let hoster = match config {
                Some(index) => {
                    let configs = app.registry.get_configs();
                    match configs.into_iter().nth(index) {
                        Some(hoster) => hoster,
                        None => bail!("no hoster configuration at index {}", index),
                    }
                }
                None => app.registry.get_default_config()?,
            };

            let options = ClientOptions {
                accept_invalid_certs: cli.insecure,
                ..ClientOptions::default()
            };
            let url = app.uploader(&options)?.upload_file(&file, &hoster)?;
            if url.trim().is_empty() {
                bail!("upload of {} to {} returned no URL", file.display(), hoster.name);
            }
            println!("{}", url);
        }
        Commands::Thumbnail { file, width, height } => {
            let thumb = app.thumbnails.get_thumbnail(&file, width, height)?;
            println!("{}", thumb.display());
        }
        Commands::Sweep => {
            let removed = app.cache.clear_cache_monthly();
            println!("removed {} file(s)", removed);
        }
    }

    Ok(())
}
