//! blockdir CLI
//!
//! Command-line interface for a file-backed block directory.

use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use blockdir::{BlockDirectory, Config, FileStore, SyncStrategy};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

/// blockdir CLI
#[derive(Parser, Debug)]
#[command(name = "blockdir-cli")]
#[command(about = "Inspect and edit a block directory stored on local disk")]
#[command(version)]
struct Args {
    /// Data directory holding the store log
    #[arg(short, long, default_value = "./blockdir_data")]
    data_dir: PathBuf,

    /// Keyspace
    #[arg(short, long, default_value = "blockdir")]
    keyspace: String,

    /// Column family (directory identifier)
    #[arg(short = 'f', long, default_value = "index")]
    column_family: String,

    /// Block size in bytes for newly created files
    #[arg(short, long, default_value = "16384")]
    block_size: u32,

    /// Number of blocks to cache (0 disables caching)
    #[arg(short, long, default_value = "64")]
    cache_size: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List files with their length and modification time
    Ls,

    /// Copy a local file into the directory
    Put {
        /// Name of the file in the directory
        name: String,

        /// Local file to read
        path: PathBuf,
    },

    /// Write a file's content to stdout
    Cat {
        /// The file to print
        name: String,
    },

    /// Delete a file
    Rm {
        /// The file to delete
        name: String,
    },

    /// Set a file's modification time to now
    Touch {
        /// The file to touch
        name: String,
    },

    /// Show a file's catalog entry
    Stat {
        /// The file to describe
        name: String,
    },

    /// Rewrite the store log without dead records
    Compact,
}

fn main() {
    // Logs go to stderr so `cat` output stays clean
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,blockdir=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> blockdir::Result<()> {
    let config = Config::builder()
        .data_dir(&args.data_dir)
        .keyspace(&args.keyspace)
        .column_family(&args.column_family)
        .block_size(args.block_size)
        .cache_size(args.cache_size)
        .sync_strategy(SyncStrategy::EveryWrite)
        .build();

    let store = Arc::new(FileStore::open(&config)?);
    let stats = store.replay_stats();
    if stats.was_truncated() {
        tracing::warn!("Discarded {} bytes of damaged log tail", stats.bytes_truncated);
    }

    let directory = BlockDirectory::open(config, store.clone())?;

    match args.command {
        Commands::Ls => {
            for name in directory.list_all()? {
                let entry = directory.catalog().entry(&name)?;
                println!("{:>12}  {:>15}  {}", entry.length, entry.last_modified, name);
            }
        }
        Commands::Put { name, path } => {
            let mut source = File::open(&path)?;
            let mut output = directory.create_output(&name)?;
            let copied = io::copy(&mut source, &mut output)?;
            output.close()?;
            tracing::info!("Stored {} bytes from {} as {}", copied, path.display(), name);
        }
        Commands::Cat { name } => {
            let mut input = directory.open_input(&name)?;
            io::copy(&mut input, &mut io::stdout().lock())?;
        }
        Commands::Rm { name } => directory.delete_file(&name)?,
        Commands::Touch { name } => directory.touch_file(&name)?,
        Commands::Stat { name } => {
            let entry = directory.catalog().entry(&name)?;
            println!("name:          {}", entry.name);
            println!("length:        {}", entry.length);
            println!("last_modified: {}", entry.last_modified);
            println!("block_size:    {}", entry.block_size);
            println!("blocks:        {}", entry.block_count());
        }
        Commands::Compact => {
            let before = store.cell_count();
            store.compact()?;
            tracing::info!("Compacted log to {} cells", before);
        }
    }

    directory.close()
}
