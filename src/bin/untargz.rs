//! Command-line front end: unpack or list `.tar.gz` archives.

use std::{path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget};

use untargz::{decompress_file, unpack_all, ArchiveReader, ExtractOptions, OnError};

/// untargz
#[derive(Debug, Parser)]
#[clap(name = "untargz", version)]
pub struct App {
    /// Log every entry as it is written
    #[clap(short, long, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Unpacks one or more archives into a directory
    Extract {
        /// the .tar.gz files to unpack, in order
        #[clap(required = true)]
        archives: Vec<PathBuf>,
        /// the directory to unpack into, created if missing
        #[clap(short, long, default_value = ".")]
        output: PathBuf,
        /// Carry on with the remaining archives when one fails
        #[clap(long)]
        keep_going: bool,
        /// Allow entry names containing '..' or starting with '/'
        #[clap(long)]
        allow_unsafe_paths: bool,
    },
    /// Lists the entries of an archive with their sizes
    List {
        /// the .tar.gz file to list
        archive: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = App::parse();

    let level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match args.cmd {
        Command::Extract {
            archives,
            output,
            keep_going,
            allow_unsafe_paths,
        } => {
            let options = ExtractOptions { allow_unsafe_paths };
            let on_error = if keep_going {
                OnError::Skip
            } else {
                OnError::Halt
            };
            // Progress bars and per-entry logging would fight over stderr.
            let progress = if args.verbose {
                MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
            } else {
                MultiProgress::new()
            };

            let report = unpack_all(&archives, &output, &options, on_error, &progress).await;
            for (source, err) in &report.failed {
                eprintln!("untargz: {}: {err}", source.display());
            }
            for source in &report.skipped {
                eprintln!("untargz: {}: not attempted", source.display());
            }
            if !report.is_success() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::List { archive } => {
            let data = decompress_file(&archive, &ProgressBar::hidden()).await?;
            for entry in ArchiveReader::new(&data) {
                let entry = entry.with_context(|| format!("listing {}", archive.display()))?;
                println!("{entry}");
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
