// src/bin/archive_cli.rs
//! Command-line front end: upload, download, delete and list stored objects

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use encrypted_object_store::{Archive, ArchiveConfig, DeleteOutcome, KeyOrigin};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "archive-cli", version, about = "Encrypted object store")]
struct Cli {
    /// Config file (defaults to $EOS_CONFIG or archive.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Encrypt a file into the store
    Put {
        file: PathBuf,
        /// Name recorded in the catalog (defaults to the file name)
        #[arg(long)]
        name: Option<String>,
    },
    /// Decrypt and verify a stored object
    Get {
        storage_id: String,
        /// Output path (defaults to the original name in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Remove a stored object
    Delete { storage_id: String },
    /// Show stored objects, newest first
    List,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ArchiveConfig::from_path(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        None => ArchiveConfig::load().context("Failed to load configuration")?,
    };

    let archive = Archive::open(&config).context("Failed to open archive")?;
    if let KeyOrigin::Regenerated(problem) = archive.key_origin() {
        warn!(
            %problem,
            "encryption key was regenerated; objects stored earlier cannot be decrypted"
        );
    }

    match cli.command {
        Command::Put { file, name } => {
            let data =
                fs::read(&file).with_context(|| format!("Failed to read {}", file.display()))?;
            let name = match name {
                Some(name) => name,
                None => file
                    .file_name()
                    .context("input path has no file name")?
                    .to_string_lossy()
                    .into_owned(),
            };
            let storage_id = archive.put(&name, &data).context("Upload failed")?;
            println!("File '{name}' uploaded successfully!");
            println!("{storage_id}");
        }
        Command::Get { storage_id, output } => {
            let (name, content) = archive
                .get(&storage_id)
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            let output = output.unwrap_or_else(|| {
                PathBuf::from(Path::new(&name).file_name().unwrap_or(OsStr::new("download")))
            });
            fs::write(&output, &content)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("Wrote '{name}' to {}", output.display());
        }
        Command::Delete { storage_id } => match archive.delete(&storage_id)? {
            DeleteOutcome::Deleted => println!("File deleted successfully!"),
            DeleteOutcome::Partial { blob_removed, .. } if blob_removed => {
                println!("File deleted successfully! (metadata was already missing)")
            }
            DeleteOutcome::Partial { .. } | DeleteOutcome::NotFound => {
                println!("File not found on disk.")
            }
        },
        Command::List => {
            for entry in archive.list()? {
                println!(
                    "{}  {}  {}",
                    entry.storage_id,
                    entry.created_at_display().unwrap_or_else(|| entry.created_at.to_string()),
                    entry.name
                );
            }
        }
    }

    Ok(())
}
