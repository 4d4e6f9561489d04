//! Command-line front end driving a browser session

use crate::browser::{Browser, Command, Event};
use crate::config::DEFAULT_ENV_FILE;
use crate::providers::{Bucket, ObjectEntry, ObjectStore};
use crate::transfer::{Operation, ProgressUpdate, TransferEngine, TransferStatus};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "s3explorer",
    version,
    about = "Browse, upload, download and delete objects in S3-compatible storage"
)]
pub struct Cli {
    /// Env file providing AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY and AWS_DEFAULT_REGION
    #[arg(long, default_value = DEFAULT_ENV_FILE)]
    pub env_file: PathBuf,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// List buckets
    Buckets {
        #[arg(long)]
        json: bool,
    },
    /// List the objects in a bucket (first page only)
    Ls {
        bucket: String,
        #[arg(long)]
        json: bool,
    },
    /// Download an object to a local file
    Get {
        bucket: String,
        key: String,
        /// Defaults to the key's base name in the current directory
        destination: Option<PathBuf>,
    },
    /// Upload a local file
    Put {
        bucket: String,
        path: PathBuf,
        /// Object key; defaults to the file name
        #[arg(long)]
        key: Option<String>,
    },
    /// Delete an object
    Rm { bucket: String, key: String },
}

impl CliCommand {
    fn to_command(&self) -> Command {
        match self {
            CliCommand::Buckets { .. } => Command::ListBuckets,
            CliCommand::Ls { bucket, .. } => Command::OpenBucket {
                bucket: bucket.clone(),
            },
            CliCommand::Get {
                bucket,
                key,
                destination,
            } => Command::Download {
                bucket: bucket.clone(),
                key: key.clone(),
                destination: destination.clone(),
            },
            CliCommand::Put { bucket, path, key } => Command::Upload {
                bucket: bucket.clone(),
                path: path.clone(),
                key: key.clone(),
            },
            CliCommand::Rm { bucket, key } => Command::Delete {
                bucket: bucket.clone(),
                key: key.clone(),
            },
        }
    }

    fn json(&self) -> bool {
        matches!(
            self,
            CliCommand::Buckets { json: true } | CliCommand::Ls { json: true, .. }
        )
    }

    fn shows_listing(&self) -> bool {
        matches!(self, CliCommand::Ls { .. })
    }

    /// Whether listing is the command itself rather than a follow-up refresh
    fn is_listing(&self) -> bool {
        matches!(self, CliCommand::Buckets { .. } | CliCommand::Ls { .. })
    }
}

/// Run one command to completion. Returns true if it succeeded.
pub async fn execute<S>(engine: TransferEngine<S>, command: CliCommand) -> bool
where
    S: ObjectStore + ?Sized + 'static,
{
    let (handle, mut events) = Browser::spawn(engine);
    if handle.send(command.to_command()).is_err() {
        log::error!("browser session closed before the command was sent");
        return false;
    }
    // Closing the session lets the event stream end once the command is done
    drop(handle);

    let mut ok = true;
    while let Some(event) = events.recv().await {
        match event {
            Event::Buckets { buckets } => print_buckets(&buckets, command.json()),
            Event::Listing { bucket, entries } => {
                if command.shows_listing() {
                    print_listing(&bucket, &entries, command.json());
                }
            }
            Event::ListingFailed { message, .. } if !command.is_listing() => {
                // Refresh after a put or rm; the transfer outcome stands on its own
                log::warn!("listing_refresh_failed: {}", message);
            }
            Event::ListingFailed { message, .. } | Event::Rejected { message } => {
                eprintln!("Error: {}", message);
                ok = false;
            }
            Event::Started { operation, target, .. } => {
                log::debug!("{}_started: {}", operation, target);
            }
            Event::Progress { update, .. } => render_progress(&update),
            Event::Finished {
                operation,
                target,
                status,
                error,
                ..
            } => {
                if operation != Operation::Delete {
                    eprintln!();
                }
                match status {
                    TransferStatus::Succeeded => println!("{}", success_message(operation)),
                    _ => {
                        eprintln!(
                            "Error: {}",
                            error.unwrap_or_else(|| format!("{} of {} failed", operation, target))
                        );
                        ok = false;
                    }
                }
            }
        }
    }
    ok
}

fn success_message(operation: Operation) -> &'static str {
    match operation {
        Operation::Download => "File successfully downloaded",
        Operation::Upload => "File successfully uploaded",
        Operation::Delete => "File successfully deleted",
    }
}

fn render_progress(update: &ProgressUpdate) {
    let mut stderr = std::io::stderr();
    let _ = match update.percent() {
        Some(percent) => write!(stderr, "\r{:>3}%", percent),
        None => write!(stderr, "\r{} bytes", update.bytes_transferred),
    };
    let _ = stderr.flush();
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error: failed to encode JSON: {}", e),
    }
}

fn print_buckets(buckets: &[Bucket], json: bool) {
    if json {
        return print_json(buckets);
    }
    for bucket in buckets {
        println!("{}", bucket.name);
    }
}

fn print_listing(bucket: &str, entries: &[ObjectEntry], json: bool) {
    if json {
        return print_json(entries);
    }
    if entries.is_empty() {
        println!("(bucket {} is empty)", bucket);
    }
    for entry in entries {
        println!("{}", format_entry(entry));
    }
}

fn format_entry(entry: &ObjectEntry) -> String {
    if entry.is_prefix {
        format!("{:>12}  {}", "DIR", entry.key)
    } else {
        let size = entry
            .size
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        format!("{:>12}  {}", size, entry.key)
    }
}
