//! Command-line interface.
//!
//! `story-author author` runs an interactive session on stdin/stdout.
//! `story-author records <kind> <op>` manages stored path records.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::config::StorageBackend;
use crate::error::StorageResult;
use crate::records::RecordService;
use crate::storage::{RecordKind, Storage};
use crate::story::StoryPath;

/// Branching dialogue story authoring tool.
#[derive(Parser, Debug)]
#[command(name = "story-author", version, about)]
pub struct Cli {
    /// Command to run; defaults to `author`.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Top-level commands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive authoring session (the default)
    Author {
        /// Snapshot file to save to and load from
        #[arg(long)]
        file: Option<PathBuf>,

        /// Snapshot backend: file or sqlite
        #[arg(long, value_parser = parse_backend)]
        backend: Option<StorageBackend>,

        /// Load the stored story before the first prompt
        #[arg(long)]
        load: bool,
    },

    /// Manage stored records
    Records {
        /// Record kind: path or story
        #[arg(value_parser = parse_kind)]
        kind: RecordKind,

        /// Operation to perform
        #[command(subcommand)]
        op: RecordCommands,
    },
}

/// Record operations.
#[derive(Subcommand, Debug, Clone)]
pub enum RecordCommands {
    /// List all records of the kind
    List,

    /// Show one record
    Get {
        /// Record id
        id: String,
    },

    /// Create a record from a JSON file holding `{storyPath, storyLine}`
    Create {
        /// JSON document file
        file: PathBuf,
    },

    /// Replace a record's document with the contents of a JSON file
    Update {
        /// Record id
        id: String,
        /// JSON document file
        file: PathBuf,
    },

    /// Delete a record
    Delete {
        /// Record id
        id: String,
    },
}

/// Result of CLI command execution.
pub struct CliResult {
    /// Exit code (0 = success)
    pub exit_code: i32,
    /// Output message
    pub message: String,
}

impl CliResult {
    /// Create a success result with the given message.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            message: message.into(),
        }
    }

    /// Create an error result with the given message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            exit_code: 1,
            message: message.into(),
        }
    }
}

/// Execute a record command.
pub async fn execute_record_command<S: Storage>(
    kind: RecordKind,
    op: RecordCommands,
    service: &RecordService<S>,
) -> CliResult {
    match run_record_op(kind, op, service).await {
        Ok(message) => CliResult::success(message),
        Err(e) => CliResult::error(format!("Error: {}", e)),
    }
}

async fn run_record_op<S: Storage>(
    kind: RecordKind,
    op: RecordCommands,
    service: &RecordService<S>,
) -> StorageResult<String> {
    match op {
        RecordCommands::List => to_json(&service.list(kind).await?),
        RecordCommands::Get { id } => to_json(&service.get(kind, &id).await?),
        RecordCommands::Create { file } => {
            let document = read_document(&file).await?;
            to_json(&service.create(kind, document).await?)
        }
        RecordCommands::Update { id, file } => {
            let document = read_document(&file).await?;
            to_json(&service.update(kind, &id, document).await?)
        }
        RecordCommands::Delete { id } => {
            service.delete(kind, &id).await?;
            Ok(format!("{} record {} was deleted", kind, id))
        }
    }
}

async fn read_document(file: &Path) -> StorageResult<StoryPath> {
    let content = tokio::fs::read_to_string(file).await?;
    Ok(serde_json::from_str(&content)?)
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> StorageResult<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn parse_backend(s: &str) -> Result<StorageBackend, String> {
    s.parse().map_err(|e: crate::error::AppError| e.to_string())
}

fn parse_kind(s: &str) -> Result<RecordKind, String> {
    s.parse()
}
