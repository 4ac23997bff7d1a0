//! # Story Author
//!
//! A branching dialogue story model with an interactive authoring console.
//!
//! ## Features
//!
//! - **Story model**: labeled paths of dialogs, each with narrator lines and
//!   player questions that link to other dialogs by id
//! - **Stable numbering**: position-derived path labels that are rewritten
//!   on deletion, and dialog ids that are never reused
//! - **Authoring session**: a line-driven menu state machine over any async
//!   reader/writer pair
//! - **Persistence**: whole-story snapshots in a JSON file or SQLite, plus a
//!   record store with list/get/create/update/delete by id
//!
//! ## Architecture
//!
//! ```text
//! Operator (stdin) → AuthoringSession → Story
//!                          ↓
//!                  SnapshotStore (JSON file | SQLite)
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use story_author::{AuthoringSession, FileSnapshotStore, Story};
//! use tokio::io::BufReader;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = FileSnapshotStore::new("./data/story.json");
//!     let mut session = AuthoringSession::new(
//!         Story::new(),
//!         Box::new(store),
//!         BufReader::new(tokio::io::stdin()),
//!         tokio::io::stdout(),
//!     );
//!     session.run().await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

/// Command-line interface definitions.
pub mod cli;
/// Configuration loaded from the environment.
pub mod config;
/// Error types and result aliases for the application.
pub mod error;
/// Record CRUD service.
pub mod records;
/// Interactive authoring session state machine.
pub mod session;
/// Snapshot and record persistence.
pub mod storage;
/// Story, path, dialog and question model.
pub mod story;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use session::{AuthoringSession, SessionEnd};
pub use storage::{FileSnapshotStore, SnapshotStore, SqliteStorage};
pub use story::{Dialog, Question, Story, StoryPath, StorySnapshot};
