//! Operator command parsing for each menu.
//!
//! Input is matched case-insensitively after trimming. Keywords win over
//! path labels, so `new`, `save` and `load` are never read as labels.

use crate::error::{StoryError, StoryResult};
use crate::story::index_for_label;

/// Top menu input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopCommand {
    /// `new`
    NewPath,
    /// `save`
    Save,
    /// `load`
    Load,
    /// Open the path with this label (existence is checked by the caller).
    OpenPath(String),
}

/// Path menu input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathCommand {
    /// Open the dialog with this id.
    OpenDialog(i64),
    /// `new`
    NewDialog,
    /// `delete`
    DeletePath,
    /// Delete the dialog with this id.
    DeleteDialog(i64),
    /// `back`
    Back,
}

/// Dialog menu input. Indices are zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogCommand {
    /// `new line`
    NewLine,
    /// `edit line N`
    EditLine(usize),
    /// `delete line N`
    DeleteLine(usize),
    /// `new question`
    NewQuestion,
    /// `edit question N`
    EditQuestion(usize),
    /// `delete question N`
    DeleteQuestion(usize),
    /// `back`
    Back,
}

/// Parse top menu input.
pub fn parse_top(input: &str) -> StoryResult<TopCommand> {
    let normalized = normalize(input);
    match normalized.as_str() {
        "new" => Ok(TopCommand::NewPath),
        "save" => Ok(TopCommand::Save),
        "load" => Ok(TopCommand::Load),
        label if index_for_label(label).is_some() => Ok(TopCommand::OpenPath(label.to_string())),
        _ => Err(invalid(input)),
    }
}

/// Parse path menu input. A bare integer opens that dialog id.
pub fn parse_path(input: &str) -> StoryResult<PathCommand> {
    let normalized = normalize(input);
    let words: Vec<&str> = normalized.split_whitespace().collect();

    match words.as_slice() {
        ["new"] => Ok(PathCommand::NewDialog),
        ["delete"] => Ok(PathCommand::DeletePath),
        ["back"] => Ok(PathCommand::Back),
        ["delete", id] => parse_id(id).map(PathCommand::DeleteDialog),
        [id] => id
            .parse::<i64>()
            .map(PathCommand::OpenDialog)
            .map_err(|_| invalid(input)),
        _ => Err(invalid(input)),
    }
}

/// Parse dialog menu input.
pub fn parse_dialog(input: &str) -> StoryResult<DialogCommand> {
    let normalized = normalize(input);
    let words: Vec<&str> = normalized.split_whitespace().collect();

    match words.as_slice() {
        ["new", "line"] => Ok(DialogCommand::NewLine),
        ["new", "question"] => Ok(DialogCommand::NewQuestion),
        ["edit", "line", n] => parse_index(n).map(DialogCommand::EditLine),
        ["delete", "line", n] => parse_index(n).map(DialogCommand::DeleteLine),
        ["edit", "question", n] => parse_index(n).map(DialogCommand::EditQuestion),
        ["delete", "question", n] => parse_index(n).map(DialogCommand::DeleteQuestion),
        ["back"] => Ok(DialogCommand::Back),
        _ => Err(invalid(input)),
    }
}

fn parse_id(token: &str) -> StoryResult<i64> {
    token.parse().map_err(|_| StoryError::InvalidDialogId {
        id: token.to_string(),
    })
}

fn parse_index(token: &str) -> StoryResult<usize> {
    token.parse().map_err(|_| StoryError::InvalidCommand {
        input: format!("index '{}'", token),
    })
}

fn normalize(input: &str) -> String {
    input.trim().to_lowercase()
}

fn invalid(input: &str) -> StoryError {
    StoryError::InvalidCommand {
        input: input.trim().to_string(),
    }
}
