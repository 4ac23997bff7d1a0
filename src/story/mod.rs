//! Branching dialogue model.
//!
//! A [`Story`] owns labeled [`StoryPath`]s; each path holds an ordered list
//! of [`Dialog`]s and each dialog holds narrator lines and [`Question`]s that
//! point at other dialogs by id.
//!
//! Two numbering schemes coexist and must not be confused:
//! - dialog **ids** are assigned from a story-wide counter and never reused;
//! - dialog **positions** are indices within one path and shift on deletion.
//!
//! [`Story::delete_dialog`] takes a position. Use
//! [`Story::dialog_position`] to translate an id first.

mod dialog;
mod label;


pub use dialog::{Dialog, Question, UNSET_DIALOG_ID};
pub use label::{index_for_label, label_for_index};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{StoryError, StoryResult};

/// A labeled branch of the story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryPath {
    /// Position-derived label (`a`, `b`, ...).
    #[serde(rename = "storyPath")]
    pub label: String,
    /// Dialogs in this path, in order.
    #[serde(rename = "storyLine", default)]
    pub dialogs: Vec<Dialog>,
}

impl StoryPath {
    fn new(label: String) -> Self {
        Self {
            label,
            dialogs: Vec::new(),
        }
    }
}

/// Persisted form of a story: `{ "story": [ <path>, ... ] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorySnapshot {
    /// Every path, in label order.
    #[serde(default)]
    pub story: Vec<StoryPath>,
}

impl StorySnapshot {
    /// Parse a snapshot document. Blank input means "no prior story".
    pub fn from_json(payload: &str) -> serde_json::Result<Option<Self>> {
        if payload.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(payload).map(Some)
    }

    /// Pretty-printed snapshot document.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// The in-memory story being authored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Story {
    paths: Vec<StoryPath>,
    next_dialog_id: i64,
}

impl Default for Story {
    fn default() -> Self {
        Self::new()
    }
}

impl Story {
    /// An empty story. The first dialog created gets id 0.
    pub fn new() -> Self {
        Self {
            paths: Vec::new(),
            next_dialog_id: 0,
        }
    }

    /// Rebuild a story from a snapshot; see [`Story::recover`].
    pub fn from_snapshot(snapshot: StorySnapshot) -> StoryResult<Self> {
        let mut story = Self::new();
        story.recover(snapshot.story)?;
        Ok(story)
    }

    /// Copy of the current paths in persisted form.
    pub fn to_snapshot(&self) -> StorySnapshot {
        StorySnapshot {
            story: self.paths.clone(),
        }
    }

    /// All paths in label order.
    pub fn paths(&self) -> &[StoryPath] {
        &self.paths
    }

    /// Id the next created dialog will receive.
    pub fn next_dialog_id(&self) -> i64 {
        self.next_dialog_id
    }

    /// Number of paths.
    pub fn path_count(&self) -> usize {
        self.paths.len()
    }

    /// All path labels in order.
    pub fn labels(&self) -> Vec<String> {
        self.paths.iter().map(|p| p.label.clone()).collect()
    }

    /// Number of dialogs across every path.
    pub fn total_dialog_count(&self) -> usize {
        self.paths.iter().map(|p| p.dialogs.len()).sum()
    }

    /// Whether `label` names an existing path.
    pub fn has_path(&self, label: &str) -> bool {
        self.path_index(label).is_ok()
    }

    /// Append an empty path and return its label.
    pub fn create_path(&mut self) -> String {
        let label = label_for_index(self.paths.len());
        self.paths.push(StoryPath::new(label.clone()));
        debug!(label = %label, "Path created");
        label
    }

    /// Remove a path and shift every later path's label down by one.
    pub fn delete_path(&mut self, label: &str) -> StoryResult<StoryPath> {
        let index = self.path_index(label)?;
        let removed = self.paths.remove(index);

        for (i, path) in self.paths.iter_mut().enumerate().skip(index) {
            path.label = label_for_index(i);
        }

        debug!(label = %label, dialogs = removed.dialogs.len(), "Path deleted");
        Ok(removed)
    }

    /// Append a new dialog to a path, consuming the next id.
    ///
    /// Fails with [`StoryError::IdSpaceExhausted`] once the counter cannot
    /// advance past the id it would hand out.
    pub fn create_dialog(&mut self, label: &str) -> StoryResult<&mut Dialog> {
        let index = self.path_index(label)?;
        let id = self.next_dialog_id;
        self.next_dialog_id = id.checked_add(1).ok_or(StoryError::IdSpaceExhausted)?;

        let dialogs = &mut self.paths[index].dialogs;
        dialogs.push(Dialog::new(id));
        debug!(label = %label, dialog_id = id, "Dialog created");

        let last = dialogs.len() - 1;
        Ok(&mut dialogs[last])
    }

    /// Remove the dialog at zero-based `position` within a path.
    ///
    /// This is positional, not by id. Ids are never reused, so the counter
    /// is left untouched.
    pub fn delete_dialog(&mut self, position: usize, label: &str) -> StoryResult<Dialog> {
        let index = self.path_index(label)?;
        let dialogs = &mut self.paths[index].dialogs;
        if position >= dialogs.len() {
            return Err(StoryError::InvalidIndex {
                index: position,
                len: dialogs.len(),
            });
        }

        let removed = dialogs.remove(position);
        debug!(label = %label, position, dialog_id = removed.id(), "Dialog deleted");
        Ok(removed)
    }

    /// Live view of a path's dialogs.
    pub fn dialogs(&self, label: &str) -> Option<&[Dialog]> {
        let index = self.path_index(label).ok()?;
        Some(&self.paths[index].dialogs)
    }

    /// Mutable view of a path's dialogs.
    pub fn dialogs_mut(&mut self, label: &str) -> Option<&mut Vec<Dialog>> {
        let index = self.path_index(label).ok()?;
        Some(&mut self.paths[index].dialogs)
    }

    /// Current position of dialog `id` within a path.
    pub fn dialog_position(&self, label: &str, id: i64) -> Option<usize> {
        self.dialogs(label)?.iter().position(|d| d.id() == id)
    }

    /// Dialog `id` within a path.
    pub fn dialog(&self, label: &str, id: i64) -> Option<&Dialog> {
        self.dialogs(label)?.iter().find(|d| d.id() == id)
    }

    /// Mutable dialog `id` within a path.
    pub fn dialog_mut(&mut self, label: &str, id: i64) -> Option<&mut Dialog> {
        self.dialogs_mut(label)?.iter_mut().find(|d| d.id() == id)
    }

    /// Whether a question may point at dialog `id`.
    ///
    /// Accepts `0 < id < total_dialog_count()`; both bounds are exclusive.
    pub fn is_valid_target(&self, id: i64) -> bool {
        id > 0 && (id as u64) < self.total_dialog_count() as u64
    }

    /// Replace every path with `paths` and recompute the id counter.
    ///
    /// The counter becomes `max(id) + 1`, or `1` when there are no dialogs
    /// at all. Labels are rewritten to match their positions. If the largest
    /// id leaves no room for another, the story is left untouched and
    /// [`StoryError::IdSpaceExhausted`] is returned.
    pub fn recover(&mut self, mut paths: Vec<StoryPath>) -> StoryResult<()> {
        let next_dialog_id = paths
            .iter()
            .flat_map(|p| p.dialogs.iter())
            .map(Dialog::id)
            .max()
            .unwrap_or(0)
            .checked_add(1)
            .ok_or(StoryError::IdSpaceExhausted)?;

        for (i, path) in paths.iter_mut().enumerate() {
            let expected = label_for_index(i);
            if path.label != expected {
                warn!(
                    found = %path.label,
                    expected = %expected,
                    "Recovered path label does not match its position, relabeling"
                );
                path.label = expected;
            }
        }

        self.paths = paths;
        self.next_dialog_id = next_dialog_id;

        debug!(
            paths = self.paths.len(),
            dialogs = self.total_dialog_count(),
            next_dialog_id = self.next_dialog_id,
            "Story recovered"
        );
        Ok(())
    }

    fn path_index(&self, label: &str) -> StoryResult<usize> {
        index_for_label(label)
            .filter(|&i| i < self.paths.len())
            .ok_or_else(|| StoryError::InvalidLabel {
                label: label.to_string(),
            })
    }
}
