use serde::{Deserialize, Serialize};

use crate::error::{StoryError, StoryResult};

/// Target id of a question that does not lead anywhere yet.
pub const UNSET_DIALOG_ID: i64 = -1;

/// A player choice: text plus the id of the dialog it leads to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Text shown to the player.
    #[serde(rename = "questText")]
    pub text: String,
    /// Next dialog id, or [`UNSET_DIALOG_ID`].
    #[serde(default = "unset_dialog_id")]
    pub next_dialog_id: i64,
}

fn unset_dialog_id() -> i64 {
    UNSET_DIALOG_ID
}

impl Question {
    /// Create a question with no target.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            next_dialog_id: UNSET_DIALOG_ID,
        }
    }

    /// Set the dialog this question leads to.
    pub fn with_next(mut self, next_dialog_id: i64) -> Self {
        self.next_dialog_id = next_dialog_id;
        self
    }

    /// Whether the question still has no target.
    pub fn is_unset(&self) -> bool {
        self.next_dialog_id == UNSET_DIALOG_ID
    }
}

/// A dialog node: narrator lines followed by player questions.
///
/// The id is assigned by [`Story::create_dialog`](super::Story::create_dialog)
/// and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dialog {
    id: i64,
    /// Narrator lines, in display order.
    #[serde(rename = "senderTextArr", default)]
    pub sender_lines: Vec<String>,
    /// Player questions, in display order.
    #[serde(rename = "questionArr", default)]
    pub questions: Vec<Question>,
}

impl Dialog {
    pub(crate) fn new(id: i64) -> Self {
        Self {
            id,
            sender_lines: Vec::new(),
            questions: Vec::new(),
        }
    }

    /// The dialog id.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Append a narrator line.
    pub fn add_line(&mut self, text: impl Into<String>) {
        self.sender_lines.push(text.into());
    }

    /// Replace the line at `index`.
    pub fn set_line(&mut self, text: impl Into<String>, index: usize) -> StoryResult<()> {
        let len = self.sender_lines.len();
        let line = self
            .sender_lines
            .get_mut(index)
            .ok_or(StoryError::InvalidIndex { index, len })?;
        *line = text.into();
        Ok(())
    }

    /// Remove and return the line at `index`.
    pub fn remove_line(&mut self, index: usize) -> StoryResult<String> {
        check_index(index, self.sender_lines.len())?;
        Ok(self.sender_lines.remove(index))
    }

    /// Append a question.
    pub fn add_question(&mut self, question: Question) {
        self.questions.push(question);
    }

    /// Replace the question at `index`.
    pub fn set_question(&mut self, question: Question, index: usize) -> StoryResult<()> {
        *self.question_mut(index)? = question;
        Ok(())
    }

    /// Remove and return the question at `index`.
    pub fn remove_question(&mut self, index: usize) -> StoryResult<Question> {
        check_index(index, self.questions.len())?;
        Ok(self.questions.remove(index))
    }

    /// Replace a question's text, keeping its target.
    pub fn set_question_text(&mut self, text: impl Into<String>, index: usize) -> StoryResult<()> {
        self.question_mut(index)?.text = text.into();
        Ok(())
    }

    /// Point a question at another dialog.
    ///
    /// Range checks against the story belong to the caller; see
    /// [`Story::is_valid_target`](super::Story::is_valid_target).
    pub fn set_question_target(&mut self, next_dialog_id: i64, index: usize) -> StoryResult<()> {
        self.question_mut(index)?.next_dialog_id = next_dialog_id;
        Ok(())
    }

    fn question_mut(&mut self, index: usize) -> StoryResult<&mut Question> {
        let len = self.questions.len();
        self.questions
            .get_mut(index)
            .ok_or(StoryError::InvalidIndex { index, len })
    }
}

fn check_index(index: usize, len: usize) -> StoryResult<()> {
    if index < len {
        Ok(())
    } else {
        Err(StoryError::InvalidIndex { index, len })
    }
}
