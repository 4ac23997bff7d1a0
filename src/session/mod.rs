//! Interactive authoring session.
//!
//! [`AuthoringSession`] is a line-driven state machine over a [`Story`]:
//!
//! ```text
//! TopMenu ──label──▶ PathMenu ──id──▶ DialogMenu ──▶ line/question prompts
//!    ▲                  │                 │                   │
//!    └──────────────────┴─────────────────┴───────────────────┘
//! ```
//!
//! Every mutation prints a confirmation and the story summary, then returns
//! to the top menu. Errors are reported to the operator and also return to
//! the top menu; nothing short of an I/O failure on the channel ends the
//! session early.

mod command;
mod render;

#[cfg(test)]
#[path = "session_tests.rs"]
mod session_tests;

pub use command::{parse_dialog, parse_path, parse_top, DialogCommand, PathCommand, TopCommand};

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, info, warn};

use crate::error::{AppResult, StoryError, StoryResult};
use crate::storage::SnapshotStore;
use crate::story::{Dialog, Question, Story};

/// A dialog selected from the path menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogRef {
    /// Label of the path holding the dialog.
    pub label: String,
    /// Id of the dialog, not its position.
    pub dialog_id: i64,
}

/// Where the session is in the menu hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    /// Choosing a path, `new`, `save` or `load`.
    #[default]
    TopMenu,
    /// Inside one path.
    PathMenu {
        /// Label of the open path.
        label: String,
    },
    /// Inside one dialog.
    DialogMenu(DialogRef),
    /// Waiting for the text of a new line.
    NewLine(DialogRef),
    /// Waiting for replacement text of a line.
    EditLine {
        /// Dialog being edited.
        dialog: DialogRef,
        /// Zero-based line index.
        index: usize,
    },
    /// Waiting for the text of a new question.
    NewQuestion(DialogRef),
    /// Waiting for replacement question text.
    EditQuestionText {
        /// Dialog being edited.
        dialog: DialogRef,
        /// Zero-based question index.
        index: usize,
    },
    /// Waiting for the question's next dialog id.
    EditQuestionTarget {
        /// Dialog being edited.
        dialog: DialogRef,
        /// Zero-based question index.
        index: usize,
    },
}

/// How a session finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The operator chose `save` and the snapshot was written.
    Saved,
    /// The operator chose `save` but the write failed. The failure was
    /// logged and reported; the session ended anyway.
    SaveFailed,
    /// Input reached end-of-stream before `save`. Nothing was written.
    InputClosed,
}

/// Result of handling one line in a non-top menu.
enum Step {
    /// Move to another state without changing the story.
    Goto(SessionState),
    /// The story changed: print the message and the summary, then go to the
    /// top menu.
    Changed(String),
    /// Print the message and move on without a summary.
    Note(String, SessionState),
}

/// Menu-driven editor over a [`Story`] and a line-based I/O channel.
pub struct AuthoringSession<R, W> {
    story: Story,
    store: Box<dyn SnapshotStore>,
    input: R,
    output: W,
    state: SessionState,
}

impl<R, W> AuthoringSession<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Create a session editing `story`, reading commands from `input` and
    /// writing prompts to `output`.
    pub fn new(story: Story, store: Box<dyn SnapshotStore>, input: R, output: W) -> Self {
        Self {
            story,
            store,
            input,
            output,
            state: SessionState::TopMenu,
        }
    }

    /// The story as edited so far.
    pub fn story(&self) -> &Story {
        &self.story
    }

    /// Current menu or prompt.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The output channel.
    pub fn output(&self) -> &W {
        &self.output
    }

    /// Consume the session, returning the story and the output channel.
    pub fn into_parts(self) -> (Story, W) {
        (self.story, self.output)
    }

    /// Replace the story with the stored snapshot, or with an empty story if
    /// nothing is stored.
    ///
    /// On a read error, or a stored story with no ids left, the current story
    /// is kept and the error is returned.
    pub async fn load(&mut self) -> AppResult<()> {
        match self.store.load_snapshot().await? {
            Some(snapshot) => {
                self.story.recover(snapshot.story)?;
                info!(
                    paths = self.story.path_count(),
                    dialogs = self.story.total_dialog_count(),
                    "Story loaded"
                );
            }
            None => {
                self.story = Story::new();
                info!("No stored story, starting empty");
            }
        }
        Ok(())
    }

    /// Run until the operator saves or the input ends.
    pub async fn run(&mut self) -> AppResult<SessionEnd> {
        info!("Authoring session started");
        self.say(&render::summary(&self.story)).await?;

        loop {
            self.prompt().await?;

            let line = match self.read_line().await? {
                Some(line) => line,
                None => {
                    warn!("Input closed before save, story not written");
                    return Ok(SessionEnd::InputClosed);
                }
            };

            if let Some(end) = self.handle_line(&line).await? {
                info!(outcome = ?end, "Authoring session finished");
                return Ok(end);
            }
        }
    }

    /// Process one line of operator input in the current state.
    ///
    /// Returns `Some` once the session has ended.
    pub async fn handle_line(&mut self, line: &str) -> AppResult<Option<SessionEnd>> {
        let state = std::mem::take(&mut self.state);
        debug!(state = ?state, input = %line.trim(), "Handling input");

        let step = match state {
            SessionState::TopMenu => return self.on_top_menu(line).await,
            SessionState::PathMenu { label } => self.on_path_menu(&label, line),
            SessionState::DialogMenu(dialog) => self.on_dialog_menu(dialog, line),
            SessionState::NewLine(dialog) => self.on_new_line(&dialog, line),
            SessionState::EditLine { dialog, index } => self.on_edit_line(&dialog, index, line),
            SessionState::NewQuestion(dialog) => self.on_new_question(&dialog, line),
            SessionState::EditQuestionText { dialog, index } => {
                self.on_edit_question_text(dialog, index, line)
            }
            SessionState::EditQuestionTarget { dialog, index } => {
                self.on_edit_question_target(&dialog, index, line)
            }
        };

        match step {
            Ok(Step::Goto(next)) => self.state = next,
            Ok(Step::Changed(message)) => {
                self.say(&message).await?;
                self.say(&render::summary(&self.story)).await?;
            }
            Ok(Step::Note(message, next)) => {
                self.say(&message).await?;
                self.state = next;
            }
            Err(e) => self.report(e).await?,
        }

        Ok(None)
    }

    async fn on_top_menu(&mut self, line: &str) -> AppResult<Option<SessionEnd>> {
        let command = match parse_top(line) {
            Ok(command) => command,
            Err(e) => {
                self.report(e).await?;
                return Ok(None);
            }
        };

        match command {
            TopCommand::OpenPath(label) => {
                if self.story.has_path(&label) {
                    self.state = SessionState::PathMenu { label };
                } else {
                    self.report(StoryError::InvalidLabel { label }).await?;
                }
            }
            TopCommand::NewPath => {
                let label = self.story.create_path();
                self.say(&format!("Created path {}.", label)).await?;
                self.say(&render::summary(&self.story)).await?;
            }
            TopCommand::Load => {
                if let Err(e) = self.load().await {
                    error!(error = %e, "Failed to load story");
                    self.say(&format!("Load failed: {}", e)).await?;
                }
                self.say(&render::summary(&self.story)).await?;
            }
            TopCommand::Save => return self.save().await.map(Some),
        }

        Ok(None)
    }

    fn on_path_menu(&mut self, label: &str, line: &str) -> StoryResult<Step> {
        match parse_path(line)? {
            PathCommand::OpenDialog(id) => {
                if self.story.dialog(label, id).is_none() {
                    return Err(StoryError::InvalidDialogId { id: id.to_string() });
                }
                Ok(Step::Goto(SessionState::DialogMenu(DialogRef {
                    label: label.to_string(),
                    dialog_id: id,
                })))
            }
            PathCommand::NewDialog => {
                let id = self.story.create_dialog(label)?.id();
                Ok(Step::Changed(format!(
                    "Created dialog {} in path {}.",
                    id, label
                )))
            }
            PathCommand::DeletePath => {
                self.story.delete_path(label)?;
                Ok(Step::Changed(format!("Deleted path {}.", label)))
            }
            PathCommand::DeleteDialog(id) => {
                let position = self.story.dialog_position(label, id).ok_or_else(|| {
                    StoryError::InvalidDialogId { id: id.to_string() }
                })?;
                self.story.delete_dialog(position, label)?;
                Ok(Step::Changed(format!(
                    "Deleted dialog {} from path {}.",
                    id, label
                )))
            }
            PathCommand::Back => Ok(Step::Goto(SessionState::TopMenu)),
        }
    }

    fn on_dialog_menu(&mut self, dialog: DialogRef, line: &str) -> StoryResult<Step> {
        let command = parse_dialog(line)?;
        let node = self.dialog_mut(&dialog)?;

        match command {
            DialogCommand::NewLine => Ok(Step::Goto(SessionState::NewLine(dialog))),
            DialogCommand::EditLine(index) => {
                check_index(index, node.sender_lines.len())?;
                Ok(Step::Goto(SessionState::EditLine { dialog, index }))
            }
            DialogCommand::DeleteLine(index) => {
                let removed = node.remove_line(index)?;
                Ok(Step::Changed(format!("Deleted line {}: {}", index, removed)))
            }
            DialogCommand::NewQuestion => Ok(Step::Goto(SessionState::NewQuestion(dialog))),
            DialogCommand::EditQuestion(index) => {
                check_index(index, node.questions.len())?;
                Ok(Step::Goto(SessionState::EditQuestionText { dialog, index }))
            }
            DialogCommand::DeleteQuestion(index) => {
                let removed = node.remove_question(index)?;
                Ok(Step::Changed(format!(
                    "Deleted question {}: {}",
                    index, removed.text
                )))
            }
            DialogCommand::Back => Ok(Step::Goto(SessionState::TopMenu)),
        }
    }

    fn on_new_line(&mut self, dialog: &DialogRef, line: &str) -> StoryResult<Step> {
        let node = self.dialog_mut(dialog)?;
        node.add_line(line.trim());
        Ok(Step::Changed(format!(
            "Added line {} to dialog {}.",
            node.sender_lines.len() - 1,
            dialog.dialog_id
        )))
    }

    fn on_edit_line(&mut self, dialog: &DialogRef, index: usize, line: &str) -> StoryResult<Step> {
        self.dialog_mut(dialog)?.set_line(line.trim(), index)?;
        Ok(Step::Changed(format!(
            "Updated line {} of dialog {}.",
            index, dialog.dialog_id
        )))
    }

    fn on_new_question(&mut self, dialog: &DialogRef, line: &str) -> StoryResult<Step> {
        let node = self.dialog_mut(dialog)?;
        node.add_question(Question::new(line.trim()));
        Ok(Step::Changed(format!(
            "Added question {} to dialog {}.",
            node.questions.len() - 1,
            dialog.dialog_id
        )))
    }

    fn on_edit_question_text(
        &mut self,
        dialog: DialogRef,
        index: usize,
        line: &str,
    ) -> StoryResult<Step> {
        let text = line.trim();
        let message = if text.is_empty() {
            "Question text unchanged.".to_string()
        } else {
            self.dialog_mut(&dialog)?.set_question_text(text, index)?;
            format!("Updated text of question {}.", index)
        };
        Ok(Step::Note(
            message,
            SessionState::EditQuestionTarget { dialog, index },
        ))
    }

    fn on_edit_question_target(
        &mut self,
        dialog: &DialogRef,
        index: usize,
        line: &str,
    ) -> StoryResult<Step> {
        let input = line.trim();
        if input.is_empty() {
            return Ok(Step::Changed(format!(
                "Target of question {} unchanged.",
                index
            )));
        }

        let target: i64 = input.parse().map_err(|_| StoryError::InvalidDialogId {
            id: input.to_string(),
        })?;
        if !self.story.is_valid_target(target) {
            return Err(StoryError::InvalidTarget {
                id: target,
                upper: self.story.total_dialog_count(),
            });
        }

        self.dialog_mut(dialog)?.set_question_target(target, index)?;
        Ok(Step::Changed(format!(
            "Question {} now leads to dialog {}.",
            index, target
        )))
    }

    async fn save(&mut self) -> AppResult<SessionEnd> {
        let snapshot = self.story.to_snapshot();

        match self.store.save_snapshot(&snapshot).await {
            Ok(()) => {
                info!(paths = snapshot.story.len(), "Story saved");
                self.say("Story saved.").await?;
                Ok(SessionEnd::Saved)
            }
            Err(e) => {
                error!(error = %e, "Failed to save story");
                self.say(&format!("Save failed: {}", e)).await?;
                Ok(SessionEnd::SaveFailed)
            }
        }
    }

    async fn prompt(&mut self) -> AppResult<()> {
        let text = match &self.state {
            SessionState::TopMenu => render::top_menu(),
            SessionState::PathMenu { label } => {
                render::path_menu(label, self.story.dialogs(label).unwrap_or_default())
            }
            SessionState::DialogMenu(dialog) => {
                match self.story.dialog(&dialog.label, dialog.dialog_id) {
                    Some(node) => render::dialog_menu(&dialog.label, node),
                    None => format!("Dialog {} is gone; enter 'back':", dialog.dialog_id),
                }
            }
            SessionState::NewLine(_) => "Line text:".to_string(),
            SessionState::EditLine { dialog, index } => {
                let current = self
                    .story
                    .dialog(&dialog.label, dialog.dialog_id)
                    .and_then(|d| d.sender_lines.get(*index))
                    .cloned()
                    .unwrap_or_default();
                format!("Current: {}\nNew text:", current)
            }
            SessionState::NewQuestion(_) => "Question text:".to_string(),
            SessionState::EditQuestionText { dialog, index } => {
                let current = self
                    .question(dialog, *index)
                    .map(|q| q.text.clone())
                    .unwrap_or_default();
                format!("Current: {}\nNew text (empty keeps current):", current)
            }
            SessionState::EditQuestionTarget { dialog, index } => {
                let current = self
                    .question(dialog, *index)
                    .map(|q| render::target(q.next_dialog_id))
                    .unwrap_or_default();
                format!(
                    "Current target: {}\nNext dialog id (empty keeps current):",
                    current
                )
            }
        };
        self.say(&text).await
    }

    async fn report(&mut self, err: StoryError) -> AppResult<()> {
        debug!(error = %err, "Rejected operator input");
        self.state = SessionState::TopMenu;
        self.say(&err.to_string()).await
    }

    async fn read_line(&mut self) -> AppResult<Option<String>> {
        let mut line = String::new();
        let bytes_read = self.input.read_line(&mut line).await?;
        if bytes_read == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }

    async fn say(&mut self, text: &str) -> AppResult<()> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.write_all(b"\n").await?;
        self.output.flush().await?;
        Ok(())
    }

    fn dialog_mut(&mut self, dialog: &DialogRef) -> StoryResult<&mut Dialog> {
        self.story
            .dialog_mut(&dialog.label, dialog.dialog_id)
            .ok_or_else(|| StoryError::InvalidDialogId {
                id: dialog.dialog_id.to_string(),
            })
    }

    fn question(&self, dialog: &DialogRef, index: usize) -> Option<&Question> {
        self.story
            .dialog(&dialog.label, dialog.dialog_id)?
            .questions
            .get(index)
    }
}

fn check_index(index: usize, len: usize) -> StoryResult<()> {
    if index < len {
        Ok(())
    } else {
        Err(StoryError::InvalidIndex { index, len })
    }
}
