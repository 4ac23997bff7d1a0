//! Text shown to the operator.

use crate::story::{Dialog, Story, UNSET_DIALOG_ID};

/// One-line story summary printed after every change.
pub fn summary(story: &Story) -> String {
    let labels = story.labels();
    let labels = if labels.is_empty() {
        "(none)".to_string()
    } else {
        labels.join(", ")
    };

    format!(
        "Paths: {} | Dialogs: {} | Labels: {}",
        story.path_count(),
        story.total_dialog_count(),
        labels
    )
}

pub fn top_menu() -> String {
    "Enter a path label to open it, 'new' to add a path, 'load' or 'save':".to_string()
}

pub fn path_menu(label: &str, dialogs: &[Dialog]) -> String {
    let mut out = format!("Path {}\n", label);

    if dialogs.is_empty() {
        out.push_str("  (no dialogs)\n");
    }
    for dialog in dialogs {
        let first = dialog
            .sender_lines
            .first()
            .map(|s| preview(s))
            .unwrap_or_default();
        out.push_str(&format!(
            "  [{}] {} ({} lines, {} questions)\n",
            dialog.id(),
            first,
            dialog.sender_lines.len(),
            dialog.questions.len()
        ));
    }

    out.push_str("Enter a dialog id, 'new', 'delete <id>', 'delete' (removes the path) or 'back':");
    out
}

pub fn dialog_menu(label: &str, dialog: &Dialog) -> String {
    let mut out = format!("Dialog {} in path {}\nLines:\n", dialog.id(), label);

    if dialog.sender_lines.is_empty() {
        out.push_str("  (none)\n");
    }
    for (i, line) in dialog.sender_lines.iter().enumerate() {
        out.push_str(&format!("  {}: {}\n", i, line));
    }

    out.push_str("Questions:\n");
    if dialog.questions.is_empty() {
        out.push_str("  (none)\n");
    }
    for (i, question) in dialog.questions.iter().enumerate() {
        out.push_str(&format!(
            "  {}: {} -> {}\n",
            i,
            question.text,
            target(question.next_dialog_id)
        ));
    }

    out.push_str(
        "Commands: new line | edit line N | delete line N | new question | edit question N | delete question N | back",
    );
    out
}

pub fn target(next_dialog_id: i64) -> String {
    if next_dialog_id == UNSET_DIALOG_ID {
        "(unset)".to_string()
    } else {
        next_dialog_id.to_string()
    }
}

fn preview(text: &str) -> String {
    const MAX: usize = 40;
    if text.chars().count() > MAX {
        format!("{}...", text.chars().take(MAX).collect::<String>())
    } else {
        text.to_string()
    }
}
