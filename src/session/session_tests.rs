//! Scripted-input tests for the authoring session state machine.

use super::*;
use crate::error::StorageError;
use crate::storage::MockSnapshotStore;
use crate::story::StorySnapshot;
use pretty_assertions::assert_eq;

async fn run_script(
    story: Story,
    store: MockSnapshotStore,
    script: &str,
) -> (SessionEnd, Story, String) {
    let mut session = AuthoringSession::new(story, Box::new(store), script.as_bytes(), Vec::new());
    let end = session.run().await.unwrap();
    let (story, output) = session.into_parts();
    (end, story, String::from_utf8(output).unwrap())
}

/// A story with one path `a` holding `count` empty dialogs (ids `0..count`).
fn story_with_dialogs(count: usize) -> Story {
    let mut story = Story::new();
    story.create_path();
    for _ in 0..count {
        story.create_dialog("a").unwrap();
    }
    story
}

fn accepting_store() -> MockSnapshotStore {
    let mut store = MockSnapshotStore::new();
    store.expect_save_snapshot().times(1).returning(|_| Ok(()));
    store
}

#[tokio::test]
async fn test_full_authoring_flow_saves_snapshot() {
    let mut store = MockSnapshotStore::new();
    store
        .expect_save_snapshot()
        .withf(|snapshot: &StorySnapshot| {
            snapshot.story.len() == 1
                && snapshot.story[0].dialogs[0].sender_lines == vec!["Hello".to_string()]
                && snapshot.story[0].dialogs[0].questions[0].text == "Go?"
        })
        .times(1)
        .returning(|_| Ok(()));

    let script = "new\na\nnew\na\n0\nnew line\nHello\na\n0\nnew question\nGo?\nsave\n";
    let (end, story, output) = run_script(Story::new(), store, script).await;

    assert_eq!(end, SessionEnd::Saved);
    assert_eq!(story.labels(), vec!["a"]);
    let dialog = story.dialog("a", 0).unwrap();
    assert_eq!(dialog.sender_lines, vec!["Hello".to_string()]);
    assert!(dialog.questions[0].is_unset());
    assert!(output.contains("Created path a."));
    assert!(output.contains("Created dialog 0 in path a."));
    assert!(output.contains("Paths: 1 | Dialogs: 1 | Labels: a"));
    assert!(output.contains("Story saved."));
}

#[tokio::test]
async fn test_save_failure_still_ends_session() {
    let mut store = MockSnapshotStore::new();
    store.expect_save_snapshot().times(1).returning(|_| {
        Err(StorageError::Query {
            message: "disk full".to_string(),
        })
    });

    let (end, _, output) = run_script(Story::new(), store, "new\nsave\nnew\n").await;

    assert_eq!(end, SessionEnd::SaveFailed);
    assert!(output.contains("Save failed: Query failed: disk full"));
    // Nothing after `save` is read.
    assert_eq!(output.matches("Created path").count(), 1);
}

#[tokio::test]
async fn test_end_of_input_closes_without_saving() {
    let store = MockSnapshotStore::new();

    let (end, story, _) = run_script(Story::new(), store, "new\nnew\n").await;

    assert_eq!(end, SessionEnd::InputClosed);
    assert_eq!(story.labels(), vec!["a", "b"]);
}

#[tokio::test]
async fn test_invalid_top_menu_input_is_reported() {
    let (end, story, output) =
        run_script(Story::new(), accepting_store(), "open 1\nc\nsave\n").await;

    assert_eq!(end, SessionEnd::Saved);
    assert_eq!(story.path_count(), 0);
    assert!(output.contains("Invalid command: open 1"));
    assert!(output.contains("Invalid path label: c"));
}

#[tokio::test]
async fn test_load_recovers_stored_story() {
    let mut stored = story_with_dialogs(2);
    stored.dialog_mut("a", 1).unwrap().add_line("stored");
    let snapshot = stored.to_snapshot();

    let mut store = accepting_store();
    store
        .expect_load_snapshot()
        .times(1)
        .returning(move || Ok(Some(snapshot.clone())));

    let (_, story, output) = run_script(Story::new(), store, "load\nsave\n").await;

    assert_eq!(story.paths(), stored.paths());
    assert_eq!(story.next_dialog_id(), 2);
    assert!(output.contains("Paths: 1 | Dialogs: 2 | Labels: a"));
}

#[tokio::test]
async fn test_load_without_stored_story_starts_empty() {
    let mut store = accepting_store();
    store.expect_load_snapshot().times(1).returning(|| Ok(None));

    let (_, story, _) = run_script(story_with_dialogs(3), store, "load\nsave\n").await;

    assert_eq!(story.path_count(), 0);
}

#[tokio::test]
async fn test_load_failure_keeps_current_story() {
    let mut store = accepting_store();
    store.expect_load_snapshot().times(1).returning(|| {
        Err(StorageError::InvalidDocument {
            message: "bad".to_string(),
        })
    });

    let (_, story, output) = run_script(story_with_dialogs(1), store, "load\nsave\n").await;

    assert_eq!(story.total_dialog_count(), 1);
    assert!(output.contains("Load failed"));
}

#[tokio::test]
async fn test_load_with_exhausted_ids_keeps_current_story() {
    let payload = r#"{"story":[{"storyPath":"a","storyLine":[
        {"id":9223372036854775807,"senderTextArr":[],"questionArr":[]}
    ]}]}"#;
    let snapshot = StorySnapshot::from_json(payload).unwrap().unwrap();

    let mut store = accepting_store();
    store
        .expect_load_snapshot()
        .times(1)
        .returning(move || Ok(Some(snapshot.clone())));

    let (end, story, output) = run_script(story_with_dialogs(2), store, "load
save
").await;

    assert_eq!(end, SessionEnd::Saved);
    assert_eq!(story.total_dialog_count(), 2);
    assert_eq!(story.next_dialog_id(), 2);
    assert!(output.contains("Load failed: Story error: Dialog id space exhausted"));
}

#[tokio::test]
async fn test_edit_question_target_bounds() {
    let mut story = story_with_dialogs(3);
    story.dialog_mut("a", 0).unwrap().add_question(Question::new("Where?"));

    // 0 and 3 are out of range for a story with three dialogs; 2 is fine.
    let script = "a\n0\nedit question 0\n\n0\n\
                  a\n0\nedit question 0\n\n3\n\
                  a\n0\nedit question 0\nWhither?\n2\n\
                  save\n";
    let (_, story, output) = run_script(story, accepting_store(), script).await;

    let question = &story.dialog("a", 0).unwrap().questions[0];
    assert_eq!(question.text, "Whither?");
    assert_eq!(question.next_dialog_id, 2);
    assert!(output.contains("Invalid dialog id: 0 (must be between 0 and 3, exclusive)"));
    assert!(output.contains("Invalid dialog id: 3 (must be between 0 and 3, exclusive)"));
    assert!(output.contains("Question 0 now leads to dialog 2."));
}

#[tokio::test]
async fn test_edit_question_keeps_fields_on_empty_input() {
    let mut story = story_with_dialogs(3);
    story
        .dialog_mut("a", 1)
        .unwrap()
        .add_question(Question::new("Stay?").with_next(2));

    let script = "a\n1\nedit question 0\n\n\nsave\n";
    let (_, story, output) = run_script(story, accepting_store(), script).await;

    assert_eq!(
        story.dialog("a", 1).unwrap().questions[0],
        Question::new("Stay?").with_next(2)
    );
    assert!(output.contains("Question text unchanged."));
    assert!(output.contains("Target of question 0 unchanged."));
}

#[tokio::test]
async fn test_non_numeric_target_is_rejected() {
    let mut story = story_with_dialogs(3);
    story.dialog_mut("a", 0).unwrap().add_question(Question::new("Go?"));

    let (_, story, output) =
        run_script(story, accepting_store(), "a\n0\nedit question 0\n\nsoon\nsave\n").await;

    assert!(story.dialog("a", 0).unwrap().questions[0].is_unset());
    assert!(output.contains("Invalid dialog id: soon"));
}

#[tokio::test]
async fn test_invalid_line_index_returns_to_top_menu() {
    let script = "a\n0\nedit line 3\nsave\n";
    let (end, story, output) = run_script(story_with_dialogs(1), accepting_store(), script).await;

    assert_eq!(end, SessionEnd::Saved);
    assert!(story.dialog("a", 0).unwrap().sender_lines.is_empty());
    assert!(output.contains("Invalid index: 3 (have 0)"));
}

#[tokio::test]
async fn test_edit_and_delete_line() {
    let mut story = story_with_dialogs(1);
    let dialog = story.dialog_mut("a", 0).unwrap();
    dialog.add_line("one");
    dialog.add_line("two");

    let script = "a\n0\nedit line 1\nTWO\na\n0\ndelete line 0\nsave\n";
    let (_, story, _) = run_script(story, accepting_store(), script).await;

    assert_eq!(story.dialog("a", 0).unwrap().sender_lines, vec!["TWO".to_string()]);
}

#[tokio::test]
async fn test_delete_question() {
    let mut story = story_with_dialogs(1);
    let dialog = story.dialog_mut("a", 0).unwrap();
    dialog.add_question(Question::new("first"));
    dialog.add_question(Question::new("second"));

    let (_, story, output) =
        run_script(story, accepting_store(), "a\n0\ndelete question 0\nsave\n").await;

    assert_eq!(story.dialog("a", 0).unwrap().questions, vec![Question::new("second")]);
    assert!(output.contains("Deleted question 0: first"));
}

#[tokio::test]
async fn test_delete_path_from_path_menu_relabels() {
    let mut story = Story::new();
    for _ in 0..3 {
        story.create_path();
    }
    story.create_dialog("c").unwrap().add_line("from c");

    let (_, story, output) = run_script(story, accepting_store(), "b\ndelete\nsave\n").await;

    assert_eq!(story.labels(), vec!["a", "b"]);
    assert_eq!(
        story.dialogs("b").unwrap()[0].sender_lines,
        vec!["from c".to_string()]
    );
    assert!(output.contains("Deleted path b."));
}

#[tokio::test]
async fn test_delete_dialog_by_id_resolves_position() {
    let mut story = Story::new();
    story.create_path();
    story.create_path();
    story.create_dialog("b").unwrap(); // id 0
    story.create_dialog("a").unwrap(); // id 1
    story.create_dialog("a").unwrap(); // id 2

    let (_, story, _) = run_script(story, accepting_store(), "a\ndelete 2\nsave\n").await;

    let ids: Vec<i64> = story.dialogs("a").unwrap().iter().map(|d| d.id()).collect();
    assert_eq!(ids, vec![1]);
    assert_eq!(story.total_dialog_count(), 2);
}

#[tokio::test]
async fn test_path_menu_rejects_dialog_from_other_path() {
    let mut story = Story::new();
    story.create_path();
    story.create_path();
    story.create_dialog("b").unwrap();

    let (_, _, output) = run_script(story, accepting_store(), "a\n0\nsave\n").await;

    assert!(output.contains("Invalid dialog id: 0"));
}

#[tokio::test]
async fn test_back_returns_to_top_menu_without_error() {
    let mut session = AuthoringSession::new(
        story_with_dialogs(1),
        Box::new(MockSnapshotStore::new()),
        &b""[..],
        Vec::new(),
    );

    session.handle_line("a").await.unwrap();
    assert_eq!(
        session.state(),
        &SessionState::PathMenu {
            label: "a".to_string()
        }
    );

    session.handle_line("0").await.unwrap();
    assert!(matches!(session.state(), SessionState::DialogMenu(_)));

    session.handle_line("back").await.unwrap();
    assert_eq!(session.state(), &SessionState::TopMenu);
    assert!(session.output().is_empty());
}

#[tokio::test]
async fn test_prompt_states_for_question_edit() {
    let mut story = story_with_dialogs(2);
    story.dialog_mut("a", 0).unwrap().add_question(Question::new("Go?"));
    let mut session = AuthoringSession::new(
        story,
        Box::new(MockSnapshotStore::new()),
        &b""[..],
        Vec::new(),
    );

    for line in ["a", "0", "edit question 0"] {
        session.handle_line(line).await.unwrap();
    }
    assert!(matches!(
        session.state(),
        SessionState::EditQuestionText { index: 0, .. }
    ));

    session.handle_line("Go now?").await.unwrap();
    assert!(matches!(
        session.state(),
        SessionState::EditQuestionTarget { index: 0, .. }
    ));

    session.handle_line("").await.unwrap();
    assert_eq!(session.state(), &SessionState::TopMenu);
    assert_eq!(session.story().dialog("a", 0).unwrap().questions[0].text, "Go now?");
}
