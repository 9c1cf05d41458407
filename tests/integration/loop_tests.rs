//! Integration tests for the conversation loop against scripted agents.
#![cfg(unix)]

use tokio_util::sync::CancellationToken;

use planwright::conversation::{drive, Conversation, TurnOutcome};
use planwright::AppError;

use super::test_helpers::{script_config, write_agent_script, RecordingObserver, ScriptedFrontEnd};

/// A clean result with no questions completes the turn and captures the
/// session id for the rest of the conversation.
#[tokio::test]
async fn turn_completes_with_result_and_captures_session() {
    let temp = tempfile::tempdir().expect("tempdir");
    let script = write_agent_script(
        temp.path(),
        r#"printf '%s\n' '{"type":"system","session_id":"s1"}'
printf '%s\n' '{"type":"result","result":"done","is_error":false}'"#,
    );

    let mut conversation =
        Conversation::new(script_config(&script), temp.path().to_path_buf(), "plan");
    let mut observer = RecordingObserver::default();

    let outcome = conversation
        .run_turn("prompt", &mut observer, &CancellationToken::new())
        .await
        .expect("turn succeeds");

    assert_eq!(outcome, TurnOutcome::Completed("done".into()));
    assert_eq!(conversation.session_id(), Some("s1"));
}

/// A stream that ends with neither result nor questions is fatal.
#[tokio::test]
async fn exhaustion_without_result_is_fatal() {
    let temp = tempfile::tempdir().expect("tempdir");
    let script = write_agent_script(temp.path(), "exit 0");

    let mut conversation =
        Conversation::new(script_config(&script), temp.path().to_path_buf(), "plan");
    let mut observer = RecordingObserver::default();

    let err = conversation
        .run_turn("prompt", &mut observer, &CancellationToken::new())
        .await
        .expect_err("no result must fail the conversation");

    match err {
        AppError::Agent(msg) => assert!(
            msg.contains("without producing a result"),
            "got: {msg}"
        ),
        other => panic!("expected AppError::Agent, got: {other:?}"),
    }
}

/// A result record with the error flag set is fatal, carrying the
/// record's result text.
#[tokio::test]
async fn error_result_is_fatal() {
    let temp = tempfile::tempdir().expect("tempdir");
    let script = write_agent_script(
        temp.path(),
        r#"printf '%s\n' '{"type":"result","result":"model overloaded","is_error":true}'"#,
    );

    let mut conversation =
        Conversation::new(script_config(&script), temp.path().to_path_buf(), "plan");
    let mut observer = RecordingObserver::default();

    let err = conversation
        .run_turn("prompt", &mut observer, &CancellationToken::new())
        .await
        .expect_err("error result must fail the conversation");

    match err {
        AppError::Agent(msg) => assert!(msg.contains("model overloaded"), "got: {msg}"),
        other => panic!("expected AppError::Agent, got: {other:?}"),
    }
}

/// Questions detected during the turn win over a result record seen in
/// the same turn.
#[tokio::test]
async fn questions_take_precedence_over_result() {
    let temp = tempfile::tempdir().expect("tempdir");
    let script = write_agent_script(
        temp.path(),
        r#"printf '%s\n' '{"type":"assistant","message":{"content":[{"type":"text","text":"deciding <!--QUESTION:{\"questions\":[{\"question\":\"Which one?\",\"header\":\"Pick\",\"options\":[{\"label\":\"A\"},{\"label\":\"B\"}]}]}-->"}]}}'
printf '%s\n' '{"type":"result","result":"premature","is_error":false}'"#,
    );

    let mut conversation =
        Conversation::new(script_config(&script), temp.path().to_path_buf(), "plan");
    let mut observer = RecordingObserver::default();

    let outcome = conversation
        .run_turn("prompt", &mut observer, &CancellationToken::new())
        .await
        .expect("turn succeeds");

    match outcome {
        TurnOutcome::NeedsAnswers(questions) => {
            assert_eq!(questions.len(), 1);
            assert_eq!(questions[0].text, "Which one?");
            assert_eq!(questions[0].header, "Pick");
            assert_eq!(questions[0].options.len(), 2);
        }
        other => panic!("expected NeedsAnswers, got: {other:?}"),
    }
}

/// A non-zero exit after the result record is a logged anomaly, not a
/// failure: the observed result wins.
#[tokio::test]
async fn post_result_nonzero_exit_keeps_the_result() {
    let temp = tempfile::tempdir().expect("tempdir");
    let script = write_agent_script(
        temp.path(),
        r#"printf '%s\n' '{"type":"result","result":"done","is_error":false}'
echo lingering failure >&2
exit 3"#,
    );

    let mut conversation =
        Conversation::new(script_config(&script), temp.path().to_path_buf(), "plan");
    let mut observer = RecordingObserver::default();

    let outcome = conversation
        .run_turn("prompt", &mut observer, &CancellationToken::new())
        .await
        .expect("result must survive the late exit code");

    assert_eq!(outcome, TurnOutcome::Completed("done".into()));
}

/// Streamed text and tool invocations reach the observer as they arrive.
#[tokio::test]
async fn observer_receives_text_and_tools() {
    let temp = tempfile::tempdir().expect("tempdir");
    let script = write_agent_script(
        temp.path(),
        r#"printf '%s\n' '{"type":"assistant","message":{"content":[{"type":"tool_use","name":"Bash","input":{"command":"ls -la"}},{"type":"text","text":"looking around"}]}}'
printf '%s\n' '{"type":"result","result":"done","is_error":false}'"#,
    );

    let mut conversation =
        Conversation::new(script_config(&script), temp.path().to_path_buf(), "plan");
    let mut observer = RecordingObserver::default();

    conversation
        .run_turn("prompt", &mut observer, &CancellationToken::new())
        .await
        .expect("turn succeeds");

    assert_eq!(observer.texts, vec!["looking around"]);
    assert_eq!(observer.tools, vec![("Bash".to_owned(), "ls -la".to_owned())]);
}

/// Full multi-turn conversation: the agent asks, the front end answers,
/// the loop resumes the same session with the joined answers, and the
/// final result completes the conversation.
#[tokio::test]
async fn drive_resumes_with_answers_and_completes() {
    let temp = tempfile::tempdir().expect("tempdir");
    let script = write_agent_script(
        temp.path(),
        r#"dir=$(dirname "$0")
printf '%s\n' "$*" >> "$dir/args.log"
if [ -f "$dir/answered" ]; then
  printf '%s\n' '{"type":"result","result":"final plan","is_error":false}'
else
  touch "$dir/answered"
  printf '%s\n' '{"type":"system","session_id":"sess-1"}'
  printf '%s\n' '{"type":"assistant","message":{"content":[{"type":"text","text":"pick one <!--QUESTION:{\"questions\":[{\"question\":\"Which?\",\"options\":[{\"label\":\"A\"},{\"label\":\"B\"}]}]}-->"}]}}'
fi"#,
    );

    let mut conversation =
        Conversation::new(script_config(&script), temp.path().to_path_buf(), "plan");
    let mut frontend = ScriptedFrontEnd::with_answers(vec!["B".into()]);

    let result = drive(
        &mut conversation,
        &mut frontend,
        "initial prompt",
        &CancellationToken::new(),
    )
    .await
    .expect("conversation completes");

    assert_eq!(result, "final plan");
    assert_eq!(frontend.completed.as_deref(), Some("final plan"));
    assert!(frontend.errors.is_empty());
    assert_eq!(frontend.seen_questions.len(), 1);
    assert_eq!(frontend.seen_questions[0].text, "Which?");

    // Second invocation resumes the captured session with the answer.
    let args = std::fs::read_to_string(temp.path().join("args.log")).expect("args recorded");
    let lines: Vec<&str> = args.lines().collect();
    assert_eq!(lines.len(), 2, "exactly one invocation per turn");
    assert!(lines[0].contains("initial prompt"));
    assert!(lines[1].starts_with("-p B"), "answers become the next input, got: {}", lines[1]);
    assert!(lines[1].contains("--resume sess-1"), "got: {}", lines[1]);
}

/// Fatal conditions route to the front end's error callback exactly once.
#[tokio::test]
async fn drive_routes_fatal_conditions_to_on_error() {
    let temp = tempfile::tempdir().expect("tempdir");
    let script = write_agent_script(temp.path(), "echo kaput >&2\nexit 2");

    let mut conversation =
        Conversation::new(script_config(&script), temp.path().to_path_buf(), "plan");
    let mut frontend = ScriptedFrontEnd::default();

    let err = drive(
        &mut conversation,
        &mut frontend,
        "prompt",
        &CancellationToken::new(),
    )
    .await
    .expect_err("process failure must propagate");

    assert!(matches!(err, AppError::Process { code: Some(2), .. }));
    assert_eq!(frontend.errors.len(), 1, "exactly one error callback");
    assert!(frontend.errors[0].contains("kaput"));
    assert!(frontend.completed.is_none(), "failure must not look like completion");
}
