//! Multi-turn conversation loop.
//!
//! Drives repeated agent invocations carrying a session id forward,
//! folds detected questions out of the streamed text, and terminates on
//! a clean final result or a fatal condition. Exactly one invocation is
//! in flight per turn; the session id, once observed, never changes for
//! the remainder of the conversation.

use std::path::PathBuf;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::agent::{detect_questions, run_agent, Question, TurnHandle, TurnRequest};
use crate::config::GlobalConfig;
use crate::{AppError, Result};

/// Separator joining per-question answers into the next turn's input.
pub const ANSWER_SEPARATOR: &str = "\n";

/// How a single turn settled, short of a fatal condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The agent produced its final result text.
    Completed(String),
    /// The agent asked questions; answer them all, in order, to continue.
    NeedsAnswers(Vec<Question>),
}

/// Rendering callbacks invoked while a turn streams.
///
/// Both front ends implement this: the console prints directly, the TUI
/// posts messages to its UI task.
pub trait TurnObserver {
    /// The agent emitted a block of assistant text.
    fn on_text(&mut self, text: &str);
    /// The agent invoked a tool; `summary` is a short description of its
    /// input.
    fn on_tool_use(&mut self, name: &str, summary: &str);
}

/// Front-end contract for the synchronous conversation driver.
///
/// [`drive`] calls `on_questions` with the full pending batch and
/// expects one answer per question, in order; every fatal condition is
/// routed to `on_error` exactly once, distinct from completion.
pub trait FrontEnd: TurnObserver {
    /// Collect one answer per question, in order.
    fn on_questions(&mut self, questions: &[Question]) -> Vec<String>;
    /// The conversation completed with the agent's final result text.
    fn on_complete(&mut self, result: &str);
    /// The conversation failed; no further turns follow.
    fn on_error(&mut self, message: &str);
}

/// State carried across the turns of one conversation.
#[derive(Debug)]
pub struct Conversation {
    config: GlobalConfig,
    workdir: PathBuf,
    label: String,
    session_id: Option<String>,
}

impl Conversation {
    /// Create a conversation rooted at `workdir`. `label` names the
    /// workflow in raw-stream log file names.
    #[must_use]
    pub fn new(config: GlobalConfig, workdir: PathBuf, label: impl Into<String>) -> Self {
        Self {
            config,
            workdir,
            label: label.into(),
            session_id: None,
        }
    }

    /// The session id observed on this conversation, if any.
    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Run one turn: spawn the agent with `input`, stream its events
    /// through `observer`, and settle the turn.
    ///
    /// Questions detected during the turn take precedence over a result
    /// for the outcome; the result of such a turn is discarded and the
    /// conversation continues with the answers.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Agent`] when the agent reports an error
    /// result or ends the turn with neither result nor questions, and
    /// [`AppError::Process`] when the process exits non-zero before any
    /// result was observed.
    pub async fn run_turn(
        &mut self,
        input: &str,
        observer: &mut (dyn TurnObserver + Send),
        cancel: &CancellationToken,
    ) -> Result<TurnOutcome> {
        let request = TurnRequest {
            input: input.to_owned(),
            session_id: self.session_id.clone(),
            workdir: self.workdir.clone(),
            label: self.label.clone(),
        };
        let handle = run_agent(&self.config, request, cancel.clone())?;
        self.consume_events(handle, observer).await
    }

    async fn consume_events(
        &mut self,
        mut handle: TurnHandle,
        observer: &mut (dyn TurnObserver + Send),
    ) -> Result<TurnOutcome> {
        let mut questions: Vec<Question> = Vec::new();
        let mut result: Option<String> = None;

        while let Some(event) = handle.next_event().await {
            if self.session_id.is_none() {
                if let Some(id) = event.session_id() {
                    debug!(session_id = id, "session established");
                    self.session_id = Some(id.to_owned());
                }
            }

            for tool in event.tool_invocations() {
                observer.on_tool_use(tool.name, &tool.summary());
            }

            if let Some(text) = event.text_content() {
                observer.on_text(&text);
                questions.extend(detect_questions(&text));
            }

            if event.is_result() {
                if event.is_error() {
                    let message = event.result_text().unwrap_or("unknown agent error");
                    return Err(AppError::Agent(message.to_owned()));
                }
                result = event.result_text().map(ToOwned::to_owned);
            }
        }

        match handle.finish().await {
            Ok(()) => {}
            Err(err @ AppError::Process { .. }) if result.is_some() && questions.is_empty() => {
                // The result record already closed the protocol exchange;
                // a later non-zero exit is an anomaly, not a failure.
                warn!(error = %err, "agent exited non-zero after yielding a result");
            }
            Err(err) => return Err(err),
        }

        if !questions.is_empty() {
            info!(count = questions.len(), "agent paused on questions");
            return Ok(TurnOutcome::NeedsAnswers(questions));
        }
        match result {
            Some(text) => Ok(TurnOutcome::Completed(text)),
            None => Err(AppError::Agent(
                "agent completed without producing a result".into(),
            )),
        }
    }
}

/// Join per-question answers into the next turn's input.
#[must_use]
pub fn join_answers(answers: &[String]) -> String {
    answers.join(ANSWER_SEPARATOR)
}

/// Drive a conversation to a terminal state through a blocking front end.
///
/// Alternates agent turns and answer collection until the agent
/// completes or fails. The final result text is returned on success so
/// callers can persist it.
///
/// # Errors
///
/// Returns the fatal condition after routing it to `frontend.on_error`.
pub async fn drive<F: FrontEnd + Send>(
    conversation: &mut Conversation,
    frontend: &mut F,
    initial_prompt: &str,
    cancel: &CancellationToken,
) -> Result<String> {
    let mut input = initial_prompt.to_owned();
    loop {
        match conversation.run_turn(&input, frontend, cancel).await {
            Ok(TurnOutcome::Completed(result)) => {
                frontend.on_complete(&result);
                return Ok(result);
            }
            Ok(TurnOutcome::NeedsAnswers(questions)) => {
                let answers = frontend.on_questions(&questions);
                input = join_answers(&answers);
            }
            Err(err) => {
                frontend.on_error(&err.to_string());
                return Err(err);
            }
        }
    }
}
