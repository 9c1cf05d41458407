//! Plan TUI application state and event loop.
//!
//! The conversation runs on a background worker, one turn at a time;
//! every observable effect of a turn arrives here as a [`WorkerMessage`]
//! and all UI state mutation happens on this task. When the agent pauses
//! on questions the worker ends, the panel collects one answer per
//! question, and a fresh worker is started with the joined answers.

use std::collections::VecDeque;
use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::backend::Backend;
use ratatui::Terminal;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::agent::{questions, Question};
use crate::config::GlobalConfig;
use crate::conversation::{join_answers, Conversation, TurnObserver, TurnOutcome};
use crate::plan::PlanContext;
use crate::prompt::write_plan_output;
use crate::tui::events::{Event, EventHandler};
use crate::tui::theme::{default_palette_index, Palette, PALETTES};
use crate::Result;

/// Messages posted from the turn worker to the UI loop.
#[derive(Debug)]
pub enum WorkerMessage {
    /// Assistant text streamed mid-turn.
    Text(String),
    /// Tool invocation streamed mid-turn.
    ToolUse {
        /// Tool name.
        name: String,
        /// Short input description.
        summary: String,
    },
    /// The turn settled; the conversation comes back for the next turn.
    TurnEnded {
        /// Conversation state carried into the next turn.
        conversation: Conversation,
        /// How the turn ended.
        outcome: Result<TurnOutcome>,
    },
}

/// Either stream the UI loop waits on.
enum Input {
    Term(Option<Event>),
    Worker(Option<WorkerMessage>),
}

/// Forwards turn callbacks into the UI message queue.
struct ChannelObserver {
    tx: mpsc::UnboundedSender<WorkerMessage>,
}

impl TurnObserver for ChannelObserver {
    fn on_text(&mut self, text: &str) {
        let _ = self.tx.send(WorkerMessage::Text(text.to_owned()));
    }

    fn on_tool_use(&mut self, name: &str, summary: &str) {
        let _ = self.tx.send(WorkerMessage::ToolUse {
            name: name.to_owned(),
            summary: summary.to_owned(),
        });
    }
}

/// Styling role of one output block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Assistant text.
    Output,
    /// Operator answer echo.
    Answer,
    /// Completion notice.
    Success,
    /// Error notice.
    Error,
}

/// One block in the scrollback, rendered with a gutter bullet.
#[derive(Debug, Clone)]
pub struct OutputLine {
    /// Styling role.
    pub kind: LineKind,
    /// Block text; may span multiple lines.
    pub text: String,
}

/// Full-screen TUI state for one plan conversation.
pub struct PlanApp {
    /// Specification file name shown in the status bar.
    pub spec_name: String,
    /// Directory the final plan is written into.
    pub plan_dir: PathBuf,
    /// Scrollback blocks, oldest first.
    pub lines: Vec<OutputLine>,
    /// Latest tool invocation, cleared by the next text block.
    pub tool_line: Option<(String, String)>,
    /// Questions not yet answered this round, head shown first.
    pub pending_questions: VecDeque<Question>,
    /// Free-text answer buffer for the question currently shown.
    pub answer_input: String,
    /// Status bar text.
    pub status: String,
    /// Index into [`PALETTES`].
    pub theme_index: usize,
    /// Whether the scrollback sticks to the bottom.
    pub follow: bool,
    /// Manual scroll offset used when follow mode is off.
    pub scroll: usize,
    /// Set once the plan has been written.
    pub result_plan_dir: Option<PathBuf>,

    should_quit: bool,
    pending_answers: Vec<String>,
    conversation: Option<Conversation>,
    initial_prompt: String,
    worker_tx: mpsc::UnboundedSender<WorkerMessage>,
    worker_rx: mpsc::UnboundedReceiver<WorkerMessage>,
    cancel: CancellationToken,
}

impl PlanApp {
    /// Build the app around a prepared plan context.
    #[must_use]
    pub fn new(context: PlanContext, config: GlobalConfig, project_path: PathBuf) -> Self {
        let (worker_tx, worker_rx) = mpsc::unbounded_channel();
        let conversation = Conversation::new(config, project_path, "plan");
        Self {
            status: format!("* thinking  {}", context.spec_name),
            spec_name: context.spec_name,
            plan_dir: context.plan_dir,
            lines: Vec::new(),
            tool_line: None,
            pending_questions: VecDeque::new(),
            answer_input: String::new(),
            theme_index: default_palette_index(),
            follow: true,
            scroll: 0,
            result_plan_dir: None,
            should_quit: false,
            pending_answers: Vec::new(),
            conversation: Some(conversation),
            initial_prompt: context.prompt,
            worker_tx,
            worker_rx,
            cancel: CancellationToken::new(),
        }
    }

    /// The active palette.
    #[must_use]
    pub fn palette(&self) -> &'static Palette {
        &PALETTES[self.theme_index % PALETTES.len()]
    }

    /// The question currently awaiting an answer, if any.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.pending_questions.front()
    }

    /// Drive the UI until the operator quits.
    ///
    /// # Errors
    ///
    /// Returns [`crate::AppError::Io`] when the terminal cannot be drawn.
    pub async fn run<B: Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        mut events: EventHandler,
    ) -> Result<()> {
        self.start_turn(self.initial_prompt.clone());

        while !self.should_quit {
            terminal.draw(|frame| super::ui::draw(frame, self))?;

            // Handlers inside select! must not touch `self` while the
            // other branch still borrows the message receiver.
            let input = tokio::select! {
                event = events.next() => Input::Term(event),
                message = self.worker_rx.recv() => Input::Worker(message),
            };

            match input {
                Input::Term(Some(Event::Key(key))) => self.on_key(key),
                Input::Term(Some(Event::Mouse(mouse))) => self.on_mouse(mouse),
                Input::Term(None) => break,
                Input::Worker(Some(message)) => self.on_worker_message(message),
                Input::Term(Some(Event::Tick | Event::Resize(_, _))) | Input::Worker(None) => {}
            }
        }

        self.cancel.cancel();
        Ok(())
    }

    /// Start the next turn on a fresh background worker.
    fn start_turn(&mut self, input: String) {
        let Some(mut conversation) = self.conversation.take() else {
            warn!("turn requested while a worker is still running");
            return;
        };
        self.status = format!("* thinking  {}", self.spec_name);
        let tx = self.worker_tx.clone();
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            let mut observer = ChannelObserver { tx: tx.clone() };
            let outcome = conversation.run_turn(&input, &mut observer, &cancel).await;
            let _ = tx.send(WorkerMessage::TurnEnded {
                conversation,
                outcome,
            });
        });
    }

    fn on_worker_message(&mut self, message: WorkerMessage) {
        match message {
            WorkerMessage::Text(text) => {
                self.tool_line = None;
                let shown = questions::strip_markers(&text);
                if !shown.is_empty() {
                    self.push_line(LineKind::Output, shown);
                }
            }
            WorkerMessage::ToolUse { name, summary } => {
                self.tool_line = Some((name, summary));
            }
            WorkerMessage::TurnEnded {
                conversation,
                outcome,
            } => {
                self.conversation = Some(conversation);
                self.tool_line = None;
                match outcome {
                    Ok(TurnOutcome::Completed(result)) => self.complete(&result),
                    Ok(TurnOutcome::NeedsAnswers(questions)) => {
                        self.pending_questions = questions.into();
                        self.pending_answers.clear();
                        self.answer_input.clear();
                        self.status = "? waiting for answer".into();
                    }
                    Err(err) => {
                        self.push_line(LineKind::Error, err.to_string());
                        self.status = "error  press q to exit".into();
                    }
                }
            }
        }
    }

    fn complete(&mut self, result: &str) {
        match write_plan_output(&self.plan_dir, result) {
            Ok(()) => {
                self.push_line(
                    LineKind::Success,
                    format!("plan written to {}/plan.md", self.plan_dir.display()),
                );
                self.status = "done  press q to exit".into();
                self.result_plan_dir = Some(self.plan_dir.clone());
            }
            Err(err) => {
                self.push_line(LineKind::Error, err.to_string());
                self.status = "error  press q to exit".into();
            }
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        let free_text = self
            .current_question()
            .is_some_and(|question| question.options.is_empty());

        if free_text {
            match key.code {
                KeyCode::Enter => {
                    if !self.answer_input.is_empty() {
                        let answer = std::mem::take(&mut self.answer_input);
                        self.answer_selected(answer);
                    }
                }
                KeyCode::Backspace => {
                    self.answer_input.pop();
                }
                KeyCode::Char(c) => self.answer_input.push(c),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('t') => {
                self.theme_index = (self.theme_index + 1) % PALETTES.len();
                self.status = format!("theme: {}  (t to cycle)", self.palette().name);
            }
            KeyCode::Char('f') => {
                self.follow = true;
            }
            KeyCode::Char(c @ '1'..='9') => {
                let index = usize::from(u8::try_from(c).unwrap_or(b'1') - b'1');
                self.select_option(index);
            }
            _ => {}
        }
    }

    fn on_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::ScrollUp => {
                self.follow = false;
                self.scroll = self.scroll.saturating_sub(1);
            }
            MouseEventKind::ScrollDown => {
                self.scroll = self.scroll.saturating_add(1);
            }
            _ => {}
        }
    }

    fn select_option(&mut self, index: usize) {
        let Some(question) = self.current_question() else {
            return;
        };
        if let Some(option) = question.options.get(index) {
            let answer = option.label.clone();
            self.answer_selected(answer);
        }
    }

    fn answer_selected(&mut self, answer: String) {
        if self.pending_questions.pop_front().is_none() {
            return;
        }
        self.push_line(LineKind::Answer, format!("> {answer}"));
        self.pending_answers.push(answer);

        if self.pending_questions.is_empty() {
            let input = join_answers(&self.pending_answers);
            self.pending_answers.clear();
            self.start_turn(input);
        }
    }

    fn push_line(&mut self, kind: LineKind, text: String) {
        self.lines.push(OutputLine { kind, text });
    }
}
