//! Synchronous console front end.
//!
//! Runs on the calling thread: assistant text and tool activity print
//! as they stream, and questions block on direct terminal input —
//! numeric selection against options, free text otherwise.

use std::io::{self, BufRead, Write};
use std::path::Path;

use crossterm::style::{Color, ResetColor, SetForegroundColor};
use crossterm::ExecutableCommand;
use tokio_util::sync::CancellationToken;

use crate::agent::Question;
use crate::config::GlobalConfig;
use crate::conversation::{drive, Conversation, FrontEnd, TurnObserver};
use crate::plan::{prepare_plan, PlanContext};
use crate::prompt::write_plan_output;
use crate::Result;

/// Console front end state: a reader for answers and a writer for output.
pub struct ConsoleFrontEnd<R, W> {
    input: R,
    output: W,
}

impl ConsoleFrontEnd<io::BufReader<io::Stdin>, io::Stdout> {
    /// Front end bound to the process's own terminal.
    #[must_use]
    pub fn stdio() -> Self {
        Self {
            input: io::BufReader::new(io::stdin()),
            output: io::stdout(),
        }
    }
}

impl<R: BufRead, W: Write> ConsoleFrontEnd<R, W> {
    /// Front end over explicit streams, for tests.
    #[must_use]
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn read_line(&mut self) -> String {
        let _ = self.output.flush();
        let mut line = String::new();
        let _ = self.input.read_line(&mut line);
        line.trim().to_owned()
    }

    fn ask_one(&mut self, question: &Question) -> String {
        let _ = writeln!(self.output);
        let _ = writeln!(self.output, "{}", "=".repeat(60));
        if question.header.is_empty() {
            let _ = writeln!(self.output, "  {}", question.text);
        } else {
            let _ = writeln!(self.output, "  {}: {}", question.header, question.text);
        }
        let _ = writeln!(self.output, "{}", "=".repeat(60));

        if question.options.is_empty() {
            let _ = write!(self.output, "  Your answer: ");
            return self.read_line();
        }

        for (i, option) in question.options.iter().enumerate() {
            match &option.description {
                Some(description) => {
                    let _ = writeln!(self.output, "  {}. {} -- {description}", i + 1, option.label);
                }
                None => {
                    let _ = writeln!(self.output, "  {}. {}", i + 1, option.label);
                }
            }
        }
        let _ = write!(self.output, "\n  Select option (number) or type a custom answer: ");
        let choice = self.read_line();

        // A valid index selects by position; anything else is free text.
        match choice.parse::<usize>() {
            Ok(n) if n >= 1 && n <= question.options.len() => {
                question.options[n - 1].label.clone()
            }
            _ if choice.is_empty() => question
                .options
                .first()
                .map(|option| option.label.clone())
                .unwrap_or_default(),
            _ => choice,
        }
    }
}

impl<R: BufRead, W: Write> TurnObserver for ConsoleFrontEnd<R, W> {
    fn on_text(&mut self, text: &str) {
        let _ = writeln!(self.output, "{text}");
        let _ = self.output.flush();
    }

    fn on_tool_use(&mut self, name: &str, summary: &str) {
        let _ = self.output.execute(SetForegroundColor(Color::DarkGrey));
        let _ = writeln!(self.output, "⚙ {name}  {summary}");
        let _ = self.output.execute(ResetColor);
    }
}

impl<R: BufRead, W: Write> FrontEnd for ConsoleFrontEnd<R, W> {
    fn on_questions(&mut self, questions: &[Question]) -> Vec<String> {
        questions.iter().map(|question| self.ask_one(question)).collect()
    }

    fn on_complete(&mut self, _result: &str) {
        let _ = self.output.execute(SetForegroundColor(Color::Green));
        let _ = writeln!(self.output, "\n✓ plan complete");
        let _ = self.output.execute(ResetColor);
        let _ = self.output.flush();
    }

    fn on_error(&mut self, message: &str) {
        let _ = self.output.execute(SetForegroundColor(Color::Red));
        let _ = writeln!(self.output, "\n✗ {message}");
        let _ = self.output.execute(ResetColor);
        let _ = self.output.flush();
    }
}

/// Run the plan workflow on the console front end.
///
/// # Errors
///
/// Returns the first fatal condition from preparation, the
/// conversation, or plan output writing.
pub async fn run_plan_console(
    spec_path: &Path,
    project_path: &Path,
    config: GlobalConfig,
) -> Result<std::path::PathBuf> {
    let PlanContext {
        prompt,
        plan_dir,
        spec_name,
    } = prepare_plan(spec_path, project_path, &config)?;

    println!("Starting plan generation for: {spec_name}");
    println!("Output directory: {}\n", plan_dir.display());

    let mut conversation = Conversation::new(config, project_path.to_path_buf(), "plan");
    let mut frontend = ConsoleFrontEnd::stdio();
    let cancel = CancellationToken::new();

    let result = drive(&mut conversation, &mut frontend, &prompt, &cancel).await?;
    write_plan_output(&plan_dir, &result)?;
    println!("Plan written to: {}/plan.md", plan_dir.display());
    Ok(plan_dir)
}
