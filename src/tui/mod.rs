//! Asynchronous TUI front end.
//!
//! The conversation loop runs on a background worker; every callback is
//! posted as a message to the single UI task, which owns all observable
//! state. Questions render one at a time in a panel, and the worker is
//! restarted with the joined answers once the batch is complete.

pub mod app;
pub mod events;
pub mod theme;
pub mod ui;

use std::io;
use std::path::{Path, PathBuf};

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::config::GlobalConfig;
use crate::plan::prepare_plan;
use crate::Result;

pub use app::PlanApp;
pub use events::{Event, EventHandler};

/// Initialize the terminal for full-screen mode.
///
/// # Errors
///
/// Returns an error when stdout is not a terminal or raw mode cannot be
/// entered.
pub fn init_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    Terminal::new(CrosstermBackend::new(stdout))
}

/// Restore the terminal to normal mode.
///
/// # Errors
///
/// Returns an error when the terminal state cannot be restored.
pub fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()
}

/// Run the plan workflow in the TUI front end.
///
/// Returns the plan directory when a plan was written, `None` when the
/// operator quit before completion.
///
/// # Errors
///
/// Returns the first fatal condition from preparation or the terminal;
/// conversation failures are rendered in the UI rather than returned.
pub async fn run_plan_tui(
    spec_path: &Path,
    project_path: &Path,
    config: GlobalConfig,
) -> Result<Option<PathBuf>> {
    let context = prepare_plan(spec_path, project_path, &config)?;
    let mut app = PlanApp::new(context, config, project_path.to_path_buf());

    let mut terminal = init_terminal()?;
    let events = EventHandler::new(250);
    let run_result = app.run(&mut terminal, events).await;
    restore_terminal(&mut terminal)?;
    run_result?;

    Ok(app.result_plan_dir.clone())
}
