//! Project scaffolding.
//!
//! A planwright project keeps its state under `.planwright/` in the
//! project root: the configuration file, the knowledge corpus fed into
//! every prompt, generated plans, and raw-stream logs.

use std::fs;
use std::path::{Path, PathBuf};

use crate::{AppError, Result};

/// Directory under the project root holding planwright state.
pub const PLANWRIGHT_DIR: &str = ".planwright";

/// Default configuration written by `planwright init`.
const DEFAULT_CONFIG: &str = r#"# planwright configuration

[agent]
# The coding-agent CLI to drive.
command = "claude"
# Arguments requesting structured streaming output.
args = ["--output-format", "stream-json", "--verbose"]
# Tools the agent may use; empty disables the allow-list flag.
allowed_tools = ["Bash", "Read", "Write", "Edit", "Glob", "Grep", "WebFetch", "WebSearch"]
# Skip the agent's permission prompts. Use with caution.
dangerously_skip_permissions = false

[debug]
# Capture every raw stream line to a log file per agent invocation.
enabled = false
log_dir = ".planwright/logs"
"#;

/// Path to the project's configuration file.
#[must_use]
pub fn config_path(project_path: &Path) -> PathBuf {
    project_path.join(PLANWRIGHT_DIR).join("config.toml")
}

/// Directory a spec's plan artifacts are written into.
#[must_use]
pub fn plan_dir(project_path: &Path, spec_path: &Path) -> PathBuf {
    let stem = spec_path
        .file_stem()
        .map_or_else(|| "plan".into(), |stem| stem.to_string_lossy().into_owned());
    project_path.join(PLANWRIGHT_DIR).join("plans").join(stem)
}

/// Initialize the `.planwright/` layout in `project_path`.
///
/// Creates the state directory, a commented default `config.toml`, and
/// empty `knowledge/` and `plans/` directories. An existing config file
/// is left untouched.
///
/// # Errors
///
/// Returns [`AppError::Io`] when a directory or the config file cannot
/// be created.
pub fn init_project(project_path: &Path) -> Result<PathBuf> {
    let root = project_path.join(PLANWRIGHT_DIR);
    for dir in [root.clone(), root.join("knowledge"), root.join("plans")] {
        fs::create_dir_all(&dir)
            .map_err(|err| AppError::Io(format!("failed to create {}: {err}", dir.display())))?;
    }

    let config = config_path(project_path);
    if !config.exists() {
        fs::write(&config, DEFAULT_CONFIG)
            .map_err(|err| AppError::Io(format!("failed to write {}: {err}", config.display())))?;
    }
    Ok(root)
}
