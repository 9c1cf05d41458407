//! Plan workflow: spec in, plan out.
//!
//! Shared preparation for both front ends: read the specification,
//! assemble the combined prompt from the embedded planner instructions
//! and the project knowledge corpus, and resolve the plan directory.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::GlobalConfig;
use crate::prompt::{build_prompt, load_knowledge, PLANNER_INSTRUCTIONS};
use crate::{project, AppError, Result};

/// Everything a front end needs to run the plan conversation.
#[derive(Debug, Clone)]
pub struct PlanContext {
    /// Combined prompt for the conversation's first turn.
    pub prompt: String,
    /// Directory `plan.md` (and `prompt.md` in debug mode) land in.
    pub plan_dir: PathBuf,
    /// Specification file name, for status display.
    pub spec_name: String,
}

/// Prepare the plan conversation for `spec_path`.
///
/// When raw-stream capture is enabled the combined prompt is also
/// persisted to the plan directory as `prompt.md`.
///
/// # Errors
///
/// Returns [`AppError::Plan`] when the spec or a knowledge file cannot
/// be read, or when the debug prompt copy cannot be written.
pub fn prepare_plan(
    spec_path: &Path,
    project_path: &Path,
    config: &GlobalConfig,
) -> Result<PlanContext> {
    let spec_content = fs::read_to_string(spec_path).map_err(|err| {
        AppError::Plan(format!("failed to read spec {}: {err}", spec_path.display()))
    })?;
    let knowledge = load_knowledge(project_path)?;
    let prompt = build_prompt(PLANNER_INSTRUCTIONS, &knowledge, &spec_content);
    let plan_dir = project::plan_dir(project_path, spec_path);

    if config.debug.enabled {
        fs::create_dir_all(&plan_dir).map_err(|err| {
            AppError::Plan(format!("failed to create plan dir {}: {err}", plan_dir.display()))
        })?;
        let prompt_path = plan_dir.join("prompt.md");
        fs::write(&prompt_path, &prompt).map_err(|err| {
            AppError::Plan(format!("failed to write {}: {err}", prompt_path.display()))
        })?;
    }

    let spec_name = spec_path
        .file_name()
        .map_or_else(|| spec_path.display().to_string(), |name| name.to_string_lossy().into_owned());

    info!(
        spec = spec_name,
        plan_dir = %plan_dir.display(),
        knowledge_files = knowledge.len(),
        "plan conversation prepared"
    );

    Ok(PlanContext {
        prompt,
        plan_dir,
        spec_name,
    })
}
