//! Prompt assembly and plan output.
//!
//! The combined prompt is plain string concatenation: agent
//! instructions, then the knowledge corpus, then the specification
//! document, in that order.

use std::fs;
use std::path::{Path, PathBuf};

use crate::{AppError, Result};

/// Default planner instructions embedded in the binary.
pub const PLANNER_INSTRUCTIONS: &str = include_str!("../assets/planner.md");

/// Build the combined prompt for the agent process.
///
/// `knowledge` entries are `(relative path, contents)` pairs rendered in
/// the given order. Instructions appear before knowledge, knowledge
/// before the specification.
#[must_use]
pub fn build_prompt(
    agent_instructions: &str,
    knowledge: &[(String, String)],
    spec_content: &str,
) -> String {
    let mut parts = vec![
        agent_instructions.to_owned(),
        "\n\n---\n\n# Knowledge Base\n".to_owned(),
    ];
    for (filename, content) in knowledge {
        parts.push(format!("\n## {filename}\n{content}\n"));
    }
    parts.push(format!(
        "\n---\n\n# Specification to Plan\n\n{spec_content}"
    ));
    parts.join("\n")
}

/// Load all knowledge files from `.planwright/knowledge/`.
///
/// Returns `(relative path, contents)` pairs for every `.md` file under
/// the knowledge directory, sorted by relative path. An absent knowledge
/// directory yields an empty corpus.
///
/// # Errors
///
/// Returns [`AppError::Plan`] when a knowledge file cannot be read.
pub fn load_knowledge(project_path: &Path) -> Result<Vec<(String, String)>> {
    let knowledge_dir = project_path.join(crate::project::PLANWRIGHT_DIR).join("knowledge");
    if !knowledge_dir.exists() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    collect_markdown(&knowledge_dir, &mut files)?;
    files.sort();

    let mut corpus = Vec::with_capacity(files.len());
    for path in files {
        let content = fs::read_to_string(&path).map_err(|err| {
            AppError::Plan(format!("failed to read knowledge file {}: {err}", path.display()))
        })?;
        let relative = path
            .strip_prefix(&knowledge_dir)
            .unwrap_or(&path)
            .to_string_lossy()
            .into_owned();
        corpus.push((relative, content));
    }
    Ok(corpus)
}

fn collect_markdown(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    let entries = fs::read_dir(dir).map_err(|err| {
        AppError::Plan(format!("failed to list knowledge dir {}: {err}", dir.display()))
    })?;
    for entry in entries {
        let entry = entry.map_err(|err| AppError::Plan(format!("failed to walk knowledge dir: {err}")))?;
        let path = entry.path();
        if path.is_dir() {
            collect_markdown(&path, out)?;
        } else if path.extension().is_some_and(|ext| ext == "md") {
            out.push(path);
        }
    }
    Ok(())
}

/// Write the agent's final result into the plan directory as `plan.md`.
///
/// # Errors
///
/// Returns [`AppError::Plan`] when the directory or file cannot be
/// written.
pub fn write_plan_output(plan_dir: &Path, result_text: &str) -> Result<()> {
    fs::create_dir_all(plan_dir).map_err(|err| {
        AppError::Plan(format!("failed to create plan dir {}: {err}", plan_dir.display()))
    })?;
    let path = plan_dir.join("plan.md");
    fs::write(&path, result_text)
        .map_err(|err| AppError::Plan(format!("failed to write {}: {err}", path.display())))
}
