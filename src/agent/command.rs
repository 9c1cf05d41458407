//! Agent command-line construction.

use crate::config::AgentConfig;

/// Build the argument vector for one agent invocation.
///
/// Argument order is stable: the prompt flag, the configured default
/// arguments, the tool allow-list (when non-empty), the
/// permission-bypass flag (when enabled), and the resume flag (when a
/// session id is supplied).
#[must_use]
pub fn build_agent_args(
    prompt: &str,
    agent: &AgentConfig,
    session_id: Option<&str>,
) -> Vec<String> {
    let mut args = vec!["-p".to_owned(), prompt.to_owned()];
    args.extend(agent.args.iter().cloned());

    if !agent.allowed_tools.is_empty() {
        args.push("--allowedTools".to_owned());
        args.push(agent.allowed_tools.join(","));
    }

    if agent.dangerously_skip_permissions {
        args.push("--dangerously-skip-permissions".to_owned());
    }

    if let Some(session_id) = session_id {
        args.push("--resume".to_owned());
        args.push(session_id.to_owned());
    }

    args
}
