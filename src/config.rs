//! Global configuration parsing, validation, and environment substitution.

use std::env;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::{AppError, Result};

/// Agent subprocess configuration.
///
/// Describes how the coding-agent CLI is invoked: the executable, the
/// fixed arguments requesting structured streaming output, the tool
/// allow-list, and the permission-bypass switch.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct AgentConfig {
    /// The coding-agent CLI command to execute.
    #[serde(default = "default_agent_command")]
    pub command: String,
    /// Default arguments passed to the agent on every invocation.
    #[serde(default = "default_agent_args")]
    pub args: Vec<String>,
    /// Tools the agent is allowed to use; empty disables the flag.
    #[serde(default = "default_allowed_tools")]
    pub allowed_tools: Vec<String>,
    /// Skip the agent's permission prompts entirely.
    #[serde(default)]
    pub dangerously_skip_permissions: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            command: default_agent_command(),
            args: default_agent_args(),
            allowed_tools: default_allowed_tools(),
            dangerously_skip_permissions: false,
        }
    }
}

fn default_agent_command() -> String {
    "claude".into()
}

fn default_agent_args() -> Vec<String> {
    vec!["--output-format".into(), "stream-json".into(), "--verbose".into()]
}

fn default_allowed_tools() -> Vec<String> {
    ["Bash", "Read", "Write", "Edit", "Glob", "Grep", "WebFetch", "WebSearch"]
        .into_iter()
        .map(Into::into)
        .collect()
}

/// Raw-stream capture configuration.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct DebugConfig {
    /// Whether raw agent output is captured to a log file per invocation.
    #[serde(default)]
    pub enabled: bool,
    /// Directory for raw-stream log files, relative to the project root.
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_dir: default_log_dir(),
        }
    }
}

fn default_log_dir() -> String {
    ".planwright/logs".into()
}

/// Global configuration parsed from `.planwright/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct GlobalConfig {
    /// Agent subprocess settings.
    #[serde(default)]
    pub agent: AgentConfig,
    /// Raw-stream capture settings.
    #[serde(default)]
    pub debug: DebugConfig,
}

impl GlobalConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Load configuration from the given path, falling back to defaults
    /// when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file exists but cannot be parsed.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load_from_path(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from a TOML string, expanding `${VAR}`
    /// environment references in string values.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let mut value: toml::Value = toml::from_str(raw)?;
        expand_env_vars(&mut value);
        let config: Self = value.try_into().map_err(AppError::from)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.agent.command.trim().is_empty() {
            return Err(AppError::Config("agent.command must not be empty".into()));
        }
        if self.debug.log_dir.trim().is_empty() {
            return Err(AppError::Config("debug.log_dir must not be empty".into()));
        }
        Ok(())
    }
}

/// Recursively replace string values of the form `${VAR}` with the value
/// of the named environment variable. Unset variables are left as-written.
fn expand_env_vars(value: &mut toml::Value) {
    match value {
        toml::Value::String(s) => {
            if let Some(name) = s.strip_prefix("${").and_then(|rest| rest.strip_suffix('}')) {
                if let Ok(resolved) = env::var(name) {
                    *s = resolved;
                }
            }
        }
        toml::Value::Array(items) => {
            for item in items {
                expand_env_vars(item);
            }
        }
        toml::Value::Table(table) => {
            for (_, item) in table.iter_mut() {
                expand_env_vars(item);
            }
        }
        _ => {}
    }
}
