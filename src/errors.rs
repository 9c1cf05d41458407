//! Error types shared across the application.

use std::fmt::{Display, Formatter};

/// Shared application result type.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error enumeration covering all domain failure modes.
#[derive(Debug)]
pub enum AppError {
    /// Configuration parsing or validation failure.
    Config(String),
    /// Agent process spawn failure or non-zero exit.
    Process {
        /// Exit code, if the process exited rather than being signalled.
        code: Option<i32>,
        /// Captured standard-error output at the time of exit.
        stderr: String,
    },
    /// Fatal condition reported by the agent itself: an error result
    /// record, or a turn that ended with neither result nor questions.
    Agent(String),
    /// Stream framing failure (oversize line).
    Protocol(String),
    /// Prompt assembly or plan output failure.
    Plan(String),
    /// File-system or I/O operation failure.
    Io(String),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Process { code, stderr } => match code {
                Some(code) => write!(f, "agent process exited with code {code}: {stderr}"),
                None => write!(f, "agent process terminated by signal: {stderr}"),
            },
            Self::Agent(msg) => write!(f, "agent: {msg}"),
            Self::Protocol(msg) => write!(f, "protocol: {msg}"),
            Self::Plan(msg) => write!(f, "plan: {msg}"),
            Self::Io(msg) => write!(f, "io: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("invalid config: {err}"))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
