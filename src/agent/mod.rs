//! Agent process supervision and streaming event protocol.
//!
//! The agent is an external CLI (e.g. `claude`) invoked once per
//! conversation turn. It emits newline-delimited JSON records on stdout;
//! this module spawns it, drains both output streams concurrently,
//! decodes records into [`AgentEvent`]s, and surfaces the embedded
//! question sub-protocol.

pub mod codec;
pub mod command;
pub mod event;
pub mod questions;
pub mod runner;

pub use command::build_agent_args;
pub use event::{AgentEvent, EventKind, ToolInvocation};
pub use questions::{detect_questions, Question, QuestionOption};
pub use runner::{run_agent, TurnHandle, TurnRequest};
