#![forbid(unsafe_code)]

//! `planwright` — spec-to-plan CLI binary.
//!
//! Bootstraps configuration and tracing, then runs the requested
//! workflow: `init` scaffolds a project, `plan` drives the agent
//! conversation in the TUI (or the console with `--no-tui`).

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use planwright::config::GlobalConfig;
use planwright::{console, project, tui, AppError, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "planwright", about = "Spec-to-plan coding-agent driver", version, long_about = None)]
struct Cli {
    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Project root; defaults to the current directory.
    #[arg(long)]
    workspace: Option<PathBuf>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Scaffold the .planwright/ project layout.
    Init,
    /// Generate an implementation plan from a specification file.
    Plan {
        /// Path to the specification document.
        spec: PathBuf,

        /// Override the configuration file path.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Use the blocking console front end instead of the TUI.
        #[arg(long)]
        no_tui: bool,
    },
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    let project_path = match args.workspace {
        Some(workspace) => workspace
            .canonicalize()
            .map_err(|err| AppError::Config(format!("invalid workspace: {err}")))?,
        None => std::env::current_dir()
            .map_err(|err| AppError::Config(format!("cannot resolve current dir: {err}")))?,
    };

    match args.command {
        CliCommand::Init => {
            let root = project::init_project(&project_path)?;
            println!("Initialized planwright project at {}", root.display());
            Ok(())
        }
        CliCommand::Plan {
            spec,
            config,
            no_tui,
        } => {
            let config_path =
                config.unwrap_or_else(|| project::config_path(&project_path));
            let config = GlobalConfig::load_or_default(&config_path)?;
            info!(config = %config_path.display(), spec = %spec.display(), "starting plan workflow");

            if no_tui {
                console::run_plan_console(&spec, &project_path, config).await?;
            } else {
                match tui::run_plan_tui(&spec, &project_path, config).await? {
                    Some(plan_dir) => {
                        println!("Plan written to: {}/plan.md", plan_dir.display());
                    }
                    None => println!("Plan generation did not complete."),
                }
            }
            Ok(())
        }
    }
}

fn init_tracing(format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt().with_env_filter(filter).with_writer(std::io::stderr);
    let result = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    result.map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))
}
