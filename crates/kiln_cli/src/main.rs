//! Kiln CLI: generates build descriptions from `kiln.toml` workspaces.
//!
//! Provides `kiln generate` for incremental generation, `kiln show` for
//! inspecting a project's resolved options, and `kiln status` for a dirty
//! report that writes nothing.

#![warn(missing_docs)]

mod generate;
mod show;
mod status;
mod workspace;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Kiln: a declarative build-description generator.
#[derive(Parser, Debug)]
#[command(name = "kiln", version, about = "Kiln build-description generator")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a `kiln.toml` file or the directory containing one.
    #[arg(short, long, global = true)]
    pub file: Option<PathBuf>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate artifacts for dirty projects.
    Generate(GenerateArgs),
    /// Print a project's resolved options as JSON.
    Show(ShowArgs),
    /// Report which projects would be regenerated.
    ///
    /// Projects named in the definition's `add` list (every project when the
    /// list is empty) are always regenerated, so they always report as dirty.
    Status,
}

/// Arguments for the `kiln generate` subcommand.
#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Regenerate every project and the aggregate.
    #[arg(long)]
    pub force: bool,

    /// Report what would be generated without writing anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Drop cache entries for projects no longer defined.
    #[arg(long)]
    pub prune: bool,

    /// Projects to regenerate regardless of changes.
    #[arg(short, long = "project")]
    pub projects: Vec<String>,
}

/// Arguments for the `kiln show` subcommand.
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Project name.
    pub project: String,

    /// Configurations to show (default: all).
    #[arg(short, long = "config")]
    pub configs: Vec<String>,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional path to a definition file.
    pub file: Option<PathBuf>,
}

fn init_logging(global: &GlobalArgs) {
    let default = if global.quiet {
        "error"
    } else if global.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() {
    let cli = Cli::parse();

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        file: cli.file,
    };
    init_logging(&global);

    let result = match cli.command {
        Command::Generate(ref args) => generate::run(args, &global),
        Command::Show(ref args) => show::run(args, &global),
        Command::Status => status::run(&global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
