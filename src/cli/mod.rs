mod report;

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{ConfigError, DefaultSpecLoader, SpecFile, SpecLoader};
use crate::spec::{ErrorHandler, LogErrorHandler};

pub use report::{OptionReport, Report};

#[derive(Parser)]
#[command(name = "argpat", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
#[cfg_attr(test, derive(Debug, PartialEq))]
pub enum Commands {
    /// Match arguments against the declared patterns and show the result
    Check(CheckArgs),
    /// Compile the declarations and report problems
    Validate(SpecArgs),
    /// Print the compiled automaton in Graphviz dot format
    Graph(SpecArgs),
}

#[derive(clap::Args)]
#[cfg_attr(test, derive(Debug, PartialEq))]
pub struct SpecArgs {
    /// Declaration file (default: argpat.yml or argpat.yaml in the current directory)
    #[arg(long)]
    pub spec: Option<PathBuf>,
}

#[derive(clap::Args)]
#[cfg_attr(test, derive(Debug, PartialEq))]
pub struct CheckArgs {
    #[command(flatten)]
    pub spec: SpecArgs,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    /// Arguments to check
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

fn load(args: &SpecArgs) -> Result<SpecFile, ConfigError> {
    let loader = match &args.spec {
        Some(path) => DefaultSpecLoader::with_path(path.clone()),
        None => DefaultSpecLoader::new(),
    };
    let cwd = std::env::current_dir()?;
    loader.load(&cwd)
}

/// Run one subcommand, writing results to `out` and diagnostics to `err`.
/// Returns the process exit status.
pub fn run(command: Commands, out: &mut dyn Write, err: &mut dyn Write) -> anyhow::Result<i32> {
    match command {
        Commands::Check(args) => {
            let file = load(&args.spec)?;
            let spec = file.compile()?;
            let report = Report::new(&spec, spec.parse(args.args)?);
            let status = report.exit_status(file.config.failure_exit_status);

            if args.json {
                writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
            } else if let Report::Failed { errors } = &report {
                let handler = LogErrorHandler::new(&mut *err, file.config.program_name())
                    .with_max_entries(file.config.max_logged_errors);
                let mut status = status;
                handler.handle(errors, &mut status);
                return Ok(status);
            } else {
                write!(out, "{}", report.render_text())?;
            }
            Ok(status)
        }
        Commands::Validate(args) => {
            let file = load(&args)?;
            let spec = file.compile()?;
            let compiled = spec.build()?;
            writeln!(
                out,
                "ok: {} options, {} patterns, {} states",
                compiled.options().len(),
                spec.patterns().len(),
                compiled.nfa().len()
            )?;
            Ok(crate::spec::EXIT_SUCCESS)
        }
        Commands::Graph(args) => {
            let spec = load(&args)?.compile()?;
            write!(out, "{}", spec.build()?.to_dot())?;
            Ok(crate::spec::EXIT_SUCCESS)
        }
    }
}
