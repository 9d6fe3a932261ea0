mod demo;
mod repl;

use std::{fs, path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rummage::{Engine, Evaluator};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// evaluate a statement and exit, may be repeated
    #[arg(short = 'c', long = "command", value_name = "STATEMENT")]
    commands: Vec<String>,

    /// skip the banner when starting the repl
    #[arg(short, long)]
    quiet: bool,

    /// where to keep repl history
    #[arg(long, value_name = "FILE")]
    history: Option<PathBuf>,

    /// log filter, e.g. "rummage=debug" (defaults to RUST_LOG)
    #[arg(long, value_name = "FILTER")]
    log: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// run a file, one statement per line
    Run {
        #[arg(name = "FILE")]
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match &cli.log {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::from_default_env(),
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {:#}", error);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let mut evaluator = Evaluator::new();
    demo::install(&mut evaluator);

    let script = match &cli.command {
        Some(Commands::Run { file }) => Some(
            fs::read_to_string(file)
                .with_context(|| format!("failed to read {}", file.display()))?,
        ),
        None => None,
    };

    if script.is_some() || !cli.commands.is_empty() {
        if let Err(error) = run_batch(&mut evaluator, &cli.commands, script.as_deref(), |output| {
            println!("{}", output)
        }) {
            eprintln!("error: {:#}", error);
            return Ok(ExitCode::FAILURE);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let history = cli.history.or_else(repl::default_history_path);
    repl::start(&mut evaluator, history, cli.quiet)?;
    Ok(ExitCode::SUCCESS)
}

/// Runs the `-c` statements in order, then the script, against one engine so the
/// script sees variables the statements bound.
fn run_batch(
    engine: &mut dyn Engine,
    commands: &[String],
    script: Option<&str>,
    mut emit: impl FnMut(&str),
) -> Result<()> {
    for command in commands {
        emit(&engine.run(command)?);
    }
    if let Some(source) = script {
        for output in engine.run_script(source)? {
            emit(&output);
        }
    }
    Ok(())
}
