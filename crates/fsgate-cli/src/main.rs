//! fsgate CLI - Root-confined file management from the command line.

mod cli;
mod commands;
mod config;
mod error;
mod output;
mod progress;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use cli::Commands;
use output::OutputFormatter;
use progress::TransferProgress;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let formatter = output::create_formatter(&cli);

    match run(&cli, &*formatter) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            formatter.format_error(cli.command.name(), &err);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr; `RUST_LOG` overrides the level chosen by `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli, formatter: &dyn OutputFormatter) -> Result<()> {
    if let Commands::Completion(args) = &cli.command {
        commands::completion::execute(args.shell);
        return Ok(());
    }

    let manager = commands::build_manager(cli)?;
    let show_progress = TransferProgress::should_show(cli.quiet, cli.json);

    match &cli.command {
        Commands::Resolve(args) => commands::resolve::execute(args, &manager, formatter),
        Commands::Ls(args) => commands::list::execute(args, &manager, formatter),
        Commands::Mkdir(args) => commands::manage::mkdir(args, &manager, formatter),
        Commands::Rename(args) => commands::manage::rename(args, &manager, formatter),
        Commands::Rm(args) => commands::manage::remove(args, &manager, formatter),
        Commands::Cp(args) => commands::manage::copy(args, &manager, formatter),
        Commands::Mv(args) => commands::manage::r#move(args, &manager, formatter),
        Commands::Get(args) => {
            commands::get::execute(args, &manager, formatter, show_progress)
        }
        Commands::Put(args) => commands::put::execute(args, &manager, formatter),
        Commands::Pack(args) => {
            commands::pack::execute(args, &manager, formatter, show_progress)
        }
        Commands::Unpack(args) => commands::unpack::execute(args, &manager, formatter),
        Commands::Completion(_) => Ok(()),
    }
}
