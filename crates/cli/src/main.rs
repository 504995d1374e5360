// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `warden`: the agent's CLI surface (§6) — `configure`, `start`, `stop`,
//! `uninstall`, and `debug`. Every command maps its outcome onto the
//! exit-code taxonomy in [`exit_error`] rather than calling
//! `std::process::exit` itself, so `main` is the only place the process
//! actually terminates.

mod commands;
mod exit_error;
mod service;

use clap::{Parser, Subcommand};

use exit_error::{ExitError, EXIT_INVALID_ARGUMENTS, EXIT_SUCCESS};

#[derive(Parser)]
#[command(name = "warden", version, about = "Warden host management agent")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Interactively establish or renew this host's runtime identity.
    Configure,
    /// Start the warden service.
    Start,
    /// Stop the warden service.
    Stop,
    /// Stop and disable the warden service, optionally erasing persisted state.
    Uninstall {
        /// Also remove the agent's state directory (queues, identity, logs).
        #[arg(long)]
        remove_data: bool,
    },
    /// Run the orchestrator in the foreground with console logging.
    Debug,
}

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(EXIT_INVALID_ARGUMENTS);
        }
    };

    let result = match cli.command {
        Command::Configure => commands::configure::configure().await,
        Command::Start => commands::service::start(),
        Command::Stop => commands::service::stop(),
        Command::Uninstall { remove_data } => commands::service::uninstall(remove_data),
        Command::Debug => commands::debug::debug().await,
    };

    std::process::exit(exit_code(result));
}

fn exit_code(result: Result<(), ExitError>) -> i32 {
    match result {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            e.code
        }
    }
}
