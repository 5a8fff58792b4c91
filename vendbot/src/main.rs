//! `vendbot` binary: check, show or prepare the deployment configuration.

use std::process::ExitCode;

use clap::Parser;
use vendbot::{execute, exit_code, Cli};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{:#}", err);
            ExitCode::from(exit_code(&err))
        }
    }
}
