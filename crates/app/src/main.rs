//! Backoffice - gateway operator tool
//!
//! Output goes to stdout as JSON; diagnostics go through `tracing`.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::process::ExitCode;

use backoffice_app::{execute, AppContext, Cli};
use backoffice_infra::init_tracing;
use clap::Parser;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.log_format.into());

    let context = match AppContext::new().await {
        Ok(context) => context,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match execute(&context, cli.command).await {
        Ok(output) => {
            match serde_json::to_string_pretty(&output) {
                Ok(rendered) => println!("{rendered}"),
                Err(e) => {
                    eprintln!("error: could not render output: {e}");
                    return ExitCode::FAILURE;
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
