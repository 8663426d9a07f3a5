//! Operator commands
//!
//! Every command renders its result as JSON for the caller to print.

pub mod queue;
pub mod read;
pub mod status;
pub mod write;

use std::time::Instant;

use serde_json::Value;

use crate::cli::Command;
use crate::context::AppContext;
use crate::utils::logging::log_command_execution;

pub use queue::{discard, pending, replay};
pub use read::fetch;
pub use status::status;
pub use write::submit;

/// Dispatch one parsed command
///
/// # Errors
/// Whatever the command returns: client rejections, configuration and
/// persistence failures, output file errors.
pub async fn execute(context: &AppContext, command: Command) -> anyhow::Result<Value> {
    let started = Instant::now();
    let (name, family) = match &command {
        Command::Fetch(args) => ("fetch", Some(args.family.to_string())),
        Command::Submit(args) => ("submit", Some(args.family.to_string())),
        Command::Pending { family } => ("pending", family.as_ref().map(ToString::to_string)),
        Command::Replay { family } => ("replay", family.as_ref().map(ToString::to_string)),
        Command::Discard { .. } => ("discard", None),
        Command::Status => ("status", None),
    };

    let result = match command {
        Command::Fetch(args) => fetch(context, &args.family, args.operation(), args.output.as_deref()).await,
        Command::Submit(args) => match args.operation() {
            Ok(operation) => submit(context, &args.family, operation).await,
            Err(e) => Err(e),
        },
        Command::Pending { family } => pending(context, family.as_ref()).await,
        Command::Replay { family } => replay(context, family.as_ref()).await,
        Command::Discard { id } => discard(context, id).await,
        Command::Status => status(context),
    };

    log_command_execution(name, family.as_deref(), started.elapsed(), result.is_ok());
    result
}
