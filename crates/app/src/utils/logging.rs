use std::time::Duration;

use tracing::{info, warn};

/// Log the outcome of a command execution with structured fields.
///
/// `command` should be a stable identifier such as `"fetch"`; never pass
/// request bodies or tokens.
#[inline]
pub fn log_command_execution(command: &str, family: Option<&str>, elapsed: Duration, success: bool) {
    let duration_ms = elapsed.as_millis() as u64;
    let family = family.unwrap_or("*");

    if success {
        info!(command, family, duration_ms, "command_execution_success");
    } else {
        warn!(command, family, duration_ms, "command_execution_failure");
    }
}
