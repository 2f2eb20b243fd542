//! Optional "open the output" step after a successful write.
//!
//! Launch failures are logged, never fatal: the estimate is already on disk.

use std::path::Path;
use std::process::Command;

use tracing::{info, warn};

/// Build the viewer command: the configured program and its arguments, then the path.
pub fn viewer_command(command: &str, target: &Path) -> Option<Command> {
    let mut parts = command.split_whitespace();
    let program = parts.next()?;
    let mut cmd = Command::new(program);
    cmd.args(parts).arg(target);
    Some(cmd)
}

/// Spawn the viewer without waiting for it.
pub fn open(command: &str, target: &Path) {
    let Some(mut cmd) = viewer_command(command, target) else {
        return;
    };
    match cmd.spawn() {
        Ok(child) => info!(pid = child.id(), command, "viewer launched"),
        Err(e) => warn!(command, error = %e, "failed to launch viewer"),
    }
}
