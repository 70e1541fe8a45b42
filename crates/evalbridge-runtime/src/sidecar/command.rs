//! Command builder and log streaming for the wrapper process.

use std::ffi::OsString;
use std::path::Path;

use evalbridge_core::WRAPPER_MOUNT_PATH;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tracing::debug;

use super::SidecarConfig;

/// Build the `uvicorn` command that serves the wrapper application.
///
/// The child inherits the parent environment with two overrides:
/// `API_KEYS` is always set explicitly (empty when auth is disabled) so the
/// wrapper's built-in default credential never becomes active, and
/// `PYTHONPATH` is prefixed with the wrapper checkout when one is given.
pub fn build_command(config: &SidecarConfig) -> Command {
    let mut cmd = Command::new(&config.python);
    cmd.arg("-m")
        .arg("uvicorn")
        .arg(&config.asgi_target)
        .arg("--host")
        .arg(&config.host)
        .arg("--port")
        .arg(config.port.to_string())
        .arg("--root-path")
        .arg(WRAPPER_MOUNT_PATH);

    cmd.env("API_KEYS", config.api_keys.join(","));
    for (name, value) in &config.provider_env {
        cmd.env(name, value);
    }

    if let Some(dir) = &config.wrapper_dir {
        cmd.env("PYTHONPATH", python_path_with(dir, std::env::var_os("PYTHONPATH")));
        cmd.current_dir(dir);
    }

    // Use piped stdio for log streaming
    cmd.stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .kill_on_drop(true);

    cmd
}

fn python_path_with(dir: &Path, existing: Option<OsString>) -> OsString {
    let mut paths = vec![dir.to_path_buf()];
    if let Some(existing) = existing {
        paths.extend(std::env::split_paths(&existing));
    }
    std::env::join_paths(paths).unwrap_or_else(|_| dir.as_os_str().to_os_string())
}

/// Spawn background tasks that forward stdout/stderr lines to tracing.
///
/// The tasks exit when the streams close.
pub fn spawn_log_readers(child: &mut Child) {
    if let Some(stdout) = child.stdout.take() {
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(text)) = lines.next_line().await {
                debug!(target: "evalbridge::wrapper", stream = "stdout", "{text}");
            }
        });
    }

    if let Some(stderr) = child.stderr.take() {
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(text)) = lines.next_line().await {
                debug!(target: "evalbridge::wrapper", stream = "stderr", "{text}");
            }
        });
    }
}
