//! Stopping the wrapper process.
//!
//! uvicorn finishes in-flight requests on SIGTERM. A wrapper still running
//! after the grace period is killed outright.

use std::io;
use std::process::ExitStatus;
use std::time::Duration;

use tokio::process::Child;
use tracing::{debug, info, warn};

/// Grace period between SIGTERM and SIGKILL.
pub const TERM_GRACE: Duration = Duration::from_secs(5);

/// Stop the wrapper with the default [`TERM_GRACE`].
pub async fn shutdown_child(child: Child) -> io::Result<ExitStatus> {
    shutdown_child_within(child, TERM_GRACE).await
}

/// Stop the wrapper, escalating to SIGKILL once `grace` has passed.
///
/// The child is always reaped before this returns.
pub async fn shutdown_child_within(mut child: Child, grace: Duration) -> io::Result<ExitStatus> {
    if let Some(status) = child.try_wait()? {
        debug!(%status, "Wrapper had already exited");
        return Ok(status);
    }

    #[cfg(unix)]
    {
        terminate_then_kill(&mut child, grace).await
    }

    #[cfg(not(unix))]
    {
        let _ = grace;
        let pid = child.id();
        kill_and_reap(&mut child, pid).await
    }
}

#[cfg(unix)]
async fn terminate_then_kill(child: &mut Child, grace: Duration) -> io::Result<ExitStatus> {
    use nix::errno::Errno;
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;

    let Some(pid) = child.id() else {
        return child.wait().await;
    };
    let raw = i32::try_from(pid).map_err(io::Error::other)?;

    match kill(Pid::from_raw(raw), Signal::SIGTERM) {
        Ok(()) => debug!(pid, ?grace, "Sent SIGTERM to wrapper"),
        // Exited between try_wait and the signal
        Err(Errno::ESRCH) => return child.wait().await,
        Err(e) => {
            warn!(pid, error = %e, "Could not signal wrapper, killing it");
            return kill_and_reap(child, Some(pid)).await;
        }
    }

    if let Ok(result) = tokio::time::timeout(grace, child.wait()).await {
        if let Ok(status) = &result {
            info!(pid, %status, "Wrapper exited after SIGTERM");
        }
        return result;
    }

    warn!(pid, ?grace, "Wrapper ignored SIGTERM, escalating to SIGKILL");
    kill_and_reap(child, Some(pid)).await
}

async fn kill_and_reap(child: &mut Child, pid: Option<u32>) -> io::Result<ExitStatus> {
    child.kill().await?;
    let status = child.wait().await?;
    info!(?pid, %status, "Wrapper killed");
    Ok(status)
}
