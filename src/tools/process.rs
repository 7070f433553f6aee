use super::{Invocation, ToolOutput, ToolRunner};
use crate::config::Config;
use crate::error::ConversionError;
use std::collections::BTreeMap;
use std::io::{ErrorKind, Read};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Spawns tools with `std::process::Command` and waits for them.
pub struct ProcessRunner {
    env: BTreeMap<String, String>,
    timeout: Option<Duration>,
}

impl ProcessRunner {
    pub fn new(cfg: &Config) -> Self {
        let timeout = if cfg.tools.timeout_seconds > 0 {
            Some(Duration::from_secs(cfg.tools.timeout_seconds))
        } else {
            None
        };
        Self {
            env: cfg.tools.env.clone(),
            timeout,
        }
    }
}

impl ToolRunner for ProcessRunner {
    fn run(&self, inv: &Invocation, cwd: &Path) -> Result<ToolOutput, ConversionError> {
        debug!(
            "spawn {} {:?} cwd={} timeout={:?}",
            inv.program,
            inv.args,
            cwd.display(),
            self.timeout
        );
        let mut cmd = Command::new(&inv.program);
        cmd.args(&inv.args);
        cmd.current_dir(cwd);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        for (k, v) in &self.env {
            cmd.env(k, v);
        }
        // eps2eps/epstopdf are wrappers around gs; a timeout has to take the
        // whole group down, not just the wrapper. Only done when a timeout is
        // set, since a separate group no longer receives the terminal's ^C.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            if self.timeout.is_some() {
                cmd.process_group(0);
            }
        }

        let mut child = cmd.spawn().map_err(|e| match e.kind() {
            ErrorKind::NotFound | ErrorKind::PermissionDenied => ConversionError::ToolMissing {
                tool: inv.program.clone(),
                source: e,
            },
            _ => ConversionError::io(format!("spawning {}", inv.program), e),
        })?;

        let output = match self.timeout {
            Some(limit) => wait_with_timeout(&mut child, limit, inv)?,
            None => {
                let out = child
                    .wait_with_output()
                    .map_err(|e| ConversionError::io(format!("waiting for {}", inv.program), e))?;
                ToolOutput {
                    success: out.status.success(),
                    code: out.status.code(),
                    stdout: out.stdout,
                    stderr: out.stderr,
                }
            }
        };

        if !output.stderr.is_empty() {
            debug!("{} stderr: {}", inv.program, output.stderr_lossy().trim());
        }
        Ok(output)
    }
}

fn wait_with_timeout(
    child: &mut Child,
    timeout: Duration,
    inv: &Invocation,
) -> Result<ToolOutput, ConversionError> {
    // Drain pipes while waiting so a chatty tool can't block on a full buffer.
    let stdout_rx = spawn_drain(child.stdout.take());
    let stderr_rx = spawn_drain(child.stderr.take());

    let start = Instant::now();
    loop {
        let polled = child
            .try_wait()
            .map_err(|e| ConversionError::io(format!("polling {}", inv.program), e))?;

        if let Some(status) = polled {
            // A grandchild that outlived the tool may still hold the pipes.
            let remaining = timeout.saturating_sub(start.elapsed()).max(DRAIN_GRACE);
            return Ok(ToolOutput {
                success: status.success(),
                code: status.code(),
                stdout: collect_drain(&stdout_rx, remaining),
                stderr: collect_drain(&stderr_rx, remaining),
            });
        }

        if start.elapsed() > timeout {
            warn!("{} timed out after {:?}", inv.program, timeout);
            kill_tree(child);
            let _ = child.wait();
            let _ = collect_drain(&stdout_rx, DRAIN_GRACE);
            let stderr = collect_drain(&stderr_rx, DRAIN_GRACE);
            return Err(ConversionError::ToolTimedOut {
                stage: inv.stage,
                tool: inv.program.clone(),
                secs: timeout.as_secs(),
                stderr: String::from_utf8_lossy(&stderr).into_owned(),
            });
        }

        std::thread::sleep(Duration::from_millis(50));
    }
}

const DRAIN_GRACE: Duration = Duration::from_millis(500);

/// Kills the tool's process group (unix), then the tool itself.
fn kill_tree(child: &mut Child) {
    #[cfg(unix)]
    {
        let group = format!("-{}", child.id());
        let killed = Command::new("kill")
            .args(["-KILL", "--", group.as_str()])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        if let Err(e) = killed {
            debug!("kill {group}: {e}");
        }
    }
    let _ = child.kill();
}

/// Reads to EOF on a helper thread. The thread is detached; if something
/// keeps the pipe open the receiver just stops waiting.
fn spawn_drain<R: Read + Send + 'static>(reader: Option<R>) -> mpsc::Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut r) = reader {
            let _ = r.read_to_end(&mut buf);
        }
        let _ = tx.send(buf);
    });
    rx
}

fn collect_drain(rx: &mpsc::Receiver<Vec<u8>>, wait: Duration) -> Vec<u8> {
    rx.recv_timeout(wait).unwrap_or_default()
}
