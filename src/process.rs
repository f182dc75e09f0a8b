//! Process-group supervision of external tools.
//!
//! Every tool (player, extractor, transcoder, prober) is spawned in its own
//! process group so the whole tree it forks can be signaled atomically:
//! SIGSTOP/SIGCONT for pause/resume and SIGTERM with a bounded wait before a
//! SIGKILL escalation for shutdown.

use std::ffi::OsStr;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

/// Granularity of the non-blocking waits below.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("`{0}` not found (is it installed?)")]
    NotFound(String),
    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        source: io::Error,
    },
}

/// Non-blocking liveness check result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    Running,
    Exited(Option<i32>),
}

/// A child process spawned as the leader of a fresh process group, with
/// stdio discarded. All signaling targets the group, not just the leader.
#[derive(Debug)]
pub struct GroupChild {
    child: Child,
    exited: Option<Option<i32>>,
}

impl GroupChild {
    pub fn spawn<I, S>(program: &str, args: I) -> Result<Self, LaunchError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        let child = spawn_in_group(&mut cmd).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => LaunchError::NotFound(program.to_string()),
            _ => LaunchError::Spawn {
                program: program.to_string(),
                source: e,
            },
        })?;
        Ok(Self {
            child,
            exited: None,
        })
    }

    pub fn poll(&mut self) -> Liveness {
        if let Some(code) = self.exited {
            return Liveness::Exited(code);
        }
        match self.child.try_wait() {
            Ok(Some(status)) => {
                self.exited = Some(status.code());
                Liveness::Exited(status.code())
            }
            Ok(None) => Liveness::Running,
            // A wait error means we can no longer observe the child; treat
            // it as gone rather than looping on it forever.
            Err(_) => {
                self.exited = Some(None);
                Liveness::Exited(None)
            }
        }
    }

    /// Suspend the whole group (SIGSTOP).
    pub fn suspend(&self) -> io::Result<()> {
        signal_group(self.child.id(), libc::SIGSTOP)
    }

    /// Continue the whole group (SIGCONT).
    pub fn resume(&self) -> io::Result<()> {
        signal_group(self.child.id(), libc::SIGCONT)
    }

    /// Graceful-then-forceful termination: SIGTERM to the group, wait up to
    /// `grace` for the leader to exit, then SIGKILL. Never blocks longer
    /// than `grace` plus one poll interval; the child is reaped.
    pub fn shutdown(mut self, grace: Duration) {
        if self.poll() != Liveness::Running {
            return;
        }
        // A stopped group never acts on SIGTERM; wake it first.
        let _ = signal_group(self.child.id(), libc::SIGCONT);
        let _ = signal_group(self.child.id(), libc::SIGTERM);

        let deadline = Instant::now() + grace;
        while Instant::now() < deadline {
            if self.poll() != Liveness::Running {
                return;
            }
            thread::sleep(POLL_INTERVAL);
        }

        let _ = signal_group(self.child.id(), libc::SIGKILL);
        let _ = self.child.wait();
    }
}

fn spawn_in_group(cmd: &mut Command) -> io::Result<Child> {
    use std::os::unix::process::CommandExt;
    cmd.process_group(0).spawn()
}

fn signal_group(pid: u32, signal: libc::c_int) -> io::Result<()> {
    // The child is its own group leader, so its pid doubles as the pgid.
    let rc = unsafe { libc::killpg(pid as libc::pid_t, signal) };
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

/// Output of a captured tool run.
#[derive(Debug)]
pub struct Captured {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Run a short-lived tool to completion with stdout/stderr captured,
/// group-killing it if it outlives `timeout`. The pipes are drained on
/// helper threads so a chatty tool cannot deadlock against a full pipe.
pub fn run_captured(mut cmd: Command, timeout: Duration) -> io::Result<Captured> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    let mut child = spawn_in_group(&mut cmd)?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait()? {
            Some(status) => break status,
            None if Instant::now() >= deadline => {
                let _ = signal_group(child.id(), libc::SIGKILL);
                let _ = child.wait();
                return Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    "tool did not finish in time",
                ));
            }
            None => thread::sleep(POLL_INTERVAL),
        }
    };

    Ok(Captured {
        status,
        stdout: stdout.map(|h| h.join().unwrap_or_default()).unwrap_or_default(),
        stderr: stderr.map(|h| h.join().unwrap_or_default()).unwrap_or_default(),
    })
}

fn drain<R: Read + Send + 'static>(reader: Option<R>) -> Option<thread::JoinHandle<Vec<u8>>> {
    reader.map(|mut r| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = r.read_to_end(&mut buf);
            buf
        })
    })
}

/// Minimal PATH lookup, enough to pick a player at startup.
pub fn which(program: &str) -> Option<PathBuf> {
    use std::os::unix::fs::PermissionsExt;

    if program.contains('/') {
        let p = PathBuf::from(program);
        return p.is_file().then_some(p);
    }
    let path = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&path) {
        let candidate = dir.join(program);
        let Ok(meta) = candidate.metadata() else {
            continue;
        };
        if meta.is_file() && meta.permissions().mode() & 0o111 != 0 {
            return Some(candidate);
        }
    }
    None
}

#[cfg(test)]
mod tests;
