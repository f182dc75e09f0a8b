use std::process::Command;
use std::thread;
use std::time::{Duration, Instant};

use super::*;

#[test]
fn spawn_missing_binary_is_a_launch_error() {
    let err = GroupChild::spawn("legato-no-such-binary", ["x"]).unwrap_err();
    assert!(matches!(err, LaunchError::NotFound(_)));
}

#[test]
fn poll_reports_exit_of_short_lived_child() {
    let mut child = GroupChild::spawn("true", std::iter::empty::<&str>()).unwrap();
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        match child.poll() {
            Liveness::Exited(code) => {
                assert_eq!(code, Some(0));
                break;
            }
            Liveness::Running if Instant::now() < deadline => {
                thread::sleep(Duration::from_millis(10))
            }
            Liveness::Running => panic!("`true` never exited"),
        }
    }
    // Polling after exit keeps reporting the same status.
    assert_eq!(child.poll(), Liveness::Exited(Some(0)));
}

#[test]
fn shutdown_terminates_a_long_running_child_within_the_bound() {
    let child = GroupChild::spawn("sleep", ["30"]).unwrap();
    let started = Instant::now();
    child.shutdown(Duration::from_millis(800));
    // `sleep` dies to SIGTERM, so this comes back well inside the grace
    // period, and certainly inside grace + escalation.
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[test]
fn shutdown_escalates_when_sigterm_is_ignored() {
    // A shell that traps TERM and keeps respawning work only dies to the
    // SIGKILL escalation. (The inner sleeps die to the group SIGTERM, but
    // the loop replaces them.)
    let child = GroupChild::spawn("sh", ["-c", "trap '' TERM; while :; do sleep 1; done"]).unwrap();
    let started = Instant::now();
    child.shutdown(Duration::from_millis(300));
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[test]
fn suspend_and_resume_signal_the_group() {
    let mut child = GroupChild::spawn("sleep", ["30"]).unwrap();
    child.suspend().unwrap();
    thread::sleep(Duration::from_millis(50));
    assert_eq!(child.poll(), Liveness::Running);
    child.resume().unwrap();
    assert_eq!(child.poll(), Liveness::Running);
    child.shutdown(Duration::from_millis(800));
}

#[test]
fn run_captured_collects_stdout_and_stderr() {
    let mut cmd = Command::new("sh");
    cmd.args(["-c", "echo out; echo err >&2"]);
    let out = run_captured(cmd, Duration::from_secs(5)).unwrap();
    assert!(out.status.success());
    assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "out");
    assert_eq!(String::from_utf8_lossy(&out.stderr).trim(), "err");
}

#[test]
fn run_captured_times_out_and_kills_the_tool() {
    let mut cmd = Command::new("sleep");
    cmd.arg("30");
    let started = Instant::now();
    let err = run_captured(cmd, Duration::from_millis(200)).unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::TimedOut);
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[test]
fn which_finds_sh_but_not_nonsense() {
    assert!(which("sh").is_some());
    assert!(which("legato-no-such-binary").is_none());
}
