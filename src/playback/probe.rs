//! One-shot duration probe for local files.
//!
//! Every failure mode (missing prober, timeout, nonzero exit, unparsable
//! output) degrades to "unknown duration"; the UI then shows the
//! indeterminate sweep instead of a percentage.

use std::path::Path;
use std::process::Command;
use std::time::Duration;

use crate::process::run_captured;

pub(super) fn duration_of(prober: &str, path: &Path, timeout: Duration) -> Option<Duration> {
    let mut cmd = Command::new(prober);
    cmd.args([
        "-v",
        "error",
        "-show_entries",
        "format=duration",
        "-of",
        "default=nw=1:nk=1",
    ])
    .arg(path);

    let out = run_captured(cmd, timeout).ok()?;
    if !out.status.success() {
        return None;
    }

    let secs: f64 = String::from_utf8_lossy(&out.stdout).trim().parse().ok()?;
    (secs.is_finite() && secs > 0.0).then(|| Duration::from_secs_f64(secs))
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;

    use super::*;

    fn stub(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn missing_prober_means_unknown() {
        let d = duration_of(
            "legato-no-such-binary",
            Path::new("/tmp/a.mp3"),
            Duration::from_secs(2),
        );
        assert!(d.is_none());
    }

    #[test]
    fn parses_fractional_seconds_from_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let prober = stub(dir.path(), "prober", "echo 12.5");
        let d = duration_of(
            prober.to_str().unwrap(),
            Path::new("/tmp/a.mp3"),
            Duration::from_secs(2),
        );
        assert_eq!(d, Some(Duration::from_secs_f64(12.5)));
    }

    #[test]
    fn failing_or_garbled_probe_means_unknown() {
        let dir = tempfile::tempdir().unwrap();

        let failing = stub(dir.path(), "failing", "exit 1");
        assert!(
            duration_of(
                failing.to_str().unwrap(),
                Path::new("/tmp/a.mp3"),
                Duration::from_secs(2)
            )
            .is_none()
        );

        let garbled = stub(dir.path(), "garbled", "echo not-a-number");
        assert!(
            duration_of(
                garbled.to_str().unwrap(),
                Path::new("/tmp/a.mp3"),
                Duration::from_secs(2)
            )
            .is_none()
        );

        let zero = stub(dir.path(), "zero", "echo 0.0");
        assert!(
            duration_of(
                zero.to_str().unwrap(),
                Path::new("/tmp/a.mp3"),
                Duration::from_secs(2)
            )
            .is_none()
        );
    }
}
