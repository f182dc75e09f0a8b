use std::io;
use std::process::Command;
use std::time::Duration;

use thiserror::Error;

use crate::process::run_captured;

use super::playlist::diagnostic_tail;
use super::url::normalize_watch_url;

/// Format selector: best audio-bearing stream, falling back to anything
/// with an audio codec.
const STREAM_FORMAT: &str = "bestaudio[acodec!=none]/best[acodec!=none]/best";

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("`{0}` not found (is it installed?)")]
    ToolMissing(String),
    #[error("stream resolution timed out")]
    Timeout,
    #[error("failed to run `{tool}`: {source}")]
    Invocation {
        tool: String,
        source: io::Error,
    },
    #[error("stream resolution failed: {0}")]
    Failed(String),
    #[error("tool returned no stream URL")]
    NoStream,
}

/// Resolve a watch URL to a single direct media URL via the extraction
/// tool's `-g` mode. The tool prints one URL per requested stream; the last
/// non-empty line is the audio one under our format selector.
pub fn resolve_stream(
    downloader: &str,
    watch_url: &str,
    timeout: Duration,
) -> Result<String, ResolveError> {
    let url = normalize_watch_url(watch_url);

    let mut cmd = Command::new(downloader);
    cmd.args(["-f", STREAM_FORMAT, "-g", "--no-warnings"]).arg(&url);

    let out = run_captured(cmd, timeout).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ResolveError::ToolMissing(downloader.to_string()),
        io::ErrorKind::TimedOut => ResolveError::Timeout,
        _ => ResolveError::Invocation {
            tool: downloader.to_string(),
            source: e,
        },
    })?;

    if !out.status.success() {
        return Err(ResolveError::Failed(diagnostic_tail(&out.stderr)));
    }

    String::from_utf8_lossy(&out.stdout)
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .next_back()
        .map(str::to_string)
        .ok_or(ResolveError::NoStream)
}
