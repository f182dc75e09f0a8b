use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::config::Settings;
use crate::library::{Source, Track};
use crate::process::{GroupChild, Liveness};
use crate::status::{StatusHandle, set_status};

use super::filename::sanitize;
use super::types::{BatchOutcome, DownloadProgress, ItemFailure, ProgressHandle};

/// How often the worker re-checks the in-flight tool and the cancel flag.
const SUPERVISE_INTERVAL: Duration = Duration::from_millis(100);

const MAX_NAME_LEN: usize = 140;

/// Public handle to the download pipeline. At most one batch runs at a
/// time; progress is observed through the shared handle.
pub struct Downloader {
    settings: Settings,
    progress: ProgressHandle,
    cancel: Arc<AtomicBool>,
    status: StatusHandle,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl Downloader {
    pub fn new(settings: &Settings, status: StatusHandle) -> Self {
        Self {
            settings: settings.clone(),
            progress: Arc::new(Mutex::new(DownloadProgress::default())),
            cancel: Arc::new(AtomicBool::new(false)),
            status,
            join: Mutex::new(None),
        }
    }

    pub fn progress_handle(&self) -> ProgressHandle {
        self.progress.clone()
    }

    pub fn running(&self) -> bool {
        self.progress.lock().map(|p| p.active).unwrap_or(false)
    }

    /// Start a batch over `items` into `dest`. Returns false when a batch
    /// is already running (only one at a time, by construction).
    pub fn start(&self, items: Vec<Track>, dest: PathBuf) -> bool {
        {
            let Ok(mut progress) = self.progress.lock() else {
                return false;
            };
            if progress.active {
                return false;
            }
            *progress = DownloadProgress {
                active: true,
                current: 0,
                total: items.len(),
                title: "Starting…".to_string(),
                started_at: Some(Instant::now()),
                outcome: None,
            };
        }
        self.cancel.store(false, Ordering::Relaxed);

        // The previous worker (if any) has already finished: `active` was
        // false. Reap its thread before spawning the next one.
        if let Ok(mut join) = self.join.lock() {
            if let Some(handle) = join.take() {
                let _ = handle.join();
            }
        }

        let worker = Worker {
            items,
            dest,
            settings: self.settings.clone(),
            progress: self.progress.clone(),
            cancel: self.cancel.clone(),
            status: self.status.clone(),
        };
        let handle = thread::spawn(move || worker.run());
        if let Ok(mut join) = self.join.lock() {
            *join = Some(handle);
        }
        true
    }

    /// Request cooperative cancellation. The worker stops scheduling items
    /// and group-kills the in-flight tool within its supervision interval.
    /// Returns false when no batch is running.
    pub fn cancel(&self) -> bool {
        if !self.running() {
            return false;
        }
        self.cancel.store(true, Ordering::Relaxed);
        true
    }

    /// Cancel (if needed) and wait for the worker to finish. Used on app
    /// exit so no tool process outlives the application.
    pub fn shutdown(&self) {
        self.cancel.store(true, Ordering::Relaxed);
        if let Ok(mut join) = self.join.lock() {
            if let Some(handle) = join.take() {
                let _ = handle.join();
            }
        }
    }
}

enum ItemError {
    Cancelled,
    Failed(String),
}

struct Worker {
    items: Vec<Track>,
    dest: PathBuf,
    settings: Settings,
    progress: ProgressHandle,
    cancel: Arc<AtomicBool>,
    status: StatusHandle,
}

impl Worker {
    fn run(self) {
        let mut failures: Vec<ItemFailure> = Vec::new();
        let mut cancelled = false;

        for (i, track) in self.items.iter().enumerate() {
            if self.cancelled() {
                cancelled = true;
                break;
            }

            let ordinal = i + 1;
            if let Ok(mut p) = self.progress.lock() {
                p.current = ordinal;
                p.title = track.display.clone();
            }

            match self.process_item(ordinal, track) {
                Ok(()) => {}
                Err(ItemError::Cancelled) => {
                    cancelled = true;
                    break;
                }
                Err(ItemError::Failed(reason)) => {
                    set_status(
                        &self.status,
                        format!("Failed: {} ({reason})", track.display),
                    );
                    failures.push(ItemFailure {
                        index: ordinal,
                        title: track.display.clone(),
                        reason,
                    });
                }
            }
        }

        let outcome = if cancelled {
            BatchOutcome::Cancelled
        } else if failures.is_empty() {
            BatchOutcome::Completed
        } else {
            BatchOutcome::CompletedWithErrors(failures)
        };

        set_status(
            &self.status,
            match &outcome {
                BatchOutcome::Completed => "Download finished.".to_string(),
                BatchOutcome::Cancelled => "Download cancelled.".to_string(),
                BatchOutcome::CompletedWithErrors(errs) => {
                    format!("Download finished with {} error(s).", errs.len())
                }
            },
        );

        if let Ok(mut p) = self.progress.lock() {
            p.active = false;
            p.title.clear();
            p.started_at = None;
            p.outcome = Some(outcome);
        }
    }

    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    fn process_item(&self, ordinal: usize, track: &Track) -> Result<(), ItemError> {
        let format = self.settings.download.audio_format.to_ascii_lowercase();
        let name = sanitize(&track.display, MAX_NAME_LEN);
        let prefix = format!("{ordinal:03}");

        match track.source {
            Source::Remote => {
                // The extractor picks the real extension; hand it a template.
                let template = self.dest.join(format!("{prefix} - {name}.%(ext)s"));
                let mut args: Vec<OsString> = ["--no-playlist", "-x", "--audio-format"]
                    .iter()
                    .map(Into::into)
                    .collect();
                args.push(OsString::from(&format));
                args.push("--audio-quality".into());
                args.push(OsString::from(&self.settings.download.audio_quality));
                args.push("-o".into());
                args.push(template.into_os_string());
                args.push(OsString::from(&track.uri));
                self.supervise_tool(&self.settings.tools.downloader, args)
            }
            Source::Local => {
                let src = PathBuf::from(&track.uri);
                if !src.is_file() {
                    return Err(ItemError::Failed(format!("missing file: {}", src.display())));
                }
                let out = self.dest.join(format!("{prefix} - {name}.{format}"));

                let already_target = src
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(|e| e.eq_ignore_ascii_case(&format))
                    .unwrap_or(false);
                if already_target {
                    // Same format: a plain copy, no process spawn.
                    return fs::copy(&src, &out)
                        .map(|_| ())
                        .map_err(|e| ItemError::Failed(format!("copy failed: {e}")));
                }

                let mut args: Vec<OsString> = vec!["-y".into(), "-i".into(), src.into_os_string()];
                args.push("-vn".into());
                if format == "mp3" {
                    args.extend(["-codec:a", "libmp3lame", "-q:a"].iter().map(Into::into));
                    args.push(OsString::from(&self.settings.download.audio_quality));
                }
                args.push(out.into_os_string());
                self.supervise_tool(&self.settings.tools.transcoder, args)
            }
        }
    }

    /// Run one tool invocation under the cancel flag: poll the child every
    /// supervision interval; on cancellation, group-kill it with the usual
    /// graceful-then-forceful sequence.
    fn supervise_tool(&self, program: &str, args: Vec<OsString>) -> Result<(), ItemError> {
        let mut child = match GroupChild::spawn(program, &args) {
            Ok(child) => child,
            // A missing transcoder/extractor fails this item, not the batch.
            Err(e) => return Err(ItemError::Failed(e.to_string())),
        };

        loop {
            if self.cancelled() {
                child.shutdown(Duration::from_millis(self.settings.playback.stop_grace_ms));
                return Err(ItemError::Cancelled);
            }
            match child.poll() {
                Liveness::Exited(Some(0)) => return Ok(()),
                Liveness::Exited(code) => {
                    let code = code
                        .map(|c| c.to_string())
                        .unwrap_or_else(|| "signal".to_string());
                    return Err(ItemError::Failed(format!("{program} exit {code}")));
                }
                Liveness::Running => thread::sleep(SUPERVISE_INTERVAL),
            }
        }
    }
}
