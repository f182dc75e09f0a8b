//! The shared one-line status surface.
//!
//! Key handlers, the player thread and the download worker all report here;
//! the UI shows whatever was written last. Per the error policy, this line
//! is where every tool failure ends up instead of crashing the loop.

use std::sync::{Arc, Mutex};

pub type StatusHandle = Arc<Mutex<String>>;

pub fn new_status() -> StatusHandle {
    Arc::new(Mutex::new("Ready.".to_string()))
}

pub fn set_status(handle: &StatusHandle, msg: impl Into<String>) {
    if let Ok(mut s) = handle.lock() {
        *s = msg.into();
    }
}

pub fn read_status(handle: &StatusHandle) -> String {
    handle.lock().map(|s| s.clone()).unwrap_or_default()
}
