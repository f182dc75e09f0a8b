//! Playback: a worker thread that supervises the external player process
//! and owns the session clock, commanded over a channel and observed
//! through a shared `PlaybackInfo` handle.

mod engine;
mod probe;
mod session;
mod thread;
mod types;

pub use engine::PlayerEngine;
pub use types::{PlaySource, PlaybackHandle, PlaybackInfo, PlayerCmd, PlayerSpec};

#[cfg(test)]
mod tests;
