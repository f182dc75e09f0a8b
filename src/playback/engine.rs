use std::sync::mpsc::{self, SendError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crate::config::Settings;
use crate::status::StatusHandle;

use super::thread::spawn_player_thread;
use super::types::{PlaybackHandle, PlaybackInfo, PlayerCmd, PlayerSpec};

/// Public handle to the player thread: commands go in over the channel,
/// playback state comes back through the shared `PlaybackHandle`.
pub struct PlayerEngine {
    tx: Sender<PlayerCmd>,
    playback: PlaybackHandle,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl PlayerEngine {
    pub fn new(spec: Option<PlayerSpec>, settings: &Settings, status: StatusHandle) -> Self {
        let (tx, rx) = mpsc::channel::<PlayerCmd>();
        let playback: PlaybackHandle = Arc::new(Mutex::new(PlaybackInfo::default()));

        let handle = spawn_player_thread(spec, settings, rx, playback.clone(), status);

        Self {
            tx,
            playback,
            join: Mutex::new(Some(handle)),
        }
    }

    pub fn playback_handle(&self) -> PlaybackHandle {
        self.playback.clone()
    }

    pub fn send(&self, cmd: PlayerCmd) -> Result<(), SendError<PlayerCmd>> {
        self.tx.send(cmd)
    }

    /// Ask the thread to stop playback and exit, then wait for it. Ensures
    /// no player process outlives the application.
    pub fn shutdown(&self) {
        let _ = self.send(PlayerCmd::Quit);
        if let Ok(mut join) = self.join.lock() {
            if let Some(handle) = join.take() {
                let _ = handle.join();
            }
        }
    }
}
