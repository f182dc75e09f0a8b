mod app;
mod config;
mod download;
mod library;
mod playback;
mod playlist;
mod process;
mod remote;
mod runtime;
mod status;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
