//! The batch download pipeline: a one-shot worker thread that walks a
//! snapshot of the playlist strictly in order, shelling out per item, with
//! cooperative cancellation and a shared progress handle.

mod filename;
mod types;
mod worker;

pub use filename::sanitize;
pub use types::{BatchOutcome, DownloadProgress, ItemFailure, ProgressHandle};
pub use worker::Downloader;
