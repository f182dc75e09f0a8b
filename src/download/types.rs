//! Shared progress state and the batch's terminal outcome.

use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Live progress of the running batch, read by the UI tick. The worker is
/// the only writer while `active` is true.
#[derive(Debug, Clone, Default)]
pub struct DownloadProgress {
    pub active: bool,
    /// 1-based index of the in-flight item.
    pub current: usize,
    pub total: usize,
    /// Display title of the in-flight item.
    pub title: String,
    /// When the batch started; drives the indeterminate animation.
    pub started_at: Option<Instant>,
    /// Terminal report of the most recent batch; cleared when a new one
    /// starts.
    pub outcome: Option<BatchOutcome>,
}

pub type ProgressHandle = Arc<Mutex<DownloadProgress>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    Completed,
    Cancelled,
    CompletedWithErrors(Vec<ItemFailure>),
}

/// One failed item; failures never abort the batch, they accumulate here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    /// 1-based position in the batch.
    pub index: usize,
    pub title: String,
    pub reason: String,
}
