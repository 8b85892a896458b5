//! Observer traits
//!
//! These let the engine report batch progress without depending on any
//! particular UI.

use crate::orchestrator::BatchEvent;
use crate::types::BatchSummary;

/// Receives progress updates while a batch drains
pub trait BatchObserver {
    /// Called once before the first entry starts
    fn on_batch_start(&mut self, total: usize);

    /// Called for every status transition, in order
    fn on_event(&mut self, event: &BatchEvent);

    /// Called once after the last entry reached a terminal state
    fn on_batch_complete(&mut self, summary: &BatchSummary);
}

/// No-op observer
pub struct NoObserver;

impl BatchObserver for NoObserver {
    fn on_batch_start(&mut self, _total: usize) {}
    fn on_event(&mut self, _event: &BatchEvent) {}
    fn on_batch_complete(&mut self, _summary: &BatchSummary) {}
}
