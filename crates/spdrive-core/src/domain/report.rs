//! Batch outcome reporting
//!
//! The report accumulates per-item outcomes in the order items finish,
//! which under concurrency is generally not the order they were
//! submitted in.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};

use super::newtypes::{RemotePath, UniqueId};
use super::transfer::{Direction, ItemStatus, TransferItem};

/// The terminal outcome of one item, flattened for reporting
#[derive(Debug)]
pub struct ItemOutcome {
    pub id: UniqueId,
    pub direction: Direction,
    pub local_path: PathBuf,
    pub remote_path: RemotePath,
    pub size: Option<u64>,
    /// None on success, the error message on failure
    pub error: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl ItemOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }

    /// Wall-clock time the item spent in flight, if known
    pub fn elapsed(&self) -> Option<Duration> {
        match (self.started_at, self.finished_at) {
            (Some(s), Some(f)) => (f - s).to_std().ok(),
            _ => None,
        }
    }
}

/// Outcome of a whole batch, in completion order
#[derive(Debug, Default)]
pub struct BatchReport {
    outcomes: Vec<ItemOutcome>,
    succeeded: usize,
    failed: usize,
}

impl BatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a terminal item
    ///
    /// # Panics
    /// Panics if the item is not in a terminal state. The orchestrator
    /// only records items after they finish, so hitting this indicates
    /// a bug in the driving code.
    pub fn record(&mut self, item: TransferItem) {
        let error = match &item.status {
            ItemStatus::Succeeded => {
                self.succeeded += 1;
                None
            }
            ItemStatus::Failed(e) => {
                self.failed += 1;
                Some(e.to_string())
            }
            other => panic!("recorded non-terminal item: {other:?}"),
        };
        self.outcomes.push(ItemOutcome {
            id: item.id,
            direction: item.direction,
            local_path: item.local_path,
            remote_path: item.remote_path,
            size: item.size,
            error,
            started_at: item.started_at,
            finished_at: item.finished_at,
        });
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn succeeded(&self) -> usize {
        self.succeeded
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }

    /// All outcomes in completion order
    pub fn outcomes(&self) -> &[ItemOutcome] {
        &self.outcomes
    }

    /// Only the failed outcomes, in completion order
    pub fn failures(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.outcomes.iter().filter(|o| !o.succeeded())
    }
}
