//! Per-hospital training locks.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use hygieia_core::types::DbId;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug)]
struct InFlight {
    cancel: CancellationToken,
    started_at: Instant,
    publishing: bool,
}

/// Result of [`TrainingLocks::abort`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortOutcome {
    /// The run was signalled and will not publish weights.
    Requested,
    /// The fit already finished and its weights are being stored.
    Publishing,
    /// Nothing is running for this hospital.
    Idle,
}

/// Registry of hospitals with a training run in progress.
#[derive(Debug, Clone, Default)]
pub struct TrainingLocks {
    inner: Arc<Mutex<HashMap<DbId, InFlight>>>,
}

/// Exclusive claim on a hospital's training slot. Released on drop.
#[derive(Debug)]
pub struct TrainingGuard {
    locks: TrainingLocks,
    hospital_id: DbId,
    cancel: CancellationToken,
}

impl TrainingGuard {
    pub fn hospital_id(&self) -> DbId {
        self.hospital_id
    }

    /// Token the training loop polls. Cancelled by [`TrainingLocks::abort`]
    /// or when the run exceeds its time limit.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Commit to storing this run's weights.
    ///
    /// Returns `false` if the run was aborted first. Once this returns
    /// `true`, [`TrainingLocks::abort`] reports [`AbortOutcome::Publishing`]
    /// and no longer cancels the run.
    pub fn begin_publish(&self) -> bool {
        let mut map = self.locks.inner.lock();
        if self.cancel.is_cancelled() {
            return false;
        }
        if let Some(in_flight) = map.get_mut(&self.hospital_id) {
            in_flight.publishing = true;
        }
        true
    }
}

impl Drop for TrainingGuard {
    fn drop(&mut self) {
        // Stop any fit still polling this token before the slot is reused.
        self.cancel.cancel();
        self.locks.inner.lock().remove(&self.hospital_id);
        debug!(hospital_id = self.hospital_id, "Training slot released");
    }
}

impl TrainingLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the training slot for `hospital_id`.
    ///
    /// Returns `None` while another run for the same hospital holds it.
    pub fn try_acquire(&self, hospital_id: DbId) -> Option<TrainingGuard> {
        let mut map = self.inner.lock();
        match map.entry(hospital_id) {
            Entry::Occupied(entry) => {
                debug!(
                    hospital_id,
                    running_for = ?entry.get().started_at.elapsed(),
                    "Training already in progress"
                );
                None
            }
            Entry::Vacant(entry) => {
                let cancel = CancellationToken::new();
                entry.insert(InFlight {
                    cancel: cancel.clone(),
                    started_at: Instant::now(),
                    publishing: false,
                });
                Some(TrainingGuard {
                    locks: self.clone(),
                    hospital_id,
                    cancel,
                })
            }
        }
    }

    /// Request cancellation of the hospital's in-flight run.
    ///
    /// The slot itself stays held until the run notices the cancellation
    /// and its guard drops.
    pub fn abort(&self, hospital_id: DbId) -> AbortOutcome {
        match self.inner.lock().get(&hospital_id) {
            Some(in_flight) if in_flight.publishing => AbortOutcome::Publishing,
            Some(in_flight) => {
                in_flight.cancel.cancel();
                AbortOutcome::Requested
            }
            None => AbortOutcome::Idle,
        }
    }

    pub fn is_running(&self, hospital_id: DbId) -> bool {
        self.inner.lock().contains_key(&hospital_id)
    }

    /// Number of runs currently in flight.
    pub fn running_count(&self) -> usize {
        self.inner.lock().len()
    }
}
