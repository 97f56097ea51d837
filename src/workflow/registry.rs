//! Workflow registry: the shared id → record map and its mutation rules.
//!
//! The registry is an explicit service object constructed once at startup and
//! handed to the API layer. Each record is written through a [`WorkflowHandle`]
//! held by exactly one orchestrator task; pollers read snapshots. A periodic
//! sweep deletes records past the retention window.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::api::JiraTicket;
use crate::workflow::record::{AnalysisResult, StepEntry, WorkflowRecord};

struct WorkflowSlot {
    record: WorkflowRecord,
    cancel: CancellationToken,
}

/// Shared map of live workflow records
#[derive(Clone, Default)]
pub struct WorkflowRegistry {
    inner: Arc<RwLock<HashMap<Uuid, WorkflowSlot>>>,
}

impl WorkflowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fresh record under a new id. Returns the writer handle and the
    /// workflow's cancellation token.
    pub async fn create(&self) -> (WorkflowHandle, CancellationToken) {
        let id = Uuid::new_v4();
        let cancel = CancellationToken::new();

        let slot = WorkflowSlot {
            record: WorkflowRecord::new(id),
            cancel: cancel.clone(),
        };
        self.inner.write().await.insert(id, slot);

        debug!(workflow_id = %id, "Workflow record created");
        (
            WorkflowHandle {
                registry: self.clone(),
                id,
            },
            cancel,
        )
    }

    /// Snapshot a record for a poller
    pub async fn snapshot(&self, id: Uuid) -> Option<WorkflowRecord> {
        self.inner.read().await.get(&id).map(|slot| slot.record.clone())
    }

    /// Request cancellation of a running workflow. Returns false for an
    /// unknown id.
    pub async fn cancel(&self, id: Uuid) -> bool {
        match self.inner.read().await.get(&id) {
            Some(slot) => {
                slot.cancel.cancel();
                true
            }
            None => false,
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Delete completed records past the retention window; cancel expired
    /// records that are somehow still running so a later pass can collect them.
    pub async fn sweep(&self, retention: Duration) -> usize {
        let now = Utc::now();
        let mut map = self.inner.write().await;

        let mut expired_running = 0usize;
        let before = map.len();
        map.retain(|id, slot| {
            if !slot.record.is_expired(retention, now) {
                return true;
            }
            if slot.record.is_complete {
                debug!(workflow_id = %id, "Sweeping expired workflow record");
                false
            } else {
                warn!(workflow_id = %id, "Cancelling expired workflow still running");
                slot.cancel.cancel();
                expired_running += 1;
                true
            }
        });

        let removed = before - map.len();
        if removed > 0 || expired_running > 0 {
            info!(removed, cancelled = expired_running, "Retention sweep finished");
        }
        removed
    }

    /// Apply a mutation to one record. Terminal records are left untouched,
    /// which makes every write through a handle a no-op after completion.
    async fn mutate(&self, id: Uuid, f: impl FnOnce(&mut WorkflowRecord)) {
        let mut map = self.inner.write().await;
        match map.get_mut(&id) {
            Some(slot) if !slot.record.is_complete => f(&mut slot.record),
            Some(_) => debug!(workflow_id = %id, "Ignoring write to completed workflow"),
            None => warn!(workflow_id = %id, "Write to unknown workflow (swept?)"),
        }
    }
}

/// Spawn the periodic retention sweep
pub fn spawn_sweeper(
    registry: WorkflowRegistry,
    interval: Duration,
    retention: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick fires immediately; skip it
        ticker.tick().await;
        loop {
            ticker.tick().await;
            registry.sweep(retention).await;
        }
    })
}

/// Write access to one workflow record: the append-only event sink the
/// orchestrator produces into and pollers consume from
#[derive(Clone)]
pub struct WorkflowHandle {
    registry: WorkflowRegistry,
    id: Uuid,
}

impl WorkflowHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Append a journal entry, returning its id so a later tool_result can
    /// reference it
    pub async fn append_step(&self, step: StepEntry) -> Uuid {
        let step_id = step.id;
        debug!(workflow_id = %self.id, title = %step.title, "Workflow step");
        self.registry
            .mutate(self.id, |record| record.steps.push(step))
            .await;
        step_id
    }

    pub async fn set_status(&self, status: impl Into<String>) {
        let status = status.into();
        self.registry
            .mutate(self.id, |record| record.current_status = status)
            .await;
    }

    /// Snapshot the resolved tickets into the record
    pub async fn set_tickets(&self, tickets: Vec<JiraTicket>) {
        self.registry
            .mutate(self.id, |record| record.tickets = tickets)
            .await;
    }

    pub async fn push_result(&self, result: AnalysisResult) {
        self.registry
            .mutate(self.id, |record| record.results.push(result))
            .await;
    }

    /// Mark the workflow complete. The record is immutable afterwards.
    pub async fn complete(&self, status: impl Into<String>) {
        let status = status.into();
        self.registry
            .mutate(self.id, |record| {
                record.is_complete = true;
                record.current_status = status;
            })
            .await;
    }

    /// Record a terminal failure: an error step, then completion with an
    /// error status
    pub async fn fail(&self, message: impl Into<String>) {
        let message = message.into();
        self.registry
            .mutate(self.id, |record| {
                record
                    .steps
                    .push(StepEntry::error("Error", format!("An error occurred: {message}")));
                record.is_complete = true;
                record.current_status = format!("Error: {message}");
            })
            .await;
    }
}
