//! The approval gate: concurrent state machine for pending approvals.
//!
//! One mutex guards the whole entry map, so every status transition for an
//! entry is serialized and exactly one terminal transition can win. Expiry
//! is applied lazily on every read and resolution attempt, and eagerly by
//! the background sweep; both paths take the same lock and agree. An entry
//! expired on a read path stays queued until a sweep collects it, so the
//! caller driving the sweep sees every expiry.

pub mod state_machine;

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use taskgate_core::config::GateConfig;
use taskgate_core::Timestamp;
use uuid::Uuid;

use crate::error::GateError;
use crate::types::{ApprovalRequest, ApprovalStatus, Decision, RiskAssessment, RiskTier, TaskRequest};
use state_machine::validate_transition;

/// Per-tier approval deadlines, seconds from gate open.
#[derive(Debug, Clone, Copy)]
pub struct GateTimeouts {
    pub medium_secs: u64,
    pub high_secs: u64,
}

impl GateTimeouts {
    pub fn from_config(config: &GateConfig) -> Self {
        Self {
            medium_secs: config.medium_timeout_secs,
            high_secs: config.high_timeout_secs,
        }
    }

    /// Timeout for a tier. LOW never gates; if it ever reaches here the
    /// medium timeout applies.
    pub fn for_tier(&self, tier: RiskTier) -> u64 {
        match tier {
            RiskTier::Low | RiskTier::Medium => self.medium_secs,
            RiskTier::High => self.high_secs,
        }
    }
}

struct GateState {
    entries: HashMap<Uuid, ApprovalRequest>,
    /// Task ids that already have an approval entry (at most one each).
    gated_tasks: HashSet<Uuid>,
    /// Entries that expired on a read path and have not yet been handed
    /// to a sweep. Drained by `expire_overdue` so every expiry reaches
    /// the caller exactly once, no matter which path observed it first.
    unswept_expiries: HashSet<Uuid>,
}

/// Concurrent store of pending and resolved approval requests.
pub struct ApprovalGate {
    timeouts: GateTimeouts,
    state: Mutex<GateState>,
}

impl ApprovalGate {
    pub fn new(timeouts: GateTimeouts) -> Self {
        Self {
            timeouts,
            state: Mutex::new(GateState {
                entries: HashMap::new(),
                gated_tasks: HashSet::new(),
                unswept_expiries: HashSet::new(),
            }),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, GateState>, GateError> {
        self.state
            .lock()
            .map_err(|e| GateError::Internal(format!("lock poisoned: {}", e)))
    }

    /// Create a PENDING entry for a gated task.
    ///
    /// Fails with `AlreadyOpen` if the task already has an entry; a task
    /// request is single-shot and yields at most one approval request.
    pub fn open(
        &self,
        task: TaskRequest,
        assessment: RiskAssessment,
    ) -> Result<ApprovalRequest, GateError> {
        let mut state = self.lock()?;

        if state.gated_tasks.contains(&task.id) {
            return Err(GateError::AlreadyOpen(task.id));
        }

        let now = Timestamp::now();
        let request = ApprovalRequest {
            id: Uuid::new_v4(),
            deadline: now.plus_secs(self.timeouts.for_tier(assessment.tier)),
            created_at: now,
            status: ApprovalStatus::Pending,
            resolved_by: None,
            resolution_note: None,
            resolved_at: None,
            task,
            assessment,
        };

        tracing::warn!(
            approval_id = %request.id,
            task_id = %request.task.id,
            risk = %request.assessment.tier,
            deadline = request.deadline.0,
            "Task gated, awaiting approval"
        );

        state.gated_tasks.insert(request.task.id);
        state.entries.insert(request.id, request.clone());
        Ok(request)
    }

    /// Apply lazy expiry to an entry. Returns true if it transitioned.
    fn expire_if_overdue(entry: &mut ApprovalRequest, now: Timestamp) -> bool {
        if entry.status == ApprovalStatus::Pending && now >= entry.deadline {
            entry.status = ApprovalStatus::Expired;
            entry.resolved_at = Some(now);
            true
        } else {
            false
        }
    }

    /// Record a human decision on a pending entry.
    ///
    /// Succeeds only while the entry is PENDING and strictly before its
    /// deadline. An already-terminal entry yields `AlreadyResolved` with
    /// the recorded state; an overdue entry is forced to EXPIRED and the
    /// attempt fails with `DeadlinePassed`.
    pub fn resolve(
        &self,
        id: Uuid,
        decision: Decision,
        resolver: &str,
        note: Option<String>,
    ) -> Result<ApprovalRequest, GateError> {
        let mut state = self.lock()?;
        let GateState {
            entries,
            unswept_expiries,
            ..
        } = &mut *state;
        let entry = entries.get_mut(&id).ok_or(GateError::NotFound(id))?;

        if entry.status.is_terminal() {
            return Err(GateError::AlreadyResolved {
                id,
                status: entry.status,
            });
        }

        let now = Timestamp::now();
        if Self::expire_if_overdue(entry, now) {
            unswept_expiries.insert(id);
            tracing::info!(approval_id = %id, "Resolution attempt after deadline; entry expired");
            return Err(GateError::DeadlinePassed(id));
        }

        let target = decision.terminal_status();
        validate_transition(entry.status, target)?;
        entry.status = target;
        entry.resolved_by = Some(resolver.to_string());
        entry.resolution_note = note;
        entry.resolved_at = Some(now);

        tracing::info!(
            approval_id = %id,
            status = %entry.status,
            resolver,
            "Approval resolved"
        );
        Ok(entry.clone())
    }

    /// Read-only snapshot of an entry, after lazy expiry.
    pub fn get(&self, id: Uuid) -> Result<ApprovalRequest, GateError> {
        let mut state = self.lock()?;
        let GateState {
            entries,
            unswept_expiries,
            ..
        } = &mut *state;
        let entry = entries.get_mut(&id).ok_or(GateError::NotFound(id))?;
        if Self::expire_if_overdue(entry, Timestamp::now()) {
            unswept_expiries.insert(id);
        }
        Ok(entry.clone())
    }

    /// All entries still PENDING after expiry checks, newest first.
    pub fn list_pending(&self) -> Vec<ApprovalRequest> {
        let mut state = match self.lock() {
            Ok(s) => s,
            Err(_) => return Vec::new(),
        };
        let GateState {
            entries,
            unswept_expiries,
            ..
        } = &mut *state;
        let now = Timestamp::now();
        let mut pending = Vec::new();
        for entry in entries.values_mut() {
            if Self::expire_if_overdue(entry, now) {
                unswept_expiries.insert(entry.id);
            } else if entry.status == ApprovalStatus::Pending {
                pending.push(entry.clone());
            }
        }
        pending.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        pending
    }

    /// Transition every overdue PENDING entry to EXPIRED and return all
    /// entries that expired since the last sweep, including entries a
    /// read path already transitioned. Used by the background sweep.
    pub fn expire_overdue(&self) -> Vec<ApprovalRequest> {
        let mut state = match self.lock() {
            Ok(s) => s,
            Err(_) => return Vec::new(),
        };
        let GateState {
            entries,
            unswept_expiries,
            ..
        } = &mut *state;
        let now = Timestamp::now();
        for entry in entries.values_mut() {
            if Self::expire_if_overdue(entry, now) {
                unswept_expiries.insert(entry.id);
            }
        }
        let mut expired: Vec<ApprovalRequest> = unswept_expiries
            .drain()
            .filter_map(|id| entries.get(&id).cloned())
            .collect();
        expired.sort_by_key(|e| e.created_at);
        if !expired.is_empty() {
            tracing::info!(count = expired.len(), "Expired overdue approval requests");
        }
        expired
    }
}
