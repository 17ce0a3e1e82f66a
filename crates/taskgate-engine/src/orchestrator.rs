//! Pipeline orchestrator.
//!
//! Coordinates the full path from a raw request through classification,
//! risk assessment, the approval gate, and dispatch. Owns the one-shot
//! completion markers that make dispatch happen at most once per
//! approval, and the per-task outcome records.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use taskgate_core::Timestamp;
use uuid::Uuid;

use crate::audit::{AuditEvent, AuditSink};
use crate::dispatch::Dispatcher;
use crate::error::{EngineError, GateError};
use crate::gate::ApprovalGate;
use crate::intent::IntentClassifier;
use crate::notify::Notifier;
use crate::risk::RiskAssessor;
use crate::types::{
    ApprovalRequest, ApprovalStatus, Decision, DispatchOutcome, OutcomeKind, RiskTier, TaskRequest,
};

/// What `submit` did with a request.
#[derive(Debug, Clone)]
pub enum Submission {
    /// LOW risk: the handler already ran, here is the outcome.
    Dispatched(DispatchOutcome),
    /// MEDIUM/HIGH risk: an approval request is waiting for a decision.
    Gated(PendingHandle),
}

/// Reference to a gated request, returned to the submitter.
#[derive(Debug, Clone)]
pub struct PendingHandle {
    pub approval_id: Uuid,
    pub task_id: Uuid,
    pub tier: RiskTier,
    pub deadline: Timestamp,
}

pub struct Orchestrator {
    classifier: IntentClassifier,
    assessor: RiskAssessor,
    gate: Arc<ApprovalGate>,
    dispatcher: Dispatcher,
    audit: Arc<dyn AuditSink>,
    notifier: Arc<dyn Notifier>,
    /// Approval ids whose terminal outcome is recorded. Checked and set
    /// atomically before any handler call or skip record.
    finalized: Mutex<HashSet<Uuid>>,
    outcomes: Mutex<HashMap<Uuid, DispatchOutcome>>,
}

impl Orchestrator {
    pub fn new(
        classifier: IntentClassifier,
        assessor: RiskAssessor,
        gate: Arc<ApprovalGate>,
        dispatcher: Dispatcher,
        audit: Arc<dyn AuditSink>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            classifier,
            assessor,
            gate,
            dispatcher,
            audit,
            notifier,
            finalized: Mutex::new(HashSet::new()),
            outcomes: Mutex::new(HashMap::new()),
        }
    }

    /// Take a raw request through classify, assess, and route.
    ///
    /// LOW risk dispatches synchronously and returns the outcome.
    /// MEDIUM and HIGH open an approval request and return a handle.
    /// Unrecognized requests are assessed and audited (always HIGH) but
    /// surface as `CannotRoute` rather than silently picking a default.
    pub async fn submit(&self, text: &str, requester: &str) -> Result<Submission, EngineError> {
        let classification = self.classifier.classify(text).await;
        let task = TaskRequest {
            id: Uuid::new_v4(),
            text: text.trim().to_string(),
            submitted_at: Timestamp::now(),
            requester: requester.to_string(),
            capability: classification.capability,
            confidence: classification.confidence,
        };
        let assessment = self.assessor.assess(&task);

        tracing::info!(
            task_id = %task.id,
            requester,
            capability = ?task.capability,
            risk = %assessment.tier,
            "Request assessed"
        );
        self.audit_event(AuditEvent::TaskAssessed {
            task: task.clone(),
            assessment: assessment.clone(),
        });

        if task.capability.is_none() {
            tracing::warn!(task_id = %task.id, "Request matched no capability");
            return Err(EngineError::CannotRoute(task.text));
        }

        if !assessment.tier.requires_approval() {
            return Ok(Submission::Dispatched(self.run_handler(&task).await));
        }

        let approval = self.gate.open(task, assessment)?;
        self.audit_event(AuditEvent::GateOpened {
            approval: approval.clone(),
        });
        self.notifier.gate_opened(&approval);

        Ok(Submission::Gated(PendingHandle {
            approval_id: approval.id,
            task_id: approval.task.id,
            tier: approval.assessment.tier,
            deadline: approval.deadline,
        }))
    }

    /// Approve a pending request and dispatch its task.
    ///
    /// The handler runs at most once per approval; a second approve of
    /// the same id fails with the recorded terminal state. An overdue
    /// approval expires instead and the expiry outcome is recorded.
    pub async fn approve(
        &self,
        approval_id: Uuid,
        resolver: &str,
        note: Option<String>,
    ) -> Result<DispatchOutcome, EngineError> {
        let approval = self.resolve_gate(approval_id, Decision::Approve, resolver, note)?;

        if !self.try_finalize(approval.id)? {
            return self
                .outcome(approval.task.id)
                .ok_or_else(|| GateError::Internal("outcome marker without record".to_string()).into());
        }
        Ok(self.run_handler(&approval.task).await)
    }

    /// Reject a pending request. The handler never runs; a REJECTED
    /// outcome is recorded for the task.
    pub async fn reject(
        &self,
        approval_id: Uuid,
        resolver: &str,
        note: Option<String>,
    ) -> Result<DispatchOutcome, EngineError> {
        let approval = self.resolve_gate(approval_id, Decision::Reject, resolver, note)?;

        if !self.try_finalize(approval.id)? {
            return self
                .outcome(approval.task.id)
                .ok_or_else(|| GateError::Internal("outcome marker without record".to_string()).into());
        }
        let detail = approval
            .resolution_note
            .clone()
            .unwrap_or_else(|| format!("rejected by {}", resolver));
        let outcome =
            DispatchOutcome::skipped(&approval.task, OutcomeKind::Rejected, Some(detail));
        self.record_outcome(outcome.clone());
        Ok(outcome)
    }

    /// Resolve through the gate, handling the force-expired path.
    fn resolve_gate(
        &self,
        approval_id: Uuid,
        decision: Decision,
        resolver: &str,
        note: Option<String>,
    ) -> Result<ApprovalRequest, EngineError> {
        match self.gate.resolve(approval_id, decision, resolver, note) {
            Ok(approval) => {
                self.audit_event(AuditEvent::GateResolved {
                    approval: approval.clone(),
                });
                self.notifier.gate_resolved(&approval);
                Ok(approval)
            }
            Err(GateError::DeadlinePassed(id)) => {
                if let Ok(snapshot) = self.gate.get(id) {
                    self.finalize_expiry(&snapshot);
                }
                Err(GateError::DeadlinePassed(id).into())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Expire every overdue approval and record its outcome. Driven by
    /// the background sweeper.
    pub fn sweep_expired(&self) -> usize {
        let expired = self.gate.expire_overdue();
        let count = expired.len();
        for approval in expired {
            self.finalize_expiry(&approval);
        }
        count
    }

    /// Pending approvals, newest first. Anything already overdue is
    /// finalized first, so the listing and the outcome records agree.
    pub fn pending(&self) -> Vec<ApprovalRequest> {
        self.sweep_expired();
        self.gate.list_pending()
    }

    /// Snapshot of one approval. An expiry observed here is finalized.
    pub fn status(&self, approval_id: Uuid) -> Result<ApprovalRequest, EngineError> {
        let approval = self.gate.get(approval_id)?;
        if approval.status == ApprovalStatus::Expired {
            self.finalize_expiry(&approval);
        }
        Ok(approval)
    }

    /// Terminal outcome for a task, if one is recorded.
    pub fn outcome(&self, task_id: Uuid) -> Option<DispatchOutcome> {
        self.outcomes.lock().ok()?.get(&task_id).cloned()
    }

    /// Operator-facing description of what approving a request would run.
    pub fn describe(&self, approval: &ApprovalRequest) -> Option<String> {
        self.dispatcher.describe(&approval.task)
    }

    /// Run the handler and record the outcome, mapping handler errors to
    /// a FAILURE record rather than propagating them.
    async fn run_handler(&self, task: &TaskRequest) -> DispatchOutcome {
        let outcome = match self.dispatcher.dispatch(task).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(task_id = %task.id, error = %e, "Dispatch failed");
                DispatchOutcome {
                    task_id: task.id,
                    capability: task.capability,
                    kind: OutcomeKind::Failure,
                    quality: None,
                    detail: Some(e.to_string()),
                    recorded_at: Timestamp::now(),
                }
            }
        };
        self.record_outcome(outcome.clone());
        outcome
    }

    /// Record the EXPIRED outcome for an approval exactly once.
    fn finalize_expiry(&self, approval: &ApprovalRequest) {
        match self.try_finalize(approval.id) {
            Ok(true) => {}
            _ => return,
        }
        self.audit_event(AuditEvent::GateExpired {
            approval: approval.clone(),
        });
        self.notifier.gate_resolved(approval);
        let outcome = DispatchOutcome::skipped(
            &approval.task,
            OutcomeKind::Expired,
            Some("approval deadline passed".to_string()),
        );
        self.record_outcome(outcome);
    }

    /// Atomically claim the right to record this approval's outcome.
    /// Returns false if it was already claimed.
    fn try_finalize(&self, approval_id: Uuid) -> Result<bool, GateError> {
        self.finalized
            .lock()
            .map(|mut set| set.insert(approval_id))
            .map_err(|e| GateError::Internal(format!("marker lock poisoned: {}", e)))
    }

    fn record_outcome(&self, outcome: DispatchOutcome) {
        self.audit_event(AuditEvent::OutcomeRecorded {
            outcome: outcome.clone(),
        });
        if let Ok(mut outcomes) = self.outcomes.lock() {
            outcomes.insert(outcome.task_id, outcome);
        }
    }

    fn audit_event(&self, event: AuditEvent) {
        if let Err(e) = self.audit.record(&event) {
            tracing::warn!(error = %e, "Audit append failed, trail may be incomplete");
        }
    }
}
