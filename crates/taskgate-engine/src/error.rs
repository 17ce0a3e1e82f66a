//! Error types for the orchestration engine.

use crate::types::{ApprovalStatus, Capability};
use uuid::Uuid;

/// Errors from the approval gate.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error("Approval request not found: {0}")]
    NotFound(Uuid),
    #[error("Task already has an approval request: {0}")]
    AlreadyOpen(Uuid),
    /// Stale resolution: the entry reached a terminal state before this
    /// attempt. Carries the recorded state so callers can reconcile
    /// without double-processing.
    #[error("Approval {id} already resolved: {status}")]
    AlreadyResolved { id: Uuid, status: ApprovalStatus },
    /// The deadline passed before any resolution; the entry is now EXPIRED.
    #[error("Approval {0} deadline passed; request expired")]
    DeadlinePassed(Uuid),
    #[error("Invalid status transition: {0} -> {1}")]
    InvalidTransition(ApprovalStatus, ApprovalStatus),
    #[error("Gate internal error: {0}")]
    Internal(String),
}

/// Errors from capability dispatch.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The capability has no registered handler. A deployment
    /// misconfiguration, not a business failure.
    #[error("No handler registered for capability: {0}")]
    UnknownCapability(Capability),
    #[error("Task {0} has no classified capability")]
    Unclassified(Uuid),
    #[error("Handler failed: {0}")]
    HandlerFailed(String),
    #[error("Handler timed out after {0} seconds")]
    Timeout(u64),
}

/// Errors surfaced by the orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// No known capability matched the request text.
    #[error("Cannot route request: no capability matched \"{0}\"")]
    CannotRoute(String),
    #[error(transparent)]
    Gate(#[from] GateError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_error_display() {
        let id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        assert_eq!(
            GateError::NotFound(id).to_string(),
            "Approval request not found: 550e8400-e29b-41d4-a716-446655440000"
        );
        assert_eq!(
            GateError::AlreadyResolved {
                id,
                status: ApprovalStatus::Rejected
            }
            .to_string(),
            "Approval 550e8400-e29b-41d4-a716-446655440000 already resolved: REJECTED"
        );
        assert!(GateError::DeadlinePassed(id)
            .to_string()
            .contains("deadline passed"));
        assert_eq!(
            GateError::InvalidTransition(ApprovalStatus::Approved, ApprovalStatus::Pending)
                .to_string(),
            "Invalid status transition: APPROVED -> PENDING"
        );
    }

    #[test]
    fn test_already_resolved_carries_terminal_state() {
        let err = GateError::AlreadyResolved {
            id: Uuid::new_v4(),
            status: ApprovalStatus::Approved,
        };
        match err {
            GateError::AlreadyResolved { status, .. } => {
                assert_eq!(status, ApprovalStatus::Approved)
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn test_dispatch_error_display() {
        let err = DispatchError::UnknownCapability(Capability::DecisionSupport);
        assert_eq!(
            err.to_string(),
            "No handler registered for capability: decision_support"
        );
        assert_eq!(
            DispatchError::Timeout(30).to_string(),
            "Handler timed out after 30 seconds"
        );
        assert_eq!(
            DispatchError::HandlerFailed("boom".to_string()).to_string(),
            "Handler failed: boom"
        );
    }

    #[test]
    fn test_engine_error_from_gate() {
        let err: EngineError = GateError::NotFound(Uuid::new_v4()).into();
        assert!(matches!(err, EngineError::Gate(GateError::NotFound(_))));
    }

    #[test]
    fn test_engine_error_from_dispatch() {
        let err: EngineError =
            DispatchError::UnknownCapability(Capability::KnowledgeExtraction).into();
        assert!(matches!(
            err,
            EngineError::Dispatch(DispatchError::UnknownCapability(_))
        ));
    }

    #[test]
    fn test_cannot_route_display() {
        let err = EngineError::CannotRoute("幫我訂便當".to_string());
        assert!(err.to_string().starts_with("Cannot route request"));
        assert!(err.to_string().contains("幫我訂便當"));
    }
}
