//! Risk-gated orchestration engine.
//!
//! Classifies natural-language task requests into capabilities, assesses
//! their risk, holds MEDIUM and HIGH risk work behind a human approval
//! gate with deadlines, and dispatches approved work at most once while
//! writing an append-only audit trail.

pub mod audit;
pub mod dispatch;
pub mod error;
pub mod eval;
pub mod gate;
pub mod handler;
pub mod intent;
pub mod notify;
pub mod orchestrator;
pub mod risk;
pub mod sweeper;
pub mod types;

pub use audit::{AuditEvent, AuditSink, FileAuditLog, MemoryAuditLog};
pub use dispatch::Dispatcher;
pub use error::{DispatchError, EngineError, GateError};
pub use gate::{ApprovalGate, GateTimeouts};
pub use handler::{CapabilityHandler, CapabilityRegistry};
pub use intent::{Classification, IntentClassifier, SemanticClassifier};
pub use notify::{Notifier, NullNotifier, WebhookNotifier};
pub use orchestrator::{Orchestrator, PendingHandle, Submission};
pub use risk::RiskAssessor;
pub use sweeper::ExpirySweeper;
pub use types::{
    ApprovalRequest, ApprovalStatus, Capability, Decision, DispatchOutcome, HandlerOutput,
    OutcomeKind, RiskAssessment, RiskTier, TaskRequest,
};
