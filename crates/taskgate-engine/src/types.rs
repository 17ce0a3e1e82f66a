//! Core types and value objects for the orchestration engine.
//!
//! Defines capabilities, risk tiers, approval requests, and dispatch
//! outcomes together with their supporting enumerations.

use serde::{Deserialize, Serialize};
use std::fmt;
use taskgate_core::Timestamp;
use uuid::Uuid;

// =============================================================================
// Enums
// =============================================================================

/// Statically known capability names a request can be routed to.
///
/// Declaration order matters: classification tie-breaks follow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    KnowledgeExtraction,
    ProcessOptimization,
    TalentDevelopment,
    DecisionSupport,
}

impl Capability {
    /// All capabilities in declaration order.
    pub const ALL: [Capability; 4] = [
        Capability::KnowledgeExtraction,
        Capability::ProcessOptimization,
        Capability::TalentDevelopment,
        Capability::DecisionSupport,
    ];
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::KnowledgeExtraction => write!(f, "knowledge_extraction"),
            Capability::ProcessOptimization => write!(f, "process_optimization"),
            Capability::TalentDevelopment => write!(f, "talent_development"),
            Capability::DecisionSupport => write!(f, "decision_support"),
        }
    }
}

impl std::str::FromStr for Capability {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "knowledge_extraction" => Ok(Capability::KnowledgeExtraction),
            "process_optimization" => Ok(Capability::ProcessOptimization),
            "talent_development" => Ok(Capability::TalentDevelopment),
            "decision_support" => Ok(Capability::DecisionSupport),
            _ => Err(format!("Unknown capability: {}", s)),
        }
    }
}

/// Risk classification governing whether human approval is required.
///
/// Ordered so escalation rules can take `max`: LOW < MEDIUM < HIGH.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    /// One step up, capped at HIGH.
    pub fn escalate(self) -> Self {
        match self {
            RiskTier::Low => RiskTier::Medium,
            RiskTier::Medium | RiskTier::High => RiskTier::High,
        }
    }

    /// MEDIUM and HIGH suspend dispatch behind the approval gate.
    pub fn requires_approval(self) -> bool {
        self >= RiskTier::Medium
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskTier::Low => write!(f, "LOW"),
            RiskTier::Medium => write!(f, "MEDIUM"),
            RiskTier::High => write!(f, "HIGH"),
        }
    }
}

impl std::str::FromStr for RiskTier {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOW" => Ok(RiskTier::Low),
            "MEDIUM" => Ok(RiskTier::Medium),
            "HIGH" => Ok(RiskTier::High),
            _ => Err(format!("Unknown risk tier: {}", s)),
        }
    }
}

/// Approval lifecycle states. PENDING is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
    Expired,
}

impl ApprovalStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, ApprovalStatus::Pending)
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApprovalStatus::Pending => write!(f, "PENDING"),
            ApprovalStatus::Approved => write!(f, "APPROVED"),
            ApprovalStatus::Rejected => write!(f, "REJECTED"),
            ApprovalStatus::Expired => write!(f, "EXPIRED"),
        }
    }
}

impl std::str::FromStr for ApprovalStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(ApprovalStatus::Pending),
            "APPROVED" => Ok(ApprovalStatus::Approved),
            "REJECTED" => Ok(ApprovalStatus::Rejected),
            "EXPIRED" => Ok(ApprovalStatus::Expired),
            _ => Err(format!("Unknown approval status: {}", s)),
        }
    }
}

/// Operator verb for resolving a pending approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    /// The terminal status this decision records.
    pub fn terminal_status(self) -> ApprovalStatus {
        match self {
            Decision::Approve => ApprovalStatus::Approved,
            Decision::Reject => ApprovalStatus::Rejected,
        }
    }
}

/// How a task request ultimately ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeKind {
    Success,
    Failure,
    Rejected,
    Expired,
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutcomeKind::Success => write!(f, "SUCCESS"),
            OutcomeKind::Failure => write!(f, "FAILURE"),
            OutcomeKind::Rejected => write!(f, "REJECTED"),
            OutcomeKind::Expired => write!(f, "EXPIRED"),
        }
    }
}

// =============================================================================
// Domain Structs
// =============================================================================

/// A classified task request. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRequest {
    pub id: Uuid,
    pub text: String,
    pub submitted_at: Timestamp,
    pub requester: String,
    /// `None` means the classifier could not map the text to any known
    /// capability ("unrecognized").
    pub capability: Option<Capability>,
    pub confidence: f32,
}

/// Risk verdict attached 1:1 to a task request. Never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub tier: RiskTier,
    /// Every rule that fired, in evaluation order.
    pub reasons: Vec<String>,
    pub assessed_at: Timestamp,
}

/// A gated approval awaiting (or holding) a human resolution.
///
/// Mutated exactly once: the winning resolution or the expiry sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalRequest {
    pub id: Uuid,
    pub task: TaskRequest,
    pub assessment: RiskAssessment,
    pub created_at: Timestamp,
    pub deadline: Timestamp,
    pub status: ApprovalStatus,
    pub resolved_by: Option<String>,
    pub resolution_note: Option<String>,
    pub resolved_at: Option<Timestamp>,
}

/// Result returned by a capability handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandlerOutput {
    pub message: String,
    /// Self-reported output quality in 0.0..=1.0, if the handler scores it.
    pub quality: Option<f32>,
}

/// Terminal record tying a task request to how it ended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchOutcome {
    pub task_id: Uuid,
    pub capability: Option<Capability>,
    pub kind: OutcomeKind,
    pub quality: Option<f32>,
    /// Handler message on success, failure reason on FAILURE, resolution
    /// note on REJECTED/EXPIRED.
    pub detail: Option<String>,
    pub recorded_at: Timestamp,
}

impl DispatchOutcome {
    /// A skip record for a request that never reached its handler.
    pub fn skipped(task: &TaskRequest, kind: OutcomeKind, detail: Option<String>) -> Self {
        Self {
            task_id: task.id,
            capability: task.capability,
            kind,
            quality: None,
            detail,
            recorded_at: Timestamp::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---- Capability ----

    #[test]
    fn test_capability_display() {
        assert_eq!(
            Capability::KnowledgeExtraction.to_string(),
            "knowledge_extraction"
        );
        assert_eq!(
            Capability::ProcessOptimization.to_string(),
            "process_optimization"
        );
        assert_eq!(
            Capability::TalentDevelopment.to_string(),
            "talent_development"
        );
        assert_eq!(Capability::DecisionSupport.to_string(), "decision_support");
    }

    #[test]
    fn test_capability_from_str() {
        for cap in Capability::ALL {
            let parsed: Capability = cap.to_string().parse().unwrap();
            assert_eq!(cap, parsed);
        }
        assert!("invalid".parse::<Capability>().is_err());
        assert!("".parse::<Capability>().is_err());
    }

    #[test]
    fn test_capability_from_str_error_message() {
        let err = "bogus".parse::<Capability>().unwrap_err();
        assert_eq!(err, "Unknown capability: bogus");
    }

    #[test]
    fn test_capability_as_map_key() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(Capability::TalentDevelopment, "sensitive");
        assert_eq!(map.get(&Capability::TalentDevelopment), Some(&"sensitive"));
        assert_eq!(map.get(&Capability::DecisionSupport), None);
    }

    #[test]
    fn test_capability_serde_json_format() {
        assert_eq!(
            serde_json::to_string(&Capability::ProcessOptimization).unwrap(),
            "\"process_optimization\""
        );
    }

    // ---- RiskTier ----

    #[test]
    fn test_risk_tier_ordering() {
        assert!(RiskTier::Low < RiskTier::Medium);
        assert!(RiskTier::Medium < RiskTier::High);
        assert_eq!(
            RiskTier::Low.max(RiskTier::High.min(RiskTier::Medium)),
            RiskTier::Medium
        );
    }

    #[test]
    fn test_risk_tier_escalate() {
        assert_eq!(RiskTier::Low.escalate(), RiskTier::Medium);
        assert_eq!(RiskTier::Medium.escalate(), RiskTier::High);
        assert_eq!(RiskTier::High.escalate(), RiskTier::High);
    }

    #[test]
    fn test_risk_tier_requires_approval() {
        assert!(!RiskTier::Low.requires_approval());
        assert!(RiskTier::Medium.requires_approval());
        assert!(RiskTier::High.requires_approval());
    }

    #[test]
    fn test_risk_tier_display_from_str_round_trip() {
        for tier in [RiskTier::Low, RiskTier::Medium, RiskTier::High] {
            let parsed: RiskTier = tier.to_string().parse().unwrap();
            assert_eq!(tier, parsed);
        }
        assert!("low".parse::<RiskTier>().is_err(), "case sensitive");
    }

    #[test]
    fn test_risk_tier_serde_json_format() {
        assert_eq!(serde_json::to_string(&RiskTier::High).unwrap(), "\"HIGH\"");
        assert_eq!(
            serde_json::to_string(&RiskTier::Medium).unwrap(),
            "\"MEDIUM\""
        );
    }

    // ---- ApprovalStatus ----

    #[test]
    fn test_approval_status_terminal() {
        assert!(!ApprovalStatus::Pending.is_terminal());
        assert!(ApprovalStatus::Approved.is_terminal());
        assert!(ApprovalStatus::Rejected.is_terminal());
        assert!(ApprovalStatus::Expired.is_terminal());
    }

    #[test]
    fn test_approval_status_display_from_str_round_trip() {
        for status in [
            ApprovalStatus::Pending,
            ApprovalStatus::Approved,
            ApprovalStatus::Rejected,
            ApprovalStatus::Expired,
        ] {
            let parsed: ApprovalStatus = status.to_string().parse().unwrap();
            assert_eq!(status, parsed);
        }
        assert!("pending".parse::<ApprovalStatus>().is_err());
    }

    #[test]
    fn test_approval_status_serde_json_format() {
        assert_eq!(
            serde_json::to_string(&ApprovalStatus::Pending).unwrap(),
            "\"PENDING\""
        );
        assert_eq!(
            serde_json::to_string(&ApprovalStatus::Expired).unwrap(),
            "\"EXPIRED\""
        );
    }

    // ---- Decision ----

    #[test]
    fn test_decision_terminal_status() {
        assert_eq!(Decision::Approve.terminal_status(), ApprovalStatus::Approved);
        assert_eq!(Decision::Reject.terminal_status(), ApprovalStatus::Rejected);
    }

    // ---- OutcomeKind ----

    #[test]
    fn test_outcome_kind_display() {
        assert_eq!(OutcomeKind::Success.to_string(), "SUCCESS");
        assert_eq!(OutcomeKind::Failure.to_string(), "FAILURE");
        assert_eq!(OutcomeKind::Rejected.to_string(), "REJECTED");
        assert_eq!(OutcomeKind::Expired.to_string(), "EXPIRED");
    }

    // ---- Domain structs ----

    fn sample_task() -> TaskRequest {
        TaskRequest {
            id: Uuid::new_v4(),
            text: "優化出貨流程".to_string(),
            submitted_at: Timestamp::now(),
            requester: "operator".to_string(),
            capability: Some(Capability::ProcessOptimization),
            confidence: 0.3,
        }
    }

    #[test]
    fn test_task_request_serde_round_trip() {
        let task = sample_task();
        let json = serde_json::to_string(&task).unwrap();
        let rt: TaskRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(rt.id, task.id);
        assert_eq!(rt.text, task.text);
        assert_eq!(rt.capability, task.capability);
        assert!((rt.confidence - task.confidence).abs() < f32::EPSILON);
    }

    #[test]
    fn test_task_request_unrecognized_capability() {
        let mut task = sample_task();
        task.capability = None;
        let json = serde_json::to_string(&task).unwrap();
        let rt: TaskRequest = serde_json::from_str(&json).unwrap();
        assert!(rt.capability.is_none());
    }

    #[test]
    fn test_approval_request_serde_round_trip() {
        let task = sample_task();
        let req = ApprovalRequest {
            id: Uuid::new_v4(),
            task,
            assessment: RiskAssessment {
                tier: RiskTier::Medium,
                reasons: vec!["base tier MEDIUM".to_string()],
                assessed_at: Timestamp::now(),
            },
            created_at: Timestamp::now(),
            deadline: Timestamp::now().plus_secs(300),
            status: ApprovalStatus::Pending,
            resolved_by: None,
            resolution_note: None,
            resolved_at: None,
        };
        let json = serde_json::to_string(&req).unwrap();
        let rt: ApprovalRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(rt.id, req.id);
        assert_eq!(rt.status, ApprovalStatus::Pending);
        assert_eq!(rt.assessment.tier, RiskTier::Medium);
        assert!(rt.resolved_by.is_none());
    }

    #[test]
    fn test_dispatch_outcome_skipped() {
        let task = sample_task();
        let outcome =
            DispatchOutcome::skipped(&task, OutcomeKind::Rejected, Some("denied".to_string()));
        assert_eq!(outcome.task_id, task.id);
        assert_eq!(outcome.kind, OutcomeKind::Rejected);
        assert_eq!(outcome.capability, task.capability);
        assert!(outcome.quality.is_none());
        assert_eq!(outcome.detail.as_deref(), Some("denied"));
    }

    #[test]
    fn test_handler_output_serde() {
        let out = HandlerOutput {
            message: "report ready".to_string(),
            quality: Some(0.8),
        };
        let json = serde_json::to_string(&out).unwrap();
        let rt: HandlerOutput = serde_json::from_str(&json).unwrap();
        assert_eq!(rt.message, "report ready");
        assert!((rt.quality.unwrap() - 0.8).abs() < f32::EPSILON);
    }
}
