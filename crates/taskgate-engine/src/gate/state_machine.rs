//! Approval state machine with validated transitions.
//!
//! Enforces the one-way lifecycle: PENDING is the only non-terminal state,
//! and APPROVED, REJECTED, EXPIRED are terminal and never revisited.

use crate::error::GateError;
use crate::types::ApprovalStatus;

/// Validate that a status transition is allowed.
///
/// Valid transitions:
/// - Pending -> Approved
/// - Pending -> Rejected
/// - Pending -> Expired
pub fn validate_transition(from: ApprovalStatus, to: ApprovalStatus) -> Result<(), GateError> {
    let valid = matches!(
        (from, to),
        (ApprovalStatus::Pending, ApprovalStatus::Approved)
            | (ApprovalStatus::Pending, ApprovalStatus::Rejected)
            | (ApprovalStatus::Pending, ApprovalStatus::Expired)
    );

    if valid {
        Ok(())
    } else {
        Err(GateError::InvalidTransition(from, to))
    }
}
