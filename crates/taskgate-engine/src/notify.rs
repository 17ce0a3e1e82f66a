//! Approval notifications.
//!
//! Fire-and-forget delivery of gate events to Slack and generic HTTP
//! webhooks. Delivery failures are logged and dropped; the gate never
//! waits on a notifier.

use std::time::Duration;

use serde_json::json;
use taskgate_core::config::NotifyConfig;

use crate::types::{ApprovalRequest, ApprovalStatus};

/// Receives gate lifecycle events.
pub trait Notifier: Send + Sync {
    /// A new approval request is waiting for a decision.
    fn gate_opened(&self, approval: &ApprovalRequest);

    /// An approval request reached a terminal state.
    fn gate_resolved(&self, approval: &ApprovalRequest);
}

/// Notifier that drops everything.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn gate_opened(&self, _approval: &ApprovalRequest) {}
    fn gate_resolved(&self, _approval: &ApprovalRequest) {}
}

/// Posts gate events to a Slack incoming webhook and/or a generic HTTP
/// endpoint. Requests run on spawned tasks with a short timeout.
pub struct WebhookNotifier {
    client: reqwest::Client,
    slack_url: Option<String>,
    webhook_url: Option<String>,
}

impl WebhookNotifier {
    pub fn new(config: &NotifyConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(5))
                .build()
                .unwrap_or_default(),
            slack_url: config.slack_webhook_url.clone(),
            webhook_url: config.webhook_url.clone(),
        }
    }

    /// True when at least one destination is configured.
    pub fn is_configured(&self) -> bool {
        self.slack_url.is_some() || self.webhook_url.is_some()
    }

    fn post(&self, url: &str, payload: serde_json::Value) {
        let client = self.client.clone();
        let url = url.to_string();
        tokio::spawn(async move {
            match client.post(&url).json(&payload).send().await {
                Ok(resp) if resp.status().is_success() => {}
                Ok(resp) => {
                    tracing::warn!(url, status = %resp.status(), "Webhook delivery rejected");
                }
                Err(e) => {
                    tracing::warn!(url, error = %e, "Webhook delivery failed");
                }
            }
        });
    }

    fn truncate(text: &str, max_chars: usize) -> String {
        text.chars().take(max_chars).collect()
    }

    fn capability_label(approval: &ApprovalRequest) -> String {
        approval
            .task
            .capability
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string())
    }

    /// Slack message for a newly opened gate. Carries the capability,
    /// risk tier and reasons, and the concrete deadline.
    fn open_slack_text(approval: &ApprovalRequest) -> String {
        format!(
            "⏳ *審批請求* | 風險等級: `{}`\n*能力*: {}\n*任務*: {}\n*原因*: {}\n*ID*: `{}`\n*期限*: {}\n請於期限前審批。",
            approval.assessment.tier,
            Self::capability_label(approval),
            Self::truncate(&approval.task.text, 200),
            approval.assessment.reasons.join("; "),
            approval.id,
            approval.deadline.to_datetime(),
        )
    }

    fn open_payload(approval: &ApprovalRequest) -> serde_json::Value {
        json!({
            "event": "approval_required",
            "approval_id": approval.id,
            "task_id": approval.task.id,
            "task": approval.task.text,
            "requester": approval.task.requester,
            "capability": approval.task.capability,
            "risk_tier": approval.assessment.tier,
            "risk_reasons": approval.assessment.reasons,
            "created_at": approval.created_at,
            "deadline": approval.deadline,
        })
    }
}

impl Notifier for WebhookNotifier {
    fn gate_opened(&self, approval: &ApprovalRequest) {
        if let Some(url) = &self.slack_url {
            self.post(url, json!({ "text": Self::open_slack_text(approval) }));
        }
        if let Some(url) = &self.webhook_url {
            self.post(url, Self::open_payload(approval));
        }
    }

    fn gate_resolved(&self, approval: &ApprovalRequest) {
        if let Some(url) = &self.slack_url {
            let icon = match approval.status {
                ApprovalStatus::Approved => "✅",
                ApprovalStatus::Rejected => "❌",
                _ => "⌛",
            };
            let text = format!(
                "{} *審批完成* | {}\n*ID*: `{}`\n*審批人*: {}",
                icon,
                approval.status,
                approval.id,
                approval.resolved_by.as_deref().unwrap_or("-"),
            );
            self.post(url, json!({ "text": text }));
        }
        if let Some(url) = &self.webhook_url {
            self.post(
                url,
                json!({
                    "event": "approval_resolved",
                    "approval_id": approval.id,
                    "task_id": approval.task.id,
                    "status": approval.status,
                    "resolved_by": approval.resolved_by,
                    "resolution_note": approval.resolution_note,
                    "resolved_at": approval.resolved_at,
                }),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Capability, RiskAssessment, RiskTier, TaskRequest};
    use taskgate_core::Timestamp;
    use uuid::Uuid;

    fn approval() -> ApprovalRequest {
        let now = Timestamp::now();
        ApprovalRequest {
            id: Uuid::new_v4(),
            task: TaskRequest {
                id: Uuid::new_v4(),
                text: "優化出貨流程".to_string(),
                submitted_at: now,
                requester: "ops".to_string(),
                capability: Some(Capability::ProcessOptimization),
                confidence: 0.3,
            },
            assessment: RiskAssessment {
                tier: RiskTier::Medium,
                reasons: vec!["process_optimization 基準風險 MEDIUM".to_string()],
                assessed_at: now,
            },
            created_at: now,
            deadline: now.plus_secs(3600),
            status: ApprovalStatus::Pending,
            resolved_by: None,
            resolution_note: None,
            resolved_at: None,
        }
    }

    #[test]
    fn test_open_slack_text_names_capability_and_deadline() {
        let approval = approval();
        let text = WebhookNotifier::open_slack_text(&approval);
        assert!(text.contains("process_optimization"));
        assert!(text.contains("MEDIUM"));
        assert!(text.contains(&approval.assessment.reasons[0]));
        assert!(text.contains(&approval.deadline.to_datetime().to_string()));
    }

    #[test]
    fn test_open_payload_carries_capability_and_deadline() {
        let approval = approval();
        let payload = WebhookNotifier::open_payload(&approval);
        assert_eq!(payload["event"], "approval_required");
        assert_eq!(payload["capability"], "process_optimization");
        assert_eq!(payload["risk_tier"], "MEDIUM");
        assert_eq!(payload["deadline"], approval.deadline.0);
        assert!(payload["risk_reasons"].is_array());
    }

    #[test]
    fn test_unconfigured_notifier() {
        let notifier = WebhookNotifier::new(&NotifyConfig::default());
        assert!(!notifier.is_configured());
    }

    #[test]
    fn test_configured_with_either_url() {
        let slack_only = NotifyConfig {
            slack_webhook_url: Some("https://hooks.slack.example/T000".to_string()),
            webhook_url: None,
        };
        assert!(WebhookNotifier::new(&slack_only).is_configured());

        let generic_only = NotifyConfig {
            slack_webhook_url: None,
            webhook_url: Some("https://ops.example/hitl".to_string()),
        };
        assert!(WebhookNotifier::new(&generic_only).is_configured());
    }

    #[test]
    fn test_truncate_counts_chars() {
        let long = "知".repeat(300);
        assert_eq!(WebhookNotifier::truncate(&long, 200).chars().count(), 200);
        assert_eq!(WebhookNotifier::truncate("short", 200), "short");
    }
}
