//! Risk assessment for classified task requests.
//!
//! Rules fire in a fixed order and only ever raise the tier:
//! capability base tier, then sensitive-keyword escalation, then
//! low-confidence escalation. Every fired rule is recorded as a reason.

use taskgate_core::Timestamp;

use crate::types::{Capability, RiskAssessment, RiskTier, TaskRequest};

/// Keywords that force the tier to HIGH (bilingual zh/en).
const HIGH_RISK_KEYWORDS: &[&str] = &[
    "刪除",
    "delete",
    "移除",
    "remove",
    "覆蓋",
    "overwrite",
    "生產",
    "production",
    "客戶資料",
    "customer data",
    "薪資",
    "salary",
    "payroll",
    "合約",
    "contract",
    "機密",
    "confidential",
    "解僱",
    "資遣",
    "termination",
    "terminate",
    "compensation",
    "legal",
    "法務",
];

/// Keywords that raise the tier to at least MEDIUM.
const MEDIUM_RISK_KEYWORDS: &[&str] = &[
    "修改",
    "modify",
    "update",
    "編輯",
    "edit",
    "變更",
    "change",
    "批次",
    "batch",
    "發佈",
    "publish",
    "deploy",
    "通知",
    "notify",
];

/// Deterministic risk assessor. No state beyond its rule table and the
/// configured confidence floor.
pub struct RiskAssessor {
    confidence_floor: f32,
}

impl RiskAssessor {
    pub fn new(confidence_floor: f32) -> Self {
        Self { confidence_floor }
    }

    /// Intrinsic tier of a capability before escalation. Unrecognized
    /// defaults to HIGH, never LOW.
    fn base_tier(capability: Option<Capability>) -> RiskTier {
        match capability {
            Some(Capability::KnowledgeExtraction) => RiskTier::Low,
            Some(Capability::ProcessOptimization) => RiskTier::Medium,
            Some(Capability::DecisionSupport) => RiskTier::Medium,
            Some(Capability::TalentDevelopment) => RiskTier::High,
            None => RiskTier::High,
        }
    }

    /// Assess a classified request. Never fails; always produces a tier
    /// and at least one reason.
    pub fn assess(&self, task: &TaskRequest) -> RiskAssessment {
        let mut reasons = Vec::new();

        let mut tier = Self::base_tier(task.capability);
        match task.capability {
            Some(cap) => reasons.push(format!("base tier {} for capability {}", tier, cap)),
            None => reasons.push("unrecognized capability defaults to HIGH".to_string()),
        }

        let text = task.text.to_lowercase();

        for kw in HIGH_RISK_KEYWORDS {
            if text.contains(kw) {
                tier = tier.max(RiskTier::High);
                reasons.push(format!("high-risk keyword matched: {}", kw));
            }
        }

        for kw in MEDIUM_RISK_KEYWORDS {
            if text.contains(kw) {
                tier = tier.max(RiskTier::Medium);
                reasons.push(format!("medium-risk keyword matched: {}", kw));
            }
        }

        if task.confidence < self.confidence_floor {
            tier = tier.escalate();
            reasons.push(format!(
                "classification confidence {:.2} below floor {:.2}",
                task.confidence, self.confidence_floor
            ));
        }

        RiskAssessment {
            tier,
            reasons,
            assessed_at: Timestamp::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn task(text: &str, capability: Option<Capability>, confidence: f32) -> TaskRequest {
        TaskRequest {
            id: Uuid::new_v4(),
            text: text.to_string(),
            submitted_at: Timestamp::now(),
            requester: "tester".to_string(),
            capability,
            confidence,
        }
    }

    fn assessor() -> RiskAssessor {
        RiskAssessor::new(0.25)
    }

    #[test]
    fn test_base_tiers() {
        let a = assessor();
        assert_eq!(
            a.assess(&task("盤點文件", Some(Capability::KnowledgeExtraction), 0.3))
                .tier,
            RiskTier::Low
        );
        assert_eq!(
            a.assess(&task("優化出貨流程", Some(Capability::ProcessOptimization), 0.3))
                .tier,
            RiskTier::Medium
        );
        assert_eq!(
            a.assess(&task("比較方案", Some(Capability::DecisionSupport), 0.3))
                .tier,
            RiskTier::Medium
        );
        assert_eq!(
            a.assess(&task("培訓計畫", Some(Capability::TalentDevelopment), 0.3))
                .tier,
            RiskTier::High
        );
    }

    #[test]
    fn test_unrecognized_defaults_to_high() {
        let assessment = assessor().assess(&task("幫我訂便當", None, 0.9));
        assert_eq!(assessment.tier, RiskTier::High);
        assert_eq!(
            assessment.reasons[0],
            "unrecognized capability defaults to HIGH"
        );
    }

    #[test]
    fn test_high_keyword_escalates_low_capability() {
        // Nominally LOW capability, but a personnel-termination keyword
        // forces HIGH and records the triggering reason.
        let assessment = assessor().assess(&task(
            "整理解僱文件",
            Some(Capability::KnowledgeExtraction),
            0.3,
        ));
        assert_eq!(assessment.tier, RiskTier::High);
        assert!(assessment
            .reasons
            .iter()
            .any(|r| r == "high-risk keyword matched: 解僱"));
    }

    #[test]
    fn test_medium_keyword_escalates_low_capability() {
        let assessment = assessor().assess(&task(
            "modify the knowledge document",
            Some(Capability::KnowledgeExtraction),
            0.3,
        ));
        assert_eq!(assessment.tier, RiskTier::Medium);
        assert!(assessment
            .reasons
            .iter()
            .any(|r| r == "medium-risk keyword matched: modify"));
    }

    #[test]
    fn test_keywords_never_lower_tier() {
        // MEDIUM keyword on a HIGH-tier capability stays HIGH.
        let assessment = assessor().assess(&task(
            "update the talent plan",
            Some(Capability::TalentDevelopment),
            0.3,
        ));
        assert_eq!(assessment.tier, RiskTier::High);
    }

    #[test]
    fn test_low_confidence_escalates_one_tier() {
        let assessment = assessor().assess(&task(
            "盤點文件",
            Some(Capability::KnowledgeExtraction),
            0.1,
        ));
        assert_eq!(assessment.tier, RiskTier::Medium);
        assert!(assessment
            .reasons
            .iter()
            .any(|r| r.contains("below floor")));
    }

    #[test]
    fn test_low_confidence_capped_at_high() {
        let assessment = assessor().assess(&task(
            "培訓計畫",
            Some(Capability::TalentDevelopment),
            0.0,
        ));
        assert_eq!(assessment.tier, RiskTier::High);
    }

    #[test]
    fn test_keyword_confidence_does_not_self_escalate() {
        // The keyword fallback's fixed 0.3 sits above the default floor.
        let assessment = assessor().assess(&task(
            "優化出貨流程",
            Some(Capability::ProcessOptimization),
            0.3,
        ));
        assert_eq!(assessment.tier, RiskTier::Medium);
        assert_eq!(assessment.reasons.len(), 1);
    }

    #[test]
    fn test_monotonic_under_added_keyword() {
        let a = assessor();
        let without = a.assess(&task(
            "盤點文件",
            Some(Capability::KnowledgeExtraction),
            0.3,
        ));
        let with = a.assess(&task(
            "盤點機密文件",
            Some(Capability::KnowledgeExtraction),
            0.3,
        ));
        assert!(with.tier >= without.tier);
        assert_eq!(with.tier, RiskTier::High);
    }

    #[test]
    fn test_reasons_in_evaluation_order() {
        let assessment = assessor().assess(&task(
            "delete and update the payroll document",
            Some(Capability::KnowledgeExtraction),
            0.1,
        ));
        assert_eq!(assessment.tier, RiskTier::High);
        // base, high keywords (list order), medium keywords, confidence.
        assert!(assessment.reasons[0].starts_with("base tier LOW"));
        let delete_pos = assessment
            .reasons
            .iter()
            .position(|r| r.contains("delete"))
            .unwrap();
        let payroll_pos = assessment
            .reasons
            .iter()
            .position(|r| r.contains("payroll"))
            .unwrap();
        let update_pos = assessment
            .reasons
            .iter()
            .position(|r| r.contains("update"))
            .unwrap();
        let conf_pos = assessment
            .reasons
            .iter()
            .position(|r| r.contains("below floor"))
            .unwrap();
        assert!(delete_pos < payroll_pos);
        assert!(payroll_pos < update_pos);
        assert!(update_pos < conf_pos);
    }

    #[test]
    fn test_deterministic_for_identical_inputs() {
        let a = assessor();
        let t = task("刪除生產資料", Some(Capability::DecisionSupport), 0.8);
        let first = a.assess(&t);
        let second = a.assess(&t);
        assert_eq!(first.tier, second.tier);
        assert_eq!(first.reasons, second.reasons);
    }

    #[test]
    fn test_keyword_match_case_insensitive() {
        let assessment = assessor().assess(&task(
            "DELETE the staging snapshot",
            Some(Capability::KnowledgeExtraction),
            0.3,
        ));
        assert_eq!(assessment.tier, RiskTier::High);
    }
}
