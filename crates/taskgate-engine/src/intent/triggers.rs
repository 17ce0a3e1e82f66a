//! Capability trigger-word tables for the deterministic keyword fallback.
//!
//! Each capability carries a bilingual (zh/en) trigger list. Matching is
//! case-insensitive substring containment; the longest contained trigger
//! wins, with ties broken by capability declaration order.

use crate::types::Capability;

/// Trigger words for a single capability, in declaration order.
struct TriggerEntry {
    capability: Capability,
    triggers: &'static [&'static str],
}

/// A winning trigger match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerMatch {
    pub capability: Capability,
    pub trigger: &'static str,
}

/// The full trigger table, built once and reused.
pub struct TriggerTable {
    entries: Vec<TriggerEntry>,
}

impl Default for TriggerTable {
    fn default() -> Self {
        Self::new()
    }
}

impl TriggerTable {
    pub fn new() -> Self {
        let entries = vec![
            TriggerEntry {
                capability: Capability::KnowledgeExtraction,
                triggers: &[
                    "萃取", "sop", "文件", "知識", "整理", "盤點", "知識卡片", "隱性知識",
                    "結構化", "extract", "knowledge", "document", "organize",
                ],
            },
            TriggerEntry {
                capability: Capability::ProcessOptimization,
                triggers: &[
                    "流程", "優化", "效率", "瓶頸", "改善", "自動化", "再造", "重組",
                    "process", "optimize", "bottleneck", "efficiency",
                ],
            },
            TriggerEntry {
                capability: Capability::TalentDevelopment,
                triggers: &[
                    "人才", "培訓", "能力", "學習", "評估", "職能", "圖譜", "發展", "接班",
                    "talent", "skill", "training", "learning", "competency",
                ],
            },
            TriggerEntry {
                capability: Capability::DecisionSupport,
                triggers: &[
                    "決策", "分析", "風險", "比較", "數據", "方案", "建議", "decision",
                    "analyze", "compare", "data",
                ],
            },
        ];
        Self { entries }
    }

    /// Find the most specific trigger contained in `text`.
    ///
    /// Longest trigger (in characters) wins; on equal length the capability
    /// declared first wins. Matching is done on the lowercased text, all
    /// triggers are stored lowercase.
    pub fn best_match(&self, text: &str) -> Option<TriggerMatch> {
        let haystack = text.to_lowercase();
        let mut best: Option<(TriggerMatch, usize)> = None;

        for entry in &self.entries {
            for trigger in entry.triggers {
                if !haystack.contains(trigger) {
                    continue;
                }
                let len = trigger.chars().count();
                let better = match best {
                    Some((_, best_len)) => len > best_len,
                    None => true,
                };
                if better {
                    best = Some((
                        TriggerMatch {
                            capability: entry.capability,
                            trigger,
                        },
                        len,
                    ));
                }
            }
        }

        best.map(|(m, _)| m)
    }
}
