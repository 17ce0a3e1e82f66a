//! Talent development handler.
//!
//! Produces a skill-gap analysis with a phased learning path and a
//! talent risk note.

use async_trait::async_trait;

use crate::error::DispatchError;
use crate::handler::{extract_topic, CapabilityHandler};
use crate::types::{Capability, HandlerOutput, TaskRequest};

const TOPIC_PREFIXES: &[&str] = &[
    "請幫我評估",
    "幫我評估",
    "請評估",
    "評估",
    "請分析",
    "分析",
    "培訓",
];

pub struct TalentHandler;

#[async_trait]
impl CapabilityHandler for TalentHandler {
    fn capability(&self) -> Capability {
        Capability::TalentDevelopment
    }

    fn describe(&self, task: &TaskRequest) -> String {
        format!(
            "Produce a talent development analysis for: {}",
            extract_topic(&task.text, TOPIC_PREFIXES)
        )
    }

    async fn handle(&self, task: &TaskRequest) -> Result<HandlerOutput, DispatchError> {
        let topic = extract_topic(&task.text, TOPIC_PREFIXES);
        tracing::info!(task_id = %task.id, topic, "Generating talent development analysis");

        let message = format!(
            "# 人才發展分析報告: {topic}\n\
             \n\
             ## 能力差距分析\n\
             - 專業技能: 要求 L4 / 目前 L3, 差距 1 級\n\
             - 跨部門協作: 要求 L3 / 目前 L2, 差距 1 級\n\
             - 數據解讀: 要求 L3 / 目前 L1, 差距 2 級\n\
             - 流程知識: 要求 L4 / 目前 L3, 差距 1 級\n\
             - 指導他人: 要求 L2 / 目前 L1, 差距 1 級\n\
             \n\
             ## 學習路徑\n\
             - Phase 1 (1-4 週): 數據解讀基礎課程與每週實作練習\n\
             - Phase 2 (5-8 週): 跨部門輪調見習, 搭配導師回饋\n\
             - Phase 3 (9-12 週): 獨立負責一項改善案並覆盤\n\
             \n\
             ## 風險預警\n\
             - 關鍵崗位無第二人選, 建議於 Phase 2 同步培養備援\n\
             - 原始請求: {text}",
            topic = topic,
            text = task.text,
        );

        Ok(HandlerOutput {
            message,
            quality: None,
        })
    }
}
