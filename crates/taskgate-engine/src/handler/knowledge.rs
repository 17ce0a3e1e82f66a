//! Knowledge extraction handler.
//!
//! Turns tacit-knowledge capture requests into a structured knowledge
//! card outline: topic, core steps, and open points for the interview
//! follow-up.

use async_trait::async_trait;

use crate::error::DispatchError;
use crate::handler::{extract_topic, CapabilityHandler};
use crate::types::{Capability, HandlerOutput, TaskRequest};

const TOPIC_PREFIXES: &[&str] = &[
    "請幫我萃取",
    "幫我萃取",
    "萃取",
    "請幫我整理",
    "幫我整理",
    "請整理",
    "整理",
];

pub struct KnowledgeHandler;

#[async_trait]
impl CapabilityHandler for KnowledgeHandler {
    fn capability(&self) -> Capability {
        Capability::KnowledgeExtraction
    }

    fn describe(&self, task: &TaskRequest) -> String {
        format!(
            "Build a knowledge card for: {}",
            extract_topic(&task.text, TOPIC_PREFIXES)
        )
    }

    async fn handle(&self, task: &TaskRequest) -> Result<HandlerOutput, DispatchError> {
        let topic = extract_topic(&task.text, TOPIC_PREFIXES);
        tracing::info!(task_id = %task.id, topic, "Generating knowledge card");

        let message = format!(
            "# 知識卡片: {topic}\n\
             \n\
             ## 來源\n\
             - 請求: {text}\n\
             - 提交者: {requester}\n\
             \n\
             ## 結構化大綱\n\
             - 背景與適用情境\n\
             - 核心步驟 (待訪談確認順序)\n\
             - 常見例外與處理方式\n\
             - 相關文件與既有 SOP 連結\n\
             \n\
             ## 待補事項\n\
             - 安排資深同仁訪談, 確認隱性判斷準則\n\
             - 補充實際案例至少兩則",
            topic = topic,
            text = task.text,
            requester = task.requester,
        );

        Ok(HandlerOutput {
            message,
            quality: None,
        })
    }
}
