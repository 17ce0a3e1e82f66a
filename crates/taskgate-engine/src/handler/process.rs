//! Process optimization handler.
//!
//! Produces a bottleneck analysis with three candidate optimization
//! plans and a draft of the revised procedure.

use async_trait::async_trait;

use crate::error::DispatchError;
use crate::handler::{extract_topic, CapabilityHandler};
use crate::types::{Capability, HandlerOutput, TaskRequest};

const TOPIC_PREFIXES: &[&str] = &[
    "請幫我優化",
    "幫我優化",
    "請優化",
    "優化",
    "請分析",
    "分析",
    "改善",
];

pub struct ProcessHandler;

#[async_trait]
impl CapabilityHandler for ProcessHandler {
    fn capability(&self) -> Capability {
        Capability::ProcessOptimization
    }

    fn describe(&self, task: &TaskRequest) -> String {
        format!(
            "Analyze and optimize the process: {}",
            extract_topic(&task.text, TOPIC_PREFIXES)
        )
    }

    async fn handle(&self, task: &TaskRequest) -> Result<HandlerOutput, DispatchError> {
        let topic = extract_topic(&task.text, TOPIC_PREFIXES);
        tracing::info!(task_id = %task.id, topic, "Generating process analysis report");

        let message = format!(
            "# 流程分析報告: {topic}\n\
             \n\
             ## 瓶頸盤點\n\
             - 人工節點密集, 交接等待時間占比偏高\n\
             - 重複性資料輸入缺乏校驗, 錯誤需回流重做\n\
             - 例外處理依賴個人經驗, 無標準路徑\n\
             \n\
             ## 優化方案\n\
             1. 保守方案: 現有步驟不動, 增加交接檢核表與時限提醒\n\
             2. 折衷方案: 合併重複輸入節點, 導入共用表單與自動帶入\n\
             3. 積極方案: 全流程重組, 例外路徑標準化並自動分派\n\
             \n\
             ## 新版流程草稿\n\
             - 請求: {text}\n\
             - 建議先試行方案 2, 四週後覆盤再決定是否推進方案 3",
            topic = topic,
            text = task.text,
        );

        Ok(HandlerOutput {
            message,
            quality: None,
        })
    }
}
