//! Task dispatch.
//!
//! Looks up the handler for a classified task, runs it under a hard
//! timeout, scores the output, and records the outcome. Dispatch never
//! retries; a failed or timed-out handler yields a FAILURE outcome at
//! the orchestrator level.

use std::sync::Arc;
use std::time::Duration;

use taskgate_core::config::DispatchConfig;
use taskgate_core::Timestamp;

use crate::error::DispatchError;
use crate::eval::QualityScorer;
use crate::handler::CapabilityRegistry;
use crate::types::{DispatchOutcome, OutcomeKind, TaskRequest};

pub struct Dispatcher {
    registry: Arc<CapabilityRegistry>,
    scorer: QualityScorer,
    handler_timeout: Duration,
}

impl Dispatcher {
    pub fn new(registry: Arc<CapabilityRegistry>, config: &DispatchConfig) -> Self {
        Self {
            registry,
            scorer: QualityScorer::new(config.pass_score),
            handler_timeout: Duration::from_secs(config.handler_timeout_secs),
        }
    }

    /// Run the handler for a task and produce a SUCCESS outcome.
    ///
    /// The task must be classified; unclassified tasks never reach
    /// dispatch because they assess to HIGH and cannot route. Handler
    /// output without a self-reported quality is scored here.
    pub async fn dispatch(&self, task: &TaskRequest) -> Result<DispatchOutcome, DispatchError> {
        let capability = task
            .capability
            .ok_or(DispatchError::Unclassified(task.id))?;
        let handler = self
            .registry
            .get(capability)
            .ok_or(DispatchError::UnknownCapability(capability))?;

        tracing::info!(task_id = %task.id, %capability, "Dispatching task");

        let output = tokio::time::timeout(self.handler_timeout, handler.handle(task))
            .await
            .map_err(|_| DispatchError::Timeout(self.handler_timeout.as_secs()))??;

        let quality = output
            .quality
            .unwrap_or_else(|| self.scorer.score(&task.text, &output.message));

        let passing = self.scorer.is_passing(quality);
        tracing::info!(task_id = %task.id, %capability, quality, passing, "Task dispatched");

        Ok(DispatchOutcome {
            task_id: task.id,
            capability: Some(capability),
            kind: OutcomeKind::Success,
            quality: Some(quality),
            detail: Some(output.message),
            recorded_at: Timestamp::now(),
        })
    }

    /// One-line description of what dispatching this task would do,
    /// shown to the operator alongside a pending approval.
    pub fn describe(&self, task: &TaskRequest) -> Option<String> {
        let handler = self.registry.get(task.capability?)?;
        Some(handler.describe(task))
    }
}
