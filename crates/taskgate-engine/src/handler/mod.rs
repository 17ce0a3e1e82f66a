//! Capability handler registry and trait definition.
//!
//! Defines the `CapabilityHandler` async trait and the registry the
//! dispatcher looks handlers up in. One handler per capability; the
//! default set covers all four.

pub mod decision;
pub mod knowledge;
pub mod process;
pub mod talent;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::DispatchError;
use crate::types::{Capability, HandlerOutput, TaskRequest};

/// A handler that carries out approved work for one capability.
#[async_trait]
pub trait CapabilityHandler: Send + Sync {
    /// The capability this handler serves.
    fn capability(&self) -> Capability;

    /// One-line human description of what running this task would do.
    fn describe(&self, task: &TaskRequest) -> String;

    /// Carry out the task and produce an output report.
    async fn handle(&self, task: &TaskRequest) -> Result<HandlerOutput, DispatchError>;
}

/// Registry mapping capabilities to their handlers.
#[derive(Default)]
pub struct CapabilityRegistry {
    handlers: HashMap<Capability, Arc<dyn CapabilityHandler>>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler, replacing any previous one for the capability.
    pub fn register(&mut self, handler: Arc<dyn CapabilityHandler>) {
        self.handlers.insert(handler.capability(), handler);
    }

    /// Register the built-in handler for every capability.
    pub fn register_defaults(&mut self) {
        self.register(Arc::new(knowledge::KnowledgeHandler));
        self.register(Arc::new(process::ProcessHandler));
        self.register(Arc::new(talent::TalentHandler));
        self.register(Arc::new(decision::DecisionHandler));
    }

    pub fn get(&self, capability: Capability) -> Option<Arc<dyn CapabilityHandler>> {
        self.handlers.get(&capability).cloned()
    }

    pub fn registered(&self) -> Vec<Capability> {
        let mut caps: Vec<Capability> = self.handlers.keys().copied().collect();
        caps.sort_by_key(|c| c.to_string());
        caps
    }
}

/// Strip directive prefixes from a request to recover the bare topic.
///
/// Requests usually open with an imperative ("請幫我萃取…", "優化…");
/// the remainder is the subject the handler should report on.
pub(crate) fn extract_topic<'a>(text: &'a str, prefixes: &[&str]) -> &'a str {
    let trimmed = text.trim();
    for prefix in prefixes {
        if let Some(rest) = trimmed.strip_prefix(prefix) {
            let rest = rest.trim();
            if !rest.is_empty() {
                return rest;
            }
        }
    }
    trimmed
}
