//! Intent classification: request text to capability.
//!
//! A configured semantic classifier takes precedence; its answers are
//! validated and anything invalid falls back to the deterministic keyword
//! table with no user-visible error.

pub mod triggers;

use async_trait::async_trait;
use std::sync::Arc;

use crate::types::Capability;
use triggers::TriggerTable;

/// Fixed confidence for keyword-table matches. Deliberately conservative so
/// downstream consumers can tell a keyword match from a semantic one.
pub const KEYWORD_CONFIDENCE: f32 = 0.3;

/// Classification verdict for a piece of request text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    /// `None` when no known capability matched ("unrecognized").
    pub capability: Option<Capability>,
    pub confidence: f32,
}

impl Classification {
    fn unrecognized() -> Self {
        Self {
            capability: None,
            confidence: 0.0,
        }
    }
}

/// External semantic classifier, typically backed by a remote model.
///
/// Returns a capability label and a confidence in [0, 1]; `None` signals
/// unavailability or failure and triggers the keyword fallback.
#[async_trait]
pub trait SemanticClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Option<(String, f32)>;
}

/// Request-text classifier with a pluggable semantic strategy and a
/// deterministic keyword fallback. Stateless aside from its tables.
pub struct IntentClassifier {
    triggers: TriggerTable,
    semantic: Option<Arc<dyn SemanticClassifier>>,
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl IntentClassifier {
    /// Keyword-only classifier.
    pub fn new() -> Self {
        Self {
            triggers: TriggerTable::new(),
            semantic: None,
        }
    }

    /// Classifier that consults `semantic` first.
    pub fn with_semantic(semantic: Arc<dyn SemanticClassifier>) -> Self {
        Self {
            triggers: TriggerTable::new(),
            semantic: Some(semantic),
        }
    }

    /// Classify request text. Never fails: unrecognized text yields
    /// `capability: None` at confidence 0.0.
    pub async fn classify(&self, text: &str) -> Classification {
        let text = text.trim();
        if text.is_empty() {
            return Classification::unrecognized();
        }

        if let Some(semantic) = &self.semantic {
            match semantic.classify(text).await {
                Some((label, confidence)) => {
                    match Self::validate(&label, confidence) {
                        Some(classification) => return classification,
                        None => {
                            tracing::warn!(
                                label = %label,
                                confidence,
                                "Semantic classifier returned invalid result; using keyword fallback"
                            );
                        }
                    }
                }
                None => {
                    tracing::debug!("Semantic classifier unavailable; using keyword fallback");
                }
            }
        }

        match self.triggers.best_match(text) {
            Some(m) => {
                tracing::debug!(capability = %m.capability, trigger = m.trigger, "Keyword match");
                Classification {
                    capability: Some(m.capability),
                    confidence: KEYWORD_CONFIDENCE,
                }
            }
            None => Classification::unrecognized(),
        }
    }

    /// Validate a semantic result: known capability label, finite
    /// confidence in [0, 1].
    fn validate(label: &str, confidence: f32) -> Option<Classification> {
        let capability: Capability = label.parse().ok()?;
        if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
            return None;
        }
        Some(Classification {
            capability: Some(capability),
            confidence,
        })
    }
}
