//! Append-only audit trail.
//!
//! Every gate decision and dispatch outcome is written as one JSON line
//! through an `AuditSink`. Audit failures are logged and swallowed; the
//! pipeline never blocks on the trail.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use taskgate_core::{CoreError, Timestamp};

use crate::types::{ApprovalRequest, DispatchOutcome, RiskAssessment, TaskRequest};

/// One entry in the audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AuditEvent {
    /// A task request entered the pipeline, with its risk assessment.
    TaskAssessed {
        task: TaskRequest,
        assessment: RiskAssessment,
    },
    /// An approval request was opened for a gated task.
    GateOpened { approval: ApprovalRequest },
    /// A human resolved an approval request.
    GateResolved { approval: ApprovalRequest },
    /// The deadline passed and the request expired unresolved.
    GateExpired { approval: ApprovalRequest },
    /// Terminal outcome of a task request.
    OutcomeRecorded { outcome: DispatchOutcome },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AuditRecord {
    at: Timestamp,
    #[serde(flatten)]
    event: AuditEvent,
}

/// Destination for audit events.
pub trait AuditSink: Send + Sync {
    fn record(&self, event: &AuditEvent) -> taskgate_core::Result<()>;
}

/// JSON-lines file sink, one record per line, append-only.
pub struct FileAuditLog {
    file: Mutex<File>,
}

impl FileAuditLog {
    pub fn open(path: &Path) -> taskgate_core::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl AuditSink for FileAuditLog {
    fn record(&self, event: &AuditEvent) -> taskgate_core::Result<()> {
        let record = AuditRecord {
            at: Timestamp::now(),
            event: event.clone(),
        };
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');
        let mut file = self
            .file
            .lock()
            .map_err(|e| CoreError::Audit(format!("audit lock poisoned: {}", e)))?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}

/// In-memory sink for tests.
#[derive(Default)]
pub struct MemoryAuditLog {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl AuditSink for MemoryAuditLog {
    fn record(&self, event: &AuditEvent) -> taskgate_core::Result<()> {
        self.events
            .lock()
            .map_err(|e| CoreError::Audit(format!("audit lock poisoned: {}", e)))?
            .push(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Capability, DispatchOutcome, OutcomeKind, RiskTier};
    use uuid::Uuid;

    fn sample_event() -> AuditEvent {
        let task = TaskRequest {
            id: Uuid::new_v4(),
            text: "優化出貨流程".to_string(),
            submitted_at: Timestamp::now(),
            requester: "ops".to_string(),
            capability: Some(Capability::ProcessOptimization),
            confidence: 0.3,
        };
        let assessment = RiskAssessment {
            tier: RiskTier::Medium,
            reasons: vec!["base tier MEDIUM".to_string()],
            assessed_at: Timestamp::now(),
        };
        AuditEvent::TaskAssessed { task, assessment }
    }

    #[test]
    fn test_file_log_appends_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.log");
        let log = FileAuditLog::open(&path).unwrap();

        log.record(&sample_event()).unwrap();
        log.record(&AuditEvent::OutcomeRecorded {
            outcome: DispatchOutcome {
                task_id: Uuid::new_v4(),
                capability: None,
                kind: OutcomeKind::Expired,
                quality: None,
                detail: None,
                recorded_at: Timestamp::now(),
            },
        })
        .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["event"], "task_assessed");
        assert!(first["at"].is_i64());
        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["event"], "outcome_recorded");
        assert_eq!(second["outcome"]["kind"], "EXPIRED");
    }

    #[test]
    fn test_file_log_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deep").join("audit.log");
        let log = FileAuditLog::open(&path).unwrap();
        log.record(&sample_event()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_reopen_appends_rather_than_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.log");
        FileAuditLog::open(&path).unwrap().record(&sample_event()).unwrap();
        FileAuditLog::open(&path).unwrap().record(&sample_event()).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap().lines().count(), 2);
    }

    #[test]
    fn test_memory_log_collects_events() {
        let log = MemoryAuditLog::new();
        log.record(&sample_event()).unwrap();
        assert_eq!(log.events().len(), 1);
        assert!(matches!(log.events()[0], AuditEvent::TaskAssessed { .. }));
    }
}
