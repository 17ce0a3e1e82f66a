//! Taskgate binary - composition root.
//!
//! Ties the engine crates into a single executable:
//! 1. Load configuration from TOML
//! 2. Build the pipeline (classifier -> assessor -> gate -> dispatcher)
//! 3. Open the audit log and wire up webhook notifications
//! 4. Start the background expiry sweeper
//! 5. Run the operator console on stdin

mod cli;

use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use uuid::Uuid;

use taskgate_core::TaskgateConfig;
use taskgate_engine::{
    ApprovalGate, ApprovalRequest, AuditSink, CapabilityRegistry, Dispatcher, DispatchOutcome,
    EngineError, ExpirySweeper, FileAuditLog, GateTimeouts, IntentClassifier, Notifier,
    NullNotifier, Orchestrator, RiskAssessor, Submission, WebhookNotifier,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = cli::CliArgs::parse();

    // Config first so its log level can feed the tracing filter.
    let config_file = args.resolve_config_path();
    let config = TaskgateConfig::load_or_default(&config_file);
    let log_level = args.resolve_log_level(&config.general.log_level);

    // Tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    tracing::info!("Starting taskgate v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    // Pipeline.
    let mut registry = CapabilityRegistry::new();
    registry.register_defaults();
    tracing::info!(capabilities = ?registry.registered(), "Capability handlers registered");

    let gate = Arc::new(ApprovalGate::new(GateTimeouts::from_config(&config.gate)));
    let dispatcher = Dispatcher::new(Arc::new(registry), &config.dispatch);

    let audit: Arc<dyn AuditSink> = Arc::new(FileAuditLog::open(&config.audit.log_path)?);
    tracing::info!(path = %config.audit.log_path.display(), "Audit log opened");

    let webhook = WebhookNotifier::new(&config.notify);
    let notifier: Arc<dyn Notifier> = if webhook.is_configured() {
        tracing::info!("Webhook notifications enabled");
        Arc::new(webhook)
    } else {
        Arc::new(NullNotifier)
    };

    let orchestrator = Arc::new(Orchestrator::new(
        IntentClassifier::new(),
        RiskAssessor::new(config.risk.confidence_floor),
        gate,
        dispatcher,
        audit,
        notifier,
    ));

    // Background expiry sweep.
    let sweeper = Arc::new(ExpirySweeper::new(
        Arc::clone(&orchestrator),
        config.gate.sweep_interval_secs,
    ));
    let sweeper_task = {
        let sweeper = Arc::clone(&sweeper);
        tokio::spawn(async move { sweeper.run().await })
    };

    console(Arc::clone(&orchestrator), &args.user).await;

    tracing::info!("Shutting down");
    sweeper.shutdown();
    let _ = sweeper_task.await;
    Ok(())
}

/// Interactive operator console. Returns when the operator quits or the
/// process receives Ctrl-C.
async fn console(orchestrator: Arc<Orchestrator>, requester: &str) {
    println!("taskgate console. Commands: submit <text> | pending | approve <id> [note] | reject <id> [note] | status <id> | quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => line,
                Ok(None) => return,
                Err(e) => {
                    tracing::error!(error = %e, "stdin read failed");
                    return;
                }
            },
            _ = tokio::signal::ctrl_c() => return,
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (command, rest) = match line.split_once(' ') {
            Some((cmd, rest)) => (cmd, rest.trim()),
            None => (line, ""),
        };

        match command {
            "submit" if !rest.is_empty() => {
                match orchestrator.submit(rest, requester).await {
                    Ok(Submission::Dispatched(outcome)) => {
                        println!("dispatched (LOW risk)");
                        print_outcome(&outcome);
                    }
                    Ok(Submission::Gated(handle)) => {
                        println!(
                            "gated at {} risk. approval id: {} (deadline {})",
                            handle.tier,
                            handle.approval_id,
                            handle.deadline.0
                        );
                    }
                    Err(EngineError::CannotRoute(text)) => {
                        println!("cannot route: no capability matches \"{}\"", text);
                    }
                    Err(e) => println!("error: {}", e),
                }
            }
            "pending" => {
                let pending = orchestrator.pending();
                if pending.is_empty() {
                    println!("no pending approvals");
                }
                for approval in pending {
                    print_approval(&orchestrator, &approval);
                }
            }
            "approve" | "reject" => {
                let (id_text, note) = match rest.split_once(' ') {
                    Some((id, note)) => (id, Some(note.trim().to_string())),
                    None => (rest, None),
                };
                let id = match Uuid::parse_str(id_text) {
                    Ok(id) => id,
                    Err(_) => {
                        println!("usage: {} <approval-id> [note]", command);
                        continue;
                    }
                };
                let result = if command == "approve" {
                    orchestrator.approve(id, requester, note).await
                } else {
                    orchestrator.reject(id, requester, note).await
                };
                match result {
                    Ok(outcome) => print_outcome(&outcome),
                    Err(e) => println!("error: {}", e),
                }
            }
            "status" => match Uuid::parse_str(rest) {
                Ok(id) => match orchestrator.status(id) {
                    Ok(approval) => print_approval(&orchestrator, &approval),
                    Err(e) => println!("error: {}", e),
                },
                Err(_) => println!("usage: status <approval-id>"),
            },
            "quit" | "exit" => return,
            _ => {
                println!("unknown command: {}", command);
            }
        }
    }
}

fn print_approval(orchestrator: &Orchestrator, approval: &ApprovalRequest) {
    println!(
        "{}  [{}]  {}  risk={}  waiting={}s  deadline={}",
        approval.id,
        approval.status,
        approval.task.text,
        approval.assessment.tier,
        approval.created_at.age_secs(),
        approval.deadline.0
    );
    for reason in &approval.assessment.reasons {
        println!("    - {}", reason);
    }
    if let Some(desc) = orchestrator.describe(approval) {
        println!("    would run: {}", desc);
    }
}

fn print_outcome(outcome: &DispatchOutcome) {
    println!("outcome: {} (task {})", outcome.kind, outcome.task_id);
    if let Some(quality) = outcome.quality {
        println!("quality: {:.2}", quality);
    }
    if let Some(detail) = &outcome.detail {
        println!("{}", detail);
    }
}
