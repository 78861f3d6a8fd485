//! Background validation for interactive use.
//!
//! The worker owns its candidate list and an `Arc` of the rule set, reports
//! progress over a channel, and finishes with exactly one terminal message.
//! The foreground never sees a partially built report.

use crate::batch::{run_observed, BatchOptions};
use crate::discovery::Candidate;
use skillgate_schema::{RuleSet, ValidationReport};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// Messages from the worker to the foreground.
#[derive(Debug, Clone)]
pub enum WorkerMessage {
    /// About to validate candidate `index` of `total`.
    Progress {
        index: usize,
        total: usize,
        identifier: String,
    },
    /// Terminal: the complete report.
    ReportReady(ValidationReport),
    /// Terminal: stopped between bundles on request.
    Cancelled,
    /// Terminal: a fatal input error.
    Failed(String),
}

impl WorkerMessage {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, WorkerMessage::Progress { .. })
    }
}

/// Shared flag asking a running validation to stop.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Start validating `candidates` on a blocking task.
pub fn spawn_validation(
    candidates: Vec<Candidate>,
    rules: Arc<RuleSet>,
    cancel: CancelToken,
) -> (mpsc::UnboundedReceiver<WorkerMessage>, JoinHandle<()>) {
    let (tx, rx) = mpsc::unbounded_channel();

    let handle = tokio::task::spawn_blocking(move || {
        let outcome = run_observed(
            &candidates,
            &rules,
            &BatchOptions::default(),
            &cancel,
            |index, total, identifier| {
                let _ = tx.send(WorkerMessage::Progress {
                    index,
                    total,
                    identifier: identifier.to_string(),
                });
            },
        );

        let terminal = match outcome {
            Ok(Some(report)) => WorkerMessage::ReportReady(report),
            Ok(None) => WorkerMessage::Cancelled,
            Err(e) => {
                error!("Background validation failed: {}", e);
                WorkerMessage::Failed(e.to_string())
            }
        };
        if tx.send(terminal).is_err() {
            debug!("Foreground closed before the worker finished");
        }
    });

    (rx, handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use skillgate_common::DESCRIPTOR_FILE;
    use tempfile::tempdir;

    fn skill(root: &std::path::Path, name: &str) -> Candidate {
        let dir = root.join(name);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join(DESCRIPTOR_FILE),
            format!("---\nname: {}\ndescription: Checks things when asked to\n---\n## Examples\n", name),
        )
        .unwrap();
        Candidate::new(name, dir)
    }

    #[tokio::test]
    async fn test_progress_then_single_report() {
        let dir = tempdir().unwrap();
        let candidates = vec![skill(dir.path(), "one"), skill(dir.path(), "two")];
        let (mut rx, handle) =
            spawn_validation(candidates, Arc::new(RuleSet::default()), CancelToken::new());

        let mut messages = Vec::new();
        while let Some(message) = rx.recv().await {
            messages.push(message);
        }
        handle.await.unwrap();

        assert_eq!(messages.len(), 3);
        assert!(matches!(
            &messages[0],
            WorkerMessage::Progress { index: 0, total: 2, identifier } if identifier == "one"
        ));
        let terminal: Vec<_> = messages.iter().filter(|m| m.is_terminal()).collect();
        assert_eq!(terminal.len(), 1);
        match &messages[2] {
            WorkerMessage::ReportReady(report) => assert_eq!(report.validated_count(), 2),
            other => panic!("unexpected terminal message: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let dir = tempdir().unwrap();
        let token = CancelToken::new();
        token.cancel();
        let (mut rx, handle) = spawn_validation(
            vec![skill(dir.path(), "one")],
            Arc::new(RuleSet::default()),
            token,
        );
        let first = rx.recv().await.unwrap();
        assert!(matches!(first, WorkerMessage::Cancelled));
        assert!(rx.recv().await.is_none());
        handle.await.unwrap();
    }
}
