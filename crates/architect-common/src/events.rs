//! Push-only event surface consumed by presentation layers.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::change::FileChange;
use crate::files::{GeneratedFile, StreamingProgress};
use crate::phase::Phase;
use crate::spec::{ClarificationQuestion, ProjectSpecification};

/// Default channel capacity when none is configured.
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum PipelineEvent {
    QuestionsGenerated {
        questions: Vec<ClarificationQuestion>,
    },
    SpecConfirmed {
        spec: ProjectSpecification,
    },
    FileStreamStart {
        file: GeneratedFile,
    },
    FileStreamUpdate {
        progress: StreamingProgress,
    },
    FileStreamComplete {
        file: GeneratedFile,
    },
    GenerationComplete {
        files: Vec<GeneratedFile>,
        cancelled: bool,
    },
    ChangesUpdated {
        changes: Vec<FileChange>,
    },
    ChangeApplied {
        change: FileChange,
    },
    ChangeFailed {
        change: FileChange,
        reason: String,
    },
    AllChangesApplied {
        applied: usize,
        failed: usize,
    },
    PhaseChanged {
        from: Phase,
        to: Phase,
    },
}

impl PipelineEvent {
    /// Short event name, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineEvent::QuestionsGenerated { .. } => "questions-generated",
            PipelineEvent::SpecConfirmed { .. } => "spec-confirmed",
            PipelineEvent::FileStreamStart { .. } => "file-stream-start",
            PipelineEvent::FileStreamUpdate { .. } => "file-stream-update",
            PipelineEvent::FileStreamComplete { .. } => "file-stream-complete",
            PipelineEvent::GenerationComplete { .. } => "generation-complete",
            PipelineEvent::ChangesUpdated { .. } => "changes-updated",
            PipelineEvent::ChangeApplied { .. } => "change-applied",
            PipelineEvent::ChangeFailed { .. } => "change-failed",
            PipelineEvent::AllChangesApplied { .. } => "all-changes-applied",
            PipelineEvent::PhaseChanged { .. } => "phase-changed",
        }
    }
}

/// Fan-out of pipeline events over a broadcast channel.
///
/// Emitting never blocks and never fails the caller: with no subscriber the
/// event is simply dropped.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<PipelineEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.tx.subscribe()
    }

    pub fn emit(&self, event: PipelineEvent) {
        tracing::trace!(event = event.kind(), "emit");
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}
