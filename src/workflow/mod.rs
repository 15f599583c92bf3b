//! The five-phase workflow that sequences clarification, generation and
//! review.
//!
//! ```text
//! Input ─start_clarification─► Clarification ─begin_generation─► Generating
//!   ▲                                                                │
//!   │                                                           (complete)
//!   │                                                                ▼
//!   └──acknowledge── Game ◄──(apply all succeeded | enter_game)── Review
//! ```
//!
//! The confirmed specification is persisted right before generation so a
//! restarted process can [`resume`](WorkflowOrchestrator::resume) straight
//! into `Generating`. It is removed once that run completes.

use architect_common::{
    CancellationToken, ChangeId, ChangeStatus, ClarificationAnswer, ClarificationQuestion,
    EventBus, FileChange, FileWriter, GeneratedFile, KeyValueStore, NewChange, Phase,
    PipelineEvent, ProjectSpecification,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{Instrument, Span, info, info_span, warn};
use uuid::Uuid;

use crate::clarify::{AnswerOutcome, ConfirmOutcome, SpecDefaults, SpecResolver};
use crate::errors::WorkflowError;
use crate::generate::{DEFAULT_LINE_DELAY, GenerationOutcome, GenerationPipeline};
use crate::ledger::{ApplyOutcome, ApplyReport, ChangeLedger, ChangeOutcome};
use crate::store::PENDING_SPEC_KEY;

/// Runtime knobs, usually produced by `ArchitectConfig::workflow_settings`.
#[derive(Debug, Clone)]
pub struct WorkflowSettings {
    pub line_delay: Duration,
    pub write_timeout: Option<Duration>,
    pub auto_approve: bool,
    pub event_capacity: usize,
    pub spec_defaults: SpecDefaults,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            line_delay: DEFAULT_LINE_DELAY,
            write_timeout: Some(Duration::from_secs(30)),
            auto_approve: false,
            event_capacity: architect_common::events::DEFAULT_EVENT_CAPACITY,
            spec_defaults: SpecDefaults::default(),
        }
    }
}

/// What one generation run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    /// Every file reached, including a partial one after cancellation.
    pub files: Vec<GeneratedFile>,
    pub cancelled: bool,
    /// Ledger entries created from the completed files.
    pub changes: Vec<FileChange>,
    /// Present when auto-approve applied the changes immediately.
    pub auto_applied: Option<ApplyReport>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResumeOutcome {
    NothingPending,
    /// A persisted value was unusable and has been removed.
    Discarded,
    Resumed(GenerationReport),
}

/// Shown in the `Game` phase once a cycle's changes are settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleSummary {
    pub cycle_id: Uuid,
    pub description: String,
    pub files_written: usize,
    pub lines_written: usize,
    pub rejected: usize,
    pub failed: usize,
}

pub struct WorkflowOrchestrator {
    resolver: SpecResolver,
    pipeline: GenerationPipeline,
    ledger: ChangeLedger,
    store: Box<dyn KeyValueStore>,
    events: EventBus,
    phase: Phase,
    spec: Option<ProjectSpecification>,
    auto_approve: bool,
    cycle_id: Uuid,
    summary: Option<CycleSummary>,
}

impl WorkflowOrchestrator {
    pub fn new(
        settings: WorkflowSettings,
        writer: Arc<dyn FileWriter>,
        store: Box<dyn KeyValueStore>,
    ) -> Self {
        let events = EventBus::new(settings.event_capacity);
        Self {
            resolver: SpecResolver::new(settings.spec_defaults, events.clone()),
            pipeline: GenerationPipeline::new(settings.line_delay, events.clone()),
            ledger: ChangeLedger::new(writer, settings.write_timeout, events.clone()),
            store,
            events,
            phase: Phase::Input,
            spec: None,
            auto_approve: settings.auto_approve,
            cycle_id: Uuid::new_v4(),
            summary: None,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.events.subscribe()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn cycle_id(&self) -> Uuid {
        self.cycle_id
    }

    /// The confirmed specification of the current cycle.
    pub fn spec(&self) -> Option<&ProjectSpecification> {
        self.spec.as_ref()
    }

    pub fn resolver(&self) -> &SpecResolver {
        &self.resolver
    }

    pub fn ledger(&self) -> &ChangeLedger {
        &self.ledger
    }

    pub fn generated_files(&self) -> Vec<GeneratedFile> {
        self.pipeline.generated_files()
    }

    pub fn summary(&self) -> Option<&CycleSummary> {
        self.summary.as_ref()
    }

    /// Token that cancels the in-flight generation run.
    pub fn cancel_handle(&self) -> CancellationToken {
        self.pipeline.cancel_handle()
    }

    fn span(&self) -> Span {
        info_span!("cycle", id = %self.cycle_id)
    }

    fn transition(&mut self, to: Phase) {
        let from = self.phase;
        if from == to {
            return;
        }
        self.phase = to;
        let _enter = self.span().entered();
        info!(%from, %to, "Phase changed");
        self.events.emit(PipelineEvent::PhaseChanged { from, to });
    }

    fn require_phase(&self, operation: &'static str, allowed: &[Phase]) -> Result<(), WorkflowError> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(WorkflowError::InvalidPhase {
                operation,
                phase: self.phase,
            })
        }
    }

    // =========================================
    // Clarification
    // =========================================

    /// Start (or restart) clarification for `description`.
    pub fn start_clarification(
        &mut self,
        description: &str,
    ) -> Result<Vec<ClarificationQuestion>, WorkflowError> {
        self.require_phase("start clarification", &[Phase::Input, Phase::Clarification])?;
        self.spec = None;
        let questions = self.resolver.start_clarification(description);
        self.transition(Phase::Clarification);
        Ok(questions)
    }

    pub fn submit_answer(
        &mut self,
        answer: ClarificationAnswer,
    ) -> Result<AnswerOutcome, WorkflowError> {
        self.require_phase("answer a question", &[Phase::Clarification])?;
        Ok(self.resolver.submit_answer(answer))
    }

    pub fn confirm_spec(&mut self) -> Result<ConfirmOutcome, WorkflowError> {
        self.require_phase("confirm the specification", &[Phase::Clarification])?;
        let outcome = self.resolver.confirm_spec();
        if let ConfirmOutcome::Confirmed(spec) = &outcome {
            self.spec = Some(spec.clone());
        }
        Ok(outcome)
    }

    // =========================================
    // Generation
    // =========================================

    /// Persist the confirmed spec and generate into `root`.
    ///
    /// Refuses to enter `Generating` without a destination.
    pub async fn begin_generation(
        &mut self,
        root: Option<PathBuf>,
    ) -> Result<GenerationReport, WorkflowError> {
        self.require_phase("start generation", &[Phase::Clarification])?;
        let spec = match &self.spec {
            Some(spec) if spec.confirmed => spec.clone(),
            _ => return Err(WorkflowError::SpecNotConfirmed),
        };
        let Some(root) = root else {
            warn!("Generation refused: no destination");
            return Err(WorkflowError::NoDestination);
        };

        match spec.to_json() {
            Ok(raw) => {
                if let Err(e) = self.store.store(PENDING_SPEC_KEY, &raw) {
                    warn!(error = %e, "Could not persist pending specification");
                }
            }
            Err(e) => warn!(error = %e, "Could not serialize pending specification"),
        }

        let span = self.span();
        self.run_generation(spec, root, Phase::Clarification)
            .instrument(span)
            .await
    }

    /// Inspect the persisted pending specification without consuming it.
    ///
    /// A value that does not parse, or was never confirmed, is removed.
    pub fn pending_spec(&mut self) -> Result<Option<ProjectSpecification>, WorkflowError> {
        let Some(raw) = self.store.load(PENDING_SPEC_KEY)? else {
            return Ok(None);
        };

        match ProjectSpecification::from_json(&raw) {
            Ok(spec) if spec.confirmed => Ok(Some(spec)),
            Ok(_) => {
                warn!("Discarding persisted specification that was never confirmed");
                self.store.remove(PENDING_SPEC_KEY)?;
                Ok(None)
            }
            Err(e) => {
                warn!(error = %e, "Discarding unparseable persisted specification");
                self.store.remove(PENDING_SPEC_KEY)?;
                Ok(None)
            }
        }
    }

    /// Resume a persisted specification directly into `Generating`.
    ///
    /// Without a destination the value stays in place and `NoDestination` is
    /// reported.
    pub async fn resume(&mut self, root: Option<PathBuf>) -> Result<ResumeOutcome, WorkflowError> {
        self.require_phase("resume", &[Phase::Input])?;

        let had_value = self.store.load(PENDING_SPEC_KEY)?.is_some();
        let Some(spec) = self.pending_spec()? else {
            return Ok(if had_value {
                ResumeOutcome::Discarded
            } else {
                ResumeOutcome::NothingPending
            });
        };
        let Some(root) = root else {
            warn!("Resume refused: no destination");
            return Err(WorkflowError::NoDestination);
        };

        info!(description = %spec.description, "Resuming pending specification");
        self.spec = Some(spec.clone());
        let span = self.span();
        let report = self
            .run_generation(spec, root, Phase::Input)
            .instrument(span)
            .await?;
        Ok(ResumeOutcome::Resumed(report))
    }

    async fn run_generation(
        &mut self,
        spec: ProjectSpecification,
        root: PathBuf,
        fallback: Phase,
    ) -> Result<GenerationReport, WorkflowError> {
        self.transition(Phase::Generating);
        self.summary = None;
        self.ledger.clear_changes();
        self.ledger.set_root(Some(root.clone()));

        let outcome = self.pipeline.start_generation(&spec, &root).await;
        let (files, cancelled) = match outcome {
            GenerationOutcome::Completed(files) => (files, false),
            GenerationOutcome::Cancelled(files) => (files, true),
            GenerationOutcome::Ignored(reason) => {
                self.transition(fallback);
                return Err(WorkflowError::GenerationIgnored(reason));
            }
        };

        if let Err(e) = self.store.remove(PENDING_SPEC_KEY) {
            warn!(error = %e, "Could not clear pending specification");
        }

        let changes: Vec<FileChange> = files
            .iter()
            .filter(|f| f.is_complete())
            .map(|f| self.ledger.add_change(NewChange::from(f)))
            .collect();
        self.transition(Phase::Review);

        let auto_applied = if self.auto_approve {
            Some(self.auto_apply().await)
        } else {
            None
        };

        Ok(GenerationReport {
            files,
            cancelled,
            changes,
            auto_applied,
        })
    }

    async fn auto_apply(&mut self) -> ApplyReport {
        let pending: Vec<ChangeId> = self.ledger.pending_changes().iter().map(|c| c.id).collect();
        for id in pending {
            self.ledger.approve_change(id);
        }
        let report = self.ledger.apply_all_approved().await;
        if self.all_settled(&report) {
            self.finish_cycle();
        }
        report
    }

    // =========================================
    // Review
    // =========================================

    pub fn approve_change(&mut self, id: ChangeId) -> Result<ChangeOutcome, WorkflowError> {
        self.require_phase("approve a change", &[Phase::Review])?;
        Ok(self.ledger.approve_change(id))
    }

    pub fn reject_change(&mut self, id: ChangeId) -> Result<ChangeOutcome, WorkflowError> {
        self.require_phase("reject a change", &[Phase::Review])?;
        Ok(self.ledger.reject_change(id))
    }

    pub fn reject_all(&mut self) -> Result<usize, WorkflowError> {
        self.require_phase("reject changes", &[Phase::Review])?;
        Ok(self.ledger.reject_all())
    }

    /// Apply (or retry) a single change.
    pub async fn apply_change(&mut self, id: ChangeId) -> Result<ApplyOutcome, WorkflowError> {
        self.require_phase("apply a change", &[Phase::Review])?;
        let span = self.span();
        Ok(self.ledger.apply_change(id).instrument(span).await)
    }

    /// Apply every approved change. When nothing in the ledger is left failed
    /// the cycle moves to `Game`; otherwise it stays in `Review` so failed
    /// changes can be retried.
    pub async fn apply_all_approved(&mut self) -> Result<ApplyReport, WorkflowError> {
        self.require_phase("apply changes", &[Phase::Review])?;
        let span = self.span();
        let report = self.ledger.apply_all_approved().instrument(span).await;
        if self.all_settled(&report) {
            self.finish_cycle();
        }
        Ok(report)
    }

    /// A pass ends the cycle only if it failed nothing and no earlier
    /// failure is still waiting for a retry.
    fn all_settled(&self, report: &ApplyReport) -> bool {
        report.failed() == 0 && self.ledger.failed_changes().is_empty()
    }

    /// Leave review manually.
    pub fn enter_game(&mut self) -> Result<&CycleSummary, WorkflowError> {
        self.require_phase("enter the game view", &[Phase::Review, Phase::Game])?;
        Ok(self.finish_cycle())
    }

    fn finish_cycle(&mut self) -> &CycleSummary {
        let changes = self.ledger.changes();
        let applied = changes.iter().filter(|c| c.status == ChangeStatus::Applied);
        let summary = CycleSummary {
            cycle_id: self.cycle_id,
            description: self
                .spec
                .as_ref()
                .map(|s| s.description.clone())
                .unwrap_or_default(),
            files_written: applied.clone().count(),
            lines_written: applied.map(|c| c.added_lines).sum(),
            rejected: changes
                .iter()
                .filter(|c| c.status == ChangeStatus::Rejected)
                .count(),
            failed: changes
                .iter()
                .filter(|c| c.status == ChangeStatus::Failed)
                .count(),
        };
        self.transition(Phase::Game);
        self.summary.insert(summary)
    }

    /// Dismiss the game view and start a new cycle.
    pub fn acknowledge(&mut self) -> Result<(), WorkflowError> {
        self.require_phase("acknowledge", &[Phase::Game])?;
        self.spec = None;
        self.summary = None;
        self.resolver.reset();
        self.pipeline.clear_files();
        self.transition(Phase::Input);
        self.cycle_id = Uuid::new_v4();
        info!(cycle = %self.cycle_id, "New cycle");
        Ok(())
    }
}
