//! Streaming code generation.
//!
//! The pipeline plans a deterministic file list from a confirmed
//! specification and streams each file line by line with a simulated
//! per-line delay. Cancellation is cooperative: the token is polled before
//! every file and every line.
//!
//! ```text
//! Idle ──start_generation──► Generating ──(all files | cancelled)──► Idle
//! ```

pub mod templates;

use architect_common::{
    CancellationToken, EventBus, FileStatus, GeneratedFile, IgnoredReason, PipelineEvent,
    ProjectSpecification, StreamingProgress,
};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default simulated delay between streamed lines.
pub const DEFAULT_LINE_DELAY: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    Completed(Vec<GeneratedFile>),
    /// Files reached before cancellation; the last one may be incomplete.
    Cancelled(Vec<GeneratedFile>),
    Ignored(IgnoredReason),
}

impl GenerationOutcome {
    pub fn files(&self) -> &[GeneratedFile] {
        match self {
            GenerationOutcome::Completed(files) | GenerationOutcome::Cancelled(files) => files,
            GenerationOutcome::Ignored(_) => &[],
        }
    }
}

#[derive(Default)]
struct PipelineState {
    files: Vec<GeneratedFile>,
    generating: bool,
}

/// Runs at most one generation at a time.
///
/// Methods take `&self` so a cancel handle or a concurrent (ignored) start
/// can reach the pipeline while a run is suspended. The state lock is never
/// held across an await.
pub struct GenerationPipeline {
    state: Mutex<PipelineState>,
    cancel: CancellationToken,
    line_delay: Duration,
    events: EventBus,
}

/// Clears the generating flag even if the run future is dropped mid-stream.
struct RunGuard<'a> {
    pipeline: &'a GenerationPipeline,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.pipeline.lock().generating = false;
    }
}

impl GenerationPipeline {
    pub fn new(line_delay: Duration, events: EventBus) -> Self {
        Self {
            state: Mutex::new(PipelineState::default()),
            cancel: CancellationToken::new(),
            line_delay,
            events,
        }
    }

    fn lock(&self) -> MutexGuard<'_, PipelineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Plan and stream every file for `spec`. Suspends until all planned
    /// files are streamed or the run is cancelled.
    ///
    /// `root` is only recorded for diagnostics; the pipeline never writes.
    pub async fn start_generation(
        &self,
        spec: &ProjectSpecification,
        root: &Path,
    ) -> GenerationOutcome {
        if !spec.confirmed {
            warn!("Generation ignored: specification is not confirmed");
            return GenerationOutcome::Ignored(IgnoredReason::UnconfirmedSpecification);
        }

        {
            let mut state = self.lock();
            if state.generating {
                warn!("Generation ignored: a run is already in progress");
                return GenerationOutcome::Ignored(IgnoredReason::AlreadyGenerating);
            }
            state.generating = true;
            state.files.clear();
        }
        let _guard = RunGuard { pipeline: self };
        self.cancel.reset();

        let planned = templates::plan_files(spec);
        info!(
            files = planned.len(),
            root = %root.display(),
            "Generation started"
        );

        let mut cancelled = false;
        for file in planned {
            if self.cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            if !self.stream_file(file).await {
                cancelled = true;
                break;
            }
        }

        let files = self.generated_files();
        info!(files = files.len(), cancelled, "Generation finished");
        self.events.emit(PipelineEvent::GenerationComplete {
            files: files.clone(),
            cancelled,
        });

        if cancelled {
            GenerationOutcome::Cancelled(files)
        } else {
            GenerationOutcome::Completed(files)
        }
    }

    /// Stream one file. Returns false if cancellation interrupted it.
    async fn stream_file(&self, mut file: GeneratedFile) -> bool {
        file.status = FileStatus::Streaming;
        let index = {
            let mut state = self.lock();
            state.files.push(file.clone());
            state.files.len() - 1
        };
        self.events
            .emit(PipelineEvent::FileStreamStart { file: file.clone() });

        let total_lines = file.total_lines();
        let lines: Vec<String> = file.lines().map(str::to_string).collect();

        for (i, line_text) in lines.into_iter().enumerate() {
            if self.cancel.is_cancelled() {
                debug!(path = %file.path, streamed = i, "Cancelled mid-file");
                return false;
            }

            let current_line = i + 1;
            file.streamed_line_count = current_line;
            self.lock().files[index].streamed_line_count = current_line;

            self.events.emit(PipelineEvent::FileStreamUpdate {
                progress: StreamingProgress {
                    file_path: file.path.clone(),
                    current_line,
                    total_lines,
                    line_text,
                },
            });

            if self.line_delay.is_zero() {
                tokio::task::yield_now().await;
            } else {
                tokio::time::sleep(self.line_delay).await;
            }
        }

        file.status = FileStatus::Complete;
        self.lock().files[index].status = FileStatus::Complete;
        debug!(path = %file.path, lines = total_lines, "File streamed");
        self.events.emit(PipelineEvent::FileStreamComplete { file });
        true
    }

    /// Request cooperative cancellation of the in-flight run, if any.
    pub fn cancel_generation(&self) {
        if self.is_generating() {
            info!("Generation cancellation requested");
            self.cancel.cancel();
        }
    }

    /// A token that cancels this pipeline's runs; usable from a signal handler.
    pub fn cancel_handle(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_generating(&self) -> bool {
        self.lock().generating
    }

    /// Forget the last run's files. Ignored while a run is in progress.
    pub fn clear_files(&self) -> bool {
        let mut state = self.lock();
        if state.generating {
            warn!("Clear ignored: generation in progress");
            return false;
        }
        state.files.clear();
        true
    }

    /// Snapshot of the last run, including partial results.
    pub fn generated_files(&self) -> Vec<GeneratedFile> {
        self.lock().files.clone()
    }
}
