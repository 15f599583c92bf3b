//! Change ledger: the single gate between generated content and the disk.
//!
//! Every write goes through an approved [`FileChange`]. Writes run one at a
//! time, in ledger order, each bounded by an optional timeout. A failed write
//! moves the change to `failed` with the reason recorded; it can be retried
//! explicitly with [`ChangeLedger::apply_change`].

pub mod writer;

use architect_common::{
    ChangeId, ChangeStatus, EventBus, FileChange, FileWriter, IgnoredReason, NewChange,
    PipelineEvent,
};
use chrono::Utc;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub use writer::FsWriter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeOutcome {
    Updated(FileChange),
    Ignored(IgnoredReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied(FileChange),
    Failed { change: FileChange, reason: String },
    Ignored(IgnoredReason),
}

impl ApplyOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ApplyOutcome::Applied(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ApplyOutcome::Failed { .. })
    }
}

/// Per-change outcomes of one `apply_all_approved` pass, in ledger order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub outcomes: Vec<(ChangeId, ApplyOutcome)>,
}

impl ApplyReport {
    pub fn applied(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_applied()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_failed()).count()
    }

    /// Attempted changes that did not end up applied.
    pub fn unresolved(&self) -> usize {
        self.outcomes.len() - self.applied()
    }
}

pub struct ChangeLedger {
    writer: Arc<dyn FileWriter>,
    root: Option<PathBuf>,
    write_timeout: Option<Duration>,
    changes: Vec<FileChange>,
    last_id: u64,
    events: EventBus,
}

impl ChangeLedger {
    pub fn new(writer: Arc<dyn FileWriter>, write_timeout: Option<Duration>, events: EventBus) -> Self {
        Self {
            writer,
            root: None,
            write_timeout,
            changes: Vec::new(),
            last_id: 0,
            events,
        }
    }

    /// Directory that change paths are resolved against.
    pub fn set_root(&mut self, root: Option<PathBuf>) {
        self.root = root;
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn add_change(&mut self, change: NewChange) -> FileChange {
        self.last_id += 1;
        let change = change.into_change(ChangeId(self.last_id));
        self.changes.push(change.clone());
        self.emit_changes();
        change
    }

    pub fn approve_change(&mut self, id: ChangeId) -> ChangeOutcome {
        self.decide(id, ChangeStatus::Approved)
    }

    pub fn reject_change(&mut self, id: ChangeId) -> ChangeOutcome {
        self.decide(id, ChangeStatus::Rejected)
    }

    fn decide(&mut self, id: ChangeId, status: ChangeStatus) -> ChangeOutcome {
        let Some(change) = self.changes.iter_mut().find(|c| c.id == id) else {
            warn!(change = %id, "Decision ignored: change not found");
            return ChangeOutcome::Ignored(IgnoredReason::ChangeNotFound);
        };
        if change.status != ChangeStatus::Pending {
            warn!(change = %id, status = %change.status, "Decision ignored: change not pending");
            return ChangeOutcome::Ignored(IgnoredReason::NotPending);
        }

        change.status = status;
        let change = change.clone();
        info!(change = %id, path = %change.file_path, %status, "Change decided");
        self.emit_changes();
        ChangeOutcome::Updated(change)
    }

    /// Reject every pending change. Returns how many were rejected.
    pub fn reject_all(&mut self) -> usize {
        let mut rejected = 0;
        for change in self
            .changes
            .iter_mut()
            .filter(|c| c.status == ChangeStatus::Pending)
        {
            change.status = ChangeStatus::Rejected;
            rejected += 1;
        }
        info!(rejected, "Rejected all pending changes");
        self.emit_changes();
        rejected
    }

    /// Write one approved (or previously failed) change to disk.
    pub async fn apply_change(&mut self, id: ChangeId) -> ApplyOutcome {
        let Some(index) = self.changes.iter().position(|c| c.id == id) else {
            warn!(change = %id, "Apply ignored: change not found");
            return ApplyOutcome::Ignored(IgnoredReason::ChangeNotFound);
        };

        match self.changes[index].status {
            ChangeStatus::Applied => {
                return ApplyOutcome::Ignored(IgnoredReason::AlreadyApplied);
            }
            ChangeStatus::Approved | ChangeStatus::Failed => {}
            ChangeStatus::Pending | ChangeStatus::Rejected => {
                warn!(change = %id, "Apply ignored: change not approved");
                return ApplyOutcome::Ignored(IgnoredReason::NotApproved);
            }
        }

        let Some(root) = self.root.clone() else {
            warn!(change = %id, "Apply ignored: no root location");
            return ApplyOutcome::Ignored(IgnoredReason::NoRootLocation);
        };

        let relative = self.changes[index].file_path.clone();
        let result = match resolve_target(&root, &relative) {
            Ok(target) => {
                let bytes = self.changes[index].new_content.clone().into_bytes();
                self.write_bounded(&target, &bytes).await
            }
            Err(reason) => Err(reason),
        };

        let change = &mut self.changes[index];
        match result {
            Ok(()) => {
                change.status = ChangeStatus::Applied;
                change.failure = None;
                change.applied_at = Some(Utc::now());
                let change = change.clone();
                info!(change = %id, path = %relative, "Change applied");
                self.events.emit(PipelineEvent::ChangeApplied {
                    change: change.clone(),
                });
                self.emit_changes();
                ApplyOutcome::Applied(change)
            }
            Err(reason) => {
                change.status = ChangeStatus::Failed;
                change.failure = Some(reason.clone());
                let change = change.clone();
                warn!(change = %id, path = %relative, %reason, "Change failed to apply");
                self.events.emit(PipelineEvent::ChangeFailed {
                    change: change.clone(),
                    reason: reason.clone(),
                });
                self.emit_changes();
                ApplyOutcome::Failed { change, reason }
            }
        }
    }

    async fn write_bounded(&self, target: &Path, bytes: &[u8]) -> Result<(), String> {
        let write = self.writer.write(target, bytes);
        let result = match self.write_timeout {
            Some(limit) => match tokio::time::timeout(limit, write).await {
                Ok(result) => result,
                Err(_) => {
                    return Err(format!(
                        "write to {} timed out after {}s",
                        target.display(),
                        limit.as_secs_f64()
                    ));
                }
            },
            None => write.await,
        };
        result.map_err(|e| format!("write to {} failed: {}", target.display(), e))
    }

    /// Apply every currently approved change, in ledger order. A failure does
    /// not stop the pass.
    pub async fn apply_all_approved(&mut self) -> ApplyReport {
        let approved: Vec<ChangeId> = self
            .changes
            .iter()
            .filter(|c| c.status == ChangeStatus::Approved)
            .map(|c| c.id)
            .collect();

        let mut report = ApplyReport::default();
        for id in approved {
            let outcome = self.apply_change(id).await;
            report.outcomes.push((id, outcome));
        }

        info!(
            applied = report.applied(),
            failed = report.failed(),
            "Apply pass finished"
        );
        self.events.emit(PipelineEvent::AllChangesApplied {
            applied: report.applied(),
            failed: report.failed(),
        });
        report
    }

    pub fn changes(&self) -> &[FileChange] {
        &self.changes
    }

    pub fn get(&self, id: ChangeId) -> Option<&FileChange> {
        self.changes.iter().find(|c| c.id == id)
    }

    pub fn pending_changes(&self) -> Vec<FileChange> {
        self.with_status(ChangeStatus::Pending)
    }

    pub fn failed_changes(&self) -> Vec<FileChange> {
        self.with_status(ChangeStatus::Failed)
    }

    fn with_status(&self, status: ChangeStatus) -> Vec<FileChange> {
        self.changes
            .iter()
            .filter(|c| c.status == status)
            .cloned()
            .collect()
    }

    /// Drop every change and restart ids at `change-1`.
    pub fn clear_changes(&mut self) {
        self.changes.clear();
        self.last_id = 0;
        self.emit_changes();
    }

    fn emit_changes(&self) {
        self.events.emit(PipelineEvent::ChangesUpdated {
            changes: self.changes.clone(),
        });
    }
}

/// Join `relative` onto `root`, refusing absolute paths and `..` segments.
fn resolve_target(root: &Path, relative: &str) -> Result<PathBuf, String> {
    let path = Path::new(relative);
    if relative.is_empty() {
        return Err("refusing to write an empty path".to_string());
    }
    for component in path.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir => {
                return Err(format!("refusing to write outside the root: {}", relative));
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(format!("refusing to write an absolute path: {}", relative));
            }
        }
    }
    Ok(root.join(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use architect_common::{ChangeType, GeneratedFile};
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use tempfile::tempdir;

    /// Records every write; fails for paths ending in one of `fail_suffixes`.
    #[derive(Default)]
    struct RecordingWriter {
        fail_suffixes: Vec<String>,
        writes: Mutex<Vec<PathBuf>>,
    }

    impl RecordingWriter {
        fn failing_on(suffix: &str) -> Self {
            Self {
                fail_suffixes: vec![suffix.to_string()],
                writes: Mutex::new(Vec::new()),
            }
        }

        fn written(&self) -> Vec<PathBuf> {
            self.writes.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl FileWriter for RecordingWriter {
        async fn write(&self, path: &Path, _bytes: &[u8]) -> std::io::Result<()> {
            self.writes.lock().unwrap().push(path.to_path_buf());
            let name = path.to_string_lossy();
            if self.fail_suffixes.iter().any(|s| name.ends_with(s.as_str())) {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "disk says no",
                ));
            }
            Ok(())
        }
    }

    struct HangingWriter;

    #[async_trait]
    impl FileWriter for HangingWriter {
        async fn write(&self, _path: &Path, _bytes: &[u8]) -> std::io::Result<()> {
            std::future::pending().await
        }
    }

    fn new_change(path: &str) -> NewChange {
        NewChange::from(&GeneratedFile::planned(path, "line one\nline two"))
    }

    fn ledger_with(writer: Arc<dyn FileWriter>) -> ChangeLedger {
        let mut ledger = ChangeLedger::new(writer, Some(Duration::from_secs(5)), EventBus::new(256));
        ledger.set_root(Some(PathBuf::from("/project")));
        ledger
    }

    #[test]
    fn test_ids_are_unique_until_cleared() {
        let mut ledger = ledger_with(Arc::new(RecordingWriter::default()));
        let ids: HashSet<ChangeId> = (0..10)
            .map(|i| ledger.add_change(new_change(&format!("src/{}.ts", i))).id)
            .collect();
        assert_eq!(ids.len(), 10);
        assert!(ids.contains(&ChangeId(1)));

        ledger.clear_changes();
        assert!(ledger.changes().is_empty());
        assert_eq!(ledger.add_change(new_change("src/a.ts")).id, ChangeId(1));
    }

    #[test]
    fn test_add_change_starts_pending_and_emits() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();
        let mut ledger = ChangeLedger::new(Arc::new(RecordingWriter::default()), None, bus);

        let change = ledger.add_change(new_change("src/index.ts"));
        assert_eq!(change.status, ChangeStatus::Pending);
        assert_eq!(change.change_type, ChangeType::New);
        assert_eq!(change.file_name, "index.ts");

        match rx.try_recv().unwrap() {
            PipelineEvent::ChangesUpdated { changes } => assert_eq!(changes, vec![change]),
            other => panic!("Expected ChangesUpdated, got {:?}", other),
        }
    }

    #[test]
    fn test_decisions_only_from_pending() {
        let mut ledger = ledger_with(Arc::new(RecordingWriter::default()));
        let a = ledger.add_change(new_change("a.ts")).id;

        assert!(matches!(ledger.approve_change(a), ChangeOutcome::Updated(_)));
        assert_eq!(
            ledger.reject_change(a),
            ChangeOutcome::Ignored(IgnoredReason::NotPending)
        );
        assert_eq!(
            ledger.approve_change(a),
            ChangeOutcome::Ignored(IgnoredReason::NotPending)
        );
        assert_eq!(
            ledger.approve_change(ChangeId(99)),
            ChangeOutcome::Ignored(IgnoredReason::ChangeNotFound)
        );
        assert_eq!(ledger.get(a).unwrap().status, ChangeStatus::Approved);
    }

    #[test]
    fn test_reject_all_leaves_approved_untouched() {
        let mut ledger = ledger_with(Arc::new(RecordingWriter::default()));
        let a = ledger.add_change(new_change("a.ts")).id;
        ledger.add_change(new_change("b.ts"));
        ledger.add_change(new_change("c.ts"));
        ledger.approve_change(a);

        assert_eq!(ledger.reject_all(), 2);
        assert_eq!(ledger.get(a).unwrap().status, ChangeStatus::Approved);
        assert!(ledger.pending_changes().is_empty());
    }

    #[tokio::test]
    async fn test_pending_change_cannot_be_applied() {
        let writer = Arc::new(RecordingWriter::default());
        let mut ledger = ledger_with(writer.clone());
        let a = ledger.add_change(new_change("a.ts")).id;

        assert_eq!(
            ledger.apply_change(a).await,
            ApplyOutcome::Ignored(IgnoredReason::NotApproved)
        );
        assert!(writer.written().is_empty());
        assert_eq!(ledger.get(a).unwrap().status, ChangeStatus::Pending);
    }

    #[tokio::test]
    async fn test_apply_writes_under_root() {
        let dir = tempdir().unwrap();
        let mut ledger = ChangeLedger::new(Arc::new(FsWriter), None, EventBus::new(16));
        ledger.set_root(Some(dir.path().to_path_buf()));
        let a = ledger.add_change(new_change("src/core/searcher.ts")).id;
        ledger.approve_change(a);

        let outcome = ledger.apply_change(a).await;
        let applied = match outcome {
            ApplyOutcome::Applied(change) => change,
            other => panic!("Expected Applied, got {:?}", other),
        };
        assert_eq!(applied.status, ChangeStatus::Applied);
        assert!(applied.applied_at.is_some());
        assert_eq!(
            std::fs::read_to_string(dir.path().join("src/core/searcher.ts")).unwrap(),
            "line one\nline two"
        );
        assert_eq!(
            ledger.apply_change(a).await,
            ApplyOutcome::Ignored(IgnoredReason::AlreadyApplied)
        );
    }

    #[tokio::test]
    async fn test_apply_without_root_is_ignored() {
        let mut ledger =
            ChangeLedger::new(Arc::new(RecordingWriter::default()), None, EventBus::new(16));
        let a = ledger.add_change(new_change("a.ts")).id;
        ledger.approve_change(a);

        assert_eq!(
            ledger.apply_change(a).await,
            ApplyOutcome::Ignored(IgnoredReason::NoRootLocation)
        );
        assert_eq!(ledger.get(a).unwrap().status, ChangeStatus::Approved);
    }

    #[tokio::test]
    async fn test_failed_write_is_observable_and_retryable() {
        let bus = EventBus::new(64);
        let mut rx = bus.subscribe();
        let writer = Arc::new(RecordingWriter::failing_on("b.ts"));
        let mut ledger = ChangeLedger::new(writer, None, bus);
        ledger.set_root(Some(PathBuf::from("/project")));
        let b = ledger.add_change(new_change("b.ts")).id;
        ledger.approve_change(b);

        match ledger.apply_change(b).await {
            ApplyOutcome::Failed { change, reason } => {
                assert_eq!(change.status, ChangeStatus::Failed);
                assert!(reason.contains("disk says no"));
                assert_eq!(change.failure.as_deref(), Some(reason.as_str()));
            }
            other => panic!("Expected Failed, got {:?}", other),
        }

        let saw_failed = std::iter::from_fn(|| rx.try_recv().ok())
            .any(|e| matches!(e, PipelineEvent::ChangeFailed { .. }));
        assert!(saw_failed);

        // Retrying goes through the writer again and may still fail.
        assert!(ledger.apply_change(b).await.is_failed());
        assert_eq!(ledger.failed_changes().len(), 1);
    }

    #[tokio::test]
    async fn test_apply_all_continues_past_failures() {
        let writer = Arc::new(RecordingWriter::failing_on("b.ts"));
        let mut ledger = ledger_with(writer.clone());
        let ids: Vec<ChangeId> = ["a.ts", "b.ts", "c.ts"]
            .iter()
            .map(|p| ledger.add_change(new_change(p)).id)
            .collect();
        for id in &ids {
            ledger.approve_change(*id);
        }

        let report = ledger.apply_all_approved().await;

        assert_eq!(report.applied(), 2);
        assert_eq!(report.failed(), 1);
        assert_eq!(
            writer.written(),
            vec![
                PathBuf::from("/project/a.ts"),
                PathBuf::from("/project/b.ts"),
                PathBuf::from("/project/c.ts")
            ]
        );
        let statuses: Vec<ChangeStatus> = ledger.changes().iter().map(|c| c.status).collect();
        assert_eq!(
            statuses,
            vec![ChangeStatus::Applied, ChangeStatus::Failed, ChangeStatus::Applied]
        );
    }

    #[tokio::test]
    async fn test_apply_all_skips_failed_changes() {
        let writer = Arc::new(RecordingWriter::failing_on("a.ts"));
        let mut ledger = ledger_with(writer.clone());
        let a = ledger.add_change(new_change("a.ts")).id;
        ledger.approve_change(a);
        ledger.apply_all_approved().await;

        let report = ledger.apply_all_approved().await;
        assert!(report.outcomes.is_empty());
        assert_eq!(writer.written().len(), 1);
    }

    #[tokio::test]
    async fn test_path_escape_is_refused() {
        let writer = Arc::new(RecordingWriter::default());
        let mut ledger = ledger_with(writer.clone());
        let up = ledger.add_change(new_change("../outside.ts")).id;
        let abs = ledger.add_change(new_change("/etc/passwd")).id;
        ledger.approve_change(up);
        ledger.approve_change(abs);

        let report = ledger.apply_all_approved().await;
        assert_eq!(report.failed(), 2);
        assert!(writer.written().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_write_times_out() {
        let mut ledger = ledger_with(Arc::new(HangingWriter));
        let a = ledger.add_change(new_change("a.ts")).id;
        ledger.approve_change(a);

        match ledger.apply_change(a).await {
            ApplyOutcome::Failed { reason, .. } => assert!(reason.contains("timed out")),
            other => panic!("Expected Failed, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_target() {
        let root = Path::new("/project");
        assert_eq!(
            resolve_target(root, "./src/index.ts").unwrap(),
            PathBuf::from("/project/./src/index.ts")
        );
        assert!(resolve_target(root, "src/../../x").is_err());
        assert!(resolve_target(root, "").is_err());
    }
}
