use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::files::GeneratedFile;

/// Ledger-assigned change id. Monotonic within one ledger until it is cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeId(pub u64);

impl fmt::Display for ChangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "change-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    New,
    Modified,
    Deleted,
}

/// Lifecycle of a change.
///
/// ```text
/// pending ──► approved ──► applied
///    │            │  ▲
///    │            ▼  │ (explicit retry)
///    │          failed
///    ▼
/// rejected
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeStatus {
    Pending,
    Approved,
    Rejected,
    Applied,
    Failed,
}

impl ChangeStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, ChangeStatus::Rejected | ChangeStatus::Applied)
    }
}

impl fmt::Display for ChangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangeStatus::Pending => "pending",
            ChangeStatus::Approved => "approved",
            ChangeStatus::Rejected => "rejected",
            ChangeStatus::Applied => "applied",
            ChangeStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// A proposed file mutation awaiting a decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    pub id: ChangeId,
    pub file_path: String,
    pub file_name: String,
    pub change_type: ChangeType,
    pub status: ChangeStatus,
    pub original_content: Option<String>,
    pub new_content: String,
    pub added_lines: usize,
    pub removed_lines: usize,
    pub summary: String,
    /// Reason of the most recent failed write, cleared once applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_at: Option<DateTime<Utc>>,
}

/// The caller-supplied part of a change; the ledger fills in id and status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChange {
    pub file_path: String,
    pub file_name: String,
    pub change_type: ChangeType,
    pub original_content: Option<String>,
    pub new_content: String,
    pub added_lines: usize,
    pub removed_lines: usize,
    pub summary: String,
}

impl NewChange {
    pub fn into_change(self, id: ChangeId) -> FileChange {
        FileChange {
            id,
            file_path: self.file_path,
            file_name: self.file_name,
            change_type: self.change_type,
            status: ChangeStatus::Pending,
            original_content: self.original_content,
            new_content: self.new_content,
            added_lines: self.added_lines,
            removed_lines: self.removed_lines,
            summary: self.summary,
            failure: None,
            created_at: Utc::now(),
            applied_at: None,
        }
    }
}

impl From<&GeneratedFile> for NewChange {
    fn from(file: &GeneratedFile) -> Self {
        let (change_type, summary) = if file.is_new {
            (ChangeType::New, "New file")
        } else {
            (ChangeType::Modified, "Modified file")
        };
        Self {
            file_path: file.path.clone(),
            file_name: file.file_name().to_string(),
            change_type,
            original_content: None,
            new_content: file.content.clone(),
            added_lines: file.total_lines(),
            removed_lines: 0,
            summary: summary.to_string(),
        }
    }
}
