use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Pending,
    Streaming,
    Complete,
}

/// A planned output file. `content` is fixed at planning time; streaming only
/// reports progress over it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedFile {
    pub path: String,
    pub content: String,
    pub is_new: bool,
    pub status: FileStatus,
    pub streamed_line_count: usize,
}

impl GeneratedFile {
    pub fn planned(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            is_new: true,
            status: FileStatus::Pending,
            streamed_line_count: 0,
        }
    }

    /// Number of lines as streamed: the content split on `\n`, so a trailing
    /// newline contributes a final empty line.
    pub fn total_lines(&self) -> usize {
        self.content.split('\n').count()
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.content.split('\n')
    }

    pub fn is_complete(&self) -> bool {
        self.status == FileStatus::Complete
    }

    /// Last path segment.
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// Transient progress report for one streamed line. Emitted, never retained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamingProgress {
    pub file_path: String,
    pub current_line: usize,
    pub total_lines: usize,
    pub line_text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_lines_counts_trailing_newline() {
        let file = GeneratedFile::planned("src/a.ts", "one\ntwo\n");
        assert_eq!(file.total_lines(), 3);
        assert_eq!(file.lines().last(), Some(""));
    }

    #[test]
    fn test_empty_content_is_one_line() {
        let file = GeneratedFile::planned("src/a.ts", "");
        assert_eq!(file.total_lines(), 1);
    }

    #[test]
    fn test_file_name_is_last_segment() {
        let file = GeneratedFile::planned("src/core/searcher.ts", "x");
        assert_eq!(file.file_name(), "searcher.ts");
        let bare = GeneratedFile::planned("README", "x");
        assert_eq!(bare.file_name(), "README");
    }

    #[test]
    fn test_planned_file_starts_pending() {
        let file = GeneratedFile::planned("src/index.ts", "x");
        assert_eq!(file.status, FileStatus::Pending);
        assert_eq!(file.streamed_line_count, 0);
        assert!(file.is_new);
        assert!(!file.is_complete());
    }
}
