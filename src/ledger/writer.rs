use architect_common::FileWriter;
use async_trait::async_trait;
use std::path::Path;

/// Writes through `tokio::fs`, creating parent directories as needed.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsWriter;

#[async_trait]
impl FileWriter for FsWriter {
    async fn write(&self, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, bytes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_writes_into_missing_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("src/core/searcher.ts");

        FsWriter.write(&path, b"export {};\n").await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "export {};\n");
    }

    #[tokio::test]
    async fn test_overwrites_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.ts");
        std::fs::write(&path, "old").unwrap();

        FsWriter.write(&path, b"new").await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    }
}
