//! File operations exposed to the UI. Every outcome, including failure, is
//! reported as a [`CommandResult`].

use chrono::{DateTime, Utc};
use genx_executor::CommandResult;
use serde_json::json;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tokio::fs;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOperation {
    Read,
    Write,
    Create,
    Mkdir,
    Delete,
    Rmdir,
    List,
    Stat,
    Copy,
    Move,
}

impl FileOperation {
    pub const ALL: [FileOperation; 10] = [
        FileOperation::Read,
        FileOperation::Write,
        FileOperation::Create,
        FileOperation::Mkdir,
        FileOperation::Delete,
        FileOperation::Rmdir,
        FileOperation::List,
        FileOperation::Stat,
        FileOperation::Copy,
        FileOperation::Move,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FileOperation::Read => "read",
            FileOperation::Write => "write",
            FileOperation::Create => "create",
            FileOperation::Mkdir => "mkdir",
            FileOperation::Delete => "delete",
            FileOperation::Rmdir => "rmdir",
            FileOperation::List => "list",
            FileOperation::Stat => "stat",
            FileOperation::Copy => "copy",
            FileOperation::Move => "move",
        }
    }
}

impl FromStr for FileOperation {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| ToolError::Validation(format!("Unknown file operation: {}", s)))
    }
}

pub struct FileOps;

impl FileOps {
    /// Dispatch by operation name; unknown names become a failed result.
    pub async fn perform_named(operation: &str, path: &str, data: Option<&str>) -> CommandResult {
        match operation.parse::<FileOperation>() {
            Ok(op) => Self::perform(op, path, data).await,
            Err(_) => CommandResult::failure(format!("Unknown file operation: {}", operation)),
        }
    }

    pub async fn perform(
        operation: FileOperation,
        path: impl AsRef<Path>,
        data: Option<&str>,
    ) -> CommandResult {
        let path = path.as_ref();
        match Self::run(operation, path, data).await {
            Ok(output) => CommandResult::ok(output),
            Err(e) => {
                tracing::warn!(
                    "File operation {} on {} failed: {}",
                    operation.name(),
                    path.display(),
                    e
                );
                CommandResult::failure(e.to_string())
            }
        }
    }

    async fn run(
        operation: FileOperation,
        path: &Path,
        data: Option<&str>,
    ) -> Result<String, ToolError> {
        let shown = path.display();

        match operation {
            FileOperation::Read => Ok(fs::read_to_string(path).await?),
            FileOperation::Write => {
                fs::write(path, data.unwrap_or_default()).await?;
                Ok(format!("File written to {}", shown))
            }
            FileOperation::Create => {
                fs::write(path, "").await?;
                Ok(format!("File created at {}", shown))
            }
            FileOperation::Mkdir => {
                fs::create_dir_all(path).await?;
                Ok(format!("Directory created at {}", shown))
            }
            FileOperation::Delete => {
                fs::remove_file(path).await?;
                Ok(format!("File deleted: {}", shown))
            }
            FileOperation::Rmdir => {
                fs::remove_dir_all(path).await?;
                Ok(format!("Directory deleted: {}", shown))
            }
            FileOperation::List => {
                let mut names = Vec::new();
                let mut dir = fs::read_dir(path).await?;
                while let Some(entry) = dir.next_entry().await? {
                    names.push(entry.file_name().to_string_lossy().to_string());
                }
                names.sort();
                Ok(names.join("\n"))
            }
            FileOperation::Stat => {
                let meta = fs::metadata(path).await?;
                let stats = json!({
                    "size": meta.len(),
                    "isFile": meta.is_file(),
                    "isDirectory": meta.is_dir(),
                    "modified": meta.modified().ok().map(|t| DateTime::<Utc>::from(t).to_rfc3339()),
                    "created": meta.created().ok().map(|t| DateTime::<Utc>::from(t).to_rfc3339()),
                });
                Ok(serde_json::to_string_pretty(&stats)?)
            }
            FileOperation::Copy => {
                let destination = require_destination(operation, data)?;
                fs::copy(path, destination).await?;
                Ok(format!("File copied from {} to {}", shown, destination))
            }
            FileOperation::Move => {
                let destination = require_destination(operation, data)?;
                fs::rename(path, destination).await?;
                Ok(format!("File moved from {} to {}", shown, destination))
            }
        }
    }
}

fn require_destination(operation: FileOperation, data: Option<&str>) -> Result<&str, ToolError> {
    data.filter(|d| !d.trim().is_empty()).ok_or_else(|| {
        ToolError::Validation(format!("'{}' requires a destination path", operation.name()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notes.txt");

        let written = FileOps::perform(FileOperation::Write, &file, Some("hello")).await;
        assert!(written.success);
        assert!(written.output.starts_with("File written to"));

        let read = FileOps::perform(FileOperation::Read, &file, None).await;
        assert!(read.success);
        assert_eq!(read.output, "hello");
    }

    #[tokio::test]
    async fn test_mkdir_list_and_rmdir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");

        assert!(FileOps::perform(FileOperation::Mkdir, &nested, None).await.success);
        assert!(FileOps::perform(FileOperation::Create, nested.join("z.txt"), None).await.success);
        assert!(FileOps::perform(FileOperation::Create, nested.join("y.txt"), None).await.success);

        let listed = FileOps::perform(FileOperation::List, &nested, None).await;
        assert_eq!(listed.output, "y.txt\nz.txt");

        let removed = FileOps::perform(FileOperation::Rmdir, dir.path().join("a"), None).await;
        assert!(removed.success);
        assert!(!dir.path().join("a").exists());
    }

    #[tokio::test]
    async fn test_stat_reports_kind_and_size() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("data.bin");
        std::fs::write(&file, b"12345").unwrap();

        let result = FileOps::perform(FileOperation::Stat, &file, None).await;
        assert!(result.success);

        let stats: serde_json::Value = serde_json::from_str(&result.output).unwrap();
        assert_eq!(stats["size"], 5);
        assert_eq!(stats["isFile"], true);
        assert_eq!(stats["isDirectory"], false);
    }

    #[tokio::test]
    async fn test_copy_and_move() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.txt");
        let copy = dir.path().join("copy.txt");
        let moved = dir.path().join("moved.txt");
        std::fs::write(&src, "payload").unwrap();

        let copied = FileOps::perform(FileOperation::Copy, &src, copy.to_str()).await;
        assert!(copied.success);
        assert_eq!(std::fs::read_to_string(&copy).unwrap(), "payload");

        let renamed = FileOps::perform(FileOperation::Move, &copy, moved.to_str()).await;
        assert!(renamed.success);
        assert!(!copy.exists());
        assert!(moved.exists());
    }

    #[tokio::test]
    async fn test_copy_without_destination_fails() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.txt");
        std::fs::write(&src, "payload").unwrap();

        let result = FileOps::perform(FileOperation::Copy, &src, None).await;
        assert!(!result.success);
        assert!(result.error.unwrap().contains("destination"));
    }

    #[tokio::test]
    async fn test_errors_are_reported_not_thrown() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.txt");

        let result = FileOps::perform(FileOperation::Read, &missing, None).await;
        assert!(!result.success);
        assert!(result.output.is_empty());
        assert!(!result.error.unwrap_or_default().is_empty());

        let deleted = FileOps::perform(FileOperation::Delete, &missing, None).await;
        assert!(!deleted.success);
    }

    #[tokio::test]
    async fn test_unknown_operation() {
        let result = FileOps::perform_named("shred", "/tmp/x", None).await;
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Unknown file operation: shred"));
    }

    #[test]
    fn test_operation_names_roundtrip() {
        for op in FileOperation::ALL {
            assert_eq!(op.name().parse::<FileOperation>().unwrap(), op);
        }
    }
}
