use crate::error::ErrorKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    Single,
    Batch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Converted,
    Failed,
    NotFound,
    Excluded,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    pub input: String,
    pub status: FileStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_sha256: Option<String>,
    pub elapsed_ms: u64,
}

impl FileReport {
    pub fn new(input: impl Into<String>, status: FileStatus) -> Self {
        Self {
            input: input.into(),
            status,
            output: None,
            error_kind: None,
            error: None,
            stderr: None,
            input_sha256: None,
            elapsed_ms: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub mode: RunMode,
    pub started: String,
    pub finished: String,
    pub work_dir: String,
    pub out_dir: String,
    pub use_libname: bool,
    pub files: Vec<FileReport>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub converted: usize,
    pub failed: usize,
    pub not_found: usize,
    pub excluded: usize,
}

impl BatchReport {
    pub fn summary(&self) -> Summary {
        let mut s = Summary::default();
        for f in &self.files {
            match f.status {
                FileStatus::Converted => s.converted += 1,
                FileStatus::Failed => s.failed += 1,
                FileStatus::NotFound => s.not_found += 1,
                FileStatus::Excluded => s.excluded += 1,
            }
        }
        s
    }

    pub fn with_status(&self, status: FileStatus) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter(move |f| f.status == status)
    }
}
