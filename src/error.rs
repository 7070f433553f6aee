//! Failure taxonomy for a single conversion.
//!
//! [`ConversionError`] covers everything that can go wrong once a file has
//! entered the pipeline. [`InputError`] covers the single-file pre-checks.
//! Neither ever aborts a batch; the driver records them per file.

use crate::select::Exclusion;
use crate::tools::Stage;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

pub const EMPTY_STDERR: &str = "Standard error was empty.";

#[derive(Debug, Error)]
pub enum ConversionError {
    /// The binary could not be located or executed.
    #[error("required tool not found: {tool}")]
    ToolMissing {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// The tool ran and exited non-zero.
    #[error("{stage} stage failed: {tool} exited with {}", describe_code(*code))]
    ToolFailed {
        stage: Stage,
        tool: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("{stage} stage failed: {tool} timed out after {secs}s")]
    ToolTimedOut {
        stage: Stage,
        tool: String,
        secs: u64,
        stderr: String,
    },

    /// Copy, rename, mkdir and other local I/O.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ToolMissing,
    ToolFailed,
    Unexpected,
}

impl ConversionError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ToolMissing { .. } => ErrorKind::ToolMissing,
            Self::ToolFailed { .. } | Self::ToolTimedOut { .. } => ErrorKind::ToolFailed,
            Self::Io { .. } => ErrorKind::Unexpected,
        }
    }

    /// Captured stderr for tool failures, with the empty case spelled out.
    pub fn stderr_text(&self) -> Option<String> {
        match self {
            Self::ToolFailed { stderr, .. } | Self::ToolTimedOut { stderr, .. } => {
                let trimmed = stderr.trim();
                if trimmed.is_empty() {
                    Some(EMPTY_STDERR.to_string())
                } else {
                    Some(trimmed.to_string())
                }
            }
            _ => None,
        }
    }
}

fn describe_code(code: Option<i32>) -> String {
    match code {
        Some(c) => format!("exit status {c}"),
        None => "no exit status (killed by signal)".to_string(),
    }
}

#[derive(Debug, Error)]
pub enum InputError {
    #[error("File '{}' not found.", path.display())]
    NotFound { path: PathBuf },

    #[error("File '{}' is excluded ({reason}).", path.display())]
    Excluded { path: PathBuf, reason: Exclusion },
}
