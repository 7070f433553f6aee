#![allow(dead_code)]

use schemconv::{
    config::Config,
    error::ConversionError,
    tools::{Invocation, Stage, ToolOutput, ToolRunner},
};
use std::cell::RefCell;
use std::path::{Path, PathBuf};

/// Stands in for eps2eps/epstool/epstopdf by copying input to output.
#[derive(Default)]
pub struct FakeRunner {
    pub calls: RefCell<Vec<Invocation>>,
    pub fail_stage: Option<(Stage, String)>,
    pub missing_stage: Option<Stage>,
    /// Only fail when the working copy contains this marker.
    pub fail_marker: Option<String>,
    /// Write a truncated destination before reporting failure.
    pub partial_write: bool,
}

impl FakeRunner {
    pub fn failing(stage: Stage, stderr: &str) -> Self {
        Self {
            fail_stage: Some((stage, stderr.to_string())),
            ..Default::default()
        }
    }

    pub fn missing(stage: Stage) -> Self {
        Self {
            missing_stage: Some(stage),
            ..Default::default()
        }
    }

    pub fn failing_on_content(stage: Stage, marker: &str) -> Self {
        Self {
            fail_stage: Some((stage, "bad EPS".to_string())),
            fail_marker: Some(marker.to_string()),
            ..Default::default()
        }
    }

    pub fn failing_after_partial_write(stage: Stage) -> Self {
        Self {
            fail_stage: Some((stage, "Error: /ioerror in --showpage--".to_string())),
            partial_write: true,
            ..Default::default()
        }
    }

    pub fn stages(&self) -> Vec<Stage> {
        self.calls.borrow().iter().map(|c| c.stage).collect()
    }
}

impl ToolRunner for FakeRunner {
    fn run(&self, inv: &Invocation, _cwd: &Path) -> Result<ToolOutput, ConversionError> {
        self.calls.borrow_mut().push(inv.clone());

        if self.missing_stage == Some(inv.stage) {
            return Err(ConversionError::ToolMissing {
                tool: inv.program.clone(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            });
        }

        let n = inv.args.len();
        let src = PathBuf::from(&inv.args[n - 2]);
        let dst = PathBuf::from(&inv.args[n - 1]);

        if let Some((stage, stderr)) = &self.fail_stage {
            let content_hit = match &self.fail_marker {
                Some(m) => std::fs::read_to_string(&src)
                    .map(|s| s.contains(m.as_str()))
                    .unwrap_or(false),
                None => true,
            };
            if *stage == inv.stage && content_hit {
                if self.partial_write {
                    std::fs::write(&dst, "%PDF-1.4 truncated")
                        .map_err(|e| ConversionError::io("fake partial write", e))?;
                }
                return Ok(ToolOutput {
                    success: false,
                    code: Some(1),
                    stdout: Vec::new(),
                    stderr: stderr.as_bytes().to_vec(),
                });
            }
        }

        std::fs::copy(&src, &dst).map_err(|e| ConversionError::io("fake copy", e))?;
        Ok(ToolOutput {
            success: true,
            code: Some(0),
            ..Default::default()
        })
    }
}

pub fn config_for(dir: &Path) -> Config {
    let mut cfg = Config::default();
    cfg.paths.work_dir = dir.display().to_string();
    cfg
}

pub fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
    let p = dir.join(name);
    std::fs::write(&p, body).expect("write fixture");
    p
}

/// Sorted names of everything directly under `dir`.
pub fn entries(dir: &Path) -> Vec<String> {
    let mut v: Vec<String> = std::fs::read_dir(dir)
        .expect("read_dir")
        .map(|e| e.expect("entry").file_name().to_string_lossy().into_owned())
        .collect();
    v.sort();
    v
}
