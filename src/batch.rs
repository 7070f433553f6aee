use crate::{
    config::Config,
    convert::SchematicConverter,
    error::{ConversionError, InputError},
    report::{BatchReport, FileReport, FileStatus, RunMode},
    select::InputFilter,
    tools::ToolRunner,
    util::{file_name_str, now_rfc3339, sha256_file},
};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Drives the converter over one named file or a whole directory.
pub struct BatchDriver<R: ToolRunner> {
    cfg: Config,
    filter: InputFilter,
    converter: SchematicConverter<R>,
    use_libname: bool,
}

impl<R: ToolRunner> BatchDriver<R> {
    pub fn new(cfg: &Config, runner: R) -> Result<Self> {
        Ok(Self {
            cfg: cfg.clone(),
            filter: InputFilter::from_config(&cfg.filter)?,
            converter: SchematicConverter::new(cfg, runner),
            use_libname: false,
        })
    }

    /// Recorded in the report only; naming ignores it.
    pub fn with_use_libname(mut self, on: bool) -> Self {
        self.use_libname = on;
        self
    }

    pub fn run(&self, target: Option<&Path>) -> Result<BatchReport> {
        if self.use_libname {
            debug!("-uselibname given; it does not change output naming");
        }
        match target {
            Some(p) => Ok(self.run_single(p)),
            None => self.run_batch(),
        }
    }

    pub fn run_single(&self, input: &Path) -> BatchReport {
        let started = now_rfc3339();
        let entry = match self.check_single(input) {
            Ok(()) => self.convert_one(input),
            Err(e) => {
                error!("Error: {e}");
                let status = match e {
                    InputError::NotFound { .. } => FileStatus::NotFound,
                    InputError::Excluded { .. } => FileStatus::Excluded,
                };
                let mut r = FileReport::new(input.display().to_string(), status);
                r.error = Some(e.to_string());
                r
            }
        };
        self.finish(RunMode::Single, started, vec![entry])
    }

    fn check_single(&self, input: &Path) -> Result<(), InputError> {
        if !input.is_file() {
            return Err(InputError::NotFound {
                path: input.to_path_buf(),
            });
        }
        if let Some(reason) = self.filter.exclusion(input) {
            return Err(InputError::Excluded {
                path: input.to_path_buf(),
                reason,
            });
        }
        Ok(())
    }

    pub fn run_batch(&self) -> Result<BatchReport> {
        let started = now_rfc3339();
        let work_dir = self.cfg.work_dir();
        let candidates = list_regular_files(&work_dir)?;
        info!("batch: {} files in {}", candidates.len(), work_dir.display());

        let mut files = Vec::with_capacity(candidates.len());
        for path in candidates {
            if let Some(reason) = self.filter.exclusion(&path) {
                debug!("skip {} ({reason})", path.display());
                let mut r = FileReport::new(path.display().to_string(), FileStatus::Excluded);
                r.error = Some(reason.to_string());
                files.push(r);
                continue;
            }
            files.push(self.convert_one(&path));
        }

        self.remove_reserved_leftovers(&work_dir);
        Ok(self.finish(RunMode::Batch, started, files))
    }

    fn convert_one(&self, input: &Path) -> FileReport {
        info!("Processing: {}", file_name_str(input));
        let started = Instant::now();
        let mut r = FileReport::new(input.display().to_string(), FileStatus::Failed);
        r.input_sha256 = match sha256_file(input) {
            Ok(h) => Some(h),
            Err(e) => {
                warn!("hashing {}: {e:#}", input.display());
                None
            }
        };

        match self.converter.convert(input) {
            Ok(conv) => {
                r.status = FileStatus::Converted;
                r.output = Some(conv.output.display().to_string());
            }
            Err(e) => {
                report_failure(input, &e);
                r.error_kind = Some(e.kind());
                r.error = Some(e.to_string());
                r.stderr = e.stderr_text();
            }
        }
        r.elapsed_ms = started.elapsed().as_millis() as u64;
        r
    }

    /// Clears reserved-name files a previous, interrupted run may have left.
    fn remove_reserved_leftovers(&self, work_dir: &Path) {
        for name in &self.cfg.filter.reserved_names {
            let p = work_dir.join(name);
            if p.is_file() {
                match std::fs::remove_file(&p) {
                    Ok(()) => debug!("removed leftover {}", p.display()),
                    Err(e) => warn!("failed to remove {}: {e}", p.display()),
                }
            }
        }
    }

    fn finish(&self, mode: RunMode, started: String, files: Vec<FileReport>) -> BatchReport {
        BatchReport {
            mode,
            started,
            finished: now_rfc3339(),
            work_dir: self.cfg.work_dir().display().to_string(),
            out_dir: self.cfg.out_dir().display().to_string(),
            use_libname: self.use_libname,
            files,
        }
    }
}

fn report_failure(input: &Path, e: &ConversionError) {
    match e {
        ConversionError::ToolMissing { .. } => error!("Error: {e}"),
        ConversionError::ToolFailed { .. } | ConversionError::ToolTimedOut { .. } => {
            error!("Error processing {}: {e}", input.display());
            if let Some(stderr) = e.stderr_text() {
                error!("Standard Error:\n{stderr}");
            }
        }
        ConversionError::Io { .. } => {
            error!("An unexpected error occurred processing {}: {e}", input.display())
        }
    }
}

/// Regular files directly under `dir`, sorted by name.
fn list_regular_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("reading directory {}", dir.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("reading directory {}", dir.display()))?;
        let path = entry.path();
        if path.is_file() {
            out.push(path);
        }
    }
    out.sort();
    Ok(out)
}
