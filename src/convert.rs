use crate::{
    config::Config,
    error::ConversionError,
    naming::DerivedName,
    scratch::Scratch,
    tools::{Invocation, Stage, ToolRunner},
};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub struct SchematicConverter<R: ToolRunner> {
    cfg: Config,
    runner: R,
}

#[derive(Debug, Clone)]
pub struct Conversion {
    pub input: PathBuf,
    pub name: DerivedName,
    pub output: PathBuf,
    pub elapsed: Duration,
}

impl<R: ToolRunner> SchematicConverter<R> {
    pub fn new(cfg: &Config, runner: R) -> Self {
        Self {
            cfg: cfg.clone(),
            runner,
        }
    }

    /// Runs normalize -> bounding box -> materialize -> convert on one file.
    ///
    /// `out_dir` only ever receives a PDF from a run where every stage succeeded.
    ///
    /// Exclusion checks are the caller's job. The scratch directory is gone
    /// by the time this returns, on success and on failure.
    pub fn convert(&self, input: &Path) -> Result<Conversion, ConversionError> {
        let started = Instant::now();
        // Tools run with cwd = work_dir, so every path handed to them is absolute.
        let work_dir = std::path::absolute(self.cfg.work_dir())
            .map_err(|e| ConversionError::io("resolving work_dir", e))?;
        let out_dir = work_dir.join(&self.cfg.paths.out_dir);
        let name = DerivedName::from_path(input);
        let output = name.pdf_path(&out_dir);

        let scratch = Scratch::create(&work_dir, self.cfg.filter.working_copy_name())?;
        scratch.stage_input(input)?;

        let copy = scratch.working_copy();
        let normalized = scratch.normalized();
        let bbox = scratch.bbox_output();

        self.run_stage(
            Invocation::new(Stage::Normalize, &self.cfg.tools.eps_repair)
                .arg(&copy)
                .arg(&normalized),
            &work_dir,
        )?;

        self.run_stage(
            Invocation::new(Stage::BoundingBox, &self.cfg.tools.bbox)
                .arg("--bbox")
                .arg("--copy")
                .arg(&normalized)
                .arg(&bbox),
            &work_dir,
        )?;

        debug!(stage = %Stage::Materialize, "{} -> {}", bbox.display(), normalized.display());
        std::fs::rename(&bbox, &normalized).map_err(|e| {
            ConversionError::io(format!("moving {} over {}", bbox.display(), normalized.display()), e)
        })?;

        std::fs::create_dir_all(&out_dir)
            .map_err(|e| ConversionError::io(format!("create_dir_all {}", out_dir.display()), e))?;

        // A tool that dies halfway must not leave a truncated PDF in out_dir,
        // so it writes into scratch and only a successful result is published.
        let staged = scratch.staged_pdf();
        self.run_stage(
            Invocation::new(Stage::Convert, &self.cfg.tools.pdf)
                .arg(&normalized)
                .arg(&staged),
            &work_dir,
        )?;
        scratch.publish(&staged, &output)?;

        if let Err(e) = scratch.close() {
            warn!("{e}");
        }

        let conv = Conversion {
            input: input.to_path_buf(),
            name,
            output,
            elapsed: started.elapsed(),
        };
        info!(
            "Processed: {} -> {} ({} ms)",
            conv.input.display(),
            conv.output.display(),
            conv.elapsed.as_millis()
        );
        Ok(conv)
    }

    fn run_stage(&self, inv: Invocation, cwd: &Path) -> Result<(), ConversionError> {
        debug!(stage = %inv.stage, "{} {:?}", inv.program, inv.args);
        let out = self.runner.run(&inv, cwd)?;
        if !out.success {
            return Err(ConversionError::ToolFailed {
                stage: inv.stage,
                tool: inv.program,
                code: out.code,
                stderr: out.stderr_lossy(),
            });
        }
        Ok(())
    }
}
