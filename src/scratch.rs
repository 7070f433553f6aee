//! Per-conversion scratch space.
//!
//! Every conversion gets its own hidden directory under the working
//! directory, so conversions never share temporary file names. The
//! directory and everything in it is removed when the [`Scratch`] is
//! dropped, whichever way the pipeline exits.

use crate::error::ConversionError;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};

pub const SCRATCH_PREFIX: &str = ".schemconv-";
const BBOX_OUTPUT: &str = "temp";
const STAGED_PDF: &str = "out.pdf";

pub struct Scratch {
    dir: Option<TempDir>,
    copy_name: String,
}

impl Scratch {
    pub fn create(work_dir: &Path, copy_name: &str) -> Result<Self, ConversionError> {
        let dir = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .tempdir_in(work_dir)
            .map_err(|e| {
                ConversionError::io(format!("creating scratch dir in {}", work_dir.display()), e)
            })?;
        debug!("scratch dir {}", dir.path().display());
        Ok(Self {
            dir: Some(dir),
            copy_name: copy_name.to_string(),
        })
    }

    pub fn path(&self) -> &Path {
        match &self.dir {
            Some(d) => d.path(),
            None => Path::new(""),
        }
    }

    /// Private copy of the input.
    pub fn working_copy(&self) -> PathBuf {
        self.path().join(&self.copy_name)
    }

    /// Normalized EPS; also the file the PDF stage reads.
    pub fn normalized(&self) -> PathBuf {
        self.path().join(format!("{}.eps", self.copy_name))
    }

    pub fn bbox_output(&self) -> PathBuf {
        self.path().join(BBOX_OUTPUT)
    }

    /// Where the PDF tool writes before the result is published to `out_dir`.
    pub fn staged_pdf(&self) -> PathBuf {
        self.path().join(STAGED_PDF)
    }

    pub fn stage_input(&self, input: &Path) -> Result<(), ConversionError> {
        std::fs::copy(input, self.working_copy())
            .map(|_| ())
            .map_err(|e| ConversionError::io(format!("copying {}", input.display()), e))
    }

    /// Moves a finished artifact out of scratch. Falls back to copy when
    /// `dest` is on another filesystem.
    pub fn publish(&self, staged: &Path, dest: &Path) -> Result<(), ConversionError> {
        if std::fs::rename(staged, dest).is_ok() {
            return Ok(());
        }
        std::fs::copy(staged, dest).map(|_| ()).map_err(|e| {
            let _ = std::fs::remove_file(dest);
            ConversionError::io(format!("publishing {}", dest.display()), e)
        })
    }

    /// Removes the directory now and reports failures; `Drop` does the same silently.
    pub fn close(mut self) -> Result<(), ConversionError> {
        match self.dir.take() {
            Some(d) => {
                let p = d.path().to_path_buf();
                d.close()
                    .map_err(|e| ConversionError::io(format!("removing {}", p.display()), e))
            }
            None => Ok(()),
        }
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        if let Some(d) = self.dir.take() {
            let p = d.path().to_path_buf();
            if let Err(e) = d.close() {
                warn!("failed to remove scratch dir {}: {e}", p.display());
            }
        }
    }
}
