pub mod process;
pub mod types;

use crate::error::ConversionError;
use std::path::Path;

pub use process::ProcessRunner;
pub use types::{Invocation, Stage, ToolOutput};

/// Runs one external tool to completion.
///
/// A spawn failure is an `Err`; a non-zero exit is an `Ok` with
/// `success == false` so the caller can attach the stage to it.
pub trait ToolRunner {
    fn run(&self, inv: &Invocation, cwd: &Path) -> Result<ToolOutput, ConversionError>;
}

impl<T: ToolRunner + ?Sized> ToolRunner for &T {
    fn run(&self, inv: &Invocation, cwd: &Path) -> Result<ToolOutput, ConversionError> {
        (**self).run(inv, cwd)
    }
}
