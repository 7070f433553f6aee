use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Output base name for a converted schematic.
///
/// Vendor plot exports are named `<lib>,<cell>,<view>...`; the cell segment
/// becomes the PDF name. Anything else keeps its own stem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedName(String);

impl DerivedName {
    pub fn from_file_name(file_name: &str) -> Self {
        if file_name.matches(',').count() >= 2 {
            let cell = file_name.split(',').nth(1).unwrap_or_default();
            if !cell.is_empty() {
                return Self(cell.to_string());
            }
        }
        Self(strip_extension(file_name).to_string())
    }

    /// Applies the rule to the last component of `path`.
    pub fn from_path(path: &Path) -> Self {
        Self::from_file_name(&crate::util::file_name_str(path))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn pdf_path(&self, out_dir: &Path) -> PathBuf {
        out_dir.join(format!("{}.pdf", self.0))
    }
}

impl fmt::Display for DerivedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Drops the last `.ext`; leading dots are part of the stem.
fn strip_extension(name: &str) -> &str {
    let body_start = name.len() - name.trim_start_matches('.').len();
    match name[body_start..].rfind('.') {
        Some(i) => &name[..body_start + i],
        None => name,
    }
}

