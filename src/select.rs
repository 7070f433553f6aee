use crate::config::Filter;
use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Why an input was kept out of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Exclusion {
    Suffix(String),
    Dotfile,
    Reserved,
    Pattern(String),
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Exclusion::Suffix(s) => write!(f, "suffix {s}"),
            Exclusion::Dotfile => f.write_str("dotfile"),
            Exclusion::Reserved => f.write_str("reserved temporary name"),
            Exclusion::Pattern(p) => write!(f, "matches /{p}/"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct InputFilter {
    suffixes: Vec<String>,
    skip_dotfiles: bool,
    reserved: Vec<String>,
    patterns: Vec<Regex>,
}

impl InputFilter {
    pub fn from_config(cfg: &Filter) -> Result<Self> {
        let patterns = cfg
            .exclude_patterns
            .iter()
            .map(|p| Regex::new(p).with_context(|| format!("invalid exclude pattern: {p}")))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            suffixes: cfg.excluded_suffixes.clone(),
            skip_dotfiles: cfg.skip_dotfiles,
            reserved: cfg.reserved_names.clone(),
            patterns,
        })
    }

    /// Checks the file-name component of `path`.
    pub fn exclusion(&self, path: &Path) -> Option<Exclusion> {
        let name = crate::util::file_name_str(path);

        if let Some(s) = self.suffixes.iter().find(|s| name.ends_with(s.as_str())) {
            return Some(Exclusion::Suffix(s.clone()));
        }
        if self.skip_dotfiles && name.starts_with('.') {
            return Some(Exclusion::Dotfile);
        }
        if self.reserved.iter().any(|r| *r == name) {
            return Some(Exclusion::Reserved);
        }
        self.patterns
            .iter()
            .find(|r| r.is_match(&name))
            .map(|r| Exclusion::Pattern(r.as_str().to_string()))
    }

    pub fn is_eligible(&self, path: &Path) -> bool {
        self.exclusion(path).is_none()
    }
}
