use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "schemconv.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: Paths,
    #[serde(default)]
    pub tools: Tools,
    #[serde(default)]
    pub filter: Filter,
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub logging: Logging,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw)
            .with_context(|| format!("parsing TOML: {}", path.display()))?;
        Ok(cfg)
    }

    /// Loads the explicit path if given, else `./schemconv.toml` when present,
    /// else the built-in defaults.
    pub fn resolve(user: Option<&Path>) -> Result<Self> {
        if let Some(p) = user {
            return Self::load(p);
        }
        let default = PathBuf::from(DEFAULT_CONFIG_FILE);
        if default.is_file() {
            Self::load(&default)
        } else {
            Ok(Self::default())
        }
    }

    pub fn work_dir(&self) -> PathBuf {
        PathBuf::from(&self.paths.work_dir)
    }

    /// Output directory; relative values hang off `work_dir`.
    pub fn out_dir(&self) -> PathBuf {
        self.work_dir().join(&self.paths.out_dir)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paths {
    pub work_dir: String,
    pub out_dir: String,
}
impl Default for Paths {
    fn default() -> Self {
        Self {
            work_dir: ".".into(),
            out_dir: "pdf".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tools {
    pub eps_repair: String,
    pub bbox: String,
    pub pdf: String,
    /// Per-invocation limit; 0 waits forever.
    pub timeout_seconds: u64,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}
impl Default for Tools {
    fn default() -> Self {
        Self {
            eps_repair: "eps2eps".into(),
            bbox: "epstool".into(),
            pdf: "epstopdf".into(),
            timeout_seconds: 0,
            env: Default::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Filter {
    pub excluded_suffixes: Vec<String>,
    pub skip_dotfiles: bool,
    /// The first entry doubles as the name of the working copy inside a scratch dir.
    pub reserved_names: Vec<String>,
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}
impl Default for Filter {
    fn default() -> Self {
        Self {
            excluded_suffixes: vec![".py".into(), ".pdf".into(), ".swp".into()],
            skip_dotfiles: true,
            reserved_names: vec!["tempfile".into()],
            exclude_patterns: vec![r"^schemconv\.toml$".into()],
        }
    }
}

impl Filter {
    pub fn working_copy_name(&self) -> &str {
        self.reserved_names
            .first()
            .map(String::as_str)
            .unwrap_or("tempfile")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Output {
    pub print_summary: bool,
    pub write_report_json: bool,
    pub report_filename: String,
}
impl Default for Output {
    fn default() -> Self {
        Self {
            print_summary: false,
            write_report_json: false,
            report_filename: "schemconv-report.json".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logging {
    pub level: String,
    /// Format of the log file; the console is always plain text.
    pub file_json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".into(),
            file_json: false,
            write_to_file: false,
            file_path: "".into(),
        }
    }
}
