use crate::{
    batch::BatchDriver,
    config::Config,
    report::BatchReport,
    tools::ProcessRunner,
    util::ensure_dir,
};
use anyhow::{Context, Result, anyhow};
use clap::Parser;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer, Registry, layer::SubscriberExt, util::SubscriberInitExt,
};

/// Legacy single-dash flag; clap cannot parse it, so it is stripped up front.
pub const LIBNAME_FLAG: &str = "-uselibname";

#[derive(Parser, Debug)]
#[command(name = "schemconv")]
#[command(about = "Convert EDA schematic EPS plots to PDF (eps2eps + epstool + epstopdf)")]
pub struct Args {
    /// File to convert. If omitted, every eligible file in the working directory is converted.
    /// Use `--` before a name that starts with `-`.
    pub file: Option<PathBuf>,

    /// Anything after FILE is ignored.
    #[arg(hide = true)]
    pub extra: Vec<OsString>,

    /// Same as -uselibname. Accepted for compatibility; naming is unaffected.
    #[arg(long = "uselibname")]
    pub use_libname: bool,

    /// Path to config TOML. If omitted, uses ./schemconv.toml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Directory to scan for inputs and to hold scratch files.
    #[arg(long)]
    pub work_dir: Option<PathBuf>,

    /// Directory for generated PDFs.
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Write the JSON run report to this path.
    #[arg(long)]
    pub report: Option<PathBuf>,
}

pub fn parse_args() -> Args {
    parse_from(std::env::args_os())
}

pub fn parse_from<I, T>(raw: I) -> Args
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let (rest, libname) = strip_libname_flag(raw);
    let mut args = Args::parse_from(rest);
    args.use_libname |= libname;
    args
}

/// Removes every `-uselibname` occurrence, reporting whether one was present.
pub fn strip_libname_flag<I, T>(raw: I) -> (Vec<OsString>, bool)
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut found = false;
    let rest = raw
        .into_iter()
        .map(Into::into)
        .filter(|a| {
            let hit = a == LIBNAME_FLAG;
            found |= hit;
            !hit
        })
        .collect();
    (rest, found)
}

pub fn dispatch(args: Args) -> Result<()> {
    let mut cfg = Config::resolve(args.config.as_deref())?;
    apply_overrides(&mut cfg, &args);

    let log_path = resolve_log_path(&cfg);
    let _guard = init_logging(&args, &cfg, log_path.as_deref())?;

    if !args.extra.is_empty() {
        warn!("ignoring extra arguments: {:?}", args.extra);
    }

    let driver = BatchDriver::new(&cfg, ProcessRunner::new(&cfg))?.with_use_libname(args.use_libname);
    let report = driver.run(args.file.as_deref())?;

    let summary = report.summary();
    info!(
        "done: converted={} failed={} not_found={} excluded={}",
        summary.converted, summary.failed, summary.not_found, summary.excluded
    );

    if let Some(path) = resolve_report_path(&cfg, &args) {
        write_report(&report, &path)?;
    }

    if cfg.output.print_summary {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "mode": report.mode,
                "out_dir": report.out_dir,
                "summary": summary,
            }))?
        );
    }

    Ok(())
}

fn apply_overrides(cfg: &mut Config, args: &Args) {
    if let Some(w) = &args.work_dir {
        cfg.paths.work_dir = w.display().to_string();
    }
    if let Some(o) = &args.out_dir {
        cfg.paths.out_dir = o.display().to_string();
    }
}

fn resolve_report_path(cfg: &Config, args: &Args) -> Option<PathBuf> {
    if let Some(p) = &args.report {
        return Some(p.clone());
    }
    if cfg.output.write_report_json {
        return Some(cfg.out_dir().join(&cfg.output.report_filename));
    }
    None
}

fn write_report(report: &BatchReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(report)?)
        .with_context(|| format!("writing report: {}", path.display()))?;
    info!("report written to {}", path.display());
    Ok(())
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Console gets the per-file diagnostics as plain lines; the optional log
/// file keeps timestamps and targets for later inspection.
fn init_logging(args: &Args, cfg: &Config, file_path: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console: BoxedLayer = tracing_subscriber::fmt::layer()
        .without_time()
        .with_target(false)
        .with_level(true)
        .boxed();

    let mut layers = vec![console];
    let mut guard = None;
    if let Some(path) = file_path {
        let (layer, g) = file_layer(path, cfg.logging.file_json)?;
        layers.push(layer);
        guard = Some(g);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn file_layer(path: &Path, json: bool) -> Result<(BoxedLayer, WorkerGuard)> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent)?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file: {}", path.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(file);
    let base = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true);
    let layer: BoxedLayer = if json { base.json().boxed() } else { base.boxed() };
    Ok((layer, guard))
}

fn resolve_log_path(cfg: &Config) -> Option<PathBuf> {
    if !cfg.logging.write_to_file {
        return None;
    }

    if !cfg.logging.file_path.is_empty() {
        return Some(PathBuf::from(&cfg.logging.file_path));
    }

    // Dot-prefixed so a batch run never picks it up as an input.
    Some(cfg.work_dir().join(".schemconv.log"))
}
