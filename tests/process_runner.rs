#![cfg(unix)]

use schemconv::{
    config::Config,
    error::ConversionError,
    tools::{Invocation, ProcessRunner, Stage, ToolRunner},
};
use std::path::Path;
use std::time::{Duration, Instant};

fn sh(script: &str) -> Invocation {
    Invocation::new(Stage::Normalize, "sh").arg("-c").arg(script)
}

#[test]
fn captures_stderr_and_exit_code() {
    let runner = ProcessRunner::new(&Config::default());
    let out = runner
        .run(&sh("echo ok; echo broken >&2; exit 3"), Path::new("."))
        .unwrap();
    assert!(!out.success);
    assert_eq!(out.code, Some(3));
    assert_eq!(out.stderr_lossy().trim(), "broken");
    assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "ok");
}

#[test]
fn missing_binary_is_tool_missing() {
    let runner = ProcessRunner::new(&Config::default());
    let inv = Invocation::new(Stage::BoundingBox, "definitely-not-a-real-tool-7f3a");
    let err = runner.run(&inv, Path::new(".")).unwrap_err();
    assert!(
        matches!(err, ConversionError::ToolMissing { ref tool, .. } if tool == "definitely-not-a-real-tool-7f3a")
    );
}

#[test]
fn runs_in_the_given_directory_with_env() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = Config::default();
    cfg.tools.env.insert("SCHEMCONV_TEST".into(), "hello".into());
    let runner = ProcessRunner::new(&cfg);
    let out = runner
        .run(&sh("printf %s \"$SCHEMCONV_TEST\" > marker"), dir.path())
        .unwrap();
    assert!(out.success);
    assert_eq!(
        std::fs::read_to_string(dir.path().join("marker")).unwrap(),
        "hello"
    );
}

#[test]
fn timeout_kills_the_tool() {
    let mut cfg = Config::default();
    cfg.tools.timeout_seconds = 1;
    let runner = ProcessRunner::new(&cfg);
    let err = runner
        .run(&sh("echo starting >&2; exec sleep 30"), Path::new("."))
        .unwrap_err();
    match err {
        ConversionError::ToolTimedOut { tool, secs, .. } => {
            assert_eq!(tool, "sh");
            assert_eq!(secs, 1);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn timeout_reaches_grandchildren() {
    let mut cfg = Config::default();
    cfg.tools.timeout_seconds = 1;
    let runner = ProcessRunner::new(&cfg);
    let started = Instant::now();
    // sh forks sleep rather than exec'ing it, like the gs wrapper scripts do
    let err = runner
        .run(&sh("sleep 8; true"), Path::new("."))
        .unwrap_err();
    assert!(matches!(err, ConversionError::ToolTimedOut { .. }));
    assert!(
        started.elapsed() < Duration::from_secs(5),
        "timed out only after {:?}",
        started.elapsed()
    );
}

#[test]
fn timeout_path_still_collects_output() {
    let mut cfg = Config::default();
    cfg.tools.timeout_seconds = 10;
    let runner = ProcessRunner::new(&cfg);
    let out = runner.run(&sh("echo warn >&2; exit 0"), Path::new(".")).unwrap();
    assert!(out.success);
    assert_eq!(out.stderr_lossy().trim(), "warn");
}
