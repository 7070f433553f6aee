use schemconv::cli::{parse_from, strip_libname_flag};
use std::path::PathBuf;

#[test]
fn libname_flag_is_stripped_anywhere() {
    let (rest, found) = strip_libname_flag(["schemconv", "plot.eps", "-uselibname"]);
    assert!(found);
    assert_eq!(rest, vec!["schemconv", "plot.eps"]);

    let (rest, found) = strip_libname_flag(["schemconv", "-uselibname", "plot.eps"]);
    assert!(found);
    assert_eq!(rest, vec!["schemconv", "plot.eps"]);
}

#[test]
fn no_flag_leaves_args_alone() {
    let (rest, found) = strip_libname_flag(["schemconv"]);
    assert!(!found);
    assert_eq!(rest, vec!["schemconv"]);
}

#[test]
fn positional_file_after_flag() {
    let args = parse_from(["schemconv", "-uselibname", "A,cell,B.eps"]);
    assert!(args.use_libname);
    assert_eq!(args.file, Some(PathBuf::from("A,cell,B.eps")));
}

#[test]
fn batch_mode_without_positional() {
    let args = parse_from(["schemconv", "--out-dir", "pdfs", "--log-level", "debug"]);
    assert!(args.file.is_none());
    assert!(!args.use_libname);
    assert_eq!(args.out_dir, Some(PathBuf::from("pdfs")));
    assert_eq!(args.log_level.as_deref(), Some("debug"));
}

#[test]
fn long_form_flag_is_accepted() {
    let args = parse_from(["schemconv", "--uselibname"]);
    assert!(args.use_libname);
}

#[test]
fn arguments_after_file_are_ignored() {
    let args = parse_from(["schemconv", "a.eps", "b.eps", "-uselibname"]);
    assert_eq!(args.file, Some(PathBuf::from("a.eps")));
    assert_eq!(args.extra, vec!["b.eps"]);
    assert!(args.use_libname);
}

#[test]
fn dash_leading_file_after_separator() {
    let args = parse_from(["schemconv", "--", "-odd,cell,x.eps"]);
    assert_eq!(args.file, Some(PathBuf::from("-odd,cell,x.eps")));
    assert!(args.extra.is_empty());
}
