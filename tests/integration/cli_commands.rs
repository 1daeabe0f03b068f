use super::{SpecDir, TOOL_SPEC, spec_dir};

use rstest::rstest;

use argpat::cli::{CheckArgs, Commands, SpecArgs, run};
use argpat::config::ConfigError;
use argpat::spec::SpecError;

fn check(spec_dir: &SpecDir, json: bool, args: &[&str]) -> (i32, String, String) {
    let path = spec_dir.write("tool.yml", TOOL_SPEC);
    let command = Commands::Check(CheckArgs {
        spec: SpecArgs { spec: Some(path) },
        json,
        args: args.iter().map(|s| s.to_string()).collect(),
    });
    let (mut out, mut err) = (Vec::new(), Vec::new());
    let status = run(command, &mut out, &mut err).unwrap();
    (
        status,
        String::from_utf8(out).unwrap(),
        String::from_utf8(err).unwrap(),
    )
}

#[rstest]
fn check_prints_bindings(spec_dir: SpecDir) {
    let (status, out, err) = check(&spec_dir, false, &["copy", "a", "b", "--width=80"]);
    assert_eq!(status, 0);
    assert_eq!(
        out,
        "matched: copy <src> <dst>\n  <src> = a\n  <dst> = b\n  --width = 80\n"
    );
    assert!(err.is_empty());
}

#[rstest]
fn check_reports_failures_on_stderr(spec_dir: SpecDir) {
    let (status, out, err) = check(&spec_dir, false, &["copy", "a", "--width", "wide", "-q"]);
    assert_eq!(status, 1);
    assert!(out.is_empty());
    assert_eq!(
        err,
        "tool: invalid value 'wide' for option '--width': expected an integer\n\
         tool: unknown option '-q'\n\
         tool: missing arguments\n"
    );
}

#[rstest]
fn check_json_output(spec_dir: SpecDir) {
    let (status, out, _) = check(&spec_dir, true, &["-m", "x", "y"]);
    assert_eq!(status, 0);
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["status"], "matched");
    assert_eq!(json["pattern"], "(-m | --move) <file>...");
    assert_eq!(json["bindings"]["file"], serde_json::json!(["x", "y"]));
}

#[rstest]
fn check_short_circuit(spec_dir: SpecDir) {
    let (status, out, _) = check(&spec_dir, false, &["nonsense", "--help"]);
    assert_eq!(status, 0);
    assert_eq!(out, "short-circuit\n  --help\n");
}

#[rstest]
fn validate_summarizes(spec_dir: SpecDir) {
    let path = spec_dir.write("tool.yml", TOOL_SPEC);
    let mut out = Vec::new();
    let status = run(
        Commands::Validate(SpecArgs { spec: Some(path) }),
        &mut out,
        &mut Vec::new(),
    )
    .unwrap();
    assert_eq!(status, 0);
    assert!(String::from_utf8(out).unwrap().starts_with("ok: 4 options, 2 patterns, "));
}

#[rstest]
fn validate_rejects_bad_pattern(spec_dir: SpecDir) {
    let path = spec_dir.write("bad.yml", "patterns:\n  - \"copy <src\"\n");
    let err = run(
        Commands::Validate(SpecArgs { spec: Some(path) }),
        &mut Vec::new(),
        &mut Vec::new(),
    )
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::Spec(SpecError::Pattern { .. }))
    ));
}

#[rstest]
fn missing_spec_file_is_an_error(spec_dir: SpecDir) {
    let err = run(
        Commands::Graph(SpecArgs {
            spec: Some(spec_dir.path().join("absent.yml")),
        }),
        &mut Vec::new(),
        &mut Vec::new(),
    )
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::Io(_))
    ));
}

#[rstest]
fn graph_prints_dot(spec_dir: SpecDir) {
    let path = spec_dir.write("tool.yml", TOOL_SPEC);
    let mut out = Vec::new();
    run(
        Commands::Graph(SpecArgs { spec: Some(path) }),
        &mut out,
        &mut Vec::new(),
    )
    .unwrap();
    let dot = String::from_utf8(out).unwrap();
    assert!(dot.starts_with("digraph nfa {"));
    assert!(dot.contains("label=\"copy\""));
    assert!(dot.contains("label=\"--move\""));
    assert!(dot.contains("label=\"<value #0>\""));
}
