use super::{SpecDir, TOOL_SPEC, spec_dir};

use std::cell::RefCell;

use indoc::indoc;
use rstest::rstest;

use argpat::config::{ConfigError, DefaultSpecLoader, SpecLoader};
use argpat::spec::{ErrorCode, ErrorEntry, Flow, ParseOutcome, Processor, SpecError, Value};

// ========================================
// Loading declarations from disk
// ========================================

#[rstest]
fn loaded_spec_matches_arguments(spec_dir: SpecDir) {
    spec_dir.write("argpat.yml", TOOL_SPEC);
    let file = DefaultSpecLoader::new().load(spec_dir.path()).unwrap();
    let spec = file.to_spec();

    let ParseOutcome::Parsed(parsed) = spec.parse(["-v", "copy", "a.txt", "b.txt"]).unwrap() else {
        panic!("expected a parse");
    };
    assert_eq!(parsed.pattern, Some(0));
    assert_eq!(parsed.bindings.by_name("src"), Some(&Value::Str("a.txt".into())));
    assert_eq!(parsed.options[0].name, "-v");

    let ParseOutcome::Parsed(parsed) = spec.parse(["--move", "x", "y", "-w", "40"]).unwrap() else {
        panic!("expected a parse");
    };
    assert_eq!(parsed.pattern, Some(1));
    assert_eq!(parsed.options[1].value, Some(Value::Int(40)));
}

#[rstest]
fn explicit_slot_types_from_file(spec_dir: SpecDir) {
    let path = spec_dir.write(
        "custom.yml",
        indoc! {"
            patterns:
              - pattern: resize <w> <h>
                types: [int, int]
        "},
    );
    let file = DefaultSpecLoader::with_path(path).load(spec_dir.path()).unwrap();
    let spec = file.to_spec();

    let errors = RefCell::new(Vec::new());
    let flow = Processor::new(&spec)
        .with_handler(|e: &[ErrorEntry], _: &mut i32| errors.borrow_mut().extend_from_slice(e))
        .process(["resize", "10", "wide"])
        .unwrap();
    assert_eq!(flow, Flow::Exit(1));
    assert_eq!(errors.borrow()[0].code, ErrorCode::BadPatternArg);
    assert_eq!(errors.borrow()[0].arg_index, 2);
}

#[rstest]
fn slot_type_count_mismatch_surfaces_on_build(spec_dir: SpecDir) {
    let path = spec_dir.write(
        "argpat.yml",
        indoc! {"
            patterns:
              - pattern: resize <w> <h>
                types: [int]
        "},
    );
    let file = DefaultSpecLoader::with_path(path).load(spec_dir.path()).unwrap();
    assert!(matches!(
        file.to_spec().build(),
        Err(SpecError::SlotCountMismatch { expected: 1, found: 2, .. })
    ));
}

#[rstest]
fn ambiguity_flags_from_file(spec_dir: SpecDir) {
    let yaml = |allow: bool| {
        format!(
            "config:\n  allow_cross_pattern_ambiguity: {allow}\npatterns:\n  - list\n  - <name>\n"
        )
    };

    spec_dir.write("argpat.yml", &yaml(false));
    let strict = DefaultSpecLoader::new().load(spec_dir.path()).unwrap();
    assert!(matches!(
        strict.to_spec().build(),
        Err(SpecError::AmbiguousPatterns { .. })
    ));

    spec_dir.write("argpat.yml", &yaml(true));
    let lenient = DefaultSpecLoader::new().load(spec_dir.path()).unwrap();
    let spec = lenient.to_spec();
    let ParseOutcome::Parsed(parsed) = spec.parse(["list"]).unwrap() else {
        panic!("expected a parse");
    };
    assert_eq!(parsed.pattern, Some(0));
}

#[rstest]
fn invalid_declarations_are_all_reported(spec_dir: SpecDir) {
    spec_dir.write(
        "argpat.yml",
        indoc! {"
            options:
              - names: -v
              - names: -v|--verbose
              - names: --width
                value: width
        "},
    );
    let err = DefaultSpecLoader::new().load(spec_dir.path()).unwrap_err();
    let ConfigError::Validation(errors) = err else {
        panic!("expected validation errors, got {err:?}");
    };
    assert_eq!(
        errors,
        vec![
            "options[1]: '-v' is already declared",
            "options[2]: value must be written as '<name>' or '<name:type>'",
        ]
    );
}
