//! Error messages, hints, suggestions and source ranges as a host would
//! render them.

mod common;

use common::{run_err, run_with, TestDelegate};
use pretty_assertions::assert_eq;
use sculpt_lang::{ImportError, RuntimeErrorKind, Span};

/// Byte range of the first occurrence of `needle` in `src`.
fn range_of(src: &str, needle: &str) -> Span {
    let start = src.find(needle).unwrap_or_else(|| panic!("'{needle}' not in source"));
    Span::new(start, start + needle.len())
}

// ─── Symbols ─────────────────────────────────────────────────────────────────

#[test]
fn misspelled_block_suggests_closest() {
    let src = "qube";
    let err = run_err(src);
    assert_eq!(err.message(), "Unknown symbol 'qube'");
    assert_eq!(err.suggestion().as_deref(), Some("cube"));
    assert_eq!(err.hint().as_deref(), Some("Did you mean 'cube'?"));
    assert_eq!(err.span(), range_of(src, "qube"));
}

#[test]
fn wrong_case_suggests_the_exact_name() {
    let err = run_err("Cube");
    assert_eq!(err.message(), "Unknown symbol 'Cube'");
    assert_eq!(err.suggestion().as_deref(), Some("cube"));
    assert_eq!(err.hint().as_deref(), Some("Did you mean 'cube'?"));
}

#[test]
fn curated_alias_beats_edit_distance() {
    let err = run_err("rect");
    assert_eq!(err.suggestion().as_deref(), Some("square"));
}

#[test]
fn symbols_outside_their_table_are_unknown() {
    let err = run_err("point 1 2");
    assert_eq!(err.message(), "Unknown symbol 'point'");
    let err = run_err("cube {\n    background red\n}");
    assert_eq!(err.message(), "Unknown symbol 'background'");
}

#[test]
fn option_outside_a_definition() {
    let src = "option size 2";
    let err = run_err(src);
    assert_eq!(err.message(), "Unexpected keyword 'option'");
    assert_eq!(err.span(), range_of(src, "option"));
}

#[test]
fn unknown_member() {
    let src = "define v 1 2 3\ndebug v.w";
    let err = run_err(src);
    assert!(matches!(err.kind, RuntimeErrorKind::UnknownMember { .. }));
    assert_eq!(err.span(), range_of(src, "w"));
}

// ─── Arguments ───────────────────────────────────────────────────────────────

#[test]
fn too_many_color_components() {
    let src = "color 1 0 0 1 0.5";
    let err = run_err(src);
    assert_eq!(err.kind, RuntimeErrorKind::UnexpectedArgument { for_name: "color".into(), max: 4 });
    assert_eq!(err.span(), range_of(src, "0.5"));
}

#[test]
fn too_many_components_inside_parentheses() {
    let src = "color (1 0 0 1 0.5)";
    let err = run_err(src);
    assert_eq!(err.kind, RuntimeErrorKind::UnexpectedArgument { for_name: "color".into(), max: 4 });
    assert_eq!(err.span(), range_of(src, "0.5"));
}

#[test]
fn missing_argument_points_past_the_name() {
    let src = "translate";
    let err = run_err(src);
    assert_eq!(err.kind, RuntimeErrorKind::MissingArgument {
        for_name: "translate".into(),
        index: 0,
        expected: "vector".into(),
    });
    assert_eq!(err.span(), Span::new(9, 9));
}

#[test]
fn wrong_argument_type() {
    let src = "size \"big\"";
    let err = run_err(&format!("cube {{ {src} }}"));
    assert!(matches!(err.kind, RuntimeErrorKind::TypeMismatch { ref got, .. } if got == "string"));
    assert!(err.hint().is_some_and(|h| h.ends_with('.')));
}

#[test]
fn block_children_must_match() {
    let err = run_err("group 5");
    assert_eq!(err.kind, RuntimeErrorKind::TypeMismatch {
        for_name: "group".into(),
        index: 0,
        expected: "block".into(),
        got: "number".into(),
    });
}

#[test]
fn block_child_mismatch_points_at_the_child() {
    let src = "union (cube) 5";
    let err = run_err(src);
    assert_eq!(err.kind, RuntimeErrorKind::TypeMismatch {
        for_name: "union".into(),
        index: 1,
        expected: "block".into(),
        got: "number".into(),
    });
    assert_eq!(err.span(), range_of(src, "5"));
}

#[test]
fn leaf_blocks_reject_children() {
    let err = run_err("cube {\n    sphere\n}");
    assert_eq!(err.kind, RuntimeErrorKind::UnusedValue { type_name: "mesh".into() });
}

#[test]
fn bare_numbers_are_unused() {
    let src = "cube\n42";
    let err = run_err(src);
    assert_eq!(err.kind, RuntimeErrorKind::UnusedValue { type_name: "number".into() });
    assert_eq!(err.span(), range_of(src, "42"));
}

// ─── Ranges and loops ────────────────────────────────────────────────────────

#[test]
fn zero_step() {
    let src = "for i in 1 to 5 step 0 {\n}";
    let err = run_err(src);
    assert_eq!(err.message(), "Assertion failure: Step value must be nonzero");
}

#[test]
fn loop_over_a_mesh() {
    let err = run_err("for i in (cube) {\n}");
    assert!(matches!(err.kind, RuntimeErrorKind::TypeMismatch { ref expected, .. } if expected == "range or tuple"));
}

// ─── Imports ─────────────────────────────────────────────────────────────────

#[test]
fn runtime_error_in_import_names_the_file() {
    let delegate = TestDelegate::new().with_file("a.shape", "cube\nbogus");
    let src = "import \"a.shape\"";
    let err = run_with(&delegate, src).unwrap_err();
    assert_eq!(err.message(), "Error in imported file 'a.shape': Unknown symbol 'bogus'");
    assert_eq!(err.span(), Span::new(0, src.len()));
    let RuntimeErrorKind::ImportError { error, for_name, source_text } = &err.kind else {
        panic!("not an import error: {err:?}");
    };
    assert_eq!(for_name, "a.shape");
    assert_eq!(&source_text[error.span().start..error.span().end], "bogus");
}

#[test]
fn parse_error_in_import() {
    let delegate = TestDelegate::new().with_file("a.shape", "cube {");
    let err = run_with(&delegate, "import \"a.shape\"").unwrap_err();
    let RuntimeErrorKind::ImportError { error, .. } = &err.kind else { panic!("not an import error") };
    assert!(matches!(**error, ImportError::Parser(_)));
}

#[test]
fn nested_import_errors_keep_the_innermost_message() {
    let delegate = TestDelegate::new()
        .with_file("a.shape", "import \"b.shape\"")
        .with_file("b.shape", "bogus");
    let err = run_with(&delegate, "import \"a.shape\"").unwrap_err();
    assert_eq!(err.message(), "Error in imported file 'b.shape': Unknown symbol 'bogus'");
}

#[test]
fn missing_import() {
    let err = run_with(&TestDelegate::new(), "import \"nowhere.shape\"").unwrap_err();
    assert!(matches!(err.kind, RuntimeErrorKind::FileNotFound { ref for_name, .. } if for_name == "nowhere.shape"));
}

#[test]
fn circular_import() {
    let delegate = TestDelegate::new().with_file("loop.shape", "import \"loop.shape\"");
    let err = run_with(&delegate, "import \"loop.shape\"").unwrap_err();
    assert!(err.message().ends_with("Too much recursion"), "{}", err.message());
}

#[test]
fn closure_from_import_reports_its_file() {
    let delegate = TestDelegate::new().with_file("lib.shape", "define bad {\n    bogus\n}");
    let err = run_with(&delegate, "import \"lib.shape\"\nbad").unwrap_err();
    assert!(matches!(err.kind, RuntimeErrorKind::ImportError { ref for_name, .. } if for_name == "lib.shape"));
    assert_eq!(err.message(), "Error in imported file 'lib.shape': Unknown symbol 'bogus'");
    assert_eq!(err.span(), Span::new(19, 22));
}

#[test]
fn closure_error_points_at_the_call_not_its_options() {
    let delegate = TestDelegate::new().with_file("lib.shape", "define bad {\n    option radius 1\n    bogus\n}");
    let src = "import \"lib.shape\"\nbad { radius 2 }";
    let err = run_with(&delegate, src).unwrap_err();
    assert_eq!(err.message(), "Error in imported file 'lib.shape': Unknown symbol 'bogus'");
    assert_eq!(err.span(), range_of(src, "bad { radius 2 }"));
}

#[test]
fn recursion_error_points_at_the_call() {
    let src = "define f {\n    option n 1\n    f { n 2 }\n}\nf";
    let err = run_err(src);
    assert_eq!(err.message(), "Assertion failure: Too much recursion");
    assert_eq!(err.span(), range_of(src, "f { n 2 }"));
}

#[test]
fn unsupported_geometry_import() {
    let err = run_with(&TestDelegate::new(), "import \"model.stl\"").unwrap_err();
    assert!(matches!(err.kind, RuntimeErrorKind::FileTypeMismatch { .. }));
}
