//! End-to-end evaluation: parse → evaluate → inspect the scene.

mod common;

use std::cell::Cell;

use common::{debug_lines, run, run_err, run_with, TestDelegate};
use pretty_assertions::assert_eq;
use sculpt_lang::{evaluate, parse, Color, GeometryKind, MaterialProperty, Vector};

fn origin_of(g: &sculpt_lang::Geometry) -> Vector { g.transform.apply(Vector::ZERO) }

// ─── Scene building ──────────────────────────────────────────────────────────

#[test]
fn empty_program_is_empty_scene() {
    let scene = run("");
    assert!(scene.children.is_empty());
    assert_eq!(scene.background, None);
}

#[test]
fn primitives_become_children() {
    let scene = run("cube\nsphere\n");
    let kinds: Vec<_> = scene.children.iter().map(|g| g.kind.clone()).collect();
    assert_eq!(kinds, vec![GeometryKind::Cube, GeometryKind::Sphere { segments: 16 }]);
}

#[test]
fn block_properties_set_own_transform() {
    let scene = run("cube {\n    position 1 2 3\n    size 2\n}");
    let cube = &scene.children[0];
    assert_eq!(origin_of(cube), Vector::new(1.0, 2.0, 3.0));
    assert_eq!(cube.transform.apply(Vector::new(1.0, 0.0, 0.0)), Vector::new(3.0, 2.0, 3.0));
}

#[test]
fn partial_vectors_fill_with_zero() {
    let scene = run("translate 1 2\ncube");
    assert_eq!(origin_of(&scene.children[0]), Vector::new(1.0, 2.0, 0.0));
}

#[test]
fn translate_affects_later_siblings_only() {
    let scene = run("cube\ntranslate 5 0 0\ncube");
    assert_eq!(origin_of(&scene.children[0]), Vector::ZERO);
    assert_eq!(origin_of(&scene.children[1]), Vector::new(5.0, 0.0, 0.0));
}

#[test]
fn material_carries_into_blocks() {
    let scene = run("color 1 0 0\ncube\nsphere { color #00f }");
    assert_eq!(scene.children[0].material.color(), Color::rgba(1.0, 0.0, 0.0, 1.0));
    assert_eq!(scene.children[1].material.color(), Color::rgba(0.0, 0.0, 1.0, 1.0));
}

#[test]
fn detail_controls_segments() {
    let scene = run("detail 5\ncylinder");
    assert_eq!(scene.children[0].kind, GeometryKind::Cylinder { segments: 5 });
}

#[test]
fn groups_collect_children() {
    let scene = run("union {\n    cube\n    sphere { name \"ball\" }\n}");
    let union = &scene.children[0];
    assert_eq!(union.kind, GeometryKind::Union);
    assert_eq!(union.children.len(), 2);
    assert!(union.find("ball").is_some());
}

#[test]
fn block_with_parameter_children() {
    let scene = run("difference (cube) (sphere)");
    assert_eq!(scene.children[0].kind, GeometryKind::Difference);
    assert_eq!(scene.children[0].children.len(), 2);
}

#[test]
fn root_promotes_paths_to_meshes() {
    let scene = run("circle");
    assert!(matches!(scene.children[0].kind, GeometryKind::Path(_)));
}

#[test]
fn path_points_and_fill() {
    let scene = run("fill {\n    path {\n        point 0 0\n        curve 1 0\n        point 0 1\n    }\n}");
    let GeometryKind::Fill(paths) = &scene.children[0].kind else { panic!("not a fill") };
    assert_eq!(paths.len(), 1);
    assert_eq!(paths[0].points.len(), 3);
    assert!(paths[0].points[1].is_curved);
}

#[test]
fn extrude_along_accepts_several_paths() {
    let scene = run("extrude {\n    along (square) circle\n    square\n}");
    let GeometryKind::Extrude { shapes, along } = &scene.children[0].kind else { panic!("not an extrude") };
    assert_eq!(shapes.len(), 1);
    assert_eq!(along.len(), 2);
}

#[test]
fn background_is_root_only() {
    let scene = run("background red");
    assert_eq!(scene.background, Some(MaterialProperty::Color(Color::rgba(1.0, 0.0, 0.0, 1.0))));
}

// ─── Values ──────────────────────────────────────────────────────────────────

#[test]
fn debug_output_in_order() {
    let lines = debug_lines("debug 1 \"two\"\ndefine v 1 2 3\ndebug v.y\ndebug (2 + 3 * 4)");
    assert_eq!(lines, vec!["1 two", "2", "14"]);
}

#[test]
fn greedy_command_takes_the_rest() {
    let lines = debug_lines("debug 1 max 2 7");
    assert_eq!(lines, vec!["1 7"]);
}

#[test]
fn prefix_minus_starts_a_new_element() {
    assert_eq!(debug_lines("debug 1 -2"), vec!["1 -2"]);
    assert_eq!(debug_lines("debug 1 - 2"), vec!["-1"]);
}

#[test]
fn property_getters() {
    let lines = debug_lines("opacity 0.5\ndebug opacity\ncube {\n    position 1 2 3\n    debug position.z\n}");
    assert_eq!(lines, vec!["0.5", "3"]);
}

// ─── Loops ───────────────────────────────────────────────────────────────────

#[test]
fn for_loop_produces_one_child_per_iteration() {
    let scene = run("for i in 1 to 3 {\n    cube { position i 0 0 }\n}");
    let xs: Vec<f64> = scene.children.iter().map(|g| origin_of(g).x).collect();
    assert_eq!(xs, vec![1.0, 2.0, 3.0]);
}

#[test]
fn for_loop_with_step() {
    assert_eq!(debug_lines("for i in 1 to 10 step 2 {\n    debug i\n}"), vec!["1", "3", "5", "7", "9"]);
}

#[test]
fn for_loop_over_tuple_and_without_index() {
    assert_eq!(debug_lines("for c in 3 1 2 {\n    debug c\n}"), vec!["3", "1", "2"]);
    let scene = run("for 1 to 4 {\n    cube\n}");
    assert_eq!(scene.children.len(), 4);
}

#[test]
fn loop_bindings_do_not_escape() {
    let err = run_err("for i in 1 to 2 {\n}\ndebug i");
    assert_eq!(err.message(), "Unknown symbol 'i'");
}

#[test]
fn transforms_inside_a_loop_persist() {
    let scene = run("for 1 to 3 {\n    translate 1 0 0\n    cube\n}");
    let xs: Vec<f64> = scene.children.iter().map(|g| origin_of(g).x).collect();
    assert_eq!(xs, vec![1.0, 2.0, 3.0]);
}

#[test]
fn cancellation_returns_partial_scene() {
    let program = parse("for i in 1 to 100 {\n    cube\n}").unwrap();
    let polls = Cell::new(0);
    let cancel = || {
        polls.set(polls.get() + 1);
        polls.get() > 2
    };
    let scene = evaluate(&program, &TestDelegate::new(), None, &cancel).unwrap();
    assert_eq!(scene.children.len(), 2);
}

// ─── Definitions ─────────────────────────────────────────────────────────────

#[test]
fn defined_block_with_options() {
    let src = "define wheel {\n    option radius 1\n    cylinder { size radius * 2 }\n}\nwheel\nwheel { radius 3 }";
    let scene = run(src);
    let widths: Vec<f64> = scene
        .children
        .iter()
        .map(|g| g.transform.apply(Vector::new(1.0, 0.0, 0.0)).x)
        .collect();
    assert_eq!(widths, vec![2.0, 6.0]);
}

#[test]
fn closures_see_caller_symbols() {
    let lines = debug_lines("define show {\n    debug n\n}\ndefine n 4\nshow");
    assert_eq!(lines, vec!["4"]);
}

#[test]
fn multiple_children_are_grouped() {
    let scene = run("define pair {\n    cube\n    sphere\n}\npair { name \"p\" }");
    let group = &scene.children[0];
    assert_eq!(group.kind, GeometryKind::Group);
    assert_eq!(group.name.as_deref(), Some("p"));
    assert_eq!(group.children.len(), 2);
}

#[test]
fn single_path_child_is_returned_transformed() {
    let scene = run("define tile {\n    square\n}\nfill {\n    tile { position 2 0 0 }\n}");
    let GeometryKind::Fill(paths) = &scene.children[0].kind else { panic!("not a fill") };
    assert_eq!(paths[0].points[0].position, Vector::new(1.5, 0.5, 0.0));
}

#[test]
fn recursion_limit() {
    fn chain(n: usize) -> String {
        let mut src = String::from("define f1 {\n    cube\n}\n");
        for i in 2..=n {
            src.push_str(&format!("define f{i} {{\n    f{}\n}}\n", i - 1));
        }
        src.push_str(&format!("f{n}\n"));
        src
    }
    assert_eq!(run(&chain(25)).children.len(), 1);
    assert_eq!(run_err(&chain(26)).message(), "Assertion failure: Too much recursion");
}

#[test]
fn self_recursion_is_bounded() {
    let err = run_err("define f {\n    f\n}\nf");
    assert_eq!(err.message(), "Assertion failure: Too much recursion");
}

// ─── Imports ─────────────────────────────────────────────────────────────────

#[test]
fn imported_definitions_are_visible() {
    let delegate = TestDelegate::new().with_file("lib.shape", "define w 3\ncube");
    let scene = run_with(&delegate, "import \"lib.shape\"\nsphere { size w }").unwrap();
    assert_eq!(scene.children.len(), 2);
    assert_eq!(scene.children[1].transform.apply(Vector::new(1.0, 0.0, 0.0)).x, 3.0);
}

#[test]
fn nested_imports_resolve_next_to_the_importer() {
    let delegate = TestDelegate::new()
        .with_file("a.shape", "import \"b.shape\"")
        .with_file("b.shape", "cube");
    assert_eq!(run_with(&delegate, "import \"a.shape\"").unwrap().children.len(), 1);
}

#[test]
fn geometry_imports() {
    let delegate = TestDelegate::new();
    let scene = run_with(&delegate, "import \"teapot.obj\"\nimport \"notes.txt\"").unwrap();
    assert_eq!(scene.children.len(), 1);
    assert_eq!(scene.children[0].name.as_deref(), Some("teapot.obj"));
}
