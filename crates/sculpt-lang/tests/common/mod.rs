//! Shared harness: an in-memory delegate that records `debug` output.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use sculpt_lang::runtime::delegate::file_name;
use sculpt_lang::types::geometry::Mesh;
use sculpt_lang::{
    evaluate, parse, EvaluationDelegate, Geometry, GeometryKind, RuntimeError, RuntimeErrorKind, Scene, Value,
};

pub const PROJECT: &str = "/project";

#[derive(Default)]
pub struct TestDelegate {
    files: HashMap<PathBuf, String>,
    pub log: RefCell<Vec<String>>,
}

impl TestDelegate {
    pub fn new() -> Self { Self::default() }

    pub fn with_file(mut self, name: &str, source: &str) -> Self {
        self.files.insert(Path::new(PROJECT).join(name), source.to_string());
        self
    }
}

impl EvaluationDelegate for TestDelegate {
    fn resolve_url(&self, path: &str) -> PathBuf { Path::new(PROJECT).join(path) }

    /// `.obj` files import as an empty named mesh; `.txt` files hold nothing.
    fn import_geometry(&self, url: &Path) -> Result<Option<Geometry>, RuntimeErrorKind> {
        match url.extension().and_then(|e| e.to_str()) {
            Some("obj") => {
                let mut geometry = Geometry::new(GeometryKind::Mesh(Mesh::default()));
                geometry.name = Some(file_name(url));
                Ok(Some(geometry))
            }
            Some("txt") => Ok(None),
            _ => Err(RuntimeErrorKind::FileTypeMismatch {
                for_name: file_name(url),
                path: url.to_path_buf(),
                expected: None,
            }),
        }
    }

    fn debug_log(&self, values: &[Value]) {
        let line = values.iter().map(ToString::to_string).collect::<Vec<_>>().join(" ");
        self.log.borrow_mut().push(line);
    }

    fn load_source(&self, url: &Path) -> Result<String, RuntimeErrorKind> {
        self.files.get(url).cloned().ok_or_else(|| RuntimeErrorKind::FileNotFound {
            for_name: file_name(url),
            path: Some(url.to_path_buf()),
        })
    }
}

fn never() -> bool { false }

pub fn run_with(delegate: &TestDelegate, src: &str) -> Result<Scene, RuntimeError> {
    let program = parse(src).unwrap_or_else(|e| panic!("parse failed: {e:?}"));
    evaluate(&program, delegate, None, &never)
}

pub fn run(src: &str) -> Scene {
    run_with(&TestDelegate::new(), src).unwrap_or_else(|e| panic!("evaluation failed: {e:?}"))
}

pub fn run_err(src: &str) -> RuntimeError {
    match run_with(&TestDelegate::new(), src) {
        Ok(scene) => panic!("expected an error, got {} children", scene.children.len()),
        Err(e) => e,
    }
}

/// Lines passed to `debug`.
pub fn debug_lines(src: &str) -> Vec<String> {
    let delegate = TestDelegate::new();
    run_with(&delegate, src).unwrap_or_else(|e| panic!("evaluation failed: {e:?}"));
    delegate.log.into_inner()
}
