//! The evaluator's only I/O boundary. Hosts decide how paths resolve, how
//! foreign geometry is loaded and where `debug` output goes.

use std::io;
use std::path::{Path, PathBuf};

use crate::error::RuntimeErrorKind;
use crate::runtime::value::Value;
use crate::types::geometry::Geometry;

pub trait EvaluationDelegate {
    /// Map a user-supplied path to a concrete location. Must be
    /// deterministic within one evaluation.
    fn resolve_url(&self, path: &str) -> PathBuf;

    /// Load external geometry. `Ok(None)` means nothing is available.
    fn import_geometry(&self, url: &Path) -> Result<Option<Geometry>, RuntimeErrorKind>;

    /// Output of the `debug` command, in call order.
    fn debug_log(&self, values: &[Value]);

    /// Source text of an imported script.
    fn load_source(&self, url: &Path) -> Result<String, RuntimeErrorKind> {
        std::fs::read_to_string(url).map_err(|e| file_error(url, e))
    }

    /// Installed font names, or `None` to accept any non-blank name.
    fn font_names(&self) -> Option<Vec<String>> { None }
}

/// Display name used in file diagnostics.
pub fn file_name(url: &Path) -> String {
    url.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| url.display().to_string())
}

pub fn file_error(url: &Path, error: io::Error) -> RuntimeErrorKind {
    let for_name = file_name(url);
    let path = url.to_path_buf();
    match error.kind() {
        io::ErrorKind::NotFound => RuntimeErrorKind::FileNotFound { for_name, path: Some(path) },
        io::ErrorKind::InvalidData => RuntimeErrorKind::FileTypeMismatch {
            for_name,
            path,
            expected: Some("UTF-8 text file".into()),
        },
        _ => RuntimeErrorKind::FileAccessRestricted { for_name, path },
    }
}

// ─── Default ─────────────────────────────────────────────────────────────────

/// Resolves paths against an optional base directory, has no geometry
/// importer and sends `debug` output to `tracing`.
#[derive(Debug, Clone, Default)]
pub struct DefaultDelegate {
    base_dir: Option<PathBuf>,
}

impl DefaultDelegate {
    pub fn new() -> Self { Self::default() }

    pub fn with_base_dir(dir: impl Into<PathBuf>) -> Self { Self { base_dir: Some(dir.into()) } }
}

impl EvaluationDelegate for DefaultDelegate {
    fn resolve_url(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    fn import_geometry(&self, url: &Path) -> Result<Option<Geometry>, RuntimeErrorKind> {
        Err(RuntimeErrorKind::FileTypeMismatch {
            for_name: file_name(url),
            path: url.to_path_buf(),
            expected: None,
        })
    }

    fn debug_log(&self, values: &[Value]) {
        let line = values.iter().map(ToString::to_string).collect::<Vec<_>>().join(" ");
        tracing::info!(target: "sculpt_lang::debug", "{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_join_base_dir() {
        let d = DefaultDelegate::with_base_dir("/models");
        assert_eq!(d.resolve_url("a.shape"), PathBuf::from("/models/a.shape"));
        assert_eq!(d.resolve_url("/abs/b.shape"), PathBuf::from("/abs/b.shape"));
        assert_eq!(DefaultDelegate::new().resolve_url("c.shape"), PathBuf::from("c.shape"));
    }

    #[test]
    fn missing_source_is_file_not_found() {
        let d = DefaultDelegate::new();
        let err = d.load_source(Path::new("/definitely/not/here.shape")).unwrap_err();
        assert!(matches!(err, RuntimeErrorKind::FileNotFound { ref for_name, .. } if for_name == "here.shape"));
    }
}
