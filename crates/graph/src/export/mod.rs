//! Output artifacts
//!
//! Every writer honours the same overwrite policy: an existing target with
//! overwriting disabled is left alone and reported as `Skipped`.

mod graph;
mod html;
mod recommended;

pub use graph::GraphView;
pub use html::write_graph_page;
pub use recommended::write_recommended_csv;

use std::path::Path;
use tracing::warn;

/// What a writer did with its target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    Skipped,
}

/// Whether `path` may be written under the overwrite policy
fn may_write(path: &Path, overwrite: bool) -> bool {
    if !overwrite && path.exists() {
        warn!(path = %path.display(), "File already exists and overwriting is disabled, not writing");
        return false;
    }
    true
}

/// Create missing parent directories of `path`
fn ensure_parent(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_may_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        assert!(may_write(&path, false));
        std::fs::write(&path, "x").unwrap();
        assert!(may_write(&path, true));
        assert!(!may_write(&path, false));
    }

    #[test]
    fn test_ensure_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("out.html");

        ensure_parent(&path).unwrap();
        assert!(dir.path().join("a").join("b").is_dir());
        ensure_parent(Path::new("bare.csv")).unwrap();
    }
}
