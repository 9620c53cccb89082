//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing services
//! to be tested with in-memory implementations.

use std::io;
use std::path::Path;

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write string content to file.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Check if path is a file.
    fn is_file(&self, path: &Path) -> bool;

    /// Create parent directories if needed.
    fn ensure_parent(&self, path: &Path) -> io::Result<()>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn ensure_parent(&self, path: &Path) -> io::Result<()> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
                std::fs::create_dir_all(parent)
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn given_nested_path_when_ensure_parent_then_creates_directories() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a/b/rig.json");
        let fs = RealFileSystem;

        fs.ensure_parent(&path).unwrap();
        fs.write(&path, "{}").unwrap();

        assert!(fs.is_file(&path));
        assert_eq!(fs.read_to_string(&path).unwrap(), "{}");
    }

    #[test]
    fn given_bare_file_name_when_ensure_parent_then_is_noop() {
        RealFileSystem.ensure_parent(Path::new("rig.json")).unwrap();
    }
}
