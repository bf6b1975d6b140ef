//! Host lookups the pip module depends on: finding executables and probing paths.

use std::path::{Path, PathBuf};

/// Resolves a logical binary name such as `pip` to something runnable.
#[cfg_attr(test, mockall::automock)]
pub trait BinaryLocator {
    fn locate(&self, name: &str) -> Option<PathBuf>;
}

#[cfg_attr(test, mockall::automock)]
pub trait FileProbe {
    fn is_file(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
}

/// Looks binaries up on `PATH`.
#[derive(Debug, Clone, Default)]
pub struct WhichLocator;

impl BinaryLocator for WhichLocator {
    fn locate(&self, name: &str) -> Option<PathBuf> {
        match which::which(name) {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::debug!(binary = name, error = %e, "Binary not found on PATH");
                None
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LocalFileSystem;

impl FileProbe for LocalFileSystem {
    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }
}
