#![allow(dead_code)]

use pipctl::cache::RequirementsCache;
use pipctl::runner::{CommandRunner, ExecutionResult, RunOptions};
use pipctl::system::{BinaryLocator, FileProbe};
use pipctl::{Pip, Platform};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Runner that records every command and answers with a fixed result
#[derive(Clone)]
pub struct RecordingRunner {
    pub calls: Arc<Mutex<Vec<(String, RunOptions)>>>,
    result: ExecutionResult,
}

impl RecordingRunner {
    pub fn new(result: ExecutionResult) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            result,
        }
    }

    pub fn succeeding() -> Self {
        Self::new(ExecutionResult::success(""))
    }

    pub fn calls(&self) -> Vec<(String, RunOptions)> {
        self.calls.lock().unwrap().clone()
    }

    /// Assert exactly one command ran, with no runas or cwd
    pub fn assert_called_once_with(&self, expected: &str) {
        self.assert_called_once_with_options(expected, &RunOptions::default());
    }

    pub fn assert_called_once_with_options(&self, expected: &str, options: &RunOptions) {
        let calls = self.calls();
        assert_eq!(calls.len(), 1, "expected one call, got {calls:?}");
        assert_eq!(calls[0].0, expected);
        assert_eq!(&calls[0].1, options);
    }
}

impl CommandRunner for RecordingRunner {
    fn run_all(&self, command: &str, options: &RunOptions) -> anyhow::Result<ExecutionResult> {
        self.calls
            .lock()
            .unwrap()
            .push((command.to_string(), options.clone()));
        Ok(self.result.clone())
    }
}

/// Locator that resolves every name to the bare name itself
pub struct BareNameLocator;

impl BinaryLocator for BareNameLocator {
    fn locate(&self, name: &str) -> Option<PathBuf> {
        Some(PathBuf::from(name))
    }
}

/// Cache with a fixed table of resolvable references
#[derive(Default)]
pub struct TableCache {
    entries: HashMap<String, PathBuf>,
    pub lookups: Arc<Mutex<Vec<String>>>,
}

impl TableCache {
    pub fn with_entry(mut self, source: &str, cached: impl Into<PathBuf>) -> Self {
        self.entries.insert(source.to_string(), cached.into());
        self
    }
}

impl RequirementsCache for TableCache {
    fn cache_file(&self, source: &str) -> anyhow::Result<PathBuf> {
        self.lookups.lock().unwrap().push(source.to_string());
        self.entries
            .get(source)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("{source} is not in the file server"))
    }
}

/// Filesystem probe answering from fixed sets, or "everything exists"
#[derive(Default)]
pub struct FakeFs {
    everything: bool,
    files: HashSet<PathBuf>,
    dirs: HashSet<PathBuf>,
}

impl FakeFs {
    pub fn everything_exists() -> Self {
        Self {
            everything: true,
            ..Default::default()
        }
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.insert(path.into());
        self
    }

    pub fn with_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.dirs.insert(path.into());
        self
    }
}

impl FileProbe for FakeFs {
    fn is_file(&self, path: &Path) -> bool {
        self.everything || self.files.contains(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.everything || self.dirs.contains(path)
    }
}

/// Pip module wired to fakes, with `pip` on PATH and every path existing
pub fn pip_with(runner: &RecordingRunner, cache: TableCache, fs: FakeFs) -> Pip {
    Pip::new(runner.clone(), BareNameLocator, cache, fs).with_platform(Platform::Linux)
}

pub fn default_pip(runner: &RecordingRunner) -> Pip {
    pip_with(runner, TableCache::default(), FakeFs::everything_exists())
}
