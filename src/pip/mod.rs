//! The pip execution module.
//!
//! [`Pip`] turns install, uninstall and query requests into a single pip
//! command line, runs it through a [`CommandRunner`], and reports the result.
//! Every host interaction goes through an injected collaborator so callers
//! (and tests) decide how commands run, where binaries come from, and how
//! remote requirements files are fetched.

pub mod command;
mod command_proptest;
pub mod freeze;
pub mod request;

pub use command::PipCommand;
pub use freeze::{parse_listing, supports_mirrors, FreezeEntry};
pub use request::{ArgList, ExistsAction, InstallRequest, UninstallRequest};

use anyhow::Result as AnyResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::cache::{needs_resolution, FileCache, RequirementsCache};
use crate::config::{Settings, DEFAULT_PIP_BINARIES};
use crate::error::{PipError, Result};
use crate::logging;
use crate::runner::{CommandRunner, Platform, RunOptions, ShellRunner};
use crate::system::{BinaryLocator, FileProbe, LocalFileSystem, WhichLocator};

/// Result of an install or uninstall.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallOutcome {
    pub result: bool,
    pub comment: String,
}

impl InstallOutcome {
    pub fn success(comment: impl Into<String>) -> Self {
        Self {
            result: true,
            comment: comment.into(),
        }
    }

    pub fn failure(comment: impl Into<String>) -> Self {
        Self {
            result: false,
            comment: comment.into(),
        }
    }
}

impl From<Result<String>> for InstallOutcome {
    fn from(result: Result<String>) -> Self {
        match result {
            Ok(stdout) => Self::success(stdout),
            Err(e) => Self::failure(e.comment()),
        }
    }
}

pub struct Pip {
    runner: Box<dyn CommandRunner>,
    locator: Box<dyn BinaryLocator>,
    cache: Box<dyn RequirementsCache>,
    fs: Box<dyn FileProbe>,
    pip_binaries: Vec<String>,
    platform: Platform,
}

impl Pip {
    pub fn new(
        runner: impl CommandRunner + 'static,
        locator: impl BinaryLocator + 'static,
        cache: impl RequirementsCache + 'static,
        fs: impl FileProbe + 'static,
    ) -> Self {
        Self {
            runner: Box::new(runner),
            locator: Box::new(locator),
            cache: Box::new(cache),
            fs: Box::new(fs),
            pip_binaries: DEFAULT_PIP_BINARIES.iter().map(|s| s.to_string()).collect(),
            platform: Platform::current(),
        }
    }

    /// Build a module wired to the real shell, `PATH`, filesystem and cache.
    pub fn from_settings(settings: &Settings) -> AnyResult<Self> {
        let cache = FileCache::new(settings.resolved_cache_dir()?, settings.file_roots.clone());
        Ok(Self::new(
            ShellRunner::default(),
            WhichLocator,
            cache,
            LocalFileSystem,
        )
        .with_pip_binaries(settings.pip_binaries.clone()))
    }

    /// Names tried, in order, when looking pip up without a virtualenv.
    pub fn with_pip_binaries(mut self, names: Vec<String>) -> Self {
        self.pip_binaries = names;
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Install packages. Never fails: every error is reported in the outcome.
    pub fn install(&self, request: &InstallRequest) -> InstallOutcome {
        let outcome = InstallOutcome::from(self.try_install(request));
        logging::log_outcome("install", outcome.result, &outcome.comment);
        outcome
    }

    fn try_install(&self, request: &InstallRequest) -> Result<String> {
        request.validate()?;
        let requirements = self.resolve_requirements(request.requirements.as_deref())?;

        let bin_env = request.bin_env.as_deref();
        let activation = if request.activate {
            self.activation_script(bin_env)
        } else {
            None
        };
        let mut cmd =
            PipCommand::new(self.pip_binary(bin_env)?, "install").with_activation(activation);
        command::push_install_args(&mut cmd, request, requirements.as_deref());

        self.execute(&cmd, &request.run_options())
    }

    /// Uninstall packages. Never fails: every error is reported in the outcome.
    pub fn uninstall(&self, request: &UninstallRequest) -> InstallOutcome {
        let outcome = InstallOutcome::from(self.try_uninstall(request));
        logging::log_outcome("uninstall", outcome.result, &outcome.comment);
        outcome
    }

    fn try_uninstall(&self, request: &UninstallRequest) -> Result<String> {
        let requirements = self.resolve_requirements(request.requirements.as_deref())?;

        let mut cmd = PipCommand::new(self.pip_binary(request.bin_env.as_deref())?, "uninstall");
        command::push_uninstall_args(&mut cmd, request, requirements.as_deref());

        self.execute(&cmd, &request.run_options())
    }

    /// Installed requirements in `pip freeze` format.
    pub fn freeze(&self, bin_env: Option<&Path>, runas: Option<&str>) -> Result<Vec<String>> {
        let cmd = PipCommand::new(self.pip_binary(bin_env)?, "freeze");
        let options = RunOptions::new(runas.map(String::from), None);
        let stdout = self.execute(&cmd, &options)?;

        Ok(stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect())
    }

    /// Installed packages mapped to their versions.
    pub fn list(
        &self,
        prefix: Option<&str>,
        bin_env: Option<&Path>,
        runas: Option<&str>,
    ) -> Result<BTreeMap<String, String>> {
        let lines = self.freeze(bin_env, runas)?;
        Ok(parse_listing(&lines, prefix))
    }

    pub fn version(&self, bin_env: Option<&Path>) -> Result<String> {
        let cmd = PipCommand::new(self.pip_binary(bin_env)?, "--version");
        let stdout = self.execute(&cmd, &RunOptions::default())?;

        freeze::parse_pip_version(&stdout).ok_or_else(|| {
            PipError::invalid_argument("pip --version", format!("unexpected output '{stdout}'"))
        })
    }

    /// Turn a requirements reference into the path handed to pip.
    ///
    /// References with a resolvable scheme must be cached first; anything
    /// else is passed through untouched.
    fn resolve_requirements(&self, reference: Option<&str>) -> Result<Option<PathBuf>> {
        let Some(reference) = reference.filter(|r| !r.is_empty()) else {
            return Ok(None);
        };

        if !needs_resolution(reference) {
            return Ok(Some(PathBuf::from(reference)));
        }

        match self.cache.cache_file(reference) {
            Ok(path) => Ok(Some(path)),
            Err(e) => {
                logging::log_requirements_resolution(reference, None);
                Err(PipError::unresolved_requirements(
                    reference,
                    Some(format!("{e:#}")),
                ))
            }
        }
    }

    fn env_bin_dir(&self, env: &Path) -> PathBuf {
        match self.platform {
            Platform::Windows => env.join("Scripts"),
            Platform::MacOS | Platform::Linux => env.join("bin"),
        }
    }

    /// Locate the pip binary for `bin_env`, or on `PATH` when none is given.
    ///
    /// `bin_env` may be a virtualenv root or the pip binary itself.
    fn pip_binary(&self, bin_env: Option<&Path>) -> Result<String> {
        let Some(env) = bin_env else {
            return self
                .pip_binaries
                .iter()
                .find_map(|name| self.locator.locate(name))
                .map(|path| path.display().to_string())
                .ok_or_else(|| PipError::pip_not_found(None));
        };

        if self.fs.is_dir(env) {
            let pip_name = match self.platform {
                Platform::Windows => "pip.exe",
                Platform::MacOS | Platform::Linux => "pip",
            };
            let pip = self.env_bin_dir(env).join(pip_name);
            if self.fs.is_file(&pip) {
                return Ok(pip.display().to_string());
            }
        } else if self.fs.is_file(env) {
            return Ok(env.display().to_string());
        }

        Err(PipError::pip_not_found(Some(env.display().to_string())))
    }

    /// The virtualenv's activation script, if it can be sourced.
    fn activation_script(&self, bin_env: Option<&Path>) -> Option<PathBuf> {
        let env = bin_env?;
        if self.platform == Platform::Windows {
            tracing::warn!("Virtualenv activation is not supported on Windows");
            return None;
        }
        if !self.fs.is_dir(env) {
            return None;
        }

        let script = self.env_bin_dir(env).join("activate");
        if self.fs.is_file(&script) {
            Some(script)
        } else {
            tracing::warn!(
                script = %script.display(),
                "Activation script not found, running pip directly"
            );
            None
        }
    }

    /// Run `cmd` and return its stdout, or the failure as a [`PipError`].
    fn execute(&self, cmd: &PipCommand, options: &RunOptions) -> Result<String> {
        let command = cmd.to_string();
        logging::log_pip_command(&command, options.runas.as_deref(), options.cwd.as_deref());

        let result = self
            .runner
            .run_all(&command, options)
            .map_err(|e| PipError::execution(&command, e))?;

        if result.retcode == 0 {
            Ok(result.stdout)
        } else {
            let output = if result.stderr.trim().is_empty() {
                result.stdout
            } else {
                result.stderr
            };
            Err(PipError::non_zero_exit(command, result.retcode, output))
        }
    }
}
