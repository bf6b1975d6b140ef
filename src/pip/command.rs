use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};

use super::request::{InstallRequest, UninstallRequest};

/// A pip invocation rendered as one shell command line.
///
/// Every caller-supplied value is shell-quoted when it is pushed, so the
/// rendered line always has one word per value. Values made only of
/// characters the shell leaves alone stay bare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipCommand {
    /// Activation script sourced before pip runs.
    pub activate: Option<PathBuf>,
    pub pip: String,
    pub args: Vec<String>,
}

impl PipCommand {
    pub fn new(pip: impl Into<String>, subcommand: &str) -> Self {
        Self {
            activate: None,
            pip: pip.into(),
            args: vec![subcommand.to_string()],
        }
    }

    pub fn with_activation(mut self, script: Option<PathBuf>) -> Self {
        self.activate = script;
        self
    }

    /// Push a literal token, such as a flag, without quoting.
    pub fn arg(&mut self, arg: impl Into<String>) -> &mut Self {
        self.args.push(arg.into());
        self
    }

    /// Push caller-supplied operands, one shell word each.
    pub fn operands<I, S>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.args
            .extend(values.into_iter().map(|v| shell_word(v.as_ref()).into_owned()));
        self
    }

    /// Push `--name=value` when `value` is set and non-empty.
    pub fn option(&mut self, name: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.args.push(format!("--{name}={}", shell_word(value)));
        }
        self
    }

    pub fn flag(&mut self, name: &str, enabled: bool) -> &mut Self {
        if enabled {
            self.args.push(format!("--{name}"));
        }
        self
    }

    pub fn requirement(&mut self, path: Option<&Path>) -> &mut Self {
        if let Some(path) = path {
            let path = path.to_string_lossy();
            self.args.push(format!("--requirement={}", quote_arg(&path)));
        }
        self
    }
}

impl fmt::Display for PipCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(script) = &self.activate {
            write!(f, ". {} && ", shell_word(&script.to_string_lossy()))?;
        }
        write!(f, "{}", shell_word(&self.pip))?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Wrap a value in single quotes for a POSIX shell.
///
/// Embedded single quotes become `'\''`, so nothing inside is expanded.
pub fn quote_arg(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Quote `value` only if the shell would otherwise split or expand it.
pub fn shell_word(value: &str) -> Cow<'_, str> {
    match shlex::try_quote(value) {
        Ok(quoted) => quoted,
        // Only a nul byte is refused.
        Err(_) => Cow::Owned(quote_arg(value)),
    }
}

/// Append everything after `pip install` in its fixed order.
pub fn push_install_args(
    cmd: &mut PipCommand,
    request: &InstallRequest,
    requirements: Option<&Path>,
) {
    cmd.requirement(requirements)
        .option("log", request.log.as_deref())
        .option("proxy", request.proxy.as_deref())
        .option("timeout", request.timeout.map(|t| t.to_string()).as_deref());

    for source in &request.editable {
        cmd.option("editable", Some(source.as_str()));
    }

    cmd.option("find-links", request.find_links.as_deref())
        .option("index-url", request.index_url.as_deref())
        .option("extra-index-url", request.extra_index_url.as_deref())
        .flag("no-index", request.no_index);

    if !request.mirrors.is_empty() {
        cmd.arg("--use-mirrors");
        for mirror in &request.mirrors {
            cmd.option("mirrors", Some(mirror.as_str()));
        }
    }

    cmd.option("build", request.build.as_deref())
        .option("target", request.target.as_deref())
        .option("download-cache", request.download_cache.as_deref())
        .flag("upgrade", request.upgrade)
        .flag("force-reinstall", request.force_reinstall)
        .flag("ignore-installed", request.ignore_installed)
        .option(
            "exists-action",
            request.exists_action.map(|a| a.to_string()).as_deref(),
        )
        .flag("no-deps", request.no_deps);

    for option in &request.install_options {
        cmd.option("install-option", Some(option.as_str()));
    }

    cmd.operands(&request.packages);
}

/// Append everything after `pip uninstall`.
pub fn push_uninstall_args(
    cmd: &mut PipCommand,
    request: &UninstallRequest,
    requirements: Option<&Path>,
) {
    cmd.arg("-y")
        .requirement(requirements)
        .option("proxy", request.proxy.as_deref())
        .option("timeout", request.timeout.map(|t| t.to_string()).as_deref())
        .operands(&request.packages);
}
