use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{PipError, Result};
use crate::runner::RunOptions;

/// An ordered list of command arguments that may be given either as a
/// sequence or as one comma-delimited string.
///
/// Both forms normalize to the same sequence: order is preserved and
/// duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ArgListRepr", into = "Vec<String>")]
pub struct ArgList(Vec<String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum ArgListRepr {
    Joined(String),
    List(Vec<String>),
}

impl From<ArgListRepr> for ArgList {
    fn from(repr: ArgListRepr) -> Self {
        match repr {
            ArgListRepr::Joined(s) => ArgList::parse(&s),
            ArgListRepr::List(items) => ArgList::from(items),
        }
    }
}

impl From<ArgList> for Vec<String> {
    fn from(list: ArgList) -> Self {
        list.0
    }
}

impl ArgList {
    /// Split a comma-delimited string. Whitespace around entries and empty
    /// entries are dropped, the same as for a list.
    pub fn parse(joined: &str) -> Self {
        Self(
            joined
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl From<&str> for ArgList {
    fn from(joined: &str) -> Self {
        Self::parse(joined)
    }
}

impl From<String> for ArgList {
    fn from(joined: String) -> Self {
        Self::parse(&joined)
    }
}

impl From<Vec<String>> for ArgList {
    fn from(items: Vec<String>) -> Self {
        Self(
            items
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        )
    }
}

impl From<Vec<&str>> for ArgList {
    fn from(items: Vec<&str>) -> Self {
        items.into_iter().map(String::from).collect::<Vec<_>>().into()
    }
}

impl From<&[&str]> for ArgList {
    fn from(items: &[&str]) -> Self {
        items.to_vec().into()
    }
}

impl<const N: usize> From<[&str; N]> for ArgList {
    fn from(items: [&str; N]) -> Self {
        items.to_vec().into()
    }
}

impl<'a> IntoIterator for &'a ArgList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// What pip does when a path it needs to write already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExistsAction {
    Switch,
    Ignore,
    Wipe,
    Backup,
}

impl ExistsAction {
    pub fn flag(&self) -> char {
        match self {
            Self::Switch => 's',
            Self::Ignore => 'i',
            Self::Wipe => 'w',
            Self::Backup => 'b',
        }
    }
}

impl FromStr for ExistsAction {
    type Err = PipError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "s" | "switch" => Ok(Self::Switch),
            "i" | "ignore" => Ok(Self::Ignore),
            "w" | "wipe" => Ok(Self::Wipe),
            "b" | "backup" => Ok(Self::Backup),
            other => Err(PipError::invalid_argument(
                "exists_action",
                format!("'{other}' is not one of s, i, w, b"),
            )),
        }
    }
}

impl fmt::Display for ExistsAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.flag())
    }
}

const VCS_PREFIXES: &[&str] = &["git+", "hg+", "svn+", "bzr+"];

/// A request to install packages with pip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallRequest {
    pub packages: ArgList,
    /// Local path, or `salt://`/`http(s)://`/`file://` reference.
    pub requirements: Option<String>,
    /// Virtualenv root, or the path of a pip binary.
    pub bin_env: Option<PathBuf>,
    pub activate: bool,
    pub log: Option<String>,
    pub proxy: Option<String>,
    pub timeout: Option<u64>,
    pub editable: ArgList,
    pub find_links: Option<String>,
    pub index_url: Option<String>,
    pub extra_index_url: Option<String>,
    pub no_index: bool,
    pub mirrors: ArgList,
    pub build: Option<String>,
    pub target: Option<String>,
    pub download_cache: Option<String>,
    pub upgrade: bool,
    pub force_reinstall: bool,
    pub ignore_installed: bool,
    pub exists_action: Option<ExistsAction>,
    pub no_deps: bool,
    pub install_options: ArgList,
    pub runas: Option<String>,
    pub cwd: Option<PathBuf>,
}

impl InstallRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn packages(mut self, packages: impl Into<ArgList>) -> Self {
        self.packages = packages.into();
        self
    }

    pub fn requirements(mut self, requirements: impl Into<String>) -> Self {
        self.requirements = Some(requirements.into());
        self
    }

    pub fn bin_env(mut self, bin_env: impl Into<PathBuf>) -> Self {
        self.bin_env = Some(bin_env.into());
        self
    }

    pub fn activate(mut self, activate: bool) -> Self {
        self.activate = activate;
        self
    }

    pub fn mirrors(mut self, mirrors: impl Into<ArgList>) -> Self {
        self.mirrors = mirrors.into();
        self
    }

    pub fn editable(mut self, editable: impl Into<ArgList>) -> Self {
        self.editable = editable.into();
        self
    }

    pub fn index_url(mut self, url: impl Into<String>) -> Self {
        self.index_url = Some(url.into());
        self
    }

    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    pub fn timeout(mut self, seconds: u64) -> Self {
        self.timeout = Some(seconds);
        self
    }

    pub fn upgrade(mut self, upgrade: bool) -> Self {
        self.upgrade = upgrade;
        self
    }

    pub fn no_deps(mut self, no_deps: bool) -> Self {
        self.no_deps = no_deps;
        self
    }

    pub fn exists_action(mut self, action: ExistsAction) -> Self {
        self.exists_action = Some(action);
        self
    }

    pub fn install_options(mut self, options: impl Into<ArgList>) -> Self {
        self.install_options = options.into();
        self
    }

    pub fn runas(mut self, user: impl Into<String>) -> Self {
        self.runas = Some(user.into());
        self
    }

    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn run_options(&self) -> RunOptions {
        RunOptions::new(self.runas.clone(), self.cwd.clone())
    }

    /// Reject arguments pip would misread before anything is resolved or run.
    pub fn validate(&self) -> Result<()> {
        for source in &self.editable {
            let is_vcs = VCS_PREFIXES.iter().any(|p| source.starts_with(p));
            if is_vcs && !source.contains("#egg=") && !source.contains("&egg=") {
                return Err(PipError::invalid_argument(
                    "editable",
                    format!("'{source}' is a VCS URL but has no #egg=<name> fragment"),
                ));
            }
        }
        Ok(())
    }
}

/// A request to uninstall packages with pip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UninstallRequest {
    pub packages: ArgList,
    pub requirements: Option<String>,
    pub bin_env: Option<PathBuf>,
    pub proxy: Option<String>,
    pub timeout: Option<u64>,
    pub runas: Option<String>,
    pub cwd: Option<PathBuf>,
}

impl UninstallRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn packages(mut self, packages: impl Into<ArgList>) -> Self {
        self.packages = packages.into();
        self
    }

    pub fn requirements(mut self, requirements: impl Into<String>) -> Self {
        self.requirements = Some(requirements.into());
        self
    }

    pub fn bin_env(mut self, bin_env: impl Into<PathBuf>) -> Self {
        self.bin_env = Some(bin_env.into());
        self
    }

    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    pub fn timeout(mut self, seconds: u64) -> Self {
        self.timeout = Some(seconds);
        self
    }

    pub fn runas(mut self, user: impl Into<String>) -> Self {
        self.runas = Some(user.into());
        self
    }

    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn run_options(&self) -> RunOptions {
        RunOptions::new(self.runas.clone(), self.cwd.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arg_list_from_list_and_string_match() {
        let from_list = ArgList::from(vec!["http://a", "http://b", "http://c"]);
        let from_string = ArgList::from("http://a,http://b,http://c");
        assert_eq!(from_list, from_string);
        assert_eq!(from_list.len(), 3);
    }

    #[test]
    fn test_arg_list_list_entries_are_trimmed_like_joined() {
        let from_list = ArgList::from(vec![" http://a ", "", "http://b\t"]);
        let from_string = ArgList::from(" http://a ,, http://b\t");
        assert_eq!(from_list, from_string);
        assert_eq!(from_list.as_slice(), &["http://a", "http://b"]);
    }

    #[test]
    fn test_arg_list_keeps_order_and_duplicates() {
        let list = ArgList::from("b, a ,b,,");
        assert_eq!(list.as_slice(), &["b", "a", "b"]);
    }

    #[test]
    fn test_arg_list_deserializes_both_forms() {
        let joined: ArgList = serde_json::from_str(r#""x,y""#).unwrap();
        let listed: ArgList = serde_json::from_str(r#"["x","y"]"#).unwrap();
        assert_eq!(joined, listed);
        assert_eq!(serde_json::to_string(&joined).unwrap(), r#"["x","y"]"#);
    }

    #[test]
    fn test_exists_action_parse() {
        assert_eq!("s".parse::<ExistsAction>().unwrap(), ExistsAction::Switch);
        assert_eq!("Wipe".parse::<ExistsAction>().unwrap(), ExistsAction::Wipe);
        assert_eq!(ExistsAction::Backup.to_string(), "b");
        assert!(matches!(
            "x".parse::<ExistsAction>(),
            Err(PipError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_validate_editable_vcs_needs_egg() {
        let bad = InstallRequest::new().editable("git+https://github.com/org/repo.git");
        assert!(bad.validate().is_err());

        let good = InstallRequest::new()
            .editable("git+https://github.com/org/repo.git#egg=repo,/srv/local/checkout");
        assert!(good.validate().is_ok());
    }

    #[test]
    fn test_install_request_deserializes_with_defaults() {
        let request: InstallRequest = serde_json::from_str(
            r#"{"packages": "mock,nose", "bin_env": "/venv", "activate": true}"#,
        )
        .unwrap();
        assert_eq!(request.packages.as_slice(), &["mock", "nose"]);
        assert_eq!(request.bin_env, Some(PathBuf::from("/venv")));
        assert!(request.activate);
        assert!(request.mirrors.is_empty());
        assert_eq!(request.run_options(), RunOptions::default());
    }
}
