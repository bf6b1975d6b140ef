//! Parsing of `pip freeze` and `pip --version` output.

use std::collections::BTreeMap;

/// One meaningful line of `pip freeze` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FreezeEntry {
    /// `name==version`
    Pinned { name: String, version: String },
    /// `-e <source>#egg=<name>`
    Editable { name: String, source: String },
}

impl FreezeEntry {
    pub fn name(&self) -> &str {
        match self {
            Self::Pinned { name, .. } | Self::Editable { name, .. } => name,
        }
    }

    /// Version for pinned packages, source URL for editable ones.
    pub fn version(&self) -> &str {
        match self {
            Self::Pinned { version, .. } => version,
            Self::Editable { source, .. } => source,
        }
    }
}

/// Parse one freeze line. Comments, `-f` find-links lines and blank lines
/// yield `None`, as do lines in a format pip is not known to emit.
pub fn parse_freeze_line(line: &str) -> Option<FreezeEntry> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') || line.starts_with("-f") {
        return None;
    }

    if let Some(editable) = line.strip_prefix("-e") {
        let (source, name) = editable.trim().split_once("#egg=")?;
        return Some(FreezeEntry::Editable {
            name: name.to_string(),
            source: source.to_string(),
        });
    }

    let (name, version) = line.split_once("==")?;
    Some(FreezeEntry::Pinned {
        name: name.trim().to_string(),
        version: version.trim().to_string(),
    })
}

/// Map installed package names to versions, keeping names that start with
/// `prefix` (case-insensitive) when one is given.
pub fn parse_listing<S: AsRef<str>>(lines: &[S], prefix: Option<&str>) -> BTreeMap<String, String> {
    let prefix = prefix.map(str::to_lowercase);
    let mut packages = BTreeMap::new();

    for line in lines {
        let line = line.as_ref();
        let Some(entry) = parse_freeze_line(line) else {
            let trimmed = line.trim();
            if !trimmed.is_empty() && !trimmed.starts_with('#') && !trimmed.starts_with("-f") {
                tracing::warn!(line = trimmed, "Can't parse pip freeze line");
            }
            continue;
        };

        if let Some(prefix) = &prefix {
            if !entry.name().to_lowercase().starts_with(prefix.as_str()) {
                continue;
            }
        }

        packages.insert(entry.name().to_string(), entry.version().to_string());
    }

    packages
}

/// Extract the version from `pip X.Y.Z from /path (python A.B)`.
pub fn parse_pip_version(output: &str) -> Option<String> {
    output
        .trim()
        .strip_prefix("pip ")
        .and_then(|rest| rest.split_whitespace().next())
        .map(str::to_string)
}

/// Pad or truncate a pip version to three numeric components.
fn normalize_version(version: &str) -> Option<semver::Version> {
    let mut parts = [0u64; 3];
    for (slot, component) in parts.iter_mut().zip(version.split('.')) {
        let digits: String = component.chars().take_while(|c| c.is_ascii_digit()).collect();
        *slot = digits.parse().ok()?;
    }
    Some(semver::Version::new(parts[0], parts[1], parts[2]))
}

/// Whether this pip still accepts `--use-mirrors`/`--mirrors` (removed in 1.5).
pub fn supports_mirrors(version: &str) -> bool {
    match normalize_version(version) {
        Some(v) => v < semver::Version::new(1, 5, 0),
        None => false,
    }
}
