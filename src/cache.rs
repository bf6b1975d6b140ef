//! Local caching of requirements files referenced by URI.
//!
//! Requirements may be given as `salt://` references (served from the
//! configured file roots), as `http(s)://` URLs, or as `file://` URLs. The
//! cache turns each of these into a local path pip can read.

use anyhow::{bail, Context, Result};
use reqwest::blocking::Client;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use url::Url;

/// URI schemes whose references must be resolved before pip can use them.
pub const RESOLVED_SCHEMES: &[&str] = &["salt", "http", "https", "ftp", "file"];

/// Returns true if `reference` has to go through a [`RequirementsCache`].
///
/// Plain paths, including Windows drive paths like `C:\reqs.txt`, are used
/// verbatim.
pub fn needs_resolution(reference: &str) -> bool {
    match Url::parse(reference) {
        Ok(url) => RESOLVED_SCHEMES.contains(&url.scheme()),
        Err(_) => false,
    }
}

/// Fetches a remote requirements reference to a local path.
#[cfg_attr(test, mockall::automock)]
pub trait RequirementsCache {
    fn cache_file(&self, source: &str) -> Result<PathBuf>;
}

/// Requirements cache backed by a directory on disk.
#[derive(Debug)]
pub struct FileCache {
    cache_dir: PathBuf,
    file_roots: Vec<PathBuf>,
}

impl FileCache {
    pub fn new(cache_dir: impl Into<PathBuf>, file_roots: Vec<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            file_roots,
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Directory holding files copied out of the file roots.
    pub fn files_dir(&self) -> PathBuf {
        self.cache_dir.join("files")
    }

    /// Directory holding files fetched over HTTP.
    pub fn downloads_dir(&self) -> PathBuf {
        self.cache_dir.join("downloads")
    }

    /// Convert a URL to a stable, filesystem-safe name.
    pub fn url_to_filename(url: &str) -> String {
        let digest = hex::encode(Sha256::digest(url.as_bytes()));

        let filename = url
            .split('/')
            .next_back()
            .map(|s| s.split(['?', '#']).next().unwrap_or(s))
            .filter(|s| !s.is_empty())
            .unwrap_or("requirements.txt");

        format!("{}_{filename}", &digest[..16])
    }

    fn cache_salt_file(&self, relative: &str) -> Result<PathBuf> {
        let relative = relative.split('?').next().unwrap_or(relative);
        let relative_path = Path::new(relative);

        if relative.is_empty()
            || relative_path
                .components()
                .any(|c| !matches!(c, Component::Normal(_)))
        {
            bail!("Invalid file server path: {relative}");
        }

        let source = self
            .file_roots
            .iter()
            .map(|root| root.join(relative_path))
            .find(|candidate| candidate.is_file())
            .with_context(|| format!("{relative} is not present in any file root"))?;

        let target = self.files_dir().join(relative_path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::copy(&source, &target).with_context(|| {
            format!(
                "Failed to copy {} to {}",
                source.display(),
                target.display()
            )
        })?;

        Ok(target)
    }

    fn cache_download(&self, url: &Url) -> Result<PathBuf> {
        let downloads = self.downloads_dir();
        fs::create_dir_all(&downloads)
            .with_context(|| format!("Failed to create {}", downloads.display()))?;

        let response = Client::new()
            .get(url.as_str())
            .send()
            .with_context(|| format!("Failed to request {url}"))?;

        if !response.status().is_success() {
            bail!("Download of {} failed with status: {}", url, response.status());
        }

        let content = response.bytes().context("Failed to read response body")?;

        let mut staged = tempfile::NamedTempFile::new_in(&downloads)
            .context("Failed to create staging file")?;
        staged
            .write_all(&content)
            .context("Failed to write requirements data")?;

        let target = downloads.join(Self::url_to_filename(url.as_str()));
        staged
            .persist(&target)
            .with_context(|| format!("Failed to store {}", target.display()))?;

        Ok(target)
    }
}

impl RequirementsCache for FileCache {
    fn cache_file(&self, source: &str) -> Result<PathBuf> {
        let url = Url::parse(source).with_context(|| format!("Invalid URI: {source}"))?;

        let cached = match url.scheme() {
            "salt" => {
                let relative = source.trim_start_matches("salt://");
                self.cache_salt_file(relative)?
            }
            "http" | "https" => self.cache_download(&url)?,
            "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|_| anyhow::anyhow!("Invalid file URI: {source}"))?;
                if !path.is_file() {
                    bail!("{} does not exist", path.display());
                }
                path
            }
            scheme => bail!("Unsupported scheme for requirements: {scheme}"),
        };

        crate::logging::log_requirements_resolution(source, Some(cached.as_path()));
        Ok(cached)
    }
}
