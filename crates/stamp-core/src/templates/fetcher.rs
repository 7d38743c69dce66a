//! Retrieval of non-local template sources into the cache directory
//!
//! Two remote shapes exist: version-controlled repositories, cloned with the
//! system `git`, and registry packages, downloaded as zip archives over HTTP
//! and unpacked. Either way the result is a plain local directory owned by
//! the cache, which later invocations may reuse.

use crate::error::{Error, Result};
use crate::templates::source::SourceKind;
use std::env;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use url::Url;
use zip::ZipArchive;

/// Default registry serving template archives
pub const DEFAULT_REGISTRY_URL: &str = "https://registry.stamp.dev/templates";

/// Environment variable overriding the registry base URL
pub const REGISTRY_URL_ENV: &str = "STAMP_REGISTRY_URL";

/// Fetches remote template sources into a local cache
pub struct TemplateFetcher {
    client: reqwest::Client,
    registry_base: String,
}

impl TemplateFetcher {
    pub fn new(user_agent: &str) -> Self {
        let registry_base =
            env::var(REGISTRY_URL_ENV).unwrap_or_else(|_| DEFAULT_REGISTRY_URL.to_string());
        Self {
            client: reqwest::Client::builder()
                .user_agent(user_agent)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            registry_base,
        }
    }

    /// Bring a classified source onto the local filesystem
    ///
    /// Local directories pass through untouched; remote sources land under
    /// `cache_dir` and the returned path points at the fetched copy.
    pub async fn fetch(&self, source: &SourceKind, cache_dir: &Path) -> Result<PathBuf> {
        match source {
            SourceKind::LocalDirectory(path) => Ok(path.clone()),
            SourceKind::VcsRepository(url) => self.clone_repository(url, cache_dir).await,
            SourceKind::RegistryPackage(name) => self.download_package(name, cache_dir).await,
        }
    }

    async fn clone_repository(&self, url: &str, cache_dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(cache_dir)?;
        let dest = cache_dir.join(repository_name(url));
        // Stale clones are replaced; the cache holds at most one copy per repo
        if dest.exists() {
            std::fs::remove_dir_all(&dest)?;
        }

        let output = Command::new("git")
            .arg("clone")
            .arg("--depth")
            .arg("1")
            .arg(url)
            .arg(&dest)
            .output()
            .await
            .map_err(|e| Error::SourceFetch {
                reference: url.to_string(),
                message: format!("failed to run git: {}", e),
            })?;

        if !output.status.success() {
            return Err(Error::SourceFetch {
                reference: url.to_string(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(dest)
    }

    async fn download_package(&self, name: &str, cache_dir: &Path) -> Result<PathBuf> {
        let (package, version) = split_version(name);
        let url = self.package_url(package, version).map_err(|message| {
            Error::SourceFetch {
                reference: name.to_string(),
                message,
            }
        })?;

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Error::SourceFetch {
                reference: name.to_string(),
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(Error::SourceFetch {
                reference: name.to_string(),
                message: format!("{} answered HTTP {}", url, response.status()),
            });
        }

        let bytes = response.bytes().await.map_err(|e| Error::SourceFetch {
            reference: name.to_string(),
            message: e.to_string(),
        })?;

        let dest = cache_dir.join(package);
        if dest.exists() {
            std::fs::remove_dir_all(&dest)?;
        }
        extract_zip(&bytes, &dest).map_err(|message| Error::SourceFetch {
            reference: name.to_string(),
            message,
        })?;

        Ok(dest)
    }

    /// Build `<registry>/<package>/<version>.zip`, preserving query parameters
    fn package_url(&self, package: &str, version: &str) -> std::result::Result<Url, String> {
        let mut url = Url::parse(&self.registry_base)
            .map_err(|e| format!("invalid registry URL \"{}\": {}", self.registry_base, e))?;
        url.path_segments_mut()
            .map_err(|_| format!("registry URL cannot have path segments: {}", self.registry_base))?
            .pop_if_empty()
            .push(package)
            .push(&format!("{}.zip", version));
        Ok(url)
    }
}

/// Split `name@version` into its parts; a bare name means `latest`
fn split_version(reference: &str) -> (&str, &str) {
    match reference.rsplit_once('@') {
        // A leading @ belongs to a scope, not a version
        Some((name, version)) if !name.is_empty() => (name, version),
        _ => (reference, "latest"),
    }
}

/// Last path segment of a repository URL, with any `.git` suffix dropped
fn repository_name(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    let last = trimmed.rsplit('/').next().unwrap_or(trimmed);
    last.trim_end_matches(".git").to_string()
}

fn extract_zip(bytes: &[u8], dest: &Path) -> std::result::Result<(), String> {
    let cursor = Cursor::new(bytes);
    let mut archive =
        ZipArchive::new(cursor).map_err(|e| format!("failed to read zip archive: {}", e))?;

    for i in 0..archive.len() {
        let mut file = archive.by_index(i).map_err(|e| e.to_string())?;
        if file.is_dir() {
            continue;
        }
        let Some(rel) = file.enclosed_name() else {
            // Entries escaping the destination are dropped, not extracted
            continue;
        };
        let out_path = dest.join(rel);
        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        let mut contents = Vec::new();
        file.read_to_end(&mut contents).map_err(|e| e.to_string())?;
        std::fs::write(&out_path, contents).map_err(|e| e.to_string())?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_version() {
        assert_eq!(split_version("starter@1.2.0"), ("starter", "1.2.0"));
        assert_eq!(split_version("starter"), ("starter", "latest"));
        assert_eq!(split_version("@scope/starter"), ("@scope/starter", "latest"));
    }

    #[test]
    fn test_repository_name() {
        assert_eq!(repository_name("https://example.com/org/tpl.git"), "tpl");
        assert_eq!(repository_name("https://example.com/org/tpl"), "tpl");
        assert_eq!(repository_name("git://example.com/org/tpl.git/"), "tpl");
    }

    #[test]
    fn test_package_url_layout() {
        let fetcher = TemplateFetcher {
            client: reqwest::Client::new(),
            registry_base: "https://registry.example.com/templates".to_string(),
        };
        let url = fetcher.package_url("starter", "1.0.0").unwrap();
        assert_eq!(
            url.as_str(),
            "https://registry.example.com/templates/starter/1.0.0.zip"
        );
    }

    #[test]
    fn test_extract_zip_roundtrip() {
        use std::io::Write;
        use zip::write::SimpleFileOptions;
        use zip::ZipWriter;

        let mut buffer = Vec::new();
        {
            let mut writer = ZipWriter::new(Cursor::new(&mut buffer));
            let options = SimpleFileOptions::default();
            writer.start_file("www/index.html", options).unwrap();
            writer.write_all(b"<html></html>").unwrap();
            writer.finish().unwrap();
        }

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("pkg");
        extract_zip(&buffer, &dest).unwrap();
        assert_eq!(
            std::fs::read(dest.join("www/index.html")).unwrap(),
            b"<html></html>"
        );
    }
}
