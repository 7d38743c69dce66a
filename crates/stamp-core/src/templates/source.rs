//! Template source classification and resolution
//!
//! A template reference is one of three things: a local directory, a
//! version-controlled repository URL, or a registry package name. Remote
//! shapes are handed to the fetch collaborator; the resolver always hands
//! back an existing local root, re-rooted through the descriptor's `dirname`
//! when the template nests its content.

use crate::error::{Error, Result};
use crate::events::EventSink;
use crate::safety::absolutize;
use crate::templates::descriptor::TemplateDescriptor;
use crate::templates::fetcher::TemplateFetcher;
use std::path::{Path, PathBuf};
use url::Url;

/// Classified template reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    LocalDirectory(PathBuf),
    VcsRepository(String),
    RegistryPackage(String),
}

/// A template resolved to a local filesystem root
#[derive(Debug, Clone)]
pub struct ResolvedTemplate {
    pub root: PathBuf,
    /// True when the descriptor re-rooted us below the fetched location
    pub is_subdirectory: bool,
    pub descriptor: Option<TemplateDescriptor>,
}

/// Classify a reference without touching the network
///
/// When `is_template` is false the reference is a bare asset tree and always
/// local. Otherwise: a URL whose scheme is longer than two characters is a
/// repository (anything shorter is a Windows drive letter); a reference with
/// an `@` version specifier, or one that does not exist locally, is a
/// registry package; anything else is a local directory.
pub fn classify(reference: &str, is_template: bool) -> Result<SourceKind> {
    if !is_template {
        return Ok(SourceKind::LocalDirectory(absolutize(Path::new(reference))?));
    }
    if is_url(reference) {
        return Ok(SourceKind::VcsRepository(reference.to_string()));
    }
    if reference.contains('@') || !Path::new(reference).exists() {
        return Ok(SourceKind::RegistryPackage(reference.to_string()));
    }
    Ok(SourceKind::LocalDirectory(absolutize(Path::new(reference))?))
}

fn is_url(value: &str) -> bool {
    Url::parse(value).is_ok_and(|u| u.scheme().len() > 2)
}

/// Resolve a reference all the way to an existing local template root
pub async fn resolve(
    fetcher: &TemplateFetcher,
    reference: &str,
    is_template: bool,
    cache_dir: &Path,
    sink: &dyn EventSink,
) -> Result<ResolvedTemplate> {
    let kind = classify(reference, is_template)?;
    let fetched_root = match &kind {
        SourceKind::LocalDirectory(path) => path.clone(),
        remote => {
            sink.log(&format!("Fetching template from {}", reference));
            match fetcher.fetch(remote, cache_dir).await {
                Ok(root) => root,
                Err(e) => {
                    sink.error(&e.to_string());
                    return Err(e);
                }
            }
        }
    };

    resolve_existing(fetched_root, sink)
}

/// Finish resolution of an already-local root: probe the descriptor,
/// re-root through `dirname` and require the result to exist
pub fn resolve_existing(fetched_root: PathBuf, sink: &dyn EventSink) -> Result<ResolvedTemplate> {
    // Probe for a descriptor; absence or mismatch means a plain template
    let descriptor = TemplateDescriptor::load(&fetched_root);
    let (root, is_subdirectory) = match descriptor.as_ref().and_then(|d| d.dirname.as_deref()) {
        Some(dirname) => (fetched_root.join(dirname), true),
        None => {
            sink.verbose(&format!(
                "no sub-directory declared by template: {}",
                fetched_root.display()
            ));
            (fetched_root, false)
        }
    };

    if !root.exists() {
        return Err(Error::TemplateNotFound(root));
    }

    Ok(ResolvedTemplate {
        root,
        is_subdirectory,
        descriptor,
    })
}
