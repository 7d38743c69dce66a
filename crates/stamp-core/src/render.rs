//! Placeholder substitution over materialized files
//!
//! File names and contents are rendered with mustache-style `{{key}}` tokens
//! against the final metadata. Entries matching a skip pattern are exempt
//! from both renaming and content substitution. A renamed entry replaces the
//! original in one step on the in-memory set, so no consumer ever observes
//! both paths; mutations on the set are serialized.

use crate::error::{Error, Result};
use crate::layout;
use globset::{Glob, GlobSet, GlobSetBuilder};
use handlebars::{Context, Handlebars, Helper, HelperResult, Output, RenderContext, Renderable};
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use walkdir::WalkDir;

/// The materialized files of a target directory, keyed by relative path
/// with `/` separators
#[derive(Debug, Default)]
pub struct FileSet {
    entries: BTreeMap<String, Vec<u8>>,
    dirty: BTreeSet<String>,
    removed: BTreeSet<String>,
}

impl FileSet {
    /// Snapshot every regular file under `root`
    ///
    /// The settings folder is never rendered; symlinked entries are left
    /// untouched so link mode never rewrites the template through the link.
    pub fn from_dir(root: &Path) -> Result<Self> {
        let settings_prefix = format!("{}/", layout::SETTINGS_DIR);
        let mut entries = BTreeMap::new();
        for entry in WalkDir::new(root) {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = match entry.path().strip_prefix(root) {
                Ok(rel) => rel,
                Err(_) => continue,
            };
            let rel_str = rel.to_string_lossy().replace('\\', "/");
            if rel_str.starts_with(&settings_prefix) {
                continue;
            }
            entries.insert(rel_str, fs::read(entry.path())?);
        }
        Ok(Self {
            entries,
            dirty: BTreeSet::new(),
            removed: BTreeSet::new(),
        })
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.entries.get(path).map(Vec::as_slice)
    }

    pub fn insert(&mut self, path: &str, content: Vec<u8>) {
        self.entries.insert(path.to_string(), content);
        self.dirty.insert(path.to_string());
    }

    fn paths(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Rewrite an entry's content in place
    fn update(&mut self, path: &str, content: Vec<u8>) {
        self.entries.insert(path.to_string(), content);
        self.dirty.insert(path.to_string());
    }

    /// Move an entry to a new path; the delete and insert happen as one
    /// mutation of the set
    fn replace(&mut self, old_path: &str, new_path: String, content: Vec<u8>) {
        self.entries.remove(old_path);
        self.removed.insert(old_path.to_string());
        self.dirty.insert(new_path.clone());
        self.entries.insert(new_path, content);
    }

    /// Write accumulated changes back under `root`
    pub fn apply(&self, root: &Path) -> Result<()> {
        for gone in &self.removed {
            if self.entries.contains_key(gone) {
                continue;
            }
            let old = root.join(gone);
            match fs::remove_file(&old) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
            // A rename out of a placeholder-named folder must not leave the
            // literal folder behind
            prune_empty_parents(&old, root);
        }
        for path in &self.dirty {
            let dst = root.join(path);
            if let Some(parent) = dst.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&dst, &self.entries[path])?;
        }
        Ok(())
    }
}

/// Remove directories emptied by a rename, walking up to (but never
/// including) `root`. Stops at the first non-empty or missing ancestor.
fn prune_empty_parents(removed: &Path, root: &Path) {
    let mut dir = removed.parent();
    while let Some(d) = dir {
        if d == root || !d.starts_with(root) {
            break;
        }
        if fs::remove_dir(d).is_err() {
            break;
        }
        dir = d.parent();
    }
}

/// Substitute placeholders in names and contents of every entry
pub fn render(
    files: &mut FileSet,
    metadata: &Map<String, Value>,
    skip_patterns: &[String],
) -> Result<()> {
    let skip = build_globset(skip_patterns)?;
    let engine = engine();
    let data = Value::Object(metadata.clone());
    let token = token_regex();

    for path in files.paths() {
        if skip.is_match(path.as_str()) {
            continue;
        }
        let content = files.get(&path).map(<[u8]>::to_vec).unwrap_or_default();
        let text = String::from_utf8_lossy(&content).into_owned();
        let path_has_token = token.is_match(&path);
        let content_has_token = token.is_match(&text);
        // Cheap short-circuit for the common token-free file
        if !path_has_token && !content_has_token {
            continue;
        }

        let new_path = if path_has_token {
            engine
                .render_template(&path, &data)
                .map_err(|e| Error::Render {
                    path: path.clone(),
                    message: e.to_string(),
                })?
        } else {
            path.clone()
        };

        let new_content = if content_has_token {
            engine
                .render_template(&text, &data)
                .map_err(|e| Error::Render {
                    path: new_path.clone(),
                    message: e.to_string(),
                })?
                .into_bytes()
        } else {
            // Only the name changes; keep the original bytes untouched
            content
        };

        if new_path != path {
            if files.contains(&new_path) {
                return Err(Error::Render {
                    path: path.clone(),
                    message: format!(
                        "renames to \"{}\", which collides with another entry",
                        new_path
                    ),
                });
            }
            files.replace(&path, new_path, new_content);
        } else if content_has_token {
            files.update(&path, new_content);
        }
    }

    Ok(())
}

/// Render a single template string against metadata
pub(crate) fn render_str(
    template: &str,
    metadata: &Map<String, Value>,
) -> std::result::Result<String, String> {
    engine()
        .render_template(template, &Value::Object(metadata.clone()))
        .map_err(|e| e.to_string())
}

fn token_regex() -> Regex {
    Regex::new(r"\{\{[^{}]+\}\}").expect("token pattern is valid")
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| {
            Error::InvalidConfig(format!("invalid skip pattern \"{}\": {}", pattern, e))
        })?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| Error::InvalidConfig(format!("invalid skip patterns: {}", e)))
}

fn engine() -> Handlebars<'static> {
    let mut registry = Handlebars::new();
    registry.register_helper("if_eq", Box::new(if_eq));
    registry.register_helper("unless_eq", Box::new(unless_eq));
    registry
}

fn if_eq<'reg, 'rc>(
    h: &Helper<'rc>,
    r: &'reg Handlebars<'reg>,
    ctx: &'rc Context,
    rc: &mut RenderContext<'reg, 'rc>,
    out: &mut dyn Output,
) -> HelperResult {
    let equal = h.param(0).map(|p| p.value().clone()) == h.param(1).map(|p| p.value().clone());
    let block = if equal { h.template() } else { h.inverse() };
    if let Some(t) = block {
        t.render(r, ctx, rc, out)?;
    }
    Ok(())
}

fn unless_eq<'reg, 'rc>(
    h: &Helper<'rc>,
    r: &'reg Handlebars<'reg>,
    ctx: &'rc Context,
    rc: &mut RenderContext<'reg, 'rc>,
    out: &mut dyn Output,
) -> HelperResult {
    let equal = h.param(0).map(|p| p.value().clone()) == h.param(1).map(|p| p.value().clone());
    let block = if equal { h.inverse() } else { h.template() };
    if let Some(t) = block {
        t.render(r, ctx, rc, out)?;
    }
    Ok(())
}
