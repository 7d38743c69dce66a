//! Preconditions checked before the first disk mutation

use crate::config::{identifier, ProjectConfig};
use crate::error::{Error, Result};
use crate::layout;
use std::fs;
use std::path::{Path, PathBuf};

/// Validate every precondition for scaffolding into `target_dir`
///
/// All checks run before anything is written; a violation leaves the
/// filesystem untouched.
pub fn check(target_dir: &Path, config: &ProjectConfig) -> Result<()> {
    ensure_target_usable(target_dir)?;

    if let Some(id) = &config.id {
        if !identifier::is_valid(id) {
            return Err(Error::InvalidIdentifier(id.clone()));
        }
    }

    let source = absolutize(Path::new(&config.source.url))?;
    let target = absolutize(target_dir)?;
    // If the source were an ancestor of the target we would recursively copy
    // the target into itself forever.
    if target.starts_with(&source) {
        return Err(Error::RecursiveTemplate {
            template: source,
            target,
        });
    }

    Ok(())
}

/// The target, if present, must be empty or contain only the settings folder
fn ensure_target_usable(target_dir: &Path) -> Result<()> {
    if !target_dir.exists() {
        return Ok(());
    }
    let mut entries = fs::read_dir(target_dir)?;
    let sane = match (entries.next(), entries.next()) {
        (None, _) => true,
        (Some(entry), None) => entry?.file_name() == layout::SETTINGS_DIR,
        _ => false,
    };
    if sane {
        Ok(())
    } else {
        Err(Error::DirectoryNotEmpty(target_dir.to_path_buf()))
    }
}

/// Lexically absolutize a path without touching the filesystem
pub fn absolutize(path: &Path) -> Result<PathBuf> {
    Ok(std::path::absolute(path)?)
}
