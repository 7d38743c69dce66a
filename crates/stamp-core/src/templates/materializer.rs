//! Copying or linking a resolved template into the target directory
//!
//! Two template shapes exist: a bare asset tree (the root's own base name is
//! the asset marker) copied wholesale, and a full template whose top-level
//! entries are enumerated under an exclusion policy. Sub-directory templates
//! are considered pre-curated and copied verbatim. After the primary step any
//! missing standard entry is backfilled from the bundled stock template.

use crate::error::{Error, Result};
use crate::layout;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use walkdir::WalkDir;

/// Entries never copied out of a non-subdirectory template
pub const DEFAULT_EXCLUDES: &[&str] = &[
    ".git",
    "RELEASENOTES.md",
    "NOTICE",
    "LICENSE",
    "COPYRIGHT",
    ".npmignore",
    layout::DESCRIPTOR_FILE,
];

/// How a template gets materialized
#[derive(Debug, Clone, Default)]
pub struct MaterializeOptions {
    /// Template content was re-rooted through its descriptor
    pub is_subdirectory: bool,
    /// Symlink the standard folders instead of copying
    pub link: bool,
    /// Extra top-level entries to drop, on top of [`DEFAULT_EXCLUDES`]
    pub extra_excludes: Vec<String>,
}

/// Populate `target` from the resolved template at `root`
pub fn materialize(
    root: &Path,
    target: &Path,
    stock: &Path,
    options: &MaterializeOptions,
) -> Result<()> {
    fs::create_dir_all(target)?;

    copy_template_files(root, target, options)?;
    if options.link {
        link_from_template(root, target)?;
    }
    backfill(target, stock)?;

    Ok(())
}

fn copy_template_files(root: &Path, target: &Path, options: &MaterializeOptions) -> Result<()> {
    // A bare asset tree carries its own marker as the base name
    if root.file_name().is_some_and(|n| n == layout::ASSETS_DIR) {
        return copy_tree(root, &target.join(layout::ASSETS_DIR));
    }

    for entry in fs::read_dir(root)? {
        let entry = entry?;
        let name = entry.file_name();
        let name_str = name.to_string_lossy();
        let excluded = DEFAULT_EXCLUDES.iter().any(|e| *e == name_str)
            || options.extra_excludes.iter().any(|e| *e == name_str);
        // Sub-directory templates are pre-curated; copy them verbatim
        if excluded && !options.is_subdirectory {
            continue;
        }
        let src = entry.path();
        let dst = target.join(&name);
        if entry.file_type()?.is_dir() {
            copy_tree(&src, &dst)?;
        } else {
            fs::copy(&src, &dst)?;
        }
    }

    Ok(())
}

/// Recursively copy a directory tree
fn copy_tree(src: &Path, dst: &Path) -> Result<()> {
    for entry in WalkDir::new(src) {
        let entry = entry.map_err(std::io::Error::from)?;
        let rel = match entry.path().strip_prefix(src) {
            Ok(rel) => rel,
            Err(_) => continue,
        };
        let out = dst.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&out)?;
        } else {
            if let Some(parent) = out.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &out)?;
        }
    }
    Ok(())
}

/// Replace the standard top-level entries with symlinks into the template
///
/// The project file is linked only when it lives outside the asset tree; a
/// project file inside the assets is copied to the target root instead.
fn link_from_template(root: &Path, target: &Path) -> Result<()> {
    let copy_dst = target.join(layout::PROJECT_FILE);
    let copy_src;

    if root.file_name().is_some_and(|n| n == layout::ASSETS_DIR) {
        replace_with_link(root, &target.join(layout::ASSETS_DIR), true)?;
        copy_src = root.join(layout::PROJECT_FILE);
    } else {
        for folder in [layout::ASSETS_DIR, layout::MERGES_DIR, layout::HOOKS_DIR] {
            replace_with_link(&root.join(folder), &target.join(folder), true)?;
        }
        replace_with_link(&root.join(layout::PROJECT_FILE), &copy_dst, false)?;
        copy_src = root.join(layout::ASSETS_DIR).join(layout::PROJECT_FILE);
    }

    if !copy_dst.exists() && copy_src.exists() {
        fs::copy(&copy_src, &copy_dst)?;
    }

    Ok(())
}

/// Remove any pre-existing destination entry, then link to `src` if it exists
fn replace_with_link(src: &Path, dst: &Path, is_dir: bool) -> Result<()> {
    if dst.symlink_metadata().is_ok() {
        if dst.is_dir() && !dst.is_symlink() {
            fs::remove_dir_all(dst)?;
        } else {
            fs::remove_file(dst)?;
        }
    }
    if src.exists() {
        symlink(src, dst, is_dir).map_err(|e| {
            if e.kind() == ErrorKind::PermissionDenied {
                Error::InsufficientPrivilege
            } else {
                e.into()
            }
        })?;
    }
    Ok(())
}

#[cfg(unix)]
fn symlink(src: &Path, dst: &Path, _is_dir: bool) -> std::io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

#[cfg(windows)]
fn symlink(src: &Path, dst: &Path, is_dir: bool) -> std::io::Result<()> {
    if is_dir {
        std::os::windows::fs::symlink_dir(src, dst)
    } else {
        std::os::windows::fs::symlink_file(src, dst)
    }
}

/// Fill in whatever the acquired template left out, from the stock template
fn backfill(target: &Path, stock: &Path) -> Result<()> {
    copy_if_not_exists(&stock.join(layout::ASSETS_DIR), &target.join(layout::ASSETS_DIR))?;
    copy_if_not_exists(&stock.join(layout::HOOKS_DIR), &target.join(layout::HOOKS_DIR))?;

    // A project file nested in the assets is moved, not copied, to the root
    let root_project = target.join(layout::PROJECT_FILE);
    if !root_project.exists() {
        let nested = target.join(layout::ASSETS_DIR).join(layout::PROJECT_FILE);
        if nested.exists() {
            fs::rename(&nested, &root_project)?;
        } else if stock.join(layout::PROJECT_FILE).exists() {
            fs::copy(stock.join(layout::PROJECT_FILE), &root_project)?;
        }
    }

    let lockfile = target.join(layout::LOCK_FILE);
    if !lockfile.exists() && stock.join(layout::LOCK_FILE).exists() {
        fs::copy(stock.join(layout::LOCK_FILE), &lockfile)?;
    }

    Ok(())
}

/// Recursively copy `src` to `dst` only when `dst` is absent
fn copy_if_not_exists(src: &Path, dst: &Path) -> Result<()> {
    if dst.symlink_metadata().is_err() && src.exists() {
        copy_tree(src, dst)?;
    }
    Ok(())
}
