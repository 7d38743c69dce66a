//! Well-known names and locations inside a stamp project

use std::env;
use std::path::{Path, PathBuf};

/// Asset tree copied or linked from the template
pub const ASSETS_DIR: &str = "www";

/// Lifecycle-hook folder
pub const HOOKS_DIR: &str = "hooks";

/// Per-platform merge overlay
pub const MERGES_DIR: &str = "merges";

/// Project manifest file at the target root
pub const PROJECT_FILE: &str = "app.yaml";

/// Stock lockfile backfilled when the template ships none
pub const LOCK_FILE: &str = "app.lock";

/// Dotfolder holding durable per-project settings
pub const SETTINGS_DIR: &str = ".stamp";

/// Settings file inside [`SETTINGS_DIR`]
pub const SETTINGS_FILE: &str = "config.json";

/// Template descriptor file (sub-directory indirection, prompts, skip list)
pub const DESCRIPTOR_FILE: &str = "template.yaml";

/// Scaffold folders guaranteed to exist after a successful run
pub const SCAFFOLD_DIRS: &[&str] = &["platforms", "plugins"];

/// Global cache directory for fetched templates
///
/// `STAMP_HOME` wins; otherwise `.stamp` under the user's home directory.
pub fn cache_dir() -> PathBuf {
    if let Some(home) = env::var_os("STAMP_HOME") {
        return PathBuf::from(home);
    }
    let home_var = if cfg!(windows) { "USERPROFILE" } else { "HOME" };
    match env::var_os(home_var) {
        Some(home) => PathBuf::from(home).join(SETTINGS_DIR),
        None => PathBuf::from(SETTINGS_DIR),
    }
}

/// Location of the stock template bundled with the tool
///
/// Overridable via `STAMP_TEMPLATES` for packaged installs.
pub fn stock_template_dir() -> PathBuf {
    match env::var_os("STAMP_TEMPLATES") {
        Some(dir) => PathBuf::from(dir),
        None => Path::new(env!("CARGO_MANIFEST_DIR")).join("templates"),
    }
}

/// Settings file path for a given project directory
pub fn settings_path(project_dir: &Path) -> PathBuf {
    project_dir.join(SETTINGS_DIR).join(SETTINGS_FILE)
}
