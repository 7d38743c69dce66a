//! Error taxonomy for the scaffolding pipeline
//!
//! Every stage failure maps to one of these variants. All of them are
//! terminal for the current invocation; retrying is a caller concern.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the scaffolding pipeline
#[derive(Debug, Error)]
pub enum Error {
    /// Caller-supplied configuration could not be parsed or is unusable
    #[error("invalid project configuration: {0}")]
    InvalidConfig(String),

    /// Project id failed the lexical identifier check
    #[error("project id \"{0}\" contains a reserved word, or is not a valid identifier")]
    InvalidIdentifier(String),

    /// Target directory exists and holds more than the settings folder
    #[error("path already exists and is not empty: {0}")]
    DirectoryNotEmpty(PathBuf),

    /// Template source is an ancestor of the target directory
    #[error(
        "project dir \"{target}\" must not be created at/inside the template \
         used to create the project \"{template}\""
    )]
    RecursiveTemplate { template: PathBuf, target: PathBuf },

    /// Resolved template root does not exist on disk
    #[error("could not find template directory: {0}")]
    TemplateNotFound(PathBuf),

    /// Fetching a remote template (git clone or registry download) failed
    #[error("failed to fetch template \"{reference}\": {message}")]
    SourceFetch { reference: String, message: String },

    /// Symlink creation needs elevated privileges on this platform
    #[error("creating symlinks requires elevated privileges on this platform")]
    InsufficientPrivilege,

    /// Placeholder substitution failed for a file name or its contents
    #[error("failed to render \"{path}\": {message}")]
    Render { path: String, message: String },

    /// A prompt answer was rejected by its validator
    #[error("invalid answer for \"{key}\": {message}")]
    PromptValidation { key: String, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
