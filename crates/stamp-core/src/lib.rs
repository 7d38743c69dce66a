//! Stamp Core - Template acquisition and project materialization
//!
//! This library turns a template source (local directory, git repository or
//! registry package) into a ready-to-use project directory. It is designed
//! to be embedded by CLI binaries that share the same pipeline but differ
//! in how they gather input from the user.
//!
//! # Architecture
//!
//! The pipeline runs in fixed stages:
//!
//! - **Configuration** - merge persisted settings, caller config and flags
//! - **Safety** - validate the identifier, target and source before any I/O
//! - **Acquisition** - resolve and fetch the template source
//! - **Materialization** - copy or symlink template assets, backfill stock
//! - **Rendering** - run template prompts and substitute placeholders
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based interactive prompt source
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use stamp_core::{create, CreateOptions, NullSink, ScriptedAnswers};
//!
//! let mut answers = ScriptedAnswers::default();
//! let metadata = create(
//!     std::path::Path::new("my-app"),
//!     CreateOptions::default(),
//!     &mut answers,
//!     &NullSink,
//! )
//! .await?;
//! ```

pub mod config;
pub mod create;
pub mod error;
pub mod events;
pub mod layout;
pub mod prompt;
pub mod render;
pub mod safety;
pub mod templates;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use create::{create, CreateOptions, TOOL_VERSION};
pub use error::{Error, Result};
pub use events::{ConsoleSink, EventSink, NullSink};
pub use prompt::{AnswerSource, PromptDefinition, ScriptedAnswers};
pub use templates::{ResolvedTemplate, SourceKind, TemplateDescriptor, TemplateFetcher};

#[cfg(feature = "tui")]
pub use tui::InteractiveAnswers;
