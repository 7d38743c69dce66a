//! Template acquisition and materialization
//!
//! This module provides:
//! - Source classification and resolution (local dir, git repo, registry)
//! - Fetching of remote sources into the cache directory
//! - The typed template descriptor (sub-directory root, prompts, skip list)
//! - Copying/linking resolved templates into the target directory
//! - Version compatibility checking

pub mod descriptor;
pub mod fetcher;
pub mod materializer;
pub mod source;
pub mod version;

pub use descriptor::TemplateDescriptor;
pub use fetcher::TemplateFetcher;
pub use materializer::{materialize, MaterializeOptions, DEFAULT_EXCLUDES};
pub use source::{classify, resolve, ResolvedTemplate, SourceKind};
pub use version::check_compatibility;
