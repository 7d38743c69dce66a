//! Template descriptor types and parsing
//!
//! A template may ship a `template.yaml` next to its content. Everything in
//! it is optional: a nested content root (`dirname`), a minimum tool version,
//! interactive prompts, and glob patterns exempted from rendering. A missing
//! or malformed descriptor simply means "plain template" and is never an
//! error.

use crate::layout;
use crate::prompt::PromptDefinition;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Per-template descriptor (`<template root>/template.yaml`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateDescriptor {
    /// Display name of the template
    #[serde(default)]
    pub name: Option<String>,

    /// Description of what the template provides
    #[serde(default)]
    pub description: Option<String>,

    /// Minimum tool version this template expects
    #[serde(default)]
    pub version: Option<String>,

    /// Content root nested below the descriptor, relative to it
    #[serde(default)]
    pub dirname: Option<String>,

    /// Ordered interactive questions answered before rendering
    #[serde(default)]
    pub prompts: Vec<PromptDefinition>,

    /// Glob patterns whose matches bypass rendering entirely
    #[serde(default)]
    pub skip_render: Vec<String>,
}

impl TemplateDescriptor {
    /// Probe a template root for a descriptor
    ///
    /// Absence or a schema mismatch yields `None`; the caller treats that as
    /// "not a sub-directory template" rather than a failure.
    pub fn load(root: &Path) -> Option<Self> {
        let path = root.join(layout::DESCRIPTOR_FILE);
        let text = std::fs::read_to_string(&path).ok()?;
        serde_yaml::from_str(&text).ok()
    }
}
