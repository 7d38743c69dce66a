//! Project creation pipeline: resolve a template source, materialize it
//! into the target directory, run its prompts and render placeholders.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::config::{self, ConfigInput, ProjectConfig};
use crate::error::{Error, Result};
use crate::events::EventSink;
use crate::layout;
use crate::prompt::{self, AnswerSource};
use crate::render::{self, FileSet};
use crate::safety::{self, absolutize};
use crate::templates::{
    materializer::{self, MaterializeOptions},
    source, version, TemplateFetcher,
};

/// Version reported to templates that declare a minimum tool version.
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Caller-supplied inputs for [`create`]. Everything is optional; missing
/// pieces fall back to persisted settings and then built-in defaults.
#[derive(Debug, Default)]
pub struct CreateOptions {
    /// Reverse-domain project identifier, e.g. `com.example.app`.
    pub id: Option<String>,
    /// Human-readable project name.
    pub name: Option<String>,
    /// Caller configuration, either parsed or raw JSON text.
    pub config: Option<ConfigInput>,
}

/// Create a project at `dir` from the configured template source.
///
/// Returns the final metadata map used for rendering. If the pipeline
/// fails after a fresh target directory was created, that directory is
/// removed before the error propagates.
pub async fn create(
    dir: &Path,
    options: CreateOptions,
    answers: &mut dyn AnswerSource,
    sink: &dyn EventSink,
) -> Result<Map<String, Value>> {
    if dir.as_os_str().is_empty() {
        return Err(Error::InvalidConfig(
            "target directory not specified".into(),
        ));
    }

    let persisted = config::read_settings(dir)?;
    let cfg = config::merge(
        persisted,
        options.config,
        options.id.as_deref(),
        options.name.as_deref(),
    )?;

    let target = absolutize(dir)?;
    safety::check(&target, &cfg)?;

    // Rollback must only ever touch a directory this run brought into
    // existence, so record the state before anything is written.
    let dir_already_existed = target.exists();

    sink.log(&format!("Creating project in {}.", target.display()));
    config::write_settings(&target, &cfg.sanitized_snapshot())?;

    let result = populate(&target, &cfg, answers, sink).await;
    match result {
        Ok(metadata) => {
            let name = metadata
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or("project");
            sink.log(&format!("Success! Created {} at {}", name, target.display()));
            Ok(metadata)
        }
        Err(e) => {
            if !dir_already_existed {
                let _ = fs::remove_dir_all(&target);
            }
            Err(e)
        }
    }
}

async fn populate(
    target: &Path,
    cfg: &ProjectConfig,
    answers: &mut dyn AnswerSource,
    sink: &dyn EventSink,
) -> Result<Map<String, Value>> {
    let resolved = if cfg.source.link {
        sink.verbose("Symlinking template assets.");
        let root = absolutize(Path::new(&cfg.source.url))?;
        source::resolve_existing(root, sink)?
    } else {
        sink.verbose("Copying template assets.");
        let fetcher = TemplateFetcher::new(&format!("stamp/{}", TOOL_VERSION));
        source::resolve(
            &fetcher,
            &cfg.source.url,
            cfg.source.template,
            &layout::cache_dir(),
            sink,
        )
        .await?
    };

    let stock = layout::stock_template_dir();
    let options = MaterializeOptions {
        is_subdirectory: resolved.is_subdirectory,
        link: cfg.source.link,
        extra_excludes: Vec::new(),
    };
    materializer::materialize(&resolved.root, target, &stock, &options)?;

    let basename = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "app".to_string());

    let mut metadata = cfg.metadata();
    if !metadata.contains_key("name") {
        metadata.insert("name".into(), Value::String(basename.clone()));
    }
    metadata.insert("dirname".into(), Value::String(basename));

    let mut skip_render: Vec<String> = Vec::new();
    if let Some(descriptor) = &resolved.descriptor {
        if let Some(required) = descriptor.version.as_deref() {
            if let Some(warning) = version::check_compatibility(TOOL_VERSION, required) {
                sink.log(&warning);
            }
        }
        if !descriptor.prompts.is_empty() {
            prompt::run(&descriptor.prompts, &mut metadata, answers)?;
        }
        skip_render = descriptor.skip_render.clone();
    }

    let mut files = FileSet::from_dir(target)?;
    render::render(&mut files, &metadata, &skip_render)?;
    files.apply(target)?;

    finalize(target, cfg, &metadata, sink)?;
    Ok(metadata)
}

/// Post-render fixups: seed the scaffold directories and stamp the
/// project's identity into its manifest files.
fn finalize(
    target: &Path,
    cfg: &ProjectConfig,
    metadata: &Map<String, Value>,
    sink: &dyn EventSink,
) -> Result<()> {
    for dir in layout::SCAFFOLD_DIRS {
        fs::create_dir_all(target.join(*dir))?;
    }

    let name = metadata.get("name").and_then(Value::as_str);

    let package_json = target.join("package.json");
    if package_json.exists() {
        let text = fs::read_to_string(&package_json)?;
        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(mut pkg)) => {
                if let Some(name) = name {
                    pkg.insert("name".into(), Value::String(name.to_lowercase()));
                }
                pkg.insert("version".into(), Value::String("1.0.0".into()));
                let mut out = serde_json::to_string_pretty(&Value::Object(pkg))
                    .map_err(|e| Error::InvalidConfig(e.to_string()))?;
                out.push('\n');
                fs::write(&package_json, out)?;
            }
            Ok(_) => {
                sink.error(&format!(
                    "{} is not a JSON object; name and version were not updated",
                    package_json.display()
                ));
            }
            Err(e) => {
                sink.error(&format!(
                    "{} is malformed and was not updated: {}",
                    package_json.display(),
                    e
                ));
            }
        }
    }

    // A symlinked project file belongs to the template, never write
    // through it in link mode.
    let project_file = target.join(layout::PROJECT_FILE);
    if project_file.exists() && !project_file.symlink_metadata()?.file_type().is_symlink() {
        let text = fs::read_to_string(&project_file)?;
        let mut doc: serde_yaml::Value = serde_yaml::from_str(&text)
            .unwrap_or(serde_yaml::Value::Mapping(serde_yaml::Mapping::new()));
        if !doc.is_mapping() {
            doc = serde_yaml::Value::Mapping(serde_yaml::Mapping::new());
        }
        if let Some(map) = doc.as_mapping_mut() {
            if let Some(id) = &cfg.id {
                map.insert(
                    serde_yaml::Value::String("id".into()),
                    serde_yaml::Value::String(id.clone()),
                );
            }
            if let Some(name) = name {
                map.insert(
                    serde_yaml::Value::String("name".into()),
                    serde_yaml::Value::String(name.to_string()),
                );
            }
            map.insert(
                serde_yaml::Value::String("version".into()),
                serde_yaml::Value::String("1.0.0".into()),
            );
        }
        let out = serde_yaml::to_string(&doc)
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        fs::write(&project_file, out)?;
    }

    Ok(())
}
