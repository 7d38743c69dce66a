//! Project configuration merging and persistence
//!
//! One canonical [`ProjectConfig`] is built per invocation by shallowly
//! merging three layers, lowest precedence first: the persisted settings file
//! under the target directory, the caller-supplied configuration, and the
//! explicit id/name overrides. The merged value is immutable from the moment
//! resolution starts; prompt answers are folded into the render metadata
//! later, never back into the config.

pub mod identifier;

use crate::error::{Error, Result};
use crate::layout;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Caller-supplied configuration, either structured or serialized
#[derive(Debug, Clone)]
pub enum ConfigInput {
    Parsed(Value),
    Text(String),
}

/// Where the template lives and how to bring it in
#[derive(Debug, Clone)]
pub struct SourceSettings {
    /// Template source reference; always resolvable to an absolute path
    /// before materialization begins
    pub url: String,
    /// True when the reference is a full template rather than a bare asset tree
    pub template: bool,
    /// Symlink the template into the target instead of copying
    pub link: bool,
    pub version: String,
    pub id: String,
}

/// Canonical configuration for one scaffold invocation
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    pub id: Option<String>,
    pub name: Option<String>,
    pub source: SourceSettings,
    raw: Map<String, Value>,
}

impl ProjectConfig {
    fn from_map(raw: Map<String, Value>) -> Self {
        let id = raw.get("id").and_then(Value::as_str).map(str::to_owned);
        let name = raw.get("name").and_then(Value::as_str).map(str::to_owned);

        let www = raw.get("lib").and_then(|lib| lib.get("www"));
        let str_key = |key: &str| {
            www.and_then(|w| w.get(key))
                .and_then(Value::as_str)
                .map(str::to_owned)
        };
        let bool_key = |key: &str| {
            www.and_then(|w| w.get(key))
                .and_then(Value::as_bool)
                .unwrap_or(false)
        };

        // "uri" was renamed to "url" long ago; keep reading the old key
        let url = str_key("url").or_else(|| str_key("uri")).unwrap_or_else(|| {
            layout::stock_template_dir().to_string_lossy().into_owned()
        });

        let source = SourceSettings {
            url,
            template: bool_key("template"),
            link: bool_key("link"),
            version: str_key("version").unwrap_or_else(|| "not_versioned".to_string()),
            id: str_key("id").unwrap_or_else(|| "stock".to_string()),
        };

        Self {
            id,
            name,
            source,
            raw,
        }
    }

    /// The full merged mapping, source subtree included
    pub fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }

    /// Durable subset of the configuration
    ///
    /// The `lib.www` subtree is run-specific (source URL, link flag, version,
    /// fetched id) and must never leak into the settings file; stripping it
    /// removes an emptied `lib` parent as well.
    pub fn sanitized_snapshot(&self) -> Map<String, Value> {
        let mut snapshot = self.raw.clone();
        if let Some(Value::Object(lib)) = snapshot.get_mut("lib") {
            lib.remove("www");
            if lib.is_empty() {
                snapshot.remove("lib");
            }
        }
        snapshot
    }

    /// Binding context for prompts and rendering: every merged key except the
    /// source subtree
    pub fn metadata(&self) -> Map<String, Value> {
        let mut metadata = self.raw.clone();
        metadata.remove("lib");
        metadata
    }
}

/// Read the persisted settings file of a project directory
///
/// A missing file is an empty mapping, not an error.
pub fn read_settings(project_dir: &Path) -> Result<Map<String, Value>> {
    let path = layout::settings_path(project_dir);
    if !path.exists() {
        return Ok(Map::new());
    }
    let text = fs::read_to_string(&path)?;
    match serde_json::from_str(&text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(Error::InvalidConfig(format!(
            "{} must hold a JSON object",
            path.display()
        ))),
        Err(e) => Err(Error::InvalidConfig(format!(
            "malformed {}: {}",
            path.display(),
            e
        ))),
    }
}

/// Combine the three configuration layers into one canonical value
pub fn merge(
    persisted: Map<String, Value>,
    caller: Option<ConfigInput>,
    id_override: Option<&str>,
    name_override: Option<&str>,
) -> Result<ProjectConfig> {
    let caller_map = match caller {
        None => Map::new(),
        Some(ConfigInput::Parsed(Value::Object(map))) => map,
        Some(ConfigInput::Parsed(other)) => {
            return Err(Error::InvalidConfig(format!(
                "configuration must be an object, got {}",
                kind_of(&other)
            )));
        }
        Some(ConfigInput::Text(text)) => match serde_json::from_str(&text) {
            Ok(Value::Object(map)) => map,
            Ok(other) => {
                return Err(Error::InvalidConfig(format!(
                    "configuration must be an object, got {}",
                    kind_of(&other)
                )));
            }
            Err(e) => return Err(Error::InvalidConfig(e.to_string())),
        },
    };

    // Shallow merge: a caller key entirely replaces a persisted key
    let mut merged = persisted;
    for (key, value) in caller_map {
        merged.insert(key, value);
    }
    if let Some(id) = id_override {
        merged.insert("id".to_string(), Value::String(id.to_string()));
    }
    if let Some(name) = name_override {
        merged.insert("name".to_string(), Value::String(name.to_string()));
    }

    Ok(ProjectConfig::from_map(merged))
}

/// Persist a sanitized snapshot under the project directory
///
/// An empty snapshot is skipped entirely unless a settings file already
/// exists, so a bare run never leaves a trivial empty file behind.
pub fn write_settings(project_dir: &Path, snapshot: &Map<String, Value>) -> Result<()> {
    let path = layout::settings_path(project_dir);
    if snapshot.is_empty() && !path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let contents = serde_json::to_string_pretty(&Value::Object(snapshot.clone()))
        .map_err(|e| Error::InvalidConfig(e.to_string()))?;
    fs::write(&path, contents)?;
    Ok(())
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_caller_config_wins_over_persisted() {
        let persisted = obj(json!({"name": "old", "color": "blue"}));
        let caller = ConfigInput::Parsed(json!({"name": "new"}));
        let cfg = merge(persisted, Some(caller), None, None).unwrap();
        assert_eq!(cfg.name.as_deref(), Some("new"));
        assert_eq!(cfg.raw()["color"], "blue");
    }

    #[test]
    fn test_explicit_overrides_win_over_caller() {
        let caller = ConfigInput::Parsed(json!({"id": "com.caller", "name": "caller"}));
        let cfg = merge(Map::new(), Some(caller), Some("com.cli"), Some("cli")).unwrap();
        assert_eq!(cfg.id.as_deref(), Some("com.cli"));
        assert_eq!(cfg.name.as_deref(), Some("cli"));
    }

    #[test]
    fn test_textual_config_is_parsed() {
        let caller = ConfigInput::Text(r#"{"name": "textual"}"#.to_string());
        let cfg = merge(Map::new(), Some(caller), None, None).unwrap();
        assert_eq!(cfg.name.as_deref(), Some("textual"));
    }

    #[test]
    fn test_malformed_textual_config_rejected() {
        let caller = ConfigInput::Text("{not json".to_string());
        let err = merge(Map::new(), Some(caller), None, None).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_non_object_config_rejected() {
        let caller = ConfigInput::Parsed(json!([1, 2]));
        let err = merge(Map::new(), Some(caller), None, None).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_source_defaults_to_stock_template() {
        let cfg = merge(Map::new(), None, None, None).unwrap();
        assert_eq!(cfg.source.url, layout::stock_template_dir().to_string_lossy());
        assert!(!cfg.source.template);
        assert!(!cfg.source.link);
        assert_eq!(cfg.source.version, "not_versioned");
    }

    #[test]
    fn test_legacy_uri_key_still_read() {
        let caller = ConfigInput::Parsed(json!({"lib": {"www": {"uri": "/tmp/tpl"}}}));
        let cfg = merge(Map::new(), Some(caller), None, None).unwrap();
        assert_eq!(cfg.source.url, "/tmp/tpl");
    }

    #[test]
    fn test_snapshot_strips_source_subtree() {
        let caller = ConfigInput::Parsed(json!({
            "name": "keep",
            "lib": {"www": {"url": "/tmp/tpl", "link": true}}
        }));
        let cfg = merge(Map::new(), Some(caller), None, None).unwrap();
        let snapshot = cfg.sanitized_snapshot();
        assert_eq!(snapshot.get("name"), Some(&json!("keep")));
        assert!(snapshot.get("lib").is_none());
    }

    #[test]
    fn test_snapshot_keeps_other_lib_keys() {
        let caller = ConfigInput::Parsed(json!({
            "lib": {"www": {"url": "/tmp/tpl"}, "native": {"url": "/tmp/native"}}
        }));
        let cfg = merge(Map::new(), Some(caller), None, None).unwrap();
        let snapshot = cfg.sanitized_snapshot();
        let lib = snapshot.get("lib").and_then(Value::as_object).unwrap();
        assert!(lib.contains_key("native"));
        assert!(!lib.contains_key("www"));
    }

    #[test]
    fn test_empty_snapshot_not_written() {
        let dir = tempfile::tempdir().unwrap();
        write_settings(dir.path(), &Map::new()).unwrap();
        assert!(!layout::settings_path(dir.path()).exists());
    }

    #[test]
    fn test_settings_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = obj(json!({"name": "persisted"}));
        write_settings(dir.path(), &snapshot).unwrap();
        let read_back = read_settings(dir.path()).unwrap();
        assert_eq!(read_back, snapshot);
    }

    #[test]
    fn test_missing_settings_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_settings(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_settings_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let settings_dir = dir.path().join(layout::SETTINGS_DIR);
        std::fs::create_dir_all(&settings_dir).unwrap();
        std::fs::write(settings_dir.join(layout::SETTINGS_FILE), "oops").unwrap();
        assert!(matches!(
            read_settings(dir.path()),
            Err(Error::InvalidConfig(_))
        ));
    }
}
