//! End-to-end tests for the create pipeline against on-disk templates.

use std::fs;
use std::path::Path;
use std::sync::Mutex;

use serde_json::json;
use stamp_core::config::ConfigInput;
use stamp_core::{create, CreateOptions, Error, EventSink, NullSink, ScriptedAnswers};

/// Sink that records error events for assertions
#[derive(Default)]
struct RecordingSink {
    errors: Mutex<Vec<String>>,
}

impl EventSink for RecordingSink {
    fn log(&self, _message: &str) {}
    fn verbose(&self, _message: &str) {}
    fn error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }
}

fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

fn options_for(template: &Path, name: &str) -> CreateOptions {
    CreateOptions {
        name: Some(name.to_string()),
        config: Some(ConfigInput::Parsed(json!({
            "lib": {"www": {
                "url": template.to_string_lossy(),
                "template": true,
            }}
        }))),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_create_renders_names_and_contents() {
    let work = tempfile::tempdir().unwrap();
    let template = work.path().join("template");
    write_file(&template.join("www/index.html"), "Hello {{name}}!");
    write_file(&template.join("www/{{name}}.txt"), "made for {{dirname}}");

    let target = work.path().join("acme-app");
    let mut answers = ScriptedAnswers::default();
    let metadata = create(&target, options_for(&template, "Acme"), &mut answers, &NullSink)
        .await
        .unwrap();

    assert_eq!(metadata["name"], "Acme");
    assert_eq!(metadata["dirname"], "acme-app");

    let index = fs::read_to_string(target.join("www/index.html")).unwrap();
    assert_eq!(index, "Hello Acme!");

    let renamed = fs::read_to_string(target.join("www/Acme.txt")).unwrap();
    assert_eq!(renamed, "made for acme-app");
    assert!(!target.join("www/{{name}}.txt").exists());
}

#[tokio::test]
async fn test_renamed_directories_leave_no_placeholder_folders() {
    let work = tempfile::tempdir().unwrap();
    let template = work.path().join("template");
    write_file(&template.join("{{name}}/index.txt"), "made for {{name}}");

    let target = work.path().join("pruned");
    let mut answers = ScriptedAnswers::default();
    create(&target, options_for(&template, "acme"), &mut answers, &NullSink)
        .await
        .unwrap();

    assert!(!target.join("{{name}}").exists());
    assert_eq!(
        fs::read_to_string(target.join("acme/index.txt")).unwrap(),
        "made for acme"
    );
}

#[tokio::test]
async fn test_create_backfills_and_finalizes_stock_pieces() {
    let work = tempfile::tempdir().unwrap();
    let template = work.path().join("template");
    write_file(&template.join("www/index.html"), "plain");

    let target = work.path().join("backfilled");
    let mut opts = options_for(&template, "Backfilled");
    opts.id = Some("com.example.backfilled".to_string());
    let mut answers = ScriptedAnswers::default();
    create(&target, opts, &mut answers, &NullSink).await.unwrap();

    // Standard pieces the template did not ship come from the stock template
    assert!(target.join("hooks").is_dir());
    assert!(target.join("app.lock").is_file());
    assert!(target.join("platforms").is_dir());
    assert!(target.join("plugins").is_dir());

    // Project identity is stamped into the backfilled project file
    let manifest = fs::read_to_string(target.join("app.yaml")).unwrap();
    assert!(manifest.contains("com.example.backfilled"));
    assert!(manifest.contains("Backfilled"));
}

#[tokio::test]
async fn test_malformed_package_json_is_reported_not_rewritten() {
    let work = tempfile::tempdir().unwrap();
    let template = work.path().join("template");
    write_file(&template.join("www/index.html"), "plain");
    write_file(&template.join("package.json"), "{not json");

    let target = work.path().join("broken-manifest");
    let sink = RecordingSink::default();
    let mut answers = ScriptedAnswers::default();
    create(&target, options_for(&template, "Broken"), &mut answers, &sink)
        .await
        .unwrap();

    assert_eq!(
        fs::read_to_string(target.join("package.json")).unwrap(),
        "{not json"
    );
    let errors = sink.errors.lock().unwrap();
    assert!(errors.iter().any(|e| e.contains("package.json")));
}

#[tokio::test]
async fn test_settings_snapshot_omits_source_subtree() {
    let work = tempfile::tempdir().unwrap();
    let template = work.path().join("template");
    write_file(&template.join("www/index.html"), "plain");

    let target = work.path().join("settings");
    let mut answers = ScriptedAnswers::default();
    create(&target, options_for(&template, "Settings"), &mut answers, &NullSink)
        .await
        .unwrap();

    let settings = fs::read_to_string(target.join(".stamp/config.json")).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&settings).unwrap();
    assert_eq!(parsed["name"], "Settings");
    assert!(parsed.get("lib").is_none());
}

#[tokio::test]
async fn test_invalid_identifier_rejected_before_any_io() {
    let work = tempfile::tempdir().unwrap();
    let target = work.path().join("never-created");

    let opts = CreateOptions {
        id: Some("int.bob".to_string()),
        ..Default::default()
    };
    let mut answers = ScriptedAnswers::default();
    let err = create(&target, opts, &mut answers, &NullSink)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidIdentifier(_)));
    assert!(!target.exists());
}

#[tokio::test]
async fn test_target_inside_template_rejected_before_any_io() {
    let work = tempfile::tempdir().unwrap();
    let template = work.path().join("template");
    write_file(&template.join("www/index.html"), "plain");

    let target = template.join("nested/project");
    let mut answers = ScriptedAnswers::default();
    let err = create(&target, options_for(&template, "Nested"), &mut answers, &NullSink)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::RecursiveTemplate { .. }));
    assert!(!target.exists());
}

#[tokio::test]
async fn test_nonempty_target_rejected() {
    let work = tempfile::tempdir().unwrap();
    let target = work.path().join("occupied");
    write_file(&target.join("leftover.txt"), "data");

    let mut answers = ScriptedAnswers::default();
    let err = create(&target, CreateOptions::default(), &mut answers, &NullSink)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::DirectoryNotEmpty(_)));
    assert!(target.join("leftover.txt").exists());
}

#[tokio::test]
async fn test_failed_run_removes_fresh_target() {
    let work = tempfile::tempdir().unwrap();
    let template = work.path().join("template");
    // Descriptor points at a sub-directory that does not exist
    write_file(&template.join("template.yaml"), "dirname: missing\n");

    let target = work.path().join("doomed");
    let mut answers = ScriptedAnswers::default();
    let err = create(&target, options_for(&template, "Doomed"), &mut answers, &NullSink)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::TemplateNotFound(_)));
    assert!(!target.exists());
}

#[tokio::test]
async fn test_descriptor_prompts_feed_rendering() {
    let work = tempfile::tempdir().unwrap();
    let template = work.path().join("template");
    write_file(
        &template.join("template.yaml"),
        "prompts:\n  - key: greeting\n    message: Greeting to use\n    default: Hi\n",
    );
    write_file(&template.join("www/index.html"), "{{greeting}}, {{name}}!");

    let target = work.path().join("greeted");
    let mut answers = ScriptedAnswers::default();
    answers.insert("greeting", "Bonjour");
    create(&target, options_for(&template, "Acme"), &mut answers, &NullSink)
        .await
        .unwrap();

    let index = fs::read_to_string(target.join("www/index.html")).unwrap();
    assert_eq!(index, "Bonjour, Acme!");
}

#[tokio::test]
async fn test_prompt_defaults_used_when_not_scripted() {
    let work = tempfile::tempdir().unwrap();
    let template = work.path().join("template");
    write_file(
        &template.join("template.yaml"),
        "prompts:\n  - key: greeting\n    message: Greeting to use\n    default: Hi\n",
    );
    write_file(&template.join("www/index.html"), "{{greeting}}");

    let target = work.path().join("defaulted");
    let mut answers = ScriptedAnswers::default();
    create(&target, options_for(&template, "Acme"), &mut answers, &NullSink)
        .await
        .unwrap();

    let index = fs::read_to_string(target.join("www/index.html")).unwrap();
    assert_eq!(index, "Hi");
}

#[tokio::test]
async fn test_stock_template_round_trip_is_byte_identical() {
    let work = tempfile::tempdir().unwrap();
    let target = work.path().join("stock-app");

    let mut answers = ScriptedAnswers::default();
    create(&target, CreateOptions::default(), &mut answers, &NullSink)
        .await
        .unwrap();

    let stock = Path::new(env!("CARGO_MANIFEST_DIR")).join("templates");
    let original = fs::read(stock.join("www/index.html")).unwrap();
    let materialized = fs::read(target.join("www/index.html")).unwrap();
    assert_eq!(original, materialized);
}

#[cfg(unix)]
#[tokio::test]
async fn test_link_mode_symlinks_instead_of_copying() {
    let work = tempfile::tempdir().unwrap();
    let template = work.path().join("template");
    write_file(&template.join("www/index.html"), "linked");
    write_file(&template.join("app.yaml"), "name: Linked\n");

    let target = work.path().join("linked-app");
    let opts = CreateOptions {
        name: Some("Linked".to_string()),
        config: Some(ConfigInput::Parsed(json!({
            "lib": {"www": {
                "url": template.to_string_lossy(),
                "template": true,
                "link": true,
            }}
        }))),
        ..Default::default()
    };
    let mut answers = ScriptedAnswers::default();
    create(&target, opts, &mut answers, &NullSink).await.unwrap();

    let www = target.join("www");
    let manifest = target.join("app.yaml");
    assert!(www.symlink_metadata().unwrap().file_type().is_symlink());
    assert!(manifest.symlink_metadata().unwrap().file_type().is_symlink());

    // The template's own file must not be rewritten through the link
    let original = fs::read_to_string(template.join("app.yaml")).unwrap();
    assert_eq!(original, "name: Linked\n");
}
