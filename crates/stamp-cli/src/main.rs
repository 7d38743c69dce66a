//! stamp CLI - Create projects from templates

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{Map, Value};
use stamp_core::config::ConfigInput;
use stamp_core::{
    create, AnswerSource, ConsoleSink, CreateOptions, InteractiveAnswers, ScriptedAnswers,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "stamp")]
#[command(about = "Create projects from stamp templates")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new project from a template
    Create(CreateArgs),
}

#[derive(Parser, Debug)]
pub struct CreateArgs {
    /// Directory to create the project in
    pub directory: PathBuf,

    /// Reverse-domain project identifier, e.g. com.example.app
    #[arg(long)]
    pub id: Option<String>,

    /// Human-readable project name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Template source: local directory, git URL or registry package
    #[arg(short, long)]
    pub template: Option<String>,

    /// Inline JSON configuration merged over persisted settings
    #[arg(short, long)]
    pub config: Option<String>,

    /// Symlink template assets instead of copying them
    #[arg(long)]
    pub link: bool,

    /// Print verbose progress output
    #[arg(short, long)]
    pub verbose: bool,

    /// Accept template prompt defaults without asking (non-interactive mode)
    #[arg(short, long)]
    pub yes: bool,
}

impl CreateArgs {
    /// Fold the source flags into the caller configuration object
    fn config_input(&self) -> Result<Option<ConfigInput>> {
        let mut cfg: Map<String, Value> = match &self.config {
            Some(text) => serde_json::from_str(text).context("--config must be a JSON object")?,
            None => Map::new(),
        };

        let mut www = Map::new();
        if let Some(template) = &self.template {
            www.insert("url".into(), Value::String(template.clone()));
            www.insert("template".into(), Value::Bool(true));
        }
        if self.link {
            www.insert("link".into(), Value::Bool(true));
        }
        if !www.is_empty() {
            let lib = cfg
                .entry("lib".to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(lib) = lib {
                lib.insert("www".into(), Value::Object(www));
            }
        }

        if cfg.is_empty() {
            Ok(None)
        } else {
            Ok(Some(ConfigInput::Parsed(Value::Object(cfg))))
        }
    }
}

async fn run_create(args: CreateArgs) -> Result<()> {
    let options = CreateOptions {
        id: args.id.clone(),
        name: args.name.clone(),
        config: args.config_input()?,
    };
    let sink = ConsoleSink::new(args.verbose);

    let mut scripted;
    let mut interactive;
    let answers: &mut dyn AnswerSource = if args.yes {
        scripted = ScriptedAnswers::default();
        &mut scripted
    } else {
        interactive = InteractiveAnswers::new();
        &mut interactive
    };

    create(&args.directory, options, answers, &sink).await?;

    println!();
    println!("Next steps:");
    if std::env::current_dir().ok().as_deref() != Some(args.directory.as_path()) {
        println!("  cd {}", args.directory.display());
    }
    println!("  open app.yaml to review your project settings");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    let args = Args::parse();
    match args.command {
        Command::Create(create_args) => {
            let result = run_create(create_args).await;

            // Ensure cursor is visible on normal exit
            let _ = console::Term::stderr().show_cursor();

            result
        }
    }
}
