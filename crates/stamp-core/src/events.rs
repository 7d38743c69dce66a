//! Event notifications emitted by the pipeline
//!
//! The pipeline never consumes these itself; they exist so callers can
//! observe progress. Callers that do not care pass [`NullSink`]; the CLI
//! passes [`ConsoleSink`].

use colored::Colorize;

/// Observer for pipeline notifications
pub trait EventSink: Send + Sync {
    fn log(&self, message: &str);
    fn verbose(&self, message: &str);
    fn error(&self, message: &str);
}

/// Console logger used when no external sink is supplied
pub struct ConsoleSink {
    verbose: bool,
}

impl ConsoleSink {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl EventSink for ConsoleSink {
    fn log(&self, message: &str) {
        println!("{}", message);
    }

    fn verbose(&self, message: &str) {
        if self.verbose {
            println!("{}", message.dimmed());
        }
    }

    fn error(&self, message: &str) {
        eprintln!("{} {}", "Error:".red().bold(), message);
    }
}

/// Sink that drops every notification
pub struct NullSink;

impl EventSink for NullSink {
    fn log(&self, _message: &str) {}
    fn verbose(&self, _message: &str) {}
    fn error(&self, _message: &str) {}
}
