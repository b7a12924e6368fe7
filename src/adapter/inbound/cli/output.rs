//! Terminal output for the CLI.
//!
//! Human output goes to stdout, errors to stderr. With `--json` every message
//! becomes one `{"type", "payload"}` line on the same stream; `--quiet` keeps
//! only warnings and errors.

use std::fmt::Display;
use std::sync::OnceLock;

use owo_colors::OwoColorize;
use parking_lot::RwLock;
use serde_json::{json, Value};

use crate::port::NoticeLevel;

/// Output flags taken from the global command-line options.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    pub json: bool,
    pub quiet: bool,
}

impl OutputConfig {
    #[must_use]
    pub const fn new(json: bool, quiet: bool) -> Self {
        Self { json, quiet }
    }
}

static OUTPUT_CONFIG: OnceLock<RwLock<OutputConfig>> = OnceLock::new();

fn config_cell() -> &'static RwLock<OutputConfig> {
    OUTPUT_CONFIG.get_or_init(|| RwLock::new(OutputConfig::default()))
}

fn read_config() -> OutputConfig {
    *config_cell().read()
}

/// Apply output settings from global CLI flags.
pub fn configure(config: OutputConfig) {
    *config_cell().write() = config;
}

#[must_use]
pub fn is_json() -> bool {
    read_config().json
}

#[must_use]
pub fn is_quiet() -> bool {
    read_config().quiet
}

/// One printable unit.
#[derive(Debug)]
enum Message<'a> {
    Header { version: &'a str },
    Section(&'a str),
    Field { label: &'a str, value: String },
    Info(&'a str),
    Success(&'a str),
    Warning(&'a str),
    Error(&'a str),
    Note(&'a str),
    Hint(&'a str),
    Lines(&'a str),
}

impl Message<'_> {
    const fn kind(&self) -> &'static str {
        match self {
            Self::Header { .. } => "header",
            Self::Section(_) => "section",
            Self::Field { .. } => "field",
            Self::Info(_) => "info",
            Self::Success(_) => "success",
            Self::Warning(_) => "warning",
            Self::Error(_) => "error",
            Self::Note(_) => "note",
            Self::Hint(_) => "hint",
            Self::Lines(_) => "lines",
        }
    }

    fn payload(&self) -> Value {
        match self {
            Self::Header { version } => json!({
                "app": env!("CARGO_PKG_NAME"),
                "version": version,
            }),
            Self::Section(title) => json!({ "title": title }),
            Self::Field { label, value } => json!({ "label": label, "value": value }),
            Self::Lines(content) => json!({ "content": content }),
            Self::Info(message)
            | Self::Success(message)
            | Self::Warning(message)
            | Self::Error(message)
            | Self::Note(message)
            | Self::Hint(message) => json!({ "message": message }),
        }
    }

    /// Printed even with `--quiet`.
    const fn essential(&self) -> bool {
        matches!(self, Self::Warning(_) | Self::Error(_))
    }

    const fn to_stderr(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    fn render(&self) -> String {
        match self {
            Self::Header { version } => {
                format!("{} {}\n", env!("CARGO_PKG_NAME").bold(), version.dimmed())
            }
            Self::Section(title) => format!("\n{}", title.bold()),
            Self::Field { label, value } => format!("  {:<14} {value}", label.dimmed()),
            Self::Info(message) => marked("•".cyan(), message),
            Self::Success(message) => marked("✓".green(), message),
            Self::Warning(message) => marked("⚠".yellow(), message),
            Self::Error(message) => marked("×".red(), message),
            Self::Note(message) => format!("  {}", message.dimmed()),
            Self::Hint(message) => format!("  {}: {}", "hint".cyan().dimmed(), message.dimmed()),
            Self::Lines(content) => content
                .lines()
                .map(|line| format!("  {line}"))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// Marker before the first line; later lines are indented and dimmed.
fn marked(marker: impl Display, message: &str) -> String {
    let mut lines = message.lines();
    let mut text = format!("  {marker} {}", lines.next().unwrap_or_default());
    for line in lines {
        text.push_str(&format!("\n    {}", line.dimmed()));
    }
    text
}

fn emit(message: &Message<'_>) {
    let config = read_config();
    let text = if config.json {
        json!({ "type": message.kind(), "payload": message.payload() }).to_string()
    } else if config.quiet && !message.essential() {
        return;
    } else {
        message.render()
    };

    if message.to_stderr() {
        eprintln!("{text}");
    } else {
        println!("{text}");
    }
}

/// Program name and version, shown when the menu opens.
pub fn header(version: &str) {
    emit(&Message::Header { version });
}

pub fn section(title: &str) {
    emit(&Message::Section(title));
}

/// A labelled value inside a section.
pub fn field(label: &str, value: impl Display) {
    emit(&Message::Field {
        label,
        value: value.to_string(),
    });
}

pub fn info(message: &str) {
    emit(&Message::Info(message));
}

pub fn success(message: &str) {
    emit(&Message::Success(message));
}

pub fn warning(message: &str) {
    emit(&Message::Warning(message));
}

pub fn error(message: &str) {
    emit(&Message::Error(message));
}

pub fn note(message: &str) {
    emit(&Message::Note(message));
}

pub fn hint(message: &str) {
    emit(&Message::Hint(message));
}

/// Pre-formatted text such as a table, indented as a block.
pub fn lines(content: &str) {
    emit(&Message::Lines(content));
}

/// Print an operator notice at its level.
pub fn notice(level: NoticeLevel, message: &str) {
    match level {
        NoticeLevel::Info => info(message),
        NoticeLevel::Warning => warning(message),
        NoticeLevel::Error => error(message),
    }
}

/// Cyan in human output, unchanged in JSON output.
pub fn highlight(value: impl Display) -> String {
    let value = value.to_string();
    if is_json() {
        return value;
    }
    value.cyan().to_string()
}

/// Print a whole JSON document, for commands whose `--json` output is a
/// single value.
pub fn json_output(value: Value) {
    println!("{value}");
}
