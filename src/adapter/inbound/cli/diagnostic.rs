//! Miette-based diagnostics for configuration errors.
//!
//! TOML parse errors are rendered with the offending file content and a
//! labeled span; everything else falls back to a plain error line.

use std::path::Path;

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use crate::adapter::inbound::cli::output;
use crate::error::{ConfigError as ConfigFailure, Error};

/// Configuration error with source location context.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(remoting_ctl::config))]
pub struct ConfigError {
    pub message: String,

    #[source_code]
    pub src: String,

    #[label("here")]
    pub span: SourceSpan,

    #[help]
    pub help: Option<String>,
}

impl ConfigError {
    /// Create a new configuration error spanning `len` bytes at `offset`.
    #[must_use]
    pub fn new(
        message: impl Into<String>,
        src: impl Into<String>,
        offset: usize,
        len: usize,
    ) -> Self {
        Self {
            message: message.into(),
            src: src.into(),
            span: (offset, len).into(),
            help: None,
        }
    }

    #[must_use]
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

/// Build a source-annotated diagnostic for a TOML parse failure.
#[must_use]
pub fn parse_diagnostic(path: &Path, src: &str, err: &toml::de::Error) -> ConfigError {
    let span = err.span().unwrap_or(0..0);
    ConfigError::new(
        format!("invalid configuration in {}: {}", path.display(), err.message()),
        src,
        span.start,
        span.len(),
    )
    .with_help("see config.toml.example for the accepted sections and keys")
}

/// Report a configuration load failure for `path`.
pub fn report(path: &Path, err: &Error) {
    if let Error::Config(ConfigFailure::Parse(parse)) = err {
        if !output::is_json() {
            if let Ok(src) = std::fs::read_to_string(path) {
                let report = miette::Report::new(parse_diagnostic(path, &src, parse));
                eprintln!("{report:?}");
                return;
            }
        }
    }
    output::error(&format!("{}: {err}", path.display()));
}
