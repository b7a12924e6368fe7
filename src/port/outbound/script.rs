//! Port for the shell scripts shipped with an installed build.

use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;

/// Captured result of a finished script.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptOutput {
    /// `None` when the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ScriptOutput {
    #[must_use]
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Stdout followed by stderr, trimmed, for operator display.
    #[must_use]
    pub fn combined(&self) -> String {
        let stdout = self.stdout.trim_end();
        let stderr = self.stderr.trim_end();
        match (stdout.is_empty(), stderr.is_empty()) {
            (_, true) => stdout.to_string(),
            (true, false) => stderr.to_string(),
            (false, false) => format!("{stdout}\n{stderr}"),
        }
    }
}

/// Runs a script to completion. There is no timeout: a hanging script hangs
/// the caller.
#[async_trait]
pub trait ScriptRunner: Send + Sync {
    /// Run `script` (a file name inside `workdir`) with `workdir` as current
    /// directory.
    ///
    /// # Errors
    ///
    /// Only fails when the process cannot be started. A non-zero exit is
    /// reported through [`ScriptOutput::code`].
    async fn run(&self, workdir: &Path, script: &str, args: &[String]) -> Result<ScriptOutput>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combined_output_skips_empty_streams() {
        let out = ScriptOutput {
            code: Some(0),
            stdout: "machine running\n".to_string(),
            stderr: String::new(),
        };
        assert_eq!(out.combined(), "machine running");

        let out = ScriptOutput {
            code: Some(1),
            stdout: String::new(),
            stderr: "no such machine\n".to_string(),
        };
        assert_eq!(out.combined(), "no such machine");

        let out = ScriptOutput {
            code: Some(1),
            stdout: "a\n".to_string(),
            stderr: "b\n".to_string(),
        };
        assert_eq!(out.combined(), "a\nb");
    }

    #[test]
    fn only_zero_is_success() {
        assert!(ScriptOutput { code: Some(0), ..Default::default() }.success());
        assert!(!ScriptOutput { code: Some(1), ..Default::default() }.success());
        assert!(!ScriptOutput { code: None, ..Default::default() }.success());
    }
}
